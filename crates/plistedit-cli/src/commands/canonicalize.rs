//! Canonicalize command implementation.

use plistedit_core::encode_plist;

use crate::errors::CliError;
use crate::input::{self, DecodeArgs};

pub fn run(
    input: Option<String>,
    output: Option<String>,
    decode: DecodeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, root) = input::load(input.as_deref(), &decode)?;
    let canonical = encode_plist(&root);

    match output {
        Some(path) => std::fs::write(&path, canonical)
            .map_err(|source| CliError::Write { path, source })?,
        None => print!("{}", canonical),
    }
    Ok(())
}
