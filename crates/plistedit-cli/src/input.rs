//! Input loading shared by all commands.

use clap::Args;
use plistedit_core::{parse_plist_with, DecodeOptions, DuplicateKeys, Leniency, PListRoot};
use std::io::{self, Read};

use crate::errors::CliError;

/// Decoder flags accepted by every command.
#[derive(Args, Debug, Clone, Copy)]
pub struct DecodeArgs {
    /// Fail on unreadable numbers/dates and dangling or non-`key` keys
    #[arg(long)]
    pub strict: bool,
    /// Fail when a dictionary repeats a key
    #[arg(long)]
    pub reject_duplicates: bool,
}

impl DecodeArgs {
    pub fn options(&self) -> DecodeOptions {
        DecodeOptions {
            leniency: if self.strict {
                Leniency::Strict
            } else {
                Leniency::Lenient
            },
            duplicate_keys: if self.reject_duplicates {
                DuplicateKeys::Reject
            } else {
                DuplicateKeys::Overwrite
            },
        }
    }
}

/// Reads the whole input from a file, or from stdin when the path is absent
/// or `-`.
pub fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        Some(path) if path != "-" => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_string(),
            source,
        }),
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

/// Reads and decodes the input in one step.
pub fn load(input: Option<&str>, decode: &DecodeArgs) -> Result<(String, PListRoot), CliError> {
    let text = read_input(input)?;
    let root = parse_plist_with(&text, &decode.options())?;
    Ok((text, root))
}
