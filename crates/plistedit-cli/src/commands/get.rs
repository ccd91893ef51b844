//! Get command implementation.

use plistedit_core::{encode_plist, encode_plist_node, NodePath};

use crate::errors::CliError;
use crate::input::{self, DecodeArgs};

pub fn run(input: String, path: String, decode: DecodeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_, root) = input::load(Some(input.as_str()), &decode)?;

    let node_path = NodePath::parse(&path).ok_or_else(|| CliError::InvalidPath(path.clone()))?;
    if node_path.is_root() {
        print!("{}", encode_plist(&root));
        return Ok(());
    }

    let node = root
        .resolve(&node_path)
        .ok_or_else(|| CliError::NotFound(node_path.to_string()))?;
    println!("{}", encode_plist_node(node, 0));
    Ok(())
}
