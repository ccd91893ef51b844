use crate::xml::XmlError;
use thiserror::Error;

/// Errors that can occur while decoding a property list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PListError {
    /// The text is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] XmlError),
    /// The document envelope (or, in strict mode, a dictionary layout) is wrong.
    #[error("invalid format: {0}")]
    Format(String),
    /// A value element has a tag that is not a property-list type.
    #[error("unknown type '{tag}' at {path}")]
    UnknownType {
        /// Offending tag name.
        tag: String,
        /// Location of the element.
        path: String,
    },
    /// `<data>` content is not base64.
    #[error("invalid data at {path}: {reason}")]
    InvalidData {
        /// Location of the element.
        path: String,
        /// Decoder message.
        reason: String,
    },
    /// Number or date text could not be read (strict mode).
    #[error("malformed <{tag}> value '{text}' at {path}")]
    MalformedValue {
        /// Element tag.
        tag: String,
        /// Offending text.
        text: String,
        /// Location of the element.
        path: String,
    },
    /// A dictionary ends with a key that has no value (strict mode).
    #[error("key '{key}' has no value at {path}")]
    DanglingKey {
        /// The unmatched key.
        key: String,
        /// Location of the dictionary.
        path: String,
    },
    /// A key appears twice in one dictionary (duplicate rejection enabled).
    #[error("duplicate key '{key}' at {path}")]
    DuplicateKey {
        /// The repeated key.
        key: String,
        /// Location of the dictionary.
        path: String,
    },
}
