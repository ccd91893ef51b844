pub mod canonicalize;
pub mod check;
pub mod get;
pub mod inspect;
