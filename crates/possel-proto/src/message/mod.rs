//! IRC line representation: parsing (`prefix`, `command`, `params`) and serialization.

mod parse;
mod serialize;
mod types;

pub use self::parse::parse_line;
pub use self::types::{validate_param, Message};
