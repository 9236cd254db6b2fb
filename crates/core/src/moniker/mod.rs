pub mod parser;
pub mod types;

pub use parser::{parse, parse_moniker, parse_path, ParseError};
pub use types::{Moniker, MonikerPath, QueryParams, VersionType};
