pub mod encoding;
pub mod errors;
pub mod schema;
mod table;

pub use encoding::{decode_text, resolve_encoding, DecodedText};
pub use errors::ParserError;
pub use table::{load_delimited, load_delimited_bytes, DelimitedTable, LoadOptions};
