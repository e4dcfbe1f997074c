use encoding_rs::Encoding;

use crate::errors::ParserError;

/// Text decoded from raw file bytes, plus the encoding actually used.
///
/// The name can differ from the requested label when the bytes start with a
/// byte-order mark: a UTF-16 BE file read with label `utf-16` reports
/// `UTF-16BE`.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Resolves a WHATWG encoding label such as `utf-16`, `utf-8` or `latin1`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, ParserError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| ParserError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Decodes `bytes` with the encoding named by `label`, honouring a leading BOM.
///
/// Malformed sequences are an error rather than being replaced.
pub fn decode_text(bytes: &[u8], label: &str) -> Result<DecodedText, ParserError> {
    let encoding = resolve_encoding(label)?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(ParserError::Malformed {
            encoding: used.name(),
        });
    }

    Ok(DecodedText {
        text: text.into_owned(),
        encoding: used.name(),
    })
}
