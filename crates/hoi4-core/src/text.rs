//! Reading and writing state file text
//!
//! Game files are usually UTF-8, but older mods still ship files encoded in
//! `WINDOWS_1252`. Bytes that are not valid UTF-8 are decoded as
//! `WINDOWS_1252` and written back the same way, so bytes outside the
//! provinces block are never changed.

use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

/// Encoding a state file was read with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Windows1252,
}

/// Decode file bytes, falling back to `WINDOWS_1252`
pub fn decode(bytes: Vec<u8>) -> (String, TextEncoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, TextEncoding::Utf8),
        Err(e) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(e.as_bytes());
            (text.into_owned(), TextEncoding::Windows1252)
        }
    }
}

/// Encode text back into the encoding it was read with
pub fn encode(text: &str, encoding: TextEncoding) -> Cow<'_, [u8]> {
    match encoding {
        TextEncoding::Utf8 => Cow::Borrowed(text.as_bytes()),
        TextEncoding::Windows1252 => WINDOWS_1252.encode(text).0,
    }
}

/// Read and decode a file
pub fn read_text(path: &Path) -> io::Result<(String, TextEncoding)> {
    fs::read(path).map(decode)
}
