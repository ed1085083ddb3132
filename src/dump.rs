//! Hex and ASCII dumps of undecoded payload bytes.
use crate::bits::{to_hex, HexStyle};
use crate::render::Layer;

/// Bytes shown on one dump line.
pub const BYTES_PER_LINE: usize = 16;

// Column width of the hex part of a line: two digits and a space per byte.
const HEX_WIDTH: usize = BYTES_PER_LINE * 3;

// Printable ASCII range shown verbatim in the gutter.
const ASCII_MIN: u8 = 32;
const ASCII_MAX: u8 = 126;

/// Bytes left over after a header, rendered but never decoded.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Payload<'a> {
    bytes: &'a [u8],
}

impl<'a> Payload<'a> {
    /// Create a new [`Payload`] over `bytes`.
    #[inline]
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The raw payload bytes.
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Number of payload bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl Layer for Payload<'_> {
    fn tag(&self) -> &'static str {
        "DATA"
    }

    fn title(&self) -> &'static str {
        "Data"
    }

    fn fields(&self) -> Vec<String> {
        self.bytes.chunks(BYTES_PER_LINE).map(dump_line).collect()
    }
}

/// Render up to 16 bytes as `hh hh ...` padded to a fixed width, followed by
/// the printable characters in quotes.
#[must_use]
pub fn dump_line(chunk: &[u8]) -> String {
    let hex: String = chunk
        .iter()
        .map(|byte| to_hex(&[*byte], HexStyle::Bare) + " ")
        .collect();
    let ascii: String = chunk.iter().map(|&byte| printable(byte)).collect();
    format!("{hex:<width$}'{ascii}'", width = HEX_WIDTH)
}

#[inline]
fn printable(byte: u8) -> char {
    if (ASCII_MIN..=ASCII_MAX).contains(&byte) {
        char::from(byte)
    } else {
        '.'
    }
}
