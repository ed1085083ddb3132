//! UDP datagram headers.
//!
//! ## Standards conformance
//!
//! Follows [RFC 768](https://www.ietf.org/rfc/rfc768.txt).
use crate::bits::{to_hex, HexStyle};
use crate::dump::Payload;
use crate::render::{field, Layer};
use crate::{ensure_len, Result};
use byteorder::{ByteOrder, NetworkEndian};

/// A UDP datagram.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Datagram<'a> {
    bytes: &'a [u8],
    payload: Option<Payload<'a>>,
}

impl<'a> Datagram<'a> {
    /// Create a new [`Datagram`] instance.
    ///
    /// # Errors
    ///
    /// Fails when the byte slice is shorter than [`HEADER_LEN`].
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        ensure_len("udp header", bytes, HEADER_LEN)?;
        let data = &bytes[offsets::PAYLOAD];
        let payload = (!data.is_empty()).then(|| Payload::new(data));
        Ok(Self { bytes, payload })
    }

    /// Get the source port.
    #[inline]
    #[must_use]
    pub fn source(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::SOURCE])
    }

    /// Get the destination port.
    #[inline]
    #[must_use]
    pub fn dest(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::DEST])
    }

    /// Get the length field, which covers the header and the payload.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::LEN])
    }

    /// Get the checksum.
    #[inline]
    #[must_use]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::CHECKSUM])
    }

    /// Get the payload, if there are any bytes after the header.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&Payload<'a>> {
        self.payload.as_ref()
    }
}

impl Layer for Datagram<'_> {
    fn tag(&self) -> &'static str {
        "UDP"
    }

    fn title(&self) -> &'static str {
        "UDP Header"
    }

    fn fields(&self) -> Vec<String> {
        vec![
            field("Source port", LABEL_WIDTH, self.source()),
            field("Destination port", LABEL_WIDTH, self.dest()),
            field("Length", LABEL_WIDTH, format!("{} bytes", self.len())),
            field(
                "Checksum",
                LABEL_WIDTH,
                to_hex(&self.bytes[offsets::CHECKSUM], HexStyle::Prefixed),
            ),
        ]
    }

    fn child(&self) -> Option<&dyn Layer> {
        self.payload.as_ref().map(|payload| payload as &dyn Layer)
    }
}

mod offsets {
    use std::ops::{Range, RangeFrom};
    pub(crate) const SOURCE: Range<usize> = 0..2;
    pub(crate) const DEST: Range<usize> = 2..4;
    pub(crate) const LEN: Range<usize> = 4..6;
    pub(crate) const CHECKSUM: Range<usize> = 6..8;
    pub(crate) const PAYLOAD: RangeFrom<usize> = 8..;
}

/// Size of the UDP header.
pub const HEADER_LEN: usize = 8;

// Width of the field labels in the rendered section.
const LABEL_WIDTH: usize = 16;
