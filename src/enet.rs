//! Ethernet II frame headers.
//!
//! ## Standards conformance
//!
//! Follows the framing of the [IEEE Standard for
//! Ethernet](https://standards.ieee.org/ieee/802.3/10422/). The preamble, start
//! frame delimiter and frame check sequence are not part of a captured frame
//! and are not decoded.
use crate::bits::{to_hex, HexStyle};
use crate::render::{field, Layer};
use crate::{ensure_len, Result};
use byteorder::{ByteOrder, NetworkEndian};
use std::fmt;

/// An Ethernet frame.
///
/// This struct wraps the frame bytes directly. The length is checked once in
/// [`Frame::new`] and the accessors read the fixed header offsets after that.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Frame<'a> {
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Create a new Ethernet frame.
    ///
    /// # Errors
    ///
    /// Fails when the byte slice is shorter than [`HEADER_LEN`], but does no
    /// other validation.
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        ensure_len("ethernet header", bytes, HEADER_LEN)?;
        Ok(Self { bytes })
    }

    /// Extract the destination MAC address.
    #[inline]
    #[must_use]
    pub fn dest(&self) -> MacAddr {
        MacAddr::from(self.octets(offsets::DEST))
    }

    /// Extract the source MAC address.
    #[inline]
    #[must_use]
    pub fn source(&self) -> MacAddr {
        MacAddr::from(self.octets(offsets::SOURCE))
    }

    /// Extract the raw length/type field.
    #[inline]
    #[must_use]
    pub fn length_type_field(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::LENGTH_TYPE])
    }

    /// Extract the length/type field.
    ///
    /// The value represents the length of the client data if it's value is
    /// less than or equal to 1500, and an [`EtherType`] for the types this
    /// crate knows about.
    #[inline]
    #[must_use]
    pub fn length_type(&self) -> LengthType {
        LengthType::new(self.length_type_field())
    }

    /// Extract the client data field.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[offsets::PAYLOAD]
    }

    /// Total length of the frame.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    fn octets(&self, range: std::ops::Range<usize>) -> [u8; 6] {
        let mut octets = [0; 6];
        octets.copy_from_slice(&self.bytes[range]);
        octets
    }
}

impl Layer for Frame<'_> {
    fn tag(&self) -> &'static str {
        "ETHER"
    }

    fn title(&self) -> &'static str {
        "Ether Header"
    }

    fn fields(&self) -> Vec<String> {
        let length_type = &self.bytes[offsets::LENGTH_TYPE];
        vec![
            field("Packet size", LABEL_WIDTH, format!("{} bytes", self.len())),
            field("Destination", LABEL_WIDTH, self.dest()),
            field("Source", LABEL_WIDTH, self.source()),
            field(
                "Ethertype",
                LABEL_WIDTH,
                format!(
                    "{} ({})",
                    to_hex(length_type, HexStyle::Bare),
                    self.length_type().label()
                ),
            ),
        ]
    }
}

mod offsets {
    use std::ops::{Range, RangeFrom};
    pub(crate) const DEST: Range<usize> = 0..6;
    pub(crate) const SOURCE: Range<usize> = 6..12;
    pub(crate) const LENGTH_TYPE: Range<usize> = 12..14;
    pub(crate) const PAYLOAD: RangeFrom<usize> = 14..;
}

/// The Ethernet header has a "length/type" field which represents either the
/// length of the client data or an [`EtherType`] depending on the value.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum LengthType {
    Type(EtherType),
    Length(u16),
    Unknown(u16),
}

impl LengthType {
    /// Resolve a raw length/type value. Known EtherTypes win, then anything up
    /// to 1500 is a length, and everything else is unknown.
    #[inline]
    #[must_use]
    pub fn new(value: u16) -> Self {
        match value {
            ETHERTYPE_IPV4 => LengthType::Type(EtherType::Ipv4),
            ETHERTYPE_ARP => LengthType::Type(EtherType::Arp),
            len if len <= MAX_LENTYPE_LEN => LengthType::Length(len),
            _ => LengthType::Unknown(value),
        }
    }

    /// Human-readable name shown next to the raw field.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            LengthType::Type(EtherType::Ipv4) => "IP",
            LengthType::Type(EtherType::Arp) => "ARP",
            LengthType::Length(_) => "Length Field",
            LengthType::Unknown(_) => "Unknown Type",
        }
    }
}

/// EtherTypes with a name in the report. Only [`EtherType::Ipv4`] frames are
/// decoded further.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum EtherType {
    Arp,
    Ipv4,
}

impl From<EtherType> for u16 {
    fn from(value: EtherType) -> Self {
        match value {
            EtherType::Arp => ETHERTYPE_ARP,
            EtherType::Ipv4 => ETHERTYPE_IPV4,
        }
    }
}

/// A MAC address.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct MacAddr {
    octets: [u8; 6],
}

impl MacAddr {
    /// Create a new [`MacAddr`] instance.
    #[inline]
    #[must_use]
    pub fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            octets: [a, b, c, d, e, f],
        }
    }

    /// The address bytes in transmission order.
    #[inline]
    #[must_use]
    pub fn octets(&self) -> [u8; 6] {
        self.octets
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        MacAddr { octets }
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex(&self.octets, HexStyle::Colon))
    }
}

/// Size of the Ethernet header.
pub const HEADER_LEN: usize = 14;

// Width of the field labels in the rendered section.
const LABEL_WIDTH: usize = 11;

// When the length/type field is at or below this value it is considered a length.
const MAX_LENTYPE_LEN: u16 = 1500;

// EtherType code for IPv4.
const ETHERTYPE_IPV4: u16 = 0x800;

// EtherType code for ARP.
const ETHERTYPE_ARP: u16 = 0x806;
