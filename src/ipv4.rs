//! IPv4 packet headers.
//!
//! ## Standards conformance
//!
//! This implementation follows the [RFC
//! 791](https://datatracker.ietf.org/doc/html/rfc791) format as refined by [RFC
//! 2474](https://datatracker.ietf.org/doc/html/rfc2474) and [RFC
//! 3168](https://datatracker.ietf.org/doc/html/rfc3168).
//!
//! Specifically, it re-interprets the original type-of-service field as the
//! modern DSCP and ECN replacements. Options are skipped using the header
//! length field and are never parsed. The header checksum is reported as
//! stored.
use crate::bits::{
    split_bits, split_nibbles, to_dotted_decimal, to_hex, to_unsigned, HexStyle,
};
use crate::render::{field, Layer};
use crate::{ensure_len, icmp, tcp, udp, Error, Result};
use log::{debug, trace};
use std::net::Ipv4Addr;

/// An IPv4 packet.
///
/// The header is validated and the encapsulated transport header is decoded
/// when the packet is created. Field accessors read directly from the
/// validated bytes.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Packet<'a> {
    bytes: &'a [u8],
    transport: Option<Transport<'a>>,
}

impl<'a> Packet<'a> {
    /// Create a new IPv4 packet and decode the header it carries.
    ///
    /// # Errors
    ///
    /// Fails when the byte slice is shorter than [`HEADER_LEN`], when the
    /// header length field is below the minimum or points past the end of the
    /// slice, or when the transport header fails to decode.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        ensure_len("ipv4 header", bytes, HEADER_LEN)?;

        let header_len = header_len_of(bytes);
        if header_len < HEADER_LEN {
            return Err(Error::CannotParse("ipv4 header length below minimum"));
        }
        ensure_len("ipv4 options", bytes, header_len)?;

        let protocol = Protocol::from(bytes[offsets::PROTOCOL]);
        trace!("ipv4 header_len={header_len} protocol={protocol:?}");
        let transport = Transport::parse(protocol, &bytes[header_len..])?;

        Ok(Self { bytes, transport })
    }

    /// Extract the version.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u8 {
        split_nibbles(self.bytes[offsets::VERSION_IHL]).0
    }

    /// Length of the header in bytes. This is different from the raw field
    /// contained in the IP packet, which reports the length in increments of
    /// [`u32`].
    #[inline]
    #[must_use]
    pub fn header_len(&self) -> usize {
        header_len_of(self.bytes)
    }

    /// Extract the raw DSCP and ECN byte.
    #[inline]
    #[must_use]
    pub fn ds_field(&self) -> u8 {
        self.bytes[offsets::DS_FIELD]
    }

    /// Extract the differentiated services code point (DSCP).
    #[inline]
    #[must_use]
    pub fn dscp(&self) -> u8 {
        split_bits(self.ds_field(), DSCP_BITS).0
    }

    /// Extract the explicit congestion notification field (ECN).
    #[inline]
    #[must_use]
    pub fn ecn(&self) -> u8 {
        split_bits(self.ds_field(), DSCP_BITS).1
    }

    /// Extract the total length.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        to_unsigned(&self.bytes[offsets::LEN])
    }

    /// Extract the identification field.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        to_unsigned(&self.bytes[offsets::ID])
    }

    /// Extract the raw byte holding the flags and the top of the fragment
    /// offset.
    #[inline]
    #[must_use]
    pub fn flags_field(&self) -> u8 {
        self.bytes[offsets::FLAGS_FRAGMENT.start]
    }

    /// Extract the flags.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> Flags {
        Flags::new(split_bits(self.flags_field(), FLAG_BITS).0)
    }

    /// Extract the 13-bit fragment offset.
    #[inline]
    #[must_use]
    pub fn fragment_offset(&self) -> u32 {
        let (_, high) = split_bits(self.flags_field(), FLAG_BITS);
        let low = self.bytes[offsets::FLAGS_FRAGMENT.start + 1];
        to_unsigned(&[high, low])
    }

    /// Extract the time-to-live (TTL).
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> u8 {
        self.bytes[offsets::TTL]
    }

    /// Extract the protocol.
    #[inline]
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        Protocol::from(self.bytes[offsets::PROTOCOL])
    }

    /// Extract the header checksum.
    #[inline]
    #[must_use]
    pub fn checksum(&self) -> [u8; 2] {
        let checksum = &self.bytes[offsets::CHECKSUM];
        [checksum[0], checksum[1]]
    }

    /// Extract the source address.
    #[inline]
    #[must_use]
    pub fn source(&self) -> Ipv4Addr {
        self.address(offsets::SOURCE)
    }

    /// Extract the destination address.
    #[inline]
    #[must_use]
    pub fn dest(&self) -> Ipv4Addr {
        self.address(offsets::DEST)
    }

    /// Whether the packet has an options field or not.
    #[inline]
    #[must_use]
    pub fn has_options(&self) -> bool {
        self.header_len() > HEADER_LEN
    }

    /// Extract the options. You'll have to parse them yourself.
    #[inline]
    #[must_use]
    pub fn options(&self) -> Option<&'a [u8]> {
        self.has_options()
            .then(|| &self.bytes[HEADER_LEN..self.header_len()])
    }

    /// Extract the bytes following the header.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[self.header_len()..]
    }

    /// The decoded transport header, when the protocol is one this crate
    /// understands.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> Option<&Transport<'a>> {
        self.transport.as_ref()
    }

    fn address(&self, range: std::ops::Range<usize>) -> Ipv4Addr {
        let octets = &self.bytes[range];
        Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3])
    }
}

impl Layer for Packet<'_> {
    fn tag(&self) -> &'static str {
        "IP"
    }

    fn title(&self) -> &'static str {
        "IP Header"
    }

    fn fields(&self) -> Vec<String> {
        let flags = self.flags();
        let df = u8::from(flags.do_not_fragment());
        let mf = u8::from(flags.more_fragments());
        let protocol = self.transport.as_ref().map_or("unknown", Transport::name);

        vec![
            field("Version", LABEL_WIDTH, self.version()),
            field("Header length", LABEL_WIDTH, format!("{} bytes", self.header_len())),
            field(
                "DSCP and ECN field",
                LABEL_WIDTH,
                to_hex(&[self.ds_field()], HexStyle::Prefixed),
            ),
            format!("\txxxx xx.. = {} (DSCP)", self.dscp()),
            format!("\t.... ..xx = {} (ECN)", self.ecn()),
            field("Total length", LABEL_WIDTH, format!("{} bytes", self.len())),
            field("Identification", LABEL_WIDTH, self.id()),
            field(
                "Flags",
                LABEL_WIDTH,
                to_hex(&[self.flags_field()], HexStyle::Prefixed),
            ),
            format!(
                "\t.{df}.. .... = {} fragment",
                if df == 0 { "OK to" } else { "do not" }
            ),
            format!(
                "\t..{mf}. .... = {} fragment(s)",
                if mf == 0 { "last" } else { "more" }
            ),
            field(
                "Fragment offset",
                LABEL_WIDTH,
                format!("{} bytes", self.fragment_offset()),
            ),
            field(
                "Time to live",
                LABEL_WIDTH,
                format!("{} seconds/hops", self.ttl()),
            ),
            field(
                "Protocol",
                LABEL_WIDTH,
                format!("{} ({protocol})", u8::from(self.protocol())),
            ),
            field(
                "Header checksum",
                LABEL_WIDTH,
                to_hex(&self.checksum(), HexStyle::Prefixed),
            ),
            field(
                "Source address",
                LABEL_WIDTH,
                to_dotted_decimal(&self.source().octets()),
            ),
            field(
                "Destination address",
                LABEL_WIDTH,
                to_dotted_decimal(&self.dest().octets()),
            ),
            if self.has_options() {
                "Has options".to_string()
            } else {
                "No options".to_string()
            },
        ]
    }

    fn child(&self) -> Option<&dyn Layer> {
        self.transport.as_ref().map(|transport| transport as &dyn Layer)
    }
}

/// The protocol field of an IPv4 header.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Protocol {
    Icmp,
    Tcp,
    Udp,
    Unknown(u8),
}

impl From<u8> for Protocol {
    fn from(value: u8) -> Self {
        match value {
            PROTOCOL_ICMP => Protocol::Icmp,
            PROTOCOL_TCP => Protocol::Tcp,
            PROTOCOL_UDP => Protocol::Udp,
            _ => Protocol::Unknown(value),
        }
    }
}

impl From<Protocol> for u8 {
    fn from(value: Protocol) -> Self {
        match value {
            Protocol::Icmp => PROTOCOL_ICMP,
            Protocol::Tcp => PROTOCOL_TCP,
            Protocol::Udp => PROTOCOL_UDP,
            Protocol::Unknown(code) => code,
        }
    }
}

/// The header encapsulated by an IPv4 packet.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Transport<'a> {
    Icmp(icmp::Message<'a>),
    Tcp(tcp::Segment<'a>),
    Udp(udp::Datagram<'a>),
}

impl<'a> Transport<'a> {
    /// Decode the header selected by `protocol` from `bytes`. Unknown
    /// protocols decode to `None`.
    ///
    /// # Errors
    ///
    /// Fails when the selected header does not fit in `bytes`.
    pub fn parse(protocol: Protocol, bytes: &'a [u8]) -> Result<Option<Self>> {
        let transport = match protocol {
            Protocol::Icmp => Transport::Icmp(icmp::Message::new(bytes)?),
            Protocol::Tcp => Transport::Tcp(tcp::Segment::new(bytes)?),
            Protocol::Udp => Transport::Udp(udp::Datagram::new(bytes)?),
            Protocol::Unknown(code) => {
                debug!("ipv4 protocol {code} not decoded");
                return Ok(None);
            }
        };
        debug!("decoded {} header over {} bytes", transport.name(), bytes.len());
        Ok(Some(transport))
    }

    /// Short protocol name, also used as the section tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.layer().tag()
    }

    fn layer(&self) -> &dyn Layer {
        match self {
            Transport::Icmp(message) => message,
            Transport::Tcp(segment) => segment,
            Transport::Udp(datagram) => datagram,
        }
    }
}

impl Layer for Transport<'_> {
    fn tag(&self) -> &'static str {
        self.layer().tag()
    }

    fn title(&self) -> &'static str {
        self.layer().title()
    }

    fn fields(&self) -> Vec<String> {
        self.layer().fields()
    }

    fn child(&self) -> Option<&dyn Layer> {
        self.layer().child()
    }
}

/// Strongly typed wrapper for the 3-bit "flags" group of the IP header.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Flags {
    data: u8,
}

impl Flags {
    /// Create a new [`Flags`] instance from the right-aligned 3-bit group.
    #[inline]
    #[must_use]
    pub fn new(data: u8) -> Self {
        Self { data: data & 0b111 }
    }

    /// The right-aligned 3-bit group.
    #[inline]
    #[must_use]
    pub fn bits(&self) -> u8 {
        self.data
    }

    /// The reserved, always-zero bit.
    #[inline]
    #[must_use]
    pub fn reserved(&self) -> bool {
        crate::bitset(self.data, 2)
    }

    /// True when the packet should not be fragmented.
    #[inline]
    #[must_use]
    pub fn do_not_fragment(&self) -> bool {
        crate::bitset(self.data, 1)
    }

    /// True when more fragments of the datagram follow this one.
    #[inline]
    #[must_use]
    pub fn more_fragments(&self) -> bool {
        crate::bitset(self.data, 0)
    }
}

fn header_len_of(bytes: &[u8]) -> usize {
    usize::from(split_nibbles(bytes[offsets::VERSION_IHL]).1) * 4
}

mod offsets {
    use std::ops::Range;
    pub(crate) const VERSION_IHL: usize = 0;
    pub(crate) const DS_FIELD: usize = 1;
    pub(crate) const LEN: Range<usize> = 2..4;
    pub(crate) const ID: Range<usize> = 4..6;
    pub(crate) const FLAGS_FRAGMENT: Range<usize> = 6..8;
    pub(crate) const TTL: usize = 8;
    pub(crate) const PROTOCOL: usize = 9;
    pub(crate) const CHECKSUM: Range<usize> = 10..12;
    pub(crate) const SOURCE: Range<usize> = 12..16;
    pub(crate) const DEST: Range<usize> = 16..20;
}

/// Minimum length of an IPv4 header.
pub const HEADER_LEN: usize = 20;

// Width of the field labels in the rendered section.
const LABEL_WIDTH: usize = 19;

// The DS byte splits into 6 DSCP bits and 2 ECN bits.
const DSCP_BITS: u32 = 6;

// Byte 6 splits into 3 flag bits and the top 5 fragment offset bits.
const FLAG_BITS: u32 = 3;

const PROTOCOL_ICMP: u8 = 1;
const PROTOCOL_TCP: u8 = 6;
const PROTOCOL_UDP: u8 = 17;
