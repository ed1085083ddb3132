//! ICMP message headers.
//!
//! Only the type, code and checksum are decoded. The four "rest of header"
//! bytes depend on the message type and are exposed raw.
use crate::bits::{to_hex, HexStyle};
use crate::dump::Payload;
use crate::render::{field, Layer};
use crate::{ensure_len, Result};
use byteorder::{ByteOrder, NetworkEndian};

/// An ICMP message.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Message<'a> {
    bytes: &'a [u8],
    payload: Option<Payload<'a>>,
}

impl<'a> Message<'a> {
    /// Create a new ICMP message.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is smaller than the minimum ICMP header size.
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        ensure_len("icmp header", bytes, HEADER_LEN)?;
        let data = &bytes[offsets::PAYLOAD];
        let payload = (!data.is_empty()).then(|| Payload::new(data));
        Ok(Self { bytes, payload })
    }

    /// Extract the "type" header field.
    #[inline]
    #[must_use]
    pub fn typ(&self) -> IcmpType {
        IcmpType::from(self.bytes[offsets::TYPE])
    }

    /// Extract the "code" header field.
    #[inline]
    #[must_use]
    pub fn code(&self) -> u8 {
        self.bytes[offsets::CODE]
    }

    /// Extract the header checksum.
    #[inline]
    #[must_use]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::CHECKSUM])
    }

    /// Extract the type-specific "rest of header" bytes.
    #[inline]
    #[must_use]
    pub fn rest_of_header(&self) -> [u8; 4] {
        let rest = &self.bytes[offsets::REST];
        [rest[0], rest[1], rest[2], rest[3]]
    }

    /// Get a reference to the payload, if there are any bytes after the
    /// header.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&Payload<'a>> {
        self.payload.as_ref()
    }
}

impl Layer for Message<'_> {
    fn tag(&self) -> &'static str {
        "ICMP"
    }

    fn title(&self) -> &'static str {
        "ICMP Header"
    }

    fn fields(&self) -> Vec<String> {
        let typ = self.typ();
        vec![
            field(
                "Type",
                LABEL_WIDTH,
                format!("{} ({})", u8::from(typ), typ.name()),
            ),
            field("Code", LABEL_WIDTH, self.code()),
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

/// ICMP message types with a name in the report.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum IcmpType {
    EchoReply,
    DestinationUnreachable,
    SourceQuench,
    Redirect,
    EchoRequest,
    RouterAdvertisement,
    RouterSolicitation,
    TimeExceeded,
    Traceroute,
    Unknown(u8),
}

impl IcmpType {
    /// Human-readable name of the message type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            IcmpType::EchoReply => "Echo reply",
            IcmpType::DestinationUnreachable => "Destination unreachable",
            IcmpType::SourceQuench => "Source Quench",
            IcmpType::Redirect => "Redirect message",
            IcmpType::EchoRequest => "Echo request",
            IcmpType::RouterAdvertisement => "Router advertisement",
            IcmpType::RouterSolicitation => "Router solicitation",
            IcmpType::TimeExceeded => "Time exceeded",
            IcmpType::Traceroute => "Traceroute",
            IcmpType::Unknown(_) => "Unknown",
        }
    }
}

impl From<u8> for IcmpType {
    fn from(value: u8) -> Self {
        match value {
            0 => IcmpType::EchoReply,
            3 => IcmpType::DestinationUnreachable,
            4 => IcmpType::SourceQuench,
            5 => IcmpType::Redirect,
            8 => IcmpType::EchoRequest,
            9 => IcmpType::RouterAdvertisement,
            10 => IcmpType::RouterSolicitation,
            11 => IcmpType::TimeExceeded,
            30 => IcmpType::Traceroute,
            _ => IcmpType::Unknown(value),
        }
    }
}

impl From<IcmpType> for u8 {
    fn from(value: IcmpType) -> Self {
        match value {
            IcmpType::EchoReply => 0,
            IcmpType::DestinationUnreachable => 3,
            IcmpType::SourceQuench => 4,
            IcmpType::Redirect => 5,
            IcmpType::EchoRequest => 8,
            IcmpType::RouterAdvertisement => 9,
            IcmpType::RouterSolicitation => 10,
            IcmpType::TimeExceeded => 11,
            IcmpType::Traceroute => 30,
            IcmpType::Unknown(value) => value,
        }
    }
}

mod offsets {
    use std::ops::{Range, RangeFrom};
    pub(crate) const TYPE: usize = 0;
    pub(crate) const CODE: usize = 1;
    pub(crate) const CHECKSUM: Range<usize> = 2..4;
    pub(crate) const REST: Range<usize> = 4..8;
    pub(crate) const PAYLOAD: RangeFrom<usize> = 8..;
}

/// Size of the fixed ICMP header, including the rest-of-header word.
pub const HEADER_LEN: usize = 8;

// Width of the field labels in the rendered section.
const LABEL_WIDTH: usize = 8;

#[cfg(test)]
mod tests {
    use super::{IcmpType, Message};
    use crate::enet::Frame;
    use crate::ipv4::{Packet, Transport};
    use crate::render::Layer;
    use crate::Error;

    // Echo request with a 32 byte payload, 10.0.0.2 to 8.8.8.8.
    const ENET_IPV4_ICMP: &[u8] = include_bytes!("../resources/enet-ipv4-icmp.bin");

    fn message(frame: &[u8]) -> Result<Message<'_>, Error> {
        let frame = Frame::new(frame)?;
        let packet = Packet::new(frame.payload())?;
        Message::new(packet.payload())
    }

    #[test]
    fn new_returns_err_when_buffer_too_short() {
        let message = Message::new(&[8, 0, 0, 0]);
        assert!(matches!(
            message,
            Err(Error::Truncated { layer: "icmp header", needed: 8, available: 4 })
        ));
    }

    #[test]
    fn message_has_expected_fields() -> Result<(), Box<dyn std::error::Error>> {
        let message = message(ENET_IPV4_ICMP)?;
        assert_eq!(message.typ(), IcmpType::EchoRequest);
        assert_eq!(message.code(), 0);
        assert_eq!(message.checksum(), 0x4d54);
        assert_eq!(message.rest_of_header(), [0, 1, 0, 7]);
        Ok(())
    }

    #[test]
    fn message_has_expected_payload() -> Result<(), Box<dyn std::error::Error>> {
        let message = message(ENET_IPV4_ICMP)?;
        let payload = message.payload().ok_or("missing payload")?;
        assert_eq!(payload.bytes(), b"abcdefghijklmnopqrstuvwabcdefghi");
        assert_eq!(payload.fields().len(), 2);
        Ok(())
    }

    #[test]
    fn message_renders_expected_fields() -> Result<(), Box<dyn std::error::Error>> {
        let message = message(ENET_IPV4_ICMP)?;
        assert_eq!(
            message.fields(),
            vec![
                "Type     = 8 (Echo request)",
                "Code     = 0",
                "Checksum = 0x4d54",
            ]
        );
        Ok(())
    }

    #[test]
    fn header_only_message_has_no_payload() -> Result<(), Box<dyn std::error::Error>> {
        let message = Message::new(&[0, 0, 0xff, 0xff, 0, 1, 0, 1])?;
        assert_eq!(message.typ(), IcmpType::EchoReply);
        assert!(message.payload().is_none());
        assert!(message.child().is_none());
        Ok(())
    }

    #[test]
    fn unknown_type_is_named_unknown() {
        let typ = IcmpType::from(42);
        assert_eq!(typ, IcmpType::Unknown(42));
        assert_eq!(typ.name(), "Unknown");
        assert_eq!(u8::from(typ), 42);
    }

    #[test]
    fn type_names_match_report_text() {
        assert_eq!(IcmpType::from(0).name(), "Echo reply");
        assert_eq!(IcmpType::from(4).name(), "Source Quench");
        assert_eq!(IcmpType::from(11).name(), "Time exceeded");
    }

    #[test]
    fn known_types_round_trip() {
        for code in [0u8, 3, 4, 5, 8, 9, 10, 11, 30] {
            let typ = IcmpType::from(code);
            assert_ne!(typ.name(), "Unknown");
            assert_eq!(u8::from(typ), code);
        }
    }

    #[test]
    fn message_is_reachable_through_ipv4() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(ENET_IPV4_ICMP)?;
        let packet = Packet::new(frame.payload())?;
        assert!(matches!(packet.transport(), Some(Transport::Icmp(_))));
        Ok(())
    }
}
