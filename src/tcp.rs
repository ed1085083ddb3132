//! TCP segment headers.
//!
//! # Standards conformance
//!
//! Follows [RFC
//! 9293](https://www.rfc-editor.org/rfc/rfc9293.html#name-functional-specification),
//! with the experimental NS bit of [RFC
//! 3540](https://www.rfc-editor.org/rfc/rfc3540) shown alongside the eight
//! control bits.
use crate::bits::{
    concat_bytes, split_bits, split_nibbles, to_bit_array, to_hex, to_unsigned,
    to_unsigned_wide, HexStyle,
};
use crate::dump::Payload;
use crate::render::{field, Layer};
use crate::{ensure_len, Error, Result};
use byteorder::{ByteOrder, NetworkEndian};

/// A TCP segment.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Segment<'a> {
    bytes: &'a [u8],
    payload: Option<Payload<'a>>,
}

impl<'a> Segment<'a> {
    /// Create a new TCP segment.
    ///
    /// Anything past the data offset is kept as the payload, as long as the
    /// segment is longer than the minimum header. The data offset is trusted
    /// and not checked against the IPv4 total length.
    ///
    /// # Errors
    ///
    /// Fails when the buffer is smaller than the minimum TCP header size, or
    /// when the data offset is below the minimum or points past the end of
    /// the buffer.
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        ensure_len("tcp header", bytes, HEADER_LEN)?;

        let data_offset = data_offset_of(bytes);
        if data_offset < HEADER_LEN {
            return Err(Error::CannotParse("tcp data offset below minimum"));
        }

        let payload = if bytes.len() > HEADER_LEN {
            ensure_len("tcp options", bytes, data_offset)?;
            Some(Payload::new(&bytes[data_offset..]))
        } else {
            None
        };

        Ok(Self { bytes, payload })
    }

    /// Extract the source port.
    #[inline]
    #[must_use]
    pub fn source(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::SOURCE])
    }

    /// Extract the destination port.
    #[inline]
    #[must_use]
    pub fn dest(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::DEST])
    }

    /// Extract the sequence number.
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u32 {
        to_unsigned(&self.bytes[offsets::SEQUENCE])
    }

    /// Extract the acknowledgment number.
    #[inline]
    #[must_use]
    pub fn acked(&self) -> u64 {
        to_unsigned_wide(&self.bytes[offsets::ACKED])
    }

    /// Extract the data offset in bytes. The raw field counts [`u32`] words.
    #[inline]
    #[must_use]
    pub fn data_offset(&self) -> usize {
        data_offset_of(self.bytes)
    }

    /// Extract the nonce sum (NS) bit.
    #[inline]
    #[must_use]
    pub fn ns(&self) -> u8 {
        let (_, rest) = split_nibbles(self.bytes[offsets::DATA_OFFSET]);
        // The low nibble is 3 reserved bits followed by NS.
        split_bits(rest, NS_SPLIT).1
    }

    /// Extract the control bit flags.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> Flags {
        Flags::from(self.bytes[offsets::FLAGS])
    }

    /// NS and the eight control bits as one value, e.g. `0x0012` for a
    /// SYN-ACK.
    #[inline]
    #[must_use]
    pub fn flags_summary(&self) -> Vec<u8> {
        concat_bytes(&[&[self.ns()], &[self.bytes[offsets::FLAGS]]])
    }

    /// Extract the window size.
    #[inline]
    #[must_use]
    pub fn window(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::WINDOW])
    }

    /// Extract the segment checksum.
    #[inline]
    #[must_use]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::CHECKSUM])
    }

    /// Extract the urgent pointer.
    #[inline]
    #[must_use]
    pub fn urgent(&self) -> u16 {
        NetworkEndian::read_u16(&self.bytes[offsets::URGENT])
    }

    /// Whether the header carries options.
    #[inline]
    #[must_use]
    pub fn has_options(&self) -> bool {
        self.data_offset() > HEADER_LEN
    }

    /// Bytes past the data offset, if the segment is longer than the minimum
    /// header.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&Payload<'a>> {
        self.payload.as_ref()
    }
}

impl Layer for Segment<'_> {
    fn tag(&self) -> &'static str {
        "TCP"
    }

    fn title(&self) -> &'static str {
        "TCP Header"
    }

    fn fields(&self) -> Vec<String> {
        let mut lines = vec![
            field("Source port", LABEL_WIDTH, self.source()),
            field("Destination port", LABEL_WIDTH, self.dest()),
            field("Sequence number", LABEL_WIDTH, self.sequence()),
            field("Acknowledgement number", LABEL_WIDTH, self.acked()),
            field(
                "Data offset",
                LABEL_WIDTH,
                format!("{} bytes", self.data_offset()),
            ),
            field(
                "Flags",
                LABEL_WIDTH,
                to_hex(&self.flags_summary(), HexStyle::Prefixed),
            ),
            flag_line(&format!("{} .... ....", self.ns()), self.ns(), "NS"),
        ];

        let bits = self.flags().bits();
        lines.extend(FLAG_NAMES.iter().enumerate().map(|(i, name)| {
            let bit = bits[i];
            flag_line(&flag_pattern(i, bit), bit, name)
        }));

        lines.extend([
            field("Window", LABEL_WIDTH, self.window()),
            field(
                "Checksum",
                LABEL_WIDTH,
                to_hex(&self.bytes[offsets::CHECKSUM], HexStyle::Prefixed),
            ),
            field(
                "Urgent pointer",
                LABEL_WIDTH,
                to_hex(&self.bytes[offsets::URGENT], HexStyle::Prefixed),
            ),
            if self.has_options() {
                "Has options".to_string()
            } else {
                "No options".to_string()
            },
        ]);
        lines
    }

    fn child(&self) -> Option<&dyn Layer> {
        self.payload.as_ref().map(|payload| payload as &dyn Layer)
    }
}

// `\t<pattern> = [No ]<name> pointer`
fn flag_line(pattern: &str, bit: u8, name: &str) -> String {
    let no = if bit == 0 { "No " } else { "" };
    format!("\t{pattern} = {no}{name} pointer")
}

// Position-aligned rendering of control bit `i` of byte 13, behind the NS
// column, e.g. `. ..1. ....` for URG.
fn flag_pattern(i: usize, bit: u8) -> String {
    let mut cells: Vec<String> = (0..8).map(|_| ".".to_string()).collect();
    cells[i] = bit.to_string();
    format!(". {} {}", cells[..4].concat(), cells[4..].concat())
}

/// TCP control bit flags, in header order.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Flags {
    cwr: bool,
    ece: bool,
    urg: bool,
    ack: bool,
    psh: bool,
    rst: bool,
    syn: bool,
    fin: bool,
}

impl Flags {
    /// Whether the congestion window reduced flag is set.
    #[inline]
    #[must_use]
    pub fn congestion_window_reduced(&self) -> bool {
        self.cwr
    }

    /// Whether the ECN echo flag is set.
    #[inline]
    #[must_use]
    pub fn ecn_echo(&self) -> bool {
        self.ece
    }

    /// Whether the urgent significant flag is set.
    #[inline]
    #[must_use]
    pub fn urgent_significant(&self) -> bool {
        self.urg
    }

    /// Whether the ack significant flag is set.
    #[inline]
    #[must_use]
    pub fn ack_significant(&self) -> bool {
        self.ack
    }

    /// Whether the push flag is set.
    #[inline]
    #[must_use]
    pub fn push(&self) -> bool {
        self.psh
    }

    /// Whether the reset connection flag is set.
    #[inline]
    #[must_use]
    pub fn reset_conn(&self) -> bool {
        self.rst
    }

    /// Whether the synchronize sequence numbers flag is set.
    #[inline]
    #[must_use]
    pub fn synchronize(&self) -> bool {
        self.syn
    }

    /// Whether the finish flag is set.
    #[inline]
    #[must_use]
    pub fn finished(&self) -> bool {
        self.fin
    }

    /// The flags as 0/1 values in header order: CWR, ECE, URG, ACK, PSH,
    /// RST, SYN, FIN.
    #[must_use]
    pub fn bits(&self) -> [u8; 8] {
        [
            self.cwr, self.ece, self.urg, self.ack, self.psh, self.rst, self.syn, self.fin,
        ]
        .map(u8::from)
    }
}

impl From<u8> for Flags {
    fn from(value: u8) -> Self {
        let bits = to_bit_array(&[value]);
        Self {
            cwr: bits[0] == 1,
            ece: bits[1] == 1,
            urg: bits[2] == 1,
            ack: bits[3] == 1,
            psh: bits[4] == 1,
            rst: bits[5] == 1,
            syn: bits[6] == 1,
            fin: bits[7] == 1,
        }
    }
}

fn data_offset_of(bytes: &[u8]) -> usize {
    usize::from(split_nibbles(bytes[offsets::DATA_OFFSET]).0) * 4
}

mod offsets {
    use std::ops::Range;
    pub(crate) const SOURCE: Range<usize> = 0..2;
    pub(crate) const DEST: Range<usize> = 2..4;
    pub(crate) const SEQUENCE: Range<usize> = 4..8;
    pub(crate) const ACKED: Range<usize> = 8..12;
    pub(crate) const DATA_OFFSET: usize = 12;
    pub(crate) const FLAGS: usize = 13;
    pub(crate) const WINDOW: Range<usize> = 14..16;
    pub(crate) const CHECKSUM: Range<usize> = 16..18;
    pub(crate) const URGENT: Range<usize> = 18..20;
}

/// Minimum length of a TCP header.
pub const HEADER_LEN: usize = 20;

// Width of the field labels in the rendered section.
const LABEL_WIDTH: usize = 22;

// The low nibble of byte 12 splits into 3 reserved bits and NS.
const NS_SPLIT: u32 = 7;

const FLAG_NAMES: [&str; 8] = ["CWR", "ECE", "URG", "ACK", "PSH", "RST", "SYN", "FIN"];

#[cfg(test)]
mod tests {
    use super::{Flags, Segment};
    use crate::enet::Frame;
    use crate::ipv4::{self, Transport};
    use crate::render::Layer;
    use crate::Error;

    const ENET_IPV4_TCP: &[u8] = include_bytes!("../resources/enet-ipv4-tcp.bin");

    fn segment(frame: &[u8]) -> Result<Segment<'_>, Error> {
        let frame = Frame::new(frame)?;
        Segment::new(&frame.payload()[ipv4::HEADER_LEN..])
    }

    // Minimal header with the given data offset/NS byte and control bits.
    fn header(offset_ns: u8, flags: u8) -> [u8; 20] {
        let mut bytes = [0; 20];
        bytes[12] = offset_ns;
        bytes[13] = flags;
        bytes
    }

    #[test]
    fn new_returns_err_when_buffer_too_short() {
        let segment = Segment::new(&[0, 0, 0]);
        assert!(matches!(segment, Err(Error::Truncated { needed: 20, .. })));
    }

    #[test]
    fn new_returns_err_when_data_offset_below_minimum() {
        assert_eq!(
            Segment::new(&header(0x40, 0)),
            Err(Error::CannotParse("tcp data offset below minimum"))
        );
    }

    #[test]
    fn new_returns_err_when_data_offset_past_end() {
        let mut bytes = [0; 24];
        bytes[12] = 0x80;
        assert!(matches!(
            Segment::new(&bytes),
            Err(Error::Truncated { needed: 32, available: 24, .. })
        ));
    }

    #[test]
    fn segment_has_expected_ports() -> Result<(), Box<dyn std::error::Error>> {
        let segment = segment(ENET_IPV4_TCP)?;
        assert_eq!(segment.source(), 443);
        assert_eq!(segment.dest(), 52138);
        Ok(())
    }

    #[test]
    fn segment_has_expected_sequence_and_ack() -> Result<(), Box<dyn std::error::Error>> {
        let segment = segment(ENET_IPV4_TCP)?;
        assert_eq!(segment.sequence(), 2_433_487_296);
        assert_eq!(segment.acked(), 4_135_257_849);
        Ok(())
    }

    #[test]
    fn segment_has_expected_data_offset() -> Result<(), Box<dyn std::error::Error>> {
        let segment = segment(ENET_IPV4_TCP)?;
        assert_eq!(segment.data_offset(), 32);
        assert!(segment.has_options());
        Ok(())
    }

    #[test]
    fn segment_has_expected_flags() -> Result<(), Box<dyn std::error::Error>> {
        let segment = segment(ENET_IPV4_TCP)?;

        assert_eq!(
            segment.flags(),
            Flags {
                cwr: false,
                ece: false,
                urg: false,
                ack: true,
                psh: true,
                rst: false,
                syn: false,
                fin: false,
            }
        );
        assert_eq!(segment.ns(), 0);
        assert_eq!(segment.flags_summary(), vec![0x00, 0x18]);
        Ok(())
    }

    #[test]
    fn segment_has_expected_trailer_fields() -> Result<(), Box<dyn std::error::Error>> {
        let segment = segment(ENET_IPV4_TCP)?;
        assert_eq!(segment.window(), 501);
        assert_eq!(segment.checksum(), 0x82fd);
        assert_eq!(segment.urgent(), 0);
        Ok(())
    }

    #[test]
    fn segment_payload_starts_at_data_offset() -> Result<(), Box<dyn std::error::Error>> {
        let segment = segment(ENET_IPV4_TCP)?;
        let payload = segment.payload().ok_or("missing payload")?;
        assert!(payload.bytes().starts_with(b"GET / HTTP/1.1\r\n"));
        assert_eq!(payload.len(), 37);
        Ok(())
    }

    #[test]
    fn minimal_segment_has_no_payload() -> Result<(), Box<dyn std::error::Error>> {
        let bytes = header(0x50, 0);
        let segment = Segment::new(&bytes)?;
        assert!(segment.payload().is_none());
        assert!(segment.child().is_none());
        assert!(!segment.has_options());
        Ok(())
    }

    #[test]
    fn ns_bit_comes_from_low_bit_of_byte_twelve() -> Result<(), Box<dyn std::error::Error>> {
        let bytes = header(0x51, 0x12);
        let segment = Segment::new(&bytes)?;
        assert_eq!(segment.ns(), 1);
        assert_eq!(segment.flags_summary(), vec![0x01, 0x12]);
        assert!(segment.flags().synchronize());
        assert!(segment.flags().ack_significant());
        Ok(())
    }

    #[test]
    fn segment_renders_expected_fields() -> Result<(), Box<dyn std::error::Error>> {
        let segment = segment(ENET_IPV4_TCP)?;
        assert_eq!(
            segment.fields(),
            vec![
                "Source port            = 443",
                "Destination port       = 52138",
                "Sequence number        = 2433487296",
                "Acknowledgement number = 4135257849",
                "Data offset            = 32 bytes",
                "Flags                  = 0x0018",
                "\t0 .... .... = No NS pointer",
                "\t. 0... .... = No CWR pointer",
                "\t. .0.. .... = No ECE pointer",
                "\t. ..0. .... = No URG pointer",
                "\t. ...1 .... = ACK pointer",
                "\t. .... 1... = PSH pointer",
                "\t. .... .0.. = No RST pointer",
                "\t. .... ..0. = No SYN pointer",
                "\t. .... ...0 = No FIN pointer",
                "Window                 = 501",
                "Checksum               = 0x82fd",
                "Urgent pointer         = 0x0000",
                "Has options",
            ]
        );
        Ok(())
    }

    #[test]
    fn segment_is_reachable_through_ipv4() -> Result<(), Box<dyn std::error::Error>> {
        let frame = Frame::new(ENET_IPV4_TCP)?;
        let packet = ipv4::Packet::new(frame.payload())?;
        match packet.transport() {
            Some(Transport::Tcp(segment)) => assert_eq!(segment.source(), 443),
            other => panic!("expected tcp, got {other:?}"),
        }
        Ok(())
    }
}
