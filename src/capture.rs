//! Whole-frame decoding.
use crate::enet::{EtherType, Frame, LengthType};
use crate::render::{sections, Report};
use crate::{ipv4, Result};
use log::debug;

/// A decoded frame: the Ethernet header and, when the frame carries IPv4, the
/// IPv4 packet with everything it encapsulates.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Capture<'a> {
    frame: Frame<'a>,
    packet: Option<ipv4::Packet<'a>>,
}

impl<'a> Capture<'a> {
    /// Decode a raw frame.
    ///
    /// The network layer is only decoded when the Ethernet length/type field
    /// says the frame carries IPv4. Other frames decode to their link header
    /// alone, whatever bytes follow it.
    ///
    /// # Errors
    ///
    /// Fails when the frame is shorter than an Ethernet header, or when a
    /// layer that is decoded does not fit in the bytes that remain.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let frame = Frame::new(bytes)?;
        let length_type = frame.length_type();
        debug!(
            "frame of {} bytes, length/type {:#06x} ({})",
            frame.len(),
            frame.length_type_field(),
            length_type.label()
        );

        let packet = match length_type {
            LengthType::Type(EtherType::Ipv4) => Some(ipv4::Packet::new(frame.payload())?),
            _ => None,
        };

        Ok(Self { frame, packet })
    }

    /// The Ethernet header.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> &Frame<'a> {
        &self.frame
    }

    /// The IPv4 packet, when the frame carries one.
    #[inline]
    #[must_use]
    pub fn packet(&self) -> Option<&ipv4::Packet<'a>> {
        self.packet.as_ref()
    }

    /// Render every decoded layer, outermost first.
    #[must_use]
    pub fn report(&self) -> Report {
        let mut rendered = sections(&self.frame);
        if let Some(packet) = &self.packet {
            rendered.extend(sections(packet));
        }
        Report::new(rendered)
    }
}
