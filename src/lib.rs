//! Decode a single captured network frame into a layered text report.
//!
//! A frame is decoded top down: the Ethernet header first, then the IPv4
//! header when the frame carries IP, then the TCP, UDP or ICMP header selected
//! by the IPv4 protocol field. Bytes left over after the last header are shown
//! as a hex and ASCII dump.
//!
//! ```no_run
//! let bytes = std::fs::read("frame.bin")?;
//! print!("{}", pktanalyzer::analyze(&bytes)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Decoding and rendering
//!
//! Decoding and rendering are separate steps. Every decoder validates the
//! length of its input once, in its constructor, and fails with
//! [`Error::Truncated`] or [`Error::CannotParse`] rather than panicking. After
//! that the decoded value is immutable and its field accessors index directly
//! into the validated bytes. Headers never copy their payload, they borrow it
//! from the frame.
//!
//! Rendering goes through the [`render::Layer`] trait, which each header
//! implements. [`Capture::report`] walks the decoded layers and returns a
//! [`render::Report`] whose [`Display`](std::fmt::Display) output is the final
//! text.
//!
//! Checksums are shown as stored and are never verified.
#![warn(clippy::pedantic)]
#![allow(clippy::double_must_use)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::module_name_repetitions)]

pub mod bits;
pub mod capture;
pub mod dump;
pub mod enet;
pub mod icmp;
pub mod ipv4;
pub mod render;
pub mod tcp;
pub mod udp;

pub use capture::Capture;

/// Utility wrapper for frame decoding results.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong when decoding a frame.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("truncated {layer}: needed {needed} bytes, got {available}")]
    Truncated {
        layer: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("cannot parse: {0}")]
    CannotParse(&'static str),
}

/// Decode `frame` and render the full report.
///
/// # Errors
///
/// Fails when any decoded layer is shorter than its header claims. No partial
/// report is produced in that case.
pub fn analyze(frame: &[u8]) -> Result<String> {
    Ok(Capture::parse(frame)?.report().to_string())
}

// Fail with [`Error::Truncated`] unless `bytes` holds at least `needed` bytes.
#[inline]
pub(crate) fn ensure_len(layer: &'static str, bytes: &[u8], needed: usize) -> Result<()> {
    if bytes.len() >= needed {
        Ok(())
    } else {
        Err(Error::Truncated {
            layer,
            needed,
            available: bytes.len(),
        })
    }
}

// Check if the nth bit is set
#[inline]
#[must_use]
pub(crate) fn bitset(byte: u8, n: usize) -> bool {
    byte & (1 << n) != 0
}

#[cfg(test)]
mod tests {
    use super::{bitset, ensure_len, Error};

    #[test]
    fn bitset_returns_expected_value() {
        assert!(bitset(0b0000_0100, 2));
        assert!(!bitset(0b0000_0100, 3));
    }

    #[test]
    fn ensure_len_reports_shortfall() {
        assert_eq!(ensure_len("test", &[0; 4], 4), Ok(()));
        assert_eq!(
            ensure_len("test", &[0; 3], 4),
            Err(Error::Truncated {
                layer: "test",
                needed: 4,
                available: 3,
            })
        );
    }

    #[test]
    fn truncated_error_message_names_layer() {
        let err = Error::Truncated {
            layer: "ethernet header",
            needed: 14,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "truncated ethernet header: needed 14 bytes, got 3"
        );
    }
}
