//! Property tests for the RGB565 packing rule.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use firmware::Color;
use proptest::prelude::*;

proptest! {
    /// For all (r, g, b): bits 15..11 are the top 5 bits of r, bits 10..5
    /// the top 6 bits of g, bits 4..0 the top 5 bits of b.
    #[test]
    fn packed_bits_are_the_channel_top_bits(r: u8, g: u8, b: u8) {
        let packed = Color::from_rgb(r, g, b).raw();
        prop_assert_eq!(packed >> 11, u16::from(r >> 3));
        prop_assert_eq!((packed >> 5) & 0x3F, u16::from(g >> 2));
        prop_assert_eq!(packed & 0x1F, u16::from(b >> 3));
    }

    /// The wire form is always the packed value split big-endian.
    #[test]
    fn wire_bytes_split_the_packed_value_big_endian(raw: u16) {
        let bytes = Color::from_raw(raw).to_be_bytes();
        prop_assert_eq!(bytes[0], (raw >> 8) as u8);
        prop_assert_eq!(bytes[1], (raw & 0xFF) as u8);
    }

    /// Packing is insensitive to the discarded low bits.
    #[test]
    fn low_bits_never_change_the_packed_color(r: u8, g: u8, b: u8, noise: u8) {
        let base = Color::from_rgb(r & 0xF8, g & 0xFC, b & 0xF8);
        let noisy = Color::from_rgb(
            (r & 0xF8) | (noise & 0x07),
            (g & 0xFC) | (noise & 0x03),
            (b & 0xF8) | (noise & 0x07),
        );
        prop_assert_eq!(base, noisy);
    }
}
