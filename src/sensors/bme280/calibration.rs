//! Factory trim coefficients and their register layout.
//!
//! Block one (0x88..=0xA1, 26 bytes):
//!
//! ```text
//!  off  0  2  4 | 6  8 10 12 14 16 18 20 22 | 24  | 25
//!       T1 T2 T3| P1 P2 P3 P4 P5 P6 P7 P8 P9| --  | H1
//! ```
//!
//! Block two (0xE1..=0xE7, 7 bytes):
//!
//! ```text
//!  off  0..1  2   3          4                  5          6
//!       H2    H3  H4[11:4]   H5[3:0] | H4[3:0]  H5[11:4]   H6
//! ```
//!
//! 16-bit fields are little-endian.  H4 and H5 are signed 12-bit values
//! sharing byte 4 and are decoded explicitly, never through a bitfield.

/// Length of the first calibration block.
pub const BLOCK1_LEN: usize = 26;
/// Length of the humidity calibration block.
pub const BLOCK2_LEN: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
    pub h1: u8,
    pub h2: i16,
    pub h3: u8,
    pub h4: i16,
    pub h5: i16,
    pub h6: i8,
}

fn u16_le(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([b[off], b[off + 1]])
}

fn i16_le(b: &[u8], off: usize) -> i16 {
    i16::from_le_bytes([b[off], b[off + 1]])
}

/// Sign-extend the low 12 bits of `v`.
pub fn sign_extend12(v: u16) -> i16 {
    (((v & 0x0FFF) << 4) as i16) >> 4
}

impl Calibration {
    /// Decode both raw register blocks into a complete coefficient set.
    pub fn decode(block1: &[u8; BLOCK1_LEN], block2: &[u8; BLOCK2_LEN]) -> Self {
        let b = block2;
        let h4 = (u16::from(b[3]) << 4) | u16::from(b[4] & 0x0F);
        let h5 = u16::from((b[4] >> 4) & 0x0F) | (u16::from(b[5]) << 4);

        Self {
            t1: u16_le(block1, 0),
            t2: i16_le(block1, 2),
            t3: i16_le(block1, 4),
            p1: u16_le(block1, 6),
            p2: i16_le(block1, 8),
            p3: i16_le(block1, 10),
            p4: i16_le(block1, 12),
            p5: i16_le(block1, 14),
            p6: i16_le(block1, 16),
            p7: i16_le(block1, 18),
            p8: i16_le(block1, 20),
            p9: i16_le(block1, 22),
            h1: block1[25],
            h2: i16_le(b, 0),
            h3: b[2],
            h4: sign_extend12(h4),
            h5: sign_extend12(h5),
            h6: b[6] as i8,
        }
    }
}
