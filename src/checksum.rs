use crc::{Crc, CRC_8_SMBUS};

// Polynomial 0x07, zero init, no reflection: the plain "CRC-8".
const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Computes the 8-bit checksum stored alongside every encoded payload.
pub(crate) fn crc8(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}
