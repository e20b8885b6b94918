use crc::{Crc, CRC_16_ARC};

/// FIT checksums are CRC-16/ARC: reflected 0x8005, zero init, no final xor.
const FIT_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);

pub fn crc16(bytes: &[u8]) -> u16 {
    FIT_CRC.checksum(bytes)
}
