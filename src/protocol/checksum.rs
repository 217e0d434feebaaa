//! Frame checksums used by the telematics protocols.
//!
//! All functions are pure and operate on a byte slice:
//! - CRC-8 (poly 0x31, init 0xFF, no reflection): EGTS header
//! - CRC-16/CCITT-FALSE (poly 0x1021, init 0xFFFF): EGTS frame data
//! - CRC-16/MODBUS (poly 0x8005 reflected, init 0xFFFF): NDTP inner payload
//! - XOR of all bytes: Navtelecom header and body

/// CRC-8 as used by the EGTS transport header.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ 0x31;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// CRC-16/CCITT-FALSE (MSB-first, no final XOR).
pub fn crc16_ccitt_false(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// CRC-16/MODBUS (LSB-first with the reflected polynomial 0xA001).
pub fn crc16_modbus(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Byte-wise XOR checksum.
pub fn xor(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &b| acc ^ b)
}
