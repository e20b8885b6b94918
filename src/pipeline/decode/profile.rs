//! The slice of the FIT profile this decoder understands: message and field
//! numbers, base types, and the scale/offset conversions to real-world units.

pub const TIMESTAMP: u8 = 253;

pub mod mesg {
    pub const SPORT: u16 = 12;
    pub const SESSION: u16 = 18;
    pub const RECORD: u16 = 20;
}

pub mod record {
    pub const POSITION_LAT: u8 = 0;
    pub const POSITION_LONG: u8 = 1;
    pub const ALTITUDE: u8 = 2;
    pub const HEART_RATE: u8 = 3;
    pub const SPEED: u8 = 6;
    pub const ENHANCED_SPEED: u8 = 73;
    pub const ENHANCED_ALTITUDE: u8 = 78;
}

pub mod session {
    pub const START_TIME: u8 = 2;
    pub const SPORT: u8 = 5;
    pub const TOTAL_ELAPSED_TIME: u8 = 7;
    pub const TOTAL_DISTANCE: u8 = 9;
    pub const TOTAL_CALORIES: u8 = 11;
}

pub mod sport {
    pub const SPORT: u8 = 0;
}

#[derive(Debug, Clone, Copy)]
struct BaseType {
    size: usize,
    signed: bool,
    invalid: u64,
}

impl BaseType {
    /// Integer base types only; strings and floats yield `None`.
    fn from_id(id: u8) -> Option<Self> {
        let (size, signed, invalid) = match id & 0x1F {
            0x00 => (1, false, 0xFF),
            0x01 => (1, true, 0x7F),
            0x02 => (1, false, 0xFF),
            0x03 => (2, true, 0x7FFF),
            0x04 => (2, false, 0xFFFF),
            0x05 => (4, true, 0x7FFF_FFFF),
            0x06 => (4, false, 0xFFFF_FFFF),
            0x0A => (1, false, 0),
            0x0B => (2, false, 0),
            0x0C => (4, false, 0),
            0x0D => (1, false, 0xFF),
            0x0E => (8, true, 0x7FFF_FFFF_FFFF_FFFF),
            0x0F => (8, false, u64::MAX),
            0x10 => (8, false, 0),
            _ => return None,
        };
        Some(Self {
            size,
            signed,
            invalid,
        })
    }
}

/// Reads the first element of an integer field, returning `None` for the
/// base type's invalid sentinel, unsupported types, or undersized fields.
pub fn read_value(bytes: &[u8], base_type: u8, big_endian: bool) -> Option<i64> {
    let kind = BaseType::from_id(base_type)?;
    let raw = bytes.get(..kind.size)?;

    let value = if big_endian {
        raw.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    } else {
        raw.iter().rev().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    };

    if value == kind.invalid {
        return None;
    }

    if kind.signed {
        let shift = 64 - 8 * kind.size as u32;
        Some(((value << shift) as i64) >> shift)
    } else {
        Some(value as i64)
    }
}

pub fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}

/// Inverts `stored = (value + offset) * scale`.
pub fn unscale(raw: i64, scale: f64, offset: f64) -> f64 {
    raw as f64 / scale - offset
}
