pub mod crc;
mod fit;
pub mod profile;

pub use crc::crc16;
pub use fit::decode;
