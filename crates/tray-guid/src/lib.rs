//! Persistent identifier of a notification-area icon.
//!
//! The shell keys user preferences (visibility, position) on this value, so
//! it has to stay stable across runs. It is accepted either as the usual
//! `8-4-4-4-12` string or as the 16 raw bytes of a `GUID` struct.

pub mod error;

use crate::error::Error;
use byteorder::{ByteOrder, LittleEndian};
use core::fmt;
use core::str::FromStr;

pub type Result<T> = core::result::Result<T, Error>;

pub const GUID_STR_LEN: usize = 36;
pub const GUID_SIZE: usize = 16;
const HYPHENS: [usize; 4] = [8, 13, 18, 23];

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    /// Parses `HEX{8}-HEX{4}-HEX{4}-HEX{4}-HEX{12}`, either case.
    pub fn parse(source: &str) -> Result<Self> {
        let bytes = source.as_bytes();
        if bytes.len() != GUID_STR_LEN {
            return Err(Error::BadSize { got: bytes.len() });
        }
        if HYPHENS.iter().any(|&at| bytes[at] != b'-') {
            return Err(Error::BadHyphens);
        }

        let data1 = u32::try_from(parse_hex(&bytes[0..8])?).map_err(|_| Error::BadHex)?;
        let data2 = u16::try_from(parse_hex(&bytes[9..13])?).map_err(|_| Error::BadHex)?;
        let data3 = u16::try_from(parse_hex(&bytes[14..18])?).map_err(|_| Error::BadHex)?;

        let mut data4 = [0u8; 8];
        let tail = bytes[19..23].chunks(2).chain(bytes[24..36].chunks(2));
        for (slot, pair) in data4.iter_mut().zip(tail) {
            *slot = u8::try_from(parse_hex(pair)?).map_err(|_| Error::BadHex)?;
        }

        Ok(Self {
            data1,
            data2,
            data3,
            data4,
        })
    }

    /// Reads the in-memory `GUID` layout: three little-endian integers
    /// followed by eight raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != GUID_SIZE {
            return Err(Error::BadBufferSize { got: bytes.len() });
        }
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..16]);
        Ok(Self {
            data1: LittleEndian::read_u32(&bytes[0..4]),
            data2: LittleEndian::read_u16(&bytes[4..6]),
            data3: LittleEndian::read_u16(&bytes[6..8]),
            data4,
        })
    }

    pub fn to_bytes(&self) -> [u8; GUID_SIZE] {
        let mut out = [0u8; GUID_SIZE];
        LittleEndian::write_u32(&mut out[0..4], self.data1);
        LittleEndian::write_u16(&mut out[4..6], self.data2);
        LittleEndian::write_u16(&mut out[6..8], self.data3);
        out[8..16].copy_from_slice(&self.data4);
        out
    }
}

fn parse_hex(digits: &[u8]) -> Result<u64> {
    digits.iter().try_fold(0u64, |value, &c| {
        let digit = char::from(c).to_digit(16).ok_or(Error::BadHex)?;
        Ok((value << 4) | u64::from(digit))
    })
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}
