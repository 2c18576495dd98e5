//! Decoder for the shell's `IconStreams` buffer, the list of every icon the
//! notification area has seen.
//!
//! The layout is only partly reverse-engineered. Fields with no known
//! meaning are kept as opaque integers and byte ranges and reported as-is.
//!
//! ```text
//! header:  u32 header_size | u32 ? | u16 ? | u16 ? | u32 item_count @12 | u32 item_list_offset @16
//! record (1640 bytes):
//!    0  path       utf16le[260], NUL-terminated, rot13
//!  520  3 x i32, u16 + u16 "last seen"
//!  536  tooltip    utf16le[260], NUL-terminated, rot13
//! 1056  3 x i32 (third looks like an order), 28 + 20 opaque bytes
//! 1116  info       utf16le[260], NUL-terminated, rot13, then 4 bytes and a second string
//! 1636  u32
//! ```
//!
//! The buffer is trusted shell-owned memory. Records must fit inside it
//! (`item_list_offset + item_count * 1640 <= len`); a buffer that breaks this
//! is reported as [`Error::RecordOutOfBounds`] instead of being truncated.

pub mod cipher;
pub mod error;
mod report;

use crate::cipher::{Rot, DEFAULT_ROTATION};
use crate::error::Error;
use common::{read_i32, read_u16, read_u32, scan_utf16z};

pub type Result<T> = core::result::Result<T, Error>;

/// Registry key (under `HKEY_CURRENT_USER`) holding the buffer.
pub const ICON_STREAM_KEY: &str =
    "Software\\Classes\\Local Settings\\Software\\Microsoft\\Windows\\CurrentVersion\\TrayNotify";
/// Registry value name of the buffer.
pub const ICON_STREAM_VALUE: &str = "IconStreams";

pub const STREAM_HEADER_SIZE: usize = 20;
pub const RECORD_SIZE: usize = 1640;

/// Capacity of each text field in UTF-16 code units. Derived from observed
/// buffers, not from a documented structure.
pub const TEXT_CAPACITY: usize = 260;

const PATH_START: usize = 0;
const PATH_END: usize = PATH_START + 2 * TEXT_CAPACITY;
const LAST_SEEN: usize = PATH_END + 12;
const TIP_START: usize = PATH_END + 16;
const TIP_END: usize = TIP_START + 2 * TEXT_CAPACITY;
const OPAQUE_START: usize = TIP_END + 12;
const OPAQUE_SPLIT: usize = TIP_END + 40;
const INFO_START: usize = TIP_END + 60;
const INFO_END: usize = INFO_START + 2 * TEXT_CAPACITY;
const INFO_GAP: usize = 4;

#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Rotation undone on every text field.
    pub rotation: u8,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            rotation: DEFAULT_ROTATION,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    pub header_size: u32,
    /// Observed as 7.
    pub unknown1: u32,
    /// Observed as 1.
    pub unknown2: u16,
    /// Observed as 1.
    pub unknown3: u16,
    pub item_count: u32,
    pub item_list_offset: u32,
    /// `buffer[..item_list_offset]`, verbatim.
    pub raw: Vec<u8>,
}

/// One text field of a record, before and after the cipher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextField {
    /// Text as stored by the shell.
    pub stored: String,
    /// Text with the rotation undone.
    pub text: String,
    /// `false` when the field filled its whole capacity without a NUL.
    pub terminated: bool,
    /// Bytes between the terminator and the end of the field.
    pub trailing: Vec<u8>,
}

impl TextField {
    fn scan(bytes: &[u8], start: usize, end: usize, rot: Rot) -> Self {
        let Some(field) = scan_utf16z(bytes, start, end) else {
            return Self::empty();
        };
        Self {
            stored: field.to_string_lossy(),
            text: String::from_utf16_lossy(&rot.apply_units(&field.units)),
            terminated: field.terminated,
            trailing: field.trailing.to_vec(),
        }
    }

    fn empty() -> Self {
        Self {
            stored: String::new(),
            text: String::new(),
            terminated: false,
            trailing: Vec::new(),
        }
    }

    /// Whether anything other than zero padding follows the terminator.
    pub fn has_trailing_data(&self) -> bool {
        self.trailing.iter().any(|&b| b != 0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconRecord {
    pub index: u32,
    /// Offset of the record inside the whole buffer.
    pub offset: usize,
    pub path: TextField,
    pub unknown_after_path: [i32; 3],
    pub last_seen: (u16, u16),
    pub tooltip: TextField,
    pub unknown_after_tooltip: [i32; 2],
    /// Looks like an ordering value; not confirmed.
    pub order: i32,
    pub opaque1: [u8; 28],
    pub opaque2: [u8; 20],
    pub info: TextField,
    /// The four bytes between `info`'s terminator and `info2`.
    pub info_gap: Vec<u8>,
    pub info2: TextField,
    pub tail: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconStream {
    pub header: StreamHeader,
    pub records: Vec<IconRecord>,
    /// Everything after the last record, verbatim.
    pub trailer: Vec<u8>,
}

/// Decodes with [`DecodeOptions::default`].
pub fn decode(bytes: &[u8]) -> Result<IconStream> {
    decode_with(bytes, &DecodeOptions::default())
}

pub fn decode_with(bytes: &[u8], opts: &DecodeOptions) -> Result<IconStream> {
    let header = parse_header(bytes)?;
    let rot = Rot::new(opts.rotation).inverse();

    let list_offset =
        usize::try_from(header.item_list_offset).map_err(|_| Error::IntegerOverflow)?;
    let count = usize::try_from(header.item_count).map_err(|_| Error::IntegerOverflow)?;
    log::debug!(
        "icon stream: {count} records at {list_offset:#x}, {} bytes total",
        bytes.len()
    );

    let mut records = Vec::with_capacity(count.min(bytes.len() / RECORD_SIZE));
    for index in 0..header.item_count {
        let offset = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_mul(RECORD_SIZE))
            .and_then(|delta| delta.checked_add(list_offset))
            .ok_or(Error::IntegerOverflow)?;
        let end = offset
            .checked_add(RECORD_SIZE)
            .ok_or(Error::IntegerOverflow)?;
        if end > bytes.len() {
            return Err(Error::RecordOutOfBounds {
                index,
                offset,
                end,
                size: bytes.len(),
            });
        }
        records.push(parse_record(&bytes[offset..end], index, offset, rot));
    }

    let trailer_start = list_offset
        .checked_add(count.checked_mul(RECORD_SIZE).ok_or(Error::IntegerOverflow)?)
        .ok_or(Error::IntegerOverflow)?;
    let trailer = bytes[trailer_start..].to_vec();

    Ok(IconStream {
        header,
        records,
        trailer,
    })
}

fn parse_header(bytes: &[u8]) -> Result<StreamHeader> {
    let too_small = || Error::HeaderTooSmall {
        size: bytes.len(),
        needed: STREAM_HEADER_SIZE,
    };
    let header_size = read_u32(bytes, 0).ok_or_else(too_small)?;
    let unknown1 = read_u32(bytes, 4).ok_or_else(too_small)?;
    let unknown2 = read_u16(bytes, 8).ok_or_else(too_small)?;
    let unknown3 = read_u16(bytes, 10).ok_or_else(too_small)?;
    let item_count = read_u32(bytes, 12).ok_or_else(too_small)?;
    let item_list_offset = read_u32(bytes, 16).ok_or_else(too_small)?;

    let list_offset = usize::try_from(item_list_offset).map_err(|_| Error::IntegerOverflow)?;
    let raw = bytes
        .get(..list_offset)
        .ok_or(Error::ItemListOutOfBounds {
            offset: list_offset,
            size: bytes.len(),
        })?
        .to_vec();

    Ok(StreamHeader {
        header_size,
        unknown1,
        unknown2,
        unknown3,
        item_count,
        item_list_offset,
        raw,
    })
}

/// `item` is exactly one record; every offset below is in range.
fn parse_record(item: &[u8], index: u32, offset: usize, rot: Rot) -> IconRecord {
    let i32_at = |at: usize| read_i32(item, at).unwrap_or_default();

    let path = TextField::scan(item, PATH_START, PATH_END, rot);
    let tooltip = TextField::scan(item, TIP_START, TIP_END, rot);
    let info = TextField::scan(item, INFO_START, INFO_END, rot);

    // A second string sits inside info's leftover capacity, after a 4-byte gap.
    let gap_end = info.trailing.len().min(INFO_GAP);
    let info_gap = info.trailing[..gap_end].to_vec();
    let info2 = TextField::scan(&info.trailing, gap_end, info.trailing.len(), rot);

    for (name, field) in [("path", &path), ("tooltip", &tooltip), ("info", &info)] {
        if !field.terminated {
            log::warn!(
                "icon record #{index}: {name} fills its {TEXT_CAPACITY}-unit capacity without a terminator"
            );
        }
    }

    let mut opaque1 = [0u8; 28];
    opaque1.copy_from_slice(&item[OPAQUE_START..OPAQUE_SPLIT]);
    let mut opaque2 = [0u8; 20];
    opaque2.copy_from_slice(&item[OPAQUE_SPLIT..INFO_START]);

    let record = IconRecord {
        index,
        offset,
        unknown_after_path: [i32_at(PATH_END), i32_at(PATH_END + 4), i32_at(PATH_END + 8)],
        last_seen: (
            read_u16(item, LAST_SEEN).unwrap_or_default(),
            read_u16(item, LAST_SEEN + 2).unwrap_or_default(),
        ),
        unknown_after_tooltip: [i32_at(TIP_END), i32_at(TIP_END + 4)],
        order: i32_at(TIP_END + 8),
        opaque1,
        opaque2,
        tail: read_u32(item, INFO_END).unwrap_or_default(),
        path,
        tooltip,
        info,
        info_gap,
        info2,
    };
    log::trace!(
        "icon record #{index} at {offset:#x}: path={:?}",
        record.path.text
    );
    record
}
