use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Seek, SeekFrom, Write};

pub fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    bytes.get(offset..end).map(LittleEndian::read_u16)
}

pub fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    bytes.get(offset..end).map(LittleEndian::read_u32)
}

pub fn read_i32(bytes: &[u8], offset: usize) -> Option<i32> {
    let end = offset.checked_add(4)?;
    bytes.get(offset..end).map(LittleEndian::read_i32)
}

/// Rounds `size` up to the next multiple of 4.
pub fn align4(size: usize) -> usize {
    (size + 3) & !3
}

/// Lowercase hex, two digits per byte, no separators.
pub fn hex(bytes: &[u8]) -> String {
    hex_with(bytes, "")
}

/// Lowercase hex with `separator` between bytes.
pub fn hex_with(bytes: &[u8], separator: &str) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Output sink for encoded buffers.
pub trait OutputBuffer {
    /// Writes the full payload to the sink, replacing any previous content.
    fn write_exact(&mut self, data: &[u8]) -> io::Result<()>;
}

impl OutputBuffer for Vec<u8> {
    fn write_exact(&mut self, data: &[u8]) -> io::Result<()> {
        self.clear();
        self.extend_from_slice(data);
        Ok(())
    }
}

impl OutputBuffer for std::fs::File {
    fn write_exact(&mut self, data: &[u8]) -> io::Result<()> {
        self.set_len(0)?;
        self.seek(SeekFrom::Start(0))?;
        self.write_all(data)?;
        self.flush()
    }
}

/// Number of UTF-16 code units in `text`.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Writes `text` as UTF-16LE into `out` starting at `offset` and returns the
/// end offset. The caller sizes `out`; no terminator is written.
pub fn write_utf16le(out: &mut [u8], offset: usize, text: &str) -> usize {
    let mut pos = offset;
    for unit in text.encode_utf16() {
        LittleEndian::write_u16(&mut out[pos..pos + 2], unit);
        pos += 2;
    }
    pos
}

/// A NUL-terminated UTF-16LE string scanned out of a fixed-capacity field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utf16Field<'a> {
    /// Code units before the terminator (or the capacity boundary).
    pub units: Vec<u16>,
    /// Whether a NUL code unit was found inside the field.
    pub terminated: bool,
    /// Bytes after the terminator up to the capacity boundary.
    pub trailing: &'a [u8],
}

impl Utf16Field<'_> {
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }

    pub fn has_trailing_data(&self) -> bool {
        self.trailing.iter().any(|&b| b != 0)
    }
}

/// Scans `bytes[start..end]` two bytes at a time until a NUL code unit or
/// `end`. Returns `None` when the range does not fit in `bytes`.
pub fn scan_utf16z(bytes: &[u8], start: usize, end: usize) -> Option<Utf16Field<'_>> {
    if start > end || end > bytes.len() {
        return None;
    }
    let mut units = Vec::new();
    let mut pos = start;
    while pos + 2 <= end {
        let unit = LittleEndian::read_u16(&bytes[pos..pos + 2]);
        if unit == 0 {
            return Some(Utf16Field {
                units,
                terminated: true,
                trailing: &bytes[pos + 2..end],
            });
        }
        units.push(unit);
        pos += 2;
    }
    Some(Utf16Field {
        units,
        terminated: false,
        trailing: &bytes[end..end],
    })
}
