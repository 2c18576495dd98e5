use crate::{IconRecord, IconStream, TextField};
use common::hex;
use core::fmt;

const INDENT: &str = "  ";

impl fmt::Display for IconStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "header data = {}", hex(&self.header.raw))?;
        writeln!(
            f,
            "header size = {}, ? = {}, ? = {}-{}",
            self.header.header_size, self.header.unknown1, self.header.unknown2, self.header.unknown3
        )?;
        for record in &self.records {
            write_record(f, record, self.header.item_count)?;
        }
        writeln!(f, "trailer data = {}", hex(&self.trailer))
    }
}

fn write_record(f: &mut fmt::Formatter<'_>, record: &IconRecord, count: u32) -> fmt::Result {
    writeln!(
        f,
        "Item {}/{} at 0x{:x}",
        record.index, count, record.offset
    )?;

    write_text(f, "path", &record.path)?;
    let [a, b, c] = record.unknown_after_path;
    let mut raw = Vec::with_capacity(12);
    for value in record.unknown_after_path {
        raw.extend_from_slice(&value.to_le_bytes());
    }
    writeln!(f, "{INDENT}? = {}", hex(&raw))?;
    writeln!(f, "{INDENT}{INDENT}? = {a}")?;
    writeln!(f, "{INDENT}{INDENT}? = {b}")?;
    writeln!(f, "{INDENT}{INDENT}? = {c}")?;
    writeln!(
        f,
        "{INDENT}last seen = {}-{}",
        record.last_seen.0, record.last_seen.1
    )?;

    write_text(f, "tooltip", &record.tooltip)?;
    for value in record.unknown_after_tooltip {
        writeln!(f, "{INDENT}? = {value}")?;
    }
    writeln!(f, "{INDENT}order? = {}", record.order)?;
    writeln!(f, "{INDENT}? = {}", hex(&record.opaque1))?;
    writeln!(f, "{INDENT}? = {}", hex(&record.opaque2))?;

    // info's leftover bytes hold the gap and info2, printed below
    write_label(f, "info?", &record.info)?;
    writeln!(f, "{INDENT}? = {}", hex(&record.info_gap))?;
    write_text(f, "?", &record.info2)?;
    writeln!(f, "{INDENT}? = {}", record.tail)
}

fn write_label(f: &mut fmt::Formatter<'_>, label: &str, field: &TextField) -> fmt::Result {
    write!(f, "{INDENT}{label} = {:?}", field.text)?;
    if !field.terminated {
        write!(f, " (unterminated)")?;
    }
    writeln!(f)
}

fn write_text(f: &mut fmt::Formatter<'_>, label: &str, field: &TextField) -> fmt::Result {
    write_label(f, label, field)?;
    if field.has_trailing_data() {
        writeln!(f, "{INDENT}{INDENT}trailing = {}", hex(&field.trailing))?;
    }
    Ok(())
}
