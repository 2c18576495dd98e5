//! Binary MENUEX templates for the notification-area context menu.
//!
//! The layout is the one consumed by `LoadMenuIndirectW`:
//!
//! ```text
//! header:  u16 version=1 | u16 offset=4 | u32 help_id=0
//! item:    u32 type | u32 state | u32 id | u16 flags | utf16le text + NUL | pad to 4
//!          [if flags & 0x01: u32 help_id=0 | item[] children]
//! ```
//!
//! The loader only accepts a template describing a single popup, so the
//! caller's items are always wrapped in one synthetic root item.

pub mod error;
pub mod parse;
pub mod patch;

use byteorder::{ByteOrder, LittleEndian};
use common::{align4, utf16_len, write_utf16le, OutputBuffer};

pub use crate::error::Error;
pub use crate::parse::{parse_template, ParsedItem, ParsedMenu};
pub use crate::patch::{ItemInfo, ItemPatch};

pub type Result<T> = core::result::Result<T, Error>;

pub const TEMPLATE_VERSION: u16 = 1;
pub const TEMPLATE_HEADER_OFFSET: u16 = 4;
pub const TEMPLATE_HEADER_SIZE: usize = 8;

/// Fixed part of an item: type, state, id and flags.
pub const ITEM_FIXED_SIZE: usize = 14;

pub const MFT_STRING: u32 = 0x0000;
pub const MFT_SEPARATOR: u32 = 0x0800;
pub const MFS_DISABLED: u32 = 0x0003;
pub const MFS_CHECKED: u32 = 0x0008;

/// Item owns a child list (no symbolic name in the SDK headers).
pub const MF_POPUP: u16 = 0x01;
/// Item is the last of its sibling list.
pub const MF_END: u16 = 0x80;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MenuItemKind {
    #[default]
    Leaf,
    Submenu(Vec<MenuItem>),
}

/// One entry of a context menu.
///
/// `Default` gives `id = 0` (no command), empty text and every flag cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuItem {
    pub id: u32,
    pub text: String,
    pub separator: bool,
    pub disabled: bool,
    pub checked: bool,
    pub kind: MenuItemKind,
}

impl MenuItem {
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn separator() -> Self {
        Self {
            separator: true,
            ..Self::default()
        }
    }

    pub fn submenu(text: impl Into<String>, children: Vec<MenuItem>) -> Self {
        Self {
            text: text.into(),
            kind: MenuItemKind::Submenu(children),
            ..Self::default()
        }
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn children(&self) -> Option<&[MenuItem]> {
        match &self.kind {
            MenuItemKind::Leaf => None,
            MenuItemKind::Submenu(children) => Some(children),
        }
    }

    fn record(&self) -> Record<'_> {
        let mut item_type = MFT_STRING;
        if self.separator {
            item_type |= MFT_SEPARATOR;
        }
        let mut state = 0;
        if self.disabled {
            state |= MFS_DISABLED;
        }
        if self.checked {
            state |= MFS_CHECKED;
        }
        Record {
            item_type,
            state,
            id: self.id,
            text: &self.text,
            children: self.children(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EncodeOptions {
    /// Text of the synthetic wrapper item. Never displayed.
    pub root_text: String,
    /// Text of the disabled placeholder emitted for an empty child list.
    pub empty_text: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            root_text: String::from("root"),
            empty_text: String::from("Empty"),
        }
    }
}

/// Borrowed view of one item as it is laid out in the template.
#[derive(Copy, Clone, Debug)]
struct Record<'a> {
    item_type: u32,
    state: u32,
    id: u32,
    text: &'a str,
    children: Option<&'a [MenuItem]>,
}

impl Record<'_> {
    fn own_size(&self) -> usize {
        let mut size = ITEM_FIXED_SIZE + 2 * utf16_len(self.text) + 2;
        if self.children.is_some() {
            size += 4;
        }
        align4(size)
    }
}

/// Accumulator owning the template bytes while items are appended.
struct TemplateBuilder<'o> {
    out: Vec<u8>,
    options: &'o EncodeOptions,
}

impl<'o> TemplateBuilder<'o> {
    fn with_capacity(options: &'o EncodeOptions, capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
            options,
        }
    }

    fn push_header(&mut self) {
        let mut header = [0u8; TEMPLATE_HEADER_SIZE];
        LittleEndian::write_u16(&mut header[0..2], TEMPLATE_VERSION);
        LittleEndian::write_u16(&mut header[2..4], TEMPLATE_HEADER_OFFSET);
        // help id stays 0
        self.out.extend_from_slice(&header);
    }

    fn push_list(&mut self, items: &[MenuItem]) {
        let Some((last, rest)) = items.split_last() else {
            let options = self.options;
            let placeholder = Record {
                item_type: MFT_STRING,
                state: MFS_DISABLED,
                id: 0,
                text: &options.empty_text,
                children: None,
            };
            self.push_record(placeholder, true);
            return;
        };
        for item in rest {
            self.push_record(item.record(), false);
        }
        self.push_record(last.record(), true);
    }

    fn push_record(&mut self, record: Record<'_>, is_last: bool) {
        let mut flags = 0u16;
        if is_last {
            flags |= MF_END;
        }
        if record.children.is_some() {
            flags |= MF_POPUP;
        }

        let start = self.out.len();
        let size = record.own_size();
        self.out.resize(start + size, 0);

        let item = &mut self.out[start..start + size];
        LittleEndian::write_u32(&mut item[0..4], record.item_type);
        LittleEndian::write_u32(&mut item[4..8], record.state);
        LittleEndian::write_u32(&mut item[8..12], record.id);
        LittleEndian::write_u16(&mut item[12..14], flags);
        write_utf16le(item, ITEM_FIXED_SIZE, record.text);
        // terminator, padding and the trailing help id are already zero

        log::trace!(
            "menu item at {start:#x}: id={}, flags={flags:#04x}, size={size}",
            record.id
        );

        if let Some(children) = record.children {
            self.push_list(children);
        }
    }

    fn finish(self) -> Vec<u8> {
        self.out
    }
}

/// Encodes `items` with [`EncodeOptions::default`].
///
/// Any nesting depth is encoded. [`parse_template`] stops at
/// [`parse::MAX_DEPTH`] lists counting the wrapper's, so a tree with more
/// than `MAX_DEPTH - 2` levels of submenus cannot be read back.
pub fn encode_template(items: &[MenuItem]) -> Vec<u8> {
    encode_template_with(items, &EncodeOptions::default())
}

pub fn encode_template_with(items: &[MenuItem], options: &EncodeOptions) -> Vec<u8> {
    let size = template_size_with(items, options);
    let mut builder = TemplateBuilder::with_capacity(options, size);
    builder.push_header();
    builder.push_record(root_record(items, options), true);
    let out = builder.finish();
    debug_assert_eq!(out.len(), size);
    log::debug!(
        "encoded menu template: {} top-level items, {} bytes",
        items.len(),
        out.len()
    );
    out
}

/// Encodes `items` into `out` and returns the number of bytes written.
pub fn encode_template_into(
    items: &[MenuItem],
    options: &EncodeOptions,
    out: &mut dyn OutputBuffer,
) -> Result<usize> {
    let template = encode_template_with(items, options);
    out.write_exact(&template)?;
    Ok(template.len())
}

/// Exact length of [`encode_template`]'s output for `items`.
pub fn template_size(items: &[MenuItem]) -> usize {
    template_size_with(items, &EncodeOptions::default())
}

pub fn template_size_with(items: &[MenuItem], options: &EncodeOptions) -> usize {
    TEMPLATE_HEADER_SIZE + record_size(root_record(items, options), options)
}

fn root_record<'a>(items: &'a [MenuItem], options: &'a EncodeOptions) -> Record<'a> {
    Record {
        item_type: MFT_STRING,
        state: 0,
        id: 0,
        text: &options.root_text,
        children: Some(items),
    }
}

fn record_size(record: Record<'_>, options: &EncodeOptions) -> usize {
    let own = record.own_size();
    match record.children {
        None => own,
        Some(children) => own + list_size(children, options),
    }
}

fn list_size(items: &[MenuItem], options: &EncodeOptions) -> usize {
    if items.is_empty() {
        return align4(ITEM_FIXED_SIZE + 2 * utf16_len(&options.empty_text) + 2);
    }
    items
        .iter()
        .map(|item| record_size(item.record(), options))
        .sum()
}

#[cfg(test)]
mod tests;
