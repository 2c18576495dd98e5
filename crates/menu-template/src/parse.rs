use crate::error::Error;
use crate::{
    Result, ITEM_FIXED_SIZE, MFS_CHECKED, MFS_DISABLED, MFT_SEPARATOR, MF_END, MF_POPUP,
    TEMPLATE_HEADER_SIZE, TEMPLATE_VERSION,
};
use common::{align4, read_u16, read_u32};

/// Child lists nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedMenu {
    pub version: u16,
    pub header_offset: u16,
    pub help_id: u32,
    pub items: Vec<ParsedItem>,
}

impl ParsedMenu {
    /// Items of the synthetic wrapper, when the template has one.
    pub fn popup_items(&self) -> Option<&[ParsedItem]> {
        match self.items.as_slice() {
            [root] => root.children.as_deref(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedItem {
    pub offset: usize,
    pub size: usize,
    pub item_type: u32,
    pub state: u32,
    pub id: u32,
    pub flags: u16,
    pub text: String,
    pub help_id: Option<u32>,
    pub children: Option<Vec<ParsedItem>>,
}

impl ParsedItem {
    pub fn is_separator(&self) -> bool {
        self.item_type & MFT_SEPARATOR != 0
    }

    pub fn is_disabled(&self) -> bool {
        self.state & MFS_DISABLED != 0
    }

    pub fn is_checked(&self) -> bool {
        self.state & MFS_CHECKED != 0
    }

    pub fn is_last(&self) -> bool {
        self.flags & MF_END != 0
    }

    pub fn has_children(&self) -> bool {
        self.flags & MF_POPUP != 0
    }
}

/// Reads a MENUEX template back into an item tree by following the
/// last-sibling and has-children flags.
pub fn parse_template(bytes: &[u8]) -> Result<ParsedMenu> {
    if bytes.len() < TEMPLATE_HEADER_SIZE {
        return Err(Error::HeaderTooSmall { size: bytes.len() });
    }
    let version = read_u16(bytes, 0).ok_or(Error::HeaderTooSmall { size: bytes.len() })?;
    if version != TEMPLATE_VERSION {
        return Err(Error::UnsupportedVersion { got: version });
    }
    let header_offset = read_u16(bytes, 2).ok_or(Error::HeaderTooSmall { size: bytes.len() })?;
    if header_offset < 4 {
        return Err(Error::InvalidHeaderOffset { got: header_offset });
    }
    let help_id = read_u32(bytes, 4).ok_or(Error::HeaderTooSmall { size: bytes.len() })?;

    // The offset counts from the end of the offset field itself.
    let mut cursor = Cursor {
        bytes,
        pos: 4 + usize::from(header_offset),
    };
    let items = cursor.list(0)?;
    if cursor.pos < bytes.len() {
        log::warn!(
            "menu template has {} bytes after the root list",
            bytes.len() - cursor.pos
        );
    }

    Ok(ParsedMenu {
        version,
        header_offset,
        help_id,
        items,
    })
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn list(&mut self, depth: usize) -> Result<Vec<ParsedItem>> {
        if depth >= MAX_DEPTH {
            return Err(Error::NestingTooDeep { max: MAX_DEPTH });
        }
        let mut items = Vec::new();
        loop {
            let item = self.item(depth)?;
            let last = item.is_last();
            items.push(item);
            if last {
                return Ok(items);
            }
        }
    }

    fn item(&mut self, depth: usize) -> Result<ParsedItem> {
        let bytes = self.bytes;
        let offset = self.pos;
        let fixed_end = offset
            .checked_add(ITEM_FIXED_SIZE)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| self.out_of_bounds(offset, ITEM_FIXED_SIZE))?;
        let fixed = &bytes[offset..fixed_end];
        let field = |at: usize| read_u32(fixed, at).unwrap_or_default();
        let item_type = field(0);
        let state = field(4);
        let id = field(8);
        let flags = read_u16(fixed, 12).unwrap_or_default();

        let text = common::scan_utf16z(bytes, fixed_end, bytes.len())
            .filter(|text| text.terminated)
            .ok_or(Error::UnterminatedText { offset })?;
        self.pos = align4(fixed_end + 2 * text.units.len() + 2);

        let mut help_id = None;
        if flags & MF_POPUP != 0 {
            let at = self.pos;
            help_id = Some(read_u32(bytes, at).ok_or_else(|| self.out_of_bounds(at, 4))?);
            self.pos += 4;
        }
        let size = self.pos - offset;

        let children = match help_id {
            Some(_) => {
                log::trace!("submenu at {offset:#x}, depth {depth}");
                Some(self.list(depth + 1)?)
            }
            None => None,
        };

        Ok(ParsedItem {
            offset,
            size,
            item_type,
            state,
            id,
            flags,
            text: text.to_string_lossy(),
            help_id,
            children,
        })
    }

    fn out_of_bounds(&self, offset: usize, needed: usize) -> Error {
        Error::ItemOutOfBounds {
            offset,
            needed,
            size: self.bytes.len(),
        }
    }
}
