use crate::{encode_template, MenuItem, MFS_CHECKED, MFS_DISABLED, MFT_SEPARATOR, MFT_STRING};

pub const MIIM_STATE: u32 = 0x0001;
pub const MIIM_ID: u32 = 0x0002;
pub const MIIM_SUBMENU: u32 = 0x0004;
pub const MIIM_STRING: u32 = 0x0040;
pub const MIIM_FTYPE: u32 = 0x0100;

/// The `MENUITEMINFOW` fields an update touches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemInfo {
    pub mask: u32,
    pub item_type: u32,
    pub state: u32,
    pub id: u32,
}

/// Partial update of an existing menu item. Absent fields keep their
/// current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub id: Option<u32>,
    pub text: Option<String>,
    pub separator: Option<bool>,
    pub disabled: Option<bool>,
    pub checked: Option<bool>,
    pub items: Option<Vec<MenuItem>>,
}

impl ItemPatch {
    /// Applies the patch on top of `current`, rebuilding the mask from zero.
    pub fn to_item_info(&self, current: ItemInfo) -> ItemInfo {
        let mut info = ItemInfo {
            mask: 0,
            ..current
        };
        if let Some(separator) = self.separator {
            info.mask |= MIIM_FTYPE;
            info.item_type = if separator { MFT_SEPARATOR } else { MFT_STRING };
        }
        if let Some(disabled) = self.disabled {
            info.mask |= MIIM_STATE;
            info.state &= !MFS_DISABLED;
            if disabled {
                info.state |= MFS_DISABLED;
            }
        }
        if let Some(checked) = self.checked {
            info.mask |= MIIM_STATE;
            info.state &= !MFS_CHECKED;
            if checked {
                info.state |= MFS_CHECKED;
            }
        }
        if let Some(id) = self.id {
            info.mask |= MIIM_ID;
            info.id = id;
        }
        if self.text.is_some() {
            info.mask |= MIIM_STRING;
        }
        if self.items.is_some() {
            info.mask |= MIIM_SUBMENU;
        }
        info
    }

    /// Template for the replacement submenu, if the patch carries one.
    pub fn submenu_template(&self) -> Option<Vec<u8>> {
        self.items.as_deref().map(encode_template)
    }
}
