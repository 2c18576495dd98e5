/// Rotation the shell applies to the text fields of the icon stream.
pub const DEFAULT_ROTATION: u8 = 13;

/// Caesar rotation over the ASCII letters, upper and lower case rotated
/// independently. Everything else passes through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rot {
    shift: u8,
}

impl Rot {
    pub fn new(rotation: u8) -> Self {
        Self {
            shift: rotation % 26,
        }
    }

    pub fn shift(self) -> u8 {
        self.shift
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        Self::new(26 - self.shift)
    }

    pub fn apply_unit(self, unit: u16) -> u16 {
        let shift = u16::from(self.shift);
        match unit {
            0x41..=0x5A => (unit - 0x41 + shift) % 26 + 0x41,
            0x61..=0x7A => (unit - 0x61 + shift) % 26 + 0x61,
            _ => unit,
        }
    }

    pub fn apply_units(self, units: &[u16]) -> Vec<u16> {
        units.iter().map(|&unit| self.apply_unit(unit)).collect()
    }

    pub fn apply(self, text: &str) -> String {
        text.chars()
            .map(|c| match u16::try_from(u32::from(c)) {
                Ok(unit) if c.is_ascii_alphabetic() => {
                    char::from_u32(u32::from(self.apply_unit(unit))).unwrap_or(c)
                }
                _ => c,
            })
            .collect()
    }
}

impl Default for Rot {
    fn default() -> Self {
        Self::new(DEFAULT_ROTATION)
    }
}

/// Rotates `text` by `rotation` positions.
pub fn rotate(text: &str, rotation: u8) -> String {
    Rot::new(rotation).apply(text)
}
