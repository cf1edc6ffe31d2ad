use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The six pigments of the Spectra 6 panel, as the controller's 4-bit codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DisplayColor {
    Black = 0x00,
    White = 0x01,
    Yellow = 0x02,
    Red = 0x03,
    Blue = 0x05,
    Green = 0x06,
}

impl DisplayColor {
    pub const ALL: [DisplayColor; 6] = [
        DisplayColor::Black,
        DisplayColor::White,
        DisplayColor::Yellow,
        DisplayColor::Red,
        DisplayColor::Blue,
        DisplayColor::Green,
    ];

    /// Band order of the six block test pattern, top to bottom
    pub const SIX_BLOCKS: [DisplayColor; 6] = [
        DisplayColor::Black,
        DisplayColor::Blue,
        DisplayColor::Green,
        DisplayColor::Red,
        DisplayColor::Yellow,
        DisplayColor::White,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Two pixels of this color in one byte
    pub fn packed(self) -> u8 {
        (self.code() << 4) | self.code()
    }

    pub fn name(self) -> &'static str {
        match self {
            DisplayColor::Black => "black",
            DisplayColor::White => "white",
            DisplayColor::Yellow => "yellow",
            DisplayColor::Red => "red",
            DisplayColor::Blue => "blue",
            DisplayColor::Green => "green",
        }
    }
}

impl From<DisplayColor> for u8 {
    fn from(value: DisplayColor) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for DisplayColor {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        DisplayColor::ALL
            .into_iter()
            .find(|color| color.code() == code)
            .ok_or(code)
    }
}

impl Display for DisplayColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisplayColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DisplayColor::ALL
            .into_iter()
            .find(|color| color.name() == wanted)
            .ok_or_else(|| format!("unknown color {s:?}, expected one of black, white, yellow, red, blue, green"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_repeats_code_in_both_nibbles() {
        assert_eq!(DisplayColor::Black.packed(), 0x00);
        assert_eq!(DisplayColor::White.packed(), 0x11);
        assert_eq!(DisplayColor::Blue.packed(), 0x55);
        assert_eq!(DisplayColor::Green.packed(), 0x66);
    }

    #[test]
    fn test_code_four_is_not_a_color() {
        assert_eq!(DisplayColor::try_from(0x04), Err(0x04));
        assert_eq!(DisplayColor::try_from(0x03), Ok(DisplayColor::Red));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Yellow".parse::<DisplayColor>(), Ok(DisplayColor::Yellow));
        assert_eq!(" green ".parse::<DisplayColor>(), Ok(DisplayColor::Green));
        assert!("magenta".parse::<DisplayColor>().is_err());
    }

    #[test]
    fn test_six_blocks_uses_every_color_once() {
        for color in DisplayColor::ALL {
            assert_eq!(
                DisplayColor::SIX_BLOCKS.iter().filter(|c| **c == color).count(),
                1
            );
        }
    }
}
