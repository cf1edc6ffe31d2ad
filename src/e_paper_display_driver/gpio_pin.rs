use crate::e_paper_display_driver::TransportError;
use embedded_hal::digital::{Error as _, InputPin, OutputPin};

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
pub enum Level {
    Low = 0x00,
    High = 0x01,
}

impl From<Level> for u8 {
    fn from(value: Level) -> Self {
        value as u8
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Discrete control lines of the panel, independent of how they are wired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Line {
    Reset,
    /// Chip select of the left half, active low
    ChipSelectMain,
    /// Chip select of the right half, active low
    ChipSelectPeri,
    /// Input. Low while the controller is busy.
    Busy,
    /// Panel supply switch
    Power,
}

/// Control pins shared by the bit-banged and the hardware SPI transports.
///
/// The clock pin is not part of this set since a hardware bus owns it.
#[derive(Debug)]
pub struct ControlPins<O, I> {
    pub reset: O,
    pub chip_select_main: O,
    pub chip_select_peri: O,
    pub power: O,
    pub busy: I,
}

impl<O, I> ControlPins<O, I>
where
    O: OutputPin,
    I: InputPin,
{
    fn output(&mut self, line: Line) -> Result<&mut O, TransportError> {
        match line {
            Line::Reset => Ok(&mut self.reset),
            Line::ChipSelectMain => Ok(&mut self.chip_select_main),
            Line::ChipSelectPeri => Ok(&mut self.chip_select_peri),
            Line::Power => Ok(&mut self.power),
            Line::Busy => Err(TransportError::NotWritable(line)),
        }
    }

    pub fn set(&mut self, line: Line, level: Level) -> Result<(), TransportError> {
        let pin = self.output(line)?;
        let result = match level {
            Level::High => pin.set_high(),
            Level::Low => pin.set_low(),
        };
        result.map_err(|e| TransportError::Pin {
            line,
            kind: e.kind(),
        })
    }

    pub fn get(&mut self, line: Line) -> Result<Level, TransportError> {
        if line != Line::Busy {
            return Err(TransportError::NotReadable(line));
        }
        self.busy
            .is_high()
            .map(Level::from)
            .map_err(|e| TransportError::Pin {
                line,
                kind: e.kind(),
            })
    }
}
