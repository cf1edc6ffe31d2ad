//! Byte and line level access to the panel.
//!
//! Everything above this module talks to the hardware through [`Transport`], so the
//! protocol can run against GPIO bit-banging, a hardware SPI bus or the
//! [`SimulatedTransport`] used by the tests and `--simulate`.

pub mod bit_bang_driver;
pub mod gpio_pin;
pub mod simulated;
pub mod spi_driver;

pub use bit_bang_driver::BitBangTransport;
pub use gpio_pin::{ControlPins, Level, Line};
pub use simulated::{BusyScript, SimulatedTransport, Transaction};
pub use spi_driver::SpiTransport;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{line:?} line: {kind:?}")]
    Pin {
        line: Line,
        kind: embedded_hal::digital::ErrorKind,
    },
    #[error("serial bus: {0:?}")]
    Bus(embedded_hal::spi::ErrorKind),
    #[error("{0:?} is an input line")]
    NotWritable(Line),
    #[error("{0:?} is an output line")]
    NotReadable(Line),
}

/// Capabilities the panel protocol needs from the board.
///
/// Bytes go out MSB first. Chip selects are plain lines here; the protocol layer
/// decides when they are asserted.
pub trait Transport {
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        bytes.iter().try_for_each(|byte| self.write_byte(*byte))
    }

    fn set_line(&mut self, line: Line, level: Level) -> Result<(), TransportError>;

    fn read_line(&mut self, line: Line) -> Result<Level, TransportError>;

    fn delay_ms(&mut self, ms: u32);
}
