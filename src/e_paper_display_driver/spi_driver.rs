use crate::e_paper_display_driver::gpio_pin::{ControlPins, Level, Line};
use crate::e_paper_display_driver::{Transport, TransportError};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::{Error as _, SpiBus};

/// Bytes through a hardware SPI bus, chip selects still driven as GPIO lines.
///
/// The bus must not drive a chip select of its own (`SPI_NO_CS` on spidev), the panel
/// needs both halves selected at once for shared commands.
#[derive(Debug)]
pub struct SpiTransport<SPI, O, I, D> {
    spi: SPI,
    pins: ControlPins<O, I>,
    delay: D,
}

impl<SPI, O, I, D> SpiTransport<SPI, O, I, D>
where
    SPI: SpiBus,
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, pins: ControlPins<O, I>, delay: D) -> Self {
        SpiTransport { spi, pins, delay }
    }
}

impl<SPI, O, I, D> Transport for SpiTransport<SPI, O, I, D>
where
    SPI: SpiBus,
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.write_bytes(&[byte])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.spi
            .write(bytes)
            .and_then(|_| self.spi.flush())
            .map_err(|e| TransportError::Bus(e.kind()))
    }

    fn set_line(&mut self, line: Line, level: Level) -> Result<(), TransportError> {
        // a chip select may only move once the last byte is on the wire
        self.spi.flush().map_err(|e| TransportError::Bus(e.kind()))?;
        self.pins.set(line, level)
    }

    fn read_line(&mut self, line: Line) -> Result<Level, TransportError> {
        self.pins.get(line)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::e_paper_display_driver::gpio_pin::tests::logged_pins;
    use core::convert::Infallible;
    use embedded_hal::spi::ErrorType;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct CapturingBus {
        written: Vec<u8>,
        flushes: usize,
    }

    impl ErrorType for CapturingBus {
        type Error = Infallible;
    }

    impl SpiBus for CapturingBus {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            read.fill(0);
            self.write(write)
        }

        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_bytes_reach_bus_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut transport =
            SpiTransport::new(CapturingBus::default(), logged_pins(&log, true), NoDelay);

        transport.write_byte(0x10).unwrap();
        transport.write_bytes(&[0x11, 0x22, 0x33]).unwrap();

        assert_eq!(transport.spi.written, vec![0x10, 0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_flushes_before_moving_chip_select() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut transport =
            SpiTransport::new(CapturingBus::default(), logged_pins(&log, true), NoDelay);

        transport.set_line(Line::ChipSelectMain, Level::High).unwrap();

        assert_eq!(transport.spi.flushes, 1);
        assert_eq!(*log.borrow(), vec![("cs_m", true)]);
    }
}
