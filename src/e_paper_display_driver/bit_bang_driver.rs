use crate::e_paper_display_driver::gpio_pin::{ControlPins, Level, Line};
use crate::e_paper_display_driver::{Transport, TransportError};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, InputPin, OutputPin};
use tracing::debug;

/// Clocks bytes out on two GPIO lines, MSB first: set the data line, pulse the clock high then low.
#[derive(Debug)]
pub struct BitBangTransport<O, I, D> {
    pins: ControlPins<O, I>,
    clock_pin: O,
    data_pin: O,
    delay: D,
}

impl<O, I, D> BitBangTransport<O, I, D>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    pub fn new(
        pins: ControlPins<O, I>,
        mut clock_pin: O,
        mut data_pin: O,
        delay: D,
    ) -> Result<Self, TransportError> {
        // parked: clock idles low in mode 0
        clock_pin.set_low().map_err(bus_error)?;
        data_pin.set_low().map_err(bus_error)?;
        Ok(BitBangTransport {
            pins,
            clock_pin,
            data_pin,
            delay,
        })
    }
}

fn bus_error(e: impl embedded_hal::digital::Error) -> TransportError {
    debug!("bit-bang line error {:?}", e.kind());
    TransportError::Bus(embedded_hal::spi::ErrorKind::Other)
}

impl<O, I, D> Transport for BitBangTransport<O, I, D>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        let mut b = byte;
        for _ in 0..8 {
            if b & 0x80 == 0x80 {
                self.data_pin.set_high().map_err(bus_error)?;
            } else {
                self.data_pin.set_low().map_err(bus_error)?;
            }
            b <<= 1;
            self.clock_pin.set_high().map_err(bus_error)?;
            self.clock_pin.set_low().map_err(bus_error)?;
        }
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.len() > 32 {
            debug!("Spi write to {} bytes", bytes.len());
        } else {
            debug!("Spi write {:02X?}", bytes);
        }
        for byte in bytes {
            self.write_byte(*byte)?;
        }
        Ok(())
    }

    fn set_line(&mut self, line: Line, level: Level) -> Result<(), TransportError> {
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
    use crate::e_paper_display_driver::gpio_pin::tests::{logged_pins, FixedInput, LoggedPin};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn transport(
        log: &Rc<RefCell<Vec<(&'static str, bool)>>>,
    ) -> BitBangTransport<LoggedPin, FixedInput, NoDelay> {
        let pin = |name| LoggedPin {
            name,
            log: Rc::clone(log),
        };
        BitBangTransport::new(logged_pins(log, true), pin("sck"), pin("mosi"), NoDelay).unwrap()
    }

    /// Rebuild the bytes from the data level present at each rising clock edge
    fn sampled_bytes(log: &[(&'static str, bool)]) -> Vec<u8> {
        let mut mosi = false;
        let mut bits = Vec::new();
        for (name, level) in log {
            match *name {
                "mosi" => mosi = *level,
                "sck" if *level => bits.push(mosi),
                _ => {}
            }
        }
        bits.chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, bit| (acc << 1) | *bit as u8))
            .collect()
    }

    #[test]
    fn test_new_parks_clock_and_data_low() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let _transport = transport(&log);
        assert_eq!(*log.borrow(), vec![("sck", false), ("mosi", false)]);
    }

    #[test]
    fn test_write_is_msb_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut transport = transport(&log);
        log.borrow_mut().clear();

        transport.write_bytes(&[0x80, 0x01, 0xA5]).unwrap();

        assert_eq!(sampled_bytes(&log.borrow()), vec![0x80, 0x01, 0xA5]);
        // 8 clock pulses per byte, clock left low
        let rising = log.borrow().iter().filter(|e| **e == ("sck", true)).count();
        assert_eq!(rising, 24);
        assert_eq!(log.borrow().last(), Some(&("sck", false)));
    }

    #[test]
    fn test_lines_go_to_control_pins() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut transport = transport(&log);
        log.borrow_mut().clear();

        transport.set_line(Line::Power, Level::High).unwrap();
        assert_eq!(*log.borrow(), vec![("pwr", true)]);
        assert_eq!(transport.read_line(Line::Busy).unwrap(), Level::High);
    }
}
