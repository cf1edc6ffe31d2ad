use crate::e_paper_display_driver::gpio_pin::{Level, Line};
use crate::e_paper_display_driver::{Transport, TransportError};
use tracing::{debug, trace};

/// How the simulated busy line answers polls.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BusyScript {
    /// Always idle
    Idle,
    /// Reads low this many times after every chip select scope closes, then idle
    BusyFor(u32),
    /// Never releases, to exercise the busy timeout
    Stuck,
}

/// Everything written between a chip select going low and both going high again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub main: bool,
    pub peri: bool,
    pub bytes: Vec<u8>,
}

impl Transaction {
    pub fn opcode(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    pub fn payload(&self) -> &[u8] {
        self.bytes.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    Line(Line, Level),
    Delay(u32),
}

/// A board that only exists in memory.
///
/// Keeps the line and delay history and splits the byte stream into chip select
/// transactions, which is what the tests and `--simulate` dry runs inspect.
#[derive(Debug)]
pub struct SimulatedTransport {
    busy: BusyScript,
    busy_remaining: u32,
    chip_select_main: Level,
    chip_select_peri: Level,
    events: Vec<Event>,
    transactions: Vec<Transaction>,
    open: Option<Transaction>,
    unselected_bytes: usize,
    busy_polls: u64,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(BusyScript::Idle)
    }
}

impl SimulatedTransport {
    pub fn new(busy: BusyScript) -> Self {
        SimulatedTransport {
            busy,
            busy_remaining: 0,
            chip_select_main: Level::High,
            chip_select_peri: Level::High,
            events: Vec::new(),
            transactions: Vec::new(),
            open: None,
            unselected_bytes: 0,
            busy_polls: 0,
        }
    }

    pub fn set_busy_script(&mut self, busy: BusyScript) {
        self.busy = busy;
        self.busy_remaining = 0;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Levels driven onto one line, in order
    pub fn line_history(&self, line: Line) -> Vec<Level> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Line(l, level) if *l == line => Some(*level),
                _ => None,
            })
            .collect()
    }

    /// Closed transactions, oldest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn is_selected(&self) -> bool {
        self.open.is_some()
    }

    /// Bytes written while no chip select was asserted
    pub fn unselected_bytes(&self) -> usize {
        self.unselected_bytes
    }

    pub fn busy_polls(&self) -> u64 {
        self.busy_polls
    }

    pub fn total_delay_ms(&self) -> u64 {
        self.events
            .iter()
            .map(|event| match event {
                Event::Delay(ms) => u64::from(*ms),
                Event::Line(..) => 0,
            })
            .sum()
    }

    pub fn clear_history(&mut self) {
        self.events.clear();
        self.transactions.clear();
        self.unselected_bytes = 0;
        self.busy_polls = 0;
    }

    fn chip_selects_changed(&mut self) {
        let main = self.chip_select_main == Level::Low;
        let peri = self.chip_select_peri == Level::Low;
        let selected = main || peri;
        match self.open.take() {
            Some(mut open) if selected => {
                open.main |= main;
                open.peri |= peri;
                self.open = Some(open);
            }
            Some(done) => {
                trace!(
                    "transaction {:02X?} closed after {} bytes",
                    done.opcode(),
                    done.bytes.len()
                );
                self.transactions.push(done);
                if let BusyScript::BusyFor(polls) = self.busy {
                    self.busy_remaining = polls;
                }
            }
            None if selected => {
                self.open = Some(Transaction {
                    main,
                    peri,
                    bytes: Vec::new(),
                });
            }
            None => {}
        }
    }
}

impl Transport for SimulatedTransport {
    fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        self.write_bytes(&[byte])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        match &mut self.open {
            Some(open) => open.bytes.extend_from_slice(bytes),
            None => {
                debug!("{} bytes written with no chip selected", bytes.len());
                self.unselected_bytes += bytes.len();
            }
        }
        Ok(())
    }

    fn set_line(&mut self, line: Line, level: Level) -> Result<(), TransportError> {
        self.events.push(Event::Line(line, level));
        match line {
            Line::ChipSelectMain => {
                self.chip_select_main = level;
                self.chip_selects_changed();
            }
            Line::ChipSelectPeri => {
                self.chip_select_peri = level;
                self.chip_selects_changed();
            }
            Line::Busy => return Err(TransportError::NotWritable(line)),
            Line::Reset | Line::Power => {}
        }
        Ok(())
    }

    fn read_line(&mut self, line: Line) -> Result<Level, TransportError> {
        if line != Line::Busy {
            return Err(TransportError::NotReadable(line));
        }
        self.busy_polls += 1;
        let level = match self.busy {
            BusyScript::Idle => Level::High,
            BusyScript::Stuck => Level::Low,
            BusyScript::BusyFor(_) if self.busy_remaining > 0 => {
                self.busy_remaining -= 1;
                Level::Low
            }
            BusyScript::BusyFor(_) => Level::High,
        };
        Ok(level)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(Event::Delay(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_spans_chip_select_scope() {
        let mut sim = SimulatedTransport::default();
        sim.set_line(Line::ChipSelectMain, Level::Low).unwrap();
        sim.set_line(Line::ChipSelectPeri, Level::Low).unwrap();
        sim.write_bytes(&[0x12, 0x00]).unwrap();
        sim.set_line(Line::ChipSelectMain, Level::High).unwrap();
        assert!(sim.is_selected());
        sim.set_line(Line::ChipSelectPeri, Level::High).unwrap();

        assert_eq!(
            sim.transactions(),
            &[Transaction {
                main: true,
                peri: true,
                bytes: vec![0x12, 0x00],
            }]
        );
        assert_eq!(sim.transactions()[0].opcode(), Some(0x12));
        assert_eq!(sim.transactions()[0].payload(), &[0x00]);
    }

    #[test]
    fn test_unselected_bytes_are_counted() {
        let mut sim = SimulatedTransport::default();
        sim.write_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(sim.unselected_bytes(), 3);
        assert!(sim.transactions().is_empty());
    }

    #[test]
    fn test_busy_for_rearms_after_each_transaction() {
        let mut sim = SimulatedTransport::new(BusyScript::BusyFor(2));
        assert_eq!(sim.read_line(Line::Busy).unwrap(), Level::High);

        sim.set_line(Line::ChipSelectMain, Level::Low).unwrap();
        sim.write_byte(0x04).unwrap();
        sim.set_line(Line::ChipSelectMain, Level::High).unwrap();

        assert_eq!(sim.read_line(Line::Busy).unwrap(), Level::Low);
        assert_eq!(sim.read_line(Line::Busy).unwrap(), Level::Low);
        assert_eq!(sim.read_line(Line::Busy).unwrap(), Level::High);
        assert_eq!(sim.busy_polls(), 4);
    }

    #[test]
    fn test_delay_accounting() {
        let mut sim = SimulatedTransport::default();
        sim.delay_ms(30);
        sim.delay_ms(20);
        sim.set_line(Line::Reset, Level::High).unwrap();
        assert_eq!(sim.total_delay_ms(), 50);
        assert_eq!(sim.line_history(Line::Reset), vec![Level::High]);
    }
}
