pub mod color;
pub mod window;

pub use color::DisplayColor;
pub use window::{Half, PartialWindow, Placement, KEEP};

use crate::constants::command_code::CommandCode;
use crate::display_constants::{HEIGHT, IMAGE_BYTES, ROW_BYTES, SEGMENT_BYTES};
use crate::e_paper_display_driver::{Level, Line, Transport, TransportError};
use std::io::{self, Read, Seek, SeekFrom};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Pause after each streamed row
const ROW_PACE_MS: u32 = 1;
const RESET_STEP_MS: u32 = 30;
const PON_TO_DRF_MS: u32 = 50;
const POWER_SETTLE_MS: u32 = 500;

#[derive(Debug, Error)]
pub enum EpdError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("panel still busy after {waited_ms} ms")]
    BusyTimeout { waited_ms: u64 },
    #[error("{operation} is not possible while the panel is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: PanelState,
    },
    #[error("image buffer holds {actual} bytes, {expected} needed")]
    BufferTooSmall { expected: usize, actual: usize },
    #[error("image data ends before row {row}")]
    TruncatedImage { row: usize, source: io::Error },
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanelState {
    Unpowered,
    Reset,
    Initialized,
    Transmitting,
    Refreshing,
    Sleeping,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectedChip {
    /// Left half
    Main,
    /// Right half
    Peri,
    Both,
}

/// Register setup sent after every reset, one chip select scope per command.
pub const INIT_SEQUENCE: [(CommandCode, SelectedChip); 16] = [
    (CommandCode::AnTm, SelectedChip::Main),
    (CommandCode::Cmd66, SelectedChip::Both),
    (CommandCode::Psr, SelectedChip::Both),
    (CommandCode::Cdi, SelectedChip::Both),
    (CommandCode::Tcon, SelectedChip::Both),
    (CommandCode::Agid, SelectedChip::Both),
    (CommandCode::Pws, SelectedChip::Both),
    (CommandCode::Ccset, SelectedChip::Both),
    (CommandCode::Tres, SelectedChip::Both),
    (CommandCode::Pwr, SelectedChip::Main),
    (CommandCode::EnBuf, SelectedChip::Main),
    (CommandCode::BtstP, SelectedChip::Main),
    (CommandCode::BoostVddpEn, SelectedChip::Main),
    (CommandCode::BtstN, SelectedChip::Main),
    (CommandCode::BuckBoostVddn, SelectedChip::Main),
    (CommandCode::TftVcomPower, SelectedChip::Main),
];

/// How the busy line is polled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BusyConfig {
    pub poll_ms: u32,
    /// Extra wait once the line reads idle
    pub settle_ms: u32,
    /// Give up after `timeout_ms / poll_ms` polls (one poll per millisecond when `poll_ms`
    /// is 0). A refresh normally takes well under a minute.
    pub timeout_ms: u64,
}

impl Default for BusyConfig {
    fn default() -> Self {
        BusyConfig {
            poll_ms: 10,
            settle_ms: 20,
            timeout_ms: 60_000,
        }
    }
}

/// Driver for the 13.3" Spectra 6 panel. The left half of every row belongs to the
/// main controller chip and the right half to the peripheral chip.
#[derive(Debug)]
pub struct EpdDevice<T> {
    transport: T,
    state: PanelState,
    busy: BusyConfig,
}

impl<T: Transport> EpdDevice<T> {
    pub fn new(transport: T, busy: BusyConfig) -> Self {
        EpdDevice {
            transport,
            state: PanelState::Unpowered,
            busy,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn select(&mut self, chip: SelectedChip) -> Result<(), TransportError> {
        match chip {
            SelectedChip::Main => self.transport.set_line(Line::ChipSelectMain, Level::Low),
            SelectedChip::Peri => self.transport.set_line(Line::ChipSelectPeri, Level::Low),
            SelectedChip::Both => {
                self.transport.set_line(Line::ChipSelectMain, Level::Low)?;
                self.transport.set_line(Line::ChipSelectPeri, Level::Low)
            }
        }
    }

    fn deselect(&mut self) -> Result<(), TransportError> {
        self.transport.set_line(Line::ChipSelectMain, Level::High)?;
        self.transport.set_line(Line::ChipSelectPeri, Level::High)
    }

    /// Run `f` with `chip` selected. Both chip selects are released afterwards, also when `f` fails.
    fn with_chip<R, F>(&mut self, chip: SelectedChip, f: F) -> Result<R, EpdError>
    where
        F: FnOnce(&mut T) -> Result<R, EpdError>,
    {
        let result = match self.select(chip) {
            Ok(()) => f(&mut self.transport),
            Err(e) => Err(e.into()),
        };
        let released = self.deselect();
        let value = result?;
        released?;
        Ok(value)
    }

    pub fn send_command(
        &mut self,
        command_code: CommandCode,
        selected_chip: SelectedChip,
    ) -> Result<(), EpdError> {
        debug!("Send {:?} to {:?}", command_code, selected_chip);
        self.with_chip(selected_chip, |transport| {
            transport.write_byte(command_code.cmd())?;
            transport.write_bytes(command_code.data())?;
            Ok(())
        })
    }

    /// `DTM` followed by `rows` rows of one half. `fill` produces each row, the pace
    /// delay follows every `pace_every` rows.
    fn stream_half<F>(
        &mut self,
        chip: SelectedChip,
        rows: usize,
        pace_every: usize,
        mut fill: F,
    ) -> Result<(), EpdError>
    where
        F: FnMut(usize, &mut [u8]) -> Result<(), EpdError>,
    {
        let mut row_bytes = [0u8; SEGMENT_BYTES];
        self.with_chip(chip, |transport| {
            transport.write_byte(CommandCode::Dtm.cmd())?;
            for row in 0..rows {
                fill(row, &mut row_bytes)?;
                transport.write_bytes(&row_bytes)?;
                if (row + 1) % pace_every == 0 {
                    transport.delay_ms(ROW_PACE_MS);
                }
            }
            Ok(())
        })
    }

    fn require_initialized(&self, operation: &'static str) -> Result<(), EpdError> {
        if self.state != PanelState::Initialized {
            warn!("{} refused while {:?}", operation, self.state);
            return Err(EpdError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Streams frame data. The panel is back in `Initialized` afterwards whatever `f` returns.
    fn transmit<F>(&mut self, operation: &'static str, f: F) -> Result<(), EpdError>
    where
        F: FnOnce(&mut Self) -> Result<(), EpdError>,
    {
        self.require_initialized(operation)?;
        self.state = PanelState::Transmitting;
        let result = f(self);
        self.state = PanelState::Initialized;
        if let Err(e) = &result {
            error!("{} failed: {}", operation, e);
        }
        result
    }

    pub fn reset(&mut self) -> Result<(), EpdError> {
        debug!("Reset");
        for level in [Level::High, Level::Low, Level::High, Level::Low, Level::High] {
            self.transport.set_line(Line::Reset, level)?;
            self.transport.delay_ms(RESET_STEP_MS);
        }
        self.state = PanelState::Reset;
        Ok(())
    }

    pub fn wait_for_not_busy(&mut self) -> Result<(), EpdError> {
        debug!("e-Paper busy");
        let poll_ms = u64::from(self.busy.poll_ms);
        let max_polls = self.busy.timeout_ms / poll_ms.max(1);
        let mut polls = 0u64;
        while self.transport.read_line(Line::Busy)? == Level::Low {
            if polls >= max_polls {
                let waited_ms = polls * poll_ms;
                error!("e-Paper still busy after {} polls ({} ms)", polls, waited_ms);
                return Err(EpdError::BusyTimeout { waited_ms });
            }
            self.transport.delay_ms(self.busy.poll_ms);
            polls += 1;
        }
        self.transport.delay_ms(self.busy.settle_ms);
        debug!("e-Paper busy release after {} ms", polls * poll_ms);
        Ok(())
    }

    pub fn init(&mut self) -> Result<(), EpdError> {
        info!("EPD init...");
        if self.state != PanelState::Reset {
            self.reset()?;
        }
        for (command, selected_chip) in INIT_SEQUENCE {
            self.send_command(command, selected_chip)?;
        }
        self.state = PanelState::Initialized;
        Ok(())
    }

    pub fn turn_on_display(&mut self) -> Result<(), EpdError> {
        self.require_initialized("turn_on_display")?;
        self.state = PanelState::Refreshing;

        info!("Write PON");
        self.send_command(CommandCode::Pon, SelectedChip::Both)?;
        self.wait_for_not_busy()?;

        self.transport.delay_ms(PON_TO_DRF_MS);

        info!("Write DRF");
        self.send_command(CommandCode::Drf, SelectedChip::Both)?;
        self.wait_for_not_busy()?;

        info!("Write POF");
        self.send_command(CommandCode::Pof, SelectedChip::Both)?;

        info!("Display Done");
        self.state = PanelState::Initialized;
        Ok(())
    }

    /// Fill the whole panel with one color and refresh
    pub fn clear(&mut self, color: DisplayColor) -> Result<(), EpdError> {
        info!("Clear to {}", color);
        let packed = color.packed();
        self.transmit("clear", |epd| {
            for chip in [SelectedChip::Main, SelectedChip::Peri] {
                epd.stream_half(chip, HEIGHT, 1, |_, row| {
                    row.fill(packed);
                    Ok(())
                })?;
            }
            Ok(())
        })?;
        self.turn_on_display()
    }

    /// Show a full frame of `HEIGHT` rows, `ROW_BYTES` each, and refresh
    pub fn display(&mut self, image: &[u8]) -> Result<(), EpdError> {
        if image.len() < IMAGE_BYTES {
            return Err(EpdError::BufferTooSmall {
                expected: IMAGE_BYTES,
                actual: image.len(),
            });
        }
        self.transmit("display", |epd| {
            for (chip, offset) in [(SelectedChip::Main, 0), (SelectedChip::Peri, SEGMENT_BYTES)] {
                epd.stream_half(chip, HEIGHT, 1, |i, row| {
                    let start = i * ROW_BYTES + offset;
                    row.copy_from_slice(&image[start..start + SEGMENT_BYTES]);
                    Ok(())
                })?;
            }
            Ok(())
        })?;
        self.turn_on_display()
    }

    /// Update the rectangle at (`x`, `y`) in pixels from a buffer of `width / 2` bytes
    /// per row; every cell outside it is kept.
    pub fn display_partial(
        &mut self,
        image: &[u8],
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), EpdError> {
        let window = PartialWindow::new(x, y, width, height);
        let expected = window.required_len();
        if image.len() < expected {
            return Err(EpdError::BufferTooSmall {
                expected,
                actual: image.len(),
            });
        }
        debug!("Partial window {:?}", window);
        self.transmit("display_partial", |epd| {
            for (chip, half) in [(SelectedChip::Main, Half::Left), (SelectedChip::Peri, Half::Right)] {
                epd.stream_half(chip, HEIGHT, 1, |i, row| {
                    window.fill_row(half, i, image, row);
                    Ok(())
                })?;
            }
            Ok(())
        })?;
        self.turn_on_display()
    }

    /// Six horizontal color bands, the panel's factory test pattern
    pub fn show_six_blocks(&mut self) -> Result<(), EpdError> {
        let band = HEIGHT / 6;
        self.transmit("show_six_blocks", |epd| {
            for chip in [SelectedChip::Main, SelectedChip::Peri] {
                epd.stream_half(chip, band * 6, band, |i, row| {
                    row.fill(DisplayColor::SIX_BLOCKS[i / band].packed());
                    Ok(())
                })?;
            }
            Ok(())
        })?;
        self.turn_on_display()
    }

    /// Stream a raw frame from `reader` without refreshing. The reader is rewound for each half.
    pub fn write_rows<R>(&mut self, reader: &mut R) -> Result<(), EpdError>
    where
        R: Read + Seek,
    {
        self.transmit("write_rows", |epd| {
            let mut row_buffer = [0u8; ROW_BYTES];
            for (chip, offset) in [(SelectedChip::Main, 0), (SelectedChip::Peri, SEGMENT_BYTES)] {
                reader.seek(SeekFrom::Start(0))?;
                epd.stream_half(chip, HEIGHT, 1, |i, row| {
                    reader
                        .read_exact(&mut row_buffer)
                        .map_err(|source| EpdError::TruncatedImage { row: i, source })?;
                    row.copy_from_slice(&row_buffer[offset..offset + SEGMENT_BYTES]);
                    Ok(())
                })?;
            }
            debug!("Finished sending {} rows", HEIGHT);
            Ok(())
        })
    }

    pub fn display_from_reader<R>(&mut self, reader: &mut R) -> Result<(), EpdError>
    where
        R: Read + Seek,
    {
        self.write_rows(reader)?;
        self.turn_on_display()
    }

    /// Deep sleep. Accepted in any state, only `reset` + `init` wake the panel again.
    pub fn sleep(&mut self) -> Result<(), EpdError> {
        info!("Putting display to sleep...");
        self.send_command(CommandCode::DeepSleep, SelectedChip::Both)?;
        self.state = PanelState::Sleeping;
        Ok(())
    }

    /// Switch the panel supply on with both halves deselected
    pub fn power_up(&mut self) -> Result<(), EpdError> {
        debug!("Power up");
        self.deselect()?;
        self.transport.delay_ms(POWER_SETTLE_MS);
        self.transport.set_line(Line::Power, Level::High)?;
        self.transport.delay_ms(POWER_SETTLE_MS);
        Ok(())
    }

    pub fn power_down(&mut self) -> Result<(), EpdError> {
        debug!("Power down");
        self.transport.set_line(Line::Power, Level::Low)?;
        self.transport.set_line(Line::Reset, Level::Low)?;
        self.state = PanelState::Unpowered;
        Ok(())
    }
}
