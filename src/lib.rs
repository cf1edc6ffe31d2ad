//! Driver for the Waveshare 13.3" Spectra 6 e-paper panel and the picture frame
//! cycle built on it.

pub mod constants;
pub mod display_constants;
pub mod e_paper_display;
pub mod e_paper_display_driver;
pub mod frame;

pub use e_paper_display::{BusyConfig, DisplayColor, EpdDevice, EpdError, PanelState};
pub use e_paper_display_driver::{Transport, TransportError};
