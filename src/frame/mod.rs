//! One wake-up of the picture frame.
//!
//! Mount the card, pick the next image from the playlist, stream it to the panel,
//! advance the cursor and hand over to the board's deep sleep. Whatever fails, the
//! panel is put to sleep and the board still goes back to sleep.

pub mod playlist;
pub mod storage;

pub use playlist::{Cursor, Playlist, Selection};
pub use storage::{DirStorage, Storage};

use crate::e_paper_display::{EpdDevice, EpdError};
use crate::e_paper_display_driver::Transport;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("storage unavailable")]
    StorageUnavailable(#[source] io::Error),
    #[error("cannot read playlist {path}")]
    Playlist { path: String, source: io::Error },
    #[error("playlist has no entries")]
    EmptyPlaylist,
    #[error("cannot open image {path}")]
    ImageOpen { path: String, source: io::Error },
    #[error("cannot store cursor in {path}")]
    Cursor { path: String, source: io::Error },
    #[error(transparent)]
    Display(#[from] EpdError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SleepKind {
    AfterSuccess,
    AfterError,
}

/// Whatever puts the board to sleep until the next wake-up.
pub trait Hibernate {
    /// `wake_after` of `None` sleeps until an external wake source fires
    fn deep_sleep(&mut self, kind: SleepKind, wake_after: Option<Duration>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    pub order_file: String,
    pub index_file: String,
    pub sleep_after_success: Option<Duration>,
    pub sleep_after_error: Option<Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            order_file: "/order.txt".to_string(),
            index_file: "/index.txt".to_string(),
            sleep_after_success: Some(DAY),
            sleep_after_error: Some(DAY),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub image: String,
    pub shown: usize,
    pub next: Cursor,
}

/// Show the next image. The cursor only moves once the panel has finished refreshing.
pub fn run_cycle<T, S>(
    device: &mut EpdDevice<T>,
    storage: &mut S,
    config: &FrameConfig,
) -> Result<CycleReport, FrameError>
where
    T: Transport,
    S: Storage,
{
    storage.mount().map_err(FrameError::StorageUnavailable)?;

    let order = storage
        .read_to_string(&config.order_file)
        .map_err(|source| FrameError::Playlist {
            path: config.order_file.clone(),
            source,
        })?;
    let playlist = Playlist::parse(&order);
    info!("Found {} picture(s) in order file", playlist.len());

    let cursor = match storage.read_to_string(&config.index_file) {
        Ok(text) => Cursor::parse(&text),
        Err(e) => {
            warn!("No cursor in {} ({}), starting over", config.index_file, e);
            Cursor::default()
        }
    };
    info!("Current picture index: {}", cursor);

    let selection = playlist.select(cursor)?;
    info!("Displaying picture: {}", selection.path);

    let mut image = storage
        .open_image(selection.path)
        .map_err(|source| FrameError::ImageOpen {
            path: selection.path.to_string(),
            source,
        })?;

    device.init()?;
    device.write_rows(&mut image)?;
    drop(image);
    device.turn_on_display()?;

    storage
        .write_string(&config.index_file, &selection.next.to_string())
        .map_err(|source| FrameError::Cursor {
            path: config.index_file.clone(),
            source,
        })?;
    info!("Updated index stored: {}", selection.next);
    storage.unmount();

    Ok(CycleReport {
        image: selection.path.to_string(),
        shown: selection.index,
        next: selection.next,
    })
}

/// A full wake-up: power the panel, run the cycle, then sleep the panel and the board.
pub fn run_and_hibernate<T, S, H>(
    device: &mut EpdDevice<T>,
    storage: &mut S,
    hibernate: &mut H,
    config: &FrameConfig,
) -> Result<CycleReport, FrameError>
where
    T: Transport,
    S: Storage,
    H: Hibernate,
{
    let result = device
        .power_up()
        .map_err(FrameError::from)
        .and_then(|_| run_cycle(device, storage, config));

    if let Err(e) = &result {
        error!("Display cycle failed: {}", e);
        storage.unmount();
    }

    if let Err(e) = device.sleep() {
        error!("Panel did not take the sleep command: {}", e);
    }
    if let Err(e) = device.power_down() {
        error!("Panel power down failed: {}", e);
    }

    let (kind, wake_after) = match result {
        Ok(_) => (SleepKind::AfterSuccess, config.sleep_after_success),
        Err(_) => (SleepKind::AfterError, config.sleep_after_error),
    };
    info!("Entering deep sleep ({:?})", kind);
    hibernate.deep_sleep(kind, wake_after);
    result
}
