use clap::{Parser, Subcommand, ValueEnum};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevBus;
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::hal::Delay;
use spectra_frame::constants::known_pin::KnownPin;
use spectra_frame::e_paper_display_driver::{
    BitBangTransport, BusyScript, ControlPins, SimulatedTransport, SpiTransport,
};
use spectra_frame::frame::{self, DirStorage, FrameConfig, Hibernate, SleepKind};
use spectra_frame::{BusyConfig, DisplayColor, EpdDevice, Transport};
use std::error::Error;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;
use tracing::info;
use tracing::metadata::LevelFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Drive an in-memory panel instead of the GPIO header
    #[arg(long)]
    simulate: bool,

    #[arg(long, value_enum, default_value_t = TransportKind::BitBang)]
    transport: TransportKind,

    #[arg(long, env = "SPECTRA_BUSY_TIMEOUT_MS", default_value_t = 60_000)]
    busy_timeout_ms: u64,

    /// More output, repeat for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    BitBang,
    Spidev,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the next image of the playlist, advance the cursor and sleep
    Cycle {
        /// Directory holding the order file, the index file and the images
        #[arg(long, env = "SPECTRA_ROOT")]
        root: PathBuf,
        #[arg(long, default_value = "/order.txt")]
        order_file: String,
        #[arg(long, default_value = "/index.txt")]
        index_file: String,
        #[arg(long, env = "SPECTRA_SLEEP_SECS", default_value_t = 86_400)]
        sleep_secs: u64,
        /// Keep cycling, sleeping in between
        #[arg(long)]
        repeat: bool,
    },
    /// Stream a raw 4-bit image file and refresh
    Show { file: PathBuf },
    Clear {
        #[arg(long, default_value_t = DisplayColor::White)]
        color: DisplayColor,
    },
    /// Update one rectangle from a raw file of width/2 bytes per row
    Partial {
        file: PathBuf,
        #[arg(long)]
        x: u16,
        #[arg(long)]
        y: u16,
        #[arg(long)]
        width: u16,
        #[arg(long)]
        height: u16,
    },
    /// Six color bands
    TestPattern,
    /// Put the panel into deep sleep and cut its power
    Sleep,
}

/// Stands in for the board's deep sleep: the process waits when repeating, otherwise exits.
struct ProcessSleep {
    repeat: bool,
}

impl Hibernate for ProcessSleep {
    fn deep_sleep(&mut self, kind: SleepKind, wake_after: Option<Duration>) {
        match (self.repeat, wake_after) {
            (true, Some(wake_after)) => {
                info!("Sleep {:?} for {}s", kind, wake_after.as_secs());
                sleep(wake_after);
            }
            _ => info!("Sleep {:?}, exiting", kind),
        }
    }
}

fn control_pins(gpio: &Gpio) -> Result<ControlPins<OutputPin, InputPin>, rppal::gpio::Error> {
    Ok(ControlPins {
        reset: gpio.get(KnownPin::Reset.into())?.into_output_low(),
        chip_select_main: gpio.get(KnownPin::ChipSelectMain.into())?.into_output_high(),
        chip_select_peri: gpio.get(KnownPin::ChipSelectPeri.into())?.into_output_high(),
        power: gpio.get(KnownPin::Power.into())?.into_output_low(),
        busy: gpio.get(KnownPin::Busy.into())?.into_input(),
    })
}

fn power_up_and_init<T: Transport>(device: &mut EpdDevice<T>) -> Result<(), Box<dyn Error>> {
    device.power_up()?;
    device.init()?;
    Ok(())
}

fn finish<T: Transport>(device: &mut EpdDevice<T>) -> Result<(), Box<dyn Error>> {
    device.sleep()?;
    device.power_down()?;
    Ok(())
}

fn run_command<T: Transport>(
    device: &mut EpdDevice<T>,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Cycle {
            root,
            order_file,
            index_file,
            sleep_secs,
            repeat,
        } => {
            let wake_after = Some(Duration::from_secs(sleep_secs));
            let config = FrameConfig {
                order_file,
                index_file,
                sleep_after_success: wake_after,
                sleep_after_error: wake_after,
            };
            let mut storage = DirStorage::new(root);
            let mut hibernate = ProcessSleep { repeat };
            loop {
                let outcome = frame::run_and_hibernate(device, &mut storage, &mut hibernate, &config);
                if let Ok(report) = &outcome {
                    info!("Showed {} ({}), next {}", report.image, report.shown, report.next);
                }
                if !repeat {
                    outcome?;
                    return Ok(());
                }
            }
        }
        Command::Show { file } => {
            info!("Reading file...");
            let mut image = BufReader::new(File::open(&file)?);
            power_up_and_init(device)?;
            device.display_from_reader(&mut image)?;
            finish(device)
        }
        Command::Clear { color } => {
            power_up_and_init(device)?;
            device.clear(color)?;
            finish(device)
        }
        Command::Partial {
            file,
            x,
            y,
            width,
            height,
        } => {
            let image = fs::read(&file)?;
            power_up_and_init(device)?;
            device.display_partial(&image, x, y, width, height)?;
            finish(device)
        }
        Command::TestPattern => {
            power_up_and_init(device)?;
            device.show_six_blocks()?;
            finish(device)
        }
        Command::Sleep => finish(device),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let busy = BusyConfig {
        timeout_ms: args.busy_timeout_ms,
        ..BusyConfig::default()
    };

    if args.simulate {
        let mut device = EpdDevice::new(SimulatedTransport::new(BusyScript::BusyFor(3)), busy);
        let result = run_command(&mut device, args.command);
        let sim = device.transport();
        info!(
            "Simulated {} transactions, {} ms of delays",
            sim.transactions().len(),
            sim.total_delay_ms()
        );
        return result;
    }

    let gpio = Gpio::new()?;
    let pins = control_pins(&gpio)?;
    match args.transport {
        TransportKind::BitBang => {
            let clock = gpio.get(KnownPin::Clock.into())?.into_output_low();
            let data = gpio.get(KnownPin::Data.into())?.into_output_low();
            let transport = BitBangTransport::new(pins, clock, data, Delay::new())?;
            run_command(&mut EpdDevice::new(transport, busy), args.command)
        }
        TransportKind::Spidev => {
            let mut spi = SpidevBus::open("/dev/spidev0.0")?;
            let options = SpidevOptions::new()
                .bits_per_word(8)
                .max_speed_hz(32_000_000)
                .mode(SpiModeFlags::SPI_MODE_0 | SpiModeFlags::SPI_NO_CS)
                .build();
            spi.configure(&options)?;
            let transport = SpiTransport::new(spi, pins, Delay::new());
            run_command(&mut EpdDevice::new(transport, busy), args.command)
        }
    }
}
