pub mod info;
pub mod plain;
pub mod scan;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use nrfscan_core::{
    DataRate, Radio, RadioConfig, RadioError, SamplerConfig, SimulatedRadio, SpiConfig,
};

use crate::RadioArgs;

/// Open the radio the arguments describe and configure it for scanning.
///
/// Any failure here happens before scan state exists; callers report it and
/// exit.
pub fn open_radio(args: &RadioArgs, data_rate: DataRate) -> Result<Box<dyn Radio>, RadioError> {
    let mut radio: Box<dyn Radio> = if args.simulate {
        Box::new(SimulatedRadio::new(args.seed))
    } else {
        let config = SpiConfig {
            device: PathBuf::from(&args.spi),
            ce_gpio: args.ce_gpio,
            speed_hz: args.spi_speed,
        };
        Box::new(nrfscan_core::spi::open(&config)?)
    };

    radio.configure(&RadioConfig::default().with_data_rate(data_rate))?;
    log::info!("{} radio ready at {data_rate}", radio.name());
    Ok(radio)
}

/// Open the radio or exit with the error on stderr.
pub fn open_radio_or_exit(args: &RadioArgs, data_rate: DataRate) -> Box<dyn Radio> {
    match open_radio(args, data_rate) {
        Ok(radio) => radio,
        Err(e) => {
            eprintln!("nrfscan: {e}");
            if !args.simulate && matches!(e, RadioError::Io(_)) {
                eprintln!("Is SPI enabled and {} readable by this user?", args.spi);
            }
            std::process::exit(1);
        }
    }
}

pub fn sampler_config(args: &RadioArgs) -> SamplerConfig {
    SamplerConfig {
        settle: Duration::from_micros(args.settle_us),
    }
}

/// clap value parser for `--data-rate`.
pub fn parse_data_rate(s: &str) -> Result<DataRate, String> {
    match s {
        "1mbps" => Ok(DataRate::Mbps1),
        "2mbps" => Ok(DataRate::Mbps2),
        "250kbps" => Ok(DataRate::Kbps250),
        _ => Err(format!("unknown data rate '{s}' (expected 1mbps, 2mbps or 250kbps)")),
    }
}

/// Flag raised by SIGINT, SIGTERM or SIGHUP. The scan loops poll it between
/// ticks, so teardown still runs when the process is told to stop.
pub fn abort_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::Relaxed)) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }
    flag
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // parse_data_rate tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_named_rates() {
        assert_eq!(parse_data_rate("1mbps"), Ok(DataRate::Mbps1));
        assert_eq!(parse_data_rate("2mbps"), Ok(DataRate::Mbps2));
        assert_eq!(parse_data_rate("250kbps"), Ok(DataRate::Kbps250));
    }

    #[test]
    fn test_parse_rejects_other_spellings() {
        for input in ["fast", "", "2", "250", "2MBPS"] {
            let err = parse_data_rate(input).unwrap_err();
            assert!(err.contains("expected 1mbps, 2mbps or 250kbps"), "{input}: {err}");
        }
    }

    // -----------------------------------------------------------------------
    // abort flag
    // -----------------------------------------------------------------------

    #[cfg(unix)]
    #[test]
    fn test_sigterm_raises_abort_flag() {
        let flag = abort_flag();
        // SAFETY: raise() only delivers a signal to this process; the handler
        // installed above turns SIGTERM into a flag store.
        let rc = unsafe { libc::raise(libc::SIGTERM) };
        assert_eq!(rc, 0);

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !flag.load(Ordering::Relaxed) && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(flag.load(Ordering::Relaxed), "SIGTERM must reach the handler");
    }

    // -----------------------------------------------------------------------
    // open_radio tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_open_simulated_radio() {
        let args = RadioArgs {
            simulate: true,
            ..RadioArgs::default()
        };
        let mut radio = open_radio(&args, DataRate::Kbps250).unwrap();
        assert_eq!(radio.name(), "simulated");
        assert!(radio.details().unwrap().contains("250 kbps"));
    }

    #[test]
    fn test_open_missing_spidev_fails() {
        let args = RadioArgs {
            spi: "/nonexistent/spidev7.7".into(),
            ..RadioArgs::default()
        };
        assert!(open_radio(&args, DataRate::Mbps1).is_err());
    }

    #[test]
    fn test_sampler_config_from_args() {
        let args = RadioArgs {
            settle_us: 250,
            ..RadioArgs::default()
        };
        assert_eq!(sampler_config(&args).settle, Duration::from_micros(250));
    }
}
