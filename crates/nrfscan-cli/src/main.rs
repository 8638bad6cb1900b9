//! CLI for nrfscan — watch the 2.4 GHz band through an nRF24L01.

mod commands;
mod prompt;
mod tui;

use clap::{Args, Parser, Subcommand};
use nrfscan_core::DataRate;

#[derive(Parser)]
#[command(name = "nrfscan")]
#[command(about = "nrfscan — watch the 2.4 GHz band through an nRF24L01")]
#[command(version = nrfscan_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the radio lives and how it listens.
#[derive(Args, Clone, Debug)]
pub struct RadioArgs {
    /// spidev device the radio's CSN is wired to
    #[arg(long, default_value = "/dev/spidev0.0")]
    spi: String,

    /// GPIO number of the radio's CE line
    #[arg(long, default_value = "22")]
    ce_gpio: u32,

    /// SPI clock in Hz
    #[arg(long, default_value = "10000000")]
    spi_speed: u32,

    /// Microseconds to listen before each presence test
    #[arg(long, default_value = "130")]
    settle_us: u64,

    /// Use the simulated radio instead of hardware
    #[arg(long)]
    simulate: bool,

    /// Seed for the simulated radio
    #[arg(long, default_value = "2400")]
    seed: u64,
}

impl Default for RadioArgs {
    fn default() -> Self {
        Self {
            spi: "/dev/spidev0.0".into(),
            ce_gpio: 22,
            spi_speed: 10_000_000,
            settle_us: 130,
            simulate: false,
            seed: 2400,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Live channel activity grid (TUI). Prompts for anything not given.
    Scan {
        /// Data rate: 1mbps, 2mbps, 250kbps
        #[arg(long, value_parser = commands::parse_data_rate)]
        data_rate: Option<DataRate>,

        /// Scan duration in seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Print a JSON summary of per-channel totals after the grid
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        radio: RadioArgs,
    },

    /// Line-oriented scan: one hex-digit row per block of passes
    Plain {
        /// Data rate: 1mbps, 2mbps, 250kbps
        #[arg(long, default_value = "1mbps", value_parser = commands::parse_data_rate)]
        data_rate: DataRate,

        /// Full passes over the band per output line
        #[arg(long, default_value = "100")]
        passes: usize,

        /// Stop after this many seconds (0 = until Ctrl+C)
        #[arg(long, default_value = "0")]
        duration: u64,

        #[command(flatten)]
        radio: RadioArgs,
    },

    /// Open the radio and print its register settings
    Info {
        /// Data rate: 1mbps, 2mbps, 250kbps
        #[arg(long, default_value = "1mbps", value_parser = commands::parse_data_rate)]
        data_rate: DataRate,

        #[command(flatten)]
        radio: RadioArgs,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        None => commands::scan::run(commands::scan::ScanCommandConfig {
            data_rate: None,
            duration: None,
            json: false,
            radio: RadioArgs::default(),
        }),
        Some(Commands::Scan {
            data_rate,
            duration,
            json,
            radio,
        }) => commands::scan::run(commands::scan::ScanCommandConfig {
            data_rate,
            duration,
            json,
            radio,
        }),
        Some(Commands::Plain {
            data_rate,
            passes,
            duration,
            radio,
        }) => commands::plain::run(data_rate, passes, duration, &radio),
        Some(Commands::Info { data_rate, radio }) => commands::info::run(data_rate, &radio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_data_rate_is_typed() {
        let cli = Cli::try_parse_from(["nrfscan", "scan", "--data-rate", "250kbps"]).unwrap();
        match cli.command {
            Some(Commands::Scan { data_rate, .. }) => assert_eq!(data_rate, Some(DataRate::Kbps250)),
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_scan_without_data_rate_prompts_later() {
        let cli = Cli::try_parse_from(["nrfscan", "scan", "--simulate"]).unwrap();
        match cli.command {
            Some(Commands::Scan { data_rate, radio, .. }) => {
                assert_eq!(data_rate, None);
                assert!(radio.simulate);
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_plain_defaults_to_1mbps() {
        let cli = Cli::try_parse_from(["nrfscan", "plain"]).unwrap();
        match cli.command {
            Some(Commands::Plain { data_rate, passes, .. }) => {
                assert_eq!(data_rate, DataRate::Mbps1);
                assert_eq!(passes, 100);
            }
            _ => panic!("expected plain"),
        }
    }

    #[test]
    fn test_unknown_data_rate_rejected() {
        for args in [
            ["nrfscan", "plain", "--data-rate", "2"],
            ["nrfscan", "info", "--data-rate", "fast"],
            ["nrfscan", "scan", "--data-rate", "2MBPS"],
        ] {
            let err = Cli::try_parse_from(args).err().expect("rejected");
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{args:?}");
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
