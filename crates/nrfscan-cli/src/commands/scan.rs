use std::io::{self, Write};
use std::time::Duration;

use nrfscan_core::{DataRate, GRID_ROWS, RadioConfig, ScanConfig, ScanReport, Screen, run_scan};

use crate::RadioArgs;
use crate::tui::app::TerminalScreen;

pub struct ScanCommandConfig {
    pub data_rate: Option<DataRate>,
    pub duration: Option<u64>,
    pub json: bool,
    pub radio: RadioArgs,
}

pub fn run(cfg: ScanCommandConfig) {
    // Probe the hardware before asking any questions.
    let mut radio = super::open_radio_or_exit(&cfg.radio, cfg.data_rate.unwrap_or_default());

    let (data_rate, duration) = match resolve(&cfg) {
        Ok(answers) => answers,
        Err(e) => {
            eprintln!("nrfscan: {e}");
            std::process::exit(1);
        }
    };
    if cfg.data_rate != Some(data_rate)
        && let Err(e) = radio.configure(&RadioConfig::default().with_data_rate(data_rate))
    {
        eprintln!("nrfscan: {e}");
        std::process::exit(1);
    }
    match radio.details() {
        Ok(details) => log::info!("radio details:\n{details}"),
        Err(e) => log::warn!("could not read radio details: {e}"),
    }

    let config = ScanConfig {
        duration: Duration::from_secs(duration),
        data_rate,
        sampler: super::sampler_config(&cfg.radio),
        ..ScanConfig::default()
    };

    let abort = super::abort_flag();
    let mut screen = TerminalScreen::new(abort.clone());
    let result = run_scan(radio.as_mut(), &mut screen, &config, &abort);

    // Leave the last picture of the band on the normal terminal.
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = print_snapshot(&screen, &mut out) {
        log::warn!("could not print the final grid: {e}");
    }

    match result {
        Ok(report) => {
            let printed = if cfg.json {
                serde_json::to_string_pretty(&report)
                    .map_err(io::Error::from)
                    .and_then(|json| writeln!(out, "{json}"))
            } else {
                print_busiest(&report, &mut out)
            };
            if let Err(e) = printed {
                eprintln!("nrfscan: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("nrfscan: scan failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Ask for whatever the command line left out.
fn resolve(cfg: &ScanCommandConfig) -> io::Result<(DataRate, u64)> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let data_rate = match cfg.data_rate {
        Some(rate) => rate,
        None => crate::prompt::ask_data_rate(&mut input, &mut output)?,
    };
    let duration = match cfg.duration {
        Some(secs) => secs,
        None => crate::prompt::ask_duration(&mut input, &mut output)?,
    };
    Ok((data_rate, duration))
}

/// Rows 1-20 of the final frame. Row 0 is the countdown line.
fn print_snapshot(screen: &impl Screen, out: &mut impl Write) -> io::Result<()> {
    for row in 1..GRID_ROWS as u16 {
        match screen.read_line(row) {
            Some(line) => writeln!(out, "{line}")?,
            None => break,
        }
    }
    Ok(())
}

const BUSIEST_SHOWN: usize = 5;

fn print_busiest(report: &ScanReport, out: &mut impl Write) -> io::Result<()> {
    let busiest = report.busiest();
    if busiest.is_empty() {
        return writeln!(out, "No activity detected.");
    }
    let list: Vec<String> = busiest
        .iter()
        .take(BUSIEST_SHOWN)
        .map(|c| format!("{} MHz ({})", c.frequency_mhz, c.total))
        .collect();
    writeln!(out, "Busiest: {}", list.join(", "))
}
