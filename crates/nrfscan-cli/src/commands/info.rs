use nrfscan_core::{DataRate, TOTAL_CHANNELS, frequency_mhz};

use crate::RadioArgs;

pub fn run(data_rate: DataRate, args: &RadioArgs) {
    let mut radio = super::open_radio_or_exit(args, data_rate);

    println!("Radio: {}", radio.name());
    println!(
        "Band:  {} channels, {}-{} MHz",
        TOTAL_CHANNELS,
        frequency_mhz(0),
        frequency_mhz(TOTAL_CHANNELS - 1)
    );
    println!();

    let details = radio.details();
    if let Err(e) = radio.power_down() {
        log::warn!("power down failed: {e}");
    }
    match details {
        Ok(details) => println!("{details}"),
        Err(e) => {
            eprintln!("nrfscan: {e}");
            std::process::exit(1);
        }
    }
}
