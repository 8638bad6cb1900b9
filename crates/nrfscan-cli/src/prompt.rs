//! Interactive questions asked when `scan` is run without its options.

use std::io::{self, BufRead, Write};

use nrfscan_core::DataRate;

const DURATION_QUESTION: &str = "how long (in seconds) to perform scan? ";

/// Show the data rate menu and read a choice.
///
/// Empty or non-numeric input picks the first option; numbers outside the
/// menu are clamped onto it.
pub fn ask_data_rate<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<DataRate> {
    for (i, rate) in DataRate::ALL.iter().enumerate() {
        writeln!(out, "{}. {rate}", i + 1)?;
    }
    write!(
        out,
        "Select your data rate [1, 2, 3] (defaults to {}) ",
        DataRate::ALL[0]
    )?;
    out.flush()?;

    let answer = read_answer(input)?;
    Ok(parse_rate_choice(&answer))
}

/// Read a scan duration, asking again until a whole number is given.
pub fn ask_duration<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<u64> {
    write!(out, "{DURATION_QUESTION}")?;
    out.flush()?;
    loop {
        let answer = read_answer(input)?;
        if let Ok(secs) = answer.parse::<u64>() {
            return Ok(secs);
        }
        writeln!(out, "Please enter a number.")?;
        write!(out, "{DURATION_QUESTION}")?;
        out.flush()?;
    }
}

pub fn parse_rate_choice(answer: &str) -> DataRate {
    let choice = answer.parse::<i64>().unwrap_or(1);
    let index = choice.clamp(1, DataRate::ALL.len() as i64) as usize - 1;
    DataRate::ALL[index]
}

fn read_answer<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before an answer was given",
        ));
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_rate_choices() {
        assert_eq!(parse_rate_choice("1"), DataRate::Mbps1);
        assert_eq!(parse_rate_choice("2"), DataRate::Mbps2);
        assert_eq!(parse_rate_choice("3"), DataRate::Kbps250);
    }

    #[test]
    fn test_rate_empty_and_garbage_default() {
        assert_eq!(parse_rate_choice(""), DataRate::Mbps1);
        assert_eq!(parse_rate_choice("fast"), DataRate::Mbps1);
    }

    #[test]
    fn test_rate_out_of_range_clamped() {
        assert_eq!(parse_rate_choice("0"), DataRate::Mbps1);
        assert_eq!(parse_rate_choice("-4"), DataRate::Mbps1);
        assert_eq!(parse_rate_choice("9"), DataRate::Kbps250);
    }

    #[test]
    fn test_menu_is_printed() {
        let mut input = Cursor::new("2\n");
        let mut out = Vec::new();
        let rate = ask_data_rate(&mut input, &mut out).unwrap();
        assert_eq!(rate, DataRate::Mbps2);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("1. 1 Mbps\n2. 2 Mbps\n3. 250 kbps\n"));
        assert!(text.ends_with("Select your data rate [1, 2, 3] (defaults to 1 Mbps) "));
    }

    #[test]
    fn test_duration_reprompts_until_number() {
        let mut input = Cursor::new("soon\n-3\n\n45\n");
        let mut out = Vec::new();
        assert_eq!(ask_duration(&mut input, &mut out).unwrap(), 45);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Please enter a number.").count(), 3);
        assert_eq!(text.matches(DURATION_QUESTION).count(), 4);
    }

    #[test]
    fn test_duration_eof_is_error() {
        let mut input = Cursor::new("abc\n");
        let mut out = Vec::new();
        let err = ask_duration(&mut input, &mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
