//! Reading and writing for the text format.
//!
//! The text format has one configuration per line, written as a parenthesised, comma-separated
//! list of class counts followed by a colon and a value, e.g. `(0,1,2): 3.5e-4`. Whitespace
//! around tokens is ignored, and blank lines are skipped.

use std::{io, str::FromStr};

use nom::{
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map, map_res},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, separated_pair},
    IResult,
};

use crate::{config::Config, table::Frequencies};

use super::Error;

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(space0, inner, space0)
}

fn entry(s: &str) -> IResult<&str, usize> {
    ws(map_res(digit1, usize::from_str))(s)
}

fn config(s: &str) -> IResult<&str, Config> {
    map(
        delimited(ws(char('(')), separated_list1(char(','), entry), ws(char(')'))),
        Config,
    )(s)
}

fn line(s: &str) -> IResult<&str, (Config, f64)> {
    all_consuming(separated_pair(config, char(':'), ws(double)))(s)
}

/// Parses a single line in text format.
///
/// Returns `None` if the line is malformed.
pub fn parse_line(s: &str) -> Option<(Config, f64)> {
    line(s.trim()).ok().map(|(_, parsed)| parsed)
}

/// Reads a frequency table in text format from a reader.
pub fn read_frequencies<R>(reader: &mut R) -> Result<Frequencies, Error>
where
    R: io::BufRead,
{
    let mut frequencies = Frequencies::default();
    let mut len = None;

    for (i, content) in io::BufRead::lines(reader).enumerate() {
        let content = content?;
        let line = i + 1;

        if content.trim().is_empty() {
            continue;
        }

        let (config, value) = parse_line(&content).ok_or_else(|| Error::Parse {
            line,
            content: content.clone(),
        })?;

        match len {
            Some(expected) if expected != config.len() => {
                return Err(Error::InconsistentLength {
                    line,
                    expected,
                    found: config.len(),
                })
            }
            Some(_) => (),
            None => len = Some(config.len()),
        }

        if frequencies.get(&config).is_some() {
            return Err(Error::DuplicateConfig { line, config });
        }
        frequencies.insert(config, value);
    }

    Ok(frequencies)
}

/// Writes a frequency table in text format to a writer.
///
/// Values are written in scientific notation with the provided precision.
pub fn write_frequencies<W>(
    writer: &mut W,
    frequencies: &Frequencies,
    precision: usize,
) -> io::Result<()>
where
    W: io::Write,
{
    for (config, frequency) in frequencies {
        writeln!(writer, "{config}: {frequency:.precision$e}")?;
    }

    Ok(())
}
