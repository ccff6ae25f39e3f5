//! Operation log display

use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::session::{LOG_TIME_FORMAT, LogLevel, OperationLog};

fn level_color(level: LogLevel) -> Option<Color> {
    match level {
        LogLevel::Info => None,
        LogLevel::Success => Some(Color::Green),
        LogLevel::Warning => Some(Color::Yellow),
        LogLevel::Error => Some(Color::Red),
    }
}

/// Write each entry as `[hh:mm:ss PM] message`, colored by level.
pub fn write_log<W: WriteColor>(out: &mut W, log: &OperationLog) -> io::Result<()> {
    for entry in log.entries() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Ansi256(244))))?;
        write!(out, "[{}]", entry.time.format(LOG_TIME_FORMAT))?;
        out.reset()?;
        write!(out, " ")?;

        match level_color(entry.level) {
            Some(color) => {
                out.set_color(
                    ColorSpec::new()
                        .set_fg(Some(color))
                        .set_bold(entry.level == LogLevel::Error),
                )?;
                write!(out, "{}", entry.message)?;
                out.reset()?;
            }
            None => write!(out, "{}", entry.message)?,
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print the log to stdout.
///
/// `choice` is used as given, so [`ColorChoice::Always`] colors even when the
/// environment asks for plain output.
pub fn print_log(log: &OperationLog, choice: ColorChoice) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(choice);
    write_log(&mut stdout, log)?;
    stdout.flush()
}
