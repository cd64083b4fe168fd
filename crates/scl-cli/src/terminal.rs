use std::io::{self, BufRead, Write};

use colored::Colorize;
use scl_gate::FieldSource;

/// Line-oriented prompt over any reader/writer pair.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write a line of output.
    pub fn say(&mut self, text: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: BufRead, W: Write> FieldSource for Terminal<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn reject(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{} {message}", "✗".red())
    }
}
