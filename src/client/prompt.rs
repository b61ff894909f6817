//! Asking the user questions.

use std::fmt;
use std::io::{self, BufRead, Write};
use crate::error::Failed;


//------------ Console -------------------------------------------------------

/// An interactive console.
///
/// Questions and any other output go to `output`, answers are read from
/// `input` line by line.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Asks a question and returns the answer without surrounding space.
    pub fn ask(&mut self, question: &str) -> Result<String, Failed> {
        self.ask_line(question).map(|answer| answer.trim().into())
    }

    /// Asks a question and returns the answer as typed.
    ///
    /// Only the line ending is removed.
    pub fn ask_line(&mut self, question: &str) -> Result<String, Failed> {
        self.write(format_args!("{}", question))?;
        self.output.flush().map_err(|err| {
            Failed::io("Failed to write output", err)
        })?;
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) => {
                Err(Failed::io(
                    "Failed to read input",
                    io::ErrorKind::UnexpectedEof.into()
                ))
            }
            Ok(_) => {
                if answer.ends_with('\n') {
                    answer.pop();
                    if answer.ends_with('\r') {
                        answer.pop();
                    }
                }
                Ok(answer)
            }
            Err(err) => Err(Failed::io("Failed to read input", err))
        }
    }

    /// Writes formatted output.
    pub fn write(&mut self, args: fmt::Arguments) -> Result<(), Failed> {
        self.output.write_fmt(args).map_err(|err| {
            Failed::io("Failed to write output", err)
        })
    }

    /// Returns the output for direct writing.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn answers() {
        let mut console = Console::new(
            Cursor::new("  127.0.0.1 \r\n hello world \nlast"), Vec::new()
        );
        assert_eq!(console.ask("IP: ").unwrap(), "127.0.0.1");
        assert_eq!(console.ask_line("Data: ").unwrap(), " hello world ");
        assert_eq!(console.ask("More: ").unwrap(), "last");
        assert_eq!(console.ask("Again: "), Err(Failed));
        assert_eq!(console.into_output(), b"IP: Data: More: Again: ");
    }
}
