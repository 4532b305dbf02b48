//! Terminal prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;

use crate::domain::{AppError, Prompter, Result};

/// Whether stdin is attached to a terminal.
#[must_use]
pub fn stdin_is_terminal() -> bool {
    io::stdin().is_terminal()
}

/// Line-based prompter over a reader and a writer.
///
/// End of input counts as "no" for confirmations and as no answer for inputs.
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter on the process stdin/stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.writer, "{prompt}")
            .and_then(|()| self.writer.flush())
            .map_err(|e| AppError::io("Failed to write prompt", e))?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| AppError::io("Failed to read answer", e))?;

        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let prompt = format!("{} {} ", message.bold(), hint);

        loop {
            let Some(answer) = self.ask(&prompt)? else {
                return Ok(false);
            };

            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.notify("Please answer y or n."),
            }
        }
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>> {
        let prompt = match default {
            Some(default) => format!("{} [{default}]: ", message.bold()),
            None => format!("{}: ", message.bold()),
        };

        Ok(self.ask(&prompt)?.map(|answer| {
            if answer.is_empty() {
                default.map(String::from).unwrap_or_default()
            } else {
                answer
            }
        }))
    }

    fn notify(&mut self, message: &str) {
        let _ = writeln!(self.writer, "{}", message.yellow());
    }
}

/// Prompter for unattended runs: declines every confirmation and takes defaults.
#[derive(Debug, Default)]
pub struct NonInteractivePrompter;

impl Prompter for NonInteractivePrompter {
    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
        tracing::warn!(prompt = message, "Non-interactive mode, answering no");
        Ok(false)
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>> {
        tracing::warn!(prompt = message, default, "Non-interactive mode, using default");
        Ok(default.map(String::from))
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
