//! Yes/no confirmation prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use colored::*;

pub trait Prompt {
    /// Ask `message`; an empty answer means `default`.
    fn confirm(&self, message: &str, default: bool) -> io::Result<bool>;
}

/// Interactive prompt on stdin/stdout.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn choices(default: bool) -> String {
        let y = if default { "Y".green().bold() } else { "Y".green() };
        let n = if default { "N".red() } else { "N".red().bold() };
        format!("[{}/{}]", y, n)
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str, default: bool) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let choices = Self::choices(default);

        loop {
            print!("{} {}: ", message, choices);
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                println!();
                return Ok(default);
            }

            if let Some(answer) = parse_answer(&line, default) {
                return Ok(answer);
            }
        }
    }
}

/// Accepts every default; used when nobody is there to answer.
pub struct Defaults;

impl Prompt for Defaults {
    fn confirm(&self, message: &str, default: bool) -> io::Result<bool> {
        info!("{} -> {}", message, if default { "yes" } else { "no" });
        Ok(default)
    }
}

/// The prompt the binary uses: interactive only when stdin is a terminal.
pub fn for_terminal() -> Box<dyn Prompt> {
    if io::stdin().is_terminal() {
        Box::new(TerminalPrompt)
    } else {
        Box::new(Defaults)
    }
}

/// `None` asks again.
fn parse_answer(line: &str, default: bool) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
