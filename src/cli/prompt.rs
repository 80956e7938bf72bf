//! Line-based interactive prompts.

use colored::Colorize;
use std::io::{BufRead, Write};

use crate::errors::{Result, StarlessError};

pub const PROJECT_QUESTION: &str = "Which project you want to generate?";
pub const FOLDER_QUESTION: &str = "What is the name of the folder?";

pub trait Prompter {
    /// Asks the user to pick one of `choices`, by number or by name.
    ///
    /// # Errors
    ///
    /// Returns an error if input ends or an answer matches no choice.
    fn select(&mut self, question: &str, choices: &[&str]) -> Result<String>;

    /// # Errors
    ///
    /// Returns an error if input ends before an answer is given.
    fn input(&mut self, question: &str) -> Result<String>;
}

/// Prompts on any reader/writer pair; `stdio()` for the terminal.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn read_answer(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(StarlessError::Config("No answer given".to_string()));
        }
        Ok(line.trim().to_string())
    }
}

impl LinePrompter<std::io::StdinLock<'static>, std::io::Stdout> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn select(&mut self, question: &str, choices: &[&str]) -> Result<String> {
        writeln!(self.writer, "{} {}", "?".green(), question.bold())?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.writer, "  {}) {}", i + 1, choice)?;
        }
        loop {
            write!(self.writer, "> ")?;
            self.writer.flush()?;
            let answer = self.read_answer()?;
            let picked = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| choices.get(i))
                .or_else(|| choices.iter().find(|c| c.eq_ignore_ascii_case(&answer)));
            match picked {
                Some(choice) => return Ok((*choice).to_string()),
                None => writeln!(self.writer, "{}", "Please pick one of the listed options.".red())?,
            }
        }
    }

    fn input(&mut self, question: &str) -> Result<String> {
        loop {
            write!(self.writer, "{} {} ", "?".green(), question.bold())?;
            self.writer.flush()?;
            let answer = self.read_answer()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_select_by_number_or_name() {
        let choices = ["starless-app", "command-line-app"];
        assert_eq!(
            prompter("2\n").select(PROJECT_QUESTION, &choices).unwrap(),
            "command-line-app"
        );
        assert_eq!(
            prompter("Starless-App\n").select(PROJECT_QUESTION, &choices).unwrap(),
            "starless-app"
        );
    }

    #[test]
    fn test_select_reprompts_on_bad_answer() {
        let choices = ["starless-app"];
        let mut p = prompter("7\nnope\n1\n");
        assert_eq!(p.select(PROJECT_QUESTION, &choices).unwrap(), "starless-app");
        let shown = String::from_utf8(p.writer.clone()).unwrap();
        assert_eq!(shown.matches("Please pick one").count(), 2);
    }

    #[test]
    fn test_input_skips_blank_lines() {
        assert_eq!(prompter("\n  my-app \n").input(FOLDER_QUESTION).unwrap(), "my-app");
    }

    #[test]
    fn test_end_of_input_is_an_error() {
        assert!(prompter("").input(FOLDER_QUESTION).is_err());
        assert!(prompter("").select(PROJECT_QUESTION, &["a"]).is_err());
    }
}
