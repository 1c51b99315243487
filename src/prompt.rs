//! Line oriented operator prompts.
//!
//! Prompts follow a fixed protocol so the tool can be driven by expect-style scripts:
//! `<Label> [<default>]: ` when a default exists (empty input accepts it) and `<Label>: `
//! otherwise.

use std::{
    collections::VecDeque,
    fmt::Display,
    io::{self, BufRead, StdinLock, Stdout, Write},
    str::FromStr,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to talk to the operator: {0:?}")]
    Io(#[from] io::Error),

    #[error("Input ended while waiting for an answer to {0:?}")]
    EndOfInput(String),
}

pub const AFFIRMATIVE_TOKENS: [&str; 2] = ["y", "yes"];

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();

    AFFIRMATIVE_TOKENS.contains(&answer.as_str())
}

pub trait Prompter {
    /// Shows `prompt` without a trailing newline and returns one line of input, without its
    /// line terminator.
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError>;

    /// Shows a full line of text to the operator.
    fn say(&mut self, message: &str) -> Result<(), PromptError>;

    fn prompt(&mut self, label: &str, default: &str) -> Result<String, PromptError> {
        let answer = self.read_line(&format!("{label} [{default}]: "))?;

        if answer.is_empty() {
            Ok(default.to_owned())
        } else {
            Ok(answer)
        }
    }

    fn prompt_no_default(&mut self, label: &str) -> Result<String, PromptError> {
        self.read_line(&format!("{label}: "))
    }

    /// Asks a yes/no question that defaults to no.
    fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        let answer = self.read_line(&format!("{question} [yN]: "))?;

        Ok(is_affirmative(&answer))
    }

    /// Prompts until the answer parses as `T` and passes `accept`.
    fn prompt_parsed<T>(
        &mut self,
        label: &str,
        default: T,
        accept: impl Fn(&T) -> bool,
    ) -> Result<T, PromptError>
    where
        T: FromStr + Display,
    {
        let default = default.to_string();

        loop {
            let answer = self.prompt(label, &default)?;

            match answer.trim().parse::<T>() {
                Ok(value) if accept(&value) => return Ok(value),
                _ => {
                    log::debug!("Rejected {label} input {answer:?}");
                    self.say(&format!("Invalid {label}: {answer}"))?;
                }
            }
        }
    }
}

/// Prompts over any reader/writer pair, normally the process's stdin and stdout.
pub struct StdioPrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> StdioPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl StdioPrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for StdioPrompter<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.writer, "{prompt}")?;
        self.writer.flush()?;

        let mut mut_line = String::new();

        if self.reader.read_line(&mut mut_line)? == 0 {
            return Err(PromptError::EndOfInput(prompt.to_owned()));
        }

        let line = mut_line
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(&mut_line);

        Ok(line.to_owned())
    }

    fn say(&mut self, message: &str) -> Result<(), PromptError> {
        writeln!(self.writer, "{message}")?;

        Ok(())
    }
}

/// Answers prompts from a fixed list and records everything shown to the operator.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub transcript: String,
}

impl ScriptedPrompter {
    pub fn new<S: AsRef<str>>(answers: &[S]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.as_ref().to_owned()).collect(),
            transcript: String::new(),
        }
    }

    pub fn remaining_answers(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, PromptError> {
        self.transcript += prompt;

        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| PromptError::EndOfInput(prompt.to_owned()))?;

        self.transcript += &answer;
        self.transcript += "\n";

        Ok(answer)
    }

    fn say(&mut self, message: &str) -> Result<(), PromptError> {
        self.transcript += message;
        self.transcript += "\n";

        Ok(())
    }
}
