//! Splitting of command argument text into tokens.
//!
//! Words are separated by blanks. Single quotes keep everything literally,
//! double quotes allow `\"` and `\\` escapes, and a backslash outside quotes
//! escapes the next character.

use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingSingleQuote,
    ReadingDoubleQuote,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    /// Runs the state machine over the whole input.
    ///
    /// Quotes only group characters, so `a"b c"d` is the single token `ab cd`
    /// and `""` is an empty token.
    fn make_tokens(&mut self) -> Result<Vec<String>, LexError> {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch)?,
                LexingState::ReadingWord => self.handle_word(ch, &mut out)?,
                LexingState::ReadingSingleQuote => self.handle_single_quote(ch),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch)?,
            }
        }

        match self.state {
            LexingState::ReadingSingleQuote | LexingState::ReadingDoubleQuote => {
                return Err(LexError::UnfinishedQuote);
            }
            LexingState::ReadingWord => out.push(std::mem::take(&mut self.buffer)),
            LexingState::Start => {}
        }

        Ok(out)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn read_escaped(&mut self) -> Result<char, LexError> {
        self.read_char().ok_or(LexError::DanglingEscape)
    }

    fn handle_start(&mut self, ch: char) -> Result<(), LexError> {
        match ch {
            c if c.is_whitespace() => {}
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            '\\' => {
                let escaped = self.read_escaped()?;
                self.buffer.push(escaped);
                self.state = LexingState::ReadingWord;
            }
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
        Ok(())
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) -> Result<(), LexError> {
        match ch {
            c if c.is_whitespace() => {
                out.push(std::mem::take(&mut self.buffer));
                self.state = LexingState::Start;
            }
            '\'' => self.state = LexingState::ReadingSingleQuote,
            '"' => self.state = LexingState::ReadingDoubleQuote,
            '\\' => {
                let escaped = self.read_escaped()?;
                self.buffer.push(escaped);
            }
            c => self.buffer.push(c),
        }
        Ok(())
    }

    fn handle_single_quote(&mut self, ch: char) {
        if ch == '\'' {
            self.state = LexingState::ReadingWord;
        } else {
            self.buffer.push(ch);
        }
    }

    fn handle_double_quote(&mut self, ch: char) -> Result<(), LexError> {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            '\\' => match self.read_escaped()? {
                c @ ('"' | '\\') => self.buffer.push(c),
                c => {
                    self.buffer.push('\\');
                    self.buffer.push(c);
                }
            },
            c => self.buffer.push(c),
        }
        Ok(())
    }
}

/// Split argument text into tokens.
pub fn split_args(text: &str) -> Result<Vec<String>, LexError> {
    LexingFSM::new(text).make_tokens()
}

/// Split off the first blank-delimited word of `line`.
///
/// Returns the word and the remainder with leading blanks removed.
pub fn split_first_word(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(idx) => (&line[..idx], line[idx..].trim_start()),
        None => (line, ""),
    }
}
