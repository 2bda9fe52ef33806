use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

/// Supplier of input lines for the read loop.
pub trait LineSource {
    /// Next line, or `None` at end of input.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal input with line editing.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => {
                log::debug!("input interrupted");
                Ok(None)
            }
            Err(ReadlineError::Eof) => {
                log::debug!("end of input");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Fixed list of lines, e.g. `--eval` arguments or a test script.
#[derive(Debug, Default, Clone)]
pub struct ScriptSource {
    lines: VecDeque<String>,
}

impl ScriptSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptSource {
    fn next_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Memory-backed writer for capturing shell output.
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self {
            buf: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Create a writer and a handle that can read what it collected after the
    /// writer has been moved into the shell.
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }

    /// Collected output as text.
    pub fn contents(handle: &Rc<RefCell<Vec<u8>>>) -> String {
        String::from_utf8_lossy(&handle.borrow()).into_owned()
    }
}

impl Default for MemWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
