//! Stack of nested sessions.
//!
//! Level 0 is the outermost session and is always present. Entering an object
//! pushes a frame; a breakout validates its target and discards every frame
//! above it.

use crate::error::NestingError;
use serde_json::Value;

/// One level of nested interactive context.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFrame {
    level: usize,
    receiver: Value,
    label: String,
    keep_retval: bool,
}

impl SessionFrame {
    pub fn level(&self) -> usize {
        self.level
    }

    /// The object the session was entered on.
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    /// How the frame was reached, e.g. the expression given to `cd`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the command that opened this session shows its result.
    pub fn keeps_retval(&self) -> bool {
        self.keep_retval
    }
}

/// Outcome of a validated breakout.
#[derive(Debug, Clone, PartialEq)]
pub struct Unwind {
    /// Level that receives `value`.
    pub level: usize,
    pub value: Value,
    /// Frames removed from the stack, innermost last.
    pub discarded: Vec<SessionFrame>,
}

impl Unwind {
    /// True when the breakout targeted the level that issued it.
    pub fn is_current_level(&self) -> bool {
        self.discarded.is_empty()
    }
}

/// Ordered, never empty sequence of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStack {
    frames: Vec<SessionFrame>,
}

impl SessionStack {
    /// Create a stack whose top-level frame is entered on `root`.
    pub fn new(root: Value) -> Self {
        Self {
            frames: vec![SessionFrame {
                level: 0,
                receiver: root,
                label: "main".to_string(),
                keep_retval: false,
            }],
        }
    }

    /// Current nesting level, `len() - 1`.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; the top-level frame cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current(&self) -> &SessionFrame {
        // frames is never empty
        &self.frames[self.frames.len() - 1]
    }

    pub fn get(&self, level: usize) -> Option<&SessionFrame> {
        self.frames.get(level)
    }

    pub fn frames(&self) -> &[SessionFrame] {
        &self.frames
    }

    /// Open a sub-session on `receiver`. Returns the new level.
    pub fn push(&mut self, receiver: Value, label: impl Into<String>, keep_retval: bool) -> usize {
        let level = self.frames.len();
        let label = label.into();
        log::info!("entering session level {level} on {label}");
        self.frames.push(SessionFrame {
            level,
            receiver,
            label,
            keep_retval,
        });
        level
    }

    /// Check that `target` names an existing level.
    pub fn validate(&self, target: i64) -> Result<usize, NestingError> {
        usize::try_from(target)
            .ok()
            .filter(|&level| level <= self.depth())
            .ok_or(NestingError::InvalidNestingLevel {
                requested: target,
                max: self.depth(),
            })
    }

    /// Unwind to `target`.
    ///
    /// Targeting the current level leaves the stack as it is; the caller then
    /// completes the current session with `value`. A lower level pops frames
    /// until that level is on top. An invalid level leaves the stack untouched.
    pub fn breakout(&mut self, target: i64, value: Value) -> Result<Unwind, NestingError> {
        let level = self.validate(target)?;
        let discarded = self.frames.split_off(level + 1);
        if !discarded.is_empty() {
            log::info!(
                "breakout to level {level}, discarding {} frame(s)",
                discarded.len()
            );
        }
        Ok(Unwind {
            level,
            value,
            discarded,
        })
    }

    /// Close the current session after it completed on its own level.
    ///
    /// Returns `None` at level 0, which is never popped.
    pub fn leave(&mut self) -> Option<SessionFrame> {
        if self.depth() == 0 {
            return None;
        }
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            log::info!("leaving session level {}", frame.level);
        }
        frame
    }
}
