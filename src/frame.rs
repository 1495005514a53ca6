use std::collections::BTreeMap;
use std::fmt;

use util::{EnumFromStr, ParseEnumError, Stack};

use crate::error::Fault;
use crate::value::Value;

/// The three variable frames addressable by a program.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameName {
    GF,
    LF,
    TF,
}

// Frame prefixes are case-sensitive, unlike opcode mnemonics, so the
// trait is implemented by hand rather than derived.
impl EnumFromStr for FrameName {
    fn from_str(s: &str) -> Result<FrameName, ParseEnumError> {
        match s {
            "GF" => Ok(FrameName::GF),
            "LF" => Ok(FrameName::LF),
            "TF" => Ok(FrameName::TF),
            _ => Err(ParseEnumError::new(s, "frame name")),
        }
    }
}

impl std::str::FromStr for FrameName {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<FrameName, ParseEnumError> {
        EnumFromStr::from_str(s)
    }
}

impl fmt::Display for FrameName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A mapping from variable name to cell. A cell holding `None` is a
/// defined but uninitialized variable: its type and value are absent
/// together until the first assignment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    variables: BTreeMap<String, Option<Value>>,
}

impl Frame {
    pub fn new() -> Frame {
        Frame {
            variables: BTreeMap::new(),
        }
    }

    /// Defines an uninitialized variable. Returns `false` if the name is
    /// already taken.
    pub fn define(&mut self, name: &str) -> bool {
        if self.variables.contains_key(name) {
            return false;
        }

        self.variables.insert(name.to_string(), None);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Option<Value>> {
        self.variables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Option<Value>> {
        self.variables.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Iterates variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Option<Value>)> {
        self.variables.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// The frame architecture: one process-lifetime global frame, a stack of
/// local frames of which only the top is addressable, and an optional
/// temporary frame whose lifecycle is driven by `CREATEFRAME`,
/// `PUSHFRAME` and `POPFRAME`.
#[derive(Debug, Default)]
pub struct FrameStore {
    global: Frame,
    locals: Stack<Frame>,
    temporary: Option<Frame>,
}

impl FrameStore {
    pub fn new() -> FrameStore {
        FrameStore {
            global: Frame::new(),
            locals: Stack::new(),
            temporary: None,
        }
    }

    pub fn frame(&self, name: FrameName) -> Result<&Frame, Fault> {
        match name {
            FrameName::GF => Ok(&self.global),
            FrameName::LF => self.locals.top().ok_or(Fault::MissingFrame(FrameName::LF)),
            FrameName::TF => self
                .temporary
                .as_ref()
                .ok_or(Fault::MissingFrame(FrameName::TF)),
        }
    }

    pub fn frame_mut(&mut self, name: FrameName) -> Result<&mut Frame, Fault> {
        match name {
            FrameName::GF => Ok(&mut self.global),
            FrameName::LF => self
                .locals
                .top_mut()
                .ok_or(Fault::MissingFrame(FrameName::LF)),
            FrameName::TF => self
                .temporary
                .as_mut()
                .ok_or(Fault::MissingFrame(FrameName::TF)),
        }
    }

    /// `CREATEFRAME`: installs a fresh temporary frame, discarding any
    /// previous one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// `PUSHFRAME`: moves the temporary frame onto the local stack.
    pub fn push_temporary(&mut self) -> Result<(), Fault> {
        let frame = self
            .temporary
            .take()
            .ok_or(Fault::MissingFrame(FrameName::TF))?;
        self.locals.push(frame);
        Ok(())
    }

    /// `POPFRAME`: pops the local stack into the temporary frame.
    pub fn pop_local(&mut self) -> Result<(), Fault> {
        let frame = self.locals.pop().ok_or(Fault::MissingFrame(FrameName::LF))?;
        self.temporary = Some(frame);
        Ok(())
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    pub fn local(&self) -> Option<&Frame> {
        self.locals.top()
    }

    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }
}
