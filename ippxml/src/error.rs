use std::fmt;

use ippvm::{EscapeError, Order, ParseEnumError};
use quick_xml::events::attributes::AttrError;

/// Error raised while loading a program document.
///
/// Well-formedness problems (the document is not valid XML) map to exit
/// code 31; grammar problems (valid XML that is not a valid program) map
/// to exit code 32.
#[derive(Debug)]
pub enum ParseError {
    Xml(quick_xml::Error),
    Attr(AttrError),
    UnexpectedEof,
    UnexpectedElement(String),
    UnexpectedText,
    MissingAttribute(&'static str),
    WrongLanguage(String),
    InvalidOrder(String),
    DuplicateOrder(Order),
    UnknownOpcode(ParseEnumError),
    UnknownArgTag(String),
    DuplicateArg { order: Order, index: usize },
    MissingArg { order: Order, index: usize },
    InvalidLiteral { tag: &'static str, text: String },
    Escape(EscapeError),
}

impl ParseError {
    /// Process exit code for this error.
    pub fn code(&self) -> i32 {
        match self {
            ParseError::Xml(_) | ParseError::Attr(_) | ParseError::UnexpectedEof => 31,
            _ => 32,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Xml(err) => write!(f, "malformed XML: {}", err),
            ParseError::Attr(err) => write!(f, "malformed attribute: {}", err),
            ParseError::UnexpectedEof => f.write_str("unexpected end of document"),
            ParseError::UnexpectedElement(name) => write!(f, "unexpected element <{}>", name),
            ParseError::UnexpectedText => f.write_str("unexpected text content"),
            ParseError::MissingAttribute(name) => write!(f, "missing attribute \"{}\"", name),
            ParseError::WrongLanguage(lang) => {
                write!(f, "unsupported language \"{}\"", lang)
            }
            ParseError::InvalidOrder(text) => write!(f, "invalid instruction order \"{}\"", text),
            ParseError::DuplicateOrder(order) => {
                write!(f, "instruction order {} is used twice", order)
            }
            ParseError::UnknownOpcode(err) => write!(f, "{}", err),
            ParseError::UnknownArgTag(tag) => write!(f, "unknown argument type \"{}\"", tag),
            ParseError::DuplicateArg { order, index } => {
                write!(f, "instruction {} has two arg{} elements", order, index)
            }
            ParseError::MissingArg { order, index } => {
                write!(f, "instruction {} is missing arg{}", order, index)
            }
            ParseError::InvalidLiteral { tag, text } => {
                write!(f, "invalid {} payload \"{}\"", tag, text)
            }
            ParseError::Escape(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> ParseError {
        ParseError::Xml(err)
    }
}

impl From<AttrError> for ParseError {
    fn from(err: AttrError) -> ParseError {
        ParseError::Attr(err)
    }
}

impl From<ParseEnumError> for ParseError {
    fn from(err: ParseEnumError) -> ParseError {
        ParseError::UnknownOpcode(err)
    }
}

impl From<EscapeError> for ParseError {
    fn from(err: EscapeError) -> ParseError {
        ParseError::Escape(err)
    }
}
