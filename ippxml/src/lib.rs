//! Loader for the XML representation of IPPcode23 programs.
//!
//! The entry point is [`load`](fn.load.html), which reads a program
//! document from any buffered reader and produces an executable
//! [`Program`](../ippvm/program/struct.Program.html) for the
//! [ippvm](../ippvm/index.html) engine. The `interpret` binary in this
//! crate wires the loader and the engine to the command line.
//!
//! # Program documents
//!
//! The root element is `program` and must carry `language="IPPcode23"`.
//! Its children are `instruction` elements with two attributes: `order`,
//! a unique positive integer giving the instruction's position in the
//! execution order, and `opcode`, a case-insensitive mnemonic. Each
//! instruction carries `arg1` to `arg3` child elements (dense from 1, in
//! any document order), each with a `type` attribute and a text payload:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <program language="IPPcode23">
//!   <instruction order="1" opcode="DEFVAR">
//!     <arg1 type="var">GF@counter</arg1>
//!   </instruction>
//!   <instruction order="2" opcode="MOVE">
//!     <arg1 type="var">GF@counter</arg1>
//!     <arg2 type="int">0</arg2>
//!   </instruction>
//! </program>
//! ```
//!
//! The `type` attribute is one of `int`, `bool`, `string`, `nil`, `var`,
//! `label` or `type`. Literal payloads are validated while loading: ints
//! must parse, bools are `true`/`false` (case-insensitive), the only nil
//! payload is `nil`, and string payloads may use `\DDD` escapes which are
//! decoded here. A `var` payload has the form `FRAME@NAME` with `FRAME`
//! one of `GF`, `LF`, `TF`.
//!
//! Documents that are not well-formed XML are reported as
//! [`ParseError`](enum.ParseError.html)s with exit code 31; well-formed
//! documents that violate the program grammar map to exit code 32.

use std::io::BufRead;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use ippvm::{decode_escapes, DataType, FrameName, Instruction, Opcode, Operand, Order, Program,
            Value, VarRef};

mod error;

pub use crate::error::ParseError;

/// Name the root element must announce in its `language` attribute.
pub const LANGUAGE: &str = "IPPcode23";

const MAX_ARGS: usize = ippvm::constants::MAX_OPERANDS;

/// The seven operand tags of the program format.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ArgTag {
    Int,
    Bool,
    String,
    Nil,
    Var,
    Label,
    Type,
}

impl ArgTag {
    fn from_name(name: &str) -> Option<ArgTag> {
        match name {
            "int" => Some(ArgTag::Int),
            "bool" => Some(ArgTag::Bool),
            "string" => Some(ArgTag::String),
            "nil" => Some(ArgTag::Nil),
            "var" => Some(ArgTag::Var),
            "label" => Some(ArgTag::Label),
            "type" => Some(ArgTag::Type),
            _ => None,
        }
    }
}

struct PendingInstruction {
    order: Order,
    opcode: Opcode,
    args: [Option<Operand>; MAX_ARGS],
}

struct PendingArg {
    index: usize,
    tag: ArgTag,
    text: Option<String>,
}

/// Reads a program document and builds the executable program.
pub fn load<R: BufRead>(source: R) -> Result<Program, ParseError> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();

    let mut program = Program::new();
    let mut saw_program = false;
    let mut done = false;
    let mut instruction: Option<PendingInstruction> = None;
    let mut arg: Option<PendingArg> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"program" if !saw_program && !done => {
                    check_program_header(&e)?;
                    saw_program = true;
                }
                b"instruction" if saw_program && !done && instruction.is_none() => {
                    instruction = Some(parse_instruction_start(&e)?);
                }
                name if is_arg_name(name) && instruction.is_some() && arg.is_none() => {
                    arg = Some(parse_arg_start(&e)?);
                }
                name => {
                    return Err(ParseError::UnexpectedElement(
                        String::from_utf8_lossy(name).into_owned(),
                    ));
                }
            },

            Event::Empty(e) => match e.name().as_ref() {
                b"program" if !saw_program && !done => {
                    check_program_header(&e)?;
                    saw_program = true;
                    done = true;
                }
                b"instruction" if saw_program && !done && instruction.is_none() => {
                    let pending = parse_instruction_start(&e)?;
                    program_insert(&mut program, pending)?;
                }
                name if is_arg_name(name) && instruction.is_some() && arg.is_none() => {
                    let empty = parse_arg_start(&e)?;
                    attach_arg(instruction.as_mut().unwrap(), empty)?;
                }
                name => {
                    return Err(ParseError::UnexpectedElement(
                        String::from_utf8_lossy(name).into_owned(),
                    ));
                }
            },

            Event::End(e) => match e.name().as_ref() {
                b"program" => done = true,
                b"instruction" => {
                    let pending = instruction.take().ok_or_else(|| {
                        ParseError::UnexpectedElement(String::from("instruction"))
                    })?;
                    program_insert(&mut program, pending)?;
                }
                name if is_arg_name(name) => {
                    let finished = arg
                        .take()
                        .ok_or_else(|| ParseError::UnexpectedText)?;
                    attach_arg(instruction.as_mut().unwrap(), finished)?;
                }
                name => {
                    return Err(ParseError::UnexpectedElement(
                        String::from_utf8_lossy(name).into_owned(),
                    ));
                }
            },

            Event::Text(t) => {
                let decoded = t.unescape()?;
                append_text(&mut arg, decoded.trim())?;
            }

            Event::CData(t) => {
                let raw = String::from_utf8_lossy(&t.into_inner()).into_owned();
                append_text(&mut arg, raw.trim())?;
            }

            Event::Eof => break,

            // Declarations, comments and processing instructions carry no
            // program content.
            _ => {}
        }
        buf.clear();
    }

    if !done {
        return Err(ParseError::UnexpectedEof);
    }

    debug!("loaded {} instruction(s)", program.len());
    Ok(program)
}

fn is_arg_name(name: &[u8]) -> bool {
    matches!(name, b"arg1" | b"arg2" | b"arg3")
}

fn arg_index(name: &[u8]) -> usize {
    match name {
        b"arg1" => 1,
        b"arg2" => 2,
        b"arg3" => 3,
        _ => unreachable!(),
    }
}

fn attribute_value(e: &BytesStart, name: &str) -> Result<Option<String>, ParseError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn check_program_header(e: &BytesStart) -> Result<(), ParseError> {
    let language =
        attribute_value(e, "language")?.ok_or(ParseError::MissingAttribute("language"))?;
    if language != LANGUAGE {
        return Err(ParseError::WrongLanguage(language));
    }
    Ok(())
}

fn parse_instruction_start(e: &BytesStart) -> Result<PendingInstruction, ParseError> {
    let order_text = attribute_value(e, "order")?.ok_or(ParseError::MissingAttribute("order"))?;
    let order = order_text
        .trim()
        .parse::<Order>()
        .ok()
        .filter(|order| *order > 0)
        .ok_or_else(|| ParseError::InvalidOrder(order_text.clone()))?;

    let opcode_text =
        attribute_value(e, "opcode")?.ok_or(ParseError::MissingAttribute("opcode"))?;
    // Mnemonic case handling lives in Opcode's parser.
    let opcode: Opcode = opcode_text.trim().parse()?;

    Ok(PendingInstruction {
        order,
        opcode,
        args: [None, None, None],
    })
}

fn parse_arg_start(e: &BytesStart) -> Result<PendingArg, ParseError> {
    let index = arg_index(e.name().as_ref());
    let tag_text = attribute_value(e, "type")?.ok_or(ParseError::MissingAttribute("type"))?;
    let tag = ArgTag::from_name(tag_text.trim())
        .ok_or_else(|| ParseError::UnknownArgTag(tag_text.clone()))?;

    Ok(PendingArg {
        index,
        tag,
        text: None,
    })
}

fn append_text(arg: &mut Option<PendingArg>, text: &str) -> Result<(), ParseError> {
    match arg {
        Some(arg) => {
            arg.text.get_or_insert_with(String::new).push_str(text);
            Ok(())
        }
        None if text.is_empty() => Ok(()),
        None => Err(ParseError::UnexpectedText),
    }
}

fn attach_arg(instruction: &mut PendingInstruction, arg: PendingArg) -> Result<(), ParseError> {
    let operand = build_operand(arg.tag, arg.text.as_deref().unwrap_or(""))?;
    let slot = &mut instruction.args[arg.index - 1];
    if slot.is_some() {
        return Err(ParseError::DuplicateArg {
            order: instruction.order,
            index: arg.index,
        });
    }

    *slot = Some(operand);
    Ok(())
}

fn build_operand(tag: ArgTag, text: &str) -> Result<Operand, ParseError> {
    let invalid = |name: &'static str| ParseError::InvalidLiteral {
        tag: name,
        text: text.to_string(),
    };

    match tag {
        ArgTag::Int => text
            .parse::<i64>()
            .map(|i| Operand::Value(Value::Int(i)))
            .map_err(|_| invalid("int")),
        ArgTag::Bool => Value::bool_from_literal(text)
            .map(Operand::Value)
            .ok_or_else(|| invalid("bool")),
        ArgTag::String => Ok(Operand::Value(Value::String(decode_escapes(text)?))),
        ArgTag::Nil => {
            if text == "nil" {
                Ok(Operand::Value(Value::Nil))
            } else {
                Err(invalid("nil"))
            }
        }
        ArgTag::Var => {
            let mut parts = text.splitn(2, '@');
            let frame_text = parts.next().unwrap_or("");
            let name = parts.next().ok_or_else(|| invalid("var"))?;
            let frame: FrameName = frame_text.parse().map_err(|_| invalid("var"))?;
            Ok(Operand::Var(VarRef::new(frame, name)))
        }
        ArgTag::Label => Ok(Operand::Label(text.to_string())),
        ArgTag::Type => {
            let data_type: DataType = text.parse().map_err(|_| invalid("type"))?;
            Ok(Operand::Type(data_type))
        }
    }
}

fn program_insert(program: &mut Program, pending: PendingInstruction) -> Result<(), ParseError> {
    let PendingInstruction {
        order,
        opcode,
        args,
    } = pending;

    // Argument indices must be dense from 1.
    let mut operands = Vec::new();
    let mut gap = None;
    for (i, slot) in args.iter().enumerate() {
        match (slot, gap) {
            (Some(_), Some(index)) => return Err(ParseError::MissingArg { order, index }),
            (Some(operand), None) => operands.push((*operand).clone()),
            (None, None) => gap = Some(i + 1),
            (None, Some(_)) => {}
        }
    }

    program
        .insert(Instruction::new(order, opcode, operands))
        .map_err(|instruction| ParseError::DuplicateOrder(instruction.order()))
}
