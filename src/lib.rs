pub mod constants;
pub mod error;
pub mod frame;
pub mod instructions;
pub mod interpreter;
pub mod program;
pub mod value;

/// Position of an instruction in the program's total execution order.
pub type Order = i32;

pub use crate::error::{Fault, RuntimeError};
pub use crate::frame::{Frame, FrameName, FrameStore};
pub use crate::instructions::Opcode;
pub use crate::interpreter::{Interpreter, Outcome};
pub use crate::program::{Instruction, Operand, Program, VarRef};
pub use crate::value::{decode_escapes, DataType, EscapeError, Value};
pub use util::{EnumFromStr, ParseEnumError, Stack};
