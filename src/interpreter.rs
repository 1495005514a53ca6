use std::cmp::Ordering;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::io::{BufRead, Write};

use log::{debug, trace};
use num_integer::Integer;
use util::Stack;

use crate::constants;
use crate::error::{Fault, RuntimeError};
use crate::frame::FrameStore;
use crate::instructions::Opcode;
use crate::program::{Instruction, Operand, Program, VarRef};
use crate::value::{DataType, Value};
use crate::Order;

/// How a program run ended when no fault occurred.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    /// The instruction with the highest order was processed (or the
    /// program was empty).
    Completed,
    /// The program requested termination through `EXIT`.
    Exited(i32),
}

enum TickResult {
    Next,
    Jump(usize),
    Exit(i32),
}

/// The IPPcode23 execution engine.
///
/// One instance owns all mutable run state: the frame store, the call and
/// data stacks, the label index and the executed-instruction counter. The
/// three streams are injected so hosts and tests can run programs against
/// in-memory buffers.
pub struct Interpreter<'io> {
    frames: FrameStore,
    call_stack: Stack<Order>,
    data_stack: Stack<Value>,
    labels: HashMap<String, Order>,
    orders: Vec<Order>,
    executed: u64,
    input: Box<dyn BufRead + 'io>,
    output: Box<dyn Write + 'io>,
    diag: Box<dyn Write + 'io>,
}

impl<'io> Interpreter<'io> {
    pub fn new(
        input: Box<dyn BufRead + 'io>,
        output: Box<dyn Write + 'io>,
        diag: Box<dyn Write + 'io>,
    ) -> Interpreter<'io> {
        Interpreter {
            frames: FrameStore::new(),
            call_stack: Stack::new(),
            data_stack: Stack::new(),
            labels: HashMap::new(),
            orders: Vec::new(),
            executed: 0,
            input,
            output,
            diag,
        }
    }

    /// Runs the program to completion: indexes the labels, then
    /// dispatches instructions along the sorted order sequence until the
    /// end of the program, an `EXIT`, or a fault.
    pub fn run(&mut self, program: &Program) -> Result<Outcome, RuntimeError> {
        self.labels.clear();
        self.scan_labels(program)?;
        self.orders = program.orders();

        debug!(
            "running {} instruction(s), {} label(s)",
            program.len(),
            self.labels.len()
        );

        let mut position = 0;
        while position < self.orders.len() {
            let order = self.orders[position];
            let instruction = program
                .get(order)
                .expect("order sequence is taken from the program");

            match self
                .tick(instruction)
                .map_err(|fault| RuntimeError::new(fault, order))?
            {
                TickResult::Next => position += 1,
                TickResult::Jump(target) => position = target,
                TickResult::Exit(code) => {
                    self.executed += 1;
                    debug!("program exited with code {}", code);
                    return Ok(Outcome::Exited(code));
                }
            }
            self.executed += 1;
        }

        Ok(Outcome::Completed)
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    pub fn data_stack(&self) -> &Stack<Value> {
        &self.data_stack
    }

    /// Number of dispatched instructions so far, `LABEL`s included.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Records every `LABEL` as `name → order` before execution starts.
    fn scan_labels(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for instruction in program.iter() {
            if instruction.opcode() != Opcode::LABEL {
                continue;
            }

            let order = instruction.order();
            let operands = instruction.operands();
            if operands.len() != Opcode::LABEL.arity() {
                let fault = Fault::WrongArity {
                    opcode: Opcode::LABEL,
                    expected: Opcode::LABEL.arity(),
                    found: operands.len(),
                };
                return Err(RuntimeError::new(fault, order));
            }

            let name = expect_label(Opcode::LABEL, &operands[0])
                .map_err(|fault| RuntimeError::new(fault, order))?;
            if self.labels.insert(name.to_string(), order).is_some() {
                let fault = Fault::DuplicateLabel(name.to_string());
                return Err(RuntimeError::new(fault, order));
            }
        }

        Ok(())
    }

    fn tick(&mut self, instruction: &Instruction) -> Result<TickResult, Fault> {
        let opcode = instruction.opcode();
        let operands = instruction.operands();

        trace!("order {}: {}", instruction.order(), opcode);

        if operands.len() != opcode.arity() {
            return Err(Fault::WrongArity {
                opcode,
                expected: opcode.arity(),
                found: operands.len(),
            });
        }

        match opcode {
            Opcode::MOVE => {
                let dst = expect_var(opcode, &operands[0])?;
                let value = self.value_of(opcode, &operands[1])?;
                self.set_var(dst, value)?;
            }

            Opcode::CREATEFRAME => {
                self.frames.create_temporary();
            }

            Opcode::PUSHFRAME => {
                self.frames.push_temporary()?;
            }

            Opcode::POPFRAME => {
                self.frames.pop_local()?;
            }

            Opcode::DEFVAR => {
                let var = expect_var(opcode, &operands[0])?;
                let frame = self.frames.frame_mut(var.frame)?;
                if !frame.define(&var.name) {
                    return Err(Fault::RedefinedVariable(var.clone()));
                }
            }

            Opcode::CALL => {
                let name = expect_label(opcode, &operands[0])?;
                let target = self.label_target(name)?;
                self.call_stack.push(instruction.order());
                return Ok(TickResult::Jump(target));
            }

            Opcode::RETURN => {
                let order = self.call_stack.pop().ok_or(Fault::EmptyCallStack)?;
                return Ok(TickResult::Jump(self.order_position(order) + 1));
            }

            Opcode::PUSHS => {
                let value = self.value_of(opcode, &operands[0])?;
                self.data_stack.push(value);
            }

            Opcode::POPS => {
                let dst = expect_var(opcode, &operands[0])?;
                let value = self.data_stack.pop().ok_or(Fault::EmptyDataStack)?;
                self.set_var(dst, value)?;
            }

            Opcode::ADD | Opcode::SUB | Opcode::MUL | Opcode::IDIV => {
                let dst = expect_var(opcode, &operands[0])?;
                let a = self.int_of(opcode, &operands[1])?;
                let b = self.int_of(opcode, &operands[2])?;

                let result = match opcode {
                    Opcode::ADD => a.wrapping_add(b),
                    Opcode::SUB => a.wrapping_sub(b),
                    Opcode::MUL => a.wrapping_mul(b),
                    _ => {
                        if b == 0 {
                            return Err(Fault::DivisionByZero);
                        }
                        // i64::MIN / -1 overflows; flooring makes it -MIN.
                        if b == -1 {
                            a.wrapping_neg()
                        } else {
                            Integer::div_floor(&a, &b)
                        }
                    }
                };
                self.set_var(dst, Value::Int(result))?;
            }

            Opcode::LT | Opcode::GT => {
                let dst = expect_var(opcode, &operands[0])?;
                let a = self.value_of(opcode, &operands[1])?;
                let b = self.value_of(opcode, &operands[2])?;
                let ordering = compare_values(opcode, &a, &b)?;

                let result = if opcode == Opcode::LT {
                    ordering == Ordering::Less
                } else {
                    ordering == Ordering::Greater
                };
                self.set_var(dst, Value::Bool(result))?;
            }

            Opcode::EQ => {
                let dst = expect_var(opcode, &operands[0])?;
                let a = self.value_of(opcode, &operands[1])?;
                let b = self.value_of(opcode, &operands[2])?;
                let equal = values_equal(opcode, &a, &b)?;
                self.set_var(dst, Value::Bool(equal))?;
            }

            Opcode::AND | Opcode::OR => {
                let dst = expect_var(opcode, &operands[0])?;
                let a = self.bool_of(opcode, &operands[1])?;
                let b = self.bool_of(opcode, &operands[2])?;

                let result = if opcode == Opcode::AND { a && b } else { a || b };
                self.set_var(dst, Value::Bool(result))?;
            }

            Opcode::NOT => {
                let dst = expect_var(opcode, &operands[0])?;
                let a = self.bool_of(opcode, &operands[1])?;
                self.set_var(dst, Value::Bool(!a))?;
            }

            Opcode::INT2CHAR => {
                let dst = expect_var(opcode, &operands[0])?;
                let code = self.int_of(opcode, &operands[1])?;
                let decoded = u32::try_from(code)
                    .ok()
                    .and_then(std::char::from_u32)
                    .ok_or(Fault::InvalidCodePoint(code))?;
                self.set_var(dst, Value::String(decoded.to_string()))?;
            }

            Opcode::STRI2INT => {
                let dst = expect_var(opcode, &operands[0])?;
                let text = self.string_of(opcode, &operands[1])?;
                let index = self.int_of(opcode, &operands[2])?;
                let c = char_at(&text, index)?;
                self.set_var(dst, Value::Int(i64::from(u32::from(c))))?;
            }

            Opcode::READ => {
                let dst = expect_var(opcode, &operands[0])?;
                let target = match &operands[1] {
                    Operand::Type(data_type) => *data_type,
                    _ => return Err(Fault::WrongType(opcode)),
                };
                let value = self.read_input(target);
                self.set_var(dst, value)?;
            }

            Opcode::WRITE => {
                let value = self.value_of(opcode, &operands[0])?;
                let _ = write!(self.output, "{}", value);
                let _ = self.output.flush();
            }

            Opcode::CONCAT => {
                let dst = expect_var(opcode, &operands[0])?;
                let mut text = self.string_of(opcode, &operands[1])?;
                text.push_str(&self.string_of(opcode, &operands[2])?);
                self.set_var(dst, Value::String(text))?;
            }

            Opcode::STRLEN => {
                let dst = expect_var(opcode, &operands[0])?;
                let text = self.string_of(opcode, &operands[1])?;
                self.set_var(dst, Value::Int(text.chars().count() as i64))?;
            }

            Opcode::GETCHAR => {
                let dst = expect_var(opcode, &operands[0])?;
                let text = self.string_of(opcode, &operands[1])?;
                let index = self.int_of(opcode, &operands[2])?;
                let c = char_at(&text, index)?;
                self.set_var(dst, Value::String(c.to_string()))?;
            }

            Opcode::SETCHAR => {
                let dst = expect_var(opcode, &operands[0])?;
                let index = self.int_of(opcode, &operands[1])?;
                let replacement = self.string_of(opcode, &operands[2])?;

                let current = match self.var_slot(dst)? {
                    Some(Value::String(text)) => text.clone(),
                    Some(_) => return Err(Fault::WrongType(opcode)),
                    None => return Err(Fault::UnsetVariable(dst.clone())),
                };

                let length = current.chars().count();
                let position = usize::try_from(index)
                    .ok()
                    .filter(|i| *i < length)
                    .ok_or(Fault::IndexOutOfBounds { index, length })?;
                let replacement_char = replacement
                    .chars()
                    .next()
                    .ok_or(Fault::EmptyReplacement)?;

                let updated: String = current
                    .chars()
                    .enumerate()
                    .map(|(i, c)| if i == position { replacement_char } else { c })
                    .collect();
                self.set_var(dst, Value::String(updated))?;
            }

            Opcode::TYPE => {
                let dst = expect_var(opcode, &operands[0])?;
                let name = match &operands[1] {
                    Operand::Value(value) => value.data_type().name().to_string(),
                    Operand::Var(var) => match self.var_slot(var)? {
                        Some(value) => value.data_type().name().to_string(),
                        // The one tolerated read of an uninitialized
                        // variable: its type name is the empty string.
                        None => String::new(),
                    },
                    _ => return Err(Fault::WrongType(opcode)),
                };
                self.set_var(dst, Value::String(name))?;
            }

            Opcode::LABEL => {
                // Indexed by the pre-scan; nothing to do at execution time.
                expect_label(opcode, &operands[0])?;
            }

            Opcode::JUMP => {
                let name = expect_label(opcode, &operands[0])?;
                return Ok(TickResult::Jump(self.label_target(name)?));
            }

            Opcode::JUMPIFEQ | Opcode::JUMPIFNEQ => {
                let name = expect_label(opcode, &operands[0])?;
                let a = self.value_of(opcode, &operands[1])?;
                let b = self.value_of(opcode, &operands[2])?;
                let equal = values_equal(opcode, &a, &b)?;
                // The label must resolve even when the branch is not taken.
                let target = self.label_target(name)?;

                if equal == (opcode == Opcode::JUMPIFEQ) {
                    return Ok(TickResult::Jump(target));
                }
            }

            Opcode::EXIT => {
                let code = self.int_of(opcode, &operands[0])?;
                if code < constants::EXIT_CODE_MIN || code > constants::EXIT_CODE_MAX {
                    return Err(Fault::InvalidExitCode(code));
                }
                return Ok(TickResult::Exit(code as i32));
            }

            Opcode::DPRINT => {
                let value = self.value_of(opcode, &operands[0])?;
                let _ = write!(self.diag, "{}", value);
                let _ = self.diag.flush();
            }

            Opcode::BREAK => {
                self.dump_state(instruction.order());
            }
        }

        Ok(TickResult::Next)
    }

    /// Resolves a symbol-position operand to its value. Variables are
    /// read through the frame store; literals are themselves; `label` and
    /// `type` operands are not symbols.
    fn value_of(&self, opcode: Opcode, operand: &Operand) -> Result<Value, Fault> {
        match operand {
            Operand::Value(value) => Ok(value.clone()),
            Operand::Var(var) => match self.var_slot(var)? {
                Some(value) => Ok(value.clone()),
                None => Err(Fault::UnsetVariable(var.clone())),
            },
            _ => Err(Fault::WrongType(opcode)),
        }
    }

    fn int_of(&self, opcode: Opcode, operand: &Operand) -> Result<i64, Fault> {
        match self.value_of(opcode, operand)? {
            Value::Int(i) => Ok(i),
            _ => Err(Fault::WrongType(opcode)),
        }
    }

    fn bool_of(&self, opcode: Opcode, operand: &Operand) -> Result<bool, Fault> {
        match self.value_of(opcode, operand)? {
            Value::Bool(b) => Ok(b),
            _ => Err(Fault::WrongType(opcode)),
        }
    }

    fn string_of(&self, opcode: Opcode, operand: &Operand) -> Result<String, Fault> {
        match self.value_of(opcode, operand)? {
            Value::String(s) => Ok(s),
            _ => Err(Fault::WrongType(opcode)),
        }
    }

    fn var_slot(&self, var: &VarRef) -> Result<&Option<Value>, Fault> {
        let frame = self.frames.frame(var.frame)?;
        frame
            .get(&var.name)
            .ok_or_else(|| Fault::UndefinedVariable(var.clone()))
    }

    fn set_var(&mut self, var: &VarRef, value: Value) -> Result<(), Fault> {
        let frame = self.frames.frame_mut(var.frame)?;
        match frame.get_mut(&var.name) {
            Some(cell) => {
                *cell = Some(value);
                Ok(())
            }
            None => Err(Fault::UndefinedVariable(var.clone())),
        }
    }

    fn label_target(&self, name: &str) -> Result<usize, Fault> {
        let order = *self
            .labels
            .get(name)
            .ok_or_else(|| Fault::UndefinedLabel(name.to_string()))?;
        Ok(self.order_position(order))
    }

    fn order_position(&self, order: Order) -> usize {
        self.orders
            .binary_search(&order)
            .expect("jump targets come from the order sequence")
    }

    /// `READ`: one line from the guest input, converted to the requested
    /// type. Read failure, EOF, or an unparsable payload yields nil; the
    /// program continues.
    fn read_input(&mut self, target: DataType) -> Value {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => return Value::Nil,
            Ok(_) => {}
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        match target {
            DataType::Int => match line.parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => Value::Nil,
            },
            DataType::Bool => Value::Bool(line.eq_ignore_ascii_case("true")),
            DataType::String => Value::String(line),
            DataType::Nil => Value::Nil,
        }
    }

    /// `BREAK`: dumps the interpreter state to the diagnostic stream.
    /// Absent frames are skipped; the data stack is listed top first.
    fn dump_state(&mut self, order: Order) {
        let _ = writeln!(self.diag, "break at order {}", order);
        let _ = writeln!(self.diag, "executed instructions: {}", self.executed);

        let mut frames = vec![("global frame", Some(self.frames.global()))];
        frames.push(("local frame", self.frames.local()));
        frames.push(("temporary frame", self.frames.temporary()));

        for (title, frame) in frames {
            let frame = match frame {
                Some(frame) => frame,
                None => continue,
            };
            let _ = writeln!(self.diag, "{}:", title);
            for (name, cell) in frame.iter() {
                match cell {
                    Some(value) => {
                        let _ = writeln!(self.diag, "  {} = {}", name, value.repr());
                    }
                    None => {
                        let _ = writeln!(self.diag, "  {} = (unset)", name);
                    }
                }
            }
        }

        let _ = writeln!(self.diag, "data stack:");
        for value in self.data_stack.iter().rev() {
            let _ = writeln!(self.diag, "  {}", value.repr());
        }
        let _ = self.diag.flush();
    }
}

fn expect_var<'a>(opcode: Opcode, operand: &'a Operand) -> Result<&'a VarRef, Fault> {
    match operand {
        Operand::Var(var) => Ok(var),
        _ => Err(Fault::WrongType(opcode)),
    }
}

fn expect_label<'a>(opcode: Opcode, operand: &'a Operand) -> Result<&'a str, Fault> {
    match operand {
        Operand::Label(name) => Ok(name),
        _ => Err(Fault::WrongType(opcode)),
    }
}

/// Equality per the `EQ`/`JUMPIFEQ` rules: nil equals only nil, same
/// types compare by payload, any other mix is a type fault.
fn values_equal(opcode: Opcode, a: &Value, b: &Value) -> Result<bool, Fault> {
    match (a, b) {
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Nil, _) | (_, Value::Nil) => Ok(false),
        (Value::Int(x), Value::Int(y)) => Ok(x == y),
        (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
        (Value::String(x), Value::String(y)) => Ok(x == y),
        _ => Err(Fault::WrongType(opcode)),
    }
}

/// Ordering per the `LT`/`GT` rules: both operands must share one of the
/// ordered types. Strings compare lexicographically by code point and
/// `false < true`.
fn compare_values(opcode: Opcode, a: &Value, b: &Value) -> Result<Ordering, Fault> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => Err(Fault::WrongType(opcode)),
    }
}

fn char_at(text: &str, index: i64) -> Result<char, Fault> {
    let length = text.chars().count();
    usize::try_from(index)
        .ok()
        .and_then(|i| text.chars().nth(i))
        .ok_or(Fault::IndexOutOfBounds { index, length })
}
