use util::EnumFromStr;
use util_derive::EnumFromStr;

/// IPPcode23 instruction set.
///
/// Operand legend: `var` names a variable cell, `sym` is a variable or a
/// literal, `label` is a jump target, `type` names one of the four value
/// types. The destination is always the first operand.
#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumFromStr)]
pub enum Opcode {
    //  Mnemonic     | Operands           | Effect
    //---------------+--------------------+----------------------------------------------
    // Frames & variables
    MOVE,        // | var sym            | var = sym
    CREATEFRAME, // |                    | TF = empty frame (discards previous TF)
    PUSHFRAME,   // |                    | local stack push TF; TF cleared
    POPFRAME,    // |                    | TF = local stack pop
    DEFVAR,      // | var                | define uninitialized variable
    //---------------+--------------------+----------------------------------------------
    // Calls
    CALL,        // | label              | call stack push order; jump to label
    RETURN,      // |                    | resume after call stack pop
    //---------------+--------------------+----------------------------------------------
    // Data stack
    PUSHS,       // | sym                | data stack push copy of sym
    POPS,        // | var                | var = data stack pop
    //---------------+--------------------+----------------------------------------------
    // Integer arithmetic
    ADD,         // | var int int        | var = a + b
    SUB,         // | var int int        | var = a - b
    MUL,         // | var int int        | var = a * b
    IDIV,        // | var int int        | var = a / b, flooring; b = 0 faults
    //---------------+--------------------+----------------------------------------------
    // Relational
    LT,          // | var sym sym        | var = a < b (same non-nil types)
    GT,          // | var sym sym        | var = a > b (same non-nil types)
    EQ,          // | var sym sym        | var = a == b (nil equals only nil)
    //---------------+--------------------+----------------------------------------------
    // Boolean
    AND,         // | var bool bool      | var = a && b
    OR,          // | var bool bool      | var = a || b
    NOT,         // | var bool           | var = !a
    //---------------+--------------------+----------------------------------------------
    // String/int bridges
    INT2CHAR,    // | var int            | var = one-char string of code point
    STRI2INT,    // | var string int     | var = code point at index
    //---------------+--------------------+----------------------------------------------
    // I/O
    READ,        // | var type           | var = next input line as type, nil on failure
    WRITE,       // | sym                | render sym on guest output
    //---------------+--------------------+----------------------------------------------
    // Strings
    CONCAT,      // | var string string  | var = a + b
    STRLEN,      // | var string         | var = code point count
    GETCHAR,     // | var string int     | var = one-char string at index
    SETCHAR,     // | var int string     | var[index] = first code point of b
    //---------------+--------------------+----------------------------------------------
    // Type introspection
    TYPE,        // | var sym            | var = name of sym's dynamic type
    //---------------+--------------------+----------------------------------------------
    // Control flow
    LABEL,       // | label              | no-op; indexed before execution
    JUMP,        // | label              | unconditional jump
    JUMPIFEQ,    // | label sym sym      | jump if equal (EQ type rules)
    JUMPIFNEQ,   // | label sym sym      | jump if not equal (EQ type rules)
    EXIT,        // | int                | terminate with code in [0, 49]
    //---------------+--------------------+----------------------------------------------
    // Debug
    DPRINT,      // | sym                | render sym on diagnostic output
    BREAK,       // |                    | dump interpreter state on diagnostic output
}

impl Opcode {
    /// Number of operands the instruction takes. Checked by the
    /// dispatcher before the handler runs.
    pub fn arity(self) -> usize {
        use self::Opcode::*;

        match self {
            CREATEFRAME | PUSHFRAME | POPFRAME | RETURN | BREAK => 0,
            DEFVAR | CALL | PUSHS | POPS | WRITE | LABEL | JUMP | EXIT | DPRINT => 1,
            MOVE | NOT | INT2CHAR | READ | STRLEN | TYPE => 2,
            ADD | SUB | MUL | IDIV | LT | GT | EQ | AND | OR | STRI2INT | CONCAT | GETCHAR
            | SETCHAR | JUMPIFEQ | JUMPIFNEQ => 3,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
