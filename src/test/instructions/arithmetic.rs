use super::*;

fn binary(opcode: Opcode, a: i64, b: i64) -> Run {
    run_inspecting(
        vec![
            ins!(1, DEFVAR, var("GF@r")),
            Instruction::new(2, opcode, vec![var("GF@r"), int(a), int(b)]),
        ],
        "",
        |_| {},
    )
}

fn result_of(opcode: Opcode, a: i64, b: i64) -> Value {
    let mut result = None;
    run_inspecting(
        vec![
            ins!(1, DEFVAR, var("GF@r")),
            Instruction::new(2, opcode, vec![var("GF@r"), int(a), int(b)]),
        ],
        "",
        |interpreter| result = global_value(interpreter, "r"),
    )
    .outcome();
    result.unwrap()
}

#[test]
fn add_sub_mul() {
    assert_eq!(result_of(Opcode::ADD, 2, 3), Value::Int(5));
    assert_eq!(result_of(Opcode::SUB, 2, 3), Value::Int(-1));
    assert_eq!(result_of(Opcode::MUL, -4, 3), Value::Int(-12));
}

#[test]
fn idiv_floors_toward_negative_infinity() {
    assert_eq!(result_of(Opcode::IDIV, 7, 2), Value::Int(3));
    assert_eq!(result_of(Opcode::IDIV, -7, 2), Value::Int(-4));
    assert_eq!(result_of(Opcode::IDIV, 7, -2), Value::Int(-4));
    assert_eq!(result_of(Opcode::IDIV, -7, -2), Value::Int(3));
    assert_eq!(result_of(Opcode::IDIV, 6, 3), Value::Int(2));
}

#[test]
fn idiv_by_zero_faults() {
    let run = binary(Opcode::IDIV, 1, 0);

    assert_eq!(run.fault(), Fault::DivisionByZero);
    assert_eq!(run.error().code(), 57);
}

#[test]
fn idiv_min_by_minus_one_wraps() {
    assert_eq!(
        result_of(Opcode::IDIV, i64::MIN, -1),
        Value::Int(i64::MIN)
    );
}

#[test]
fn operands_must_be_ints() {
    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@r")),
        ins!(2, ADD, var("GF@r"), int(1), boolean(true)),
    ]);
    assert_eq!(run.fault(), Fault::WrongType(Opcode::ADD));

    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@r")),
        ins!(2, SUB, var("GF@r"), nil(), int(1)),
    ]);
    assert_eq!(run.fault(), Fault::WrongType(Opcode::SUB));
}

#[test]
fn destination_must_be_var() {
    let run = run_program(vec![ins!(1, MUL, int(0), int(1), int(2))]);
    assert_eq!(run.fault(), Fault::WrongType(Opcode::MUL));
}

#[test]
fn arithmetic_wraps_on_overflow() {
    assert_eq!(
        result_of(Opcode::ADD, i64::MAX, 1),
        Value::Int(i64::MIN)
    );
}

#[test]
fn failed_check_leaves_destination_untouched() {
    let run = run_inspecting(
        vec![
            ins!(1, DEFVAR, var("GF@r")),
            ins!(2, MOVE, var("GF@r"), int(9)),
            ins!(3, ADD, var("GF@r"), int(1), string("oops")),
        ],
        "",
        |interpreter| assert_eq!(global_value(interpreter, "r"), Some(Value::Int(9))),
    );

    assert_eq!(run.error().code(), 53);
}
