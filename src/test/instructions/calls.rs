use super::*;

#[test]
fn nested_calls_unwind_in_order() {
    let run = run_program(vec![
        ins!(1, JUMP, label("main")),
        ins!(2, LABEL, label("inner")),
        ins!(3, WRITE, string("i")),
        ins!(4, RETURN),
        ins!(5, LABEL, label("outer")),
        ins!(6, WRITE, string("o")),
        ins!(7, CALL, label("inner")),
        ins!(8, WRITE, string("O")),
        ins!(9, RETURN),
        ins!(10, LABEL, label("main")),
        ins!(11, CALL, label("outer")),
        ins!(12, WRITE, string("m")),
    ]);

    assert_eq!(run.outcome(), Outcome::Completed);
    assert_eq!(run.output, "oiOm");
}

#[test]
fn call_as_last_instruction_completes_after_return() {
    let run = run_program(vec![
        ins!(1, JUMP, label("main")),
        ins!(2, LABEL, label("f")),
        ins!(3, WRITE, string("f")),
        ins!(4, RETURN),
        ins!(5, LABEL, label("main")),
        ins!(6, CALL, label("f")),
    ]);

    assert_eq!(run.outcome(), Outcome::Completed);
    assert_eq!(run.output, "f");
}

#[test]
fn return_with_empty_call_stack_faults() {
    let run = run_program(vec![ins!(1, RETURN)]);

    assert_eq!(run.fault(), Fault::EmptyCallStack);
    assert_eq!(run.error().code(), 56);
}

#[test]
fn call_to_missing_label_faults() {
    let run = run_program(vec![ins!(1, CALL, label("nowhere"))]);

    assert_eq!(run.fault(), Fault::UndefinedLabel(String::from("nowhere")));
    assert_eq!(run.error().code(), 52);
}

#[test]
fn call_requires_label_operand() {
    let run = run_program(vec![ins!(1, CALL, int(3))]);
    assert_eq!(run.fault(), Fault::WrongType(Opcode::CALL));
}
