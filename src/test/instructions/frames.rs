use super::*;

#[test]
fn move_assigns_literal() {
    run_inspecting(
        vec![
            ins!(1, DEFVAR, var("GF@x")),
            ins!(2, MOVE, var("GF@x"), int(5)),
        ],
        "",
        |interpreter| assert_eq!(global_value(interpreter, "x"), Some(Value::Int(5))),
    )
    .outcome();
}

#[test]
fn move_copies_value_not_reference() {
    run_inspecting(
        vec![
            ins!(1, DEFVAR, var("GF@a")),
            ins!(2, DEFVAR, var("GF@b")),
            ins!(3, MOVE, var("GF@a"), string("first")),
            ins!(4, MOVE, var("GF@b"), var("GF@a")),
            ins!(5, MOVE, var("GF@a"), string("second")),
        ],
        "",
        |interpreter| {
            assert_eq!(
                global_value(interpreter, "b"),
                Some(Value::String(String::from("first")))
            );
        },
    )
    .outcome();
}

#[test]
fn move_from_unset_variable_faults() {
    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@a")),
        ins!(2, DEFVAR, var("GF@b")),
        ins!(3, MOVE, var("GF@b"), var("GF@a")),
    ]);

    assert_eq!(run.error().code(), 56);
}

#[test]
fn move_requires_var_destination() {
    let run = run_program(vec![ins!(1, MOVE, int(1), int(2))]);
    assert_eq!(run.fault(), Fault::WrongType(Opcode::MOVE));
}

#[test]
fn defvar_redefinition_faults() {
    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@x")),
        ins!(2, DEFVAR, var("GF@x")),
    ]);

    assert_eq!(run.error().code(), 52);
    assert_eq!(run.error().order(), 2);
}

#[test]
fn defvar_without_temporary_frame_faults() {
    let run = run_program(vec![ins!(1, DEFVAR, var("TF@x"))]);
    assert_eq!(run.fault(), Fault::MissingFrame(FrameName::TF));
}

#[test]
fn defvar_without_local_frame_faults() {
    let run = run_program(vec![ins!(1, DEFVAR, var("LF@x"))]);
    assert_eq!(run.fault(), Fault::MissingFrame(FrameName::LF));
}

#[test]
fn pushframe_without_temporary_frame_faults() {
    let run = run_program(vec![ins!(1, PUSHFRAME)]);
    assert_eq!(run.error().code(), 55);
}

#[test]
fn popframe_with_empty_local_stack_faults() {
    let run = run_program(vec![ins!(1, POPFRAME)]);
    assert_eq!(run.error().code(), 55);
}

#[test]
fn frame_roundtrip_keeps_variables() {
    // CREATEFRAME; DEFVAR TF@x; PUSHFRAME; POPFRAME leaves a TF that
    // still contains x.
    run_inspecting(
        vec![
            ins!(1, CREATEFRAME),
            ins!(2, DEFVAR, var("TF@x")),
            ins!(3, PUSHFRAME),
            ins!(4, POPFRAME),
        ],
        "",
        |interpreter| {
            let temporary = interpreter.frames().temporary().unwrap();
            assert!(temporary.contains("x"));
        },
    )
    .outcome();
}

#[test]
fn pushed_frame_is_addressable_as_local() {
    run_inspecting(
        vec![
            ins!(1, CREATEFRAME),
            ins!(2, DEFVAR, var("TF@x")),
            ins!(3, MOVE, var("TF@x"), int(1)),
            ins!(4, PUSHFRAME),
            ins!(5, MOVE, var("LF@x"), int(2)),
        ],
        "",
        |interpreter| {
            let local = interpreter.frames().local().unwrap();
            assert_eq!(local.get("x"), Some(&Some(Value::Int(2))));
            // TF was moved, not copied.
            assert!(interpreter.frames().temporary().is_none());
        },
    )
    .outcome();
}

#[test]
fn createframe_discards_previous_temporary() {
    let run = run_program(vec![
        ins!(1, CREATEFRAME),
        ins!(2, DEFVAR, var("TF@x")),
        ins!(3, CREATEFRAME),
        ins!(4, MOVE, var("TF@x"), int(1)),
    ]);

    assert_eq!(
        run.fault(),
        Fault::UndefinedVariable(VarRef::new(FrameName::TF, "x"))
    );
}
