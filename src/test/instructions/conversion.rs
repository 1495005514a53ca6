use super::*;

#[test]
fn int2char_builds_one_char_string() {
    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@c")),
        ins!(2, INT2CHAR, var("GF@c"), int(65)),
        ins!(3, WRITE, var("GF@c")),
    ]);

    assert_eq!(run.output, "A");
}

#[test]
fn int2char_handles_non_ascii_code_points() {
    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@c")),
        ins!(2, INT2CHAR, var("GF@c"), int(0x1F600)),
        ins!(3, STRLEN, var("GF@c"), var("GF@c")),
        ins!(4, WRITE, var("GF@c")),
    ]);

    assert_eq!(run.output, "1");
}

#[test]
fn int2char_rejects_invalid_code_points() {
    for code in &[-1i64, 0x110000, 0xD800] {
        let run = run_program(vec![
            ins!(1, DEFVAR, var("GF@c")),
            ins!(2, INT2CHAR, var("GF@c"), int(*code)),
        ]);
        assert_eq!(run.fault(), Fault::InvalidCodePoint(*code));
        assert_eq!(run.error().code(), 58);
    }
}

#[test]
fn stri2int_reads_code_point_at_index() {
    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@i")),
        ins!(2, STRI2INT, var("GF@i"), string("abc"), int(1)),
        ins!(3, WRITE, var("GF@i")),
    ]);

    assert_eq!(run.output, "98");
}

#[test]
fn stri2int_index_out_of_bounds_faults() {
    for index in &[-1i64, 3] {
        let run = run_program(vec![
            ins!(1, DEFVAR, var("GF@i")),
            ins!(2, STRI2INT, var("GF@i"), string("abc"), int(*index)),
        ]);
        assert_eq!(
            run.fault(),
            Fault::IndexOutOfBounds {
                index: *index,
                length: 3,
            }
        );
    }
}

#[test]
fn int2char_stri2int_roundtrip() {
    // STRI2INT of INT2CHAR's output gives back the code point.
    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@c")),
        ins!(2, DEFVAR, var("GF@i")),
        ins!(3, INT2CHAR, var("GF@c"), int(382)),
        ins!(4, STRI2INT, var("GF@i"), var("GF@c"), int(0)),
        ins!(5, WRITE, var("GF@i")),
    ]);

    assert_eq!(run.output, "382");
}

#[test]
fn stri2int_int2char_roundtrip() {
    // INT2CHAR of STRI2INT of a one-char string gives back the string.
    let run = run_program(vec![
        ins!(1, DEFVAR, var("GF@i")),
        ins!(2, DEFVAR, var("GF@c")),
        ins!(3, STRI2INT, var("GF@i"), string("ž"), int(0)),
        ins!(4, INT2CHAR, var("GF@c"), var("GF@i")),
        ins!(5, WRITE, var("GF@c")),
    ]);

    assert_eq!(run.output, "ž");
}
