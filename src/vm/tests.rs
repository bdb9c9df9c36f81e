use indoc::indoc;
use pretty_assertions::assert_eq;
use runtime::Value;

use super::{Fault, Limits, Machine, Trap};
use crate::{
    codegen::{self, Artifact},
    lowering,
    token::Span,
    util::test_utils::bind,
};

fn compile(src: &str) -> Artifact {
    let (i, program) = bind(src);
    codegen::generate(&lowering::lower(program), &i).expect("failed to generate")
}

fn run_with_input(src: &str, input: &str) -> Result<String, Fault> {
    let artifact = compile(src);
    let mut out = Vec::new();
    Machine::new(&artifact, input.as_bytes(), &mut out).run()?;
    Ok(String::from_utf8(out).expect("output is not UTF-8"))
}

#[track_caller]
fn assert_output(src: &str, expected: &str) {
    let output = run_with_input(src, "").expect("program faulted");
    assert_eq!(output, expected);
}

#[test]
fn test_sum_is_printed() {
    assert_output("HAI 1.2\nVISIBLE SUM OF 3 AN 4\nKTHXBYE\n", "7\n");
}

#[test]
fn test_noob_operand_faults() {
    let src = indoc! {"
        HAI 1.2
        I HAS A x
        VISIBLE SUM OF x AN 1
        KTHXBYE
    "};
    let fault = run_with_input(src, "").expect_err("summed NOOB");
    assert_eq!(
        fault,
        Fault {
            trap: Trap::Runtime(runtime::Error::AbsentOperand {
                operation: "SUM OF"
            }),
            procedure: "HAI".into(),
            span: Span::new_of_bounds(26..39),
        }
    );
    assert_eq!(fault.to_string(), "cannot use NOOB as an operand of SUM OF");
}

#[test]
fn test_loop_tests_before_each_iteration() {
    let src = indoc! {"
        HAI 1.2
        IM IN YR l UPPIN YR i TIL BOTH SAEM i AN 3
          VISIBLE i
        IM OUTTA YR l
        KTHXBYE
    "};
    assert_output(src, "0\n1\n2\n");
}

#[test]
fn test_loop_may_run_zero_times() {
    let src = indoc! {r#"
        HAI 1.2
        IM IN YR l NERFIN YR i WILE DIFFRINT i AN 0
          VISIBLE "never"
        IM OUTTA YR l
        VISIBLE "done"
        KTHXBYE
    "#};
    assert_output(src, "done\n");
}

#[test]
fn test_nerfin_counts_down() {
    let src = indoc! {"
        HAI 1.2
        IM IN YR l NERFIN YR i TIL BOTH SAEM i AN -3
          VISIBLE i
        IM OUTTA YR l
        KTHXBYE
    "};
    assert_output(src, "0\n-1\n-2\n");
}

#[test]
fn test_function_returns_its_own_it() {
    let src = indoc! {r#"
        HAI 1.2
        HOW IZ I f
          "inner"
        IF U SAY SO
        "outer"
        VISIBLE I IZ f MKAY
        KTHXBYE
    "#};
    assert_output(src, "inner\n");
}

#[test]
fn test_function_does_not_see_the_callers_it() {
    let src = indoc! {r#"
        HAI 1.2
        HOW IZ I f
          VISIBLE SMOOSH "[" AN IT AN "]" MKAY
        IF U SAY SO
        "outer"
        I IZ f MKAY
        KTHXBYE
    "#};
    assert_output(src, "[]\n");
}

#[test]
fn test_break_in_function_returns_noob() {
    let src = indoc! {r#"
        HAI 1.2
        HOW IZ I f
          "ignored"
          GTFO
        IF U SAY SO
        I HAS A x ITZ I IZ f MKAY
        VISIBLE MAEK x A TROOF
        KTHXBYE
    "#};
    assert_output(src, "FAIL\n");
}

#[test]
fn test_switch_falls_through_until_break() {
    let src = indoc! {r#"
        HAI 1.2
        2
        WTF?
          OMG 1
            VISIBLE "one"
          OMG 2
            VISIBLE "two"
          OMG 3
            VISIBLE "three"
            GTFO
          OMGWTF
            VISIBLE "default"
        OIC
        VISIBLE "after"
        KTHXBYE
    "#};
    assert_output(src, "two\nthree\nafter\n");
}

#[test]
fn test_switch_without_match_runs_default() {
    let src = indoc! {r#"
        HAI 1.2
        "cat"
        WTF?
          OMG "dog"
            VISIBLE "woof"
            GTFO
          OMGWTF
            VISIBLE "meow"
        OIC
        KTHXBYE
    "#};
    assert_output(src, "meow\n");
}

#[test]
fn test_switch_without_match_or_default_runs_no_case() {
    let src = indoc! {r#"
        HAI 1.2
        9
        WTF?
          OMG 1
            VISIBLE "one"
          OMG 2
            VISIBLE "two"
        OIC
        VISIBLE "after"
        KTHXBYE
    "#};
    assert_output(src, "after\n");
}

#[test]
fn test_break_in_switch_inside_loop_leaves_the_switch() {
    let src = indoc! {r#"
        HAI 1.2
        IM IN YR l UPPIN YR i TIL BOTH SAEM i AN 3
          i
          WTF?
            OMG 1
              VISIBLE "one"
              GTFO
            OMGWTF
              VISIBLE "other"
          OIC
        IM OUTTA YR l
        KTHXBYE
    "#};
    assert_output(src, "other\none\nother\n");
}

#[test]
fn test_break_in_loop_inside_switch_leaves_the_loop() {
    let src = indoc! {r#"
        HAI 1.2
        1
        WTF?
          OMG 1
            IM IN YR l
              VISIBLE "looping"
              GTFO
            IM OUTTA YR l
            VISIBLE "still in case"
          OMG 2
            VISIBLE "fell through"
            GTFO
        OIC
        KTHXBYE
    "#};
    assert_output(src, "looping\nstill in case\nfell through\n");
}

#[test]
fn test_conditional_branches() {
    let src = indoc! {r#"
        HAI 1.2
        I HAS A n ITZ 7
        BOTH SAEM n AN 1
        O RLY?
          YA RLY
            VISIBLE "one"
          MEBBE BOTH SAEM n AN 7
            VISIBLE "seven"
          NO WAI
            VISIBLE "other"
        OIC
        DIFFRINT n AN 7
        O RLY?
          YA RLY
            VISIBLE "unreachable"
          NO WAI
            VISIBLE "else"
        OIC
        KTHXBYE
    "#};
    assert_output(src, "seven\nelse\n");
}

#[test]
fn test_numeric_equality_across_kinds() {
    let src = indoc! {r#"
        HAI 1.2
        VISIBLE BOTH SAEM 1 AN 1.0
        VISIBLE BOTH SAEM "1" AN 1
        VISIBLE DIFFRINT 2 AN 2.5
        KTHXBYE
    "#};
    assert_output(src, "WIN\nFAIL\nWIN\n");
}

#[test]
fn test_casts_and_arithmetic() {
    let src = indoc! {r#"
        HAI 1.2
        I HAS A x ITZ "12"
        x IS NOW A NUMBR
        VISIBLE SUM OF x AN 1
        VISIBLE QUOSHUNT OF 1.0 AN 4
        VISIBLE QUOSHUNT OF 7 AN 2
        VISIBLE MOD OF 7 AN 0
        VISIBLE MAEK 3 A NUMBAR
        KTHXBYE
    "#};
    assert_output(src, "13\n0.25\n3\n0\n3.00\n");
}

#[test]
fn test_variadics() {
    let src = indoc! {r#"
        HAI 1.2
        VISIBLE ALL OF WIN AN 1 AN "x" MKAY
        VISIBLE ANY OF FAIL AN 0 AN "" MKAY
        VISIBLE SMOOSH "a" AN 1 AN WIN MKAY
        VISIBLE ALL OF 5 MKAY
        KTHXBYE
    "#};
    assert_output(src, "WIN\nFAIL\na1WIN\nWIN\n");
}

#[test]
fn test_visible_without_newline() {
    let src = indoc! {r#"
        HAI 1.2
        VISIBLE "a" 1!
        VISIBLE "b"
        KTHXBYE
    "#};
    assert_output(src, "a1b\n");
}

#[test]
fn test_gimmeh_reads_a_line() {
    let src = indoc! {r#"
        HAI 1.2
        I HAS A name
        GIMMEH name
        VISIBLE "hai :{name}"
        KTHXBYE
    "#};
    let output = run_with_input(src, "ceiling cat\nignored\n").expect("program faulted");
    assert_eq!(output, "hai ceiling cat\n");
}

const FACTORIAL: &str = indoc! {"
    HAI 1.2
    HOW IZ I fact YR n
      BOTH SAEM n AN 0
      O RLY?
        YA RLY
          FOUND YR 1
      OIC
      FOUND YR PRODUKT OF n AN I IZ fact YR DIFF OF n AN 1 MKAY
    IF U SAY SO
    VISIBLE I IZ fact YR 5 MKAY
    KTHXBYE
"};

#[test]
fn test_recursion() {
    assert_output(FACTORIAL, "120\n");
}

#[test]
fn test_calling_a_function_by_name() {
    let artifact = compile(FACTORIAL);
    let mut out = Vec::new();
    let mut machine = Machine::new(&artifact, "".as_bytes(), &mut out);

    let result = machine.call("fact", vec![Value::Numbr(4)]);
    assert_eq!(result, Ok(Value::Numbr(24)));

    let missing = machine.call("fib", vec![]).expect_err("called a missing function");
    assert_eq!(missing.trap, Trap::UnknownFunction("fib".into()));

    let arity = machine.call("fact", vec![]).expect_err("called with no arguments");
    assert_eq!(
        arity.trap,
        Trap::ArgumentCount {
            function: "fact".into(),
            expected: 1,
            actual: 0,
        }
    );
    assert!(out.is_empty());
}

#[test]
fn test_runaway_recursion_faults() {
    let src = indoc! {"
        HAI 1.2
        HOW IZ I forever
          FOUND YR I IZ forever MKAY
        IF U SAY SO
        I IZ forever MKAY
        KTHXBYE
    "};
    let artifact = compile(src);
    let limits = Limits { max_call_depth: 16 };
    let fault = Machine::new(&artifact, "".as_bytes(), Vec::new())
        .with_limits(limits)
        .run()
        .expect_err("recursed forever");
    assert_eq!(
        fault.trap,
        Trap::Runtime(runtime::Error::CallDepthExceeded { limit: 16 })
    );
    assert_eq!(&*fault.procedure, "forever");
}
