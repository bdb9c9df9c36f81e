use crate::util::test_utils::tree_tests;

tree_tests!(
    use binder;

    fn test_declarations_and_it() {
        let program = indoc::indoc! {"
            HAI 1.2
            I HAS A x ITZ 1
            x R SUM OF x AN 2
            x
            VISIBLE IT
            KTHXBYE
        "};
        let tree_ok = "
            declare x#1 (8..23)
              literal NUMBR 1 (22..23)
            assign x#1 (24..41)
              binary Sum (28..41)
                variable x#1 (35..36)
                literal NUMBR 2 (40..41)
            expression into IT#0 (42..43)
              variable x#1 (42..43)
            visible (44..54)
              variable IT#0 (52..54)
        ";
    }

    fn test_functions_are_callable_before_their_definition() {
        let program = indoc::indoc! {"
            HAI 1.2
            VISIBLE I IZ twice YR 2 MKAY
            HOW IZ I twice YR n
              PRODUKT OF n AN 2
            IF U SAY SO
            KTHXBYE
        "};
        let tree_ok = "
            function twice#1(n#2) IT#3 (37..88)
              expression into IT#3 (59..76)
                binary Produkt (59..76)
                  variable n#2 (70..71)
                  literal NUMBR 2 (75..76)
            visible (8..36)
              call twice#1 (16..36)
                literal NUMBR 2 (30..31)
        ";
    }

    fn test_loop_variable_shadows_outer_one() {
        let program = indoc::indoc! {r#"
            HAI 1.2
            I HAS A i ITZ "outer"
            IM IN YR loop UPPIN YR i TIL BOTH SAEM i AN 2
              VISIBLE i
            IM OUTTA YR loop
            VISIBLE i
            KTHXBYE
        "#};
        let tree_ok = r#"
            declare i#1 (8..29)
              literal YARN "outer" (22..29)
            loop uppin i#2 til (30..104)
              condition
                binary BothSaem (59..75)
                  variable i#2 (69..70)
                  literal NUMBR 2 (74..75)
              body
                visible (78..87)
                  variable i#2 (86..87)
            visible (105..114)
              variable i#1 (113..114)
        "#;
    }

    fn test_interpolation_expands_to_smoosh() {
        let program = indoc::indoc! {r#"
            HAI 1.2
            I HAS A name ITZ "cat"
            VISIBLE "hai :{name} and :{nobody}"
            KTHXBYE
        "#};
        let tree_ok = r#"
            declare name#1 (8..30)
              literal YARN "cat" (25..30)
            visible (31..66)
              variadic Smoosh (39..66)
                literal YARN "hai " (39..66)
                variable name#1 (39..66)
                literal YARN " and " (39..66)
                literal YARN ":{nobody}" (39..66)
        "#;
    }

    fn test_functions_have_their_own_it() {
        let program = indoc::indoc! {"
            HAI 1.2
            HOW IZ I f
              WIN
              O RLY?
                YA RLY
                  GTFO
              OIC
            IF U SAY SO
            KTHXBYE
        "};
        let tree_ok = "
            function f#1() IT#2 (8..73)
              expression into IT#2 (21..24)
                literal TROOF WIN (21..24)
              conditional on IT#2 (27..61)
                then
                  break function (51..55)
        ";
    }

    fn test_call_errors() {
        let program = indoc::indoc! {"
            HAI 1.2
            HOW IZ I add YR a AN YR b
              FOUND YR SUM OF a AN b
            IF U SAY SO
            VISIBLE I IZ add YR 1 MKAY
            VISIBLE I IZ sub YR 1 AN YR 2 MKAY
            VISIBLE y
            KTHXBYE
        "};
        let expected_errors = &[
            "79..97: incorrect number of arguments to add. expected 2, but got 1",
            "111..114: function sub is not defined",
            "141..142: y is not declared",
        ];
    }

    fn test_function_bodies_do_not_see_globals() {
        let program = indoc::indoc! {"
            HAI 1.2
            I HAS A x ITZ 1
            HOW IZ I f
              VISIBLE x
            IF U SAY SO
            KTHXBYE
        "};
        let expected_errors = &["45..46: x is not declared"];
    }

    fn test_duplicate_definitions() {
        let program = indoc::indoc! {"
            HAI 1.2
            I HAS A x
            I HAS A x
            HOW IZ I f YR a AN YR a
            IF U SAY SO
            HOW IZ I f
            IF U SAY SO
            KTHXBYE
        "};
        let expected_errors = &[
            "50..51: parameter a already declared",
            "73..74: function f already defined at 37..38",
            "26..27: x already declared at 16..17",
        ];
    }

    fn test_break_and_return_placement() {
        let program = indoc::indoc! {"
            HAI 1.2
            GTFO
            FOUND YR 1
            IM IN YR l
              HOW IZ I g
              IF U SAY SO
              GTFO
            IM OUTTA YR l
            KTHXBYE
        "};
        let expected_errors = &[
            "8..12: GTFO outside of a loop, switch or function",
            "13..23: FOUND YR outside of a function",
            "46..47: function g must be defined at the top level",
        ];
    }

    // `1` and `"1"` are different labels.
    fn test_switch_labels() {
        let program = indoc::indoc! {r#"
            HAI 1.2
            WTF?
              OMG 1
                VISIBLE "int"
              OMG "1"
                VISIBLE "text"
              OMG 1
                GTFO
              OMG SUM OF 1 AN 1
                GTFO
            OIC
            KTHXBYE
        "#};
        let expected_errors = &[
            "74..75: OMG label already used at 19..20",
            "91..104: OMG label is not a literal",
        ];
    }
);
