use std::io::{BufRead, Write};

use crate::{
    codegen::Artifact,
    diagnostic::{Diagnostics, Location, SourceFile},
    util::{fmt::Context, intern::Interner},
};

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The binder resolves every name of an AST to its symbol and validates
/// control flow, mapping the AST into a bound tree.
pub mod binder;

/// Lowering rewrites a bound tree into the form code generation expects.
pub mod lowering;

/// Code generation maps a bound tree into an executable [`Artifact`].
pub mod codegen;

/// The virtual machine executes an [`Artifact`].
pub mod vm;

pub mod ast;
pub mod bound;
pub mod diagnostic;
pub mod symbols;
pub mod token;

pub mod util {
    pub mod fmt;
    pub mod intern;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub struct Compilation {
    pub diagnostics: Diagnostics,
    /// Present only if no error was reported.
    pub artifact: Option<Artifact>,
}

/// Compiles a whole program. Every phase runs, so that all of the source's
/// diagnostics are reported at once, except for code generation, which only
/// runs on an error-free program.
pub fn compile(file: &SourceFile) -> Compilation {
    let mut diagnostics = Diagnostics::default();
    let mut ident_interner = Interner::with_capacity(128);
    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);

    let parsed = parser::parse_program(file.text(), &mut tokens, &mut ident_interner);
    let ctx = Context::new(&ident_interner);
    let program = match parsed {
        Ok(program) => program,
        Err((program, errors)) => {
            diagnostics.parser(file, &ctx, &errors);
            program
        }
    };
    log::debug!(
        "parsed {} tokens with {} diagnostics",
        tokens.len(),
        diagnostics.len()
    );

    let bound = match binder::bind(program, &ident_interner) {
        Ok(bound) => bound,
        Err((bound, errors)) => {
            diagnostics.binder(file, &ctx, &errors);
            bound
        }
    };
    log::debug!(
        "bound {} functions, {} diagnostics so far",
        bound.functions.len(),
        diagnostics.len()
    );

    if diagnostics.has_errors() {
        log::debug!(
            "skipping code generation after {} errors",
            diagnostics.error_count()
        );
        return Compilation {
            diagnostics,
            artifact: None,
        };
    }

    let lowered = lowering::lower(bound);
    let artifact = match codegen::generate(&lowered, &ident_interner) {
        Ok(artifact) => {
            log::debug!("generated {} procedures", artifact.functions.len() + 1);
            Some(artifact)
        }
        Err(error) => {
            diagnostics.internal(file, &error);
            None
        }
    };
    Compilation {
        diagnostics,
        artifact,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("compilation failed with {} errors", .0.error_count())]
    Compile(Diagnostics),

    #[error(
        "{file}:{}:{}: runtime error in {}: {fault}",
        .location.start.line + 1,
        .location.start.character + 1,
        .fault.procedure
    )]
    Fault {
        file: Box<str>,
        location: Location,
        #[source]
        fault: vm::Fault,
    },
}

/// Compiles and runs a program, reading `GIMMEH` lines from `input` and
/// writing `VISIBLE` output to `output`.
pub fn run(file: &SourceFile, input: impl BufRead, output: impl Write) -> Result<(), RunError> {
    let Compilation {
        diagnostics,
        artifact,
    } = compile(file);
    let Some(artifact) = artifact else {
        return Err(RunError::Compile(diagnostics));
    };
    vm::Machine::new(&artifact, input, output)
        .run()
        .map(drop)
        .map_err(|fault| RunError::Fault {
            file: file.name().into(),
            location: file.location(fault.span),
            fault,
        })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::diagnostic::{Category, Position, Severity};

    fn ids(compilation: &Compilation) -> Vec<&'static str> {
        compilation.diagnostics.iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_run() {
        let file = SourceFile::new("sum.lol", "HAI 1.2\nVISIBLE SUM OF 3 AN 4\nKTHXBYE\n");
        let mut out = Vec::new();
        run(&file, "".as_bytes(), &mut out).expect("failed to run");
        assert_eq!(out, b"7\n");
    }

    #[test]
    fn test_semantic_errors_skip_code_generation() {
        let file = SourceFile::new("y.lol", "HAI 1.2\nVISIBLE y\nKTHXBYE\n");
        let compilation = compile(&file);
        assert!(compilation.artifact.is_none());
        assert_eq!(ids(&compilation), ["LOL0304"]);

        let diagnostic = &compilation.diagnostics.iter().as_slice()[0];
        assert_eq!(diagnostic.category, Category::Semantic);
        assert_eq!(diagnostic.message, "y is not declared");
        assert_eq!(diagnostic.location.start, Position { line: 1, character: 8 });
        assert_eq!(diagnostic.to_string(), "y.lol:2:9: error[LOL0304]: y is not declared");
    }

    #[test]
    fn test_all_phases_report() {
        let src = indoc! {"
            HAI 1.2
            VISIBLE SUM OF 1
            VISIBLE y
            KTHXBYE
        "};
        let compilation = compile(&SourceFile::new("both.lol", src));
        assert!(compilation.artifact.is_none());
        let categories: Vec<_> = compilation.diagnostics.iter().map(|d| d.category).collect();
        assert!(categories.contains(&Category::Syntax));
        assert!(categories.contains(&Category::Semantic));
    }

    #[test]
    fn test_warnings_do_not_skip_code_generation() {
        let file = SourceFile::new("old.lol", "HAI 1.3\nVISIBLE 1\nKTHXBYE\n");
        let compilation = compile(&file);
        assert_eq!(ids(&compilation), ["LOL0208"]);
        assert!(compilation.diagnostics.iter().all(|d| d.severity == Severity::Warning));
        assert!(compilation.artifact.is_some());
    }

    #[test]
    fn test_compile_failure() {
        let file = SourceFile::new("bad.lol", "HAI 1.2\nGTFO\nKTHXBYE\n");
        let error = run(&file, "".as_bytes(), Vec::new()).expect_err("ran an invalid program");
        assert_eq!(error.to_string(), "compilation failed with 1 errors");
    }

    #[test]
    fn test_runtime_fault_location() {
        let src = indoc! {"
            HAI 1.2
            I HAS A x
            VISIBLE SUM OF x AN 1
            KTHXBYE
        "};
        let file = SourceFile::new("noob.lol", src);
        let error = run(&file, "".as_bytes(), Vec::new()).expect_err("summed NOOB");
        assert_eq!(
            error.to_string(),
            "noob.lol:3:9: runtime error in HAI: cannot use NOOB as an operand of SUM OF"
        );
    }

    const DEMOS: &[(&str, &str)] = &[
        ("factorial.lol", include_str!("../demos/factorial.lol")),
        ("fizzbuzz.lol", include_str!("../demos/fizzbuzz.lol")),
        ("guess.lol", include_str!("../demos/guess.lol")),
    ];

    fn run_demo(name: &str, input: &str) -> String {
        let (_, src) = DEMOS.iter().find(|(demo, _)| *demo == name).expect("no such demo");
        let mut out = Vec::new();
        run(&SourceFile::new(name, *src), input.as_bytes(), &mut out).expect("demo failed");
        String::from_utf8(out).expect("output is not UTF-8")
    }

    #[test]
    fn test_demos_compile_cleanly() {
        for &(name, src) in DEMOS {
            let compilation = compile(&SourceFile::new(name, src));
            let diagnostics: Vec<_> = compilation
                .diagnostics
                .iter()
                .map(ToString::to_string)
                .collect();
            assert_eq!(diagnostics, Vec::<String>::new(), "{name}");
            assert!(compilation.artifact.is_some(), "{name}");
        }
    }

    #[test]
    fn test_factorial_demo() {
        let output = run_demo("factorial.lol", "");
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "0! = 1 (1)");
        assert_eq!(lines[5], "5! = 120 (120)");
        assert_eq!(lines[10], "10! = 3628800 (3628800)");
    }

    #[test]
    fn test_fizzbuzz_demo() {
        let output = run_demo("fizzbuzz.lol", "");
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 100);
        assert_eq!(&lines[..7], ["1", "2", "Fizz", "4", "Buzz", "Fizz", "7"]);
        assert_eq!(lines[14], "FizzBuzz");
        assert_eq!(lines[99], "Buzz");
    }

    #[test]
    fn test_guess_demo() {
        let output = run_demo("guess.lol", "50\n10\n42\n");
        let expected = indoc! {"
            guess a number: too big
            guess a number: too small
            guess a number: you got it in 3 tries!
            kthxbye
        "};
        assert_eq!(output, expected);
    }
}
