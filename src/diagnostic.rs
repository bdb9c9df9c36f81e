//! Compiler output meant for people: every phase's errors, converted to a
//! common shape with a stable id and a line/character location.

use std::fmt;

use crate::{
    binder, codegen, lexer, parser,
    token::{Span, Spanned},
    util::fmt::{Context, Show},
};

/// A named unit of source text.
pub struct SourceFile {
    name: Box<str>,
    text: String,
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<Box<str>>, text: impl Into<String>) -> SourceFile {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        SourceFile {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self, span: Span) -> Location {
        Location {
            start: self.position(span.lo),
            end: self.position(span.hi()),
        }
    }

    /// Zero-based position of the byte `offset`. Characters are counted in
    /// chars, not bytes.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let start = self.line_starts[line];
        let character = self
            .text
            .get(start..offset)
            .map_or(offset - start, |prefix| prefix.chars().count());
        Position { line, character }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Category {
    Lexical,
    Syntax,
    Semantic,
    Internal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Stable identifier, such as `LOL0304`.
    pub id: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub file: Box<str>,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Position { line, character } = self.location.start;
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "{}:{}:{}: {severity}[{}]: {}",
            self.file,
            line + 1,
            character + 1,
            self.id,
            self.message
        )
    }
}

/// The diagnostics of one compilation, in the order they were reported.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push<E>(&mut self, file: &SourceFile, ctx: &Context<'_>, error: &Spanned<E>)
    where
        Spanned<E>: Show,
        E: Identified,
    {
        let (id, category, severity) = error.inner.identify();
        self.items.push(Diagnostic {
            id,
            category,
            severity,
            file: file.name.clone(),
            location: file.location(error.span),
            message: error.display(ctx).to_string(),
        });
    }

    pub(crate) fn parser(
        &mut self,
        file: &SourceFile,
        ctx: &Context<'_>,
        errors: &[Spanned<parser::Error>],
    ) {
        for error in errors {
            self.push(file, ctx, error);
        }
    }

    pub(crate) fn binder(
        &mut self,
        file: &SourceFile,
        ctx: &Context<'_>,
        errors: &[Spanned<binder::Error>],
    ) {
        for error in errors {
            self.push(file, ctx, error);
        }
    }

    pub(crate) fn internal(&mut self, file: &SourceFile, error: &Spanned<codegen::Error>) {
        self.items.push(Diagnostic {
            id: "LOL9001",
            category: Category::Internal,
            severity: Severity::Error,
            file: file.name.clone(),
            location: file.location(error.span),
            message: format!("internal compiler error: {}", error.inner),
        });
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Maps an error to its stable id, category and severity.
trait Identified {
    fn identify(&self) -> (&'static str, Category, Severity);
}

impl Identified for parser::Error {
    fn identify(&self) -> (&'static str, Category, Severity) {
        use parser::Error::*;
        let id = match self {
            Lexer(error) => {
                let id = match error {
                    lexer::Error::UnexpectedChar(_) => "LOL0101",
                    lexer::Error::UnclosedText => "LOL0102",
                    lexer::Error::BadNumber => "LOL0103",
                    lexer::Error::BadEscape => "LOL0104",
                    lexer::Error::UnclosedComment => "LOL0105",
                };
                return (id, Category::Lexical, Severity::Error);
            }
            UnexpectedTokenInExpr { .. } => "LOL0201",
            UnexpectedTokenInStatement { .. } => "LOL0202",
            Unexpected { .. } | UnexpectedAny { .. } => "LOL0203",
            ExpectedLineBreak { .. } => "LOL0204",
            LoopLabelMismatch { .. } => "LOL0205",
            EmptySwitch => "LOL0206",
            TrailingInput { .. } => "LOL0207",
            UnsupportedVersion => "LOL0208",
        };
        let severity = if self.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        };
        (id, Category::Syntax, severity)
    }
}

impl Identified for binder::Error {
    fn identify(&self) -> (&'static str, Category, Severity) {
        use binder::Error::*;
        let id = match self {
            DuplicateFunction { .. } => "LOL0301",
            DuplicateParameter { .. } => "LOL0302",
            Redeclaration { .. } => "LOL0303",
            UndeclaredVariable(_) => "LOL0304",
            UndefinedFunction(_) => "LOL0305",
            ArgumentCount { .. } => "LOL0306",
            MisplacedBreak => "LOL0307",
            MisplacedReturn => "LOL0308",
            NonLiteralCaseLabel => "LOL0309",
            DuplicateCaseLabel { .. } => "LOL0310",
            NestedFunction { .. } => "LOL0311",
        };
        (id, Category::Semantic, Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_positions() {
        let file = SourceFile::new("cat.lol", "HAI 1.2\nVISIBLE \"kitteh\"\r\n\nKTHXBYE");
        assert_eq!(file.position(0), Position { line: 0, character: 0 });
        assert_eq!(file.position(7), Position { line: 0, character: 7 });
        assert_eq!(file.position(8), Position { line: 1, character: 0 });
        assert_eq!(file.position(16), Position { line: 1, character: 8 });
        assert_eq!(file.position(26), Position { line: 2, character: 0 });
        assert_eq!(file.position(27), Position { line: 3, character: 0 });
        assert_eq!(file.position(1000), Position { line: 3, character: 7 });
    }

    #[test]
    fn test_positions_count_chars() {
        let file = SourceFile::new("nyan.lol", "VISIBLE \"ñañ\" x");
        let location = file.location(Span::new_of_bounds(16..17));
        assert_eq!(location.start, Position { line: 0, character: 14 });
        assert_eq!(location.end, Position { line: 0, character: 15 });
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic {
            id: "LOL0304",
            category: Category::Semantic,
            severity: Severity::Error,
            file: "cat.lol".into(),
            location: Location {
                start: Position { line: 2, character: 8 },
                end: Position { line: 2, character: 9 },
            },
            message: "y is not declared".into(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "cat.lol:3:9: error[LOL0304]: y is not declared"
        );
    }
}
