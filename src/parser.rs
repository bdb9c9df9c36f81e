use runtime::Kind;

use crate::{
    ast::{
        BinaryOperator, Block, ConditionKind, ElseIf, Expr, ExprKind, Function, Ident, Loop,
        LoopCondition, LoopUpdate, Program, StepOperator, Stmt, StmtKind, SwitchCase, TypeName,
        VariadicOperator,
    },
    lexer::{self, extract},
    symbols::well_known,
    token::{Span, Spanned, Token, TokenKind},
    util::intern::{Interned, Interner},
};

type Result<T, E = ()> = std::result::Result<T, E>;

pub type ParseResult<T> = Result<T, (T, Vec<Spanned<Error>>)>;

pub fn parse_program(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner<str>,
) -> ParseResult<Program> {
    parse(
        src,
        tokens,
        ident_interner,
        |p| Ok(p.parse_program()),
        Program::dummy,
    )
}

pub fn parse_expr(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner<str>,
) -> ParseResult<Expr> {
    let default = || Expr::dummy(Span::new_of_length(src.len(), 0));
    parse(
        src,
        tokens,
        ident_interner,
        |p| {
            let expr = p.parse_expr()?;
            if !p.is(TokenKind::Eof) {
                let c = p.peek();
                p.error(c.span().wrap(Error::TrailingInput { token: c.kind }));
            }
            Ok(expr)
        },
        default,
    )
}

fn parse<'src, 'tok, 'ident, T>(
    src: &'src str,
    tokens: &'tok mut Vec<Token>,
    ident_interner: &'ident mut Interner<str>,
    f: impl for<'a> FnOnce(&'a mut Parser<'src, 'tok, 'ident>) -> Result<T>,
    default: impl FnOnce() -> T,
) -> ParseResult<T> {
    assert!(tokens.is_empty());

    if ident_interner.is_empty() {
        // Register well-known names
        for &(expected_handle, name) in well_known::ALL {
            let handle = ident_interner.intern(name);
            assert_eq!(handle, expected_handle);
        }
    }

    // Lex and parse
    let mut lexer_errors = Vec::new();
    lexer::lex(src, tokens, &mut lexer_errors);
    log::trace!("lexed {} tokens", tokens.len());
    let mut p = Parser::new(src, tokens, ident_interner);
    p.errors.extend(
        lexer_errors
            .into_iter()
            .map(|Spanned { span, inner }| span.wrap(Error::Lexer(inner))),
    );
    let parse_result = f(&mut p);

    // Error handling
    let success = parse_result.is_ok();
    let el = parse_result.unwrap_or_else(|()| default());
    if p.errors.is_empty() {
        assert!(success);
        Ok(el)
    } else {
        Err((el, p.errors))
    }
}

/// The construct whose body a block belongs to. Each one ends at its own
/// terminator keywords.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum BlockContext {
    TopLevel,
    Then,
    ElseIf,
    Else,
    Case,
    Default,
    Loop,
    Function,
}

impl BlockContext {
    fn terminators(self) -> &'static [TokenKind] {
        use TokenKind::*;
        match self {
            BlockContext::TopLevel => &[Kthxbye],
            BlockContext::Then | BlockContext::ElseIf => &[Mebbe, NoWai, Oic],
            BlockContext::Else | BlockContext::Default => &[Oic],
            BlockContext::Case => &[Omg, Omgwtf, Oic],
            BlockContext::Loop => &[ImOuttaYr],
            BlockContext::Function => &[IfUSaySo],
        }
    }

    /// Whether a block of this context stops at `kind`. Nested blocks also
    /// stop at any other construct's terminator so that the construct itself
    /// reports the mismatch.
    fn ends_at(self, kind: TokenKind) -> bool {
        kind == TokenKind::Eof
            || self.terminators().contains(&kind)
            || (self != BlockContext::TopLevel && is_block_terminator(kind))
    }
}

fn is_block_terminator(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Kthxbye | Mebbe | NoWai | Oic | Omg | Omgwtf | ImOuttaYr | IfUSaySo
    )
}

fn can_start_expr(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Integer
            | Float
            | Text
            | EscapedText
            | Win
            | Fail
            | Identifier
            | SumOf
            | DiffOf
            | ProduktOf
            | QuoshuntOf
            | ModOf
            | BiggrOf
            | SmallrOf
            | BothOf
            | EitherOf
            | WonOf
            | BothSaem
            | Diffrint
            | Not
            | AllOf
            | AnyOf
            | Smoosh
            | Maek
            | IIz
            | Error
    )
}

struct Parser<'src, 'tok, 'ident> {
    src: &'src str,
    tokens: &'tok mut Vec<Token>,
    ident_interner: &'ident mut Interner<str>,
    cursor: usize,
    errors: Vec<Spanned<Error>>,
}

impl Parser<'_, '_, '_> {
    fn parse_program(&mut self) -> Program {
        self.skip_line_breaks();
        self.expect(TokenKind::Hai);
        if matches!(self.peek().kind, TokenKind::Float | TokenKind::Integer) {
            let version = self.advance();
            if version.text(self.src) != "1.2" {
                self.error(version.span().wrap(Error::UnsupportedVersion));
            }
        }
        self.end_statement();

        let body = self.parse_block(BlockContext::TopLevel);
        self.expect(TokenKind::Kthxbye);
        self.skip_line_breaks();
        if !self.is(TokenKind::Eof) {
            let c = self.peek();
            self.error(c.span().wrap(Error::TrailingInput { token: c.kind }));
        }

        Program {
            statements: body.statements,
            span: Span::new_of_bounds(0..self.src.len()),
        }
    }

    /// Parses statements until the context's terminator. Does **NOT** consume
    /// the terminator.
    fn parse_block(&mut self, context: BlockContext) -> Block {
        let lo = self.peek().span();
        let mut statements = Vec::new();
        loop {
            self.skip_line_breaks();
            if context.ends_at(self.peek().kind) {
                break;
            }
            let start = self.peek().span();
            let errors_before = self.errors.len();
            match self.parse_statement() {
                Ok(stmt) => {
                    statements.push(stmt);
                    if self.errors.len() == errors_before {
                        self.end_statement();
                    } else {
                        self.take(TokenKind::LineBreak);
                    }
                }
                Err(()) => {
                    self.skip_line();
                    statements.push(Stmt::dummy(start.to(self.previous())));
                }
            }
        }
        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => Span::new_of_length(lo.lo, 0),
        };
        Block { statements, span }
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        let start = self.peek();
        let kind = match start.kind {
            TokenKind::IHasA => {
                self.advance();
                let name = self.parse_ident()?;
                let initializer = if self.take(TokenKind::Itz) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                StmtKind::Declaration { name, initializer }
            }
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::R => {
                let target = self.parse_ident()?;
                self.advance(); // R
                let value = self.parse_expr()?;
                StmtKind::Assignment { target, value }
            }
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::IsNowA => {
                let target = self.parse_ident()?;
                self.advance(); // IS NOW A
                let ty = self.parse_type()?;
                StmtKind::CastInPlace { target, ty }
            }
            TokenKind::Visible => {
                self.advance();
                let args = self.parse_variadic_args(None)?;
                let newline = !self.take(TokenKind::Bang);
                StmtKind::Visible { args, newline }
            }
            TokenKind::Gimmeh => {
                self.advance();
                let target = self.parse_ident()?;
                StmtKind::Gimmeh { target }
            }
            TokenKind::CanHas => {
                self.advance();
                let library = self.parse_ident()?;
                self.take(TokenKind::Question);
                StmtKind::Import { library }
            }
            TokenKind::ORly => self.parse_conditional(),
            TokenKind::Wtf => self.parse_switch()?,
            TokenKind::ImInYr => StmtKind::Loop(self.parse_loop()?),
            TokenKind::HowIzI => StmtKind::Function(self.parse_function()?),
            TokenKind::Gtfo => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::FoundYr => {
                self.advance();
                StmtKind::Return(self.parse_expr()?)
            }
            kind if can_start_expr(kind) => StmtKind::Expression(self.parse_expr()?),
            kind => {
                self.error(start.span().wrap(Error::UnexpectedTokenInStatement { token: kind }));
                return Err(());
            }
        };
        Ok(Stmt {
            kind,
            span: start.span().to(self.previous()),
        })
    }

    fn parse_conditional(&mut self) -> StmtKind {
        self.expect(TokenKind::ORly);
        self.expect(TokenKind::LineBreak);
        self.skip_line_breaks();
        self.expect(TokenKind::YaRly);
        self.expect(TokenKind::LineBreak);
        let then_block = self.parse_block(BlockContext::Then);

        let mut else_ifs = Vec::new();
        while self.is(TokenKind::Mebbe) {
            let mebbe = self.advance();
            let condition = self
                .parse_expr()
                .unwrap_or_else(|()| Expr::dummy(mebbe.span().after()));
            self.expect(TokenKind::LineBreak);
            let body = self.parse_block(BlockContext::ElseIf);
            else_ifs.push(ElseIf { condition, body });
        }

        let else_block = if self.take(TokenKind::NoWai) {
            self.expect(TokenKind::LineBreak);
            Some(self.parse_block(BlockContext::Else))
        } else {
            None
        };
        self.expect(TokenKind::Oic);

        StmtKind::Conditional {
            then_block,
            else_ifs,
            else_block,
        }
    }

    fn parse_switch(&mut self) -> Result<StmtKind> {
        let wtf = self.expect(TokenKind::Wtf);
        self.expect(TokenKind::LineBreak);
        self.skip_line_breaks();

        let mut cases = Vec::new();
        while self.is(TokenKind::Omg) {
            let omg = self.advance();
            let label = self
                .parse_expr()
                .unwrap_or_else(|()| Expr::dummy(omg.span().after()));
            self.expect(TokenKind::LineBreak);
            let body = self.parse_block(BlockContext::Case);
            cases.push(SwitchCase { label, body });
        }
        if cases.is_empty() {
            self.error(wtf.span().wrap(Error::EmptySwitch));
        }

        let default = if self.take(TokenKind::Omgwtf) {
            self.expect(TokenKind::LineBreak);
            Some(self.parse_block(BlockContext::Default))
        } else {
            None
        };
        self.expect(TokenKind::Oic);

        if cases.is_empty() {
            return Err(());
        }
        Ok(StmtKind::Switch { cases, default })
    }

    fn parse_loop(&mut self) -> Result<Loop> {
        self.expect(TokenKind::ImInYr);
        let label = self.parse_ident()?;

        let update = match self.peek().kind {
            kind @ (TokenKind::Uppin | TokenKind::Nerfin) => {
                self.advance();
                let op = if kind == TokenKind::Uppin {
                    StepOperator::Uppin
                } else {
                    StepOperator::Nerfin
                };
                self.consume(TokenKind::Yr)?;
                let variable = self.parse_ident()?;
                Some(LoopUpdate { op, variable })
            }
            _ => None,
        };

        let condition = match self.peek().kind {
            kind @ (TokenKind::Til | TokenKind::Wile) => {
                self.advance();
                let kind = if kind == TokenKind::Til {
                    ConditionKind::Til
                } else {
                    ConditionKind::Wile
                };
                let expr = self.parse_expr()?;
                Some(LoopCondition { kind, expr })
            }
            _ => None,
        };
        self.expect(TokenKind::LineBreak);

        let body = self.parse_block(BlockContext::Loop);
        if self.take(TokenKind::ImOuttaYr) {
            if self.is(TokenKind::Identifier) {
                let end = self.parse_ident()?;
                if end.name != label.name {
                    self.error(end.span.wrap(Error::LoopLabelMismatch {
                        label: label.name,
                        end: end.name,
                    }));
                }
            } else {
                let c = self.peek();
                self.error(c.span().wrap(Error::Unexpected {
                    actual: c.kind,
                    expected: TokenKind::Identifier,
                }));
            }
        } else {
            self.expect(TokenKind::ImOuttaYr);
        }

        Ok(Loop {
            label,
            update,
            condition,
            body,
        })
    }

    fn parse_function(&mut self) -> Result<Function> {
        self.expect(TokenKind::HowIzI);
        let name = self.parse_ident()?;

        let mut params = Vec::new();
        if self.take(TokenKind::Yr) {
            params.push(self.parse_ident()?);
            while self.take(TokenKind::An) {
                self.consume(TokenKind::Yr)?;
                params.push(self.parse_ident()?);
            }
        }
        self.expect(TokenKind::LineBreak);

        let body = self.parse_block(BlockContext::Function);
        self.expect(TokenKind::IfUSaySo);

        Ok(Function { name, params, body })
    }

    fn parse_type(&mut self) -> Result<TypeName> {
        let c = self.peek();
        let kind = match c.kind {
            TokenKind::Noob => Kind::Noob,
            TokenKind::Troof => Kind::Troof,
            TokenKind::Numbr => Kind::Numbr,
            TokenKind::Numbar => Kind::Numbar,
            TokenKind::Yarn => Kind::Yarn,
            actual => {
                self.error(c.span().wrap(Error::UnexpectedAny {
                    actual,
                    expected: Box::from(TYPE_TOKENS),
                }));
                return Err(());
            }
        };
        self.advance();
        Ok(TypeName {
            kind,
            span: c.span(),
        })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(self.intern_ident(token))
    }

    fn intern_ident(&mut self, token: Token) -> Ident {
        Ident {
            name: self.ident_interner.intern(extract::ident(token, self.src)),
            span: token.span(),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let token = self.peek();
        let kind = match token.kind {
            TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Text
            | TokenKind::EscapedText
            | TokenKind::Win
            | TokenKind::Fail => {
                self.advance();
                match extract::literal(token, self.src) {
                    Some(literal) => ExprKind::Literal(literal),
                    // Already reported by the lexer.
                    None => ExprKind::Dummy,
                }
            }
            TokenKind::Error => {
                self.advance();
                ExprKind::Dummy
            }
            TokenKind::Identifier => {
                self.advance();
                ExprKind::Variable(self.intern_ident(token))
            }
            kind @ (TokenKind::SumOf
            | TokenKind::DiffOf
            | TokenKind::ProduktOf
            | TokenKind::QuoshuntOf
            | TokenKind::ModOf
            | TokenKind::BiggrOf
            | TokenKind::SmallrOf
            | TokenKind::BothOf
            | TokenKind::EitherOf
            | TokenKind::WonOf
            | TokenKind::BothSaem
            | TokenKind::Diffrint) => {
                let op = match kind {
                    TokenKind::SumOf => BinaryOperator::Sum,
                    TokenKind::DiffOf => BinaryOperator::Diff,
                    TokenKind::ProduktOf => BinaryOperator::Produkt,
                    TokenKind::QuoshuntOf => BinaryOperator::Quoshunt,
                    TokenKind::ModOf => BinaryOperator::Mod,
                    TokenKind::BiggrOf => BinaryOperator::Biggr,
                    TokenKind::SmallrOf => BinaryOperator::Smallr,
                    TokenKind::BothOf => BinaryOperator::BothOf,
                    TokenKind::EitherOf => BinaryOperator::EitherOf,
                    TokenKind::WonOf => BinaryOperator::WonOf,
                    TokenKind::BothSaem => BinaryOperator::BothSaem,
                    TokenKind::Diffrint => BinaryOperator::Diffrint,
                    _ => unreachable!(),
                };
                self.advance();
                let lhs = self.parse_expr()?;
                self.take(TokenKind::An);
                let rhs = self.parse_expr()?;
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            }
            TokenKind::Not => {
                self.advance();
                ExprKind::Not(Box::new(self.parse_expr()?))
            }
            kind @ (TokenKind::AllOf | TokenKind::AnyOf | TokenKind::Smoosh) => {
                let op = match kind {
                    TokenKind::AllOf => VariadicOperator::All,
                    TokenKind::AnyOf => VariadicOperator::Any,
                    TokenKind::Smoosh => VariadicOperator::Smoosh,
                    _ => unreachable!(),
                };
                self.advance();
                let args = self.parse_variadic_args(Some(TokenKind::Mkay))?;
                ExprKind::Variadic { op, args }
            }
            TokenKind::Maek => {
                self.advance();
                let expr = self.parse_expr()?;
                self.take(TokenKind::A);
                let ty = self.parse_type()?;
                ExprKind::Cast {
                    expr: Box::new(expr),
                    ty,
                }
            }
            TokenKind::IIz => {
                self.advance();
                let function = self.parse_ident()?;
                let mut args = Vec::new();
                if self.take(TokenKind::Yr) {
                    args.push(self.parse_expr()?);
                    loop {
                        self.take(TokenKind::An);
                        self.take(TokenKind::Yr);
                        if !can_start_expr(self.peek().kind) {
                            break;
                        }
                        args.push(self.parse_expr()?);
                    }
                }
                self.take(TokenKind::Mkay);
                ExprKind::Call { function, args }
            }
            other => {
                let error = Error::UnexpectedTokenInExpr { token: other };
                self.error(token.span().wrap(error));
                return Err(());
            }
        };

        Ok(Expr {
            kind,
            span: token.span().to(self.previous()),
        })
    }

    /// Parses `expr ([AN] expr)*`, stopping at `terminator` (which is
    /// consumed), at the end of the line, or at any token that cannot start
    /// an expression.
    fn parse_variadic_args(&mut self, terminator: Option<TokenKind>) -> Result<Vec<Expr>> {
        let mut args = vec![self.parse_expr()?];
        loop {
            self.take(TokenKind::An);
            if terminator.is_some_and(|t| self.take(t)) {
                break;
            }
            if !can_start_expr(self.peek().kind) {
                break;
            }
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }
}

const TYPE_TOKENS: &[TokenKind] = &[
    TokenKind::Noob,
    TokenKind::Troof,
    TokenKind::Numbr,
    TokenKind::Numbar,
    TokenKind::Yarn,
];

impl Parser<'_, '_, '_> {
    pub fn new<'src, 'tok, 'ident>(
        src: &'src str,
        tokens: &'tok mut Vec<Token>,
        ident_interner: &'ident mut Interner<str>,
    ) -> Parser<'src, 'tok, 'ident> {
        Parser {
            src,
            tokens,
            ident_interner,
            cursor: 0,
            errors: Vec::with_capacity(8),
        }
    }

    /// Adds an error.
    fn error(&mut self, error: Spanned<Error>) {
        self.errors.push(error);
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> Token {
        self.peek_nth(0)
    }

    /// Returns the token `n` positions ahead of the current one.
    fn peek_nth(&self, n: usize) -> Token {
        match self.tokens.get(self.cursor + n) {
            Some(token) => *token,
            None => Token::eof_for(self.src),
        }
    }

    /// Span of the last consumed token.
    fn previous(&self) -> Span {
        match self.cursor.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span(),
            None => Span::new_of_length(0, 0),
        }
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Token {
        let c = self.peek();
        if !c.is_eof() {
            self.cursor += 1;
        }
        c
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, records an error.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if self.is(expect) {
            self.advance();
            Ok(c)
        } else {
            self.error(c.span().wrap(Error::Unexpected {
                actual: c.kind,
                expected: expect,
            }));
            Err(())
        }
    }

    /// Like [`Parser::consume`], but on a mismatch synthesizes a zero-length
    /// token of the expected kind instead of failing, and doesn't advance.
    fn expect(&mut self, expect: TokenKind) -> Token {
        match self.consume(expect) {
            Ok(token) => token,
            Err(()) => Token::new(expect, Span::new_of_length(self.peek().span().lo, 0)),
        }
    }

    /// Every statement ends at a line break (or at the end of the input).
    /// Anything else left on the line is reported and skipped.
    fn end_statement(&mut self) {
        let c = self.peek();
        match c.kind {
            TokenKind::LineBreak => {
                self.advance();
            }
            TokenKind::Eof => {}
            actual => {
                self.error(c.span().wrap(Error::ExpectedLineBreak { actual }));
                self.skip_line();
            }
        }
    }

    /// Skips up to and including the next line break.
    fn skip_line(&mut self) {
        while !matches!(self.peek().kind, TokenKind::LineBreak | TokenKind::Eof) {
            self.advance();
        }
        self.take(TokenKind::LineBreak);
    }

    fn skip_line_breaks(&mut self) {
        while self.take(TokenKind::LineBreak) {}
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Lexer(lexer::Error),
    UnexpectedTokenInExpr {
        token: TokenKind,
    },
    UnexpectedTokenInStatement {
        token: TokenKind,
    },
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    ExpectedLineBreak {
        actual: TokenKind,
    },
    LoopLabelMismatch {
        label: Interned<str>,
        end: Interned<str>,
    },
    EmptySwitch,
    TrailingInput {
        token: TokenKind,
    },
    /// Only `HAI 1.2` is understood. Reported as a warning.
    UnsupportedVersion,
}

impl Error {
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::UnsupportedVersion)
    }
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use parser;

        fn test_arithmetic_expr() {
            let expr = "SUM OF 3 AN PRODUKT OF 4 5";
            let tree_ok = "
                binary Sum (0..26)
                  integer 3 (7..8)
                  binary Produkt (12..26)
                    integer 4 (23..24)
                    integer 5 (25..26)
            ";
        }

        fn test_literal_exprs() {
            let expr = r#"SMOOSH 1 AN -2.5 AN WIN AN FAIL AN "a:)b" MKAY"#;
            let tree_ok = r#"
                variadic Smoosh (0..46)
                  integer 1 (7..8)
                  float -2.5 (12..16)
                  bool true (20..23)
                  bool false (27..31)
                  text "a\nb" (35..41)
            "#;
        }

        fn test_interpolated_text() {
            let expr = r#""hai :{name}!""#;
            let tree_ok = r#"
                text (0..14)
                  raw "hai "
                  interpolation name ":{name}"
                  raw "!"
            "#;
        }

        fn test_variadic_ends_at_line_end() {
            let expr = "ALL OF WIN AN x AN NOT y";
            let tree_ok = "
                variadic All (0..24)
                  bool true (7..10)
                  ident x (14..15)
                  not (19..24)
                    ident y (23..24)
            ";
        }

        fn test_cast_and_call_exprs() {
            let expr = "MAEK I IZ add YR 1 AN YR x MKAY A NUMBAR";
            let tree_ok = "
                cast NUMBAR (0..40)
                  call add (5..31)
                    integer 1 (17..18)
                    ident x (25..26)
            ";
        }

        fn test_missing_operand() {
            let expr = "SUM OF 1 AN";
            let expected_errors = &["11..11: unexpected end of file in expression"];
        }

        fn test_trailing_tokens_in_expr() {
            let expr = "x y";
            let expected_errors = &["2..3: unexpected input after the end: identifier"];
        }

        fn test_hello_program() {
            let program = indoc::indoc! {r#"
                HAI 1.2
                  CAN HAS STDIO?
                  VISIBLE "HAI WORLD!"
                KTHXBYE
            "#};
            let tree_ok = r#"
                import STDIO (10..24)
                visible (27..47)
                  text "HAI WORLD!" (35..47)
            "#;
        }

        fn test_statements_program() {
            let program = indoc::indoc! {"
                HAI 1.2
                I HAS A x ITZ 1, I HAS A y
                y R SUM OF x AN 2
                y IS NOW A YARN
                GIMMEH x
                VISIBLE x AN y!
                x
                KTHXBYE
            "};
            let tree_ok = "
                declare x (8..23)
                  integer 1 (22..23)
                declare y (25..34)
                assign y (35..52)
                  binary Sum (39..52)
                    ident x (46..47)
                    integer 2 (51..52)
                cast y to YARN (53..68)
                gimmeh x (69..77)
                visible no newline (78..93)
                  ident x (86..87)
                  ident y (91..92)
                expression (94..95)
                  ident x (94..95)
            ";
        }

        fn test_conditional_program() {
            let program = indoc::indoc! {"
                HAI 1.2
                BOTH SAEM x AN 1
                O RLY?
                  YA RLY
                    VISIBLE 1
                  MEBBE BOTH SAEM x AN 2
                    VISIBLE 2
                  NO WAI
                    VISIBLE 3
                OIC
                KTHXBYE
            "};
            let tree_ok = "
                expression (8..24)
                  binary BothSaem (8..24)
                    ident x (18..19)
                    integer 1 (23..24)
                conditional (25..120)
                  then
                    visible (45..54)
                      integer 1 (53..54)
                  else if
                    binary BothSaem (63..79)
                      ident x (73..74)
                      integer 2 (78..79)
                    visible (84..93)
                      integer 2 (92..93)
                  else
                    visible (107..116)
                      integer 3 (115..116)
            ";
        }

        fn test_switch_program() {
            let program = indoc::indoc! {r#"
                HAI 1.2
                WTF?
                  OMG 1
                    VISIBLE "one"
                  OMG "two"
                    VISIBLE "two"
                    GTFO
                  OMGWTF
                    VISIBLE "other"
                OIC
                KTHXBYE
            "#};
            let tree_ok = r#"
                switch (8..110)
                  case
                    integer 1 (19..20)
                    visible (25..38)
                      text "one" (33..38)
                  case
                    text "two" (45..50)
                    visible (55..68)
                      text "two" (63..68)
                    break (73..77)
                  default
                    visible (91..106)
                      text "other" (99..106)
            "#;
        }

        fn test_loop_and_function_program() {
            let program = indoc::indoc! {"
                HAI 1.2
                HOW IZ I twice YR n AN YR m
                  FOUND YR PRODUKT OF n AN 2
                IF U SAY SO
                IM IN YR loop UPPIN YR i TIL BOTH SAEM i AN 3
                  VISIBLE I IZ twice YR i MKAY
                IM OUTTA YR loop
                KTHXBYE
            "};
            let tree_ok = "
                function twice(n, m) (8..76)
                  return (38..64)
                    binary Produkt (47..64)
                      ident n (58..59)
                      integer 2 (63..64)
                loop loop uppin i til (77..170)
                  condition
                    binary BothSaem (106..122)
                      ident i (116..117)
                      integer 3 (121..122)
                  body
                    visible (125..153)
                      call twice (133..153)
                        ident i (147..148)
            ";
        }

        fn test_loop_label_mismatch() {
            let program = indoc::indoc! {"
                HAI 1.2
                IM IN YR a
                  GTFO
                IM OUTTA YR b
                KTHXBYE
            "};
            let expected_errors = &["38..39: loop a closed as b"];
        }

        fn test_empty_switch() {
            let program = indoc::indoc! {"
                HAI 1.2
                WTF?
                OIC
                KTHXBYE
            "};
            let expected_errors = &["8..12: WTF? without any OMG case"];
        }

        fn test_recovers_after_bad_statement() {
            let program = indoc::indoc! {"
                HAI 1.2
                I HAS A
                VISIBLE 1 2 MKAY
                x R
                VISIBLE 3
                KTHXBYE
            "};
            let tree_error = "
                dummy (8..16)
                visible (16..27)
                  integer 1 (24..25)
                  integer 2 (26..27)
                dummy (33..37)
                visible (37..46)
                  integer 3 (45..46)
            ";
            let expected_errors = &[
                "15..16: expected identifier, but got line break",
                "28..32: expected line break, but got MKAY",
                "36..37: unexpected line break in expression",
            ];
        }

        fn test_missing_terminators() {
            let program = indoc::indoc! {"
                HAI 1.2
                O RLY?
                  YA RLY
                    VISIBLE 1
                KTHXBYE
            "};
            let expected_errors = &["38..45: expected OIC, but got KTHXBYE"];
        }

        fn test_lexer_errors_are_reported() {
            let program = indoc::indoc! {r#"
                HAI 1.2
                VISIBLE "open
                VISIBLE 12abc
                KTHXBYE
            "#};
            let tree_error = "
                visible (8..21)
                  dummy (16..21)
                visible (22..35)
                  dummy (30..35)
            ";
            let expected_errors = &["16..21: unclosed text literal", "30..35: malformed number"];
        }

        fn test_unsupported_version() {
            let program = "HAI 1.3\nKTHXBYE\n";
            let expected_errors = &["4..7: unsupported version, expected 1.2"];
        }
    );
}
