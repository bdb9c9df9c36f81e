use std::iter::Peekable;

use crate::token::{Span, Spanned, Token, TokenKind, KEYWORDS, MAX_KEYWORD_WORDS, UNICODE_NAMES};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

/// Lexes the provided string, producing the tokens into the provided buffer.
/// Trivia is dropped; lexical errors are pushed into `errors` and the
/// offending lexeme becomes a [`TokenKind::Error`] placeholder.
pub fn lex(src: &str, tokens: &mut Vec<Token>, errors: &mut Vec<Spanned<Error>>) {
    Lexer::new(src, tokens, errors).lex();
}

/// A convenience function that allocates new buffers per lexed input and
/// returns them.
pub fn lex_in_new(src: &str) -> (Vec<Token>, Vec<Spanned<Error>>) {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    let mut errors = Vec::new();
    lex(src, &mut tokens, &mut errors);
    (tokens, errors)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    UnexpectedChar(char),
    UnclosedText,
    BadNumber,
    BadEscape,
    UnclosedComment,
}

/// The LOLCODE lexer
struct Lexer<'src, 'tok> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    tokens: &'tok mut Vec<Token>,
    errors: &'tok mut Vec<Spanned<Error>>,
}

impl<'src> Lexer<'src, '_> {
    /// Scans the source string until the input is exhausted.
    fn lex(mut self) {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            let next = self.scan_token_kind();
            if !next.is_trivia() {
                self.produce(next);
            }
            if next == TokenKind::Eof {
                break;
            }
        }
    }

    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        match self.mark_advance() {
            '\0' if self.cursor >= self.src.len() => Eof,
            '\n' | ',' => LineBreak,
            '\r' => match self.peek() {
                '\n' => self.advance_with(LineBreak),
                _ => Whitespace,
            },
            ' ' | '\t' => self.whitespace(),
            '!' => Bang,
            '?' => Question,
            '"' => self.text(),
            '.' if self.rest().starts_with("..") => {
                self.advance();
                self.advance();
                self.continuation()
            }
            '…' => self.continuation(),
            '-' if self.peek().is_ascii_digit() => self.number(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() => self.word(),
            c => self.error(self::Error::UnexpectedChar(c)),
        }
    }

    fn whitespace(&mut self) -> TokenKind {
        while matches!(self.peek(), ' ' | '\t') {
            self.advance();
        }
        TokenKind::Whitespace
    }

    /// A continuation marker swallows the line break that follows it (and
    /// any spacing before that break).
    fn continuation(&mut self) -> TokenKind {
        while matches!(self.peek(), ' ' | '\t') {
            self.advance();
        }
        match self.peek() {
            '\n' => self.advance_with(TokenKind::Continuation),
            '\r' if self.rest().starts_with("\r\n") => {
                self.advance();
                self.advance_with(TokenKind::Continuation)
            }
            '\0' => TokenKind::Continuation,
            _ => {
                let c = self.substr().chars().next().unwrap_or('.');
                self.error(Error::UnexpectedChar(c))
            }
        }
    }

    fn number(&mut self) -> TokenKind {
        let is_number_char = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.';
        self.eat_digits();
        let mut kind = TokenKind::Integer;
        if self.peek() == '.' && self.peek_nth(1).is_ascii_digit() {
            self.advance();
            self.eat_digits();
            kind = TokenKind::Float;
        }
        if is_number_char(self.peek()) && !self.at_separator_dots() {
            while is_number_char(self.peek()) {
                self.advance();
            }
            return self.error(Error::BadNumber);
        }
        if kind == TokenKind::Integer && self.substr().parse::<i64>().is_err() {
            return self.error(Error::BadNumber);
        }
        kind
    }

    fn eat_digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
    }

    /// Whether the input continues with a `...` continuation marker, which
    /// may directly follow a number.
    fn at_separator_dots(&self) -> bool {
        self.rest().starts_with("...")
    }

    /// Scans a word, which is either a (possibly multi-word) keyword, a
    /// comment opener or an identifier.
    fn word(&mut self) -> TokenKind {
        self.eat_word_chars();
        match self.substr() {
            "BTW" => return self.comment(),
            "OBTW" => return self.multiline_comment(),
            _ => (),
        }

        // Lookahead over the following words without consuming them. Each
        // entry holds the word and the cursor position right after it.
        let mut words = Vec::with_capacity(MAX_KEYWORD_WORDS);
        words.push((self.substr(), self.cursor));
        if self.peek() == '?' {
            words[0].1 += 1;
        }
        let mut at = self.cursor;
        while words.len() < MAX_KEYWORD_WORDS {
            let Some((word, end)) = self.lookahead_word(at) else {
                break;
            };
            words.push((word, end));
            at = end;
        }

        for n in (1..=words.len()).rev() {
            let mut phrase = words[..n]
                .iter()
                .map(|(word, _)| *word)
                .collect::<Vec<_>>()
                .join(" ");
            let mut end = words[n - 1].1;
            if n == 1 {
                if end > self.cursor {
                    phrase.push('?');
                }
                if !KEYWORDS.contains_key(&phrase) {
                    // `WTF` without its question mark.
                    phrase.truncate(words[0].0.len());
                    end = self.cursor;
                }
            }
            if let Some(&kind) = KEYWORDS.get(&phrase) {
                while self.cursor < end {
                    self.advance();
                }
                return kind;
            }
        }
        TokenKind::Identifier
    }

    /// Reads the word starting after the spacing at byte offset `at`.
    /// Keyword words may end in a question mark (`RLY?`).
    fn lookahead_word(&self, at: usize) -> Option<(&'src str, usize)> {
        let rest = &self.src[at..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        let spacing = rest.len() - trimmed.len();
        if spacing == 0 || !trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        let mut len = trimmed
            .find(|c: char| !is_word_char(c))
            .unwrap_or(trimmed.len());
        if trimmed[len..].starts_with('?') {
            len += 1;
        }
        let start = at + spacing;
        Some((&self.src[start..start + len], start + len))
    }

    fn eat_word_chars(&mut self) {
        while is_word_char(self.peek()) {
            self.advance();
        }
    }

    fn comment(&mut self) -> TokenKind {
        while !matches!(self.peek(), '\n' | '\r' | '\0') {
            self.advance();
        }
        TokenKind::Comment
    }

    fn multiline_comment(&mut self) -> TokenKind {
        loop {
            match self.advance() {
                '\0' => {
                    self.error(Error::UnclosedComment);
                    break;
                }
                c if c.is_ascii_alphabetic() => {
                    let lo = self.cursor - 1;
                    self.eat_word_chars();
                    if &self.src[lo..self.cursor] == "TLDR" {
                        break;
                    }
                }
                _ => continue,
            }
        }
        TokenKind::MultilineComment
    }

    /// Lexes a text literal, validating its escapes.
    ///
    /// Escapes are validated here and resolved by [`extract::text`] once the
    /// parser asks for the literal. Malformed escapes are reported but do not
    /// end the literal.
    fn text(&mut self) -> TokenKind {
        let mut has_escaped = false;
        loop {
            match self.peek() {
                '\0' | '\n' => return self.error(Error::UnclosedText),
                '\r' if self.rest().starts_with("\r\n") => {
                    return self.error(Error::UnclosedText);
                }
                '"' => {
                    self.advance();
                    return if has_escaped {
                        TokenKind::EscapedText
                    } else {
                        TokenKind::Text
                    };
                }
                ':' => {
                    has_escaped = true;
                    self.escape();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn escape(&mut self) {
        let lo = self.cursor;
        assert_eq!(self.advance(), ':');
        let valid = match self.peek() {
            ')' | '>' | 'o' | '"' | ':' => {
                self.advance();
                true
            }
            open @ ('(' | '[' | '{') => {
                self.advance();
                let close = match open {
                    '(' => ')',
                    '[' => ']',
                    _ => '}',
                };
                let body_lo = self.cursor;
                while !matches!(self.peek(), '"' | '\n' | '\0') && self.peek() != close {
                    self.advance();
                }
                let body = &self.src[body_lo..self.cursor];
                if self.peek() == close {
                    self.advance();
                    match open {
                        '(' => decode_hex(body).is_some(),
                        '[' => UNICODE_NAMES.contains_key(body),
                        _ => is_identifier(body),
                    }
                } else {
                    false
                }
            }
            // `:` right before the line end.
            '\n' | '\0' => false,
            _ => {
                self.advance();
                false
            }
        };
        if !valid {
            let span = Span::new_of_bounds(lo..self.cursor);
            self.errors.push(span.wrap(Error::BadEscape));
        }
    }
}

impl<'src> Lexer<'src, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'s, 't>(
        src: &'s str,
        tokens: &'t mut Vec<Token>,
        errors: &'t mut Vec<Spanned<Error>>,
    ) -> Lexer<'s, 't> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            tokens,
            errors,
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Returns the next character and advances the iterator.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|c| self.cursor += c.len_utf8())
            .unwrap_or('\0')
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the `n`-th next character (`0` being [`Lexer::peek`]).
    fn peek_nth(&self, n: usize) -> char {
        self.rest().chars().nth(n).unwrap_or('\0')
    }

    /// The not yet consumed input.
    fn rest(&self) -> &'src str {
        &self.src[self.cursor..]
    }

    /// Returns the current span.
    fn span(&self) -> Span {
        Span::new_of_bounds(self.current_lo..self.cursor)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &'src str {
        self.span().substr(self.src)
    }

    /// Records an error over the current marked bounds and returns the
    /// placeholder kind.
    fn error(&mut self, error: Error) -> TokenKind {
        self.errors.push(self.span().wrap(error));
        TokenKind::Error
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(kind, self.span()));
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_identifier(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_alphabetic()) && s.chars().all(is_word_char)
}

fn decode_hex(digits: &str) -> Option<char> {
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}

/// Literal values of tokens, read back from the source.
pub mod extract {
    use super::*;
    use crate::token::{Literal, Segment, Text};

    /// The literal value of a literal token, or `None` for any other kind.
    pub fn literal(token: Token, src: &str) -> Option<Literal> {
        match token.kind {
            TokenKind::Integer => int(token, src).map(Literal::Integer),
            TokenKind::Float => float(token, src).map(Literal::Float),
            TokenKind::Text | TokenKind::EscapedText => Some(Literal::Text(text(token, src))),
            TokenKind::Win => Some(Literal::Bool(true)),
            TokenKind::Fail => Some(Literal::Bool(false)),
            _ => None,
        }
    }

    pub fn int(token: Token, src: &str) -> Option<i64> {
        debug_assert_eq!(token.kind, TokenKind::Integer);
        token.text(src).parse().ok()
    }

    pub fn float(token: Token, src: &str) -> Option<f64> {
        debug_assert_eq!(token.kind, TokenKind::Float);
        token.text(src).parse().ok()
    }

    pub fn ident(token: Token, src: &str) -> &str {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        token.text(src)
    }

    pub fn text(token: Token, src: &str) -> Text {
        let raw = token.span().offset(1, -1).substr(src);
        match token.kind {
            TokenKind::Text => Text::raw(raw),
            TokenKind::EscapedText => perform_escape(raw),
            kind => unreachable!("not a text token: {kind:?}"),
        }
    }

    /// Resolves the escapes of a text literal body. Escapes the lexer
    /// already reported as malformed are kept verbatim.
    fn perform_escape(raw: &str) -> Text {
        let mut segments = Vec::new();
        let mut buf = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(colon) = rest.find(':') {
            buf.push_str(&rest[..colon]);
            rest = &rest[colon..];
            let (consumed, escaped) = escape_at(rest);
            match escaped {
                Escaped::Char(c) => buf.push(c),
                Escaped::Interpolation(name) => {
                    if !buf.is_empty() {
                        segments.push(Segment::Raw(std::mem::take(&mut buf).into()));
                    }
                    segments.push(Segment::Interpolation {
                        name: name.into(),
                        raw: rest[..consumed].into(),
                    });
                }
                Escaped::Verbatim => buf.push_str(&rest[..consumed]),
            }
            rest = &rest[consumed..];
        }
        buf.push_str(rest);
        if !buf.is_empty() || segments.is_empty() {
            segments.push(Segment::Raw(buf.into()));
        }
        Text {
            segments: segments.into_boxed_slice(),
        }
    }

    enum Escaped<'a> {
        Char(char),
        Interpolation(&'a str),
        Verbatim,
    }

    /// Decodes the escape at the start of `s` (which starts with `:`),
    /// returning how many bytes it spans.
    fn escape_at(s: &str) -> (usize, Escaped<'_>) {
        let mut chars = s[1..].chars();
        let Some(c) = chars.next() else {
            return (1, Escaped::Verbatim);
        };
        let simple = match c {
            ')' => Some('\n'),
            '>' => Some('\t'),
            'o' => Some('\x07'),
            '"' => Some('"'),
            ':' => Some(':'),
            _ => None,
        };
        if let Some(simple) = simple {
            return (1 + c.len_utf8(), Escaped::Char(simple));
        }
        let close = match c {
            '(' => ')',
            '[' => ']',
            '{' => '}',
            _ => return (1 + c.len_utf8(), Escaped::Verbatim),
        };
        let Some(end) = s[2..].find(close) else {
            return (2, Escaped::Verbatim);
        };
        let body = &s[2..2 + end];
        let consumed = 2 + end + 1;
        let escaped = match c {
            '(' => decode_hex(body).map(Escaped::Char),
            '[' => UNICODE_NAMES.get(body).copied().map(Escaped::Char),
            _ => is_identifier(body).then_some(Escaped::Interpolation(body)),
        };
        (consumed, escaped.unwrap_or(Escaped::Verbatim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, Segment, Text};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_demos_no_errors() {
        for input in [
            include_str!("../demos/fizzbuzz.lol"),
            include_str!("../demos/factorial.lol"),
            include_str!("../demos/guess.lol"),
        ] {
            let (tokens, errors) = lex_in_new(input);
            assert_eq!(errors, []);
            assert!(!tokens.iter().any(|t| t.kind.is_error()));
        }
    }

    #[test]
    fn tests_with_span() {
        use TokenKind::*;
        let cases = cases!(match .. {
            "HAI 1.2\nKTHXBYE" => [
                (Hai, 0..3),
                (Float, 4..7),
                (LineBreak, 7..8),
                (Kthxbye, 8..15),
                (Eof, 15..15),
            ],
            "I HAS A var ITZ 12" => [
                (IHasA, 0..7),
                (Identifier, 8..11),
                (Itz, 12..15),
                (Integer, 16..18),
                (Eof, 18..18),
            ],
            "I  HAS\tA x, I IZ f, I" => [
                (IHasA, 0..8),
                (Identifier, 9..10),
                (LineBreak, 10..11),
                (IIz, 12..16),
                (Identifier, 17..18),
                (LineBreak, 18..19),
                (Identifier, 20..21),
                (Eof, 21..21),
            ],
            "BOTH SAEM BOTH OF BOTH" => [
                (BothSaem, 0..9),
                (BothOf, 10..17),
                (Identifier, 18..22),
                (Eof, 22..22),
            ],
            "O RLY?\nWTF?\nWTF O RLY" => [
                (ORly, 0..6),
                (LineBreak, 6..7),
                (Wtf, 7..11),
                (LineBreak, 11..12),
                (Identifier, 12..15),
                (Identifier, 16..17),
                (Identifier, 18..21),
                (Eof, 21..21),
            ],
            "IM IN YR loop UPPIN YR i TIL BOTH SAEM i AN 3" => [
                (ImInYr, 0..8),
                (Identifier, 9..13),
                (Uppin, 14..19),
                (Yr, 20..22),
                (Identifier, 23..24),
                (Til, 25..28),
                (BothSaem, 29..38),
                (Identifier, 39..40),
                (An, 41..43),
                (Integer, 44..45),
                (Eof, 45..45),
            ],
            "HAS_A IT it ITZY" => [
                (Identifier, 0..5),
                (Identifier, 6..8),
                (Identifier, 9..11),
                (Identifier, 12..16),
                (Eof, 16..16),
            ],
            "1 -2 3.5 -0.25 12abc 1.2.3 99999999999999999999" => [
                (Integer, 0..1),
                (Integer, 2..4),
                (Float, 5..8),
                (Float, 9..14),
                (Error, 15..20),
                (Error, 21..26),
                (Error, 27..47),
                (Eof, 47..47),
            ],
            "VISIBLE \"hai\" \"o:)k\"!" => [
                (Visible, 0..7),
                (Text, 8..13),
                (EscapedText, 14..20),
                (Bang, 20..21),
                (Eof, 21..21),
            ],
            "VISIBLE 1 BTW not a \"text\nVISIBLE 2" => [
                (Visible, 0..7),
                (Integer, 8..9),
                (LineBreak, 25..26),
                (Visible, 26..33),
                (Integer, 34..35),
                (Eof, 35..35),
            ],
            "OBTW\n  many lines\nTLDR\nx" => [
                (LineBreak, 22..23),
                (Identifier, 23..24),
                (Eof, 24..24),
            ],
            "SUM OF 1 ...\n  AN 2\r\n" => [
                (SumOf, 0..6),
                (Integer, 7..8),
                (An, 15..17),
                (Integer, 18..19),
                (LineBreak, 19..21),
                (Eof, 21..21),
            ],
            "x R 1 …\nAN 2" => [
                (Identifier, 0..1),
                (R, 2..3),
                (Integer, 4..5),
                (An, 10..12),
                (Integer, 13..14),
                (Eof, 14..14),
            ],
            "CAN HAS STDIO?" => [
                (CanHas, 0..7),
                (Identifier, 8..13),
                (Question, 13..14),
                (Eof, 14..14),
            ],
            "x # y" => [
                (Identifier, 0..1),
                (Error, 2..3),
                (Identifier, 4..5),
                (Eof, 5..5),
            ],
        });

        for (input, tokens) in cases {
            let (lexed, _) = lex_in_new(input);
            assert_eq!(lexed, tokens.as_slice(), "input: {input:?}");
        }
    }

    #[test]
    fn unexpected_chars_become_placeholders() {
        let (tokens, errors) = lex_in_new("VISIBLE @ 1");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [
                TokenKind::Visible,
                TokenKind::Error,
                TokenKind::Integer,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            errors,
            [Span::new_of_bounds(8..9).wrap(Error::UnexpectedChar('@'))]
        );
    }

    #[test]
    fn errors_are_reported_alongside_placeholders() {
        let (tokens, errors) = lex_in_new("\"open\nOBTW never closed");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            [TokenKind::Error, TokenKind::LineBreak, TokenKind::Eof]
        );
        assert_eq!(
            errors,
            [
                Span::new_of_bounds(0..5).wrap(Error::UnclosedText),
                Span::new_of_bounds(6..23).wrap(Error::UnclosedComment),
            ]
        );

        let (tokens, errors) = lex_in_new(r#""a:qb:[NOT A NAME]:(zz):{1x}""#);
        assert_eq!(tokens[0].kind, TokenKind::EscapedText);
        assert_eq!(
            errors,
            [
                Span::new_of_bounds(2..4).wrap(Error::BadEscape),
                Span::new_of_bounds(5..18).wrap(Error::BadEscape),
                Span::new_of_bounds(18..23).wrap(Error::BadEscape),
                Span::new_of_bounds(23..28).wrap(Error::BadEscape),
            ]
        );
    }

    #[test]
    fn text_escapes_resolve_on_extraction() {
        let text_of = |src: &str| {
            let (tokens, errors) = lex_in_new(src);
            assert_eq!(errors, []);
            extract::text(tokens[0], src)
        };
        assert_eq!(text_of(r#""plain""#), Text::raw("plain"));
        assert_eq!(text_of(r#""""#), Text::raw(""));
        assert_eq!(
            text_of(r#""a:)b:>c:od:"e::f""#),
            Text::raw("a\nb\tc\x07d\"e:f")
        );
        assert_eq!(
            text_of(r#"":(48):(1F63A):[SNOWMAN]""#),
            Text::raw("H\u{1f63a}\u{2603}")
        );
        assert_eq!(
            text_of(r#""hai :{name}!:{x}""#),
            Text {
                segments: Box::from([
                    Segment::Raw("hai ".into()),
                    Segment::Interpolation {
                        name: "name".into(),
                        raw: ":{name}".into(),
                    },
                    Segment::Raw("!".into()),
                    Segment::Interpolation {
                        name: "x".into(),
                        raw: ":{x}".into(),
                    },
                ]),
            }
        );
    }

    #[test]
    fn literal_values() {
        let src = "7 -1.5 WIN FAIL x";
        let (tokens, _) = lex_in_new(src);
        let literals: Vec<_> = tokens.iter().map(|t| extract::literal(*t, src)).collect();
        assert_eq!(
            literals,
            [
                Some(Literal::Integer(7)),
                Some(Literal::Float(-1.5)),
                Some(Literal::Bool(true)),
                Some(Literal::Bool(false)),
                None,
                None,
            ]
        );
    }

    macro_rules! cases {
        (match .. {
            $($str:expr => [$(($kind:expr, $range:expr)),* $(,)?]),* $(,)?
        }) => {{
            &[$((
                $str,
                vec![
                    $(Token::new($kind, Span::new_of_bounds($range.start..$range.end))),*
                ],
            )),*]
        }};
    }
    use cases;
}
