use std::{fmt, ops::Range};

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            len: span.len,
            lo: span.lo,
        }
    }

    /// A zero-length end-of-file token placed at the end of `src`.
    pub fn eof_for(src: &str) -> Token {
        Token::new(TokenKind::Eof, Span::new_of_length(src.len(), 0))
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }

    /// The source text this token covers.
    pub fn text<'src>(&self, src: &'src str) -> &'src str {
        self.span().substr(src)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span())
    }
}

#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        let len = u32::try_from(hi - lo).unwrap_or(u32::MAX);
        Self::new_of_length(lo, len)
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    pub fn hi(self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span covering both `self` and `other`, and everything in
    /// between.
    pub fn to(self, other: Span) -> Span {
        let lo = self.lo.min(other.lo);
        let hi = self.hi().max(other.hi());
        Span::new_of_bounds(lo..hi)
    }

    /// A zero-length span placed right after `self`.
    pub fn after(self) -> Span {
        Span::new_of_length(self.hi(), 0)
    }

    /// Shrinks (or grows) the span by moving each bound.
    pub fn offset(self, lo: isize, hi: isize) -> Span {
        let new_lo = self.lo.saturating_add_signed(lo);
        let new_hi = self.hi().saturating_add_signed(hi).max(new_lo);
        Span::new_of_bounds(new_lo..new_hi)
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.hi()]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

/// The value a literal token denotes.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(Text),
    Bool(bool),
}

/// A text literal with its escapes resolved. Interpolation markers are kept
/// as separate segments, since only the binder can tell what they refer to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    pub segments: Box<[Segment]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Raw(Box<str>),
    /// `:{name}`. `raw` is the marker as written.
    Interpolation { name: Box<str>, raw: Box<str> },
}

impl Text {
    pub fn raw(text: &str) -> Text {
        Text {
            segments: Box::from([Segment::Raw(text.into())]),
        }
    }

    /// The text, if it carries no interpolation.
    pub fn as_plain(&self) -> Option<&str> {
        match &*self.segments {
            [Segment::Raw(raw)] => Some(raw),
            _ => None,
        }
    }
}

/// Token kinds. Multi-word keywords (`I HAS A`, `IM OUTTA YR`, ...) lex to a
/// single token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Hai,
    Kthxbye,
    CanHas,

    IHasA,
    Itz,
    R,
    IsNowA,

    SumOf,
    DiffOf,
    ProduktOf,
    QuoshuntOf,
    ModOf,
    BiggrOf,
    SmallrOf,
    BothOf,
    EitherOf,
    WonOf,
    Not,
    AllOf,
    AnyOf,
    BothSaem,
    Diffrint,
    Smoosh,
    Maek,
    A,
    An,
    Mkay,

    Visible,
    Gimmeh,

    /// `O RLY?`
    ORly,
    YaRly,
    Mebbe,
    NoWai,
    Oic,
    /// `WTF?`
    Wtf,
    Omg,
    Omgwtf,
    Gtfo,

    ImInYr,
    ImOuttaYr,
    Uppin,
    Nerfin,
    Yr,
    Til,
    Wile,

    HowIzI,
    IfUSaySo,
    FoundYr,
    IIz,

    Noob,
    Troof,
    Numbr,
    Numbar,
    Yarn,

    Win,
    Fail,

    Identifier,
    Integer,
    Float,
    /// A text literal without escapes.
    Text,
    /// A text literal with at least one `:` escape (interpolations included).
    EscapedText,

    /// A newline or a comma.
    LineBreak,
    /// `!`
    Bang,
    /// `?`
    Question,

    Whitespace,
    /// `BTW ...`
    Comment,
    /// `OBTW ... TLDR`
    MultilineComment,
    /// `...` or `…` before a newline.
    Continuation,

    Eof,
    /// Placeholder for a malformed lexeme. The lexer reports the reason
    /// separately.
    Error,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Comment
                | TokenKind::MultilineComment
                | TokenKind::Continuation
        )
    }

    pub fn is_error(self) -> bool {
        self == TokenKind::Error
    }

    /// Source form of keyword tokens; other kinds describe themselves.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Hai => "HAI",
            Kthxbye => "KTHXBYE",
            CanHas => "CAN HAS",
            IHasA => "I HAS A",
            Itz => "ITZ",
            R => "R",
            IsNowA => "IS NOW A",
            SumOf => "SUM OF",
            DiffOf => "DIFF OF",
            ProduktOf => "PRODUKT OF",
            QuoshuntOf => "QUOSHUNT OF",
            ModOf => "MOD OF",
            BiggrOf => "BIGGR OF",
            SmallrOf => "SMALLR OF",
            BothOf => "BOTH OF",
            EitherOf => "EITHER OF",
            WonOf => "WON OF",
            Not => "NOT",
            AllOf => "ALL OF",
            AnyOf => "ANY OF",
            BothSaem => "BOTH SAEM",
            Diffrint => "DIFFRINT",
            Smoosh => "SMOOSH",
            Maek => "MAEK",
            A => "A",
            An => "AN",
            Mkay => "MKAY",
            Visible => "VISIBLE",
            Gimmeh => "GIMMEH",
            ORly => "O RLY?",
            YaRly => "YA RLY",
            Mebbe => "MEBBE",
            NoWai => "NO WAI",
            Oic => "OIC",
            Wtf => "WTF?",
            Omg => "OMG",
            Omgwtf => "OMGWTF",
            Gtfo => "GTFO",
            ImInYr => "IM IN YR",
            ImOuttaYr => "IM OUTTA YR",
            Uppin => "UPPIN",
            Nerfin => "NERFIN",
            Yr => "YR",
            Til => "TIL",
            Wile => "WILE",
            HowIzI => "HOW IZ I",
            IfUSaySo => "IF U SAY SO",
            FoundYr => "FOUND YR",
            IIz => "I IZ",
            Noob => "NOOB",
            Troof => "TROOF",
            Numbr => "NUMBR",
            Numbar => "NUMBAR",
            Yarn => "YARN",
            Win => "WIN",
            Fail => "FAIL",
            Identifier => "identifier",
            Integer => "integer literal",
            Float => "float literal",
            Text | EscapedText => "text literal",
            LineBreak => "line break",
            Bang => "!",
            Question => "?",
            Whitespace => "whitespace",
            Comment | MultilineComment => "comment",
            Continuation => "line continuation",
            Eof => "end of file",
            Error => "invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Keyword phrases. A multi-word keyword is keyed with single spaces between
/// its words; in source, the words may be separated by any run of spaces or
/// tabs.
pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "HAI" => TokenKind::Hai,
    "KTHXBYE" => TokenKind::Kthxbye,
    "CAN HAS" => TokenKind::CanHas,
    "I HAS A" => TokenKind::IHasA,
    "I IZ" => TokenKind::IIz,
    "ITZ" => TokenKind::Itz,
    "R" => TokenKind::R,
    "IS NOW A" => TokenKind::IsNowA,
    "SUM OF" => TokenKind::SumOf,
    "DIFF OF" => TokenKind::DiffOf,
    "PRODUKT OF" => TokenKind::ProduktOf,
    "QUOSHUNT OF" => TokenKind::QuoshuntOf,
    "MOD OF" => TokenKind::ModOf,
    "BIGGR OF" => TokenKind::BiggrOf,
    "SMALLR OF" => TokenKind::SmallrOf,
    "BOTH SAEM" => TokenKind::BothSaem,
    "BOTH OF" => TokenKind::BothOf,
    "EITHER OF" => TokenKind::EitherOf,
    "WON OF" => TokenKind::WonOf,
    "NOT" => TokenKind::Not,
    "ALL OF" => TokenKind::AllOf,
    "ANY OF" => TokenKind::AnyOf,
    "DIFFRINT" => TokenKind::Diffrint,
    "SMOOSH" => TokenKind::Smoosh,
    "MAEK" => TokenKind::Maek,
    "A" => TokenKind::A,
    "AN" => TokenKind::An,
    "MKAY" => TokenKind::Mkay,
    "VISIBLE" => TokenKind::Visible,
    "GIMMEH" => TokenKind::Gimmeh,
    "O RLY?" => TokenKind::ORly,
    "YA RLY" => TokenKind::YaRly,
    "MEBBE" => TokenKind::Mebbe,
    "NO WAI" => TokenKind::NoWai,
    "OIC" => TokenKind::Oic,
    "WTF?" => TokenKind::Wtf,
    "OMG" => TokenKind::Omg,
    "OMGWTF" => TokenKind::Omgwtf,
    "GTFO" => TokenKind::Gtfo,
    "IM OUTTA YR" => TokenKind::ImOuttaYr,
    "IM IN YR" => TokenKind::ImInYr,
    "UPPIN" => TokenKind::Uppin,
    "NERFIN" => TokenKind::Nerfin,
    "YR" => TokenKind::Yr,
    "TIL" => TokenKind::Til,
    "WILE" => TokenKind::Wile,
    "HOW IZ I" => TokenKind::HowIzI,
    "IF U SAY SO" => TokenKind::IfUSaySo,
    "FOUND YR" => TokenKind::FoundYr,
    "NOOB" => TokenKind::Noob,
    "TROOF" => TokenKind::Troof,
    "NUMBR" => TokenKind::Numbr,
    "NUMBAR" => TokenKind::Numbar,
    "YARN" => TokenKind::Yarn,
    "WIN" => TokenKind::Win,
    "FAIL" => TokenKind::Fail,
};

/// Number of words in the longest keyword phrase.
pub const MAX_KEYWORD_WORDS: usize = 4;

/// Names accepted by the `:[NAME]` escape.
pub static UNICODE_NAMES: phf::Map<&'static str, char> = phf::phf_map! {
    "SPACE" => ' ',
    "EXCLAMATION MARK" => '!',
    "QUOTATION MARK" => '"',
    "NUMBER SIGN" => '#',
    "DOLLAR SIGN" => '$',
    "PERCENT SIGN" => '%',
    "AMPERSAND" => '&',
    "APOSTROPHE" => '\'',
    "ASTERISK" => '*',
    "COLON" => ':',
    "SEMICOLON" => ';',
    "COMMERCIAL AT" => '@',
    "LEFT SQUARE BRACKET" => '[',
    "RIGHT SQUARE BRACKET" => ']',
    "LEFT CURLY BRACKET" => '{',
    "RIGHT CURLY BRACKET" => '}',
    "TILDE" => '~',
    "NO-BREAK SPACE" => '\u{a0}',
    "CENT SIGN" => '\u{a2}',
    "POUND SIGN" => '\u{a3}',
    "YEN SIGN" => '\u{a5}',
    "SECTION SIGN" => '\u{a7}',
    "COPYRIGHT SIGN" => '\u{a9}',
    "REGISTERED SIGN" => '\u{ae}',
    "DEGREE SIGN" => '\u{b0}',
    "PILCROW SIGN" => '\u{b6}',
    "MIDDLE DOT" => '\u{b7}',
    "MULTIPLICATION SIGN" => '\u{d7}',
    "DIVISION SIGN" => '\u{f7}',
    "GREEK SMALL LETTER ALPHA" => '\u{3b1}',
    "GREEK SMALL LETTER BETA" => '\u{3b2}',
    "GREEK SMALL LETTER LAMDA" => '\u{3bb}',
    "GREEK SMALL LETTER PI" => '\u{3c0}',
    "EM DASH" => '\u{2014}',
    "HORIZONTAL ELLIPSIS" => '\u{2026}',
    "EURO SIGN" => '\u{20ac}',
    "TRADE MARK SIGN" => '\u{2122}',
    "LEFTWARDS ARROW" => '\u{2190}',
    "RIGHTWARDS ARROW" => '\u{2192}',
    "INFINITY" => '\u{221e}',
    "BLACK HEART SUIT" => '\u{2665}',
    "SNOWMAN" => '\u{2603}',
    "WHITE SMILING FACE" => '\u{263a}',
    "SMILING CAT FACE WITH OPEN MOUTH" => '\u{1f63a}',
    "CAT FACE" => '\u{1f431}',
    "CAT" => '\u{1f408}',
    "PILE OF POO" => '\u{1f4a9}',
};
