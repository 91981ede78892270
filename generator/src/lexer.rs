// Lexer for .def directive lines.
//
// Tokenizes a single directive line (never a function body line — those are
// captured verbatim by the parser). Uses the `logos` crate for DFA-based
// lexing.
//
// Preconditions: input is one line of valid UTF-8 without a newline.
// Postconditions: returns all tokens with byte-offset spans, plus any lex
//                 errors for unrecognized characters.
// Side effects: none.

use logos::Logos;
use std::fmt;

/// Byte-offset span within one directive line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A lexer error with location.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Span,
    pub message: String,
}

/// Result of lexing one line: tokens plus any errors.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<(Token, Span)>,
    pub errors: Vec<LexError>,
}

/// Directive-line token types.
///
/// Tokens carry no text — the parser slices the line through the span,
/// which also lets it regroup adjacent tokens into whitespace-delimited
/// fields (`a:*$type` is four tokens but one field).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t]+|#[^\n]*")]
pub enum Token {
    // ── Keywords ──
    #[token("def")]
    Def,
    #[token("func")]
    Func,
    #[token("native")]
    Native,
    #[token("end")]
    End,

    // ── Symbols ──
    #[token(":")]
    Colon,
    /// Pointer marker on a type template.
    #[token("*")]
    Star,
    /// Variable-reference / placeholder marker.
    #[token("$")]
    Dollar,

    // ── Identifier ──
    //
    // Placed after keywords — logos prioritizes fixed `#[token]` matches
    // over regex for the same length, so `def` matches Def, not Ident.
    /// Identifier or type-name fragment: `[a-zA-Z_][a-zA-Z0-9_]*`
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Def => write!(f, "def"),
            Token::Func => write!(f, "func"),
            Token::Native => write!(f, "native"),
            Token::End => write!(f, "end"),
            Token::Colon => write!(f, ":"),
            Token::Star => write!(f, "*"),
            Token::Dollar => write!(f, "$"),
            Token::Ident => write!(f, "<ident>"),
        }
    }
}

// ── Public API ──

/// Lex one directive line into tokens.
///
/// Returns all successfully matched tokens together with any errors for
/// unrecognized characters. The caller decides whether errors are fatal
/// (the parser treats the first one as a malformed directive).
pub fn lex(line: &str) -> LexResult {
    let lexer = Token::lexer(line);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, range) in lexer.spanned() {
        let span = Span {
            start: range.start,
            end: range.end,
        };
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => errors.push(LexError {
                span,
                message: format!("unexpected character: {:?}", &line[span.start..span.end]),
            }),
        }
    }

    LexResult { tokens, errors }
}

// ── Tests ──
