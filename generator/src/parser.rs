// Parser for .def builtin definition files.
//
// A line-oriented state machine with two states: idle, where directive
// lines (`def`, `func`, `native`) are parsed, and in-body, where every line
// is captured verbatim into the current function's body template until a
// line beginning with the `end` sentinel. Single pass, no lookahead beyond
// the current line.
//
// Preconditions: input is the full source text of one definition file.
// Postconditions: returns every function in declaration order plus the
//                 definition table.
// Failure modes: any malformed line is fatal — parsing aborts on the first
//                error and nothing downstream runs.
// Side effects: none.

use std::fmt;

use crate::ast::{Arg, Function};
use crate::defs::DefTable;
use crate::lexer;

// ── Public types ────────────────────────────────────────────────────────────

/// A parsed definition file.
#[derive(Debug)]
pub struct Program {
    /// Functions in declaration order.
    pub functions: Vec<Function>,
    pub defs: DefTable,
}

/// A fatal parse error with its source line number (1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A character no directive token can start with.
    UnexpectedCharacter { found: String },
    /// First field of an idle-state line is not `def`, `func` or `native`.
    UnknownDirective { keyword: String },
    /// A recognized directive with the wrong shape.
    Malformed { message: String },
    /// `$name` used before `name` was defined.
    UndefinedReference { name: String },
    /// A function header whose type tokens expanded to nothing.
    EmptyTypeList { function: String },
    /// End of input inside a function body.
    UnterminatedFunction { function: String },
}

impl ParseError {
    fn new(line: usize, kind: ParseErrorKind) -> Self {
        ParseError { line, kind }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            ParseErrorKind::UnexpectedCharacter { found } => {
                write!(f, "unexpected character: {:?}", found)
            }
            ParseErrorKind::UnknownDirective { keyword } => {
                write!(f, "unknown directive '{}'", keyword)
            }
            ParseErrorKind::Malformed { message } => write!(f, "{}", message),
            ParseErrorKind::UndefinedReference { name } => {
                write!(f, "reference to undefined name '${}'", name)
            }
            ParseErrorKind::EmptyTypeList { function } => {
                write!(f, "function '{}' has no instantiation types", function)
            }
            ParseErrorKind::UnterminatedFunction { function } => {
                write!(f, "missing 'end' for function '{}'", function)
            }
        }
    }
}

impl std::error::Error for ParseError {}

// ── Public entry point ──────────────────────────────────────────────────────

/// Parse a definition file.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new();
    for (index, line) in source.lines().enumerate() {
        parser.line(index + 1, line)?;
    }
    parser.finish()
}

// ── State machine ───────────────────────────────────────────────────────────

struct Parser {
    defs: DefTable,
    functions: Vec<Function>,
    /// Function currently accumulating body lines, with its header line.
    current: Option<(Function, usize)>,
}

impl Parser {
    fn new() -> Self {
        Parser {
            defs: DefTable::new(),
            functions: Vec::new(),
            current: None,
        }
    }

    fn line(&mut self, line_no: usize, raw: &str) -> Result<(), ParseError> {
        if self.current.is_some() {
            // The sentinel is checked on the raw line: an indented `end`
            // stays part of the body.
            if raw.starts_with("end") {
                if let Some((function, _)) = self.current.take() {
                    self.functions.push(function);
                }
            } else if let Some((function, _)) = self.current.as_mut() {
                function.body.push_str(raw);
                function.body.push('\n');
            }
            return Ok(());
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let fields = split_fields(line_no, raw)?;
        let Some(first) = fields.first() else {
            // Whitespace followed only by a comment.
            return Ok(());
        };

        match first.as_str() {
            "def" => self.parse_def(line_no, &fields),
            "func" | "native" => {
                let function = self.parse_header(line_no, &fields)?;
                self.current = Some((function, line_no));
                Ok(())
            }
            "end" => Err(ParseError::new(
                line_no,
                ParseErrorKind::Malformed {
                    message: "'end' outside a function body".to_string(),
                },
            )),
            other => Err(ParseError::new(
                line_no,
                ParseErrorKind::UnknownDirective {
                    keyword: other.to_string(),
                },
            )),
        }
    }

    /// `def <name> : <token>...`
    fn parse_def(&mut self, line_no: usize, fields: &[String]) -> Result<(), ParseError> {
        if fields.len() < 3 {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::Malformed {
                    message: "expected 'def <name> : <tokens>'".to_string(),
                },
            ));
        }
        let name = &fields[1];
        if !is_ident(name) {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::Malformed {
                    message: format!("'{}' is not a valid definition name", name),
                },
            ));
        }
        if fields[2] != ":" {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::Malformed {
                    message: "expected ':' after the definition name".to_string(),
                },
            ));
        }

        let mut values = Vec::new();
        for token in &fields[3..] {
            values.extend(self.expand(line_no, token)?);
        }
        self.defs.define(name.clone(), values);
        Ok(())
    }

    /// `func|native <return-type> <name> <type-tokens...> : <arg-tokens...>`
    fn parse_header(&mut self, line_no: usize, fields: &[String]) -> Result<Function, ParseError> {
        let native = fields[0] == "native";
        if fields.len() < 4 {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::Malformed {
                    message: format!(
                        "expected '{} <return-type> <name> <types> : <args>'",
                        fields[0]
                    ),
                },
            ));
        }
        let return_type = fields[1].clone();
        let name = fields[2].clone();
        if !is_ident(&name) {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::Malformed {
                    message: format!("'{}' is not a valid function name", name),
                },
            ));
        }

        let mut types = Vec::new();
        let mut args = Vec::new();
        let mut in_types = true;
        for token in &fields[3..] {
            if token == ":" {
                if !in_types {
                    return Err(ParseError::new(
                        line_no,
                        ParseErrorKind::Malformed {
                            message: "unexpected second ':' in function header".to_string(),
                        },
                    ));
                }
                in_types = false;
            } else if in_types {
                types.extend(self.expand(line_no, token)?);
            } else {
                args.push(parse_arg(line_no, token)?);
            }
        }
        if in_types {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::Malformed {
                    message: "expected ':' between instantiation types and arguments".to_string(),
                },
            ));
        }
        if types.is_empty() {
            return Err(ParseError::new(
                line_no,
                ParseErrorKind::EmptyTypeList { function: name },
            ));
        }

        Ok(Function {
            name,
            native,
            return_type,
            args,
            types,
            body: String::new(),
        })
    }

    fn expand(&self, line_no: usize, token: &str) -> Result<Vec<String>, ParseError> {
        self.defs.expand(token).map_err(|e| {
            ParseError::new(line_no, ParseErrorKind::UndefinedReference { name: e.name })
        })
    }

    fn finish(self) -> Result<Program, ParseError> {
        if let Some((function, line)) = self.current {
            return Err(ParseError::new(
                line,
                ParseErrorKind::UnterminatedFunction {
                    function: function.name,
                },
            ));
        }
        Ok(Program {
            functions: self.functions,
            defs: self.defs,
        })
    }
}

// ── Field splitting ─────────────────────────────────────────────────────────

/// Lex one directive line and regroup adjacent tokens into the
/// whitespace-delimited fields the grammar is written in terms of:
/// `a:*$type` lexes as five tokens but is one field.
fn split_fields(line_no: usize, line: &str) -> Result<Vec<String>, ParseError> {
    let result = lexer::lex(line);
    if let Some(err) = result.errors.first() {
        return Err(ParseError::new(
            line_no,
            ParseErrorKind::UnexpectedCharacter {
                found: line[err.span.start..err.span.end].to_string(),
            },
        ));
    }

    let mut spans: Vec<lexer::Span> = Vec::new();
    for (_, span) in &result.tokens {
        match spans.last_mut() {
            Some(prev) if prev.end == span.start => prev.end = span.end,
            _ => spans.push(*span),
        }
    }
    Ok(spans
        .iter()
        .map(|s| line[s.start..s.end].to_string())
        .collect())
}

/// `name:type` with an optional `*` marker and placeholders in the type.
fn parse_arg(line_no: usize, token: &str) -> Result<Arg, ParseError> {
    let malformed = || {
        ParseError::new(
            line_no,
            ParseErrorKind::Malformed {
                message: format!("malformed argument '{}', expected 'name:type'", token),
            },
        )
    };
    let (name, ty) = token.split_once(':').ok_or_else(malformed)?;
    if !is_ident(name) || ty.is_empty() || ty.contains(':') {
        return Err(malformed());
    }
    Ok(Arg {
        name: name.to_string(),
        ty: ty.to_string(),
    })
}

fn is_ident(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Tests ──
