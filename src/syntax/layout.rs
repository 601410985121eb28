//! Lexical helpers shared by the parser and the printer.
//!
//! Text kept as written (types, signatures, `select` bodies) and multi-line
//! expressions store their indentation relative to the line they start on.
//! Moving such text between indentation levels, or checking it for
//! unbalanced delimiters, has to skip string literals and comments, which is
//! what [`Lexer`] tracks.

use crate::ast::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lex {
    Code,
    Interpreted,
    Char,
    Raw,
    LineComment,
    BlockComment,
}

/// Yields `(byte offset, char, state the char belongs to)`.
///
/// Escaped characters and the second character of `/*` and `*/` are
/// consumed without being yielded.
struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    state: Lex,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            state: Lex::Code,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, char, Lex);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let c = self.text[start..].chars().next()?;
        self.pos += c.len_utf8();
        let rest = &self.text[self.pos..];
        let here = self.state;

        match here {
            Lex::Code => match c {
                '"' => self.state = Lex::Interpreted,
                '\'' => self.state = Lex::Char,
                '`' => self.state = Lex::Raw,
                '/' if rest.starts_with('/') => self.state = Lex::LineComment,
                '/' if rest.starts_with('*') => {
                    self.pos += 1;
                    self.state = Lex::BlockComment;
                }
                _ => {}
            },
            Lex::Interpreted | Lex::Char => match c {
                '\\' => {
                    if let Some(escaped) = rest.chars().next().filter(|e| *e != '\n') {
                        self.pos += escaped.len_utf8();
                    }
                }
                '"' if here == Lex::Interpreted => self.state = Lex::Code,
                '\'' if here == Lex::Char => self.state = Lex::Code,
                '\n' => self.state = Lex::Code,
                _ => {}
            },
            Lex::Raw => {
                if c == '`' {
                    self.state = Lex::Code;
                }
            }
            Lex::LineComment => {
                if c == '\n' {
                    self.state = Lex::Code;
                }
            }
            Lex::BlockComment => {
                if c == '*' && rest.starts_with('/') {
                    self.pos += 1;
                    self.state = Lex::Code;
                }
            }
        }

        Some((start, c, here))
    }
}

// ============================================================================
// INDENTATION
// ============================================================================

/// Rewrites the indentation of every line after the first: a leading `from`
/// is removed and `to` is put in its place.
///
/// Lines inside raw string literals are left alone and blank lines get no
/// indentation.
///
/// ```rust
/// use gomacro::syntax::layout::reindent;
/// assert_eq!(reindent("struct {\n\t\tX int\n\t}", "\t", ""), "struct {\n\tX int\n}");
/// assert_eq!(reindent("s := `a\nb`", "", "\t"), "s := `a\nb`");
/// ```
pub fn reindent(text: &str, from: &str, to: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + to.len() * 8);
    let mut copied = 0;
    for (at, c, state) in Lexer::new(text) {
        if c != '\n' || state == Lex::Raw || at < copied {
            continue;
        }
        out.push_str(&text[copied..=at]);
        let line = &text[at + 1..];
        let stripped = common_prefix_len(line, from);
        let rest = &line[stripped..];
        if !(rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n")) {
            out.push_str(to);
        }
        copied = at + 1 + stripped;
    }
    out.push_str(&text[copied..]);
    out
}

/// The leading blanks of `line`.
pub fn indentation(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

fn common_prefix_len(line: &str, prefix: &str) -> usize {
    line.bytes()
        .zip(prefix.bytes())
        .take_while(|(a, b)| a == b)
        .count()
}

// ============================================================================
// DELIMITERS
// ============================================================================

/// A delimiter that is opened and never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unclosed {
    Paren,
    Bracket,
    Brace,
    String,
}

impl Unclosed {
    pub fn message(&self) -> &'static str {
        match self {
            Unclosed::Paren => "Missing closing parenthesis",
            Unclosed::Bracket => "Missing closing bracket",
            Unclosed::Brace => "Missing closing brace",
            Unclosed::String => "Unterminated string literal",
        }
    }
}

/// Finds the innermost delimiter left open, pointing at its opening
/// character. A closer that does not match the innermost opener reports that
/// opener. Stray closers are not reported.
///
/// ```rust
/// use gomacro::syntax::layout::{find_unclosed, Unclosed};
/// let (kind, span) = find_unclosed("f(a, \"b)\"\n}").unwrap();
/// assert_eq!(kind, Unclosed::Paren);
/// assert_eq!(span.start, 1);
/// assert!(find_unclosed("x[1:2] // (").is_none());
/// ```
pub fn find_unclosed(text: &str) -> Option<(Unclosed, Span)> {
    let mut open: Vec<(Unclosed, usize)> = Vec::new();
    let mut string_start = 0;
    let mut lexer = Lexer::new(text);

    for (at, c, state) in lexer.by_ref() {
        match state {
            Lex::Code => match c {
                '(' => open.push((Unclosed::Paren, at)),
                '[' => open.push((Unclosed::Bracket, at)),
                '{' => open.push((Unclosed::Brace, at)),
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => Unclosed::Paren,
                        ']' => Unclosed::Bracket,
                        _ => Unclosed::Brace,
                    };
                    match open.last() {
                        Some((kind, _)) if *kind == expected => {
                            open.pop();
                        }
                        Some((kind, start)) => return Some((*kind, point(*start))),
                        None => {}
                    }
                }
                '"' | '\'' | '`' => string_start = at,
                _ => {}
            },
            Lex::Interpreted | Lex::Char if c == '\n' => {
                return Some((Unclosed::String, point(string_start)));
            }
            _ => {}
        }
    }

    if matches!(lexer.state, Lex::Interpreted | Lex::Char | Lex::Raw) {
        return Some((Unclosed::String, point(string_start)));
    }
    open.last().map(|(kind, start)| (*kind, point(*start)))
}

fn point(start: usize) -> Span {
    Span {
        start,
        end: start + 1,
    }
}
