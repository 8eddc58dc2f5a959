//! A small parser and printer for keyword statements of the form
//! `(keyword arg arg (nested ...))`.
//!
//! Every parenthesized list is a [`Statement`]: its first token is the
//! keyword (folded to lowercase) and the rest are [`Arg`]s, either scalar
//! [`Atom`]s or nested statements. Numbers keep their source text so that
//! reprinting a parsed tree does not reformat them.
//!
//! ```
//! use trace_sexpr::{parse, Statement};
//!
//! let mut net = parse(r#"(net (code 1) (name "GND"))"#).unwrap();
//! net.set_argument(Statement::kv("name", trace_sexpr::Atom::string("VCC")));
//! assert_eq!(net.to_string(), "(net (code 1) (name \"VCC\"))");
//! ```

pub mod printer;

use std::fmt;

use thiserror::Error;

/// Byte span in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span for nodes built in code rather than parsed
    pub fn synthetic() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn is_synthetic(&self) -> bool {
        self.start == 0 && self.end == 0
    }
}

/// A scalar argument
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// Bare token
    Symbol(String),
    /// Quoted text
    String(String),
    /// Bare token that parses as a finite number. `raw` is the source text.
    Number { value: f64, raw: String },
}

impl Atom {
    pub fn symbol(s: impl Into<String>) -> Self {
        Atom::Symbol(s.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Atom::String(s.into())
    }

    /// Atom for a piece of text as the parser would read it back: numeric
    /// text becomes a number, text that must be quoted becomes a string.
    pub fn from_text(s: impl Into<String>) -> Self {
        let s = s.into();
        if printer::needs_quotes(&s) {
            Atom::String(s)
        } else {
            classify(&s)
        }
    }

    pub fn number(value: f64) -> Self {
        Atom::Number {
            value,
            raw: printer::trim_float(value.to_string()),
        }
    }

    /// Text of a symbol or string atom, or the raw text of a number.
    pub fn text(&self) -> &str {
        match self {
            Atom::Symbol(s) | Atom::String(s) => s,
            Atom::Number { raw, .. } => raw,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Atom::Number { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// A statement argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Atom(Atom),
    Statement(Statement),
}

impl Arg {
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Arg::Atom(a) => Some(a),
            Arg::Statement(_) => None,
        }
    }

    pub fn as_statement(&self) -> Option<&Statement> {
        match self {
            Arg::Statement(s) => Some(s),
            Arg::Atom(_) => None,
        }
    }
}

/// A keyword followed by an ordered list of arguments
#[derive(Debug, Clone)]
pub struct Statement {
    pub keyword: String,
    pub args: Vec<Arg>,
    pub span: Span,
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        // Compare only the tree, not where it came from
        self.keyword == other.keyword && self.args == other.args
    }
}

impl Statement {
    /// Create an empty statement. The keyword is folded to lowercase.
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            args: Vec::new(),
            span: Span::synthetic(),
        }
    }

    /// Create `(keyword value)`
    pub fn kv<V: Into<Arg>>(keyword: &str, value: V) -> Self {
        Self::new(keyword).with(value)
    }

    /// Append an argument and return the statement, for building trees inline.
    pub fn with<V: Into<Arg>>(mut self, arg: V) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append every item of `iter` as an argument.
    pub fn with_all<I, V>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Arg>,
    {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Append an argument. Repeated keywords accumulate.
    pub fn add_argument<V: Into<Arg>>(&mut self, arg: V) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Replace the first child statement with the same keyword, or append
    /// `stmt` if there is none.
    pub fn set_argument(&mut self, stmt: Statement) -> &mut Self {
        let existing = self.args.iter_mut().find(|arg| {
            matches!(arg, Arg::Statement(child) if child.keyword == stmt.keyword)
        });
        match existing {
            Some(slot) => *slot = Arg::Statement(stmt),
            None => self.args.push(Arg::Statement(stmt)),
        }
        self
    }

    /// Find the first direct child statement with the given keyword.
    pub fn find(&self, keyword: &str) -> Option<&Statement> {
        self.statements().find(|s| s.keyword == keyword)
    }

    /// Find all direct child statements with the given keyword.
    pub fn find_all<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Statement> + 'a {
        self.statements().filter(move |s| s.keyword == keyword)
    }

    /// Direct child statements in order
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.args.iter().filter_map(Arg::as_statement)
    }

    /// Direct scalar arguments in order
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.args.iter().filter_map(Arg::as_atom)
    }

    /// Text of the first scalar argument, e.g. `"U1"` for `(ref "U1")`.
    pub fn first_text(&self) -> Option<&str> {
        self.atoms().next().map(Atom::text)
    }
}

impl From<Atom> for Arg {
    fn from(a: Atom) -> Self {
        Arg::Atom(a)
    }
}

impl From<Statement> for Arg {
    fn from(s: Statement) -> Self {
        Arg::Statement(s)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Atom(Atom::from_text(s))
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::Atom(Atom::from_text(s))
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Atom(Atom::Number {
            value: n as f64,
            raw: n.to_string(),
        })
    }
}

impl From<u32> for Arg {
    fn from(n: u32) -> Self {
        Arg::from(n as i64)
    }
}

impl From<usize> for Arg {
    fn from(n: usize) -> Self {
        Arg::from(n as i64)
    }
}

impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Arg::Atom(Atom::number(n))
    }
}

/// Errors that can occur during parsing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Expected '{expected}', found '{found}' at byte {offset}")]
    UnexpectedChar {
        found: char,
        expected: char,
        offset: usize,
    },
    #[error("Unclosed statement starting at byte {0}")]
    UnclosedList(usize),
    #[error("Unterminated string starting at byte {0}")]
    UnterminatedString(usize),
    #[error("Statement at byte {0} does not start with a keyword")]
    MissingKeyword(usize),
    #[error("Unexpected input after statement at byte {0}")]
    TrailingInput(usize),
}

/// Parser for keyword statements
pub struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            input,
            chars: input.char_indices().peekable(),
            current_pos: 0,
        }
    }

    /// Parse exactly one statement; only whitespace may follow it.
    pub fn parse(&mut self) -> Result<Statement, ParseError> {
        let stmt = self.parse_next()?;
        self.skip_whitespace();
        if !self.is_at_end() {
            return Err(ParseError::TrailingInput(self.current_pos));
        }
        Ok(stmt)
    }

    /// Parse every top-level statement in the input.
    pub fn parse_all(&mut self) -> Result<Vec<Statement>, ParseError> {
        let mut results = Vec::new();
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            results.push(self.parse_next()?);
        }
        Ok(results)
    }

    fn parse_next(&mut self) -> Result<Statement, ParseError> {
        self.skip_whitespace();
        match self.peek_char() {
            None => Err(ParseError::UnexpectedEof),
            Some('(') => self.parse_statement(),
            Some(found) => Err(ParseError::UnexpectedChar {
                found,
                expected: '(',
                offset: self.current_pos,
            }),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start_pos = self.current_pos;
        self.expect('(')?;
        self.skip_whitespace();

        let keyword = match self.peek_char() {
            None => return Err(ParseError::UnclosedList(start_pos)),
            Some('(') | Some(')') | Some('"') => return Err(ParseError::MissingKeyword(start_pos)),
            Some(_) => self.bare_token(),
        };

        let mut stmt = Statement::new(keyword);
        loop {
            self.skip_whitespace();
            match self.peek_char() {
                None => return Err(ParseError::UnclosedList(start_pos)),
                Some(')') => {
                    self.advance();
                    break;
                }
                Some('(') => {
                    let child = self.parse_statement()?;
                    stmt.args.push(Arg::Statement(child));
                }
                Some('"') => {
                    let text = self.parse_string()?;
                    stmt.args.push(Arg::Atom(Atom::String(text)));
                }
                Some(_) => {
                    let token = self.bare_token();
                    stmt.args.push(Arg::Atom(classify(token)));
                }
            }

            if stmt.args.len() % 1000 == 0 {
                log::trace!(
                    "Parsed {} arguments in statement at position {start_pos}",
                    stmt.args.len()
                );
            }
        }

        stmt.span = Span::new(start_pos, self.current_pos);
        Ok(stmt)
    }

    /// Consume a run of characters up to whitespace or a parenthesis.
    fn bare_token(&mut self) -> &'a str {
        let start = self.current_pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == '(' || ch == ')' {
                break;
            }
            self.advance();
        }
        &self.input[start..self.current_pos]
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let start_pos = self.current_pos;
        self.expect('"')?;
        let mut result = String::new();

        loop {
            match self.peek_char() {
                None => return Err(ParseError::UnterminatedString(start_pos)),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some(ch @ ('"' | '\\')) => {
                            result.push(ch);
                            self.advance();
                        }
                        Some(_) => result.push('\\'),
                        None => return Err(ParseError::UnterminatedString(start_pos)),
                    }
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos + ch.len_utf8();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(found) => Err(ParseError::UnexpectedChar {
                found,
                expected,
                offset: self.current_pos,
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }
}

/// Tag a bare token as a number when the whole token is a finite number.
fn classify(token: &str) -> Atom {
    let numeric_start = token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'));
    if numeric_start {
        if let Ok(value) = token.parse::<f64>() {
            if value.is_finite() {
                return Atom::Number {
                    value,
                    raw: token.to_string(),
                };
            }
        }
    }
    Atom::Symbol(token.to_string())
}

/// Parse a string holding a single statement
pub fn parse(input: &str) -> Result<Statement, ParseError> {
    log::trace!("Parsing statement from {} bytes of input", input.len());
    let result = Parser::new(input).parse();
    if let Err(e) = &result {
        log::trace!("Failed to parse statement: {e}");
    }
    result
}

/// Parse a string holding any number of top-level statements
pub fn parse_all(input: &str) -> Result<Vec<Statement>, ParseError> {
    log::trace!("Parsing statements from {} bytes of input", input.len());
    let result = Parser::new(input).parse_all();
    match &result {
        Ok(stmts) => log::trace!("Parsed {} statements", stmts.len()),
        Err(e) => log::trace!("Failed to parse statements: {e}"),
    }
    result
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::print(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atoms() {
        let stmt = parse(r#"(at 10 -2.54 hello "two words" 1e3 -inf .5)"#).unwrap();
        assert_eq!(stmt.keyword, "at");
        let atoms: Vec<_> = stmt.atoms().cloned().collect();
        assert_eq!(
            atoms[0],
            Atom::Number {
                value: 10.0,
                raw: "10".into()
            }
        );
        assert_eq!(atoms[1].as_number(), Some(-2.54));
        assert_eq!(atoms[2], Atom::symbol("hello"));
        assert_eq!(atoms[3], Atom::string("two words"));
        assert_eq!(atoms[4].as_number(), Some(1000.0));
        assert_eq!(atoms[5], Atom::symbol("-inf"));
        assert_eq!(atoms[6].text(), ".5");
    }

    #[test]
    fn text_arguments_match_their_parsed_form() {
        let built = Statement::new("node")
            .with(Statement::kv("ref", "U1"))
            .with(Statement::kv("pin", "3"))
            .with(Statement::kv("value", "10 k"));
        assert_eq!(built.find("pin").unwrap().atoms().next().unwrap().as_number(), Some(3.0));
        assert_eq!(
            built.find("value").unwrap().atoms().next(),
            Some(&Atom::string("10 k"))
        );
        assert_eq!(parse(&printer::print(&built)).unwrap(), built);
    }

    #[test]
    fn test_keyword_is_lowercased() {
        let stmt = parse("(NET (Code 1))").unwrap();
        assert_eq!(stmt.keyword, "net");
        assert_eq!(stmt.find("code").and_then(Statement::first_text), Some("1"));
    }

    #[test]
    fn test_symbols_are_not_folded() {
        let stmt = parse("(layer F.Cu)").unwrap();
        assert_eq!(stmt.first_text(), Some("F.Cu"));
    }

    #[test]
    fn test_string_escapes() {
        let stmt = parse(r#"(d "say \"hi\"" "back\\slash" "keep\n")"#).unwrap();
        let texts: Vec<_> = stmt.atoms().map(Atom::text).collect();
        assert_eq!(texts, vec!["say \"hi\"", "back\\slash", "keep\\n"]);
    }

    #[test]
    fn test_string_spans_newlines() {
        let stmt = parse("(d \"line one\nline two\")").unwrap();
        assert_eq!(stmt.first_text(), Some("line one\nline two"));
    }

    #[test]
    fn test_nested() {
        let stmt = parse(r#"(net (code 1) (name "GND") (node (ref "U1") (pin 3)))"#).unwrap();
        assert_eq!(stmt.args.len(), 3);
        let node = stmt.find("node").unwrap();
        assert_eq!(node.find("ref").and_then(Statement::first_text), Some("U1"));
        assert_eq!(node.find("pin").and_then(Statement::first_text), Some("3"));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(""), Err(ParseError::UnexpectedEof));
        assert_eq!(parse("(a (b c)"), Err(ParseError::UnclosedList(0)));
        assert_eq!(parse("(a \"open"), Err(ParseError::UnterminatedString(3)));
        assert_eq!(parse("()"), Err(ParseError::MissingKeyword(0)));
        assert_eq!(parse("((a))"), Err(ParseError::MissingKeyword(0)));
        assert_eq!(parse("(a) (b)"), Err(ParseError::TrailingInput(4)));
        assert!(matches!(
            parse("atom"),
            Err(ParseError::UnexpectedChar { found: 'a', .. })
        ));
    }

    #[test]
    fn test_parse_all() {
        let stmts = parse_all("(a 1)\n(b 2)\n").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[1].keyword, "b");
    }

    #[test]
    fn test_set_argument_replaces_first_match() {
        let mut comp = Statement::new("comp")
            .with(Statement::kv("ref", "R1"))
            .with(Statement::kv("pin", 1u32))
            .with(Statement::kv("ref", "R9"));
        comp.set_argument(Statement::kv("ref", "R2"));
        comp.set_argument(Statement::kv("value", "10k"));

        let refs: Vec<_> = comp.find_all("ref").filter_map(Statement::first_text).collect();
        assert_eq!(refs, vec!["R2", "R9"]);
        assert_eq!(comp.args.len(), 4);
        assert_eq!(comp.find("value").and_then(Statement::first_text), Some("10k"));
    }

    #[test]
    fn test_add_argument_appends() {
        let mut pins = Statement::new("pins");
        pins.add_argument(Statement::kv("pin", 1u32));
        pins.add_argument(Statement::kv("pin", 2u32));
        assert_eq!(pins.find_all("pin").count(), 2);
    }

    #[test]
    fn test_span_tracking() {
        let input = r#"(net (code 5) (name "VCC_3V3"))"#;
        let stmt = parse(input).unwrap();
        assert_eq!(stmt.span, Span::new(0, input.len()));
        let name = stmt.find("name").unwrap();
        assert_eq!(&input[name.span.start..name.span.end], r#"(name "VCC_3V3")"#);
    }

    #[test]
    fn test_equality_ignores_span() {
        let parsed = parse("(pin 3)").unwrap();
        let built = Statement::kv("pin", 3i64);
        assert!(!parsed.span.is_synthetic());
        assert_eq!(parsed, built);
    }
}
