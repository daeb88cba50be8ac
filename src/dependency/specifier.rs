// src/dependency/specifier.rs

//! Requirement specifier parsing and rendering
//!
//! Format: `name[extra,...] <op><version>,... ; marker` or
//! `name[extra,...] @ url ; marker`. Rendering follows the canonical layout
//! pip and `packaging` print: extras and version clauses sorted and
//! deduplicated, no spaces inside the version clause, markers with single
//! spaces between tokens.

use super::{DependencyError, is_valid_name};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^([0-9]+!)?[0-9]+(\.[0-9]+)*",
        r"([._-]?(a|b|c|rc|alpha|beta|pre|preview)[._-]?[0-9]*)?",
        r"(([._-]?(post|rev|r)[._-]?[0-9]*)|(-[0-9]+))?",
        r"([._-]?dev[._-]?[0-9]*)?",
        r"(\+[a-z0-9]+([._-][a-z0-9]+)*)?",
        r"(\.\*)?$",
    ))
    .unwrap()
});

/// Characters that make up a comparison operator
pub(crate) fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!' | '~')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Version comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `~=`
    Compatible,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `===`
    Arbitrary,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "~=" => Some(Self::Compatible),
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            "<=" => Some(Self::LessEqual),
            ">=" => Some(Self::GreaterEqual),
            "<" => Some(Self::Less),
            ">" => Some(Self::Greater),
            "===" => Some(Self::Arbitrary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Arbitrary => "===",
        }
    }

    /// Only `==` and `!=` accept a trailing `.*`
    fn allows_wildcard(&self) -> bool {
        matches!(self, Self::Equal | Self::NotEqual)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<op><version>` clause
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpec {
    pub op: Operator,
    pub version: String,
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MarkerToken {
    /// Variable name or one of `and`, `or`, `in`, `not`
    Word(String),
    Quoted(String),
    Op(String),
    Open,
    Close,
}

/// An environment marker, kept as a validated token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    tokens: Vec<MarkerToken>,
}

impl Marker {
    pub fn parse(s: &str) -> Result<Self, DependencyError> {
        let tokens = tokenize_marker(s)?;
        if tokens.is_empty() {
            return Err(DependencyError::InvalidMarker("empty marker".to_string()));
        }

        let mut pos = 0;
        parse_marker_or(&tokens, &mut pos)?;
        if pos != tokens.len() {
            return Err(DependencyError::InvalidMarker(format!(
                "unexpected token after position {}",
                pos
            )));
        }
        Ok(Self { tokens })
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut previous: Option<&MarkerToken> = None;
        for token in &self.tokens {
            let spaced = !matches!(previous, None | Some(MarkerToken::Open))
                && !matches!(token, MarkerToken::Close);
            if spaced {
                f.write_str(" ")?;
            }
            match token {
                MarkerToken::Word(w) | MarkerToken::Op(w) => f.write_str(w)?,
                MarkerToken::Quoted(q) => write!(f, "\"{}\"", q)?,
                MarkerToken::Open => f.write_str("(")?,
                MarkerToken::Close => f.write_str(")")?,
            }
            previous = Some(token);
        }
        Ok(())
    }
}

fn tokenize_marker(s: &str) -> Result<Vec<MarkerToken>, DependencyError> {
    let mut tokens = Vec::new();
    let mut chars = s.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            chars.next();
            tokens.push(MarkerToken::Open);
        } else if c == ')' {
            chars.next();
            tokens.push(MarkerToken::Close);
        } else if c == '\'' || c == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            for (_, next) in chars.by_ref() {
                if next == c {
                    closed = true;
                    break;
                }
                value.push(next);
            }
            if !closed {
                return Err(DependencyError::InvalidMarker(format!(
                    "unterminated string starting at {}",
                    start
                )));
            }
            tokens.push(MarkerToken::Quoted(value));
        } else if is_operator_char(c) {
            let mut op = String::new();
            while let Some(&(_, next)) = chars.peek() {
                if !is_operator_char(next) {
                    break;
                }
                op.push(next);
                chars.next();
            }
            if Operator::parse(&op).is_none() {
                return Err(DependencyError::InvalidMarker(format!(
                    "unknown operator '{}'",
                    op
                )));
            }
            tokens.push(MarkerToken::Op(op));
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            let mut word = String::new();
            while let Some(&(_, next)) = chars.peek() {
                if !(next.is_ascii_alphanumeric() || next == '_' || next == '.') {
                    break;
                }
                word.push(next);
                chars.next();
            }
            tokens.push(MarkerToken::Word(word));
        } else {
            return Err(DependencyError::InvalidMarker(format!(
                "unexpected character '{}'",
                c
            )));
        }
    }

    Ok(tokens)
}

fn is_keyword(token: Option<&MarkerToken>, keyword: &str) -> bool {
    matches!(token, Some(MarkerToken::Word(w)) if w == keyword)
}

fn parse_marker_or(tokens: &[MarkerToken], pos: &mut usize) -> Result<(), DependencyError> {
    parse_marker_and(tokens, pos)?;
    while is_keyword(tokens.get(*pos), "or") {
        *pos += 1;
        parse_marker_and(tokens, pos)?;
    }
    Ok(())
}

fn parse_marker_and(tokens: &[MarkerToken], pos: &mut usize) -> Result<(), DependencyError> {
    parse_marker_atom(tokens, pos)?;
    while is_keyword(tokens.get(*pos), "and") {
        *pos += 1;
        parse_marker_atom(tokens, pos)?;
    }
    Ok(())
}

fn parse_marker_atom(tokens: &[MarkerToken], pos: &mut usize) -> Result<(), DependencyError> {
    if tokens.get(*pos) == Some(&MarkerToken::Open) {
        *pos += 1;
        parse_marker_or(tokens, pos)?;
        if tokens.get(*pos) != Some(&MarkerToken::Close) {
            return Err(DependencyError::InvalidMarker("unbalanced parenthesis".to_string()));
        }
        *pos += 1;
        return Ok(());
    }

    parse_marker_value(tokens, pos)?;
    match tokens.get(*pos) {
        Some(MarkerToken::Op(_)) => *pos += 1,
        Some(MarkerToken::Word(w)) if w == "in" => *pos += 1,
        Some(MarkerToken::Word(w)) if w == "not" && is_keyword(tokens.get(*pos + 1), "in") => {
            *pos += 2
        }
        _ => {
            return Err(DependencyError::InvalidMarker(
                "expected a comparison operator".to_string(),
            ));
        }
    }
    parse_marker_value(tokens, pos)
}

fn parse_marker_value(tokens: &[MarkerToken], pos: &mut usize) -> Result<(), DependencyError> {
    match tokens.get(*pos) {
        Some(MarkerToken::Quoted(_)) => {
            *pos += 1;
            Ok(())
        }
        Some(MarkerToken::Word(w)) if !matches!(w.as_str(), "and" | "or" | "in" | "not") => {
            *pos += 1;
            Ok(())
        }
        _ => Err(DependencyError::InvalidMarker(
            "expected a variable or quoted string".to_string(),
        )),
    }
}

/// A parsed requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpecifier {
    pub name: String,
    pub extras: Vec<String>,
    pub specifiers: Vec<VersionSpec>,
    pub url: Option<String>,
    pub marker: Option<Marker>,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}

impl DependencySpecifier {
    pub fn parse(s: &str) -> Result<Self, DependencyError> {
        let mut cursor = Cursor::new(s);
        cursor.skip_ws();

        let name = cursor.take_while(is_name_char);
        if name.is_empty() {
            return Err(DependencyError::MissingName);
        }
        if !is_valid_name(name) {
            return Err(DependencyError::InvalidName(name.to_string()));
        }

        cursor.skip_ws();
        let extras = if cursor.eat('[') {
            Self::parse_extras(&mut cursor)?
        } else {
            Vec::new()
        };

        cursor.skip_ws();
        let mut url = None;
        let mut specifiers = Vec::new();

        if cursor.eat('@') {
            cursor.skip_ws();
            let target = cursor.take_while(|c| !c.is_whitespace());
            if target.is_empty() || !target.contains(':') {
                return Err(DependencyError::InvalidUrl(target.to_string()));
            }
            url = Some(target.to_string());
            cursor.skip_ws();
        } else {
            let parenthesized = cursor.eat('(');
            specifiers = Self::parse_version_clause(&mut cursor)?;
            if parenthesized {
                cursor.skip_ws();
                if !cursor.eat(')') {
                    return Err(DependencyError::UnexpectedText(cursor.rest().to_string()));
                }
            }
            cursor.skip_ws();
        }

        let marker = if cursor.eat(';') {
            Some(Marker::parse(cursor.rest())?)
        } else if cursor.at_end() {
            None
        } else {
            return Err(DependencyError::UnexpectedText(cursor.rest().to_string()));
        };

        Ok(Self {
            name: name.to_string(),
            extras,
            specifiers,
            url,
            marker,
        })
    }

    fn parse_extras(cursor: &mut Cursor<'_>) -> Result<Vec<String>, DependencyError> {
        let mut extras = Vec::new();
        loop {
            cursor.skip_ws();
            if extras.is_empty() && cursor.eat(']') {
                break;
            }
            let extra = cursor.take_while(is_name_char);
            if !is_valid_name(extra) {
                return Err(DependencyError::InvalidExtras(format!(
                    "bad extra name '{}'",
                    extra
                )));
            }
            extras.push(extra.to_string());
            cursor.skip_ws();
            if cursor.eat(',') {
                continue;
            }
            if cursor.eat(']') {
                break;
            }
            return Err(DependencyError::InvalidExtras(
                "expected ',' or ']'".to_string(),
            ));
        }
        Ok(extras)
    }

    fn parse_version_clause(cursor: &mut Cursor<'_>) -> Result<Vec<VersionSpec>, DependencyError> {
        let mut specifiers = Vec::new();
        loop {
            cursor.skip_ws();
            if !cursor.peek().is_some_and(is_operator_char) {
                if specifiers.is_empty() {
                    break;
                }
                return Err(DependencyError::UnexpectedText(cursor.rest().to_string()));
            }

            let op_text = cursor.take_while(is_operator_char);
            let op = Operator::parse(op_text)
                .ok_or_else(|| DependencyError::InvalidOperator(op_text.to_string()))?;

            cursor.skip_ws();
            let version =
                cursor.take_while(|c| !c.is_whitespace() && !matches!(c, ',' | ';' | ')'));
            let valid = if op == Operator::Arbitrary {
                !version.is_empty()
            } else {
                VERSION.is_match(version) && (op.allows_wildcard() || !version.ends_with(".*"))
            };
            if !valid {
                return Err(DependencyError::InvalidVersion(format!("{}{}", op, version)));
            }
            specifiers.push(VersionSpec {
                op,
                version: version.to_string(),
            });

            cursor.skip_ws();
            if !cursor.eat(',') {
                break;
            }
        }
        Ok(specifiers)
    }
}

impl fmt::Display for DependencySpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if !self.extras.is_empty() {
            let mut extras: Vec<&str> = self.extras.iter().map(String::as_str).collect();
            extras.sort_unstable();
            extras.dedup();
            write!(f, "[{}]", extras.join(","))?;
        }

        if !self.specifiers.is_empty() {
            let mut clauses: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
            clauses.sort_unstable();
            clauses.dedup();
            f.write_str(&clauses.join(","))?;
        }

        if let Some(url) = &self.url {
            write!(f, "@ {}", url)?;
            if self.marker.is_some() {
                f.write_str(" ")?;
            }
        }

        if let Some(marker) = &self.marker {
            write!(f, "; {}", marker)?;
        }

        Ok(())
    }
}
