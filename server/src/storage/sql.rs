//! The query dialect understood by [`super::MemoryStore`].
//!
//! This is exactly the subset of document-store SQL the filter compiler
//! emits, nothing more:
//!
//! ```text
//! SELECT *                     FROM c [WHERE cond]
//! SELECT [DISTINCT] VALUE path FROM c [WHERE cond]
//!
//! cond    := and (OR and)*
//! and     := unary (AND unary)*
//! unary   := NOT unary | '(' cond ')' | IS_DEFINED '(' path ')'
//!          | operand '=' operand | operand IN '(' operand (',' operand)* ')'
//! operand := path | 'string' | "string" | number | true | false | null
//! path    := alias ('.' ident | '[' string ']')*
//! ```
//!
//! Comparison follows document-store semantics: values of different JSON types
//! are never equal and an undefined path never matches.

use serde_json::Value;

use super::{Document, StorageError};

/// Maximum nesting of parentheses and `NOT`.
const MAX_NESTING_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Num(f64),
    Symbol(char),
}

fn invalid(message: impl Into<String>) -> StorageError {
    StorageError::InvalidQuery(message.into())
}

/// Split a statement into tokens.
fn tokenize(input: &str) -> Result<Vec<Token>, StorageError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Quoted string, either quote style, backslash escapes the next character.
        if c == '\'' || c == '"' {
            let quote = c;
            let mut value = String::new();
            i += 1;
            loop {
                let Some(&next) = chars.get(i) else {
                    return Err(invalid("unterminated string literal"));
                };
                i += 1;
                match next {
                    '\\' => {
                        let Some(&escaped) = chars.get(i) else {
                            return Err(invalid("unterminated escape sequence"));
                        };
                        i += 1;
                        value.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                    }
                    _ if next == quote => break,
                    _ => value.push(next),
                }
            }
            tokens.push(Token::Str(value));
            continue;
        }

        let starts_number = c.is_ascii_digit()
            || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit));
        if starts_number {
            let start = i;
            i += 1;
            while i < chars.len() {
                let d = chars[i];
                let exponent_sign = matches!(d, '-' | '+') && matches!(chars[i - 1], 'e' | 'E');
                if d.is_ascii_digit() || matches!(d, '.' | 'e' | 'E') || exponent_sign {
                    i += 1;
                } else {
                    break;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let number = text
                .parse::<f64>()
                .map_err(|_| invalid(format!("invalid number '{text}'")))?;
            tokens.push(Token::Num(number));
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        if matches!(c, '(' | ')' | '[' | ']' | ',' | '.' | '=' | '*') {
            tokens.push(Token::Symbol(c));
            i += 1;
            continue;
        }

        return Err(invalid(format!("unexpected character '{c}'")));
    }

    Ok(tokens)
}

/// A property path below the collection alias. Empty means the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Path(Vec<String>);

impl Path {
    fn resolve<'a>(&self, document: &'a Document) -> Option<&'a Value> {
        let mut segments = self.0.iter();
        let Some(first) = segments.next() else {
            return None;
        };
        let mut current = document.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Path(Path),
    Literal(Value),
}

impl Operand {
    fn resolve<'a>(&'a self, document: &'a Document) -> Option<&'a Value> {
        match self {
            Self::Path(path) => path.resolve(document),
            Self::Literal(value) => Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Equals(Operand, Operand),
    In(Operand, Vec<Operand>),
    IsDefined(Path),
}

impl Condition {
    fn matches(&self, document: &Document) -> bool {
        match self {
            Self::And(all) => all.iter().all(|condition| condition.matches(document)),
            Self::Or(any) => any.iter().any(|condition| condition.matches(document)),
            Self::Not(inner) => !inner.matches(document),
            Self::Equals(left, right) => {
                match (left.resolve(document), right.resolve(document)) {
                    (Some(l), Some(r)) => values_equal(l, r),
                    _ => false,
                }
            }
            Self::In(needle, haystack) => needle.resolve(document).is_some_and(|value| {
                haystack
                    .iter()
                    .filter_map(|candidate| candidate.resolve(document))
                    .any(|candidate| values_equal(value, candidate))
            }),
            Self::IsDefined(path) => path.resolve(document).is_some(),
        }
    }
}

/// Typed equality: numbers compare numerically, other types must match exactly.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => (l - r).abs() <= f64::EPSILON * l.abs().max(r.abs()),
            _ => false,
        },
        _ => left == right,
    }
}

/// What a statement returns for each matching document.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Projection {
    /// `SELECT *`: the whole document.
    All,
    /// `SELECT [DISTINCT] VALUE path`: one value per document defining the path.
    Value { distinct: bool, path: Path },
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    projection: Projection,
    condition: Option<Condition>,
}

impl Statement {
    /// Parse a statement.
    pub fn parse(sql: &str) -> Result<Self, StorageError> {
        let tokens = tokenize(sql)?;
        let mut parser = Parser {
            tokens,
            position: 0,
            alias: String::new(),
            depth: 0,
        };
        parser.statement()
    }

    /// Evaluate the statement over a set of documents.
    #[must_use]
    pub fn execute<'a>(&self, documents: impl IntoIterator<Item = &'a Document>) -> Vec<Value> {
        let matching = documents.into_iter().filter(|document| {
            self.condition
                .as_ref()
                .is_none_or(|condition| condition.matches(document))
        });

        match &self.projection {
            Projection::All => matching
                .map(|document| Value::Object(document.clone()))
                .collect(),
            Projection::Value { distinct, path } => {
                let mut values: Vec<Value> = Vec::new();
                for value in matching.filter_map(|document| path.resolve(document)) {
                    if *distinct && values.iter().any(|seen| values_equal(seen, value)) {
                        continue;
                    }
                    values.push(value.clone());
                }
                values
            }
        }
    }
}

fn flatten(mut terms: Vec<Condition>, combine: fn(Vec<Condition>) -> Condition) -> Condition {
    match terms.pop() {
        Some(term) if terms.is_empty() => term,
        Some(term) => {
            terms.push(term);
            combine(terms)
        }
        None => combine(terms),
    }
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    alias: String,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(ident)) if ident.eq_ignore_ascii_case(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), StorageError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(invalid(format!("expected {keyword}, found {:?}", self.peek())))
        }
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Some(&Token::Symbol(symbol)) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), StorageError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(invalid(format!("expected '{symbol}', found {:?}", self.peek())))
        }
    }

    fn statement(&mut self) -> Result<Statement, StorageError> {
        self.expect_keyword("SELECT")?;

        // The projection path is parsed before FROM names the alias, so keep
        // its raw tokens aside and resolve it afterwards.
        let projection_start = self.position;
        let distinct = self.eat_keyword("DISTINCT");
        let selects_value = if self.eat_symbol('*') {
            if distinct {
                return Err(invalid("DISTINCT requires VALUE"));
            }
            false
        } else {
            self.expect_keyword("VALUE")?;
            while self.peek().is_some() && !self.peek_keyword("FROM") {
                self.position += 1;
            }
            true
        };
        let projection_end = self.position;

        self.expect_keyword("FROM")?;
        match self.next() {
            Some(Token::Ident(alias)) => self.alias = alias,
            other => return Err(invalid(format!("expected collection alias, found {other:?}"))),
        }

        let condition = if self.eat_keyword("WHERE") {
            Some(self.condition()?)
        } else {
            None
        };

        if let Some(token) = self.peek() {
            return Err(invalid(format!("unexpected trailing token {token:?}")));
        }

        let projection = if selects_value {
            let end_of_statement = self.position;
            // Skip DISTINCT (if any) and VALUE.
            self.position = projection_start + usize::from(distinct) + 1;
            let path = self.path()?;
            if self.position != projection_end {
                return Err(invalid("unexpected tokens in projection"));
            }
            self.position = end_of_statement;
            Projection::Value { distinct, path }
        } else {
            Projection::All
        };

        Ok(Statement {
            projection,
            condition,
        })
    }

    // AND/OR chains stay flat; only parentheses and NOT add depth.
    fn condition(&mut self) -> Result<Condition, StorageError> {
        let mut alternatives = vec![self.conjunction()?];
        while self.eat_keyword("OR") {
            alternatives.push(self.conjunction()?);
        }
        Ok(flatten(alternatives, Condition::Or))
    }

    fn conjunction(&mut self) -> Result<Condition, StorageError> {
        let mut terms = vec![self.unary()?];
        while self.eat_keyword("AND") {
            terms.push(self.unary()?);
        }
        Ok(flatten(terms, Condition::And))
    }

    fn unary(&mut self) -> Result<Condition, StorageError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(invalid(format!(
                "expression nesting exceeds maximum of {MAX_NESTING_DEPTH}"
            )));
        }
        let condition = self.unary_inner();
        self.depth -= 1;
        condition
    }

    fn unary_inner(&mut self) -> Result<Condition, StorageError> {
        if self.eat_keyword("NOT") {
            return Ok(Condition::Not(Box::new(self.unary()?)));
        }

        if self.eat_symbol('(') {
            let inner = self.condition()?;
            self.expect_symbol(')')?;
            return Ok(inner);
        }

        if self.eat_keyword("IS_DEFINED") {
            self.expect_symbol('(')?;
            let path = self.path()?;
            self.expect_symbol(')')?;
            return Ok(Condition::IsDefined(path));
        }

        let left = self.operand()?;
        if self.eat_symbol('=') {
            let right = self.operand()?;
            return Ok(Condition::Equals(left, right));
        }
        if self.eat_keyword("IN") {
            self.expect_symbol('(')?;
            let mut list = vec![self.operand()?];
            while self.eat_symbol(',') {
                list.push(self.operand()?);
            }
            self.expect_symbol(')')?;
            return Ok(Condition::In(left, list));
        }

        Err(invalid(format!(
            "expected '=' or IN after operand, found {:?}",
            self.peek()
        )))
    }

    fn operand(&mut self) -> Result<Operand, StorageError> {
        let literal = match self.peek() {
            Some(Token::Str(value)) => Some(Value::String(value.clone())),
            Some(Token::Num(n)) => Some(Value::Number(
                serde_json::Number::from_f64(*n).ok_or_else(|| invalid("non-finite number"))?,
            )),
            Some(Token::Ident(ident)) if ident.eq_ignore_ascii_case("true") => {
                Some(Value::Bool(true))
            }
            Some(Token::Ident(ident)) if ident.eq_ignore_ascii_case("false") => {
                Some(Value::Bool(false))
            }
            Some(Token::Ident(ident)) if ident.eq_ignore_ascii_case("null") => Some(Value::Null),
            _ => None,
        };

        if let Some(value) = literal {
            self.position += 1;
            return Ok(Operand::Literal(value));
        }
        Ok(Operand::Path(self.path()?))
    }

    fn path(&mut self) -> Result<Path, StorageError> {
        match self.next() {
            Some(Token::Ident(root)) if root == self.alias => {}
            other => {
                return Err(invalid(format!(
                    "expected path rooted at '{}', found {other:?}",
                    self.alias
                )));
            }
        }

        let mut segments = Vec::new();
        loop {
            if self.eat_symbol('.') {
                match self.next() {
                    Some(Token::Ident(segment)) => segments.push(segment),
                    other => return Err(invalid(format!("expected property, found {other:?}"))),
                }
            } else if self.eat_symbol('[') {
                match self.next() {
                    Some(Token::Str(segment)) => segments.push(segment),
                    other => return Err(invalid(format!("expected property, found {other:?}"))),
                }
                self.expect_symbol(']')?;
            } else {
                break;
            }
        }

        if segments.is_empty() {
            return Err(invalid("bare collection alias is not a value"));
        }
        Ok(Path(segments))
    }
}
