use super::ast::{CompareOp, Expr, Operand, Step};
use crate::error::{LintError, Result};
use regex::RegexBuilder;
use serde_json::Value;

/// Recursive-descent parser for selector expressions
pub struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    pub fn parse(mut self) -> Result<Vec<Step>> {
        self.skip_ws();
        self.expect('$')?;
        let mut steps = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.pos += 1;
                    if self.eat('.') {
                        let inner = match self.peek() {
                            Some('*') => {
                                self.pos += 1;
                                Step::Wildcard
                            }
                            Some('[') => self.parse_bracket()?,
                            _ => Step::Member(self.parse_name()?),
                        };
                        steps.push(Step::Descendant(Box::new(inner)));
                    } else if self.eat('*') {
                        steps.push(Step::Wildcard);
                    } else {
                        steps.push(Step::Member(self.parse_name()?));
                    }
                }
                '[' => steps.push(self.parse_bracket()?),
                '~' => {
                    self.pos += 1;
                    steps.push(Step::Keys);
                }
                c if c.is_whitespace() => self.pos += 1,
                other => return Err(self.error(format!("unexpected character '{}'", other))),
            }
        }
        Ok(steps)
    }

    fn error(&self, reason: impl Into<String>) -> LintError {
        LintError::selector(self.source, self.pos, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        let matches = s
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c));
        if matches {
            self.pos += s.chars().count();
        }
        matches
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.eat(c) {
            Ok(())
        } else {
            match self.peek() {
                Some(found) => Err(self.error(format!("expected '{}', found '{}'", c, found))),
                None => Err(self.error(format!("expected '{}', found end of selector", c))),
            }
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Unquoted member name: runs until the next step delimiter
    fn parse_name(&mut self) -> Result<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !matches!(c, '.' | '[' | '~') && !c.is_whitespace())
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a member name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_bracket(&mut self) -> Result<Step> {
        self.expect('[')?;
        self.skip_ws();
        let step = match self.peek() {
            Some('*') => {
                self.pos += 1;
                Step::Wildcard
            }
            Some('\'') | Some('"') => Step::Member(self.parse_quoted()?),
            Some('?') => {
                self.pos += 1;
                self.skip_ws();
                self.expect('(')?;
                let expr = self.parse_or()?;
                self.skip_ws();
                self.expect(')')?;
                Step::Filter(expr)
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
                let digits: String = self.chars[start..self.pos].iter().collect();
                let index = digits
                    .parse::<usize>()
                    .map_err(|e| self.error(format!("invalid index: {}", e)))?;
                Step::Index(index)
            }
            _ => return Err(self.error("expected '*', an index, a quoted key or a filter")),
        };
        self.skip_ws();
        self.expect(']')?;
        Ok(step)
    }

    fn parse_quoted(&mut self) -> Result<String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a quoted string")),
        };
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => out.push(c),
                        None => return Err(self.error("unterminated escape")),
                    }
                    self.pos += 1;
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        loop {
            self.skip_ws();
            if self.eat_str("||") {
                let rhs = self.parse_and()?;
                lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            self.skip_ws();
            if self.eat_str("&&") {
                let rhs = self.parse_unary()?;
                lhs = Expr::And(Box::new(lhs), Box::new(rhs));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.skip_ws();
        if self.peek() == Some('!') && self.peek_at(1) != Some('=') {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        if self.eat('(') {
            let inner = self.parse_or()?;
            self.skip_ws();
            self.expect(')')?;
            return Ok(inner);
        }
        self.parse_predicate()
    }

    fn parse_predicate(&mut self) -> Result<Expr> {
        let lhs = self.parse_operand()?;
        self.skip_ws();

        if self.eat_str("=~") {
            self.skip_ws();
            let regex = self.parse_regex()?;
            return Ok(Expr::Matches(lhs, regex));
        }
        if self.peek() == Some('i')
            && self.peek_at(1) == Some('n')
            && self.peek_at(2).is_some_and(|c| c.is_whitespace() || c == '[')
        {
            self.pos += 2;
            self.skip_ws();
            return Ok(Expr::In(lhs, self.parse_list()?));
        }

        let op = if self.eat_str("===") || self.eat_str("==") {
            Some(CompareOp::Eq)
        } else if self.eat_str("!==") || self.eat_str("!=") {
            Some(CompareOp::Ne)
        } else if self.eat_str("<=") {
            Some(CompareOp::Le)
        } else if self.eat_str(">=") {
            Some(CompareOp::Ge)
        } else if self.eat('<') {
            Some(CompareOp::Lt)
        } else if self.eat('>') {
            Some(CompareOp::Gt)
        } else {
            None
        };

        match op {
            Some(op) => {
                let rhs = self.parse_operand()?;
                Ok(Expr::Compare(lhs, op, rhs))
            }
            None => Ok(Expr::Truthy(lhs)),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        self.skip_ws();
        match self.peek() {
            Some('@') => {
                self.pos += 1;
                if self.eat_str("key") || self.eat_str("property") {
                    return Ok(Operand::Key);
                }
                let mut props = Vec::new();
                loop {
                    if self.peek() == Some('.') {
                        self.pos += 1;
                        props.push(self.parse_ident()?);
                    } else if self.peek() == Some('[') {
                        self.pos += 1;
                        self.skip_ws();
                        props.push(self.parse_quoted()?);
                        self.skip_ws();
                        self.expect(']')?;
                    } else {
                        return Ok(Operand::Current(props));
                    }
                }
            }
            Some('\'') | Some('"') => Ok(Operand::Literal(Value::String(self.parse_quoted()?))),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number().map(Operand::Literal),
            Some(_) => {
                let word = self.parse_ident()?;
                match word.as_str() {
                    "true" => Ok(Operand::Literal(Value::Bool(true))),
                    "false" => Ok(Operand::Literal(Value::Bool(false))),
                    "null" => Ok(Operand::Literal(Value::Null)),
                    other => Err(self.error(format!("unknown identifier '{}'", other))),
                }
            }
            None => Err(self.error("expected an operand")),
        }
    }

    fn parse_ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '$'))
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        self.eat('-');
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Value::from(int));
        }
        text.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number '{}'", text)))
    }

    fn parse_list(&mut self) -> Result<Vec<Value>> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                return Ok(items);
            }
            match self.parse_operand()? {
                Operand::Literal(value) => items.push(value),
                _ => return Err(self.error("list items must be literals")),
            }
            self.skip_ws();
            if !self.eat(',') {
                self.skip_ws();
                self.expect(']')?;
                return Ok(items);
            }
        }
    }

    fn parse_regex(&mut self) -> Result<regex::Regex> {
        self.expect('/')?;
        let mut pattern = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated regex")),
                Some('\\') if self.peek_at(1) == Some('/') => {
                    pattern.push('/');
                    self.pos += 2;
                }
                Some('\\') => {
                    pattern.push('\\');
                    if let Some(next) = self.peek_at(1) {
                        pattern.push(next);
                    }
                    self.pos += 2;
                }
                Some('/') => {
                    self.pos += 1;
                    break;
                }
                Some(c) => {
                    pattern.push(c);
                    self.pos += 1;
                }
            }
        }
        let mut builder = RegexBuilder::new(&pattern);
        while let Some(flag) = self.peek().filter(char::is_ascii_alphabetic) {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => return Err(self.error(format!("unsupported regex flag '{}'", other))),
            };
            self.pos += 1;
        }
        builder
            .build()
            .map_err(|e| self.error(format!("invalid regex /{}/: {}", pattern, e)))
    }
}
