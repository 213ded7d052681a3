//! Formula compiler.
//!
//! Recursive descent parser for the indicator formula grammar. Converts
//! untrusted formula text into a closed [`Expr`] tree, with meaningful
//! errors including character offset and the specific validation kind.
//!
//! Grammar:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := number | '(' expression ')' | field | call
//! call       := FNAME '(' field ',' period ')'    FNAME in {MA, EMA, REF}
//! field      := OPEN | HIGH | LOW | CLOSE | VOLUME   (case-insensitive)
//! ```
//!
//! Field atoms and function names are matched case-insensitively. A bare
//! identifier is resolved as a field (`UnknownField` otherwise); an
//! identifier followed by `(` is resolved as a function
//! (`UnknownFunction` otherwise).

use crate::domain::error::{FormulaError, FormulaErrorKind};
use crate::domain::expr::{BinaryOp, Expr, WindowFn};
use crate::domain::ohlcv::PriceField;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, kind: FormulaErrorKind, position: usize, message: String) -> FormulaError {
        FormulaError {
            kind,
            message,
            position,
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), FormulaError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(
                FormulaErrorKind::Syntax,
                self.pos,
                format!("expected '{}', found '{}'", expected, ch),
            )),
            None => Err(self.error(
                FormulaErrorKind::Syntax,
                self.pos,
                format!("expected '{}', found end of input", expected),
            )),
        }
    }

    fn peek_word(&self) -> String {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn consume_word(&mut self) -> Option<String> {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if ch.is_alphabetic() || ch == '_' || (!word.is_empty() && ch.is_ascii_digit()) {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            None
        } else {
            self.pos += word.len();
            Some(word)
        }
    }

    fn parse_number(&mut self) -> Result<f64, FormulaError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(self.error(
                FormulaErrorKind::Syntax,
                start,
                "expected number".to_string(),
            ));
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| {
            self.error(
                FormulaErrorKind::Syntax,
                start,
                format!("invalid number: {}", num_str),
            )
        })
    }

    /// Window periods are positive integer literals.
    fn parse_period(&mut self, func: WindowFn) -> Result<usize, FormulaError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(self.error(
                FormulaErrorKind::BadArguments,
                start,
                format!("{} period must be an integer, found '{}'", func, self.peek_word()),
            ));
        }

        if self.peek() == Some('.') {
            return Err(self.error(
                FormulaErrorKind::BadArguments,
                start,
                format!("{} period must be an integer", func),
            ));
        }

        let num_str = &self.input[start..self.pos];
        let period = num_str.parse::<usize>().map_err(|_| {
            self.error(
                FormulaErrorKind::BadArguments,
                start,
                format!("invalid period: {}", num_str),
            )
        })?;

        if period == 0 {
            return Err(self.error(
                FormulaErrorKind::BadArguments,
                start,
                format!("{} period must be positive", func),
            ));
        }

        Ok(period)
    }

    /// First argument of every library function is a field atom.
    fn parse_field_argument(&mut self, func: WindowFn) -> Result<PriceField, FormulaError> {
        self.skip_whitespace();
        let start = self.pos;

        if self.peek() == Some(')') {
            return Err(self.error(
                FormulaErrorKind::BadArguments,
                start,
                format!("{} expects 2 arguments, found 0", func),
            ));
        }

        let Some(word) = self.consume_word() else {
            return Err(self.error(
                FormulaErrorKind::BadArguments,
                start,
                format!(
                    "first argument of {} must be a price field, found '{}'",
                    func,
                    self.peek_word()
                ),
            ));
        };

        PriceField::parse(&word).ok_or_else(|| {
            self.error(
                FormulaErrorKind::UnknownField,
                start,
                format!(
                    "no field named '{}' (expected OPEN, HIGH, LOW, CLOSE or VOLUME)",
                    word
                ),
            )
        })
    }

    fn parse_call(&mut self, name: &str, name_pos: usize) -> Result<Expr, FormulaError> {
        let func = match name.to_ascii_uppercase().as_str() {
            "MA" => WindowFn::Ma,
            "EMA" => WindowFn::Ema,
            "REF" => WindowFn::Ref,
            _ => {
                return Err(self.error(
                    FormulaErrorKind::UnknownFunction,
                    name_pos,
                    format!("no function named '{}' (expected MA, EMA or REF)", name),
                ));
            }
        };

        self.expect_char('(')?;
        let field = self.parse_field_argument(func)?;

        self.skip_whitespace();
        if self.peek() == Some(')') {
            return Err(self.error(
                FormulaErrorKind::BadArguments,
                self.pos,
                format!("{} expects 2 arguments, found 1", func),
            ));
        }
        self.expect_char(',')?;

        let period = self.parse_period(func)?;

        self.skip_whitespace();
        if self.peek() == Some(',') {
            return Err(self.error(
                FormulaErrorKind::BadArguments,
                self.pos,
                format!("{} expects 2 arguments, found more", func),
            ));
        }
        self.expect_char(')')?;

        Ok(Expr::Call {
            func,
            field,
            period,
        })
    }

    fn parse_factor(&mut self) -> Result<Expr, FormulaError> {
        self.skip_whitespace();

        match self.peek() {
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '.' => {
                let num = self.parse_number()?;
                return Ok(Expr::Literal(num));
            }
            Some('(') => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_char(')')?;
                return Ok(expr);
            }
            _ => {}
        }

        let start = self.pos;
        let Some(word) = self.consume_word() else {
            return Err(self.error(
                FormulaErrorKind::Syntax,
                start,
                format!("expected expression, found '{}'", self.peek_word()),
            ));
        };

        self.skip_whitespace();
        if self.peek() == Some('(') {
            return self.parse_call(&word, start);
        }

        match PriceField::parse(&word) {
            Some(field) => Ok(Expr::Field(field)),
            None => Err(self.error(
                FormulaErrorKind::UnknownField,
                start,
                format!(
                    "no field named '{}' (expected OPEN, HIGH, LOW, CLOSE or VOLUME)",
                    word
                ),
            )),
        }
    }

    fn parse_term(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.parse_factor()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('*') => BinaryOp::Mul,
                Some('/') => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expr, FormulaError> {
        let mut expr = self.parse_term()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some('+') => BinaryOp::Add,
                Some('-') => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse(&mut self) -> Result<Expr, FormulaError> {
        let expr = self.parse_expression()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error(
                FormulaErrorKind::Syntax,
                self.pos,
                format!("unexpected input after formula: '{}'", self.remaining()),
            ));
        }
        Ok(expr)
    }
}

/// Compile formula text into a closed expression tree.
pub fn compile(input: &str) -> Result<Expr, FormulaError> {
    let mut parser = Parser::new(input);
    parser.parse()
}
