//! Recursive-descent parser for `$filter` and `$orderby` expressions.
//!
//! Precedence climbing: or < and < comparison < additive < multiplicative
//! < unary < primary. Every re-entry into the expression grammar (parentheses,
//! lambda bodies, function arguments) counts one level of recursion depth;
//! crossing the configured limit aborts parsing immediately rather than
//! building a tree that would later be rejected.

use crate::error::{Result, UriqError};
use crate::settings::QueryOptionKind;
use crate::types::PrimitiveValue;

use super::lexer::{tokenize, LexKind, Lexeme};
use super::token::{
    BinaryOperatorKind, LambdaKind, OrderByDirection, OrderByToken, QueryToken,
    UnaryOperatorKind,
};

/// Parses `$filter` text into a token tree.
pub fn parse_filter(text: &str, limit: u32) -> Result<QueryToken> {
    let mut parser = ExpressionParser::new(text, limit, QueryOptionKind::Filter)?;
    let token = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(token)
}

/// Parses `$orderby` text into a list of ordering items.
pub fn parse_orderby(text: &str, limit: u32) -> Result<Vec<OrderByToken>> {
    let mut parser = ExpressionParser::new(text, limit, QueryOptionKind::OrderBy)?;
    let mut items = Vec::new();
    loop {
        let expression = parser.parse_expression()?;
        let direction = match parser.peek_identifier() {
            Some("asc") => {
                parser.advance();
                OrderByDirection::Ascending
            }
            Some("desc") => {
                parser.advance();
                OrderByDirection::Descending
            }
            _ => OrderByDirection::Ascending,
        };
        items.push(OrderByToken {
            expression: Box::new(expression),
            direction,
        });
        if parser.eat(&LexKind::Comma) {
            continue;
        }
        parser.expect_end()?;
        return Ok(items);
    }
}

/// Recursive-descent parser over a lexed expression.
struct ExpressionParser {
    lexemes: Vec<Lexeme>,
    pos: usize,
    source_len: usize,
    depth: u32,
    limit: u32,
    option_kind: QueryOptionKind,
    /// Lambda parameter names currently in lexical scope, innermost last.
    /// Seeded with the implicit `$it` variable.
    scope: Vec<String>,
}

impl ExpressionParser {
    fn new(text: &str, limit: u32, option_kind: QueryOptionKind) -> Result<Self> {
        Ok(ExpressionParser {
            lexemes: tokenize(text)?,
            pos: 0,
            source_len: text.len(),
            depth: 0,
            limit,
            option_kind,
            scope: vec!["$it".to_string()],
        })
    }

    // ---- lexeme cursor -----------------------------------------------------

    fn peek(&self) -> Option<&LexKind> {
        self.lexemes.get(self.pos).map(|l| &l.kind)
    }

    fn peek_identifier(&self) -> Option<&str> {
        match self.peek() {
            Some(LexKind::Identifier(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    fn position(&self) -> usize {
        self.lexemes
            .get(self.pos)
            .map_or(self.source_len, |l| l.position)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, kind: &LexKind) -> bool {
        if self.peek() == Some(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &LexKind, what: &str) -> Result<()> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(UriqError::SyntaxError {
                position: self.position(),
                message: format!("expected {what}"),
            })
        }
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos == self.lexemes.len() {
            Ok(())
        } else {
            Err(UriqError::SyntaxError {
                position: self.position(),
                message: "unexpected trailing input".to_string(),
            })
        }
    }

    /// Consumes the next lexeme if it is the given operator keyword.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_identifier() == Some(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ---- recursion accounting ----------------------------------------------

    fn recurse_enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limit {
            return Err(UriqError::RecursionLimitExceeded {
                option_kind: self.option_kind,
                limit: self.limit,
            });
        }
        Ok(())
    }

    fn recurse_leave(&mut self) {
        self.depth -= 1;
    }

    // ---- grammar -----------------------------------------------------------

    /// Entry point for one sub-expression; counts one recursion level.
    fn parse_expression(&mut self) -> Result<QueryToken> {
        self.recurse_enter()?;
        let result = self.parse_or();
        self.recurse_leave();
        result
    }

    fn parse_or(&mut self) -> Result<QueryToken> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = QueryToken::binary(BinaryOperatorKind::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<QueryToken> {
        let mut left = self.parse_comparison()?;
        while self.eat_keyword("and") {
            let right = self.parse_comparison()?;
            left = QueryToken::binary(BinaryOperatorKind::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<QueryToken> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_identifier() {
                Some("eq") => BinaryOperatorKind::Equal,
                Some("ne") => BinaryOperatorKind::NotEqual,
                Some("gt") => BinaryOperatorKind::GreaterThan,
                Some("ge") => BinaryOperatorKind::GreaterThanOrEqual,
                Some("lt") => BinaryOperatorKind::LessThan,
                Some("le") => BinaryOperatorKind::LessThanOrEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = QueryToken::binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<QueryToken> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_identifier() {
                Some("add") => BinaryOperatorKind::Add,
                Some("sub") => BinaryOperatorKind::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = QueryToken::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<QueryToken> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_identifier() {
                Some("mul") => BinaryOperatorKind::Multiply,
                Some("div") => BinaryOperatorKind::Divide,
                Some("mod") => BinaryOperatorKind::Modulo,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = QueryToken::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<QueryToken> {
        if self.eat_keyword("not") {
            let operand = self.parse_unary()?;
            return Ok(QueryToken::unary(UnaryOperatorKind::Not, operand));
        }
        if self.eat(&LexKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(QueryToken::unary(UnaryOperatorKind::Negate, operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<QueryToken> {
        match self.peek().cloned() {
            Some(LexKind::OpenParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&LexKind::CloseParen, "')'")?;
                Ok(inner)
            }
            Some(LexKind::Literal { text, value }) => {
                self.advance();
                Ok(QueryToken::literal(text, value))
            }
            Some(LexKind::Identifier(name)) => match name.as_str() {
                "true" => {
                    self.advance();
                    Ok(QueryToken::literal("true", PrimitiveValue::Boolean(true)))
                }
                "false" => {
                    self.advance();
                    Ok(QueryToken::literal("false", PrimitiveValue::Boolean(false)))
                }
                "null" => {
                    self.advance();
                    Ok(QueryToken::literal("null", PrimitiveValue::Null))
                }
                _ => self.parse_path_or_call(),
            },
            _ => Err(UriqError::SyntaxError {
                position: self.position(),
                message: "expected an expression".to_string(),
            }),
        }
    }

    /// Parses an identifier path, a function call, or a lambda hanging off a
    /// path. Segments accumulate until a `(` decides the shape.
    fn parse_path_or_call(&mut self) -> Result<QueryToken> {
        let mut segments: Vec<String> = Vec::new();
        loop {
            let Some(name) = self.peek_identifier().map(str::to_string) else {
                return Err(UriqError::SyntaxError {
                    position: self.position(),
                    message: "expected a path segment".to_string(),
                });
            };
            self.advance();

            if self.peek() == Some(&LexKind::OpenParen) {
                if let Some(kind) = lambda_kind(&name) {
                    let parent = self.build_path(segments, true)?;
                    return self.parse_lambda(kind, parent);
                }
                if segments.is_empty() {
                    return self.parse_function_call(name);
                }
                return Err(UriqError::SyntaxError {
                    position: self.position(),
                    message: format!("unexpected '(' after path segment '{name}'"),
                });
            }

            segments.push(name);
            if !self.eat(&LexKind::Slash) {
                return self.build_path(segments, false);
            }
        }
    }

    /// Builds an `EndPath`/`InnerPath`/`DottedIdentifier` chain out of raw
    /// segments. The first segment may name a range variable in scope, which
    /// becomes the chain's root; otherwise the chain is rooted at the
    /// implicit range variable (None parent).
    fn build_path(&self, segments: Vec<String>, as_lambda_parent: bool) -> Result<QueryToken> {
        let mut iter = segments.into_iter().peekable();
        let mut parent: Option<QueryToken> = None;

        if let Some(first) = iter.peek() {
            if self.scope.iter().any(|v| v == first) {
                let name = iter.next().unwrap_or_default();
                parent = Some(QueryToken::RangeVariable { name });
            }
        }

        let mut remaining: Vec<String> = iter.collect();
        let Some(last) = remaining.pop() else {
            // A bare range variable reference, or an empty lambda parent.
            return parent.ok_or_else(|| UriqError::SyntaxError {
                position: self.position(),
                message: if as_lambda_parent {
                    "lambda requires a collection path".to_string()
                } else {
                    "expected a path segment".to_string()
                },
            });
        };

        for segment in remaining {
            parent = Some(if segment.contains('.') {
                QueryToken::DottedIdentifier {
                    name: segment,
                    parent: parent.map(Box::new),
                }
            } else {
                QueryToken::inner_path(segment, parent)
            });
        }

        Ok(if last.contains('.') {
            QueryToken::DottedIdentifier {
                name: last,
                parent: parent.map(Box::new),
            }
        } else {
            QueryToken::end_path(last, parent)
        })
    }

    /// Parses `any(...)` / `all(...)` after the parent path. The declared
    /// parameter is in scope only while the body is parsed.
    fn parse_lambda(&mut self, kind: LambdaKind, parent: QueryToken) -> Result<QueryToken> {
        self.expect(&LexKind::OpenParen, "'('")?;

        // Parameterless `any()` means "collection is non-empty".
        if self.eat(&LexKind::CloseParen) {
            return Ok(QueryToken::Lambda {
                kind,
                parent: Box::new(parent),
                parameter: None,
                body: Box::new(QueryToken::literal("true", PrimitiveValue::Boolean(true))),
            });
        }

        let Some(parameter) = self.peek_identifier().map(str::to_string) else {
            return Err(UriqError::SyntaxError {
                position: self.position(),
                message: "expected a lambda parameter name".to_string(),
            });
        };
        self.advance();
        self.expect(&LexKind::Colon, "':'")?;

        self.scope.push(parameter.clone());
        let body = self.parse_expression();
        self.scope.pop();
        let body = body?;

        self.expect(&LexKind::CloseParen, "')'")?;
        Ok(QueryToken::Lambda {
            kind,
            parent: Box::new(parent),
            parameter: Some(parameter),
            body: Box::new(body),
        })
    }

    /// Parses the argument list of a function call. Each argument re-enters
    /// the expression grammar and is wrapped in a `FunctionParameter` token.
    fn parse_function_call(&mut self, name: String) -> Result<QueryToken> {
        self.expect(&LexKind::OpenParen, "'('")?;
        let mut arguments = Vec::new();
        if !self.eat(&LexKind::CloseParen) {
            loop {
                let value = self.parse_expression()?;
                arguments.push(QueryToken::FunctionParameter {
                    name: None,
                    value: Box::new(value),
                });
                if self.eat(&LexKind::Comma) {
                    continue;
                }
                self.expect(&LexKind::CloseParen, "')' or ','")?;
                break;
            }
        }
        Ok(QueryToken::FunctionCall { name, arguments })
    }
}

fn lambda_kind(name: &str) -> Option<LambdaKind> {
    match name {
        "any" => Some(LambdaKind::Any),
        "all" => Some(LambdaKind::All),
        _ => None,
    }
}
