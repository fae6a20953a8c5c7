use crate::algebra::{BinaryOperation, Expression, Parameter};
use std::{
    fmt::{self, Display, Formatter},
    iter::Peekable,
    ops::Range,
    str::FromStr,
};

/// Parse an [`Expression`] tree from some text.
pub fn parse(s: &str) -> Result<Expression, ParseError> {
    Parser::new(s).parse()
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

/// A simple recursive descent parser (`LL(1)`) for converting a string into an
/// expression tree.
///
/// The grammar:
///
/// ```text
/// expression     := term (("+" | "-") term)*
///
/// term           := unary (("*" | "/") unary)*
///
/// unary          := "-" unary
///                 | "+" unary
///                 | power
///
/// power          := factor ("**" | "^") unary
///                 | factor
///
/// factor         := variable_or_function_call
///                 | "(" expression ")"
///                 | NUMBER
///
/// variable_or_function_call = IDENTIFIER "(" arguments ")"
///                           | IDENTIFIER
///
/// arguments      := expression ("," expression)*
/// ```
///
/// Exponentiation is right associative and binds tighter than negation, so
/// `-x**2` is `-(x**2)` and `2**3**2` is `2**(3**2)`.
#[derive(Debug, Clone)]
pub(crate) struct Parser<'a> {
    tokens: Peekable<Tokens<'a>>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Parser {
            tokens: Tokens::new(src).peekable(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Expression, ParseError> {
        let expr = self.expression()?;

        match self.tokens.next() {
            None => Ok(expr),
            Some(Ok(token)) => Err(ParseError::TrailingInput {
                found: token.kind,
                span: token.span,
            }),
            Some(Err(e)) => Err(e),
        }
    }

    fn peek(&mut self) -> Option<TokenKind> {
        self.tokens
            .peek()
            .and_then(|result| result.as_ref().ok())
            .map(|tok| tok.kind)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        match self.tokens.next() {
            Some(result) => result,
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let left = self.term()?;

        self.then_right_parts_of_binary_op(
            left,
            &[TokenKind::Plus, TokenKind::Minus],
            |p| p.term(),
        )
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let left = self.unary()?;

        self.then_right_parts_of_binary_op(
            left,
            &[TokenKind::Times, TokenKind::Divide],
            |p| p.unary(),
        )
    }

    /// Keep folding `left op right` into `left` while the next token is one
    /// of the `expected` operators, giving left associativity.
    fn then_right_parts_of_binary_op<F>(
        &mut self,
        mut left: Expression,
        expected: &[TokenKind],
        mut then: F,
    ) -> Result<Expression, ParseError>
    where
        F: FnMut(&mut Parser<'a>) -> Result<Expression, ParseError>,
    {
        while let Some(kind) = self.peek() {
            if !expected.contains(&kind) {
                break;
            }

            // skip past the operator
            let _ = self.advance()?;
            // and parse the second bit
            let right = then(self)?;

            left = Expression::Binary {
                left: Box::new(left),
                right: Box::new(right),
                op: kind.as_binary_op(),
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                let _ = self.advance()?;
                let operand = self.unary()?;
                Ok(Expression::Negate(Box::new(operand)))
            },
            Some(TokenKind::Plus) => {
                let _ = self.advance()?;
                self.unary()
            },
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expression, ParseError> {
        let base = self.factor()?;

        if self.peek() == Some(TokenKind::Power) {
            let _ = self.advance()?;
            let exponent = self.unary()?;
            Ok(base.pow(exponent))
        } else {
            Ok(base)
        }
    }

    fn factor(&mut self) -> Result<Expression, ParseError> {
        const EXPECTED: &[TokenKind] = &[
            TokenKind::Number,
            TokenKind::Identifier,
            TokenKind::Minus,
            TokenKind::OpenParen,
        ];

        match self.peek() {
            Some(TokenKind::Number) => {
                return self.number();
            },
            Some(TokenKind::Identifier) => {
                return self.variable_or_function_call()
            },
            Some(TokenKind::OpenParen) => {
                let _ = self.advance()?;
                let expr = self.expression()?;
                self.expect(TokenKind::CloseParen)?;
                return Ok(expr);
            },
            _ => {},
        }

        // we couldn't parse the factor, return a nice error
        match self.tokens.next() {
            Some(Ok(Token { span, kind, .. })) => {
                Err(ParseError::UnexpectedToken {
                    found: kind,
                    expected: EXPECTED,
                    span,
                })
            },
            Some(Err(e)) => Err(e),
            None => Err(ParseError::UnexpectedEndOfInput),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        let token = self.advance()?;

        if token.kind == kind {
            Ok(token)
        } else {
            Err(ParseError::UnexpectedToken {
                found: token.kind,
                span: token.span,
                expected: kind.as_expected(),
            })
        }
    }

    fn variable_or_function_call(&mut self) -> Result<Expression, ParseError> {
        let ident = self.expect(TokenKind::Identifier)?;

        if self.peek() == Some(TokenKind::OpenParen) {
            self.function_call(ident)
        } else {
            Ok(Expression::Parameter(Parameter::named(ident.text)))
        }
    }

    fn function_call(
        &mut self,
        identifier: Token<'a>,
    ) -> Result<Expression, ParseError> {
        self.expect(TokenKind::OpenParen)?;

        let mut arguments = vec![self.expression()?];

        while self.peek() == Some(TokenKind::Comma) {
            let _ = self.advance()?;
            arguments.push(self.expression()?);
        }

        let Token { kind, span, .. } = self.advance()?;

        if kind == TokenKind::CloseParen {
            Ok(Expression::FunctionCall {
                function: identifier.text.into(),
                arguments,
            })
        } else {
            Err(ParseError::UnexpectedToken {
                found: kind,
                span,
                expected: &[TokenKind::Comma, TokenKind::CloseParen],
            })
        }
    }

    fn number(&mut self) -> Result<Expression, ParseError> {
        let token = self.expect(TokenKind::Number)?;

        match token.text.parse() {
            Ok(number) => Ok(Expression::Constant(number)),
            Err(_) => Err(ParseError::InvalidNumber { span: token.span }),
        }
    }
}

/// Possible errors that may occur while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid character {character:?} at index {index}")]
    InvalidCharacter { character: char, index: usize },
    #[error("invalid number at {span:?}")]
    InvalidNumber { span: Range<usize> },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error(
        "found {found} at {span:?} but expected {}",
        DisplayExpected(.expected)
    )]
    UnexpectedToken {
        found: TokenKind,
        span: Range<usize>,
        expected: &'static [TokenKind],
    },
    #[error("unexpected {found} at {span:?} after the end of the expression")]
    TrailingInput { found: TokenKind, span: Range<usize> },
}

struct DisplayExpected<'a>(&'a [TokenKind]);

impl Display for DisplayExpected<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            match i {
                0 => {},
                i if i + 1 == self.0.len() => write!(f, " or ")?,
                _ => write!(f, ", ")?,
            }
            write!(f, "{}", kind)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Tokens<'a> {
    src: &'a str,
    cursor: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self { Tokens { src, cursor: 0 } }

    fn rest(&self) -> &'a str { &self.src[self.cursor..] }

    fn peek(&self) -> Option<char> { self.rest().chars().next() }

    fn peek_nth(&self, n: usize) -> Option<char> { self.rest().chars().nth(n) }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.cursor += c.len_utf8();
        Some(c)
    }

    fn chomp(
        &mut self,
        kind: TokenKind,
        characters: usize,
    ) -> Option<Result<Token<'a>, ParseError>> {
        let start = self.cursor;
        for _ in 0..characters {
            self.advance()?;
        }
        let end = self.cursor;

        Some(Ok(Token::from_text(self.src, start..end, kind)))
    }

    fn take_while<P>(&mut self, mut predicate: P) -> Range<usize>
    where
        P: FnMut(char) -> bool,
    {
        let start = self.cursor;

        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }

            self.advance();
        }

        start..self.cursor
    }

    fn chomp_integer(&mut self) -> Range<usize> {
        self.take_while(|c| c.is_ascii_digit())
    }

    fn chomp_number(&mut self) -> Token<'a> {
        let start = self.cursor;
        self.chomp_integer();

        if self.peek() == Some('.') {
            // skip past the decimal
            self.advance();
            self.chomp_integer();
        }

        // an exponent only counts if there are digits after the "e"
        if let Some('e') | Some('E') = self.peek() {
            let digits_start = match self.peek_nth(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };

            let has_digits = self
                .peek_nth(digits_start)
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false);

            if has_digits {
                for _ in 0..digits_start {
                    self.advance();
                }
                self.chomp_integer();
            }
        }

        let end = self.cursor;

        Token::from_text(self.src, start..end, TokenKind::Number)
    }

    /// Identifiers may contain dots so namespaced names like `np.sin` come
    /// through as a single token.
    fn chomp_identifier(&mut self) -> Token<'a> {
        let mut seen_first_character = false;

        let span = self.take_while(|c| {
            if seen_first_character {
                c.is_alphanumeric() || c == '_' || c == '.'
            } else {
                seen_first_character = true;
                c.is_alphabetic() || c == '_'
            }
        });

        Token::from_text(self.src, span, TokenKind::Identifier)
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            return match self.peek()? {
                space if space.is_whitespace() => {
                    self.advance();
                    continue;
                },
                '(' => self.chomp(TokenKind::OpenParen, 1),
                ')' => self.chomp(TokenKind::CloseParen, 1),
                ',' => self.chomp(TokenKind::Comma, 1),
                '+' => self.chomp(TokenKind::Plus, 1),
                '-' => self.chomp(TokenKind::Minus, 1),
                '*' if self.peek_nth(1) == Some('*') => {
                    self.chomp(TokenKind::Power, 2)
                },
                '*' => self.chomp(TokenKind::Times, 1),
                '/' => self.chomp(TokenKind::Divide, 1),
                '^' => self.chomp(TokenKind::Power, 1),
                '_' | 'a'..='z' | 'A'..='Z' => {
                    Some(Ok(self.chomp_identifier()))
                },
                '0'..='9' => Some(Ok(self.chomp_number())),
                '.' if self
                    .peek_nth(1)
                    .map(|c| c.is_ascii_digit())
                    .unwrap_or(false) =>
                {
                    Some(Ok(self.chomp_number()))
                },
                other => Some(Err(ParseError::InvalidCharacter {
                    character: other,
                    index: self.cursor,
                })),
            };
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Token<'a> {
    text: &'a str,
    span: Range<usize>,
    kind: TokenKind,
}

impl<'a> Token<'a> {
    fn from_text(
        original_source: &'a str,
        span: Range<usize>,
        kind: TokenKind,
    ) -> Self {
        Token {
            text: &original_source[span.clone()],
            span,
            kind,
        }
    }
}

/// The kinds of token that can appear in an [`Expression`]'s text form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    OpenParen,
    CloseParen,
    Comma,
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

impl TokenKind {
    fn as_binary_op(self) -> BinaryOperation {
        match self {
            TokenKind::Plus => BinaryOperation::Plus,
            TokenKind::Minus => BinaryOperation::Minus,
            TokenKind::Times => BinaryOperation::Times,
            TokenKind::Divide => BinaryOperation::Divide,
            TokenKind::Power => BinaryOperation::Power,
            other => unreachable!("{:?} is not a binary op", other),
        }
    }

    fn as_expected(self) -> &'static [TokenKind] {
        match self {
            TokenKind::Identifier => &[TokenKind::Identifier],
            TokenKind::Number => &[TokenKind::Number],
            TokenKind::OpenParen => &[TokenKind::OpenParen],
            TokenKind::CloseParen => &[TokenKind::CloseParen],
            TokenKind::Comma => &[TokenKind::Comma],
            TokenKind::Plus => &[TokenKind::Plus],
            TokenKind::Minus => &[TokenKind::Minus],
            TokenKind::Times => &[TokenKind::Times],
            TokenKind::Divide => &[TokenKind::Divide],
            TokenKind::Power => &[TokenKind::Power],
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let description = match self {
            TokenKind::Identifier => "an identifier",
            TokenKind::Number => "a number",
            TokenKind::OpenParen => "\"(\"",
            TokenKind::CloseParen => "\")\"",
            TokenKind::Comma => "\",\"",
            TokenKind::Plus => "\"+\"",
            TokenKind::Minus => "\"-\"",
            TokenKind::Times => "\"*\"",
            TokenKind::Divide => "\"/\"",
            TokenKind::Power => "\"**\"",
        };

        f.write_str(description)
    }
}

#[cfg(test)]
mod tokenizer_tests {
    use super::*;

    macro_rules! tokenize_test {
        ($name:ident, $src:expr, $should_be:expr) => {
            #[test]
            fn $name() {
                let mut tokens = Tokens::new($src);

                let got = tokens.next().unwrap().unwrap();

                let Range { start, end } = got.span;
                assert_eq!(start, 0);
                assert_eq!(end, $src.len());
                assert_eq!(got.kind, $should_be);

                assert!(
                    tokens.next().is_none(),
                    "{:?} should be empty",
                    tokens
                );
            }
        };
    }

    tokenize_test!(open_paren, "(", TokenKind::OpenParen);
    tokenize_test!(close_paren, ")", TokenKind::CloseParen);
    tokenize_test!(comma, ",", TokenKind::Comma);
    tokenize_test!(plus, "+", TokenKind::Plus);
    tokenize_test!(minus, "-", TokenKind::Minus);
    tokenize_test!(times, "*", TokenKind::Times);
    tokenize_test!(divide, "/", TokenKind::Divide);
    tokenize_test!(double_star, "**", TokenKind::Power);
    tokenize_test!(caret, "^", TokenKind::Power);
    tokenize_test!(single_digit_integer, "3", TokenKind::Number);
    tokenize_test!(multi_digit_integer, "31", TokenKind::Number);
    tokenize_test!(number_with_trailing_dot, "31.", TokenKind::Number);
    tokenize_test!(simple_decimal, "3.14", TokenKind::Number);
    tokenize_test!(leading_dot, ".5", TokenKind::Number);
    tokenize_test!(exponent, "1e10", TokenKind::Number);
    tokenize_test!(negative_exponent, "2.5E-3", TokenKind::Number);
    tokenize_test!(simple_identifier, "x", TokenKind::Identifier);
    tokenize_test!(longer_identifier, "hello", TokenKind::Identifier);
    tokenize_test!(
        identifiers_can_have_underscores,
        "hello_world",
        TokenKind::Identifier
    );
    tokenize_test!(
        identifiers_can_start_with_underscores,
        "_hello_world",
        TokenKind::Identifier
    );
    tokenize_test!(
        identifiers_can_contain_numbers,
        "var5",
        TokenKind::Identifier
    );
    tokenize_test!(namespaced_identifier, "np.sin", TokenKind::Identifier);

    #[test]
    fn exponent_needs_digits() {
        let kinds: Vec<_> = Tokens::new("2e")
            .map(|tok| tok.unwrap().kind)
            .collect();

        assert_eq!(kinds, vec![TokenKind::Number, TokenKind::Identifier]);
    }

    #[test]
    fn reject_unknown_characters() {
        let got: Result<Vec<_>, _> = Tokens::new("x $ 2").collect();

        assert_eq!(
            got.unwrap_err(),
            ParseError::InvalidCharacter {
                character: '$',
                index: 2
            }
        );
    }
}
