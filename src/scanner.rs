use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use substring::Substring;

use crate::error::{Error, ScanError};
use crate::literal::Literal;
use crate::token::{Token, Type};

/// Converts source text into a token stream, one character at a time.
/// `start`/`current` are char indices into `source`, not byte offsets;
/// lexemes are sliced out with `substring` so multi-byte UTF-8 content in
/// comments or strings never panics a byte-indexed slice.
pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner { source, chars: source.chars().peekmore(), tokens: vec![], start: 0, current: 0, line: 1 }
    }

    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, self.line));
        std::mem::take(&mut self.tokens)
    }

    fn advance(&mut self) -> char {
        let c = self.chars.next().expect("advance called at end of source");
        self.current += 1;
        c
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_next(&mut self) -> Option<char> {
        self.chars.peek_next().copied()
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> String {
        self.source.substring(self.start, self.current).to_string()
    }

    fn add_token(&mut self, r#type: Type, literal: Option<Literal>) {
        self.tokens.push(Token::new(r#type, self.lexeme(), literal, self.line));
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn string(&mut self) {
        let start_line = self.line;

        while self.peek().is_some_and(|c| c != '"') {
            if self.peek() == Some('\n') {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            ScanError { line: start_line, message: "Unterminated string.".to_string() }.throw();
            return;
        }

        self.advance(); // closing quote

        let value = self.source.substring(self.start + 1, self.current - 1).to_string();
        self.add_token(Type::String, Some(Literal::String(value)));
    }

    fn number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // consume the '.'
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let value: f64 = self.lexeme().parse().expect("scanned digits to form a valid number");
        self.add_token(Type::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let token_type = match self.lexeme().as_str() {
            "and" => Type::And,
            "class" => Type::Class,
            "else" => Type::Else,
            "false" => Type::False,
            "for" => Type::For,
            "fun" => Type::Fun,
            "if" => Type::If,
            "nil" => Type::Nil,
            "or" => Type::Or,
            "print" => Type::Print,
            "return" => Type::Return,
            "super" => Type::Super,
            "this" => Type::This,
            "true" => Type::True,
            "var" => Type::Var,
            "while" => Type::While,
            _ => Type::Identifier,
        };

        self.add_token(token_type, None);
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            '(' => self.add_token(Type::LeftParen, None),
            ')' => self.add_token(Type::RightParen, None),
            '{' => self.add_token(Type::LeftBrace, None),
            '}' => self.add_token(Type::RightBrace, None),
            ',' => self.add_token(Type::Comma, None),
            '.' => self.add_token(Type::Dot, None),
            '-' => self.add_token(Type::Minus, None),
            '+' => self.add_token(Type::Plus, None),
            ';' => self.add_token(Type::Semicolon, None),
            '*' => self.add_token(Type::Star, None),

            '!' => {
                let r#type = if self.match_next('=') { Type::BangEqual } else { Type::Bang };
                self.add_token(r#type, None);
            }
            '=' => {
                let r#type = if self.match_next('=') { Type::EqualEqual } else { Type::Equal };
                self.add_token(r#type, None);
            }
            '<' => {
                let r#type = if self.match_next('=') { Type::LessEqual } else { Type::Less };
                self.add_token(r#type, None);
            }
            '>' => {
                let r#type = if self.match_next('=') { Type::GreaterEqual } else { Type::Greater };
                self.add_token(r#type, None);
            }
            '/' => {
                if self.match_next('/') {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                } else {
                    self.add_token(Type::Slash, None);
                }
            }

            ' ' | '\r' | '\t' => {}
            '\n' => self.line += 1,

            '"' => self.string(),

            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => {
                ScanError { line: self.line, message: "Unexpected character.".to_string() }.throw();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(source: &str) -> Vec<Type> {
        Scanner::new(source).scan_tokens().into_iter().map(|t| t.r#type).collect()
    }

    #[test]
    fn scans_two_char_operators_greedily() {
        assert_eq!(kinds("<= == != >="), vec![
            Type::LessEqual,
            Type::EqualEqual,
            Type::BangEqual,
            Type::GreaterEqual,
            Type::EOF,
        ]);
    }

    #[test]
    fn line_comment_is_discarded() {
        assert_eq!(kinds("1 // comment\n2"), vec![Type::Number, Type::Number, Type::EOF]);
    }

    #[test]
    fn string_literal_carries_unquoted_value() {
        let tokens = Scanner::new("\"hi\"").scan_tokens();
        assert_eq!(tokens[0].literal, Some(Literal::String("hi".to_string())));
    }

    #[test]
    fn number_literal_parses_to_f64() {
        let tokens = Scanner::new("3.25").scan_tokens();
        assert_eq!(tokens[0].literal, Some(Literal::Number(3.25)));
    }

    #[test]
    fn keyword_nil_is_recognized_and_null_is_not_a_keyword() {
        assert_eq!(kinds("nil"), vec![Type::Nil, Type::EOF]);
        assert_eq!(kinds("null"), vec![Type::Identifier, Type::EOF]);
    }

    #[test]
    fn newline_increments_line_for_subsequent_tokens() {
        let tokens = Scanner::new("1\n2").scan_tokens();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }
}
