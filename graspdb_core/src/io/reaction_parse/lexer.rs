//! Lex a reaction string into a series of tokens for later parsing

use thiserror::Error;

use crate::io::reaction_parse::token::Token;

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the whole source into tokens, terminated by [`Token::Eof`]
    pub fn lex(&mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens.push(Token::Eof);
        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c: char = self.advance();
        match c {
            // Single Character Tokens
            '+' => self.add_token(Token::Plus),
            '[' => self.add_token(Token::LeftBracket),
            ']' => self.add_token(Token::RightBracket),
            ',' => self.add_token(Token::Comma),
            '@' => self.add_token(Token::At),
            // Arrows
            '<' => {
                if self.peek() == '-' && self.peek_next() == '>' {
                    self.current += 2;
                    self.add_token(Token::Reversible);
                } else {
                    return Err(LexerError::MalformedArrow {
                        position: self.start,
                    });
                }
            }
            '-' => {
                if self.peek() == '-' && self.peek_next() == '>' {
                    self.current += 2;
                    self.add_token(Token::Irreversible);
                } else {
                    self.add_token(Token::Minus);
                }
            }
            // Coefficients and bounds
            '0'..='9' | '.' => self.read_number()?,
            // Whitespace
            c if c.is_whitespace() => {}
            // Metabolite identifiers
            c if c.is_alphabetic() => self.read_identifier(),
            character => {
                return Err(LexerError::InvalidCharacter {
                    character,
                    position: self.start,
                })
            }
        };
        Ok(())
    }

    fn read_number(&mut self) -> Result<(), LexerError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.source[self.start] != '.' && self.peek() == '.' {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        // Only treat `e` as an exponent marker when digits follow it
        if matches!(self.peek(), 'e' | 'E') {
            let after_marker = self.peek_next();
            let signed_digit = matches!(after_marker, '+' | '-')
                && self
                    .source
                    .get(self.current + 2)
                    .is_some_and(|c| c.is_ascii_digit());
            if after_marker.is_ascii_digit() || signed_digit {
                self.advance();
                if matches!(self.peek(), '+' | '-') {
                    self.advance();
                }
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        if Lexer::is_word_character(self.peek()) {
            // Ids such as `3pg_c` or `13dpg_c` start with digits
            if text.chars().all(Lexer::is_word_character) {
                self.read_identifier();
                return Ok(());
            }
            // A coefficient has to be separated from its metabolite by whitespace
            return Err(LexerError::MissingCoefficientSeparator {
                position: self.current,
            });
        }
        let value: f64 = text
            .parse()
            .map_err(|_| LexerError::InvalidNumber { text: text.clone() })?;
        self.add_token(Token::Number(value));
        Ok(())
    }

    fn read_identifier(&mut self) {
        while Lexer::is_word_character(self.peek()) {
            self.advance();
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        self.add_token(Token::Identifier(text));
    }

    fn is_word_character(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

/// Enum representing possible lexing errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexerError {
    /// A character that can't start any token
    #[error("Unexpected character `{character}` at position {position}")]
    InvalidCharacter { character: char, position: usize },
    /// `<` not followed by `->`
    #[error("Malformed direction arrow at position {position}, expected `<->` or `-->`")]
    MalformedArrow { position: usize },
    /// Digits that don't form a number
    #[error("Unable to read `{text}` as a number")]
    InvalidNumber { text: String },
    /// A decimal coefficient running straight into a metabolite id, e.g. `2.0atp_c`
    #[error("Coefficient must be followed by whitespace (position {position})")]
    MissingCoefficientSeparator { position: usize },
}

#[cfg(test)]
mod tests {
    use crate::io::reaction_parse::lexer::{Lexer, LexerError};
    use crate::io::reaction_parse::token::Token;

    #[test]
    fn test_single_compound() {
        let mut lexer = Lexer::new("pep_c");
        let tokens = match lexer.lex() {
            Ok(t) => t,
            Err(_) => panic!("Failed to lex during test"),
        };
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::Identifier(String::from("pep_c")));
    }

    #[test]
    fn test_reaction() {
        let mut lexer = Lexer::new("1 pep_c + 1.5 adp_c <-> pyr_c");
        let tokens = lexer.lex().unwrap();
        let expected_tokens = vec![
            Token::Number(1.0),
            Token::Identifier(String::from("pep_c")),
            Token::Plus,
            Token::Number(1.5),
            Token::Identifier(String::from("adp_c")),
            Token::Reversible,
            Token::Identifier(String::from("pyr_c")),
            Token::Eof,
        ];
        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    fn test_bounds_and_objective() {
        let mut lexer = Lexer::new("a_c --> b_c [-1000, 1e3] @1");
        let tokens = lexer.lex().unwrap();
        let expected_tokens = vec![
            Token::Identifier(String::from("a_c")),
            Token::Irreversible,
            Token::Identifier(String::from("b_c")),
            Token::LeftBracket,
            Token::Minus,
            Token::Number(1000.0),
            Token::Comma,
            Token::Number(1000.0),
            Token::RightBracket,
            Token::At,
            Token::Number(1.0),
            Token::Eof,
        ];
        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    fn test_scientific_coefficient() {
        let mut lexer = Lexer::new("2.5e-3 h_c");
        let tokens = lexer.lex().unwrap();
        assert_eq!(tokens[0], Token::Number(2.5e-3));
    }

    #[test]
    fn test_glued_coefficient() {
        let mut lexer = Lexer::new("2.0atp_c <-> adp_c");
        match lexer.lex() {
            Err(LexerError::MissingCoefficientSeparator { position }) => assert_eq!(position, 3),
            other => panic!("Unexpected lex result {:?}", other),
        }
        let mut lexer = Lexer::new("1e-3h_c <-> adp_c");
        match lexer.lex() {
            Err(LexerError::MissingCoefficientSeparator { .. }) => {}
            other => panic!("Unexpected lex result {:?}", other),
        }
    }

    #[test]
    fn test_digit_leading_identifier() {
        let mut lexer = Lexer::new("1.0 g6p_c <-> 13dpg_c + 2 3pg_c");
        let tokens = lexer.lex().unwrap();
        let expected_tokens = vec![
            Token::Number(1.0),
            Token::Identifier(String::from("g6p_c")),
            Token::Reversible,
            Token::Identifier(String::from("13dpg_c")),
            Token::Plus,
            Token::Number(2.0),
            Token::Identifier(String::from("3pg_c")),
            Token::Eof,
        ];
        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    fn test_broken_arrow() {
        let mut lexer = Lexer::new("a_c <- b_c");
        match lexer.lex() {
            Err(LexerError::MalformedArrow { position }) => assert_eq!(position, 4),
            other => panic!("Unexpected lex result {:?}", other),
        }
    }
}
