use crate::io::reaction_parse::token::Token;

use indexmap::IndexMap;
use thiserror::Error;
/*
Reaction Grammar:
reaction   -> side? direction side? bounds? objective? EOF ;
side       -> compound ( "+" compound )* ;
compound   -> NUMBER? IDENTIFIER ;
direction  -> "-->" | "<->" ;
bounds     -> "[" signed? "," signed? "]" ;
signed     -> "-"? NUMBER ;
objective  -> "@" NUMBER ;

e.g. 1 pep_c + 1.5 adp_c <-> pyr_c + 2.0 atp_m [-1000, 1000] @1
 */

/// Result of parsing a reaction string
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReaction {
    /// True iff the direction arrow was `<->`
    pub reversible: bool,
    /// Net signed stoichiometry keyed by metabolite token, in order of first appearance
    pub stoichiometry: IndexMap<String, f64>,
    /// Optional lower flux bound from a `[lb, ub]` suffix
    pub lower_bound: Option<f64>,
    /// Optional upper flux bound from a `[lb, ub]` suffix
    pub upper_bound: Option<f64>,
    /// Optional objective coefficient from an `@coef` suffix
    pub objective_coefficient: Option<f64>,
}

/// Reaction Parser
pub struct ReactionParser {
    /// Vector of tokens from the reaction string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
}

impl ReactionParser {
    /// Create a new ReactionParser
    pub fn new(tokens: Vec<Token>) -> ReactionParser {
        ReactionParser { tokens, current: 0 }
    }

    // region Parsing Functions

    /// Parse the token vector into a [`ParsedReaction`]
    pub fn parse(&mut self) -> Result<ParsedReaction, ParseError> {
        let mut stoichiometry: IndexMap<String, f64> = IndexMap::new();

        self.side(&mut stoichiometry, -1.0)?;
        let reversible = if self.match_token(&[Token::Reversible]) {
            true
        } else if self.match_token(&[Token::Irreversible]) {
            false
        } else {
            return Err(ParseError::MissingDirection);
        };
        self.side(&mut stoichiometry, 1.0)?;

        let (lower_bound, upper_bound) = if self.match_token(&[Token::LeftBracket]) {
            self.bounds()?
        } else {
            (None, None)
        };

        let objective_coefficient = if self.match_token(&[Token::At]) {
            Some(self.consume_number("Expect objective coefficient after '@'.")?)
        } else {
            None
        };

        if !self.is_at_end() {
            // Anything left over means the string did not follow the grammar
            return Err(ParseError::EarlyTermination(format!("{:?}", self.peek())));
        }

        Ok(ParsedReaction {
            reversible,
            stoichiometry,
            lower_bound,
            upper_bound,
            objective_coefficient,
        })
    }

    /// Parse one side of the reaction, adding `sign * coefficient` for every compound
    fn side(&mut self, stoichiometry: &mut IndexMap<String, f64>, sign: f64) -> Result<(), ParseError> {
        if !self.starts_compound() {
            // Empty side, e.g. exchange reactions
            return Ok(());
        }
        loop {
            let (coefficient, metabolite) = self.compound()?;
            *stoichiometry.entry(metabolite).or_insert(0.0) += sign * coefficient;
            if !self.match_token(&[Token::Plus]) {
                return Ok(());
            }
        }
    }

    fn compound(&mut self) -> Result<(f64, String), ParseError> {
        let coefficient = self.match_number().unwrap_or(1.0);
        match self.match_identifier() {
            Some(metabolite) => Ok((coefficient, metabolite)),
            None => Err(ParseError::ExpectedMetabolite(format!("{:?}", self.peek()))),
        }
    }

    fn bounds(&mut self) -> Result<(Option<f64>, Option<f64>), ParseError> {
        let lower_bound = self.signed_number()?;
        self.consume(Token::Comma, "Expect ',' between bounds.")?;
        let upper_bound = self.signed_number()?;
        self.consume(Token::RightBracket, "Expect ']' after bounds.")?;
        Ok((lower_bound, upper_bound))
    }

    fn signed_number(&mut self) -> Result<Option<f64>, ParseError> {
        if self.match_token(&[Token::Minus]) {
            let value = self.consume_number("Expect number after '-'.")?;
            return Ok(Some(-value));
        }
        Ok(self.match_number())
    }

    // endregion Parsing Functions

    // region parsing helper functions

    fn starts_compound(&self) -> bool {
        matches!(self.peek(), Token::Number(_) | Token::Identifier(_))
    }

    /// Check whether the token at the current position matches one of the provided `tokens`,
    /// if it does advance [`self.current`] and return true, otherwise return false
    fn match_token(&mut self, tokens: &[Token]) -> bool {
        for t in tokens {
            if self.check(t) {
                self.advance();
                return true;
            }
        }
        false
    }

    /// If the current token is a number return it and advance
    fn match_number(&mut self) -> Option<f64> {
        if let &Token::Number(value) = self.peek() {
            self.advance();
            return Some(value);
        }
        None
    }

    /// If the current token is an identifier return it and advance
    fn match_identifier(&mut self) -> Option<String> {
        if let Token::Identifier(id) = self.peek() {
            let id = id.clone();
            self.advance();
            return Some(id);
        }
        None
    }

    fn consume_number(&mut self, msg: &str) -> Result<f64, ParseError> {
        self.match_number()
            .ok_or_else(|| ParseError::MissingToken(msg.to_string()))
    }

    /// Check whether the current token matches the provided `token`
    fn check(&self, token: &Token) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek() == token
    }

    /// Advance `self.current` one position unless at end of the token Vec
    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    /// Check whether the parser is at the end of the source Vec
    fn is_at_end(&self) -> bool {
        *self.peek() == Token::Eof
    }

    /// Get the current token
    fn peek(&self) -> &Token {
        // The lexer always terminates the vector with Eof
        self.tokens.get(self.current).unwrap_or(&Token::Eof)
    }

    /// Check whether the current token matches an input token, if it matches advance to the
    /// next token, and if it doesn't return an error.
    fn consume(&mut self, token: Token, msg: &str) -> Result<(), ParseError> {
        if self.check(&token) {
            self.advance();
            return Ok(());
        }
        Err(ParseError::MissingToken(msg.to_string()))
    }

    // endregion parsing helper functions
}

/// Enum representing possible parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    /// Neither `<->` nor `-->` separates substrates from products
    #[error("No direction arrow found, expected `<->` or `-->`")]
    MissingDirection,
    /// A coefficient or `+` was not followed by a metabolite id
    #[error("Expected a metabolite id, found {0}")]
    ExpectedMetabolite(String),
    /// Missing expected token (e.g. a closing bracket)
    #[error("Missing expected token: {0}")]
    MissingToken(String),
    /// Tokens remained after a complete reaction was parsed
    #[error("Unexpected {0} after the end of the reaction")]
    EarlyTermination(String),
}
