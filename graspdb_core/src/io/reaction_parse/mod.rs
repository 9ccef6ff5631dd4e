//! Module for parsing reaction strings into signed stoichiometry, and for writing them back

use crate::io::reaction_parse::lexer::LexerError;
use crate::io::reaction_parse::parser::{ParseError, ReactionParser};
use indexmap::IndexMap;
use thiserror::Error;

mod lexer;
pub mod parser;
mod token;

pub use parser::ParsedReaction;

/// Parse a reaction string into its direction and signed stoichiometry
///
/// # Parameters
/// - `input`: &str such as `"1 pep_c + 1.5 adp_c <-> pyr_c + 2.0 atp_m"`
///
/// # Returns
/// Parse result which is
/// - `Ok`: the [`ParsedReaction`], substrates negative and products positive, with repeated
///     metabolites summed at the position where they first appeared
/// - `Err`: a ReactionParseError carrying the offending string. Nothing is returned for a
///     partially parsed reaction.
///
/// # Examples
/// ```rust
/// use graspdb_core::io::reaction_parse::parse_reaction;
/// let parsed = parse_reaction("a_c <-> 2 b_c").unwrap();
/// assert!(parsed.reversible);
/// assert_eq!(parsed.stoichiometry["a_c"], -1.0);
/// assert_eq!(parsed.stoichiometry["b_c"], 2.0);
/// ```
pub fn parse_reaction(input: &str) -> Result<ParsedReaction, ReactionParseError> {
    // Start by creating a lexer
    let mut lexer = lexer::Lexer::new(input);
    // Convert the reaction string into tokens
    let tokens = lexer
        .lex()
        .map_err(|source| ReactionParseError::LexingError {
            reaction: input.to_string(),
            source,
        })?;

    // Now parse those tokens into the stoichiometry
    let mut parser = ReactionParser::new(tokens);
    parser
        .parse()
        .map_err(|source| ReactionParseError::ParsingError {
            reaction: input.to_string(),
            source,
        })
}

/// Render a stoichiometry map as a reaction string that [`parse_reaction`] reads back.
///
/// Negative entries become substrates and positive entries products, each written as
/// `"|coef| met"` and joined with `" + "`. Zero entries are left out.
pub fn format_reaction(stoichiometry: &IndexMap<String, f64>, reversible: bool) -> String {
    let render = |(met, coef): (&String, &f64)| format!("{} {}", format_coefficient(coef.abs()), met);
    let substrates: Vec<String> = stoichiometry
        .iter()
        .filter(|(_, coef)| **coef < 0.0)
        .map(render)
        .collect();
    let products: Vec<String> = stoichiometry
        .iter()
        .filter(|(_, coef)| **coef > 0.0)
        .map(render)
        .collect();
    let arrow = if reversible { "<->" } else { "-->" };
    format!("{} {} {}", substrates.join(" + "), arrow, products.join(" + "))
}

/// Coefficients always keep a decimal point or exponent (`1.0`, `1.5`, `1e-7`)
pub fn format_coefficient(coefficient: f64) -> String {
    format!("{:?}", coefficient)
}

/// Enum representing possible lex and parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ReactionParseError {
    /// Lexing Error
    #[error("Unable to read reaction `{reaction}`: {source}")]
    LexingError {
        reaction: String,
        #[source]
        source: LexerError,
    },
    /// Parsing Error
    #[error("Invalid reaction `{reaction}`: {source}")]
    ParsingError {
        reaction: String,
        #[source]
        source: ParseError,
    },
}

impl ReactionParseError {
    /// The reaction string that failed to parse
    pub fn reaction(&self) -> &str {
        match self {
            ReactionParseError::LexingError { reaction, .. } => reaction,
            ReactionParseError::ParsingError { reaction, .. } => reaction,
        }
    }
}
