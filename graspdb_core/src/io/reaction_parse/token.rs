//! Module providing Token struct for lexing reaction strings

/// Represents Tokens in a reaction string
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    /// Unsigned decimal, optionally in scientific notation
    Number(f64),
    /// Metabolite token such as `pep_c`
    Identifier(String),
    Plus,
    Minus,
    /// `<->`
    Reversible,
    /// `-->`
    Irreversible,
    LeftBracket,
    RightBracket,
    Comma,
    At,
    Eof,
}
