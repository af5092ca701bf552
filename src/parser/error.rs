use thiserror::Error;

/// Front-end failure. There is no recovery: the first one ends the parse.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line}: unexpected character `{ch}`")]
    UnexpectedChar { ch: char, line: usize },

    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    #[error("line {line}: number `{text}` is out of range")]
    NumberOutOfRange { text: String, line: usize },

    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },
}
