//! Error types shared by every stage of the engine.
//!
//! All errors are fail-fast: the operation that detects one aborts
//! immediately and surfaces it to the caller of the top-level entry
//! point (`parse`, `stringify`, `encode`, `decode`). No stage performs
//! local recovery.

use crate::lex::TokenizerState;
use crate::parse::ParserState;
use crate::value::JsonType;
use crate::write::WriterState;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad character input to the tokenizer.
    Lexical,
    /// Bad token sequence in the parser (or writer protocol misuse).
    Syntax,
    /// A `Value` accessed as the wrong variant.
    Type,
    /// A missing object key or out-of-bounds array index.
    Reference,
    /// Encode/decode failure in the codec layer.
    Serialization,
}

/// Any failure the engine can report.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Character outside the accepted input alphabet.
    InvalidCharacter { ch: char },
    /// Character not legal in the tokenizer's current state.
    UnexpectedCharacter { state: TokenizerState, ch: char },
    /// Backslash followed by a character with no escape meaning.
    BadEscape { ch: char },

    /// Token not legal in the parser's current state.
    UnexpectedToken { state: ParserState, kind: crate::lex::TokenKind },
    /// Input ended with an unterminated document.
    UnexpectedEnd,
    /// A second top-level value followed a completed document.
    TrailingContent,
    /// Container nesting exceeded the parser's configured limit.
    DepthLimitExceeded { limit: usize },
    /// Numeric token text that does not fit the target representation.
    InvalidNumber { text: String },
    /// Writer operation invalid in its current state.
    InvalidWriterState { state: WriterState },

    /// Value accessed as a variant it does not hold.
    WrongType { expected: JsonType, actual: JsonType },

    /// Array index past the end (arrays do not auto-extend).
    IndexOutOfBounds { index: usize, len: usize },
    /// Object key required to be present but absent.
    MissingKey { key: String },

    /// Required object-codec field absent from the input.
    MissingField { field: String },
    /// No codec registered and no built-in encoding for the type.
    NoCodec { type_name: &'static str },
    /// A registered codec produced a value of the wrong type.
    CodecMismatch { type_name: &'static str },
    /// Variant `index` field selects no alternative.
    VariantIndexOutOfRange { index: i64 },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCharacter { .. }
            | Error::UnexpectedCharacter { .. }
            | Error::BadEscape { .. } => ErrorKind::Lexical,
            Error::UnexpectedToken { .. }
            | Error::UnexpectedEnd
            | Error::TrailingContent
            | Error::DepthLimitExceeded { .. }
            | Error::InvalidNumber { .. }
            | Error::InvalidWriterState { .. } => ErrorKind::Syntax,
            Error::WrongType { .. } => ErrorKind::Type,
            Error::IndexOutOfBounds { .. } | Error::MissingKey { .. } => ErrorKind::Reference,
            Error::MissingField { .. }
            | Error::NoCodec { .. }
            | Error::CodecMismatch { .. }
            | Error::VariantIndexOutOfRange { .. } => ErrorKind::Serialization,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidCharacter { ch } => {
                write!(f, "invalid character {ch:?}")
            }
            Error::UnexpectedCharacter { state, ch } => {
                write!(f, "invalid character {ch:?} in {state:?} state")
            }
            Error::BadEscape { ch } => write!(f, "cannot unescape character {ch:?}"),
            Error::UnexpectedToken { state, kind } => {
                write!(f, "unexpected {kind:?} token in {state:?} state")
            }
            Error::UnexpectedEnd => write!(f, "unexpected end of input"),
            Error::TrailingContent => write!(f, "trailing content after document"),
            Error::DepthLimitExceeded { limit } => {
                write!(f, "nesting depth limit ({limit}) exceeded")
            }
            Error::InvalidNumber { text } => write!(f, "invalid number {text:?}"),
            Error::InvalidWriterState { state } => {
                write!(f, "writer operation invalid in {state:?} state")
            }
            Error::WrongType { expected, actual } => {
                write!(f, "expected {expected:?} value, got {actual:?}")
            }
            Error::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds (length {len})")
            }
            Error::MissingKey { key } => write!(f, "missing object key {key:?}"),
            Error::MissingField { field } => write!(f, "missing required field {field:?}"),
            Error::NoCodec { type_name } => write!(f, "no codec for type {type_name}"),
            Error::CodecMismatch { type_name } => {
                write!(f, "codec registered for type {type_name} produced a foreign value")
            }
            Error::VariantIndexOutOfRange { index } => {
                write!(f, "variant index {index} out of range")
            }
        }
    }
}

impl std::error::Error for Error {}
