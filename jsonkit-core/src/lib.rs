//! JSON Value Engine
//!
//! In-memory JSON trees with shared-ownership handles, a hand-written
//! tokenizer and push-down parser, a canonical writer, and a codec
//! framework mapping application types to and from JSON values.
//!
//! # Architecture
//!
//! - **value.rs** - Shared-ownership value tree, structural ordering
//! - **lex.rs** - Character classification, tokenizer state machine
//! - **parse.rs** - Push-down parser, builder contract, tree builder
//! - **write.rs** - Mirror writer state machine, canonical stringify
//! - **codec.rs** - Encode/Decode traits, codec registry, object codecs
//! - **error.rs** - The error taxonomy shared by all stages
//!
//! Data flows text -> tokens -> tree -> text; the codec layer sits
//! beside the tree.

pub mod codec;
pub mod error;
pub mod lex;
pub mod parse;
pub mod value;
pub mod write;

pub use codec::{Codec, Decode, Either, Encode, ObjectCodec, Serializer};
pub use error::{Error, ErrorKind};
pub use lex::{classify, tokenize, CharCategory, Token, TokenBuffer, TokenKind, TokenSink, Tokenizer, TokenizerState};
pub use parse::{parse, parse_with_max_depth, JsonBuilder, ParserMachine, ParserState, Scalar, TreeBuilder, DEFAULT_MAX_DEPTH};
pub use value::{compare, JsonType, Value};
pub use write::{stringify, stringify_with, JsonWriter, StringifyOptions, WriterState};
