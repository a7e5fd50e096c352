//! Character classification and the lexical state machine.
//!
//! The tokenizer consumes one character at a time and appends tokens to
//! a [`TokenSink`]. There is no lookahead buffer: when a terminator
//! closes a pending identifier or number, the token is produced and the
//! terminator is re-dispatched through the `Idle` state in the same
//! step. Errors are fatal; a tokenizer that reported one must be
//! discarded and restarted on fresh input.

use unicode_xid::UnicodeXID;

use crate::error::Error;

/// Lexical category of a single input character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharCategory {
    Space,
    NewLine,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dot,
    Underscore,
    Letter,
    Digit,
    PlusSign,
    MinusSign,
    /// `e` or `E`.
    ExponentMarker,
    SingleQuote,
    DoubleQuote,
    /// Backslash.
    Escape,
    Other,
    /// Outside the accepted alphabet; always aborts tokenization.
    Invalid,
}

/// Classify one character. Pure and total.
///
/// ASCII covers the whole JSON alphabet; beyond it, identifier-class
/// characters (per Unicode XID) count as letters so unquoted keys may
/// be Unicode identifiers, and anything else is `Other` (only legal
/// inside string literals). Control characters other than `\t`, `\n`,
/// `\r` are `Invalid`.
pub fn classify(c: char) -> CharCategory {
    match c {
        ' ' | '\t' => CharCategory::Space,
        '\n' | '\r' => CharCategory::NewLine,
        '{' => CharCategory::LBrace,
        '}' => CharCategory::RBrace,
        '[' => CharCategory::LBracket,
        ']' => CharCategory::RBracket,
        ':' => CharCategory::Colon,
        ',' => CharCategory::Comma,
        '.' => CharCategory::Dot,
        '_' => CharCategory::Underscore,
        '+' => CharCategory::PlusSign,
        '-' => CharCategory::MinusSign,
        'e' | 'E' => CharCategory::ExponentMarker,
        '\'' => CharCategory::SingleQuote,
        '"' => CharCategory::DoubleQuote,
        '\\' => CharCategory::Escape,
        '0'..='9' => CharCategory::Digit,
        'a'..='z' | 'A'..='Z' => CharCategory::Letter,
        c if c.is_control() => CharCategory::Invalid,
        c if !c.is_ascii() && (c.is_xid_start() || c.is_xid_continue()) => CharCategory::Letter,
        _ => CharCategory::Other,
    }
}

/// Kind of a produced token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted word; usable as an object key.
    Identifier,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Null,
    True,
    False,
    Integer,
    Number,
    /// Quoted string; `text` keeps the surrounding quotes verbatim.
    StringLiteral,
}

/// The reserved words, matched case-sensitively against completed
/// identifiers.
static LITERALS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "null" => TokenKind::Null,
};

/// A token with its raw text. Punctuation tokens carry empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Token {
        Token { kind, text: text.into() }
    }

    /// A token with empty text.
    pub fn bare(kind: TokenKind) -> Token {
        Token { kind, text: String::new() }
    }
}

/// Tokenizer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizerState {
    Idle,
    Identifier,
    NumberSign,
    Number,
    Decimals,
    ExponentMarked,
    ExponentSign,
    Exponent,
    SingleQuoteString,
    DoubleQuoteString,
    SingleQuoteEscape,
    DoubleQuoteEscape,
}

/// Receives tokens as the tokenizer completes them.
pub trait TokenSink {
    fn produce(&mut self, token: Token);
}

/// Default sink: an append-only token vector.
#[derive(Debug, Default)]
pub struct TokenBuffer {
    pub tokens: Vec<Token>,
}

impl TokenSink for TokenBuffer {
    fn produce(&mut self, token: Token) {
        self.tokens.push(token);
    }
}

/// The lexical state machine.
pub struct Tokenizer<S = TokenBuffer> {
    sink: S,
    buffer: String,
    state: TokenizerState,
}

impl Tokenizer<TokenBuffer> {
    pub fn new() -> Self {
        Tokenizer::with_sink(TokenBuffer::default())
    }
}

impl Default for Tokenizer<TokenBuffer> {
    fn default() -> Self {
        Tokenizer::new()
    }
}

impl<S: TokenSink> Tokenizer<S> {
    pub fn with_sink(sink: S) -> Self {
        Tokenizer { sink, buffer: String::new(), state: TokenizerState::Idle }
    }

    pub fn state(&self) -> TokenizerState {
        self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Feed one character.
    pub fn write_char(&mut self, c: char) -> Result<(), Error> {
        let cc = classify(c);
        if cc == CharCategory::Invalid {
            return Err(Error::InvalidCharacter { ch: c });
        }

        match self.state {
            TokenizerState::Idle => self.state_idle(c, cc),
            TokenizerState::Identifier => self.state_identifier(c, cc),
            TokenizerState::NumberSign => self.state_number_sign(c, cc),
            TokenizerState::Number => self.state_number(c, cc),
            TokenizerState::Decimals => self.state_decimals(c, cc),
            TokenizerState::ExponentMarked => self.state_exponent_marked(c, cc),
            TokenizerState::ExponentSign => self.state_exponent_sign(c, cc),
            TokenizerState::Exponent => self.state_exponent(c, cc),
            TokenizerState::SingleQuoteString => self.state_string(c, cc, Quote::Single),
            TokenizerState::DoubleQuoteString => self.state_string(c, cc, Quote::Double),
            TokenizerState::SingleQuoteEscape => self.state_escape(c, Quote::Single),
            TokenizerState::DoubleQuoteEscape => self.state_escape(c, Quote::Double),
        }
    }

    /// Feed a whole string, character by character.
    pub fn write_str(&mut self, input: &str) -> Result<(), Error> {
        for c in input.chars() {
            self.write_char(c)?;
        }
        Ok(())
    }

    /// Signal end of input: a synthetic newline forces completion of
    /// any pending token.
    pub fn finish(&mut self) -> Result<(), Error> {
        self.write_char('\n')
    }

    fn produce(&mut self, kind: TokenKind) {
        let text = std::mem::take(&mut self.buffer);
        self.sink.produce(Token { kind, text });
    }

    fn produce_identifier(&mut self) {
        let kind = LITERALS
            .get(self.buffer.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.produce(kind);
    }

    fn fail(&self, c: char) -> Result<(), Error> {
        Err(Error::UnexpectedCharacter { state: self.state, ch: c })
    }

    fn state_idle(&mut self, c: char, cc: CharCategory) -> Result<(), Error> {
        match cc {
            CharCategory::Space | CharCategory::NewLine => Ok(()),
            CharCategory::LBrace => Ok(self.produce(TokenKind::LBrace)),
            CharCategory::RBrace => Ok(self.produce(TokenKind::RBrace)),
            CharCategory::LBracket => Ok(self.produce(TokenKind::LBracket)),
            CharCategory::RBracket => Ok(self.produce(TokenKind::RBracket)),
            CharCategory::Colon => Ok(self.produce(TokenKind::Colon)),
            CharCategory::Comma => Ok(self.produce(TokenKind::Comma)),
            CharCategory::Underscore | CharCategory::Letter | CharCategory::ExponentMarker => {
                self.state = TokenizerState::Identifier;
                self.buffer.push(c);
                Ok(())
            }
            CharCategory::PlusSign | CharCategory::MinusSign => {
                self.state = TokenizerState::NumberSign;
                self.buffer.push(c);
                Ok(())
            }
            CharCategory::Digit => {
                self.state = TokenizerState::Number;
                self.buffer.push(c);
                Ok(())
            }
            CharCategory::SingleQuote => {
                self.state = TokenizerState::SingleQuoteString;
                self.buffer.push(c);
                Ok(())
            }
            CharCategory::DoubleQuote => {
                self.state = TokenizerState::DoubleQuoteString;
                self.buffer.push(c);
                Ok(())
            }
            _ => self.fail(c),
        }
    }

    fn state_identifier(&mut self, c: char, cc: CharCategory) -> Result<(), Error> {
        match cc {
            CharCategory::Underscore
            | CharCategory::Letter
            | CharCategory::ExponentMarker
            | CharCategory::Digit => {
                self.buffer.push(c);
                Ok(())
            }
            CharCategory::Space
            | CharCategory::NewLine
            | CharCategory::LBrace
            | CharCategory::RBrace
            | CharCategory::LBracket
            | CharCategory::RBracket
            | CharCategory::Colon
            | CharCategory::Comma
            | CharCategory::PlusSign
            | CharCategory::MinusSign
            | CharCategory::SingleQuote
            | CharCategory::DoubleQuote => {
                self.produce_identifier();
                self.state = TokenizerState::Idle;
                self.state_idle(c, cc)
            }
            _ => self.fail(c),
        }
    }

    fn state_number_sign(&mut self, c: char, cc: CharCategory) -> Result<(), Error> {
        match cc {
            CharCategory::PlusSign | CharCategory::MinusSign => {
                self.buffer.push(c);
                Ok(())
            }
            CharCategory::Digit => {
                self.buffer.push(c);
                self.state = TokenizerState::Number;
                Ok(())
            }
            _ => self.fail(c),
        }
    }

    fn state_number(&mut self, c: char, cc: CharCategory) -> Result<(), Error> {
        match cc {
            CharCategory::Digit => {
                self.buffer.push(c);
                Ok(())
            }
            CharCategory::Dot => {
                self.buffer.push(c);
                self.state = TokenizerState::Decimals;
                Ok(())
            }
            CharCategory::ExponentMarker => {
                self.buffer.push(c);
                self.state = TokenizerState::ExponentMarked;
                Ok(())
            }
            cc if is_terminator(cc) => {
                self.produce(TokenKind::Integer);
                self.state = TokenizerState::Idle;
                self.state_idle(c, cc)
            }
            _ => self.fail(c),
        }
    }

    fn state_decimals(&mut self, c: char, cc: CharCategory) -> Result<(), Error> {
        match cc {
            CharCategory::Digit => {
                self.buffer.push(c);
                Ok(())
            }
            CharCategory::ExponentMarker => {
                self.buffer.push(c);
                self.state = TokenizerState::ExponentMarked;
                Ok(())
            }
            cc if is_terminator(cc) => {
                self.produce(TokenKind::Number);
                self.state = TokenizerState::Idle;
                self.state_idle(c, cc)
            }
            _ => self.fail(c),
        }
    }

    fn state_exponent_marked(&mut self, c: char, cc: CharCategory) -> Result<(), Error> {
        match cc {
            CharCategory::Digit => {
                self.buffer.push(c);
                self.state = TokenizerState::Exponent;
                Ok(())
            }
            CharCategory::PlusSign | CharCategory::MinusSign => {
                self.buffer.push(c);
                self.state = TokenizerState::ExponentSign;
                Ok(())
            }
            _ => self.fail(c),
        }
    }

    fn state_exponent_sign(&mut self, c: char, cc: CharCategory) -> Result<(), Error> {
        match cc {
            CharCategory::Digit => {
                self.buffer.push(c);
                self.state = TokenizerState::Exponent;
                Ok(())
            }
            CharCategory::PlusSign | CharCategory::MinusSign => {
                self.buffer.push(c);
                Ok(())
            }
            _ => self.fail(c),
        }
    }

    fn state_exponent(&mut self, c: char, cc: CharCategory) -> Result<(), Error> {
        match cc {
            CharCategory::Digit => {
                self.buffer.push(c);
                Ok(())
            }
            cc if is_terminator(cc) => {
                self.produce(TokenKind::Number);
                self.state = TokenizerState::Idle;
                self.state_idle(c, cc)
            }
            _ => self.fail(c),
        }
    }

    fn state_string(&mut self, c: char, cc: CharCategory, quote: Quote) -> Result<(), Error> {
        match cc {
            cc if cc == quote.category() => {
                self.buffer.push(c);
                self.produce(TokenKind::StringLiteral);
                self.state = TokenizerState::Idle;
                Ok(())
            }
            CharCategory::Escape => {
                self.state = quote.escape_state();
                Ok(())
            }
            // A literal newline means the string was never terminated.
            CharCategory::NewLine => self.fail(c),
            _ => {
                self.buffer.push(c);
                Ok(())
            }
        }
    }

    fn state_escape(&mut self, c: char, quote: Quote) -> Result<(), Error> {
        self.buffer.push(unescaped(c)?);
        self.state = quote.string_state();
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Quote {
    Single,
    Double,
}

impl Quote {
    fn category(self) -> CharCategory {
        match self {
            Quote::Single => CharCategory::SingleQuote,
            Quote::Double => CharCategory::DoubleQuote,
        }
    }

    fn string_state(self) -> TokenizerState {
        match self {
            Quote::Single => TokenizerState::SingleQuoteString,
            Quote::Double => TokenizerState::DoubleQuoteString,
        }
    }

    fn escape_state(self) -> TokenizerState {
        match self {
            Quote::Single => TokenizerState::SingleQuoteEscape,
            Quote::Double => TokenizerState::DoubleQuoteEscape,
        }
    }
}

fn is_terminator(cc: CharCategory) -> bool {
    matches!(
        cc,
        CharCategory::Space
            | CharCategory::NewLine
            | CharCategory::LBrace
            | CharCategory::RBrace
            | CharCategory::LBracket
            | CharCategory::RBracket
            | CharCategory::Colon
            | CharCategory::Comma
            | CharCategory::SingleQuote
            | CharCategory::DoubleQuote
    )
}

fn unescaped(c: char) -> Result<char, Error> {
    match c {
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        't' => Ok('\t'),
        '"' => Ok('"'),
        '\'' => Ok('\''),
        '\\' => Ok('\\'),
        _ => Err(Error::BadEscape { ch: c }),
    }
}

/// Tokenize a complete input, flushing the trailing token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokenizer = Tokenizer::new();
    tokenizer.write_str(input)?;
    tokenizer.finish()?;
    Ok(tokenizer.into_sink().tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_scalars() {
        let tokens = {
            let mut t = Tokenizer::new();
            t.write_str("123 hello 'str' \"haha\" ").unwrap();
            t.into_sink().tokens
        };

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0], Token::new(TokenKind::Integer, "123"));
        assert_eq!(tokens[1], Token::new(TokenKind::Identifier, "hello"));
        assert_eq!(tokens[2], Token::new(TokenKind::StringLiteral, "'str'"));
        assert_eq!(tokens[3], Token::new(TokenKind::StringLiteral, "\"haha\""));
    }

    #[test]
    fn literal_recognition_needs_flush() {
        let mut t = Tokenizer::new();
        t.write_str("tru").unwrap();
        assert!(t.sink().tokens.is_empty());
        assert_eq!(t.state(), TokenizerState::Identifier);

        t.write_char('e').unwrap();
        t.finish().unwrap();
        assert_eq!(t.sink().tokens, [Token::new(TokenKind::True, "true")]);
    }

    #[test]
    fn null_and_false_literals() {
        assert_eq!(tokenize("null").unwrap(), [Token::new(TokenKind::Null, "null")]);
        assert_eq!(tokenize("false").unwrap(), [Token::new(TokenKind::False, "false")]);
        // Case-sensitive: not a literal.
        assert_eq!(tokenize("True").unwrap(), [Token::new(TokenKind::Identifier, "True")]);
    }

    #[test]
    fn punctuation_burst() {
        let tokens = tokenize("[]{},:").unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Colon,
            ]
        );
        assert!(tokens.iter().all(|t| t.text.is_empty()));
    }

    #[test]
    fn number_classification() {
        let tokens = tokenize("125 1.31 1e+28 -2.45e-27 ").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0], Token::new(TokenKind::Integer, "125"));
        assert_eq!(tokens[1], Token::new(TokenKind::Number, "1.31"));
        assert_eq!(tokens[2], Token::new(TokenKind::Number, "1e+28"));
        assert_eq!(tokens[3], Token::new(TokenKind::Number, "-2.45e-27"));
    }

    #[test]
    fn stray_dot_is_fatal() {
        let mut t = Tokenizer::new();
        t.write_str("1.24").unwrap();
        assert!(matches!(
            t.write_char('.'),
            Err(Error::UnexpectedCharacter { state: TokenizerState::Decimals, ch: '.' })
        ));

        assert!(matches!(
            tokenize("."),
            Err(Error::UnexpectedCharacter { state: TokenizerState::Idle, ch: '.' })
        ));
    }

    #[test]
    fn doubled_exponent_is_fatal() {
        let mut t = Tokenizer::new();
        t.write_str("1.27e12").unwrap();
        assert!(matches!(
            t.write_char('e'),
            Err(Error::UnexpectedCharacter { state: TokenizerState::Exponent, ch: 'e' })
        ));
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let mut t = Tokenizer::new();
        t.write_str("\"string").unwrap();
        assert!(matches!(
            t.write_char('\n'),
            Err(Error::UnexpectedCharacter { state: TokenizerState::DoubleQuoteString, ch: '\n' })
        ));
    }

    #[test]
    fn escapes_decode_into_token_text() {
        let tokens = tokenize(r#" "a\n\t\"\\b" "#).unwrap();
        assert_eq!(tokens, [Token::new(TokenKind::StringLiteral, "\"a\n\t\"\\b\"")]);

        assert!(matches!(tokenize(r#""\x""#), Err(Error::BadEscape { ch: 'x' })));
    }

    #[test]
    fn control_characters_abort() {
        assert!(matches!(
            tokenize("\"a\u{1}b\""),
            Err(Error::InvalidCharacter { ch: '\u{1}' })
        ));
    }

    #[test]
    fn tab_and_carriage_return_are_whitespace() {
        let tokens = tokenize("\t1\r\n2 ").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "1");
        assert_eq!(tokens[1].text, "2");
    }

    #[test]
    fn unicode_identifier_keys() {
        let tokens = tokenize("café ").unwrap();
        assert_eq!(tokens, [Token::new(TokenKind::Identifier, "café")]);
    }

    #[test]
    fn classify_is_total_over_ascii() {
        for b in 0u8..=127 {
            // Just must not panic; Invalid is a legal answer.
            let _ = classify(b as char);
        }
        assert_eq!(classify('E'), CharCategory::ExponentMarker);
        assert_eq!(classify('\u{0}'), CharCategory::Invalid);
        assert_eq!(classify('é'), CharCategory::Letter);
        assert_eq!(classify('☃'), CharCategory::Other);
    }
}
