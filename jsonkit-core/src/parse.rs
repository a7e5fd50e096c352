//! Token-level parser: a push-down automaton over an explicit state
//! stack, feeding a [`JsonBuilder`] backend.
//!
//! The machine itself never builds values; it only validates structure
//! and forwards events. [`TreeBuilder`] is the backend that assembles a
//! [`Value`] tree. Nesting uses the state stack, not call recursion, so
//! depth is bounded by `max_depth` rather than the native stack.

use crate::error::Error;
use crate::lex::{tokenize, Token, TokenKind};
use crate::value::Value;

/// Nesting frames allowed before a parse is rejected.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A leaf value delivered to the builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

/// Backend contract driven by the parser. One call per structural
/// event, in document order; containers are bracketed by start/end
/// pairs and object entries by a `key` call before the entry's value.
pub trait JsonBuilder {
    fn start_object(&mut self) -> Result<(), Error>;
    fn key(&mut self, key: &str) -> Result<(), Error>;
    fn end_object(&mut self) -> Result<(), Error>;
    fn start_array(&mut self) -> Result<(), Error>;
    fn end_array(&mut self) -> Result<(), Error>;
    fn value(&mut self, scalar: Scalar) -> Result<(), Error>;
}

/// Parser states. One lives on the stack per open container, plus the
/// bottom `Idle` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    InObject,
    AfterFieldKey,
    AfterColon,
    AfterFieldValue,
    InArray,
    AfterArrayElement,
    AfterArrayComma,
}

/// The push-down state machine.
pub struct ParserMachine<B> {
    builder: B,
    stack: Vec<ParserState>,
    max_depth: usize,
}

impl<B: JsonBuilder> ParserMachine<B> {
    pub fn new(builder: B) -> Self {
        ParserMachine::with_max_depth(builder, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(builder: B, max_depth: usize) -> Self {
        ParserMachine { builder, stack: vec![ParserState::Idle], max_depth }
    }

    /// Current state (top of the stack).
    pub fn state(&self) -> ParserState {
        // The bottom Idle frame is never popped.
        *self.stack.last().unwrap_or(&ParserState::Idle)
    }

    /// Whether the machine is back at the bottom frame with no open
    /// containers.
    pub fn is_complete(&self) -> bool {
        self.stack.len() == 1
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    pub fn into_builder(self) -> B {
        self.builder
    }

    /// Feed one token.
    pub fn consume(&mut self, token: &Token) -> Result<(), Error> {
        match self.state() {
            ParserState::Idle => self.state_idle(token),
            ParserState::InObject => self.state_in_object(token),
            ParserState::AfterFieldKey => self.state_after_field_key(token),
            ParserState::AfterColon => self.state_after_colon(token),
            ParserState::AfterFieldValue => self.state_after_field_value(token),
            ParserState::InArray => self.state_in_array(token),
            ParserState::AfterArrayElement => self.state_after_array_element(token),
            ParserState::AfterArrayComma => self.state_after_array_comma(token),
        }
    }

    fn fail(&self, token: &Token) -> Result<(), Error> {
        Err(Error::UnexpectedToken { state: self.state(), kind: token.kind })
    }

    fn set_state(&mut self, state: ParserState) {
        if let Some(top) = self.stack.last_mut() {
            *top = state;
        }
    }

    /// Open containers (the bottom Idle frame is not one).
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Open a nested container: the parent frame keeps its state and a
    /// new frame is pushed on top.
    fn enter(&mut self, state: ParserState) -> Result<(), Error> {
        if self.depth() >= self.max_depth {
            return Err(Error::DepthLimitExceeded { limit: self.max_depth });
        }
        match state {
            ParserState::InObject => self.builder.start_object()?,
            _ => self.builder.start_array()?,
        }
        self.stack.push(state);
        Ok(())
    }

    /// Close the current container: pop its frame, then retarget the
    /// parent, which was left waiting at the point the container
    /// opened. An AfterColon parent received its field value; an
    /// InArray/AfterArrayComma parent received an element.
    fn leave(&mut self) {
        self.stack.pop();
        match self.state() {
            ParserState::AfterColon => self.set_state(ParserState::AfterFieldValue),
            ParserState::InArray | ParserState::AfterArrayComma => {
                self.set_state(ParserState::AfterArrayElement)
            }
            _ => {}
        }
    }

    /// Deliver a scalar or open a container, in any state that expects
    /// a value. `next` is the state the current frame moves to after a
    /// scalar.
    fn accept_value(&mut self, token: &Token, next: ParserState) -> Result<(), Error> {
        match token.kind {
            TokenKind::LBrace => self.enter(ParserState::InObject),
            TokenKind::LBracket => self.enter(ParserState::InArray),
            TokenKind::Null => {
                self.builder.value(Scalar::Null)?;
                self.set_state(next);
                Ok(())
            }
            TokenKind::True => {
                self.builder.value(Scalar::Boolean(true))?;
                self.set_state(next);
                Ok(())
            }
            TokenKind::False => {
                self.builder.value(Scalar::Boolean(false))?;
                self.set_state(next);
                Ok(())
            }
            TokenKind::Integer => {
                let i = parse_integer(&token.text)?;
                self.builder.value(Scalar::Integer(i))?;
                self.set_state(next);
                Ok(())
            }
            TokenKind::Number => {
                let n = parse_number(&token.text)?;
                self.builder.value(Scalar::Number(n))?;
                self.set_state(next);
                Ok(())
            }
            TokenKind::StringLiteral => {
                self.builder.value(Scalar::String(unquote(&token.text).to_owned()))?;
                self.set_state(next);
                Ok(())
            }
            _ => self.fail(token),
        }
    }

    fn state_idle(&mut self, token: &Token) -> Result<(), Error> {
        match token.kind {
            TokenKind::LBrace => self.enter(ParserState::InObject),
            TokenKind::LBracket => self.enter(ParserState::InArray),
            _ => self.fail(token),
        }
    }

    fn state_in_object(&mut self, token: &Token) -> Result<(), Error> {
        match token.kind {
            TokenKind::Identifier => {
                self.builder.key(&token.text)?;
                self.set_state(ParserState::AfterFieldKey);
                Ok(())
            }
            TokenKind::StringLiteral => {
                self.builder.key(unquote(&token.text))?;
                self.set_state(ParserState::AfterFieldKey);
                Ok(())
            }
            TokenKind::RBrace => {
                self.builder.end_object()?;
                self.leave();
                Ok(())
            }
            _ => self.fail(token),
        }
    }

    fn state_after_field_key(&mut self, token: &Token) -> Result<(), Error> {
        match token.kind {
            TokenKind::Colon => {
                self.set_state(ParserState::AfterColon);
                Ok(())
            }
            _ => self.fail(token),
        }
    }

    fn state_after_colon(&mut self, token: &Token) -> Result<(), Error> {
        self.accept_value(token, ParserState::AfterFieldValue)
    }

    fn state_after_field_value(&mut self, token: &Token) -> Result<(), Error> {
        match token.kind {
            TokenKind::Comma => {
                self.set_state(ParserState::InObject);
                Ok(())
            }
            TokenKind::RBrace => {
                self.builder.end_object()?;
                self.leave();
                Ok(())
            }
            _ => self.fail(token),
        }
    }

    fn state_in_array(&mut self, token: &Token) -> Result<(), Error> {
        match token.kind {
            TokenKind::RBracket => {
                self.builder.end_array()?;
                self.leave();
                Ok(())
            }
            _ => self.accept_value(token, ParserState::AfterArrayElement),
        }
    }

    fn state_after_array_element(&mut self, token: &Token) -> Result<(), Error> {
        match token.kind {
            TokenKind::Comma => {
                self.set_state(ParserState::AfterArrayComma);
                Ok(())
            }
            TokenKind::RBracket => {
                self.builder.end_array()?;
                self.leave();
                Ok(())
            }
            _ => self.fail(token),
        }
    }

    fn state_after_array_comma(&mut self, token: &Token) -> Result<(), Error> {
        self.accept_value(token, ParserState::AfterArrayElement)
    }
}

/// Strip the surrounding quote characters from a string token's text.
fn unquote(text: &str) -> &str {
    // Tokens always carry both quotes; anything shorter did not come
    // from the tokenizer.
    if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

fn parse_integer(text: &str) -> Result<i64, Error> {
    text.parse()
        .map_err(|_| Error::InvalidNumber { text: text.to_owned() })
}

fn parse_number(text: &str) -> Result<f64, Error> {
    text.parse()
        .map_err(|_| Error::InvalidNumber { text: text.to_owned() })
}

struct Frame {
    container: Value,
    pending_key: Option<String>,
}

/// [`JsonBuilder`] backend assembling a [`Value`] tree.
///
/// Keeps its own stack of containers under construction; each completed
/// value attaches to its parent as an object field or array element, or
/// becomes the root. A second root is rejected.
#[derive(Default)]
pub struct TreeBuilder {
    stack: Vec<Frame>,
    root: Option<Value>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// The completed document, once the outermost container has closed.
    pub fn take_root(&mut self) -> Option<Value> {
        self.root.take()
    }

    fn open(&mut self, container: Value) -> Result<(), Error> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(Error::TrailingContent);
        }
        self.stack.push(Frame { container, pending_key: None });
        Ok(())
    }

    fn attach(&mut self, value: Value) -> Result<(), Error> {
        match self.stack.last_mut() {
            Some(frame) => match frame.pending_key.take() {
                Some(key) => frame.container.insert(&key, value),
                None => frame.container.push(value),
            },
            None => {
                if self.root.is_some() {
                    return Err(Error::TrailingContent);
                }
                self.root = Some(value);
                Ok(())
            }
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.stack.pop() {
            Some(frame) => self.attach(frame.container),
            None => Err(Error::UnexpectedEnd),
        }
    }
}

impl JsonBuilder for TreeBuilder {
    fn start_object(&mut self) -> Result<(), Error> {
        self.open(Value::object())
    }

    fn key(&mut self, key: &str) -> Result<(), Error> {
        match self.stack.last_mut() {
            Some(frame) => {
                frame.pending_key = Some(key.to_owned());
                Ok(())
            }
            None => Err(Error::UnexpectedEnd),
        }
    }

    fn end_object(&mut self) -> Result<(), Error> {
        self.close()
    }

    fn start_array(&mut self) -> Result<(), Error> {
        self.open(Value::array())
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.close()
    }

    fn value(&mut self, scalar: Scalar) -> Result<(), Error> {
        let value = match scalar {
            Scalar::Null => Value::null(),
            Scalar::Boolean(b) => Value::from(b),
            Scalar::Integer(i) => Value::from(i),
            Scalar::Number(n) => Value::from(n),
            Scalar::String(s) => Value::from(s),
        };
        self.attach(value)
    }
}

/// Parse a complete document into a [`Value`] tree.
pub fn parse(input: &str) -> Result<Value, Error> {
    parse_with_max_depth(input, DEFAULT_MAX_DEPTH)
}

/// [`parse`] with an explicit nesting limit.
pub fn parse_with_max_depth(input: &str, max_depth: usize) -> Result<Value, Error> {
    let tokens = tokenize(input)?;
    let mut machine = ParserMachine::with_max_depth(TreeBuilder::new(), max_depth);
    for token in &tokens {
        machine.consume(token)?;
    }
    if !machine.is_complete() {
        return Err(Error::UnexpectedEnd);
    }
    machine
        .into_builder()
        .take_root()
        .ok_or(Error::UnexpectedEnd)
}
