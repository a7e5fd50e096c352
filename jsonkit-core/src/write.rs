//! Canonical text output: a state machine mirroring the parser, plus
//! the tree walker behind [`stringify`].
//!
//! Objects are newline-broken with two spaces of indent per open
//! container and keys in sorted order; arrays stay on one line with
//! `", "` separators. String bodies and keys are escaped so the output
//! always re-parses.

use crate::error::Error;
use crate::value::{JsonType, Value};

/// Writer states. One frame per open container, plus the bottom `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Idle,
    InObject,
    AfterKey,
    AfterObjectValue,
    InArray,
    AfterArrayValue,
}

/// Reserved formatting options parameter. Currently empty; the
/// canonical format is the only one.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct StringifyOptions {}

/// Event-driven text emitter. Misusing the protocol (a value where a
/// key is due, closing a container that is not open) is an error, not
/// a panic; it indicates a broken walker, never bad user input.
pub struct JsonWriter {
    out: String,
    stack: Vec<WriterState>,
}

impl Default for JsonWriter {
    fn default() -> Self {
        JsonWriter::new()
    }
}

impl JsonWriter {
    pub fn new() -> Self {
        JsonWriter { out: String::new(), stack: vec![WriterState::Idle] }
    }

    pub fn state(&self) -> WriterState {
        *self.stack.last().unwrap_or(&WriterState::Idle)
    }

    /// The accumulated text.
    pub fn finish(self) -> String {
        self.out
    }

    fn set_state(&mut self, state: WriterState) {
        if let Some(top) = self.stack.last_mut() {
            *top = state;
        }
    }

    /// Open container frames.
    fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    fn indent(&mut self, levels: usize) {
        for _ in 0..levels {
            self.out.push_str("  ");
        }
    }

    /// Emit whatever must precede a value in the current state, or
    /// reject the state.
    fn begin_value(&mut self) -> Result<(), Error> {
        match self.state() {
            WriterState::Idle | WriterState::AfterKey | WriterState::InArray => Ok(()),
            WriterState::AfterArrayValue => {
                self.out.push_str(", ");
                Ok(())
            }
            state => Err(Error::InvalidWriterState { state }),
        }
    }

    /// Retarget the current frame after a complete value was written
    /// into it.
    fn end_value(&mut self) {
        match self.state() {
            WriterState::AfterKey => self.set_state(WriterState::AfterObjectValue),
            WriterState::InArray | WriterState::AfterArrayValue => {
                self.set_state(WriterState::AfterArrayValue)
            }
            _ => {}
        }
    }

    fn scalar(&mut self, text: &str) -> Result<(), Error> {
        self.begin_value()?;
        self.out.push_str(text);
        self.end_value();
        Ok(())
    }

    pub fn null(&mut self) -> Result<(), Error> {
        self.scalar("null")
    }

    pub fn boolean(&mut self, value: bool) -> Result<(), Error> {
        self.scalar(if value { "true" } else { "false" })
    }

    pub fn integer(&mut self, value: i64) -> Result<(), Error> {
        self.scalar(&value.to_string())
    }

    pub fn number(&mut self, value: f64) -> Result<(), Error> {
        self.scalar(&format_number(value))
    }

    pub fn string(&mut self, value: &str) -> Result<(), Error> {
        self.begin_value()?;
        push_quoted(&mut self.out, value);
        self.end_value();
        Ok(())
    }

    pub fn key(&mut self, key: &str) -> Result<(), Error> {
        match self.state() {
            WriterState::InObject => self.out.push('\n'),
            WriterState::AfterObjectValue => self.out.push_str(",\n"),
            state => return Err(Error::InvalidWriterState { state }),
        }
        self.indent(self.depth());
        push_quoted(&mut self.out, key);
        self.out.push_str(": ");
        self.set_state(WriterState::AfterKey);
        Ok(())
    }

    pub fn start_object(&mut self) -> Result<(), Error> {
        self.begin_value()?;
        self.out.push('{');
        self.stack.push(WriterState::InObject);
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), Error> {
        match self.state() {
            // Empty object closes on the same line.
            WriterState::InObject => {}
            WriterState::AfterObjectValue => {
                self.out.push('\n');
                self.indent(self.depth() - 1);
            }
            state => return Err(Error::InvalidWriterState { state }),
        }
        self.out.push('}');
        self.stack.pop();
        self.end_value();
        Ok(())
    }

    pub fn start_array(&mut self) -> Result<(), Error> {
        self.begin_value()?;
        self.out.push('[');
        self.stack.push(WriterState::InArray);
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), Error> {
        match self.state() {
            WriterState::InArray | WriterState::AfterArrayValue => {
                self.out.push(']');
                self.stack.pop();
                self.end_value();
                Ok(())
            }
            state => Err(Error::InvalidWriterState { state }),
        }
    }
}

/// Quote and escape a string body or key. The escape set is exactly
/// what the tokenizer's escape decoder accepts, so output re-parses to
/// the same text.
fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    let bytes = s.as_bytes();
    let clean = memchr::memchr3(b'\\', b'"', b'\n', bytes).is_none()
        && memchr::memchr2(b'\r', b'\t', bytes).is_none();
    if clean {
        out.push_str(s);
    } else {
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c => out.push(c),
            }
        }
    }
    out.push('"');
}

/// Textual form of a float. Non-finite values have no JSON literal and
/// render as null; finite values are forced to contain a `.` or
/// exponent so they re-lex as a float, never an integer.
fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "null".to_owned();
    }
    let mut text = value.to_string();
    if !text.contains(['.', 'e', 'E']) {
        text.push_str(".0");
    }
    text
}

/// Render a value tree in the canonical format.
pub fn stringify(value: &Value) -> Result<String, Error> {
    stringify_with(value, StringifyOptions::default())
}

/// [`stringify`] with explicit options.
pub fn stringify_with(value: &Value, _options: StringifyOptions) -> Result<String, Error> {
    let mut writer = JsonWriter::new();
    write_value(&mut writer, value)?;
    Ok(writer.finish())
}

fn write_value(writer: &mut JsonWriter, value: &Value) -> Result<(), Error> {
    match value.json_type() {
        JsonType::Null => writer.null(),
        JsonType::Boolean => writer.boolean(value.to_bool()?),
        JsonType::Integer => writer.integer(value.to_integer()?),
        JsonType::Number => writer.number(value.to_number()?),
        JsonType::String => writer.string(&value.to_text()?),
        JsonType::Array => {
            writer.start_array()?;
            for item in value.items()? {
                write_value(writer, &item)?;
            }
            writer.end_array()
        }
        JsonType::Object => {
            writer.start_object()?;
            for (key, item) in value.entries()? {
                writer.key(&key)?;
                write_value(writer, &item)?;
            }
            writer.end_object()
        }
    }
}
