//! Encode/decode framework bridging application types and [`Value`]
//! trees.
//!
//! Dispatch is two-layered. The static path is the [`Encode`] /
//! [`Decode`] trait pair, implemented for the built-in scalars and
//! containers; their default method bodies fail with `NoCodec`, so a
//! type that opts in without providing bodies participates only through
//! the registry. The runtime path is a [`Serializer`] holding codecs
//! keyed by [`TypeId`]; the registry is consulted first, the static
//! path is the fallback. [`ObjectCodec`] is the stock registry codec:
//! named fields bound to getter/setter closures.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::error::Error;
use crate::value::Value;

/// Static encode path. The default body reports that no encoding
/// exists; built-ins override it.
pub trait Encode: Sized {
    fn encode(&self, serializer: &Serializer) -> Result<Value, Error> {
        let _ = serializer;
        Err(Error::NoCodec { type_name: std::any::type_name::<Self>() })
    }
}

/// Static decode path, mirror of [`Encode`].
pub trait Decode: Sized {
    fn decode(serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        let _ = (serializer, value);
        Err(Error::NoCodec { type_name: std::any::type_name::<Self>() })
    }
}

impl Encode for bool {
    fn encode(&self, _serializer: &Serializer) -> Result<Value, Error> {
        Ok(Value::from(*self))
    }
}

impl Decode for bool {
    fn decode(_serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        value.to_bool()
    }
}

impl Encode for i64 {
    fn encode(&self, _serializer: &Serializer) -> Result<Value, Error> {
        Ok(Value::from(*self))
    }
}

impl Decode for i64 {
    fn decode(_serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        value.to_integer()
    }
}

impl Encode for f64 {
    fn encode(&self, _serializer: &Serializer) -> Result<Value, Error> {
        Ok(Value::from(*self))
    }
}

impl Decode for f64 {
    fn decode(_serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        value.to_number()
    }
}

impl Encode for String {
    fn encode(&self, _serializer: &Serializer) -> Result<Value, Error> {
        Ok(Value::from(self.as_str()))
    }
}

impl Decode for String {
    fn decode(_serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        value.to_text()
    }
}

/// Identity mapping: a `Value` encodes as itself (handle copy).
impl Encode for Value {
    fn encode(&self, _serializer: &Serializer) -> Result<Value, Error> {
        Ok(self.clone())
    }
}

impl Decode for Value {
    fn decode(_serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        Ok(value.clone())
    }
}

/// Arrays map element-wise; elements go back through the serializer so
/// registered element types are honored.
impl<T: Encode + 'static> Encode for Vec<T> {
    fn encode(&self, serializer: &Serializer) -> Result<Value, Error> {
        let array = Value::array();
        for item in self {
            array.push(serializer.encode(item)?)?;
        }
        Ok(array)
    }
}

impl<T: Decode + 'static> Decode for Vec<T> {
    fn decode(serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        value.items()?.iter().map(|item| serializer.decode(item)).collect()
    }
}

/// Absence encodes as null; presence as the inner encoding.
impl<T: Encode + 'static> Encode for Option<T> {
    fn encode(&self, serializer: &Serializer) -> Result<Value, Error> {
        match self {
            Some(inner) => serializer.encode(inner),
            None => Ok(Value::null()),
        }
    }
}

impl<T: Decode + 'static> Decode for Option<T> {
    fn decode(serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        if value.is_null() {
            Ok(None)
        } else {
            serializer.decode(value).map(Some)
        }
    }
}

/// Two-alternative variant carrier. Wider variants nest: a
/// three-alternative type is `Either<A, Either<B, C>>`.
///
/// Encodes as `{"index": 0|1, "value": <alternative>}`; decoding
/// dispatches on `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L: Encode + 'static, R: Encode + 'static> Encode for Either<L, R> {
    fn encode(&self, serializer: &Serializer) -> Result<Value, Error> {
        let (index, inner) = match self {
            Either::Left(left) => (0i64, serializer.encode(left)?),
            Either::Right(right) => (1i64, serializer.encode(right)?),
        };
        let object = Value::object();
        object.insert("index", index)?;
        object.insert("value", inner)?;
        Ok(object)
    }
}

impl<L: Decode + 'static, R: Decode + 'static> Decode for Either<L, R> {
    fn decode(serializer: &Serializer, value: &Value) -> Result<Self, Error> {
        let index = value.require("index")?.to_integer()?;
        let inner = value.require("value")?;
        match index {
            0 => serializer.decode(&inner).map(Either::Left),
            1 => serializer.decode(&inner).map(Either::Right),
            _ => Err(Error::VariantIndexOutOfRange { index }),
        }
    }
}

/// A runtime-registered encode/decode strategy for one concrete type.
pub trait Codec {
    /// The type this codec serves; the registry key.
    fn target(&self) -> TypeId;

    fn encode_dyn(&self, serializer: &Serializer, value: &dyn Any) -> Result<Value, Error>;

    fn decode_dyn(&self, serializer: &Serializer, value: &Value) -> Result<Box<dyn Any>, Error>;
}

/// The codec registry plus the encode/decode entry points.
#[derive(Default)]
pub struct Serializer {
    codecs: HashMap<TypeId, Box<dyn Codec>>,
}

impl Serializer {
    pub fn new() -> Self {
        Serializer::default()
    }

    /// Register a codec under its target type. A later registration for
    /// the same type replaces the earlier one.
    pub fn add_codec(&mut self, codec: impl Codec + 'static) {
        self.codecs.insert(codec.target(), Box::new(codec));
    }

    pub fn encode<T: Encode + 'static>(&self, value: &T) -> Result<Value, Error> {
        match self.codecs.get(&TypeId::of::<T>()) {
            Some(codec) => codec.encode_dyn(self, value),
            None => value.encode(self),
        }
    }

    pub fn decode<T: Decode + 'static>(&self, value: &Value) -> Result<T, Error> {
        match self.codecs.get(&TypeId::of::<T>()) {
            Some(codec) => codec
                .decode_dyn(self, value)?
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| Error::CodecMismatch { type_name: std::any::type_name::<T>() }),
            None => T::decode(self, value),
        }
    }
}

type Getter<T> = Box<dyn Fn(&T, &Serializer) -> Result<Value, Error>>;
type Setter<T> = Box<dyn Fn(&mut T, &Serializer, &Value) -> Result<(), Error>>;

struct Field<T> {
    name: String,
    optional: bool,
    get: Getter<T>,
    set: Setter<T>,
}

/// Field-reflection codec for a struct type.
///
/// Each field binds a JSON key to a getter/setter closure pair; the
/// field's own type encodes and decodes through the serializer, so
/// nested registered types work. Decoding starts from `T::default()`.
/// A field that is absent (or explicitly null, which is
/// indistinguishable through the read accessor) is an error when
/// required and skipped when optional.
pub struct ObjectCodec<T> {
    fields: Vec<Field<T>>,
}

impl<T: Default + 'static> ObjectCodec<T> {
    pub fn new() -> Self {
        ObjectCodec { fields: Vec::new() }
    }

    /// Register a required field.
    pub fn field<M, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        M: Encode + Decode + 'static,
        G: Fn(&T) -> M + 'static,
        S: Fn(&mut T, M) + 'static,
    {
        self.add(name, false, get, set)
    }

    /// Register a field that may be absent from the input; decoding
    /// then leaves the target's default in place.
    pub fn optional_field<M, G, S>(self, name: &str, get: G, set: S) -> Self
    where
        M: Encode + Decode + 'static,
        G: Fn(&T) -> M + 'static,
        S: Fn(&mut T, M) + 'static,
    {
        self.add(name, true, get, set)
    }

    fn add<M, G, S>(mut self, name: &str, optional: bool, get: G, set: S) -> Self
    where
        M: Encode + Decode + 'static,
        G: Fn(&T) -> M + 'static,
        S: Fn(&mut T, M) + 'static,
    {
        self.fields.push(Field {
            name: name.to_owned(),
            optional,
            get: Box::new(move |target, serializer| serializer.encode(&get(target))),
            set: Box::new(move |target, serializer, value| {
                set(target, serializer.decode(value)?);
                Ok(())
            }),
        });
        self
    }
}

impl<T: Default + 'static> Default for ObjectCodec<T> {
    fn default() -> Self {
        ObjectCodec::new()
    }
}

impl<T: Default + 'static> Codec for ObjectCodec<T> {
    fn target(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn encode_dyn(&self, serializer: &Serializer, value: &dyn Any) -> Result<Value, Error> {
        let target = value
            .downcast_ref::<T>()
            .ok_or(Error::CodecMismatch { type_name: std::any::type_name::<T>() })?;
        let object = Value::object();
        for field in &self.fields {
            object.insert(&field.name, (field.get)(target, serializer)?)?;
        }
        Ok(object)
    }

    fn decode_dyn(&self, serializer: &Serializer, value: &Value) -> Result<Box<dyn Any>, Error> {
        let mut target = T::default();
        for field in &self.fields {
            let item = value.get(&field.name)?;
            if item.is_null() {
                if field.optional {
                    continue;
                }
                return Err(Error::MissingField { field: field.name.clone() });
            }
            (field.set)(&mut target, serializer, &item)?;
        }
        Ok(Box::new(target))
    }
}
