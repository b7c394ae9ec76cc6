//! Encoding of whole entity collections to and from bytes.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// Converts a collection of `T` to bytes and back.
pub trait EntityCodec<T>: Send + Sync {
    /// Encode the full collection.
    fn encode(&self, items: &[T]) -> Result<Vec<u8>, CodecError>;

    /// Decode a full collection. Empty input is a decode failure.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError>;
}

/// JSON array codec used by every repository.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityCodec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, items: &[T]) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(items)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(CodecError::Empty);
        }
        Ok(serde_json::from_slice(bytes)?)
    }
}
