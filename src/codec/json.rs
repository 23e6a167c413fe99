//! JSON codec using `serde_json`.
//!
//! Command bodies look like `{"cmd": "...", "data": {...}}`. Most typed records
//! live under `data`; [`JsonCodec::decode_data`] reaches into it in one pass.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LiveError, Result};

#[derive(Deserialize)]
struct DataField<T> {
    data: T,
}

/// JSON codec for command bodies.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON bytes.
    #[inline]
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    /// Decode the whole body as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Decode`] tagged with `cmd`.
    pub fn decode<T: DeserializeOwned>(cmd: &str, raw: &[u8]) -> Result<T> {
        serde_json::from_slice(raw).map_err(|source| LiveError::Decode {
            cmd: cmd.to_string(),
            source,
        })
    }

    /// Decode the `data` field of the body as `T`.
    ///
    /// A missing `data` field is a decode error.
    pub fn decode_data<T: DeserializeOwned>(cmd: &str, raw: &[u8]) -> Result<T> {
        Self::decode::<DataField<T>>(cmd, raw).map(|field| field.data)
    }
}
