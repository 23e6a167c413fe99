//! Codec module - body compression and JSON decoding.
//!
//! - [`ZlibCodec`] - protocol version 2 batches via `flate2`
//! - [`BrotliCodec`] - protocol version 3 batches via `brotli`
//! - [`JsonCodec`] - command bodies and the join request via `serde_json`
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.
//! Decompression failures surface as [`LiveError::Protocol`](crate::LiveError::Protocol);
//! JSON failures carry the command they were decoding.
//!
//! # Example
//!
//! ```
//! use bililive_engine::codec::ZlibCodec;
//!
//! let packed = ZlibCodec::compress(b"hello").unwrap();
//! assert_eq!(ZlibCodec::decompress(&packed).unwrap(), b"hello");
//! ```

mod brotli;
mod json;
mod zlib;

pub use self::brotli::BrotliCodec;
pub use self::json::JsonCodec;
pub use self::zlib::ZlibCodec;
