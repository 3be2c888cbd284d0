//! `b58id` turns integer and UUID identifiers into short, checksummed base58 strings for
//! use in URLs and tokens, and decodes them back without ever failing on bad input.
//!
//! An integer ID is written as a little-endian 4 byte integer (up to `u32::MAX`) or
//! 8 byte integer (up to `i64::MAX`), prefixed with a CRC-8 of the payload, and base58
//! encoded.  `123` becomes `MpBACvB`; the largest IDs take 13 characters.  UUIDs are the
//! 16 raw bytes followed by their CRC-8.  The checksum catches typos and truncated
//! copies.  It is not a MAC: anyone can forge an ID, so this is not an access control
//! mechanism.
//!
//! Decoding is meant for untrusted input, so it never returns an error.  Integer decodes
//! return `0` (never a valid ID) for anything invalid, and UUID decodes return `None`.
//! Text that is not base58 but reads as a plain integer decodes to that integer, which
//! keeps older numeric IDs working.
//!
//! # Usage
//!
//! ## Crate level functions
//!
//! ```
//! assert_eq!(b58id::encode(123).unwrap(), "MpBACvB");
//! assert_eq!(b58id::decode("MpBACvB"), 123);
//! assert_eq!(b58id::decode("MpBACvC"), 0);
//!
//! let uuid = "123e4567-e89b-12d3-a456-426614174000";
//! let encoded = b58id::encode_uuid(uuid).unwrap();
//! assert_eq!(b58id::decode_uuid(&encoded).as_deref(), Some(uuid));
//! ```
//!
//! These share one process-wide [`Codec`], built on first use from
//! [`Config::global`].
//!
//! ## Codec
//!
//! A `Codec` owns (or shares) the cache of decoded strings, so services can bound it and
//! tests can inspect it.
//!
//! ```
//! use b58id::{Codec, Config};
//!
//! let codec = Codec::new(&Config::new().cache_capacity(100_000).unwrap());
//! let encoded = codec.encode(9007199254740993).unwrap();
//! assert_eq!(encoded, "3QY27MQR1Y5Hy");
//! assert_eq!(codec.decode(&encoded), 9007199254740993);
//! ```

mod cache;
mod checksum;
mod codec;
mod config;
mod field;
mod numeral;
mod shortid;

use once_cell::sync::Lazy;

pub use cache::{CacheStats, DecodeCache};
pub use codec::{Codec, Error, RawId, MAX_ENCODED_LENGTH};
pub use config::{Config, ConfigError};
pub use field::{Field, TypeMarker};
pub use shortid::{
    generate, generate_with_rng, is_well_formed_short_id, DEFAULT_SHORT_ID_SIZE, MIN_SHORT_ID_SIZE,
};

static GLOBAL_CODEC: Lazy<Codec> =
    Lazy::new(|| Codec::new(&Config::global().unwrap_or_default()));

pub(crate) fn global_codec() -> &'static Codec {
    &GLOBAL_CODEC
}

/// Encodes `id` with the global codec.  See [`Codec::encode`].
pub fn encode(id: i64) -> Result<String, Error> {
    global_codec().encode(id)
}

/// Encodes an integer given as text with the global codec.  See
/// [`Codec::encode_numeral`].
pub fn encode_numeral(id: &str) -> Result<String, Error> {
    global_codec().encode_numeral(id)
}

/// Decodes `id` with the global codec, returning `0` if it is invalid.  See
/// [`Codec::decode`].
pub fn decode<'a>(id: impl Into<RawId<'a>>) -> u64 {
    global_codec().decode(id)
}

/// Encodes a canonical UUID string with the global codec.
pub fn encode_uuid(uuid: &str) -> Result<String, Error> {
    global_codec().encode_uuid(uuid)
}

/// Decodes a UUID with the global codec, returning `None` if it is invalid.
pub fn decode_uuid(encoded: &str) -> Option<String> {
    global_codec().decode_uuid(encoded)
}

/// The decode cache behind the crate level functions.
pub fn global_cache() -> &'static DecodeCache {
    global_codec().cache()
}
