use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::cache::DecodeCache;
use crate::checksum::crc8;
use crate::numeral::coerce_integer;
use crate::Config;

/// Error returned when a value cannot be encoded.
///
/// Every variant is an invalid argument supplied by the caller.  Decoding never fails
/// with an error; see [`Codec::decode`] and [`Codec::decode_uuid`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("id must be positive, got {received}")]
    NotPositive { received: i128 },

    #[error("id is not a number: {received:?}")]
    NotNumeric { received: String },

    #[error("id {received} does not fit in 63 bits")]
    OutOfRange { received: i128 },

    #[error("not a canonical UUID: {received:?}")]
    InvalidUuid { received: String },
}

/// Longest string `decode` will attempt to take apart.  A nine byte buffer never needs
/// more than 13 base58 characters.
pub const MAX_ENCODED_LENGTH: usize = 13;

// [checksum][u32 LE]
const SMALL_LENGTH: usize = 5;
// [checksum][u64 LE]
const LARGE_LENGTH: usize = 9;
// [16 UUID bytes][checksum]
const UUID_LENGTH: usize = 17;
const CANONICAL_UUID_LENGTH: usize = 36;

/// Input to [`Codec::decode`]: either text from the outside world, or an identifier
/// that is already numeric and is passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawId<'a> {
    Number(u64),
    Text(&'a str),
}

impl From<u64> for RawId<'_> {
    fn from(id: u64) -> Self {
        RawId::Number(id)
    }
}

impl<'a> From<&'a str> for RawId<'a> {
    fn from(text: &'a str) -> Self {
        RawId::Text(text)
    }
}

impl<'a> From<&'a String> for RawId<'a> {
    fn from(text: &'a String) -> Self {
        RawId::Text(text)
    }
}

/// Core encoder/decoder.
#[derive(Debug, Clone)]
pub struct Codec {
    cache: Arc<DecodeCache>,
    lenient_fallback: bool,
}

impl Codec {
    /// Creates a new `Codec` with its own decode cache.
    ///
    /// # Examples
    ///
    /// ```
    /// use b58id::{Codec, Config};
    ///
    /// let codec = Codec::new(&Config::new());
    /// ```
    pub fn new(config: &Config) -> Codec {
        Codec::with_cache(
            config,
            Arc::new(DecodeCache::with_capacity(config.cache_capacity)),
        )
    }

    /// Creates a new `Codec` that memoizes decodes in `cache`.  The cache's own bound
    /// applies; `config.cache_capacity` is ignored.
    pub fn with_cache(config: &Config, cache: Arc<DecodeCache>) -> Codec {
        Codec {
            cache,
            lenient_fallback: config.lenient_fallback,
        }
    }

    pub fn cache(&self) -> &Arc<DecodeCache> {
        &self.cache
    }

    /// Encodes a positive integer into a short base58 string.
    ///
    /// Values up to `u32::MAX` are written as a 4 byte little-endian integer, larger
    /// ones as 8 bytes.  The payload is prefixed with its CRC-8.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier, between 1 and `i64::MAX`.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok` containing the encoded string, or
    /// `Error::NotPositive` if `id` is zero or negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use b58id::{Codec, Config};
    ///
    /// let codec = Codec::new(&Config::new());
    /// assert_eq!(codec.encode(123).unwrap(), "MpBACvB");
    /// assert!(codec.encode(0).is_err());
    /// ```
    pub fn encode(&self, id: i64) -> Result<String, Error> {
        if id <= 0 {
            return Err(Error::NotPositive {
                received: id.into(),
            });
        }
        Ok(encode_number(id as u64))
    }

    /// Encodes an identifier given as text, such as `"123"` or `" 0x7b "`.
    ///
    /// Text that does not read as an integer is rejected rather than coerced.
    pub fn encode_numeral(&self, id: &str) -> Result<String, Error> {
        let value = coerce_integer(id).ok_or_else(|| Error::NotNumeric {
            received: id.to_string(),
        })?;
        if value <= 0 {
            return Err(Error::NotPositive { received: value });
        }
        let id = i64::try_from(value).map_err(|_| Error::OutOfRange { received: value })?;
        self.encode(id)
    }

    /// Decodes an identifier received from outside, returning `0` if it is not valid.
    ///
    /// Numbers are passed through unchanged.  Text goes through [`Codec::decode_str`].
    ///
    /// # Examples
    ///
    /// ```
    /// use b58id::{Codec, Config};
    ///
    /// let codec = Codec::new(&Config::new());
    /// assert_eq!(codec.decode("MpBACvB"), 123);
    /// assert_eq!(codec.decode(42u64), 42);
    /// assert_eq!(codec.decode("MpBACvC"), 0);
    /// ```
    pub fn decode<'a>(&self, id: impl Into<RawId<'a>>) -> u64 {
        match id.into() {
            RawId::Number(id) => id,
            RawId::Text(encoded) => self.decode_str(encoded),
        }
    }

    /// Decodes a string produced by [`Codec::encode`].
    ///
    /// Never fails: anything that is not a valid identifier decodes to `0`, which is
    /// never issued.  Strings longer than [`MAX_ENCODED_LENGTH`] characters are
    /// rejected before any work is done.  When the string is not base58 at all, or too
    /// short to hold a payload, it is read as a bare integer instead (see
    /// [`Config::lenient_fallback`]), so legacy numeric identifiers keep working.
    ///
    /// Successful decodes are memoized in the codec's [`DecodeCache`].
    pub fn decode_str(&self, encoded: &str) -> u64 {
        if encoded.chars().take(MAX_ENCODED_LENGTH + 1).count() > MAX_ENCODED_LENGTH {
            debug!(length = encoded.len(), "rejecting over-length id");
            return 0;
        }

        if let Some(value) = self.cache.get(encoded) {
            trace!(encoded, value, "decode cache hit");
            return value;
        }

        let bytes = match bs58::decode(encoded).into_vec() {
            Ok(bytes) if bytes.len() >= SMALL_LENGTH => bytes,
            _ => return self.fallback(encoded),
        };

        let payload = if bytes.len() < LARGE_LENGTH {
            &bytes[1..SMALL_LENGTH]
        } else {
            &bytes[1..LARGE_LENGTH]
        };
        if crc8(payload) != bytes[0] {
            debug!(encoded, "checksum mismatch");
            return 0;
        }

        let value = le_bytes_to_num(payload);
        self.cache.insert(encoded, value);
        value
    }

    fn fallback(&self, encoded: &str) -> u64 {
        if !self.lenient_fallback {
            debug!(encoded, "not a base58 id");
            return 0;
        }
        let value = coerce_integer(encoded)
            .and_then(|value| u64::try_from(value).ok())
            .unwrap_or(0);
        debug!(encoded, value, "not a base58 id, read as numeral");
        value
    }

    /// Encodes a canonical UUID string such as `123e4567-e89b-12d3-a456-426614174000`.
    ///
    /// # Examples
    ///
    /// ```
    /// use b58id::{Codec, Config};
    ///
    /// let codec = Codec::new(&Config::new());
    /// let encoded = codec.encode_uuid("123e4567-e89b-12d3-a456-426614174000").unwrap();
    /// assert_eq!(encoded, "Awhtac8M4wM5fkq8CmCtwkU");
    /// ```
    pub fn encode_uuid(&self, uuid: &str) -> Result<String, Error> {
        Ok(self.encode_uuid_value(&parse_canonical_uuid(uuid)?))
    }

    /// Encodes a `Uuid`.  The checksum follows the 16 UUID bytes.
    pub fn encode_uuid_value(&self, uuid: &Uuid) -> String {
        let mut buffer = [0u8; UUID_LENGTH];
        buffer[..16].copy_from_slice(uuid.as_bytes());
        buffer[16] = crc8(&buffer[..16]);
        bs58::encode(buffer).into_string()
    }

    /// Decodes a string produced by [`Codec::encode_uuid`] into the lowercase
    /// hyphenated UUID, or `None` if it is not valid.  Never fails otherwise.
    pub fn decode_uuid(&self, encoded: &str) -> Option<String> {
        self.decode_uuid_value(encoded)
            .map(|uuid| uuid.hyphenated().to_string())
    }

    /// Like [`Codec::decode_uuid`], returning a `Uuid`.  UUID decodes are not cached.
    pub fn decode_uuid_value(&self, encoded: &str) -> Option<Uuid> {
        let bytes = match bs58::decode(encoded).into_vec() {
            Ok(bytes) if bytes.len() >= UUID_LENGTH => bytes,
            _ => {
                debug!(length = encoded.len(), "not a base58 uuid");
                return None;
            }
        };
        if crc8(&bytes[..16]) != bytes[16] {
            debug!(length = encoded.len(), "uuid checksum mismatch");
            return None;
        }
        Uuid::from_slice(&bytes[..16]).ok()
    }
}

fn encode_number(id: u64) -> String {
    let mut buffer = Vec::with_capacity(LARGE_LENGTH);
    buffer.push(0);
    match u32::try_from(id) {
        Ok(small) => buffer.extend_from_slice(&small.to_le_bytes()),
        Err(_) => buffer.extend_from_slice(&id.to_le_bytes()),
    }
    buffer[0] = crc8(&buffer[1..]);
    bs58::encode(buffer).into_string()
}

fn le_bytes_to_num(bytes: &[u8]) -> u64 {
    let mut arr = [0; 8];
    arr[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(arr)
}

fn parse_canonical_uuid(uuid: &str) -> Result<Uuid, Error> {
    let invalid = || Error::InvalidUuid {
        received: uuid.to_string(),
    };
    // Only the hyphenated form is 36 characters long.
    if uuid.len() != CANONICAL_UUID_LENGTH {
        return Err(invalid());
    }
    Uuid::try_parse(uuid).map_err(|_| invalid())
}
