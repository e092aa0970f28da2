//! Typed document identifier
//!
//! `ObjectId` is the store-native primary-key type: 12 raw bytes, conventionally
//! rendered as 24 lowercase hex characters.
//!
//! ## Layout of generated ids
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0..4  | Seconds since Unix epoch (big-endian) |
//! | 4..9  | Per-process random value |
//! | 9..12 | Incrementing counter (big-endian) |
//!
//! Ids decoded from clients are never validated against this layout: any 12
//! bytes are a valid `ObjectId`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Number of raw bytes in an `ObjectId`
pub const OBJECT_ID_LEN: usize = 12;

/// Number of hex characters in the rendered form of an `ObjectId`
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(rand::random);

static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>() & 0x00ff_ffff));

/// Error returned when a string cannot be decoded into an `ObjectId`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    /// Input is not 24 characters long
    #[error("invalid object id length {length}, expected {expected} hex characters")]
    InvalidLength {
        /// Actual length in characters
        length: usize,
        /// Required length
        expected: usize,
    },

    /// Input contains a non-hex character
    #[error("invalid hex character {character:?} at position {position}")]
    InvalidCharacter {
        /// Offending character
        character: char,
        /// Character index
        position: usize,
    },
}

/// 12-byte typed document identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        ObjectId(bytes)
    }

    /// Build an identifier from raw bytes
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        ObjectId(bytes)
    }

    /// Raw bytes of this identifier
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// True if `s` is exactly 24 ASCII hex characters (either case)
    pub fn is_valid_hex(s: &str) -> bool {
        s.len() == OBJECT_ID_HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Decode a 24-character hex string
    ///
    /// # Errors
    ///
    /// Returns an error if the string has the wrong length or contains a
    /// character outside `[0-9a-fA-F]`.
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        let char_len = s.chars().count();
        if char_len != OBJECT_ID_HEX_LEN || s.len() != OBJECT_ID_HEX_LEN {
            return Err(ObjectIdError::InvalidLength {
                length: char_len,
                expected: OBJECT_ID_HEX_LEN,
            });
        }

        let raw = s.as_bytes();
        let mut bytes = [0u8; OBJECT_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let hi = hex_nibble(raw[i * 2], i * 2)?;
            let lo = hex_nibble(raw[i * 2 + 1], i * 2 + 1)?;
            *byte = (hi << 4) | lo;
        }
        Ok(ObjectId(bytes))
    }

    /// Render as 24 lowercase hex characters
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Seconds-since-epoch prefix of a generated id
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

fn hex_nibble(c: u8, position: usize) -> Result<u8, ObjectIdError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ObjectIdError::InvalidCharacter {
            character: c as char,
            position,
        }),
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        ObjectId(bytes)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ObjectId::parse_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "6945cd5054b616d899e8f4e8";

    #[test]
    fn test_parse_and_render_round_trip() {
        let oid = ObjectId::parse_str(HEX).unwrap();
        assert_eq!(oid.to_hex(), HEX);
        assert_eq!(oid.to_string(), HEX);
        assert_eq!(oid.bytes()[0], 0x69);
        assert_eq!(oid.bytes()[11], 0xe8);
    }

    #[test]
    fn test_parse_uppercase_renders_lowercase() {
        let oid = ObjectId::parse_str(&HEX.to_uppercase()).unwrap();
        assert_eq!(oid.to_hex(), HEX);
    }

    #[test]
    fn test_is_valid_hex() {
        assert!(ObjectId::is_valid_hex(HEX));
        assert!(!ObjectId::is_valid_hex("6945cd5054b616d899e8f4e"));
        assert!(!ObjectId::is_valid_hex("6945cd5054b616d899e8f4e8a"));
        assert!(!ObjectId::is_valid_hex("zz45cd5054b616d899e8f4e8"));
        assert!(!ObjectId::is_valid_hex(""));
    }

    #[test]
    fn test_parse_wrong_length() {
        let err = ObjectId::parse_str("abc").unwrap_err();
        assert_eq!(
            err,
            ObjectIdError::InvalidLength {
                length: 3,
                expected: 24
            }
        );
    }

    #[test]
    fn test_parse_bad_character() {
        let err = ObjectId::parse_str("6945cd5054b616d899e8f4eg").unwrap_err();
        assert!(matches!(
            err,
            ObjectIdError::InvalidCharacter {
                character: 'g',
                position: 23
            }
        ));
    }

    #[test]
    fn test_parse_multibyte_input_is_rejected() {
        // 24 bytes but fewer characters
        let s = "ééééééééééee";
        assert_eq!(s.len(), 24);
        assert!(ObjectId::parse_str(s).is_err());
        assert!(!ObjectId::is_valid_hex(s));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_ne!(a, b);
        assert!(ObjectId::is_valid_hex(&a.to_hex()));
    }

    #[test]
    fn test_generated_id_carries_timestamp() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as u32;
        let oid = ObjectId::new();
        assert!(oid.timestamp_secs() >= now.saturating_sub(1));
        assert!(oid.timestamp_secs() <= now + 1);
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let oid = ObjectId::parse_str(HEX).unwrap();
        let json = serde_json::to_string(&oid).unwrap();
        assert_eq!(json, format!("\"{}\"", HEX));
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, oid);
    }
}
