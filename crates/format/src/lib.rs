//! # Record Codec
//!
//! Binary framing for the two on-disk record kinds used by the storage
//! engine: data records (key + value, appended to a `.data` file) and hint
//! records (key + location, appended to a `.hnt` sidecar). Both are
//! length-prefixed and little-endian; neither carries a checksum — durability
//! here is an `fsync` property, not a per-record one.
//!
//! ## Data record
//!
//! ```text
//! | key_len: u16 LE | value_len: u16 LE | key bytes | value bytes |
//! ```
//!
//! `value_len == TOMBSTONE` means the record is a deletion marker: no value
//! bytes follow. The 4-byte prefix is the [`DataHeader`].
//!
//! ## Hint record
//!
//! ```text
//! | key_len: u16 LE | value_len: u16 LE | value_pos: u32 LE | key bytes |
//! ```
//!
//! `value_pos` is the absolute byte offset in the companion data file at
//! which the value payload begins. The 8-byte prefix is the [`HintHeader`].
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

/// Sentinel `value_len` marking a tombstone (logical delete) record.
pub const TOMBSTONE: u16 = 0xFFFF;
/// Maximum allowed key length in bytes.
pub const MAX_KEY_LEN: usize = 0xFF;
/// Size in bytes of a data record header.
pub const DATA_HEADER_LEN: usize = 4;
/// Size in bytes of a hint record header.
pub const HINT_HEADER_LEN: usize = 8;

/// Errors produced while encoding or decoding records.
#[derive(Debug, Error)]
pub enum FormatError {
    /// `key_len` was zero or exceeded [`MAX_KEY_LEN`].
    #[error("invalid key length: {0} (must be 1..={MAX_KEY_LEN})")]
    InvalidKeyLength(usize),
    /// A non-tombstone value had length `>= TOMBSTONE`.
    #[error("invalid value length: {0} (must be < {TOMBSTONE:#06x} for a live value)")]
    InvalidValueLength(usize),
    /// A supplied buffer was too small to hold the header it was asked to carry.
    #[error("buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
}

type Result<T> = std::result::Result<T, FormatError>;

/// Validates a key/value length pair against the record-codec invariants.
///
/// `value_len` of `None` means "tombstone" and is always valid with respect
/// to value length (there is no value to check).
fn validate_lengths(key_len: usize, value_len: Option<usize>) -> Result<()> {
    if key_len == 0 || key_len > MAX_KEY_LEN {
        return Err(FormatError::InvalidKeyLength(key_len));
    }
    if let Some(vlen) = value_len {
        if vlen >= TOMBSTONE as usize {
            return Err(FormatError::InvalidValueLength(vlen));
        }
    }
    Ok(())
}

/// A read-only view over a 4-byte data-record header.
pub struct DataHeader<'a> {
    buf: &'a [u8],
}

impl<'a> DataHeader<'a> {
    /// Wraps `buf` as a data header view.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::BufferTooSmall`] if `buf` is shorter than
    /// [`DATA_HEADER_LEN`].
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < DATA_HEADER_LEN {
            return Err(FormatError::BufferTooSmall {
                expected: DATA_HEADER_LEN,
                actual: buf.len(),
            });
        }
        Ok(Self { buf })
    }

    /// Length of the record's key, in bytes.
    #[must_use]
    pub fn key_len(&self) -> u16 {
        (&self.buf[0..2])
            .read_u16::<LittleEndian>()
            .expect("header slice length validated at parse time")
    }

    /// Raw `value_len` field, which may be [`TOMBSTONE`].
    #[must_use]
    pub fn value_len(&self) -> u16 {
        (&self.buf[2..4])
            .read_u16::<LittleEndian>()
            .expect("header slice length validated at parse time")
    }

    /// `true` if this header marks a tombstone (deletion) record.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.value_len() == TOMBSTONE
    }
}

/// Encodes a data-record header into `buf[0..DATA_HEADER_LEN]`.
///
/// # Errors
///
/// Returns [`FormatError::InvalidKeyLength`] or
/// [`FormatError::InvalidValueLength`] per the record-codec invariants, or
/// [`FormatError::BufferTooSmall`] if `buf` is too short.
pub fn encode_data_header(buf: &mut [u8], key_len: u16, value_len: u16) -> Result<()> {
    if buf.len() < DATA_HEADER_LEN {
        return Err(FormatError::BufferTooSmall {
            expected: DATA_HEADER_LEN,
            actual: buf.len(),
        });
    }
    let vlen = if value_len == TOMBSTONE {
        None
    } else {
        Some(value_len as usize)
    };
    validate_lengths(key_len as usize, vlen)?;

    let mut w = &mut buf[0..DATA_HEADER_LEN];
    w.write_u16::<LittleEndian>(key_len)
        .expect("buffer length validated above");
    w.write_u16::<LittleEndian>(value_len)
        .expect("buffer length validated above");
    Ok(())
}

/// A read-only view over an 8-byte hint-record header.
pub struct HintHeader<'a> {
    buf: &'a [u8],
}

impl<'a> HintHeader<'a> {
    /// Wraps `buf` as a hint header view.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::BufferTooSmall`] if `buf` is shorter than
    /// [`HINT_HEADER_LEN`].
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < HINT_HEADER_LEN {
            return Err(FormatError::BufferTooSmall {
                expected: HINT_HEADER_LEN,
                actual: buf.len(),
            });
        }
        Ok(Self { buf })
    }

    /// Length of the record's key, in bytes.
    #[must_use]
    pub fn key_len(&self) -> u16 {
        (&self.buf[0..2])
            .read_u16::<LittleEndian>()
            .expect("header slice length validated at parse time")
    }

    /// Raw `value_len` field, which may be [`TOMBSTONE`].
    #[must_use]
    pub fn value_len(&self) -> u16 {
        (&self.buf[2..4])
            .read_u16::<LittleEndian>()
            .expect("header slice length validated at parse time")
    }

    /// Absolute byte offset in the companion data file where the value
    /// payload begins.
    #[must_use]
    pub fn value_pos(&self) -> u32 {
        (&self.buf[4..8])
            .read_u32::<LittleEndian>()
            .expect("header slice length validated at parse time")
    }

    /// `true` if this hint marks a tombstone (deletion) record.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.value_len() == TOMBSTONE
    }
}

/// Encodes a hint-record header into `buf[0..HINT_HEADER_LEN]`.
///
/// # Errors
///
/// Same as [`encode_data_header`], plus requires `buf` to hold
/// [`HINT_HEADER_LEN`] bytes.
pub fn encode_hint_header(
    buf: &mut [u8],
    key_len: u16,
    value_len: u16,
    value_pos: u32,
) -> Result<()> {
    if buf.len() < HINT_HEADER_LEN {
        return Err(FormatError::BufferTooSmall {
            expected: HINT_HEADER_LEN,
            actual: buf.len(),
        });
    }
    let vlen = if value_len == TOMBSTONE {
        None
    } else {
        Some(value_len as usize)
    };
    validate_lengths(key_len as usize, vlen)?;

    let mut w = &mut buf[0..HINT_HEADER_LEN];
    w.write_u16::<LittleEndian>(key_len)
        .expect("buffer length validated above");
    w.write_u16::<LittleEndian>(value_len)
        .expect("buffer length validated above");
    w.write_u32::<LittleEndian>(value_pos)
        .expect("buffer length validated above");
    Ok(())
}

/// Builds a complete data record: `[header][key][value]`.
///
/// `value = None` encodes a tombstone: no value bytes are appended and the
/// header's `value_len` is set to [`TOMBSTONE`].
///
/// # Errors
///
/// Propagates [`FormatError::InvalidKeyLength`] / `InvalidValueLength`.
pub fn encode_data_record(key: &[u8], value: Option<&[u8]>) -> Result<Vec<u8>> {
    validate_lengths(key.len(), value.map(<[u8]>::len))?;

    let value_len = value.map_or(TOMBSTONE, |v| v.len() as u16);
    let mut buf = Vec::with_capacity(DATA_HEADER_LEN + key.len() + value.map_or(0, <[u8]>::len));
    buf.resize(DATA_HEADER_LEN, 0);
    encode_data_header(&mut buf, key.len() as u16, value_len)?;
    buf.extend_from_slice(key);
    if let Some(v) = value {
        buf.extend_from_slice(v);
    }
    Ok(buf)
}

/// Builds a complete hint record: `[header][key]`.
///
/// Pass `value_len = TOMBSTONE` to emit a tombstone hint.
///
/// # Errors
///
/// Propagates [`FormatError::InvalidKeyLength`] / `InvalidValueLength`.
pub fn encode_hint_record(key: &[u8], value_len: u16, value_pos: u32) -> Result<Vec<u8>> {
    let vlen = if value_len == TOMBSTONE {
        None
    } else {
        Some(value_len as usize)
    };
    validate_lengths(key.len(), vlen)?;

    let mut buf = Vec::with_capacity(HINT_HEADER_LEN + key.len());
    buf.resize(HINT_HEADER_LEN, 0);
    encode_hint_header(&mut buf, key.len() as u16, value_len, value_pos)?;
    buf.extend_from_slice(key);
    Ok(buf)
}
