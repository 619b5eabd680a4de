use arc_wire::WireError;

/// Errors from the binary record layout in [`crate::serial`].
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
  /// A length-prefixed string does not fit its u16 prefix.
  #[error("{field} is {len} bytes, exceeds the 65535-byte field limit")]
  FieldTooLong { field: &'static str, len: usize },

  /// The buffer ended inside a record.
  #[error("truncated record at offset {offset}: needed {needed} bytes, {available} available")]
  TruncatedRecord {
    offset: usize,
    needed: u64,
    available: usize,
  },

  #[error("invalid UTF-8 in {field}")]
  InvalidUtf8 { field: &'static str },

  /// Encoded timestamp cannot be rendered as a calendar date.
  #[error("timestamp {millis} ms is outside the representable range")]
  TimestampOutOfRange { millis: i64 },

  /// `decode` found bytes after a complete record.
  #[error("unexpected data after record ({extra_bytes} bytes)")]
  TrailingBytes { extra_bytes: usize },

  /// The record's archive date is not 14 digits.
  #[error(transparent)]
  InvalidTimestamp(#[from] WireError),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
