use arc_wire::WireError;

/// Conditions that end decoding.
///
/// Per-record problems (bad header lines, short payloads, trailing bytes)
/// never appear here: the decoder logs them, resynchronizes, and moves on.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
  /// The first unit is missing or is not a valid `filedesc://` description.
  #[error(transparent)]
  InvalidContainerHeader(WireError),

  /// The consecutive-failure bound was reached.
  #[error("too many consecutive invalid records ({count}) at position {position}")]
  TooManyConsecutiveInvalidRecords { count: u32, position: u64 },

  /// An earlier call failed with an I/O error; the source position is unknown.
  #[error("decoder halted after an earlier I/O failure")]
  Halted,

  #[error(transparent)]
  Io(#[from] std::io::Error),
}
