/// Consecutive invalid records tolerated before decoding aborts.
pub const DEFAULT_MAX_CONSECUTIVE_INVALID: u32 = 100;

/// Bytes read after a payload to detect a misdeclared length.
pub const DEFAULT_PROBE_LEN: usize = 64;

/// Largest declared payload accepted, 256 MiB.
pub const DEFAULT_MAX_PAYLOAD_LEN: u64 = 256 * 1024 * 1024;

/// Longest header or container line buffered before the unit is rejected.
pub const DEFAULT_MAX_HEADER_LINE: usize = 8 * 1024;

/// What to do with a record whose URL is not `http://` or `https://`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemePolicy {
  /// Emit the record, tagged `NON_HTTP_SCHEME`, and log it.
  #[default]
  Warn,
  /// Treat the record as invalid and resynchronize.
  Reject,
}

/// Decoder tuning.
///
/// ```text
/// ┌──────────────────────────┬───────────┬──────────────────────────────┐
/// │ Field                    │ Default   │ Effect                       │
/// ├──────────────────────────┼───────────┼──────────────────────────────┤
/// │ max_consecutive_invalid  │ 100       │ abort on reaching this count │
/// │ probe_len                │ 64        │ post-payload probe size      │
/// │ max_payload_len          │ 256 MiB   │ larger lengths are invalid   │
/// │ max_header_line          │ 8 KiB     │ longer lines are invalid     │
/// │ scheme_policy            │ Warn      │ non-HTTP URL handling        │
/// │ allow_record_separator   │ false     │ lone trailing newline is ok  │
/// └──────────────────────────┴───────────┴──────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
  pub max_consecutive_invalid: u32,
  pub probe_len: usize,
  pub max_payload_len: u64,
  pub max_header_line: usize,
  pub scheme_policy: SchemePolicy,
  /// Accept newline bytes left after the payload as the ARC record
  /// separator instead of flagging `TRAILING_BYTES`.
  pub allow_record_separator: bool,
}

impl Default for DecoderConfig {
  fn default() -> Self {
    Self {
      max_consecutive_invalid: DEFAULT_MAX_CONSECUTIVE_INVALID,
      probe_len: DEFAULT_PROBE_LEN,
      max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
      max_header_line: DEFAULT_MAX_HEADER_LINE,
      scheme_policy: SchemePolicy::Warn,
      allow_record_separator: false,
    }
  }
}
