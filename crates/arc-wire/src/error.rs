/// Errors raised while reading the text layer of an ARC container.
///
/// None of these are fatal on their own. The decoder turns
/// `MalformedRecord` into a skip-and-resync, `ProtocolParse` into an
/// absent envelope, and `InvalidContainerHeader` into a fatal open error.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A record header line failed the five-field contract.
    #[error("malformed record header: {reason}")]
    MalformedRecord { reason: MalformedReason },

    /// The first unit is not a usable `filedesc://` self-description.
    #[error("invalid container header: {reason}")]
    InvalidContainerHeader { reason: ContainerReason },

    /// The payload does not start with a recognizable protocol envelope.
    #[error("protocol envelope could not be parsed: {reason}")]
    ProtocolParse { reason: ProtocolReason },

    /// Archive date is not 14 ASCII digits (`yyyyMMddHHmmss`).
    #[error("invalid timestamp {value:?}: expected 14 digits (yyyyMMddHHmmss)")]
    InvalidTimestamp { value: String },
}

/// Why a record header line was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedReason {
    #[error("empty header line")]
    EmptyLine,

    #[error("expected 5 space-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("length field {token:?} is not a non-negative integer")]
    InvalidLength { token: String },

    #[error("declared length {declared} exceeds the {limit}-byte payload limit")]
    PayloadTooLarge { declared: u64, limit: u64 },

    #[error("URL {url:?} is not http:// or https://")]
    SchemeRejected { url: String },

    #[error("no newline within the first {limit} bytes")]
    LineTooLong { limit: usize },
}

/// Why the container self-description unit was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContainerReason {
    #[error("input contains no units")]
    Missing,

    #[error("first line {found:?} does not start with filedesc://")]
    NotFiledesc { found: String },

    #[error("unit ended after {lines} line(s), expected at least 3")]
    Truncated { lines: usize },

    #[error("{count} trailer lines after the blank line, at most 4 allowed")]
    TooManyTrailerLines { count: usize },

    #[error("line {line} has no newline within {limit} bytes")]
    LineTooLong { line: usize, limit: usize },
}

/// Why an envelope scan failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolReason {
    #[error("payload ended before the header/body boundary")]
    BoundaryNotFound,

    #[error("status line is empty")]
    EmptyStatusLine,
}
