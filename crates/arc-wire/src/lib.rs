#![warn(clippy::pedantic)]

pub mod container;
pub mod envelope;
pub mod error;
pub mod header;
pub mod timestamp;

pub use container::ContainerHeader;
pub use envelope::{BoundaryKind, ParsedEnvelope, find_body_start, parse_envelope};
pub use error::{ContainerReason, MalformedReason, ProtocolReason, WireError};
pub use header::RecordHeader;
