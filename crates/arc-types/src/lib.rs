#![warn(clippy::pedantic)]

pub mod anomaly;
pub mod error;
pub mod record;
pub mod serial;

pub use anomaly::Anomalies;
pub use arc_wire::{ParsedEnvelope, RecordHeader};
pub use error::SerializeError;
pub use record::{BodyView, Record};
