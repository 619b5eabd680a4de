//! Rules for the container's self-description unit.
//!
//! Every ARC file opens with one unit that describes the file itself
//! rather than a capture:
//!
//! ```text
//! filedesc://IA-001102.arc 0.0.0.0 20001102000000 text/plain 76    line 1
//! 1 0 Alexa Internet                                              line 2
//! URL IP-address Archive-date Content-type Archive-length         line 3
//!                                                                 blank
//! <up to 4 trailer lines>
//! ```
//!
//! The decoder collects the lines of that unit and hands them to
//! [`ContainerHeader::from_lines`].

use crate::error::{ContainerReason, WireError};
use crate::header::starts_with_ignore_case;

/// Scheme prefix marking the self-description unit.
pub const FILEDESC_PREFIX: &str = "filedesc://";

/// Lines before the blank separator.
pub const DESCRIPTION_LINES: usize = 3;

/// Trailer lines allowed after the blank separator.
pub const MAX_TRAILER_LINES: usize = 4;

/// Most lines the decoder needs to read from the first unit to decide
/// validity: the description, the blank line, and one trailer line past the
/// limit.
pub const MAX_CONTAINER_LINES: usize = DESCRIPTION_LINES + 1 + MAX_TRAILER_LINES + 1;

/// The validated self-description of a container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Line 1, starting with `filedesc://`.
    pub description: String,
    /// Line 2: version and origin.
    pub version_line: String,
    /// Line 3 split on whitespace. Informational only.
    pub field_names: Vec<String>,
    /// Non-blank-separator lines read after the description.
    pub trailer_lines: usize,
}

impl ContainerHeader {
    /// Validate the lines of the first unit.
    ///
    /// `lines` holds at most [`MAX_CONTAINER_LINES`] entries with line
    /// terminators already removed, in unit order.
    ///
    /// # Errors
    ///
    /// [`WireError::InvalidContainerHeader`] when there are no lines, the
    /// first line lacks `filedesc://`, the unit ends before line 3, or a
    /// fifth trailer line follows the blank separator.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, WireError> {
        let Some(first) = lines.first() else {
            return Err(invalid(ContainerReason::Missing));
        };
        let first = first.as_ref();
        if !is_filedesc_line(first) {
            return Err(invalid(ContainerReason::NotFiledesc {
                found: first.to_string(),
            }));
        }
        if lines.len() < DESCRIPTION_LINES {
            return Err(invalid(ContainerReason::Truncated { lines: lines.len() }));
        }

        let trailer_lines = lines.len().saturating_sub(DESCRIPTION_LINES + 1);
        if trailer_lines > MAX_TRAILER_LINES {
            return Err(invalid(ContainerReason::TooManyTrailerLines {
                count: trailer_lines,
            }));
        }

        Ok(Self {
            description: first.trim().to_string(),
            version_line: lines[1].as_ref().to_string(),
            field_names: lines[2]
                .as_ref()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            trailer_lines,
        })
    }

    /// The archive name from line 1, e.g. `IA-001102.arc`.
    pub fn file_name(&self) -> &str {
        let rest = &self.description[FILEDESC_PREFIX.len().min(self.description.len())..];
        rest.split(' ').next().unwrap_or_default()
    }
}

/// Whether `line` opens a self-description unit.
pub fn is_filedesc_line(line: &str) -> bool {
    starts_with_ignore_case(line.trim().as_bytes(), FILEDESC_PREFIX.as_bytes())
}

fn invalid(reason: ContainerReason) -> WireError {
    WireError::InvalidContainerHeader { reason }
}
