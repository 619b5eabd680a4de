use chrono::NaiveDateTime;

use crate::error::{MalformedReason, WireError};
use crate::timestamp;

/// Number of space-separated fields on a record header line.
pub const FIELD_COUNT: usize = 5;

/// Field order of a version-1 record header line. The container
/// description repeats these names on its third line; the order is fixed
/// regardless of what that line says.
pub const FIELD_ORDER: [&str; FIELD_COUNT] = [
    "URL",
    "IP-address",
    "Archive-date",
    "Content-type",
    "Archive-length",
];

/// Parsed metadata line that opens every ARC record.
///
/// ```text
/// http://example.com/ 93.184.216.34 20010101000000 text/html 1534
/// └─── url ─────────┘ └─ address ─┘ └─ timestamp ┘ └─ ctype ┘ └ len ┘
/// ```
///
/// The length counts payload bytes only: the header line and the
/// newline that follows the payload are not included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordHeader {
    pub url: String,
    pub origin_address: String,
    /// Raw archive date, `yyyyMMddHHmmss`. Kept verbatim.
    pub timestamp: String,
    pub declared_content_type: String,
    pub declared_length: u64,
}

impl RecordHeader {
    /// Parse one header line.
    ///
    /// Trailing `\r`, `\n` and spaces are stripped before splitting, so a
    /// trailing separator never produces an empty sixth field. Fields are
    /// separated by single spaces; two adjacent spaces produce an empty
    /// field and therefore a field-count mismatch.
    ///
    /// # Errors
    ///
    /// [`WireError::MalformedRecord`] when the line is empty, does not have
    /// exactly five fields, or the length field is not a `u64`.
    pub fn parse(line: &str) -> Result<Self, WireError> {
        let line = line.trim_end_matches(['\r', '\n', ' ']);
        if line.is_empty() {
            return Err(malformed(MalformedReason::EmptyLine));
        }

        let fields: Vec<&str> = line.split(' ').collect();
        let &[url, origin_address, timestamp, content_type, length] = fields.as_slice() else {
            return Err(malformed(MalformedReason::FieldCount {
                found: fields.len(),
            }));
        };

        let declared_length = length.parse::<u64>().map_err(|_| {
            malformed(MalformedReason::InvalidLength {
                token: length.to_string(),
            })
        })?;

        Ok(Self {
            url: url.to_string(),
            origin_address: origin_address.to_string(),
            timestamp: timestamp.to_string(),
            declared_content_type: content_type.to_string(),
            declared_length,
        })
    }

    /// Parse a raw header line, decoding it byte-for-char (ISO-8859-1).
    ///
    /// # Errors
    ///
    /// Same as [`RecordHeader::parse`].
    pub fn parse_bytes(line: &[u8]) -> Result<Self, WireError> {
        Self::parse(&decode_latin1(line))
    }

    /// Whether the URL uses a scheme whose payload carries an HTTP envelope.
    pub fn is_http(&self) -> bool {
        has_http_scheme(&self.url)
    }

    /// The archive date as a calendar value, if it is a valid date.
    ///
    /// Strict: `20120235000000` (Feb 35) yields `None` here even though
    /// [`timestamp::to_epoch_millis`] accepts it.
    pub fn archive_date(&self) -> Option<NaiveDateTime> {
        timestamp::parse_strict(&self.timestamp)
    }

    /// Render the canonical header line, without the newline.
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.url,
            self.origin_address,
            self.timestamp,
            self.declared_content_type,
            self.declared_length
        )
    }
}

/// `http://` or `https://`, compared case-insensitively.
pub fn has_http_scheme(url: &str) -> bool {
    starts_with_ignore_case(url.as_bytes(), b"http://")
        || starts_with_ignore_case(url.as_bytes(), b"https://")
}

/// Decode bytes as ISO-8859-1. Every byte maps to exactly one char.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub(crate) fn starts_with_ignore_case(haystack: &[u8], prefix: &[u8]) -> bool {
    haystack.len() >= prefix.len() && haystack[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn malformed(reason: MalformedReason) -> WireError {
    WireError::MalformedRecord { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(err: WireError) -> MalformedReason {
        match err {
            WireError::MalformedRecord { reason } => reason,
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn parses_five_fields() {
        let h = RecordHeader::parse("http://x.test/ 1.2.3.4 20010101000000 text/html 5").unwrap();
        assert_eq!(h.url, "http://x.test/");
        assert_eq!(h.origin_address, "1.2.3.4");
        assert_eq!(h.timestamp, "20010101000000");
        assert_eq!(h.declared_content_type, "text/html");
        assert_eq!(h.declared_length, 5);
        assert!(h.is_http());
    }

    #[test]
    fn strips_crlf_and_trailing_separator() {
        let h = RecordHeader::parse("http://x.test/ 1.2.3.4 20010101000000 text/html 5 \r\n")
            .unwrap();
        assert_eq!(h.declared_length, 5);
    }

    #[test]
    fn rejects_empty_line() {
        let err = RecordHeader::parse("\r\n").unwrap_err();
        assert_eq!(reason(err), MalformedReason::EmptyLine);
    }

    #[test]
    fn rejects_four_fields() {
        let err = RecordHeader::parse("http://x.test/ 1.2.3.4 20010101000000 5").unwrap_err();
        assert_eq!(reason(err), MalformedReason::FieldCount { found: 4 });
    }

    #[test]
    fn rejects_six_fields() {
        let err = RecordHeader::parse("http://x.test/ 1.2.3.4 20010101000000 text/html 5 7")
            .unwrap_err();
        assert_eq!(reason(err), MalformedReason::FieldCount { found: 6 });
    }

    #[test]
    fn double_space_is_an_empty_field() {
        let err = RecordHeader::parse("http://x.test/  1.2.3.4 20010101000000 text/html 5")
            .unwrap_err();
        assert_eq!(reason(err), MalformedReason::FieldCount { found: 6 });
    }

    #[test]
    fn rejects_negative_and_non_numeric_length() {
        for token in ["-1", "abc", "1.5", ""] {
            let line = format!("http://x.test/ 1.2.3.4 20010101000000 text/html {token}");
            let err = RecordHeader::parse(&line).unwrap_err();
            match reason(err) {
                MalformedReason::InvalidLength { .. } | MalformedReason::FieldCount { .. } => {}
                other => panic!("unexpected reason {other:?}"),
            }
        }
    }

    #[test]
    fn latin1_bytes_never_fail_decoding() {
        let line = b"http://x.test/\xe9t\xe9 1.2.3.4 20010101000000 text/html 0";
        let h = RecordHeader::parse_bytes(line).unwrap();
        assert_eq!(h.url, "http://x.test/\u{e9}t\u{e9}");
    }

    #[test]
    fn scheme_check_is_case_insensitive() {
        assert!(has_http_scheme("HTTP://x.test/"));
        assert!(has_http_scheme("hTtPs://x.test/"));
        assert!(!has_http_scheme("dns:x.test"));
        assert!(!has_http_scheme("filedesc://a.arc"));
        assert!(!has_http_scheme("http:/x"));
    }

    #[test]
    fn to_line_reproduces_input() {
        let line = "dns:x.test 1.2.3.4 20010101000000 text/dns 56";
        assert_eq!(RecordHeader::parse(line).unwrap().to_line(), line);
    }

    #[test]
    fn archive_date_is_strict() {
        let mut h = RecordHeader::parse("http://x.test/ 1.2.3.4 20010203040506 text/html 0").unwrap();
        let date = h.archive_date().unwrap();
        assert_eq!(date.to_string(), "2001-02-03 04:05:06");

        h.timestamp = "20120235000000".into();
        assert!(h.archive_date().is_none());
    }
}
