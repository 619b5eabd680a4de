use crate::error::{ProtocolReason, WireError};
use crate::header::{decode_latin1, starts_with_ignore_case};

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Line prefixes that start a body even when no blank line precedes them.
/// Compared case-insensitively.
pub const MARKUP_OPENERS: [&[u8]; 3] = [b"<!doctype", b"<?xml", b"<html"];

/// Sentinel status code for an absent or non-numeric status.
pub const NO_STATUS: i32 = -1;

/// How the header/body boundary was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    /// `CR LF CR LF` terminated the header block.
    BlankLine,
    /// A line opened with markup before any blank line was seen.
    Markup,
}

// ── Boundary scan ───────────────────────────────────────────────────────

/// Progress toward `CR LF CR LF`.
///
/// ```text
///            CR          LF          CR          LF
///   None ───────► Cr ───────► CrLf ───────► CrLfCr ───────► Done
///               ▲  │CR                        │CR
///               └──┴──────────────────────────┘
/// ```
///
/// Any other byte, or an LF outside `Cr`/`CrLfCr`, returns to `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scan {
    None,
    Cr,
    CrLf,
    CrLfCr,
    Done,
}

impl Scan {
    fn step(self, byte: u8) -> Self {
        match (self, byte) {
            (Scan::None, CR) | (Scan::Cr, CR) | (Scan::CrLfCr, CR) => Scan::Cr,
            (Scan::CrLf, CR) => Scan::CrLfCr,
            (Scan::Cr, LF) => Scan::CrLf,
            (Scan::CrLfCr, LF) => Scan::Done,
            _ => Scan::None,
        }
    }
}

/// Locate the start of the body.
///
/// Returns the offset of the first body byte and how it was found, or
/// `None` if the payload ends inside the header block. The status line is
/// never checked for markup, so a bare HTML document without an HTTP
/// envelope does not produce an empty header block.
pub fn find_body_start(payload: &[u8]) -> Option<(usize, BoundaryKind)> {
    let mut state = Scan::None;
    let mut line_start = 0;
    let mut line_no = 0usize;

    for (i, &byte) in payload.iter().enumerate() {
        if i == line_start && line_no > 0 && starts_with_markup(&payload[i..]) {
            return Some((i, BoundaryKind::Markup));
        }

        state = state.step(byte);
        if state == Scan::Done {
            return Some((i + 1, BoundaryKind::BlankLine));
        }
        if byte == LF {
            line_start = i + 1;
            line_no += 1;
        }
    }
    None
}

fn starts_with_markup(line: &[u8]) -> bool {
    MARKUP_OPENERS
        .iter()
        .any(|opener| starts_with_ignore_case(line, opener))
}

// ── Parsed envelope ─────────────────────────────────────────────────────

/// Status line and headers at the front of a payload.
///
/// Headers keep wire order and duplicates. Names and values are decoded
/// byte-for-char, so no header can fail on encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedEnvelope {
    /// Numeric status, or [`NO_STATUS`].
    pub status_code: i32,
    pub protocol: String,
    pub reason_phrase: Option<String>,
    pub headers: Vec<(String, String)>,
    /// Offset of the first body byte within the payload.
    pub body_offset: usize,
    pub boundary: BoundaryKind,
}

impl ParsedEnvelope {
    pub fn has_status(&self) -> bool {
        self.status_code != NO_STATUS
    }

    /// First value of header `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value of header `name`, in wire order.
    pub fn header_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Media type from `Content-Type`, without parameters.
    pub fn content_type(&self) -> Option<&str> {
        let raw = self.header("content-type")?;
        let media = raw.split(';').next().unwrap_or_default().trim();
        (!media.is_empty()).then_some(media)
    }

    /// Declared `charset=` parameter of `Content-Type`, lowercased.
    pub fn charset(&self) -> Option<String> {
        let raw = self.header("content-type")?;
        raw.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("charset") {
                return None;
            }
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then(|| value.to_ascii_lowercase())
        })
    }
}

/// Parse the protocol envelope at the front of `payload`.
///
/// A non-numeric status code does not fail the parse: the envelope is
/// returned with [`NO_STATUS`].
///
/// # Errors
///
/// [`WireError::ProtocolParse`] when no header/body boundary exists or the
/// status line is empty.
pub fn parse_envelope(payload: &[u8]) -> Result<ParsedEnvelope, WireError> {
    let (body_offset, boundary) =
        find_body_start(payload).ok_or(WireError::ProtocolParse {
            reason: ProtocolReason::BoundaryNotFound,
        })?;

    let mut lines = payload[..body_offset]
        .split(|&b| b == LF)
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line));

    let status_line = lines.next().unwrap_or_default();
    if status_line.iter().all(u8::is_ascii_whitespace) {
        return Err(WireError::ProtocolParse {
            reason: ProtocolReason::EmptyStatusLine,
        });
    }
    let (protocol, status_code, reason_phrase) = parse_status_line(status_line);

    let mut headers: Vec<(String, String)> = Vec::new();
    for line in lines {
        if line.iter().all(u8::is_ascii_whitespace) {
            break;
        }
        if matches!(line[0], b' ' | b'\t') {
            match headers.last_mut() {
                Some((_, value)) => {
                    let more = decode_latin1(line);
                    value.push(' ');
                    value.push_str(more.trim());
                }
                None => log::debug!("continuation line before any header, skipped"),
            }
            continue;
        }
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            log::debug!("header line without colon skipped: {:?}", decode_latin1(line));
            continue;
        };
        headers.push((
            decode_latin1(&line[..colon]).trim_end().to_string(),
            decode_latin1(&line[colon + 1..]).trim().to_string(),
        ));
    }

    Ok(ParsedEnvelope {
        status_code,
        protocol,
        reason_phrase,
        headers,
        body_offset,
        boundary,
    })
}

/// `<protocol> <code> [<reason phrase>]`.
fn parse_status_line(line: &[u8]) -> (String, i32, Option<String>) {
    let text = decode_latin1(line);
    let mut parts = text.trim().splitn(3, ' ');
    let protocol = parts.next().unwrap_or_default().to_string();
    let code_token = parts.next().unwrap_or_default();
    let status_code = if !code_token.is_empty() && code_token.bytes().all(|b| b.is_ascii_digit())
    {
        code_token.parse::<i32>().unwrap_or(NO_STATUS)
    } else {
        NO_STATUS
    };
    if status_code == NO_STATUS {
        log::debug!("status line {text:?} has no numeric status code");
    }
    let reason_phrase = parts
        .next()
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .map(str::to_string);
    (protocol, status_code, reason_phrase)
}
