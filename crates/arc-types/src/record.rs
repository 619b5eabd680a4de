use std::cell::OnceCell;
use std::io::Write;

use arc_wire::envelope::{NO_STATUS, ParsedEnvelope, parse_envelope};
use arc_wire::RecordHeader;

use crate::anomaly::Anomalies;

/// One decoded ARC record: header fields, payload bytes, and a lazily
/// parsed protocol envelope.
///
/// The envelope is parsed the first time status, headers, or body are
/// requested and cached for the life of the payload. The cache records that
/// parsing was *attempted*: a payload without a usable envelope is scanned
/// once, not on every call. Any payload mutation resets it.
///
/// A `Record` can be reused across decoder calls; [`Record::clear`] keeps
/// the payload allocation.
#[derive(Clone, Debug, Default)]
pub struct Record {
  header: RecordHeader,
  payload: Vec<u8>,
  stream_pos: u64,
  anomalies: Anomalies,
  envelope: OnceCell<Option<ParsedEnvelope>>,
}

/// Zero-copy window onto the body portion of a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyView<'a> {
  payload: &'a [u8],
  offset: usize,
}

impl<'a> BodyView<'a> {
  /// Offset of the first body byte within the payload.
  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn len(&self) -> usize {
    self.payload.len() - self.offset
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn as_bytes(&self) -> &'a [u8] {
    &self.payload[self.offset..]
  }

  /// The whole payload the view points into.
  pub fn payload(&self) -> &'a [u8] {
    self.payload
  }
}

impl AsRef<[u8]> for BodyView<'_> {
  fn as_ref(&self) -> &[u8] {
    self.as_bytes()
  }
}

impl Record {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_parts(header: RecordHeader, payload: Vec<u8>) -> Self {
    Self {
      header,
      payload,
      ..Self::default()
    }
  }

  /// Reset to an empty record, keeping the payload allocation.
  pub fn clear(&mut self) {
    self.header = RecordHeader::default();
    self.payload.clear();
    self.stream_pos = 0;
    self.anomalies = Anomalies::NONE;
    self.envelope = OnceCell::new();
  }

  // ── Header ──────────────────────────────────────────────────────────

  pub fn header(&self) -> &RecordHeader {
    &self.header
  }

  pub fn set_header(&mut self, header: RecordHeader) {
    self.header = header;
    self.envelope = OnceCell::new();
  }

  pub fn url(&self) -> &str {
    &self.header.url
  }

  pub fn origin_address(&self) -> &str {
    &self.header.origin_address
  }

  pub fn timestamp(&self) -> &str {
    &self.header.timestamp
  }

  /// Content type as declared on the header line.
  pub fn content_type(&self) -> &str {
    &self.header.declared_content_type
  }

  pub fn declared_length(&self) -> u64 {
    self.header.declared_length
  }

  pub fn is_http(&self) -> bool {
    self.header.is_http()
  }

  // ── Payload ─────────────────────────────────────────────────────────

  pub fn payload(&self) -> &[u8] {
    &self.payload
  }

  pub fn payload_len(&self) -> usize {
    self.payload.len()
  }

  /// Mutable access to the payload buffer. Resets the envelope cache.
  pub fn payload_mut(&mut self) -> &mut Vec<u8> {
    self.envelope = OnceCell::new();
    &mut self.payload
  }

  pub fn set_payload(&mut self, payload: Vec<u8>) {
    self.payload = payload;
    self.envelope = OnceCell::new();
  }

  /// Grow the payload with bytes the declared length did not cover.
  ///
  /// Always logged: a record that needs this under-declared its length.
  pub fn append_payload(&mut self, bytes: &[u8]) {
    log::warn!(
      "{}: appending {} bytes to a {}-byte payload (declared {})",
      self.header.url,
      bytes.len(),
      self.payload.len(),
      self.header.declared_length
    );
    self.payload.extend_from_slice(bytes);
    self.anomalies.insert(Anomalies::APPENDED_PAYLOAD);
    self.envelope = OnceCell::new();
  }

  // ── Decode bookkeeping ──────────────────────────────────────────────

  /// Source position at which this record's unit started.
  pub fn stream_pos(&self) -> u64 {
    self.stream_pos
  }

  pub fn set_stream_pos(&mut self, pos: u64) {
    self.stream_pos = pos;
  }

  pub fn anomalies(&self) -> Anomalies {
    self.anomalies
  }

  pub fn flag(&mut self, anomaly: Anomalies) {
    self.anomalies.insert(anomaly);
  }

  // ── Protocol envelope ───────────────────────────────────────────────

  /// The parsed envelope, or `None` for non-HTTP URLs and payloads
  /// without a recognizable header block.
  pub fn envelope(&self) -> Option<&ParsedEnvelope> {
    self
      .envelope
      .get_or_init(|| {
        if !self.header.is_http() {
          return None;
        }
        match parse_envelope(&self.payload) {
          Ok(envelope) => {
            if !envelope.has_status() {
              log::warn!("{}: envelope has no numeric status code", self.header.url);
            }
            Some(envelope)
          }
          Err(e) => {
            log::warn!("{}: {e}", self.header.url);
            None
          }
        }
      })
      .as_ref()
  }

  /// Whether [`Record::envelope`] has run since the payload last changed.
  pub fn envelope_attempted(&self) -> bool {
    self.envelope.get().is_some()
  }

  /// Protocol status code, or `-1` when there is none.
  pub fn status_code(&self) -> i32 {
    self.envelope().map_or(NO_STATUS, |e| e.status_code)
  }

  pub fn http_headers(&self) -> Option<&[(String, String)]> {
    self.envelope().map(|e| e.headers.as_slice())
  }

  pub fn body(&self) -> Option<BodyView<'_>> {
    self.envelope().map(|e| BodyView {
      payload: &self.payload,
      offset: e.body_offset,
    })
  }

  // ── ARC text form ───────────────────────────────────────────────────

  /// Write the record back as ARC text: header line, payload, newline.
  ///
  /// The length field is rewritten to the actual payload length so the
  /// output is self-consistent even for short or appended payloads.
  ///
  /// # Errors
  ///
  /// Propagates write failures.
  pub fn write_arc(&self, w: &mut impl Write) -> std::io::Result<usize> {
    let line = RecordHeader {
      declared_length: self.payload.len() as u64,
      ..self.header.clone()
    }
    .to_line();
    w.write_all(line.as_bytes())?;
    w.write_all(b"\n")?;
    w.write_all(&self.payload)?;
    w.write_all(b"\n")?;
    Ok(line.len() + self.payload.len() + 2)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn http_record(payload: &[u8]) -> Record {
    let header =
      RecordHeader::parse(&format!("http://x.test/ 1.2.3.4 20010101000000 text/html {}", payload.len()))
        .unwrap();
    Record::from_parts(header, payload.to_vec())
  }

  #[test]
  fn envelope_is_lazy_and_memoized() {
    let record = http_record(b"HTTP/1.1 200 OK\r\nA: b\r\n\r\nbody");
    assert!(!record.envelope_attempted());
    assert_eq!(record.status_code(), 200);
    assert!(record.envelope_attempted());
    let first = record.envelope().unwrap() as *const ParsedEnvelope;
    let second = record.envelope().unwrap() as *const ParsedEnvelope;
    assert_eq!(first, second);
  }

  #[test]
  fn failed_parse_is_remembered() {
    let record = http_record(b"no envelope here");
    assert!(record.envelope().is_none());
    assert!(record.envelope_attempted());
    assert_eq!(record.status_code(), -1);
    assert!(record.body().is_none());
  }

  #[test]
  fn non_http_url_skips_parsing() {
    let header = RecordHeader::parse("dns:x.test 1.2.3.4 20010101000000 text/dns 4").unwrap();
    let record = Record::from_parts(header, b"HTTP/1.1 200 OK\r\n\r\n".to_vec());
    assert!(record.envelope().is_none());
    assert_eq!(record.status_code(), -1);
  }

  #[test]
  fn body_view_points_into_payload() {
    let record = http_record(b"HTTP/1.1 200 OK\r\n\r\n<p>hi</p>");
    let body = record.body().unwrap();
    assert_eq!(body.as_bytes(), b"<p>hi</p>");
    assert_eq!(body.offset(), 19);
    assert_eq!(body.len(), 9);
    assert!(std::ptr::eq(body.payload(), record.payload()));
  }

  #[test]
  fn append_payload_grows_and_resets_envelope() {
    let mut record = http_record(b"HTTP/1.1 200 OK\r\n");
    assert!(record.envelope().is_none());
    record.append_payload(b"\r\nbody");
    assert!(!record.envelope_attempted());
    assert_eq!(record.payload(), b"HTTP/1.1 200 OK\r\n\r\nbody");
    assert_eq!(record.status_code(), 200);
    assert!(record.anomalies().contains(Anomalies::APPENDED_PAYLOAD));
  }

  #[test]
  fn clear_keeps_capacity() {
    let mut record = http_record(&[b'x'; 1024]);
    record.flag(Anomalies::SHORT_PAYLOAD);
    record.clear();
    assert!(record.payload().is_empty());
    assert!(record.payload_mut().capacity() >= 1024);
    assert!(record.anomalies().is_empty());
    assert_eq!(record.url(), "");
  }

  #[test]
  fn write_arc_uses_actual_length() {
    let mut record = http_record(b"abcde");
    record.payload_mut().truncate(3);
    let mut out = Vec::new();
    let n = record.write_arc(&mut out).unwrap();
    assert_eq!(out, b"http://x.test/ 1.2.3.4 20010101000000 text/html 3\nabc\n");
    assert_eq!(n, out.len());
  }
}
