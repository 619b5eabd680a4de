//! Fixed binary layout for handing records between processing stages.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ url_len        u16 BE                        │
//! │ url            [url_len] UTF-8               │
//! │ addr_len       u16 BE                        │
//! │ origin_address [addr_len] UTF-8              │
//! │ ctype_len      u16 BE                        │
//! │ content_type   [ctype_len] UTF-8             │
//! │ timestamp      i64 BE, ms since epoch (UTC)  │
//! │ declared_len   u64 BE                        │
//! │ payload_len    u64 BE                        │
//! │ payload        [payload_len] raw             │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Records concatenate with no separator; [`decode_from`] reports how many
//! bytes one record occupied. Envelope state and anomalies are not carried.

use std::io::Write;

use arc_wire::RecordHeader;
use arc_wire::timestamp::{from_epoch_millis, to_epoch_millis};
use bytes::{Buf, BufMut};

use crate::error::SerializeError;
use crate::record::Record;

/// Bytes taken by the three length prefixes and three fixed-width fields.
pub const FIXED_LEN: usize = 3 * 2 + 8 + 8 + 8;

/// Exact encoded size of `record`.
pub fn encoded_len(record: &Record) -> usize {
  FIXED_LEN
    + record.url().len()
    + record.origin_address().len()
    + record.content_type().len()
    + record.payload_len()
}

/// Encode `record` into a new buffer.
///
/// # Errors
///
/// [`SerializeError::InvalidTimestamp`] if the archive date is not 14
/// digits, [`SerializeError::FieldTooLong`] if a string exceeds 65535 bytes.
pub fn encode(record: &Record) -> Result<Vec<u8>, SerializeError> {
  let mut buf = Vec::with_capacity(encoded_len(record));
  encode_into(record, &mut buf)?;
  Ok(buf)
}

/// Encode `record` onto the end of `buf`, returning bytes written.
///
/// Nothing is written if validation fails.
///
/// # Errors
///
/// Same as [`encode`].
pub fn encode_into(record: &Record, buf: &mut impl BufMut) -> Result<usize, SerializeError> {
  let millis = to_epoch_millis(record.timestamp())?;
  let url = checked_len("url", record.url())?;
  let addr = checked_len("origin_address", record.origin_address())?;
  let ctype = checked_len("content_type", record.content_type())?;

  put_str(buf, url, record.url());
  put_str(buf, addr, record.origin_address());
  put_str(buf, ctype, record.content_type());
  buf.put_i64(millis);
  buf.put_u64(record.declared_length());
  buf.put_u64(record.payload_len() as u64);
  buf.put_slice(record.payload());

  Ok(encoded_len(record))
}

/// Encode `record` straight to a writer.
///
/// # Errors
///
/// Same as [`encode`], plus [`SerializeError::Io`].
pub fn encode_to(record: &Record, w: &mut impl Write) -> Result<usize, SerializeError> {
  let buf = encode(record)?;
  w.write_all(&buf)?;
  Ok(buf.len())
}

/// Decode exactly one record occupying all of `buf`.
///
/// # Errors
///
/// Everything [`decode_from`] returns, plus
/// [`SerializeError::TrailingBytes`] if bytes remain after the record.
pub fn decode(buf: &[u8]) -> Result<Record, SerializeError> {
  let (record, consumed) = decode_from(buf)?;
  if consumed != buf.len() {
    return Err(SerializeError::TrailingBytes {
      extra_bytes: buf.len() - consumed,
    });
  }
  Ok(record)
}

/// Decode one record from the front of `buf`.
///
/// Returns the record and the number of bytes it occupied. The payload
/// length prefix is checked against the remaining input before anything is
/// allocated.
///
/// # Errors
///
/// - [`SerializeError::TruncatedRecord`] if `buf` ends inside the record.
/// - [`SerializeError::InvalidUtf8`] for a non-UTF-8 string field.
/// - [`SerializeError::TimestampOutOfRange`] for an unrenderable date.
pub fn decode_from(buf: &[u8]) -> Result<(Record, usize), SerializeError> {
  let mut cur = Reader { buf, rest: buf };

  let url = cur.string("url")?;
  let origin_address = cur.string("origin_address")?;
  let declared_content_type = cur.string("content_type")?;

  cur.need(8)?;
  let millis = cur.rest.get_i64();
  let timestamp =
    from_epoch_millis(millis).ok_or(SerializeError::TimestampOutOfRange { millis })?;

  cur.need(16)?;
  let declared_length = cur.rest.get_u64();
  let payload_len = cur.rest.get_u64();
  cur.need(payload_len)?;
  let payload_len = usize::try_from(payload_len).map_err(|_| cur.truncated(payload_len))?;
  let payload = cur.rest[..payload_len].to_vec();
  cur.rest.advance(payload_len);

  let header = RecordHeader {
    url,
    origin_address,
    timestamp,
    declared_content_type,
    declared_length,
  };
  Ok((Record::from_parts(header, payload), cur.offset()))
}

fn checked_len(field: &'static str, value: &str) -> Result<u16, SerializeError> {
  u16::try_from(value.len()).map_err(|_| SerializeError::FieldTooLong {
    field,
    len: value.len(),
  })
}

fn put_str(buf: &mut impl BufMut, len: u16, value: &str) {
  buf.put_u16(len);
  buf.put_slice(value.as_bytes());
}

/// Bounds-checked cursor over the input.
struct Reader<'a> {
  buf: &'a [u8],
  rest: &'a [u8],
}

impl Reader<'_> {
  fn offset(&self) -> usize {
    self.buf.len() - self.rest.len()
  }

  fn truncated(&self, needed: u64) -> SerializeError {
    SerializeError::TruncatedRecord {
      offset: self.offset(),
      needed,
      available: self.rest.remaining(),
    }
  }

  fn need(&self, n: u64) -> Result<(), SerializeError> {
    if (self.rest.remaining() as u64) < n {
      return Err(self.truncated(n));
    }
    Ok(())
  }

  fn string(&mut self, field: &'static str) -> Result<String, SerializeError> {
    self.need(2)?;
    let len = usize::from(self.rest.get_u16());
    self.need(len as u64)?;
    let value = std::str::from_utf8(&self.rest[..len])
      .map_err(|_| SerializeError::InvalidUtf8 { field })?
      .to_string();
    self.rest.advance(len);
    Ok(value)
  }
}
