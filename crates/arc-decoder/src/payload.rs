use std::io;

use crate::source::UnitSource;

/// Growth step for the payload buffer. A corrupt length that slipped
/// under the payload limit costs at most one step of unused allocation.
const READ_CHUNK: usize = 64 * 1024;

/// Outcome of one payload read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadRead {
  pub actual_length: usize,
  /// The unit ended before `declared_length` bytes arrived.
  pub short: bool,
}

/// Read up to `declared_length` bytes of the current unit into `buf`.
///
/// `buf` is cleared first and holds exactly the bytes read afterwards.
///
/// # Errors
///
/// Propagates source failures other than `Interrupted`.
pub fn read_payload<S: UnitSource + ?Sized>(
  source: &mut S,
  declared_length: usize,
  buf: &mut Vec<u8>,
) -> io::Result<PayloadRead> {
  buf.clear();
  while buf.len() < declared_length {
    let start = buf.len();
    let want = (declared_length - start).min(READ_CHUNK);
    buf.resize(start + want, 0);
    let n = read_some(source, &mut buf[start..])?;
    buf.truncate(start + n);
    if n == 0 {
      break;
    }
  }
  Ok(PayloadRead {
    actual_length: buf.len(),
    short: buf.len() < declared_length,
  })
}

/// Read up to `window.len()` bytes, filling as much as the unit allows.
///
/// # Errors
///
/// Propagates source failures other than `Interrupted`.
pub fn probe<S: UnitSource + ?Sized>(source: &mut S, window: &mut [u8]) -> io::Result<usize> {
  let mut filled = 0;
  while filled < window.len() {
    let n = read_some(source, &mut window[filled..])?;
    if n == 0 {
      break;
    }
    filled += n;
  }
  Ok(filled)
}

fn read_some<S: UnitSource + ?Sized>(source: &mut S, buf: &mut [u8]) -> io::Result<usize> {
  loop {
    match source.read(buf) {
      Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
      other => return other,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::MemoryUnitSource;

  fn entered(unit: &[u8]) -> MemoryUnitSource {
    let mut src = MemoryUnitSource::new([unit.to_vec()]);
    src.next_unit().unwrap();
    src
  }

  #[test]
  fn exact_length() {
    let mut src = entered(b"abcde");
    let mut buf = Vec::new();
    let read = read_payload(&mut src, 5, &mut buf).unwrap();
    assert_eq!(read, PayloadRead { actual_length: 5, short: false });
    assert_eq!(buf, b"abcde");
  }

  #[test]
  fn short_unit_truncates() {
    let mut src = entered(b"abc");
    let mut buf = b"stale".to_vec();
    let read = read_payload(&mut src, 10, &mut buf).unwrap();
    assert_eq!(read, PayloadRead { actual_length: 3, short: true });
    assert_eq!(buf, b"abc");
  }

  #[test]
  fn spans_several_chunks() {
    let unit = vec![7u8; READ_CHUNK * 2 + 17];
    let mut src = entered(&unit);
    let mut buf = Vec::new();
    let read = read_payload(&mut src, unit.len(), &mut buf).unwrap();
    assert!(!read.short);
    assert_eq!(buf, unit);
  }

  #[test]
  fn zero_length_reads_nothing() {
    let mut src = entered(b"xyz");
    let mut buf = Vec::new();
    let read = read_payload(&mut src, 0, &mut buf).unwrap();
    assert_eq!(read.actual_length, 0);
    let mut tail = [0u8; 8];
    assert_eq!(probe(&mut src, &mut tail).unwrap(), 3);
  }

  #[test]
  fn probe_on_exhausted_unit() {
    let mut src = entered(b"ab");
    let mut buf = Vec::new();
    read_payload(&mut src, 2, &mut buf).unwrap();
    let mut tail = [0u8; 64];
    assert_eq!(probe(&mut src, &mut tail).unwrap(), 0);
  }
}
