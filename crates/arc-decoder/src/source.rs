use std::collections::VecDeque;
use std::io::{self, BufRead, Cursor, Read};

/// Sequential bytes from a succession of independently decodable units.
///
/// A unit is one gzip member in a `.arc.gz` file: exactly one record (or
/// the container description) per unit. Reads never cross a unit
/// boundary: `read` returns `0` at the end of the current unit and
/// [`next_unit`](Self::next_unit) must be called to continue.
///
/// ```text
///   next_unit ─► read/read_line ... 0 ─► next_unit ─► ... ─► false
///                       │
///                       └─ skip_unit drains the rest early
/// ```
pub trait UnitSource {
  /// Move to the start of the next unit, discarding whatever is left of
  /// the current one. Returns `false` when the input holds no more units.
  ///
  /// # Errors
  ///
  /// I/O or decompression failures.
  fn next_unit(&mut self) -> io::Result<bool>;

  /// Read from the current unit. `Ok(0)` means the unit is exhausted.
  ///
  /// # Errors
  ///
  /// I/O or decompression failures.
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

  /// Append bytes up to and including the next `\n` of the current unit,
  /// stopping after `limit` bytes if no newline turns up first. Returns
  /// bytes appended; `0` at the end of the unit.
  ///
  /// # Errors
  ///
  /// I/O or decompression failures.
  fn read_line(&mut self, line: &mut Vec<u8>, limit: usize) -> io::Result<usize> {
    let mut byte = [0u8; 1];
    let mut n = 0;
    while n < limit {
      match self.read(&mut byte) {
        Ok(0) => break,
        Ok(_) => {
          n += 1;
          line.push(byte[0]);
          if byte[0] == b'\n' {
            break;
          }
        }
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
        Err(e) => return Err(e),
      }
    }
    Ok(n)
  }

  /// Drain the current unit, returning the number of bytes discarded.
  ///
  /// # Errors
  ///
  /// I/O or decompression failures.
  fn skip_unit(&mut self) -> io::Result<u64> {
    let mut scratch = [0u8; 8192];
    let mut skipped = 0u64;
    loop {
      match self.read(&mut scratch) {
        Ok(0) => return Ok(skipped),
        Ok(n) => skipped += n as u64,
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
        Err(e) => return Err(e),
      }
    }
  }

  /// `true` when a unit has been entered and nothing has been read from
  /// it yet, not even a zero-length read.
  fn at_unit_start(&self) -> bool;

  /// Bytes taken from the underlying input so far. Never decreases.
  fn bytes_consumed(&self) -> u64;

  /// Size of the underlying input, or `0` if unknown.
  fn total_len(&self) -> u64;

  /// Drop the underlying input. Later reads return end of input.
  fn release(&mut self) {}
}

impl<S: UnitSource + ?Sized> UnitSource for Box<S> {
  fn next_unit(&mut self) -> io::Result<bool> {
    (**self).next_unit()
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    (**self).read(buf)
  }

  fn read_line(&mut self, line: &mut Vec<u8>, limit: usize) -> io::Result<usize> {
    (**self).read_line(line, limit)
  }

  fn skip_unit(&mut self) -> io::Result<u64> {
    (**self).skip_unit()
  }

  fn at_unit_start(&self) -> bool {
    (**self).at_unit_start()
  }

  fn bytes_consumed(&self) -> u64 {
    (**self).bytes_consumed()
  }

  fn total_len(&self) -> u64 {
    (**self).total_len()
  }

  fn release(&mut self) {
    (**self).release();
  }
}

/// Units held in memory, already decompressed.
///
/// Positions count decompressed bytes. Useful for tests and for callers
/// that do their own framing.
#[derive(Debug, Default)]
pub struct MemoryUnitSource {
  pending: VecDeque<Vec<u8>>,
  current: Option<Cursor<Vec<u8>>>,
  /// Bytes of units already left behind.
  completed: u64,
  total: u64,
  touched: bool,
}

impl MemoryUnitSource {
  #[must_use]
  pub fn new<I, U>(units: I) -> Self
  where
    I: IntoIterator<Item = U>,
    U: Into<Vec<u8>>,
  {
    let pending: VecDeque<Vec<u8>> = units.into_iter().map(Into::into).collect();
    let total = pending.iter().map(|u| u.len() as u64).sum();
    Self {
      pending,
      current: None,
      completed: 0,
      total,
      touched: false,
    }
  }

  /// Units not yet entered.
  pub fn remaining_units(&self) -> usize {
    self.pending.len()
  }
}

impl UnitSource for MemoryUnitSource {
  fn next_unit(&mut self) -> io::Result<bool> {
    if let Some(unit) = self.current.take() {
      self.completed += unit.get_ref().len() as u64;
    }
    match self.pending.pop_front() {
      Some(unit) => {
        self.current = Some(Cursor::new(unit));
        self.touched = false;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.touched = true;
    match self.current.as_mut() {
      Some(unit) => unit.read(buf),
      None => Ok(0),
    }
  }

  fn read_line(&mut self, line: &mut Vec<u8>, limit: usize) -> io::Result<usize> {
    self.touched = true;
    match self.current.as_mut() {
      Some(unit) => unit.take(limit as u64).read_until(b'\n', line),
      None => Ok(0),
    }
  }

  fn at_unit_start(&self) -> bool {
    self.current.is_some() && !self.touched
  }

  fn bytes_consumed(&self) -> u64 {
    self.completed + self.current.as_ref().map_or(0, Cursor::position)
  }

  fn total_len(&self) -> u64 {
    self.total
  }

  fn release(&mut self) {
    if let Some(unit) = self.current.take() {
      self.completed += unit.position();
    }
    self.pending.clear();
  }
}
