use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::source::UnitSource;

/// A compression format whose stream is a concatenation of units that
/// each decode independently.
///
/// `begin` must stop at the end of one unit and leave the reader
/// positioned at the next, so `finish` can hand it back untouched.
pub trait UnitCodec {
  type Decoder<B: BufRead>: Read;

  /// Start decoding one unit at the reader's position.
  ///
  /// # Errors
  ///
  /// Codec setup failures.
  fn begin<B: BufRead>(reader: B) -> io::Result<Self::Decoder<B>>;

  /// Recover the reader after the unit has been read to its end.
  fn finish<B: BufRead>(decoder: Self::Decoder<B>) -> B;
}

/// One gzip member per unit, the `.arc.gz` layout.
#[derive(Debug)]
pub struct Gzip;

impl UnitCodec for Gzip {
  type Decoder<B: BufRead> = flate2::bufread::GzDecoder<B>;

  fn begin<B: BufRead>(reader: B) -> io::Result<Self::Decoder<B>> {
    Ok(flate2::bufread::GzDecoder::new(reader))
  }

  fn finish<B: BufRead>(decoder: Self::Decoder<B>) -> B {
    decoder.into_inner()
  }
}

/// One zstd frame per unit.
#[derive(Debug)]
pub struct Zstd;

impl UnitCodec for Zstd {
  type Decoder<B: BufRead> = zstd::stream::read::Decoder<'static, B>;

  fn begin<B: BufRead>(reader: B) -> io::Result<Self::Decoder<B>> {
    Ok(zstd::stream::read::Decoder::with_buffer(reader)?.single_frame())
  }

  fn finish<B: BufRead>(decoder: Self::Decoder<B>) -> B {
    decoder.finish()
  }
}

pub type GzipMemberSource<R> = FramedSource<R, Gzip>;
pub type ZstdFrameSource<R> = FramedSource<R, Zstd>;

/// Compressed input read one unit at a time.
///
/// Positions count compressed bytes taken from the underlying reader, so
/// `bytes_consumed() == total_len()` once the last unit has been read
/// through its trailer.
pub struct FramedSource<R: Read, C: UnitCodec> {
  pos: Position<CountingReader<BufReader<R>>, C>,
  consumed: Arc<AtomicU64>,
  total_len: u64,
  touched: bool,
}

enum Position<B: BufRead, C: UnitCodec> {
  Between(B),
  InUnit(BufReader<C::Decoder<B>>),
  Detached,
}

impl<R: Read, C: UnitCodec> FramedSource<R, C> {
  /// Wrap `reader`. `total_len` is used only for progress reporting.
  pub fn new(reader: R, total_len: u64) -> Self {
    let consumed = Arc::new(AtomicU64::new(0));
    let counting = CountingReader {
      inner: BufReader::new(reader),
      count: Arc::clone(&consumed),
    };
    Self {
      pos: Position::Between(counting),
      consumed,
      total_len,
      touched: false,
    }
  }
}

impl<C: UnitCodec> FramedSource<File, C> {
  /// Open a file, taking its length from metadata.
  ///
  /// # Errors
  ///
  /// Failure to open or stat the file.
  pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
    let file = File::open(path)?;
    let total_len = file.metadata()?.len();
    Ok(Self::new(file, total_len))
  }
}

impl<R: Read, C: UnitCodec> UnitSource for FramedSource<R, C> {
  fn next_unit(&mut self) -> io::Result<bool> {
    let mut reader = match std::mem::replace(&mut self.pos, Position::Detached) {
      Position::Between(reader) => reader,
      Position::InUnit(mut unit) => {
        io::copy(&mut unit, &mut io::sink())?;
        C::finish(unit.into_inner())
      }
      Position::Detached => return Ok(false),
    };

    if reader.fill_buf()?.is_empty() {
      self.pos = Position::Between(reader);
      return Ok(false);
    }
    self.pos = Position::InUnit(BufReader::new(C::begin(reader)?));
    self.touched = false;
    Ok(true)
  }

  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    self.touched = true;
    match &mut self.pos {
      Position::InUnit(unit) => unit.read(buf),
      _ => Ok(0),
    }
  }

  fn read_line(&mut self, line: &mut Vec<u8>, limit: usize) -> io::Result<usize> {
    self.touched = true;
    match &mut self.pos {
      Position::InUnit(unit) => unit.take(limit as u64).read_until(b'\n', line),
      _ => Ok(0),
    }
  }

  fn at_unit_start(&self) -> bool {
    matches!(self.pos, Position::InUnit(_)) && !self.touched
  }

  fn bytes_consumed(&self) -> u64 {
    self.consumed.load(Ordering::Relaxed)
  }

  fn total_len(&self) -> u64 {
    self.total_len
  }

  fn release(&mut self) {
    self.pos = Position::Detached;
  }
}

/// Counts bytes handed to the codec, through both `Read` and `BufRead`.
struct CountingReader<B> {
  inner: B,
  count: Arc<AtomicU64>,
}

impl<B: BufRead> Read for CountingReader<B> {
  fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
    let n = self.inner.read(buf)?;
    self.count.fetch_add(n as u64, Ordering::Relaxed);
    Ok(n)
  }
}

impl<B: BufRead> BufRead for CountingReader<B> {
  fn fill_buf(&mut self) -> io::Result<&[u8]> {
    self.inner.fill_buf()
  }

  fn consume(&mut self, amt: usize) {
    self.inner.consume(amt);
    self.count.fetch_add(amt as u64, Ordering::Relaxed);
  }
}
