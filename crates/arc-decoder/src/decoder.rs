use arc_types::{Anomalies, Record};
use arc_wire::container::{ContainerHeader, MAX_CONTAINER_LINES};
use arc_wire::header::decode_latin1;
use arc_wire::{ContainerReason, MalformedReason, RecordHeader, WireError};

use crate::config::{DecoderConfig, SchemePolicy};
use crate::error::DecodeError;
use crate::payload::{probe, read_payload};
use crate::progress::ProgressHandle;
use crate::resync::{FailureBudget, skip_to_next_unit};
use crate::source::UnitSource;

/// Where the decoder stands.
///
/// ```text
///   AtBoundary ─► ParsingHeader ─► ReadingPayload ─► Emitted ─► AtBoundary
///                      │                 │              │
///                      └──── Resyncing ◄─┴──────────────┘ (trailing bytes)
///                                │
///                                └─► AtBoundary | Finished | Aborted
/// ```
///
/// Between calls the decoder is `AtBoundary` or in a terminal state. The
/// intermediate states are visible only if a call is interrupted by an
/// I/O failure, which moves the decoder to `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
  AtBoundary,
  ParsingHeader,
  ReadingPayload,
  Emitted,
  Resyncing,
  /// Clean end of input.
  Finished,
  /// Consecutive-failure bound reached.
  Aborted { count: u32, position: u64 },
  /// An I/O failure left the source position unknown.
  Failed,
  Closed,
}

impl DecoderState {
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      DecoderState::Finished | DecoderState::Aborted { .. } | DecoderState::Failed | DecoderState::Closed
    )
  }
}

/// Running totals since the decoder was opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderStats {
  pub emitted: u64,
  /// Records skipped because their header line was rejected.
  pub invalid: u64,
  pub short_payloads: u64,
  pub trailing_bytes: u64,
  pub non_http: u64,
  pub empty_units: u64,
  /// Unparsed bytes discarded while resynchronizing.
  pub skipped_bytes: u64,
}

/// Record decoder over a [`UnitSource`].
///
/// Opening consumes the container's `filedesc://` unit. Each later unit
/// holds one record: a five-field header line followed by
/// `declared_length` payload bytes. Damage inside a unit costs that unit
/// only; the decoder logs it, skips to the next unit, and carries on until
/// `max_consecutive_invalid` units in a row have failed.
///
/// # Example
///
/// ```rust,no_run
/// use arc_decoder::{ArcDecoder, GzipMemberSource};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = GzipMemberSource::open("crawl.arc.gz")?;
/// for record in ArcDecoder::open(source)? {
///     let record = record?;
///     println!("{} {}", record.status_code(), record.url());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ArcDecoder<S: UnitSource> {
  source: S,
  config: DecoderConfig,
  container: ContainerHeader,
  state: DecoderState,
  budget: FailureBudget,
  stats: DecoderStats,
  progress: ProgressHandle,
  /// Source position where the current unit started.
  unit_start: u64,
  line: Vec<u8>,
  probe: Vec<u8>,
}

impl<S: UnitSource> ArcDecoder<S> {
  /// Open with [`DecoderConfig::default`].
  ///
  /// # Errors
  ///
  /// See [`ArcDecoder::open_with_config`].
  pub fn open(source: S) -> Result<Self, DecodeError> {
    Self::open_with_config(source, DecoderConfig::default())
  }

  /// Read and validate the container description, leaving the decoder at
  /// the first record unit.
  ///
  /// # Errors
  ///
  /// - [`DecodeError::InvalidContainerHeader`] if the first unit is
  ///   missing or is not a valid `filedesc://` description.
  /// - [`DecodeError::Io`] on source failure.
  pub fn open_with_config(mut source: S, config: DecoderConfig) -> Result<Self, DecodeError> {
    let progress = ProgressHandle::new(source.total_len());
    let container = read_container(&mut source, line_limit(&config))?;

    let mut decoder = Self {
      source,
      budget: FailureBudget::new(config.max_consecutive_invalid),
      probe: vec![0u8; config.probe_len],
      config,
      container,
      state: DecoderState::Resyncing,
      stats: DecoderStats::default(),
      progress,
      unit_start: 0,
      line: Vec::with_capacity(256),
    };
    decoder.advance()?;
    decoder.publish();
    Ok(decoder)
  }

  /// Decode the next record into `record`, reusing its buffers.
  ///
  /// Returns `Ok(false)` at the end of input and on every call after
  /// [`close`](Self::close).
  ///
  /// # Errors
  ///
  /// - [`DecodeError::TooManyConsecutiveInvalidRecords`] once the failure
  ///   bound is reached, and again on every later call.
  /// - [`DecodeError::Io`] on source failure, then
  ///   [`DecodeError::Halted`] on every later call.
  pub fn next_record(&mut self, record: &mut Record) -> Result<bool, DecodeError> {
    let result = self.decode_next(record);
    if let Err(DecodeError::Io(e)) = &result {
      log::error!("I/O failure at position {}: {e}", self.source.bytes_consumed());
      self.state = DecoderState::Failed;
    }
    self.publish();
    result
  }

  /// Bytes consumed from the source so far.
  pub fn position(&self) -> u64 {
    self.source.bytes_consumed()
  }

  /// Fraction of the input consumed, in `[0.0, 1.0]`.
  pub fn progress(&self) -> f32 {
    self.publish();
    self.progress.fraction()
  }

  /// A handle that can be polled from another thread.
  pub fn progress_handle(&self) -> ProgressHandle {
    self.progress.clone()
  }

  pub fn stats(&self) -> DecoderStats {
    self.stats
  }

  pub fn state(&self) -> DecoderState {
    self.state
  }

  pub fn container(&self) -> &ContainerHeader {
    &self.container
  }

  pub fn config(&self) -> &DecoderConfig {
    &self.config
  }

  /// Release the source. Safe to call more than once.
  pub fn close(&mut self) {
    if self.state == DecoderState::Closed {
      return;
    }
    self.publish();
    self.source.release();
    self.state = DecoderState::Closed;
    log::debug!("decoder closed at position {}", self.source.bytes_consumed());
  }

  // ── State machine ───────────────────────────────────────────────────

  fn decode_next(&mut self, record: &mut Record) -> Result<bool, DecodeError> {
    loop {
      match self.state {
        DecoderState::Finished | DecoderState::Closed => return Ok(false),
        DecoderState::Aborted { count, position } => {
          return Err(DecodeError::TooManyConsecutiveInvalidRecords { count, position });
        }
        DecoderState::Failed => return Err(DecodeError::Halted),
        _ => {}
      }

      self.state = DecoderState::ParsingHeader;
      self.line.clear();
      if self.source.read_line(&mut self.line, line_limit(&self.config))? == 0 {
        self.stats.empty_units += 1;
        log::debug!("empty unit at position {}", self.unit_start);
        self.advance()?;
        continue;
      }

      match self.validate_header() {
        Ok(header) => {
          self.read_record(header, record)?;
          return Ok(true);
        }
        Err(e) => self.reject(&e)?,
      }
    }
  }

  fn validate_header(&self) -> Result<RecordHeader, WireError> {
    let limit = line_limit(&self.config);
    if is_truncated(&self.line, limit) {
      return Err(WireError::MalformedRecord {
        reason: MalformedReason::LineTooLong { limit },
      });
    }
    let header = RecordHeader::parse_bytes(&self.line)?;
    if header.declared_length > self.config.max_payload_len {
      return Err(WireError::MalformedRecord {
        reason: MalformedReason::PayloadTooLarge {
          declared: header.declared_length,
          limit: self.config.max_payload_len,
        },
      });
    }
    if self.config.scheme_policy == SchemePolicy::Reject && !header.is_http() {
      return Err(WireError::MalformedRecord {
        reason: MalformedReason::SchemeRejected { url: header.url },
      });
    }
    Ok(header)
  }

  fn read_record(&mut self, header: RecordHeader, record: &mut Record) -> Result<(), DecodeError> {
    self.state = DecoderState::ReadingPayload;
    let declared = usize::try_from(header.declared_length).unwrap_or(usize::MAX);

    record.clear();
    record.set_stream_pos(self.unit_start);
    if !header.is_http() {
      log::warn!("{}: not an http:// or https:// URL", header.url);
      record.flag(Anomalies::NON_HTTP_SCHEME);
      self.stats.non_http += 1;
    }
    record.set_header(header);

    let read = read_payload(&mut self.source, declared, record.payload_mut())?;
    if read.short {
      log::warn!(
        "{}: declared {declared} payload bytes, unit held {}",
        record.url(),
        read.actual_length
      );
      record.flag(Anomalies::SHORT_PAYLOAD);
      self.stats.short_payloads += 1;
    }

    let probed = probe(&mut self.source, &mut self.probe)?;
    self.state = DecoderState::Emitted;
    self.budget.reset();
    self.stats.emitted += 1;

    if probed > 0 {
      let rest = self.source.skip_unit()?;
      let separator_only = self.config.allow_record_separator
        && rest == 0
        && self.probe[..probed].iter().all(|&b| b == b'\n' || b == b'\r');
      if !separator_only {
        log::warn!(
          "{}: {} bytes of unexpected content after the declared {declared}-byte payload",
          record.url(),
          probed as u64 + rest
        );
        record.flag(Anomalies::TRAILING_BYTES);
        self.stats.trailing_bytes += 1;
        self.stats.skipped_bytes += probed as u64 + rest;
        self.state = DecoderState::Resyncing;
      }
    }

    log::debug!(
      "record at {}: {} {} bytes",
      record.stream_pos(),
      record.url(),
      record.payload_len()
    );
    self.advance()
  }

  /// Count a rejected unit, skip past it, and abort if the bound is hit.
  fn reject(&mut self, err: &WireError) -> Result<(), DecodeError> {
    self.stats.invalid += 1;
    log::warn!(
      "invalid record at position {}: {err}; skipping to next unit",
      self.unit_start
    );
    self.state = DecoderState::Resyncing;
    self.advance()?;

    if self.budget.record_failure() {
      let count = self.budget.consecutive();
      let position = self.source.bytes_consumed();
      log::error!("giving up after {count} consecutive invalid records at position {position}");
      self.state = DecoderState::Aborted { count, position };
      return Err(DecodeError::TooManyConsecutiveInvalidRecords { count, position });
    }
    Ok(())
  }

  /// Drain the current unit and enter the next. No-op at a boundary.
  fn advance(&mut self) -> Result<(), DecodeError> {
    if self.state == DecoderState::AtBoundary {
      return Ok(());
    }
    let resynced = skip_to_next_unit(&mut self.source)?;
    if resynced.skipped > 0 {
      log::debug!("discarded {} bytes of unit at {}", resynced.skipped, self.unit_start);
      self.stats.skipped_bytes += resynced.skipped;
    }
    self.unit_start = resynced.next_start;
    self.state = if resynced.has_next {
      DecoderState::AtBoundary
    } else {
      self.progress.finish();
      DecoderState::Finished
    };
    Ok(())
  }

  fn publish(&self) {
    self.progress.publish(self.source.bytes_consumed());
  }
}

impl<S: UnitSource> Iterator for ArcDecoder<S> {
  type Item = Result<Record, DecodeError>;

  /// Yields each record in a fresh allocation. A fatal error is yielded
  /// once, then iteration ends.
  fn next(&mut self) -> Option<Self::Item> {
    if self.state.is_terminal() {
      return None;
    }
    let mut record = Record::new();
    match self.next_record(&mut record) {
      Ok(true) => Some(Ok(record)),
      Ok(false) => None,
      Err(e) => Some(Err(e)),
    }
  }
}

fn line_limit(config: &DecoderConfig) -> usize {
  config.max_header_line.max(1)
}

/// A line that filled `limit` bytes without reaching its newline.
fn is_truncated(line: &[u8], limit: usize) -> bool {
  line.len() >= limit && line.last() != Some(&b'\n')
}

/// Read the lines of the first unit and validate them.
fn read_container<S: UnitSource>(source: &mut S, limit: usize) -> Result<ContainerHeader, DecodeError> {
  let mut lines = Vec::with_capacity(MAX_CONTAINER_LINES);
  if source.next_unit()? {
    let mut raw = Vec::new();
    while lines.len() < MAX_CONTAINER_LINES {
      raw.clear();
      if source.read_line(&mut raw, limit)? == 0 {
        break;
      }
      if is_truncated(&raw, limit) {
        return Err(DecodeError::InvalidContainerHeader(WireError::InvalidContainerHeader {
          reason: ContainerReason::LineTooLong {
            line: lines.len() + 1,
            limit,
          },
        }));
      }
      lines.push(decode_latin1(&raw).trim_end_matches(['\r', '\n']).to_string());
    }
  }

  let container = ContainerHeader::from_lines(&lines).map_err(DecodeError::InvalidContainerHeader)?;
  log::debug!(
    "container {}: {} | fields: {}",
    container.file_name(),
    container.version_line,
    container.field_names.join(" ")
  );
  if container.trailer_lines > 1 {
    log::warn!(
      "container description has {} extra lines after the blank line",
      container.trailer_lines
    );
  }
  Ok(container)
}
