use std::path::Path;

use anyhow::{Context, Result};
use arc_decoder::{ArcDecoder, GzipMemberSource, UnitSource, ZstdFrameSource};

use crate::{DecodeOpts, InputFormat};

/// Any source the CLI can open, movable into a blocking task.
pub type Source = Box<dyn UnitSource + Send>;

/// `.zst`/`.zstd` means zstd frames; everything else is treated as gzip.
pub fn detect_format(path: &Path) -> InputFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("zst") || ext.eq_ignore_ascii_case("zstd") => {
            InputFormat::Zstd
        }
        _ => InputFormat::Gzip,
    }
}

/// Open `path` and consume its container description.
pub fn open_decoder(path: &Path, opts: &DecodeOpts) -> Result<ArcDecoder<Source>> {
    let format = opts.format.unwrap_or_else(|| detect_format(path));
    let source: Source = match format {
        InputFormat::Gzip => Box::new(
            GzipMemberSource::open(path)
                .with_context(|| format!("cannot open {}", path.display()))?,
        ),
        InputFormat::Zstd => Box::new(
            ZstdFrameSource::open(path)
                .with_context(|| format!("cannot open {}", path.display()))?,
        ),
    };
    log::debug!("opening {} as {format:?}", path.display());
    ArcDecoder::open_with_config(source, opts.config())
        .with_context(|| format!("{} is not a readable ARC container", path.display()))
}
