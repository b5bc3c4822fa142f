//! Overlapped chunk reader.
//!
//! Keeps `in_flight` positioned reads outstanding on tokio's blocking pool and
//! hands finished pages to a synchronous sink in file order. Slot `i` is always
//! awaited before slot `i + 1`, and slots are reissued at the next unread
//! offset, so the round-robin order is the offset order.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::index::NameIndex;
use crate::parser::Parser;

pub const DEFAULT_PAGE_SIZE: usize = 8192;
pub const DEFAULT_IN_FLIGHT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Bytes requested by each read.
    pub page_size: usize,
    /// Number of buffers, each with one outstanding read.
    pub in_flight: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            in_flight: DEFAULT_IN_FLIGHT,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_config("page_size", "must be at least 1 byte"));
        }
        if self.in_flight < 2 {
            return Err(Error::invalid_config(
                "in_flight",
                format!("must be at least 2, got {}", self.in_flight),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub bytes: u64,
    pub chunks: u64,
}

type PendingRead = JoinHandle<io::Result<(Vec<u8>, usize)>>;

struct Source {
    file: Arc<File>,
    path: PathBuf,
}

impl Source {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(e, path))?;
        Ok(Self {
            file: Arc::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Starts filling `buf` from `offset` on the blocking pool.
    fn read(&self, mut buf: Vec<u8>, offset: u64) -> PendingRead {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || {
            let n = read_full_at(&file, &mut buf, offset)?;
            Ok((buf, n))
        })
    }

    async fn complete(&self, pending: PendingRead) -> Result<(Vec<u8>, usize)> {
        match pending.await {
            Ok(res) => res.map_err(|e| Error::io(e, &self.path)),
            Err(join) => Err(Error::io(io::Error::other(join), &self.path)),
        }
    }
}

/// Reads until `buf` is full or end of file. Returns the byte count, which is
/// short only at end of file.
fn read_full_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

/// Streams `path` through `sink` in file order, `config.page_size` bytes at a
/// time, with `config.in_flight` reads outstanding.
///
/// Stops at the first empty read. Reads still in flight at that point were
/// issued at higher offsets, so they are past end of file; they are awaited
/// only to surface errors. Bytes appended to the file after that point are
/// ignored.
pub async fn read_chunks<F>(
    path: impl AsRef<Path>,
    config: PipelineConfig,
    mut sink: F,
) -> Result<PipelineStats>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    config.validate()?;
    let source = Source::open(path.as_ref())?;
    let page = config.page_size as u64;

    let mut next_offset = 0u64;
    let mut slots: Vec<Option<PendingRead>> = Vec::with_capacity(config.in_flight);
    for _ in 0..config.in_flight {
        slots.push(Some(source.read(vec![0; config.page_size], next_offset)));
        next_offset += page;
    }

    let mut stats = PipelineStats::default();
    'pages: loop {
        for slot in slots.iter_mut() {
            let Some(pending) = slot.take() else {
                continue;
            };
            let (buf, n) = source.complete(pending).await?;
            if n == 0 {
                break 'pages;
            }
            sink(&buf[..n])?;
            stats.bytes += n as u64;
            stats.chunks += 1;
            *slot = Some(source.read(buf, next_offset));
            next_offset += page;
        }
    }

    for pending in slots.into_iter().flatten() {
        let (_, n) = source.complete(pending).await?;
        if n > 0 {
            warn!(bytes = n, "file grew while reading, ignoring appended data");
        }
    }

    debug!(
        path = %source.path.display(),
        bytes = stats.bytes,
        chunks = stats.chunks,
        "finished reading"
    );
    Ok(stats)
}

/// Reads and aggregates a whole measurements file.
pub async fn aggregate_file(path: impl AsRef<Path>, config: PipelineConfig) -> Result<NameIndex> {
    let path = path.as_ref();
    info!(
        path = %path.display(),
        page_size = config.page_size,
        in_flight = config.in_flight,
        "aggregating"
    );

    let mut parser = Parser::new();
    read_chunks(path, config, |chunk| parser.feed(chunk)).await?;
    let records = parser.records();
    let index = parser.finish()?;

    info!(records, stations = index.len(), "aggregation complete");
    Ok(index)
}
