//! Record Source: opens an NDJSON file (plain or `.zst`) and hands out a fresh
//! lazy pass over its records on every call, or the whole payload at once for
//! the bulk strategies.

use crate::error::{EngineError, Result};
use crate::record::{decode_line, trim_line, PostRecord};
use crate::util::open_with_backoff;
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use zstd::stream::read::Decoder;

#[derive(Clone, Debug)]
pub struct RecordSource {
    path: PathBuf,
    read_buf_bytes: usize,
}

impl RecordSource {
    /// Fails with `SourceNotFound` when `path` is missing or not a readable file.
    pub fn open(path: impl AsRef<Path>, read_buf_bytes: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let meta = fs::metadata(&path).map_err(|source| EngineError::SourceNotFound { path: path.clone(), source })?;
        if !meta.is_file() {
            let source = io::Error::new(io::ErrorKind::InvalidInput, "not a regular file");
            return Err(EngineError::SourceNotFound { path, source });
        }
        Ok(Self { path, read_buf_bytes: read_buf_bytes.max(8 * 1024) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// On-disk size (compressed size for `.zst`).
    pub fn len_bytes(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_compressed(&self) -> bool {
        self.path.extension().is_some_and(|e| e.eq_ignore_ascii_case("zst"))
    }

    fn io_err(&self, source: io::Error) -> EngineError {
        EngineError::Io { path: self.path.clone(), source }
    }

    fn open_reader(&self, counter: Arc<AtomicU64>) -> Result<Box<dyn BufRead + Send>> {
        let file = open_with_backoff(&self.path, 16, 50)
            .map_err(|source| EngineError::SourceNotFound { path: self.path.clone(), source })?;
        let counted = CountingReader { inner: file, counter };
        if self.is_compressed() {
            let mut decoder = Decoder::new(counted).map_err(|e| self.io_err(e))?;
            decoder.window_log_max(31).map_err(|e| self.io_err(e))?;
            Ok(Box::new(BufReader::with_capacity(self.read_buf_bytes, decoder)))
        } else {
            Ok(Box::new(BufReader::with_capacity(self.read_buf_bytes, counted)))
        }
    }

    /// A new pass over the file. Malformed lines surface as recoverable
    /// `MalformedRecord` items; an I/O failure is yielded once and ends the pass.
    pub fn records(&self) -> Result<Records> {
        let counter = Arc::new(AtomicU64::new(0));
        let reader = self.open_reader(counter.clone())?;
        Ok(Records {
            reader,
            path: self.path.clone(),
            buf: Vec::with_capacity(16 * 1024),
            line_no: 0,
            counter,
            done: false,
        })
    }

    /// Whole (decompressed) payload in memory.
    pub fn read_all(&self) -> Result<Vec<u8>> {
        let mut reader = self.open_reader(Arc::new(AtomicU64::new(0)))?;
        let mut bytes = Vec::with_capacity(self.len_bytes() as usize);
        reader.read_to_end(&mut bytes).map_err(|e| self.io_err(e))?;
        Ok(bytes)
    }
}

/// Lazy record iterator over one pass of a `RecordSource`.
pub struct Records {
    reader: Box<dyn BufRead + Send>,
    path: PathBuf,
    buf: Vec<u8>,
    line_no: u64,
    counter: Arc<AtomicU64>,
    done: bool,
}

impl Records {
    /// On-disk bytes consumed so far; drives byte-based progress.
    pub fn bytes_read(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    pub fn line_no(&self) -> u64 {
        self.line_no
    }
}

impl Iterator for Records {
    type Item = Result<PostRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_no += 1;
                    if let Some(line) = trim_line(&self.buf) {
                        return Some(decode_line(line, self.line_no));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    self.done = true;
                    return Some(Err(EngineError::Io { path: self.path.clone(), source }));
                }
            }
        }
        None
    }
}

/// Split a loaded payload into `(line_no, line)` pairs, skipping blank lines.
/// Numbering matches `Records`.
pub fn split_lines(bytes: &[u8]) -> Vec<(u64, &[u8])> {
    bytes
        .split_inclusive(|b| *b == b'\n')
        .enumerate()
        .filter_map(|(i, raw)| trim_line(raw).map(|line| (i as u64 + 1, line)))
        .collect()
}

/// A `Read` wrapper that counts bytes pulled from the file.
struct CountingReader<R: Read> {
    inner: R,
    counter: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}
