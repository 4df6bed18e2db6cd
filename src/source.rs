//! Streaming line source for one day's log
//!
//! [`DayLines`] owns the reader, decodes bytes with the configured encoding in
//! fixed-size chunks, and yields one line at a time. Nothing beyond the
//! current chunk and the partial line that straddles it is buffered, so a day
//! of any size is read in bounded memory. The file is closed when the iterator
//! is dropped, on success and error paths alike.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use encoding_rs::{Decoder, DecoderResult, Encoding};
use memchr::{memchr, memchr_iter};
use tracing::warn;

use crate::config::RowPolicy;
use crate::error::{DiffError, Result};
use crate::row::Row;
use crate::stats::PhaseStats;

const READ_CHUNK: usize = 64 * 1024;

/// One decoded line, terminator stripped. Numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: u64,
    pub text: String,
}

pub struct DayLines<R> {
    path: PathBuf,
    reader: R,
    encoding: &'static Encoding,
    decoder: Decoder,
    chunk: Box<[u8]>,
    /// Decoded text not yet handed out; `pos` marks the consumed prefix.
    pending: String,
    pos: usize,
    /// Bytes after `pos` already searched for a newline.
    scanned: usize,
    line_number: u64,
    skip_header: bool,
    eof: bool,
    done: bool,
}

impl DayLines<BufReader<File>> {
    /// Open `path` for reading.
    pub fn open(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let file = File::open(path).map_err(|e| DiffError::file_access(path, e))?;
        Ok(Self::new(path, BufReader::new(file), encoding))
    }
}

impl<R: Read> DayLines<R> {
    /// `path` is only used to label errors and stats.
    pub fn new(path: impl Into<PathBuf>, reader: R, encoding: &'static Encoding) -> Self {
        Self {
            path: path.into(),
            reader,
            encoding,
            // A BOM for this same encoding is dropped so it cannot leak into the first user_id.
            decoder: encoding.new_decoder_with_bom_removal(),
            chunk: vec![0u8; READ_CHUNK].into_boxed_slice(),
            pending: String::new(),
            pos: 0,
            scanned: 0,
            line_number: 0,
            skip_header: false,
            eof: false,
            done: false,
        }
    }

    /// Treat line 1 as a header: read it but do not parse it.
    pub fn with_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse every line as a [`Row`] and hand valid rows to `visit`.
    ///
    /// Invalid rows abort under [`RowPolicy::Strict`] and are counted and
    /// skipped under [`RowPolicy::Lenient`]. Consumes the source, so the file
    /// is read exactly once.
    pub fn scan_rows<F>(mut self, policy: RowPolicy, stats: &mut PhaseStats, mut visit: F) -> Result<()>
    where
        F: FnMut(Row<'_>),
    {
        while let Some(line) = self.next() {
            let line = line?;
            stats.lines_read += 1;

            if self.skip_header && line.number == 1 {
                stats.header_skipped = true;
                continue;
            }

            match Row::parse(&line.text) {
                Ok(row) => {
                    stats.rows_accepted += 1;
                    visit(row);
                }
                Err(reason) => match policy {
                    RowPolicy::Strict => {
                        return Err(DiffError::InvalidRow {
                            path: self.path.clone(),
                            line_number: line.number,
                            content: line.text.clone(),
                            reason,
                        });
                    }
                    RowPolicy::Lenient => {
                        warn!(
                            path = %self.path.display(),
                            line = line.number,
                            %reason,
                            content = ?line.text,
                            "skipping invalid row"
                        );
                        stats.rows_skipped += 1;
                    }
                },
            }
        }
        Ok(())
    }

    /// Decode the next chunk into `pending`.
    fn fill(&mut self) -> Result<()> {
        // Drop what has already been handed out before growing the buffer.
        self.pending.drain(..self.pos);
        self.pos = 0;

        let n = loop {
            match self.reader.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DiffError::file_access(&self.path, e)),
            }
        };
        let last = n == 0;
        let mut src = &self.chunk[..n];

        loop {
            if let Some(needed) = self.decoder.max_utf8_buffer_length_without_replacement(src.len()) {
                self.pending.reserve(needed);
            }
            let (result, read) =
                self.decoder
                    .decode_to_string_without_replacement(src, &mut self.pending, last);
            src = &src[read..];
            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => self.pending.reserve(src.len().max(16)),
                DecoderResult::Malformed(_, _) => {
                    let line = self.line_number
                        + 1
                        + memchr_iter(b'\n', self.pending[self.pos..].as_bytes()).count() as u64;
                    return Err(DiffError::Encoding {
                        path: self.path.clone(),
                        detail: format!(
                            "invalid {} byte sequence on line {}",
                            self.encoding.name(),
                            line
                        ),
                    });
                }
            }
        }

        self.eof = last;
        Ok(())
    }

    fn take_line(&mut self, end: usize, next_pos: usize) -> Line {
        let raw = &self.pending[self.pos..end];
        let text = raw.strip_suffix('\r').unwrap_or(raw).to_string();
        self.pos = next_pos;
        self.scanned = 0;
        self.line_number += 1;
        Line {
            number: self.line_number,
            text,
        }
    }
}

impl<R: Read> Iterator for DayLines<R> {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let from = self.pos + self.scanned;
            if let Some(offset) = memchr(b'\n', self.pending[from..].as_bytes()) {
                let end = from + offset;
                return Some(Ok(self.take_line(end, end + 1)));
            }
            self.scanned = self.pending.len() - self.pos;
            if self.eof {
                self.done = true;
                // Last line without a terminator.
                if self.pos < self.pending.len() {
                    let end = self.pending.len();
                    return Some(Ok(self.take_line(end, end)));
                }
                return None;
            }
            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}
