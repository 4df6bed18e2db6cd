//! Result emission: one user_id per line, sorted, nothing else.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};

use crate::config::Sink;
use crate::differ::ResultSet;
use crate::error::{DiffError, Result};

/// Label used for stdout in error messages.
const STDOUT_LABEL: &str = "<stdout>";

/// Write `result` to `sink`. Returns the number of lines written.
///
/// Every line is encoded before the sink is opened, so an unrepresentable
/// user id leaves an existing output file untouched.
pub fn emit(result: &ResultSet, sink: &Sink, encoding: &'static Encoding) -> Result<usize> {
    match sink {
        Sink::Stdout => {
            let stdout = io::stdout();
            write_lines(result, stdout.lock(), encoding, Path::new(STDOUT_LABEL))
        }
        Sink::File(path) => {
            let (bytes, count) = encode_lines(result, encoding, path)?;
            let file = File::create(path).map_err(|e| DiffError::file_access(path, e))?;
            write_bytes(BufWriter::new(file), &bytes, path)?;
            Ok(count)
        }
    }
}

/// Write sorted user ids to `writer`, encoding each line. Flushes before returning.
pub fn write_lines<W: Write>(
    result: &ResultSet,
    writer: W,
    encoding: &'static Encoding,
    path: &Path,
) -> Result<usize> {
    let (bytes, count) = encode_lines(result, encoding, path)?;
    write_bytes(writer, &bytes, path)?;
    Ok(count)
}

/// Encode every result line into one buffer. Returns the bytes and line count.
fn encode_lines(
    result: &ResultSet,
    encoding: &'static Encoding,
    path: &Path,
) -> Result<(Vec<u8>, usize)> {
    let users = result.sorted();
    let mut out = Vec::new();

    for user_id in &users {
        let line = format!("{}\n", user_id);
        // encoding_rs only decodes UTF-16; its encoder falls back to UTF-8.
        if encoding == UTF_16LE {
            out.extend(line.encode_utf16().flat_map(u16::to_le_bytes));
        } else if encoding == UTF_16BE {
            out.extend(line.encode_utf16().flat_map(u16::to_be_bytes));
        } else {
            let (bytes, _, unmappable) = encoding.encode(&line);
            if unmappable {
                return Err(DiffError::Encoding {
                    path: PathBuf::from(path),
                    detail: format!(
                        "user id {:?} cannot be represented in {}",
                        user_id,
                        encoding.name()
                    ),
                });
            }
            out.extend_from_slice(&bytes);
        }
    }

    Ok((out, users.len()))
}

fn write_bytes<W: Write>(mut writer: W, bytes: &[u8], path: &Path) -> Result<()> {
    let io_err = |e: io::Error| DiffError::file_access(path, e);
    writer.write_all(bytes).map_err(io_err)?;
    writer.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RowPolicy;
    use crate::index::Day1Index;
    use crate::source::DayLines;
    use crate::stats::PhaseStats;
    use std::io::Cursor;

    fn result_of(day1: &str, day2: &str) -> ResultSet {
        let lines = |text: &str| {
            DayLines::new("mem.csv", Cursor::new(text.as_bytes().to_vec()), encoding_rs::UTF_8)
        };
        let index =
            Day1Index::build(lines(day1), RowPolicy::Strict, &mut PhaseStats::default()).unwrap();
        crate::differ::find_returning_users(
            &index,
            lines(day2),
            RowPolicy::Strict,
            &mut PhaseStats::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_sorted_one_per_line() {
        let result = result_of("b,p1,t\na,p1,t\nc,p1,t\n", "c,p2,t\na,p2,t\nb,p1,t\n");
        let mut out = Vec::new();
        let written = write_lines(&result, &mut out, encoding_rs::UTF_8, Path::new("out")).unwrap();
        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "a\nc\n");
    }

    #[test]
    fn test_empty_result_writes_nothing() {
        let result = ResultSet::default();
        let mut out = Vec::new();
        let written = write_lines(&result, &mut out, encoding_rs::UTF_8, Path::new("out")).unwrap();
        assert_eq!(written, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_output_encoding() {
        let result = result_of("josé,p1,t\n", "josé,p2,t\n");
        let mut out = Vec::new();
        write_lines(&result, &mut out, encoding_rs::WINDOWS_1252, Path::new("out")).unwrap();
        assert_eq!(out, b"jos\xE9\n");
    }

    #[test]
    fn test_unmappable_user_is_encoding_error() {
        let result = result_of("ユーザー,p1,t\n", "ユーザー,p2,t\n");
        let mut out = Vec::new();
        let err = write_lines(&result, &mut out, encoding_rs::WINDOWS_1252, Path::new("out"))
            .unwrap_err();
        assert!(matches!(err, DiffError::Encoding { .. }));
    }

    #[test]
    fn test_utf16_output() {
        let result = result_of("u1,p1,t\n", "u1,p2,t\n");

        let mut le = Vec::new();
        write_lines(&result, &mut le, encoding_rs::UTF_16LE, Path::new("out")).unwrap();
        assert_eq!(le, vec![b'u', 0, b'1', 0, b'\n', 0]);

        let mut be = Vec::new();
        write_lines(&result, &mut be, encoding_rs::UTF_16BE, Path::new("out")).unwrap();
        assert_eq!(be, vec![0, b'u', 0, b'1', 0, b'\n']);
    }

    #[test]
    fn test_unmappable_user_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.txt");
        std::fs::write(&path, "previous results\n").unwrap();

        let result = result_of("a,p1,t\nユ,p1,t\n", "a,p2,t\nユ,p2,t\n");
        let err = emit(&result, &Sink::File(path.clone()), encoding_rs::WINDOWS_1252).unwrap_err();
        assert!(matches!(err, DiffError::Encoding { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous results\n");
    }

    #[test]
    fn test_emit_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.txt");
        let result = result_of("u1,p1,t\n", "u1,p2,t\n");
        emit(&result, &Sink::File(path.clone()), encoding_rs::UTF_8).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "u1\n");
    }

    #[test]
    fn test_emit_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("result.txt");
        let err = emit(&ResultSet::default(), &Sink::File(path.clone()), encoding_rs::UTF_8)
            .unwrap_err();
        match err {
            DiffError::FileAccess { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected FileAccess, got {:?}", other),
        }
    }
}
