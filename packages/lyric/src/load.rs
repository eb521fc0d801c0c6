use std::{
    borrow::Cow,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{Segment, lrc::parse_lrc};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("can't open timed text file {0}: {1}")]
    Open(PathBuf, std::io::Error),
    #[error("can't read timed text: {0}")]
    Read(#[from] std::io::Error),
}

impl LoadError {
    pub fn io_error(&self) -> &std::io::Error {
        match self {
            LoadError::Open(_, err) => err,
            LoadError::Read(err) => err,
        }
    }
}

/// Reads the whole source and parses it as LRC.
///
/// Only I/O failures are errors. Invalid UTF-8 is replaced and a leading
/// byte order mark is dropped, then malformed lines are skipped as usual.
pub fn read_lrc(mut reader: impl Read) -> Result<Vec<Segment>, LoadError> {
    let mut buf = Vec::with_capacity(4096);
    reader.read_to_end(&mut buf)?;

    let text = String::from_utf8_lossy(&buf);
    if let Cow::Owned(_) = text {
        #[cfg(feature = "tracing")]
        tracing::warn!("A non-UTF8 byte sequence was found in timed text");
    }

    let text = text.strip_prefix('\u{feff}').unwrap_or(&*text);
    Ok(parse_lrc(text))
}

pub fn load_lrc(path: impl AsRef<Path>) -> Result<Vec<Segment>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| LoadError::Open(path.to_path_buf(), err))?;
    read_lrc(file)
}

#[test]
fn test_read_lrc_strips_bom() {
    let data = "\u{feff}[00:01.00]first\n[00:02.00]second\n";
    let segments = read_lrc(data.as_bytes()).unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0], Segment::new(1.0, 2.0, "first"));
}

#[test]
fn test_read_lrc_lossy() {
    let data: &[u8] = b"[00:01.00]caf\xe9\n[00:03]ok";
    let segments = read_lrc(data).unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "caf\u{fffd}");
}

#[test]
fn test_load_lrc_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[00:10]ten\n[00:05]five\n").unwrap();
    let segments = load_lrc(file.path()).unwrap();
    assert_eq!(
        segments,
        vec![Segment::new(5.0, 10.0, "five"), Segment::new(10.0, 15.0, "ten")]
    );
}

#[test]
fn test_load_lrc_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.lrc");
    let err = load_lrc(&missing).unwrap_err();
    assert!(matches!(err, LoadError::Open(ref p, _) if p == &missing));
    assert_eq!(err.io_error().kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn test_read_lrc_failing_reader() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("connection reset"))
        }
    }
    let err = read_lrc(Broken).unwrap_err();
    assert!(matches!(err, LoadError::Read(_)));
}
