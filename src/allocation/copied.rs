//! Heap-copied file allocation
//!
//! This module provides [`CopiedFileAllocation`], which reads a file's entire
//! content into an owned buffer. It works on every platform and is the
//! fallback when mapping is unavailable or fails.

use crate::allocation::region::{Allocation, AllocationKind};
use crate::dcheck_op;
use crate::error::{AllocationError, Result};
use crate::reporter::ErrorReporter;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read-only allocation backed by an owned copy of a file's bytes
///
/// The file handle only lives for the duration of construction. Once built,
/// the allocation owns nothing but its buffer, which is committed only after
/// it has been filled completely.
#[derive(Debug)]
pub struct CopiedFileAllocation {
    /// Fully populated copy; `None` if any step failed
    buffer: Option<Box<[u8]>>,

    /// Size determined by the status query
    size: usize,
}

impl CopiedFileAllocation {
    /// Copy `path` into memory, reporting any failure to `reporter`
    ///
    /// Never fails; check [`valid()`](Allocation::valid) before reading.
    pub fn new(path: impl AsRef<Path>, reporter: &dyn ErrorReporter) -> Self {
        let mut allocation = Self::unopened();
        if let Err(e) = allocation.acquire_file(path.as_ref()) {
            reporter.report(format_args!("{}", e));
        }
        allocation
    }

    /// Copy `path` into memory, returning the failure instead of reporting it
    pub fn try_new(path: impl AsRef<Path>) -> Result<Self> {
        let mut allocation = Self::unopened();
        allocation.acquire_file(path.as_ref())?;
        Ok(allocation)
    }

    /// Copy exactly `len` bytes from `reader`
    ///
    /// `name` is only used in diagnostics. A reader that runs dry before `len`
    /// bytes leaves the allocation invalid and reports a short read.
    pub fn from_reader<R: Read>(
        reader: R,
        len: u64,
        name: impl AsRef<Path>,
        reporter: &dyn ErrorReporter,
    ) -> Self {
        let mut allocation = Self::unopened();
        if let Err(e) = allocation.fill(reader, len, name.as_ref()) {
            reporter.report(format_args!("{}", e));
        }
        allocation
    }

    fn unopened() -> Self {
        Self {
            buffer: None,
            size: 0,
        }
    }

    fn acquire_file(&mut self, path: &Path) -> Result<()> {
        log::debug!("copying {}", path.display());

        // Dropped on every return path below.
        let file = File::open(path).map_err(|e| AllocationError::open(path, e))?;

        let len = file
            .metadata()
            .map_err(|e| AllocationError::size_query(path, e))?
            .len();

        self.fill(file, len, path)
    }

    /// Allocate a buffer of `len` bytes, fill it from `reader` and commit it
    fn fill<R: Read>(&mut self, mut reader: R, len: u64, path: &Path) -> Result<()> {
        let size = usize::try_from(len).map_err(|_| AllocationError::BufferAllocation {
            path: path.to_path_buf(),
            requested: len,
        })?;
        self.size = size;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(size)
            .map_err(|_| AllocationError::BufferAllocation {
                path: path.to_path_buf(),
                requested: len,
            })?;
        buffer.resize(size, 0);

        let read = read_full(&mut reader, &mut buffer, path);
        if read != size {
            // `buffer` is dropped here; the partial copy is never committed.
            return Err(AllocationError::ShortRead {
                path: path.to_path_buf(),
                expected: size,
                read,
            });
        }

        dcheck_op!(buffer.len(), ==, self.size);
        log::debug!("copied {} bytes from {}", size, path.display());
        self.buffer = Some(buffer.into_boxed_slice());
        Ok(())
    }
}

/// Read until `buf` is full, the reader reports end of input, or an error occurs
///
/// Returns the number of bytes placed in `buf`.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8], path: &Path) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!(
                    "read of {} stopped after {} bytes: {}",
                    path.display(),
                    filled,
                    e
                );
                break;
            }
        }
    }
    filled
}

impl Allocation for CopiedFileAllocation {
    fn as_slice(&self) -> Option<&[u8]> {
        self.buffer.as_deref()
    }

    fn bytes(&self) -> usize {
        self.size
    }

    fn valid(&self) -> bool {
        self.buffer.is_some()
    }

    fn kind(&self) -> AllocationKind {
        AllocationKind::Copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::BufferedReporter;
    use std::io::{Cursor, Write};
    use tempfile::{NamedTempFile, TempDir};

    /// Create a test file with specific content
    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content)
            .expect("Failed to write test content");
        file.flush().expect("Failed to flush test file");
        file
    }

    /// Reader that hands out one byte per call and fails with `Interrupted` in between
    struct Stuttering {
        data: Vec<u8>,
        pos: usize,
        interrupt_next: bool,
    }

    impl Read for Stuttering {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.interrupt_next = true;
            if self.pos >= self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    /// Reader that fails hard after yielding a prefix
    struct Failing {
        prefix: Cursor<Vec<u8>>,
    }

    impl Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.prefix.read(buf)? {
                0 => Err(std::io::Error::new(ErrorKind::Other, "device went away")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_copies_whole_file() {
        let content: Vec<u8> = (0..4096u32).map(|i| (i * 7 % 251) as u8).collect();
        let temp_file = create_test_file(&content);
        let sink = BufferedReporter::new();

        let alloc = CopiedFileAllocation::new(temp_file.path(), &sink);

        assert!(alloc.valid());
        assert_eq!(alloc.bytes(), 4096);
        assert_eq!(alloc.as_slice().unwrap(), &content[..]);
        assert_eq!(alloc.kind(), AllocationKind::Copied);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_empty_file_is_valid() {
        let temp_file = create_test_file(&[]);
        let sink = BufferedReporter::new();

        let alloc = CopiedFileAllocation::new(temp_file.path(), &sink);

        assert!(alloc.valid());
        assert_eq!(alloc.bytes(), 0);
        assert_eq!(alloc.as_slice(), Some(&[][..]));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("model.bin");
        let sink = BufferedReporter::new();

        let alloc = CopiedFileAllocation::new(&missing, &sink);

        assert!(!alloc.valid());
        assert_eq!(alloc.bytes(), 0);
        assert!(alloc.base().is_null());
        assert_eq!(
            sink.messages(),
            vec![format!("Could not open '{}'.", missing.display())]
        );
    }

    #[test]
    fn test_short_read_is_not_exposed() {
        let sink = BufferedReporter::new();
        let truncated = Cursor::new(vec![0x42u8; 100]);

        let alloc = CopiedFileAllocation::from_reader(truncated, 4096, "model.bin", &sink);

        assert!(!alloc.valid());
        assert!(alloc.as_slice().is_none());
        assert!(alloc.base().is_null());
        assert_eq!(alloc.bytes(), 4096);
        assert_eq!(
            sink.messages(),
            vec!["Read of 'model.bin' failed (too few bytes read).".to_string()]
        );
    }

    #[test]
    fn test_read_error_counts_as_short_read() {
        let sink = BufferedReporter::new();
        let reader = Failing {
            prefix: Cursor::new(vec![1u8; 10]),
        };

        let alloc = CopiedFileAllocation::from_reader(reader, 64, "weights.bin", &sink);

        assert!(!alloc.valid());
        assert_eq!(
            sink.messages(),
            vec!["Read of 'weights.bin' failed (too few bytes read).".to_string()]
        );
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let sink = BufferedReporter::new();
        let data = b"interrupted but complete".to_vec();
        let reader = Stuttering {
            data: data.clone(),
            pos: 0,
            interrupt_next: true,
        };

        let alloc = CopiedFileAllocation::from_reader(reader, data.len() as u64, "s", &sink);

        assert!(alloc.valid());
        assert_eq!(alloc.as_slice().unwrap(), &data[..]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_reader_longer_than_declared_length() {
        let sink = BufferedReporter::new();
        let alloc =
            CopiedFileAllocation::from_reader(Cursor::new(b"abcdef".to_vec()), 3, "x", &sink);

        assert!(alloc.valid());
        assert_eq!(alloc.as_slice(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_unreservable_buffer_reports_malloc_failure() {
        let sink = BufferedReporter::new();
        let alloc = CopiedFileAllocation::from_reader(std::io::empty(), u64::MAX, "huge", &sink);

        assert!(!alloc.valid());
        assert_eq!(
            sink.messages(),
            vec!["Malloc of buffer to hold copy of 'huge' failed.".to_string()]
        );
    }

    #[test]
    fn test_short_read_records_counts() {
        let mut alloc = CopiedFileAllocation::unopened();
        let err = alloc
            .fill(Cursor::new(vec![0u8; 5]), 8, Path::new("p"))
            .unwrap_err();

        match err {
            AllocationError::ShortRead { expected, read, .. } => {
                assert_eq!(expected, 8);
                assert_eq!(read, 5);
            }
            other => panic!("Expected ShortRead, got {:?}", other),
        }
        assert!(!alloc.valid());
    }

    #[test]
    fn test_copies_are_independent() {
        let content = b"layer0 layer1 layer2".repeat(50);
        let temp_file = create_test_file(&content);

        let first = CopiedFileAllocation::try_new(temp_file.path()).unwrap();
        let second = CopiedFileAllocation::try_new(temp_file.path()).unwrap();
        assert_eq!(first.as_slice(), second.as_slice());
        assert_ne!(first.base(), second.base());

        drop(first);
        assert_eq!(second.as_slice().unwrap(), &content[..]);
    }
}
