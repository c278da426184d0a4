//! Where CRI bytes go.
//!
//! The lifecycle only needs two ways to open the output path: read+append
//! (validate a possibly existing file, then grow it) and truncate+write
//! (start over). [`FsStorage`] maps them onto `std::fs`; [`MemoryStorage`]
//! keeps files in memory and can be told to fail, for tests and for
//! embedders without a filesystem.
//!
//! Streams also expose [`CriStream::set_len`] so a record that was only
//! partly written can be cut off again.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Byte stream a CRI log is written through
pub trait CriStream: Read + Write + Seek {
    /// Truncate or extend the underlying file to `len` bytes
    fn set_len(&mut self, len: u64) -> io::Result<()>;
}

impl CriStream for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        Self::set_len(self, len)
    }
}

/// Opens CRI output streams
pub trait CriStorage {
    /// Stream handed to the lifecycle; owned for the handle's lifetime
    type Stream: CriStream;

    /// Open for reading and appending, creating the file if missing
    fn open_append(&self, path: &Path) -> io::Result<Self::Stream>;

    /// Open for reading and writing, discarding any existing content
    fn recreate(&self, path: &Path) -> io::Result<Self::Stream>;
}

/// `std::fs` backed storage
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl CriStorage for FsStorage {
    type Stream = File;

    fn open_append(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
    }

    fn recreate(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<PathBuf, Vec<u8>>,
    fail_open_append: bool,
    fail_recreate: bool,
    fail_set_len: bool,
    /// Bytes that may still be written before writes start failing
    write_budget: Option<usize>,
    open_append_calls: usize,
    recreate_calls: usize,
}

/// In-memory storage with failure injection
///
/// Clones share the same files, so a test can keep one clone to inspect
/// what a handle wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    /// Create empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a file with existing content
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let _ = self.state().files.insert(path.into(), contents.into());
    }

    /// Current content of a file
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state().files.get(path.as_ref()).cloned()
    }

    /// Make every read+append open fail
    pub fn fail_open_append(&self, fail: bool) {
        self.state().fail_open_append = fail;
    }

    /// Make every truncating open fail
    pub fn fail_recreate(&self, fail: bool) {
        self.state().fail_recreate = fail;
    }

    /// Make every `set_len` on an open stream fail
    pub fn fail_set_len(&self, fail: bool) {
        self.state().fail_set_len = fail;
    }

    /// Allow only `bytes` more bytes to be written; `None` lifts the limit
    pub fn limit_writes(&self, bytes: Option<usize>) {
        self.state().write_budget = bytes;
    }

    /// Number of read+append opens attempted
    #[must_use]
    pub fn open_append_calls(&self) -> usize {
        self.state().open_append_calls
    }

    /// Number of truncating opens attempted
    #[must_use]
    pub fn recreate_calls(&self) -> usize {
        self.state().recreate_calls
    }
}

impl CriStorage for MemoryStorage {
    type Stream = MemoryStream;

    fn open_append(&self, path: &Path) -> io::Result<MemoryStream> {
        let mut state = self.state();
        state.open_append_calls += 1;
        if state.fail_open_append {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "injected open failure",
            ));
        }
        let _ = state.files.entry(path.to_path_buf()).or_default();
        Ok(MemoryStream {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            position: 0,
            append: true,
        })
    }

    fn recreate(&self, path: &Path) -> io::Result<MemoryStream> {
        let mut state = self.state();
        state.recreate_calls += 1;
        if state.fail_recreate {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "injected recreate failure",
            ));
        }
        let _ = state.files.insert(path.to_path_buf(), Vec::new());
        Ok(MemoryStream {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            position: 0,
            append: false,
        })
    }
}

/// Stream over one [`MemoryStorage`] file
#[derive(Debug)]
pub struct MemoryStream {
    state: Arc<Mutex<MemoryState>>,
    path: PathBuf,
    position: u64,
    append: bool,
}

impl MemoryStream {
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn len(&self) -> u64 {
        self.state()
            .files
            .get(&self.path)
            .map_or(0, |file| file.len() as u64)
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let position = self.position as usize;
        let read = {
            let state = self.state();
            let file = state.files.get(&self.path).map_or(&[][..], Vec::as_slice);
            let available = file.get(position..).unwrap_or(&[]);
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.position += read as u64;
        Ok(read)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let path = self.path.clone();
        let append = self.append;
        let mut position = self.position as usize;

        let written = {
            let mut state = self.state();
            let allowed = match state.write_budget {
                Some(0) if !buf.is_empty() => {
                    return Err(io::Error::other("injected write failure: storage full"));
                }
                Some(budget) => budget.min(buf.len()),
                None => buf.len(),
            };
            if let Some(budget) = state.write_budget.as_mut() {
                *budget -= allowed;
            }

            let file = state.files.entry(path).or_default();
            if append {
                position = file.len();
            }
            if file.len() < position {
                file.resize(position, 0);
            }
            let overlap = (file.len() - position).min(allowed);
            file[position..position + overlap].copy_from_slice(&buf[..overlap]);
            file.extend_from_slice(&buf[overlap..allowed]);
            allowed
        };

        self.position = (position + written) as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };
        let Some(target) = target else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of memory file",
            ));
        };
        self.position = target;
        Ok(target)
    }
}

impl CriStream for MemoryStream {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        let path = self.path.clone();
        let mut state = self.state();
        if state.fail_set_len {
            return Err(io::Error::other("injected truncate failure"));
        }
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length out of range"))?;
        state.files.entry(path).or_default().resize(len, 0);
        Ok(())
    }
}
