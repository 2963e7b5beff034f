use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Somewhere specification and delta text can be read from.
pub trait TextSource {
    /// Reads a baseline specification.
    ///
    /// A baseline that does not exist is not an error: it returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the baseline exists but cannot be read.
    fn read_baseline(&self, path: &Path) -> io::Result<Option<String>>;

    /// Reads a delta document, which must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the delta cannot be read.
    fn read_delta(&self, path: &Path) -> io::Result<String>;
}

/// Somewhere merged specifications can be written to.
pub trait TextSink {
    /// Writes `text` to `path`, replacing anything already there.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be written.
    fn write(&self, path: &Path, text: &str) -> io::Result<()>;
}

impl<T: TextSource + ?Sized> TextSource for &T {
    fn read_baseline(&self, path: &Path) -> io::Result<Option<String>> {
        (**self).read_baseline(path)
    }

    fn read_delta(&self, path: &Path) -> io::Result<String> {
        (**self).read_delta(path)
    }
}

impl<T: TextSink + ?Sized> TextSink for &T {
    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        (**self).write(path, text)
    }
}

/// Reads and writes text files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl TextSource for FileStore {
    fn read_baseline(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No baseline at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn read_delta(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

impl TextSink for FileStore {
    /// Parent directories are created automatically if they don't exist.
    fn write(&self, path: &Path, text: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}
