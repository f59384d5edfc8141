use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::ExportError;

/// Highest ` (n)` suffix tried before giving up
const MAX_SUFFIX: u32 = 10_000;

/// Receives the finished artifact
pub trait ArtifactSink {
    /// Store `bytes` under (a variant of) `filename`, returning the final path
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}

/// Saves artifacts into a downloads directory
///
/// An existing file is never overwritten: `story.png` becomes
/// `story (1).png`, `story (2).png` and so on.
#[derive(Debug, Clone)]
pub struct DownloadsFolder {
    dir: PathBuf,
}

impl DownloadsFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The user's download directory, falling back to home
    pub fn user_default() -> Option<Self> {
        dirs::download_dir()
            .or_else(dirs::home_dir)
            .map(Self::new)
    }

    /// Candidate paths for `filename`: the name itself, then `name (n).ext`
    fn candidates<'a>(&'a self, filename: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        let name = Path::new(filename);
        let stem = name
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string());
        let extension = name.extension().map(|e| e.to_string_lossy().to_string());

        (0..MAX_SUFFIX).map(move |n| match (n, &extension) {
            (0, _) => self.dir.join(filename),
            (n, Some(ext)) => self.dir.join(format!("{} ({}).{}", stem, n, ext)),
            (n, None) => self.dir.join(format!("{} ({})", stem, n)),
        })
    }
}

impl ArtifactSink for DownloadsFolder {
    /// Claims the first free name atomically (`create_new`), so concurrent
    /// exports never write to the same file.
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ExportError::Save(format!("{}: {}", self.dir.display(), e)))?;

        for path in self.candidates(filename) {
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ExportError::Save(format!("{}: {}", path.display(), e))),
            };

            file.write_all(bytes)
                .map_err(|e| ExportError::Save(format!("{}: {}", path.display(), e)))?;

            log::info!("💾 Saved {}", path.display());
            return Ok(path);
        }

        Err(ExportError::Save(format!(
            "no free name for {} in {}",
            filename,
            self.dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_writes_fixed_filename() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DownloadsFolder::new(dir.path());

        let path = sink.deliver("story.png", b"png").unwrap();

        assert_eq!(path, dir.path().join("story.png"));
        assert_eq!(fs::read(&path).unwrap(), b"png");
    }

    #[test]
    fn test_deliver_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DownloadsFolder::new(dir.path());

        let first = sink.deliver("story.png", b"1").unwrap();
        let second = sink.deliver("story.png", b"2").unwrap();
        let third = sink.deliver("story.png", b"3").unwrap();

        assert_eq!(first, dir.path().join("story.png"));
        assert_eq!(second, dir.path().join("story (1).png"));
        assert_eq!(third, dir.path().join("story (2).png"));
        assert_eq!(fs::read(&first).unwrap(), b"1");
    }

    #[test]
    fn test_concurrent_deliveries_get_distinct_files() {
        use std::collections::HashSet;
        use std::sync::{Arc, Barrier};
        use std::thread;

        const WRITERS: usize = 8;

        for _ in 0..20 {
            let dir = tempfile::tempdir().unwrap();
            let sink = Arc::new(DownloadsFolder::new(dir.path()));
            let barrier = Arc::new(Barrier::new(WRITERS));

            let handles: Vec<_> = (0..WRITERS)
                .map(|n| {
                    let sink = Arc::clone(&sink);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        let body = vec![n as u8; 64];
                        (sink.deliver("story.png", &body).unwrap(), body)
                    })
                })
                .collect();

            let results: Vec<(PathBuf, Vec<u8>)> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();

            let paths: HashSet<&PathBuf> = results.iter().map(|(p, _)| p).collect();
            assert_eq!(paths.len(), WRITERS);
            for (path, body) in &results {
                assert_eq!(&fs::read(path).unwrap(), body);
            }
            assert_eq!(fs::read_dir(dir.path()).unwrap().count(), WRITERS);
        }
    }

    #[test]
    fn test_deliver_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DownloadsFolder::new(dir.path().join("nested").join("out"));

        let path = sink.deliver("story.png", b"x").unwrap();
        assert!(path.exists());
    }
}
