//! Host capabilities an editing context may or may not provide.
//!
//! Actions check for the capability they need before touching the buffer and
//! abort with [`ActionError::MissingCapability`](super::ActionError) when it is
//! absent.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context as _;

use crate::image::ImageMap;

use super::preview_url;

/// Turns the buffer into a preview. Required for any buffer mutation.
pub trait Renderer {
    fn render(&mut self, markdown: &str, images: &ImageMap);
}

/// Opaque key-value persistence for drafts.
pub trait DraftStore {
    /// Read the value under `key`; `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    /// Fails when the backing storage cannot be read.
    fn load(&self, key: &str) -> io::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Fails when the backing storage cannot be written.
    fn store(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Offers the buffer as a downloadable file.
pub trait Exporter {
    /// Write `contents` as `file_name` and return where it went.
    ///
    /// # Errors
    /// Fails when the file cannot be written.
    fn export(&mut self, file_name: &str, contents: &str) -> io::Result<PathBuf>;
}

/// Hands the buffer to a companion preview view.
pub trait Previewer {
    /// Open a preview of `markdown`.
    ///
    /// # Errors
    /// Fails when the preview cannot be opened.
    fn open(&mut self, markdown: &str) -> io::Result<()>;
}

/// Supplies image bytes chosen by the user.
pub trait ImageSource {
    /// The next chosen image, or `Ok(None)` if the user picked nothing.
    ///
    /// # Errors
    /// Fails when the chosen image cannot be read.
    fn next_image(&mut self) -> io::Result<Option<Vec<u8>>>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// --- Draft stores ---

/// In-memory draft store; clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> io::Result<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Draft store backed by a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> io::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(io::Error::other)
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn store(&mut self, key: &str, value: &str) -> io::Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&all).map_err(io::Error::other)?;
        fs::write(&self.path, json)
    }
}

// --- Export ---

/// Writes exported files into a directory.
#[derive(Debug, Clone)]
pub struct DirExporter {
    dir: PathBuf,
}

impl DirExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Exporter for DirExporter {
    fn export(&mut self, file_name: &str, contents: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

// --- Preview ---

/// Prints the preview address to stdout.
#[derive(Debug, Clone)]
pub struct PrintPreviewer {
    base: String,
}

impl PrintPreviewer {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Previewer for PrintPreviewer {
    fn open(&mut self, markdown: &str) -> io::Result<()> {
        let mut out = io::stdout();
        writeln!(out, "{}", preview_url(&self.base, markdown))?;
        out.flush()
    }
}

/// Opens the preview address with the platform's URL handler.
#[derive(Debug, Clone)]
pub struct SystemPreviewer {
    base: String,
}

impl SystemPreviewer {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Previewer for SystemPreviewer {
    fn open(&mut self, markdown: &str) -> io::Result<()> {
        open_external(&preview_url(&self.base, markdown))
    }
}

fn open_external(url: &str) -> io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?.wait()?;
        Ok(())
    }
    #[cfg(target_os = "windows")]
    {
        use std::process::Stdio;
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        return Ok(());
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()?
            .wait()?;
        Ok(())
    }
}

/// Records every previewed buffer; clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingPreviewer {
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingPreviewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preview addresses opened so far, built against `base`.
    pub fn urls(&self, base: &str) -> Vec<String> {
        lock(&self.opened)
            .iter()
            .map(|markdown| preview_url(base, markdown))
            .collect()
    }

    /// Buffers previewed so far.
    pub fn opened(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }
}

impl Previewer for RecordingPreviewer {
    fn open(&mut self, markdown: &str) -> io::Result<()> {
        lock(&self.opened).push(markdown.to_string());
        Ok(())
    }
}

// --- Image sources ---

#[derive(Debug, Clone)]
enum QueuedImage {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Images queued up front (e.g. from the command line), handed out in order.
#[derive(Debug, Clone, Default)]
pub struct QueuedImages {
    queue: VecDeque<QueuedImage>,
}

impl QueuedImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file to be read when its turn comes.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.queue.push_back(QueuedImage::Path(path.into()));
        self
    }

    /// Queue raw bytes.
    #[must_use]
    pub fn with_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.queue.push_back(QueuedImage::Bytes(bytes.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl ImageSource for QueuedImages {
    fn next_image(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.queue.pop_front() {
            None => Ok(None),
            Some(QueuedImage::Bytes(bytes)) => Ok(Some(bytes)),
            Some(QueuedImage::Path(path)) => fs::read(&path)
                .with_context(|| format!("Failed to read image {}", path.display()))
                .map(Some)
                .map_err(io::Error::other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryDraftStore::new();
        assert_eq!(store.load("k").unwrap(), None);
        store.store("k", "v").unwrap();
        assert_eq!(store.load("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_file_store_missing_file_is_no_draft() {
        let dir = tempdir().unwrap();
        let store = FileDraftStore::new(dir.path().join("drafts.json"));
        assert_eq!(store.load("markdownDraft").unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("drafts.json");
        let mut store = FileDraftStore::new(&path);
        store.store("a", "one").unwrap();
        store.store("b", "two\nlines").unwrap();

        let reopened = FileDraftStore::new(&path);
        assert_eq!(reopened.load("a").unwrap(), Some("one".to_string()));
        assert_eq!(reopened.load("b").unwrap(), Some("two\nlines".to_string()));
    }

    #[test]
    fn test_file_store_rejects_corrupt_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drafts.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileDraftStore::new(&path).load("a").is_err());
    }

    #[test]
    fn test_dir_exporter_writes_file() {
        let dir = tempdir().unwrap();
        let mut exporter = DirExporter::new(dir.path());
        let path = exporter.export("draft.md", "# hi").unwrap();
        assert_eq!(path, dir.path().join("draft.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), "# hi");
    }

    #[test]
    fn test_queued_images_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.bin");
        fs::write(&path, b"from disk").unwrap();

        let mut source = QueuedImages::new().with_bytes(b"first".to_vec()).with_path(&path);
        assert_eq!(source.len(), 2);
        assert_eq!(source.next_image().unwrap(), Some(b"first".to_vec()));
        assert_eq!(source.next_image().unwrap(), Some(b"from disk".to_vec()));
        assert_eq!(source.next_image().unwrap(), None);
    }

    #[test]
    fn test_queued_image_missing_file_errors() {
        let mut source = QueuedImages::new().with_path("/definitely/not/here.png");
        assert!(source.next_image().is_err());
    }

    #[test]
    fn test_recording_previewer_builds_urls() {
        let mut previewer = RecordingPreviewer::new();
        previewer.open("a b").unwrap();
        assert_eq!(previewer.urls("preview.html"), vec!["preview.html#a%20b"]);
    }
}
