//! Config file storage - one flat text file per named recording

use crate::events::{Record, RecordedSequence};
use autoclick_core::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default directory holding recordings, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "config";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a named config
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn ensure_dir(&self) -> Result<()> {
        create_dir(&self.dir)
    }

    /// Append one record as a line; the data is synced before returning
    pub fn append(&self, path: &Path, record: &Record) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::io("Opening", path, e))?;
        writeln!(file, "{}", record).map_err(|e| Error::io("Writing", path, e))?;
        file.sync_data().map_err(|e| Error::io("Syncing", path, e))?;
        debug!(path = %path.display(), %record, "appended");
        Ok(())
    }

    /// Parse a whole file. Any malformed line fails the load.
    pub fn load(&self, path: &Path) -> Result<RecordedSequence> {
        let file = File::open(path).map_err(|e| Error::io("Opening", path, e))?;
        let reader = BufReader::new(file);

        let mut seq = RecordedSequence::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| Error::io("Reading", path, e))?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            seq.push(Record::parse(line, i + 1)?);
        }
        debug!(
            path = %path.display(),
            positions = seq.positions.len(),
            intervals = seq.intervals.len(),
            "loaded"
        );
        Ok(seq)
    }

    /// Write a full sequence by appending each record in file order
    pub fn save(&self, path: &Path, seq: &RecordedSequence) -> Result<()> {
        for record in seq.records() {
            self.append(path, &record)?;
        }
        Ok(())
    }

    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    pub fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| Error::io("Deleting", path, e))
    }

    /// Names of the regular files in the config directory, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        self.ensure_dir()?;
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io("Listing", &self.dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io("Listing", &self.dir, e))?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            if let Some(s) = entry.file_name().to_str() {
                files.push(s.to_string());
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| Error::directory(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Point;
    use autoclick_core::ErrorCode;
    use tempfile::tempdir;

    #[test]
    fn append_creates_missing_directories() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path().join("nested/config"));
        let path = store.path("mouse.txt");

        store.append(&path, &Record::Position(Point::new(1, 2))).unwrap();
        store.append(&path, &Record::Interval(650)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "坐标:1:2\n延迟:650\n");
    }

    #[test]
    fn load_decodes_reference_file() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path());
        let path = store.path("mouse.txt");
        fs::write(&path, "坐标:10:20\n延迟:700\n坐标:30:40\n").unwrap();

        let seq = store.load(&path).unwrap();
        assert_eq!(seq.positions, vec![Point::new(10, 20), Point::new(30, 40)]);
        assert_eq!(seq.intervals, vec![700]);
    }

    #[test]
    fn load_tolerates_crlf_and_blank_lines() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path());
        let path = store.path("win.txt");
        fs::write(&path, "坐标:1:2\r\n\r\n延迟:500\r\n坐标:3:4\r\n").unwrap();

        let seq = store.load(&path).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.intervals, vec![500]);
    }

    #[test]
    fn load_reports_line_of_bad_field() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path());
        let path = store.path("bad.txt");
        fs::write(&path, "坐标:1:2\n延迟:500\n坐标:x:4\n").unwrap();

        let e = store.load(&path).unwrap_err();
        assert_eq!(e.code, ErrorCode::FormatError);
        assert!(e.message.contains("line 3"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path());
        let e = store.load(&store.path("nope.txt")).unwrap_err();
        assert_eq!(e.code, ErrorCode::IoError);
    }

    #[test]
    fn list_skips_directories_and_sorts() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path());
        fs::write(store.path("b.txt"), "").unwrap();
        fs::write(store.path("a.txt"), "").unwrap();
        fs::create_dir(store.path("sub")).unwrap();

        assert_eq!(store.list().unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn list_creates_directory() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path().join("fresh"));
        assert!(store.list().unwrap().is_empty());
        assert!(store.dir().is_dir());
    }

    #[test]
    fn directory_blocked_by_file_is_directory_error() {
        let tmp = tempdir().unwrap();
        let blocker = tmp.path().join("config");
        fs::write(&blocker, "").unwrap();
        let store = ConfigStore::new(blocker.join("inner"));

        let e = store.ensure_dir().unwrap_err();
        assert_eq!(e.code, ErrorCode::DirectoryError);
    }

    #[test]
    fn exists_and_delete() {
        let tmp = tempdir().unwrap();
        let store = ConfigStore::new(tmp.path());
        let path = store.path("mouse.txt");
        assert!(!store.exists(&path));
        store.append(&path, &Record::Interval(1)).unwrap();
        assert!(store.exists(&path));
        store.delete(&path).unwrap();
        assert!(!store.exists(&path));
        assert_eq!(store.delete(&path).unwrap_err().code, ErrorCode::IoError);
    }
}
