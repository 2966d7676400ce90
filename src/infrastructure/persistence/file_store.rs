use crate::domain::error::DomainError;
use crate::domain::index::VectorIndex;
use crate::domain::ports::index_store::{IndexStore, StoreInfo};
use crate::infrastructure::persistence::format::{self, StoreHeader};
use chrono::Utc;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Stores each index as one `.gidx` file, replaced atomically on save.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryFileStore;

impl BinaryFileStore {
    pub fn new() -> Self {
        Self
    }

    fn open(location: &Path) -> Result<BufReader<File>, DomainError> {
        match File::open(location) {
            Ok(file) => Ok(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DomainError::NotFound(
                format!("index store {}", location.display()),
            )),
            Err(e) => Err(DomainError::StorageIo(e)),
        }
    }
}

fn info_from(header: &StoreHeader) -> StoreInfo {
    StoreInfo {
        format_version: header.version,
        metric: header.metric,
        dimension: header.dimension as usize,
        record_count: header.count,
        saved_at: header.saved_at(),
    }
}

impl IndexStore for BinaryFileStore {
    fn save(&self, index: &VectorIndex, location: &Path) -> Result<StoreInfo, DomainError> {
        let snapshot = index.snapshot();
        let header = write_atomically(location, |writer| {
            format::write_index(writer, &snapshot, Utc::now())
        })?;
        info!(
            path = %location.display(),
            records = header.count,
            dimension = header.dimension,
            metric = %header.metric,
            "saved index"
        );
        Ok(info_from(&header))
    }

    fn load(&self, location: &Path) -> Result<VectorIndex, DomainError> {
        let mut reader = Self::open(location)?;
        let (header, records) = format::read_index(&mut reader)?;
        let index = VectorIndex::from_records(header.dimension as usize, header.metric, records)
            .map_err(|e| DomainError::CorruptStore(e.to_string()))?;
        info!(
            path = %location.display(),
            records = index.size(),
            dimension = index.dimension(),
            metric = %index.metric(),
            "loaded index"
        );
        Ok(index)
    }

    fn inspect(&self, location: &Path) -> Result<StoreInfo, DomainError> {
        let mut reader = Self::open(location)?;
        let header = format::read_header(&mut reader)?;
        Ok(info_from(&header))
    }
}

/// Writes `location` through a temporary sibling file that is fsynced and then
/// renamed over the target. If `write` fails, the temporary file is removed and
/// the existing file at `location` is untouched.
pub(crate) fn write_atomically<T, F>(location: &Path, write: F) -> Result<T, DomainError>
where
    F: FnOnce(&mut dyn Write) -> Result<T, DomainError>,
{
    let dir = match location.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".galindex-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    debug!(tmp = %tmp.path().display(), "writing temporary store");

    let out = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let out = write(&mut writer)?;
        writer.flush()?;
        out
    };
    tmp.as_file().sync_all()?;
    tmp.persist(location).map_err(|e| DomainError::StorageIo(e.error))?;
    sync_dir(dir);
    Ok(out)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    // Persist the rename itself; failure here does not invalidate the new file.
    if let Ok(handle) = File::open(dir) {
        let _ = handle.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::record::Payload;
    use crate::domain::values::metric::Metric;

    fn build(n: usize) -> VectorIndex {
        let index = VectorIndex::new(2, Metric::Cosine).unwrap();
        for i in 0..n {
            index
                .insert(format!("doc-{i}"), vec![i as f32, 1.0], Payload::new(format!("text {i}"), Default::default()))
                .unwrap();
        }
        index
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".galindex-"))
            .count()
    }

    #[test]
    fn test_failed_write_keeps_previous_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intro.gidx");
        let store = BinaryFileStore::new();
        store.save(&build(3), &path).unwrap();

        let result: Result<(), DomainError> = write_atomically(&path, |writer| {
            writer.write_all(b"GALIDX\0\0 half a header")?;
            Err(DomainError::StorageIo(io::Error::new(
                io::ErrorKind::Other,
                "simulated crash",
            )))
        });
        assert!(result.is_err());

        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded.snapshot(), build(3).snapshot());
        assert_eq!(leftover_temp_files(dir.path()), 0);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db").join("findname.gidx");
        BinaryFileStore::new().save(&build(1), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_inspect_reads_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intro.gidx");
        let store = BinaryFileStore::new();
        let saved = store.save(&build(4), &path).unwrap();

        let info = store.inspect(&path).unwrap();
        assert_eq!(info, saved);
        assert_eq!(info.record_count, 4);
        assert_eq!(info.dimension, 2);
        assert_eq!(info.metric, Metric::Cosine);
    }
}
