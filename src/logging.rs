use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Rotate the log file at startup if it has grown past `max_bytes`.
///
/// The current file is renamed to `{path}.{YYYYmmddHHMMSS}.bak` and only the
/// newest `max_archives` archived segments are kept. Returns the archive path
/// when a rotation happened, so the caller can log it once tracing is up.
pub fn rotate_log_file(
    path: &Path,
    max_bytes: u64,
    max_archives: usize,
) -> Result<Option<PathBuf>> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return Ok(None),
    };
    if size < max_bytes {
        return Ok(None);
    }

    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let archived = PathBuf::from(format!("{}.{stamp}.bak", path.display()));
    fs::rename(path, &archived)
        .with_context(|| format!("failed to rotate {} to {}", path.display(), archived.display()))?;

    prune_archives(path, max_archives)?;
    Ok(Some(archived))
}

/// Delete archived segments beyond `max_archives`, oldest first. Archive
/// names embed a sortable timestamp, so lexical order is age order.
fn prune_archives(path: &Path, max_archives: usize) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(());
    };
    let prefix = format!("{file_name}.");

    let mut archives: Vec<PathBuf> = fs::read_dir(parent)
        .with_context(|| format!("failed to list {}", parent.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".bak"))
        })
        .collect();
    archives.sort();

    if archives.len() > max_archives {
        let excess = archives.len() - max_archives;
        for old in &archives[..excess] {
            fs::remove_file(old)
                .with_context(|| format!("failed to remove old log file {}", old.display()))?;
        }
    }
    Ok(())
}

/// Initialize tracing: an env-filter built from `LOG_LEVEL`, one fmt layer to
/// stderr and one ANSI-free layer appending to the log file.
pub fn init(log_level: &str, log_path: &Path) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_log_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("watch.log");
        fs::write(&log, "short").unwrap();

        let rotated = rotate_log_file(&log, 1024, 3).unwrap();
        assert!(rotated.is_none());
        assert!(log.exists());
    }

    #[test]
    fn missing_log_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("watch.log");
        assert!(rotate_log_file(&log, 1024, 3).unwrap().is_none());
    }

    #[test]
    fn oversized_log_is_archived() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("watch.log");
        fs::write(&log, vec![b'x'; 2048]).unwrap();

        let rotated = rotate_log_file(&log, 1024, 3).unwrap().unwrap();
        assert!(!log.exists());
        assert!(rotated.exists());
        let name = rotated.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("watch.log."));
        assert!(name.ends_with(".bak"));
    }

    #[test]
    fn archive_count_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("watch.log");

        // Seed old archives with sortable (oldest-first) timestamps
        for stamp in ["20240101000000", "20240102000000", "20240103000000"] {
            fs::write(dir.path().join(format!("watch.log.{stamp}.bak")), "old").unwrap();
        }
        fs::write(&log, vec![b'x'; 2048]).unwrap();

        rotate_log_file(&log, 1024, 3).unwrap();

        let mut archives: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".bak"))
            .collect();
        archives.sort();
        assert_eq!(archives.len(), 3);
        // The oldest seeded archive was pruned
        assert!(!archives.contains(&"watch.log.20240101000000.bak".to_string()));
    }
}
