use std::fs;
use std::path::Path;

use tracing::info;

use crate::app::Result;
use crate::domain::Snapshot;

/// Write `snapshot` as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;

    info!(
        path = %path.display(),
        friends = snapshot.stats.friends_total,
        posts = snapshot.stats.posts_total,
        "Exported snapshot"
    );
    Ok(())
}

/// Remove a previous export. A missing file is not an error.
pub fn remove(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
