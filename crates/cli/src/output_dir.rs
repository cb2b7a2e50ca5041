use std::io;
use std::path::Path;

/// Creates `path` if it is missing, otherwise deletes everything inside it.
/// The directory itself is kept. Returns how many entries were removed.
///
/// Symlinks inside it are removed, never followed.
#[tracing::instrument(fields(path = %path.display()))]
pub async fn prepare_output_dir(path: &Path) -> io::Result<usize> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Creating output directory");
            tokio::fs::create_dir_all(path).await?;
            return Ok(0);
        }
        Err(e) => return Err(e),
    };

    if !metadata.is_dir() {
        return Err(io::Error::other(format!(
            "{} exists and is not a directory",
            path.display()
        )));
    }

    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        let entry_path = entry.path();
        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&entry_path).await?;
        } else {
            tokio::fs::remove_file(&entry_path).await?;
        }
        tracing::trace!(entry = %entry_path.display(), "Removed");
        removed += 1;
    }

    tracing::debug!(removed, "Cleaned output directory");
    Ok(removed)
}
