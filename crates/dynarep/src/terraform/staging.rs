//! Working area staging.
//!
//! Every run gets a fresh directory: the previous one is removed in full,
//! the artifact is written and synced under a temporary name, then renamed
//! into place. Nothing from an earlier run survives into the next one.

use std::path::{Component, Path};

use dynarep_core::provisioning::WorkingArea;
use dynarep_core::replication::Artifact;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::{Result, TerraformError};

/// Name terraform expects for the provider lock file.
pub const LOCK_FILE_NAME: &str = ".terraform.lock.hcl";

/// Replaces `working_dir` with a fresh directory holding the artifact and,
/// if given, a copy of the provider lock file.
pub async fn stage_artifact(
    working_dir: &Path,
    artifact: &Artifact,
    lock_file: Option<&Path>,
) -> Result<WorkingArea> {
    if !is_safe_working_dir(working_dir) {
        return Err(TerraformError::UnsafeWorkingArea(working_dir.to_path_buf()));
    }

    match fs::remove_dir_all(working_dir).await {
        Ok(()) => tracing::debug!(path = %working_dir.display(), "Removed previous working area"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(TerraformError::io("remove", working_dir, e)),
    }

    fs::create_dir_all(working_dir)
        .await
        .map_err(|e| TerraformError::io("create", working_dir, e))?;

    write_synced(working_dir, &artifact.file_name, artifact.contents.as_bytes()).await?;

    if let Some(lock_file) = lock_file {
        let target = working_dir.join(LOCK_FILE_NAME);
        fs::copy(lock_file, &target)
            .await
            .map_err(|e| TerraformError::io("copy lock file to", &target, e))?;
    }

    Ok(WorkingArea::new(working_dir))
}

/// Writes `contents` to `dir/name` so the file is either absent or complete.
async fn write_synced(dir: &Path, name: &str, contents: &[u8]) -> Result<()> {
    let target = dir.join(name);
    let temp = dir.join(format!(".{}.tmp", name));

    let mut file = fs::File::create(&temp)
        .await
        .map_err(|e| TerraformError::io("create", &temp, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| TerraformError::io("write", &temp, e))?;
    file.sync_all()
        .await
        .map_err(|e| TerraformError::io("sync", &temp, e))?;
    drop(file);

    fs::rename(&temp, &target)
        .await
        .map_err(|e| TerraformError::io("rename", &target, e))
}

/// A working dir must name at least one normal component and never climb with `..`.
pub fn is_safe_working_dir(path: &Path) -> bool {
    let mut has_normal = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::ParentDir => return false,
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }
    has_normal
}
