use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

pub(crate) fn resolve_user_id(
    configured: Option<&str>,
    path: &Path,
    ask: impl FnOnce() -> Result<String>,
) -> Result<String> {
    if let Some(id) = configured.map(str::trim).filter(|id| !id.is_empty()) {
        return Ok(id.to_string());
    }

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read user id file {}", path.display()))?;
        let saved = raw.trim();
        if !saved.is_empty() {
            return Ok(saved.to_string());
        }
    }

    let answer = ask()?;
    let id = answer.trim();
    if id.is_empty() {
        bail!("a Plex user UUID is required");
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, id)
        .with_context(|| format!("failed to save user id to {}", path.display()))?;
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_id_wins_without_touching_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("user_uuid");

        let id = resolve_user_id(Some(" cfg-id "), &path, || panic!("must not prompt"))
            .expect("configured id");
        assert_eq!(id, "cfg-id");
        assert!(!path.exists());
    }

    #[test]
    fn saved_id_is_read_and_trimmed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("user_uuid");
        fs::write(&path, "saved-id\n").expect("write id");

        let id = resolve_user_id(None, &path, || panic!("must not prompt")).expect("saved id");
        assert_eq!(id, "saved-id");
    }

    #[test]
    fn prompted_id_is_persisted_for_next_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("user_uuid");

        let id = resolve_user_id(None, &path, || Ok("typed-id  ".to_string())).expect("prompt");
        assert_eq!(id, "typed-id");
        assert_eq!(fs::read_to_string(&path).expect("id file"), "typed-id");

        let again = resolve_user_id(None, &path, || panic!("must not prompt twice"))
            .expect("saved id");
        assert_eq!(again, "typed-id");
    }

    #[test]
    fn empty_answer_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("user_uuid");

        let err = resolve_user_id(None, &path, || Ok("   ".to_string())).expect_err("empty id");
        assert!(err.to_string().contains("UUID is required"), "{err}");
        assert!(!path.exists());
    }
}
