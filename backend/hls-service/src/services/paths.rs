//! Resolution of client-supplied names under the output directory

use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, Result};

/// Lexical check: only normal components survive, `.` is dropped
pub fn sanitize_relative(raw: &str) -> Result<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidPath("empty path".to_string()));
    }

    let mut clean = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(AppError::InvalidPath(raw.to_string()));
            }
        }
    }

    if clean.as_os_str().is_empty() {
        return Err(AppError::InvalidPath(raw.to_string()));
    }
    Ok(clean)
}

/// Resolve `raw` to an existing file inside `root`.
///
/// Symlinks are followed and the target must still lie under the
/// canonical root.
pub async fn resolve_under(root: &Path, raw: &str) -> Result<PathBuf> {
    let relative = sanitize_relative(raw)?;

    let canonical_root = tokio::fs::canonicalize(root).await?;
    let candidate = canonical_root.join(&relative);

    let resolved = match tokio::fs::canonicalize(&candidate).await {
        Ok(path) => path,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(raw.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    if !resolved.starts_with(&canonical_root) {
        tracing::warn!(requested = raw, "path escapes output directory");
        return Err(AppError::InvalidPath(raw.to_string()));
    }

    if !tokio::fs::metadata(&resolved).await?.is_file() {
        return Err(AppError::NotFound(raw.to_string()));
    }

    Ok(resolved)
}

/// File-system safe version of a client filename
fn safe_file_name(raw: &str) -> Option<String> {
    let name = Path::new(raw.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let cleaned = sanitize_filename::sanitize(name);
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        None
    } else {
        Some(cleaned)
    }
}

/// Longest single path component common filesystems accept, in bytes
const NAME_MAX: usize = 255;

/// On-disk name made of `prefix` and the sanitized client name. The stem is
/// shortened on a char boundary so the result fits in one path component;
/// the extension is kept.
pub fn prefixed_file_name(prefix: &str, raw: &str) -> Option<String> {
    let name = safe_file_name(raw)?;
    let budget = NAME_MAX.checked_sub(prefix.len()).filter(|b| *b > 0)?;
    if name.len() <= budget {
        return Some(format!("{prefix}{name}"));
    }

    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot < budget => name.split_at(dot),
        _ => (name.as_str(), ""),
    };
    let mut end = budget - ext.len();
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    Some(format!("{prefix}{}{ext}", &stem[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_relative() {
        assert_eq!(
            sanitize_relative("abc/playlist.m3u8").unwrap(),
            PathBuf::from("abc/playlist.m3u8")
        );
        assert_eq!(
            sanitize_relative("./abc/./x.ts").unwrap(),
            PathBuf::from("abc/x.ts")
        );

        for bad in ["", "  ", ".", "../etc/passwd", "abc/../../x", "/etc/passwd"] {
            assert!(
                matches!(sanitize_relative(bad), Err(AppError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("clip.mp4").as_deref(), Some("clip.mp4"));
        assert_eq!(safe_file_name("../../clip.mp4").as_deref(), Some("clip.mp4"));
        assert_eq!(safe_file_name("dir/a:b.mp4").as_deref(), Some("ab.mp4"));
        assert_eq!(safe_file_name(""), None);
        assert_eq!(safe_file_name(".."), None);
    }

    #[test]
    fn test_prefixed_file_name_fits_one_component() {
        assert_eq!(
            prefixed_file_name("source_", "clip.mp4").as_deref(),
            Some("source_clip.mp4")
        );
        assert_eq!(prefixed_file_name("source_", ".."), None);

        let long = format!("{}.mp4", "a".repeat(250));
        let name = prefixed_file_name("source_", &long).unwrap();
        assert_eq!(name.len(), NAME_MAX);
        assert!(name.starts_with("source_aaa"));
        assert!(name.ends_with(".mp4"));

        let wide = format!("{}.webm", "é".repeat(125));
        let name = prefixed_file_name("source_", &wide).unwrap();
        assert!(name.len() <= NAME_MAX);
        assert!(name.ends_with("é.webm"));
    }

    #[tokio::test]
    async fn test_resolve_under() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("abc")).unwrap();
        std::fs::write(root.path().join("abc/playlist.m3u8"), "#EXTM3U").unwrap();

        let resolved = resolve_under(root.path(), "abc/playlist.m3u8").await.unwrap();
        assert!(resolved.ends_with("abc/playlist.m3u8"));

        assert!(matches!(
            resolve_under(root.path(), "abc/missing.ts").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            resolve_under(root.path(), "abc").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            resolve_under(root.path(), "../outside").await,
            Err(AppError::InvalidPath(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_rejected() {
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "x").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.path().join("link"))
            .unwrap();

        assert!(matches!(
            resolve_under(root.path(), "link").await,
            Err(AppError::InvalidPath(_))
        ));
    }
}
