use std::path::Path;

use crate::error::{ProvisionError, Result};

/// Persist `token` verbatim to `path`, replacing any previous token.
pub async fn write_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ProvisionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, token)
        .await
        .map_err(|source| ProvisionError::Io {
            path: path.to_path_buf(),
            source,
        })
}

const REDACT_PREFIX_CHARS: usize = 4;

/// Log-safe rendering of a token: first four characters and the length.
/// Tokens no longer than the prefix show only their length.
pub fn redact(token: &str) -> String {
    let len = token.chars().count();
    if len <= REDACT_PREFIX_CHARS {
        return format!("… ({} chars)", len);
    }

    let prefix: String = token.chars().take(REDACT_PREFIX_CHARS).collect();
    format!("{}… ({} chars)", prefix, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_token_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token_data").join("sonar-token.txt");

        write_token(&path, "abc123").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_write_token_overwrites_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sonar-token.txt");
        std::fs::write(&path, "an-older-and-much-longer-token").unwrap();

        write_token(&path, "abc123").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_write_token_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file
        let err = write_token(dir.path(), "abc123").await.unwrap_err();
        match err {
            ProvisionError::Io { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("squ_0123456789"), "squ_… (14 chars)");
        assert_eq!(redact("squ_0"), "squ_… (5 chars)");
        assert_eq!(redact("ab"), "… (2 chars)");
        assert_eq!(redact("abcd"), "… (4 chars)");
        assert_eq!(redact(""), "… (0 chars)");
    }
}
