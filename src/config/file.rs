//
//  bosh-cli
//  config/file.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration File I/O
//!
//! Small file helpers used by [`Config`](super::Config) and by commands that
//! take a CA certificate either inline or as a path.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use bosh_cli::config::{read_config_file, write_config_file};
//!
//! let path = Path::new("/tmp/bosh/config.toml");
//! write_config_file(path, "default_environment = \"vbox\"\n")?;
//! let content = read_config_file(path)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::Path;

use anyhow::{Context, Result};

pub fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))
}

/// Writes `content` to `path`, creating parent directories first.
///
/// On Unix the file is made readable by its owner only, since it holds
/// client secrets and tokens.
pub fn write_config_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file '{}'", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions of '{}'", path.display()))?;
    }

    Ok(())
}

pub fn config_exists(path: &Path) -> bool {
    path.exists()
}

/// Returns a CA certificate given either as PEM text or as a path to a PEM
/// file.
pub fn resolve_ca_cert(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.starts_with("-----BEGIN") {
        return Ok(trimmed.to_string());
    }

    std::fs::read_to_string(trimmed)
        .with_context(|| format!("Failed to read CA certificate '{trimmed}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(!config_exists(&path));
        write_config_file(&path, "default_environment = \"vbox\"\n").unwrap();
        assert!(config_exists(&path));
        assert_eq!(read_config_file(&path).unwrap(), "default_environment = \"vbox\"\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_config_file(&path, "").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_ca_cert_inline_or_path() {
        let pem = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
        assert_eq!(resolve_ca_cert(pem).unwrap(), pem.trim());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca.pem");
        std::fs::write(&path, pem).unwrap();
        assert_eq!(resolve_ca_cert(path.to_str().unwrap()).unwrap(), pem);

        assert!(resolve_ca_cert("/nonexistent/ca.pem").is_err());
    }
}
