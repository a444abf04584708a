//! # KRODE Site Server Utilities
//!
//! File: cli/src/commands/srv/utils.rs
//!
//! ## Overview
//!
//! Helpers for the startup banner of `krode srv`:
//! - a summary of the served directory, logged at startup
//! - local network IP detection for the network URL
//!
use std::net::{IpAddr, UdpSocket};
use std::path::Path;
use tracing::{info, warn};

/// What the server found in the served directory at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteSummary {
    pub files: usize,
    pub directories: usize,
    pub has_index: bool,
}

/// # Summarize Site (`summarize_site`)
///
/// Counts the top-level entries of `path`, logs each one at INFO level and
/// checks whether `index_file` exists. Read errors are logged and yield an
/// empty summary; they never stop the server.
pub fn summarize_site(path: &Path, index_file: &str) -> SiteSummary {
    let mut summary = SiteSummary {
        has_index: path.join(index_file).is_file(),
        ..SiteSummary::default()
    };

    info!("Directory contents for {}:", path.display());
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to read directory {}: {}", path.display(), e);
            return summary;
        }
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let is_dir = entry.metadata().map(|m| m.is_dir()).unwrap_or(false);
        if is_dir {
            summary.directories += 1;
        } else {
            summary.files += 1;
        }
        info!(
            "  - {} : {}",
            if is_dir { "DIR " } else { "FILE" },
            entry.file_name().to_string_lossy()
        );
    }

    if summary.files + summary.directories == 0 {
        info!("  (directory is empty)");
    }
    if !summary.has_index {
        warn!("Index file '{}' is missing", index_file);
    }
    summary
}

/// # Get Local IP (`get_local_ip`)
///
/// Returns the address of the interface used for outbound traffic, or
/// `None` when it cannot be determined or is a loopback address. No
/// packet is sent: connecting a UDP socket only selects a route.
pub fn get_local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_loopback() || ip.is_unspecified() {
        None
    } else {
        Some(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_summarize_site_counts_entries() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(temp_dir.path().join("style.css"), "body {}").unwrap();
        fs::create_dir(temp_dir.path().join("img")).unwrap();

        let summary = summarize_site(temp_dir.path(), "index.html");
        assert_eq!(
            summary,
            SiteSummary {
                files: 2,
                directories: 1,
                has_index: true,
            }
        );
    }

    #[test]
    fn test_summarize_site_missing_index() {
        let temp_dir = TempDir::new().unwrap();
        let summary = summarize_site(temp_dir.path(), "index.html");
        assert!(!summary.has_index);
        assert_eq!(summary.files, 0);
    }

    #[test]
    fn test_summarize_site_unreadable_directory() {
        let summary = summarize_site(Path::new("/path/that/does/not/exist"), "index.html");
        assert_eq!(summary, SiteSummary::default());
    }

    #[test]
    fn test_get_local_ip_is_never_loopback() {
        if let Some(ip) = get_local_ip() {
            assert!(!ip.is_loopback());
        }
    }
}
