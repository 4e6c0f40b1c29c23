use chrono::Local;
use std::env::consts;
use std::path::Path;
use tokio::process::Command;

use crate::process::{self, CommandResult};

/// Version of the application the generated stamp belongs to.
pub const STATIC_VERSION: &str = "0.1.1-dev";

/// Substituted when a lookup command fails or is unavailable.
const PLACEHOLDER: &str = "[unknown]";

/// Assemble the full version string: static version, git revision, toolchain
/// and platform, and the build timestamp.
pub async fn build_version_string(repo_dir: Option<&Path>) -> String {
    let git_rev = determine_git_rev(repo_dir).await;
    let toolchain = determine_toolchain().await;
    let now = Local::now();

    format!(
        "{} (git:{}) ({} {} {}) ({})",
        STATIC_VERSION,
        git_rev,
        toolchain,
        consts::OS,
        consts::ARCH,
        now.to_rfc2822()
    )
}

async fn determine_git_rev(repo_dir: Option<&Path>) -> String {
    let mut cmd = Command::new("git");
    cmd.args(["rev-parse", "--short", "HEAD"]);
    if let Some(dir) = repo_dir {
        cmd.current_dir(dir);
    }
    lookup(cmd, "git revision").await
}

async fn determine_toolchain() -> String {
    let mut cmd = Command::new("rustc");
    cmd.arg("--version");
    let raw = lookup(cmd, "toolchain version").await;

    // "rustc 1.80.0 (abc123 2024-06-01)" -> "rustc 1.80.0"
    raw.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// Run a lookup command and return its trimmed stdout, degrading to the
/// placeholder on any failure. Lookup failures are never fatal.
async fn lookup(cmd: Command, what: &str) -> String {
    let CommandResult {
        stdout,
        stderr,
        error,
    } = process::run_command(cmd).await;

    match error {
        None => String::from_utf8_lossy(&stdout).trim().to_string(),
        Some(e) => {
            tracing::warn!(
                "{} lookup failed, substituting {}: {:#}; stdout: {}; stderr: {}",
                what,
                PLACEHOLDER,
                e,
                String::from_utf8_lossy(&stdout).trim(),
                String::from_utf8_lossy(&stderr).trim()
            );
            PLACEHOLDER.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[tokio::test]
    async fn rev_lookup_outside_a_repo_degrades_to_placeholder() {
        let dir = TempDir::new().unwrap();
        let rev = determine_git_rev(Some(dir.path())).await;
        assert_eq!(rev, PLACEHOLDER);
    }

    #[tokio::test]
    async fn version_string_carries_all_segments() {
        let version = build_version_string(None).await;
        assert!(version.starts_with(STATIC_VERSION));
        assert!(version.contains("(git:"));
        assert!(version.contains(consts::OS));
        assert!(version.contains(consts::ARCH));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn toolchain_probe_yields_a_compact_value() {
        let toolchain = determine_toolchain().await;
        assert!(!toolchain.is_empty());
        // Either "rustc x.y.z" or the placeholder, never the full banner
        assert!(toolchain.split_whitespace().count() <= 2);
    }
}
