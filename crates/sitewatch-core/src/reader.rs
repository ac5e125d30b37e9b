// ── File access for discovery and certificate reads ──
//
// Vhost files and panel certificates often live under root-owned trees.
// `RoutedReader` sends those paths through `sudo -n` and everything else
// through plain async file I/O; tests swap in their own `FileReader`.

use std::ffi::OsStr;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::CoreError;

/// Read access to config and certificate files.
pub trait FileReader: Send + Sync {
    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> impl Future<Output = Result<String, CoreError>> + Send;

    /// Find regular files named `file_name` at most `max_depth` levels
    /// below `root`. A missing root yields an empty list.
    fn find_files(
        &self,
        root: &Path,
        file_name: &str,
        max_depth: usize,
    ) -> impl Future<Output = Result<Vec<PathBuf>, CoreError>> + Send;
}

// ── Local reader ────────────────────────────────────────────────────

/// Unprivileged reads through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalReader;

impl FileReader for LocalReader {
    async fn read_to_string(&self, path: &Path) -> Result<String, CoreError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| read_error(path, &e))
    }

    async fn find_files(
        &self,
        root: &Path,
        file_name: &str,
        max_depth: usize,
    ) -> Result<Vec<PathBuf>, CoreError> {
        let mut found = Vec::new();
        let mut frontier = vec![(root.to_path_buf(), 0_usize)];

        while let Some((dir, depth)) = frontier.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound && depth == 0 => return Ok(found),
                Err(e) => {
                    // Unreadable subtrees are skipped, not fatal.
                    debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };
            while let Some(entry) = entries.next_entry().await.map_err(|e| read_error(&dir, &e))? {
                let path = entry.path();
                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };
                if file_type.is_dir() {
                    if depth + 1 < max_depth {
                        frontier.push((path, depth + 1));
                    }
                } else if entry.file_name() == file_name && !file_type.is_symlink() {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

fn read_error(path: &Path, err: &io::Error) -> CoreError {
    CoreError::Read {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

// ── Privileged reader ───────────────────────────────────────────────

/// Reads through non-interactive `sudo`, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct SudoReader {
    timeout: Duration,
}

impl SudoReader {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, path: &Path, args: &[&OsStr]) -> Result<String, CoreError> {
        let failed = |reason: String| CoreError::PrivilegedRead {
            path: path.display().to_string(),
            reason,
        };

        trace!(path = %path.display(), ?args, "sudo");
        let child = Command::new("sudo")
            .arg("-n")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| failed(format!("timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| failed(format!("cannot spawn sudo: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("{}: {}", output.status, stderr.trim())));
        }
        String::from_utf8(output.stdout).map_err(|e| failed(format!("non UTF-8 output: {e}")))
    }
}

impl FileReader for SudoReader {
    async fn read_to_string(&self, path: &Path) -> Result<String, CoreError> {
        self.run(path, &[OsStr::new("cat"), OsStr::new("--"), path.as_os_str()])
            .await
    }

    async fn find_files(
        &self,
        root: &Path,
        file_name: &str,
        max_depth: usize,
    ) -> Result<Vec<PathBuf>, CoreError> {
        // `find -maxdepth` counts the root as depth 0 and files inside a
        // directory one level deeper than it.
        let depth = max_depth.to_string();
        let stdout = self
            .run(
                root,
                &[
                    OsStr::new("find"),
                    root.as_os_str(),
                    OsStr::new("-maxdepth"),
                    OsStr::new(&depth),
                    OsStr::new("-type"),
                    OsStr::new("f"),
                    OsStr::new("-name"),
                    OsStr::new(file_name),
                ],
            )
            .await;

        match stdout {
            Ok(out) => {
                let mut found: Vec<PathBuf> = out
                    .lines()
                    .filter(|l| !l.is_empty())
                    .map(PathBuf::from)
                    .collect();
                found.sort();
                Ok(found)
            }
            Err(_) if !root.exists() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

// ── Routing reader ──────────────────────────────────────────────────

/// Picks a privileged or local read per path prefix.
#[derive(Debug, Clone)]
pub struct RoutedReader {
    privileged_prefixes: Vec<PathBuf>,
    local: LocalReader,
    sudo: SudoReader,
}

impl RoutedReader {
    pub fn new(privileged_prefixes: Vec<PathBuf>, timeout: Duration) -> Self {
        Self {
            privileged_prefixes,
            local: LocalReader,
            sudo: SudoReader::new(timeout),
        }
    }

    /// `true` if `path` lies under a root-owned tree.
    pub fn needs_privilege(&self, path: &Path) -> bool {
        self.privileged_prefixes.iter().any(|p| path.starts_with(p))
    }
}

impl FileReader for RoutedReader {
    async fn read_to_string(&self, path: &Path) -> Result<String, CoreError> {
        if self.needs_privilege(path) {
            self.sudo.read_to_string(path).await
        } else {
            self.local.read_to_string(path).await
        }
    }

    async fn find_files(
        &self,
        root: &Path,
        file_name: &str,
        max_depth: usize,
    ) -> Result<Vec<PathBuf>, CoreError> {
        if self.needs_privilege(root) {
            self.sudo.find_files(root, file_name, max_depth).await
        } else {
            self.local.find_files(root, file_name, max_depth).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_prefix() {
        let reader = RoutedReader::new(
            vec![PathBuf::from("/home"), PathBuf::from("/usr/local/hestia")],
            Duration::from_secs(5),
        );
        assert!(reader.needs_privilege(Path::new("/home/alice/conf/web/a.com/nginx.conf")));
        assert!(reader.needs_privilege(Path::new("/usr/local/hestia/data/users/alice/ssl/a.com.crt")));
        assert!(!reader.needs_privilege(Path::new("/etc/nginx/sites-enabled/shop")));
        // Prefix match is per path component.
        assert!(!reader.needs_privilege(Path::new("/homepage/site.conf")));
    }

    #[tokio::test]
    async fn local_find_respects_depth() {
        let root = tempfile::tempdir().unwrap();
        let shallow = root.path().join("alice");
        let deep = root.path().join("bob/conf/web/b.example");
        std::fs::create_dir_all(&shallow).unwrap();
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(shallow.join("nginx.conf"), "server_name a;").unwrap();
        std::fs::write(deep.join("nginx.conf"), "server_name b;").unwrap();
        std::fs::write(deep.join("other.conf"), "server_name c;").unwrap();

        let reader = LocalReader;
        let all = reader.find_files(root.path(), "nginx.conf", 5).await.unwrap();
        assert_eq!(all, vec![shallow.join("nginx.conf"), deep.join("nginx.conf")]);

        let near = reader.find_files(root.path(), "nginx.conf", 1).await.unwrap();
        assert_eq!(near, Vec::<PathBuf>::new());

        let two = reader.find_files(root.path(), "nginx.conf", 2).await.unwrap();
        assert_eq!(two, vec![shallow.join("nginx.conf")]);
    }

    #[tokio::test]
    async fn local_find_on_missing_root_is_empty() {
        let found = LocalReader
            .find_files(Path::new("/nonexistent/sitewatch-test"), "nginx.conf", 5)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn local_read_error_names_path() {
        let err = LocalReader
            .read_to_string(Path::new("/nonexistent/sitewatch-test.conf"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Read { ref path, .. } if path == "/nonexistent/sitewatch-test.conf"));
    }
}
