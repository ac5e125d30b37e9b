// ── Vhost discovery across server layouts ──
//
// Each layout is an adapter producing `(path, text, is_enabled)` triples
// for the parser. A missing layout yields nothing; a failing layout or
// file is logged and skipped without affecting the others.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use strum::Display;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::model::{RawSiteEntry, SiteOrigin};
use crate::parser;
use crate::reader::FileReader;

/// The layouts discovery knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Layout {
    /// `sites-enabled` + `sites-available`.
    Standard,
    /// One fixed-name config per vhost below the panel root.
    PanelVhosts,
    /// Panel auxiliary fragments matched by a glob.
    PanelAux,
}

impl Layout {
    pub const ALL: [Self; 3] = [Self::Standard, Self::PanelVhosts, Self::PanelAux];
}

/// Locates vhost definitions and parses them into raw entries.
#[derive(Debug, Clone)]
pub struct ConfigDiscovery<R> {
    config: MonitorConfig,
    reader: R,
}

impl<R: FileReader> ConfigDiscovery<R> {
    pub fn new(config: MonitorConfig, reader: R) -> Self {
        Self { config, reader }
    }

    /// Run every layout and concatenate their entries.
    ///
    /// Never fails: a layout that errors contributes zero entries.
    pub async fn discover(&self) -> Vec<RawSiteEntry> {
        let mut entries = Vec::new();
        for layout in Layout::ALL {
            match self.discover_layout(layout).await {
                Ok(found) => {
                    debug!(%layout, count = found.len(), "layout discovered");
                    entries.extend(found);
                }
                Err(e) => warn!(%layout, error = %e, "layout discovery failed"),
            }
        }
        info!(count = entries.len(), "discovered site configs");
        entries
    }

    /// Run a single layout.
    pub async fn discover_layout(&self, layout: Layout) -> Result<Vec<RawSiteEntry>, CoreError> {
        match layout {
            Layout::Standard => self.standard().await,
            Layout::PanelVhosts => self.panel_vhosts().await,
            Layout::PanelAux => self.panel_aux().await,
        }
    }

    // ── Layout A: sites-enabled / sites-available ───────────────────

    async fn standard(&self) -> Result<Vec<RawSiteEntry>, CoreError> {
        if !tokio::fs::try_exists(&self.config.nginx_root).await.unwrap_or(false) {
            debug!(root = %self.config.nginx_root.display(), "no server config root; skipping");
            return Ok(Vec::new());
        }

        let enabled = self.list_site_files(&self.config.sites_enabled_dir).await?;
        let enabled_names: HashSet<_> = enabled
            .iter()
            .filter_map(|p| p.file_name().map(ToOwned::to_owned))
            .collect();
        let available: Vec<PathBuf> = self
            .list_site_files(&self.config.sites_available_dir)
            .await?
            .into_iter()
            .filter(|p| p.file_name().is_some_and(|n| !enabled_names.contains(n)))
            .collect();

        let mut entries = Vec::with_capacity(enabled.len() + available.len());
        for path in &enabled {
            entries.extend(self.load(path, true, SiteOrigin::Standard).await);
        }
        for path in &available {
            entries.extend(self.load(path, false, SiteOrigin::Standard).await);
        }
        Ok(entries)
    }

    /// Files in a sites directory, minus the default placeholder. A
    /// missing directory is empty.
    async fn list_site_files(&self, dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
        let unreadable = |e: &std::io::Error| CoreError::Discovery {
            layout: Layout::Standard.to_string(),
            reason: format!("{}: {e}", dir.display()),
        };
        let mut read_dir = match tokio::fs::read_dir(dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unreadable(&e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| unreadable(&e))? {
            if entry.file_name() == *self.config.default_site_name {
                continue;
            }
            // Follows symlinks: sites-enabled usually links into sites-available.
            let path = entry.path();
            if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    // ── Layout B: panel per-vhost configs ───────────────────────────

    async fn panel_vhosts(&self) -> Result<Vec<RawSiteEntry>, CoreError> {
        let files = self
            .reader
            .find_files(
                &self.config.panel_vhosts_root,
                &self.config.panel_vhost_filename,
                self.config.panel_search_depth,
            )
            .await
            .map_err(|e| CoreError::Discovery {
                layout: Layout::PanelVhosts.to_string(),
                reason: e.to_string(),
            })?;

        let mut entries = Vec::with_capacity(files.len());
        for path in &files {
            entries.extend(self.load(path, true, SiteOrigin::Panel).await);
        }
        Ok(entries)
    }

    // ── Layout C: panel auxiliary fragments ─────────────────────────

    async fn panel_aux(&self) -> Result<Vec<RawSiteEntry>, CoreError> {
        let paths = glob::glob(&self.config.panel_aux_glob).map_err(|e| CoreError::Discovery {
            layout: Layout::PanelAux.to_string(),
            reason: format!("invalid glob '{}': {e}", self.config.panel_aux_glob),
        })?;

        let mut files: Vec<PathBuf> = paths
            .filter_map(|p| match p {
                Ok(path) => Some(path),
                Err(e) => {
                    debug!(error = %e, "skipping unreadable glob match");
                    None
                }
            })
            .filter(|p| p.is_file())
            .collect();
        files.sort();

        let mut entries = Vec::with_capacity(files.len());
        for path in &files {
            entries.extend(self.load(path, true, SiteOrigin::Panel).await);
        }
        Ok(entries)
    }

    // ── Per-file loading ────────────────────────────────────────────

    /// Read and parse one file; failures are logged and yield `None`.
    async fn load(&self, path: &Path, is_enabled: bool, origin: SiteOrigin) -> Option<RawSiteEntry> {
        match self.try_load(path, is_enabled, origin).await {
            Ok(entry) => Some(entry),
            Err(e @ CoreError::Parse { .. }) => {
                debug!(error = %e, "not a vhost definition");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping site config");
                None
            }
        }
    }

    async fn try_load(
        &self,
        path: &Path,
        is_enabled: bool,
        origin: SiteOrigin,
    ) -> Result<RawSiteEntry, CoreError> {
        let raw = self.reader.read_to_string(path).await?;
        let display = path.display().to_string();
        let mut entry = parser::parse(&display, &raw, is_enabled).map_err(|failure| {
            CoreError::Parse {
                path: display.clone(),
                failure,
            }
        })?;
        entry.config_path = origin.tag_path(&display);
        entry.origin = origin;
        Ok(entry)
    }
}
