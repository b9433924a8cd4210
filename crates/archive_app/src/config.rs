use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use archive_engine::{
    ArchiveSettings, AtomicFileWriter, FetchSettings, ForumSelectors, MediaOptions,
    PipelineSettings,
};
use archive_logging::archive_info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const CONFIG_PATH_ENV: &str = "FORUM_ARCHIVER_CONFIG";
const DEFAULT_ARCHIVE_ROOT: &str = "论坛存档";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Contents of `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiverConfig {
    pub forum_section_url: String,
    pub followed_authors: Vec<String>,
    #[serde(default = "default_archive_root")]
    pub archive_root: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub download: MediaOptions,
    #[serde(default)]
    pub resume_incomplete: bool,
    #[serde(default)]
    pub selectors: ForumSelectors,
}

fn default_archive_root() -> PathBuf {
    PathBuf::from(DEFAULT_ARCHIVE_ROOT)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ArchiverConfig {
    #[cfg(test)]
    pub fn new(forum_section_url: impl Into<String>) -> Self {
        Self {
            forum_section_url: forum_section_url.into(),
            followed_authors: Vec::new(),
            archive_root: default_archive_root(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            download: MediaOptions::default(),
            resume_incomplete: false,
            selectors: ForumSelectors::default(),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if config.forum_section_url.trim().is_empty() {
            bail!("{}: forumSectionUrl is empty", path.display());
        }
        Ok(config)
    }

    /// Like [`ArchiverConfig::load`], but a missing file is `None`.
    pub fn load_optional(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Write the config next to `path` and rename it into place.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("invalid config path {}", path.display()))?;

        let json = serde_json::to_string_pretty(self).context("serializing config")?;
        AtomicFileWriter::new(dir)
            .write(filename, json)
            .with_context(|| format!("writing config {}", path.display()))?;
        archive_info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Append `author` to the followed list. Returns false when it was
    /// already there.
    pub fn follow(&mut self, author: &str) -> bool {
        let author = author.trim();
        if author.is_empty() || self.followed_authors.iter().any(|a| a == author) {
            return false;
        }
        self.followed_authors.push(author.to_string());
        true
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings::default().with_timeout(Duration::from_secs(self.timeout_secs))
    }

    pub fn archive_settings(&self) -> ArchiveSettings {
        ArchiveSettings {
            archive_root: self.archive_root.clone(),
            selectors: self.selectors.clone(),
            media: self.download,
            resume_incomplete: self.resume_incomplete,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            listing_url: self.forum_section_url.clone(),
            archive: self.archive_settings(),
        }
    }
}

/// `--config` wins, then `FORUM_ARCHIVER_CONFIG`, then `./config.json`.
pub fn resolve_config_path(explicit: Option<&Path>, env_value: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const MINIMAL: &str = r#"{
        "forumSectionUrl": "https://forum.example/thread0806.php?fid=7",
        "followedAuthors": ["Alice", "Bob"]
    }"#;

    #[test]
    fn minimal_file_gets_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, MINIMAL).unwrap();

        let config = ArchiverConfig::load(&path).unwrap();
        assert_eq!(config.followed_authors, vec!["Alice", "Bob"]);
        assert_eq!(config.archive_root, PathBuf::from("论坛存档"));
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.download, MediaOptions::default());
        assert!(!config.resume_incomplete);
        assert_eq!(config.selectors, ForumSelectors::default());
    }

    #[test]
    fn partial_selector_override_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{
                "forumSectionUrl": "https://forum.example/list",
                "followedAuthors": [],
                "download": { "videos": false },
                "selectors": { "nextPageText": "Next" }
            }"#,
        )
        .unwrap();

        let config = ArchiverConfig::load(&path).unwrap();
        assert_eq!(config.selectors.next_page_text, "Next");
        assert_eq!(config.selectors.listing_table, "#tbody");
        assert!(config.download.photos);
        assert!(!config.download.videos);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "followedAuthors": [] }"#).unwrap();
        assert!(ArchiverConfig::load(&path).is_err());
    }

    #[test]
    fn missing_file_is_none_for_optional_load() {
        let dir = tempdir().unwrap();
        let loaded = ArchiverConfig::load_optional(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_keeps_camel_case_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = ArchiverConfig::new("https://forum.example/list");
        config.follow("Carol");
        config.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"forumSectionUrl\""));
        assert!(text.contains("\"followedAuthors\""));
        assert_eq!(ArchiverConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn follow_appends_once() {
        let mut config = ArchiverConfig::new("https://forum.example/list");
        assert!(config.follow("Alice"));
        assert!(!config.follow("Alice"));
        assert!(!config.follow(" Alice "));
        assert!(!config.follow("  "));
        assert!(config.follow("Bob"));
        assert_eq!(config.followed_authors, vec!["Alice", "Bob"]);
    }

    #[test]
    fn config_path_precedence() {
        let explicit = PathBuf::from("/etc/archiver.json");
        assert_eq!(
            resolve_config_path(Some(&explicit), Some("env.json".into())),
            explicit
        );
        assert_eq!(
            resolve_config_path(None, Some("env.json".into())),
            PathBuf::from("env.json")
        );
        assert_eq!(
            resolve_config_path(None, None),
            PathBuf::from(DEFAULT_CONFIG_PATH)
        );
    }

    #[test]
    fn timeout_applies_to_every_wait() {
        let mut config = ArchiverConfig::new("https://forum.example/list");
        config.timeout_secs = 5;
        let settings = config.fetch_settings();
        assert_eq!(settings.navigation_timeout, Duration::from_secs(5));
        assert_eq!(settings.selector_timeout, Duration::from_secs(5));
    }
}
