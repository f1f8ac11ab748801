use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::{EnrichmentConfig, FieldAliases, IngestOptions, SenderContext};
use crate::tui::{KeyBinding, KeyBindings};

const CONFIG: &str = include_str!("../.config/config.json5");

/// Prefix of environment overrides, e.g. `LEADSCOPE_ENRICHMENT__TIMEOUT_SECS=5`
const ENV_PREFIX: &str = "LEADSCOPE";

const HOME_CONFIG_FILE: &str = ".leadscope-config.json5";

/// Application configuration, loaded once at startup
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sender: SenderContext,
    #[serde(default)]
    pub ingest: IngestOptions,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub fields: FieldAliases,
    /// Bindings layered over the defaults
    #[serde(default)]
    pub keybindings: Vec<KeyBinding>,
}

impl Config {
    /// Load from `config_path`, or from `~/.leadscope-config.json5` (written from the
    /// embedded defaults when missing).
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let selected_path = match config_path {
            Some(p) => expand_tilde(&p.to_string_lossy()),
            None => {
                let home_cfg = default_home_config_path();
                if !home_cfg.exists() {
                    write_defaults(&home_cfg);
                }
                home_cfg
            }
        };
        Self::load(&selected_path)
    }

    /// Embedded defaults, then `path`, then `LEADSCOPE_*` environment variables
    pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5))
            .add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Json5)
                    .required(true),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Default keybindings with this configuration's overrides applied
    pub fn key_bindings(&self) -> KeyBindings {
        let bindings = KeyBindings::with_overrides(&self.keybindings);
        for warning in bindings.validate() {
            warn!("Keybindings: {warning}");
        }
        bindings
    }
}

fn write_defaults(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match fs::write(path, CONFIG) {
        Ok(()) => info!("Wrote default configuration to {}", path.display()),
        Err(e) => warn!("Could not write default configuration to {}: {e}", path.display()),
    }
}

/// Replace a leading `~` with the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(base) = BaseDirs::new() {
            let rest = rest.trim_start_matches(['/', '\\']);
            return base.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(HOME_CONFIG_FILE);
    }
    PathBuf::from(HOME_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::{CachePolicy, RowLengthPolicy};
    use crate::tui::Action;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_embedded_config_matches_defaults() {
        let embedded: Config = json5::from_str(CONFIG).unwrap();
        assert_eq!(embedded, Config::default());
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadscope.json5");
        fs::write(
            &path,
            r#"{
                // partial file: everything else comes from the defaults
                sender: { company_name: "Acme Outreach" },
                ingest: { delimiter: ";", row_length_policy: "pad" },
                enrichment: { timeout_secs: 3, cache_policy: "session" },
                keybindings: [ { key: "x", action: "Quit" } ],
            }"#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.sender.company_name, "Acme Outreach");
        assert_eq!(cfg.sender.role, "Sales Development Representative");
        assert_eq!(cfg.ingest.delimiter, ';');
        assert_eq!(cfg.ingest.row_length_policy, RowLengthPolicy::Pad);
        assert!(cfg.ingest.header_row);
        assert_eq!(cfg.enrichment.timeout_secs, 3);
        assert_eq!(cfg.enrichment.cache_policy, CachePolicy::Session);
        assert_eq!(cfg.enrichment.analysis_char_budget, 500);
        assert_eq!(cfg.fields, FieldAliases::default());

        let bindings = cfg.key_bindings();
        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(bindings.get_action(&x), Some(Action::Quit));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json5");
        assert!(Config::from_path(Some(&missing)).is_err());
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/tmp/a.csv"), PathBuf::from("/tmp/a.csv"));
        if let Some(base) = BaseDirs::new() {
            assert_eq!(expand_tilde("~/a.csv"), base.home_dir().join("a.csv"));
        }
    }
}
