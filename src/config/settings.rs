use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::auth::AuthConfig;
use crate::markup::RenderOptions;
use crate::timeline::PlaybackConfig;
use crate::ui::action::Action;
use crate::util::paths::config_path;

use super::default_keys::default_keybindings;
use super::keys::{parse_key_notation, KeyContext, KeybindingConfig};

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub inspector: RenderOptions,
    pub playback: PlaybackConfig,
    pub auth: AuthConfig,
    /// GraphQL endpoint for comments; comments stay in memory without it
    pub comments_endpoint: Option<String>,
    pub keybindings: KeybindingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inspector: RenderOptions::default(),
            playback: PlaybackConfig::default(),
            auth: AuthConfig::default(),
            comments_endpoint: None,
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlInspectorConfig {
    pub show_whitespace_nodes: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlPlaybackConfig {
    pub frame_interval_ms: Option<u64>,
    pub stall_threshold_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlAuthConfig {
    pub domain: Option<String>,
    pub client_id: Option<String>,
    pub audience: Option<String>,
    pub refresh_seconds_before_expiry: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlCommentsConfig {
    pub endpoint: Option<String>,
}

/// `[keys]`: global bindings at the top level, per-panel tables below
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlKeybindings {
    #[serde(flatten)]
    pub global: HashMap<String, toml::Value>,
    pub inspector: Option<HashMap<String, String>>,
    pub comment_editor: Option<HashMap<String, String>>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub inspector: Option<TomlInspectorConfig>,
    pub playback: Option<TomlPlaybackConfig>,
    pub auth: Option<TomlAuthConfig>,
    pub comments: Option<TomlCommentsConfig>,
    pub keys: Option<TomlKeybindings>,
}

impl TomlKeybindings {
    fn to_keybinding_config(&self) -> KeybindingConfig {
        let mut config = KeybindingConfig::new();

        for (action_name, value) in &self.global {
            // Context tables are flattened in too; only strings are bindings
            let Some(key_str) = value.as_str() else {
                continue;
            };
            match (parse_key_notation(key_str), Action::from_name(action_name)) {
                (Ok(combo), Some(action)) => {
                    config.global.insert(combo, action);
                }
                _ => tracing::warn!(action = %action_name, key = %key_str, "Ignoring invalid keybinding"),
            }
        }

        if let Some(inspector) = &self.inspector {
            parse_context_bindings(&mut config, KeyContext::Inspector, inspector);
        }
        if let Some(editor) = &self.comment_editor {
            parse_context_bindings(&mut config, KeyContext::CommentEditor, editor);
        }

        config
    }
}

fn parse_context_bindings(
    config: &mut KeybindingConfig,
    context: KeyContext,
    bindings: &HashMap<String, String>,
) {
    let context_map = config.context.entry(context).or_default();
    for (action_name, key_str) in bindings {
        match (parse_key_notation(key_str), Action::from_name(action_name)) {
            (Ok(combo), Some(action)) => {
                context_map.insert(combo, action);
            }
            _ => tracing::warn!(
                context = context.config_name(),
                action = %action_name,
                key = %key_str,
                "Ignoring invalid keybinding"
            ),
        }
    }
}

impl Config {
    /// Load configuration from the data directory, merging with defaults.
    /// A missing file is created from the bundled example; an unreadable
    /// one is logged and ignored.
    pub fn load() -> Self {
        let config_file = config_path();

        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        match Self::load_from_path(&config_file) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %config_file.display(), error = %e, "Using default config");
                Config::default()
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        Ok(Self::default().merged(toml_config))
    }

    fn merged(mut self, toml_config: TomlConfig) -> Self {
        if let Some(inspector) = toml_config.inspector {
            if let Some(show) = inspector.show_whitespace_nodes {
                self.inspector.show_whitespace_nodes = show;
            }
        }

        if let Some(playback) = toml_config.playback {
            if let Some(ms) = playback.frame_interval_ms.filter(|ms| *ms > 0) {
                self.playback.frame_interval = Duration::from_millis(ms);
            }
            if let Some(ms) = playback.stall_threshold_ms {
                self.playback.stall_threshold = Duration::from_millis(ms);
            }
        }

        if let Some(auth) = toml_config.auth {
            if let Some(domain) = auth.domain {
                self.auth.domain = domain;
            }
            if let Some(client_id) = auth.client_id {
                self.auth.client_id = client_id;
            }
            if let Some(audience) = auth.audience {
                self.auth.audience = audience;
            }
            if let Some(secs) = auth.refresh_seconds_before_expiry {
                self.auth.refresh_seconds_before_expiry = secs;
            }
        }

        if let Some(comments) = toml_config.comments {
            self.comments_endpoint = comments.endpoint.filter(|e| !e.trim().is_empty());
        }

        if let Some(keys) = toml_config.keys {
            self.keybindings.merge(keys.to_keybinding_config());
        }

        self
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "Failed to create config directory");
                return;
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }
}
