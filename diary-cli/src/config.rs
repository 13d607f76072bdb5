use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use diary_core::tasks::{NoTasks, TaskSource, TaskwarriorSource, TodoTxtSource};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;
use time::UtcOffset;

pub const DIARY_PATH_VAR: &str = "DIARY_PATH";
pub const EDITOR_VAR: &str = "EDITOR";
pub const PAGER_VAR: &str = "PAGER";
const TASK_BACKEND_VAR: &str = "DIARY_TASK_BACKEND";
const TASK_COMMAND_VAR: &str = "DIARY_TASK_COMMAND";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Everything a session needs. The three required settings come from the
/// environment; task tracking from the optional config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub diary_path: PathBuf,
    pub editor: String,
    pub pager: String,
    pub tasks: TaskSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub tasks: TaskSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    pub backend: TaskBackend,
    /// Tracker executable; defaults per backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Extra whitespace-separated arguments, e.g. `project:home`.
    pub filter: String,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            backend: TaskBackend::Taskwarrior,
            command: None,
            filter: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TaskBackend {
    #[default]
    Taskwarrior,
    TodoTxt,
    None,
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("diary")
            .join("config.toml"))
    }

    /// Reads the environment first so a missing variable is reported before
    /// anything else happens.
    pub fn load() -> Result<Self> {
        let env = |name: &str| std::env::var(name).ok();
        let mut config = Self::from_lookup(env)?;

        let mut tasks = FileSettings::load(&Self::config_path()?)?.tasks;
        tasks.apply_overrides(env)?;
        config.tasks = tasks;
        Ok(config)
    }

    /// Required settings, checked in a fixed order. Blank values count as
    /// missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            diary_path: expand_home(&required(DIARY_PATH_VAR)?),
            editor: required(EDITOR_VAR)?,
            pager: required(PAGER_VAR)?,
            tasks: TaskSettings::default(),
        })
    }
}

impl FileSettings {
    /// Load settings from `path`. Returns defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Save settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

impl TaskSettings {
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(backend) = lookup(TASK_BACKEND_VAR) {
            self.backend = TaskBackend::from_str(backend.trim())
                .with_context(|| format!("Invalid {TASK_BACKEND_VAR} `{backend}`"))?;
        }
        if let Some(command) = lookup(TASK_COMMAND_VAR).filter(|c| !c.trim().is_empty()) {
            self.command = Some(command);
        }
        Ok(())
    }

    /// Builds the configured backend. `offset` turns tracker timestamps into
    /// local dates.
    pub fn source(&self, offset: UtcOffset) -> Box<dyn TaskSource> {
        match self.backend {
            TaskBackend::Taskwarrior => Box::new(
                TaskwarriorSource::new(self.command.as_deref().unwrap_or("task"), offset)
                    .with_filter(&self.filter),
            ),
            TaskBackend::TodoTxt => Box::new(
                TodoTxtSource::new(self.command.as_deref().unwrap_or("todo.sh"))
                    .with_filter(&self.filter),
            ),
            TaskBackend::None => Box::new(NoTasks),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn all_required_settings_present() {
        let config = Config::from_lookup(lookup(&[
            ("DIARY_PATH", "/srv/diary"),
            ("EDITOR", "vim"),
            ("PAGER", "less -R"),
        ]))
        .unwrap();
        assert_eq!(config.diary_path, PathBuf::from("/srv/diary"));
        assert_eq!(config.editor, "vim");
        assert_eq!(config.pager, "less -R");
    }

    #[test]
    fn missing_settings_reported_in_order() {
        assert_eq!(
            Config::from_lookup(lookup(&[("PAGER", "less")])).unwrap_err(),
            ConfigError::Missing("DIARY_PATH")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("DIARY_PATH", "/d"), ("EDITOR", "  ")])).unwrap_err(),
            ConfigError::Missing("EDITOR")
        );
        let err = Config::from_lookup(lookup(&[("DIARY_PATH", "/d"), ("EDITOR", "vi")])).unwrap_err();
        assert_eq!(err.to_string(), "PAGER must be set");
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/diary"), home.join("diary"));
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("~other/diary"), PathBuf::from("~other/diary"));
        assert_eq!(expand_home("/abs/diary"), PathBuf::from("/abs/diary"));
    }

    #[test]
    fn file_settings_default_when_absent() {
        let dir = tempfile::TempDir::new().unwrap();
        let settings = FileSettings::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.tasks, TaskSettings::default());
    }

    #[test]
    fn file_settings_round_trip_through_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let settings = FileSettings {
            tasks: TaskSettings {
                backend: TaskBackend::TodoTxt,
                command: Some("todo-txt".to_string()),
                filter: "-p".to_string(),
            },
        };
        settings.save(&path).unwrap();
        assert_eq!(FileSettings::load(&path).unwrap().tasks, settings.tasks);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let settings: FileSettings = toml::from_str("[tasks]\nbackend = \"none\"\n").unwrap();
        assert_eq!(settings.tasks.backend, TaskBackend::None);
        assert_eq!(settings.tasks.command, None);
        assert_eq!(settings.tasks.filter, "");
    }

    #[test]
    fn environment_overrides_backend() {
        let mut tasks = TaskSettings::default();
        tasks
            .apply_overrides(lookup(&[
                ("DIARY_TASK_BACKEND", "Todo-Txt"),
                ("DIARY_TASK_COMMAND", "/opt/todo.sh"),
            ]))
            .unwrap();
        assert_eq!(tasks.backend, TaskBackend::TodoTxt);
        assert_eq!(tasks.command.as_deref(), Some("/opt/todo.sh"));

        assert!(tasks
            .apply_overrides(lookup(&[("DIARY_TASK_BACKEND", "jira")]))
            .is_err());
    }
}
