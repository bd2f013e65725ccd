use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backend::{Backend, ProgramBackend};
use crate::theme::{ThemeTokens, load_theme};

const CONFIG_DIR: &str = ".devdeck";
const CONFIG_NAMES: [&str; 4] = ["config.toml", "config.yaml", "config.yml", "config.json"];

pub const DEFAULT_COPY_FLASH_MS: u64 = 2000;
pub const DEFAULT_TICK_MS: u64 = 100;
pub const DEFAULT_SUGGESTIONS_VISIBLE: usize = 5;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Program whose subcommands are fronted. Defaults to the running executable.
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub theme_overrides: Option<HashMap<String, String>>,
    #[serde(default)]
    pub copy_flash_ms: Option<u64>,
    #[serde(default)]
    pub tick_ms: Option<u64>,
    #[serde(default)]
    pub suggestions_visible: Option<usize>,
}

/// Parse a config file, picking the format from its extension (TOML when unknown).
pub fn load_app_config_file(path: &Path) -> Result<AppConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let cfg = match ext.as_deref() {
        Some("yml" | "yaml") => serde_yaml::from_str::<AppConfig>(&s)
            .with_context(|| format!("parse {}", path.display()))?,
        Some("json") => serde_json::from_str::<AppConfig>(&s)
            .with_context(|| format!("parse {}", path.display()))?,
        _ => toml::from_str::<AppConfig>(&s)
            .with_context(|| format!("parse {}", path.display()))?,
    };
    Ok(cfg)
}

/// First existing config file in lookup order: explicit path, `DEVDECK_CONFIG`,
/// `./.devdeck/`, `~/.devdeck/`.
#[must_use]
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    if let Some(p) = std::env::var_os("DEVDECK_CONFIG") {
        return Some(PathBuf::from(p));
    }
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(CONFIG_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        dirs.push(home.join(CONFIG_DIR));
    }
    dirs.iter()
        .flat_map(|d| CONFIG_NAMES.iter().map(move |n| d.join(n)))
        .find(|p| p.is_file())
}

pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let Some(path) = find_config_file(explicit) else {
        return Ok(AppConfig::default());
    };
    info!(path = %path.display(), "loading config");
    let cfg = load_app_config_file(&path)?;
    let (errors, warnings) = validate_app_config(&cfg);
    for w in &warnings {
        warn!(path = %path.display(), "{w}");
    }
    if !errors.is_empty() {
        bail!("invalid config {}: {}", path.display(), errors.join("; "));
    }
    Ok(cfg)
}

/// Returns `(errors, warnings)`.
#[must_use]
pub fn validate_app_config(cfg: &AppConfig) -> (Vec<String>, Vec<String>) {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(theme) = &cfg.theme {
        let t = theme.to_ascii_lowercase();
        if t != "dark" && t != "light" {
            warnings.push(format!("theme '{theme}' is not one of [dark, light]; using dark"));
        }
    }
    if let Some(map) = &cfg.theme_overrides {
        let mut probe = ThemeTokens::default();
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        for k in keys {
            if !probe.apply_token(k, &map[k]) {
                warnings.push(format!("theme_overrides.{k} = '{}' ignored", map[k]));
            }
        }
    }
    if let Some(p) = &cfg.program {
        if p.trim().is_empty() {
            errors.push("program is empty".to_string());
        }
    }
    if cfg.tick_ms == Some(0) {
        errors.push("tick_ms must be greater than 0".to_string());
    }
    if cfg.suggestions_visible == Some(0) {
        errors.push("suggestions_visible must be greater than 0".to_string());
    }
    if let Some(ms) = cfg.copy_flash_ms {
        if ms > 60_000 {
            warnings.push(format!("copy_flash_ms={ms} is unusually long"));
        }
    }
    (errors, warnings)
}

/// Startup configuration, built once and handed to the root controller.
#[derive(Debug, Clone)]
pub struct Settings {
    pub theme: ThemeTokens,
    pub program: PathBuf,
    pub color: bool,
    pub copy_flash: Duration,
    pub tick: Duration,
    pub suggestions_visible: usize,
}

impl Settings {
    /// Fold a validated config together with CLI overrides.
    pub fn from_config(cfg: &AppConfig, program_override: Option<PathBuf>, color: bool) -> Result<Self> {
        let program = match program_override.or_else(|| cfg.program.as_ref().map(PathBuf::from)) {
            Some(p) => p,
            None => {
                let exe = std::env::current_exe().context("locate current executable")?;
                warn!(
                    program = %exe.display(),
                    "no program configured; launcher entries will run devdeck itself, set --program or `program`"
                );
                exe
            }
        };
        let theme = if color {
            load_theme(cfg.theme.as_deref(), cfg.theme_overrides.as_ref())
        } else {
            ThemeTokens::monochrome()
        };
        Ok(Self {
            theme,
            program,
            color,
            copy_flash: Duration::from_millis(cfg.copy_flash_ms.unwrap_or(DEFAULT_COPY_FLASH_MS)),
            tick: Duration::from_millis(cfg.tick_ms.unwrap_or(DEFAULT_TICK_MS)),
            suggestions_visible: cfg
                .suggestions_visible
                .unwrap_or(DEFAULT_SUGGESTIONS_VISIBLE),
        })
    }

    #[must_use]
    pub fn context(&self) -> Arc<AppContext> {
        Arc::new(AppContext {
            backend: Arc::new(ProgramBackend::new(self.program.clone(), self.color)),
            copy_flash: self.copy_flash,
            suggestions_visible: self.suggestions_visible,
        })
    }
}

/// Shared, read-only services handed to every view that spawns work.
pub struct AppContext {
    pub backend: Arc<dyn Backend>,
    pub copy_flash: Duration,
    pub suggestions_visible: usize,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("copy_flash", &self.copy_flash)
            .field("suggestions_visible", &self.suggestions_visible)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            copy_flash: Duration::from_millis(DEFAULT_COPY_FLASH_MS),
            suggestions_visible: DEFAULT_SUGGESTIONS_VISIBLE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_each_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let t = dir.path().join("config.toml");
        fs::write(&t, "theme = 'light'\ncopy_flash_ms = 500\n").unwrap();
        let y = dir.path().join("config.yaml");
        fs::write(&y, "theme: light\ncopy_flash_ms: 500\n").unwrap();
        let j = dir.path().join("config.json");
        fs::write(&j, r#"{"theme":"light","copy_flash_ms":500}"#).unwrap();
        for p in [t, y, j] {
            let cfg = load_app_config_file(&p).unwrap();
            assert_eq!(cfg.theme.as_deref(), Some("light"));
            assert_eq!(cfg.copy_flash_ms, Some(500));
        }
    }

    #[test]
    fn validation_splits_errors_and_warnings() {
        let mut overrides = HashMap::new();
        overrides.insert("border".to_string(), "chartreuse-ish".to_string());
        let cfg = AppConfig {
            theme: Some("neon".into()),
            theme_overrides: Some(overrides),
            tick_ms: Some(0),
            ..AppConfig::default()
        };
        let (errors, warnings) = validate_app_config(&cfg);
        assert_eq!(errors.len(), 1);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn settings_prefer_cli_program_over_config() {
        let cfg = AppConfig {
            program: Some("/from/config".into()),
            ..AppConfig::default()
        };
        let s = Settings::from_config(&cfg, Some(PathBuf::from("/from/cli")), true).unwrap();
        assert_eq!(s.program, PathBuf::from("/from/cli"));
        let s = Settings::from_config(&cfg, None, false).unwrap();
        assert_eq!(s.program, PathBuf::from("/from/config"));
        assert_eq!(s.theme, ThemeTokens::monochrome());
        assert_eq!(s.copy_flash, Duration::from_millis(DEFAULT_COPY_FLASH_MS));
    }

    #[test]
    fn settings_fall_back_to_the_current_executable() {
        let s = Settings::from_config(&AppConfig::default(), None, true).unwrap();
        assert_eq!(s.program, std::env::current_exe().unwrap());
    }
}
