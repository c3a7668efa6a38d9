use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Flags that can be set from the command line or a config file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub plugins: Vec<String>,
    pub draft_store: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub preview_base: Option<String>,
    pub open_preview: bool,
    pub perf: bool,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Layer `other` over `self`: booleans OR together, options take
    /// `other`'s value when set, plugin lists concatenate without repeats.
    pub fn union(&self, other: &Self) -> Self {
        let mut plugins = self.plugins.clone();
        for plugin in &other.plugins {
            if !plugins.contains(plugin) {
                plugins.push(plugin.clone());
            }
        }
        Self {
            plugins,
            draft_store: other.draft_store.clone().or_else(|| self.draft_store.clone()),
            export_dir: other.export_dir.clone().or_else(|| self.export_dir.clone()),
            preview_base: other
                .preview_base
                .clone()
                .or_else(|| self.preview_base.clone()),
            open_preview: self.open_preview || other.open_preview,
            perf: self.perf || other.perf,
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("markbar").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("markbar")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("markbar").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("markbar")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".markbarrc")
}

/// Where drafts go when no `--draft-store` is configured.
pub fn default_draft_store_path() -> PathBuf {
    global_config_path().with_file_name("drafts.json")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# markbar defaults (saved with --save)".to_string());
    for plugin in &flags.plugins {
        lines.push(format!("--plugin {plugin}"));
    }
    if let Some(store) = &flags.draft_store {
        lines.push(format!("--draft-store {}", store.display()));
    }
    if let Some(dir) = &flags.export_dir {
        lines.push(format!("--export-dir {}", dir.display()));
    }
    if let Some(base) = &flags.preview_base {
        lines.push(format!("--preview-base {base}"));
    }
    if flags.open_preview {
        lines.push("--open".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list; everything else is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let takes_value = matches!(
            name,
            "--plugin" | "--draft-store" | "--export-dir" | "--preview-base" | "--debug-log"
        );
        let value = if takes_value && inline.is_none() {
            i += 1;
            tokens.get(i).map(String::as_str)
        } else {
            inline
        };
        match (name, value) {
            ("--open", _) => flags.open_preview = true,
            ("--perf", _) => flags.perf = true,
            ("--plugin", Some(v)) => {
                if !flags.plugins.iter().any(|p| p == v) {
                    flags.plugins.push(v.to_string());
                }
            }
            ("--draft-store", Some(v)) => flags.draft_store = Some(PathBuf::from(v)),
            ("--export-dir", Some(v)) => flags.export_dir = Some(PathBuf::from(v)),
            ("--preview-base", Some(v)) => flags.preview_base = Some(v.to_string()),
            ("--debug-log", Some(v)) => flags.debug_log = Some(PathBuf::from(v)),
            _ => {}
        }
        i += 1;
    }
    flags
}
