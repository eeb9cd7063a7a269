//! Saved default flags.
//!
//! Defaults live in a flag file (one or more `--flag [value]` tokens per
//! line, `#` comments). A global file is read first and a `.pagemarkrc` in
//! the working directory overrides it; command-line flags override both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::canvas::PageSize;

const LOCAL_FILE_NAME: &str = ".pagemarkrc";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub perf: bool,
    pub verbose: bool,
    pub landscape: bool,
    pub page_size: Option<PageSize>,
    pub image_prefix: Option<String>,
    pub image_alt_prefix: Option<String>,
    pub styles: Option<PathBuf>,
    pub trace: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches are OR-ed, options from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            perf: self.perf || other.perf,
            verbose: self.verbose || other.verbose,
            landscape: self.landscape || other.landscape,
            page_size: other.page_size.or(self.page_size),
            image_prefix: other
                .image_prefix
                .clone()
                .or_else(|| self.image_prefix.clone()),
            image_alt_prefix: other
                .image_alt_prefix
                .clone()
                .or_else(|| self.image_alt_prefix.clone()),
            styles: other.styles.clone().or_else(|| self.styles.clone()),
            trace: other.trace.clone().or_else(|| self.trace.clone()),
        }
    }

    fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.watch {
            lines.push("--watch".to_string());
        }
        if self.perf {
            lines.push("--perf".to_string());
        }
        if self.verbose {
            lines.push("--verbose".to_string());
        }
        if self.landscape {
            lines.push("--landscape".to_string());
        }
        if let Some(size) = self.page_size {
            lines.push(format!("--page-size {}", size.as_str()));
        }
        if let Some(prefix) = &self.image_prefix {
            lines.push(format!("--image-prefix={prefix}"));
        }
        if let Some(prefix) = &self.image_alt_prefix {
            lines.push(format!("--image-alt-prefix={prefix}"));
        }
        if let Some(path) = &self.styles {
            lines.push(format!("--styles {}", path.display()));
        }
        if let Some(path) = &self.trace {
            lines.push(format!("--trace {}", path.display()));
        }
        lines
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("pagemark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("pagemark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("pagemark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("pagemark")
                .join("config");
        }
    }

    PathBuf::from(LOCAL_FILE_NAME)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE_NAME)
}

/// Read flags from `path`; a missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
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
    let flags = parse_flag_tokens(&tokens);
    tracing::debug!(path = %path.display(), ?flags, "loaded config");
    Ok(flags)
}

/// Write `flags` to `path`, creating parent directories.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# pagemark defaults (saved with --save)".to_string()];
    lines.extend(flags.to_lines());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove the flag file at `path`, if any.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of `tokens`, ignoring everything else.
///
/// Valued flags accept both `--flag value` and `--flag=value`.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--watch" | "-w" => flags.watch = true,
            "--perf" => flags.perf = true,
            "--verbose" | "-v" => flags.verbose = true,
            "--landscape" => flags.landscape = true,
            _ => {
                let (name, inline_value) = match token.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_string())),
                    None => (token, None),
                };
                if !is_valued_flag(name) {
                    i += 1;
                    continue;
                }
                let value = if inline_value.is_some() {
                    inline_value
                } else {
                    let next = tokens.get(i + 1).cloned();
                    if next.is_some() {
                        i += 1;
                    }
                    next
                };
                if let Some(value) = value {
                    apply_valued_flag(&mut flags, name, value);
                }
            }
        }
        i += 1;
    }
    flags
}

fn is_valued_flag(name: &str) -> bool {
    matches!(
        name,
        "--page-size" | "--image-prefix" | "--image-alt-prefix" | "--styles" | "--trace"
    )
}

fn apply_valued_flag(flags: &mut ConfigFlags, name: &str, value: String) {
    match name {
        "--page-size" => flags.page_size = PageSize::parse(&value),
        "--image-prefix" => flags.image_prefix = Some(value),
        "--image-alt-prefix" => flags.image_alt_prefix = Some(value),
        "--styles" => flags.styles = Some(PathBuf::from(value)),
        "--trace" => flags.trace = Some(PathBuf::from(value)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = tokens(&[
            "pagemark",
            "--watch",
            "--landscape",
            "--page-size",
            "letter",
            "--image-prefix=docs/",
            "--trace=render.log",
            "--output",
            "out.json",
            "README.md",
        ]);
        let flags = parse_flag_tokens(&args);
        assert!(flags.watch);
        assert!(flags.landscape);
        assert!(!flags.perf);
        assert_eq!(flags.page_size, Some(PageSize::Letter));
        assert_eq!(flags.image_prefix.as_deref(), Some("docs/"));
        assert_eq!(flags.trace, Some(PathBuf::from("render.log")));
    }

    #[test]
    fn test_unknown_page_size_is_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--page-size=tabloid"]));
        assert_eq!(flags.page_size, None);
    }

    #[test]
    fn test_valued_flag_at_end_without_value() {
        let flags = parse_flag_tokens(&tokens(&["--perf", "--styles"]));
        assert!(flags.perf);
        assert_eq!(flags.styles, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            watch: true,
            page_size: Some(PageSize::Legal),
            image_prefix: Some("file/".to_string()),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            verbose: true,
            page_size: Some(PageSize::A4),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.verbose);
        assert_eq!(merged.page_size, Some(PageSize::A4));
        assert_eq!(merged.image_prefix.as_deref(), Some("file/"));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".pagemarkrc");
        let flags = ConfigFlags {
            watch: true,
            perf: true,
            verbose: true,
            landscape: true,
            page_size: Some(PageSize::Letter),
            image_prefix: Some("docs/".to_string()),
            image_alt_prefix: Some("hires/".to_string()),
            styles: Some(PathBuf::from("styles.json")),
            trace: Some(PathBuf::from("render.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
