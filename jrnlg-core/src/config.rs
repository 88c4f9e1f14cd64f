use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::BaseDirs;
use serde::Deserialize;
use std::{env, fs, path::PathBuf, thread};

pub const STORAGE_PATH_ENV: &str = "JRNLG_STORAGE_PATH";
pub const LOG_LEVEL_ENV: &str = "JRNLG_LOG_LEVEL";

#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute directory holding the `YYYY/MM/` entry tree.
    pub journal_dir: PathBuf,
    /// Zone new entries are stamped in. Must be an IANA name such as `Europe/Madrid`.
    pub timezone: Tz,
    /// Parse files on several threads when listing and indexing.
    pub parallel_parse: bool,
    pub max_parse_workers: usize,
    /// One of DEBUG, INFO, WARN (or WARNING), ERROR. Case-insensitive.
    pub log_level: String,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    journal_dir: Option<PathBuf>,
    timezone: Option<String>,
    parallel_parse: Option<bool>,
    max_parse_workers: Option<usize>,
    log_level: Option<String>,
}

impl Config {
    /// Public entrypoint: load config from disk (first XDG path, then native), apply defaults,
    /// then let `JRNLG_STORAGE_PATH` and `JRNLG_LOG_LEVEL` override what the file says.
    pub fn load() -> Result<Self> {
        let file_config = Self::read_file_config()?;
        Self::from_file_config(file_config, |key| env::var(key).ok())
    }

    fn from_file_config(
        file_config: FileConfig,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let timezone = match file_config.timezone.as_deref() {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| anyhow!("unknown timezone '{name}': expected an IANA name"))?,
            None => Tz::UTC,
        };

        let journal_dir = env_lookup(STORAGE_PATH_ENV)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or(file_config.journal_dir)
            .unwrap_or_else(Self::default_journal_dir);

        let log_level = env_lookup(LOG_LEVEL_ENV)
            .filter(|s| !s.is_empty())
            .or(file_config.log_level)
            .unwrap_or_else(|| "info".to_string());

        Ok(Self {
            journal_dir,
            timezone,
            parallel_parse: file_config.parallel_parse.unwrap_or(true),
            max_parse_workers: file_config
                .max_parse_workers
                .unwrap_or_else(Self::default_parse_workers),
            log_level,
        })
    }

    /// Worker count for file parsing: 1 when parallel parsing is off.
    pub fn parse_workers(&self) -> usize {
        if self.parallel_parse {
            self.max_parse_workers.max(1)
        } else {
            1
        }
    }

    fn default_parse_workers() -> usize {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Default journal root: `{data_dir}/jrnlg`
    /// - macOS:   `~/Library/Application Support/jrnlg`
    /// - Linux:   `$XDG_DATA_HOME/jrnlg` or `~/.local/share/jrnlg`
    /// - Windows: `%APPDATA%\jrnlg`
    fn default_journal_dir() -> PathBuf {
        if let Some(base) = BaseDirs::new() {
            let mut p = base.data_dir().to_path_buf();
            p.push("jrnlg");
            p
        } else {
            PathBuf::from("./jrnlg")
        }
    }

    fn config_file_paths() -> Vec<PathBuf> {
        let mut v = Vec::new();
        if let Some(b) = BaseDirs::new() {
            let xdg = b.home_dir().join(".config").join("jrnlg").join("config.toml");
            v.push(xdg);
            let native = b.config_dir().join("jrnlg").join("config.toml");
            v.push(native);
        }
        v
    }

    /// Read the first existing config file and parse it.
    fn read_file_config() -> Result<FileConfig> {
        for path in Self::config_file_paths() {
            if !path.exists() {
                continue;
            }
            let s =
                fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            return Self::parse_file(&s).with_context(|| format!("parsing {}", path.display()));
        }
        Ok(FileConfig::default())
    }

    /// Parse a TOML string into `FileConfig`.
    fn parse_file(s: &str) -> Result<FileConfig> {
        Ok(toml::from_str::<FileConfig>(s)?)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    /// Test helper to create a default `Config` for testing purposes.
    ///
    /// This is the single source of truth for test configuration.
    /// If you add a field to `Config`, you only need to update it here.
    pub(crate) fn mk_config(journal_dir: PathBuf) -> Config {
        Config {
            journal_dir,
            timezone: chrono_tz::America::Los_Angeles,
            parallel_parse: true,
            max_parse_workers: 4,
            log_level: "info".to_string(),
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn candidates_prioritize_xdg_then_native() {
        if let Some(b) = BaseDirs::new() {
            let expected_xdg = b.home_dir().join(".config").join("jrnlg").join("config.toml");
            let expected_native = b.config_dir().join("jrnlg").join("config.toml");
            let c = super::Config::config_file_paths();
            assert_eq!(c.get(0), Some(&expected_xdg));
            assert_eq!(c.get(1), Some(&expected_native));
        }
    }

    #[test]
    fn parse_file_accepts_every_field() {
        let toml = r#"
            journal_dir = "/tmp/my-journal"
            timezone = "Europe/Madrid"
            parallel_parse = false
            max_parse_workers = 3
            log_level = "debug"
        "#;
        let fc = super::Config::parse_file(toml).unwrap();
        assert_eq!(
            fc.journal_dir.as_deref(),
            Some(Path::new("/tmp/my-journal"))
        );
        let config = Config::from_file_config(fc, no_env).unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Madrid);
        assert!(!config.parallel_parse);
        assert_eq!(config.parse_workers(), 1);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let config = Config::from_file_config(FileConfig::default(), no_env).unwrap();
        assert_eq!(config.timezone, Tz::UTC);
        assert!(config.parallel_parse);
        assert!(config.parse_workers() >= 1);
        assert_eq!(config.log_level, "info");
        assert!(config.journal_dir.ends_with("jrnlg"));
    }

    #[test]
    fn environment_overrides_file() {
        let fc = super::Config::parse_file(
            r#"
            journal_dir = "/from/file"
            log_level = "error"
        "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> =
            HashMap::from([(STORAGE_PATH_ENV, "/from/env"), (LOG_LEVEL_ENV, "WARNING")]);
        let config =
            Config::from_file_config(fc, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.journal_dir, PathBuf::from("/from/env"));
        assert_eq!(config.log_level, "WARNING");
    }

    #[test]
    fn abbreviations_are_not_timezones() {
        let fc = FileConfig {
            timezone: Some("PST".to_string()),
            ..Default::default()
        };
        let err = Config::from_file_config(fc, no_env).unwrap_err();
        assert!(err.to_string().contains("unknown timezone 'PST'"));
    }

    #[test]
    fn zero_workers_still_means_one() {
        let mut config = mk_config(PathBuf::from("/tmp/j"));
        config.max_parse_workers = 0;
        assert_eq!(config.parse_workers(), 1);
    }
}
