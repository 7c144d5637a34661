use crate::config::types::ApplicationConfig;
use crate::error::{CorrectionsError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APPLICATION_NAME: &str = "fpmanagement";

/// Prefix for environment overrides, e.g. `FPMANAGEMENT_NEXTLINUX_URL`
pub const ENV_PREFIX: &str = "FPMANAGEMENT";

/// Configuration loader trait
pub trait ConfigLoader {
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ApplicationConfig>;
    fn load(explicit: Option<&Path>) -> Result<ApplicationConfig>;
}

/// Default loader: YAML file, then environment, then validation
pub struct DefaultConfigLoader;

impl ConfigLoader for DefaultConfigLoader {
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ApplicationConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => CorrectionsError::ConfigNotFound {
                path: path.to_path_buf(),
            },
            _ => CorrectionsError::ConfigRead {
                path: path.to_path_buf(),
                source,
            },
        })?;

        // an empty file is a valid, all-default config
        if content.trim().is_empty() {
            return Ok(ApplicationConfig::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load the explicit path if given (no fallback), otherwise the first discovered file
    fn load(explicit: Option<&Path>) -> Result<ApplicationConfig> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover_config_path(),
        };

        let mut config = match &path {
            Some(path) => {
                debug!(path = %path.display(), "loading application config");
                Self::load_from_file(path)?
            }
            None => {
                debug!("no application config found, using defaults");
                ApplicationConfig::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }
}

/// Search locations in precedence order.
///
/// `config_dirs` lists XDG config directories, user config home first, then
/// the system directories.
pub fn candidate_paths(cwd: &Path, home: Option<&Path>, config_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = vec![
        cwd.join(format!(".{APPLICATION_NAME}.yaml")),
        cwd.join(format!(".{APPLICATION_NAME}")).join("config.yaml"),
    ];
    if let Some(home) = home {
        paths.push(home.join(format!(".{APPLICATION_NAME}.yaml")));
    }
    paths.extend(
        config_dirs
            .iter()
            .map(|dir| dir.join(APPLICATION_NAME).join("config.yaml")),
    );
    paths
}

/// System config directories from `XDG_CONFIG_DIRS`, `/etc/xdg` when unset.
/// Relative entries are ignored.
pub fn system_config_dirs(xdg_config_dirs: Option<&str>) -> Vec<PathBuf> {
    let value = match xdg_config_dirs {
        Some(value) if !value.trim().is_empty() => value,
        _ => "/etc/xdg",
    };

    std::env::split_paths(value)
        .filter(|dir| dir.is_absolute())
        .collect()
}

/// First existing config file among the standard locations
pub fn discover_config_path() -> Option<PathBuf> {
    let home = dirs::home_dir();
    let xdg_config_dirs = std::env::var("XDG_CONFIG_DIRS").ok();

    let mut config_dirs: Vec<PathBuf> = dirs::config_dir().into_iter().collect();
    config_dirs.extend(system_config_dirs(xdg_config_dirs.as_deref()));

    candidate_paths(Path::new("."), home.as_deref(), &config_dirs)
        .into_iter()
        .find(|path| path.is_file())
}

impl ApplicationConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        DefaultConfigLoader::load_from_file(path)
    }

    /// Resolve configuration from file, environment and defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        DefaultConfigLoader::load(explicit)
    }

    /// Apply `FPMANAGEMENT_*` overrides using `lookup` to read variables
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}_NEXTLINUX_{suffix}"));
        let nextlinux = &mut self.nextlinux;

        if let Some(url) = var("URL") {
            nextlinux.url = url;
        }
        if let Some(user) = var("USER") {
            nextlinux.user = user;
        }
        if let Some(password) = var("PASSWORD") {
            nextlinux.password = password;
        }
        if let Some(account) = var("ACCOUNT") {
            nextlinux.account = account;
        }
        if let Some(insecure) = var("HTTP_INSECURE") {
            nextlinux.http.insecure = parse_bool(&insecure).ok_or_else(|| {
                CorrectionsError::invalid_config(format!(
                    "{ENV_PREFIX}_NEXTLINUX_HTTP_INSECURE must be a boolean, got '{insecure}'"
                ))
            })?;
        }
        if let Some(timeout) = var("HTTP_TIMEOUTSECONDS") {
            nextlinux.http.timeout_seconds = timeout.trim().parse().map_err(|_| {
                CorrectionsError::invalid_config(format!(
                    "{ENV_PREFIX}_NEXTLINUX_HTTP_TIMEOUTSECONDS must be a whole number of seconds, got '{timeout}'"
                ))
            })?;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_candidate_paths_order() {
        let config_dirs = vec![PathBuf::from("/home/me/.config"), PathBuf::from("/etc/xdg")];
        let paths = candidate_paths(Path::new("/work"), Some(Path::new("/home/me")), &config_dirs);

        assert_eq!(
            paths,
            vec![
                PathBuf::from("/work/.fpmanagement.yaml"),
                PathBuf::from("/work/.fpmanagement/config.yaml"),
                PathBuf::from("/home/me/.fpmanagement.yaml"),
                PathBuf::from("/home/me/.config/fpmanagement/config.yaml"),
                PathBuf::from("/etc/xdg/fpmanagement/config.yaml"),
            ]
        );
    }

    #[test]
    fn test_candidate_paths_without_home() {
        let paths = candidate_paths(Path::new("."), None, &[]);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_system_config_dirs() {
        assert_eq!(system_config_dirs(None), vec![PathBuf::from("/etc/xdg")]);
        assert_eq!(system_config_dirs(Some("")), vec![PathBuf::from("/etc/xdg")]);
        assert_eq!(
            system_config_dirs(Some("/opt/conf:relative/dir:/etc/xdg")),
            vec![PathBuf::from("/opt/conf"), PathBuf::from("/etc/xdg")]
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "nextlinux:\n  url: https://nextlinux.example.com\n  user: admin\n  password: foobar\n  account: ops\n",
        )
        .unwrap();

        let config = ApplicationConfig::load_from_file(&path).unwrap();
        assert_eq!(config.nextlinux.url, "https://nextlinux.example.com");
        assert_eq!(config.nextlinux.account, "ops");
    }

    #[test]
    fn test_load_from_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(ApplicationConfig::load_from_file(&path).unwrap(), ApplicationConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_does_not_fall_through() {
        let result = ApplicationConfig::load(Some(Path::new("/no/such/fpmanagement.yaml")));
        assert!(matches!(result, Err(CorrectionsError::ConfigNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_read_error() {
        // a directory exists but cannot be read as a file
        let dir = TempDir::new().unwrap();
        let result = ApplicationConfig::load_from_file(dir.path());

        match result {
            Err(CorrectionsError::ConfigRead { path, source }) => {
                assert_eq!(path, dir.path());
                assert_ne!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "nextlinux: [unterminated").unwrap();

        assert!(matches!(
            ApplicationConfig::load_from_file(&path),
            Err(CorrectionsError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ApplicationConfig::default();
        config
            .apply_env_overrides(env(&[
                ("FPMANAGEMENT_NEXTLINUX_URL", "http://override:8228"),
                ("FPMANAGEMENT_NEXTLINUX_USER", "robot"),
                ("FPMANAGEMENT_NEXTLINUX_PASSWORD", "token"),
                ("FPMANAGEMENT_NEXTLINUX_ACCOUNT", "tenant-a"),
                ("FPMANAGEMENT_NEXTLINUX_HTTP_INSECURE", "true"),
                ("FPMANAGEMENT_NEXTLINUX_HTTP_TIMEOUTSECONDS", "60"),
            ]))
            .unwrap();

        assert_eq!(config.nextlinux.url, "http://override:8228");
        assert_eq!(config.nextlinux.user, "robot");
        assert_eq!(config.nextlinux.password, "token");
        assert_eq!(config.nextlinux.account, "tenant-a");
        assert!(config.nextlinux.http.insecure);
        assert_eq!(config.nextlinux.http.timeout_seconds, 60);
    }

    #[test]
    fn test_env_overrides_absent_keep_values() {
        let mut config = ApplicationConfig::default();
        config.nextlinux.url = "from-file".to_string();
        config.apply_env_overrides(env(&[])).unwrap();

        assert_eq!(config.nextlinux.url, "from-file");
        assert_eq!(config.nextlinux.account, "admin");
    }

    #[test]
    fn test_env_overrides_reject_bad_values() {
        let mut config = ApplicationConfig::default();
        let result = config.apply_env_overrides(env(&[("FPMANAGEMENT_NEXTLINUX_HTTP_INSECURE", "maybe")]));
        assert!(matches!(result, Err(CorrectionsError::InvalidConfig { .. })));

        let result = config.apply_env_overrides(env(&[("FPMANAGEMENT_NEXTLINUX_HTTP_TIMEOUTSECONDS", "ten")]));
        assert!(matches!(result, Err(CorrectionsError::InvalidConfig { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }
}
