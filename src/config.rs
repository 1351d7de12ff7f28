use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Endpoint configuration, read from the environment.
///
/// `load_dotenv` should run first so `.env.local` / `.env` values are visible.
#[derive(Clone, Debug)]
pub struct Config {
    pub backend_host: String,
    pub backend_port: u16,
    pub base_path: String,
    /// Full results URL; takes precedence over host/port/base path.
    pub results_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_host: "127.0.0.1".to_string(),
            backend_port: 5000,
            base_path: String::new(),
            results_url: None,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Each setting also answers to its `VITE_`
    /// name, which is what the web frontend's `.env` files use.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let get = |key: &str| lookup(key).or_else(|| lookup(&format!("VITE_{}", key)));
        Self {
            backend_host: get("BACKEND_HOST").unwrap_or(d.backend_host),
            backend_port: get("BACKEND_PORT").and_then(|v| v.trim().parse().ok()).unwrap_or(d.backend_port),
            base_path: get("FRONTEND_BASE_PATH").unwrap_or(d.base_path),
            results_url: lookup("BENCHBOARD_URL").filter(|v| !v.trim().is_empty()),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(d.request_timeout_secs),
        }
    }

    /// `None` when `request_timeout_secs` is 0: wait as long as the backend takes.
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// `http://{host}:{port}{base_path}/api/get` unless overridden.
    pub fn results_url(&self) -> Result<Url> {
        if let Some(raw) = &self.results_url {
            return Url::parse(raw).with_context(|| format!("invalid results url {}", raw));
        }
        let base = self.base_path.trim_end_matches('/');
        let raw = format!(
            "http://{}:{}{}/api/get",
            self.backend_host, self.backend_port, base
        );
        Url::parse(&raw).with_context(|| format!("invalid results url {}", raw))
    }
}

/// Load `.env.local` from `dir` if it exists, else `.env`. Missing files are fine.
pub fn load_dotenv(dir: &Path) -> Option<std::path::PathBuf> {
    let local = dir.join(".env.local");
    let path = if local.exists() { local } else { dir.join(".env") };
    dotenvy::from_path(&path).ok().map(|_| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_url() {
        let cfg = Config::default();
        assert_eq!(
            cfg.results_url().unwrap().as_str(),
            "http://127.0.0.1:5000/api/get"
        );
    }

    #[test]
    fn test_base_path_is_prefixed() {
        let cfg = Config {
            backend_host: "bench.local".to_string(),
            backend_port: 8080,
            base_path: "/clp-bench/".to_string(),
            ..Config::default()
        };
        assert_eq!(
            cfg.results_url().unwrap().as_str(),
            "http://bench.local:8080/clp-bench/api/get"
        );
    }

    #[test]
    fn test_explicit_url_wins() {
        let cfg = Config {
            results_url: Some("https://example.org/x/api/get".to_string()),
            ..Config::default()
        };
        assert_eq!(cfg.results_url().unwrap().host_str(), Some("example.org"));

        let bad = Config {
            results_url: Some("not a url".to_string()),
            ..Config::default()
        };
        assert!(bad.results_url().is_err());
    }

    #[test]
    fn test_dotenv_prefers_local() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(".env"), "BENCHBOARD_DOTENV_PROBE=plain\n").unwrap();
        std::fs::write(dir.path().join(".env.local"), "BENCHBOARD_DOTENV_PROBE=local\n").unwrap();
        let loaded = load_dotenv(dir.path()).unwrap();
        assert!(loaded.ends_with(".env.local"));
        assert_eq!(std::env::var("BENCHBOARD_DOTENV_PROBE").unwrap(), "local");
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_every_setting() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("BACKEND_HOST", "10.0.0.7"),
            ("BACKEND_PORT", "8081"),
            ("FRONTEND_BASE_PATH", "/bench"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]));
        assert_eq!(cfg.backend_host, "10.0.0.7");
        assert_eq!(cfg.backend_port, 8081);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(
            cfg.results_url().unwrap().as_str(),
            "http://10.0.0.7:8081/bench/api/get"
        );
    }

    #[test]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("BACKEND_PORT", "five thousand"),
            ("REQUEST_TIMEOUT_SECS", "-3"),
        ]));
        assert_eq!(cfg.backend_port, 5000);
        assert_eq!(cfg.request_timeout_secs, 30);

        let overflow = Config::from_lookup(lookup_from(&[("BACKEND_PORT", "70000")]));
        assert_eq!(overflow.backend_port, 5000);
    }

    #[test]
    fn test_frontend_env_names_are_fallbacks() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("VITE_BACKEND_HOST", "vite.local"),
            ("VITE_BACKEND_PORT", "9000"),
            ("BACKEND_PORT", "9001"),
        ]));
        assert_eq!(cfg.backend_host, "vite.local");
        // the plain name wins when both are set
        assert_eq!(cfg.backend_port, 9001);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let cfg = Config::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "0")]));
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(Config::default().request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_project_env_local_reaches_url() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(".env.local"),
            "VITE_BACKEND_HOST=bench.example\nVITE_BACKEND_PORT=8080\nVITE_FRONTEND_BASE_PATH=/clp-bench\n",
        )
        .unwrap();
        assert!(load_dotenv(dir.path()).is_some());
        // only the VITE_ keys, so unrelated variables in the test env cannot interfere
        let cfg = Config::from_lookup(|key| {
            key.starts_with("VITE_")
                .then(|| std::env::var(key).ok())
                .flatten()
        });
        assert_eq!(
            cfg.results_url().unwrap().as_str(),
            "http://bench.example:8080/clp-bench/api/get"
        );
    }

    #[test]
    fn test_dotenv_missing_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load_dotenv(dir.path()).is_none());
    }
}
