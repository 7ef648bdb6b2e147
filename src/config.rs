use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::info;

use crate::error::ConfigError;
use crate::http::DEFAULT_SESSION_COOKIE;
use crate::layout::{load_routing_file, RoutingConfig};

pub struct Config {
    pub port: u16,
    pub session_cookie: String,
    pub layout_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "WELLGATE_PORT", "3000")?,
            session_cookie: try_load(&lookup, "WELLGATE_SESSION_COOKIE", DEFAULT_SESSION_COOKIE)?,
            layout_path: lookup("WELLGATE_LAYOUT").map(PathBuf::from),
        })
    }

    /// The gate layout and table paths, from the layout file if one is set.
    pub fn routing(&self) -> Result<RoutingConfig, ConfigError> {
        match &self.layout_path {
            Some(path) => {
                info!("Loading gate layout from {}", path.display());
                Ok(load_routing_file(path)?)
            }
            None => {
                info!("WELLGATE_LAYOUT not set, using standard layout");
                Ok(RoutingConfig::default())
            }
        }
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.session_cookie, "next-auth.session-token");
        assert_eq!(config.layout_path, None);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("WELLGATE_PORT", "8080"),
            ("WELLGATE_SESSION_COOKIE", "sid"),
            ("WELLGATE_LAYOUT", "/etc/wellgate/layout.yaml"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_cookie, "sid");
        assert_eq!(config.layout_path, Some(PathBuf::from("/etc/wellgate/layout.yaml")));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[("WELLGATE_PORT", "eighty")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::InvalidValue { key: "WELLGATE_PORT", .. }));
    }

    #[test]
    fn test_routing_without_layout_file() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.routing().unwrap(), RoutingConfig::default());
    }

    #[test]
    fn test_routing_missing_layout_file() {
        let config = Config::from_lookup(lookup_from(&[(
            "WELLGATE_LAYOUT",
            "/nonexistent/wellgate-layout.yaml",
        )]))
        .unwrap();
        assert!(matches!(
            config.routing(),
            Err(ConfigError::Layout(crate::error::LayoutError::Io(_)))
        ));
    }
}
