// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use crate::catalog::{OptionKind, OptionRegistry};
use crate::environment::{MapEnvironment, Value};
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Prefix of the process environment variables read by
/// [`ConfigLoader::env_overrides`].
pub const ENV_PREFIX: &str = "TLSGATE_";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` or `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Reads configuration files into a flat [`MapEnvironment`].
///
/// Nested tables become dotted keys, so `[ssl] mode = "sslOnly"` and
/// `"ssl.mode": "sslOnly"` produce the same entry. Only strings and
/// booleans are accepted as leaf values.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    registry: Option<OptionRegistry>,
}

impl ConfigLoader {
    /// Create a loader that accepts any key
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that checks declared keys against their kind
    pub fn with_registry(registry: OptionRegistry) -> Self {
        ConfigLoader {
            registry: Some(registry),
        }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<MapEnvironment> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;
        let env = self.load_from_string(&content, format)?;

        info!(
            keys = env.len(),
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );
        Ok(env)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<MapEnvironment> {
        let document: serde_json::Value = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        let mut env = MapEnvironment::new();
        match document {
            serde_json::Value::Object(_) => flatten("", document, &mut env)?,
            // An empty YAML document
            serde_json::Value::Null => {}
            _ => {
                return Err(ConfigError::UnsupportedValue {
                    key: "<root>".to_string(),
                })
            }
        }

        self.check_kinds(&env)?;
        debug!(keys = env.len(), "Configuration flattened from {}", format.name());
        Ok(env)
    }

    /// Collect `TLSGATE_*` overrides for every declared key.
    ///
    /// The variable name is the key upper-cased with dots replaced by
    /// underscores, e.g. `ssl.CAFile` is read from `TLSGATE_SSL_CAFILE`.
    /// Without a registry there is nothing to look up.
    pub fn env_overrides<I, K, V>(&self, vars: I) -> ConfigResult<MapEnvironment>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut env = MapEnvironment::new();
        let Some(registry) = &self.registry else {
            return Ok(env);
        };

        for (name, value) in vars {
            let Some(spec) = registry.iter().find(|spec| env_var_name(spec.key) == name.as_ref())
            else {
                continue;
            };
            let value: String = value.into();
            match spec.kind {
                OptionKind::Switch => env.set(spec.key, parse_bool(name.as_ref(), &value)?),
                OptionKind::String | OptionKind::StringWithImplicit(_) => env.set(spec.key, value),
            };
            debug!(key = spec.key, var = name.as_ref(), "Environment override");
        }
        Ok(env)
    }

    /// [`ConfigLoader::env_overrides`] over the process environment
    pub fn process_env_overrides(&self) -> ConfigResult<MapEnvironment> {
        self.env_overrides(std::env::vars())
    }

    fn check_kinds(&self, env: &MapEnvironment) -> ConfigResult<()> {
        let Some(registry) = &self.registry else {
            return Ok(());
        };
        for spec in registry.iter() {
            let Some(value) = env.value(spec.key) else {
                continue;
            };
            match (spec.kind, value) {
                (OptionKind::Switch, Value::Bool(_)) => {}
                (OptionKind::Switch, Value::String(_)) => {
                    return Err(ConfigError::type_mismatch(spec.key, "a switch"))
                }
                (_, Value::String(_)) => {}
                (_, Value::Bool(_)) => {
                    return Err(ConfigError::type_mismatch(spec.key, "a string"))
                }
            }
        }
        Ok(())
    }
}

fn flatten(prefix: &str, value: serde_json::Value, out: &mut MapEnvironment) -> ConfigResult<()> {
    match value {
        serde_json::Value::Object(map) => {
            for (name, child) in map {
                let key = if prefix.is_empty() {
                    name
                } else {
                    format!("{}.{}", prefix, name)
                };
                flatten(&key, child, out)?;
            }
        }
        serde_json::Value::Bool(flag) => {
            out.set(prefix, flag);
        }
        serde_json::Value::String(text) => {
            out.set(prefix, text);
        }
        _ => {
            return Err(ConfigError::UnsupportedValue {
                key: prefix.to_string(),
            })
        }
    }
    Ok(())
}

fn env_var_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.replace('.', "_").to_uppercase())
}

/// Parse boolean from string (accepts: true, false, yes, no, 1, 0, on, off)
fn parse_bool(var: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(
            var,
            "expected 'true', 'false', 'yes', 'no', '1', '0', 'on', or 'off'",
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::keys;
    use crate::environment::{string, switch, Environment};

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("tlsgate.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("tlsgate.yaml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("tlsgate.yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("tlsgate.json").unwrap(), ConfigFormat::Json);
    }

    #[test]
    fn test_format_detection_error() {
        assert!(matches!(
            ConfigFormat::from_path("tlsgate.ini"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ConfigFormat::from_path("tlsgate"),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_parse_bool() {
        for text in ["true", "YES", "1", "on"] {
            assert!(parse_bool("V", text).unwrap());
        }
        for text in ["false", "No", "0", "off"] {
            assert!(!parse_bool("V", text).unwrap());
        }
        assert!(parse_bool("V", "maybe").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
        [ssl]
        mode = "sslOnly"
        PEMKeyFile = "/etc/ssl/server.pem"
        FIPSMode = true
        "#;
        let env = ConfigLoader::new()
            .load_from_string(toml, ConfigFormat::Toml)
            .unwrap();

        assert_eq!(env.len(), 3);
        assert_eq!(string(&env, keys::MODE).unwrap().as_deref(), Some("sslOnly"));
        assert!(switch(&env, keys::FIPS_MODE).unwrap());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "ssl:\n  mode: acceptSSL\n  CAFile: ca.pem\nsecurity:\n  clusterAuthMode: x509\n";
        let env = ConfigLoader::new()
            .load_from_string(yaml, ConfigFormat::Yaml)
            .unwrap();

        assert_eq!(env.get(keys::CA_FILE).unwrap(), Value::from("ca.pem"));
        assert_eq!(env.get("security.clusterAuthMode").unwrap(), Value::from("x509"));
    }

    #[test]
    fn test_parse_json_dotted_and_nested() {
        let json = r#"{ "ssl.mode": "sendAcceptSSL", "ssl": { "CRLFile": "crl.pem" } }"#;
        let env = ConfigLoader::new()
            .load_from_string(json, ConfigFormat::Json)
            .unwrap();

        assert_eq!(env.get(keys::MODE).unwrap(), Value::from("sendAcceptSSL"));
        assert_eq!(env.get(keys::CRL_FILE).unwrap(), Value::from("crl.pem"));
    }

    #[test]
    fn test_unsupported_leaf_values() {
        let loader = ConfigLoader::new();
        for json in [
            r#"{ "ssl": { "mode": 3 } }"#,
            r#"{ "ssl": { "CAFile": ["a", "b"] } }"#,
            r#"{ "ssl": { "CAFile": null } }"#,
        ] {
            assert!(matches!(
                loader.load_from_string(json, ConfigFormat::Json),
                Err(ConfigError::UnsupportedValue { ref key }) if key.starts_with("ssl.")
            ));
        }
        assert!(matches!(
            loader.load_from_string("[1, 2]", ConfigFormat::Json),
            Err(ConfigError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn test_parse_errors_surface() {
        let loader = ConfigLoader::new();
        assert!(matches!(
            loader.load_from_string("[ssl", ConfigFormat::Toml),
            Err(ConfigError::TomlParseError(_))
        ));
        assert!(matches!(
            loader.load_from_string("{", ConfigFormat::Json),
            Err(ConfigError::JsonParseError(_))
        ));
        assert!(matches!(
            loader.load_from_string("ssl: [", ConfigFormat::Yaml),
            Err(ConfigError::YamlParseError(_))
        ));
    }

    #[test]
    fn test_registry_checks_kinds() {
        let loader = ConfigLoader::with_registry(OptionRegistry::server().unwrap());

        let bad_switch = "[ssl]\nFIPSMode = \"yes\"\n";
        assert!(matches!(
            loader.load_from_string(bad_switch, ConfigFormat::Toml),
            Err(ConfigError::TypeMismatch { .. })
        ));

        let bad_string = "[ssl]\nCAFile = true\n";
        assert!(matches!(
            loader.load_from_string(bad_string, ConfigFormat::Toml),
            Err(ConfigError::TypeMismatch { .. })
        ));

        let unknown_key = "[ssl]\nsomethingElse = 1.5\n";
        assert!(loader.load_from_string(unknown_key, ConfigFormat::Toml).is_err());

        let other_section = "[security]\nclusterAuthMode = \"x509\"\n";
        assert!(loader.load_from_string(other_section, ConfigFormat::Toml).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let loader = ConfigLoader::with_registry(OptionRegistry::server().unwrap());
        let env = loader
            .env_overrides([
                ("TLSGATE_SSL_MODE", "sslOnly"),
                ("TLSGATE_SSL_FIPSMODE", "yes"),
                ("TLSGATE_SSL_WEAKCERTIFICATEVALIDATION", "off"),
                ("TLSGATE_UNRELATED", "x"),
                ("HOME", "/root"),
            ])
            .unwrap();

        assert_eq!(env.len(), 3);
        assert_eq!(env.get(keys::MODE).unwrap(), Value::from("sslOnly"));
        assert!(switch(&env, keys::FIPS_MODE).unwrap());
        assert!(!switch(&env, keys::WEAK_CERT_VALIDATION).unwrap());
    }

    #[test]
    fn test_env_override_bad_switch() {
        let loader = ConfigLoader::with_registry(OptionRegistry::client().unwrap());
        assert!(loader.env_overrides([("TLSGATE_SSL", "perhaps")]).is_err());
    }

    #[test]
    fn test_env_overrides_need_registry() {
        let env = ConfigLoader::new()
            .env_overrides([("TLSGATE_SSL_MODE", "sslOnly")])
            .unwrap();
        assert!(env.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = ConfigLoader::new()
            .load_file("/definitely/not/here/tlsgate.toml")
            .await;
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
