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
//! Transport-security configuration for tlsgate
//!
//! This crate declares the transport-security options a server or client
//! accepts, reads their supplied values from an [`Environment`], and
//! validates them into a single consistent [`SecurityConfig`].
//!
//! # Features
//!
//! - Option catalog that can be registered with any [`OptionSink`], including `clap`
//! - Ordered rule checks that report the first violation as a [`ConfigError`]
//! - Lock-free [`SecurityMode`] cell for connection handlers
//! - TOML, YAML and JSON configuration files flattened into dotted keys
//! - `TLSGATE_` environment variable overrides
//!
//! # Example
//!
//! ```no_run
//! use tlsgate_config::{
//!     apply_server_config, ClusterAuthInfo, ConfigLoader, OptionRegistry, SecurityConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::with_registry(OptionRegistry::server()?);
//!     let env = loader.load_file("tlsgate.toml").await?;
//!
//!     let mut config = SecurityConfig::new();
//!     apply_server_config(&env, &mut config, &ClusterAuthInfo::default())?;
//!     println!("Transport security mode: {}", config.mode());
//!
//!     Ok(())
//! }
//! ```

pub mod advisory;
pub mod catalog;
pub mod environment;
pub mod error;
pub mod loader;
pub mod paths;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use advisory::{AdvisorySink, RecordingAdvisory, TracingAdvisory};
pub use catalog::{
    keys, register_client_options, register_server_options, OptionKind, OptionRegistry,
    OptionSink, OptionSpec,
};
pub use environment::{Environment, MapEnvironment, Overlay, Value};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};
pub use paths::{BaseDirResolver, CurrentDirResolver, PathResolver};
pub use schema::*;
pub use validation::{apply_client_config, apply_server_config, ServerValidator, Validator};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creation() {
        let config = SecurityConfig::default();
        assert_eq!(config.mode(), SecurityMode::Disabled);
        assert!(!config.is_enabled());
        assert!(config.identity_file.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = SecurityConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"mode\": \"noSSL\""));
        assert!(json.contains("trustAnchorFile"));
    }

    #[test]
    fn test_config_validation() {
        let config = SecurityConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loaded_file_drives_validation() {
        let toml = "[ssl]\nmode = \"acceptSSL\"\nPEMKeyFile = \"/etc/ssl/server.pem\"\nCAFile = \"/etc/ssl/ca.pem\"\n";
        let env = ConfigLoader::with_registry(OptionRegistry::server().unwrap())
            .load_from_string(toml, ConfigFormat::Toml)
            .unwrap();

        let mut config = SecurityConfig::new();
        apply_server_config(&env, &mut config, &ClusterAuthInfo::default()).unwrap();
        assert_eq!(config.mode(), SecurityMode::AcceptOnly);
        assert_eq!(config.trust_anchor_file, "/etc/ssl/ca.pem");
    }
}
