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
use anyhow::{Context, Result};
use clap::{ArgMatches, Parser};
use std::path::{Path, PathBuf};
use tlsgate_config::environment::string;
use tlsgate_config::{
    apply_client_config, apply_server_config, ClusterAuthInfo, ConfigLoader, MapEnvironment,
    OptionRegistry, Overlay, SecurityConfig,
};
use tracing::debug;

/// File key holding the cluster authentication mode.
pub const CLUSTER_AUTH_FILE_KEY: &str = "security.clusterAuthMode";

/// Validate the transport-security settings of a server
#[derive(Parser, Debug)]
pub struct ServerCmd {
    /// Configuration file (.toml, .yaml, .yml or .json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cluster authentication mode (keyFile|sendKeyFile|sendX509|x509)
    #[arg(long = "clusterAuthMode", value_name = "MODE")]
    pub cluster_auth_mode: Option<String>,
}

impl ServerCmd {
    /// Run the check. `flags` are the subcommand's matches, holding the
    /// ssl options added from the server catalog.
    pub async fn execute(&self, flags: &ArgMatches) -> Result<()> {
        let loader = ConfigLoader::with_registry(OptionRegistry::server()?);
        let file = load_optional(&loader, self.config.as_deref()).await?;
        let vars = loader.process_env_overrides()?;
        let cluster = self.cluster_auth(&file)?;
        debug!(mode = %cluster.mode, explicit = cluster.explicitly_set, "Cluster authentication");

        let env = Overlay::new(flags, Overlay::new(&vars, &file));
        let mut config = SecurityConfig::new();
        apply_server_config(&env, &mut config, &cluster)
            .context("Invalid server transport-security configuration")?;

        print_config(&config)
    }

    fn cluster_auth(&self, file: &MapEnvironment) -> Result<ClusterAuthInfo> {
        if let Some(mode) = &self.cluster_auth_mode {
            return Ok(ClusterAuthInfo::explicit(mode.as_str()));
        }
        Ok(match string(file, CLUSTER_AUTH_FILE_KEY)? {
            Some(mode) => ClusterAuthInfo::explicit(mode),
            None => ClusterAuthInfo::default(),
        })
    }
}

/// Validate the transport-security settings of a client
#[derive(Parser, Debug)]
pub struct ClientCmd {
    /// Configuration file (.toml, .yaml, .yml or .json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ClientCmd {
    pub async fn execute(&self, flags: &ArgMatches) -> Result<()> {
        let loader = ConfigLoader::with_registry(OptionRegistry::client()?);
        let file = load_optional(&loader, self.config.as_deref()).await?;
        let vars = loader.process_env_overrides()?;

        let env = Overlay::new(flags, Overlay::new(&vars, &file));
        let mut config = SecurityConfig::new();
        apply_client_config(&env, &mut config)
            .context("Invalid client transport-security configuration")?;

        print_config(&config)
    }
}

async fn load_optional(loader: &ConfigLoader, path: Option<&Path>) -> Result<MapEnvironment> {
    match path {
        Some(path) => loader
            .load_file(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(MapEnvironment::new()),
    }
}

fn print_config(config: &SecurityConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
