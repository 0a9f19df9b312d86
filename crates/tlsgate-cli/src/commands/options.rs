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
use crate::output;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use tlsgate_config::OptionRegistry;

/// Which side of a connection an option set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Role {
    /// Options accepted by the server
    Server,
    /// Options accepted by clients
    Client,
}

/// List the transport-security options a role accepts
#[derive(Parser, Debug)]
pub struct OptionsCmd {
    /// Role to list
    #[arg(value_enum)]
    pub role: Role,
}

impl OptionsCmd {
    /// Print the option table for the chosen role
    pub fn execute(&self) -> Result<()> {
        let registry = match self.role {
            Role::Server => OptionRegistry::server()?,
            Role::Client => OptionRegistry::client()?,
        };

        output::header(&format!(
            "{:<34} {:<30} {:<24} DESCRIPTION",
            "KEY", "FLAG", "KIND"
        ));
        for spec in registry.iter() {
            println!(
                "{:<34} {:<30} {:<24} {}",
                spec.key,
                format!("--{}", spec.flag),
                spec.kind.label(),
                spec.description
            );
        }
        Ok(())
    }
}
