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
//! Declarations of the transport-security options.
//!
//! The catalog only describes options: key, command-line flag, value kind
//! and help text. Parsing is left to whatever [`OptionSink`] receives the
//! declarations; [`OptionRegistry`] is the built-in one and can turn itself
//! into `clap` arguments.

use crate::error::{ConfigError, ConfigResult};
use clap::{Arg, ArgAction, Command};
use tracing::debug;

/// Dotted keys understood by the validators.
pub mod keys {
    /// Client switch enabling transport security
    pub const CLIENT_ENABLE: &str = "ssl";
    /// Legacy server switch, same as `sslOnly`
    pub const ON_NORMAL_PORTS: &str = "ssl.sslOnNormalPorts";
    /// Server security mode name
    pub const MODE: &str = "ssl.mode";
    /// Identity certificate and key file
    pub const PEM_KEY_FILE: &str = "ssl.PEMKeyFile";
    /// Password for the identity key
    pub const PEM_KEY_PASSWORD: &str = "ssl.PEMKeyPassword";
    /// Identity file for intra-cluster traffic
    pub const CLUSTER_FILE: &str = "ssl.clusterFile";
    /// Password for the cluster identity key
    pub const CLUSTER_PASSWORD: &str = "ssl.clusterPassword";
    /// Certificate authority file
    pub const CA_FILE: &str = "ssl.CAFile";
    /// Certificate revocation list file
    pub const CRL_FILE: &str = "ssl.CRLFile";
    /// Accept peers without certificates
    pub const WEAK_CERT_VALIDATION: &str = "ssl.weakCertificateValidation";
    /// Accept invalid peer certificates
    pub const ALLOW_INVALID_CERTS: &str = "ssl.allowInvalidCertificates";
    /// FIPS 140-2 mode
    pub const FIPS_MODE: &str = "ssl.FIPSMode";
}

/// What kind of value an option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Present or absent, no value
    Switch,
    /// Requires a string value
    String,
    /// String value that may be omitted, in which case the given default applies
    StringWithImplicit(&'static str),
}

impl OptionKind {
    /// Short name for help tables
    pub fn label(&self) -> &'static str {
        match self {
            OptionKind::Switch => "switch",
            OptionKind::String => "string",
            OptionKind::StringWithImplicit(_) => "string (optional value)",
        }
    }
}

/// One option declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Dotted key, also the `clap` argument id
    pub key: &'static str,
    /// Long flag name without dashes
    pub flag: &'static str,
    /// Value kind
    pub kind: OptionKind,
    /// Help text
    pub description: &'static str,
}

impl OptionSpec {
    /// Declare a switch
    pub const fn switch(key: &'static str, flag: &'static str, description: &'static str) -> Self {
        OptionSpec {
            key,
            flag,
            kind: OptionKind::Switch,
            description,
        }
    }

    /// Declare a string option
    pub const fn string(key: &'static str, flag: &'static str, description: &'static str) -> Self {
        OptionSpec {
            key,
            flag,
            kind: OptionKind::String,
            description,
        }
    }

    /// Value used when the flag is given without one
    pub const fn with_implicit(mut self, default: &'static str) -> Self {
        self.kind = OptionKind::StringWithImplicit(default);
        self
    }

    fn to_arg(&self) -> Arg {
        let arg = Arg::new(self.key).long(self.flag).help(self.description);
        match self.kind {
            OptionKind::Switch => arg.action(ArgAction::SetTrue),
            OptionKind::String => arg.action(ArgAction::Set).value_name("VALUE"),
            OptionKind::StringWithImplicit(default) => arg
                .action(ArgAction::Set)
                .value_name("VALUE")
                .num_args(0..=1)
                .default_missing_value(default),
        }
    }
}

/// Receiver of option declarations.
pub trait OptionSink {
    /// Accept one declaration
    fn declare(&mut self, spec: OptionSpec) -> ConfigResult<()>;
}

/// Declare the options a server accepts.
pub fn register_server_options(sink: &mut dyn OptionSink) -> ConfigResult<()> {
    sink.declare(OptionSpec::switch(
        keys::ON_NORMAL_PORTS,
        "sslOnNormalPorts",
        "use ssl on configured ports",
    ))?;
    sink.declare(OptionSpec::string(
        keys::MODE,
        "sslMode",
        "set the SSL operation mode (noSSL|acceptSSL|sendAcceptSSL|sslOnly)",
    ))?;
    sink.declare(OptionSpec::string(
        keys::PEM_KEY_FILE,
        "sslPEMKeyFile",
        "PEM file for ssl",
    ))?;
    sink.declare(
        OptionSpec::string(keys::PEM_KEY_PASSWORD, "sslPEMKeyPassword", "PEM file password")
            .with_implicit(""),
    )?;
    sink.declare(OptionSpec::string(
        keys::CLUSTER_FILE,
        "sslClusterFile",
        "Key file for internal SSL authentication",
    ))?;
    sink.declare(
        OptionSpec::string(
            keys::CLUSTER_PASSWORD,
            "sslClusterPassword",
            "Internal authentication key file password",
        )
        .with_implicit(""),
    )?;
    sink.declare(OptionSpec::string(
        keys::CA_FILE,
        "sslCAFile",
        "Certificate Authority file for SSL",
    ))?;
    sink.declare(OptionSpec::string(
        keys::CRL_FILE,
        "sslCRLFile",
        "Certificate Revocation List file for SSL",
    ))?;
    sink.declare(OptionSpec::switch(
        keys::WEAK_CERT_VALIDATION,
        "sslWeakCertificateValidation",
        "allow client to connect without presenting a certificate",
    ))?;
    sink.declare(OptionSpec::switch(
        keys::ALLOW_INVALID_CERTS,
        "sslAllowInvalidCertificates",
        "allow connections to servers with invalid certificates",
    ))?;
    sink.declare(OptionSpec::switch(
        keys::FIPS_MODE,
        "sslFIPSMode",
        "activate FIPS 140-2 mode at startup",
    ))?;
    Ok(())
}

/// Declare the options a client accepts.
pub fn register_client_options(sink: &mut dyn OptionSink) -> ConfigResult<()> {
    sink.declare(OptionSpec::switch(
        keys::CLIENT_ENABLE,
        "ssl",
        "use SSL for all connections",
    ))?;
    sink.declare(OptionSpec::string(
        keys::CA_FILE,
        "sslCAFile",
        "Certificate Authority file for SSL",
    ))?;
    sink.declare(OptionSpec::string(
        keys::PEM_KEY_FILE,
        "sslPEMKeyFile",
        "PEM certificate/key file for SSL",
    ))?;
    sink.declare(OptionSpec::string(
        keys::PEM_KEY_PASSWORD,
        "sslPEMKeyPassword",
        "password for key in PEM file for SSL",
    ))?;
    sink.declare(OptionSpec::string(
        keys::CRL_FILE,
        "sslCRLFile",
        "Certificate Revocation List file for SSL",
    ))?;
    sink.declare(OptionSpec::switch(
        keys::ALLOW_INVALID_CERTS,
        "sslAllowInvalidCertificates",
        "allow connections to servers with invalid certificates",
    ))?;
    sink.declare(OptionSpec::switch(
        keys::FIPS_MODE,
        "sslFIPSMode",
        "activate FIPS 140-2 mode at startup",
    ))?;
    Ok(())
}

/// Ordered, duplicate-free collection of option declarations.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    specs: Vec<OptionSpec>,
}

impl OptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the server options.
    pub fn server() -> ConfigResult<Self> {
        let mut registry = Self::new();
        register_server_options(&mut registry)?;
        Ok(registry)
    }

    /// Registry holding the client options.
    pub fn client() -> ConfigResult<Self> {
        let mut registry = Self::new();
        register_client_options(&mut registry)?;
        Ok(registry)
    }

    /// Look up a declaration by key
    pub fn get(&self, key: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|spec| spec.key == key)
    }

    /// Declarations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether nothing is declared
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Add every declared option to a `clap` command as a `--<flag>` argument
    /// whose id is the dotted key.
    pub fn augment(&self, command: Command) -> Command {
        self.specs
            .iter()
            .fold(command, |command, spec| command.arg(spec.to_arg()))
    }
}

impl OptionSink for OptionRegistry {
    fn declare(&mut self, spec: OptionSpec) -> ConfigResult<()> {
        if spec.key.is_empty() || spec.flag.is_empty() {
            return Err(ConfigError::MalformedOption(format!(
                "key '{}' / flag '{}' must not be empty",
                spec.key, spec.flag
            )));
        }
        if spec.flag.starts_with('-') || spec.flag.contains(char::is_whitespace) {
            return Err(ConfigError::MalformedOption(format!(
                "flag '{}' must be a bare name",
                spec.flag
            )));
        }
        if self.get(spec.key).is_some() {
            return Err(ConfigError::DuplicateOption(spec.key.to_string()));
        }
        if self.specs.iter().any(|existing| existing.flag == spec.flag) {
            return Err(ConfigError::DuplicateOption(format!("--{}", spec.flag)));
        }

        debug!(key = spec.key, flag = spec.flag, kind = spec.kind.label(), "Declared option");
        self.specs.push(spec);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_server_catalog() {
        let registry = OptionRegistry::server().unwrap();
        assert_eq!(registry.len(), 11);
        assert_eq!(
            registry.get(keys::MODE).map(|s| s.flag),
            Some("sslMode")
        );
        assert_eq!(
            registry.get(keys::PEM_KEY_PASSWORD).map(|s| s.kind),
            Some(OptionKind::StringWithImplicit(""))
        );
        assert_eq!(
            registry.get(keys::CLUSTER_PASSWORD).map(|s| s.kind),
            Some(OptionKind::StringWithImplicit(""))
        );
        assert_eq!(
            registry.get(keys::ON_NORMAL_PORTS).map(|s| s.kind),
            Some(OptionKind::Switch)
        );
        assert!(registry.get(keys::CLIENT_ENABLE).is_none());
    }

    #[test]
    fn test_client_catalog() {
        let registry = OptionRegistry::client().unwrap();
        assert_eq!(registry.len(), 7);
        assert_eq!(
            registry.get(keys::PEM_KEY_PASSWORD).map(|s| s.kind),
            Some(OptionKind::String)
        );
        assert!(registry.get(keys::CLUSTER_FILE).is_none());
        assert!(registry.get(keys::MODE).is_none());
        assert!(registry.get(keys::WEAK_CERT_VALIDATION).is_none());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = OptionRegistry::new();
        registry
            .declare(OptionSpec::switch(keys::FIPS_MODE, "sslFIPSMode", "fips"))
            .unwrap();
        let err = registry
            .declare(OptionSpec::switch(keys::FIPS_MODE, "otherFlag", "fips"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateOption(_)));
    }

    #[test]
    fn test_duplicate_flag_rejected() {
        let mut registry = OptionRegistry::new();
        registry
            .declare(OptionSpec::string(keys::CA_FILE, "sslCAFile", "ca"))
            .unwrap();
        let err = registry
            .declare(OptionSpec::string("ssl.otherCA", "sslCAFile", "ca"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateOption(ref f) if f == "--sslCAFile"));
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut registry = OptionRegistry::server().unwrap();
        assert!(register_server_options(&mut registry).is_err());
    }

    #[test]
    fn test_malformed_declarations_rejected() {
        let mut registry = OptionRegistry::new();
        assert!(matches!(
            registry.declare(OptionSpec::switch("", "flag", "d")),
            Err(ConfigError::MalformedOption(_))
        ));
        assert!(matches!(
            registry.declare(OptionSpec::switch("a.b", "--flag", "d")),
            Err(ConfigError::MalformedOption(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_augment_builds_clap_args() {
        let registry = OptionRegistry::server().unwrap();
        let command = registry.augment(Command::new("server"));
        let matches = command
            .try_get_matches_from([
                "server",
                "--sslMode",
                "requireSSL",
                "--sslPEMKeyPassword",
                "--sslFIPSMode",
            ])
            .unwrap();

        assert_eq!(
            matches.get_one::<String>(keys::MODE).map(String::as_str),
            Some("requireSSL")
        );
        assert_eq!(
            matches
                .get_one::<String>(keys::PEM_KEY_PASSWORD)
                .map(String::as_str),
            Some("")
        );
        assert!(matches.get_flag(keys::FIPS_MODE));
        assert!(!matches.get_flag(keys::WEAK_CERT_VALIDATION));
    }
}
