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
//! Turning supplied options into a consistent [`SecurityConfig`].
//!
//! Rules run in a fixed order and the first violation is returned. The
//! target record is only updated when every rule passes.

use crate::advisory::{AdvisorySink, TracingAdvisory};
use crate::catalog::keys;
use crate::environment::{string, switch, Environment};
use crate::error::{ConfigError, ConfigResult};
use crate::paths::{CurrentDirResolver, PathResolver};
use crate::schema::{ClusterAuthInfo, SecurityConfig, SecurityMode};
use tracing::{debug, info};

/// Key under which the cluster authentication mode is reported in errors.
pub const CLUSTER_AUTH_MODE_KEY: &str = "clusterAuthMode";

const NO_CA_FILE_ADVISORY: &str = "No SSL certificate validation can be performed since no CA file \
     has been provided; please specify an sslCAFile parameter";

/// Validator for configuration settings
pub trait Validator {
    /// Validate configuration
    fn validate(&self) -> ConfigResult<()>;
}

/// Re-checks the server-side invariants on an already populated record.
impl Validator for SecurityConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.is_enabled() {
            check_enabled_dependencies(self)
        } else {
            check_no_orphans(self, false)
        }
    }
}

fn check_enabled_dependencies(config: &SecurityConfig) -> ConfigResult<()> {
    if config.identity_file.is_empty() {
        return Err(ConfigError::missing_dependency(
            "need sslPEMKeyFile when SSL is enabled",
        ));
    }
    if config.allow_weak_peer_validation && config.trust_anchor_file.is_empty() {
        return Err(ConfigError::missing_dependency(
            "need sslCAFile with sslWeakCertificateValidation",
        ));
    }
    if !config.revocation_list_file.is_empty() && config.trust_anchor_file.is_empty() {
        return Err(ConfigError::missing_dependency(
            "need sslCAFile with sslCRLFile",
        ));
    }
    Ok(())
}

fn check_no_orphans(config: &SecurityConfig, fips_requested: bool) -> ConfigResult<()> {
    let mut orphaned = config.orphaned_fields();
    if fips_requested && !config.fips_mode_enabled {
        orphaned.push("fipsModeEnabled");
    }
    if orphaned.is_empty() {
        return Ok(());
    }
    Err(ConfigError::conflict(format!(
        "need to enable SSL via the sslMode flag when using SSL configuration parameters ({})",
        orphaned.join(", ")
    )))
}

/// Server-side validation with explicit collaborators.
pub struct ServerValidator<'a> {
    resolver: &'a dyn PathResolver,
    advisory: &'a dyn AdvisorySink,
}

impl<'a> ServerValidator<'a> {
    /// Validator using the given resolver and advisory sink
    pub fn new(resolver: &'a dyn PathResolver, advisory: &'a dyn AdvisorySink) -> Self {
        ServerValidator { resolver, advisory }
    }

    /// Apply the server options in `env` to `out`.
    ///
    /// On error `out` is left exactly as it was.
    pub fn apply<E: Environment + ?Sized>(
        &self,
        env: &E,
        out: &mut SecurityConfig,
        cluster: &ClusterAuthInfo,
    ) -> ConfigResult<()> {
        let mut staged = out.clone();
        self.apply_staged(env, &mut staged, cluster)?;
        *out = staged;

        info!(
            mode = %out.mode(),
            trust_anchor = !out.trust_anchor_file.is_empty(),
            fips = out.fips_mode_enabled,
            "Server transport security configuration validated"
        );
        Ok(())
    }

    fn apply_staged<E: Environment + ?Sized>(
        &self,
        env: &E,
        out: &mut SecurityConfig,
        cluster: &ClusterAuthInfo,
    ) -> ConfigResult<()> {
        let mode_selected = env.has(keys::MODE);
        if let Some(name) = string(env, keys::MODE)? {
            let mode = SecurityMode::from_name(&name).ok_or_else(|| {
                ConfigError::invalid_value(keys::MODE, format!("unsupported mode {}", name))
            })?;
            debug!(%mode, "Mode selected");
            out.mode.store(mode);
        }

        if let Some(path) = string(env, keys::PEM_KEY_FILE)? {
            out.identity_file = self.resolve(&path);
        }
        if let Some(password) = string(env, keys::PEM_KEY_PASSWORD)? {
            out.identity_password = password;
        }
        if let Some(path) = string(env, keys::CLUSTER_FILE)? {
            out.cluster_identity_file = self.resolve(&path);
        }
        if let Some(password) = string(env, keys::CLUSTER_PASSWORD)? {
            out.cluster_identity_password = password;
        }
        if let Some(path) = string(env, keys::CA_FILE)? {
            out.trust_anchor_file = self.resolve(&path);
        }
        if let Some(path) = string(env, keys::CRL_FILE)? {
            out.revocation_list_file = self.resolve(&path);
        }
        out.allow_weak_peer_validation = switch(env, keys::WEAK_CERT_VALIDATION)?;
        out.allow_invalid_certificates = switch(env, keys::ALLOW_INVALID_CERTS)?;
        // Only honored once security is known to be enabled.
        let fips_requested = switch(env, keys::FIPS_MODE)?;

        if switch(env, keys::ON_NORMAL_PORTS)? {
            if mode_selected {
                return Err(ConfigError::conflict(
                    "can't have both sslMode and sslOnNormalPorts",
                ));
            }
            debug!("Legacy sslOnNormalPorts switch selects sslOnly");
            out.mode.store(SecurityMode::RequireOnly);
        }

        if out.is_enabled() {
            check_enabled_dependencies(out)?;
            if fips_requested {
                out.fips_mode_enabled = true;
            }
            if out.trust_anchor_file.is_empty() {
                self.advisory.warn(NO_CA_FILE_ADVISORY);
            }
        } else {
            check_no_orphans(out, fips_requested)?;
        }

        match cluster.parsed() {
            Some(auth) if auth.requires_transport_security() => {
                if !out.is_enabled() {
                    return Err(ConfigError::missing_dependency(format!(
                        "need to enable SSL via the sslMode flag for clusterAuthMode {}",
                        auth
                    )));
                }
            }
            Some(_) => {}
            None if cluster.explicitly_set => {
                return Err(ConfigError::invalid_value(
                    CLUSTER_AUTH_MODE_KEY,
                    format!("unsupported cluster auth mode {}", cluster.mode),
                ));
            }
            None => {}
        }

        Ok(())
    }

    fn resolve(&self, path: &str) -> String {
        self.resolver.resolve_absolute(path)
    }
}

/// Apply the server options in `env` to `out`, resolving paths against the
/// working directory and reporting advisories through `tracing`.
pub fn apply_server_config<E: Environment + ?Sized>(
    env: &E,
    out: &mut SecurityConfig,
    cluster: &ClusterAuthInfo,
) -> ConfigResult<()> {
    let resolver = CurrentDirResolver::new()?;
    ServerValidator::new(&resolver, &TracingAdvisory).apply(env, out, cluster)
}

/// Apply the client options in `env` to `out`.
///
/// Values are copied as given; there are no cross-field rules on the
/// client side, so only a failed environment read can make this fail.
pub fn apply_client_config<E: Environment + ?Sized>(
    env: &E,
    out: &mut SecurityConfig,
) -> ConfigResult<()> {
    let mut staged = out.clone();

    if switch(env, keys::CLIENT_ENABLE)? {
        staged.mode.store(SecurityMode::RequireOnly);
    }
    if let Some(path) = string(env, keys::PEM_KEY_FILE)? {
        staged.identity_file = path;
    }
    if let Some(password) = string(env, keys::PEM_KEY_PASSWORD)? {
        staged.identity_password = password;
    }
    if let Some(path) = string(env, keys::CA_FILE)? {
        staged.trust_anchor_file = path;
    }
    if let Some(path) = string(env, keys::CRL_FILE)? {
        staged.revocation_list_file = path;
    }
    if switch(env, keys::ALLOW_INVALID_CERTS)? {
        staged.allow_invalid_certificates = true;
    }
    if switch(env, keys::FIPS_MODE)? {
        staged.fips_mode_enabled = true;
    }

    *out = staged;
    debug!(mode = %out.mode(), "Client transport security configuration applied");
    Ok(())
}
