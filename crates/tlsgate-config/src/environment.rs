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
//! Read access to supplied option values.
//!
//! An [`Environment`] answers two questions for a dotted key: was it
//! supplied, and with what value. Command-line matches, configuration
//! files and plain maps all implement it, and [`Overlay`] stacks two of
//! them so the command line can override a file.

use crate::error::{ConfigError, ConfigResult};
use clap::parser::ValueSource;
use clap::ArgMatches;
use std::collections::BTreeMap;

/// A supplied option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Switch state
    Bool(bool),
    /// Text value
    String(String),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Queryable set of supplied options.
pub trait Environment {
    /// Whether the key was supplied at all.
    fn has(&self, key: &str) -> bool;

    /// Value of a supplied key. Asking for a key that was not supplied is
    /// an error.
    fn get(&self, key: &str) -> ConfigResult<Value>;
}

impl<E: Environment + ?Sized> Environment for &E {
    fn has(&self, key: &str) -> bool {
        (**self).has(key)
    }

    fn get(&self, key: &str) -> ConfigResult<Value> {
        (**self).get(key)
    }
}

/// String value of `key`, or `None` when it was not supplied.
pub fn string<E: Environment + ?Sized>(env: &E, key: &str) -> ConfigResult<Option<String>> {
    if !env.has(key) {
        return Ok(None);
    }
    match env.get(key)? {
        Value::String(value) => Ok(Some(value)),
        Value::Bool(_) => Err(ConfigError::type_mismatch(key, "a string")),
    }
}

/// Whether the switch `key` is on. An absent switch or an explicit
/// `false` are both off.
pub fn switch<E: Environment + ?Sized>(env: &E, key: &str) -> ConfigResult<bool> {
    if !env.has(key) {
        return Ok(false);
    }
    match env.get(key)? {
        Value::Bool(value) => Ok(value),
        Value::String(_) => Err(ConfigError::type_mismatch(key, "a switch")),
    }
}

/// Environment backed by an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnvironment {
    values: BTreeMap<String, Value>,
}

impl MapEnvironment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply `value` for `key`, replacing any earlier value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`MapEnvironment::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Borrow the raw value supplied for `key`
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of supplied keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was supplied
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Environment for MapEnvironment {
    fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get(&self, key: &str) -> ConfigResult<Value> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ConfigError::NotSupplied(key.to_string()))
    }
}

/// Two environments where `upper` wins for every key it supplies.
#[derive(Debug, Clone)]
pub struct Overlay<U, L> {
    /// Higher-precedence source
    pub upper: U,
    /// Fallback source
    pub lower: L,
}

impl<U: Environment, L: Environment> Overlay<U, L> {
    /// Stack `upper` over `lower`
    pub fn new(upper: U, lower: L) -> Self {
        Overlay { upper, lower }
    }
}

impl<U: Environment, L: Environment> Environment for Overlay<U, L> {
    fn has(&self, key: &str) -> bool {
        self.upper.has(key) || self.lower.has(key)
    }

    fn get(&self, key: &str) -> ConfigResult<Value> {
        if self.upper.has(key) {
            self.upper.get(key)
        } else {
            self.lower.get(key)
        }
    }
}

/// Command-line matches. Only arguments given on the command line (or
/// through an environment variable bound to them) count as supplied;
/// clap's implicit `false` for unset switches does not.
impl Environment for ArgMatches {
    fn has(&self, key: &str) -> bool {
        self.ids().any(|id| id.as_str() == key)
            && matches!(
                self.value_source(key),
                Some(ValueSource::CommandLine) | Some(ValueSource::EnvVariable)
            )
    }

    fn get(&self, key: &str) -> ConfigResult<Value> {
        if let Ok(Some(value)) = self.try_get_one::<String>(key) {
            return Ok(Value::String(value.clone()));
        }
        match self.try_get_one::<bool>(key) {
            Ok(Some(value)) => Ok(Value::Bool(*value)),
            _ => Err(ConfigError::NotSupplied(key.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{keys, OptionRegistry};
    use clap::Command;

    #[test]
    fn test_map_environment_helpers() {
        let env = MapEnvironment::new()
            .with(keys::MODE, "sslOnly")
            .with(keys::FIPS_MODE, true)
            .with(keys::WEAK_CERT_VALIDATION, false);

        assert_eq!(string(&env, keys::MODE).unwrap().as_deref(), Some("sslOnly"));
        assert_eq!(string(&env, keys::CA_FILE).unwrap(), None);
        assert!(switch(&env, keys::FIPS_MODE).unwrap());
        assert!(!switch(&env, keys::WEAK_CERT_VALIDATION).unwrap());
        assert!(!switch(&env, keys::ALLOW_INVALID_CERTS).unwrap());
    }

    #[test]
    fn test_type_mismatch() {
        let env = MapEnvironment::new()
            .with(keys::MODE, true)
            .with(keys::FIPS_MODE, "yes");

        assert!(matches!(
            string(&env, keys::MODE),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert!(matches!(
            switch(&env, keys::FIPS_MODE),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_get_absent_key_fails() {
        assert!(matches!(
            MapEnvironment::new().get(keys::MODE),
            Err(ConfigError::NotSupplied(_))
        ));
    }

    #[test]
    fn test_overlay_prefers_upper() {
        let upper = MapEnvironment::new().with(keys::MODE, "sslOnly");
        let lower = MapEnvironment::new()
            .with(keys::MODE, "acceptSSL")
            .with(keys::CA_FILE, "ca.pem");
        let env = Overlay::new(upper, lower);

        assert_eq!(env.get(keys::MODE).unwrap(), Value::from("sslOnly"));
        assert_eq!(env.get(keys::CA_FILE).unwrap(), Value::from("ca.pem"));
        assert!(!env.has(keys::CRL_FILE));
    }

    #[test]
    fn test_arg_matches_presence() {
        let command = OptionRegistry::server()
            .unwrap()
            .augment(Command::new("server"));
        let matches = command
            .try_get_matches_from(["server", "--sslCAFile", "ca.pem", "--sslFIPSMode"])
            .unwrap();

        assert!(matches.has(keys::CA_FILE));
        assert!(matches.has(keys::FIPS_MODE));
        assert!(!matches.has(keys::WEAK_CERT_VALIDATION));
        assert!(!matches.has(keys::MODE));
        assert!(!matches.has("not.declared"));
        assert_eq!(matches.get(keys::CA_FILE).unwrap(), Value::from("ca.pem"));
        assert_eq!(matches.get(keys::FIPS_MODE).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_arg_matches_implicit_password() {
        let command = OptionRegistry::server()
            .unwrap()
            .augment(Command::new("server"));
        let matches = command
            .try_get_matches_from(["server", "--sslClusterPassword"])
            .unwrap();

        assert!(matches.has(keys::CLUSTER_PASSWORD));
        assert_eq!(string(&matches, keys::CLUSTER_PASSWORD).unwrap().as_deref(), Some(""));
    }
}
