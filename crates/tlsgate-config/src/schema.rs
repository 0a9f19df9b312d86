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
//! The canonical transport-security record and its enumerations.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// How transport security is applied to connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SecurityMode {
    /// No transport security.
    #[default]
    #[serde(rename = "noSSL")]
    Disabled,

    /// Accept secured connections, initiate plain ones.
    #[serde(rename = "acceptSSL")]
    AcceptOnly,

    /// Accept and initiate secured connections, still accepting plain ones.
    #[serde(rename = "sendAcceptSSL")]
    AcceptAndInitiate,

    /// Only secured connections.
    #[serde(rename = "sslOnly")]
    RequireOnly,
}

impl SecurityMode {
    /// All modes, in ascending strength.
    pub const ALL: [SecurityMode; 4] = [
        SecurityMode::Disabled,
        SecurityMode::AcceptOnly,
        SecurityMode::AcceptAndInitiate,
        SecurityMode::RequireOnly,
    ];

    /// Name used by the mode selector option.
    pub fn name(&self) -> &'static str {
        match self {
            SecurityMode::Disabled => "noSSL",
            SecurityMode::AcceptOnly => "acceptSSL",
            SecurityMode::AcceptAndInitiate => "sendAcceptSSL",
            SecurityMode::RequireOnly => "sslOnly",
        }
    }

    /// Exact, case-sensitive lookup by selector name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name() == name)
    }

    /// Anything other than `noSSL`
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SecurityMode::Disabled)
    }

    fn to_u8(self) -> u8 {
        match self {
            SecurityMode::Disabled => 0,
            SecurityMode::AcceptOnly => 1,
            SecurityMode::AcceptAndInitiate => 2,
            SecurityMode::RequireOnly => 3,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => SecurityMode::AcceptOnly,
            2 => SecurityMode::AcceptAndInitiate,
            3 => SecurityMode::RequireOnly,
            _ => SecurityMode::Disabled,
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a name matches no [`SecurityMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSecurityMode(pub String);

impl fmt::Display for UnknownSecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported mode {}", self.0)
    }
}

impl std::error::Error for UnknownSecurityMode {}

impl FromStr for SecurityMode {
    type Err = UnknownSecurityMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownSecurityMode(s.to_string()))
    }
}

/// A [`SecurityMode`] cell readable from any thread without locking.
///
/// Written once during startup validation, then loaded by every
/// connection handler.
#[derive(Default)]
pub struct AtomicSecurityMode(AtomicU8);

impl AtomicSecurityMode {
    /// Cell holding `mode`
    pub fn new(mode: SecurityMode) -> Self {
        AtomicSecurityMode(AtomicU8::new(mode.to_u8()))
    }

    /// Current mode
    pub fn load(&self) -> SecurityMode {
        SecurityMode::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Replace the mode
    pub fn store(&self, mode: SecurityMode) {
        self.0.store(mode.to_u8(), Ordering::Release);
    }
}

impl fmt::Debug for AtomicSecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(), f)
    }
}

impl PartialEq for AtomicSecurityMode {
    fn eq(&self, other: &Self) -> bool {
        self.load() == other.load()
    }
}

impl Eq for AtomicSecurityMode {}

impl Clone for AtomicSecurityMode {
    fn clone(&self) -> Self {
        AtomicSecurityMode::new(self.load())
    }
}

impl Serialize for AtomicSecurityMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.load().serialize(serializer)
    }
}

/// Transport-security settings shared by the whole process.
///
/// Text fields use the empty string for "not configured".
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    /// Active transport-security mode
    pub mode: AtomicSecurityMode,

    /// Certificate and key presented to peers (PEM)
    pub identity_file: String,

    /// Password for the identity key
    #[serde(serialize_with = "redact")]
    pub identity_password: String,

    /// Certificate and key used for inter-node authentication
    pub cluster_identity_file: String,

    /// Password for the cluster identity key
    #[serde(serialize_with = "redact")]
    pub cluster_identity_password: String,

    /// CA bundle used to validate peer certificates
    pub trust_anchor_file: String,

    /// Certificate revocation list
    pub revocation_list_file: String,

    /// Accept peers that present no certificate
    pub allow_weak_peer_validation: bool,

    /// Accept peers whose certificates fail validation
    pub allow_invalid_certificates: bool,

    /// Run the TLS library in FIPS mode
    pub fips_mode_enabled: bool,
}

impl SecurityConfig {
    /// Record with security disabled and every field empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Current security mode
    pub fn mode(&self) -> SecurityMode {
        self.mode.load()
    }

    /// Whether the mode enables transport security
    pub fn is_enabled(&self) -> bool {
        self.mode().is_enabled()
    }

    /// Names of the fields that only make sense with security enabled and
    /// are currently set.
    pub(crate) fn orphaned_fields(&self) -> Vec<&'static str> {
        let mut set = Vec::new();
        let text = [
            ("identityFile", &self.identity_file),
            ("identityPassword", &self.identity_password),
            ("clusterIdentityFile", &self.cluster_identity_file),
            ("clusterIdentityPassword", &self.cluster_identity_password),
            ("trustAnchorFile", &self.trust_anchor_file),
            ("revocationListFile", &self.revocation_list_file),
        ];
        for (name, value) in text {
            if !value.is_empty() {
                set.push(name);
            }
        }
        if self.allow_weak_peer_validation {
            set.push("allowWeakPeerValidation");
        }
        if self.fips_mode_enabled {
            set.push("fipsModeEnabled");
        }
        set
    }
}

fn redact<S: Serializer>(value: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("<redacted>")
    }
}

/// Inter-node authentication mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterAuthMode {
    /// Shared key file
    #[default]
    KeyFile,
    /// Send key file, accept key file or certificate
    SendKeyFile,
    /// Send certificate, accept key file or certificate
    SendX509,
    /// Certificate only
    X509,
}

impl ClusterAuthMode {
    /// Configuration name of the mechanism
    pub fn name(&self) -> &'static str {
        match self {
            ClusterAuthMode::KeyFile => "keyFile",
            ClusterAuthMode::SendKeyFile => "sendKeyFile",
            ClusterAuthMode::SendX509 => "sendX509",
            ClusterAuthMode::X509 => "x509",
        }
    }

    /// Exact lookup by configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        [
            ClusterAuthMode::KeyFile,
            ClusterAuthMode::SendKeyFile,
            ClusterAuthMode::SendX509,
            ClusterAuthMode::X509,
        ]
        .into_iter()
        .find(|mode| mode.name() == name)
    }

    /// Whether nodes using this mechanism need transport security.
    pub fn requires_transport_security(&self) -> bool {
        match self {
            ClusterAuthMode::KeyFile => false,
            ClusterAuthMode::SendKeyFile | ClusterAuthMode::SendX509 | ClusterAuthMode::X509 => {
                true
            }
        }
    }
}

impl fmt::Display for ClusterAuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cluster authentication setting as configured elsewhere in the process.
///
/// The mode stays a raw string: an unknown value is only an error when it
/// was explicitly supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAuthInfo {
    /// Raw mode name
    pub mode: String,
    /// Whether the operator supplied the mode
    pub explicitly_set: bool,
}

impl ClusterAuthInfo {
    /// Mode supplied by the operator
    pub fn explicit(mode: impl Into<String>) -> Self {
        ClusterAuthInfo {
            mode: mode.into(),
            explicitly_set: true,
        }
    }

    /// Known mechanism for the raw name, if any
    pub fn parsed(&self) -> Option<ClusterAuthMode> {
        ClusterAuthMode::from_name(&self.mode)
    }
}

impl Default for ClusterAuthInfo {
    fn default() -> Self {
        ClusterAuthInfo {
            mode: ClusterAuthMode::KeyFile.name().to_string(),
            explicitly_set: false,
        }
    }
}
