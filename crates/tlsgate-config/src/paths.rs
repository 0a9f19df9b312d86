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
//! Absolute path resolution for file options.
//!
//! Resolution is lexical: the file system is never consulted, so a path to
//! a file that does not exist yet still resolves.

use std::path::{Component, Path, PathBuf};

/// Turns a configured path into an absolute, `/`-separated string.
pub trait PathResolver {
    /// Make `path` absolute. An empty path names the base directory.
    fn resolve_absolute(&self, path: &str) -> String;
}

/// Resolves relative paths against a fixed base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirResolver {
    base: PathBuf,
}

impl BaseDirResolver {
    /// Resolver rooted at `base`
    pub fn new(base: impl Into<PathBuf>) -> Self {
        BaseDirResolver { base: base.into() }
    }
}

impl PathResolver for BaseDirResolver {
    fn resolve_absolute(&self, path: &str) -> String {
        let path = Path::new(path);
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        };
        generic_string(&joined)
    }
}

/// Resolves relative paths against the process working directory, read
/// once at construction.
#[derive(Debug, Clone)]
pub struct CurrentDirResolver(BaseDirResolver);

impl CurrentDirResolver {
    /// Capture the working directory, failing if it cannot be read
    pub fn new() -> std::io::Result<Self> {
        Ok(CurrentDirResolver(BaseDirResolver::new(std::env::current_dir()?)))
    }
}

impl PathResolver for CurrentDirResolver {
    fn resolve_absolute(&self, path: &str) -> String {
        self.0.resolve_absolute(path)
    }
}

/// Render a path with `/` separators and without `.` components.
fn generic_string(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                out.push_str(&prefix.as_os_str().to_string_lossy().replace('\\', "/"));
            }
            Component::RootDir => out.push('/'),
            Component::CurDir => {}
            Component::ParentDir => push_segment(&mut out, ".."),
            Component::Normal(segment) => push_segment(&mut out, &segment.to_string_lossy()),
        }
    }
    out
}

fn push_segment(out: &mut String, segment: &str) {
    if !out.is_empty() && !out.ends_with('/') {
        out.push('/');
    }
    out.push_str(segment);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_joined_to_base() {
        let resolver = BaseDirResolver::new("/srv/db");
        assert_eq!(resolver.resolve_absolute("certs/server.pem"), "/srv/db/certs/server.pem");
    }

    #[test]
    fn test_absolute_path_kept() {
        let resolver = BaseDirResolver::new("/srv/db");
        assert_eq!(resolver.resolve_absolute("/etc/ssl/ca.pem"), "/etc/ssl/ca.pem");
    }

    #[test]
    fn test_current_dir_components_dropped() {
        let resolver = BaseDirResolver::new("/srv/db");
        assert_eq!(resolver.resolve_absolute("./certs/./ca.pem"), "/srv/db/certs/ca.pem");
    }

    #[test]
    fn test_parent_components_kept() {
        let resolver = BaseDirResolver::new("/srv/db");
        assert_eq!(resolver.resolve_absolute("../ca.pem"), "/srv/db/../ca.pem");
    }

    #[test]
    fn test_empty_path_is_base() {
        let resolver = BaseDirResolver::new("/srv/db");
        assert_eq!(resolver.resolve_absolute(""), "/srv/db");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = BaseDirResolver::new("/srv/db");
        assert_eq!(
            resolver.resolve_absolute("a/b.pem"),
            resolver.resolve_absolute("a/b.pem")
        );
    }

    #[test]
    fn test_current_dir_resolver_is_absolute() {
        let resolver = CurrentDirResolver::new().unwrap();
        let resolved = resolver.resolve_absolute("server.pem");
        assert!(Path::new(&resolved).is_absolute());
        assert!(resolved.ends_with("/server.pem"));
    }
}
