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
//! Structured logging for tlsgate.
//!
//! Thin setup layer over `tracing-subscriber`: pick a [`LogFormat`], a
//! filter directive (or let `RUST_LOG` decide) and install the subscriber
//! once at process start.
//!
//! # Example
//!
//! ```no_run
//! use tlsgate_observability::{init_tracing_with_config, LogConfig, LogFormat};
//!
//! let config = LogConfig::for_verbosity(1, false).with_format(LogFormat::Json);
//! init_tracing_with_config(&config).unwrap();
//! tracing::info!("Application started");
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput, DEFAULT_LEVEL};
pub use initialization::{build_subscriber, init_tracing, init_tracing_with_config};
