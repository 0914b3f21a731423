//! # filedrop server library
//!
//! HTTP front end for the filedrop file-sharing service: a directory
//! browser, file downloads and token-authorized uploads, all confined to a
//! single share root.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │              axum router (http)            │  HTML / bytes
//! ├────────────────────────────────────────────┤
//! │  security headers │ error mapping │ render │
//! ├────────────────────────────────────────────┤
//! │   access: resolver · listing · tokens      │  confinement core
//! ├────────────────────────────────────────────┤
//! │                filesystem                  │
//! └────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use server::{AppState, Config, FileServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::load_default()?;
//!     config.apply_env_overrides();
//!     config.validate()?;
//!
//!     let state = AppState::from_config(&config)?;
//!     FileServer::bind(config.socket_addr()?, state).await?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading, environment overrides and validation
//! - [`http`]: Router, handlers, rendering and middleware

pub mod config;
pub mod http;

// Re-export access for convenience
pub use access;

pub use config::Config;
pub use http::{router, ApiError, AppState, FileServer};
