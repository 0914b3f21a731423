//! # filedrop access core
//!
//! Confinement and authorization primitives for the filedrop file-sharing
//! service.
//!
//! ## Overview
//!
//! Every request the server handles passes through this crate:
//!
//! - **Path resolution**: client-supplied relative paths are normalized
//!   (`.`, `..` and symlinks resolved) and checked against the canonical
//!   share root before anything touches the filesystem
//! - **Listing**: one-level, directories-first listings of a resolved directory
//! - **Upload tokens**: a rotating single-use capability token plus a fixed
//!   super token
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use access::{list, resolve_upload_target, TokenAuthority};
//!
//! let root = Path::new("/srv/share");
//! for entry in list(root, "docs")? {
//!     println!("{} {:?}", entry.relative_path, entry.size);
//! }
//!
//! let tokens = TokenAuthority::generate();
//! let grant = tokens.authorize(&tokens.get())?;
//! let target = resolve_upload_target(root, "incoming/report.pdf")?;
//! std::fs::write(target, b"...")?;
//! tokens.complete(&grant);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`resolver`]: root-confined path resolution
//! - [`listing`]: directory listings
//! - [`token`]: upload token issuing, rotation and validation
//! - [`error`]: error types

pub mod error;
pub mod listing;
pub mod resolver;
pub mod token;

pub use error::{Result, ShareError};
pub use listing::{list, Entry};
pub use resolver::{
    resolve, resolve_directory, resolve_download, resolve_upload_target, Expect,
};
pub use token::{
    generate_token, normalize_token, Grant, TokenAuthority, SUPER_TOKEN_LENGTH,
    UPLOAD_TOKEN_LENGTH,
};
