//! School website backend.
//!
//! Public news, downloadable documents organised in folders, and a contact
//! form, with an admin API behind a session cookie. Uploaded files live on
//! the local filesystem; their metadata lives in SQLite.

pub mod auth;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod news;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{Result, SiteError};
