//! Solid-color placeholder PNG icons for application builds.
//!
//! [`png::encode`] builds the PNG byte stream by hand and
//! [`icon_gen::generate_placeholders`] writes the configured set of icons.

pub mod config;
pub mod icon_gen;
pub mod png;

pub use config::{Config, IconSize};
