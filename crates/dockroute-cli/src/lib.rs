//! Docking route CLI library.
//!
//! This crate provides the output views and text rendering used by the
//! `dockroute-cli` binary.

pub mod output;
