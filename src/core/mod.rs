// src/core/mod.rs
//! Core services shared by the scraper, the stores and the web front end

pub mod fs_ops;

pub use fs_ops::FsOps;
