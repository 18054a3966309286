// src/store/mod.rs
//! File-backed stores for accounts, applications and job descriptions.

pub mod applications;
pub mod jobs;
pub mod users;

pub use applications::{ApplicationLog, ApplicationRow};
pub use jobs::{JobCatalog, JobDescription};
pub use users::{UserRecord, UserStore, UserStoreError, UserStoreFailure};
