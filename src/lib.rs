//! Scrape LinkedIn profiles into JSON and score them against job
//! descriptions with a language model.

pub mod cli;
pub mod core;
pub mod environment;
pub mod linkedin;
pub mod scoring;
pub mod store;
pub mod web;

pub use web::start_web_server;
