// src/scoring/mod.rs
pub mod batch;
pub mod client;
pub mod prompt;

pub use batch::{score_pending, PendingSummary};
pub use client::{
    fit_note, parse_score, GeminiClient, GeminiSettings, LanguageModel, ScoringClient, ScoringError,
};
pub use prompt::build_prompt;
