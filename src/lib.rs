//! LearnAudibly backend
//!
//! This library provides the relay service behind the LearnAudibly learning
//! app: speech generation, translation and dubbing through Murf, summaries
//! through Gemini, local PDF text extraction, and a bounded poller for
//! long-running dub jobs.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
