//! LLM Service Module
//!
//! Completion capability used by the error pipeline and the dashboard analytics.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────┐
//! │  CompletionService  │  ← Trait (injected into processors/services)
//! └──────────┬──────────┘
//!            │
//!      ┌─────┴─────┐
//!      ▼           ▼
//! ┌─────────┐  ┌──────────┐
//! │LLMClient│  │ Test     │
//! │(OpenAI) │  │ Fakes    │
//! └─────────┘  └──────────┘
//! ```
//!
//! # Supported Scenarios
//! - Error solution (consumption pipeline, cached)
//! - Error summary (dashboard, on demand)
//! - Trend analysis (dashboard, on demand)

mod client;
mod models;
mod scenarios;
mod service;

pub use client::LLMClient;
pub use models::*;
pub use scenarios::LLMScenario;
pub use service::CompletionService;
