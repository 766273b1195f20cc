//! LCA Advisory - narrative insights and quick tips
//!
//! Wraps a remote generative text service behind [`TextGenerator`]:
//! - [`Advisor`] builds prompts from scored results and shapes the replies
//! - [`GeminiClient`] speaks the `generateContent` REST API
//! - [`AdvisorySlot`] keeps only the newest response per subject
//!
//! Failures never affect scoring; they surface as [`AdvisoryError`] with a
//! user-safe fallback message.

#![warn(unreachable_pub)]

pub mod advisor;
pub mod contract;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod slot;

pub use advisor::{Advisor, DEFAULT_INSIGHTS_MODEL, DEFAULT_TIPS_MODEL};
pub use contract::{
    AdvisoryFailure, AdvisoryRequest, Insights, InsightsResponse, QuickTips, SuggestionsResponse,
    TipsRequest, TIP_COUNT,
};
pub use error::{AdvisoryError, FALLBACK_MESSAGE};
pub use generator::{GeminiClient, GenerationSettings, TextGenerator, DEFAULT_BASE_URL};
pub use slot::{AdvisorySlot, Completion, Ticket};
