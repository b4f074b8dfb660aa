//! Kesit Core Library
//!
//! Finds the most shareable moments of a YouTube video by asking Gemini (with Google
//! Search grounding) for clip suggestions, validates the model's answer and drives the
//! analysis session shown to the user.

pub mod analyzer;
pub mod delay;
pub mod error;
pub mod format;
pub mod link;
pub mod prompt;
pub mod provider;
pub mod report;
pub mod response;
pub mod session;
pub mod types;

// Re-export commonly used items at crate root
pub use analyzer::{ClipAnalyzer, GeminiAnalyzer};
pub use delay::{Delay, NoDelay, SIMULATED_DWELL, TokioDelay};
pub use error::{ExternalServiceError, KesitError, ResponseFormatError, Result};
pub use format::{format_clip_duration, format_clip_range, format_result_readable, format_timestamp};
pub use link::{embed_url, extract_video_id};
pub use provider::ProviderConfig;
pub use report::{REPORT_FILE_NAME, format_report, save_report};
pub use session::Session;
pub use types::{AnalysisResult, Clip, ClipValue, SessionPhase, VideoReference, field_text};
