//! Signal detectors
//!
//! Independent passes over the parsed document and its extracted text. Each
//! produces a nested record on [`crate::ExtractedContent`]; scores inside
//! those records are clamped to 0-100 by the detector that computes them.

pub mod ai;
pub mod mobile;
pub mod robots;
pub mod structured_data;
pub mod ux;

pub use ai::AiSignals;
pub use mobile::MobileSignals;
pub use robots::{AccessLevel, RobotsAnalysis, RobotsPolicy, parse_robots_txt};
pub use structured_data::StructuredDataSignals;
pub use ux::UxSignals;
