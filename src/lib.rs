//! # BookWise
//!
//! A TUI application for AI-generated book summaries and learning
//! recommendations, backed by the Gemini API.
//!
//! ## Features
//!
//! - **Book summaries**: author, summary and key learnings with a glyph each
//! - **Recommendations**: three books, websites and courses for a topic
//! - **Validated replies**: model output is decoded into typed records or rejected
//! - **Independent flows**: each flow owns its state and ignores stale replies

pub mod config;
pub mod display;
pub mod flow;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod ui;

pub use config::Config;
pub use flow::{Flow, FlowController, FlowState, FlowStatus, Recommend, Summarize};
pub use gateway::{GeminiGateway, ModelGateway};
pub use model::{KeyLearning, RecommendationItem, RecommendationSet, SummaryResult};
