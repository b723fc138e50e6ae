pub mod config;
pub mod error;
pub mod error_utils;
pub mod history;
pub mod normalize;
pub mod pipeline;
pub mod playlist;
pub mod predictor;
pub mod report;
pub mod types;

pub use config::AppConfig;
pub use error::*;
pub use error_utils::*;
pub use history::MoodHistory;
pub use pipeline::{EmotionClassifier, Pipeline, PostSource, RunState};
pub use report::{AnalysisReport, DailyEmotionCounts, EmotionDistribution, RunOutcome};
pub use types::*;
