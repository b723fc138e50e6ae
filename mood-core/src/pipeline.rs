//! The analysis run: fetch, clean, classify, aggregate.
//!
//! A [`Pipeline`] owns its two collaborators and walks one run at a time
//! through [`RunState`]. The fetch and classify steps are reached only
//! through the [`PostSource`] and [`EmotionClassifier`] traits so a run can
//! be driven end to end with stand-ins.

use crate::history::MoodHistory;
use crate::normalize::{is_analyzable, normalize};
use crate::report::{AnalysisReport, RunOutcome};
use crate::{
    Classification, ClassifiedPost, ClassifierError, CoreError, Emotion, ErrorExt, Post,
    RunRequest,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_BATCH_SIZE: u32 = 10;

#[allow(async_fn_in_trait)]
pub trait PostSource {
    async fn fetch_recent_posts(
        &self,
        account: &str,
        credential: &str,
        limit: u32,
    ) -> Result<Vec<Post>, CoreError>;
}

#[allow(async_fn_in_trait)]
pub trait EmotionClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, CoreError>;
}

impl<T: PostSource> PostSource for Arc<T> {
    async fn fetch_recent_posts(
        &self,
        account: &str,
        credential: &str,
        limit: u32,
    ) -> Result<Vec<Post>, CoreError> {
        (**self).fetch_recent_posts(account, credential, limit).await
    }
}

impl<T: EmotionClassifier> EmotionClassifier for Arc<T> {
    async fn classify(&self, text: &str) -> Result<Classification, CoreError> {
        (**self).classify(text).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Processing,
    Aggregating,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Fetching => "fetching",
            RunState::Processing => "processing",
            RunState::Aggregating => "aggregating",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct Pipeline<S, C> {
    source: S,
    classifier: C,
    batch_size: u32,
    state: RunState,
    transitions: Vec<RunState>,
}

impl<S, C> Pipeline<S, C>
where
    S: PostSource,
    C: EmotionClassifier,
{
    pub fn new(source: S, classifier: C) -> Self {
        Self {
            source,
            classifier,
            batch_size: DEFAULT_BATCH_SIZE,
            state: RunState::Idle,
            transitions: vec![RunState::Idle],
        }
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// States visited by the most recent run, starting with `Idle`.
    pub fn transitions(&self) -> &[RunState] {
        &self.transitions
    }

    /// Performs one complete run. Any collaborator error ends the run in
    /// [`RunState::Failed`] and is returned as is; nothing partial is kept.
    pub async fn run(&mut self, request: &RunRequest) -> Result<RunOutcome, CoreError> {
        self.state = RunState::Idle;
        self.transitions = vec![RunState::Idle];

        match self.execute(request).await {
            Ok(outcome) => {
                self.enter(RunState::Done);
                Ok(outcome)
            }
            Err(error) => {
                error.log_error();
                self.enter(RunState::Failed);
                Err(error)
            }
        }
    }

    async fn execute(&mut self, request: &RunRequest) -> Result<RunOutcome, CoreError> {
        let account = request.account.trim();
        if account.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "account handle is empty".to_string(),
            });
        }
        if request.credential.trim().is_empty() {
            return Err(CoreError::InvalidInput {
                message: "bearer token is empty".to_string(),
            });
        }

        self.enter(RunState::Fetching);
        let posts = self
            .source
            .fetch_recent_posts(account, request.credential.trim(), self.batch_size)
            .await?;
        info!("Fetched {} posts for {}", posts.len(), account);

        self.enter(RunState::Processing);
        let mut history = MoodHistory::new();
        let mut table = Vec::with_capacity(posts.len());

        for post in posts {
            let cleaned = normalize(&post.text);
            if !is_analyzable(&cleaned) {
                debug!("Skipping post from {} with too little text", post.created_at);
                continue;
            }

            let classification = self.classifier.classify(&cleaned).await?;
            let (emotion, confidence) = validate(classification)?;
            debug!("Classified post as {} ({:.2})", emotion, confidence);

            history.push(emotion);
            table.push(ClassifiedPost {
                created_at: post.created_at,
                cleaned_text: cleaned,
                emotion,
                confidence,
            });
        }

        if table.is_empty() {
            warn!("No posts for {} survived cleaning", account);
            return Ok(RunOutcome::NoValidData);
        }

        self.enter(RunState::Aggregating);
        debug!(
            "Predicting from the last {} of {} moods",
            history.len(),
            table.len()
        );
        let report = AnalysisReport::build(table, &history).ok_or_else(|| CoreError::Internal {
            message: "classified posts produced no mood history".to_string(),
        })?;
        info!(
            "Analyzed {} posts for {}, recommending {}",
            report.posts.len(),
            account,
            report.predicted_mood
        );

        Ok(RunOutcome::Completed(report))
    }

    fn enter(&mut self, state: RunState) {
        debug!("Run state {} -> {}", self.state, state);
        self.state = state;
        self.transitions.push(state);
        if state.is_terminal() {
            info!(
                "Run {} after {} transitions",
                state,
                self.transitions.len() - 1
            );
        }
    }
}

fn validate(classification: Classification) -> Result<(Emotion, f32), CoreError> {
    let emotion: Emotion = classification.label.parse()?;
    let confidence = classification.confidence;
    if !(0.0..=1.0).contains(&confidence) {
        return Err(ClassifierError::InvalidScore { score: confidence }.into());
    }
    Ok((emotion, confidence))
}
