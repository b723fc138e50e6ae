use chrono::{DateTime, Duration, TimeZone, Utc};
use mood_core::playlist::playlist_for;
use mood_core::{
    Classification, ClassifierError, CoreError, Emotion, EmotionClassifier, Pipeline, Post,
    PostSource, RunOutcome, RunRequest, RunState, TwitterApiError,
};
use std::cell::RefCell;
use std::collections::HashMap;

struct FakeSource {
    posts: Vec<Post>,
    fail_with: Option<u16>,
    calls: RefCell<Vec<(String, String, u32)>>,
}

impl FakeSource {
    fn with_posts(texts: &[&str]) -> Self {
        let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let posts = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Post {
                text: text.to_string(),
                created_at: start + Duration::hours(6 * i as i64),
            })
            .collect();
        Self {
            posts,
            fail_with: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn failing(status_code: u16) -> Self {
        Self {
            fail_with: Some(status_code),
            ..Self::with_posts(&[])
        }
    }
}

impl PostSource for FakeSource {
    async fn fetch_recent_posts(
        &self,
        account: &str,
        credential: &str,
        limit: u32,
    ) -> Result<Vec<Post>, CoreError> {
        self.calls
            .borrow_mut()
            .push((account.to_string(), credential.to_string(), limit));
        match self.fail_with {
            Some(status_code) => Err(TwitterApiError::AuthenticationFailed { status_code }.into()),
            None => Ok(self.posts.clone()),
        }
    }
}

/// Labels text by the first keyword it contains.
struct KeywordClassifier {
    labels: HashMap<&'static str, &'static str>,
    seen: RefCell<Vec<String>>,
}

impl KeywordClassifier {
    fn new() -> Self {
        Self {
            labels: HashMap::from([
                ("great", "joy"),
                ("sad", "sadness"),
                ("angry", "anger"),
                ("scared", "fear"),
                ("adore", "love"),
                ("gross", "disgust"),
                ("wow", "surprise"),
                ("crash", "__crash__"),
            ]),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl EmotionClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, CoreError> {
        self.seen.borrow_mut().push(text.to_string());
        let label = self
            .labels
            .iter()
            .find(|(keyword, _)| text.contains(*keyword))
            .map(|(_, label)| *label)
            .unwrap_or("neutral");

        if label == "__crash__" {
            return Err(ClassifierError::InferenceFailed {
                reason: "backend unavailable".to_string(),
            }
            .into());
        }

        Ok(Classification {
            label: label.to_string(),
            confidence: 0.87,
        })
    }
}

fn request() -> RunRequest {
    RunRequest::new("@someone ", "token-123")
}

#[tokio::test]
async fn test_full_run_produces_report() {
    let source = FakeSource::with_posts(&[
        "what a great day https://t.co/x",
        "so sad about this #news",
        "@bob",
        "angry at the traffic",
        "feeling sad again",
    ]);
    let mut pipeline = Pipeline::new(source, KeywordClassifier::new());

    let outcome = pipeline.run(&request()).await.unwrap();
    let report = outcome.report().expect("expected a report");

    assert_eq!(report.posts.len(), 4);
    assert_eq!(report.posts[0].cleaned_text, "what a great day");
    assert_eq!(report.posts[0].emotion, Emotion::Joy);
    assert_eq!(report.posts[1].cleaned_text, "so sad about this");
    assert_eq!(report.distribution.count(Emotion::Sadness), 2);
    // sadness + anger = 3
    assert_eq!(report.predicted_mood, Emotion::Disgust);
    assert_eq!(report.playlist_url, playlist_for(Emotion::Disgust));
    assert_eq!(report.daily.len(), 2);

    assert_eq!(pipeline.state(), RunState::Done);
    assert_eq!(
        pipeline.transitions(),
        &[
            RunState::Idle,
            RunState::Fetching,
            RunState::Processing,
            RunState::Aggregating,
            RunState::Done
        ]
    );
}

#[tokio::test]
async fn test_fetch_parameters() {
    let mut pipeline = Pipeline::new(FakeSource::with_posts(&[]), KeywordClassifier::new())
        .with_batch_size(25);
    pipeline.run(&request()).await.unwrap();

    let mut pipeline_default = Pipeline::new(FakeSource::with_posts(&[]), KeywordClassifier::new());
    pipeline_default.run(&request()).await.unwrap();

    // account and credential are trimmed before they reach the source
    let calls = pipeline_source_calls(&pipeline);
    assert_eq!(calls, vec![("@someone".to_string(), "token-123".to_string(), 25)]);
    let calls = pipeline_source_calls(&pipeline_default);
    assert_eq!(calls[0].2, 10);
}

fn pipeline_source_calls(
    pipeline: &Pipeline<FakeSource, KeywordClassifier>,
) -> Vec<(String, String, u32)> {
    pipeline.source().calls.borrow().clone()
}

#[tokio::test]
async fn test_short_posts_never_classified() {
    let source = FakeSource::with_posts(&["hey", "@alice #tbt http://x.co", "  ok  "]);
    let classifier = KeywordClassifier::new();
    let mut pipeline = Pipeline::new(source, classifier);

    let outcome = pipeline.run(&request()).await.unwrap();

    assert_eq!(outcome, RunOutcome::NoValidData);
    assert!(outcome.report().is_none());
    assert!(pipeline.classifier().seen.borrow().is_empty());
    assert_eq!(pipeline.state(), RunState::Done);
    assert!(!pipeline.transitions().contains(&RunState::Aggregating));
}

#[tokio::test]
async fn test_empty_feed_is_no_valid_data() {
    let mut pipeline = Pipeline::new(FakeSource::with_posts(&[]), KeywordClassifier::new());
    let outcome = pipeline.run(&request()).await.unwrap();
    assert_eq!(outcome, RunOutcome::NoValidData);
}

#[tokio::test]
async fn test_fetch_failure_fails_run() {
    let mut pipeline = Pipeline::new(FakeSource::failing(401), KeywordClassifier::new());
    let result = pipeline.run(&request()).await;

    match result {
        Err(CoreError::TwitterApi(error)) => assert_eq!(error.status_code(), Some(401)),
        other => panic!("Expected a Twitter API error, got {:?}", other),
    }
    assert_eq!(pipeline.state(), RunState::Failed);
    assert_eq!(
        pipeline.transitions(),
        &[RunState::Idle, RunState::Fetching, RunState::Failed]
    );
    assert!(pipeline.classifier().seen.borrow().is_empty());
}

#[tokio::test]
async fn test_classifier_failure_aborts_batch() {
    let source = FakeSource::with_posts(&[
        "a great start",
        "then the crash happened",
        "great recovery though",
    ]);
    let mut pipeline = Pipeline::new(source, KeywordClassifier::new());
    let result = pipeline.run(&request()).await;

    assert!(matches!(
        result,
        Err(CoreError::Inference(ClassifierError::InferenceFailed { .. }))
    ));
    assert_eq!(pipeline.state(), RunState::Failed);
    // nothing after the failing post is attempted
    assert_eq!(pipeline.classifier().seen.borrow().len(), 2);
}

#[tokio::test]
async fn test_unknown_label_is_fatal() {
    let source = FakeSource::with_posts(&["wow did not expect that"]);
    let mut pipeline = Pipeline::new(source, KeywordClassifier::new());

    match pipeline.run(&request()).await {
        Err(CoreError::UnknownEmotion { label }) => assert_eq!(label, "surprise"),
        other => panic!("Expected UnknownEmotion, got {:?}", other),
    }
    assert_eq!(pipeline.state(), RunState::Failed);
}

#[tokio::test]
async fn test_blank_inputs_rejected_before_fetch() {
    let mut pipeline = Pipeline::new(FakeSource::with_posts(&[]), KeywordClassifier::new());

    let result = pipeline.run(&RunRequest::new("   ", "token")).await;
    assert!(matches!(result, Err(CoreError::InvalidInput { .. })));

    let result = pipeline.run(&RunRequest::new("someone", "")).await;
    assert!(matches!(result, Err(CoreError::InvalidInput { .. })));

    assert!(pipeline.source().calls.borrow().is_empty());
    assert_eq!(
        pipeline.transitions(),
        &[RunState::Idle, RunState::Failed]
    );
}

#[tokio::test]
async fn test_history_only_keeps_last_five() {
    // three joys early, then five neutral-ish posts; only the last five count
    let source = FakeSource::with_posts(&[
        "great news",
        "great times",
        "great food",
        "adore this",
        "plain update",
        "another update",
        "more updates",
        "final update",
    ]);
    let mut pipeline = Pipeline::new(source, KeywordClassifier::new());
    let outcome = pipeline.run(&request()).await.unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.posts.len(), 8);
    assert_eq!(report.distribution.count(Emotion::Joy), 3);
    // history is [love, neutral x4]: not all neutral, no venting or joy,
    // last two equal, so the latest mood carries on
    assert_eq!(report.predicted_mood, Emotion::Neutral);
}

#[tokio::test]
async fn test_pipeline_reusable_after_failure() {
    let mut pipeline = Pipeline::new(
        FakeSource::with_posts(&["great stuff today"]),
        KeywordClassifier::new(),
    );
    assert!(pipeline.run(&RunRequest::new("", "x")).await.is_err());
    assert_eq!(pipeline.state(), RunState::Failed);

    let outcome = pipeline.run(&request()).await.unwrap();
    assert_eq!(outcome.report().unwrap().predicted_mood, Emotion::Joy);
    assert_eq!(pipeline.state(), RunState::Done);
}
