use iced::theme;
use iced::widget::{
    button, column, container, progress_bar, row, scrollable, text, text_input, Column,
};
use iced::{Color, Command, Element, Length, Theme};
use mood_core::{AnalysisReport, CoreError, RunOutcome, RunRequest};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const NO_DATA_MESSAGE: &str =
    "No tweets found or valid for analysis. Try a different user or token.";

pub type AnalysisFuture = Pin<Box<dyn Future<Output = Result<RunOutcome, String>> + Send>>;

/// Starts one run. Errors arrive already rendered for the user.
pub type Analyzer = Arc<dyn Fn(RunRequest) -> AnalysisFuture + Send + Sync>;

pub type LinkOpener = Arc<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

/// Hands the URL to the desktop's default browser.
pub fn system_browser() -> LinkOpener {
    Arc::new(|url: &str| open::that_detached(url))
}

pub fn analyzer_from_fn<F, Fut>(run: F) -> Analyzer
where
    F: Fn(RunRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<RunOutcome, String>> + Send + 'static,
{
    Arc::new(move |request| -> AnalysisFuture { Box::pin(run(request)) })
}

#[derive(Debug, Clone)]
pub enum Message {
    AccountChanged(String),
    TokenChanged(String),
    AnalyzePressed,
    AnalysisFinished(Result<RunOutcome, String>),
    OpenPlaylist(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Ready,
    Analyzing,
    Finished(RunOutcome),
    Failed(String),
}

pub struct App {
    account: String,
    token: String,
    status: Status,
    analyzer: Analyzer,
    opener: LinkOpener,
}

impl App {
    pub fn new(account: impl Into<String>, token: Option<String>, analyzer: Analyzer) -> Self {
        Self {
            account: account.into(),
            token: token.unwrap_or_default(),
            status: Status::Ready,
            analyzer,
            opener: system_browser(),
        }
    }

    pub fn with_link_opener(mut self, opener: LinkOpener) -> Self {
        self.opener = opener;
        self
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status == Status::Analyzing
    }

    pub fn update(&mut self, message: Message) -> Result<Command<Message>, CoreError> {
        match message {
            Message::AccountChanged(account) => {
                self.account = account;
                Ok(Command::none())
            }
            Message::TokenChanged(token) => {
                self.token = token;
                Ok(Command::none())
            }
            Message::AnalyzePressed => {
                if self.is_busy() {
                    debug!("Analysis already running, ignoring trigger");
                    return Ok(Command::none());
                }

                if self.account.trim().is_empty() || self.token.trim().is_empty() {
                    let message = "Please enter both a Twitter handle and a bearer token.";
                    self.status = Status::Failed(message.to_string());
                    return Err(CoreError::InvalidInput {
                        message: message.to_string(),
                    });
                }

                info!("Starting analysis for {}", self.account.trim());
                self.status = Status::Analyzing;
                let request = RunRequest::new(self.account.clone(), self.token.clone());
                Ok(Command::perform(
                    (self.analyzer)(request),
                    Message::AnalysisFinished,
                ))
            }
            Message::AnalysisFinished(result) => {
                self.status = match result {
                    Ok(outcome) => {
                        if outcome == RunOutcome::NoValidData {
                            warn!("Analysis finished without usable posts");
                        }
                        Status::Finished(outcome)
                    }
                    Err(message) => Status::Failed(message),
                };
                Ok(Command::none())
            }
            Message::OpenPlaylist(url) => {
                info!("Opening playlist {}", url);
                (self.opener)(&url)?;
                Ok(Command::none())
            }
        }
    }

    pub fn view(&self) -> Element<Message, Theme> {
        let title: Element<Message, Theme> =
            text("AI DJ: Real-Time Mood Analyzer").size(28).into();

        let account_input = text_input("Twitter handle", &self.account)
            .on_input(Message::AccountChanged)
            .padding(8);
        let token_input = text_input("Bearer token", &self.token)
            .on_input(Message::TokenChanged)
            .on_submit(Message::AnalyzePressed)
            .secure(true)
            .padding(8);

        let label = if self.is_busy() {
            "Analyzing..."
        } else {
            "Analyze Now"
        };
        let mut analyze = button(text(label)).padding(10);
        if !self.is_busy() {
            analyze = analyze.on_press(Message::AnalyzePressed);
        }

        let form = column![account_input, token_input, analyze].spacing(10);

        let body: Element<Message, Theme> = match &self.status {
            Status::Ready => text("Enter a handle and token, then press Analyze Now.")
                .size(14)
                .into(),
            Status::Analyzing => text("Analyzing...").size(16).into(),
            Status::Failed(message) => text(message)
                .style(theme::Text::Color(Color::from_rgb(0.8, 0.2, 0.2)))
                .into(),
            Status::Finished(RunOutcome::NoValidData) => text(NO_DATA_MESSAGE)
                .style(theme::Text::Color(Color::from_rgb(0.8, 0.6, 0.1)))
                .into(),
            Status::Finished(RunOutcome::Completed(report)) => report_view(report),
        };

        let main_content: Element<Message, Theme> =
            column![title, form, body].spacing(20).padding(20).into();

        container(scrollable(main_content))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn cell<'a>(content: impl ToString, width: f32) -> Element<'a, Message, Theme> {
    text(content).size(14).width(Length::Fixed(width)).into()
}

fn report_view(report: &AnalysisReport) -> Element<'_, Message, Theme> {
    let header = row![
        cell("Time", 170.0),
        cell("Emotion", 90.0),
        cell("Conf", 60.0),
        cell("Tweet", 500.0),
    ]
    .spacing(10);
    let mut posts = Column::new().spacing(4).push(header);
    for post in &report.posts {
        posts = posts.push(
            row![
                cell(post.created_at.format("%Y-%m-%d %H:%M"), 170.0),
                cell(post.emotion, 90.0),
                cell(format!("{:.2}", post.confidence), 60.0),
                cell(&post.cleaned_text, 500.0),
            ]
            .spacing(10),
        );
    }

    let mut distribution = Column::new().spacing(6);
    for (emotion, count) in report.distribution.entries() {
        let share = report.distribution.share(emotion) as f32;
        distribution = distribution.push(
            row![
                cell(emotion, 90.0),
                progress_bar(0.0..=1.0, share)
                    .width(Length::Fixed(240.0))
                    .height(Length::Fixed(14.0)),
                cell(format!("{:.1}% ({})", share * 100.0, count), 120.0),
            ]
            .spacing(10),
        );
    }

    let mut daily = Column::new().spacing(4);
    if let Some(first) = report.daily.first() {
        let mut header = row![cell("Day", 110.0)].spacing(10);
        for emotion in first.counts.keys() {
            header = header.push(cell(emotion, 70.0));
        }
        daily = daily.push(header);
    }
    for day in &report.daily {
        let mut line = row![cell(day.date, 110.0)].spacing(10);
        for count in day.counts.values() {
            line = line.push(cell(count, 70.0));
        }
        daily = daily.push(line);
    }

    column![
        text("Analyzed Tweets").size(20),
        posts,
        text("Emotion Distribution").size(20),
        distribution,
        text("Emotion Over Time").size(20),
        daily,
        text(format!(
            "Recommended Mood: {}",
            report.predicted_mood.as_str().to_uppercase()
        ))
        .size(22)
        .style(theme::Text::Color(Color::from_rgb(0.1, 0.6, 0.3))),
        button(text(format!("Listen on Spotify: {}", report.playlist_url)).size(16))
            .style(theme::Button::Text)
            .on_press(Message::OpenPlaylist(report.playlist_url.to_string())),
    ]
    .spacing(12)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mood_core::{ClassifiedPost, Emotion, MoodHistory};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn counting_analyzer(calls: Arc<AtomicUsize>) -> Analyzer {
        analyzer_from_fn(move |_request| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(RunOutcome::NoValidData) }
        })
    }

    fn sample_report() -> AnalysisReport {
        let posts = vec![
            ClassifiedPost {
                created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
                cleaned_text: "what a great day".to_string(),
                emotion: Emotion::Joy,
                confidence: 0.94,
            },
            ClassifiedPost {
                created_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap(),
                cleaned_text: "feeling low".to_string(),
                emotion: Emotion::Sadness,
                confidence: 0.61,
            },
        ];
        let mut history = MoodHistory::new();
        for post in &posts {
            history.push(post.emotion);
        }
        AnalysisReport::build(posts, &history).unwrap()
    }

    #[test]
    fn test_inputs_prefilled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = App::new("elonmusk", Some("secret".to_string()), counting_analyzer(calls));
        assert_eq!(app.account, "elonmusk");
        assert_eq!(app.token, "secret");
        assert_eq!(app.status(), &Status::Ready);
    }

    #[test]
    fn test_trigger_ignored_while_running() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = App::new("nasa", Some("token".to_string()), counting_analyzer(calls.clone()));

        app.update(Message::AnalyzePressed).unwrap();
        assert!(app.is_busy());
        app.update(Message::AnalyzePressed).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        app.update(Message::AnalysisFinished(Ok(RunOutcome::NoValidData)))
            .unwrap();
        assert!(!app.is_busy());
        assert_eq!(app.status(), &Status::Finished(RunOutcome::NoValidData));

        app.update(Message::AnalyzePressed).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_blank_inputs_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = App::new("nasa", None, counting_analyzer(calls.clone()));

        let result = app.update(Message::AnalyzePressed);
        assert!(matches!(result, Err(CoreError::InvalidInput { .. })));
        assert!(matches!(app.status(), Status::Failed(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        app.update(Message::TokenChanged("token".to_string())).unwrap();
        app.update(Message::AccountChanged("  ".to_string())).unwrap();
        assert!(app.update(Message::AnalyzePressed).is_err());
    }

    #[test]
    fn test_failure_replaces_previous_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = App::new("nasa", Some("token".to_string()), counting_analyzer(calls));

        app.update(Message::AnalysisFinished(Ok(RunOutcome::Completed(
            sample_report(),
        ))))
        .unwrap();
        assert!(matches!(app.status(), Status::Finished(RunOutcome::Completed(_))));

        app.update(Message::AnalysisFinished(Err(
            "Twitter API Error: 401".to_string(),
        )))
        .unwrap();
        assert_eq!(
            app.status(),
            &Status::Failed("Twitter API Error: 401".to_string())
        );
    }

    #[test]
    fn test_playlist_link_opens_in_browser() {
        let calls = Arc::new(AtomicUsize::new(0));
        let opened = Arc::new(Mutex::new(Vec::new()));
        let seen = opened.clone();
        let mut app = App::new("nasa", Some("token".to_string()), counting_analyzer(calls))
            .with_link_opener(Arc::new(move |url: &str| {
                seen.lock().unwrap().push(url.to_string());
                Ok(())
            }));

        let url = sample_report().playlist_url.to_string();
        app.update(Message::OpenPlaylist(url.clone())).unwrap();
        assert_eq!(*opened.lock().unwrap(), vec![url]);
    }

    #[test]
    fn test_playlist_link_failure_is_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = App::new("nasa", Some("token".to_string()), counting_analyzer(calls))
            .with_link_opener(Arc::new(|_url: &str| {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"))
            }));

        let result = app.update(Message::OpenPlaylist("https://open.spotify.com".to_string()));
        assert!(matches!(result, Err(CoreError::Io(_))));
        assert_eq!(app.status(), &Status::Ready);
    }

    #[test]
    fn test_views_build_for_every_status() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut app = App::new("nasa", Some("token".to_string()), counting_analyzer(calls));
        let _ = app.view();

        app.update(Message::AnalysisFinished(Ok(RunOutcome::Completed(
            sample_report(),
        ))))
        .unwrap();
        let _ = app.view();

        app.update(Message::AnalysisFinished(Err("boom".to_string())))
            .unwrap();
        let _ = app.view();
    }
}
