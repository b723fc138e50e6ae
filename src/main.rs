use emotion_engine::EmotionModel;
use gui::{analyzer_from_fn, Analyzer, App};
use iced::{Application, Settings};
use mood_core::{AppConfig, CoreError, ErrorExt, ErrorReporter, Pipeline};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use twitter_client::TwitterClient;

const DEFAULT_LOG_FILTER: &str =
    "mood_dj=debug,mood_core=debug,twitter_client=info,emotion_engine=info,gui=debug";

fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("Starting Mood DJ - Tweet Mood Analyzer");

    let reporter = ErrorReporter::new();
    let config = AppConfig::load().inspect_err(|e| reporter.report_error(e))?;
    let analyzer = build_analyzer(&config).inspect_err(|e| reporter.report_error(e))?;

    let settings = Settings {
        window: iced::window::Settings {
            size: iced::Size::new(1200.0, 800.0),
            min_size: Some(iced::Size::new(800.0, 600.0)),
            ..Default::default()
        },
        ..Settings::with_flags(App::new(
            config.default_account.clone(),
            config.bearer_token.clone(),
            analyzer,
        ))
    };

    MoodDjApp::run(settings).map_err(|e| {
        tracing::error!("Application error: {}", e);
        CoreError::Internal {
            message: format!("GUI error: {e}"),
        }
    })
}

/// Wires the Twitter client and the local model into one run per request.
fn build_analyzer(config: &AppConfig) -> Result<Analyzer, CoreError> {
    let source = TwitterClient::from_config(config)?;
    let classifier = Arc::new(EmotionModel::load(&config.model_dir)?);
    let batch_size = config.max_results;

    Ok(analyzer_from_fn(move |request| {
        let mut pipeline =
            Pipeline::new(source.clone(), Arc::clone(&classifier)).with_batch_size(batch_size);
        async move {
            pipeline
                .run(&request)
                .await
                .map_err(|e| e.user_friendly_message())
        }
    }))
}

struct MoodDjApp {
    app: App,
    reporter: ErrorReporter,
}

impl Application for MoodDjApp {
    type Message = gui::Message;
    type Theme = iced::Theme;
    type Executor = iced::executor::Default;
    type Flags = App;

    fn new(flags: Self::Flags) -> (Self, iced::Command<Self::Message>) {
        tracing::info!("Initializing application");
        (
            Self {
                app: flags,
                reporter: ErrorReporter::new(),
            },
            iced::Command::none(),
        )
    }

    fn title(&self) -> String {
        "Mood DJ - Tweet Mood Analyzer".to_string()
    }

    fn update(&mut self, message: Self::Message) -> iced::Command<Self::Message> {
        match self.app.update(message) {
            Ok(command) => command,
            Err(e) => {
                self.reporter.report_warning(&e);
                iced::Command::none()
            }
        }
    }

    fn view(&self) -> iced::Element<Self::Message> {
        self.app.view()
    }
}
