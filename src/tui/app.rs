//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Provider-bound jobs via background workers

use std::io;
use std::sync::mpsc::{Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::http::HttpClient;
use crate::adapters::open_meteo::OpenMeteoClient;
use crate::adapters::openrouter::OpenRouterClient;
use crate::adapters::sqlite::{SqliteProfileStore, StorageError};
use crate::adapters::unsplash::UnsplashClient;
use crate::application::{
    resolve_location, AdviceChatService, ChatOutcome, ClothingService, DashboardService,
};
use crate::config::AppConfig;
use crate::domain::{LocationChange, UserProfile};
use crate::ports::{AirQualityProvider, Geocoder, ProfileStore, WeatherProvider};
use crate::AtmosguardError;

use super::ui::{
    chat::{render_chat, ChatState},
    clothing::{render_clothing, ClothingState},
    dashboard::{render_dashboard, DashboardState},
    profile::{render_profile_form, ProfileFormState, ProfileSubmission},
    render_disclaimer,
};
use super::worker::{Worker, WorkerEvent, WorkerHandle};

type Store = SqliteProfileStore;
type Meteo = OpenMeteoClient;
type Generator = OpenRouterClient;
type Images = UnsplashClient;

type Dashboards = DashboardService<Store, Meteo, Meteo>;

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Profile,
    Clothing,
    Chat,
}

/// What the running worker is doing, so its errors land on the right screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    Dashboard,
    SaveProfile,
    Clothing,
    Chat,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,

    dashboards: Arc<Dashboards>,
    clothing: Arc<ClothingService<Generator, Images>>,
    chat: Arc<AdviceChatService<Generator>>,
    geocoder: Arc<Meteo>,

    /// The active profile
    profile: UserProfile,

    dashboard_state: DashboardState,
    profile_form_state: ProfileFormState,
    clothing_state: ClothingState,
    chat_state: ChatState,

    /// Pending worker (if running)
    pending: Option<(Job, WorkerHandle)>,
}

impl App {
    /// Create a new application instance from configuration.
    ///
    /// Opens the profile store, builds the provider clients with their
    /// per-call timeouts and opens the configured profile.
    ///
    /// # Errors
    /// Returns error if storage or an HTTP client cannot be initialized, or
    /// if a configured profile ID does not exist.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(SqliteProfileStore::new(&config.db_path)?);

        let meteo = Arc::new(OpenMeteoClient::new(HttpClient::new(config.weather_timeout)?));
        let generator = Arc::new(OpenRouterClient::new(
            HttpClient::new(config.generation_timeout)?,
            config.openrouter_api_key.clone(),
            &config.openrouter_base_url,
            &config.chat_model,
        ));
        let images = Arc::new(UnsplashClient::new(
            HttpClient::new(config.image_timeout)?,
            config.unsplash_access_key.clone(),
        ));

        if !config.generation_enabled() {
            tracing::info!("No generation key configured, advice will be rule-based");
        }

        let dashboards = Arc::new(DashboardService::new(store, meteo.clone(), meteo.clone()));
        let profile = dashboards.open_profile(config.profile_id.as_deref())?;
        tracing::info!("Opened profile {}", profile.id);

        Ok(Self::with_dependencies(
            dashboards,
            Arc::new(ClothingService::new(generator.clone(), images)),
            Arc::new(AdviceChatService::new(generator)),
            meteo,
            profile,
        ))
    }

    /// Create application with injected dependencies (Composition Root pattern).
    pub fn with_dependencies(
        dashboards: Arc<Dashboards>,
        clothing: Arc<ClothingService<Generator, Images>>,
        chat: Arc<AdviceChatService<Generator>>,
        geocoder: Arc<Meteo>,
        profile: UserProfile,
    ) -> Self {
        // New profiles start on the onboarding form.
        let screen = if profile.onboarding_completed {
            Screen::Dashboard
        } else {
            Screen::Profile
        };
        Self {
            screen,
            should_quit: false,
            dashboards,
            clothing,
            chat,
            geocoder,
            profile_form_state: ProfileFormState::from_profile(&profile),
            profile,
            dashboard_state: DashboardState::default(),
            clothing_state: ClothingState::default(),
            chat_state: ChatState::default(),
            pending: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.refresh_dashboard();

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Dashboard => render_dashboard(f, chunks[0], &self.dashboard_state),
                    Screen::Profile => render_profile_form(f, chunks[0], &self.profile_form_state),
                    Screen::Clothing => render_clothing(f, chunks[0], &self.clothing_state),
                    Screen::Chat => render_chat(f, chunks[0], &self.chat_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Start `job` unless another one is still running.
    fn start<F>(&mut self, job: Job, work: F) -> bool
    where
        F: FnOnce(&Sender<WorkerEvent>) + Send + 'static,
    {
        if self.pending.is_some() {
            tracing::debug!("Worker busy, ignoring {:?} request", job);
            return false;
        }
        self.pending = Some((job, Worker::spawn(work)));
        true
    }

    /// Drain worker events into screen state.
    fn poll_worker(&mut self) {
        let mut refresh_after = false;

        loop {
            let Some((job, handle)) = self.pending.as_ref() else {
                break;
            };
            let job = *job;
            let event = match handle.events_rx.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // The job ended without a final event (it panicked).
                    tracing::error!("{:?} worker stopped unexpectedly", job);
                    self.pending = None;
                    self.fail(job, vec!["Something went wrong. Please try again.".to_string()]);
                    break;
                }
            };

            match event {
                WorkerEvent::ChatChunk(chunk) => {
                    self.chat_state.push_chunk(&chunk);
                    continue;
                }
                WorkerEvent::Dashboard(dashboard) => {
                    self.profile = dashboard.user.clone();
                    self.dashboard_state.dashboard = Some(*dashboard);
                    self.dashboard_state.loading = false;
                    self.dashboard_state.error = None;
                }
                WorkerEvent::Profile(profile) => {
                    self.profile = *profile;
                    self.profile_form_state = ProfileFormState::from_profile(&self.profile);
                    self.screen = Screen::Dashboard;
                    refresh_after = true;
                }
                WorkerEvent::Clothing { advice, conditions } => {
                    self.clothing_state = ClothingState::Ready { advice, conditions };
                }
                WorkerEvent::ChatDone(outcome) => match outcome {
                    ChatOutcome::Completed(text) => self.chat_state.finish_reply(&text),
                    ChatOutcome::Failed { .. } => self.chat_state.end_stream(),
                },
                WorkerEvent::Advice(advice) => {
                    let text = format!(
                        "UV {:.1} ({}) in {}\n{}",
                        advice.uv_index, advice.risk_level, advice.location, advice.advice
                    );
                    self.chat_state.finish_reply(&text);
                }
                WorkerEvent::Error(messages) => self.fail(job, messages),
            }
            self.pending = None;
        }

        if refresh_after {
            self.refresh_dashboard();
        }
    }

    fn fail(&mut self, job: Job, messages: Vec<String>) {
        let message = messages.join(", ");
        match job {
            Job::Dashboard => {
                self.dashboard_state.loading = false;
                self.dashboard_state.error = Some(message);
            }
            Job::SaveProfile => {
                self.profile_form_state.saving = false;
                self.profile_form_state.error_message = Some(message);
            }
            Job::Clothing => self.clothing_state = ClothingState::Error { message },
            Job::Chat => self.chat_state.fail(message),
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Profile => self.handle_profile_key(key),
            Screen::Clothing => self.handle_clothing_key(key),
            Screen::Chat => self.handle_chat_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.profile_form_state = ProfileFormState::from_profile(&self.profile);
                self.screen = Screen::Profile;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.screen = Screen::Clothing;
                if !matches!(self.clothing_state, ClothingState::Ready { .. }) {
                    self.request_clothing();
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.screen = Screen::Chat;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_dashboard(),
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_profile_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up => self.profile_form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.profile_form_state.next_field(),
            KeyCode::Char(c) => self.profile_form_state.input_char(c),
            KeyCode::Backspace => self.profile_form_state.delete_char(),
            KeyCode::Delete => self.profile_form_state.clear_field(),
            KeyCode::Enter => self.submit_profile_form(),
            _ => {}
        }
    }

    fn handle_clothing_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_clothing(),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Enter => self.send_chat(),
            KeyCode::Tab => self.request_advice(),
            KeyCode::Char(c) => self.chat_state.input_char(c),
            KeyCode::Backspace => self.chat_state.delete_char(),
            _ => {}
        }
    }

    fn refresh_dashboard(&mut self) {
        let dashboards = Arc::clone(&self.dashboards);
        let profile = self.profile.clone();
        let started = self.start(Job::Dashboard, move |tx| {
            let dashboard = dashboards.dashboard_for(profile);
            let _ = tx.send(WorkerEvent::Dashboard(Box::new(dashboard)));
        });
        if started {
            self.dashboard_state.loading = true;
        }
    }

    fn submit_profile_form(&mut self) {
        let submission = match self.profile_form_state.to_submission() {
            Ok(s) => s,
            Err(e) => {
                self.profile_form_state.error_message = Some(e);
                return;
            }
        };

        let dashboards = Arc::clone(&self.dashboards);
        let geocoder = Arc::clone(&self.geocoder);
        let id = self.profile.id.clone();
        let started = self.start(Job::SaveProfile, move |tx| {
            let event = match save_profile(dashboards.as_ref(), geocoder.as_ref(), &id, submission)
            {
                Ok(profile) => WorkerEvent::Profile(Box::new(profile)),
                Err(e) => {
                    tracing::warn!("Profile save failed: {}", e);
                    WorkerEvent::Error(e.user_messages())
                }
            };
            let _ = tx.send(event);
        });
        if started {
            self.profile_form_state.saving = true;
            self.profile_form_state.error_message = None;
        }
    }

    fn request_clothing(&mut self) {
        let dashboards = Arc::clone(&self.dashboards);
        let clothing = Arc::clone(&self.clothing);
        let profile = self.profile.clone();
        let started = self.start(Job::Clothing, move |tx| {
            let conditions = dashboards.conditions_for(&profile);
            let advice = clothing.recommend_with_images(&profile, &conditions);
            let _ = tx.send(WorkerEvent::Clothing {
                advice: Box::new(advice),
                conditions: Box::new(conditions),
            });
        });
        if started {
            self.clothing_state = ClothingState::Loading;
        }
    }

    fn send_chat(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(input) = self.chat_state.submit() else {
            return;
        };

        let dashboards = Arc::clone(&self.dashboards);
        let chat = Arc::clone(&self.chat);
        let profile = self.profile.clone();
        self.start(Job::Chat, move |tx| {
            let conditions = profile
                .preferred_location
                .is_some()
                .then(|| dashboards.conditions_for(&profile));
            let outcome = chat.stream_reply(&profile, conditions.as_ref(), &input, &mut |chunk: &str| {
                let _ = tx.send(WorkerEvent::ChatChunk(chunk.to_string()));
            });
            let _ = tx.send(WorkerEvent::ChatDone(outcome));
        });
    }

    fn request_advice(&mut self) {
        let dashboards = Arc::clone(&self.dashboards);
        let chat = Arc::clone(&self.chat);
        let profile = self.profile.clone();
        let started = self.start(Job::Chat, move |tx| {
            let conditions = dashboards.conditions_for(&profile);
            let event = match chat.personalized_advice(&profile, &conditions) {
                Ok(advice) => WorkerEvent::Advice(Box::new(advice)),
                Err(e) => WorkerEvent::Error(e.user_messages()),
            };
            let _ = tx.send(event);
        });
        if started {
            self.chat_state.begin_reply();
        }
    }
}

/// Apply a submitted profile form: geocode a changed city, complete
/// onboarding if needed, then apply the update.
fn save_profile<S, W, A, G>(
    dashboards: &DashboardService<S, W, A>,
    geocoder: &G,
    id: &str,
    submission: ProfileSubmission,
) -> Result<UserProfile, AtmosguardError>
where
    S: ProfileStore,
    S::Error: Into<StorageError>,
    W: WeatherProvider,
    A: AirQualityProvider,
    G: Geocoder,
{
    let ProfileSubmission {
        onboarding,
        mut update,
        city,
    } = submission;

    let location = match city {
        Some(name) => Some(resolve_location(geocoder, &name)?),
        None => None,
    };

    if let Some(mut request) = onboarding {
        request.location = location.clone();
        dashboards.complete_onboarding(id, &request)?;
    }

    if let Some(location) = location {
        update.location = Some(LocationChange::Set(location));
    }
    dashboards.update_profile(id, &update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AirQualityReading, Location, WeatherReading};
    use crate::ports::ProviderError;

    struct NoWeather;

    impl WeatherProvider for NoWeather {
        fn current_weather(&self, _lat: f64, _lon: f64) -> Result<WeatherReading, ProviderError> {
            Err(ProviderError::Timeout(10))
        }
    }

    impl AirQualityProvider for NoWeather {
        fn current_air_quality(
            &self,
            _lat: f64,
            _lon: f64,
        ) -> Result<AirQualityReading, ProviderError> {
            Err(ProviderError::Timeout(10))
        }
    }

    struct Lisbon;

    impl Geocoder for Lisbon {
        fn geocode(&self, name: &str) -> Result<Location, ProviderError> {
            if name.eq_ignore_ascii_case("lisbon") {
                Ok(Location::new("Lisbon", 38.72, -9.14))
            } else {
                Err(ProviderError::NoResults(name.to_string()))
            }
        }
    }

    fn service() -> DashboardService<SqliteProfileStore, NoWeather, NoWeather> {
        let store = Arc::new(SqliteProfileStore::in_memory().expect("Should open store"));
        DashboardService::new(store, Arc::new(NoWeather), Arc::new(NoWeather))
    }

    fn filled_form(profile: &UserProfile, city: &str) -> ProfileFormState {
        let mut state = ProfileFormState::from_profile(profile);
        for (index, value) in [(1, "41"), (2, "III"), (3, "normal"), (5, city)] {
            state.fields[index].value = value.to_string();
        }
        state
    }

    #[test]
    fn test_save_profile_onboards_with_geocoded_city() {
        let svc = service();
        let profile = svc.create_profile("Rui").expect("Should create");
        let submission = filled_form(&profile, "lisbon")
            .to_submission()
            .expect("Should build");

        let saved = save_profile(&svc, &Lisbon, &profile.id, submission).expect("Should save");

        assert!(saved.onboarding_completed);
        let location = saved.preferred_location.expect("Should have location");
        assert_eq!(location.name, "Lisbon");
    }

    #[test]
    fn test_unknown_city_saves_nothing() {
        let svc = service();
        let profile = svc.create_profile("Rui").expect("Should create");
        let submission = filled_form(&profile, "Atlantis")
            .to_submission()
            .expect("Should build");

        let err = save_profile(&svc, &Lisbon, &profile.id, submission)
            .expect_err("Should fail lookup");
        assert!(matches!(err, AtmosguardError::Provider(ProviderError::NoResults(_))));

        let stored = svc.profile(&profile.id).expect("Should load");
        assert!(!stored.onboarding_completed);
    }

    #[test]
    fn test_incomplete_onboarding_is_rejected() {
        let svc = service();
        let profile = svc.create_profile("Rui").expect("Should create");
        let submission = ProfileFormState::from_profile(&profile)
            .to_submission()
            .expect("Should build");

        let err = save_profile(&svc, &Lisbon, &profile.id, submission)
            .expect_err("Should fail validation");
        assert!(matches!(err, AtmosguardError::Validation(_)));
    }
}
