//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration
//! - Background analysis via the worker thread

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
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
use zeroize::Zeroize;

use crate::adapters::EnsembleClassifier;
use crate::application::AssessmentService;
use crate::config::AppConfig;
use crate::domain::{Condition, StudentProfile};
use crate::ports::Classifier;

use super::ui::{
    analysis::{render_analysis, AnalysisState},
    home::{render_home, HomeState},
    profile::{render_profile_form, ProfileFormState},
    questionnaire::{render_questionnaire, QuestionnaireState},
    render_disclaimer,
};
use super::worker::{AnalysisProgress, AnalysisWorker, AnalysisWorkerHandle};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Profile,
    Questionnaire,
    Analysis,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,
    config: AppConfig,
    service: Arc<AssessmentService<EnsembleClassifier>>,
    home_state: HomeState,
    profile_state: ProfileFormState,
    questionnaire_state: QuestionnaireState,
    analysis_state: AnalysisState,

    /// Pending analysis worker (if running)
    pending_worker: Option<AnalysisWorkerHandle>,

    /// Profile the shown result was computed from, kept for report export
    report_profile: Option<StudentProfile>,

    /// When the current stage started (for UI animation)
    stage_started_at: Option<Instant>,
}

impl App {
    /// Load the model named by `config` and build the application.
    ///
    /// # Errors
    /// Returns error if the model cannot be found, verified or parsed.
    pub fn new(config: AppConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set MINDSCREEN_MODEL_PATH to a directory containing model.json.",
                config.model_path
            ));
        }

        // Refuse to start without a model that loads and verifies.
        let model = EnsembleClassifier::load(&config.model_path, &config.integrity)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", config.model_path, e))?;

        let service = Arc::new(AssessmentService::new(
            Arc::new(model),
            config.minimal_policy,
        ));

        Ok(Self::with_service(service, config))
    }

    /// Create the application around an already-loaded service.
    #[must_use]
    pub fn with_service(
        service: Arc<AssessmentService<EnsembleClassifier>>,
        config: AppConfig,
    ) -> Self {
        let model = service.classifier();
        let home_state = HomeState {
            model_source: model.source().display().to_string(),
            feature_count: model.schema().len(),
            conditions: Condition::ALL
                .iter()
                .filter(|c| model.decoder(**c).is_some())
                .map(Condition::name)
                .collect(),
            manifest_serial: model.manifest().map(|m| m.serial),
            policy: service.policy(),
            completed: 0,
        };

        Self {
            screen: Screen::Home,
            should_quit: false,
            config,
            service,
            home_state,
            profile_state: ProfileFormState::default(),
            questionnaire_state: QuestionnaireState::default(),
            analysis_state: AnalysisState::default(),
            pending_worker: None,
            report_profile: None,
            stage_started_at: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        self.reset_session();
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();
            self.tick_progress();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                match self.screen {
                    Screen::Home => render_home(f, content_area, &self.home_state),
                    Screen::Profile => render_profile_form(f, content_area, &self.profile_state),
                    Screen::Questionnaire => {
                        render_questionnaire(f, content_area, &self.questionnaire_state)
                    }
                    Screen::Analysis => render_analysis(f, content_area, &self.analysis_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            // Short poll to stay responsive
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

    /// Drain progress messages from the background worker.
    fn poll_worker(&mut self) {
        while let Some(progress) = self
            .pending_worker
            .as_ref()
            .and_then(AnalysisWorkerHandle::try_recv)
        {
            let fraction = progress.fraction();
            let done = progress.is_terminal();
            match progress {
                AnalysisProgress::BuildingRow => self.set_stage("Building feature row", fraction),
                AnalysisProgress::Predicting => self.set_stage("Running ensemble", fraction),
                AnalysisProgress::Interpreting => self.set_stage("Interpreting results", fraction),
                AnalysisProgress::Complete(assessment) => {
                    self.home_state.completed += 1;
                    self.analysis_state = AnalysisState::Complete {
                        assessment,
                        saved_to: None,
                        save_error: None,
                    };
                }
                AnalysisProgress::Error(message) => {
                    self.analysis_state = AnalysisState::Error { message };
                }
            }
            if done {
                self.finish_worker();
                break;
            }
        }
    }

    fn finish_worker(&mut self) {
        self.pending_worker = None;
        self.stage_started_at = None;
    }

    fn set_stage(&mut self, stage: &'static str, floor: f64) {
        let current = match &self.analysis_state {
            AnalysisState::Running { progress, .. } => *progress,
            _ => 0.0,
        };
        self.analysis_state = AnalysisState::Running {
            stage,
            progress: current.max(floor),
        };
        self.stage_started_at = Some(Instant::now());
    }

    /// Ease the gauge toward 95% while the worker has not reported back.
    fn tick_progress(&mut self) {
        if self.pending_worker.is_none() {
            return;
        }
        let Some(started_at) = self.stage_started_at else {
            return;
        };
        let AnalysisState::Running { progress, .. } = &mut self.analysis_state else {
            return;
        };

        let elapsed = started_at.elapsed().as_secs_f64();
        let target = 0.95;
        let step = (target - *progress) * (1.0 - (-elapsed / 2.0).exp());
        *progress = (*progress + step.max(0.0) * 0.1).min(target);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Profile => self.handle_profile_key(key),
            Screen::Questionnaire => self.handle_questionnaire_key(key),
            Screen::Analysis => self.handle_analysis_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('p' | 'P') => self.screen = Screen::Profile,
            KeyCode::Char('a' | 'A') => self.open_questionnaire(),
            KeyCode::Char('v' | 'V') => {
                if !matches!(self.analysis_state, AnalysisState::Idle) {
                    self.screen = Screen::Analysis;
                }
            }
            KeyCode::Char('r' | 'R') => self.reset_session(),
            KeyCode::Char('q' | 'Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_profile_key(&mut self, key: KeyCode) {
        let form = &mut self.profile_state;
        match key {
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Up => form.prev_field(),
            KeyCode::Down => form.next_field(),
            KeyCode::Left => form.cycle_option(false),
            KeyCode::Right => form.cycle_option(true),
            KeyCode::Tab | KeyCode::Enter if form.locked => self.open_questionnaire(),
            KeyCode::Tab => form.next_field(),
            KeyCode::Enter => {
                form.lock();
            }
            KeyCode::Char('u' | 'U') if form.locked => form.unlock(),
            KeyCode::Char(c) if form.current_field().is_text() => form.input_char(c),
            KeyCode::Char('l' | 'L') => {
                form.lock();
            }
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Delete => form.clear_field(),
            _ => {}
        }
    }

    /// The questionnaire is only reachable with a locked profile.
    fn open_questionnaire(&mut self) {
        if self.profile_state.locked {
            self.screen = Screen::Questionnaire;
        } else {
            self.profile_state.error_message =
                Some("Lock the profile before answering the questionnaire".to_string());
            self.screen = Screen::Profile;
        }
    }

    fn handle_questionnaire_key(&mut self, key: KeyCode) {
        if !self.profile_state.locked {
            self.open_questionnaire();
            return;
        }
        let q = &mut self.questionnaire_state;
        match key {
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Up => q.prev_question(),
            KeyCode::Down => q.next_question(),
            KeyCode::Left => q.adjust(false),
            KeyCode::Right => q.adjust(true),
            KeyCode::Tab => q.next_part(),
            KeyCode::Char('p' | 'P') => self.screen = Screen::Profile,
            KeyCode::Enter => self.submit(),
            _ => {}
        }
    }

    fn handle_analysis_key(&mut self, key: KeyCode) {
        match self.analysis_state {
            AnalysisState::Complete { .. } => match key {
                KeyCode::Char('s' | 'S') => self.save_report(),
                KeyCode::Char('r' | 'R') => {
                    self.reset_session();
                    self.screen = Screen::Profile;
                }
                KeyCode::Esc => self.screen = Screen::Home,
                _ => {}
            },
            AnalysisState::Error { .. } => match key {
                KeyCode::Enter => self.open_questionnaire(),
                KeyCode::Esc => self.screen = Screen::Home,
                _ => {}
            },
            AnalysisState::Idle => {
                if key == KeyCode::Esc {
                    self.screen = Screen::Home;
                }
            }
            AnalysisState::Running { .. } => {}
        }
    }

    /// Start an analysis of the locked profile and current answers.
    fn submit(&mut self) {
        if self.pending_worker.is_some() {
            return;
        }
        if !self.profile_state.locked {
            self.profile_state.error_message =
                Some("Lock the profile before analyzing".to_string());
            self.screen = Screen::Profile;
            return;
        }
        let profile = match self.profile_state.to_profile() {
            Ok(profile) => profile,
            Err(errors) => {
                self.profile_state.unlock();
                self.profile_state.error_message = Some(errors.join(", "));
                self.screen = Screen::Profile;
                return;
            }
        };

        self.clear_report_profile();
        self.report_profile = Some(profile.clone());

        self.screen = Screen::Analysis;
        self.analysis_state = AnalysisState::Running {
            stage: "Starting",
            progress: 0.0,
        };
        self.stage_started_at = Some(Instant::now());

        let worker = AnalysisWorker::spawn(
            Arc::clone(&self.service),
            profile,
            self.questionnaire_state.answers.clone(),
        );
        self.pending_worker = Some(worker);
    }

    fn save_report(&mut self) {
        let AnalysisState::Complete {
            assessment,
            saved_to,
            save_error,
        } = &mut self.analysis_state
        else {
            return;
        };
        let Some(profile) = self.report_profile.as_ref() else {
            *save_error = Some("Profile no longer available; run a new analysis".to_string());
            return;
        };

        match self
            .service
            .export_report(assessment, profile, &self.config.report_dir)
        {
            Ok(path) => {
                *saved_to = Some(path);
                *save_error = None;
            }
            Err(e) => {
                tracing::error!("Failed to save report: {}", e);
                *save_error = Some(format!("Save failed: {e}"));
            }
        }
    }

    fn clear_report_profile(&mut self) {
        if let Some(mut profile) = self.report_profile.take() {
            profile.department.zeroize();
        }
    }

    /// Wipe every form buffer and the last result.
    fn reset_session(&mut self) {
        self.profile_state.clear_sensitive();
        self.questionnaire_state.clear_sensitive();
        self.clear_report_profile();
        self.analysis_state = AnalysisState::Idle;
        self.finish_worker();
        self.screen = Screen::Home;
        tracing::debug!("Session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::IntegrityPolicy;
    use crate::domain::{Likert, MinimalPolicy, QUESTION_COUNT};
    use std::path::Path;

    fn test_app(report_dir: &Path) -> App {
        let config = AppConfig {
            model_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("models"),
            report_dir: report_dir.to_path_buf(),
            ..AppConfig::default()
        };
        let model = EnsembleClassifier::load(&config.model_path, &IntegrityPolicy::default())
            .expect("Demo model should load");
        let service = Arc::new(AssessmentService::new(
            Arc::new(model),
            MinimalPolicy::Healthy,
        ));
        App::with_service(service, config)
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            app.handle_key(*key, KeyModifiers::NONE);
        }
    }

    /// Poll until the worker reports a terminal state.
    fn wait_for_result(app: &mut App) {
        for _ in 0..200 {
            app.poll_worker();
            if app.pending_worker.is_none() {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("worker did not finish");
    }

    #[test]
    fn test_home_reflects_model() {
        let temp = tempfile::tempdir().expect("tempdir");
        let app = test_app(temp.path());
        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.home_state.feature_count, 33);
        assert_eq!(app.home_state.conditions, ["Anxiety", "Stress", "Depression"]);
        assert_eq!(app.home_state.manifest_serial, None);
    }

    #[test]
    fn test_analyze_requires_locked_profile() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(temp.path());
        app.screen = Screen::Questionnaire;
        press(&mut app, &[KeyCode::Enter]);

        assert_eq!(app.screen, Screen::Profile);
        assert!(app.pending_worker.is_none());
        assert!(app.profile_state.error_message.is_some());
    }

    #[test]
    fn test_questionnaire_requires_locked_profile() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(temp.path());
        press(&mut app, &[KeyCode::Char('a'), KeyCode::Right, KeyCode::Right]);

        assert_eq!(app.screen, Screen::Profile);
        assert!(!app.profile_state.locked);
        assert!(app.profile_state.error_message.is_some());
        assert_eq!(app.questionnaire_state.answers.get(0), Some(Likert::NotAtAll));

        // Unlocking after the fact also closes the questionnaire.
        press(&mut app, &[KeyCode::Enter, KeyCode::Enter]);
        assert_eq!(app.screen, Screen::Questionnaire);
        app.profile_state.unlock();
        press(&mut app, &[KeyCode::Right]);
        assert_eq!(app.screen, Screen::Profile);
        assert_eq!(app.questionnaire_state.answers.get(0), Some(Likert::NotAtAll));
    }

    #[test]
    fn test_full_session_and_report() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(temp.path());

        // Lock defaults, go to the questionnaire, max out every answer.
        press(&mut app, &[KeyCode::Char('p'), KeyCode::Enter]);
        assert!(app.profile_state.locked);
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.screen, Screen::Questionnaire);
        for _ in 0..QUESTION_COUNT {
            press(&mut app, &[KeyCode::Right, KeyCode::Right, KeyCode::Right, KeyCode::Down]);
        }
        assert_eq!(
            app.questionnaire_state.answers.get(25),
            Some(Likert::VeryOften)
        );

        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.screen, Screen::Analysis);
        wait_for_result(&mut app);

        match &app.analysis_state {
            AnalysisState::Complete { assessment, .. } => {
                assert_eq!(assessment.primary_concern, Some(Condition::Stress));
            }
            other => panic!("expected result, got {other:?}"),
        }
        assert_eq!(app.home_state.completed, 1);

        press(&mut app, &[KeyCode::Char('s')]);
        match &app.analysis_state {
            AnalysisState::Complete { saved_to, .. } => {
                let path = saved_to.as_ref().expect("report saved");
                assert!(path.starts_with(temp.path()));
                assert!(path.exists());
            }
            other => panic!("expected result, got {other:?}"),
        }

        press(&mut app, &[KeyCode::Char('r')]);
        assert!(matches!(app.analysis_state, AnalysisState::Idle));
        assert!(app.report_profile.is_none());
        assert!(!app.profile_state.locked);
        assert_eq!(app.questionnaire_state.answers.get(0), Some(Likert::NotAtAll));
    }

    #[test]
    fn test_department_accepts_command_letters() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(temp.path());
        press(&mut app, &[KeyCode::Char('p')]);
        app.profile_state.selected_field = 3; // Department
        press(&mut app, &[KeyCode::Delete]);
        for c in "LAW".chars() {
            press(&mut app, &[KeyCode::Char(c)]);
        }
        assert_eq!(app.profile_state.department, "LAW");
        assert!(!app.profile_state.locked);
    }

    #[test]
    fn test_ctrl_q_quits_anywhere() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut app = test_app(temp.path());
        press(&mut app, &[KeyCode::Char('a')]);
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
