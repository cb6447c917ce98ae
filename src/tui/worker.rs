//! Background analysis worker.
//!
//! Runs the assessment pipeline off the TUI thread and reports each stage
//! over a channel so the main loop can keep drawing.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::AssessmentService;
use crate::domain::{Answers, Assessment, StudentProfile};
use crate::ports::Classifier;

/// Progress updates from the analysis worker.
#[derive(Debug, Clone)]
pub enum AnalysisProgress {
    /// Validating the profile and building the feature row
    BuildingRow,
    /// Running the ensemble
    Predicting,
    /// Decoding labels and bucketing severities
    Interpreting,
    Complete(Assessment),
    Error(String),
}

impl AnalysisProgress {
    /// Fraction of the pipeline done when this update arrives.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        match self {
            Self::BuildingRow => 0.1,
            Self::Predicting => 0.4,
            Self::Interpreting => 0.8,
            Self::Complete(_) | Self::Error(_) => 1.0,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete(_) | Self::Error(_))
    }
}

/// Handle to a running analysis worker.
pub struct AnalysisWorkerHandle {
    pub progress_rx: Receiver<AnalysisProgress>,
    _handle: JoinHandle<()>,
}

impl AnalysisWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<AnalysisProgress> {
        self.progress_rx.try_recv().ok()
    }
}

pub struct AnalysisWorker;

impl AnalysisWorker {
    /// Spawn a background analysis of one submission.
    ///
    /// The worker owns its copies of the profile and answers and drops them
    /// when the pipeline finishes.
    pub fn spawn<C>(
        service: Arc<AssessmentService<C>>,
        profile: StudentProfile,
        answers: Answers,
    ) -> AnalysisWorkerHandle
    where
        C: Classifier + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run_with_progress(&service, &profile, &answers, &tx);
        });

        AnalysisWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }

    fn run_with_progress<C>(
        service: &AssessmentService<C>,
        profile: &StudentProfile,
        answers: &Answers,
        tx: &Sender<AnalysisProgress>,
    ) where
        C: Classifier,
    {
        // Send errors mean the UI dropped the handle (session reset); the
        // result is no longer wanted.
        let _ = tx.send(AnalysisProgress::BuildingRow);
        let row = match service.build_row(profile, answers) {
            Ok(row) => row,
            Err(e) => {
                let _ = tx.send(AnalysisProgress::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(AnalysisProgress::Predicting);
        let predictions = service.predict(&row);
        drop(row);
        let predictions = match predictions {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Prediction failed: {}", e);
                let _ = tx.send(AnalysisProgress::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(AnalysisProgress::Interpreting);
        match service.interpret(predictions, answers) {
            Ok(assessment) => {
                tracing::info!(
                    "Analysis complete ({} of {} conditions healthy)",
                    assessment.healthy_count(),
                    assessment.results.len()
                );
                let _ = tx.send(AnalysisProgress::Complete(assessment));
            }
            Err(e) => {
                tracing::warn!("Interpretation failed: {}", e);
                let _ = tx.send(AnalysisProgress::Error(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{EnsembleClassifier, IntegrityPolicy};
    use crate::domain::{Likert, MinimalPolicy, QUESTION_COUNT};
    use std::path::Path;
    use std::time::Duration;

    fn demo_service() -> Arc<AssessmentService<EnsembleClassifier>> {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let model = EnsembleClassifier::load(&dir, &IntegrityPolicy::default())
            .expect("Demo model should load");
        Arc::new(AssessmentService::new(Arc::new(model), MinimalPolicy::Healthy))
    }

    fn collect(handle: &AnalysisWorkerHandle) -> Vec<AnalysisProgress> {
        let mut updates = Vec::new();
        while let Ok(update) = handle.progress_rx.recv_timeout(Duration::from_secs(10)) {
            let done = update.is_terminal();
            updates.push(update);
            if done {
                break;
            }
        }
        updates
    }

    #[test]
    fn test_stages_arrive_in_order() {
        let handle = AnalysisWorker::spawn(
            demo_service(),
            StudentProfile::default(),
            Answers::new([Likert::VeryOften; QUESTION_COUNT]),
        );
        let updates = collect(&handle);

        assert_eq!(updates.len(), 4);
        assert!(matches!(updates[0], AnalysisProgress::BuildingRow));
        assert!(matches!(updates[1], AnalysisProgress::Predicting));
        assert!(matches!(updates[2], AnalysisProgress::Interpreting));
        match &updates[3] {
            AnalysisProgress::Complete(a) => assert_eq!(a.healthy_count(), 0),
            other => panic!("expected completion, got {other:?}"),
        }

        let fractions: Vec<f64> = updates.iter().map(AnalysisProgress::fraction).collect();
        assert!(fractions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_invalid_profile_reports_error() {
        let profile = StudentProfile {
            department: String::new(),
            ..StudentProfile::default()
        };
        let handle = AnalysisWorker::spawn(demo_service(), profile, Answers::default());
        let updates = collect(&handle);

        assert_eq!(updates.len(), 2);
        match &updates[1] {
            AnalysisProgress::Error(msg) => assert!(msg.contains("Department")),
            other => panic!("expected error, got {other:?}"),
        }
    }
}
