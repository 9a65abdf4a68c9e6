//! Result presenter state.
//!
//! Narrative fetches are never cancelled. Each one carries a [`FetchTicket`]
//! and only the ticket issued last may commit its result; anything that
//! resolves later for an older classification is dropped on arrival.

use crate::classification::{AnalysisId, Classification};
use crate::error::{NarrativeError, UserFacing};
use crate::narrative::{NarrativeRequest, NarrativeResult};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NarrativeView {
    #[default]
    Idle,
    Loading,
    Error(String),
    Ready(NarrativeResult),
}

impl NarrativeView {
    pub fn is_loading(&self) -> bool {
        matches!(self, NarrativeView::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    pub request: NarrativeRequest,
}

#[derive(Debug, Default)]
pub struct ResultPresenter {
    generation: u64,
    current: Option<(AnalysisId, Classification)>,
    view: NarrativeView,
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &NarrativeView {
        &self.view
    }

    pub fn classification(&self) -> Option<Classification> {
        self.current.map(|(_, classification)| classification)
    }

    /// Displays a classification. A fetch ticket is issued only when the
    /// analysis identity changed; re-rendering the same cycle returns `None`.
    pub fn show(&mut self, id: AnalysisId, classification: Classification) -> Option<FetchTicket> {
        if self.current.is_some_and(|(current, _)| current == id) {
            return None;
        }
        self.current = Some((id, classification));
        self.issue()
    }

    /// Re-issues the fetch for the displayed classification after a failure.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        if matches!(self.view, NarrativeView::Error(_)) {
            self.issue()
        } else {
            None
        }
    }

    /// Commits a fetch outcome. Returns `false` when the ticket is stale.
    pub fn resolve(&mut self, ticket: &FetchTicket, outcome: Result<NarrativeResult, NarrativeError>) -> bool {
        if ticket.generation != self.generation || self.current.is_none() {
            log::debug!(
                "ignoring narrative for generation {} (current {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.view = match outcome {
            Ok(result) => NarrativeView::Ready(result),
            Err(err) => {
                log::warn!("narrative fetch failed: {}", err);
                NarrativeView::Error(err.user_message())
            }
        };
        true
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
        self.view = NarrativeView::Idle;
    }

    fn issue(&mut self) -> Option<FetchTicket> {
        let (_, classification) = self.current?;
        self.generation += 1;
        self.view = NarrativeView::Loading;
        Some(FetchTicket {
            generation: self.generation,
            request: NarrativeRequest::for_classification(classification),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::Disease;

    fn summary(disease: Disease, text: &str) -> NarrativeResult {
        NarrativeResult::DiseaseSummary {
            disease,
            summary: text.into(),
            summary_localized: None,
        }
    }

    #[test]
    fn show_enters_loading_then_ready() {
        let mut presenter = ResultPresenter::new();
        let ticket = presenter.show(AnalysisId(1), Classification::EarlyBlight).unwrap();

        assert_eq!(ticket.request, NarrativeRequest::DescribeDisease(Disease::EarlyBlight));
        assert!(presenter.view().is_loading());

        assert!(presenter.resolve(&ticket, Ok(summary(Disease::EarlyBlight, "fungal"))));
        assert!(matches!(presenter.view(), NarrativeView::Ready(_)));
    }

    #[test]
    fn same_identity_does_not_refetch() {
        let mut presenter = ResultPresenter::new();
        assert!(presenter.show(AnalysisId(1), Classification::Healthy).is_some());
        assert!(presenter.show(AnalysisId(1), Classification::Healthy).is_none());
        // a new cycle with the same outcome is a new identity
        assert!(presenter.show(AnalysisId(2), Classification::Healthy).is_some());
    }

    #[test]
    fn stale_result_is_never_committed() {
        let mut presenter = ResultPresenter::new();
        let first = presenter.show(AnalysisId(1), Classification::EarlyBlight).unwrap();
        let second = presenter.show(AnalysisId(2), Classification::LateBlight).unwrap();

        assert!(presenter.resolve(&second, Ok(summary(Disease::LateBlight, "late"))));
        assert!(!presenter.resolve(&first, Ok(summary(Disease::EarlyBlight, "early"))));

        match presenter.view() {
            NarrativeView::Ready(result) => assert_eq!(result.text(), "late"),
            other => panic!("unexpected view {:?}", other),
        }
    }

    #[test]
    fn stale_result_arriving_first_is_ignored() {
        let mut presenter = ResultPresenter::new();
        let first = presenter.show(AnalysisId(1), Classification::EarlyBlight).unwrap();
        presenter.show(AnalysisId(2), Classification::LateBlight).unwrap();

        assert!(!presenter.resolve(&first, Ok(summary(Disease::EarlyBlight, "early"))));
        assert!(presenter.view().is_loading());
    }

    #[test]
    fn failure_is_retryable_and_keeps_classification() {
        let mut presenter = ResultPresenter::new();
        let ticket = presenter.show(AnalysisId(1), Classification::Healthy).unwrap();
        presenter.resolve(&ticket, Err(NarrativeError::GenerationFailed("timeout".into())));

        assert!(matches!(presenter.view(), NarrativeView::Error(_)));
        assert_eq!(presenter.classification(), Some(Classification::Healthy));

        let retry = presenter.retry().unwrap();
        assert!(presenter.view().is_loading());
        assert!(!presenter.resolve(&ticket, Err(NarrativeError::GenerationFailed("late".into()))));
        assert!(presenter.retry().is_none());
        assert!(presenter.resolve(
            &retry,
            Ok(NarrativeResult::CareSuggestions {
                plant_type: "potato".into(),
                suggestions: "rotate crops".into(),
                suggestions_localized: None,
            })
        ));
    }

    #[test]
    fn clear_discards_in_flight_fetch() {
        let mut presenter = ResultPresenter::new();
        let ticket = presenter.show(AnalysisId(1), Classification::LateBlight).unwrap();
        presenter.clear();

        assert!(!presenter.resolve(&ticket, Ok(summary(Disease::LateBlight, "late"))));
        assert_eq!(presenter.view(), &NarrativeView::Idle);
        assert_eq!(presenter.classification(), None);
    }
}
