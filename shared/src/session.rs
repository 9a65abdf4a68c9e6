//! Analysis session state machine.
//!
//! The whole page state (selected tab, current image, analysis phase) lives
//! in one [`AnalysisSession`] value that only changes through [`AnalysisSession::apply`].

use crate::classification::{AnalysisId, Classification};
use crate::error::SessionError;
use crate::image_asset::ImageAsset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputTab {
    #[default]
    Upload,
    Camera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Selecting,
    Analyzing(AnalysisId),
    Analyzed(AnalysisId, Classification),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SelectTab(InputTab),
    ImageReady(ImageAsset),
    AnalyzeRequested,
    AnalysisCompleted(AnalysisId, Classification),
    AnalysisFailed(AnalysisId),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisSession {
    tab: InputTab,
    image: Option<ImageAsset>,
    phase: SessionPhase,
    last_id: u64,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(&self) -> InputTab {
        self.tab
    }

    pub fn image(&self) -> Option<&ImageAsset> {
        self.image.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The analysis currently waiting on the classifier, if any.
    pub fn in_flight(&self) -> Option<AnalysisId> {
        match self.phase {
            SessionPhase::Analyzing(id) => Some(id),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<(AnalysisId, Classification)> {
        match self.phase {
            SessionPhase::Analyzed(id, classification) => Some((id, classification)),
            _ => None,
        }
    }

    pub fn inputs_disabled(&self) -> bool {
        matches!(self.phase, SessionPhase::Analyzing(_))
    }

    /// Whether new images may be selected. Only the selection view takes
    /// input; results must be reset first.
    pub fn accepts_input(&self) -> bool {
        self.phase == SessionPhase::Selecting
    }

    /// The image shown under the inputs, whichever tab or source it came from.
    /// This is exactly the image an analysis would run on.
    pub fn preview(&self) -> Option<&ImageAsset> {
        self.image.as_ref().filter(|_| self.accepts_input())
    }

    pub fn can_analyze(&self) -> bool {
        self.preview().is_some()
    }

    /// Applies one event and returns the next session state.
    pub fn apply(self, event: SessionEvent) -> Result<AnalysisSession, SessionError> {
        let mut next = self;
        match event {
            SessionEvent::SelectTab(tab) => next.tab = tab,
            SessionEvent::ImageReady(image) => {
                if next.inputs_disabled() {
                    return Err(SessionError::AnalysisInProgress);
                }
                next.image = Some(image);
                next.phase = SessionPhase::Selecting;
            }
            SessionEvent::AnalyzeRequested => {
                if next.image.is_none() {
                    return Err(SessionError::NoImageSelected);
                }
                if next.inputs_disabled() {
                    return Err(SessionError::AnalysisInProgress);
                }
                next.last_id += 1;
                next.phase = SessionPhase::Analyzing(AnalysisId(next.last_id));
            }
            SessionEvent::AnalysisCompleted(id, classification) => {
                if next.in_flight() == Some(id) {
                    next.phase = SessionPhase::Analyzed(id, classification);
                } else {
                    log::debug!("ignoring completion of analysis {}", id);
                }
            }
            SessionEvent::AnalysisFailed(id) => {
                if next.in_flight() == Some(id) {
                    next.phase = SessionPhase::Selecting;
                }
            }
            SessionEvent::Reset => {
                // ids keep increasing so late completions stay recognisable
                next = AnalysisSession {
                    last_id: next.last_id,
                    ..AnalysisSession::default()
                };
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_asset::ImageSource;

    fn leaf() -> ImageAsset {
        ImageAsset::from_bytes("image/jpeg", &[0xff, 0xd8, 0xff], ImageSource::Uploaded).unwrap()
    }

    #[test]
    fn analyze_without_image_is_rejected() {
        let session = AnalysisSession::new();
        assert_eq!(
            session.apply(SessionEvent::AnalyzeRequested),
            Err(SessionError::NoImageSelected)
        );
    }

    #[test]
    fn full_cycle_then_reset() {
        let session = AnalysisSession::new()
            .apply(SessionEvent::SelectTab(InputTab::Camera))
            .unwrap()
            .apply(SessionEvent::ImageReady(leaf()))
            .unwrap()
            .apply(SessionEvent::AnalyzeRequested)
            .unwrap();

        let id = session.in_flight().unwrap();
        assert!(session.inputs_disabled());

        let session = session
            .apply(SessionEvent::AnalysisCompleted(id, Classification::LateBlight))
            .unwrap();
        assert_eq!(session.result(), Some((id, Classification::LateBlight)));
        assert!(session.image().is_some());

        let session = session.apply(SessionEvent::Reset).unwrap();
        assert_eq!(session.tab(), InputTab::Upload);
        assert!(session.image().is_none());
        assert_eq!(session.phase(), SessionPhase::Selecting);
    }

    #[test]
    fn second_analyze_while_running_is_rejected() {
        let session = AnalysisSession::new()
            .apply(SessionEvent::ImageReady(leaf()))
            .unwrap()
            .apply(SessionEvent::AnalyzeRequested)
            .unwrap();

        assert_eq!(
            session.apply(SessionEvent::AnalyzeRequested),
            Err(SessionError::AnalysisInProgress)
        );
    }

    #[test]
    fn completion_after_reset_is_ignored() {
        let session = AnalysisSession::new()
            .apply(SessionEvent::ImageReady(leaf()))
            .unwrap()
            .apply(SessionEvent::AnalyzeRequested)
            .unwrap();
        let stale = session.in_flight().unwrap();

        let session = session
            .apply(SessionEvent::Reset)
            .unwrap()
            .apply(SessionEvent::ImageReady(leaf()))
            .unwrap()
            .apply(SessionEvent::AnalyzeRequested)
            .unwrap();
        assert_ne!(session.in_flight(), Some(stale));

        let session = session
            .apply(SessionEvent::AnalysisCompleted(stale, Classification::Healthy))
            .unwrap();
        assert!(session.result().is_none());
    }

    #[test]
    fn new_image_discards_previous_classification() {
        let session = AnalysisSession::new()
            .apply(SessionEvent::ImageReady(leaf()))
            .unwrap()
            .apply(SessionEvent::AnalyzeRequested)
            .unwrap();
        let id = session.in_flight().unwrap();
        let session = session
            .apply(SessionEvent::AnalysisCompleted(id, Classification::Healthy))
            .unwrap()
            .apply(SessionEvent::ImageReady(leaf()))
            .unwrap();

        assert!(session.result().is_none());
        assert!(session.can_analyze());
    }

    #[test]
    fn image_arriving_during_analysis_is_rejected() {
        let session = AnalysisSession::new()
            .apply(SessionEvent::ImageReady(leaf()))
            .unwrap()
            .apply(SessionEvent::AnalyzeRequested)
            .unwrap();
        let id = session.in_flight().unwrap();

        assert_eq!(
            session.clone().apply(SessionEvent::ImageReady(leaf())),
            Err(SessionError::AnalysisInProgress)
        );
        assert_eq!(session.in_flight(), Some(id));
    }

    #[test]
    fn captured_image_stays_previewed_after_switching_tabs() {
        let still = ImageAsset::from_bytes("image/jpeg", &[0xff, 0xd8, 0xff], ImageSource::Captured).unwrap();
        let session = AnalysisSession::new()
            .apply(SessionEvent::SelectTab(InputTab::Camera))
            .unwrap()
            .apply(SessionEvent::ImageReady(still.clone()))
            .unwrap()
            .apply(SessionEvent::SelectTab(InputTab::Upload))
            .unwrap();

        assert!(session.can_analyze());
        assert_eq!(session.preview(), Some(&still));
    }

    #[test]
    fn analyzable_image_is_always_the_previewed_one() {
        let mut session = AnalysisSession::new();
        let events = [
            SessionEvent::ImageReady(leaf()),
            SessionEvent::SelectTab(InputTab::Camera),
            SessionEvent::AnalyzeRequested,
            SessionEvent::AnalysisCompleted(AnalysisId(1), Classification::EarlyBlight),
            SessionEvent::SelectTab(InputTab::Upload),
            SessionEvent::Reset,
        ];
        for event in events {
            session = session.apply(event).unwrap();
            assert_eq!(session.can_analyze(), session.preview().is_some());
        }
    }

    #[test]
    fn input_is_only_accepted_while_selecting() {
        let session = AnalysisSession::new().apply(SessionEvent::ImageReady(leaf())).unwrap();
        assert!(session.accepts_input());

        let session = session.apply(SessionEvent::AnalyzeRequested).unwrap();
        let id = session.in_flight().unwrap();
        assert!(!session.accepts_input());

        let session = session
            .apply(SessionEvent::AnalysisCompleted(id, Classification::Healthy))
            .unwrap();
        assert!(!session.accepts_input());
        assert!(session.preview().is_none());

        assert!(session.apply(SessionEvent::Reset).unwrap().accepts_input());
    }

    #[test]
    fn failed_analysis_keeps_image_for_retry() {
        let session = AnalysisSession::new()
            .apply(SessionEvent::ImageReady(leaf()))
            .unwrap()
            .apply(SessionEvent::AnalyzeRequested)
            .unwrap();
        let id = session.in_flight().unwrap();

        let session = session.apply(SessionEvent::AnalysisFailed(id)).unwrap();
        assert!(session.can_analyze());
    }
}
