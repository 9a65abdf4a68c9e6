//! File intake: size/type validation and last-selection-wins decoding.

use crate::error::IntakeError;
use crate::image_asset::{ImageAsset, ImageSource};

pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Validates a candidate file by declared size and media type.
///
/// Size is checked before type, so an oversized non-image reports `FileTooLarge`.
pub fn validate_file(size: u64, mime_type: &str) -> Result<(), IntakeError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(IntakeError::FileTooLarge { size });
    }
    if size == 0 {
        return Err(IntakeError::EmptyFile);
    }
    if !mime_type.starts_with("image/") {
        return Err(IntakeError::InvalidType {
            mime_type: mime_type.to_string(),
        });
    }
    Ok(())
}

/// Validates an already decoded asset, e.g. one received by the server.
pub fn validate_asset(asset: &ImageAsset) -> Result<(), IntakeError> {
    validate_file(asset.decoded_len(), &asset.mime_type)
}

/// Handle for one accepted selection whose decode is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeTicket(u64);

/// Tracks file selections so that only the newest accepted one is emitted.
#[derive(Debug, Default)]
pub struct IntakeTracker {
    latest: u64,
}

impl IntakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a selection. Accepted selections supersede every earlier ticket;
    /// rejected ones leave the tracker unchanged.
    pub fn select(&mut self, size: u64, mime_type: &str) -> Result<IntakeTicket, IntakeError> {
        validate_file(size, mime_type)?;
        self.latest += 1;
        Ok(IntakeTicket(self.latest))
    }

    /// Finishes a decode. Returns `None` when the ticket was superseded.
    pub fn complete(&mut self, ticket: IntakeTicket, data_url: &str) -> Option<Result<ImageAsset, IntakeError>> {
        if !self.is_current(ticket) {
            log::debug!("discarding stale decode for selection {}", ticket.0);
            return None;
        }
        Some(ImageAsset::from_data_url(data_url, ImageSource::Uploaded))
    }

    pub fn is_current(&self, ticket: IntakeTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Invalidates all in-flight decodes, used on reset.
    pub fn cancel(&mut self) {
        self.latest += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_URL: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn accepts_images_up_to_the_limit() {
        assert_eq!(validate_file(2 * 1024 * 1024, "image/jpeg"), Ok(()));
        assert_eq!(validate_file(MAX_UPLOAD_BYTES, "image/png"), Ok(()));
    }

    #[test]
    fn rejects_oversized_and_non_images() {
        assert_eq!(
            validate_file(MAX_UPLOAD_BYTES + 1, "image/png"),
            Err(IntakeError::FileTooLarge {
                size: MAX_UPLOAD_BYTES + 1
            })
        );
        assert!(matches!(
            validate_file(1024, "application/pdf"),
            Err(IntakeError::InvalidType { .. })
        ));
        assert!(matches!(
            validate_file(MAX_UPLOAD_BYTES * 2, "application/pdf"),
            Err(IntakeError::FileTooLarge { .. })
        ));
        assert_eq!(validate_file(0, "image/png"), Err(IntakeError::EmptyFile));
    }

    #[test]
    fn accepted_selection_emits_one_uploaded_asset() {
        let mut tracker = IntakeTracker::new();
        let ticket = tracker.select(1024, "image/png").unwrap();

        let asset = tracker.complete(ticket, PNG_URL).unwrap().unwrap();
        assert_eq!(asset.source, ImageSource::Uploaded);
        assert!(!asset.encoded.is_empty());
    }

    #[test]
    fn last_selection_wins() {
        let mut tracker = IntakeTracker::new();
        let first = tracker.select(1024, "image/png").unwrap();
        let second = tracker.select(2048, "image/jpeg").unwrap();

        assert!(tracker.complete(first, PNG_URL).is_none());
        assert!(tracker.complete(second, "data:image/jpeg;base64,/9j/4AA=").is_some());
    }

    #[test]
    fn rejection_does_not_supersede_pending_decode() {
        let mut tracker = IntakeTracker::new();
        let accepted = tracker.select(1024, "image/png").unwrap();

        assert!(tracker.select(MAX_UPLOAD_BYTES + 1, "image/png").is_err());
        assert!(tracker.select(10, "text/plain").is_err());
        assert!(tracker.complete(accepted, PNG_URL).is_some());
    }

    #[test]
    fn cancel_discards_in_flight_decodes() {
        let mut tracker = IntakeTracker::new();
        let ticket = tracker.select(1024, "image/png").unwrap();
        tracker.cancel();
        assert!(tracker.complete(ticket, PNG_URL).is_none());
    }

    #[test]
    fn validate_asset_uses_decoded_size() {
        let oversized = vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize];
        let asset = ImageAsset::from_bytes("image/png", &oversized, ImageSource::Uploaded).unwrap();
        assert!(matches!(validate_asset(&asset), Err(IntakeError::FileTooLarge { .. })));
    }
}
