//! Camera capture lifecycle.
//!
//! A [`CameraController`] owns at most one live [`CaptureSession`]. Sessions
//! release their device handle when dropped, so every exit path (explicit
//! stop, capture, disable, teardown of the owning view) frees the camera.
//!
//! Phases follow `Idle -> Initializing -> Live -> (Captured | Idle)`, with
//! `Captured -> Initializing` on retake and `Initializing -> Idle` on failure.

use std::future::Future;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use crate::error::CameraError;
use crate::image_asset::{ImageAsset, ImageSource};

pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;
pub const CAPTURE_JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    #[default]
    Environment,
    User,
}

impl FacingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

/// One RGBA still grabbed from a video stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CameraError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(CameraError::CaptureFailed(format!(
                "frame of {}x{} carries {} bytes, expected {}",
                width,
                height,
                pixels.len(),
                expected
            )));
        }
        Ok(Self { width, height, pixels })
    }
}

/// A live video stream backed by an exclusive device handle.
pub trait VideoStream {
    /// Draws the current frame.
    fn frame(&self) -> Result<RgbaFrame, CameraError>;

    /// Stops the device tracks and detaches any preview sink. Must be idempotent.
    fn release(&mut self);
}

/// Something that can hand out video streams, e.g. the browser's media devices.
pub trait CameraDevice {
    type Stream: VideoStream;

    fn acquire(&self, facing: FacingMode) -> impl Future<Output = Result<Self::Stream, CameraError>>;
}

/// Scoped ownership of a live stream. Dropping the session releases the device.
#[derive(Debug)]
pub struct CaptureSession<S: VideoStream> {
    stream: Option<S>,
}

impl<S: VideoStream> CaptureSession<S> {
    pub fn new(stream: S) -> Self {
        Self { stream: Some(stream) }
    }

    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_some()
    }

    pub fn frame(&self) -> Result<RgbaFrame, CameraError> {
        self.stream
            .as_ref()
            .ok_or(CameraError::NoActiveSession)?
            .frame()
    }

    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
    }
}

impl<S: VideoStream> Drop for CaptureSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraPhase {
    #[default]
    Idle,
    Initializing,
    Live,
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraEvent {
    /// Start or retake.
    Open,
    Acquired,
    AcquireFailed,
    Capture,
    CaptureFailed,
    Stop,
}

impl CameraPhase {
    /// Pure transition function of the capture lifecycle. Events that make
    /// no sense in the current phase leave it unchanged.
    pub fn next(self, event: CameraEvent) -> CameraPhase {
        use CameraEvent as E;
        use CameraPhase as P;

        match (self, event) {
            (P::Idle | P::Captured, E::Open) => P::Initializing,
            (P::Initializing, E::Acquired) => P::Live,
            (P::Initializing, E::AcquireFailed) => P::Idle,
            (P::Live, E::Capture) => P::Captured,
            (P::Live, E::CaptureFailed) => P::Idle,
            (_, E::Stop) => P::Idle,
            (phase, _) => phase,
        }
    }
}

/// Proof that `begin_open` moved the controller to `Initializing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTicket {
    attempt: u64,
    pub facing: FacingMode,
}

#[derive(Debug)]
pub struct CameraController<S: VideoStream> {
    phase: CameraPhase,
    session: Option<CaptureSession<S>>,
    error: Option<CameraError>,
    captured: Option<ImageAsset>,
    disabled: bool,
    facing: FacingMode,
    attempt: u64,
}

impl<S: VideoStream> Default for CameraController<S> {
    fn default() -> Self {
        Self::new(FacingMode::default())
    }
}

impl<S: VideoStream> CameraController<S> {
    pub fn new(facing: FacingMode) -> Self {
        Self {
            phase: CameraPhase::Idle,
            session: None,
            error: None,
            captured: None,
            disabled: false,
            facing,
            attempt: 0,
        }
    }

    pub fn phase(&self) -> CameraPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&CameraError> {
        self.error.as_ref()
    }

    pub fn captured(&self) -> Option<&ImageAsset> {
        self.captured.as_ref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn has_live_session(&self) -> bool {
        self.session.as_ref().is_some_and(CaptureSession::is_live)
    }

    /// The live stream, e.g. to attach it to a preview element.
    pub fn stream(&self) -> Option<&S> {
        self.session.as_ref().and_then(CaptureSession::stream)
    }

    fn transition(&mut self, event: CameraEvent) {
        let next = self.phase.next(event);
        if next != self.phase {
            log::debug!("camera {:?} --{:?}--> {:?}", self.phase, event, next);
        }
        self.phase = next;
    }

    /// Starts acquiring a device. Returns `None` (no-op) while a session is
    /// initializing or live, or while the controller is disabled.
    pub fn begin_open(&mut self) -> Option<OpenTicket> {
        if self.disabled || matches!(self.phase, CameraPhase::Initializing | CameraPhase::Live) {
            return None;
        }

        self.attempt += 1;
        self.error = None;
        self.captured = None;
        self.transition(CameraEvent::Open);
        Some(OpenTicket {
            attempt: self.attempt,
            facing: self.facing,
        })
    }

    /// Hands the acquisition result back. A stream arriving for a superseded
    /// attempt is released on the spot. Returns whether the result was applied.
    pub fn finish_open(&mut self, ticket: OpenTicket, result: Result<S, CameraError>) -> bool {
        if ticket.attempt != self.attempt || self.phase != CameraPhase::Initializing {
            if let Ok(mut stream) = result {
                log::debug!("releasing stream for superseded open attempt {}", ticket.attempt);
                stream.release();
            }
            return false;
        }

        match result {
            Ok(stream) => {
                self.session = Some(CaptureSession::new(stream));
                self.transition(CameraEvent::Acquired);
            }
            Err(err) => {
                log::warn!("camera acquisition failed: {}", err);
                self.error = Some(err);
                self.transition(CameraEvent::AcquireFailed);
            }
        }
        true
    }

    /// Opens a session on `device`. Calling it while a session is live is a no-op.
    pub async fn open<D>(&mut self, device: &D) -> Result<(), CameraError>
    where
        D: CameraDevice<Stream = S>,
    {
        let Some(ticket) = self.begin_open() else {
            return Ok(());
        };
        let result = device.acquire(ticket.facing).await;
        self.finish_open(ticket, result);

        match &self.error {
            Some(err) if self.phase == CameraPhase::Idle => Err(err.clone()),
            _ => Ok(()),
        }
    }

    /// Reopens after a capture.
    pub async fn retake<D>(&mut self, device: &D) -> Result<(), CameraError>
    where
        D: CameraDevice<Stream = S>,
    {
        self.open(device).await
    }

    /// Grabs a single frame, encodes it and closes the session.
    pub fn capture(&mut self) -> Result<ImageAsset, CameraError> {
        if self.phase != CameraPhase::Live {
            return Err(CameraError::NoActiveSession);
        }
        let Some(mut session) = self.session.take() else {
            return Err(CameraError::NoActiveSession);
        };

        let frame = session.frame();
        session.release();

        match frame.and_then(|frame| encode_frame(&frame)) {
            Ok(asset) => {
                self.captured = Some(asset.clone());
                self.transition(CameraEvent::Capture);
                Ok(asset)
            }
            Err(err) => {
                self.error = Some(err.clone());
                self.transition(CameraEvent::CaptureFailed);
                Err(err)
            }
        }
    }

    /// Releases any session and returns to `Idle`. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.release();
        }
        if self.phase == CameraPhase::Initializing {
            // the pending acquisition must not revive the session
            self.attempt += 1;
        }
        self.error = None;
        self.captured = None;
        self.transition(CameraEvent::Stop);
    }

    /// Disabling stops a live or initializing session; a captured still is kept.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled && matches!(self.phase, CameraPhase::Initializing | CameraPhase::Live) {
            self.close();
        }
    }
}

/// Scales a frame into the fixed capture raster and encodes it as JPEG.
pub fn encode_frame(frame: &RgbaFrame) -> Result<ImageAsset, CameraError> {
    let buffer = RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .ok_or_else(|| CameraError::CaptureFailed("frame buffer does not match its dimensions".into()))?;

    let raster = if buffer.dimensions() == (CAPTURE_WIDTH, CAPTURE_HEIGHT) {
        buffer
    } else {
        imageops::resize(&buffer, CAPTURE_WIDTH, CAPTURE_HEIGHT, FilterType::Triangle)
    };
    let rgb = DynamicImage::ImageRgba8(raster).into_rgb8();

    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, CAPTURE_JPEG_QUALITY))
        .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;

    ImageAsset::from_bytes("image/jpeg", &jpeg, ImageSource::Captured)
        .map_err(|e| CameraError::CaptureFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts open device handles so tests can check for leaks.
    #[derive(Clone, Default)]
    struct SyntheticCamera {
        open_handles: Rc<Cell<u32>>,
        fail_with: Option<CameraError>,
    }

    struct SyntheticStream {
        open_handles: Rc<Cell<u32>>,
        released: bool,
        width: u32,
        height: u32,
    }

    impl VideoStream for SyntheticStream {
        fn frame(&self) -> Result<RgbaFrame, CameraError> {
            RgbaFrame::new(self.width, self.height, vec![120; (self.width * self.height * 4) as usize])
        }

        fn release(&mut self) {
            if !self.released {
                self.released = true;
                self.open_handles.set(self.open_handles.get() - 1);
            }
        }
    }

    impl SyntheticCamera {
        fn denied() -> Self {
            Self {
                fail_with: Some(CameraError::PermissionDenied),
                ..Self::default()
            }
        }

        fn stream(&self) -> SyntheticStream {
            self.open_handles.set(self.open_handles.get() + 1);
            SyntheticStream {
                open_handles: self.open_handles.clone(),
                released: false,
                width: 32,
                height: 24,
            }
        }
    }

    impl CameraDevice for SyntheticCamera {
        type Stream = SyntheticStream;

        async fn acquire(&self, _facing: FacingMode) -> Result<SyntheticStream, CameraError> {
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(self.stream()),
            }
        }
    }

    #[test]
    fn transitions_follow_capture_lifecycle() {
        use CameraEvent as E;
        use CameraPhase as P;

        assert_eq!(P::Idle.next(E::Open), P::Initializing);
        assert_eq!(P::Initializing.next(E::AcquireFailed), P::Idle);
        assert_eq!(P::Initializing.next(E::Acquired), P::Live);
        assert_eq!(P::Live.next(E::Capture), P::Captured);
        assert_eq!(P::Live.next(E::Stop), P::Idle);
        assert_eq!(P::Captured.next(E::Open), P::Initializing);
        assert_eq!(P::Idle.next(E::Capture), P::Idle);
        assert_eq!(P::Live.next(E::Open), P::Live);
    }

    #[test]
    fn capture_without_session_fails_cleanly() {
        let mut controller = CameraController::<SyntheticStream>::default();
        assert_eq!(controller.capture(), Err(CameraError::NoActiveSession));
        assert_eq!(controller.phase(), CameraPhase::Idle);
    }

    #[tokio::test]
    async fn capture_is_single_shot_and_releases_device() {
        let camera = SyntheticCamera::default();
        let mut controller = CameraController::default();

        controller.open(&camera).await.unwrap();
        assert_eq!(controller.phase(), CameraPhase::Live);
        assert_eq!(camera.open_handles.get(), 1);

        let asset = controller.capture().unwrap();
        assert_eq!(asset.source, ImageSource::Captured);
        assert_eq!(asset.mime_type, "image/jpeg");
        assert_eq!(controller.phase(), CameraPhase::Captured);
        assert_eq!(camera.open_handles.get(), 0);

        assert_eq!(controller.capture(), Err(CameraError::NoActiveSession));
    }

    #[tokio::test]
    async fn captured_frame_uses_fixed_raster() {
        let camera = SyntheticCamera::default();
        let mut controller = CameraController::default();
        controller.open(&camera).await.unwrap();

        let bytes = controller.capture().unwrap().decode().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (CAPTURE_WIDTH, CAPTURE_HEIGHT));
    }

    #[tokio::test]
    async fn open_while_live_is_a_no_op() {
        let camera = SyntheticCamera::default();
        let mut controller = CameraController::default();

        controller.open(&camera).await.unwrap();
        controller.open(&camera).await.unwrap();
        assert_eq!(camera.open_handles.get(), 1);
        assert!(controller.begin_open().is_none());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_allows_reopen() {
        let camera = SyntheticCamera::default();
        let mut controller = CameraController::default();

        controller.open(&camera).await.unwrap();
        controller.close();
        controller.close();
        assert_eq!(camera.open_handles.get(), 0);
        assert_eq!(controller.phase(), CameraPhase::Idle);

        controller.open(&camera).await.unwrap();
        assert_eq!(controller.phase(), CameraPhase::Live);
        assert_eq!(camera.open_handles.get(), 1);
    }

    #[tokio::test]
    async fn retake_opens_a_new_session() {
        let camera = SyntheticCamera::default();
        let mut controller = CameraController::default();

        controller.open(&camera).await.unwrap();
        controller.capture().unwrap();
        controller.retake(&camera).await.unwrap();

        assert_eq!(controller.phase(), CameraPhase::Live);
        assert!(controller.captured().is_none());
        assert_eq!(camera.open_handles.get(), 1);
    }

    #[tokio::test]
    async fn permission_denied_returns_to_idle_with_error() {
        let mut controller = CameraController::default();

        let result = controller.open(&SyntheticCamera::denied()).await;
        assert_eq!(result, Err(CameraError::PermissionDenied));
        assert_eq!(controller.phase(), CameraPhase::Idle);
        assert_eq!(controller.error(), Some(&CameraError::PermissionDenied));
        assert!(controller.captured().is_none());

        // "Try Again" simply opens again
        let camera = SyntheticCamera::default();
        controller.open(&camera).await.unwrap();
        assert!(controller.error().is_none());
        assert_eq!(controller.phase(), CameraPhase::Live);
    }

    #[test]
    fn stream_for_superseded_attempt_is_released() {
        let camera = SyntheticCamera::default();
        let mut controller = CameraController::default();

        let ticket = controller.begin_open().unwrap();
        controller.set_disabled(true);
        assert_eq!(controller.phase(), CameraPhase::Idle);

        assert!(!controller.finish_open(ticket, Ok(camera.stream())));
        assert_eq!(camera.open_handles.get(), 0);
        assert!(!controller.has_live_session());
    }

    #[tokio::test]
    async fn disabling_closes_live_session_and_blocks_open() {
        let camera = SyntheticCamera::default();
        let mut controller = CameraController::default();
        controller.open(&camera).await.unwrap();

        controller.set_disabled(true);
        assert_eq!(camera.open_handles.get(), 0);
        assert!(controller.begin_open().is_none());

        controller.set_disabled(false);
        controller.open(&camera).await.unwrap();
        assert_eq!(controller.phase(), CameraPhase::Live);
    }

    #[tokio::test]
    async fn dropping_controller_releases_device() {
        let camera = SyntheticCamera::default();
        {
            let mut controller = CameraController::default();
            controller.open(&camera).await.unwrap();
            assert_eq!(camera.open_handles.get(), 1);
        }
        assert_eq!(camera.open_handles.get(), 0);
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(matches!(
            RgbaFrame::new(2, 2, vec![0; 3]),
            Err(CameraError::CaptureFailed(_))
        ));
    }
}
