use js_sys::{Object, Reflect};
use shared::CameraError;
use shared::camera::{CAPTURE_HEIGHT, CAPTURE_WIDTH, CameraDevice, FacingMode, RgbaFrame, VideoStream};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, DomException, HtmlCanvasElement, HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};
use yew::NodeRef;

// HTMLMediaElement.HAVE_CURRENT_DATA
const HAVE_CURRENT_DATA: u16 = 2;

/// The browser's media devices, previewing into the `<video>` behind `video`.
#[derive(Clone)]
pub struct BrowserCamera {
    video: NodeRef,
}

impl BrowserCamera {
    pub fn new(video: NodeRef) -> Self {
        Self { video }
    }
}

impl CameraDevice for BrowserCamera {
    type Stream = BrowserStream;

    async fn acquire(&self, facing: FacingMode) -> Result<BrowserStream, CameraError> {
        let window = web_sys::window().ok_or_else(|| CameraError::DeviceUnavailable("no window".into()))?;
        let devices = window
            .navigator()
            .media_devices()
            .map_err(|_| CameraError::DeviceNotFound)?;

        let video_constraints = Object::new();
        Reflect::set(&video_constraints, &"facingMode".into(), &facing.as_str().into()).map_err(map_media_error)?;
        Reflect::set(&video_constraints, &"width".into(), &ideal(CAPTURE_WIDTH)).map_err(map_media_error)?;
        Reflect::set(&video_constraints, &"height".into(), &ideal(CAPTURE_HEIGHT)).map_err(map_media_error)?;

        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video_constraints.into());
        constraints.set_audio(&JsValue::FALSE);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(map_media_error)?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(map_media_error)?
            .dyn_into::<MediaStream>()
            .map_err(|_| CameraError::DeviceUnavailable("getUserMedia did not return a stream".into()))?;

        log::info!("Camera stream {} acquired", stream.id());
        let stream = BrowserStream {
            stream,
            video: self.video.clone(),
        };
        stream.attach();
        Ok(stream)
    }
}

fn ideal(value: u32) -> JsValue {
    let constraint = Object::new();
    let _ = Reflect::set(&constraint, &"ideal".into(), &value.into());
    constraint.into()
}

fn map_media_error(err: JsValue) -> CameraError {
    match err.dyn_ref::<DomException>() {
        Some(exception) => CameraError::from_dom_exception(&exception.name(), &exception.message()),
        None => CameraError::DeviceUnavailable(format!("{:?}", err)),
    }
}

pub struct BrowserStream {
    stream: MediaStream,
    video: NodeRef,
}

impl BrowserStream {
    /// Points the preview element at this stream if it is not already.
    pub fn attach(&self) {
        let Some(video) = self.video.cast::<HtmlVideoElement>() else {
            return;
        };
        let attached = video
            .src_object()
            .is_some_and(|current| current.id() == self.stream.id());
        if !attached {
            video.set_src_object(Some(&self.stream));
            video.set_muted(true);
            if let Err(e) = video.play() {
                log::warn!("Video preview did not start: {:?}", e);
            }
        }
    }
}

impl VideoStream for BrowserStream {
    fn frame(&self) -> Result<RgbaFrame, CameraError> {
        let video = self
            .video
            .cast::<HtmlVideoElement>()
            .ok_or_else(|| CameraError::CaptureFailed("preview element is not mounted".into()))?;
        if video.ready_state() < HAVE_CURRENT_DATA || video.video_width() == 0 {
            return Err(CameraError::CaptureFailed("video stream has no frame yet".into()));
        }

        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| CameraError::CaptureFailed("no document".into()))?
            .create_element("canvas")
            .map_err(|e| CameraError::CaptureFailed(format!("{:?}", e)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| CameraError::CaptureFailed("canvas element unavailable".into()))?;
        canvas.set_width(CAPTURE_WIDTH);
        canvas.set_height(CAPTURE_HEIGHT);

        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| CameraError::CaptureFailed("2d context unavailable".into()))?;

        let (width, height) = (CAPTURE_WIDTH as f64, CAPTURE_HEIGHT as f64);
        context
            .draw_image_with_html_video_element_and_dw_and_dh(&video, 0.0, 0.0, width, height)
            .map_err(|e| CameraError::CaptureFailed(format!("{:?}", e)))?;
        let image_data = context
            .get_image_data(0.0, 0.0, width, height)
            .map_err(|e| CameraError::CaptureFailed(format!("{:?}", e)))?;

        RgbaFrame::new(image_data.width(), image_data.height(), image_data.data().0)
    }

    fn release(&mut self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        if let Some(video) = self.video.cast::<HtmlVideoElement>() {
            let showing_us = video
                .src_object()
                .is_some_and(|current| current.id() == self.stream.id());
            if showing_us {
                video.set_src_object(None);
            }
        }
        log::info!("Camera stream {} released", self.stream.id());
    }
}
