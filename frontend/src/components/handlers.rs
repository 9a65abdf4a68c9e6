use super::super::{Model, Msg, NOTICE_DURATION_MS, Page};
use super::help::HelpTopic;
use crate::api;
use crate::camera::{BrowserCamera, BrowserStream};
use gloo_file::File as GlooFile;
use gloo_file::callbacks::read_as_data_url;
use gloo_timers::callback::Timeout;
use shared::camera::{CameraDevice, OpenTicket};
use shared::intake::IntakeTicket;
use shared::presenter::{FetchTicket, NarrativeView};
use shared::session::{InputTab, SessionEvent};
use shared::{
    AnalysisId, AnalyzeResponse, CameraError, ImageAsset, IntakeError, NarrativeError, NarrativeRequest, NarrativeResult, Notice,
    SessionError, UserFacing,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

fn apply(model: &mut Model, event: SessionEvent) -> Result<(), SessionError> {
    model.session = model.session.clone().apply(event)?;
    model.camera.set_disabled(model.session.inputs_disabled());
    Ok(())
}

pub fn handle_navigate(model: &mut Model, page: Page) -> bool {
    if model.page == page {
        return false;
    }
    if page != Page::Home {
        model.camera.close();
    }
    model.page = page;
    true
}

pub fn handle_select_tab(model: &mut Model, ctx: &Context<Model>, tab: InputTab) -> bool {
    if model.session.tab() == tab {
        return false;
    }
    if let Err(e) = apply(model, SessionEvent::SelectTab(tab)) {
        return push_notice(model, ctx, Notice::from_error(&e));
    }
    if tab != InputTab::Camera {
        model.camera.close();
    }
    true
}

// File intake

pub fn handle_file_chosen(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    if !model.session.accepts_input() {
        log::debug!("Ignoring {} outside the selection view", file.name());
        return false;
    }

    let ticket = match model.intake.select(file.size(), &file.raw_mime_type()) {
        Ok(ticket) => ticket,
        Err(e) => {
            log::warn!("Rejected {}: {}", file.name(), e);
            return push_notice(model, ctx, Notice::from_error(&e));
        }
    };

    let link = ctx.link().clone();
    // replacing the reader aborts the previous decode
    model.file_reader = Some(read_as_data_url(&file, move |result| {
        link.send_message(Msg::FileRead(ticket, result.map_err(|e| e.to_string())));
    }));
    false
}

pub fn handle_file_read(
    model: &mut Model,
    ctx: &Context<Model>,
    ticket: IntakeTicket,
    result: Result<String, String>,
) -> bool {
    if !model.intake.is_current(ticket) {
        return false;
    }
    model.file_reader = None;

    let data_url = match result {
        Ok(data_url) => data_url,
        Err(e) => {
            log::error!("Failed to read file: {}", e);
            model.intake.cancel();
            return push_notice(model, ctx, Notice::from_error(&IntakeError::MalformedDataUrl));
        }
    };

    match model.intake.complete(ticket, &data_url) {
        Some(Ok(asset)) => accept_image(model, ctx, asset),
        Some(Err(e)) => push_notice(model, ctx, Notice::from_error(&e)),
        None => false,
    }
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file) = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|files| first_file(&files))
    {
        ctx.link().send_message(Msg::FileChosen(file));
    }
    true
}

pub fn handle_paste(model: &mut Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if model.page != Page::Home || model.session.tab() != InputTab::Upload || !model.session.accepts_input() {
        return false;
    }
    if let Some(file) = event
        .clipboard_data()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|files| first_file(&files))
    {
        event.prevent_default();
        ctx.link().send_message(Msg::FileChosen(file));
    }
    false
}

pub fn first_file(file_list: &FileList) -> Option<GlooFile> {
    file_list.item(0).map(GlooFile::from)
}

// Camera

pub fn handle_open_camera(model: &mut Model, ctx: &Context<Model>) -> bool {
    let Some(ticket) = model.camera.begin_open() else {
        return false;
    };

    let device = BrowserCamera::new(model.video_ref.clone());
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = device.acquire(ticket.facing).await;
        link.send_message(Msg::CameraOpened(ticket, result));
    });
    true
}

pub fn handle_camera_opened(
    model: &mut Model,
    ctx: &Context<Model>,
    ticket: OpenTicket,
    result: Result<BrowserStream, CameraError>,
) -> bool {
    if !model.camera.finish_open(ticket, result) {
        return false;
    }
    if let Some(err) = model.camera.error().cloned() {
        return push_notice(model, ctx, Notice::from_error(&err));
    }
    true
}

pub fn handle_capture(model: &mut Model, ctx: &Context<Model>) -> bool {
    if !model.session.accepts_input() {
        return false;
    }
    match model.camera.capture() {
        Ok(asset) => accept_image(model, ctx, asset),
        Err(e) => push_notice(model, ctx, Notice::from_error(&e)),
    }
}

/// Makes `asset` the session image. The narrative panel is only cleared once
/// the session has taken the image.
fn accept_image(model: &mut Model, ctx: &Context<Model>, asset: ImageAsset) -> bool {
    if let Err(e) = apply(model, SessionEvent::ImageReady(asset)) {
        log::warn!("Dropped new image: {}", e);
        return push_notice(model, ctx, Notice::from_error(&e));
    }
    model.presenter.clear();
    true
}

// Analysis

pub fn handle_analyze(model: &mut Model, ctx: &Context<Model>) -> bool {
    if let Err(e) = apply(model, SessionEvent::AnalyzeRequested) {
        return push_notice(model, ctx, Notice::from_error(&e));
    }
    let (Some(id), Some(image)) = (model.session.in_flight(), model.session.image().cloned()) else {
        return true;
    };

    log::info!("Starting analysis {} of {} image", id, image.source);
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = api::analyze(&image).await;
        link.send_message(Msg::AnalysisFinished(id, result));
    });
    true
}

pub fn handle_analysis_finished(
    model: &mut Model,
    ctx: &Context<Model>,
    id: AnalysisId,
    result: Result<AnalyzeResponse, Notice>,
) -> bool {
    if model.session.in_flight() != Some(id) {
        log::debug!("Dropping result of superseded analysis {}", id);
        return false;
    }

    match result {
        Ok(response) => {
            let classification = response.classification;
            if let Err(e) = apply(model, SessionEvent::AnalysisCompleted(id, classification)) {
                return push_notice(model, ctx, Notice::from_error(&e));
            }
            log::info!("Analysis {} detected {} in {} ms", id, classification, response.latency_ms);
            push_notice(
                model,
                ctx,
                Notice::info("Analysis Complete", format!("Detected: {}", classification)),
            );
            if let Some(ticket) = model.presenter.show(id, classification) {
                fetch_narrative(ctx, ticket);
            }
            true
        }
        Err(notice) => {
            if let Err(e) = apply(model, SessionEvent::AnalysisFailed(id)) {
                log::error!("Could not roll back analysis {}: {}", id, e);
            }
            push_notice(model, ctx, notice)
        }
    }
}

fn fetch_narrative(ctx: &Context<Model>, ticket: FetchTicket) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let outcome = api::fetch_narrative(&ticket.request).await;
        link.send_message(Msg::NarrativeLoaded(ticket, outcome));
    });
}

pub fn handle_retry_narrative(model: &mut Model, ctx: &Context<Model>) -> bool {
    match model.presenter.retry() {
        Some(ticket) => {
            fetch_narrative(ctx, ticket);
            true
        }
        None => false,
    }
}

pub fn handle_reset(model: &mut Model) -> bool {
    model.camera.close();
    model.intake.cancel();
    model.file_reader = None;
    model.presenter.clear();
    if let Err(e) = apply(model, SessionEvent::Reset) {
        log::error!("Reset failed: {}", e);
    }
    true
}

// Help

pub fn handle_toggle_help(model: &mut Model, ctx: &Context<Model>, topic: HelpTopic, open: bool) -> bool {
    if !model.help_panel.set_open(topic, open) {
        return false;
    }
    if open {
        handle_load_help(model, ctx, topic);
    }
    true
}

pub fn handle_load_help(model: &mut Model, ctx: &Context<Model>, topic: HelpTopic) -> bool {
    let view = model.help.entry(topic).or_default();
    if matches!(view, NarrativeView::Loading | NarrativeView::Ready(_)) {
        return false;
    }
    *view = NarrativeView::Loading;

    let request: NarrativeRequest = topic.request();
    let link = ctx.link().clone();
    spawn_local(async move {
        let outcome = api::fetch_narrative(&request).await;
        link.send_message(Msg::HelpLoaded(topic, outcome));
    });
    true
}

pub fn handle_help_loaded(
    model: &mut Model,
    topic: HelpTopic,
    outcome: Result<NarrativeResult, NarrativeError>,
) -> bool {
    let view = match outcome {
        Ok(result) => NarrativeView::Ready(result),
        Err(e) => {
            log::warn!("Help content for {:?} failed: {}", topic, e);
            NarrativeView::Error(e.user_message())
        }
    };
    model.help.insert(topic, view);
    true
}

// Notices

pub fn push_notice(model: &mut Model, ctx: &Context<Model>, notice: Notice) -> bool {
    model.next_notice_id += 1;
    let id = model.next_notice_id;

    let link = ctx.link().clone();
    let timer = Timeout::new(NOTICE_DURATION_MS, move || {
        link.send_message(Msg::DismissNotice(id));
    });
    model.notice_timers.insert(id, timer);
    model.notices.push((id, notice));
    true
}

pub fn dismiss_notice(model: &mut Model, id: u64) -> bool {
    if let Some(timer) = model.notice_timers.remove(&id) {
        timer.cancel();
    }
    let before = model.notices.len();
    model.notices.retain(|(notice_id, _)| *notice_id != id);
    model.notices.len() != before
}
