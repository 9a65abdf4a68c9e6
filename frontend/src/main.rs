mod api;
mod camera;
mod components;

use camera::BrowserStream;
use components::camera_capture::render_camera_capture;
use components::handlers;
use components::header::render_header;
use components::help::{HelpPanel, HelpTopic, render_help};
use components::notices::render_notices;
use components::preview_area::render_preview_area;
use components::results::render_results;
use components::upload_section::render_upload_section;
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use gloo_file::callbacks::FileReader;
use gloo_timers::callback::Timeout;
use shared::camera::{CameraController, OpenTicket};
use shared::intake::{IntakeTicket, IntakeTracker};
use shared::presenter::{FetchTicket, NarrativeView, ResultPresenter};
use shared::session::{AnalysisSession, InputTab};
use shared::{AnalysisId, AnalyzeResponse, CameraError, NarrativeError, NarrativeResult, Notice};
use std::collections::HashMap;
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

pub const NOTICE_DURATION_MS: u32 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Help,
}

pub enum Msg {
    Navigate(Page),
    SelectTab(InputTab),

    // Upload
    FileChosen(GlooFile),
    FileRead(IntakeTicket, Result<String, String>),
    SetDragging(bool),
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),

    // Camera
    OpenCamera,
    CameraOpened(OpenTicket, Result<BrowserStream, CameraError>),
    Capture,
    StopCamera,

    // Analysis
    Analyze,
    AnalysisFinished(AnalysisId, Result<AnalyzeResponse, Notice>),
    NarrativeLoaded(FetchTicket, Result<NarrativeResult, NarrativeError>),
    RetryNarrative,
    Reset,

    // Help
    ToggleHelp(HelpTopic, bool),
    LoadHelp(HelpTopic),
    HelpLoaded(HelpTopic, Result<NarrativeResult, NarrativeError>),

    DismissNotice(u64),
}

pub struct Model {
    page: Page,
    session: AnalysisSession,
    camera: CameraController<BrowserStream>,
    video_ref: NodeRef,
    presenter: ResultPresenter,
    intake: IntakeTracker,
    file_reader: Option<FileReader>,
    is_dragging: bool,
    help: HashMap<HelpTopic, NarrativeView>,
    help_panel: HelpPanel,
    notices: Vec<(u64, Notice)>,
    notice_timers: HashMap<u64, Timeout>,
    next_notice_id: u64,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            page: Page::Home,
            session: AnalysisSession::new(),
            camera: CameraController::default(),
            video_ref: NodeRef::default(),
            presenter: ResultPresenter::new(),
            intake: IntakeTracker::new(),
            file_reader: None,
            is_dragging: false,
            help: HashMap::new(),
            help_panel: HelpPanel::default(),
            notices: Vec::new(),
            notice_timers: HashMap::new(),
            next_notice_id: 0,
            paste_listener: None,
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Navigate(page) => handlers::handle_navigate(self, page),
            Msg::SelectTab(tab) => handlers::handle_select_tab(self, ctx, tab),

            Msg::FileChosen(file) => handlers::handle_file_chosen(self, ctx, file),
            Msg::FileRead(ticket, result) => handlers::handle_file_read(self, ctx, ticket, result),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),

            Msg::OpenCamera => handlers::handle_open_camera(self, ctx),
            Msg::CameraOpened(ticket, result) => handlers::handle_camera_opened(self, ctx, ticket, result),
            Msg::Capture => handlers::handle_capture(self, ctx),
            Msg::StopCamera => {
                self.camera.close();
                true
            }

            Msg::Analyze => handlers::handle_analyze(self, ctx),
            Msg::AnalysisFinished(id, result) => handlers::handle_analysis_finished(self, ctx, id, result),
            Msg::NarrativeLoaded(ticket, outcome) => self.presenter.resolve(&ticket, outcome),
            Msg::RetryNarrative => handlers::handle_retry_narrative(self, ctx),
            Msg::Reset => handlers::handle_reset(self),

            Msg::ToggleHelp(topic, open) => handlers::handle_toggle_help(self, ctx, topic, open),
            Msg::LoadHelp(topic) => handlers::handle_load_help(self, ctx, topic),
            Msg::HelpLoaded(topic, outcome) => handlers::handle_help_loaded(self, topic, outcome),

            Msg::DismissNotice(id) => handlers::dismiss_notice(self, id),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header(self, ctx) }

                <main class="main-content">
                {
                    match self.page {
                        Page::Home => self.render_home(ctx),
                        Page::Help => render_help(self, ctx),
                    }
                }
                </main>

                { render_notices(self, ctx) }

                <footer class="app-footer">
                    <p>{"Potato Pal | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        // the <video> sink may mount after the stream was acquired
        if let Some(stream) = self.camera.stream() {
            stream.attach();
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.camera.close();
    }
}

impl Model {
    fn render_home(&self, ctx: &Context<Self>) -> Html {
        if self.session.in_flight().is_some() {
            return html! {
                <div class="analyzing">
                    <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                    <p class="analyzing-title">{"Analyzing your potato leaf..."}</p>
                    <p class="muted">{"This may take a few moments."}</p>
                </div>
            };
        }

        if self.session.result().is_some() {
            return render_results(self, ctx);
        }

        let link = ctx.link();
        let tab = self.session.tab();
        let tab_button = |target: InputTab, label: &'static str| {
            html! {
                <button
                    class={classes!("tab", (tab == target).then_some("active"))}
                    onclick={link.callback(move |_| Msg::SelectTab(target))}
                >
                    { label }
                </button>
            }
        };

        html! {
            <div class="detection-card">
                <h2 class="card-title">{"Potato Leaf Disease Detection"}</h2>
                <div class="tabs">
                    { tab_button(InputTab::Upload, "Upload Image") }
                    { tab_button(InputTab::Camera, "Use Camera") }
                </div>
                {
                    match tab {
                        InputTab::Upload => render_upload_section(self, ctx),
                        InputTab::Camera => render_camera_capture(self, ctx),
                    }
                }
                { render_preview_area(self, ctx) }
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
