use super::super::{Model, Msg};
use super::utils::debounce;
use shared::UserFacing;
use shared::camera::CameraPhase;
use yew::prelude::*;

pub fn render_camera_capture(model: &Model, ctx: &Context<Model>) -> Html {
    let camera = &model.camera;
    let link = ctx.link().clone();

    if camera.is_disabled() && camera.captured().is_none() {
        return html! {
            <div class="camera-disabled">
                <i class="fa-solid fa-video-slash"></i>
                <p>{"Camera is disabled"}</p>
            </div>
        };
    }

    let phase = camera.phase();
    let live = phase == CameraPhase::Live;

    let stage = match (phase, camera.captured(), camera.error()) {
        // the still itself is shown in the preview below
        (CameraPhase::Captured, Some(_), _) => html! {
            <div class="camera-overlay">
                <i class="fa-solid fa-circle-check fa-2x"></i>
                <p>{"Photo captured"}</p>
            </div>
        },
        (CameraPhase::Initializing, _, _) => html! {
            <div class="camera-overlay">
                <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                <p>{"Initializing Camera..."}</p>
            </div>
        },
        (CameraPhase::Idle, _, Some(err)) => html! {
            <div class="camera-overlay camera-error">
                <i class="fa-solid fa-triangle-exclamation fa-2x"></i>
                <p class="error-title">{ err.title() }</p>
                <p>{ err.user_message() }</p>
                <button class="secondary-btn" onclick={link.callback(|_| Msg::OpenCamera)}>
                    {"Try Again"}
                </button>
            </div>
        },
        (CameraPhase::Idle, _, None) => html! {
            <div class="camera-overlay">
                <i class="fa-solid fa-camera fa-2x"></i>
                <p class="muted">{"Click \"Start Camera\" to begin"}</p>
            </div>
        },
        _ => html! {},
    };

    let controls = match phase {
        CameraPhase::Live => html! {
            <>
                <button
                    class="analyze-btn"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Capture)
                    })}
                >
                    <i class="fa-solid fa-camera"></i>{" Capture Photo"}
                </button>
                <button class="secondary-btn" onclick={link.callback(|_| Msg::StopCamera)}>
                    {"Stop Camera"}
                </button>
            </>
        },
        CameraPhase::Captured => html! {
            <button class="secondary-btn" onclick={link.callback(|_| Msg::OpenCamera)}>
                <i class="fa-solid fa-rotate-left"></i>{" Retake Photo"}
            </button>
        },
        CameraPhase::Idle => html! {
            <button class="analyze-btn" onclick={link.callback(|_| Msg::OpenCamera)}>
                <i class="fa-solid fa-video"></i>{" Start Camera"}
            </button>
        },
        CameraPhase::Initializing => html! {},
    };

    html! {
        <div class="camera-section">
            <p class="section-label">{"Use Camera"}</p>
            <div class="camera-stage">
                // the sink stays mounted so the stream can attach as soon as it arrives
                <video
                    ref={model.video_ref.clone()}
                    class={classes!("camera-video", (!live).then_some("hidden"))}
                />
                { stage }
            </div>
            <div class="button-container">{ controls }</div>
        </div>
    }
}
