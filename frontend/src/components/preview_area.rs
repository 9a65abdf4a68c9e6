use super::super::{Model, Msg};
use super::utils::{debounce, format_bytes};
use shared::ImageSource;
use shared::session::InputTab;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();
    let session = &model.session;

    let preview = match session.preview() {
        Some(image) => {
            let label = match image.source {
                ImageSource::Uploaded => "Selected Image",
                ImageSource::Captured => "Captured Image",
            };
            html! {
                <div id="preview-container">
                    <p class="muted">{ format!("{} ({})", label, format_bytes(image.decoded_len())) }</p>
                    <img id="actual-image-preview" src={image.data_url()} alt="Selected leaf" />
                </div>
            }
        }
        None if session.tab() == InputTab::Upload => html! {
            <div class="preview-placeholder">
                <i class="fa-regular fa-image fa-2x"></i>
                <p>{"Image preview will appear here"}</p>
            </div>
        },
        None => html! {},
    };

    html! {
        <>
            { preview }
            <div class="button-container">
                <button
                    class="analyze-btn"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Analyze)
                    })}
                    disabled={!session.can_analyze()}
                >
                    <i class="fa-solid fa-magnifying-glass"></i>{" Analyze Leaf"}
                </button>
            </div>
        </>
    }
}
