use super::super::{Model, Msg};
use shared::NoticeVariant;
use yew::prelude::*;

pub fn render_notices(model: &Model, ctx: &Context<Model>) -> Html {
    if model.notices.is_empty() {
        return html! {};
    }

    html! {
        <div class="notice-stack" role="status">
            { for model.notices.iter().map(|(id, notice)| {
                let id = *id;
                html! {
                    <div
                        key={id.to_string()}
                        class={classes!("notice", (notice.variant == NoticeVariant::Destructive).then_some("destructive"))}
                    >
                        <div class="notice-body">
                            <p class="notice-title">{ &notice.title }</p>
                            <p class="notice-description">{ &notice.description }</p>
                        </div>
                        <button
                            class="notice-close"
                            title="Dismiss"
                            onclick={ctx.link().callback(move |_| Msg::DismissNotice(id))}
                        >
                            <i class="fa-solid fa-xmark"></i>
                        </button>
                    </div>
                }
            })}
        </div>
    }
}
