use super::super::{Model, Msg, Page};
use yew::prelude::*;

/// Renders the application header with Home / Help navigation.
pub fn render_header(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let nav_item = |page: Page, label: &'static str| {
        html! {
            <button
                class={classes!("nav-link", (model.page == page).then_some("active"))}
                onclick={link.callback(move |_| Msg::Navigate(page))}
            >
                { label }
            </button>
        }
    };

    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-leaf"></i> {" Potato Pal"}</h1>
            <nav class="app-nav">
                { nav_item(Page::Home, "Home") }
                { nav_item(Page::Help, "Help") }
            </nav>
        </header>
    }
}
