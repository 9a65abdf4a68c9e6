use super::super::{Model, Msg};
use shared::NarrativeResult;
use shared::presenter::NarrativeView;
use yew::prelude::*;

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let Some((id, classification)) = model.session.result() else {
        return html! {};
    };
    let link = ctx.link();

    html! {
        <div class={classes!("results-container", classification.severity())}>
            <div class="result-header">
                <h2 title={format!("Analysis {}", id)}>
                    {
                        if classification.disease().is_some() {
                            html! { <i class="fa-solid fa-triangle-exclamation"></i> }
                        } else {
                            html! { <i class="fa-solid fa-circle-check"></i> }
                        }
                    }
                    { format!(" {}", classification.headline()) }
                </h2>
                {
                    match model.session.image() {
                        Some(image) => html! {
                            <img class="result-image" src={image.data_url()} alt="Analyzed leaf" />
                        },
                        None => html! {},
                    }
                }
            </div>

            <div class="detailed-results">
                <h3>{"AI Insights:"}</h3>
                { render_narrative(model.presenter.view(), link.callback(|_| Msg::RetryNarrative)) }
            </div>

            <div class="button-container">
                <button class="analyze-btn" onclick={link.callback(|_| Msg::Reset)}>
                    <i class="fa-solid fa-rotate"></i>{" Analyze Another Leaf"}
                </button>
            </div>
        </div>
    }
}

/// Shared by the result card and the help sections.
pub fn render_narrative(view: &NarrativeView, on_retry: Callback<MouseEvent>) -> Html {
    match view {
        NarrativeView::Idle => html! {},
        NarrativeView::Loading => html! {
            <div class="skeleton">
                <div class="skeleton-line"></div>
                <div class="skeleton-line"></div>
                <div class="skeleton-line short"></div>
            </div>
        },
        NarrativeView::Error(message) => html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p><strong>{"Error"}</strong>{" "}{ message }</p>
                <button class="secondary-btn" onclick={on_retry}>{"Try Again"}</button>
            </div>
        },
        NarrativeView::Ready(result) => render_ready(result),
    }
}

fn render_ready(result: &NarrativeResult) -> Html {
    html! {
        <div class="narrative">
            <p class="narrative-heading">{ format!("{}:", result.heading()) }</p>
            { paragraphs(result.text()) }
            {
                match result.localized() {
                    Some(hindi) => html! {
                        <div class="narrative-localized" lang="hi">
                            <p class="narrative-heading">{"हिंदी में:"}</p>
                            { paragraphs(hindi) }
                        </div>
                    },
                    None => html! {},
                }
            }
        </div>
    }
}

fn paragraphs(text: &str) -> Html {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| html! { <p>{ line.to_string() }</p> })
        .collect::<Html>()
}
