use super::super::{Model, Msg};
use super::results::render_narrative;
use shared::presenter::NarrativeView;
use shared::{DEFAULT_PLANT_TYPE, Disease, NarrativeRequest};
use std::collections::HashSet;
use web_sys::HtmlDetailsElement;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelpTopic {
    EarlyBlight,
    LateBlight,
    Prevention,
}

impl HelpTopic {
    pub const ALL: [HelpTopic; 3] = [HelpTopic::EarlyBlight, HelpTopic::LateBlight, HelpTopic::Prevention];

    pub fn request(self) -> NarrativeRequest {
        match self {
            HelpTopic::EarlyBlight => NarrativeRequest::DescribeDisease(Disease::EarlyBlight),
            HelpTopic::LateBlight => NarrativeRequest::DescribeDisease(Disease::LateBlight),
            HelpTopic::Prevention => NarrativeRequest::SuggestCare {
                plant_type: DEFAULT_PLANT_TYPE.to_string(),
            },
        }
    }

    pub fn heading(self) -> String {
        match self {
            HelpTopic::EarlyBlight => format!("Early Blight / {}", Disease::EarlyBlight.hindi_name()),
            HelpTopic::LateBlight => format!("Late Blight / {}", Disease::LateBlight.hindi_name()),
            HelpTopic::Prevention => "Preventative Measures / निवारक उपाय".to_string(),
        }
    }
}

/// Which help sections are expanded. The `<details>` elements report their own
/// toggles, so this mirrors the DOM instead of driving it from clicks.
#[derive(Debug, Default)]
pub struct HelpPanel {
    open: HashSet<HelpTopic>,
}

impl HelpPanel {
    pub fn is_open(&self, topic: HelpTopic) -> bool {
        self.open.contains(&topic)
    }

    /// Records a toggle. Returns whether the state changed.
    pub fn set_open(&mut self, topic: HelpTopic, open: bool) -> bool {
        if open {
            self.open.insert(topic)
        } else {
            self.open.remove(&topic)
        }
    }
}

pub fn render_help(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <div class="help-card">
            <div class="help-header">
                <i class="fa-solid fa-life-ring fa-3x"></i>
                <h2>{"Help Center / सहायता केंद्र"}</h2>
                <p class="muted">{"Find information about common potato leaf diseases and preventative care."}</p>
                <p class="muted" lang="hi">{"आलू की पत्ती के आम रोगों और निवारक देखभाल के बारे में जानकारी प्राप्त करें।"}</p>
            </div>
            { for HelpTopic::ALL.iter().map(|topic| render_topic(model, ctx, *topic)) }
        </div>
    }
}

fn render_topic(model: &Model, ctx: &Context<Model>, topic: HelpTopic) -> Html {
    let link = ctx.link();
    let view = model.help.get(&topic).cloned().unwrap_or_default();

    html! {
        <details
            class="help-section"
            open={model.help_panel.is_open(topic)}
            ontoggle={link.callback(move |e: Event| {
                let open = e.target_unchecked_into::<HtmlDetailsElement>().open();
                Msg::ToggleHelp(topic, open)
            })}
        >
            <summary>{ topic.heading() }</summary>
            { render_narrative(&view, link.callback(move |_| Msg::LoadHelp(topic))) }
        </details>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_are_tracked_per_topic() {
        let mut panel = HelpPanel::default();

        assert!(panel.set_open(HelpTopic::LateBlight, true));
        assert!(panel.is_open(HelpTopic::LateBlight));
        assert!(!panel.is_open(HelpTopic::EarlyBlight));

        // the re-render echoes the same state back
        assert!(!panel.set_open(HelpTopic::LateBlight, true));

        assert!(panel.set_open(HelpTopic::LateBlight, false));
        assert!(!panel.is_open(HelpTopic::LateBlight));
        assert!(!panel.set_open(HelpTopic::LateBlight, false));
    }

    #[test]
    fn prevention_asks_for_potato_care() {
        assert_eq!(
            HelpTopic::Prevention.request(),
            NarrativeRequest::SuggestCare {
                plant_type: DEFAULT_PLANT_TYPE.to_string()
            }
        );
    }
}
