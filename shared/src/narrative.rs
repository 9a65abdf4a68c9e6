use crate::classification::{Classification, Disease};
use crate::{CareSuggestionsResponse, DiseaseSummaryResponse};

pub const DEFAULT_PLANT_TYPE: &str = "potato";

/// Which narrative operation a classification calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeRequest {
    DescribeDisease(Disease),
    SuggestCare { plant_type: String },
}

impl NarrativeRequest {
    pub fn for_classification(classification: Classification) -> Self {
        match classification.disease() {
            Some(disease) => NarrativeRequest::DescribeDisease(disease),
            None => NarrativeRequest::SuggestCare {
                plant_type: DEFAULT_PLANT_TYPE.to_string(),
            },
        }
    }
}

/// Generated text for one analysis cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeResult {
    DiseaseSummary {
        disease: Disease,
        summary: String,
        summary_localized: Option<String>,
    },
    CareSuggestions {
        plant_type: String,
        suggestions: String,
        suggestions_localized: Option<String>,
    },
}

impl NarrativeResult {
    pub fn from_disease_summary(disease: Disease, response: DiseaseSummaryResponse) -> Self {
        NarrativeResult::DiseaseSummary {
            disease,
            summary: response.summary,
            summary_localized: non_blank(response.summary_hindi),
        }
    }

    pub fn from_care_suggestions(plant_type: &str, response: CareSuggestionsResponse) -> Self {
        NarrativeResult::CareSuggestions {
            plant_type: plant_type.to_string(),
            suggestions: response.suggestions,
            suggestions_localized: non_blank(response.suggestions_hindi),
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            NarrativeResult::DiseaseSummary { .. } => "Disease Summary",
            NarrativeResult::CareSuggestions { .. } => "Preventative Measures",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            NarrativeResult::DiseaseSummary { summary, .. } => summary,
            NarrativeResult::CareSuggestions { suggestions, .. } => suggestions,
        }
    }

    pub fn localized(&self) -> Option<&str> {
        match self {
            NarrativeResult::DiseaseSummary { summary_localized, .. } => summary_localized.as_deref(),
            NarrativeResult::CareSuggestions {
                suggestions_localized, ..
            } => suggestions_localized.as_deref(),
        }
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_asks_for_care_and_blights_for_summaries() {
        assert_eq!(
            NarrativeRequest::for_classification(Classification::Healthy),
            NarrativeRequest::SuggestCare {
                plant_type: "potato".into()
            }
        );
        assert_eq!(
            NarrativeRequest::for_classification(Classification::LateBlight),
            NarrativeRequest::DescribeDisease(Disease::LateBlight)
        );
    }

    #[test]
    fn blank_localized_text_is_dropped() {
        let result = NarrativeResult::from_disease_summary(
            Disease::EarlyBlight,
            DiseaseSummaryResponse {
                summary: "Caused by Alternaria solani.".into(),
                summary_hindi: Some("   ".into()),
            },
        );
        assert_eq!(result.text(), "Caused by Alternaria solani.");
        assert_eq!(result.localized(), None);
        assert_eq!(result.heading(), "Disease Summary");
    }
}
