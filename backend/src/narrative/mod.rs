pub mod gemini;
pub mod prompts;

use futures::future::BoxFuture;
use shared::{CareSuggestionsResponse, Disease, DiseaseSummaryResponse, NarrativeError};

pub use gemini::GeminiNarrativeGenerator;
pub use prompts::PromptTemplates;

/// Generates the explanatory text shown next to a classification.
pub trait NarrativeGenerator: Send + Sync {
    fn is_configured(&self) -> bool;

    fn describe_disease(&self, disease: Disease) -> BoxFuture<'_, Result<DiseaseSummaryResponse, NarrativeError>>;

    fn suggest_care<'a>(&'a self, plant_type: &'a str)
    -> BoxFuture<'a, Result<CareSuggestionsResponse, NarrativeError>>;
}

/// Used when no model credentials are configured. Every call fails, which the
/// client shows as its retryable narrative error.
#[derive(Debug, Default)]
pub struct UnconfiguredNarrativeGenerator;

const NOT_CONFIGURED: &str = "narrative generation is not configured (GEMINI_API_KEY unset)";

impl NarrativeGenerator for UnconfiguredNarrativeGenerator {
    fn is_configured(&self) -> bool {
        false
    }

    fn describe_disease(&self, _disease: Disease) -> BoxFuture<'_, Result<DiseaseSummaryResponse, NarrativeError>> {
        Box::pin(async { Err(NarrativeError::GenerationFailed(NOT_CONFIGURED.into())) })
    }

    fn suggest_care<'a>(
        &'a self,
        _plant_type: &'a str,
    ) -> BoxFuture<'a, Result<CareSuggestionsResponse, NarrativeError>> {
        Box::pin(async { Err(NarrativeError::GenerationFailed(NOT_CONFIGURED.into())) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_generator_always_fails() {
        let generator = UnconfiguredNarrativeGenerator;

        assert!(!generator.is_configured());
        assert!(matches!(
            generator.describe_disease(Disease::EarlyBlight).await,
            Err(NarrativeError::GenerationFailed(_))
        ));
        assert!(generator.suggest_care("potato").await.is_err());
    }
}
