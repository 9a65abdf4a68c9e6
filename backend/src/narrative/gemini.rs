use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, error, info};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shared::{CareSuggestionsResponse, Disease, DiseaseSummaryResponse, NarrativeError};
use thiserror::Error;
use url::Url;

use super::NarrativeGenerator;
use super::prompts::PromptTemplates;
use crate::config::GeminiConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("Gemini returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Gemini response contained no text")]
    EmptyResponse,
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Gemini left `{0}` blank")]
    BlankField(&'static str),
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Narrative generator backed by the Gemini `generateContent` endpoint in
/// structured-output mode.
pub struct GeminiNarrativeGenerator {
    http: HttpClient,
    endpoint: Url,
    api_key: String,
    prompts: PromptTemplates,
    bilingual: bool,
}

impl GeminiNarrativeGenerator {
    pub fn new(config: &GeminiConfig, prompts: PromptTemplates, bilingual: bool) -> Result<Self, GeminiError> {
        let endpoint = Url::parse(&format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.as_str().trim_end_matches('/'),
            config.model
        ))?;
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        info!("Gemini narrative generator using model {}", config.model);
        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            prompts,
            bilingual,
        })
    }

    async fn generate<T: DeserializeOwned>(&self, prompt: String, schema: Value) -> Result<T, GeminiError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text.filter(|t| !t.trim().is_empty()))
            .ok_or(GeminiError::EmptyResponse)?;

        debug!("Gemini returned {} bytes of text", text.len());
        Ok(serde_json::from_str(strip_code_fence(&text))?)
    }

    async fn disease_summary(&self, disease: Disease) -> Result<DiseaseSummaryResponse, GeminiError> {
        let prompt = self.prompts.disease_summary(disease, self.bilingual);
        let mut response: DiseaseSummaryResponse = self
            .generate(prompt, response_schema("summary", "summaryHindi", self.bilingual))
            .await?;

        if response.summary.trim().is_empty() {
            return Err(GeminiError::BlankField("summary"));
        }
        if !self.bilingual {
            response.summary_hindi = None;
        }
        Ok(response)
    }

    async fn care_suggestions(&self, plant_type: &str) -> Result<CareSuggestionsResponse, GeminiError> {
        let prompt = self.prompts.preventative_measures(plant_type, self.bilingual);
        let mut response: CareSuggestionsResponse = self
            .generate(prompt, response_schema("suggestions", "suggestionsHindi", self.bilingual))
            .await?;

        if response.suggestions.trim().is_empty() {
            return Err(GeminiError::BlankField("suggestions"));
        }
        if !self.bilingual {
            response.suggestions_hindi = None;
        }
        Ok(response)
    }
}

impl NarrativeGenerator for GeminiNarrativeGenerator {
    fn is_configured(&self) -> bool {
        true
    }

    fn describe_disease(&self, disease: Disease) -> BoxFuture<'_, Result<DiseaseSummaryResponse, NarrativeError>> {
        Box::pin(async move {
            self.disease_summary(disease).await.map_err(|e| {
                error!("Disease summary for {} failed: {}", disease, e);
                NarrativeError::GenerationFailed(e.to_string())
            })
        })
    }

    fn suggest_care<'a>(
        &'a self,
        plant_type: &'a str,
    ) -> BoxFuture<'a, Result<CareSuggestionsResponse, NarrativeError>> {
        Box::pin(async move {
            self.care_suggestions(plant_type).await.map_err(|e| {
                error!("Care suggestions for {} failed: {}", plant_type, e);
                NarrativeError::GenerationFailed(e.to_string())
            })
        })
    }
}

fn response_schema(primary: &str, localized: &str, bilingual: bool) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(primary.to_string(), json!({ "type": "STRING" }));
    if bilingual {
        properties.insert(localized.to_string(), json!({ "type": "STRING" }));
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": [primary]
    })
}

// Some models wrap JSON output in a markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}
