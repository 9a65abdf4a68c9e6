use gloo_net::http::{Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{
    AnalyzeRequest, AnalyzeResponse, CareSuggestionsRequest, CareSuggestionsResponse, DiseaseSummaryRequest,
    DiseaseSummaryResponse, ErrorResponse, ImageAsset, NarrativeError, NarrativeRequest, NarrativeResult, Notice,
    NoticeVariant,
};

/// Sends the current image for classification.
pub async fn analyze(asset: &ImageAsset) -> Result<AnalyzeResponse, Notice> {
    post_json("/api/analyze", &AnalyzeRequest::from(asset))
        .await
        .map_err(|message| Notice {
            title: "Analysis failed".into(),
            description: message,
            variant: NoticeVariant::Destructive,
        })
}

pub async fn fetch_narrative(request: &NarrativeRequest) -> Result<NarrativeResult, NarrativeError> {
    match request {
        NarrativeRequest::DescribeDisease(disease) => {
            let body = DiseaseSummaryRequest { disease_name: *disease };
            let response: DiseaseSummaryResponse = post_json("/api/narrative/disease-summary", &body)
                .await
                .map_err(NarrativeError::GenerationFailed)?;
            Ok(NarrativeResult::from_disease_summary(*disease, response))
        }
        NarrativeRequest::SuggestCare { plant_type } => {
            let body = CareSuggestionsRequest {
                plant_type: plant_type.clone(),
            };
            let response: CareSuggestionsResponse = post_json("/api/narrative/preventative-measures", &body)
                .await
                .map_err(NarrativeError::GenerationFailed)?;
            Ok(NarrativeResult::from_care_suggestions(plant_type, response))
        }
    }
}

async fn post_json<B, T>(url: &str, body: &B) -> Result<T, String>
where
    B: Serialize,
    T: DeserializeOwned,
{
    let request = Request::post(url)
        .json(body)
        .map_err(|e| format!("Failed to build request: {}", e))?;

    match request.send().await {
        Ok(response) if response.ok() => response
            .json::<T>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e)),
        Ok(response) => Err(error_message(response).await),
        Err(e) => Err(format!("Network error: {}", e)),
    }
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(error) => {
            log::warn!("{} failed with {} ({})", response.url(), status, error.code);
            error.error
        }
        Err(_) => format!("Server error: {} - {}", status, body),
    }
}
