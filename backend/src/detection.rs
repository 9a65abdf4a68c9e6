use std::time::Duration;

use futures::future::BoxFuture;
use log::info;
use rand::Rng;
use shared::{Classification, ImageAsset, SessionError};

/// Something that can label a potato leaf image.
pub trait LeafClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn classify<'a>(&'a self, image: &'a ImageAsset) -> BoxFuture<'a, Classification>;
}

/// Stand-in detector: waits a fixed latency, then picks one of the three
/// outcomes uniformly at random. The image content is not inspected.
#[derive(Debug, Clone)]
pub struct SimulatedClassifier {
    latency: Duration,
}

impl SimulatedClassifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl LeafClassifier for SimulatedClassifier {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn classify<'a>(&'a self, _image: &'a ImageAsset) -> BoxFuture<'a, Classification> {
        Box::pin(async move {
            tokio::time::sleep(self.latency).await;
            pick_uniform(&mut rand::rng())
        })
    }
}

pub fn pick_uniform<R: Rng + ?Sized>(rng: &mut R) -> Classification {
    Classification::ALL[rng.random_range(0..Classification::ALL.len())]
}

/// Runs one analysis. Rejects up-front when there is no image, without waiting.
pub async fn analyze(
    classifier: &dyn LeafClassifier,
    image: Option<&ImageAsset>,
) -> Result<Classification, SessionError> {
    let image = image.ok_or(SessionError::NoImageSelected)?;
    let classification = classifier.classify(image).await;
    info!(
        "{} classifier labelled {} image as {}",
        classifier.name(),
        image.source,
        classification
    );
    Ok(classification)
}
