use std::time::Duration;

use tracing::{error, info};

use crate::clients::ImageAnalyzer;
use crate::core::models::AnalyzeResponse;
use crate::errors::ResponderError;

pub const CAPTION_FAILURE_MESSAGE: &str = "Sorry. I was not able to analyze this media.";

/// Describes the image. Always yields a fragment: the caption on success, an
/// apology on any failure.
pub async fn run(analyzer: &dyn ImageAnalyzer, media_url: &str, deadline: Duration) -> String {
    let outcome = match tokio::time::timeout(deadline, analyzer.describe(media_url)).await {
        Ok(result) => result.and_then(|resp| caption_fragment(&resp)),
        Err(_) => Err(ResponderError::AnalysisError(format!(
            "description timed out after {}s",
            deadline.as_secs()
        ))),
    };

    match outcome {
        Ok(fragment) => {
            info!("Caption analysis succeeded");
            fragment
        }
        Err(e) => {
            error!("Caption analysis failed: {}", e);
            CAPTION_FAILURE_MESSAGE.to_string()
        }
    }
}

pub fn caption_fragment(resp: &AnalyzeResponse) -> Result<String, ResponderError> {
    let caption = resp
        .top_caption()
        .filter(|c| !c.text.trim().is_empty())
        .ok_or_else(|| ResponderError::AnalysisError("response had no caption".to_string()))?;

    Ok(format!(
        "I am {} percent confident that this image can be described as {}",
        confidence_percent(caption.confidence),
        caption.text
    ))
}

/// Confidence in `[0.0, 1.0]` as a rounded whole percentage.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn confidence_percent(confidence: f64) -> i64 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as i64
}
