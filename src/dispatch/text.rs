use std::time::Duration;

use tracing::{error, info};

use crate::clients::ImageAnalyzer;
use crate::core::models::{OcrLine, OcrRegion, OcrResponse};

pub const IMAGE_TEXT_PREFIX: &str = "Image Text:\n";
const WORD_SEPARATOR: &str = " ";
const LINE_SEPARATOR: &str = "\n\n";
const REGION_SEPARATOR: &str = ",";

/// Extracts printed text from the image. Yields nothing when no text was
/// found or the call failed.
pub async fn run(
    analyzer: &dyn ImageAnalyzer,
    media_url: &str,
    deadline: Duration,
) -> Option<String> {
    match tokio::time::timeout(deadline, analyzer.recognize_text(media_url)).await {
        Ok(Ok(resp)) => {
            info!(regions = resp.regions.len(), "Text extraction succeeded");
            text_fragment(&resp)
        }
        Ok(Err(e)) => {
            error!("Text extraction failed: {}", e);
            None
        }
        Err(_) => {
            error!("Text extraction timed out after {}s", deadline.as_secs());
            None
        }
    }
}

#[must_use]
pub fn text_fragment(resp: &OcrResponse) -> Option<String> {
    if resp.regions.is_empty() {
        return None;
    }
    let regions: Vec<String> = resp.regions.iter().map(flatten_region).collect();
    Some(format!("{IMAGE_TEXT_PREFIX}{}", regions.join(REGION_SEPARATOR)))
}

fn flatten_region(region: &OcrRegion) -> String {
    region
        .lines
        .iter()
        .map(flatten_line)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

fn flatten_line(line: &OcrLine) -> String {
    line.words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(WORD_SEPARATOR)
}
