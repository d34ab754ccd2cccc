use serde::Deserialize;

/// Body of a successful `analyze?visualFeatures=Description` call.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub description: Option<ImageDescription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageDescription {
    #[serde(default)]
    pub captions: Vec<Caption>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

impl AnalyzeResponse {
    #[must_use]
    pub fn top_caption(&self) -> Option<&Caption> {
        self.description.as_ref()?.captions.first()
    }
}

/// Body of a successful `ocr` call: regions, each holding lines of words.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub regions: Vec<OcrRegion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrRegion {
    #[serde(default)]
    pub lines: Vec<OcrLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OcrLine {
    #[serde(default)]
    pub words: Vec<OcrWord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrWord {
    pub text: String,
}
