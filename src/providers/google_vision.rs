//! Google Cloud Vision `images:annotate` REST call.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{read_json, VisionProvider};
use crate::analysis::VisionReport;
use crate::classify::{classify, VisionSignals};
use crate::error::AnalyzeError;
use crate::image_data::ImageUpload;

const ANNOTATE_URL: &str = "https://vision.googleapis.com/v1/images:annotate";
const MAX_LABELS: u32 = 20;
const MAX_OBJECTS: u32 = 10;
const MAX_FACES: u32 = 5;

// Reference swatches for naming RGB colours.
const NAMED_COLORS: &[(&str, [f32; 3])] = &[
    ("Black", [0.0, 0.0, 0.0]),
    ("White", [255.0, 255.0, 255.0]),
    ("Grey", [128.0, 128.0, 128.0]),
    ("Red", [200.0, 30.0, 30.0]),
    ("Orange", [240.0, 140.0, 30.0]),
    ("Yellow", [240.0, 220.0, 50.0]),
    ("Green", [40.0, 150.0, 60.0]),
    ("Teal", [0.0, 128.0, 128.0]),
    ("Blue", [40.0, 80.0, 200.0]),
    ("Purple", [120.0, 50.0, 160.0]),
    ("Pink", [240.0, 150.0, 180.0]),
    ("Brown", [120.0, 80.0, 40.0]),
    ("Beige", [225.0, 205.0, 170.0]),
];

pub struct GoogleVision {
    client: Client,
    url: String,
    api_key: String,
}

impl GoogleVision {
    pub fn new(client: Client, api_key: &str) -> Self {
        Self::with_url(client, ANNOTATE_URL, api_key)
    }

    pub fn with_url(client: Client, url: &str, api_key: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl VisionProvider for GoogleVision {
    fn name(&self) -> &'static str {
        "Google Vision"
    }

    async fn analyze(&self, upload: &ImageUpload) -> Result<VisionReport, AnalyzeError> {
        info!(bytes = upload.bytes().len(), "📤 Sending image to Google Cloud Vision");

        let body = json!({
            "requests": [{
                "image": { "content": upload.base64() },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": MAX_LABELS },
                    { "type": "IMAGE_PROPERTIES" },
                    { "type": "OBJECT_LOCALIZATION", "maxResults": MAX_OBJECTS },
                    { "type": "FACE_DETECTION", "maxResults": MAX_FACES }
                ]
            }]
        });

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let batch: AnnotateBatch = read_json(self.name(), response).await?;
        let signals = batch.into_signals()?;
        info!(
            labels = signals.tags.len(),
            objects = signals.objects.len(),
            faces = signals.faces.len(),
            "✅ Google Vision annotations received"
        );

        Ok(VisionReport::new(classify(&signals)))
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateBatch {
    responses: Option<Vec<AnnotateResponse>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    label_annotations: Vec<Label>,
    image_properties_annotation: Option<ImageProperties>,
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObject>,
    #[serde(default)]
    face_annotations: Vec<FaceAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct Label {
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageProperties {
    dominant_colors: DominantColors,
}

#[derive(Debug, Deserialize)]
struct DominantColors {
    #[serde(default)]
    colors: Vec<ColorScore>,
}

#[derive(Debug, Deserialize)]
struct ColorScore {
    color: Rgb,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
struct Rgb {
    #[serde(default)]
    red: f32,
    #[serde(default)]
    green: f32,
    #[serde(default)]
    blue: f32,
}

#[derive(Debug, Deserialize)]
struct LocalizedObject {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceAnnotation {
    joy_likelihood: Option<String>,
    sorrow_likelihood: Option<String>,
    anger_likelihood: Option<String>,
    surprise_likelihood: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    message: String,
}

impl Rgb {
    fn name(&self) -> &'static str {
        let distance = |[r, g, b]: [f32; 3]| {
            (self.red - r).powi(2) + (self.green - g).powi(2) + (self.blue - b).powi(2)
        };
        NAMED_COLORS
            .iter()
            .min_by(|a, b| distance(a.1).total_cmp(&distance(b.1)))
            .map(|(name, _)| *name)
            .unwrap_or("Grey")
    }
}

fn likely(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("LIKELY" | "VERY_LIKELY"))
}

impl FaceAnnotation {
    fn expression(&self) -> &'static str {
        if likely(&self.joy_likelihood) {
            "smiling face"
        } else if likely(&self.sorrow_likelihood) {
            "sad expression"
        } else if likely(&self.anger_likelihood) {
            "intense expression"
        } else if likely(&self.surprise_likelihood) {
            "surprised expression"
        } else {
            "neutral expression"
        }
    }
}

impl AnnotateBatch {
    fn into_signals(self) -> Result<VisionSignals, AnalyzeError> {
        let response = self
            .responses
            .and_then(|responses| responses.into_iter().next())
            .ok_or_else(|| AnalyzeError::InvalidStructure("missing responses".to_string()))?;

        if let Some(status) = response.error {
            warn!(message = %status.message, "Google Vision rejected the image");
            return Err(AnalyzeError::Rejected(status.message));
        }

        let labels: Vec<String> = response
            .label_annotations
            .into_iter()
            .map(|label| label.description)
            .collect();
        let label_text = labels.join(", ");

        let mut colors = response
            .image_properties_annotation
            .map(|props| props.dominant_colors.colors)
            .unwrap_or_default();
        colors.sort_by(|a, b| b.score.total_cmp(&a.score));

        Ok(VisionSignals {
            image_type: label_text.clone(),
            caption: label_text.clone(),
            description: label_text,
            tags: labels,
            categories: Vec::new(),
            dominant_colors: colors
                .iter()
                .map(|c| c.color.name().to_string())
                .collect(),
            objects: response
                .localized_object_annotations
                .into_iter()
                .map(|o| o.name)
                .collect(),
            faces: response
                .face_annotations
                .iter()
                .map(|f| f.expression().to_string())
                .collect(),
            dimensions: None,
        })
    }
}
