//! Azure Computer Vision v3.2 `analyze` REST call.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::{read_json, VisionProvider};
use crate::analysis::VisionReport;
use crate::classify::{classify, VisionSignals};
use crate::error::AnalyzeError;
use crate::image_data::ImageUpload;

const ANALYZE_PATH: &str = "/vision/v3.2/analyze";
const VISUAL_FEATURES: &str = "Categories,Tags,Description,Color,ImageType,Objects,Faces";

pub struct AzureVision {
    client: Client,
    url: String,
    key: String,
}

impl AzureVision {
    pub fn new(client: Client, endpoint: &str, key: &str) -> Self {
        Self {
            client,
            url: format!("{}{ANALYZE_PATH}", endpoint.trim_end_matches('/')),
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl VisionProvider for AzureVision {
    fn name(&self) -> &'static str {
        "Azure Vision"
    }

    async fn analyze(&self, upload: &ImageUpload) -> Result<VisionReport, AnalyzeError> {
        info!(url = %self.url, bytes = upload.bytes().len(), "📤 Sending image to Azure Computer Vision");

        let response = self
            .client
            .post(&self.url)
            .query(&[("visualFeatures", VISUAL_FEATURES), ("language", "en")])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/octet-stream")
            .body(upload.bytes().to_vec())
            .send()
            .await?;

        let payload: AnalyzeResponse = read_json(self.name(), response).await?;
        let signals = payload.into_signals()?;
        info!(
            caption = %signals.caption,
            tags = signals.tags.len(),
            categories = signals.categories.len(),
            image_type = %signals.image_type,
            "✅ Azure analysis received"
        );

        Ok(VisionReport::new(classify(&signals)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    categories: Vec<Named>,
    tags: Option<Vec<Named>>,
    description: Option<Description>,
    color: Option<ColorInfo>,
    image_type: Option<ImageTypeInfo>,
    #[serde(default)]
    objects: Vec<DetectedObject>,
    #[serde(default)]
    faces: Vec<Face>,
    metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Description {
    #[serde(default)]
    captions: Vec<Caption>,
}

#[derive(Debug, Deserialize)]
struct Caption {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorInfo {
    #[serde(default)]
    dominant_colors: Vec<String>,
    #[serde(default)]
    is_bw_img: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageTypeInfo {
    #[serde(default)]
    clip_art_type: u8,
    #[serde(default)]
    line_drawing_type: u8,
}

#[derive(Debug, Deserialize)]
struct DetectedObject {
    object: String,
}

#[derive(Debug, Deserialize)]
struct Face {
    age: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    width: u32,
    height: u32,
}

impl ImageTypeInfo {
    // clipArtType: 0 none, 1 ambiguous, 2 normal, 3 good.
    fn label(&self) -> &'static str {
        if self.line_drawing_type == 1 {
            "line drawing"
        } else if self.clip_art_type >= 2 {
            "clip art illustration"
        } else {
            "photo"
        }
    }
}

impl AnalyzeResponse {
    fn into_signals(self) -> Result<VisionSignals, AnalyzeError> {
        let (Some(description), Some(tags)) = (self.description, self.tags) else {
            return Err(AnalyzeError::InvalidStructure(
                "missing description or tags".to_string(),
            ));
        };

        let caption = description
            .captions
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_default();

        let mut dominant_colors = Vec::new();
        if let Some(color) = self.color {
            if color.is_bw_img {
                dominant_colors.push("Black and white".to_string());
            }
            dominant_colors.extend(color.dominant_colors);
        }

        let faces = self
            .faces
            .into_iter()
            .map(|face| match face.age {
                Some(age) => format!("face, around {age} years old"),
                None => "face".to_string(),
            })
            .collect();

        Ok(VisionSignals {
            image_type: self
                .image_type
                .map(|t| t.label())
                .unwrap_or("photo")
                .to_string(),
            description: caption.clone(),
            caption,
            tags: tags.into_iter().map(|t| t.name).collect(),
            categories: self.categories.into_iter().map(|c| c.name).collect(),
            dominant_colors,
            objects: self.objects.into_iter().map(|o| o.object).collect(),
            faces,
            dimensions: self.metadata.map(|m| (m.width, m.height)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "categories": [{"name": "people_portrait", "score": 0.8}],
        "tags": [{"name": "person", "confidence": 0.99}, {"name": "outdoor", "confidence": 0.9}],
        "description": {
            "tags": ["person", "smiling"],
            "captions": [{"text": "a woman smiling in bright sunlight", "confidence": 0.52}]
        },
        "color": {
            "dominantColorForeground": "White",
            "dominantColorBackground": "Green",
            "dominantColors": ["White", "Green"],
            "accentColor": "A5732B",
            "isBwImg": false
        },
        "imageType": {"clipArtType": 0, "lineDrawingType": 0},
        "objects": [{"rectangle": {"x": 1, "y": 2, "w": 3, "h": 4}, "object": "person", "confidence": 0.8}],
        "faces": [{"age": 31, "faceRectangle": {"left": 1, "top": 1, "width": 5, "height": 5}}],
        "requestId": "abc",
        "metadata": {"height": 1920, "width": 1080, "format": "Jpeg"}
    }"#;

    #[test]
    fn maps_response_to_signals() {
        let payload: AnalyzeResponse = serde_json::from_str(SAMPLE).unwrap();
        let signals = payload.into_signals().unwrap();

        assert_eq!(signals.caption, "a woman smiling in bright sunlight");
        assert_eq!(signals.image_type, "photo");
        assert_eq!(signals.tags, vec!["person", "outdoor"]);
        assert_eq!(signals.categories, vec!["people_portrait"]);
        assert_eq!(signals.dominant_colors, vec!["White", "Green"]);
        assert_eq!(signals.objects, vec!["person"]);
        assert_eq!(signals.faces, vec!["face, around 31 years old"]);
        assert_eq!(signals.dimensions, Some((1080, 1920)));
    }

    #[test]
    fn classified_sample_reads_as_bright_portrait() {
        let payload: AnalyzeResponse = serde_json::from_str(SAMPLE).unwrap();
        let analysis = classify(&payload.into_signals().unwrap());

        assert_eq!(analysis.kind, "Photo");
        assert_eq!(analysis.lighting, "Bright and well-lit scene");
        assert_eq!(analysis.mood, "Cheerful and positive");
        assert_eq!(analysis.colors, "Color palette featuring: White, Green");
    }

    #[test]
    fn line_drawings_are_illustrations() {
        let payload: AnalyzeResponse = serde_json::from_str(
            r#"{"tags": [], "description": {"captions": []},
                "imageType": {"clipArtType": 0, "lineDrawingType": 1}}"#,
        )
        .unwrap();
        let analysis = classify(&payload.into_signals().unwrap());
        assert_eq!(analysis.kind, "Illustration");
    }

    #[test]
    fn missing_tags_is_invalid_structure() {
        let payload: AnalyzeResponse =
            serde_json::from_str(r#"{"description": {"captions": []}}"#).unwrap();
        assert!(matches!(
            payload.into_signals(),
            Err(AnalyzeError::InvalidStructure(_))
        ));
    }
}
