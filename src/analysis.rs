use serde::{Deserialize, Serialize};

pub const DEFAULT_TYPE: &str = "Photo";
pub const DEFAULT_STYLE: &str = "Professional photography";
pub const DEFAULT_LIGHTING: &str = "Balanced natural lighting";
pub const DEFAULT_COMPOSITION: &str = "Well-composed with balanced elements";
pub const DEFAULT_COLORS: &str = "Natural and balanced color palette";
pub const DEFAULT_MOOD: &str = "Neutral and balanced";
pub const DEFAULT_REALISM: &str = "High realism with natural textures";

/// Visual style summary of one uploaded image, as returned to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    #[serde(rename = "type")]
    pub kind: String,
    pub style: String,
    pub lighting: String,
    pub composition: String,
    pub colors: String,
    pub mood: String,
    pub realism: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<String>,
}

impl Default for ImageAnalysis {
    fn default() -> Self {
        Self {
            kind: DEFAULT_TYPE.to_string(),
            style: DEFAULT_STYLE.to_string(),
            lighting: DEFAULT_LIGHTING.to_string(),
            composition: DEFAULT_COMPOSITION.to_string(),
            colors: DEFAULT_COLORS.to_string(),
            mood: DEFAULT_MOOD.to_string(),
            realism: DEFAULT_REALISM.to_string(),
            person_description: None,
            objects_description: None,
            environment_description: None,
            image_width: None,
            image_height: None,
            tags: Vec::new(),
            objects: Vec::new(),
            faces: Vec::new(),
        }
    }
}

impl ImageAnalysis {
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image_width.zip(self.image_height)
    }
}

/// What a provider hands back: the analysis, plus a prompt when the model wrote one.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionReport {
    pub analysis: ImageAnalysis,
    pub draft_prompt: Option<String>,
}

impl VisionReport {
    pub fn new(analysis: ImageAnalysis) -> Self {
        Self {
            analysis,
            draft_prompt: None,
        }
    }

    /// Static report served when the provider is down and degradation is enabled.
    pub fn fallback() -> Self {
        Self::new(ImageAnalysis::default())
    }

    /// Fills in pixel dimensions the provider did not report.
    pub fn with_dimensions(mut self, dimensions: Option<(u32, u32)>) -> Self {
        if self.analysis.dimensions().is_none() {
            if let Some((width, height)) = dimensions {
                self.analysis.image_width = Some(width);
                self.analysis.image_height = Some(height);
            }
        }
        self
    }
}
