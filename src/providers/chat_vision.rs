//! OpenAI-style chat-completions backends (OpenAI, Azure OpenAI, ZAI) that
//! describe the image with a vision model and answer in JSON.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{error, info};

use super::{preview, read_json, VisionProvider};
use crate::analysis::{
    ImageAnalysis, VisionReport, DEFAULT_COLORS, DEFAULT_COMPOSITION, DEFAULT_LIGHTING,
    DEFAULT_MOOD, DEFAULT_REALISM, DEFAULT_STYLE, DEFAULT_TYPE,
};
use crate::config::PromptSource;
use crate::error::AnalyzeError;
use crate::image_data::ImageUpload;

const AZURE_OPENAI_API_VERSION: &str = "2024-06-01";
const MAX_TOKENS: u32 = 900;

const SYSTEM_INSTRUCTION: &str = "You are an expert photographer and art director. \
You analyse the visual style of images so they can be recreated with a different person's face. \
Always answer with a single JSON object and nothing else.";

const ANALYSIS_INSTRUCTION: &str = "Analyse this image and reply with a JSON object with these string fields:\n\
type: Photo, Illustration, Digital Art, Anime or 3D Render\n\
style: photographic or artistic style\n\
lighting: lighting setup and quality\n\
composition: framing, angle and shot type\n\
colors: dominant palette and grading\n\
mood: overall atmosphere\n\
realism: level of realism and texture detail\n\
personDescription: pose, clothing and expression of the main person (omit if nobody is visible)\n\
objectsDescription: notable objects or props\n\
environmentDescription: location and background";

const PROMPT_INSTRUCTION: &str = "\nAlso add a field prompt: a detailed prompt for Gemini that \
recreates this exact scene and style with [USER FACE] as the main subject.";

enum Auth {
    Bearer(String),
    ApiKey(String),
}

pub struct ChatVision {
    client: Client,
    name: &'static str,
    url: String,
    auth: Auth,
    model: Option<String>,
    extra_headers: Vec<(&'static str, String)>,
    prompt_source: PromptSource,
}

impl ChatVision {
    pub fn openai(
        client: Client,
        base_url: &str,
        api_key: &str,
        model: &str,
        prompt_source: PromptSource,
    ) -> Self {
        Self {
            client,
            name: "OpenAI",
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            auth: Auth::Bearer(api_key.to_string()),
            model: Some(model.to_string()),
            extra_headers: Vec::new(),
            prompt_source,
        }
    }

    pub fn azure_openai(
        client: Client,
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        prompt_source: PromptSource,
    ) -> Self {
        Self {
            client,
            name: "Azure OpenAI",
            url: format!(
                "{}/openai/deployments/{deployment}/chat/completions?api-version={AZURE_OPENAI_API_VERSION}",
                endpoint.trim_end_matches('/')
            ),
            auth: Auth::ApiKey(api_key.to_string()),
            model: None,
            extra_headers: Vec::new(),
            prompt_source,
        }
    }

    pub fn zai(
        client: Client,
        base_url: &str,
        api_key: &str,
        model: &str,
        chat_id: Option<String>,
        user_id: Option<String>,
        prompt_source: PromptSource,
    ) -> Self {
        let extra_headers = [("X-Chat-Id", chat_id), ("X-User-Id", user_id)]
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect();

        Self {
            client,
            name: "ZAI",
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            auth: Auth::Bearer(api_key.to_string()),
            model: Some(model.to_string()),
            extra_headers,
            prompt_source,
        }
    }

    fn request(&self) -> RequestBuilder {
        let mut request = self.client.post(&self.url);
        request = match &self.auth {
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::ApiKey(key) => request.header("api-key", key),
        };
        for (name, value) in &self.extra_headers {
            request = request.header(*name, value);
        }
        request
    }

    fn instruction(&self) -> String {
        match self.prompt_source {
            PromptSource::Template => ANALYSIS_INSTRUCTION.to_string(),
            PromptSource::Model => format!("{ANALYSIS_INSTRUCTION}{PROMPT_INSTRUCTION}"),
        }
    }
}

#[async_trait]
impl VisionProvider for ChatVision {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn analyze(&self, upload: &ImageUpload) -> Result<VisionReport, AnalyzeError> {
        info!(provider = self.name, model = ?self.model, "📤 Sending image to chat vision model");

        let mut body = json!({
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": self.instruction() },
                        { "type": "image_url", "image_url": { "url": upload.data_uri(), "detail": "high" } }
                    ]
                }
            ],
            "temperature": 0.2,
            "max_tokens": MAX_TOKENS
        });
        if let Some(model) = &self.model {
            body["model"] = json!(model);
        }

        let response = self.request().json(&body).send().await?;
        let completion: ChatCompletionResponse = read_json(self.name, response).await?;

        if let Some(message) = completion.error.and_then(|e| e.message) {
            error!(provider = self.name, %message, "chat API returned an error");
            return Err(AnalyzeError::Rejected(message));
        }

        let content = completion
            .choices
            .ok_or_else(|| AnalyzeError::InvalidStructure("missing choices".to_string()))?
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AnalyzeError::EmptyResponse);
        }
        info!(provider = self.name, chars = content.len(), "✅ Model reply received");

        let report = parse_model_reply(&content).map_err(|err| {
            error!(provider = self.name, error = %err, reply = %preview(&content), "unusable model reply");
            err
        })?;

        Ok(match self.prompt_source {
            PromptSource::Template => VisionReport {
                draft_prompt: None,
                ..report
            },
            PromptSource::Model => report,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ChatError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatError {
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    #[serde(rename = "type", default, deserialize_with = "lenient_text")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    style: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    lighting: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    composition: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    colors: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    mood: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    realism: Option<String>,
    #[serde(
        alias = "person_description",
        default,
        deserialize_with = "lenient_text"
    )]
    person_description: Option<String>,
    #[serde(
        alias = "objects_description",
        default,
        deserialize_with = "lenient_text"
    )]
    objects_description: Option<String>,
    #[serde(
        alias = "environment_description",
        default,
        deserialize_with = "lenient_text"
    )]
    environment_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    prompt: Option<String>,
}

/// Accepts any JSON value for a text field: lists are joined with ", ",
/// numbers and booleans are stringified, `null` counts as missing.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(flatten_text))
}

fn flatten_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => join_texts(items.iter()),
        Value::Object(map) => join_texts(map.values()),
    }
}

fn join_texts<'a>(values: impl Iterator<Item = &'a Value>) -> Option<String> {
    let parts: Vec<String> = values
        .filter_map(flatten_text)
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Slice from the first `{` to the last `}`; models like to wrap JSON in fences.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn field(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_model_reply(content: &str) -> Result<VisionReport, AnalyzeError> {
    let json = extract_json_object(content)
        .ok_or_else(|| AnalyzeError::InvalidJson("no JSON object in model reply".to_string()))?;
    let reply: ModelReply =
        serde_json::from_str(json).map_err(|e| AnalyzeError::InvalidJson(e.to_string()))?;

    let core = [
        &reply.kind,
        &reply.style,
        &reply.lighting,
        &reply.composition,
        &reply.colors,
        &reply.mood,
        &reply.realism,
    ];
    if core.iter().all(|value| value.is_none()) {
        return Err(AnalyzeError::InvalidStructure(
            "model reply has no analysis fields".to_string(),
        ));
    }

    let analysis = ImageAnalysis {
        kind: field(reply.kind, DEFAULT_TYPE),
        style: field(reply.style, DEFAULT_STYLE),
        lighting: field(reply.lighting, DEFAULT_LIGHTING),
        composition: field(reply.composition, DEFAULT_COMPOSITION),
        colors: field(reply.colors, DEFAULT_COLORS),
        mood: field(reply.mood, DEFAULT_MOOD),
        realism: field(reply.realism, DEFAULT_REALISM),
        person_description: optional(reply.person_description),
        objects_description: optional(reply.objects_description),
        environment_description: optional(reply.environment_description),
        ..ImageAnalysis::default()
    };

    Ok(VisionReport {
        analysis,
        draft_prompt: optional(reply.prompt),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_reply() {
        let reply = "Here you go:\n```json\n{\"type\": \"Photo\", \"style\": \"Editorial fashion\", \
                     \"lighting\": \"Soft window light\", \"mood\": \"Calm\", \
                     \"person_description\": \"Woman in a red coat\", \"prompt\": \"  \"}\n```";
        let report = parse_model_reply(reply).unwrap();

        assert_eq!(report.analysis.kind, "Photo");
        assert_eq!(report.analysis.style, "Editorial fashion");
        assert_eq!(report.analysis.composition, DEFAULT_COMPOSITION);
        assert_eq!(
            report.analysis.person_description.as_deref(),
            Some("Woman in a red coat")
        );
        assert_eq!(report.draft_prompt, None);
    }

    #[test]
    fn accepts_list_and_number_fields() {
        let report = parse_model_reply(
            r#"{"type":"Photo","style":"Editorial","colors":["teal","orange"],
               "objectsDescription":["bicycle", " ", "umbrella"],"realism":9,"mood":null}"#,
        )
        .unwrap();

        assert_eq!(report.analysis.colors, "teal, orange");
        assert_eq!(
            report.analysis.objects_description.as_deref(),
            Some("bicycle, umbrella")
        );
        assert_eq!(report.analysis.realism, "9");
        assert_eq!(report.analysis.mood, DEFAULT_MOOD);
    }

    #[test]
    fn keeps_model_prompt() {
        let report = parse_model_reply(
            r#"{"style": "Film noir", "prompt": "A black and white portrait of [USER FACE]"}"#,
        )
        .unwrap();
        assert_eq!(
            report.draft_prompt.as_deref(),
            Some("A black and white portrait of [USER FACE]")
        );
    }

    #[test]
    fn prose_reply_is_invalid_json() {
        assert!(matches!(
            parse_model_reply("I cannot analyse this image."),
            Err(AnalyzeError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_model_reply("{not json}"),
            Err(AnalyzeError::InvalidJson(_))
        ));
    }

    #[test]
    fn reply_without_fields_is_invalid_structure() {
        assert!(matches!(
            parse_model_reply(r#"{"answer": "a cat"}"#),
            Err(AnalyzeError::InvalidStructure(_))
        ));
    }

    #[test]
    fn backends_target_their_endpoints() {
        let client = Client::new();
        let openai = ChatVision::openai(
            client.clone(),
            "https://api.openai.com/v1/",
            "sk",
            "gpt-4o-mini",
            PromptSource::Template,
        );
        assert_eq!(openai.url, "https://api.openai.com/v1/chat/completions");

        let azure = ChatVision::azure_openai(
            client.clone(),
            "https://galek.openai.azure.com",
            "key",
            "vision",
            PromptSource::Model,
        );
        assert_eq!(
            azure.url,
            "https://galek.openai.azure.com/openai/deployments/vision/chat/completions?api-version=2024-06-01"
        );
        assert!(azure.model.is_none());
        assert!(azure.instruction().contains("[USER FACE]"));

        let zai = ChatVision::zai(
            client,
            "https://zai.example/api",
            "zk",
            "glm-4.5v",
            None,
            Some("user-1".into()),
            PromptSource::Template,
        );
        assert_eq!(zai.extra_headers, vec![("X-User-Id", "user-1".to_string())]);
        assert!(!zai.instruction().contains("[USER FACE]"));
    }
}
