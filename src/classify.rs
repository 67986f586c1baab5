//! Keyword heuristics that turn raw vision-API signals into an [`ImageAnalysis`].
//!
//! Every field is decided by an ordered rule table: the first rule with a
//! keyword found in the lower-cased text wins, otherwise the field keeps its
//! default. Keywords match whole words, or runs of whole words for phrases
//! like "clip art". Same signals in, same analysis out.

use crate::analysis::{
    ImageAnalysis, DEFAULT_COLORS, DEFAULT_COMPOSITION, DEFAULT_LIGHTING, DEFAULT_MOOD,
};

const MAX_PALETTE_COLORS: usize = 5;
const MAX_LISTED_OBJECTS: usize = 6;

/// Raw observations from a tagging/captioning provider.
#[derive(Debug, Clone, Default)]
pub struct VisionSignals {
    pub image_type: String,
    pub caption: String,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub dominant_colors: Vec<String>,
    pub objects: Vec<String>,
    pub faces: Vec<String>,
    pub dimensions: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Photo,
    Illustration,
    DigitalArt,
    Anime,
    Render3d,
}

type Rule = (&'static [&'static str], &'static str);

const KIND_RULES: &[(&[&str], ImageKind)] = &[
    (
        &["illustration", "drawing", "sketch", "cartoon", "clip art"],
        ImageKind::Illustration,
    ),
    (&["painting", "artwork", "digital art"], ImageKind::DigitalArt),
    (&["anime", "manga"], ImageKind::Anime),
    (&["3d", "render"], ImageKind::Render3d),
];

const STYLE_RULES: &[Rule] = &[
    (&["portrait"], "Professional portrait photography"),
    (&["landscape"], "Landscape photography"),
    (&["studio"], "Studio photography"),
    (&["cinematic", "dramatic"], "Cinematic photography"),
];

const LIGHTING_RULES: &[Rule] = &[
    (&["bright", "sunny", "sunlight"], "Bright and well-lit scene"),
    (&["backlit"], "Backlit subject with dramatic effect"),
    (&["dark", "shadowy", "night"], "Low light or moody atmosphere"),
    (
        &["studio lighting", "artificial"],
        "Studio lighting with controlled shadows",
    ),
    (&["golden", "sunset", "sunrise"], "Golden hour warm lighting"),
];

const COMPOSITION_RULES: &[Rule] = &[
    (&["close-up", "closeup"], "Close-up shot"),
    (&["centered", "center"], "Centered subject with balanced framing"),
];

const MOOD_RULES: &[Rule] = &[
    (
        &["happy", "joyful", "smile", "smiles", "smiling"],
        "Cheerful and positive",
    ),
    (&["sad", "melancholic"], "Moody and melancholic"),
    (&["dramatic", "intense"], "Dramatic and intense"),
    (&["peaceful", "calm", "serene"], "Peaceful and serene"),
    (&["energetic", "dynamic"], "Energetic and dynamic"),
    (&["romantic", "intimate"], "Romantic and intimate"),
    (&["professional", "elegant"], "Professional and elegant"),
];

const ENVIRONMENT_RULES: &[Rule] = &[
    (&["beach", "ocean", "sea", "lake"], "Coastal scene near the water"),
    (&["city", "street", "building", "urban"], "Urban environment"),
    (
        &["forest", "mountain", "nature", "tree", "grass"],
        "Natural outdoor landscape",
    ),
    (&["studio", "backdrop"], "Studio setting with a plain backdrop"),
    (&["indoor", "room", "wall", "interior"], "Indoor setting"),
    (&["outdoor", "sky"], "Outdoor setting"),
];

const PERSON_TAGS: &[&str] = &["person", "man", "woman", "girl", "boy", "human face", "people"];

impl ImageKind {
    fn detect(image_type: &str) -> Self {
        let haystack = words(image_type);
        KIND_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| mentions(&haystack, k)))
            .map(|(_, kind)| *kind)
            .unwrap_or(ImageKind::Photo)
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageKind::Photo => "Photo",
            ImageKind::Illustration => "Illustration",
            ImageKind::DigitalArt => "Digital Art",
            ImageKind::Anime => "Anime",
            ImageKind::Render3d => "3D Render",
        }
    }

    fn style(self) -> &'static str {
        match self {
            ImageKind::Photo => "Professional photography",
            ImageKind::Illustration => "Digital illustration with clean lines",
            ImageKind::DigitalArt => "Digital artwork with rich details",
            ImageKind::Anime => "Anime-style artwork",
            ImageKind::Render3d => "3D rendered image",
        }
    }

    fn realism(self) -> &'static str {
        match self {
            ImageKind::Photo => "High realism with natural textures",
            ImageKind::Illustration => "Medium realism - digital illustration",
            ImageKind::DigitalArt => "Highly detailed digital artwork",
            ImageKind::Anime => "Stylized anime aesthetic",
            ImageKind::Render3d => "Photorealistic 3D rendering",
        }
    }
}

/// Lower-cased alphanumeric runs of `text`; `_`, `-` and punctuation separate words.
fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when every word of `keyword` appears consecutively in `haystack`.
fn mentions(haystack: &[String], keyword: &str) -> bool {
    let needle = words(keyword);
    !needle.is_empty()
        && haystack
            .windows(needle.len())
            .any(|window| window == needle.as_slice())
}

fn first_match(haystack: &[String], rules: &[Rule]) -> Option<&'static str> {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| mentions(haystack, k)))
        .map(|(_, value)| *value)
}

fn joined(parts: &[String]) -> String {
    parts.join(", ")
}

fn dedup(items: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !seen.iter().any(|s| s.eq_ignore_ascii_case(item)) {
            seen.push(item.to_string());
        }
    }
    seen
}

pub fn classify(signals: &VisionSignals) -> ImageAnalysis {
    let kind = ImageKind::detect(&signals.image_type);

    let caption = signals.caption.as_str();
    let tags = joined(&signals.tags);
    let categories = joined(&signals.categories);
    let faces = joined(&signals.faces);
    let caption_and_tags = format!("{caption} | {tags}");

    let caption_words = words(caption);
    let tag_words = words(&tags);
    let caption_and_tag_words = words(&caption_and_tags);
    let mood_words = words(&format!("{} | {caption} | {faces}", signals.description));
    let scene_words = words(&format!("{caption_and_tags} | {categories}"));

    let style =
        first_match(&caption_and_tag_words, STYLE_RULES).unwrap_or_else(|| kind.style());
    let lighting = first_match(&caption_words, LIGHTING_RULES).unwrap_or(DEFAULT_LIGHTING);
    let composition =
        first_match(&caption_and_tag_words, COMPOSITION_RULES).unwrap_or(DEFAULT_COMPOSITION);
    let mood = first_match(&mood_words, MOOD_RULES).unwrap_or(DEFAULT_MOOD);

    let palette: Vec<String> = dedup(&signals.dominant_colors)
        .into_iter()
        .take(MAX_PALETTE_COLORS)
        .collect();
    let colors = if palette.is_empty() {
        DEFAULT_COLORS.to_string()
    } else {
        format!("Color palette featuring: {}", palette.join(", "))
    };

    let objects = dedup(&signals.objects);

    ImageAnalysis {
        kind: kind.label().to_string(),
        style: style.to_string(),
        lighting: lighting.to_string(),
        composition: composition.to_string(),
        colors,
        mood: mood.to_string(),
        realism: kind.realism().to_string(),
        person_description: describe_people(signals, &tag_words),
        objects_description: describe_objects(&objects),
        environment_description: first_match(&scene_words, ENVIRONMENT_RULES).map(str::to_string),
        image_width: signals.dimensions.map(|(w, _)| w),
        image_height: signals.dimensions.map(|(_, h)| h),
        tags: dedup(&signals.tags),
        objects,
        faces: signals.faces.clone(),
    }
}

fn describe_people(signals: &VisionSignals, tag_words: &[String]) -> Option<String> {
    match signals.faces.len() {
        0 if PERSON_TAGS.iter().any(|t| mentions(tag_words, t)) => {
            Some("A person as the main subject".to_string())
        }
        0 => None,
        1 => Some(format!("One person in frame ({})", signals.faces[0])),
        n => Some(format!("{n} people in frame ({})", signals.faces.join("; "))),
    }
}

fn describe_objects(objects: &[String]) -> Option<String> {
    if objects.is_empty() {
        return None;
    }
    let listed: Vec<&str> = objects
        .iter()
        .take(MAX_LISTED_OBJECTS)
        .map(String::as_str)
        .collect();
    Some(format!("Visible objects: {}", listed.join(", ")))
}
