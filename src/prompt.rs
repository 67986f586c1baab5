//! Turns an analysis into the text the user pastes into Gemini.

use crate::analysis::{ImageAnalysis, VisionReport};

/// Identity-preservation sentence that closes every prompt.
pub const FACE_LOCK: &str = "Keep the face of the person from the uploaded reference photo exactly as it is: same identity, facial features, proportions, skin tone and expression, with no changes to the face.";

pub const DEFAULT_TIPS: [&str; 5] = [
    "Upload a clear photo of your face first in Gemini",
    "The prompt uses [USER FACE] placeholder - Gemini will use your uploaded photo",
    "Paste entire prompt as-is, do not edit it",
    "If results are not perfect, try regenerating the prompt",
    "For best results, use a well-lit, front-facing photo of your face",
];

const COMMON_RATIOS: [(u32, u32); 7] = [(9, 16), (3, 4), (4, 5), (1, 1), (5, 4), (4, 3), (16, 9)];
const RATIO_TOLERANCE: f64 = 0.08;

/// Final prompt: model draft or template, aspect-ratio directive, face-lock.
pub fn render_prompt(report: &VisionReport) -> String {
    let body = match report.draft_prompt.as_deref().map(str::trim) {
        Some(draft) if !draft.is_empty() => draft.to_string(),
        _ => template_prompt(&report.analysis),
    };

    let body = match report.analysis.dimensions() {
        Some((width, height)) if !body.contains("--ar ") => {
            format!("{}\n\n--ar {}", body.trim_end(), ar_from_dims(width, height))
        }
        _ => body,
    };

    with_face_lock(&body)
}

pub fn template_prompt(analysis: &ImageAnalysis) -> String {
    let kind = analysis.kind.to_lowercase();
    let style = analysis.style.to_lowercase();
    let lighting = analysis.lighting.to_lowercase();
    let composition = analysis.composition.to_lowercase();
    let colors = analysis.colors.to_lowercase();
    let mood = analysis.mood.to_lowercase();
    let realism = analysis.realism.to_lowercase();

    let mut prompt = format!(
        "Create a {kind} in {style} style, featuring [USER FACE] as the main subject.\n\n\
The image should use {lighting}, with a {composition} approach.\n\n\
The color palette should consist of {colors}, creating a {mood} atmosphere. \
The overall {realism} quality with natural textures and professional lighting.\n\n\
Key visual elements to include:\n\
- {lighting}\n\
- {composition}\n\
- Natural skin tones and realistic features\n\
- Appropriate background context\n\
- Professional color grading matching the {style} aesthetic\n\n"
    );

    let details: Vec<(&str, &Option<String>)> = vec![
        ("Subject", &analysis.person_description),
        ("Objects", &analysis.objects_description),
        ("Environment", &analysis.environment_description),
    ];
    let details: Vec<String> = details
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("- {label}: {}", v.trim()))
        })
        .collect();
    if !details.is_empty() {
        prompt.push_str("Scene details to recreate:\n");
        prompt.push_str(&details.join("\n"));
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!(
        "Important: Use the user's uploaded face photo as a base, matching the lighting, angle, \
and mood described above to create a cohesive, realistic portrait. Maintain the {mood} \
atmosphere while ensuring that the face looks natural and well-integrated into the scene."
    ));

    prompt
}

/// Appends [`FACE_LOCK`] once, dropping any copies already in `text`.
pub fn with_face_lock(text: &str) -> String {
    let body = text.replace(FACE_LOCK, "");
    let body = body.trim();
    if body.is_empty() {
        FACE_LOCK.to_string()
    } else {
        format!("{body}\n\n{FACE_LOCK}")
    }
}

/// Aspect ratio for `--ar`, snapped to a common photo ratio when close enough.
pub fn ar_from_dims(width: u32, height: u32) -> String {
    if width == 0 || height == 0 {
        return "1:1".to_string();
    }

    let ratio = f64::from(width) / f64::from(height);
    let nearest = COMMON_RATIOS
        .iter()
        .map(|&(w, h)| ((w, h), (ratio - f64::from(w) / f64::from(h)).abs()))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some(((w, h), distance)) = nearest {
        if distance <= RATIO_TOLERANCE {
            return format!("{w}:{h}");
        }
    }

    let divisor = gcd(width, height);
    format!("{}:{}", width / divisor, height / divisor)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrences(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn aspect_ratio_snaps_to_common_values() {
        assert_eq!(ar_from_dims(1080, 1920), "9:16");
        assert_eq!(ar_from_dims(1000, 1000), "1:1");
        assert_eq!(ar_from_dims(1920, 1080), "16:9");
        assert_eq!(ar_from_dims(1080, 1350), "4:5");
        assert_eq!(ar_from_dims(1010, 1000), "1:1");
    }

    #[test]
    fn aspect_ratio_guards_zero_sides() {
        assert_eq!(ar_from_dims(0, 500), "1:1");
        assert_eq!(ar_from_dims(500, 0), "1:1");
    }

    #[test]
    fn aspect_ratio_reduces_unusual_shapes() {
        assert_eq!(ar_from_dims(1200, 800), "3:2");
        assert_eq!(ar_from_dims(2100, 900), "7:3");
    }

    #[test]
    fn template_lowercases_fields() {
        let prompt = template_prompt(&ImageAnalysis::default());
        assert!(prompt.starts_with(
            "Create a photo in professional photography style, featuring [USER FACE] as the main subject."
        ));
        assert!(prompt.contains("creating a neutral and balanced atmosphere"));
        assert!(!prompt.contains("Scene details"));
    }

    #[test]
    fn template_lists_scene_details_when_known() {
        let analysis = ImageAnalysis {
            person_description: Some("One person in frame (smiling face)".into()),
            environment_description: Some("Urban environment".into()),
            ..ImageAnalysis::default()
        };
        let prompt = template_prompt(&analysis);
        assert!(prompt.contains("- Subject: One person in frame (smiling face)"));
        assert!(prompt.contains("- Environment: Urban environment"));
        assert!(!prompt.contains("- Objects:"));
    }

    #[test]
    fn rendered_prompt_ends_with_single_face_lock() {
        let report = VisionReport::fallback().with_dimensions(Some((1080, 1920)));
        let prompt = render_prompt(&report);

        assert!(prompt.ends_with(FACE_LOCK));
        assert_eq!(occurrences(&prompt, FACE_LOCK), 1);
        assert!(prompt.contains("--ar 9:16"));
    }

    #[test]
    fn draft_prompt_with_face_lock_is_not_duplicated() {
        let mut report = VisionReport::fallback();
        report.draft_prompt = Some(format!("{FACE_LOCK}\nA moody neon street portrait. {FACE_LOCK}"));
        let prompt = render_prompt(&report);

        assert!(prompt.starts_with("A moody neon street portrait."));
        assert!(prompt.ends_with(FACE_LOCK));
        assert_eq!(occurrences(&prompt, FACE_LOCK), 1);
        assert!(!prompt.contains("--ar"));
    }

    #[test]
    fn existing_ar_directive_is_kept() {
        let mut report = VisionReport::fallback().with_dimensions(Some((1000, 1000)));
        report.draft_prompt = Some("Soft portrait --ar 4:5".into());
        let prompt = render_prompt(&report);
        assert_eq!(occurrences(&prompt, "--ar"), 1);
        assert!(prompt.contains("--ar 4:5"));
    }

    #[test]
    fn face_lock_on_empty_text() {
        assert_eq!(with_face_lock("   "), FACE_LOCK);
    }
}
