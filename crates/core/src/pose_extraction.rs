//! Pose extraction: prompt construction, candidate shape, and the rules for
//! turning an AI candidate into a persisted pose.

use serde::{Deserialize, Deserializer};

use crate::entities::{Drama, NewPose};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Output token ceiling for the extraction call.
pub const DEFAULT_EXTRACTION_MAX_TOKENS: u32 = 2000;

/// Progress message while the script is sent to the text model.
pub const MSG_ANALYZING_SCRIPT: &str = "analyzing script";

/// Progress message while candidates are persisted.
pub const MSG_SAVING_POSES: &str = "saving poses";

/// Progress reported once the AI output has been parsed.
pub const PROGRESS_SAVING: i16 = 50;

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Style and aspect-ratio hints folded into the extraction prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptStyle {
    pub style: Option<String>,
    pub ratio: Option<String>,
}

impl PromptStyle {
    /// Resolve hints from drama-level defaults.
    ///
    /// Style is the drama style joined with the prop style (`", "`); ratio
    /// prefers the prop ratio and falls back to the image ratio.
    pub fn from_drama(drama: &Drama) -> Self {
        let style = match (
            non_blank(drama.default_style.as_deref()),
            non_blank(drama.default_prop_style.as_deref()),
        ) {
            (Some(base), Some(prop)) => Some(format!("{base}, {prop}")),
            (Some(base), None) => Some(base.to_string()),
            (None, Some(prop)) => Some(prop.to_string()),
            (None, None) => None,
        };

        let ratio = non_blank(drama.default_prop_ratio.as_deref())
            .or_else(|| non_blank(drama.default_image_ratio.as_deref()))
            .map(String::from);

        Self { style, ratio }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build the extraction prompt for `script`.
pub fn build_extraction_prompt(script: &str, style: &PromptStyle) -> String {
    let mut prompt = String::from(
        "You are a motion reference designer. Read the script below and list every \
         distinct body pose or gesture a character performs.\n\n\
         Return ONLY a JSON array. Each element must be an object with these fields:\n\
         - \"name\": short unique pose name\n\
         - \"type\": pose category (e.g. gesture, stance, action)\n\
         - \"description\": what the pose looks like\n\
         - \"image_prompt\": a concise visual prompt for drawing the pose\n",
    );

    if let Some(style) = &style.style {
        prompt.push_str(&format!("\nVisual style for image prompts: {style}\n"));
    }
    if let Some(ratio) = &style.ratio {
        prompt.push_str(&format!("Target aspect ratio: {ratio}\n"));
    }

    prompt.push_str("\nScript:\n");
    prompt.push_str(script);
    prompt
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// One pose as returned by the text model. Missing or `null` fields read as
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractedPose {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_empty")]
    pub pose_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub image_prompt: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ExtractedPose {
    /// The description to persist.
    ///
    /// The image prompt wins because the stored description is what later
    /// drives image generation; a distinct visual description is kept in
    /// front of it (`"{description}\n{image_prompt}"`). Values are compared
    /// and joined as the model sent them.
    pub fn derived_description(&self) -> Option<String> {
        let prompt = self.image_prompt.as_str();
        let description = self.description.as_str();

        if prompt.is_empty() {
            return (!description.is_empty()).then(|| description.to_string());
        }
        if !description.is_empty() && description != prompt {
            return Some(format!("{description}\n{prompt}"));
        }
        Some(prompt.to_string())
    }

    /// Convert into a create request owned by `drama_id`.
    pub fn to_new_pose(&self, drama_id: DbId) -> NewPose {
        let pose_type = self.pose_type.trim();
        NewPose {
            drama_id,
            name: self.name.trim().to_string(),
            pose_type: (!pose_type.is_empty()).then(|| pose_type.to_string()),
            description: self.derived_description(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Per-batch accounting of what happened to each candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub candidates: usize,
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl ExtractionSummary {
    /// Final task message, e.g. `saved 4 of 5 poses (1 duplicate, 0 failed)`.
    pub fn message(&self) -> String {
        let dup_word = if self.duplicates == 1 {
            "duplicate"
        } else {
            "duplicates"
        };
        format!(
            "saved {} of {} poses ({} {dup_word}, {} failed)",
            self.created, self.candidates, self.duplicates, self.failed
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(description: &str, image_prompt: &str) -> ExtractedPose {
        ExtractedPose {
            name: "RaiseHand".into(),
            pose_type: "gesture".into(),
            description: description.into(),
            image_prompt: image_prompt.into(),
        }
    }

    #[test]
    fn description_and_prompt_are_concatenated() {
        let c = candidate("raising a hand", "arm raised, palm open");
        assert_eq!(
            c.derived_description().as_deref(),
            Some("raising a hand\narm raised, palm open")
        );
    }

    #[test]
    fn prompt_alone_when_description_matches_or_is_empty() {
        assert_eq!(
            candidate("arm up", "arm up").derived_description().as_deref(),
            Some("arm up")
        );
        assert_eq!(
            candidate("", "arm up").derived_description().as_deref(),
            Some("arm up")
        );
    }

    #[test]
    fn description_used_when_prompt_is_empty() {
        assert_eq!(
            candidate("raising a hand", "").derived_description().as_deref(),
            Some("raising a hand")
        );
        assert_eq!(candidate("", "").derived_description(), None);
    }

    #[test]
    fn description_and_prompt_are_compared_untrimmed() {
        assert_eq!(
            candidate("arm up ", "arm up").derived_description().as_deref(),
            Some("arm up \narm up")
        );
    }

    #[test]
    fn null_fields_read_as_empty() {
        let c: ExtractedPose = serde_json::from_str(
            r#"{"name":"RaiseHand","type":null,"description":null,"image_prompt":"arm up"}"#,
        )
        .unwrap();
        assert_eq!(c.name, "RaiseHand");
        assert!(c.pose_type.is_empty());
        assert!(c.description.is_empty());
        assert_eq!(c.derived_description().as_deref(), Some("arm up"));
        assert_eq!(c.to_new_pose(1).pose_type, None);
    }

    #[test]
    fn candidate_deserializes_with_missing_fields() {
        let c: ExtractedPose = serde_json::from_str(r#"{"name":"Sit"}"#).unwrap();
        assert_eq!(c.name, "Sit");
        assert!(c.image_prompt.is_empty());

        let new_pose = c.to_new_pose(3);
        assert_eq!(new_pose.drama_id, 3);
        assert_eq!(new_pose.pose_type, None);
        assert_eq!(new_pose.description, None);
    }

    #[test]
    fn style_joins_drama_and_prop_style() {
        let drama = Drama {
            default_style: Some("ink wash".into()),
            default_prop_style: Some("flat colors".into()),
            default_image_ratio: Some("16:9".into()),
            ..Drama::default()
        };
        let style = PromptStyle::from_drama(&drama);
        assert_eq!(style.style.as_deref(), Some("ink wash, flat colors"));
        assert_eq!(style.ratio.as_deref(), Some("16:9"));
    }

    #[test]
    fn prop_ratio_beats_image_ratio() {
        let drama = Drama {
            default_prop_style: Some("flat".into()),
            default_prop_ratio: Some("1:1".into()),
            default_image_ratio: Some("16:9".into()),
            ..Drama::default()
        };
        let style = PromptStyle::from_drama(&drama);
        assert_eq!(style.style.as_deref(), Some("flat"));
        assert_eq!(style.ratio.as_deref(), Some("1:1"));
    }

    #[test]
    fn prompt_embeds_script_and_optional_hints() {
        let plain = build_extraction_prompt("Alice raises her hand.", &PromptStyle::default());
        assert!(plain.ends_with("Alice raises her hand."));
        assert!(!plain.contains("Visual style"));

        let styled = build_extraction_prompt(
            "x",
            &PromptStyle {
                style: Some("anime".into()),
                ratio: Some("9:16".into()),
            },
        );
        assert!(styled.contains("Visual style for image prompts: anime"));
        assert!(styled.contains("Target aspect ratio: 9:16"));
    }

    #[test]
    fn summary_message_counts() {
        let summary = ExtractionSummary {
            candidates: 5,
            created: 4,
            duplicates: 1,
            failed: 0,
        };
        assert_eq!(summary.message(), "saved 4 of 5 poses (1 duplicate, 0 failed)");
    }
}
