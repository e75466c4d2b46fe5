use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::UserId;

/// Body for `/auth/login` and `/auth/signup`.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestRequest {
    pub email: String,
}

/// Success body of every `/auth/*` endpoint. Extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Body for `/input`. Absent values are sent as explicit `null`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputRequest {
    pub user_id: UserId,
    pub face_photo_url: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub age: Option<u32>,
    pub goals: Option<String>,
    pub style_vibe: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRunRequest {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub face_summary: String,
    pub physique_summary: String,
    pub style_summary: String,
    pub outfit_summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacePlan {
    pub face_shape: String,
    pub strong_features: Vec<String>,
    pub weak_features: Vec<String>,
    pub grooming: Vec<String>,
    pub hairstyle: Vec<String>,
    pub accessories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysiquePlan {
    pub body_type: String,
    pub workout_7_day: Vec<String>,
    pub posture_cues: Vec<String>,
    pub diet_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylingPlan {
    pub daily_outfits: Vec<String>,
    pub colours: Vec<String>,
    pub wardrobe_essentials: Vec<String>,
    pub hairstyle_synergy: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlowPlan {
    pub week_by_week: Vec<String>,
}

/// Plan generated by `/workflow/run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
    pub summary: PlanSummary,
    pub face: FacePlan,
    pub physique: PhysiquePlan,
    pub styling: StylingPlan,
    pub glow: GlowPlan,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("plan payload does not match the expected shape: {0}")]
pub struct PlanShapeError(pub String);

impl PlanResult {
    /// Schema boundary for workflow responses.
    pub fn validate_json(value: Value) -> Result<Self, PlanShapeError> {
        if !value.is_object() {
            return Err(PlanShapeError(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|err| PlanShapeError(err.to_string()))
    }

    pub fn validate_slice(body: &[u8]) -> Result<Self, PlanShapeError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| PlanShapeError(format!("body is not JSON: {err}")))?;
        Self::validate_json(value)
    }

    /// Summary cards in display order: (title, text).
    pub fn summary_cards(&self) -> [(&'static str, &str); 4] {
        [
            ("Face", self.summary.face_summary.as_str()),
            ("Physique", self.summary.physique_summary.as_str()),
            ("Style", self.summary.style_summary.as_str()),
            ("Outfit", self.summary.outfit_summary.as_str()),
        ]
    }

    /// Detail sections in display order. Each entry is a titled list of
    /// (label, text) rows; list fields are pre-joined for display.
    pub fn detail_sections(&self) -> Vec<DetailSection> {
        let face = &self.face;
        let physique = &self.physique;
        let styling = &self.styling;
        vec![
            DetailSection::new(
                "Detailed Lookmaxxing",
                vec![
                    ("Face shape", face.face_shape.clone()),
                    ("Strong features", face.strong_features.join(", ")),
                    ("Weak features", face.weak_features.join(", ")),
                    ("Grooming", face.grooming.join("\n")),
                    ("Hairstyle", face.hairstyle.join("\n")),
                    ("Accessories", face.accessories.join(", ")),
                ],
            ),
            DetailSection::new(
                "Physique Plan",
                vec![
                    ("Body type", physique.body_type.clone()),
                    ("7 day workout", physique.workout_7_day.join("\n")),
                    ("Posture", physique.posture_cues.join(", ")),
                    ("Diet", physique.diet_notes.join(", ")),
                ],
            ),
            DetailSection::new(
                "Styling & Outfit",
                vec![
                    ("Daily outfits", styling.daily_outfits.join("\n")),
                    ("Colours", styling.colours.join(", ")),
                    ("Wardrobe", styling.wardrobe_essentials.join(", ")),
                    ("Hairstyle synergy", styling.hairstyle_synergy.join(", ")),
                ],
            ),
            DetailSection::new(
                "90 Day Glow-Up Map",
                vec![("Roadmap", self.glow.week_by_week.join("\n"))],
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: &'static str,
    pub rows: Vec<(&'static str, String)>,
}

impl DetailSection {
    fn new(title: &'static str, rows: Vec<(&'static str, String)>) -> Self {
        Self { title, rows }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
