use shared::{domain::UserId, protocol::InputRequest};

use crate::error::ClientError;

/// Baseline form exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaselineForm {
    pub face_photo_url: String,
    pub height_cm: String,
    pub weight_kg: String,
    pub age: String,
    pub goals: String,
    pub style_vibe: String,
}

impl BaselineForm {
    /// Blank fields become `None`; numeric fields that do not parse are
    /// rejected rather than sent as an invalid number.
    pub fn coerce(&self, user_id: UserId) -> Result<InputRequest, ClientError> {
        Ok(InputRequest {
            user_id,
            face_photo_url: optional_text(&self.face_photo_url),
            height_cm: optional_measure("height_cm", &self.height_cm)?,
            weight_kg: optional_measure("weight_kg", &self.weight_kg)?,
            age: optional_age(&self.age)?,
            goals: optional_text(&self.goals),
            style_vibe: optional_text(&self.style_vibe),
        })
    }
}

fn optional_text(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn optional_measure(field: &'static str, raw: &str) -> Result<Option<f64>, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(ClientError::InvalidBaseline {
            field,
            value: raw.to_string(),
        }),
    }
}

fn optional_age(raw: &str) -> Result<Option<u32>, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ClientError::InvalidBaseline {
            field: "age",
            value: raw.to_string(),
        })
}
