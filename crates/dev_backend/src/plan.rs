//! Deterministic stand-in for the plan generation workflow.
//!
//! The same baseline always yields the same plan, which keeps client tests
//! and manual runs reproducible.

use shared::protocol::{
    FacePlan, GlowPlan, InputRequest, PhysiquePlan, PlanResult, PlanSummary, StylingPlan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyType {
    Ectomorph,
    Mesomorph,
    Endomorph,
    Unknown,
}

impl BodyType {
    fn from_measurements(height_cm: Option<f64>, weight_kg: Option<f64>) -> Self {
        let (Some(height_cm), Some(weight_kg)) = (height_cm, weight_kg) else {
            return BodyType::Unknown;
        };
        if height_cm <= 0.0 {
            return BodyType::Unknown;
        }
        let height_m = height_cm / 100.0;
        let bmi = weight_kg / (height_m * height_m);
        if bmi < 18.5 {
            BodyType::Ectomorph
        } else if bmi < 25.0 {
            BodyType::Mesomorph
        } else {
            BodyType::Endomorph
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            BodyType::Ectomorph => "ectomorph",
            BodyType::Mesomorph => "mesomorph",
            BodyType::Endomorph => "endomorph",
            BodyType::Unknown => "unknown",
        }
    }
}

pub fn build_plan(input: Option<&InputRequest>) -> PlanResult {
    let height_cm = input.and_then(|i| i.height_cm);
    let weight_kg = input.and_then(|i| i.weight_kg);
    let age = input.and_then(|i| i.age);
    let goals = input
        .and_then(|i| i.goals.as_deref())
        .unwrap_or("general improvement");
    let vibe = input
        .and_then(|i| i.style_vibe.as_deref())
        .unwrap_or("clean minimal");
    let has_photo = input.is_some_and(|i| i.face_photo_url.is_some());

    let body_type = BodyType::from_measurements(height_cm, weight_kg);
    let face_shape = if has_photo { "oval" } else { "not assessed" };

    PlanResult {
        summary: PlanSummary {
            face_summary: if has_photo {
                "Balanced oval face; sharpen the jawline and keep skin consistent.".into()
            } else {
                "No photo provided; general grooming guidance applies.".into()
            },
            physique_summary: format!(
                "{} frame; training focused on {goals}.",
                capitalize(body_type.as_str())
            ),
            style_summary: format!("A {vibe} look built on fit and a tight palette."),
            outfit_summary: "Three repeatable outfits cover work, weekend and evening.".into(),
        },
        face: FacePlan {
            face_shape: face_shape.into(),
            strong_features: strings(&["eyes", "brow line"]),
            weak_features: strings(&["jaw definition", "skin texture"]),
            grooming: strings(&[
                "Cleanser and moisturiser morning and night",
                "SPF 30 daily",
                "Trim brows every two weeks",
            ]),
            hairstyle: strings(&["Textured crop", "Short sides with length on top"]),
            accessories: strings(&["Minimal steel watch", "Thin-frame glasses"]),
        },
        physique: PhysiquePlan {
            body_type: body_type.as_str().into(),
            workout_7_day: workout_week(body_type),
            posture_cues: strings(&[
                "Ribs down, neutral pelvis",
                "Shoulder blades back and down",
                "Chin tucked when standing",
            ]),
            diet_notes: diet_notes(body_type),
        },
        styling: StylingPlan {
            daily_outfits: vec![
                format!("Work: {vibe} overshirt, plain tee, tapered chinos"),
                "Weekend: crewneck knit, straight jeans, white sneakers".into(),
                "Evening: dark shirt, slim trousers, leather shoes".into(),
            ],
            colours: strings(&["navy", "olive", "white", "charcoal"]),
            wardrobe_essentials: strings(&[
                "Fitted white tee",
                "Dark denim",
                "Neutral overshirt",
                "Clean white sneakers",
            ]),
            hairstyle_synergy: strings(&["Matte clay keeps the crop structured"]),
        },
        glow: GlowPlan {
            week_by_week: glow_weeks(age),
        },
    }
}

fn workout_week(body_type: BodyType) -> Vec<String> {
    let conditioning = match body_type {
        BodyType::Endomorph => "30 min zone 2 cardio",
        BodyType::Ectomorph => "15 min easy walk",
        BodyType::Mesomorph | BodyType::Unknown => "20 min intervals",
    };
    vec![
        "Mon: Push (chest, shoulders, triceps)".into(),
        "Tue: Pull (back, biceps)".into(),
        "Wed: Legs and core".into(),
        format!("Thu: {conditioning}"),
        "Fri: Upper body".into(),
        "Sat: Lower body".into(),
        "Sun: Rest and mobility".into(),
    ]
}

fn diet_notes(body_type: BodyType) -> Vec<String> {
    let energy = match body_type {
        BodyType::Ectomorph => "Eat in a 300 kcal surplus",
        BodyType::Endomorph => "Eat in a 400 kcal deficit",
        BodyType::Mesomorph | BodyType::Unknown => "Eat at maintenance",
    };
    vec![
        energy.into(),
        "1.6 g protein per kg of bodyweight".into(),
        "Two litres of water daily".into(),
    ]
}

fn glow_weeks(age: Option<u32>) -> Vec<String> {
    let mut weeks = strings(&[
        "Weeks 1-2: Build the skincare and training routine",
        "Weeks 3-4: Dial in nutrition and sleep",
        "Weeks 5-8: Refresh wardrobe essentials",
        "Weeks 9-12: Review progress photos and adjust",
    ]);
    if age.is_some_and(|age| age >= 30) {
        weeks.push("Ongoing: Add a retinoid to the night routine".into());
    }
    weeks
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
