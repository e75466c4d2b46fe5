use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Backend-assigned user identifier.
///
/// Backends disagree on whether ids are strings or integers, so both are
/// accepted on the wire and normalised to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(value) if value.trim().is_empty() => {
                Err(serde::de::Error::custom("user_id must not be empty"))
            }
            Raw::Text(value) => Ok(Self(value)),
            Raw::Int(value) => Ok(Self(value.to_string())),
        }
    }
}

/// One named view in the linear flow. Declaration order is visit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Splash,
    Onboarding,
    Auth,
    Input,
    Loading,
    Summary,
    Details,
    Paywall,
}

impl Screen {
    pub const ORDER: [Screen; 8] = [
        Screen::Splash,
        Screen::Onboarding,
        Screen::Auth,
        Screen::Input,
        Screen::Loading,
        Screen::Summary,
        Screen::Details,
        Screen::Paywall,
    ];

    pub fn next(self) -> Option<Screen> {
        match self {
            Screen::Splash => Some(Screen::Onboarding),
            Screen::Onboarding => Some(Screen::Auth),
            Screen::Auth => Some(Screen::Input),
            Screen::Input => Some(Screen::Loading),
            Screen::Loading => Some(Screen::Summary),
            Screen::Summary => Some(Screen::Details),
            Screen::Details => Some(Screen::Paywall),
            Screen::Paywall => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Splash => "splash",
            Screen::Onboarding => "onboarding",
            Screen::Auth => "auth",
            Screen::Input => "input",
            Screen::Loading => "loading",
            Screen::Summary => "summary",
            Screen::Details => "details",
            Screen::Paywall => "paywall",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Physique,
    Lookmaxxing,
    Styling,
}

impl FocusArea {
    pub const ALL: [FocusArea; 3] = [
        FocusArea::Physique,
        FocusArea::Lookmaxxing,
        FocusArea::Styling,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FocusArea::Physique => "physique",
            FocusArea::Lookmaxxing => "lookmaxxing",
            FocusArea::Styling => "styling",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FocusArea::Physique => "Physique",
            FocusArea::Lookmaxxing => "Lookmaxxing",
            FocusArea::Styling => "Styling",
        }
    }
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown focus area '{0}' (expected physique, lookmaxxing or styling)")]
pub struct UnknownFocusArea(pub String);

impl FromStr for FocusArea {
    type Err = UnknownFocusArea;

    /// Only the exact lowercase keys are accepted.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "physique" => Ok(FocusArea::Physique),
            "lookmaxxing" => Ok(FocusArea::Lookmaxxing),
            "styling" => Ok(FocusArea::Styling),
            other => Err(UnknownFocusArea(other.to_string())),
        }
    }
}

/// Identity established on the auth screen. Both fields stay `None` until
/// a login, signup or guest login succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Option<UserId>,
    pub email: Option<String>,
}

impl Session {
    pub fn is_established(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Subscription tier shown on the paywall. Selection is presentational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaywallTier {
    pub label: &'static str,
    pub price_usd: u32,
}

pub const PAYWALL_TIERS: [PaywallTier; 3] = [
    PaywallTier {
        label: "Weekly",
        price_usd: 99,
    },
    PaywallTier {
        label: "Monthly",
        price_usd: 199,
    },
    PaywallTier {
        label: "Yearly",
        price_usd: 599,
    },
];
