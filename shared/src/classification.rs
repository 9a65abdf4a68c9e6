use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Leaf health outcome of one analysis cycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Classification {
    #[serde(rename = "Early Blight")]
    #[strum(serialize = "Early Blight")]
    EarlyBlight,
    #[serde(rename = "Late Blight")]
    #[strum(serialize = "Late Blight")]
    LateBlight,
    #[serde(rename = "Healthy")]
    #[strum(serialize = "Healthy")]
    Healthy,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::EarlyBlight,
        Classification::LateBlight,
        Classification::Healthy,
    ];

    /// The disease to describe, `None` for a healthy leaf.
    pub fn disease(self) -> Option<Disease> {
        match self {
            Classification::EarlyBlight => Some(Disease::EarlyBlight),
            Classification::LateBlight => Some(Disease::LateBlight),
            Classification::Healthy => None,
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Classification::EarlyBlight => "Early Blight Detected",
            Classification::LateBlight => "Late Blight Detected",
            Classification::Healthy => "Healthy",
        }
    }

    /// CSS class token used by the result card.
    pub fn severity(self) -> &'static str {
        match self {
            Classification::EarlyBlight => "early-blight",
            Classification::LateBlight => "late-blight",
            Classification::Healthy => "healthy",
        }
    }
}

/// The subset of classifications a disease summary can be requested for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum Disease {
    #[serde(rename = "Early Blight")]
    #[strum(serialize = "Early Blight")]
    EarlyBlight,
    #[serde(rename = "Late Blight")]
    #[strum(serialize = "Late Blight")]
    LateBlight,
}

impl Disease {
    pub fn hindi_name(self) -> &'static str {
        match self {
            Disease::EarlyBlight => "अगेती झुलसा",
            Disease::LateBlight => "पछेती झुलसा",
        }
    }
}

impl From<Disease> for Classification {
    fn from(disease: Disease) -> Self {
        match disease {
            Disease::EarlyBlight => Classification::EarlyBlight,
            Disease::LateBlight => Classification::LateBlight,
        }
    }
}

/// Identity of one analysis cycle within a session.
///
/// Two cycles that happen to produce the same [`Classification`] still have
/// different ids, which is what the result presenter keys its fetches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnalysisId(pub u64);

impl AnalysisId {
    pub fn next(self) -> AnalysisId {
        AnalysisId(self.0.wrapping_add(1))
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn display_and_parse_use_human_names() {
        assert_eq!(Classification::EarlyBlight.to_string(), "Early Blight");
        assert_eq!(Classification::from_str("Late Blight").unwrap(), Classification::LateBlight);
        assert!(Classification::from_str("late_blight").is_err());
    }

    #[test]
    fn all_matches_iteration_order() {
        let iterated: Vec<_> = Classification::iter().collect();
        assert_eq!(iterated, Classification::ALL.to_vec());
    }

    #[test]
    fn only_blights_have_a_disease() {
        assert_eq!(Classification::Healthy.disease(), None);
        for disease in Disease::iter() {
            assert_eq!(Classification::from(disease).disease(), Some(disease));
        }
    }

    #[test]
    fn serde_matches_display() {
        let json = serde_json::to_string(&Classification::Healthy).unwrap();
        assert_eq!(json, "\"Healthy\"");
        let parsed: Disease = serde_json::from_str("\"Early Blight\"").unwrap();
        assert_eq!(parsed, Disease::EarlyBlight);
    }
}
