//! Special dates of the gifting calendar.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateCategory {
    Amor,
    Familia,
    Amistad,
    Celebracion,
    Religioso,
}

impl DateCategory {
    pub const ALL: [DateCategory; 5] = [
        DateCategory::Amor,
        DateCategory::Familia,
        DateCategory::Amistad,
        DateCategory::Celebracion,
        DateCategory::Religioso,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateCategory::Amor => "amor",
            DateCategory::Familia => "familia",
            DateCategory::Amistad => "amistad",
            DateCategory::Celebracion => "celebracion",
            DateCategory::Religioso => "religioso",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        DateCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateCategory::Amor => "Amor",
            DateCategory::Familia => "Familia",
            DateCategory::Amistad => "Amistad",
            DateCategory::Celebracion => "Celebración",
            DateCategory::Religioso => "Religioso",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            DateCategory::Amor => "red",
            DateCategory::Familia => "blue",
            DateCategory::Amistad => "yellow",
            DateCategory::Celebracion => "purple",
            DateCategory::Religioso => "green",
        }
    }
}

/// A recurring date, stored as `MM-DD`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialDate {
    pub id: &'static str,
    pub name: &'static str,
    pub date: &'static str,
    pub description: &'static str,
    pub category: DateCategory,
    pub gift_suggestions: &'static [&'static str],
    pub color: &'static str,
    pub icon: &'static str,
}

/// A special date with its distance from a reference day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDate {
    #[serde(flatten)]
    pub date: SpecialDate,
    /// ISO date of the next occurrence
    pub next_occurrence: String,
    pub days_until: i64,
    pub label: String,
}

/// Category with its display label and colour.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub id: DateCategory,
    pub label: &'static str,
    pub color: &'static str,
}

/// A tag choice offered when tagging products for a festival.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FestivalOption {
    pub id: &'static str,
    pub name: &'static str,
    pub tag: String,
}
