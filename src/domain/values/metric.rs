//! Fixed catalogue of the performance metrics a step can be bound to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Attack,
    Defence,
    Possession,
    Discipline,
    Form,
    SetPieces,
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricCategory::Attack => write!(f, "attack"),
            MetricCategory::Defence => write!(f, "defence"),
            MetricCategory::Possession => write!(f, "possession"),
            MetricCategory::Discipline => write!(f, "discipline"),
            MetricCategory::Form => write!(f, "form"),
            MetricCategory::SetPieces => write!(f, "set_pieces"),
        }
    }
}

impl FromStr for MetricCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attack" => Ok(MetricCategory::Attack),
            "defence" | "defense" => Ok(MetricCategory::Defence),
            "possession" => Ok(MetricCategory::Possession),
            "discipline" => Ok(MetricCategory::Discipline),
            "form" => Ok(MetricCategory::Form),
            "set_pieces" | "set-pieces" => Ok(MetricCategory::SetPieces),
            _ => Err(format!("Unknown metric category: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub id: &'static str,
    pub name: &'static str,
    pub category: MetricCategory,
}

const fn metric(id: &'static str, name: &'static str, category: MetricCategory) -> Metric {
    Metric { id, name, category }
}

static CATALOGUE: &[Metric] = &[
    metric("goals_scored", "Goals scored per match", MetricCategory::Attack),
    metric("expected_goals", "Expected goals (xG)", MetricCategory::Attack),
    metric("shots", "Shots per match", MetricCategory::Attack),
    metric("shots_on_target", "Shots on target per match", MetricCategory::Attack),
    metric("big_chances", "Big chances created", MetricCategory::Attack),
    metric("goals_conceded", "Goals conceded per match", MetricCategory::Defence),
    metric("expected_goals_against", "Expected goals against (xGA)", MetricCategory::Defence),
    metric("clean_sheets", "Clean sheets", MetricCategory::Defence),
    metric("tackles_won", "Tackles won per match", MetricCategory::Defence),
    metric("interceptions", "Interceptions per match", MetricCategory::Defence),
    metric("possession", "Ball possession %", MetricCategory::Possession),
    metric("pass_accuracy", "Pass accuracy %", MetricCategory::Possession),
    metric("passes", "Passes per match", MetricCategory::Possession),
    metric("fouls", "Fouls per match", MetricCategory::Discipline),
    metric("yellow_cards", "Yellow cards per match", MetricCategory::Discipline),
    metric("red_cards", "Red cards", MetricCategory::Discipline),
    metric("points_per_game", "Points per game", MetricCategory::Form),
    metric("last_five_points", "Points from last five matches", MetricCategory::Form),
    metric("league_position", "League position", MetricCategory::Form),
    metric("win_rate", "Win rate %", MetricCategory::Form),
    metric("corners", "Corners per match", MetricCategory::SetPieces),
    metric("set_piece_goals", "Goals from set pieces", MetricCategory::SetPieces),
];

/// Read-only lookup over the process-wide metric catalogue.
pub struct MetricRegistry;

impl MetricRegistry {
    pub fn all() -> &'static [Metric] {
        CATALOGUE
    }

    pub fn get(id: &str) -> Option<&'static Metric> {
        CATALOGUE.iter().find(|m| m.id == id)
    }

    pub fn contains(id: &str) -> bool {
        Self::get(id).is_some()
    }

    pub fn by_category(category: MetricCategory) -> Vec<&'static Metric> {
        CATALOGUE.iter().filter(|m| m.category == category).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = MetricRegistry::all().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), MetricRegistry::all().len());
    }

    #[test]
    fn test_lookup() {
        let m = MetricRegistry::get("expected_goals").expect("xG is catalogued");
        assert_eq!(m.category, MetricCategory::Attack);
        assert!(MetricRegistry::get("vibes").is_none());
    }

    #[test]
    fn test_every_category_has_metrics() {
        for category in [
            MetricCategory::Attack,
            MetricCategory::Defence,
            MetricCategory::Possession,
            MetricCategory::Discipline,
            MetricCategory::Form,
            MetricCategory::SetPieces,
        ] {
            assert!(!MetricRegistry::by_category(category).is_empty());
        }
    }
}
