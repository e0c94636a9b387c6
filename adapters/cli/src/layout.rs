//! Tower layouts placed before a headless match starts.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waveguard_core::{PlacementError, Point, TowerKind};
use waveguard_rendering::TowerInteractionFeedback;
use waveguard_simulation::Simulation;

/// Failure raised while loading a layout file.
#[derive(Debug, Error)]
pub(crate) enum LayoutError {
    /// The file could not be read.
    #[error("failed to read layout: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a valid layout document.
    #[error("invalid layout: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Ordered list of towers to place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TowerLayout {
    /// Towers placed in document order.
    #[serde(default)]
    pub(crate) towers: Vec<LayoutTower>,
}

/// Single tower entry of a layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LayoutTower {
    pub(crate) kind: TowerKind,
    pub(crate) x: f32,
    pub(crate) y: f32,
    /// Upgrades bought right after placement.
    #[serde(default)]
    pub(crate) upgrades: u32,
    /// Whether to buy the unlock when the kind is still locked.
    #[serde(default)]
    pub(crate) unlock: bool,
}

impl TowerLayout {
    pub(crate) fn from_toml_str(source: &str) -> Result<Self, LayoutError> {
        Ok(toml::from_str(source)?)
    }

    pub(crate) fn from_path(path: &Path) -> Result<Self, LayoutError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Places every tower, returning the rejections the world reported.
    ///
    /// A rejected entry is skipped; later entries are still attempted.
    pub(crate) fn apply(&self, simulation: &mut Simulation) -> Vec<TowerInteractionFeedback> {
        let mut feedback = Vec::new();

        for entry in &self.towers {
            let position = Point::new(entry.x, entry.y);
            let mut placed = simulation.place_tower(entry.kind, position);
            if entry.unlock && placed == Err(PlacementError::Locked) {
                if let Err(reason) = simulation.unlock_tower(entry.kind) {
                    feedback.push(TowerInteractionFeedback::UnlockRejected {
                        kind: entry.kind,
                        reason,
                    });
                    continue;
                }
                placed = simulation.place_tower(entry.kind, position);
            }

            let tower = match placed {
                Ok(tower) => tower,
                Err(reason) => {
                    feedback.push(TowerInteractionFeedback::PlacementRejected {
                        kind: entry.kind,
                        position: glam::Vec2::new(entry.x, entry.y),
                        reason,
                    });
                    continue;
                }
            };

            for _ in 0..entry.upgrades {
                if let Err(reason) = simulation.upgrade_tower(tower) {
                    feedback.push(TowerInteractionFeedback::UpgradeRejected { tower, reason });
                    break;
                }
            }
        }

        feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use waveguard_core::{MatchSetup, UpgradeError};
    use waveguard_simulation::SimulationConfig;

    const LAYOUT: &str = r#"
        [[towers]]
        kind = "basic"
        x = 100.0
        y = 240.0
        upgrades = 2

        [[towers]]
        kind = "cannon"
        x = 110.0
        y = 250.0

        [[towers]]
        kind = "frost"
        x = 260.0
        y = 200.0
        unlock = true
    "#;

    fn simulation(money: u64) -> Simulation {
        let config = SimulationConfig {
            starting_money: money,
            unlocked_towers: Some(BTreeSet::new()),
            ..SimulationConfig::default()
        };
        Simulation::new(MatchSetup::default(), &config)
    }

    #[test]
    fn parses_entries_with_defaults() {
        let layout = TowerLayout::from_toml_str(LAYOUT).expect("layout parses");

        assert_eq!(layout.towers.len(), 3);
        assert_eq!(layout.towers[0].upgrades, 2);
        assert!(!layout.towers[1].unlock);
        assert!(layout.towers[2].unlock);
    }

    #[test]
    fn rejects_unknown_kinds() {
        let source = "[[towers]]\nkind = \"ballista\"\nx = 1.0\ny = 1.0\n";
        let error = TowerLayout::from_toml_str(source).expect_err("unknown kind rejected");

        assert!(matches!(error, LayoutError::Parse(_)));
    }

    #[test]
    fn apply_reports_each_rejection_and_keeps_going() {
        let layout = TowerLayout::from_toml_str(LAYOUT).expect("layout parses");
        let mut simulation = simulation(500);

        let feedback = layout.apply(&mut simulation);

        assert_eq!(
            feedback,
            vec![TowerInteractionFeedback::PlacementRejected {
                kind: TowerKind::Cannon,
                position: glam::Vec2::new(110.0, 250.0),
                reason: PlacementError::Locked,
            }]
        );
        let towers = simulation.towers().into_vec();
        assert_eq!(towers.len(), 2);
        assert_eq!(towers[0].level, 3);
        assert_eq!(towers[1].kind, TowerKind::Frost);
        assert_eq!(simulation.hud().money, 500 - 50 - 25 - 50 - 200 - 80);
    }

    #[test]
    fn apply_stops_upgrading_when_money_runs_out() {
        let source = "[[towers]]\nkind = \"basic\"\nx = 300.0\ny = 300.0\nupgrades = 5\n";
        let layout = TowerLayout::from_toml_str(source).expect("layout parses");
        let mut simulation = simulation(100);

        let feedback = layout.apply(&mut simulation);

        assert!(matches!(
            feedback.as_slice(),
            [TowerInteractionFeedback::UpgradeRejected {
                reason: UpgradeError::InsufficientFunds,
                ..
            }]
        ));
        assert_eq!(simulation.towers().into_vec()[0].level, 2);
    }
}
