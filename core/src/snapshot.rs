//! Serializable transfer form of a running game.
//!
//! A [`GameSnapshot`] is both the broadcast payload and the save format.
//! Field names are camelCase and form a stable contract; loading reads the
//! same shape back.

use serde::{Deserialize, Serialize};

use crate::{EnemyKind, EntityId, GameState, Position};

/// Point-in-time view of every entity plus the scalar game state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Alive towers in placement order.
    pub towers: Vec<TowerSnapshot>,
    /// Alive enemies in spawn order.
    pub enemies: Vec<EnemySnapshot>,
    /// Alive projectiles in firing order.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Current wave number.
    pub wave: u32,
    /// Gold available.
    pub gold: u32,
    /// Remaining lives.
    pub lives: i32,
    /// Accumulated score.
    pub score: u32,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Enemy path, informational.
    #[serde(default)]
    pub path: Vec<Position>,
    /// Map width, informational.
    #[serde(default)]
    pub map_width: u32,
    /// Map height, informational.
    #[serde(default)]
    pub map_height: u32,
}

impl GameSnapshot {
    /// Scalar economy state recorded in the snapshot.
    #[must_use]
    pub const fn state(&self) -> GameState {
        GameState {
            wave: self.wave,
            gold: self.gold,
            lives: self.lives,
            score: self.score,
            game_over: self.game_over,
        }
    }

    /// Total number of entities recorded.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.towers.len() + self.enemies.len() + self.projectiles.len()
    }
}

/// Transfer form of a tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerSnapshot {
    /// Stable identifier.
    pub id: EntityId,
    /// Archetype name.
    pub kind: String,
    /// Placement position.
    pub position: Position,
    /// Targeting radius.
    pub range: f64,
    /// Damage per projectile.
    pub damage: u32,
    /// Shots per second.
    pub fire_rate: f64,
    /// Splash radius, omitted when zero.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub splash_radius: f64,
}

/// Transfer form of an enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemySnapshot {
    /// Stable identifier.
    pub id: EntityId,
    /// Archetype.
    pub kind: EnemyKind,
    /// Current position.
    pub position: Position,
    /// Remaining hit points.
    pub hp: u32,
    /// Hit points at spawn.
    pub max_hp: u32,
    /// Movement speed in path units per frame.
    pub speed: f64,
    /// Index of the waypoint the enemy is walking toward.
    pub path_index: usize,
}

/// Transfer form of a projectile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileSnapshot {
    /// Stable identifier.
    pub id: EntityId,
    /// Archetype name.
    pub kind: String,
    /// Current position.
    pub position: Position,
    /// Enemy the projectile homes in on.
    pub target_id: EntityId,
    /// Travel speed in path units per frame.
    pub speed: f64,
    /// Damage dealt to the primary target.
    pub damage: u32,
    /// Splash radius, omitted when zero.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub splash_radius: f64,
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower(splash_radius: f64) -> TowerSnapshot {
        TowerSnapshot {
            id: EntityId::generate(),
            kind: "splash".to_owned(),
            position: Position::new(10.0, 20.0),
            range: 80.0,
            damage: 15,
            fire_rate: 0.8,
            splash_radius,
        }
    }

    #[test]
    fn fields_use_camel_case_names() {
        let enemy = EnemySnapshot {
            id: EntityId::generate(),
            kind: EnemyKind::Tank,
            position: Position::new(1.0, 2.0),
            hp: 10,
            max_hp: 150,
            speed: 0.5,
            path_index: 3,
        };
        let value = serde_json::to_value(&enemy).expect("serialize");
        assert_eq!(value["maxHp"], 150);
        assert_eq!(value["pathIndex"], 3);
        assert_eq!(value["kind"], "tank");
        assert_eq!(value["position"]["x"], 1.0);
    }

    #[test]
    fn zero_splash_radius_is_omitted() {
        let plain = serde_json::to_value(tower(0.0)).expect("serialize");
        assert!(plain.get("splashRadius").is_none());
        assert_eq!(plain["fireRate"], 0.8);

        let splash = serde_json::to_value(tower(30.0)).expect("serialize");
        assert_eq!(splash["splashRadius"], 30.0);
    }

    #[test]
    fn informational_fields_are_optional_on_decode() {
        let json = r#"{
            "towers": [],
            "enemies": [],
            "projectiles": [],
            "wave": 4,
            "gold": 75,
            "lives": 12,
            "score": 300,
            "gameOver": false
        }"#;
        let snapshot: GameSnapshot = serde_json::from_str(json).expect("decode");
        assert!(snapshot.path.is_empty());
        assert_eq!(snapshot.state(), GameState {
            wave: 4,
            gold: 75,
            lives: 12,
            score: 300,
            game_over: false,
        });
    }
}
