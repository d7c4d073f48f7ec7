#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Placement rules that decide whether a tower may be built at a position.

use tower_defense_core::{GameConfig, PlacementConfig, PlacementError, Position};
use tower_defense_world::World;

/// Builder system that validates tower placement requests against the path,
/// existing towers, and the tower cap.
#[derive(Clone, Debug)]
pub struct Builder {
    path: Vec<Position>,
    rules: PlacementConfig,
}

impl Builder {
    /// Creates a builder for the given path and placement constraints.
    #[must_use]
    pub fn new(path: Vec<Position>, rules: PlacementConfig) -> Self {
        Self { path, rules }
    }

    /// Creates a builder from the map and placement sections of a configuration.
    #[must_use]
    pub fn from_game_config(config: &GameConfig) -> Self {
        Self::new(config.map.path.clone(), config.placement)
    }

    /// Checks whether a tower may be placed at `position`.
    ///
    /// Non-finite coordinates are rejected outright. The remaining rules are
    /// evaluated in order: tower cap, distance from every path segment,
    /// spacing from every existing tower. The first violation wins.
    pub fn validate(&self, world: &World, position: Position) -> Result<(), PlacementError> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(PlacementError::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }

        if world.tower_count() >= self.rules.max_towers {
            return Err(PlacementError::TowerLimitReached {
                maximum: self.rules.max_towers,
            });
        }

        let path_distance = self.distance_to_path(position);
        if path_distance < self.rules.min_distance_from_path {
            return Err(PlacementError::TooCloseToPath {
                distance: path_distance,
                minimum: self.rules.min_distance_from_path,
            });
        }

        for tower in world.towers() {
            let distance = tower.position().distance(position);
            if distance < self.rules.min_tower_spacing {
                return Err(PlacementError::TooCloseToTower {
                    distance,
                    minimum: self.rules.min_tower_spacing,
                });
            }
        }

        Ok(())
    }

    /// Distance from `position` to the nearest point on any path segment.
    ///
    /// Paths with fewer than two waypoints have no segments and report an
    /// infinite distance.
    #[must_use]
    pub fn distance_to_path(&self, position: Position) -> f64 {
        self.path
            .windows(2)
            .map(|segment| position.distance_to_segment(segment[0], segment[1]))
            .fold(f64::INFINITY, f64::min)
    }
}
