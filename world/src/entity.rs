//! Entity model stored inside the world.

use std::time::{Duration, Instant};

use tower_defense_core::{
    EnemyKind, EnemySnapshot, EntityId, EntityKind, Position, ProjectileSnapshot, TowerArchetype,
    TowerSnapshot,
};

/// Damage carried from a tower into the projectiles it fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Payload {
    /// Direct damage applied to the primary target.
    pub damage: u32,
    /// Radius of secondary damage around the primary target, zero for none.
    pub splash_radius: f64,
}

impl Payload {
    /// Damage applied to every enemy caught in the splash radius.
    #[must_use]
    pub const fn splash_damage(&self) -> u32 {
        let half = self.damage / 2;
        if half == 0 {
            1
        } else {
            half
        }
    }

    /// Reports whether the payload splashes at all.
    #[must_use]
    pub fn splashes(&self) -> bool {
        self.splash_radius > 0.0
    }
}

/// Combat statistics of a placed tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Targeting radius.
    pub range: f64,
    /// Shots per second.
    pub fire_rate: f64,
    /// Damage carried by each projectile.
    pub payload: Payload,
}

impl From<&TowerArchetype> for TowerStats {
    fn from(archetype: &TowerArchetype) -> Self {
        Self {
            range: archetype.range,
            fire_rate: archetype.fire_rate,
            payload: Payload {
                damage: archetype.damage,
                splash_radius: archetype.splash_radius,
            },
        }
    }
}

/// Stationary defensive structure.
///
/// The position is fixed at construction and has no setter.
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    id: EntityId,
    kind: String,
    position: Position,
    stats: TowerStats,
    last_shot: Option<Instant>,
}

impl Tower {
    /// Creates a tower that is allowed to fire immediately.
    #[must_use]
    pub fn new(id: EntityId, kind: impl Into<String>, position: Position, stats: TowerStats) -> Self {
        Self {
            id,
            kind: kind.into(),
            position,
            stats,
            last_shot: None,
        }
    }

    /// Creates a tower whose cooldown starts at `now`.
    #[must_use]
    pub fn with_cooldown_from(mut self, now: Instant) -> Self {
        self.last_shot = Some(now);
        self
    }

    /// Identifier of the tower.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Archetype name.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Placement position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Combat statistics.
    #[must_use]
    pub const fn stats(&self) -> &TowerStats {
        &self.stats
    }

    /// Minimum time between two shots.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.stats.fire_rate).unwrap_or(Duration::MAX)
    }

    /// Reports whether the cooldown has elapsed at `now`.
    #[must_use]
    pub fn can_fire(&self, now: Instant) -> bool {
        match self.last_shot {
            None => true,
            Some(last_shot) => now.saturating_duration_since(last_shot) >= self.cooldown(),
        }
    }

    /// Restarts the cooldown at `now`.
    pub fn record_shot(&mut self, now: Instant) {
        self.last_shot = Some(now);
    }

    /// Converts the tower into its transfer form.
    #[must_use]
    pub fn to_snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind.clone(),
            position: self.position,
            range: self.stats.range,
            damage: self.stats.payload.damage,
            fire_rate: self.stats.fire_rate,
            splash_radius: self.stats.payload.splash_radius,
        }
    }
}

/// Gold and score granted when an enemy is defeated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bounty {
    /// Gold granted.
    pub gold: u32,
    /// Score granted.
    pub score: u32,
}

/// Hostile unit walking the path.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    id: EntityId,
    kind: EnemyKind,
    position: Position,
    hp: u32,
    max_hp: u32,
    speed: f64,
    path_index: usize,
    bounty: Bounty,
    alive: bool,
}

impl Enemy {
    /// Creates a full-health enemy at the start of the path.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: EnemyKind,
        position: Position,
        max_hp: u32,
        speed: f64,
        bounty: Bounty,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            hp: max_hp,
            max_hp,
            speed,
            path_index: 0,
            bounty,
            alive: true,
        }
    }

    /// Replaces the remaining hit points, clamped to the maximum.
    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.hp = hp.min(self.max_hp);
        self
    }

    /// Replaces the waypoint index.
    #[must_use]
    pub fn with_path_index(mut self, path_index: usize) -> Self {
        self.path_index = path_index;
        self
    }

    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Archetype.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Moves the enemy.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Hit points at spawn.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Movement speed in path units per frame.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Index of the waypoint the enemy last reached.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Advances to the next waypoint.
    pub fn advance_waypoint(&mut self) {
        self.path_index += 1;
    }

    /// Reward paid out on defeat.
    #[must_use]
    pub const fn bounty(&self) -> Bounty {
        self.bounty
    }

    /// Whether the enemy is still stored as alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the enemy has run out of hit points.
    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Whether the enemy can still be targeted or damaged.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.alive && self.hp > 0
    }

    /// Subtracts `amount` hit points, clamping at zero.
    ///
    /// The alive flag is left untouched so the reward stage can observe the
    /// defeat before the enemy becomes eligible for cleanup.
    pub fn apply_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Flags the enemy for removal.
    pub fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// Converts the enemy into its transfer form.
    #[must_use]
    pub const fn to_snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            speed: self.speed,
            path_index: self.path_index,
        }
    }
}

/// Shot homing in on a single enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    id: EntityId,
    kind: String,
    position: Position,
    target: EntityId,
    speed: f64,
    payload: Payload,
    alive: bool,
}

impl Projectile {
    /// Creates a live projectile.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: impl Into<String>,
        position: Position,
        target: EntityId,
        speed: f64,
        payload: Payload,
    ) -> Self {
        Self {
            id,
            kind: kind.into(),
            position,
            target,
            speed,
            payload,
            alive: true,
        }
    }

    /// Identifier of the projectile.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Archetype name.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Moves the projectile.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Enemy the projectile homes in on.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        self.target
    }

    /// Travel speed in path units per frame.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Damage carried by the projectile.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Whether the projectile is still in flight.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Retires the projectile.
    pub fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// Converts the projectile into its transfer form.
    #[must_use]
    pub fn to_snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind.clone(),
            position: self.position,
            target_id: self.target,
            speed: self.speed,
            damage: self.payload.damage,
            splash_radius: self.payload.splash_radius,
        }
    }
}

/// Owned entity of any kind, used when inserting into the world.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    /// Tower entity.
    Tower(Tower),
    /// Enemy entity.
    Enemy(Enemy),
    /// Projectile entity.
    Projectile(Projectile),
}

impl Entity {
    /// Identifier of the wrapped entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        match self {
            Self::Tower(tower) => tower.id(),
            Self::Enemy(enemy) => enemy.id(),
            Self::Projectile(projectile) => projectile.id(),
        }
    }

    /// Kind tag of the wrapped entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Tower(_) => EntityKind::Tower,
            Self::Enemy(_) => EntityKind::Enemy,
            Self::Projectile(_) => EntityKind::Projectile,
        }
    }
}

impl From<Tower> for Entity {
    fn from(tower: Tower) -> Self {
        Self::Tower(tower)
    }
}

impl From<Enemy> for Entity {
    fn from(enemy: Enemy) -> Self {
        Self::Enemy(enemy)
    }
}

impl From<Projectile> for Entity {
    fn from(projectile: Projectile) -> Self {
        Self::Projectile(projectile)
    }
}

/// Borrowed entity of any kind returned by identifier lookups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EntityRef<'a> {
    /// Tower entity.
    Tower(&'a Tower),
    /// Enemy entity.
    Enemy(&'a Enemy),
    /// Projectile entity.
    Projectile(&'a Projectile),
}

impl EntityRef<'_> {
    /// Identifier of the referenced entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        match self {
            Self::Tower(tower) => tower.id(),
            Self::Enemy(enemy) => enemy.id(),
            Self::Projectile(projectile) => projectile.id(),
        }
    }

    /// Kind tag of the referenced entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Tower(_) => EntityKind::Tower,
            Self::Enemy(_) => EntityKind::Enemy,
            Self::Projectile(_) => EntityKind::Projectile,
        }
    }

    /// Position of the referenced entity.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::Tower(tower) => tower.position(),
            Self::Enemy(enemy) => enemy.position(),
            Self::Projectile(projectile) => projectile.position(),
        }
    }

    /// Alive flag of the referenced entity. Towers are always alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        match self {
            Self::Tower(_) => true,
            Self::Enemy(enemy) => enemy.is_alive(),
            Self::Projectile(projectile) => projectile.is_alive(),
        }
    }
}
