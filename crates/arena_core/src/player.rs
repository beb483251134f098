//! The player character as seen by the combat core.
//!
//! Movement input is external; the core only reads the position, resolves
//! stats for weapons and applies incoming damage.

use crate::config::PlayerSettings;
use crate::events::DamageSource;
use crate::math::{Fixed, Vec2Fixed};
use crate::physics::BodyHandle;
use crate::stats::{ResolvedStats, StatKind, StatModifier, StatPipeline};

/// Damage actually taken by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHit {
    /// Amount subtracted (rounded up).
    pub amount: Fixed,
    /// Health afterwards.
    pub health: Fixed,
    /// What dealt it.
    pub source: DamageSource,
    /// Whether this hit killed the player.
    pub died: bool,
}

/// Player state.
#[derive(Debug, Clone)]
pub struct Player {
    pipeline: StatPipeline,
    stats: ResolvedStats,
    health: Fixed,
    /// Last known position.
    pub position: Vec2Fixed,
    radius: Fixed,
    grace_window: Fixed,
    grace_timer: Fixed,
    alive: bool,
    xp: u32,
    /// Physics body.
    pub body: Option<BodyHandle>,
}

impl Player {
    /// Create a player from configuration.
    #[must_use]
    pub fn new(settings: &PlayerSettings) -> Self {
        let pipeline = StatPipeline::from_bases(&settings.base_stats());
        let stats = pipeline.resolve_all();
        Self {
            health: stats.max_health,
            pipeline,
            stats,
            position: settings.spawn,
            radius: settings.radius,
            grace_window: settings.contact_grace_ms,
            grace_timer: Fixed::ZERO,
            alive: true,
            xp: 0,
            body: None,
        }
    }

    /// Stats resolved at the start of the current tick.
    #[must_use]
    pub const fn stats(&self) -> &ResolvedStats {
        &self.stats
    }

    /// Add a stat modifier (upgrade, item...). Takes effect next tick.
    pub fn add_modifier(&mut self, kind: StatKind, modifier: StatModifier) -> bool {
        self.pipeline.add_modifier(kind, modifier)
    }

    /// Remove every modifier granted by `source`.
    pub fn remove_modifiers(&mut self, source: &str) -> usize {
        self.pipeline.remove_source(source)
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> Fixed {
        self.health
    }

    /// Body radius.
    #[must_use]
    pub const fn radius(&self) -> Fixed {
        self.radius
    }

    /// Whether the player is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Experience collected so far.
    #[must_use]
    pub const fn xp(&self) -> u32 {
        self.xp
    }

    /// Start-of-tick bookkeeping: resolve stats and run down the grace timer.
    pub fn update(&mut self, delta: Fixed) {
        self.stats = self.pipeline.resolve_all();
        self.health = self.health.min(self.stats.max_health);
        if self.grace_timer > Fixed::ZERO {
            self.grace_timer -= delta;
        }
    }

    /// Apply incoming damage, rounded up.
    ///
    /// Ignored while dead or inside the grace window opened by the previous hit.
    pub fn take_damage(&mut self, amount: Fixed, source: DamageSource) -> Option<PlayerHit> {
        if !self.alive || self.grace_timer > Fixed::ZERO {
            return None;
        }
        let amount = amount.ceil();
        if amount <= Fixed::ZERO {
            return None;
        }
        self.health -= amount;
        self.grace_timer = self.grace_window;
        let died = self.health <= Fixed::ZERO;
        if died {
            self.alive = false;
            tracing::info!("Player died");
        }
        Some(PlayerHit {
            amount,
            health: self.health,
            source,
            died,
        })
    }

    /// Restore health up to the maximum.
    pub fn heal(&mut self, amount: Fixed) {
        if self.alive {
            self.health = (self.health + amount).min(self.stats.max_health);
        }
    }

    /// Bank experience.
    pub fn gain_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_rounds_up_and_respects_grace() {
        let mut player = Player::new(&PlayerSettings::default());
        let hit = player
            .take_damage(Fixed::from_num(7.2), DamageSource::EnemyContact)
            .unwrap();
        assert_eq!(hit.amount, Fixed::from_num(8));
        assert_eq!(player.health(), Fixed::from_num(92));

        assert!(player.take_damage(Fixed::from_num(5), DamageSource::EnemyContact).is_none());
        player.update(Fixed::from_num(500));
        assert!(player.take_damage(Fixed::from_num(5), DamageSource::EnemyContact).is_some());
    }

    #[test]
    fn test_death_is_one_shot() {
        let settings = PlayerSettings {
            max_health: Fixed::from_num(10),
            contact_grace_ms: Fixed::ZERO,
            ..PlayerSettings::default()
        };
        let mut player = Player::new(&settings);
        assert!(player.take_damage(Fixed::from_num(15), DamageSource::EnemyProjectile).unwrap().died);
        assert!(!player.is_alive());
        assert!(player.take_damage(Fixed::from_num(15), DamageSource::EnemyProjectile).is_none());
    }

    #[test]
    fn test_modifiers_apply_next_update() {
        let mut player = Player::new(&PlayerSettings::default());
        player.add_modifier(StatKind::Area, StatModifier::multiplicative("tome", Fixed::from_num(1.5)));
        assert_eq!(player.stats().area, Fixed::ONE);
        player.update(Fixed::from_num(16));
        assert_eq!(player.stats().area, Fixed::from_num(1.5));
    }
}
