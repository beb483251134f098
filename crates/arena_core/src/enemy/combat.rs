//! Enemy attack timing: cooldowns, telegraphs and boss stomps.
//!
//! This module only decides *when* an enemy attacks. The arena owns the
//! projectile pool and the deferred queue, so attacks come back as
//! [`EnemyAttack`] requests and the arena executes them.

use crate::data::{EnemyConfig, DEFAULT_ENEMY_ATTACK_COOLDOWN};
use crate::math::{Fixed, Vec2Fixed};

/// Default telegraph before a ranged shot, ms.
pub const DEFAULT_TELEGRAPH_MS: i32 = 1000;

/// Default boss stomp interval, ms.
pub const DEFAULT_STOMP_INTERVAL_MS: i32 = 3000;

/// An attack the arena must carry out this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyAttack {
    /// Start a telegraph; the shot is fired by a deferred task after `delay`.
    Telegraph {
        /// Telegraph duration, ms.
        delay: Fixed,
    },
    /// Drop a trail hazard at the enemy's position now.
    Trail,
    /// Boss area pulse.
    Stomp,
}

/// Per-enemy attack state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyCombat {
    cooldown: Fixed,
    telegraphing: bool,
    stomp_timer: Fixed,
}

impl EnemyCombat {
    /// Fresh state: ready to attack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining cooldown, ms.
    #[must_use]
    pub const fn cooldown(&self) -> Fixed {
        self.cooldown
    }

    /// Whether a telegraph is in progress (blocks movement).
    #[must_use]
    pub const fn is_telegraphing(&self) -> bool {
        self.telegraphing
    }

    /// Advance timers and decide this tick's attacks.
    pub fn update(
        &mut self,
        delta: Fixed,
        config: &EnemyConfig,
        is_boss: bool,
        position: Vec2Fixed,
        player: Option<Vec2Fixed>,
    ) -> Vec<EnemyAttack> {
        let mut attacks = Vec::new();

        if is_boss {
            let interval = config
                .boss
                .as_ref()
                .and_then(|boss| boss.stomp_interval_ms)
                .filter(|interval| *interval > Fixed::ZERO)
                .unwrap_or_else(|| Fixed::from_num(DEFAULT_STOMP_INTERVAL_MS));
            self.stomp_timer += delta;
            if self.stomp_timer >= interval {
                self.stomp_timer = Fixed::ZERO;
                attacks.push(EnemyAttack::Stomp);
            }
        }

        if self.cooldown > Fixed::ZERO {
            self.cooldown -= delta;
        }

        if self.telegraphing || self.cooldown > Fixed::ZERO {
            return attacks;
        }
        let Some(player) = player else {
            return attacks;
        };

        if let Some(ranged) = &config.ranged_attack {
            if position.distance(player) < ranged.range {
                self.telegraphing = true;
                attacks.push(EnemyAttack::Telegraph {
                    delay: ranged
                        .telegraph_ms
                        .unwrap_or_else(|| Fixed::from_num(DEFAULT_TELEGRAPH_MS)),
                });
                return attacks;
            }
        }

        if config.trail_attack.is_some() {
            attacks.push(EnemyAttack::Trail);
            self.start_cooldown(config);
        }

        attacks
    }

    /// Called when a telegraphed shot resolves (fired or cancelled).
    pub fn finish_telegraph(&mut self, fired: bool, config: &EnemyConfig) {
        self.telegraphing = false;
        if fired {
            self.start_cooldown(config);
        }
    }

    fn start_cooldown(&mut self, config: &EnemyConfig) {
        self.cooldown = config.attack_cooldown().unwrap_or_else(|| Fixed::from_num(DEFAULT_ENEMY_ATTACK_COOLDOWN));
    }
}
