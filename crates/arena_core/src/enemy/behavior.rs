//! Enemy decision logic.
//!
//! A behavior is chosen once at spawn from archetype data and never
//! swapped. Every tick it advances its own timers ([`EnemyBehavior::update`]),
//! possibly emitting side-effect requests ([`BehaviorAction`]), and reports a
//! [`MovementVector`]: a unit direction plus a speed scalar that the movement
//! step multiplies by the enemy's base speed.
//!
//! All transitions are elapsed-time thresholds. Leftover time carries into
//! the next state, so a single large `delta` walks through as many
//! transitions (and burst shots) as the elapsed time covers.

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, Fixed, Vec2Fixed};

/// Smallest state duration honoured, so zero-length phases cannot spin.
fn phase_length(value: Fixed) -> Fixed {
    value.max(Fixed::ONE)
}

/// World facts a behavior may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorContext {
    /// Enemy position.
    pub position: Vec2Fixed,
    /// Player position, if there is a live player.
    pub player: Option<Vec2Fixed>,
    /// Ranged attack reach, if the enemy has one.
    pub attack_range: Option<Fixed>,
}

impl BehaviorContext {
    fn direction_to_player(&self) -> Option<Vec2Fixed> {
        self.player.and_then(|player| self.position.direction_to(player))
    }

    fn distance_to_player(&self) -> Option<Fixed> {
        self.player.map(|player| self.position.distance(player))
    }
}

/// Unit direction plus speed scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementVector {
    /// Unit direction (zero when standing still).
    pub direction: Vec2Fixed,
    /// Multiplier applied to the enemy's base speed.
    pub speed: Fixed,
}

impl MovementVector {
    /// Stand still.
    pub const STILL: Self = Self {
        direction: Vec2Fixed::ZERO,
        speed: Fixed::ZERO,
    };

    /// Move along `direction` at `speed` times base speed.
    #[must_use]
    pub const fn new(direction: Vec2Fixed, speed: Fixed) -> Self {
        Self { direction, speed }
    }

    /// Whether this vector produces no motion.
    #[must_use]
    pub fn is_still(&self) -> bool {
        self.direction.is_zero() || self.speed == Fixed::ZERO
    }
}

/// Side effects a behavior asks its enemy to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorAction {
    /// Area pulse at the enemy's position.
    Stomp,
    /// A telegraph of the given length (ms) started.
    Telegraph(Fixed),
    /// Fire one shot at the player.
    Fire,
}

/// Parameters of [`RhythmicArea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmicAreaParams {
    /// Time between area pulses, ms.
    #[serde(with = "decimal_serde")]
    pub pulse_interval: Fixed,
    /// Time spent orbiting, ms.
    #[serde(with = "decimal_serde")]
    pub orbit_duration: Fixed,
    /// Time spent dashing, ms.
    #[serde(with = "decimal_serde")]
    pub dash_duration: Fixed,
    /// Speed scalar while dashing.
    #[serde(with = "decimal_serde")]
    pub dash_speed: Fixed,
    /// Speed scalar while orbiting.
    #[serde(with = "decimal_serde")]
    pub orbit_speed: Fixed,
    /// `1` clockwise, `-1` counter-clockwise.
    #[serde(with = "decimal_serde")]
    pub orbit_direction: Fixed,
}

impl Default for RhythmicAreaParams {
    fn default() -> Self {
        Self {
            pulse_interval: Fixed::from_num(2000),
            orbit_duration: Fixed::from_num(3000),
            dash_duration: Fixed::from_num(500),
            dash_speed: Fixed::from_num(4),
            orbit_speed: Fixed::ONE,
            orbit_direction: Fixed::ONE,
        }
    }
}

/// Parameters of [`StationaryBurst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationaryBurstParams {
    /// Time between bursts, ms.
    #[serde(with = "decimal_serde")]
    pub pause_duration: Fixed,
    /// Telegraph before a burst, ms.
    #[serde(with = "decimal_serde")]
    pub telegraph_duration: Fixed,
    /// Time between shots inside a burst, ms.
    #[serde(with = "decimal_serde")]
    pub fire_rate: Fixed,
    /// Shots per burst.
    pub shots_per_burst: u32,
    /// Speed scalar while waiting (0 = stationary).
    #[serde(with = "decimal_serde")]
    pub idle_speed: Fixed,
}

impl Default for StationaryBurstParams {
    fn default() -> Self {
        Self {
            pause_duration: Fixed::from_num(2000),
            telegraph_duration: Fixed::from_num(1000),
            fire_rate: Fixed::from_num(100),
            shots_per_burst: 10,
            idle_speed: Fixed::ZERO,
        }
    }
}

/// Parameters of [`TacticalChase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalChaseParams {
    /// Chase phase length, ms.
    #[serde(with = "decimal_serde")]
    pub chase_duration: Fixed,
    /// Reposition phase length, ms.
    #[serde(with = "decimal_serde")]
    pub reposition_duration: Fixed,
    /// Desired distance while repositioning.
    #[serde(with = "decimal_serde")]
    pub preferred_distance: Fixed,
    /// Half-width of the preferred distance band.
    #[serde(with = "decimal_serde")]
    pub distance_tolerance: Fixed,
    /// Speed scalar while chasing.
    #[serde(with = "decimal_serde")]
    pub approach_speed: Fixed,
    /// Speed scalar when retreating.
    #[serde(with = "decimal_serde")]
    pub retreat_speed: Fixed,
    /// Speed scalar when closing in from too far.
    #[serde(with = "decimal_serde")]
    pub slow_approach_speed: Fixed,
    /// Speed scalar while orbiting inside the band.
    #[serde(with = "decimal_serde")]
    pub orbit_speed: Fixed,
}

impl Default for TacticalChaseParams {
    fn default() -> Self {
        Self {
            chase_duration: Fixed::from_num(3000),
            reposition_duration: Fixed::from_num(2000),
            preferred_distance: Fixed::from_num(300),
            distance_tolerance: Fixed::from_num(50),
            approach_speed: Fixed::from_num(1.2),
            retreat_speed: Fixed::from_num(0.8),
            slow_approach_speed: Fixed::from_num(0.5),
            orbit_speed: Fixed::from_num(0.6),
        }
    }
}

/// Boss behavior selection, as authored in boss definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossBehaviorConfig {
    /// Alternate chase and pause on a fixed interval.
    #[default]
    PhaseToggle,
    /// Orbit, dash and pulse.
    RhythmicArea(RhythmicAreaParams),
    /// Stand and fire bursts.
    StationaryBurst(StationaryBurstParams),
    /// Chase, then hold a distance band.
    TacticalChase(TacticalChaseParams),
}

/// Phase of [`PhaseToggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TogglePhase {
    /// Moving toward the player.
    Chase,
    /// Standing still.
    Pause,
}

/// Default boss behavior: chase and pause alternately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseToggle {
    interval: Fixed,
    timer: Fixed,
    phase: TogglePhase,
}

impl PhaseToggle {
    /// Start in the chase phase.
    #[must_use]
    pub fn new(interval: Fixed) -> Self {
        Self {
            interval: phase_length(interval),
            timer: Fixed::ZERO,
            phase: TogglePhase::Chase,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> TogglePhase {
        self.phase
    }

    fn update(&mut self, delta: Fixed) {
        self.timer += delta;
        while self.timer >= self.interval {
            self.timer -= self.interval;
            self.phase = match self.phase {
                TogglePhase::Chase => TogglePhase::Pause,
                TogglePhase::Pause => TogglePhase::Chase,
            };
        }
    }

    fn movement(&self, ctx: &BehaviorContext) -> MovementVector {
        match (self.phase, ctx.direction_to_player()) {
            (TogglePhase::Chase, Some(dir)) => MovementVector::new(dir, Fixed::ONE),
            _ => MovementVector::STILL,
        }
    }
}

/// State of [`RhythmicArea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmicState {
    /// Circling the player.
    Orbiting,
    /// Dashing along a locked direction.
    Dashing,
}

/// Orbit, dash and pulse boss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RhythmicArea {
    params: RhythmicAreaParams,
    state: RhythmicState,
    state_timer: Fixed,
    pulse_timer: Fixed,
    dash_direction: Vec2Fixed,
}

impl RhythmicArea {
    /// Start orbiting.
    #[must_use]
    pub fn new(params: RhythmicAreaParams) -> Self {
        Self {
            params,
            state: RhythmicState::Orbiting,
            state_timer: Fixed::ZERO,
            pulse_timer: Fixed::ZERO,
            dash_direction: Vec2Fixed::ZERO,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> RhythmicState {
        self.state
    }

    fn update(&mut self, delta: Fixed, ctx: &BehaviorContext, actions: &mut Vec<BehaviorAction>) {
        self.state_timer += delta;
        self.pulse_timer += delta;

        let pulse_interval = phase_length(self.params.pulse_interval);
        while self.pulse_timer >= pulse_interval {
            self.pulse_timer -= pulse_interval;
            actions.push(BehaviorAction::Stomp);
        }

        loop {
            match self.state {
                RhythmicState::Orbiting => {
                    let limit = phase_length(self.params.orbit_duration);
                    if self.state_timer < limit {
                        break;
                    }
                    self.state_timer -= limit;
                    self.state = RhythmicState::Dashing;
                    // Locked at dash start; no steering mid-dash.
                    self.dash_direction = ctx.direction_to_player().unwrap_or(Vec2Fixed::ZERO);
                }
                RhythmicState::Dashing => {
                    let limit = phase_length(self.params.dash_duration);
                    if self.state_timer < limit {
                        break;
                    }
                    self.state_timer -= limit;
                    self.state = RhythmicState::Orbiting;
                }
            }
        }
    }

    fn movement(&self, ctx: &BehaviorContext) -> MovementVector {
        match self.state {
            RhythmicState::Dashing => MovementVector::new(self.dash_direction, self.params.dash_speed),
            RhythmicState::Orbiting => match ctx.direction_to_player() {
                Some(dir) => MovementVector::new(dir.perp().scale(self.params.orbit_direction), self.params.orbit_speed),
                None => MovementVector::STILL,
            },
        }
    }
}

/// State of [`StationaryBurst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstState {
    /// Pausing between bursts.
    Waiting,
    /// Warning before a burst.
    Telegraphing,
    /// Firing the burst.
    Firing,
}

/// Stand-and-burst boss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationaryBurst {
    params: StationaryBurstParams,
    state: BurstState,
    state_timer: Fixed,
    shots_fired: u32,
}

impl StationaryBurst {
    /// Start waiting.
    #[must_use]
    pub fn new(params: StationaryBurstParams) -> Self {
        Self {
            params,
            state: BurstState::Waiting,
            state_timer: Fixed::ZERO,
            shots_fired: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> BurstState {
        self.state
    }

    /// Shots fired in the current burst.
    #[must_use]
    pub const fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    fn update(&mut self, delta: Fixed, actions: &mut Vec<BehaviorAction>) {
        self.state_timer += delta;
        let shots = self.params.shots_per_burst.max(1);

        loop {
            match self.state {
                BurstState::Waiting => {
                    let limit = phase_length(self.params.pause_duration);
                    if self.state_timer < limit {
                        break;
                    }
                    self.state_timer -= limit;
                    self.state = BurstState::Telegraphing;
                    actions.push(BehaviorAction::Telegraph(self.params.telegraph_duration));
                }
                BurstState::Telegraphing => {
                    let limit = phase_length(self.params.telegraph_duration);
                    if self.state_timer < limit {
                        break;
                    }
                    self.state_timer -= limit;
                    self.state = BurstState::Firing;
                    self.shots_fired = 0;
                }
                BurstState::Firing => {
                    let limit = phase_length(self.params.fire_rate);
                    if self.state_timer < limit {
                        break;
                    }
                    self.state_timer -= limit;
                    self.shots_fired += 1;
                    actions.push(BehaviorAction::Fire);
                    if self.shots_fired >= shots {
                        self.state = BurstState::Waiting;
                    }
                }
            }
        }
    }

    fn movement(&self, ctx: &BehaviorContext) -> MovementVector {
        if self.params.idle_speed > Fixed::ZERO && self.state == BurstState::Waiting {
            if let Some(dir) = ctx.direction_to_player() {
                return MovementVector::new(dir, self.params.idle_speed);
            }
        }
        MovementVector::STILL
    }
}

/// State of [`TacticalChase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticalState {
    /// Closing in on the player.
    Chasing,
    /// Holding the preferred distance band.
    Repositioning,
}

/// Chase-then-reposition boss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TacticalChase {
    params: TacticalChaseParams,
    state: TacticalState,
    state_timer: Fixed,
}

impl TacticalChase {
    /// Start chasing.
    #[must_use]
    pub fn new(params: TacticalChaseParams) -> Self {
        Self {
            params,
            state: TacticalState::Chasing,
            state_timer: Fixed::ZERO,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> TacticalState {
        self.state
    }

    fn update(&mut self, delta: Fixed) {
        self.state_timer += delta;
        loop {
            let limit = phase_length(match self.state {
                TacticalState::Chasing => self.params.chase_duration,
                TacticalState::Repositioning => self.params.reposition_duration,
            });
            if self.state_timer < limit {
                break;
            }
            self.state_timer -= limit;
            self.state = match self.state {
                TacticalState::Chasing => TacticalState::Repositioning,
                TacticalState::Repositioning => TacticalState::Chasing,
            };
        }
    }

    fn movement(&self, ctx: &BehaviorContext) -> MovementVector {
        let (Some(dir), Some(distance)) = (ctx.direction_to_player(), ctx.distance_to_player()) else {
            return MovementVector::STILL;
        };
        let p = &self.params;
        match self.state {
            TacticalState::Chasing => MovementVector::new(dir, p.approach_speed),
            TacticalState::Repositioning => {
                if distance < p.preferred_distance - p.distance_tolerance {
                    MovementVector::new(-dir, p.retreat_speed)
                } else if distance > p.preferred_distance + p.distance_tolerance {
                    MovementVector::new(dir, p.slow_approach_speed)
                } else {
                    MovementVector::new(dir.perp(), p.orbit_speed)
                }
            }
        }
    }
}

/// Per-enemy behavior, chosen once at spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnemyBehavior {
    /// Walk straight at the player.
    Chase,
    /// Shooter: close in to attack range, then hold.
    Idle,
    /// Boss chase/pause toggle.
    Boss(PhaseToggle),
    /// Orbit, dash and pulse.
    RhythmicArea(RhythmicArea),
    /// Stand and fire bursts.
    StationaryBurst(StationaryBurst),
    /// Chase, then hold a distance band.
    TacticalChase(TacticalChase),
}

impl EnemyBehavior {
    /// Pick the behavior for a new enemy.
    ///
    /// Priority: bosses get their configured boss behavior, enemies with a
    /// ranged attack get [`EnemyBehavior::Idle`], everything else chases.
    #[must_use]
    pub fn select(boss: Option<&BossBehaviorConfig>, can_shoot: bool, boss_phase_interval: Fixed) -> Self {
        match boss {
            Some(BossBehaviorConfig::PhaseToggle) => Self::Boss(PhaseToggle::new(boss_phase_interval)),
            Some(BossBehaviorConfig::RhythmicArea(params)) => Self::RhythmicArea(RhythmicArea::new(*params)),
            Some(BossBehaviorConfig::StationaryBurst(params)) => {
                Self::StationaryBurst(StationaryBurst::new(*params))
            }
            Some(BossBehaviorConfig::TacticalChase(params)) => Self::TacticalChase(TacticalChase::new(*params)),
            None if can_shoot => Self::Idle,
            None => Self::Chase,
        }
    }

    /// Advance internal timers. Side-effect requests are appended to `actions`.
    pub fn update(&mut self, delta: Fixed, ctx: &BehaviorContext, actions: &mut Vec<BehaviorAction>) {
        match self {
            Self::Chase | Self::Idle => {}
            Self::Boss(toggle) => toggle.update(delta),
            Self::RhythmicArea(rhythmic) => rhythmic.update(delta, ctx, actions),
            Self::StationaryBurst(burst) => burst.update(delta, actions),
            Self::TacticalChase(tactical) => tactical.update(delta),
        }
    }

    /// Direction and speed scalar for this tick.
    #[must_use]
    pub fn movement_vector(&self, ctx: &BehaviorContext) -> MovementVector {
        match self {
            Self::Chase => ctx
                .direction_to_player()
                .map_or(MovementVector::STILL, |dir| MovementVector::new(dir, Fixed::ONE)),
            Self::Idle => {
                let (Some(dir), Some(distance)) = (ctx.direction_to_player(), ctx.distance_to_player()) else {
                    return MovementVector::STILL;
                };
                match ctx.attack_range {
                    Some(range) if distance >= range => MovementVector::new(dir, Fixed::ONE),
                    _ => MovementVector::STILL,
                }
            }
            Self::Boss(toggle) => toggle.movement(ctx),
            Self::RhythmicArea(rhythmic) => rhythmic.movement(ctx),
            Self::StationaryBurst(burst) => burst.movement(ctx),
            Self::TacticalChase(tactical) => tactical.movement(ctx),
        }
    }

    /// Short name of the current behavior and state, for logs.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Chase => "chase",
            Self::Idle => "idle",
            Self::Boss(toggle) => match toggle.phase() {
                TogglePhase::Chase => "boss/chase",
                TogglePhase::Pause => "boss/pause",
            },
            Self::RhythmicArea(rhythmic) => match rhythmic.state() {
                RhythmicState::Orbiting => "rhythmic/orbiting",
                RhythmicState::Dashing => "rhythmic/dashing",
            },
            Self::StationaryBurst(burst) => match burst.state() {
                BurstState::Waiting => "burst/waiting",
                BurstState::Telegraphing => "burst/telegraphing",
                BurstState::Firing => "burst/firing",
            },
            Self::TacticalChase(tactical) => match tactical.state() {
                TacticalState::Chasing => "tactical/chasing",
                TacticalState::Repositioning => "tactical/repositioning",
            },
        }
    }
}
