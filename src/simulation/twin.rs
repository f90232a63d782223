//! # Digital Twin Simulator
//!
//! Evolves a fixed set of rooms under a rule-based HVAC control policy and
//! keeps a rolling conventional-vs-optimized energy history.
//!
//! Every tick, independently per room:
//! - temperature, humidity and CO₂ take a small uniform random step
//! - occupancy flips with a low probability
//! - an unoccupied room enters eco mode and drifts toward its eco setpoint
//! - CO₂ above the renewal threshold turns on air renewal
//! - power draw is recomputed from the room's base load, eco and renewal factors
//!
//! Nothing here can fail: all readings are clamped, so the simulator is a
//! total function of its previous state and the random stream.

use chrono::{DateTime, Local, NaiveTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::domain::{EnergyHistory, EnergySample, Room, AIR_RENEWAL_THRESHOLD_PPM};

/// Tunable constants of the control policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPolicy {
    /// Full width of the temperature jitter (°C), centred on zero
    pub temp_jitter_c: f64,
    /// Full width of the humidity jitter (points)
    pub humidity_jitter: f64,
    /// Full width of the CO₂ jitter (ppm)
    pub co2_jitter_ppm: f64,
    pub occupancy_flip_probability: f64,
    /// Fraction of the remaining distance to target covered per tick
    pub approach_rate: f64,
    pub humidity_min: i32,
    pub humidity_max: i32,
    pub co2_min_ppm: f64,
    pub co2_max_ppm: f64,
    pub air_renewal_threshold_ppm: f64,
    pub eco_power_factor: f64,
    pub renewal_power_factor: f64,
    /// Full width of the power noise (W)
    pub power_noise_w: f64,
}

impl Default for ControlPolicy {
    fn default() -> Self {
        Self {
            temp_jitter_c: 1.0,
            humidity_jitter: 3.0,
            co2_jitter_ppm: 50.0,
            occupancy_flip_probability: 0.1,
            approach_rate: 0.1,
            humidity_min: 30,
            humidity_max: 70,
            co2_min_ppm: 350.0,
            co2_max_ppm: 1000.0,
            air_renewal_threshold_ppm: AIR_RENEWAL_THRESHOLD_PPM,
            eco_power_factor: 0.6,
            renewal_power_factor: 1.15,
            power_noise_w: 100.0,
        }
    }
}

impl ControlPolicy {
    /// Policy without any randomness. Useful for reasoning about a single step.
    pub fn deterministic() -> Self {
        Self {
            temp_jitter_c: 0.0,
            humidity_jitter: 0.0,
            co2_jitter_ppm: 0.0,
            occupancy_flip_probability: 0.0,
            power_noise_w: 0.0,
            ..Self::default()
        }
    }

    /// Base load scaled by the eco factor, then by the renewal factor.
    pub fn adjusted_power_w(&self, base_power_w: f64, eco_mode: bool, air_renewal: bool) -> f64 {
        let mut power = base_power_w;
        if eco_mode {
            power *= self.eco_power_factor;
        }
        if air_renewal {
            power *= self.renewal_power_factor;
        }
        power
    }
}

/// Uniform draw in `[-width/2, width/2)`.
fn jitter<R: Rng>(rng: &mut R, width: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * width
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Applies one tick of the control policy to a room.
pub fn step_room<R: Rng>(room: &Room, policy: &ControlPolicy, rng: &mut R) -> Room {
    let temp_jitter = jitter(rng, policy.temp_jitter_c);
    let humidity_jitter = jitter(rng, policy.humidity_jitter);
    let co2_jitter = jitter(rng, policy.co2_jitter_ppm);
    let flip = rng.gen_bool(policy.occupancy_flip_probability.clamp(0.0, 1.0));

    let co2 = (room.co2 + co2_jitter)
        .round()
        .clamp(policy.co2_min_ppm, policy.co2_max_ppm);
    let occupied = if flip { !room.occupied } else { room.occupied };
    let is_eco_mode = !occupied;

    let target = room.profile.target_temp_c(is_eco_mode);
    let temperature =
        round1(room.temperature + (target - room.temperature) * policy.approach_rate + temp_jitter);

    let humidity = ((room.humidity as f64 + humidity_jitter).round() as i32)
        .clamp(policy.humidity_min, policy.humidity_max);

    let is_air_renewal = co2 > policy.air_renewal_threshold_ppm;

    let adjusted = policy.adjusted_power_w(room.profile.base_power_w, is_eco_mode, is_air_renewal);
    let power_consumption = (adjusted + jitter(rng, policy.power_noise_w)).round().max(0.0);

    Room {
        id: room.id.clone(),
        name: room.name.clone(),
        temperature,
        humidity,
        co2,
        occupied,
        power_consumption,
        is_eco_mode,
        is_air_renewal,
        profile: room.profile,
    }
}

/// Immutable state published after every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinSnapshot {
    pub tick: u64,
    pub generated_at: DateTime<Utc>,
    pub rooms: Vec<Room>,
    pub energy_history: Vec<EnergySample>,
    pub total_power_w: f64,
}

impl TwinSnapshot {
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }
}

pub struct TelemetrySimulator {
    rooms: Vec<Room>,
    history: EnergyHistory,
    policy: ControlPolicy,
    rng: StdRng,
    tick: u64,
    last_tick_at: DateTime<Utc>,
}

impl TelemetrySimulator {
    pub fn new(config: &SimulationConfig) -> Self {
        let rooms = config
            .rooms
            .iter()
            .cloned()
            .map(|seed| seed.into_room())
            .collect();
        Self::from_parts(
            rooms,
            EnergyHistory::seeded(config.history_len),
            config.policy.clone(),
            config.seed,
        )
    }

    pub fn from_parts(
        rooms: Vec<Room>,
        history: EnergyHistory,
        policy: ControlPolicy,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rooms,
            history,
            policy,
            rng,
            tick: 0,
            last_tick_at: Utc::now(),
        }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn history(&self) -> &EnergyHistory {
        &self.history
    }

    pub fn policy(&self) -> &ControlPolicy {
        &self.policy
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Steps every room once, records an energy sample labelled with `now`,
    /// and returns the resulting snapshot.
    pub fn tick(&mut self, now: DateTime<Local>) -> TwinSnapshot {
        self.step_rooms();
        self.append_energy_sample(now.time());
        self.tick += 1;
        self.last_tick_at = now.with_timezone(&Utc);
        self.snapshot()
    }

    pub fn step_rooms(&mut self) {
        let mut next = Vec::with_capacity(self.rooms.len());
        for room in &self.rooms {
            next.push(step_room(room, &self.policy, &mut self.rng));
        }
        self.rooms = next;
    }

    /// Appends one randomly drawn conventional/optimized pair.
    /// The two series are display-only and independent of room power.
    pub fn append_energy_sample(&mut self, at: NaiveTime) {
        let conventional = self.rng.gen_range(5000.0..7000.0_f64).trunc();
        let arabian = self.rng.gen_range(3200.0..4200.0_f64).trunc();
        self.history.push(EnergySample::new(
            at.format("%H:%M").to_string(),
            conventional,
            arabian,
        ));
    }

    pub fn snapshot(&self) -> TwinSnapshot {
        TwinSnapshot {
            tick: self.tick,
            generated_at: self.last_tick_at,
            rooms: self.rooms.clone(),
            energy_history: self.history.to_vec(),
            total_power_w: self.rooms.iter().map(|r| r.power_consumption).sum(),
        }
    }
}
