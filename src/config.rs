use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::{collections::HashSet, net::SocketAddr, time::Duration};

use crate::domain::{default_room_seeds, RoiModel, RoomSeed, DEFAULT_HISTORY_LEN};
use crate::simulation::{ControlPolicy, RevealSchedule};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub roi: RoiConfig,
    #[serde(default)]
    pub leads: LeadsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub enable_cors: bool,
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_cors_origin() -> String {
    "http://localhost:8080".to_string()
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_millis: u64,
    pub history_len: usize,
    /// Fixed seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
    pub policy: ControlPolicy,
    pub rooms: Vec<RoomSeed>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_millis: 3000,
            history_len: DEFAULT_HISTORY_LEN,
            seed: None,
            policy: ControlPolicy::default(),
            rooms: default_room_seeds(),
        }
    }
}

impl SimulationConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoiConfig {
    pub min_bill: u32,
    pub max_bill: u32,
    pub bill_step: u32,
    pub reveal_steps: u32,
    pub reveal_duration_millis: u64,
    pub hvac_share: f64,
    pub savings_rate: f64,
}

impl Default for RoiConfig {
    fn default() -> Self {
        let model = RoiModel::default();
        Self {
            min_bill: 500,
            max_bill: 10_000,
            bill_step: 100,
            reveal_steps: 60,
            reveal_duration_millis: 1000,
            hvac_share: model.hvac_share,
            savings_rate: model.savings_rate,
        }
    }
}

impl RoiConfig {
    pub fn model(&self) -> RoiModel {
        RoiModel {
            hvac_share: self.hvac_share,
            savings_rate: self.savings_rate,
        }
    }

    pub fn reveal(&self) -> RevealSchedule {
        RevealSchedule::new(
            self.reveal_steps,
            Duration::from_millis(self.reveal_duration_millis),
        )
    }

    /// Whether `bill` is a value the bill slider can produce.
    pub fn accepts_bill(&self, bill: u32) -> bool {
        bill >= self.min_bill
            && bill <= self.max_bill
            && (self.bill_step == 0 || (bill - self.min_bill) % self.bill_step == 0)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeadsConfig {
    /// Base URL of the hosted REST database; empty disables persistence
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub timeout_secs: u64,
}

impl Default for LeadsConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            table: "leads".to_string(),
            timeout_secs: 5,
        }
    }
}

impl LeadsConfig {
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("HVAC__").split("__"));
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if sim.tick_millis == 0 {
            anyhow::bail!("simulation.tick_millis must be greater than zero");
        }
        if sim.rooms.is_empty() {
            anyhow::bail!("simulation.rooms must contain at least one room");
        }
        let mut seen = HashSet::new();
        for room in &sim.rooms {
            if !seen.insert(room.id.as_str()) {
                anyhow::bail!("duplicate room id '{}'", room.id);
            }
        }
        let p = &sim.policy;
        let numeric = [
            ("temp_jitter_c", p.temp_jitter_c),
            ("humidity_jitter", p.humidity_jitter),
            ("co2_jitter_ppm", p.co2_jitter_ppm),
            ("occupancy_flip_probability", p.occupancy_flip_probability),
            ("approach_rate", p.approach_rate),
            ("co2_min_ppm", p.co2_min_ppm),
            ("co2_max_ppm", p.co2_max_ppm),
            ("air_renewal_threshold_ppm", p.air_renewal_threshold_ppm),
            ("eco_power_factor", p.eco_power_factor),
            ("renewal_power_factor", p.renewal_power_factor),
            ("power_noise_w", p.power_noise_w),
        ];
        if let Some((name, _)) = numeric.iter().find(|(_, v)| !v.is_finite()) {
            anyhow::bail!("simulation.policy.{name} must be a finite number");
        }
        if p.humidity_min > p.humidity_max || p.co2_min_ppm > p.co2_max_ppm {
            anyhow::bail!("simulation.policy clamp bounds are inverted");
        }
        if !(0.0..=1.0).contains(&p.occupancy_flip_probability) {
            anyhow::bail!("simulation.policy.occupancy_flip_probability must be within [0, 1]");
        }
        if self.roi.min_bill > self.roi.max_bill {
            anyhow::bail!("roi.min_bill must not exceed roi.max_bill");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                request_timeout_secs: 30,
                enable_cors: false,
                cors_origin: default_cors_origin(),
            },
            simulation: SimulationConfig::default(),
            roi: RoiConfig::default(),
            leads: LeadsConfig::default(),
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_zero_tick_rejected() {
        let mut cfg = base();
        cfg.simulation.tick_millis = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_duplicate_room_ids_rejected() {
        let mut cfg = base();
        let first = cfg.simulation.rooms[0].clone();
        cfg.simulation.rooms.push(first);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate room id"));
    }

    #[test]
    fn test_empty_rooms_rejected() {
        let mut cfg = base();
        cfg.simulation.rooms.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_inverted_clamps_rejected() {
        let mut cfg = base();
        cfg.simulation.policy.humidity_min = 80;
        assert!(cfg.validate().unwrap_err().to_string().contains("inverted"));

        let mut cfg = base();
        cfg.simulation.policy.co2_min_ppm = 1200.0;
        assert!(cfg.validate().unwrap_err().to_string().contains("inverted"));
    }

    #[test]
    fn test_flip_probability_out_of_range_rejected() {
        let mut cfg = base();
        cfg.simulation.policy.occupancy_flip_probability = 1.5;
        assert!(cfg.validate().is_err());

        cfg.simulation.policy.occupancy_flip_probability = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_non_finite_policy_rejected() {
        let mut cfg = base();
        cfg.simulation.policy.co2_min_ppm = f64::NAN;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("co2_min_ppm"));

        let mut cfg = base();
        cfg.simulation.policy.power_noise_w = f64::INFINITY;
        assert!(cfg.validate().unwrap_err().to_string().contains("power_noise_w"));
    }

    #[test]
    fn test_nan_from_toml_rejected() {
        let cfg: Config = Figment::new()
            .merge(Toml::string(
                r#"
                [server]
                host = "127.0.0.1"
                port = 8080

                [simulation.policy]
                co2_min_ppm = nan
                "#,
            ))
            .extract()
            .unwrap();
        assert!(cfg.simulation.policy.co2_min_ppm.is_nan());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_inverted_bill_range_rejected() {
        let mut cfg = base();
        cfg.roi.min_bill = 20_000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bill_slider_domain() {
        let roi = RoiConfig::default();
        assert!(roi.accepts_bill(500));
        assert!(roi.accepts_bill(1500));
        assert!(roi.accepts_bill(10_000));
        assert!(!roi.accepts_bill(400));
        assert!(!roi.accepts_bill(1550));
        assert!(!roi.accepts_bill(10_100));
    }

    #[test]
    fn test_leads_unconfigured_by_default() {
        assert!(!LeadsConfig::default().is_configured());
    }

    #[test]
    fn test_socket_addr() {
        assert_eq!(
            base().server.socket_addr().unwrap().to_string(),
            "127.0.0.1:8080"
        );
    }

    #[test]
    fn test_parse_toml() {
        let cfg: Config = Figment::new()
            .merge(Toml::string(
                r#"
                [server]
                host = "0.0.0.0"
                port = 9000

                [simulation]
                tick_millis = 500
                seed = 7

                [[simulation.rooms]]
                id = "lab"
                name = "Lab"
                temperature = 21.0
                humidity = 40
                co2 = 500.0
                occupied = true
                power_consumption = 900.0
                base_power_w = 1500.0

                [leads]
                base_url = "https://db.example"
                api_key = "k"
                "#,
            ))
            .extract()
            .unwrap();
        assert_eq!(cfg.server.request_timeout_secs, 30);
        assert_eq!(cfg.simulation.tick_millis, 500);
        assert_eq!(cfg.simulation.seed, Some(7));
        assert_eq!(cfg.simulation.history_len, 8);
        assert_eq!(cfg.simulation.rooms.len(), 1);
        assert_eq!(cfg.simulation.rooms[0].profile().base_power_w, 1500.0);
        assert_eq!(cfg.simulation.policy, ControlPolicy::default());
        assert_eq!(cfg.leads.table, "leads");
        assert!(cfg.leads.is_configured());
        assert!(cfg.validate().is_ok());
    }
}
