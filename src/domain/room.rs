use serde::{Deserialize, Serialize};

/// CO₂ level above which air renewal is switched on (ppm)
pub const AIR_RENEWAL_THRESHOLD_PPM: f64 = 800.0;

/// Per-room control targets and electrical base load.
///
/// The control policy reads everything room-specific from here, so a room's
/// behaviour is fully described by its profile rather than by its id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomProfile {
    /// Setpoint while the room is occupied (°C)
    pub occupied_target_c: f64,
    /// Setpoint while the room is in eco mode (°C)
    pub eco_target_c: f64,
    /// Nominal HVAC draw before eco/renewal adjustments (W)
    pub base_power_w: f64,
}

impl RoomProfile {
    pub const fn new(occupied_target_c: f64, eco_target_c: f64, base_power_w: f64) -> Self {
        Self {
            occupied_target_c,
            eco_target_c,
            base_power_w,
        }
    }

    /// Setpoint the room drifts towards for the given mode
    pub fn target_temp_c(&self, eco_mode: bool) -> f64 {
        if eco_mode {
            self.eco_target_c
        } else {
            self.occupied_target_c
        }
    }
}

impl Default for RoomProfile {
    fn default() -> Self {
        Self::new(23.0, 26.0, 800.0)
    }
}

/// One monitored zone of the digital twin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Indoor temperature (°C), one decimal
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: i32,
    /// CO₂ concentration (ppm)
    pub co2: f64,
    pub occupied: bool,
    /// HVAC draw (W), derived every tick
    pub power_consumption: f64,
    pub is_eco_mode: bool,
    pub is_air_renewal: bool,
    pub profile: RoomProfile,
}

/// Initial readings of a room as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSeed {
    pub id: String,
    pub name: String,
    pub temperature: f64,
    pub humidity: i32,
    pub co2: f64,
    pub occupied: bool,
    pub power_consumption: f64,
    #[serde(default)]
    pub occupied_target_c: Option<f64>,
    #[serde(default)]
    pub eco_target_c: Option<f64>,
    #[serde(default)]
    pub base_power_w: Option<f64>,
}

impl RoomSeed {
    pub fn profile(&self) -> RoomProfile {
        let fallback = RoomProfile::default();
        RoomProfile {
            occupied_target_c: self.occupied_target_c.unwrap_or(fallback.occupied_target_c),
            eco_target_c: self.eco_target_c.unwrap_or(fallback.eco_target_c),
            base_power_w: self.base_power_w.unwrap_or(fallback.base_power_w),
        }
    }

    /// Builds the live room with its derived flags already consistent.
    pub fn into_room(self) -> Room {
        let profile = self.profile();
        Room {
            id: self.id,
            name: self.name,
            temperature: self.temperature,
            humidity: self.humidity,
            co2: self.co2,
            occupied: self.occupied,
            power_consumption: self.power_consumption,
            is_eco_mode: !self.occupied,
            is_air_renewal: self.co2 > AIR_RENEWAL_THRESHOLD_PPM,
            profile,
        }
    }
}

/// The three demo zones: a meeting room, an open office and a data center.
pub fn default_room_seeds() -> Vec<RoomSeed> {
    vec![
        RoomSeed {
            id: "meeting".to_string(),
            name: "Meeting Room".to_string(),
            temperature: 23.0,
            humidity: 55,
            co2: 650.0,
            occupied: true,
            power_consumption: 850.0,
            occupied_target_c: Some(23.0),
            eco_target_c: Some(26.0),
            base_power_w: Some(800.0),
        },
        RoomSeed {
            id: "office".to_string(),
            name: "Open Office".to_string(),
            temperature: 24.0,
            humidity: 52,
            co2: 720.0,
            occupied: true,
            power_consumption: 1200.0,
            occupied_target_c: Some(23.0),
            eco_target_c: Some(26.0),
            base_power_w: Some(1100.0),
        },
        RoomSeed {
            id: "datacenter".to_string(),
            name: "Data Center".to_string(),
            temperature: 18.0,
            humidity: 45,
            co2: 400.0,
            occupied: false,
            power_consumption: 2100.0,
            occupied_target_c: Some(18.0),
            eco_target_c: Some(26.0),
            base_power_w: Some(2000.0),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_temp_by_mode() {
        let data_center = RoomProfile::new(18.0, 26.0, 2000.0);
        assert_eq!(data_center.target_temp_c(false), 18.0);
        assert_eq!(data_center.target_temp_c(true), 26.0);
    }

    #[test]
    fn test_seed_without_profile_uses_defaults() {
        let seed = RoomSeed {
            id: "lab".to_string(),
            name: "Lab".to_string(),
            temperature: 21.0,
            humidity: 40,
            co2: 500.0,
            occupied: true,
            power_consumption: 0.0,
            occupied_target_c: None,
            eco_target_c: None,
            base_power_w: Some(1500.0),
        };
        let profile = seed.profile();
        assert_eq!(profile.occupied_target_c, 23.0);
        assert_eq!(profile.eco_target_c, 26.0);
        assert_eq!(profile.base_power_w, 1500.0);
    }

    #[test]
    fn test_default_seeds_have_unique_ids() {
        let seeds = default_room_seeds();
        let mut ids: Vec<_> = seeds.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), seeds.len());
    }

    #[test]
    fn test_room_serializes_camel_case() {
        let room = default_room_seeds().remove(0).into_room();
        let json = serde_json::to_value(&room).unwrap();
        assert!(json.get("powerConsumption").is_some());
        assert!(json.get("isEcoMode").is_some());
        assert!(json.get("isAirRenewal").is_some());
    }

    #[test]
    fn test_seed_rooms_have_consistent_flags() {
        for room in default_room_seeds().into_iter().map(RoomSeed::into_room) {
            assert_eq!(room.is_eco_mode, !room.occupied);
            assert_eq!(room.is_air_renewal, room.co2 > AIR_RENEWAL_THRESHOLD_PPM);
        }
    }
}
