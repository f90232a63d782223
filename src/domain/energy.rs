use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of samples kept for the comparison chart
pub const DEFAULT_HISTORY_LEN: usize = 8;

/// One point of the conventional vs. optimized consumption chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySample {
    /// Wall-clock label, `HH:MM`
    pub time: String,
    /// Conventional HVAC draw (W)
    pub conventional: f64,
    /// Optimized HVAC draw (W)
    pub arabian: f64,
}

impl EnergySample {
    pub fn new(time: impl Into<String>, conventional: f64, arabian: f64) -> Self {
        Self {
            time: time.into(),
            conventional,
            arabian,
        }
    }
}

/// Fixed-capacity FIFO of energy samples, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyHistory {
    samples: VecDeque<EnergySample>,
    capacity: usize,
}

impl EnergyHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Hourly morning series the dashboard opens with.
    pub fn seeded(capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        let seed = [
            ("08:00", 4500.0, 3200.0),
            ("09:00", 5200.0, 3400.0),
            ("10:00", 5800.0, 3600.0),
            ("11:00", 6200.0, 3800.0),
            ("12:00", 5500.0, 3500.0),
            ("13:00", 5000.0, 3200.0),
            ("14:00", 6000.0, 3700.0),
            ("15:00", 6500.0, 4000.0),
        ];
        for (time, conventional, arabian) in seed {
            history.push(EnergySample::new(time, conventional, arabian));
        }
        history
    }

    /// Appends a sample and evicts from the front until within capacity.
    pub fn push(&mut self, sample: EnergySample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&EnergySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnergySample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<EnergySample> {
        self.samples.iter().cloned().collect()
    }
}

impl Default for EnergyHistory {
    fn default() -> Self {
        Self::seeded(DEFAULT_HISTORY_LEN)
    }
}
