//! Savings projection for a monthly energy bill.
//!
//! The model assumes a fixed share of any bill is HVAC load and that
//! automated control removes a fixed fraction of that load.

use serde::{Deserialize, Serialize};

/// Share of a bill attributed to HVAC
pub const HVAC_SHARE: f64 = 0.4;
/// Fraction of HVAC cost removed by automated control
pub const SAVINGS_RATE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillBreakdown {
    pub hvac_cost: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub new_monthly_cost: f64,
}

/// Current vs. optimized monthly cost, as plotted side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostComparison {
    pub current: f64,
    pub optimized: f64,
}

impl BillBreakdown {
    pub fn comparison(&self, monthly_bill: f64) -> CostComparison {
        CostComparison {
            current: monthly_bill,
            optimized: self.new_monthly_cost.round(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiModel {
    pub hvac_share: f64,
    pub savings_rate: f64,
}

impl Default for RoiModel {
    fn default() -> Self {
        Self {
            hvac_share: HVAC_SHARE,
            savings_rate: SAVINGS_RATE,
        }
    }
}

impl RoiModel {
    /// Total over any non-negative bill; no bounds are assumed here.
    pub fn project(&self, monthly_bill: f64) -> BillBreakdown {
        let hvac_cost = monthly_bill * self.hvac_share;
        let monthly_savings = hvac_cost * self.savings_rate;
        BillBreakdown {
            hvac_cost,
            monthly_savings,
            annual_savings: monthly_savings * 12.0,
            new_monthly_cost: monthly_bill - monthly_savings,
        }
    }
}

/// Projection with the default 40% / 30% assumptions.
pub fn project(monthly_bill: f64) -> BillBreakdown {
    RoiModel::default().project(monthly_bill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_zero_bill() {
        let b = project(0.0);
        assert_eq!(b.hvac_cost, 0.0);
        assert_eq!(b.monthly_savings, 0.0);
        assert_eq!(b.annual_savings, 0.0);
        assert_eq!(b.new_monthly_cost, 0.0);
    }

    #[rstest]
    #[case(1500.0, 600.0, 180.0, 2160.0, 1320.0)]
    #[case(500.0, 200.0, 60.0, 720.0, 440.0)]
    #[case(10000.0, 4000.0, 1200.0, 14400.0, 8800.0)]
    #[case(25000.0, 10000.0, 3000.0, 36000.0, 22000.0)]
    fn test_known_bills(
        #[case] bill: f64,
        #[case] hvac: f64,
        #[case] monthly: f64,
        #[case] annual: f64,
        #[case] new_cost: f64,
    ) {
        let b = project(bill);
        assert_eq!(b.hvac_cost, hvac);
        assert_eq!(b.monthly_savings, monthly);
        assert_eq!(b.annual_savings, annual);
        assert_eq!(b.new_monthly_cost, new_cost);
    }

    #[test]
    fn test_comparison_rounds_optimized_cost() {
        let b = project(1550.0);
        let c = b.comparison(1550.0);
        assert_eq!(c.current, 1550.0);
        assert_eq!(c.optimized, 1364.0);
    }

    #[test]
    fn test_custom_model() {
        let model = RoiModel {
            hvac_share: 0.5,
            savings_rate: 0.2,
        };
        let b = model.project(1000.0);
        assert_eq!(b.hvac_cost, 500.0);
        assert_eq!(b.monthly_savings, 100.0);
        assert_eq!(b.new_monthly_cost, 900.0);
    }

    proptest! {
        #[test]
        fn prop_new_cost_is_bill_minus_savings(bill in 0.0f64..1.0e7) {
            let b = project(bill);
            prop_assert_eq!(b.new_monthly_cost, bill - b.monthly_savings);
            prop_assert!(b.annual_savings >= 0.0);
        }
    }
}
