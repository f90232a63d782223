pub mod energy;
pub mod roi;
pub mod room;

pub use energy::*;
pub use roi::{project, BillBreakdown, CostComparison, RoiModel};
pub use room::*;
