pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{PlannerError, PlannerResult};
pub use types::{
    BudgetEstimate, CalculationResult, CampaignParameters, DailyAllocation, Period, SavedPlan,
};
