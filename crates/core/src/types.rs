//! Campaign budget planning domain types.
//!
//! Monetary inputs are exact decimals; every derived quantity (orders,
//! traffic, spend) is a whole number produced by rounding up.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Input ──────────────────────────────────────────────────────────────────

/// Commercial target and time window for one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CampaignParameters {
    pub start_date: NaiveDate,
    /// Inclusive; must not precede `start_date`.
    pub end_date: NaiveDate,
    /// Revenue target for the whole campaign window.
    #[schema(value_type = String, example = "150000")]
    pub target_revenue: Decimal,
    /// Target average order value.
    #[schema(value_type = String, example = "1000")]
    pub target_aov: Decimal,
    /// Conversion rate as a percentage in `(0, 100]`.
    #[schema(value_type = String, example = "2")]
    pub target_conversion_rate_pct: Decimal,
    #[schema(value_type = String, example = "5")]
    pub cost_per_click: Decimal,
}

// ─── Output ─────────────────────────────────────────────────────────────────

/// A named contiguous phase of a campaign with its share of budget and traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Period {
    /// Stable identifier, e.g. `preheat`, `launch`, `day_1`.
    pub name: String,
    /// Display label shown to marketers.
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    /// Nominal percentage of the total budget assigned by the policy.
    pub budget_share: u32,
    /// Nominal percentage of the total traffic assigned by the policy.
    pub traffic_share: u32,
    pub budget: u64,
    pub traffic: u64,
    pub daily_budget: u64,
    pub daily_traffic: u64,
}

/// One calendar day of the schedule, tagged with its owning period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DailyAllocation {
    pub date: NaiveDate,
    pub period_name: String,
    pub budget: u64,
    pub traffic: u64,
}

/// Aggregate sizing of a campaign, without a period schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BudgetEstimate {
    pub total_days: u32,
    pub required_orders: u64,
    pub required_traffic: u64,
    pub total_budget: u64,
    pub average_daily_budget: u64,
}

/// Full output of the allocation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CalculationResult {
    pub total_days: u32,
    pub required_orders: u64,
    pub required_traffic: u64,
    pub total_budget: u64,
    pub average_daily_budget: u64,
    /// Name of the allocation policy that shaped the schedule.
    pub policy: String,
    /// Chronological.
    pub periods: Vec<Period>,
    /// One row per day of every period; may extend past the nominal window.
    pub daily_breakdown: Vec<DailyAllocation>,
}

impl CalculationResult {
    pub fn estimate(&self) -> BudgetEstimate {
        BudgetEstimate {
            total_days: self.total_days,
            required_orders: self.required_orders,
            required_traffic: self.required_traffic,
            total_budget: self.total_budget,
            average_daily_budget: self.average_daily_budget,
        }
    }

    /// Sum of period budgets. Equals `total_budget` for every engine result.
    pub fn allocated_budget(&self) -> u64 {
        self.periods.iter().map(|p| p.budget).sum()
    }

    /// Sum of period traffic. Equals `required_traffic` for every engine result.
    pub fn allocated_traffic(&self) -> u64 {
        self.periods.iter().map(|p| p.traffic).sum()
    }

    pub fn scheduled_days(&self) -> u32 {
        self.periods.iter().map(|p| p.days).sum()
    }

    pub fn period(&self, name: &str) -> Option<&Period> {
        self.periods.iter().find(|p| p.name == name)
    }
}

// ─── Saved plans ────────────────────────────────────────────────────────────

/// A named snapshot of parameters and their computed plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SavedPlan {
    pub id: Uuid,
    pub owner: String,
    pub name: String,
    pub parameters: CampaignParameters,
    pub result: CalculationResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
