//! Boundary validation ahead of the allocation engine.

use crate::calendar;
use campaign_core::{CampaignParameters, PlannerError, PlannerResult};
use rust_decimal::Decimal;

/// Campaign parameters that passed [`validate`].
///
/// The only way to build one is through validation, so the engine never
/// sees a zero divisor or an inverted window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedParameters {
    params: CampaignParameters,
    total_days: u32,
}

impl ValidatedParameters {
    pub fn params(&self) -> &CampaignParameters {
        &self.params
    }

    /// Inclusive day count of the campaign window; always at least 1.
    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    pub fn into_inner(self) -> CampaignParameters {
        self.params
    }
}

fn require_positive(field: &'static str, value: Decimal) -> PlannerResult<()> {
    if value <= Decimal::ZERO {
        return Err(PlannerError::invalid(
            field,
            format!("must be greater than zero, got {value}"),
        ));
    }
    Ok(())
}

/// Reject parameters the engine cannot size a campaign from.
pub fn validate(params: CampaignParameters) -> PlannerResult<ValidatedParameters> {
    require_positive("target_revenue", params.target_revenue)?;
    require_positive("target_aov", params.target_aov)?;
    require_positive("cost_per_click", params.cost_per_click)?;

    let rate = params.target_conversion_rate_pct;
    if rate <= Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(PlannerError::invalid(
            "target_conversion_rate_pct",
            format!("must be within (0, 100], got {rate}"),
        ));
    }

    if params.end_date < params.start_date {
        return Err(PlannerError::invalid(
            "end_date",
            format!(
                "{} is before start_date {}",
                params.end_date, params.start_date
            ),
        ));
    }

    let total_days = u32::try_from(calendar::inclusive_days(params.start_date, params.end_date))
        .map_err(|_| PlannerError::invalid("end_date", "campaign window is too long"))?;

    Ok(ValidatedParameters { params, total_days })
}
