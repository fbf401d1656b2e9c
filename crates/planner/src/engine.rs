//! Budget allocation engine.
//!
//! Sizes a campaign from its commercial target (orders → traffic → spend),
//! picks the allocation policy for the campaign length, and splits the
//! totals into chronological periods and a day-by-day schedule.
//!
//! Every derived count is rounded up, so a plan never under-provisions.
//! Period budgets and traffic always sum exactly to the campaign totals:
//! earlier periods take the floor of their share and the last period takes
//! whatever is left.

use crate::calendar;
use crate::policy::{self, AllocationPolicy};
use crate::validate::{validate, ValidatedParameters};
use campaign_core::{
    BudgetEstimate, CalculationResult, CampaignParameters, DailyAllocation, Period, PlannerError,
    PlannerResult,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

/// Validate then compute. The usual entry point for callers holding raw input.
pub fn plan(params: CampaignParameters) -> PlannerResult<CalculationResult> {
    compute(&validate(params)?)
}

/// Aggregate sizing only (the single-period calculator). Accepts any
/// campaign length, including ones no allocation policy covers.
pub fn estimate(params: CampaignParameters) -> PlannerResult<BudgetEstimate> {
    sizing(&validate(params)?)
}

/// Turn validated parameters into a full allocation schedule.
pub fn compute(params: &ValidatedParameters) -> PlannerResult<CalculationResult> {
    let totals = sizing(params)?;

    let policy = policy::select(totals.total_days).ok_or(
        PlannerError::UnsupportedCampaignLength {
            days: i64::from(totals.total_days),
        },
    )?;

    let periods = allocate(policy, params, &totals)?;
    let daily_breakdown = expand_daily(&periods);

    debug!(
        policy = policy.name,
        total_days = totals.total_days,
        total_budget = totals.total_budget,
        required_traffic = totals.required_traffic,
        periods = periods.len(),
        "Campaign budget allocated"
    );

    Ok(CalculationResult {
        total_days: totals.total_days,
        required_orders: totals.required_orders,
        required_traffic: totals.required_traffic,
        total_budget: totals.total_budget,
        average_daily_budget: totals.average_daily_budget,
        policy: policy.name.to_string(),
        periods,
        daily_breakdown,
    })
}

// ---------------------------------------------------------------------------
// Aggregate sizing
// ---------------------------------------------------------------------------

fn ceil_whole(value: Decimal, what: &'static str) -> PlannerResult<u64> {
    value.ceil().to_u64().ok_or(PlannerError::Overflow(what))
}

/// Orders, traffic and spend needed to hit the revenue target, each rounded up.
pub fn sizing(params: &ValidatedParameters) -> PlannerResult<BudgetEstimate> {
    let p = params.params();
    let total_days = params.total_days();

    let orders = p
        .target_revenue
        .checked_div(p.target_aov)
        .ok_or(PlannerError::Overflow("required_orders"))?;
    let required_orders = ceil_whole(orders, "required_orders")?;

    // orders / (rate / 100), kept as a single division so exact inputs stay exact.
    let traffic = Decimal::from(required_orders)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(p.target_conversion_rate_pct))
        .ok_or(PlannerError::Overflow("required_traffic"))?;
    let required_traffic = ceil_whole(traffic, "required_traffic")?;

    let spend = Decimal::from(required_traffic)
        .checked_mul(p.cost_per_click)
        .ok_or(PlannerError::Overflow("total_budget"))?;
    let total_budget = ceil_whole(spend, "total_budget")?;

    Ok(BudgetEstimate {
        total_days,
        required_orders,
        required_traffic,
        total_budget,
        average_daily_budget: total_budget.div_ceil(u64::from(total_days)),
    })
}

// ---------------------------------------------------------------------------
// Period allocation
// ---------------------------------------------------------------------------

/// `floor(total * percent / 100)`. Never exceeds `total` for `percent <= 100`.
fn share_of(total: u64, percent: u32) -> u64 {
    let portion = u128::from(total) * u128::from(percent) / 100;
    u64::try_from(portion).unwrap_or(total)
}

/// Split `total` by `shares`: every entry but the last takes its floored
/// share, the last takes the remainder.
fn partition(total: u64, shares: &[u32], what: &'static str) -> PlannerResult<Vec<u64>> {
    let Some((_, leading)) = shares.split_last() else {
        return Ok(Vec::new());
    };

    let mut parts: Vec<u64> = leading.iter().map(|share| share_of(total, *share)).collect();
    let assigned: u64 = parts.iter().sum();
    let remainder = total
        .checked_sub(assigned)
        .ok_or(PlannerError::Overflow(what))?;
    parts.push(remainder);
    Ok(parts)
}

fn allocate(
    policy: &AllocationPolicy,
    params: &ValidatedParameters,
    totals: &BudgetEstimate,
) -> PlannerResult<Vec<Period>> {
    let durations = policy.durations(totals.total_days);

    let budget_shares: Vec<u32> = policy.phases.iter().map(|r| r.budget_share).collect();
    let traffic_shares: Vec<u32> = policy.phases.iter().map(|r| r.traffic_share).collect();
    let budgets = partition(totals.total_budget, &budget_shares, "period budget")?;
    let traffic = partition(totals.required_traffic, &traffic_shares, "period traffic")?;

    let lead_in = i64::from(policy.lead_in_days(&durations));
    let mut cursor = calendar::offset(params.params().start_date, -lead_in)
        .ok_or(PlannerError::Overflow("schedule start"))?;

    let mut periods = Vec::with_capacity(policy.phases.len());
    for (i, rule) in policy.phases.iter().enumerate() {
        let days = durations[i];
        debug_assert!(days > 0, "phase {} resolved to zero days", rule.name);
        let divisor = u64::from(days.max(1));

        let end_date = calendar::offset(cursor, i64::from(days) - 1)
            .ok_or(PlannerError::Overflow("schedule end"))?;

        periods.push(Period {
            name: rule.name.to_string(),
            label: rule.label.to_string(),
            start_date: cursor,
            end_date,
            days,
            budget_share: rule.budget_share,
            traffic_share: rule.traffic_share,
            budget: budgets[i],
            traffic: traffic[i],
            daily_budget: budgets[i].div_ceil(divisor),
            daily_traffic: traffic[i].div_ceil(divisor),
        });

        cursor = calendar::offset(cursor, i64::from(days))
            .ok_or(PlannerError::Overflow("schedule end"))?;
    }

    Ok(periods)
}

fn expand_daily(periods: &[Period]) -> Vec<DailyAllocation> {
    periods
        .iter()
        .flat_map(|period| {
            calendar::day_range(period.start_date, period.days).map(move |date| DailyAllocation {
                date,
                period_name: period.name.clone(),
                budget: period.daily_budget,
                traffic: period.daily_traffic,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
