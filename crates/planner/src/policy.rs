//! Allocation-policy table.
//!
//! Each policy covers a range of campaign lengths and lists its phases in
//! chronological order. Shares are whole percentages; within a policy they
//! sum to 100. The engine gives the last phase whatever rounding leaves of
//! the totals, so its share is nominal.

use serde::Serialize;

/// How many days a phase lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LengthRule {
    Fixed { days: u32 },
    /// `ceil(window_days * percent / 100)`.
    ProportionCeil { percent: u32 },
    /// The window days left over by the other in-window phases.
    WindowRemainder,
}

/// Where a phase sits relative to the nominal `[start_date, end_date]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    BeforeWindow,
    InWindow,
    AfterWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseRule {
    pub name: &'static str,
    pub label: &'static str,
    pub length: LengthRule,
    pub placement: Placement,
    pub budget_share: u32,
    pub traffic_share: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationPolicy {
    pub name: &'static str,
    pub min_days: u32,
    /// `None` means unbounded.
    pub max_days: Option<u32>,
    pub phases: &'static [PhaseRule],
}

const fn phase(
    name: &'static str,
    label: &'static str,
    length: LengthRule,
    placement: Placement,
    share: u32,
) -> PhaseRule {
    PhaseRule {
        name,
        label,
        length,
        placement,
        budget_share: share,
        traffic_share: share,
    }
}

use LengthRule::{Fixed, ProportionCeil, WindowRemainder};
use Placement::{AfterWindow, BeforeWindow, InWindow};

pub const THREE_DAY: AllocationPolicy = AllocationPolicy {
    name: "three_day",
    min_days: 3,
    max_days: Some(3),
    phases: &[
        phase("day_1", "第一天", Fixed { days: 1 }, InWindow, 50),
        phase("day_2", "第二天", Fixed { days: 1 }, InWindow, 25),
        phase("day_3", "第三天", Fixed { days: 1 }, InWindow, 25),
    ],
};

pub const SHORT_BURST: AllocationPolicy = AllocationPolicy {
    name: "short_burst",
    min_days: 4,
    max_days: Some(9),
    phases: &[
        phase("launch", "啟動期", ProportionCeil { percent: 40 }, InWindow, 45),
        phase("main", "主推期", WindowRemainder, InWindow, 30),
        phase("final", "收尾期", ProportionCeil { percent: 25 }, InWindow, 25),
    ],
};

pub const FULL_CYCLE: AllocationPolicy = AllocationPolicy {
    name: "full_cycle",
    min_days: 10,
    max_days: None,
    phases: &[
        phase("preheat", "預熱期", Fixed { days: 4 }, BeforeWindow, 4),
        phase("launch", "啟動期", Fixed { days: 3 }, InWindow, 32),
        phase("main", "主推期", WindowRemainder, InWindow, 38),
        phase("final", "收尾期", Fixed { days: 3 }, InWindow, 24),
        phase("repurchase", "回購期", Fixed { days: 7 }, AfterWindow, 2),
    ],
};

/// Every policy, in ascending order of campaign length.
pub const POLICIES: &[AllocationPolicy] = &[THREE_DAY, SHORT_BURST, FULL_CYCLE];

/// The policy covering a campaign of `window_days`, if any.
pub fn select(window_days: u32) -> Option<&'static AllocationPolicy> {
    POLICIES.iter().find(|p| p.covers(window_days))
}

impl AllocationPolicy {
    pub fn covers(&self, window_days: u32) -> bool {
        window_days >= self.min_days && self.max_days.map_or(true, |max| window_days <= max)
    }

    /// Duration of each phase, in phase order, for a window of `window_days`.
    pub fn durations(&self, window_days: u32) -> Vec<u32> {
        let sized = |rule: &PhaseRule| match rule.length {
            Fixed { days } => days,
            ProportionCeil { percent } => (window_days * percent).div_ceil(100),
            WindowRemainder => 0,
        };

        let claimed: u32 = self
            .phases
            .iter()
            .filter(|rule| rule.placement == InWindow)
            .map(sized)
            .sum();
        let leftover = window_days.saturating_sub(claimed);

        self.phases
            .iter()
            .map(|rule| match rule.length {
                WindowRemainder => leftover,
                _ => sized(rule),
            })
            .collect()
    }

    /// Days scheduled ahead of `start_date`, given resolved `durations`.
    pub fn lead_in_days(&self, durations: &[u32]) -> u32 {
        self.phases
            .iter()
            .zip(durations)
            .filter(|(rule, _)| rule.placement == BeforeWindow)
            .map(|(_, days)| *days)
            .sum()
    }
}
