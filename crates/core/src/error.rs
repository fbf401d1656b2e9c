use thiserror::Error;
use uuid::Uuid;

pub type PlannerResult<T> = Result<T, PlannerError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("Unsupported campaign length: {days} day(s) matches no allocation policy")]
    UnsupportedCampaignLength { days: i64 },

    #[error("Campaign spans {days} days; the maximum is {max}")]
    CampaignTooLong { days: u32, max: u32 },

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("Saved plan not found: {0}")]
    PlanNotFound(Uuid),

    #[error("Owner '{owner}' already has the maximum of {limit} saved plans")]
    PlanLimitReached { owner: String, limit: usize },
}

impl PlannerError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::UnsupportedCampaignLength { .. } => "unsupported_campaign_length",
            Self::CampaignTooLong { .. } => "campaign_too_long",
            Self::Overflow(_) => "arithmetic_overflow",
            Self::PlanNotFound(_) => "plan_not_found",
            Self::PlanLimitReached { .. } => "plan_limit_reached",
        }
    }
}
