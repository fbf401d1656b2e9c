//! In-memory saved-plan store backed by DashMap.
//!
//! Plans are keyed by owner and a user-chosen name. Snapshots are stored
//! and returned as given; nothing here re-validates a calculation.
//!
//! Lock order is always `owners` then `plans`. Holding an owner's entry
//! serializes every save and delete for that owner.

use campaign_core::{CalculationResult, CampaignParameters, PlannerError, PlannerResult, SavedPlan};
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Thread-safe store for named plan snapshots.
pub struct PlanStore {
    plans: DashMap<Uuid, SavedPlan>,
    /// owner -> (name -> plan id)
    owners: DashMap<String, HashMap<String, Uuid>>,
    max_plans_per_owner: usize,
}

fn required(field: &'static str, value: &str) -> PlannerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlannerError::invalid(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

impl PlanStore {
    pub fn new(max_plans_per_owner: usize) -> Self {
        info!(max_plans_per_owner, "Plan store initialized (in-memory)");
        Self {
            plans: DashMap::new(),
            owners: DashMap::new(),
            max_plans_per_owner,
        }
    }

    /// Save a snapshot under `(owner, name)`. Saving again under the same
    /// name replaces the snapshot but keeps its id and creation time.
    pub fn save(
        &self,
        owner: &str,
        name: &str,
        parameters: CampaignParameters,
        result: CalculationResult,
    ) -> PlannerResult<SavedPlan> {
        let owner = required("owner", owner)?;
        let name = required("name", name)?;
        let now = Utc::now();

        let mut names = self.owners.entry(owner.clone()).or_default();

        if let Some(&id) = names.get(&name) {
            let mut plan = self
                .plans
                .get_mut(&id)
                .ok_or(PlannerError::PlanNotFound(id))?;
            plan.parameters = parameters;
            plan.result = result;
            plan.updated_at = now;
            info!(plan_id = %id, owner = %owner, name = %name, "Saved plan replaced");
            return Ok(plan.clone());
        }

        if names.len() >= self.max_plans_per_owner {
            return Err(PlannerError::PlanLimitReached {
                owner,
                limit: self.max_plans_per_owner,
            });
        }

        let plan = SavedPlan {
            id: Uuid::new_v4(),
            owner,
            name,
            parameters,
            result,
            created_at: now,
            updated_at: now,
        };
        self.plans.insert(plan.id, plan.clone());
        names.insert(plan.name.clone(), plan.id);
        info!(plan_id = %plan.id, owner = %plan.owner, name = %plan.name, "Plan saved");
        Ok(plan)
    }

    pub fn get(&self, id: Uuid) -> PlannerResult<SavedPlan> {
        self.plans
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(PlannerError::PlanNotFound(id))
    }

    /// An owner's plans, most recently updated first.
    pub fn list(&self, owner: &str) -> Vec<SavedPlan> {
        let owner = owner.trim();
        let mut plans: Vec<SavedPlan> = self
            .plans
            .iter()
            .filter(|r| r.value().owner == owner)
            .map(|r| r.value().clone())
            .collect();
        plans.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.name.cmp(&b.name)));
        plans
    }

    pub fn delete(&self, id: Uuid) -> PlannerResult<()> {
        // Owner and name never change for a given id.
        let (owner, name) = self
            .plans
            .get(&id)
            .map(|r| (r.owner.clone(), r.name.clone()))
            .ok_or(PlannerError::PlanNotFound(id))?;

        {
            let mut names = self
                .owners
                .get_mut(&owner)
                .ok_or(PlannerError::PlanNotFound(id))?;
            self.plans
                .remove(&id)
                .ok_or(PlannerError::PlanNotFound(id))?;
            if names.get(&name) == Some(&id) {
                names.remove(&name);
            }
        }
        self.owners.remove_if(&owner, |_, names| names.is_empty());

        info!(plan_id = %id, owner = %owner, "Plan deleted");
        Ok(())
    }

    /// Recompute a plan from its stored parameters. `compute` runs while the
    /// plan is write-locked, so the stored result always matches the stored
    /// parameters even when the plan is re-saved concurrently.
    pub fn recalculate<F>(&self, id: Uuid, compute: F) -> PlannerResult<SavedPlan>
    where
        F: FnOnce(&CampaignParameters) -> PlannerResult<CalculationResult>,
    {
        let mut plan = self
            .plans
            .get_mut(&id)
            .ok_or(PlannerError::PlanNotFound(id))?;
        let result = compute(&plan.parameters)?;
        plan.result = result;
        plan.updated_at = Utc::now();
        Ok(plan.clone())
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new(100)
    }
}
