/// Plan tiers and monthly limits

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Analyses per month allowed on the free tier
pub const FREE_TIER_MONTHLY_LIMIT: u32 = 5;

/// Plan tier as stored in `users.plan`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlanTier {
    Free,
    /// Any paid plan, by name (e.g. `pro`)
    Paid(String),
}

impl PlanTier {
    /// Parses the stored plan string
    ///
    /// `"free"` (any case) and blank values are the free tier; anything else
    /// is a paid tier named by its trimmed, lowercased value.
    pub fn parse(plan: &str) -> Self {
        let plan = plan.trim().to_ascii_lowercase();
        if plan.is_empty() || plan == "free" {
            PlanTier::Free
        } else {
            PlanTier::Paid(plan)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Paid(name) => name,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monthly ceiling for a tier
///
/// Serialises as a number, or `null` when unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Option<u32>", from = "Option<u32>")]
pub enum Limit {
    Capped(u32),
    Unlimited,
}

impl Limit {
    pub fn cap(&self) -> Option<u32> {
        match self {
            Limit::Capped(cap) => Some(*cap),
            Limit::Unlimited => None,
        }
    }

    /// Analyses left after `used`, `None` when unlimited
    pub fn remaining(&self, used: u32) -> Option<u32> {
        self.cap().map(|cap| cap.saturating_sub(used))
    }
}

impl From<Limit> for Option<u32> {
    fn from(limit: Limit) -> Self {
        limit.cap()
    }
}

impl From<Option<u32>> for Limit {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Limit::Unlimited, Limit::Capped)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Capped(cap) => write!(f, "{}", cap),
            Limit::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// Maps plan tiers to their monthly limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Cap for the free tier
    pub free_limit: u32,

    /// Caps for named paid tiers; paid tiers not listed are unlimited
    pub tier_limits: HashMap<String, u32>,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            free_limit: FREE_TIER_MONTHLY_LIMIT,
            tier_limits: HashMap::new(),
        }
    }
}

impl QuotaPolicy {
    pub fn new(free_limit: u32) -> Self {
        Self {
            free_limit,
            ..Self::default()
        }
    }

    /// Adds a cap for a named paid tier
    pub fn with_tier_limit(mut self, tier: impl Into<String>, cap: u32) -> Self {
        self.tier_limits.insert(tier.into().trim().to_ascii_lowercase(), cap);
        self
    }

    pub fn limit_for(&self, tier: &PlanTier) -> Limit {
        match tier {
            PlanTier::Free => Limit::Capped(self.free_limit),
            PlanTier::Paid(name) => self
                .tier_limits
                .get(name)
                .copied()
                .map_or(Limit::Unlimited, Limit::Capped),
        }
    }
}
