//! Weighted query selection

use crate::catalog::{templates_for, ParamValue, QueryTemplate, Tier};
use crate::config::TrafficConfig;
use crate::error::ConfigError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// One query chosen for execution
#[derive(Debug, Clone)]
pub struct SelectedQuery {
    /// Tier the query was drawn from
    pub tier: Tier,
    /// Catalog entry
    pub template: &'static QueryTemplate,
    /// Values bound to the placeholders
    pub params: Vec<ParamValue>,
}

impl SelectedQuery {
    /// Statement text
    pub fn statement(&self) -> &'static str {
        self.template.statement
    }
}

/// Chooses a tier by weight, then a template uniformly within it
///
/// Weights are normalized once at construction. After that selection cannot
/// fail; the only side effect is consuming the random source.
#[derive(Debug, Clone)]
pub struct QuerySelector {
    tiers: Vec<TierPool>,
    distribution: WeightedIndex<f64>,
}

#[derive(Debug, Clone)]
struct TierPool {
    tier: Tier,
    probability: f64,
    templates: Vec<&'static QueryTemplate>,
}

impl QuerySelector {
    /// Build a selector from the configured tier weights
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidWeights` if any weight is negative or not
    /// finite, or if the weights do not sum to a positive value.
    pub fn new(config: &TrafficConfig) -> Result<Self, ConfigError> {
        let mut sum = 0.0;
        for tier in Tier::ALL {
            let weight = config.weight(tier);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeights(format!(
                    "weight for {tier} must be a non-negative number, got {weight}"
                )));
            }
            sum += weight;
        }

        if sum <= 0.0 {
            return Err(ConfigError::InvalidWeights(format!(
                "weights must sum to a positive value, got {sum}"
            )));
        }

        let tiers: Vec<TierPool> = Tier::ALL
            .into_iter()
            .filter(|tier| config.weight(*tier) > 0.0)
            .map(|tier| TierPool {
                tier,
                probability: config.weight(tier) / sum,
                templates: templates_for(tier),
            })
            .filter(|pool| !pool.templates.is_empty())
            .collect();

        let distribution = WeightedIndex::new(tiers.iter().map(|pool| pool.probability))
            .map_err(|e| ConfigError::InvalidWeights(e.to_string()))?;

        Ok(Self {
            tiers,
            distribution,
        })
    }

    /// Normalized selection probability of a tier
    pub fn probability(&self, tier: Tier) -> f64 {
        self.tiers
            .iter()
            .find(|pool| pool.tier == tier)
            .map(|pool| pool.probability)
            .unwrap_or(0.0)
    }

    /// Draw a tier, a template within it, and its parameters
    pub fn select<R: Rng>(&self, rng: &mut R) -> SelectedQuery {
        let pool = &self.tiers[self.distribution.sample(rng)];
        // Pools are never empty: empty ones are dropped in `new`
        let template = pool.templates[rng.gen_range(0..pool.templates.len())];

        SelectedQuery {
            tier: pool.tier,
            template,
            params: template.params.generate(rng),
        }
    }
}
