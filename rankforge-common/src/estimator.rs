//! Plan metric estimation
//!
//! The [`Estimator`] trait is the seam where a real estimation model would
//! plug in. The only implementation, [`UniformEstimator`], is a stand-in: it
//! samples every number independently and uniformly from a configured range.
//! Inputs only shape the text of suggested keywords, never the numbers.

use crate::models::{Cluster, Intent, Opportunity, PlanMetrics, ResearchFindings};
use crate::{Error, Result};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Numeric types a [`Bounds`] can hold
pub trait BoundValue: SampleUniform + PartialOrd + Copy + Debug {
    /// Whether `gen_range(min..=max)` accepts these endpoints
    fn sampleable(min: Self, max: Self) -> bool {
        min <= max
    }
}

impl BoundValue for u32 {}

impl BoundValue for f64 {
    fn sampleable(min: Self, max: Self) -> bool {
        // Infinite endpoints, or a span that overflows, make rand panic
        min <= max && min.is_finite() && max.is_finite() && (max - min).is_finite()
    }
}

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T> Bounds<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: BoundValue> Bounds<T> {
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        rng.gen_range(self.min..=self.max)
    }

    fn validate(&self, name: &str) -> Result<()> {
        // Also rejects NaN bounds
        if T::sampleable(self.min, self.max) {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Range '{}' cannot be sampled: min {:?}, max {:?}",
                name, self.min, self.max
            )))
        }
    }
}

/// Sampling ranges for every fabricated metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricRanges {
    pub da_target: Bounds<u32>,
    pub links_needed: Bounds<u32>,
    pub articles_needed: Bounds<u32>,
    /// Samples are rounded to one decimal place
    pub eta_weeks: Bounds<f64>,
    pub cluster_difficulty: Bounds<u32>,
    pub cluster_volume: Bounds<u32>,
    pub campaign_difficulty: Bounds<u32>,
    pub estimated_traffic: Bounds<u32>,
    pub budget: Bounds<u32>,
    pub research_opportunities: Bounds<u32>,
    pub research_difficulty: Bounds<u32>,
    pub research_traffic: Bounds<u32>,
    pub research_gaps: Bounds<u32>,
}

impl Default for MetricRanges {
    fn default() -> Self {
        Self {
            da_target: Bounds::new(20, 80),
            links_needed: Bounds::new(5, 25),
            articles_needed: Bounds::new(3, 20),
            eta_weeks: Bounds::new(4.0, 16.0),
            cluster_difficulty: Bounds::new(15, 70),
            cluster_volume: Bounds::new(2_000, 60_000),
            campaign_difficulty: Bounds::new(40, 70),
            estimated_traffic: Bounds::new(25_000, 175_000),
            budget: Bounds::new(2_000, 10_000),
            research_opportunities: Bounds::new(10, 59),
            research_difficulty: Bounds::new(30, 69),
            research_traffic: Bounds::new(20_000, 119_999),
            research_gaps: Bounds::new(5, 24),
        }
    }
}

impl MetricRanges {
    /// Reject ranges `gen_range` cannot sample from
    pub fn validate(&self) -> Result<()> {
        self.da_target.validate("da_target")?;
        self.links_needed.validate("links_needed")?;
        self.articles_needed.validate("articles_needed")?;
        self.eta_weeks.validate("eta_weeks")?;
        self.cluster_difficulty.validate("cluster_difficulty")?;
        self.cluster_volume.validate("cluster_volume")?;
        self.campaign_difficulty.validate("campaign_difficulty")?;
        self.estimated_traffic.validate("estimated_traffic")?;
        self.budget.validate("budget")?;
        self.research_opportunities.validate("research_opportunities")?;
        self.research_difficulty.validate("research_difficulty")?;
        self.research_traffic.validate("research_traffic")?;
        self.research_gaps.validate("research_gaps")?;
        Ok(())
    }
}

/// Difficulty and search volume for one cluster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterEstimate {
    pub difficulty: u32,
    pub volume: u32,
}

/// Campaign-level numbers for a multi-keyword plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CampaignEstimate {
    pub difficulty: u32,
    pub estimated_traffic: u32,
    pub budget: u32,
}

/// Keyword variant suggested for a research query
struct OpportunityTemplate {
    prefix: &'static str,
    suffix: &'static str,
    difficulty: Bounds<u32>,
    volume: Bounds<u32>,
    cpc: Bounds<f64>,
    intent: Intent,
}

const OPPORTUNITY_TEMPLATES: [OpportunityTemplate; 3] = [
    OpportunityTemplate {
        prefix: "",
        suffix: " review",
        difficulty: Bounds::new(20, 49),
        volume: Bounds::new(2_000, 11_999),
        cpc: Bounds::new(0.5, 5.5),
        intent: Intent::Commercial,
    },
    OpportunityTemplate {
        prefix: "best ",
        suffix: "",
        difficulty: Bounds::new(40, 79),
        volume: Bounds::new(5_000, 24_999),
        cpc: Bounds::new(1.0, 9.0),
        intent: Intent::Commercial,
    },
    OpportunityTemplate {
        prefix: "",
        suffix: " guide",
        difficulty: Bounds::new(15, 39),
        volume: Bounds::new(1_500, 9_499),
        cpc: Bounds::new(0.3, 3.3),
        intent: Intent::Informational,
    },
];

/// Findings plus suggested keywords for one research query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchEstimate {
    pub findings: ResearchFindings,
    pub opportunities: Vec<Opportunity>,
}

/// Produces effort estimates for keywords, clusters and campaigns
pub trait Estimator: Send + Sync {
    /// Metrics for a single-keyword plan
    ///
    /// A caller-supplied `target_da` is returned verbatim as `da_target`.
    fn estimate_plan(&self, keyword: &str, domain: &str, target_da: Option<u32>) -> PlanMetrics;

    fn estimate_cluster(&self, cluster: &Cluster) -> ClusterEstimate;

    fn estimate_campaign(&self, keywords: &[String]) -> CampaignEstimate;

    /// Opportunity summary and keyword suggestions for a research query
    fn estimate_research(&self, query: &str) -> ResearchEstimate;
}

/// Uniform-random stub estimator
#[derive(Debug, Clone, Default)]
pub struct UniformEstimator {
    ranges: MetricRanges,
}

impl UniformEstimator {
    pub fn new(ranges: MetricRanges) -> Result<Self> {
        ranges.validate()?;
        Ok(Self { ranges })
    }

    pub fn ranges(&self) -> &MetricRanges {
        &self.ranges
    }

    pub fn plan_with_rng<R: Rng + ?Sized>(&self, rng: &mut R, target_da: Option<u32>) -> PlanMetrics {
        let r = &self.ranges;
        let da_target = match target_da {
            Some(value) => value,
            None => r.da_target.sample(rng),
        };
        let eta = (r.eta_weeks.sample(rng) * 10.0).round() / 10.0;

        PlanMetrics {
            da_target,
            links_needed: r.links_needed.sample(rng),
            articles_needed: r.articles_needed.sample(rng),
            eta_weeks: eta.clamp(r.eta_weeks.min, r.eta_weeks.max),
        }
    }

    pub fn cluster_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> ClusterEstimate {
        ClusterEstimate {
            difficulty: self.ranges.cluster_difficulty.sample(rng),
            volume: self.ranges.cluster_volume.sample(rng),
        }
    }

    pub fn campaign_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> CampaignEstimate {
        CampaignEstimate {
            difficulty: self.ranges.campaign_difficulty.sample(rng),
            estimated_traffic: self.ranges.estimated_traffic.sample(rng),
            budget: self.ranges.budget.sample(rng),
        }
    }

    pub fn research_with_rng<R: Rng + ?Sized>(&self, rng: &mut R, query: &str) -> ResearchEstimate {
        let r = &self.ranges;
        let findings = ResearchFindings {
            total_opportunities: r.research_opportunities.sample(rng),
            avg_difficulty: r.research_difficulty.sample(rng),
            estimated_traffic: r.research_traffic.sample(rng),
            competitor_gaps: r.research_gaps.sample(rng),
        };
        let opportunities = OPPORTUNITY_TEMPLATES
            .iter()
            .map(|t| Opportunity {
                keyword: format!("{}{}{}", t.prefix, query, t.suffix),
                difficulty: t.difficulty.sample(rng),
                volume: t.volume.sample(rng),
                cpc: (t.cpc.sample(rng) * 100.0).round() / 100.0,
                intent: t.intent,
            })
            .collect();

        ResearchEstimate {
            findings,
            opportunities,
        }
    }
}

impl Estimator for UniformEstimator {
    fn estimate_plan(&self, _keyword: &str, _domain: &str, target_da: Option<u32>) -> PlanMetrics {
        self.plan_with_rng(&mut rand::thread_rng(), target_da)
    }

    fn estimate_cluster(&self, _cluster: &Cluster) -> ClusterEstimate {
        self.cluster_with_rng(&mut rand::thread_rng())
    }

    fn estimate_campaign(&self, _keywords: &[String]) -> CampaignEstimate {
        self.campaign_with_rng(&mut rand::thread_rng())
    }

    fn estimate_research(&self, query: &str) -> ResearchEstimate {
        self.research_with_rng(&mut rand::thread_rng(), query)
    }
}
