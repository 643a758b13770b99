//! Record types shared between the engine and the HTTP layer
//!
//! Stored records (`Project`, `Plan`) serialize with snake_case field names.
//! Roadmap plans serialize with camelCase names, matching the front-end
//! contract of the endpoints that return them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Paused,
    Archived,
}

/// SEO project for a single domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub domain: String,
    #[serde(default)]
    pub industry: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    /// Never set: projects have no update operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(id: u64, domain: String, industry: Option<String>) -> Self {
        Self {
            id,
            domain,
            industry,
            status: ProjectStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

/// Coarse searcher intent attached to a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Informational,
    Commercial,
    Transactional,
    Navigational,
}

impl Intent {
    /// Labels the randomized policies draw from
    pub const SAMPLED: [Intent; 3] = [
        Intent::Informational,
        Intent::Commercial,
        Intent::Transactional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Informational => "informational",
            Intent::Commercial => "commercial",
            Intent::Transactional => "transactional",
            Intent::Navigational => "navigational",
        }
    }
}

/// Named group of related keywords
///
/// Derived on every request; never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// `cluster-<n>`, 1-based position in the clusterer output
    pub id: String,
    #[serde(rename = "cluster")]
    pub name: String,
    pub intent: Intent,
    pub keywords: Vec<String>,
    pub primary_keyword: String,
}

/// Mock effort estimate attached to a stored plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    pub da_target: u32,
    pub links_needed: u32,
    pub articles_needed: u32,
    pub eta_weeks: f64,
}

/// Stored plan for one representative keyword of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: u64,
    pub project_id: u64,
    pub keyword: String,
    pub domain: String,
    pub metrics: PlanMetrics,
    pub created_at: DateTime<Utc>,
}

/// Advisory knobs accepted by keyword intake
///
/// Validated and echoed back; no computation reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeOptions {
    pub num_competitors: u32,
    pub avg_link_strength: f64,
    pub kd_bucket: u32,
    pub posts_per_week: u32,
    pub links_per_month: u32,
}

impl Default for IntakeOptions {
    fn default() -> Self {
        Self {
            num_competitors: 10,
            avg_link_strength: 0.25,
            kd_bucket: 40,
            posts_per_week: 3,
            links_per_month: 6,
        }
    }
}

/// Campaign-level numbers for a roadmap plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMetrics {
    pub total_keywords: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clusters: Option<usize>,
    pub difficulty: u32,
    pub estimated_traffic: u32,
    pub budget: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

/// One phase of a roadmap plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub phase: String,
    pub duration: String,
    pub tasks: Vec<String>,
}

/// Fabricated multi-keyword plan returned by the generation endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub target_da: u32,
    pub status: ProjectStatus,
    pub progress: u32,
    pub estimated_completion: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub metrics: CampaignMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub roadmap: Vec<RoadmapPhase>,
}

/// Summary numbers for a keyword research run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchFindings {
    pub total_opportunities: u32,
    pub avg_difficulty: u32,
    pub estimated_traffic: u32,
    pub competitor_gaps: u32,
}

/// Suggested keyword derived from a research query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub keyword: String,
    pub difficulty: u32,
    pub volume: u32,
    /// Cost per click, two decimal places
    pub cpc: f64,
    pub intent: Intent,
}

/// Result of a simulated research run; not stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRun {
    /// `research-<unix millis>`
    pub id: String,
    pub query: String,
    pub domains: Vec<String>,
    pub depth: String,
    pub status: String,
    pub findings: ResearchFindings,
    pub opportunities: Vec<Opportunity>,
    pub created_at: DateTime<Utc>,
}

/// Three-phase template attached to every generated roadmap plan
pub fn default_roadmap() -> Vec<RoadmapPhase> {
    let phase = |name: &str, duration: &str, tasks: [&str; 3]| RoadmapPhase {
        phase: name.to_string(),
        duration: duration.to_string(),
        tasks: tasks.iter().map(|t| t.to_string()).collect(),
    };

    vec![
        phase(
            "Content Strategy",
            "2 weeks",
            [
                "Keyword mapping and content gaps analysis",
                "Competitor content audit",
                "Content calendar creation",
            ],
        ),
        phase(
            "Content Creation",
            "4 weeks",
            [
                "High-priority content creation",
                "On-page SEO optimization",
                "Internal linking strategy",
            ],
        ),
        phase(
            "Link Building",
            "2 weeks",
            [
                "Domain authority building",
                "Guest posting campaigns",
                "Performance monitoring",
            ],
        ),
    ]
}
