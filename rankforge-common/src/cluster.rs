//! Keyword clustering
//!
//! Mock grouping of an ordered keyword list into named clusters. None of the
//! policies look at meaning; they only slice or bucket the input.
//!
//! | Policy        | Grouping                              | Exact partition |
//! |---------------|---------------------------------------|-----------------|
//! | `fixed_chunk` | consecutive chunks, cyclic names      | yes             |
//! | `first_token` | lower-cased first word, size >= 2     | no              |
//! | `tiered`      | 40% / 30% / 30% slices                | yes             |

use crate::models::{Cluster, Intent};
use crate::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Names handed out in rotation by the fixed-chunk policy
pub const CHUNK_NAMES: [&str; 4] = [
    "running-shoes",
    "marathon-training",
    "fitness-gear",
    "workout-plans",
];

/// Upper bound on the number of chunks before names start repeating
const MAX_CHUNKS: usize = 4;

/// How keywords are grouped
///
/// Config files, env vars and CLI flags all parse through [`FromStr`], so
/// `fixed-chunk` and `Fixed_Chunk` are accepted everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ClusterPolicy {
    FixedChunk,
    #[default]
    FirstToken,
    Tiered,
}

impl ClusterPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterPolicy::FixedChunk => "fixed_chunk",
            ClusterPolicy::FirstToken => "first_token",
            ClusterPolicy::Tiered => "tiered",
        }
    }
}

impl fmt::Display for ClusterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fixed_chunk" => Ok(ClusterPolicy::FixedChunk),
            "first_token" => Ok(ClusterPolicy::FirstToken),
            "tiered" => Ok(ClusterPolicy::Tiered),
            other => Err(Error::Config(format!(
                "Unknown cluster policy '{}' (expected fixed_chunk, first_token or tiered)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ClusterPolicy {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Applies one [`ClusterPolicy`] to keyword lists
#[derive(Debug, Clone, Copy)]
pub struct Clusterer {
    policy: ClusterPolicy,
}

impl Clusterer {
    pub fn new(policy: ClusterPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ClusterPolicy {
        self.policy
    }

    /// Cluster keywords using the thread-local RNG for intent labels
    pub fn cluster(&self, keywords: &[String]) -> Vec<Cluster> {
        self.cluster_with_rng(keywords, &mut rand::thread_rng())
    }

    /// Cluster keywords, drawing intent labels from `rng`
    ///
    /// Empty input yields no clusters under every policy.
    pub fn cluster_with_rng<R: Rng + ?Sized>(&self, keywords: &[String], rng: &mut R) -> Vec<Cluster> {
        let groups = match self.policy {
            ClusterPolicy::FixedChunk => fixed_chunks(keywords, rng),
            ClusterPolicy::FirstToken => first_token_groups(keywords, rng),
            ClusterPolicy::Tiered => tiered_slices(keywords),
        };

        groups
            .into_iter()
            .enumerate()
            .map(|(index, (name, intent, members))| Cluster {
                id: format!("cluster-{}", index + 1),
                name,
                intent,
                primary_keyword: members[0].clone(),
                keywords: members,
            })
            .collect()
    }
}

type Group = (String, Intent, Vec<String>);

fn random_intent<R: Rng + ?Sized>(rng: &mut R) -> Intent {
    *Intent::SAMPLED
        .choose(rng)
        .unwrap_or(&Intent::Informational)
}

/// Chunk size `max(1, n / min(4, n))`
pub fn chunk_size(count: usize) -> usize {
    if count == 0 {
        return 1;
    }
    (count / count.min(MAX_CHUNKS)).max(1)
}

fn fixed_chunks<R: Rng + ?Sized>(keywords: &[String], rng: &mut R) -> Vec<Group> {
    if keywords.is_empty() {
        return Vec::new();
    }

    keywords
        .chunks(chunk_size(keywords.len()))
        .enumerate()
        .map(|(index, chunk)| {
            let name = CHUNK_NAMES[index % CHUNK_NAMES.len()].to_string();
            (name, random_intent(rng), chunk.to_vec())
        })
        .collect()
}

/// Lower-cased first whitespace-delimited token, if any
pub fn group_key(keyword: &str) -> Option<String> {
    keyword.split_whitespace().next().map(str::to_lowercase)
}

/// `running-shoes` -> `Running Shoes`
pub fn display_name(key: &str) -> String {
    key.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_token_groups<R: Rng + ?Sized>(keywords: &[String], rng: &mut R) -> Vec<Group> {
    let mut order: Vec<(String, Vec<String>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for keyword in keywords {
        let Some(key) = group_key(keyword) else {
            continue;
        };
        match index.get(&key) {
            Some(&slot) => order[slot].1.push(keyword.clone()),
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, vec![keyword.clone()]));
            }
        }
    }

    // Singleton groups are dropped
    order
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(key, members)| (display_name(&key), random_intent(rng), members))
        .collect()
}

/// Slice boundaries `ceil(0.4n)` and `ceil(0.7n)`, computed in integers
pub fn tier_bounds(count: usize) -> (usize, usize) {
    ((count * 4).div_ceil(10), (count * 7).div_ceil(10))
}

fn tiered_slices(keywords: &[String]) -> Vec<Group> {
    let (first, second) = tier_bounds(keywords.len());
    let tiers = [
        ("Primary Keywords", Intent::Commercial, &keywords[..first]),
        ("Long-tail Variations", Intent::Informational, &keywords[first..second]),
        ("Supporting Terms", Intent::Navigational, &keywords[second..]),
    ];

    tiers
        .into_iter()
        .filter(|(_, _, slice)| !slice.is_empty())
        .map(|(name, intent, slice)| (name.to_string(), intent, slice.to_vec()))
        .collect()
}
