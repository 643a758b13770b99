//! # RankForge Common Library
//!
//! Core of the RankForge SEO planning engine, shared by the API server:
//! - Record types (projects, plans, clusters, roadmap plans)
//! - Keyword clustering policies
//! - Plan metric estimation (uniform-random stub behind the `Estimator` trait)
//! - In-memory record store
//! - Configuration loading
//! - Identifier generation
//! - Research estimates for the keyword research endpoint

pub mod cluster;
pub mod config;
pub mod error;
pub mod estimator;
pub mod ids;
pub mod models;
pub mod store;

pub use cluster::{ClusterPolicy, Clusterer};
pub use error::{Error, Result};
pub use estimator::{Estimator, UniformEstimator};
pub use store::{RecordStore, Store};
