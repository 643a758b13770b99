//! Integration tests for rankforge-api endpoints
//!
//! Drives the router in-process with `oneshot`; no socket is bound. Delays
//! are disabled unless a test is about them.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use rankforge_api::{build_router, AppState};
use rankforge_common::config::{DelayConfig, ServerConfig};
use rankforge_common::estimator::{Bounds, CampaignEstimate, ClusterEstimate, ResearchEstimate};
use rankforge_common::models::{Cluster, Intent, Opportunity, PlanMetrics, ResearchFindings};
use rankforge_common::{ClusterPolicy, Estimator};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt; // for `oneshot`

/// Test helper: config with no simulated delays
fn test_config(policy: ClusterPolicy) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.clustering.policy = policy;
    config.delays = DelayConfig::none();
    config.env = "test".to_string();
    config
}

/// Test helper: state plus router sharing the same store
fn setup_app(policy: ClusterPolicy) -> (AppState, Router) {
    let state = AppState::new(&test_config(policy)).expect("Default config should be valid");
    let app = build_router(state.clone());
    (state, app)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: send request, return status and parsed JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

async fn create_project(app: &Router, domain: &str) -> u64 {
    let (status, body) = send(app, post_json("/projects", json!({ "domain": domain }))).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_u64().unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_healthz_reports_env_and_version() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(&app, get("/healthz")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["env"], "test");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(&app, get("/nowhere")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Projects
// =============================================================================

#[tokio::test]
async fn test_create_and_list_projects() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(
        &app,
        post_json("/projects", json!({ "domain": " example.com ", "industry": "fitness" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["domain"], "example.com");
    assert_eq!(body["industry"], "fitness");
    assert_eq!(body["status"], "active");
    assert!(body["created_at"].is_string());

    create_project(&app, "second.io").await;

    let (status, body) = send(&app, get("/projects")).await;
    assert_eq!(status, StatusCode::OK);
    let domains: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["domain"].as_str().unwrap())
        .collect();
    assert_eq!(domains, ["example.com", "second.io"]);
}

#[tokio::test]
async fn test_blank_domain_rejected() {
    let (state, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(&app, post_json("/projects", json!({ "domain": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(state.store.projects.is_empty().await);
}

#[tokio::test]
async fn test_get_project_by_id() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);
    let id = create_project(&app, "example.com").await;

    let (status, body) = send(&app, get(&format!("/projects/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domain"], "example.com");

    let (status, body) = send(&app, get("/projects/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].as_str().unwrap().contains("99"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_project_creation_distinct_ids() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let (a, b) = tokio::join!(
        send(&app, post_json("/projects", json!({ "domain": "a.com" }))),
        send(&app, post_json("/projects", json!({ "domain": "b.com" }))),
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert_ne!(a.1["id"], b.1["id"]);

    let (_, body) = send(&app, get("/projects")).await;
    let ids: Vec<_> = body.as_array().unwrap().iter().map(|p| p["id"].clone()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.1["id"]));
    assert!(ids.contains(&b.1["id"]));
}

// =============================================================================
// Keyword intake
// =============================================================================

#[tokio::test]
async fn test_intake_first_token_example() {
    let (state, app) = setup_app(ClusterPolicy::FirstToken);
    let project_id = create_project(&app, "example.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/keywords/intake",
            json!({
                "project_id": project_id,
                "domain": "example.com",
                "keywords": ["running shoes", "running gear", "marathon training", "marathon tips"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plans_created"], 2);
    let clusters = body["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0]["cluster"], "Running");
    assert_eq!(clusters[1]["cluster"], "Marathon");
    assert!(clusters.iter().all(|c| c["keywords"].as_array().unwrap().len() == 2));
    assert_eq!(clusters[0]["primary_keyword"], "running shoes");
    assert_eq!(body["details"]["Running"], 1);
    assert_eq!(body["details"]["Marathon"], 2);
    assert_eq!(body["plan_ids"]["cluster-2"], 2);
    // Options fall back to defaults when omitted
    assert_eq!(body["options"]["num_competitors"], 10);

    let plans = state.store.plans.list().await;
    assert_eq!(plans.len(), 2);
    for plan in &plans {
        assert_eq!(plan.project_id, project_id);
        assert!((5..=25).contains(&plan.metrics.links_needed));
    }
    assert_eq!(plans[1].keyword, "marathon training");
}

#[tokio::test]
async fn test_intake_missing_project_writes_nothing() {
    let (state, app) = setup_app(ClusterPolicy::FixedChunk);

    let (status, body) = send(
        &app,
        post_json(
            "/keywords/intake",
            json!({
                "project_id": 42,
                "domain": "example.com",
                "keywords": ["a b", "a c", "d e"]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(state.store.plans.len().await, 0);
}

#[tokio::test]
async fn test_intake_fixed_chunk_name_collisions() {
    let (state, app) = setup_app(ClusterPolicy::FixedChunk);
    let project_id = create_project(&app, "example.com").await;
    let keywords: Vec<String> = (0..10).map(|i| format!("keyword {}", i)).collect();

    let (status, body) = send(
        &app,
        post_json(
            "/keywords/intake",
            json!({ "project_id": project_id, "domain": "example.com", "keywords": keywords }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // 10 keywords -> 5 chunks of 2; names wrap after 4
    assert_eq!(body["plans_created"], 5);
    assert_eq!(body["details"].as_object().unwrap().len(), 4);
    assert_eq!(body["details"]["running-shoes"], 5);
    assert_eq!(body["plan_ids"].as_object().unwrap().len(), 5);
    assert_eq!(state.store.plans.len().await, 5);
}

#[tokio::test]
async fn test_intake_all_singletons_creates_no_plans() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);
    let project_id = create_project(&app, "example.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/keywords/intake",
            json!({ "project_id": project_id, "domain": "example.com", "keywords": ["one", "two"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plans_created"], 0);
    assert!(body["clusters"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_intake_empty_keywords_rejected() {
    let (state, app) = setup_app(ClusterPolicy::FirstToken);
    let project_id = create_project(&app, "example.com").await;

    let (status, _) = send(
        &app,
        post_json(
            "/keywords/intake",
            json!({ "project_id": project_id, "domain": "example.com", "keywords": [] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(state.store.plans.len().await, 0);
}

#[tokio::test]
async fn test_intake_rejects_out_of_range_options() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);
    let project_id = create_project(&app, "example.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/keywords/intake",
            json!({
                "project_id": project_id,
                "domain": "example.com",
                "keywords": ["a b", "a c"],
                "options": { "avg_link_strength": 3.0 }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("avg_link_strength"));
}

/// Estimator returning fixed numbers, standing in for a real model
struct FixedEstimator;

impl Estimator for FixedEstimator {
    fn estimate_plan(&self, _keyword: &str, _domain: &str, target_da: Option<u32>) -> PlanMetrics {
        PlanMetrics {
            da_target: target_da.unwrap_or(33),
            links_needed: 7,
            articles_needed: 4,
            eta_weeks: 5.5,
        }
    }

    fn estimate_cluster(&self, _cluster: &Cluster) -> ClusterEstimate {
        ClusterEstimate {
            difficulty: 1,
            volume: 2,
        }
    }

    fn estimate_campaign(&self, _keywords: &[String]) -> CampaignEstimate {
        CampaignEstimate {
            difficulty: 3,
            estimated_traffic: 4,
            budget: 5,
        }
    }

    fn estimate_research(&self, query: &str) -> ResearchEstimate {
        ResearchEstimate {
            findings: ResearchFindings {
                total_opportunities: 6,
                avg_difficulty: 7,
                estimated_traffic: 8,
                competitor_gaps: 9,
            },
            opportunities: vec![Opportunity {
                keyword: format!("{} checklist", query),
                difficulty: 10,
                volume: 11,
                cpc: 1.5,
                intent: Intent::Informational,
            }],
        }
    }
}

/// Estimator whose plan synthesis always panics
struct BrokenEstimator;

impl Estimator for BrokenEstimator {
    fn estimate_plan(&self, _keyword: &str, _domain: &str, _target_da: Option<u32>) -> PlanMetrics {
        panic!("plan model unavailable");
    }

    fn estimate_cluster(&self, cluster: &Cluster) -> ClusterEstimate {
        FixedEstimator.estimate_cluster(cluster)
    }

    fn estimate_campaign(&self, keywords: &[String]) -> CampaignEstimate {
        FixedEstimator.estimate_campaign(keywords)
    }

    fn estimate_research(&self, query: &str) -> ResearchEstimate {
        FixedEstimator.estimate_research(query)
    }
}

#[tokio::test]
async fn test_intake_uses_injected_estimator() {
    let config = test_config(ClusterPolicy::FirstToken);
    let state = AppState::with_estimator(&config, Arc::new(FixedEstimator));
    let app = build_router(state.clone());
    let project_id = create_project(&app, "example.com").await;

    let (status, _) = send(
        &app,
        post_json(
            "/keywords/intake",
            json!({ "project_id": project_id, "domain": "example.com", "keywords": ["seo tools", "seo audit"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let plans = state.store.plans.list().await;
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].keyword, "seo tools");
    assert_eq!(plans[0].metrics.links_needed, 7);
    assert_eq!(plans[0].metrics.da_target, 33);

    let (_, body) = send(&app, post_json("/keywords/cluster", json!({ "keywords": ["seo tools", "seo audit"] }))).await;
    assert_eq!(body["clusters"][0]["cluster"], "Seo");
    assert_eq!(body["clusters"][0]["volume"], 2);
}

// =============================================================================
// Direct clustering
// =============================================================================

#[tokio::test]
async fn test_cluster_empty_keywords_rejected() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(&app, post_json("/keywords/cluster", json!({ "keywords": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("clusters").is_none());

    let (status, _) = send(&app, post_json("/keywords/cluster", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cluster_tiered_response_shape() {
    let (_, app) = setup_app(ClusterPolicy::Tiered);
    let keywords: Vec<String> = (0..10).map(|i| format!("term {}", i)).collect();

    let (status, body) = send(&app, post_json("/keywords/cluster", json!({ "keywords": keywords }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["totalKeywords"], 10);
    assert!(body["processingTime"].as_str().unwrap().ends_with('s'));

    let clusters = body["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters[0]["cluster"], "Primary Keywords");
    assert_eq!(clusters[0]["id"], "cluster-1");
    assert_eq!(clusters[1]["intent"], "informational");
    for cluster in clusters {
        let difficulty = cluster["difficulty"].as_u64().unwrap();
        let volume = cluster["volume"].as_u64().unwrap();
        assert!((15..=70).contains(&difficulty));
        assert!((2_000..=60_000).contains(&volume));
    }
}

#[tokio::test]
async fn test_cluster_delay_does_not_block_other_requests() {
    let mut config = test_config(ClusterPolicy::FirstToken);
    config.delays.cluster_ms = 300;
    let app = build_router(AppState::new(&config).unwrap());

    let slow_app = app.clone();
    let slow = tokio::spawn(async move {
        send(&slow_app, post_json("/keywords/cluster", json!({ "keywords": ["a b", "a c"] }))).await
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    let started = Instant::now();
    let (status, _) = send(&app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() < Duration::from_millis(250));

    let (status, body) = slow.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let reported: f64 = body["processingTime"]
        .as_str()
        .unwrap()
        .trim_end_matches('s')
        .parse()
        .unwrap();
    assert!(reported >= 0.3, "processingTime {} shorter than the pause", reported);
}

// =============================================================================
// Plans
// =============================================================================

#[tokio::test]
async fn test_auto_plan_requires_project() {
    let (state, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, _) = send(
        &app,
        post_json(
            "/plans/auto",
            json!({ "project_id": 3, "keyword": "running shoes", "domain": "example.com" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.store.plans.len().await, 0);
}

#[tokio::test]
async fn test_auto_plan_target_da_override() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);
    let project_id = create_project(&app, "example.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/plans/auto",
            json!({
                "project_id": project_id,
                "keyword": "running shoes",
                "domain": "example.com",
                "target_da": 92
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["keyword"], "running shoes");
    assert_eq!(body["metrics"]["da_target"], 92);

    let (status, body) = send(&app, get("/plans/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project_id"], project_id);

    let (status, _) = send(&app, get("/plans/2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auto_plan_sampled_metrics_in_range() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);
    let project_id = create_project(&app, "example.com").await;

    for _ in 0..50 {
        let (status, body) = send(
            &app,
            post_json(
                "/plans/auto",
                json!({ "project_id": project_id, "keyword": "k", "domain": "example.com" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let metrics = &body["metrics"];
        assert!((20..=80).contains(&metrics["da_target"].as_u64().unwrap()));
        assert!((3..=20).contains(&metrics["articles_needed"].as_u64().unwrap()));
        let eta = metrics["eta_weeks"].as_f64().unwrap();
        assert!((4.0..=16.0).contains(&eta));
    }
}

#[tokio::test]
async fn test_list_plans_filters_by_project() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);
    let first = create_project(&app, "one.com").await;
    let second = create_project(&app, "two.com").await;

    for (project_id, keyword) in [(first, "a"), (second, "b"), (first, "c")] {
        let (status, _) = send(
            &app,
            post_json(
                "/plans/auto",
                json!({ "project_id": project_id, "keyword": keyword, "domain": "x.com" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, get(&format!("/plans?project_id={}", first))).await;
    let keywords: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["keyword"].as_str().unwrap())
        .collect();
    assert_eq!(keywords, ["a", "c"]);

    let (_, body) = send(&app, get("/plans")).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_generate_plan_with_roadmap() {
    let (state, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(
        &app,
        post_json(
            "/plans/generate",
            json!({ "keywords": ["running shoes", "running gear", "yoga"], "targetDa": 65 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let plan = &body["plan"];
    assert!(plan["id"].as_str().unwrap().starts_with("auto-plan-"));
    assert_eq!(plan["targetDa"], 65);
    assert_eq!(plan["status"], "active");
    assert_eq!(plan["progress"], 0);
    assert_eq!(plan["metrics"]["totalKeywords"], 3);
    // Derived from first-token clustering: only "running" forms a cluster
    assert_eq!(plan["metrics"]["clusters"], 1);
    assert_eq!(plan["name"], "Auto SEO Plan - 1 Clusters");
    assert_eq!(plan["roadmap"].as_array().unwrap().len(), 3);
    assert_eq!(plan["roadmap"][2]["phase"], "Link Building");
    // Roadmap plans are not stored
    assert_eq!(state.store.plans.len().await, 0);
}

#[tokio::test]
async fn test_generate_plan_defaults_and_validation() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(
        &app,
        post_json("/plans/generate", json!({ "keywords": ["seo"], "clusters": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["targetDa"], 50);
    assert_eq!(body["plan"]["metrics"]["clusters"], 4);

    let (status, _) = send(&app, post_json("/plans/generate", json!({ "keywords": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_named_plan() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(
        &app,
        post_json(
            "/plans/create",
            json!({ "name": "Spring push", "keywords": ["trail shoes", "trail maps"] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let plan = &body["plan"];
    assert!(plan["id"].as_str().unwrap().starts_with("plan-"));
    assert_eq!(plan["name"], "Spring push");
    assert_eq!(plan["description"], "SEO plan for 2 keywords");
    assert!(plan.get("roadmap").is_none());
    assert!(plan["metrics"].get("clusters").is_none());

    let (status, body) = send(
        &app,
        post_json("/plans/create", json!({ "name": " ", "keywords": ["x"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Name and keywords array are required");
}

// =============================================================================
// CORS
// =============================================================================

#[tokio::test]
async fn test_cors_preflight_allows_dev_origin() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/projects")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_ignores_unknown_origin() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/healthz")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

// =============================================================================
// Research
// =============================================================================

#[tokio::test]
async fn test_research_run_shape() {
    let (state, app) = setup_app(ClusterPolicy::FirstToken);

    let (status, body) = send(
        &app,
        post_json(
            "/research/run",
            json!({ "query": " trail shoes ", "domains": ["example.com", " "] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let results = &body["results"];
    assert!(results["id"].as_str().unwrap().starts_with("research-"));
    assert_eq!(results["query"], "trail shoes");
    assert_eq!(results["domains"], json!(["example.com"]));
    assert_eq!(results["depth"], "standard");
    assert_eq!(results["status"], "completed");
    assert!(results["createdAt"].is_string());

    let total = results["findings"]["totalOpportunities"].as_u64().unwrap();
    assert!((10..=59).contains(&total), "totalOpportunities {}", total);
    let keywords: Vec<_> = results["opportunities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["keyword"].as_str().unwrap())
        .collect();
    assert_eq!(keywords, ["trail shoes review", "best trail shoes", "trail shoes guide"]);

    // Runs are not stored
    assert!(state.store.plans.is_empty().await);
}

#[tokio::test]
async fn test_research_requires_query() {
    let (_, app) = setup_app(ClusterPolicy::FirstToken);

    for body in [json!({}), json!({ "query": "   " })] {
        let (status, body) = send(&app, post_json("/research/run", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Query is required");
    }
}

#[tokio::test]
async fn test_research_uses_injected_estimator() {
    let config = test_config(ClusterPolicy::FirstToken);
    let app = build_router(AppState::with_estimator(&config, Arc::new(FixedEstimator)));

    let (status, body) = send(
        &app,
        post_json("/research/run", json!({ "query": "seo", "depth": "deep" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["depth"], "deep");
    assert_eq!(body["results"]["findings"]["competitorGaps"], 9);
    assert_eq!(body["results"]["opportunities"][0]["keyword"], "seo checklist");
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_handler_panic_becomes_json_500() {
    let config = test_config(ClusterPolicy::FirstToken);
    let state = AppState::with_estimator(&config, Arc::new(BrokenEstimator));
    let app = build_router(state.clone());
    let project_id = create_project(&app, "example.com").await;

    let (status, body) = send(
        &app,
        post_json(
            "/plans/auto",
            json!({ "project_id": project_id, "keyword": "seo tools", "domain": "example.com" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(state.store.plans.is_empty().await);

    // The router keeps serving after a failed request
    let (status, _) = send(&app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unsampleable_range_fails_state_setup() {
    let mut config = test_config(ClusterPolicy::FirstToken);
    config.ranges.eta_weeks = Bounds::new(4.0, f64::INFINITY);

    assert!(AppState::new(&config).is_err());
}
