use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use storage::{
    AthleteRepository, InMemoryRepository, MetricRepository, StorageError,
    dto::{
        athlete::{
            AthleteDetailResponse, AthleteListFilter, CreateAthleteRequest, UpdateAthleteRequest,
        },
        metric::CreateMetricRequest,
    },
    models::{Athlete, PerformanceMetric},
};
use tower::ServiceExt;
use uuid::Uuid;
use web::{AppState, build_router};

struct TestApp {
    router: Router,
    repo: Arc<InMemoryRepository>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_prefix("/api")
    }

    fn with_prefix(prefix: &str) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let router = build_router(AppState::in_memory(repo.clone()), prefix);
        Self { router, repo }
    }

    /// Router wired to a repository where every call fails the given way
    fn failing(failure: Failure) -> Self {
        let broken = Arc::new(BrokenRepository(failure));
        let router = build_router(AppState::new(broken.clone(), broken), "/api");
        Self {
            router,
            repo: Arc::new(InMemoryRepository::new()),
        }
    }

    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    async fn create_athlete(&self, name: &str, age: i32, team: &str) -> String {
        let (status, body) = self
            .post("/api/athletes", json!({ "name": name, "age": age, "team": team }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }
}

#[derive(Clone, Copy)]
enum Failure {
    Database,
    Panic,
}

struct BrokenRepository(Failure);

impl BrokenRepository {
    fn fail<T>(&self) -> storage::Result<T> {
        match self.0 {
            Failure::Database => Err(StorageError::Database(sqlx::Error::PoolClosed)),
            Failure::Panic => panic!("repository exploded"),
        }
    }
}

#[async_trait]
impl AthleteRepository for BrokenRepository {
    async fn create(&self, _: &CreateAthleteRequest) -> storage::Result<Athlete> {
        self.fail()
    }

    async fn create_with_metrics(
        &self,
        _: &CreateAthleteRequest,
        _: &[CreateMetricRequest],
    ) -> storage::Result<AthleteDetailResponse> {
        self.fail()
    }

    async fn list(&self, _: &AthleteListFilter) -> storage::Result<Vec<Athlete>> {
        self.fail()
    }

    async fn find_by_id(&self, _: Uuid) -> storage::Result<Athlete> {
        self.fail()
    }

    async fn find_detailed(&self, _: Uuid) -> storage::Result<AthleteDetailResponse> {
        self.fail()
    }

    async fn update(&self, _: Uuid, _: &UpdateAthleteRequest) -> storage::Result<Athlete> {
        self.fail()
    }

    async fn delete(&self, _: Uuid) -> storage::Result<()> {
        self.fail()
    }
}

#[async_trait]
impl MetricRepository for BrokenRepository {
    async fn create(
        &self,
        _: Uuid,
        _: &CreateMetricRequest,
    ) -> storage::Result<PerformanceMetric> {
        self.fail()
    }

    async fn list_for_athlete(
        &self,
        _: Uuid,
        _: Option<&str>,
    ) -> storage::Result<Vec<PerformanceMetric>> {
        self.fail()
    }
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_then_get_returns_empty_metrics() {
    let app = TestApp::new();

    let (status, created) = app
        .post(
            "/api/athletes",
            json!({ "name": "John Doe", "age": 25, "team": "Team A" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());

    let (status, fetched) = app.get(&format!("/api/athletes/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "John Doe");
    assert_eq!(fetched["age"], 25);
    assert_eq!(fetched["team"], "Team A");
    assert_eq!(fetched["metrics"], json!([]));
}

#[tokio::test]
async fn test_get_is_idempotent() {
    let app = TestApp::new();
    let id = app.create_athlete("Jane Smith", 28, "Team B").await;
    app.post(
        &format!("/api/athletes/{id}/metrics"),
        json!({ "metricType": "Endurance", "value": 45, "unit": "min" }),
    )
    .await;

    let first = app.get(&format!("/api/athletes/{id}")).await;
    let second = app.get(&format!("/api/athletes/{id}")).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_get_unknown_athlete_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app
        .get("/api/athletes/6f1c9d6e-52b4-4f0c-8f0e-2b0d5b0a9c11")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Athlete not found" }));

    let (status, _) = app.get("/api/athletes/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_validation_failures() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/athletes", json!({ "name": "", "age": 0, "team": "Team A" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);

    let (status, body) = app.post("/api/athletes", json!({ "name": "No Age" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert_eq!(app.repo.call_count(), 0);
}

#[tokio::test]
async fn test_partial_update() {
    let app = TestApp::new();
    let id = app.create_athlete("John Doe", 25, "Team A").await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/athletes/{id}"),
            Some(json!({ "team": "Team C" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "John Doe");
    assert_eq!(body["age"], 25);
    assert_eq!(body["team"], "Team C");

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/athletes/{id}"),
            Some(json!({ "age": -3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "error": "Validation failed",
            "details": ["age: Age must be a positive integer"]
        })
    );

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/athletes/6f1c9d6e-52b4-4f0c-8f0e-2b0d5b0a9c11",
            Some(json!({ "age": 30 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Athlete not found" }));
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let app = TestApp::new();
    let id = app.create_athlete("John Doe", 25, "Team A").await;
    app.post(
        &format!("/api/athletes/{id}/metrics"),
        json!({ "metricType": "Speed", "value": 9.8, "unit": "m/s" }),
    )
    .await;

    let (status, body) = app
        .request(Method::DELETE, &format!("/api/athletes/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = app.get(&format!("/api/athletes/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, metrics) = app.get(&format!("/api/athletes/{id}/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics, json!([]));

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/athletes/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_scenario_team_page_sort() {
    let app = TestApp::new();
    app.create_athlete("Alice", 23, "Team A").await;
    app.create_athlete("Bruno", 27, "Team A").await;
    app.create_athlete("Chen", 30, "Team B").await;
    app.create_athlete("Dara", 21, "Team A").await;
    app.create_athlete("Emil", 25, "Team A").await;

    let (status, body) = app
        .get("/api/athletes?team=Team%20A&page=2&limit=2&sort=age&order=desc")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["Alice", "Dara"]);
    assert_eq!(body[0]["age"], 23);
    assert_eq!(body[1]["age"], 21);
    assert!(body[0].get("metrics").is_none());
}

#[tokio::test]
async fn test_list_respects_limit_and_team_filter() {
    let app = TestApp::new();
    for i in 0..5 {
        let team = if i % 2 == 0 { "Team A" } else { "Team B" };
        app.create_athlete(&format!("Athlete {i}"), 20 + i, team).await;
    }

    let (_, body) = app.get("/api/athletes?limit=3").await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = app.get("/api/athletes?limit=1000").await;
    assert_eq!(body.as_array().unwrap().len(), 5);

    let (_, body) = app.get("/api/athletes?team=Team+B").await;
    let athletes = body.as_array().unwrap();
    assert_eq!(athletes.len(), 2);
    assert!(athletes.iter().all(|a| a["team"] == "Team B"));

    let (_, body) = app.get("/api/athletes?page=0&limit=0").await;
    assert_eq!(names(&body), ["Athlete 0"]);
}

#[tokio::test]
async fn test_list_sort_by_name_ascending_by_default() {
    let app = TestApp::new();
    app.create_athlete("Zoe", 22, "Team A").await;
    app.create_athlete("Adam", 24, "Team A").await;

    let (_, body) = app.get("/api/athletes").await;
    assert_eq!(names(&body), ["Zoe", "Adam"]);

    let (_, body) = app.get("/api/athletes?sort=name").await;
    assert_eq!(names(&body), ["Adam", "Zoe"]);
}

#[tokio::test]
async fn test_invalid_list_parameters_never_reach_storage() {
    let app = TestApp::new();

    for uri in [
        "/api/athletes?sort=height",
        "/api/athletes?sort=id&order=asc",
        "/api/athletes?order=random",
        "/api/athletes?page=two",
        "/api/athletes?limit=ten",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }

    assert_eq!(app.repo.call_count(), 0);
}

#[tokio::test]
async fn test_metric_for_unknown_athlete_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/athletes/6f1c9d6e-52b4-4f0c-8f0e-2b0d5b0a9c11/metrics",
            json!({ "metricType": "speed", "value": 9.8, "unit": "m/s" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Athlete not found" }));

    let (status, body) = app
        .post(
            "/api/athletes/unknown/metrics",
            json!({ "metricType": "speed", "value": 9.8, "unit": "m/s" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Athlete not found" }));
}

#[tokio::test]
async fn test_metric_listing_for_unknown_athlete_is_empty() {
    let app = TestApp::new();

    let (status, body) = app
        .get("/api/athletes/6f1c9d6e-52b4-4f0c-8f0e-2b0d5b0a9c11/metrics")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_metrics_create_and_filter_by_type() {
    let app = TestApp::new();
    let id = app.create_athlete("John Doe", 25, "Team A").await;

    let (status, created) = app
        .post(
            &format!("/api/athletes/{id}/metrics"),
            json!({ "metricType": "Speed", "value": 9.8, "unit": "m/s" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["athleteId"], id.as_str());
    assert_eq!(created["metricType"], "Speed");
    assert_eq!(created["value"], 9.8);
    assert!(created["timestamp"].is_string());

    app.post(
        &format!("/api/athletes/{id}/metrics"),
        json!({
            "metricType": "Strength",
            "value": 150,
            "unit": "kg",
            "timestamp": "2024-05-01T10:00:00Z"
        }),
    )
    .await;

    let (_, all) = app.get(&format!("/api/athletes/{id}/metrics")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    // Ordered by timestamp: the back-dated measurement comes first
    assert_eq!(all[0]["metricType"], "Strength");

    let (_, speed) = app
        .get(&format!("/api/athletes/{id}/metrics?metricType=Speed"))
        .await;
    let speed = speed.as_array().unwrap();
    assert_eq!(speed.len(), 1);
    assert_eq!(speed[0]["unit"], "m/s");

    let (_, detail) = app.get(&format!("/api/athletes/{id}")).await;
    assert_eq!(detail["metrics"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_metric_validation() {
    let app = TestApp::new();
    let id = app.create_athlete("John Doe", 25, "Team A").await;

    let (status, _) = app
        .post(
            &format!("/api/athletes/{id}/metrics"),
            json!({ "metricType": "", "value": 1, "unit": "kg" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &format!("/api/athletes/{id}/metrics"),
            json!({ "metricType": "Speed", "value": "fast", "unit": "m/s" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let (status, doc) = app.get("/api/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["servers"][0]["url"], "/api");
    assert!(doc["paths"]["/athletes"]["get"].is_object());
    assert!(doc["paths"]["/athletes/{id}"]["delete"].is_object());
    assert!(doc["paths"]["/athletes/{id}/metrics"]["post"].is_object());
}

#[tokio::test]
async fn test_root_prefix() {
    let app = TestApp::with_prefix("");

    let (status, created) = app
        .post("/athletes", json!({ "name": "Root", "age": 40, "team": "Team R" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .get(&format!("/athletes/{}", created["id"].as_str().unwrap()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/coaches").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Route not found" }));
}

#[tokio::test]
async fn test_database_failure_is_generic_internal_error() {
    let app = TestApp::failing(Failure::Database);
    let generic = json!({ "error": "An internal error occurred" });

    let (status, body) = app.get("/api/athletes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic);

    let (status, body) = app
        .get("/api/athletes/6f1c9d6e-52b4-4f0c-8f0e-2b0d5b0a9c11/metrics")
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic);

    // Listing parameters are still checked before storage is reached
    let (status, _) = app.get("/api/athletes?sort=height").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_panicking_repository_becomes_internal_error() {
    let app = TestApp::failing(Failure::Panic);

    let (status, body) = app.get("/api/athletes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "An internal error occurred" }));

    // The router keeps serving after a panic
    let (status, _) = app
        .post("/api/athletes", json!({ "name": "Ann", "age": 30, "team": "Team A" }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = app.get("/api/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
}
