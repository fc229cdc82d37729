//! API integration tests
//!
//! These run against a live server with a seeded admin account
//! (see ADMIN_EMAIL / ADMIN_PASSWORD below). Run with:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8000/api/v1";

const ADMIN_EMAIL: &str = "admin@gearguard.local";
const ADMIN_PASSWORD: &str = "Admin#2024!";

/// Unique suffix for emails and serial numbers so tests can re-run
fn unique_suffix() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_nanos();
    format!("{}", nanos)
}

/// Login and return the access token
async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "login failed for {}", email);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["access_token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Create a user with the given role via the admin API, return (id, email)
async fn create_user_with_role(
    client: &Client,
    token: &str,
    role: &str,
    password: &str,
) -> (String, String) {
    let email = format!("{}-{}@gearguard.local", role, unique_suffix());
    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": format!("Test {}", role),
            "email": email,
            "password": password,
            "role": role,
            "is_technician": role == "technician"
        }))
        .send()
        .await
        .expect("Failed to create user");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse user response");
    (body["id"].as_str().expect("No user ID").to_string(), email)
}

/// Create a team and return its id
async fn create_team(client: &Client, token: &str) -> String {
    let response = client
        .post(format!("{}/teams", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": format!("Team {}", unique_suffix()) }))
        .send()
        .await
        .expect("Failed to create team");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse team response");
    body["id"].as_str().expect("No team ID").to_string()
}

/// Create equipment assigned to a team and return its id
async fn create_equipment(client: &Client, token: &str, team_id: &str) -> String {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": "Test Lathe",
            "serial_number": format!("SN-{}", unique_suffix()),
            "category": "Machining",
            "maintenance_team_id": team_id
        }))
        .send()
        .await
        .expect("Failed to create equipment");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse equipment response");
    body["id"].as_str().expect("No equipment ID").to_string()
}

/// Create a corrective request linked to equipment and return its id
async fn create_request(client: &Client, token: &str, equipment_id: &str) -> String {
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "subject": "Spindle bearing noise",
            "request_type": "corrective",
            "equipment_id": equipment_id
        }))
        .send()
        .await
        .expect("Failed to create request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse request response");
    body["id"].as_str().expect("No request ID").to_string()
}

/// Move a request to the given stage
async fn change_stage(client: &Client, token: &str, request_id: &str, stage: &str) -> reqwest::Response {
    client
        .patch(format!("{}/requests/{}/stage", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "status": stage }))
        .send()
        .await
        .expect("Failed to send stage request")
}

async fn get_history(client: &Client, token: &str, request_id: &str) -> Vec<Value> {
    let response = client
        .get(format!("{}/requests/{}/history", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch history");
    assert!(response.status().is_success());
    response.json().await.expect("Failed to parse history")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let email = format!("user-{}@gearguard.local", unique_suffix());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Registered User",
            "email": email,
            "password": "Strong!Pass1"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access_token"].is_string());
    assert_eq!(body["user"]["role"], "user");

    let token = login(&client, &email, "Strong!Pass1").await;
    assert!(!token.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_weak_password() {
    let client = Client::new();
    let email = format!("weak-{}@gearguard.local", unique_suffix());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Weak Password",
            "email": email,
            "password": "password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

/// Scenario: technician on the owning team starts work on a new request.
/// The transition sets started_at and appends one history row.
#[tokio::test]
#[ignore]
async fn test_technician_starts_work_on_team_request() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let (tech_id, tech_email) =
        create_user_with_role(&client, &admin, "technician", "Tech!Pass1").await;

    let response = client
        .post(format!("{}/teams/{}/members", BASE_URL, team_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "user_id": tech_id }))
        .send()
        .await
        .expect("Failed to add member");
    assert_eq!(response.status(), 201);

    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    let tech = login(&client, &tech_email, "Tech!Pass1").await;
    let response = change_stage(&client, &tech, &request_id, "in_progress").await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "in_progress");
    assert!(body["started_at"].is_string());

    let history = get_history(&client, &admin, &request_id).await;
    // Creation entry plus one transition
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["from_stage"], "new");
    assert_eq!(history[0]["to_stage"], "in_progress");
}

/// Scenario: a manager may not scrap, even though repaired -> scrap is
/// table-legal
#[tokio::test]
#[ignore]
async fn test_manager_cannot_scrap() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    assert!(change_stage(&client, &admin, &request_id, "in_progress")
        .await
        .status()
        .is_success());
    assert!(change_stage(&client, &admin, &request_id, "repaired")
        .await
        .status()
        .is_success());

    let (_, manager_email) =
        create_user_with_role(&client, &admin, "manager", "Mgr!Pass12").await;
    let manager = login(&client, &manager_email, "Mgr!Pass12").await;

    let response = change_stage(&client, &manager, &request_id, "scrap").await;
    assert_eq!(response.status(), 403);
}

/// Scenario: admin scraps a repaired request with linked equipment. The
/// equipment becomes scrapped atomically with the stage change.
#[tokio::test]
#[ignore]
async fn test_admin_scrap_updates_equipment() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    for stage in ["in_progress", "repaired", "scrap"] {
        let response = change_stage(&client, &admin, &request_id, stage).await;
        assert!(response.status().is_success(), "failed moving to {}", stage);
    }

    let response = client
        .get(format!("{}/equipment/{}", BASE_URL, equipment_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to fetch equipment");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse equipment");
    assert_eq!(body["status"], "scrapped");
    assert_eq!(body["is_scrapped"], true);

    // Exactly one scrap log row, referencing the request
    let response = client
        .get(format!("{}/equipment/{}/scrap-logs", BASE_URL, equipment_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to fetch scrap logs");
    assert!(response.status().is_success());

    let logs: Vec<Value> = response.json().await.expect("Failed to parse scrap logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["request_id"].as_str(), Some(request_id.as_str()));

    // completed_at was stamped on the repaired transition
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to fetch request");
    let body: Value = response.json().await.expect("Failed to parse request");
    assert_eq!(body["status"], "scrap");
    assert!(body["completed_at"].is_string());
}

/// Scenario: skipping in_progress is rejected with the allowed set
#[tokio::test]
#[ignore]
async fn test_illegal_transition_skipping_stage() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    let response = change_stage(&client, &admin, &request_id, "repaired").await;
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse error");
    assert!(body["message"]
        .as_str()
        .expect("No message")
        .contains("in_progress"));
}

/// Scenario: scrap is terminal, every outgoing transition is rejected
#[tokio::test]
#[ignore]
async fn test_scrap_is_terminal() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    for stage in ["in_progress", "repaired", "scrap"] {
        assert!(change_stage(&client, &admin, &request_id, stage)
            .await
            .status()
            .is_success());
    }

    for stage in ["new", "in_progress", "repaired"] {
        let response = change_stage(&client, &admin, &request_id, stage).await;
        assert_eq!(response.status(), 422, "transition to {} should fail", stage);

        let body: Value = response.json().await.expect("Failed to parse error");
        assert!(body["message"]
            .as_str()
            .expect("No message")
            .contains("terminal"));
    }
}

/// Unknown stages are rejected before any lookup
#[tokio::test]
#[ignore]
async fn test_unknown_stage_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    let response = change_stage(&client, &admin, &request_id, "recycled").await;
    assert_eq!(response.status(), 400);
}

/// Plain users may never transition, regardless of table legality
#[tokio::test]
#[ignore]
async fn test_plain_user_cannot_transition() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    let (_, user_email) = create_user_with_role(&client, &admin, "user", "User!Pass1").await;
    let user = login(&client, &user_email, "User!Pass1").await;

    let response = change_stage(&client, &user, &request_id, "in_progress").await;
    assert_eq!(response.status(), 403);
}

/// Same-stage transition is an idempotent no-op and writes no history
#[tokio::test]
#[ignore]
async fn test_same_stage_is_noop() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    let before = get_history(&client, &admin, &request_id).await;

    let response = change_stage(&client, &admin, &request_id, "new").await;
    assert!(response.status().is_success());

    let after = get_history(&client, &admin, &request_id).await;
    assert_eq!(before.len(), after.len());
}

/// Preventive requests can only be created by managers and admins
#[tokio::test]
#[ignore]
async fn test_preventive_requires_manager() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let (_, user_email) = create_user_with_role(&client, &admin, "user", "User!Pass2").await;
    let user = login(&client, &user_email, "User!Pass2").await;

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", user))
        .json(&json!({
            "subject": "Quarterly inspection",
            "request_type": "preventive"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

/// A technician without team memberships gets an empty list, not an error
#[tokio::test]
#[ignore]
async fn test_teamless_technician_sees_empty_list() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    // Make sure at least one request exists
    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    create_request(&client, &admin, &equipment_id).await;

    let (_, tech_email) =
        create_user_with_role(&client, &admin, "technician", "Tech!Pass2").await;
    let tech = login(&client, &tech_email, "Tech!Pass2").await;

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", tech))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 0);
    assert_eq!(body["items"].as_array().expect("No items").len(), 0);
}

/// A technician outside the owning team is Forbidden on reads, not NotFound
#[tokio::test]
#[ignore]
async fn test_technician_forbidden_outside_team() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;
    let request_id = create_request(&client, &admin, &equipment_id).await;

    // Technician on a different team
    let other_team = create_team(&client, &admin).await;
    let (tech_id, tech_email) =
        create_user_with_role(&client, &admin, "technician", "Tech!Pass3").await;
    let response = client
        .post(format!("{}/teams/{}/members", BASE_URL, other_team))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "user_id": tech_id }))
        .send()
        .await
        .expect("Failed to add member");
    assert_eq!(response.status(), 201);

    let tech = login(&client, &tech_email, "Tech!Pass3").await;

    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", tech))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = change_stage(&client, &tech, &request_id, "in_progress").await;
    assert_eq!(response.status(), 403);
}

/// Creating a request linked to equipment auto-fills team and category
#[tokio::test]
#[ignore]
async fn test_create_auto_fills_from_equipment() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let team_id = create_team(&client, &admin).await;
    let equipment_id = create_equipment(&client, &admin, &team_id).await;

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "subject": "Coolant leak",
            "request_type": "corrective",
            "equipment_id": equipment_id
        }))
        .send()
        .await
        .expect("Failed to create request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["maintenance_team_id"].as_str(), Some(team_id.as_str()));
    assert_eq!(body["category"], "Machining");
    assert_eq!(body["status"], "new");
    assert!(body["reference"].as_str().expect("No reference").starts_with("MR/"));
}

#[tokio::test]
#[ignore]
async fn test_dashboard_summary() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .get(format!("{}/dashboard/summary", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["kpis"]["open_requests"]["pending_count"].is_number());
    assert!(body["requests_by_status"]["new"].is_number());
    assert!(body["equipment_health"]["critical"].is_number());
}
