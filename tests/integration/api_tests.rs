//! API integration tests
//!
//! Run against a live server started with the development configuration
//! (bootstrap admin password `admin12345`).

use chrono::{Datelike, Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_PASSWORD: &str = "admin12345";
/// Campus clock offset of the development configuration
const UTC_OFFSET_HOURS: i64 = 8;

/// Helper to get an admin token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Local weekday (0=Sunday) of the campus clock
fn local_weekday() -> i64 {
    (Utc::now() + Duration::hours(UTC_OFFSET_HOURS))
        .weekday()
        .num_days_from_sunday() as i64
}

async fn create_faculty(client: &Client, token: &str, biometric_id: Option<&str>) -> Value {
    let username = unique("faculty");
    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "username": username,
            "email": format!("{}@tabetala.test", username),
            "password": "faculty-password",
            "fullName": "Test Faculty",
            "role": "faculty",
            "biometricId": biometric_id
        }))
        .send()
        .await
        .expect("Failed to create user");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["user"].clone()
}

async fn create_lab(client: &Client, token: &str) -> Value {
    let response = client
        .post(format!("{}/laboratories", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "name": unique("Lab "),
            "building": "Main",
            "roomNumber": "101",
            "capacity": 30
        }))
        .send()
        .await
        .expect("Failed to create laboratory");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_requires_token() {
    let client = Client::new();

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let token = get_auth_token(&client).await;
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_forgot_password_answers_the_same_for_unknown_email() {
    let client = Client::new();

    let known = client
        .post(format!("{}/auth/forgot-password", BASE_URL))
        .json(&json!({ "email": "admin@tabetala.local" }))
        .send()
        .await
        .expect("Failed to send request");
    let unknown = client
        .post(format!("{}/auth/forgot-password", BASE_URL))
        .json(&json!({ "email": "nobody@tabetala.test" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(known.status().is_success());
    assert!(unknown.status().is_success());

    let known: Value = known.json().await.expect("Failed to parse response");
    let unknown: Value = unknown.json().await.expect("Failed to parse response");
    assert_eq!(known["message"], unknown["message"]);
    assert!(unknown.get("resetLink").is_none());
}

#[tokio::test]
#[ignore]
async fn test_password_reset_token_is_single_use() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let faculty = create_faculty(&client, &token, None).await;
    let email = faculty["email"].as_str().expect("email").to_string();

    let response = client
        .post(format!("{}/auth/forgot-password", BASE_URL))
        .json(&json!({ "email": email }))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let link = body["resetLink"].as_str().expect("reset links are exposed in development");
    let reset_token = link.split("token=").nth(1).expect("token in link").to_string();

    let reset = |password: &'static str| {
        client
            .post(format!("{}/auth/reset-password", BASE_URL))
            .json(&json!({ "token": reset_token, "password": password }))
            .send()
    };

    let first = reset("new-password-1").await.expect("Failed to send request");
    assert!(first.status().is_success());

    let second = reset("new-password-2").await.expect("Failed to send request");
    assert_eq!(second.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_biometric_lookup() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let biometric_id = unique("BIO");
    create_faculty(&client, &token, Some(&biometric_id)).await;

    let response = client
        .get(format!("{}/biometric?biometricId={}", BASE_URL, biometric_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["biometricId"], biometric_id.as_str());

    let missing = client
        .get(format!("{}/biometric", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(missing.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_attendance_check_in_then_check_out() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let biometric_id = unique("BIO");
    let faculty = create_faculty(&client, &token, Some(&biometric_id)).await;
    let lab = create_lab(&client, &token).await;

    let response = client
        .post(format!("{}/schedules", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "labId": lab["id"],
            "userId": faculty["id"],
            "dayOfWeek": local_weekday(),
            "startTime": "00:00",
            "endTime": "23:59",
            "courseCode": "IT 101",
            "subject": "Programming"
        }))
        .send()
        .await
        .expect("Failed to create schedule");
    assert_eq!(response.status(), 201);

    let scan = || {
        client
            .post(format!("{}/attendance", BASE_URL))
            .header("x-forwarded-for", "10.1.2.3")
            .json(&json!({ "biometricId": biometric_id, "labId": lab["id"] }))
            .send()
    };

    let check_in: Value = scan()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(check_in["action"], "check_in");
    assert_eq!(check_in["attendance"]["ipAddress"], "10.1.2.3");
    assert_eq!(check_in["attendance"]["notes"], "Scheduled class: IT 101 - Programming");
    assert!(check_in["attendance"]["checkOutTime"].is_null());

    let check_out: Value = scan()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(check_out["action"], "check_out");
    assert_eq!(check_out["attendance"]["id"], check_in["attendance"]["id"]);
    assert!(check_out["attendance"]["checkOutTime"].is_string());

    let response = client
        .get(format!("{}/attendance?userId={}", BASE_URL, faculty["id"].as_str().unwrap()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    let rows: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore]
async fn test_simultaneous_scans_open_at_most_one_session() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let biometric_id = unique("BIO");
    let faculty = create_faculty(&client, &token, Some(&biometric_id)).await;
    let lab = create_lab(&client, &token).await;

    let response = client
        .post(format!("{}/schedules", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "labId": lab["id"],
            "userId": faculty["id"],
            "dayOfWeek": local_weekday(),
            "startTime": "00:00",
            "endTime": "23:59"
        }))
        .send()
        .await
        .expect("Failed to create schedule");
    assert_eq!(response.status(), 201);

    let scan = || {
        client
            .post(format!("{}/attendance", BASE_URL))
            .json(&json!({ "biometricId": biometric_id, "labId": lab["id"] }))
            .send()
    };

    let (first, second) = tokio::join!(scan(), scan());
    let mut outcomes = Vec::new();
    for response in [first, second] {
        let response = response.expect("Failed to send request");
        if response.status() == 409 {
            outcomes.push("conflict".to_string());
        } else {
            assert!(response.status().is_success());
            let body: Value = response.json().await.expect("Failed to parse response");
            outcomes.push(body["action"].as_str().expect("action").to_string());
        }
    }
    outcomes.sort();
    assert!(
        outcomes == ["check_in", "check_out"] || outcomes == ["check_in", "conflict"],
        "unexpected outcomes: {:?}",
        outcomes
    );

    let open: Value = client
        .get(format!(
            "{}/attendance?userId={}&active=true",
            BASE_URL,
            faculty["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(open.as_array().map(Vec::len).unwrap_or(0) <= 1);
}

#[tokio::test]
#[ignore]
async fn test_attendance_without_schedule_is_forbidden() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let biometric_id = unique("BIO");
    let faculty = create_faculty(&client, &token, Some(&biometric_id)).await;
    let lab = create_lab(&client, &token).await;

    let response = client
        .post(format!("{}/attendance", BASE_URL))
        .json(&json!({ "biometricId": biometric_id, "labId": lab["id"] }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["details"]["userId"], faculty["id"]);
    assert_eq!(body["details"]["labId"], lab["id"]);
}

#[tokio::test]
#[ignore]
async fn test_schedule_conflict_only_checked_on_update() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let faculty = create_faculty(&client, &token, Some(&unique("BIO"))).await;
    let lab = create_lab(&client, &token).await;

    let schedule = |start: &'static str, end: &'static str| {
        json!({
            "labId": lab["id"],
            "userId": faculty["id"],
            "dayOfWeek": 1,
            "startTime": start,
            "endTime": end
        })
    };

    let first = client
        .post(format!("{}/schedules", BASE_URL))
        .bearer_auth(&token)
        .json(&schedule("08:00", "10:00"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);

    // Overlapping create is accepted
    let second = client
        .post(format!("{}/schedules", BASE_URL))
        .bearer_auth(&token)
        .json(&schedule("09:00", "11:00"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 201);
    let second: Value = second.json().await.expect("Failed to parse response");

    let update = client
        .put(format!("{}/schedules/{}", BASE_URL, second["id"].as_str().unwrap()))
        .bearer_auth(&token)
        .json(&schedule("09:30", "11:00"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(update.status(), 409);

    let moved = client
        .put(format!("{}/schedules/{}", BASE_URL, second["id"].as_str().unwrap()))
        .bearer_auth(&token)
        .json(&schedule("13:00", "15:00"))
        .send()
        .await
        .expect("Failed to send request");
    assert!(moved.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_faculty_cannot_manage_users() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let faculty = create_faculty(&client, &token, None).await;

    let login: Value = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": faculty["username"],
            "password": "faculty-password"
        }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let faculty_token = login["token"].as_str().expect("token").to_string();

    let response = client
        .get(format!("{}/users", BASE_URL))
        .bearer_auth(&faculty_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/schedules", BASE_URL))
        .bearer_auth(&faculty_token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}
