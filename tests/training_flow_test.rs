// ABOUTME: End-to-end HTTP tests for programs, workouts, sessions, logs, and scheduling
// ABOUTME: Exercises ordering, snapshot immutability, ownership, and aggregation through the router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};
use common::{ALICE_SUBJECT, ALICE_TOKEN, BOB_TOKEN};
use helpers::axum_test::AxumTestRequest;
use ironlog_server::database::exercise_logs::NewExerciseLog;
use serde_json::{json, Value};
use uuid::Uuid;

async fn create_program(app: &Router, token: &str, name: &str) -> String {
    let body = AxumTestRequest::post("/training-programs")
        .bearer(token)
        .json(&json!({ "name": name, "description": "test program" }))
        .send(app.clone())
        .await
        .expect_json(201);
    body["id"].as_str().unwrap().to_owned()
}

async fn append_workout(app: &Router, token: &str, program_id: &str, name: &str) -> Value {
    AxumTestRequest::post(&format!("/training-programs/{program_id}/workouts"))
        .bearer(token)
        .json(&json!({ "name": name }))
        .send(app.clone())
        .await
        .expect_json(201)
}

async fn add_exercise(app: &Router, workout_id: &str, exercise_id: Uuid, sets: i64, reps: i64) -> Value {
    AxumTestRequest::post("/workout-exercises")
        .bearer(ALICE_TOKEN)
        .json(&json!({
            "workoutId": workout_id,
            "exerciseId": exercise_id.to_string(),
            "sets": sets,
            "reps": reps,
        }))
        .send(app.clone())
        .await
        .expect_json(201)
}

fn names_and_positions(page: &Value) -> Vec<(String, i64)> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| {
            (
                w["name"].as_str().unwrap().to_owned(),
                w["position"].as_i64().unwrap(),
            )
        })
        .collect()
}

// ============================================================================
// Workout ordering
// ============================================================================

#[tokio::test]
async fn test_append_and_reorder_workouts() {
    let (app, _resources) = common::create_test_app().await.unwrap();
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;

    let a = append_workout(&app, ALICE_TOKEN, &program_id, "A").await;
    let b = append_workout(&app, ALICE_TOKEN, &program_id, "B").await;
    let c = append_workout(&app, ALICE_TOKEN, &program_id, "C").await;
    assert_eq!(a["position"], 1);
    assert_eq!(b["position"], 2);
    assert_eq!(c["position"], 3);
    assert_eq!(a["trainingProgramId"], program_id.as_str());

    let b_id = b["id"].as_str().unwrap();
    let reorder = format!("/training-programs/{program_id}/workouts/{b_id}/reorder");
    let response = AxumTestRequest::post(&reorder)
        .bearer(ALICE_TOKEN)
        .json(&json!({ "position": 3 }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 204);

    let page = AxumTestRequest::get(&format!("/training-programs/{program_id}/workouts"))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(
        names_and_positions(&page),
        vec![("A".to_owned(), 1), ("C".to_owned(), 2), ("B".to_owned(), 3)]
    );

    // Same target again changes nothing
    let response = AxumTestRequest::post(&reorder)
        .bearer(ALICE_TOKEN)
        .json(&json!({ "position": 3 }))
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 204);

    for position in [0, 4] {
        AxumTestRequest::post(&reorder)
            .bearer(ALICE_TOKEN)
            .json(&json!({ "position": position }))
            .send(app.clone())
            .await
            .expect_error(400, "INVALID_REQUEST");
    }
}

#[tokio::test]
async fn test_delete_workout_closes_gap() {
    let (app, _resources) = common::create_test_app().await.unwrap();
    let program_id = create_program(&app, ALICE_TOKEN, "Split").await;

    append_workout(&app, ALICE_TOKEN, &program_id, "Push").await;
    let pull = append_workout(&app, ALICE_TOKEN, &program_id, "Pull").await;
    append_workout(&app, ALICE_TOKEN, &program_id, "Legs").await;

    let pull_id = pull["id"].as_str().unwrap();
    let response = AxumTestRequest::delete(&format!(
        "/training-programs/{program_id}/workouts/{pull_id}"
    ))
    .bearer(ALICE_TOKEN)
    .send(app.clone())
    .await;
    assert_eq!(response.status(), 204);

    let page = AxumTestRequest::get(&format!("/training-programs/{program_id}/workouts"))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(page["totalItems"], 2);
    assert_eq!(
        names_and_positions(&page),
        vec![("Push".to_owned(), 1), ("Legs".to_owned(), 2)]
    );

    // The deleted workout is gone from its program's path
    AxumTestRequest::get(&format!(
        "/training-programs/{program_id}/workouts/{pull_id}"
    ))
    .bearer(ALICE_TOKEN)
    .send(app.clone())
    .await
    .expect_error(404, "RESOURCE_NOT_FOUND");
}

// ============================================================================
// Sessions and snapshots
// ============================================================================

#[tokio::test]
async fn test_session_snapshot_survives_workout_edits() {
    let (app, resources) = common::create_test_app().await.unwrap();
    let bench = common::seed_exercise(&resources.database, "Bench Press", "chest").await;
    let squat = common::seed_exercise(&resources.database, "Squat", "quadriceps").await;
    let deadlift = common::seed_exercise(&resources.database, "Deadlift", "hamstrings").await;

    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;
    let workout = append_workout(&app, ALICE_TOKEN, &program_id, "W1").await;
    let workout_id = workout["id"].as_str().unwrap().to_owned();

    add_exercise(&app, &workout_id, bench.id, 3, 5).await;
    let squat_item = add_exercise(&app, &workout_id, squat.id, 5, 5).await;
    assert_eq!(squat_item["position"], 2);

    let started = AxumTestRequest::post("/workout-sessions")
        .bearer(ALICE_TOKEN)
        .json(&json!({ "workoutId": workout_id }))
        .send(app.clone())
        .await
        .expect_json(201);
    let session_id = started["id"].as_str().unwrap().to_owned();
    assert!(started["completedAt"].is_null());
    assert_eq!(started["snapshot"]["schemaVersion"], 1);
    assert_eq!(started["snapshot"]["workout"]["name"], "W1");

    // Edit the template: drop squat, add deadlift, rename
    let squat_item_id = squat_item["id"].as_str().unwrap();
    let response = AxumTestRequest::delete(&format!("/workout-exercises/{squat_item_id}"))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 204);
    add_exercise(&app, &workout_id, deadlift.id, 1, 5).await;
    AxumTestRequest::patch(&format!(
        "/training-programs/{program_id}/workouts/{workout_id}"
    ))
    .bearer(ALICE_TOKEN)
    .json(&json!({ "name": "W1 renamed" }))
    .send(app.clone())
    .await
    .expect_json(200);

    let fetched = AxumTestRequest::get(&format!("/workout-sessions/{session_id}"))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(fetched["snapshot"], started["snapshot"]);

    let exercises = fetched["snapshot"]["exercises"].as_array().unwrap();
    let frozen: Vec<(&str, i64, i64)> = exercises
        .iter()
        .map(|e| {
            (
                e["exercise"]["name"].as_str().unwrap(),
                e["sets"].as_i64().unwrap(),
                e["reps"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(frozen, vec![("Bench Press", 3, 5), ("Squat", 5, 5)]);
    assert_eq!(fetched["snapshot"]["workout"]["name"], "W1");

    // The live template did change
    let detail = AxumTestRequest::get(&format!(
        "/training-programs/{program_id}/workouts/{workout_id}"
    ))
    .bearer(ALICE_TOKEN)
    .send(app.clone())
    .await
    .expect_json(200);
    let live: Vec<&str> = detail["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["exercise"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(live, vec!["Bench Press", "Deadlift"]);
}

#[tokio::test]
async fn test_complete_session_is_idempotent() {
    let (app, _resources) = common::create_test_app().await.unwrap();
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;
    let workout = append_workout(&app, ALICE_TOKEN, &program_id, "W1").await;

    let session = AxumTestRequest::post("/workout-sessions")
        .bearer(ALICE_TOKEN)
        .json(&json!({ "workoutId": workout["id"] }))
        .send(app.clone())
        .await
        .expect_json(201);
    let complete = format!("/workout-sessions/{}/complete", session["id"].as_str().unwrap());

    let first = AxumTestRequest::post(&complete)
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert!(first["completedAt"].is_string());

    let second = AxumTestRequest::post(&complete)
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(second["completedAt"], first["completedAt"]);

    AxumTestRequest::post(&complete)
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");
}

#[tokio::test]
async fn test_list_sessions_newest_first_with_paging() {
    let (app, resources) = common::create_test_app().await.unwrap();
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;
    let workout = append_workout(&app, ALICE_TOKEN, &program_id, "W1").await;

    let mut started = Vec::new();
    for _ in 0..3 {
        let session = AxumTestRequest::post("/workout-sessions")
            .bearer(ALICE_TOKEN)
            .json(&json!({ "workoutId": workout["id"] }))
            .send(app.clone())
            .await
            .expect_json(201);
        started.push(session["id"].as_str().unwrap().to_owned());
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let first = AxumTestRequest::get("/workout-sessions?pageSize=2")
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(first["totalItems"], 3);
    assert_eq!(first["totalPages"], 2);

    let second = AxumTestRequest::get("/workout-sessions?page=2&pageSize=2")
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(second["currentPage"], 2);

    let listed: Vec<String> = first["items"]
        .as_array()
        .unwrap()
        .iter()
        .chain(second["items"].as_array().unwrap())
        .map(|s| s["id"].as_str().unwrap().to_owned())
        .collect();
    let newest_first: Vec<String> = started.iter().rev().cloned().collect();
    assert_eq!(listed, newest_first);

    // Sessions are private to their owner
    let bob_sessions = AxumTestRequest::get("/workout-sessions")
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(bob_sessions["totalItems"], 0);

    AxumTestRequest::get(&format!("/workout-sessions/{}", started[0]))
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    let own = AxumTestRequest::get(&format!("/workout-sessions/{}", started[0]))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(own["snapshot"]["schemaVersion"], 1);

    // A document from an unknown schema version is never served as-is
    sqlx::query("UPDATE workout_sessions SET snapshot = REPLACE(snapshot, '\"schemaVersion\":1', '\"schemaVersion\":99') WHERE id = $1")
        .bind(&started[0])
        .execute(resources.database.pool())
        .await
        .unwrap();
    AxumTestRequest::get(&format!("/workout-sessions/{}", started[0]))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_error(500, "INTERNAL_SERVER_ERROR");
}

#[tokio::test]
async fn test_start_session_missing_or_foreign_workout() {
    let (app, _resources) = common::create_test_app().await.unwrap();
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;
    let workout = append_workout(&app, ALICE_TOKEN, &program_id, "W1").await;

    AxumTestRequest::post("/workout-sessions")
        .bearer(ALICE_TOKEN)
        .json(&json!({ "workoutId": Uuid::new_v4().to_string() }))
        .send(app.clone())
        .await
        .expect_error(404, "RESOURCE_NOT_FOUND");

    AxumTestRequest::post("/workout-sessions")
        .bearer(BOB_TOKEN)
        .json(&json!({ "workoutId": workout["id"] }))
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    AxumTestRequest::post("/workout-sessions")
        .bearer(ALICE_TOKEN)
        .json(&json!({ "workoutId": "not-a-uuid" }))
        .send(app.clone())
        .await
        .expect_error(400, "INVALID_ID");
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
async fn test_foreign_program_is_forbidden() {
    let (app, _resources) = common::create_test_app().await.unwrap();
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;

    AxumTestRequest::get(&format!("/training-programs/{program_id}"))
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    AxumTestRequest::patch(&format!("/training-programs/{program_id}"))
        .bearer(BOB_TOKEN)
        .json(&json!({ "name": "stolen" }))
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    AxumTestRequest::post(&format!("/training-programs/{program_id}/workouts"))
        .bearer(BOB_TOKEN)
        .json(&json!({ "name": "intruder" }))
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    AxumTestRequest::get(&format!("/training-programs/{}", Uuid::new_v4()))
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_error(404, "RESOURCE_NOT_FOUND");

    // The owner still sees it, and Bob's own listing is empty
    AxumTestRequest::get(&format!("/training-programs/{program_id}"))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    let page = AxumTestRequest::get("/training-programs")
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(page["totalItems"], 0);
}

#[tokio::test]
async fn test_workout_under_other_program_is_forbidden() {
    let (app, _resources) = common::create_test_app().await.unwrap();
    let first = create_program(&app, ALICE_TOKEN, "First").await;
    let second = create_program(&app, ALICE_TOKEN, "Second").await;
    let workout = append_workout(&app, ALICE_TOKEN, &first, "W1").await;
    let workout_id = workout["id"].as_str().unwrap();

    AxumTestRequest::get(&format!("/training-programs/{second}/workouts/{workout_id}"))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");
}

#[tokio::test]
async fn test_workout_exercise_on_missing_workout_is_forbidden() {
    let (app, resources) = common::create_test_app().await.unwrap();
    let bench = common::seed_exercise(&resources.database, "Bench Press", "chest").await;

    AxumTestRequest::post("/workout-exercises")
        .bearer(ALICE_TOKEN)
        .json(&json!({
            "workoutId": Uuid::new_v4().to_string(),
            "exerciseId": bench.id.to_string(),
            "sets": 3,
            "reps": 5,
        }))
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    AxumTestRequest::get(&format!("/workout-exercises?workoutId={}", Uuid::new_v4()))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    AxumTestRequest::get("/workout-exercises")
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_error(400, "INVALID_ID");
}

#[tokio::test]
async fn test_workout_exercise_validation() {
    let (app, resources) = common::create_test_app().await.unwrap();
    let bench = common::seed_exercise(&resources.database, "Bench Press", "chest").await;
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;
    let workout = append_workout(&app, ALICE_TOKEN, &program_id, "W1").await;
    let workout_id = workout["id"].as_str().unwrap();

    AxumTestRequest::post("/workout-exercises")
        .bearer(ALICE_TOKEN)
        .json(&json!({
            "workoutId": workout_id,
            "exerciseId": bench.id.to_string(),
            "sets": 0,
            "reps": 5,
        }))
        .send(app.clone())
        .await
        .expect_error(400, "INVALID_REQUEST");

    AxumTestRequest::post("/workout-exercises")
        .bearer(ALICE_TOKEN)
        .json(&json!({
            "workoutId": workout_id,
            "exerciseId": Uuid::new_v4().to_string(),
            "sets": 3,
            "reps": 5,
        }))
        .send(app.clone())
        .await
        .expect_error(404, "RESOURCE_NOT_FOUND");

    let item = add_exercise(&app, workout_id, bench.id, 3, 5).await;
    let item_id = item["id"].as_str().unwrap();
    assert_eq!(item["exercise"]["name"], "Bench Press");

    let updated = AxumTestRequest::patch(&format!("/workout-exercises/{item_id}"))
        .bearer(ALICE_TOKEN)
        .json(&json!({ "reps": 8 }))
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(updated["sets"], 3);
    assert_eq!(updated["reps"], 8);

    AxumTestRequest::patch(&format!("/workout-exercises/{item_id}"))
        .bearer(ALICE_TOKEN)
        .json(&json!({ "sets": -1 }))
        .send(app.clone())
        .await
        .expect_error(400, "INVALID_REQUEST");

    AxumTestRequest::get(&format!("/workout-exercises/{item_id}"))
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");
}

// ============================================================================
// Exercise logs
// ============================================================================

#[tokio::test]
async fn test_log_sets_and_weight_per_day() {
    let (app, resources) = common::create_test_app().await.unwrap();
    let bench = common::seed_exercise(&resources.database, "Bench Press", "chest").await;
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;
    let workout = append_workout(&app, ALICE_TOKEN, &program_id, "W1").await;
    let session = AxumTestRequest::post("/workout-sessions")
        .bearer(ALICE_TOKEN)
        .json(&json!({ "workoutId": workout["id"] }))
        .send(app.clone())
        .await
        .expect_json(201);
    let session_id = session["id"].as_str().unwrap().to_owned();

    // Duplicate set numbers are accepted; aliases map onto the canonical fields
    let set = json!({
        "sessionId": session_id,
        "exerciseId": bench.id.to_string(),
        "setNumber": 1,
        "reps": 10,
        "weight": 100
    });
    for _ in 0..2 {
        let log = AxumTestRequest::post("/exercise-logs")
            .bearer(ALICE_TOKEN)
            .json(&set)
            .send(app.clone())
            .await
            .expect_json(201);
        assert_eq!(log["repsCompleted"], 10);
        assert_eq!(log["workoutSessionId"], session_id.as_str());
    }

    // Two more sets on a fixed past day
    let alice = common::profile_id(&resources, ALICE_SUBJECT).await;
    let logged_at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
    for _ in 0..2 {
        resources
            .database
            .exercise_logs()
            .create(&NewExerciseLog {
                profile_id: alice,
                workout_session_id: Uuid::parse_str(&session_id).unwrap(),
                exercise_id: bench.id,
                set_number: 1,
                reps_completed: 10,
                weight_used: 100.0,
                logged_at,
            })
            .await
            .unwrap();
    }

    let aggregate = AxumTestRequest::get(&format!(
        "/exercise-logs/weight-per-day?exerciseId={}&startDate=2025-03-01&endDate=2025-03-01",
        bench.id
    ))
    .bearer(ALICE_TOKEN)
    .send(app.clone())
    .await
    .expect_json(200);
    assert_eq!(aggregate["exerciseId"], bench.id.to_string());
    let days = aggregate["totalWeightPerDay"].as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["date"], "2025-03-01");
    assert_eq!(days[0]["totalWeight"], 2000.0);

    // Without bounds both days appear, oldest first
    let aggregate = AxumTestRequest::get(&format!(
        "/exercise-logs/weight-per-day?exerciseId={}",
        bench.id
    ))
    .bearer(ALICE_TOKEN)
    .send(app.clone())
    .await
    .expect_json(200);
    let days = aggregate["totalWeightPerDay"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-03-01");

    // Listing by session returns all four logs
    let page = AxumTestRequest::get(&format!("/exercise-logs?workoutSessionId={session_id}"))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(page["totalItems"], 4);

    // Bob sees none of it
    let page = AxumTestRequest::get("/exercise-logs")
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(page["totalItems"], 0);

    AxumTestRequest::get(&format!(
        "/exercise-logs/weight-per-day?exerciseId={}&startDate=2025-03-02&endDate=2025-03-01",
        bench.id
    ))
    .bearer(ALICE_TOKEN)
    .send(app.clone())
    .await
    .expect_error(400, "INVALID_DATE_RANGE");

    AxumTestRequest::get(&format!(
        "/exercise-logs/weight-per-day?exerciseId={}&startDate=03/01/2025",
        bench.id
    ))
    .bearer(ALICE_TOKEN)
    .send(app.clone())
    .await
    .expect_error(400, "INVALID_DATE_FORMAT");
}

#[tokio::test]
async fn test_log_correction_and_delete() {
    let (app, resources) = common::create_test_app().await.unwrap();
    let bench = common::seed_exercise(&resources.database, "Bench Press", "chest").await;
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;
    let workout = append_workout(&app, ALICE_TOKEN, &program_id, "W1").await;
    let session = AxumTestRequest::post("/workout-sessions")
        .bearer(ALICE_TOKEN)
        .json(&json!({ "workoutId": workout["id"] }))
        .send(app.clone())
        .await
        .expect_json(201);

    AxumTestRequest::post("/exercise-logs")
        .bearer(ALICE_TOKEN)
        .json(&json!({
            "workoutSessionId": session["id"],
            "exerciseId": Uuid::new_v4().to_string(),
            "setNumber": 1,
            "repsCompleted": 5,
            "weightUsed": 60.0
        }))
        .send(app.clone())
        .await
        .expect_error(404, "RESOURCE_NOT_FOUND");

    AxumTestRequest::post("/exercise-logs")
        .bearer(BOB_TOKEN)
        .json(&json!({
            "workoutSessionId": session["id"],
            "exerciseId": bench.id.to_string(),
            "setNumber": 1,
            "repsCompleted": 5,
            "weightUsed": 60.0
        }))
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    let log = AxumTestRequest::post("/exercise-logs")
        .bearer(ALICE_TOKEN)
        .json(&json!({
            "workoutSessionId": session["id"],
            "exerciseId": bench.id.to_string(),
            "setNumber": 1,
            "repsCompleted": 5,
            "weightUsed": 60.0
        }))
        .send(app.clone())
        .await
        .expect_json(201);
    let log_url = format!("/exercise-logs/{}", log["id"].as_str().unwrap());

    AxumTestRequest::get(&log_url)
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    let corrected = AxumTestRequest::patch(&log_url)
        .bearer(ALICE_TOKEN)
        .json(&json!({ "weight": 62.5 }))
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(corrected["weightUsed"], 62.5);
    assert_eq!(corrected["repsCompleted"], 5);

    AxumTestRequest::patch(&log_url)
        .bearer(BOB_TOKEN)
        .json(&json!({ "weight": 1.0 }))
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    let response = AxumTestRequest::delete(&log_url)
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 204);

    AxumTestRequest::get(&log_url)
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_error(404, "RESOURCE_NOT_FOUND");
}

// ============================================================================
// Scheduling
// ============================================================================

#[tokio::test]
async fn test_scheduled_workouts_crud_and_range() {
    let (app, _resources) = common::create_test_app().await.unwrap();
    let program_id = create_program(&app, ALICE_TOKEN, "G1").await;
    let workout = append_workout(&app, ALICE_TOKEN, &program_id, "W1").await;

    for date in ["2025-06-09", "2025-06-12", "2025-06-20"] {
        let entry = AxumTestRequest::post("/scheduled-workouts")
            .bearer(ALICE_TOKEN)
            .json(&json!({ "workoutId": workout["id"], "date": date, "notes": "heavy" }))
            .send(app.clone())
            .await
            .expect_json(201);
        assert_eq!(entry["date"], date);
    }

    let page = AxumTestRequest::get("/scheduled-workouts?startDate=2025-06-09&endDate=2025-06-12")
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_json(200);
    let dates: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2025-06-09", "2025-06-12"]);

    AxumTestRequest::get("/scheduled-workouts?startDate=2025-06-12&endDate=2025-06-12")
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await
        .expect_error(400, "INVALID_DATE_RANGE");

    AxumTestRequest::post("/scheduled-workouts")
        .bearer(ALICE_TOKEN)
        .json(&json!({ "workoutId": workout["id"], "date": "June 1st" }))
        .send(app.clone())
        .await
        .expect_error(400, "INVALID_DATE_FORMAT");

    AxumTestRequest::post("/scheduled-workouts")
        .bearer(BOB_TOKEN)
        .json(&json!({ "workoutId": workout["id"], "date": "2025-06-09" }))
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");

    let first = page["items"][0]["id"].as_str().unwrap().to_owned();
    let moved = AxumTestRequest::patch(&format!("/scheduled-workouts/{first}"))
        .bearer(ALICE_TOKEN)
        .json(&json!({ "date": "2025-06-10" }))
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(moved["date"], "2025-06-10");
    assert_eq!(moved["notes"], "heavy");

    AxumTestRequest::delete(&format!("/scheduled-workouts/{first}"))
        .bearer(BOB_TOKEN)
        .send(app.clone())
        .await
        .expect_error(403, "FORBIDDEN");
    let response = AxumTestRequest::delete(&format!("/scheduled-workouts/{first}"))
        .bearer(ALICE_TOKEN)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn test_next_scheduled_skips_past_entries() {
    let (_app, resources) = common::create_test_app().await.unwrap();
    let alice = common::profile_id(&resources, ALICE_SUBJECT).await;
    let program = common::seed_program(&resources.database, alice, "G1").await;
    let workout = common::seed_workout(&resources.database, program.id, "W1").await;

    let date = |d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
    for day in [9, 12] {
        resources
            .database
            .scheduled()
            .create(alice, workout.id, date(day), "")
            .await
            .unwrap();
    }

    let next =
        ironlog_server::services::scheduling::next_scheduled(&resources.database, alice, date(10))
            .await
            .unwrap();
    assert_eq!(next.date, date(12));

    let none =
        ironlog_server::services::scheduling::next_scheduled(&resources.database, alice, date(13))
            .await;
    assert!(none.is_err());
}
