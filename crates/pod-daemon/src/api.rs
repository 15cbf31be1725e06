//! HTTP API for the goal lifecycle
//!
//! Endpoints:
//! - POST /api/goals - Create a goal
//! - GET /api/goals?owner= - An owner's goals, newest first
//! - GET /api/goals/{id} - Full goal record
//! - POST /api/goals/{id}/questions - Issue two verification questions
//! - POST /api/goals/{id}/answers - Grade two answers
//! - POST /api/goals/{id}/attest - Publish the outcome to the ledger (body optional)
//! - POST /api/goals/{id}/notes - Append a note
//! - POST /api/goals/{id}/dispute - Start a dispute on a failed goal
//! - POST /api/goals/{id}/dispute/verify - Verify a dispute post
//! - GET /api/feed?limit= - Recently attested goals
//! - GET /api/users - Known usernames
//! - GET /api/users/{username}/goals - An owner's public history
//! - GET /diag/judge - Judge reachability
//! - GET /health - Health check

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use pod_goal::{Goal, GoalId, PublicGoal};
use pod_lifecycle::{
    AttestOutcome, AttestRequest, Controller, DisputeOutcome, DisputeStart, GradeOutcome,
    NewGoal, QuestionsIssued,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::extract::{ApiJson, OptionalJson};

/// App state
pub struct AppState {
    pub controller: Controller,
}

impl AppState {
    pub fn new(controller: Controller) -> Self {
        Self { controller }
    }
}

type Shared = State<Arc<AppState>>;

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    #[serde(default)]
    pub owner: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AnswersRequest {
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default, alias = "tweet_url")]
    pub post_url: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub username: String,
    pub goals: Vec<PublicGoal>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub judge: String,
    pub attestor: String,
    pub verifier: String,
}

#[derive(Debug, Serialize)]
pub struct JudgeDiagResponse {
    pub name: String,
    pub mock: bool,
    pub available: bool,
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/diag/judge", get(diag_judge))
        .route("/api/goals", post(create_goal).get(list_goals))
        .route("/api/goals/{id}", get(get_goal))
        .route("/api/goals/{id}/questions", post(request_questions))
        .route("/api/goals/{id}/answers", post(submit_answers))
        .route("/api/goals/{id}/attest", post(attest))
        .route("/api/goals/{id}/notes", post(append_note))
        .route("/api/goals/{id}/dispute", post(start_dispute))
        .route("/api/goals/{id}/dispute/verify", post(verify_dispute))
        .route("/api/feed", get(feed))
        .route("/api/users", get(list_users))
        .route("/api/users/{username}/goals", get(user_goals))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_id(raw: &str) -> Result<GoalId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid goal id: {}", raw)))
}

async fn health(State(state): Shared) -> Json<HealthResponse> {
    let c = &state.controller;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        judge: c.judge().name().to_string(),
        attestor: c.attestor().name().to_string(),
        verifier: c.verifier().name().to_string(),
    })
}

async fn diag_judge(State(state): Shared) -> Json<JudgeDiagResponse> {
    let judge = state.controller.judge();
    Json(JudgeDiagResponse {
        name: judge.name().to_string(),
        mock: judge.is_mock(),
        available: judge.is_available().await,
    })
}

async fn create_goal(
    State(state): Shared,
    ApiJson(req): ApiJson<NewGoal>,
) -> Result<impl IntoResponse, ApiError> {
    let goal = state.controller.create_goal(req)?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn list_goals(
    State(state): Shared,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<Goal>>, ApiError> {
    Ok(Json(state.controller.list_goals(&query.owner)?))
}

async fn get_goal(State(state): Shared, Path(id): Path<String>) -> Result<Json<Goal>, ApiError> {
    Ok(Json(state.controller.get_goal(parse_id(&id)?)?))
}

async fn request_questions(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<QuestionsIssued>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.controller.request_questions(id).await?))
}

async fn submit_answers(
    State(state): Shared,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AnswersRequest>,
) -> Result<Json<GradeOutcome>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.controller.submit_answers(id, req.answers).await?))
}

async fn attest(
    State(state): Shared,
    Path(id): Path<String>,
    OptionalJson(req): OptionalJson<AttestRequest>,
) -> Result<Json<AttestOutcome>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.controller.attest(id, req).await?))
}

async fn append_note(
    State(state): Shared,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NoteRequest>,
) -> Result<Json<Goal>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.controller.append_note(id, &req.text)?))
}

async fn start_dispute(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<DisputeStart>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.controller.start_dispute(id)?))
}

async fn verify_dispute(
    State(state): Shared,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<VerifyRequest>,
) -> Result<Json<DisputeOutcome>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(
        state.controller.verify_dispute(id, &req.post_url).await?,
    ))
}

async fn feed(
    State(state): Shared,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<PublicGoal>>, ApiError> {
    Ok(Json(state.controller.feed(query.limit)?))
}

async fn list_users(State(state): Shared) -> Result<Json<UsersResponse>, ApiError> {
    Ok(Json(UsersResponse {
        users: state.controller.list_users()?,
    }))
}

async fn user_goals(
    State(state): Shared,
    Path(username): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let goals = state.controller.public_history(&username)?;
    Ok(Json(HistoryResponse {
        username: username.trim().to_string(),
        goals,
    }))
}
