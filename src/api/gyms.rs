use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use uuid::Uuid;

use super::AppState;
use crate::auth::{require_user_type, UserSession, UserType};
use crate::error::AppResult;
use crate::models::{
    AvailableGym, CreateGymRequest, CreatePlanRequest, Gym, GymListQuery, GymRegistrationResponse,
    MembershipPlan, MembershipView, MyGymDetails, UpdateGymRequest, UpdatePlanRequest,
};
use crate::services::{GymService, MembershipService, PlanService};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/gyms", get(list_available).post(register_gym))
        .route("/api/gyms/my", get(my_gyms))
        .route("/api/gyms/my-gym", get(my_gym_details).delete(delete_my_gym))
        .route("/api/gyms/:id", get(get_gym).put(update_gym).delete(delete_gym))
        .route("/api/gyms/:id/plans", get(list_plans).post(create_plan))
        .route("/api/gyms/:id/plans/:plan_id", put(update_plan).delete(delete_plan))
        .route("/api/gyms/:id/plans/:plan_id/request", post(request_membership))
}

/// Approved gyms, filtered by city and name
#[tracing::instrument(skip(state, _session))]
async fn list_available(
    State(state): State<AppState>,
    _session: UserSession,
    Query(query): Query<GymListQuery>,
) -> AppResult<Json<Vec<AvailableGym>>> {
    let gyms = GymService::new(state.db).list_available(&query).await?;
    Ok(Json(gyms))
}

/// Register a gym, or resubmit a rejected one
#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn register_gym(
    State(state): State<AppState>,
    session: UserSession,
    Json(request): Json<CreateGymRequest>,
) -> AppResult<(StatusCode, Json<GymRegistrationResponse>)> {
    require_user_type(&session, &[UserType::GymOwner])?;

    let response = GymService::new(state.db)
        .register_gym(session.user_id, request)
        .await?;
    let status = if response.resubmitted {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(response)))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn my_gyms(State(state): State<AppState>, session: UserSession) -> AppResult<Json<Vec<Gym>>> {
    require_user_type(&session, &[UserType::GymOwner])?;
    let gyms = GymService::new(state.db).my_gyms(session.user_id).await?;
    Ok(Json(gyms))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn my_gym_details(
    State(state): State<AppState>,
    session: UserSession,
) -> AppResult<Json<MyGymDetails>> {
    require_user_type(&session, &[UserType::GymOwner])?;
    let details = GymService::new(state.db).my_gym_details(session.user_id).await?;
    Ok(Json(details))
}

/// Delete the owner's gym along with their account
#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn delete_my_gym(
    State(state): State<AppState>,
    session: UserSession,
) -> AppResult<Json<serde_json::Value>> {
    let response = GymService::new(state.db).delete_my_gym(&session).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state, session))]
async fn get_gym(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<Json<Gym>> {
    let gym = GymService::new(state.db).get_visible_gym(gym_id, &session).await?;
    Ok(Json(gym))
}

#[tracing::instrument(skip(state, session, request))]
async fn update_gym(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
    Json(request): Json<UpdateGymRequest>,
) -> AppResult<Json<Gym>> {
    let gym = GymService::new(state.db)
        .update_gym(gym_id, &session, request)
        .await?;
    Ok(Json(gym))
}

#[tracing::instrument(skip(state, session))]
async fn delete_gym(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    GymService::new(state.db).delete_gym(gym_id, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, session))]
async fn list_plans(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
) -> AppResult<Json<Vec<MembershipPlan>>> {
    GymService::new(state.db.clone())
        .get_visible_gym(gym_id, &session)
        .await?;
    let plans = PlanService::new(state.db).list_plans(gym_id).await?;
    Ok(Json(plans))
}

#[tracing::instrument(skip(state, session, request))]
async fn create_plan(
    State(state): State<AppState>,
    session: UserSession,
    Path(gym_id): Path<Uuid>,
    Json(request): Json<CreatePlanRequest>,
) -> AppResult<(StatusCode, Json<MembershipPlan>)> {
    require_user_type(&session, &[UserType::GymOwner])?;
    let plan = PlanService::new(state.db)
        .create_plan(gym_id, &session, request)
        .await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

#[tracing::instrument(skip(state, session, request))]
async fn update_plan(
    State(state): State<AppState>,
    session: UserSession,
    Path((gym_id, plan_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdatePlanRequest>,
) -> AppResult<Json<MembershipPlan>> {
    let plan = PlanService::new(state.db)
        .update_plan(gym_id, plan_id, &session, request)
        .await?;
    Ok(Json(plan))
}

#[tracing::instrument(skip(state, session))]
async fn delete_plan(
    State(state): State<AppState>,
    session: UserSession,
    Path((gym_id, plan_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    PlanService::new(state.db)
        .delete_plan(gym_id, plan_id, &session)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ask to join a gym on one of its plans
#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn request_membership(
    State(state): State<AppState>,
    session: UserSession,
    Path((gym_id, plan_id)): Path<(Uuid, Uuid)>,
) -> AppResult<(StatusCode, Json<MembershipView>)> {
    let membership = MembershipService::new(state.db)
        .request_membership(&session, gym_id, plan_id)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}
