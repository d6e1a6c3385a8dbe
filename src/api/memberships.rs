use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use super::AppState;
use crate::auth::UserSession;
use crate::error::{AppError, AppResult};
use crate::models::{MembershipQuery, MembershipStatus, MembershipView};
use crate::services::MembershipService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/memberships", get(list_memberships))
        .route("/api/memberships/:id/approve", post(approve))
        .route("/api/memberships/:id/reject", post(reject))
        .route("/api/memberships/:id/terminate", post(terminate))
}

fn parse_status(query: &MembershipQuery) -> AppResult<Option<MembershipStatus>> {
    match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => MembershipStatus::parse(value)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Unknown membership status '{}'", value))),
    }
}

/// Memberships visible to the caller, newest first
#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_memberships(
    State(state): State<AppState>,
    session: UserSession,
    Query(query): Query<MembershipQuery>,
) -> AppResult<Json<Vec<MembershipView>>> {
    let status = parse_status(&query)?;
    let memberships = MembershipService::new(state.db)
        .list_memberships(&session, status)
        .await?;
    Ok(Json(memberships))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn approve(
    State(state): State<AppState>,
    session: UserSession,
    Path(membership_id): Path<Uuid>,
) -> AppResult<Json<MembershipView>> {
    let membership = MembershipService::new(state.db)
        .approve(membership_id, &session)
        .await?;
    Ok(Json(membership))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn reject(
    State(state): State<AppState>,
    session: UserSession,
    Path(membership_id): Path<Uuid>,
) -> AppResult<Json<MembershipView>> {
    let membership = MembershipService::new(state.db)
        .reject(membership_id, &session)
        .await?;
    Ok(Json(membership))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn terminate(
    State(state): State<AppState>,
    session: UserSession,
    Path(membership_id): Path<Uuid>,
) -> AppResult<Json<MembershipView>> {
    let membership = MembershipService::new(state.db)
        .terminate(membership_id, &session)
        .await?;
    Ok(Json(membership))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        let query = |status: Option<&str>| MembershipQuery {
            status: status.map(String::from),
        };

        assert_eq!(parse_status(&query(None)).unwrap(), None);
        assert_eq!(parse_status(&query(Some("  "))).unwrap(), None);
        assert_eq!(
            parse_status(&query(Some("pending"))).unwrap(),
            Some(MembershipStatus::Pending)
        );
        assert!(matches!(
            parse_status(&query(Some("frozen"))),
            Err(AppError::Validation(_))
        ));
    }
}
