use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use super::AppState;
use crate::auth::UserSession;
use crate::error::AppResult;
use crate::models::{CreateNoticeRequest, NoticeView, UpdateNoticeRequest};
use crate::services::NoticeService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/notices", get(list_notices).post(create_notice))
        .route(
            "/api/notices/:id",
            get(get_notice).put(update_notice).delete(delete_notice),
        )
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_notices(
    State(state): State<AppState>,
    session: UserSession,
) -> AppResult<Json<Vec<NoticeView>>> {
    let notices = NoticeService::new(state.db).list(&session).await?;
    Ok(Json(notices))
}

#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
async fn create_notice(
    State(state): State<AppState>,
    session: UserSession,
    Json(request): Json<CreateNoticeRequest>,
) -> AppResult<(StatusCode, Json<NoticeView>)> {
    let notice = NoticeService::new(state.db).create(&session, request).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

#[tracing::instrument(skip(state, _session))]
async fn get_notice(
    State(state): State<AppState>,
    _session: UserSession,
    Path(notice_id): Path<Uuid>,
) -> AppResult<Json<NoticeView>> {
    let notice = NoticeService::new(state.db).get(notice_id).await?;
    Ok(Json(notice))
}

#[tracing::instrument(skip(state, session, request))]
async fn update_notice(
    State(state): State<AppState>,
    session: UserSession,
    Path(notice_id): Path<Uuid>,
    Json(request): Json<UpdateNoticeRequest>,
) -> AppResult<Json<NoticeView>> {
    let notice = NoticeService::new(state.db)
        .update(notice_id, &session, request)
        .await?;
    Ok(Json(notice))
}

#[tracing::instrument(skip(state, session))]
async fn delete_notice(
    State(state): State<AppState>,
    session: UserSession,
    Path(notice_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    NoticeService::new(state.db).delete(notice_id, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}
