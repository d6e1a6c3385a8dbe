//! End-to-end service flows against a real Postgres. Set TEST_DATABASE_URL
//! to run them; without it every test returns early.

mod common;

use assert_matches::assert_matches;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use gymhub::api::routes::create_app;
use gymhub::api::AppState;
use gymhub::auth::{AuthError, LoginRequest, UserSession, UserType};
use gymhub::config::{seed_admin, AppConfig, SeedConfig};
use gymhub::error::AppError;
use gymhub::models::{
    CreateExerciseEntryRequest, CreateGymRequest, CreateNoticeRequest, CreatePlanRequest,
    DashboardStats, ExerciseEntryQuery, GymListQuery, GymStatus, MembershipStatus,
};
use gymhub::services::{
    ApprovalService, AttendanceService, DashboardService, ExerciseEntryService, GymService,
    MembershipService, NoticeService, PlanService,
};
use pretty_assertions::assert_eq;
use serial_test::serial;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{auth_service, register, signup_request, test_pool, unique, TEST_PASSWORD};

async fn admin_session(pool: &PgPool) -> UserSession {
    let seed = SeedConfig {
        username: unique("admin"),
        email: format!("{}@example.com", unique("admin")),
        password: TEST_PASSWORD.to_string(),
    };
    assert!(seed_admin(pool, &seed).await.unwrap());
    assert!(!seed_admin(pool, &seed).await.unwrap());

    let auth = auth_service(pool);
    let response = auth
        .login(LoginRequest {
            username: seed.username.clone(),
            password: seed.password.clone(),
        })
        .await
        .unwrap();
    auth.validate_session(&response.access).await.unwrap()
}

fn gym_request(name: &str) -> CreateGymRequest {
    CreateGymRequest {
        name: name.to_string(),
        address: "12 Iron Street".to_string(),
        phone: "+1 555 0100".to_string(),
        email: "front-desk@example.com".to_string(),
        description: Some("Free weights and a rowing corner".to_string()),
    }
}

/// Owner with an approved gym and a 3 month plan
async fn approved_gym(pool: &PgPool) -> (UserSession, Uuid, Uuid) {
    let (_, owner) = register(pool, "owner", UserType::GymOwner).await;
    let registered = GymService::new(pool.clone())
        .register_gym(owner.user_id, gym_request(&unique("Iron Works")))
        .await
        .unwrap();
    assert_eq!(registered.gym.status, GymStatus::Pending);

    let admin = admin_session(pool).await;
    let approval = ApprovalService::new(pool.clone())
        .approve(registered.gym.id, &admin, Some("Looks good".to_string()))
        .await
        .unwrap();
    assert_eq!(approval.gym.status, GymStatus::Approved);

    let plan = PlanService::new(pool.clone())
        .create_plan(
            registered.gym.id,
            &owner,
            CreatePlanRequest {
                duration_months: 3,
                price: 89.0,
                description: None,
            },
        )
        .await
        .unwrap();

    (owner, registered.gym.id, plan.id)
}

#[tokio::test]
#[serial]
async fn test_signup_login_and_duplicates() {
    let Some(pool) = test_pool().await else { return };
    let auth = auth_service(&pool);

    let username = unique("maria");
    let response = auth
        .signup(signup_request(&username, UserType::Member))
        .await
        .unwrap();
    assert_eq!(response.user.username, username);
    assert_eq!(response.user.user_type, UserType::Member);

    let duplicate = auth.signup(signup_request(&username, UserType::Member)).await;
    assert_matches!(duplicate, Err(AuthError::UsernameAlreadyExists));

    let admin = auth.signup(signup_request(&unique("boss"), UserType::Admin)).await;
    assert_matches!(admin, Err(AuthError::AdminSignupForbidden));

    let wrong = auth
        .login(LoginRequest {
            username: username.clone(),
            password: "not-the-password1".to_string(),
        })
        .await;
    assert_matches!(wrong, Err(AuthError::InvalidCredentials));

    let ok = auth
        .login(LoginRequest {
            username,
            password: TEST_PASSWORD.to_string(),
        })
        .await
        .unwrap();
    assert!(!ok.access.is_empty());
}

#[tokio::test]
#[serial]
async fn test_gym_review_is_single_shot() {
    let Some(pool) = test_pool().await else { return };
    let (_, owner) = register(&pool, "owner", UserType::GymOwner).await;
    let gym = GymService::new(pool.clone())
        .register_gym(owner.user_id, gym_request(&unique("Kettle Club")))
        .await
        .unwrap()
        .gym;

    let admin = admin_session(&pool).await;
    let approvals = ApprovalService::new(pool.clone());
    let rejected = approvals
        .reject(gym.id, &admin, Some("Missing licence".to_string()))
        .await
        .unwrap();
    assert_eq!(rejected.gym.status, GymStatus::Rejected);
    assert_eq!(rejected.gym.rejection_reason.as_deref(), Some("Missing licence"));

    let again = approvals.approve(gym.id, &admin, None).await;
    assert_matches!(again, Err(AppError::Conflict(_)));

    let stats = approvals.approval_stats().await.unwrap();
    assert!(stats.rejected_gyms >= 1);
    assert!(stats.recent_history.iter().any(|h| h.gym_id == gym.id));
}

#[tokio::test]
#[serial]
async fn test_membership_lifecycle() {
    let Some(pool) = test_pool().await else { return };
    let (owner, gym_id, plan_id) = approved_gym(&pool).await;
    let (_, member) = register(&pool, "member", UserType::Member).await;
    let memberships = MembershipService::new(pool.clone());

    let pending = memberships
        .request_membership(&member, gym_id, plan_id)
        .await
        .unwrap();
    assert_eq!(pending.status, MembershipStatus::Pending);

    let duplicate = memberships.request_membership(&member, gym_id, plan_id).await;
    assert_matches!(duplicate, Err(AppError::Conflict(_)));

    // Only the gym owner may decide on requests.
    let by_member = memberships.approve(pending.id, &member).await;
    assert_matches!(by_member, Err(AppError::Forbidden(_)));

    let approved = memberships.approve(pending.id, &owner).await.unwrap();
    assert_eq!(approved.status, MembershipStatus::Approved);
    assert_eq!(approved.effective_status, "approved");
    assert!(approved.start_date.is_some());
    assert!(approved.end_date > approved.start_date);

    let listed = memberships
        .list_memberships(&owner, Some(MembershipStatus::Approved))
        .await
        .unwrap();
    assert!(listed.iter().any(|m| m.id == pending.id));

    let terminated = memberships.terminate(pending.id, &member).await.unwrap();
    assert_eq!(terminated.status, MembershipStatus::Terminated);

    let approve_again = memberships.approve(pending.id, &owner).await;
    assert_matches!(approve_again, Err(AppError::Conflict(_)));
}

#[tokio::test]
#[serial]
async fn test_attendance_once_per_day() {
    let Some(pool) = test_pool().await else { return };
    let (owner, gym_id, plan_id) = approved_gym(&pool).await;
    let (_, member) = register(&pool, "member", UserType::Member).await;
    let attendance = AttendanceService::new(pool.clone());

    // No membership yet.
    assert_matches!(attendance.mark(&member, gym_id).await, Err(AppError::Forbidden(_)));

    let memberships = MembershipService::new(pool.clone());
    let request = memberships
        .request_membership(&member, gym_id, plan_id)
        .await
        .unwrap();
    memberships.approve(request.id, &owner).await.unwrap();

    let marked = attendance.mark(&member, gym_id).await.unwrap();
    assert_eq!(marked.current_streak, 1);
    assert_eq!(marked.attendance.streak_count, 1);

    assert_matches!(attendance.mark(&member, gym_id).await, Err(AppError::Conflict(_)));

    let today = attendance.check_today(&member, gym_id).await.unwrap();
    assert!(today.marked);
    assert_eq!(today.streak_count, Some(1));

    let stats = attendance.stats(&member, gym_id).await.unwrap();
    assert_eq!(stats.total_attendance, 1);
    assert_eq!(stats.current_streak, 1);
    assert_eq!(stats.longest_streak, 1);
    assert_eq!(stats.attendance_percentage, 100.0);

    let board = attendance.leaderboard(&owner, gym_id).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].member_id, member.user_id);

    let analytics = attendance.analytics(&owner, gym_id).await.unwrap();
    assert_eq!(analytics.today_count, 1);

    // Streaks already consistent, nothing to rewrite.
    assert_eq!(attendance.recalculate_gym(&owner, gym_id).await.unwrap(), 0);
    assert_matches!(
        attendance.analytics(&member, gym_id).await,
        Err(AppError::Forbidden(_))
    );
}

#[tokio::test]
#[serial]
async fn test_notices_and_dashboards() {
    let Some(pool) = test_pool().await else { return };
    let (owner, gym_id, plan_id) = approved_gym(&pool).await;
    let (_, member) = register(&pool, "member", UserType::Member).await;

    let memberships = MembershipService::new(pool.clone());
    let request = memberships
        .request_membership(&member, gym_id, plan_id)
        .await
        .unwrap();
    memberships.approve(request.id, &owner).await.unwrap();

    let notices = NoticeService::new(pool.clone());
    let notice = notices
        .create(
            &owner,
            CreateNoticeRequest {
                gym_id: None,
                title: "Holiday hours".to_string(),
                message: "Closed on Monday".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(notice.gym_id, gym_id);

    let visible = notices.list(&member).await.unwrap();
    assert!(visible.iter().any(|n| n.id == notice.id));

    assert_matches!(notices.delete(notice.id, &member).await, Err(AppError::Forbidden(_)));
    notices.delete(notice.id, &owner).await.unwrap();
    assert_matches!(notices.get(notice.id).await, Err(AppError::NotFound(_)));

    let entries = ExerciseEntryService::new(pool.clone());
    entries
        .create(
            &member,
            CreateExerciseEntryRequest {
                exercise_name: "Rowing".to_string(),
                exercise_type: Some("Cardio".to_string()),
                body_part: None,
                duration_minutes: 30,
                calories_burned: 250,
                sets: None,
                reps: None,
                weight_kg: None,
                notes: None,
                date: None,
            },
        )
        .await
        .unwrap();

    let owner_view = entries
        .list(&owner, &ExerciseEntryQuery::default())
        .await
        .unwrap();
    assert!(owner_view.iter().any(|e| e.member_id == member.user_id));

    let dashboards = DashboardService::new(pool.clone());
    match dashboards.stats(&member).await.unwrap() {
        DashboardStats::Member(stats) => {
            assert!(!stats.not_enrolled);
            assert_eq!(stats.total_workouts, 1);
            assert_eq!(stats.total_calories, 250);
            assert_eq!(stats.active_memberships.len(), 1);
        }
        other => panic!("unexpected dashboard {:?}", other),
    }
    match dashboards.stats(&owner).await.unwrap() {
        DashboardStats::GymOwner(stats) => assert_eq!(stats.active_members, 1),
        other => panic!("unexpected dashboard {:?}", other),
    }
}

#[tokio::test]
#[serial]
async fn test_concurrent_membership_requests_leave_one_pending() {
    let Some(pool) = test_pool().await else { return };
    let (_, gym_id, plan_id) = approved_gym(&pool).await;
    let (_, member) = register(&pool, "eager", UserType::Member).await;

    let first = MembershipService::new(pool.clone());
    let second = MembershipService::new(pool.clone());
    let (a, b) = tokio::join!(
        first.request_membership(&member, gym_id, plan_id),
        second.request_membership(&member, gym_id, plan_id),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(AppError::Conflict(_)))));

    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM memberships WHERE member_id = $1 AND gym_id = $2 AND status = 'pending'",
    )
    .bind(member.user_id)
    .bind(gym_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pending, 1);
}

/// `member_count` of `gym_id` in the listing, `None` when it is not listed
async fn listed_member_count(gyms: &GymService, query: GymListQuery, gym_id: Uuid) -> Option<i64> {
    gyms.list_available(&query)
        .await
        .unwrap()
        .into_iter()
        .find(|gym| gym.id == gym_id)
        .map(|gym| gym.member_count)
}

#[tokio::test]
#[serial]
async fn test_membership_window_and_entry_dates_use_utc_today() {
    let Some(pool) = test_pool().await else { return };
    let (owner, gym_id, plan_id) = approved_gym(&pool).await;
    let (_, member) = register(&pool, "late_shift", UserType::Member).await;

    let memberships = MembershipService::new(pool.clone());
    let request = memberships
        .request_membership(&member, gym_id, plan_id)
        .await
        .unwrap();
    memberships.approve(request.id, &owner).await.unwrap();

    let gyms = GymService::new(pool.clone());
    let gym_name = gyms.get_gym(gym_id).await.unwrap().unwrap().name;
    let by_name = || GymListQuery {
        city: None,
        search: Some(gym_name.clone()),
    };

    let today = Utc::now().date_naive();
    for (end_date, expected) in [(today, 1), (today - Duration::days(1), 0)] {
        sqlx::query("UPDATE memberships SET end_date = $1 WHERE id = $2")
            .bind(end_date)
            .bind(request.id)
            .execute(&pool)
            .await
            .unwrap();
        assert_eq!(
            listed_member_count(&gyms, by_name(), gym_id).await,
            Some(expected),
            "end date {}",
            end_date
        );
    }

    // Wildcards in the city filter are literal.
    let wildcard = GymListQuery {
        city: Some("_".to_string()),
        search: None,
    };
    assert_eq!(listed_member_count(&gyms, wildcard, gym_id).await, None);

    let entry = ExerciseEntryService::new(pool.clone())
        .create(
            &member,
            CreateExerciseEntryRequest {
                exercise_name: "Night Run".to_string(),
                exercise_type: None,
                body_part: None,
                duration_minutes: 20,
                calories_burned: 180,
                sets: None,
                reps: None,
                weight_kg: None,
                notes: None,
                date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(entry.date, Utc::now().date_naive());
}

async fn profile_status(pool: &PgPool, access: &str) -> StatusCode {
    let app = create_app(
        AppState::new(pool.clone(), auth_service(pool)),
        &AppConfig::default(),
    );
    let request = Request::builder()
        .uri("/api/auth/profile/")
        .header(header::AUTHORIZATION, format!("Bearer {}", access))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap().status()
}

#[tokio::test]
#[serial]
async fn test_tokens_of_removed_accounts_stop_working() {
    let Some(pool) = test_pool().await else { return };

    let (member_auth, member) = register(&pool, "lapsed", UserType::Member).await;
    assert_eq!(profile_status(&pool, &member_auth.access).await, StatusCode::OK);

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(member.user_id)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(profile_status(&pool, &member_auth.access).await, StatusCode::UNAUTHORIZED);

    let (owner_auth, owner) = register(&pool, "closing", UserType::GymOwner).await;
    let gyms = GymService::new(pool.clone());
    gyms.register_gym(owner.user_id, gym_request(&unique("Last Rep")))
        .await
        .unwrap();
    let deleted = gyms.delete_my_gym(&owner).await.unwrap();
    assert_eq!(deleted["account_deleted"], true);

    assert_eq!(profile_status(&pool, &owner_auth.access).await, StatusCode::UNAUTHORIZED);
    assert_matches!(
        auth_service(&pool).validate_session(&owner_auth.access).await,
        Err(AuthError::InvalidToken)
    );
}
