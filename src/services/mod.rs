// Business logic services

pub mod approval_service;
pub mod attendance_service;
pub mod dashboard_service;
pub mod exercise_catalog;
pub mod exercise_entry_service;
pub mod gym_service;
pub mod membership_service;
pub mod notice_service;
pub mod plan_service;
pub mod recommendation_service;
pub mod routine_service;
pub mod user_service;

pub use approval_service::ApprovalService;
pub use attendance_service::AttendanceService;
pub use dashboard_service::DashboardService;
pub use exercise_entry_service::ExerciseEntryService;
pub use gym_service::GymService;
pub use membership_service::MembershipService;
pub use notice_service::NoticeService;
pub use plan_service::PlanService;
pub use recommendation_service::ExerciseRecommender;
pub use routine_service::RoutineService;
pub use user_service::UserService;
