pub mod approval;
pub mod attendance;
pub mod dashboard;
pub mod exercise;
pub mod gym;
pub mod membership;
pub mod notice;
pub mod plan;
pub mod recommendation;
pub mod user;
pub mod validation;

pub use approval::*;
pub use attendance::*;
pub use dashboard::*;
pub use exercise::*;
pub use gym::*;
pub use membership::*;
pub use notice::*;
pub use plan::*;
pub use recommendation::*;
pub use user::*;
