pub mod app;
pub mod database;
pub mod seeding;

pub use app::{AppConfig, DEFAULT_JWT_SECRET};
pub use database::{run_migrations, DatabaseConfig};
pub use seeding::{seed_admin, SeedConfig};
