pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use errors::AuthError;
pub use jwt::{extract_bearer_token, JwtService};
pub use middleware::{
    admin_only_middleware, cors_layer, jwt_auth_middleware, rate_limit_middleware,
    require_user_type, security_headers_layer, RateLimiter,
};
pub use models::*;
pub use password::{hash_password, validate_password_strength, verify_password, PasswordPolicy};
pub use service::AuthService;
