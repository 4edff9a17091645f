pub mod middleware;
pub mod models;
pub mod password;
pub mod tokens;

pub use models::AuthUser;
pub use tokens::{JwtClaims, TokenService};
