//! Authentication and authorization module
//!
//! - Token generation and validation (access/refresh pair)
//! - Password hashing with Argon2
//! - Refresh-token cookie handling
//! - The authorization gate middleware
//! - Authentication and user services
//! - User repository over SQLite

pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;

pub use jwt::{create_access_token, create_refresh_token, verify_token, Claims, JwtConfig, TokenKind};
pub use middleware::{auth_middleware, require_role, AuthError, AuthenticatedUser};
pub use models::{
    LoginForm, LoginResponse, RefreshResponse, TokenPair, User, UserCreate, UserInfo, UserPublic,
    UserUpdate,
};
pub use password::{hash_password, verify_password};
pub use repository::{NewUser, RepositoryError, UserChanges, UserRepository};
pub use service::{AuthService, UserService};
