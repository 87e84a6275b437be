pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod model;
pub mod session;
pub mod ui;

use actix_identity::{CookieIdentityPolicy, IdentityService};

pub const AUTH_COOKIE: &str = "auth-cookie";

pub fn identity_service(key: &[u8], secure: bool) -> IdentityService<CookieIdentityPolicy> {
    IdentityService::new(
        CookieIdentityPolicy::new(key)
            .name(AUTH_COOKIE)
            .secure(secure),
    )
}
