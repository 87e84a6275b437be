use crate::database::{DbError, UserDb};
use crate::model::User;
use actix_identity::Identity;
use actix_web::HttpResponse;

pub const AUTH_ROUTE: &str = "/auth";

/// Outcome of the session gate for one request.
#[derive(Debug, PartialEq)]
pub enum Access<T> {
    Allow(T),
    Redirect(&'static str),
}

/// Lets a request through if it carries a session, otherwise sends it to the
/// auth page.
pub fn guard<T>(session: Option<T>) -> Access<T> {
    match session {
        Some(session) => Access::Allow(session),
        None => Access::Redirect(AUTH_ROUTE),
    }
}

/// Temporary redirect, used for every gate decision.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found().header("location", location).finish()
}

/// Maps the identity cookie to the user it names. A cookie for a user that no
/// longer exists is forgotten.
pub fn current_user(id: &Identity, db: &sled::Db) -> Result<Option<(u64, User)>, DbError> {
    let username = match id.identity() {
        Some(username) => username,
        None => return Ok(None),
    };
    let user = db.get_user_by_username(&username)?;
    if user.is_none() {
        log::info!("Session for unknown user {}", username);
        id.forget();
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_session_redirects_to_auth() {
        assert_eq!(guard::<u64>(None), Access::Redirect("/auth"));
    }

    #[test]
    fn session_is_passed_through() {
        assert_eq!(guard(Some("admin")), Access::Allow("admin"));
    }

    #[test]
    fn redirect_is_temporary() {
        let response = redirect("/auth");
        assert_eq!(response.status(), actix_web::http::StatusCode::FOUND);
        assert_eq!(
            response.headers().get("location").unwrap().to_str().unwrap(),
            "/auth"
        );
    }
}
