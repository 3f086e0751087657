use actix_identity::{Identity, IdentityExt};
use actix_session::{storage::CookieSessionStore, SessionExt, SessionMiddleware};
use actix_web::{cookie::Key, dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::{db::users, errors::AppError, AppState};

pub const SESSION_COOKIE: &str = "mstech_session";
const COMPANY_KEY: &str = "company_id";

pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(secure)
        .build()
}

/// Attaches the user and their company to the session cookie.
pub fn begin(req: &HttpRequest, user_id: i64, company_id: i64) -> Result<(), AppError> {
    Identity::login(&req.extensions(), user_id.to_string())
        .map_err(|e| AppError::SessionError(e.to_string()))?;
    req.get_session()
        .insert(COMPANY_KEY, company_id)
        .map_err(|e| AppError::SessionError(e.to_string()))?;
    Ok(())
}

pub fn end(req: &HttpRequest) {
    req.get_session().purge();
}

/// The acting user and the tenant every scoped query is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantSession {
    pub user_id: i64,
    pub company_id: i64,
}

impl TenantSession {
    /// Reads the ids the cookie claims; nothing is checked against the store yet.
    fn from_cookie(req: &HttpRequest) -> Result<Self, AppError> {
        let identity = req.get_identity().map_err(|_| unauthenticated())?;
        let user_id = identity
            .id()
            .ok()
            .and_then(|id| id.parse::<i64>().ok())
            .ok_or_else(unauthenticated)?;
        let company_id = req
            .get_session()
            .get::<i64>(COMPANY_KEY)
            .map_err(|e| AppError::SessionError(e.to_string()))?
            .ok_or_else(unauthenticated)?;

        Ok(TenantSession {
            user_id,
            company_id,
        })
    }

    /// A company id named by the caller must be the session's own; anything
    /// else is indistinguishable from a missing row.
    pub fn company(&self, claimed: i64) -> Result<i64, AppError> {
        if claimed == self.company_id {
            Ok(self.company_id)
        } else {
            log::warn!(
                "User {} addressed company {} outside their tenant",
                self.user_id,
                claimed
            );
            Err(AppError::NotFound("Company not found".to_owned()))
        }
    }

    /// Same check for an optional `company_id` body field.
    pub fn company_from_body(&self, claimed: Option<i64>, not_found: &str) -> Result<i64, AppError> {
        match claimed {
            Some(claimed) if claimed != self.company_id => {
                log::warn!(
                    "User {} sent company_id {} outside their tenant",
                    self.user_id,
                    claimed
                );
                Err(AppError::NotFound(not_found.to_owned()))
            }
            _ => Ok(self.company_id),
        }
    }

    pub fn user(&self, claimed: i64) -> Result<i64, AppError> {
        if claimed == self.user_id {
            Ok(self.user_id)
        } else {
            Err(AppError::NotFound("User not found".to_owned()))
        }
    }
}

fn unauthenticated() -> AppError {
    AppError::Unauthorized("Authentication required".to_owned())
}

/// A cookie outlives its user: the user must still exist and still belong to
/// the company the cookie names, otherwise the session is dropped.
async fn verify(req: HttpRequest) -> Result<TenantSession, AppError> {
    let claimed = TenantSession::from_cookie(&req)?;
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::SessionError("application state is not registered".to_owned()))?;

    match users::get_user_by_id(&state.db_pool, claimed.user_id).await? {
        Some(user) if user.company_id == claimed.company_id => Ok(claimed),
        _ => {
            log::warn!(
                "Dropping session of user {} for company {}: account no longer exists",
                claimed.user_id,
                claimed.company_id
            );
            end(&req);
            Err(unauthenticated())
        }
    }
}

impl FromRequest for TenantSession {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        Box::pin(verify(req.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: TenantSession = TenantSession {
        user_id: 7,
        company_id: 3,
    };

    #[test]
    fn path_company_must_match() {
        assert_eq!(SESSION.company(3).unwrap(), 3);
        assert!(matches!(SESSION.company(4), Err(AppError::NotFound(_))));
    }

    #[test]
    fn body_company_is_optional_but_checked() {
        assert_eq!(SESSION.company_from_body(None, "x").unwrap(), 3);
        assert_eq!(SESSION.company_from_body(Some(3), "x").unwrap(), 3);
        assert!(matches!(
            SESSION.company_from_body(Some(1), "Client not found"),
            Err(AppError::NotFound(msg)) if msg == "Client not found"
        ));
    }

    #[test]
    fn user_must_match() {
        assert_eq!(SESSION.user(7).unwrap(), 7);
        assert!(SESSION.user(8).is_err());
    }
}
