use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;

use crate::errors::AppError;

pub mod account;
pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod financial;
pub mod orders;
pub mod pages;
pub mod products;
pub mod services;
pub mod terms;

/// Registers every API and page route. Static files are mounted by the
/// caller after this so they never shadow a route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid path parameter: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::Validation(format!("Invalid query string: {}", err)).into()
    }))
    .service(health_handler)
    .service(auth::register_handler)
    .service(auth::login_handler)
    .service(auth::logout_handler)
    .service(auth::forgot_password_handler)
    .service(auth::reset_password_handler)
    .service(account::get_profile_handler)
    .service(account::update_profile_handler)
    .service(account::change_password_handler)
    .service(account::delete_user_handler)
    .service(account::delete_company_handler)
    .service(products::create_handler)
    .service(products::list_handler)
    .service(products::update_handler)
    .service(products::delete_handler)
    .service(clients::create_handler)
    .service(clients::list_handler)
    .service(clients::update_handler)
    .service(clients::delete_handler)
    .service(services::create_handler)
    .service(services::list_handler)
    .service(services::update_handler)
    .service(services::delete_handler)
    .service(orders::create_handler)
    .service(orders::list_handler)
    .service(orders::update_handler)
    .service(orders::delete_handler)
    .service(financial::create_entry_handler)
    .service(financial::list_entries_handler)
    .service(financial::update_entry_handler)
    .service(financial::delete_entry_handler)
    .service(financial::create_exit_handler)
    .service(financial::list_exits_handler)
    .service(financial::update_exit_handler)
    .service(financial::delete_exit_handler)
    .service(terms::get_handler)
    .service(terms::put_handler)
    .service(dashboard::summary_handler)
    .service(pages::page_handler);
}

/// Health check for hosting providers.
#[get("/")]
pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}

/// Optional body of scoped deletes.
#[derive(Deserialize, Default)]
pub struct ScopeBody {
    pub company_id: Option<i64>,
}

/// Reads the `company_id` a delete may carry. An empty body names none; a body
/// that is present must be valid JSON.
pub(crate) fn scope_from_body(body: &web::Bytes) -> Result<Option<i64>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice::<ScopeBody>(body)
        .map(|scope| scope.company_id)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}

pub(crate) fn required<T>(value: Option<T>, msg: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(msg.to_owned()))
}

pub(crate) fn non_negative<T>(value: Option<T>, field: &str) -> Result<Option<T>, AppError>
where
    T: PartialOrd + Default + Copy,
{
    match value {
        Some(v) if v < T::default() => Err(AppError::Validation(format!(
            "{} must not be negative",
            field
        ))),
        other => Ok(other),
    }
}

/// Maps zero affected rows to a 404 with `msg`.
pub(crate) fn found(rows: u64, msg: &str) -> Result<(), AppError> {
    if rows == 0 {
        Err(AppError::NotFound(msg.to_owned()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_values_are_rejected() {
        assert!(non_negative(Some(-1.0), "Price").is_err());
        assert_eq!(non_negative(Some(0_i64), "Stock").unwrap(), Some(0));
        assert_eq!(non_negative::<f64>(None, "Price").unwrap(), None);
    }

    #[test]
    fn delete_body_is_optional_but_must_parse() {
        assert_eq!(scope_from_body(&web::Bytes::new()).unwrap(), None);
        assert_eq!(scope_from_body(&web::Bytes::from_static(b"{}")).unwrap(), None);
        assert_eq!(
            scope_from_body(&web::Bytes::from_static(br#"{"company_id": 4}"#)).unwrap(),
            Some(4)
        );
        assert!(matches!(
            scope_from_body(&web::Bytes::from_static(b"{company_id")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn zero_rows_is_not_found() {
        assert!(matches!(found(0, "gone"), Err(AppError::NotFound(m)) if m == "gone"));
        assert!(found(1, "gone").is_ok());
    }
}
