use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::{companies, users},
    errors::AppError,
    mailer::password_reset_mail,
    session,
    utils::{self, non_blank},
    AppState,
};

const FORGOT_PASSWORD_REPLY: &str =
    "If the email is registered, you will receive a password reset link.";

lazy_static! {
    // verified against when the email is unknown so both paths pay for argon2
    static ref DUMMY_HASH: String = utils::hash_password("dummy-Passw0rd!").unwrap_or_default();
}

/// Builds the dummy hash on a blocking thread so no login request pays for it.
pub async fn prepare_dummy_hash() -> Result<(), AppError> {
    tokio::task::spawn_blocking(|| lazy_static::initialize(&DUMMY_HASH))
        .await
        .map_err(|e| AppError::PasswordError(e.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    name: Option<String>,
    #[serde(alias = "cnpj", alias = "tax_id")]
    tax_id: Option<String>,
    email: Option<String>,
    user_email: Option<String>,
    password: Option<String>,
}

#[post("/register")]
pub async fn register_handler(
    web::Json(form): web::Json<Register>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let (Some(name), Some(tax_id), Some(email), Some(user_email), Some(password)) = (
        non_blank(form.name),
        non_blank(form.tax_id),
        non_blank(form.email),
        non_blank(form.user_email),
        form.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("All fields are required".to_owned()));
    };

    let email = email.to_lowercase();
    let user_email = user_email.to_lowercase();
    if !utils::looks_like_email(&email) || !utils::looks_like_email(&user_email) {
        return Err(AppError::Validation("Invalid email address".to_owned()));
    }
    utils::check_password_strength(&password)?;

    let pwd_hash = utils::hash_password_blocking(password).await?;
    let (company_id, user_id) = companies::register(
        &state.db_pool,
        companies::NewCompany {
            name,
            tax_id,
            email,
        },
        &user_email,
        &pwd_hash,
    )
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Company and user registered successfully",
        "companyId": company_id,
        "userId": user_id,
    })))
}

#[derive(Deserialize)]
pub struct Login {
    email: Option<String>,
    password: Option<String>,
}

#[post("/login")]
pub async fn login_handler(
    web::Json(form): web::Json<Login>,
    state: web::Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    let (Some(email), Some(password)) = (non_blank(form.email), form.password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::Validation("Email and password are required".to_owned()));
    };

    let user = users::get_user_by_email(&state.db_pool, &email.to_lowercase()).await?;

    // unknown email and wrong password must be indistinguishable
    let Some(user) = user else {
        let _ =
            tokio::task::spawn_blocking(move || utils::verify_password(&password, &DUMMY_HASH))
                .await;
        return Err(AppError::InvalidCredentials);
    };
    if !utils::verify_password_blocking(password, user.pwd_hash.clone()).await? {
        log::warn!("Failed login for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }

    session::begin(&request, user.id, user.company_id)?;
    log::info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "userId": user.id,
        "companyId": user.company_id,
    })))
}

#[post("/logout")]
pub async fn logout_handler(request: HttpRequest) -> impl Responder {
    session::end(&request);
    HttpResponse::Ok().json(json!({ "message": "Logged out" }))
}

#[derive(Deserialize)]
pub struct ForgotPassword {
    email: Option<String>,
}

#[post("/forgot-password")]
pub async fn forgot_password_handler(
    web::Json(form): web::Json<ForgotPassword>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let Some(email) = non_blank(form.email) else {
        return Err(AppError::Validation("Email is required".to_owned()));
    };

    let reply = HttpResponse::Ok().json(json!({ "message": FORGOT_PASSWORD_REPLY }));

    let Some(user) = users::get_user_by_email(&state.db_pool, &email.to_lowercase()).await? else {
        return Ok(reply);
    };

    let token = utils::generate_reset_token();
    let expires = Utc::now() + state.reset_token_ttl;
    users::set_reset_token(&state.db_pool, user.id, &token, expires).await?;

    let reset_url = format!(
        "{}/reset-password.html?token={}",
        state.frontend_url.trim_end_matches('/'),
        token
    );
    let mail = password_reset_mail(&user.email, &reset_url, state.reset_token_ttl.num_minutes());
    state
        .mailer
        .send(&mail)
        .await
        .map_err(|e| AppError::MailError(e.to_string()))?;

    Ok(reply)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPassword {
    token: Option<String>,
    new_password: Option<String>,
}

#[post("/reset-password")]
pub async fn reset_password_handler(
    web::Json(form): web::Json<ResetPassword>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let (Some(token), Some(new_password)) = (
        non_blank(form.token),
        form.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation(
            "Token and new password are required".to_owned(),
        ));
    };
    utils::check_password_strength(&new_password)?;

    let user = users::get_user_by_reset_token(&state.db_pool, &token)
        .await?
        .ok_or(AppError::InvalidToken)?;

    let expired = user.reset_expires.map_or(true, |expires| expires <= Utc::now());
    if expired {
        log::warn!("Expired reset token used for user {}", user.id);
        return Err(AppError::InvalidToken);
    }

    let pwd_hash = utils::hash_password_blocking(new_password).await?;
    // another request may have spent the token while we were hashing
    if !users::redeem_reset_token(&state.db_pool, user.id, &token, &pwd_hash).await? {
        log::warn!("Reset token for user {} was already used", user.id);
        return Err(AppError::InvalidToken);
    }
    log::info!("Password reset for user {}", user.id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Password reset successfully" })))
}
