//! Server-side page router.
//!
//! `GET /pages/{name}` answers an HTML fragment for the single-page shell to
//! inject. Public pages are plain fragments; protected pages are rendered
//! from the store for the session's company and redirect to the login page
//! when there is no session.

use actix_web::{get, http::header, web, HttpResponse, Responder};
use serde::Deserialize;
use tera::Context;

use crate::{
    db::{
        clients, companies,
        financial::{self, FinancialKind},
        orders, products, services, terms,
    },
    errors::AppError,
    routes::{dashboard::summarize, terms::DEFAULT_TERMS},
    session::TenantSession,
    AppState, TEMPLATES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Dashboard,
    Products,
    Clients,
    Services,
    Orders,
    Terms,
    Financial,
    Profile,
    Unknown,
}

impl Page {
    /// Accepts the Portuguese names the first frontend used as well.
    pub fn from_name(name: &str) -> Page {
        match name {
            "login" => Page::Login,
            "register" => Page::Register,
            "forgot-password" => Page::ForgotPassword,
            "reset-password" => Page::ResetPassword,
            "dashboard" => Page::Dashboard,
            "products" | "produtos" => Page::Products,
            "clients" | "clientes" => Page::Clients,
            "services" | "servicos" => Page::Services,
            "orders" | "ordem" => Page::Orders,
            "terms" | "termos" => Page::Terms,
            "financial" | "financeiro" => Page::Financial,
            "profile" => Page::Profile,
            _ => Page::Unknown,
        }
    }

    pub fn is_protected(self) -> bool {
        !matches!(
            self,
            Page::Login | Page::Register | Page::ForgotPassword | Page::ResetPassword | Page::Unknown
        )
    }

    fn template(self) -> &'static str {
        match self {
            Page::Login => "pages/login.html",
            Page::Register => "pages/register.html",
            Page::ForgotPassword => "pages/forgot-password.html",
            Page::ResetPassword => "pages/reset-password.html",
            Page::Dashboard => "pages/dashboard.html",
            Page::Products => "pages/products.html",
            Page::Clients => "pages/clients.html",
            Page::Services => "pages/services.html",
            Page::Orders => "pages/orders.html",
            Page::Terms => "pages/terms.html",
            Page::Financial => "pages/financial.html",
            Page::Profile => "pages/profile.html",
            Page::Unknown => "pages/placeholder.html",
        }
    }
}

#[derive(Deserialize)]
pub struct PageQuery {
    token: Option<String>,
    month: Option<String>,
}

async fn view_context(
    page: Page,
    tenant: TenantSession,
    query: &PageQuery,
    state: &AppState,
) -> Result<Context, AppError> {
    let pool = &state.db_pool;
    let company_id = tenant.company_id;
    let mut context = Context::new();
    context.insert("company_id", &company_id);
    context.insert("user_id", &tenant.user_id);

    match page {
        Page::Dashboard => {
            context.insert("summary", &summarize(pool, company_id, None).await?);
        }
        Page::Products => context.insert("products", &products::list(pool, company_id).await?),
        Page::Clients => context.insert("clients", &clients::list(pool, company_id).await?),
        Page::Services => context.insert("services", &services::list(pool, company_id).await?),
        Page::Orders => {
            context.insert("orders", &orders::list(pool, company_id).await?);
            context.insert("clients", &clients::list(pool, company_id).await?);
            context.insert("services", &services::list(pool, company_id).await?);
        }
        Page::Terms => {
            let terms = terms::get(pool, company_id).await?;
            match terms {
                Some(terms) => context.insert("terms", &terms),
                None => context.insert("default_terms", DEFAULT_TERMS),
            }
        }
        Page::Financial => {
            let month = match query.month.as_deref().filter(|m| !m.is_empty()) {
                Some(m) => Some(financial::parse_month(m)?),
                None => None,
            };
            let month = month.as_deref();
            context.insert("month", &month);
            context.insert(
                "entries",
                &financial::list(pool, FinancialKind::Entry, company_id, month).await?,
            );
            context.insert(
                "exits",
                &financial::list(pool, FinancialKind::Exit, company_id, month).await?,
            );
            context.insert("summary", &summarize(pool, company_id, month).await?);
        }
        Page::Profile => {
            let company = companies::get(pool, company_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Company not found".to_owned()))?;
            context.insert("company", &company);
        }
        _ => {}
    }
    Ok(context)
}

#[get("/pages/{name}")]
pub async fn page_handler(
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    tenant: Option<TenantSession>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let page = Page::from_name(&path.into_inner());

    let context = match (page.is_protected(), tenant) {
        (true, None) => {
            return Ok(HttpResponse::SeeOther()
                .append_header((header::LOCATION, "/pages/login"))
                .finish());
        }
        (true, Some(tenant)) => view_context(page, tenant, &query, &state).await?,
        (false, _) => {
            let mut context = Context::new();
            if page == Page::ResetPassword {
                context.insert("token", &query.token);
            }
            context
        }
    };

    let rendered = TEMPLATES.render(page.template(), &context).map_err(|e| {
        log::error!("Failed to render template: {}", e);
        AppError::TemplateError(e)
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered))
}
