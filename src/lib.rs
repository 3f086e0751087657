#[macro_use]
extern crate lazy_static;

use std::sync::Arc;

use sqlx::SqlitePool;
use tera::Tera;

pub mod config;
pub mod db;
pub mod errors;
pub mod mailer;
pub mod routes;
pub mod session;
pub mod structs;
pub mod utils;

use mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub mailer: Arc<dyn Mailer>,
    pub frontend_url: String,
    pub reset_token_ttl: chrono::Duration,
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let dir = std::env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_owned());
        let mut tera = match Tera::new(&format!("{}/**/*", dir)) {
            Ok(t) => t,
            Err(e) => {
                log::error!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera
    };
}
