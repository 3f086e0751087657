use std::{io, sync::Arc};

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_web::{
    http::Method,
    middleware,
    web::{self, Data},
    App, HttpResponse, HttpServer,
};
use log::info;

use mstech::{
    config::Config,
    db,
    errors::AppError,
    mailer::{LogMailer, Mailer, SmtpMailer},
    routes, session, AppState,
};

fn io_error<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("FATAL: invalid configuration: {}", e);
        io_error(e)
    })?;

    let db_pool = db::connect(&config.database_url).await.map_err(io_error)?;
    db::migrate(&db_pool).await.map_err(|e| {
        log::error!("FATAL: migration failed: {}", e);
        io_error(e)
    })?;
    info!("Database migrated successfully");
    routes::auth::prepare_dummy_hash().await.map_err(io_error)?;

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            let mailer = SmtpMailer::from_config(smtp, &config.mail_from).map_err(|e| {
                log::error!("FATAL: invalid SMTP settings: {}", e);
                io_error(e)
            })?;
            info!("Sending mail through {}:{}", smtp.host, smtp.port);
            Arc::new(mailer)
        }
        None => {
            log::warn!("SMTP_HOST not set, outgoing mail is only logged");
            Arc::new(LogMailer::new())
        }
    };

    let state = AppState {
        db_pool,
        mailer,
        frontend_url: config.frontend_url.clone(),
        reset_token_ttl: chrono::Duration::minutes(config.reset_token_ttl_minutes),
    };

    let session_key = config.session_key.clone();
    let cookie_secure = config.cookie_secure;
    let static_dir = config.static_dir.clone();

    info!("Starting HTTP server on http://{}:{}/", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(IdentityMiddleware::default())
            .wrap(session::session_middleware(session_key.clone(), cookie_secure))
            // always register the Logger middleware last
            .wrap(middleware::Logger::default())
            .app_data(Data::new(state.clone()))
            .configure(routes::configure)
            .service(
                Files::new("/", &static_dir)
                    .index_file("index.html")
                    .default_handler(web::to(default_handler)),
            )
            .default_service(web::to(default_handler))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

async fn default_handler(method: Method) -> Result<HttpResponse, AppError> {
    match method {
        Method::GET | Method::HEAD => Err(AppError::NotFound("Not found".to_owned())),
        _ => Ok(HttpResponse::MethodNotAllowed().finish()),
    }
}
