#[macro_use]
extern crate diesel;

mod admin;
mod booking;
mod config;
mod database;
mod mail;
mod models;
mod pages;
mod protocol;
mod schema;
mod user;
mod utils;

#[cfg(test)]
mod testing;

use std::{sync::Arc, time::Duration};

use actix_web::{middleware, web, App, HttpServer};

use crate::{config::Config, database::DbPool, mail::Mailer};

pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let config = Config::load()?;
    let pool = database::init_pool(&config.database_url, config.pool_size)?;

    if let (Some(email), Some(password)) = (config.admin_email.clone(), config.admin_password.clone()) {
        let created = database::run(&pool, move |conn| {
            user::ensure_superuser(conn, &email, &password)
        })
        .await?;
        if created {
            log::info!("Superuser created");
        }
    }

    let mailer = mail::from_config(&config.email)?;

    actix_web::rt::spawn(booking::expire::run(
        pool.clone(),
        Duration::from_secs(config.expire_interval_secs),
    ));

    let bind = config.bind_address.clone();
    let state = web::Data::new(AppState {
        pool,
        config,
        mailer,
    });

    log::info!("Listening on {}", bind);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            // user
            .service(web::scope("/user").configure(user::config))
            // booking
            .service(web::scope("/booking").configure(booking::config))
            // staff
            .service(web::scope("/admin").configure(admin::config))
            // pages
            .configure(pages::config)
    })
    .bind(&bind)?
    .run()
    .await?;

    Ok(())
}
