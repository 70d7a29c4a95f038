use std::io;

use actix_web::{middleware, web, App, HttpServer};
use food_tracker::{routes, AppConfig, FoodRepository, MysqlExecutor};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|err| {
        log::error!("event=config_load module=main status=error error={}", err);
        io::Error::new(io::ErrorKind::InvalidInput, err)
    })?;

    // set up database connection pool
    let executor = MysqlExecutor::connect(&config.database).map_err(|err| {
        log::error!("event=db_connect module=main status=error error={}", err);
        io::Error::new(io::ErrorKind::Other, err)
    })?;
    let repository = web::Data::new(FoodRepository::new(executor));

    log::info!(
        "starting HTTP server at http://{}:{}",
        config.host,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(repository.clone())
            .wrap(middleware::Logger::default())
            .configure(routes::configure::<MysqlExecutor>)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
