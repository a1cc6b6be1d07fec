use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::TokenCodec;
use crate::logger::RequestLogger;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    account_overview, change_password, delete_user, health_check, login, refresh, register,
    update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    codec: TokenCodec,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let codec_data = web::Data::new(codec.clone());

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(RequestLogger)

            // Shared state
            .app_data(connection.clone())
            .app_data(codec_data.clone())

            // Liveness probe
            .route("/health_check", web::get().to(health_check))

            // Account endpoints. Everything except /me authenticates by
            // request content (credentials or an explicit token), so the
            // bearer middleware wraps only the overview.
            .service(
                web::scope("/api/v1/user")
                    .route("/registration", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/change_password", web::patch().to(change_password))
                    .route("/update_user", web::patch().to(update_user))
                    .route("/delete", web::delete().to(delete_user))
                    .service(
                        web::resource("/me")
                            .wrap(JwtMiddleware::new(codec.clone()))
                            .route(web::get().to(account_overview)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
