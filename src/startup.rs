use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AccessGate, AuthPolicy, TokenIssuer};
use crate::configuration::JwtSettings;
use crate::middleware::{GateMiddleware, LoggerMiddleware};
use crate::routes::{
    create_group, create_transaction, get_group, get_user, health_check, list_all_transactions,
    list_group_transactions, list_user_transactions, list_users, login, logout, register,
    register_admin,
};
use crate::store::Store;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let store: web::Data<dyn Store> = web::Data::from(store);
    let issuer = TokenIssuer::new(&jwt_config);
    let gate = AccessGate::from_issuer(issuer.clone());

    let issuer_data = web::Data::new(issuer);
    let gate_data = web::Data::new(gate.clone());

    let server = HttpServer::new(move || {
        let admin_only = || GateMiddleware::new(gate.clone(), AuthPolicy::AdminOnly);
        let anonymous = || GateMiddleware::new(gate.clone(), AuthPolicy::Anonymous);

        App::new()
            .wrap(LoggerMiddleware)
            // Shared state
            .app_data(store.clone())
            .app_data(issuer_data.clone())
            .app_data(gate_data.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    // Public routes
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/logout", web::get().to(logout))
                    // Fixed-policy routes, guarded by middleware
                    .service(
                        web::resource("/admin")
                            .wrap(admin_only())
                            .route(web::post().to(register_admin)),
                    )
                    .service(
                        web::resource("/users")
                            .wrap(admin_only())
                            .route(web::get().to(list_users)),
                    )
                    .service(
                        web::resource("/transactions")
                            .wrap(admin_only())
                            .route(web::get().to(list_all_transactions)),
                    )
                    .service(
                        web::resource("/groups")
                            .wrap(anonymous())
                            .route(web::post().to(create_group)),
                    )
                    // Target-dependent policies, checked in the handler
                    .route("/users/{username}", web::get().to(get_user))
                    .service(
                        web::resource("/users/{username}/transactions")
                            .route(web::get().to(list_user_transactions))
                            .route(web::post().to(create_transaction)),
                    )
                    .route("/groups/{name}", web::get().to(get_group))
                    .route(
                        "/groups/{name}/transactions",
                        web::get().to(list_group_transactions),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
