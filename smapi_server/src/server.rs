use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::info;
use smapi_auth::{memory::InMemoryAccounts, replay::ReplayGuard, traits::AccountResolver, RequestVerifier};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    middleware::HmacAuthMiddlewareFactory,
    routes::{echo, health, whoami},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let accounts = InMemoryAccounts::new(config.auth.accounts.clone());
    info!("🔐️ Serving {} API account(s) from the in-memory store", accounts.len());
    let srv = create_server_instance(config, accounts)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Build the server over any account store. The replay state is created here, once, and shared by
/// every worker — replay suppression must span workers or a replayed request could land on a
/// different worker and pass.
pub fn create_server_instance<B>(config: ServerConfig, accounts: B) -> Result<Server, ServerError>
where B: AccountResolver + Clone + Send + Sync + 'static {
    let replay = ReplayGuard::new();
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let verifier =
            Arc::new(RequestVerifier::new(accounts.clone(), replay.clone(), config.auth.verifier_config()));
        let api_scope = web::scope("/api")
            .wrap(HmacAuthMiddlewareFactory::new(verifier, config.auth.hmac_checks))
            .service(whoami)
            .service(echo);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("smapi::access_log"))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
