use std::env;
use std::sync::Arc;

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use mono_http::server::Server;
use mono_web::{Greeting, RequireAuthorization, Router};

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_owned());

    let router = Router::builder().route("/myhandler", RequireAuthorization::new(Greeting)).build();

    let server = Server::new();
    let shutdown = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            shutdown.close().await;
        }
    });

    info!(port, "server started");
    if let Err(e) = server.listen_and_serve(format!("127.0.0.1:{port}"), Arc::new(router)).await {
        error!(cause = %e, "serve failed");
    }
}
