use std::sync::Arc;

mod config;
mod error;
mod frontcontroller;
mod handler;
mod http;
mod logger;
mod member;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // First argument: config file path without extension
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Multi-thread runtime, sized by `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    logger::log_server_start(&addr, &cfg);
    for prefix in [
        frontcontroller::v3::PREFIX,
        frontcontroller::v4::PREFIX,
    ] {
        logger::log_info(&format!("Serving http://{addr}{prefix}members"));
    }

    let signals = server::SignalHandler::new();
    server::start_signal_handler(&signals);

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            Arc::clone(&signals.shutdown),
        ))
        .await;

    logger::log_info("Server stopped");
    Ok(())
}
