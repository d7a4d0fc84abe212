//! # httpfs - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, arranca el logger y sirve el directorio hasta
//! que el proceso termine.

use anyhow::Context;
use httpfs::config::Config;
use httpfs::files::{FileHandler, FileManager};
use httpfs::logger;
use httpfs::server::Server;

fn main() {
    let config = Config::new();

    let log_queue = match logger::init(config.verbose) {
        Ok(queue) => queue,
        Err(e) => {
            eprintln!("💥 Error fatal: {}", e);
            std::process::exit(1);
        }
    };

    let result = run(&config);

    if let Err(e) = &result {
        let message = format!("{:#}", e);
        tracing::error!(error = %message, "el servidor terminó con error");
    }
    log_queue.shutdown();

    if let Err(e) = result {
        eprintln!("💥 Error fatal: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    config.log_summary();

    let manager = FileManager::new(&config.dir)?;
    let handler = FileHandler::new(manager, config.io_failure_policy());

    let server = Server::bind(config, handler)
        .with_context(|| format!("no se pudo escuchar en {}", config.address()))?;
    server.run()?;

    Ok(())
}
