//! # httpfs
//! src/lib.rs
//!
//! Servidor de archivos HTTP/1.0 implementado desde cero: framing del
//! request directamente sobre el socket, un thread por conexión y un lock
//! lector/escritor con prioridad a escritores sobre el directorio servido.
//!
//! ## Arquitectura
//!
//! - `http`: lectura de líneas, framing de requests, responses y status codes
//! - `handler`: trait `Handler` y despacho por método
//! - `files`: lock lector/escritor, administrador de archivos y handler concreto
//! - `server`: listener TCP y manejo de cada conexión
//! - `config`: configuración desde CLI y entorno
//! - `logger`: entrega de logs por un thread consumidor
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use httpfs::config::Config;
//! use httpfs::files::{FileHandler, FileManager};
//! use httpfs::server::Server;
//!
//! let config = Config::default();
//! let manager = FileManager::new(&config.dir).expect("directorio inválido");
//! let handler = FileHandler::new(manager, config.io_failure_policy());
//! let server = Server::bind(&config, handler).expect("error al hacer bind");
//! server.run().expect("error del servidor");
//! ```

pub mod config;
pub mod files;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
