//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! 1. Escucha en un puerto (`tcp`)
//! 2. Acepta conexiones y crea un thread por cada una
//! 3. Lee el request, despacha al handler y envía la respuesta (`connection`)
//! 4. Cierra la conexión

pub mod connection;
pub mod tcp;

pub use connection::{handle_connection, ConnectionContext};
pub use tcp::Server;
