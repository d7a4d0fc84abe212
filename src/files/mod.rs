//! # Servidor de Archivos
//!
//! Handler concreto sobre un directorio plano:
//!
//! - `lock`: lock lector/escritor con prioridad a escritores
//! - `manager`: listado, lectura y escritura bajo el lock
//! - `handler`: traduce requests HTTP a operaciones del manager

pub mod handler;
pub mod lock;
pub mod manager;

pub use handler::{FileHandler, IoFailurePolicy};
pub use lock::{FileLock, ReadGuard, WriteGuard};
pub use manager::{is_flat_name, FileManager};
