//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración de arranque, desde argumentos CLI y variables de entorno.
//! Se construye una vez antes de hacer bind y no cambia mientras hay tráfico.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./httpfs -v -p 8080 -d ./data
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTPFS_PORT=8080 HTTPFS_DIR=/srv/files ./httpfs
//! ```

use crate::files::IoFailurePolicy;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Puerto por defecto
pub const DEFAULT_PORT: u16 = 8080;

/// Errores de configuración detectados al arrancar
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the given path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("host must not be empty")]
    EmptyHost,
}

/// Configuración de httpfs
#[derive(Debug, Clone, Parser)]
#[command(name = "httpfs")]
#[command(about = "httpfs is a simple file server.")]
#[command(version)]
pub struct Config {
    /// Imprime mensajes de depuración
    #[arg(short, long, env = "HTTPFS_VERBOSE")]
    pub verbose: bool,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "HTTPFS_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTPFS_HOST")]
    pub host: String,

    /// Directorio que se usa para leer/escribir los archivos pedidos
    #[arg(short = 'd', long = "dir", default_value = ".", env = "HTTPFS_DIR")]
    pub dir: PathBuf,

    /// Reporta los fallos de escritura como 500 en lugar de 400
    #[arg(long = "strict-io-errors", env = "HTTPFS_STRICT_IO_ERRORS")]
    pub strict_io_errors: bool,
}

impl Config {
    /// Crea la configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use httpfs::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Política para fallos de escritura
    pub fn io_failure_policy(&self) -> IoFailurePolicy {
        if self.strict_io_errors {
            IoFailurePolicy::Strict
        } else {
            IoFailurePolicy::Lenient
        }
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if !self.dir.is_dir() {
            return Err(ConfigError::NotADirectory(self.dir.clone()));
        }
        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            dir = %self.dir.display(),
            verbose = self.verbose,
            policy = ?self.io_failure_policy(),
            "configuración cargada"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            port: DEFAULT_PORT,
            host: "127.0.0.1".to_string(),
            dir: PathBuf::from("."),
            strict_io_errors: false,
        }
    }
}
