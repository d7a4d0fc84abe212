//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas HTTP/1.0 y serializarlas a bytes.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 9\r\n
//! Connection: close\r\n
//! \r\n
//! ["a","b"]
//! ```
//!
//! Cada conexión atiende un único request, así que toda respuesta lleva
//! `Connection: close` y el servidor cierra el socket después de enviarla.

use super::StatusCode;
use serde::Serialize;
use std::collections::HashMap;

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!("httpfs/", env!("CARGO_PKG_VERSION"));

/// Cuerpo fijo de las respuestas 500
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers HTTP; un nombre repetido sobrescribe el anterior
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl Response {
    /// Crea una respuesta vacía con el código de estado especificado
    ///
    /// `Content-Length: 0` queda establecido desde el inicio.
    ///
    /// # Ejemplo
    /// ```
    /// use httpfs::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok);
    /// assert!(response.body().is_empty());
    /// ```
    pub fn new(status: StatusCode) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Length".to_string(), "0".to_string());
        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta (builder)
    ///
    /// Si el header ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo desde un string y actualiza `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes y actualiza `Content-Length`
    ///
    /// # Ejemplo
    /// ```
    /// use httpfs::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_body_bytes(b"moo".to_vec());
    /// assert_eq!(response.header("Content-Length"), Some("3"));
    /// ```
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());
        self
    }

    /// Respuesta 200 con `Content-Type: application/json`
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Respuesta 200 con el contenido crudo de un archivo
    pub fn text(body: Vec<u8>) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body_bytes(body)
    }

    /// Respuesta de error con cuerpo JSON `{"error": "mensaje"}`
    ///
    /// El mensaje se serializa con `serde_json`, así que comillas o
    /// barras en el mensaje quedan escapadas correctamente.
    ///
    /// # Ejemplo
    /// ```
    /// use httpfs::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "File not found: a");
    /// assert_eq!(response.body(), br#"{"error":"File not found: a"}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| String::from(r#"{"error":"unknown"}"#));
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&body)
    }

    /// Respuesta 500 con el cuerpo fijo `Internal Server Error`
    pub fn internal_error() -> Self {
        Self::new(StatusCode::InternalServerError)
            .with_header("Content-Type", "text/plain")
            .with_body(INTERNAL_ERROR_BODY)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n` (más `Server` y `Connection: close`)
    /// - Línea vacía: `\r\n`
    /// - Body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        result.extend_from_slice(format!("HTTP/1.0 {}\r\n", self.status).as_bytes());

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        if !self.headers.contains_key("Server") {
            result.extend_from_slice(format!("Server: {}\r\n", SERVER_NAME).as_bytes());
        }
        if !self.headers.contains_key("Connection") {
            result.extend_from_slice(b"Connection: close\r\n");
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
