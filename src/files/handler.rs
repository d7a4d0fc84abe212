//! # Handler de Archivos
//! src/files/handler.rs
//!
//! Mapea el target del request a una operación del `FileManager`:
//!
//! | Request         | Operación                         | Éxito            |
//! |-----------------|-----------------------------------|------------------|
//! | `GET /`         | listado JSON de archivos          | 200 + `["a"]`    |
//! | `GET /<name>`   | lectura bajo lock de lectura      | 200 + contenido  |
//! | `POST /<name>`  | escritura bajo lock de escritura  | 200 vacío        |
//! | otro método     | ninguna                           | 400              |
//!
//! Nombres con separadores de ruta se rechazan con 400 antes de tocar el
//! sistema de archivos. La query string del target se ignora.

use super::manager::{is_flat_name, FileManager};
use crate::handler::{Handler, HandlerError};
use crate::http::{Request, Response, StatusCode};
use std::io;
use tracing::{info, warn};

/// Cómo se reportan los fallos de escritura del sistema de archivos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoFailurePolicy {
    /// Todo fallo de escritura es 400
    #[default]
    Lenient,

    /// Todo fallo de escritura es 500
    Strict,
}

impl IoFailurePolicy {
    fn classify_write_error(self, err: io::Error) -> HandlerError {
        match self {
            IoFailurePolicy::Lenient => HandlerError::Rejected(err),
            IoFailurePolicy::Strict => HandlerError::Io(err),
        }
    }
}

/// Handler que sirve un directorio plano
#[derive(Debug)]
pub struct FileHandler {
    manager: FileManager,
    policy: IoFailurePolicy,
}

impl FileHandler {
    pub fn new(manager: FileManager, policy: IoFailurePolicy) -> Self {
        Self { manager, policy }
    }

    pub fn manager(&self) -> &FileManager {
        &self.manager
    }

    /// `None` para la raíz; `Some(nombre)` para un archivo
    fn target_name(request: &Request) -> Result<Option<&str>, HandlerError> {
        let path = request.path();
        if path == "/" {
            return Ok(None);
        }

        match path.strip_prefix('/') {
            Some(name) if is_flat_name(name) => Ok(Some(name)),
            _ => Err(HandlerError::BadTarget(path.to_string())),
        }
    }
}

impl Handler for FileHandler {
    fn do_get(&self, request: &Request) -> Result<Response, HandlerError> {
        let Some(name) = Self::target_name(request)? else {
            let files = self.manager.list()?;
            let body = serde_json::to_string(&files).map_err(io::Error::from)?;
            return Ok(Response::json(&body));
        };

        match self.manager.read(name) {
            Ok(data) => Ok(Response::text(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(HandlerError::NotFound(name.to_string()))
            }
            Err(e) => Err(HandlerError::Io(e)),
        }
    }

    fn do_post(&self, request: &Request) -> Result<Response, HandlerError> {
        let name = Self::target_name(request)?
            .ok_or_else(|| HandlerError::BadTarget(request.path().to_string()))?;

        if let Err(e) = self.manager.write(name, request.body()) {
            warn!(name, error = %e, "fallo al escribir archivo");
            return Err(self.policy.classify_write_error(e));
        }

        info!(name, bytes = request.body().len(), "archivo actualizado");
        Ok(Response::new(StatusCode::Ok))
    }

    fn do_other(&self, request: &Request) -> Result<Response, HandlerError> {
        Err(HandlerError::UnsupportedMethod(request.method().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::dispatch;
    use crate::http::LineReader;
    use std::fs;
    use tempfile::TempDir;

    fn handler(policy: IoFailurePolicy) -> (TempDir, FileHandler) {
        let dir = TempDir::new().unwrap();
        let manager = FileManager::new(dir.path()).unwrap();
        (dir, FileHandler::new(manager, policy))
    }

    fn handle(handler: &FileHandler, raw: &[u8]) -> Response {
        let request = Request::read_from(&mut LineReader::new(raw)).unwrap().unwrap();
        dispatch(handler, &request).unwrap_or_else(|e| e.to_response())
    }

    fn post(name: &str, body: &str) -> Vec<u8> {
        format!("POST /{} HTTP/1.0\r\nContent-Length: {}\r\n\r\n{}", name, body.len(), body).into_bytes()
    }

    #[test]
    fn test_list_empty_root() {
        let (_dir, handler) = handler(IoFailurePolicy::Lenient);
        let response = handle(&handler, b"GET / HTTP/1.0\r\n\r\n");

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body(), b"[]");
    }

    #[test]
    fn test_list_skips_directories() {
        let (dir, handler) = handler(IoFailurePolicy::Lenient);
        fs::write(dir.path().join("a"), "1").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let response = handle(&handler, b"GET /?verbose=1 HTTP/1.0\r\n\r\n");
        let files: Vec<String> = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(files, vec!["a"]);
    }

    #[test]
    fn test_round_trip() {
        let (_dir, handler) = handler(IoFailurePolicy::Lenient);

        let response = handle(&handler, &post("42", "mooooooo"));
        assert_eq!(response.status(), StatusCode::Ok);
        assert!(response.body().is_empty());

        let response = handle(&handler, b"GET /42 HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"mooooooo");
    }

    #[test]
    fn test_get_missing_is_404() {
        let (_dir, handler) = handler(IoFailurePolicy::Lenient);
        let response = handle(&handler, b"GET /missing HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_get_directory_is_404() {
        let (dir, handler) = handler(IoFailurePolicy::Lenient);
        fs::create_dir(dir.path().join("sub")).unwrap();
        let response = handle(&handler, b"GET /sub HTTP/1.0\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NotFound);
    }

    #[test]
    fn test_separators_rejected_before_filesystem() {
        let (dir, handler) = handler(IoFailurePolicy::Lenient);
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("file"), "secret").unwrap();

        for target in ["/../etc/passwd", "/sub/file", "/a\\b", "/..", "no-slash"] {
            let raw = format!("GET {} HTTP/1.0\r\n\r\n", target);
            assert_eq!(handle(&handler, raw.as_bytes()).status(), StatusCode::BadRequest, "{}", target);
        }

        let response = handle(&handler, &post("sub/file", "overwrite"));
        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(fs::read_to_string(dir.path().join("sub").join("file")).unwrap(), "secret");
    }

    #[test]
    fn test_post_root_is_400() {
        let (_dir, handler) = handler(IoFailurePolicy::Lenient);
        let response = handle(&handler, b"POST / HTTP/1.0\r\nContent-Length: 1\r\n\r\nx");
        assert_eq!(response.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_write_failure_lenient_is_400() {
        let (dir, handler) = handler(IoFailurePolicy::Lenient);
        fs::create_dir(dir.path().join("taken")).unwrap();
        let response = handle(&handler, &post("taken", "x"));
        assert_eq!(response.status(), StatusCode::BadRequest);
    }

    #[test]
    fn test_write_failure_strict_is_500() {
        let (dir, handler) = handler(IoFailurePolicy::Strict);
        fs::create_dir(dir.path().join("taken")).unwrap();
        let response = handle(&handler, &post("taken", "x"));
        assert_eq!(response.status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_other_method() {
        let (dir, handler) = handler(IoFailurePolicy::Lenient);
        let response = handle(&handler, b"DELETE /a HTTP/1.0\r\n\r\n");

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(response.body(), br#"{"error":"Unsupported method: DELETE"}"#);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
