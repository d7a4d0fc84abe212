//! # Abstracción de Handlers
//! src/handler/mod.rs
//!
//! Separa el transporte (framing y despacho por método) de la semántica del
//! dominio. Un handler implementa exactamente tres operaciones:
//!
//! ```text
//! Request → dispatch → do_get | do_post | do_other → Response
//! ```
//!
//! `dispatch` es lógica compartida y no se sobrescribe: vive fuera del trait.

use crate::http::{Method, Request, Response, StatusCode};
use std::io;
use thiserror::Error;
use tracing::debug;

/// Contrato de un handler de requests
///
/// Se comparte entre todos los threads de conexión, por eso `Send + Sync`.
pub trait Handler: Send + Sync {
    /// Maneja un request `GET`
    fn do_get(&self, request: &Request) -> Result<Response, HandlerError>;

    /// Maneja un request `POST`
    fn do_post(&self, request: &Request) -> Result<Response, HandlerError>;

    /// Maneja cualquier otro método
    fn do_other(&self, request: &Request) -> Result<Response, HandlerError>;
}

/// Llama exactamente a una de las operaciones del handler según el método
///
/// # Ejemplo
/// ```
/// use httpfs::handler::{dispatch, Handler, HandlerError};
/// use httpfs::http::{LineReader, Request, Response, StatusCode};
///
/// struct Hello;
///
/// impl Handler for Hello {
///     fn do_get(&self, _req: &Request) -> Result<Response, HandlerError> {
///         Ok(Response::new(StatusCode::Ok).with_body("hello"))
///     }
///     fn do_post(&self, req: &Request) -> Result<Response, HandlerError> {
///         Err(HandlerError::BadTarget(req.target().to_string()))
///     }
///     fn do_other(&self, req: &Request) -> Result<Response, HandlerError> {
///         Err(HandlerError::UnsupportedMethod(req.method().to_string()))
///     }
/// }
///
/// let mut reader = LineReader::new(&b"GET / HTTP/1.0\r\n\r\n"[..]);
/// let request = Request::read_from(&mut reader).unwrap().unwrap();
/// let response = dispatch(&Hello, &request).unwrap();
/// assert_eq!(response.body(), b"hello");
/// ```
pub fn dispatch<H: Handler + ?Sized>(handler: &H, request: &Request) -> Result<Response, HandlerError> {
    debug!(%request, "despachando request");

    match request.method() {
        Method::Get => handler.do_get(request),
        Method::Post => handler.do_post(request),
        Method::Other(_) => handler.do_other(request),
    }
}

/// Errores que un handler convierte en respuesta HTTP
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Target con forma no permitida (separadores, `..`, etc.)
    #[error("Invalid target: {0}")]
    BadTarget(String),

    /// Archivo inexistente
    #[error("File not found: {0}")]
    NotFound(String),

    /// Método distinto de GET/POST
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Fallo de escritura atribuido al cliente
    #[error("Write failed: {0}")]
    Rejected(#[source] io::Error),

    /// Fallo de E/S del servidor
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
}

impl HandlerError {
    /// Código de estado para cada tipo de error
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::BadTarget(_)
            | HandlerError::UnsupportedMethod(_)
            | HandlerError::Rejected(_) => StatusCode::BadRequest,
            HandlerError::NotFound(_) => StatusCode::NotFound,
            HandlerError::Io(_) => StatusCode::InternalServerError,
        }
    }

    /// Construye la respuesta de error
    ///
    /// Los 500 llevan el cuerpo fijo `Internal Server Error`; el resto, un
    /// JSON `{"error": "..."}` con el mensaje.
    pub fn to_response(&self) -> Response {
        match self.status() {
            StatusCode::InternalServerError => Response::internal_error(),
            status => Response::error(status, &self.to_string()),
        }
    }
}
