//! # Módulo HTTP
//!
//! Protocolo HTTP/1.0 implementado desde cero, sin librerías de alto nivel:
//!
//! - Lectura de líneas y bloques desde el socket
//! - Framing de requests (preámbulo + cuerpo por `Content-Length`)
//! - Construcción de responses
//! - Códigos de estado
//!
//! ## Especificación HTTP/1.0
//!
//! - No requiere el header `Host`
//! - No tiene chunked transfer encoding
//! - Un request por conexión: la respuesta termina el stream
//!
//! ### Formato de Request
//!
//! ```text
//! POST /notes.txt HTTP/1.0\r\n
//! Content-Length: 2\r\n
//! \r\n
//! hi
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Length: 0\r\n
//! Connection: close\r\n
//! \r\n
//! ```

pub mod reader;    // Lectura de líneas y bloques
pub mod request;   // Framing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

pub use reader::LineReader;
pub use request::{FramingError, Method, Request, RequestHead};
pub use response::Response;
pub use status::StatusCode;
