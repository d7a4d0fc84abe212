//! # Framing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Convierte los bytes de un socket en un `Request` estructurado.
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! POST /42 HTTP/1.0\r\n
//! Host: localhost:8080\r\n
//! Content-Length: 8\r\n
//! \r\n
//! mooooooo
//! ```
//!
//! ## Algoritmo
//!
//! 1. Leer líneas hasta encontrar una línea que sea sólo un terminador.
//! 2. La primera línea es la request line: exactamente tres tokens.
//! 3. El resto son headers `Nombre: Valor`, separados en el primer `:`.
//! 4. Si hay un `Content-Length` válido, leer exactamente esa cantidad de bytes.

use super::reader::{is_blank_line, LineReader};
use std::collections::HashMap;
use std::io::Read;
use thiserror::Error;

/// Método HTTP del request
///
/// La comparación es exacta y sensible a mayúsculas: `get` no es `GET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Listar el directorio o leer un archivo
    Get,

    /// POST - Escribir un archivo
    Post,

    /// Cualquier otro token
    Other(String),
}

impl Method {
    /// Clasifica el token del método
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(token) => token,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores de framing; la conexión no se puede recuperar
#[derive(Debug, Error)]
pub enum FramingError {
    /// La request line no tiene exactamente tres tokens
    #[error("invalid request line: {0:?}")]
    InvalidRequestLine(String),

    /// El tercer token no es `HTTP/<versión>`
    #[error("invalid HTTP version: {0:?}")]
    InvalidVersion(String),

    /// Header sin `:`
    #[error("invalid header: {0:?}")]
    InvalidHeader(String),

    /// El peer cerró antes de la línea en blanco
    #[error("connection closed before end of preamble")]
    Truncated,

    /// El preámbulo no es UTF-8
    #[error("preamble is not valid UTF-8")]
    InvalidEncoding,

    #[error("I/O error while reading request: {0}")]
    Io(#[from] std::io::Error),
}

/// Request line y headers; inmutable una vez construido
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,

    /// Target tal como llegó, incluida la query (ej: "/42?x=1")
    target: String,

    /// Versión HTTP (ej: "HTTP/1.0")
    version: String,

    /// Nombres sensibles a mayúsculas; un nombre repetido sobrescribe
    headers: HashMap<String, String>,
}

impl RequestHead {
    /// Parsea el texto del preámbulo (sin la línea en blanco final)
    ///
    /// # Ejemplo
    /// ```
    /// use httpfs::http::{Method, RequestHead};
    ///
    /// let head = RequestHead::parse("GET /a HTTP/1.0\r\nHost: localhost\r\n").unwrap();
    /// assert_eq!(head.method(), &Method::Get);
    /// assert_eq!(head.target(), "/a");
    /// assert_eq!(head.header("Host"), Some("localhost"));
    /// ```
    pub fn parse(preamble: &str) -> Result<Self, FramingError> {
        let mut lines = preamble
            .split(['\r', '\n'])
            .filter(|line| !line.is_empty());

        let request_line = lines
            .next()
            .ok_or_else(|| FramingError::InvalidRequestLine(String::new()))?;
        let (method, target, version) = Self::parse_request_line(request_line)?;

        let mut headers = HashMap::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| FramingError::InvalidHeader(line.to_string()))?;
            headers.insert(name.trim().to_string(), value.trim().to_string());
        }

        Ok(Self {
            method,
            target,
            version,
            headers,
        })
    }

    /// Formato: `METHOD target HTTP/version`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), FramingError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.len() != 3 {
            return Err(FramingError::InvalidRequestLine(line.to_string()));
        }

        let version = parts[2];
        if !version.starts_with("HTTP/") || version.len() == "HTTP/".len() {
            return Err(FramingError::InvalidVersion(version.to_string()));
        }

        Ok((
            Method::from_token(parts[0]),
            parts[1].to_string(),
            version.to_string(),
        ))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Target sin la query string
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header por nombre exacto
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Longitud del cuerpo declarada; `None` si falta o no es un entero no negativo
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length")?.parse().ok()
    }
}

/// Request completo: head más cuerpo
#[derive(Debug, Clone)]
pub struct Request {
    head: RequestHead,
    body: Vec<u8>,
}

impl Request {
    pub fn new(head: RequestHead, body: Vec<u8>) -> Self {
        Self { head, body }
    }

    /// Lee un request completo desde el stream
    ///
    /// Retorna `Ok(None)` si el peer cerró la conexión sin enviar ningún
    /// byte; un cierre posterior antes de la línea en blanco es
    /// `FramingError::Truncated`.
    pub fn read_from<R: Read>(reader: &mut LineReader<R>) -> Result<Option<Self>, FramingError> {
        let mut preamble = Vec::new();

        loop {
            let line = reader.read_line()?;

            if line.is_empty() {
                if preamble.is_empty() {
                    return Ok(None);
                }
                return Err(FramingError::Truncated);
            }
            if is_blank_line(&line) {
                // Líneas en blanco antes de la request line se ignoran
                if preamble.is_empty() {
                    continue;
                }
                break;
            }
            if !line.ends_with(b"\n") && !line.ends_with(b"\r") {
                return Err(FramingError::Truncated);
            }

            preamble.extend_from_slice(&line);
        }

        let preamble = String::from_utf8(preamble).map_err(|_| FramingError::InvalidEncoding)?;
        let head = RequestHead::parse(&preamble)?;

        let body = match head.content_length() {
            Some(length) => reader.read_exact(length)?,
            None => Vec::new(),
        };

        Ok(Some(Self::new(head, body)))
    }

    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    pub fn method(&self) -> &Method {
        self.head.method()
    }

    pub fn target(&self) -> &str {
        self.head.target()
    }

    pub fn path(&self) -> &str {
        self.head.path()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.header(name)
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Obtiene el body como texto, reemplazando secuencias UTF-8 inválidas
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} ({} headers, {} bytes)",
            self.head.method,
            self.head.target,
            self.head.version,
            self.head.headers.len(),
            self.body.len()
        )
    }
}
