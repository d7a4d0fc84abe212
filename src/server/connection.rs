//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Ciclo de vida de cada conexión aceptada (un thread por conexión):
//!
//! 1. Framing del request desde el socket
//! 2. Verificación del header `Host`
//! 3. Despacho al `Handler`
//! 4. Escritura de la respuesta y cierre
//!
//! Ningún error sale de aquí hacia el listener: todo se convierte en una
//! respuesta completa. La conexión nunca se reutiliza.

use crate::handler::{dispatch, Handler};
use crate::http::{LineReader, Request, Response, StatusCode};
use std::io::{self, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Estado compartido por todos los threads de conexión
#[derive(Debug)]
pub struct ConnectionContext<H> {
    handler: H,

    /// Host configurado (ej: "127.0.0.1" o "localhost")
    host: String,

    /// Dirección real del listener
    local_addr: SocketAddr,
}

impl<H: Handler> ConnectionContext<H> {
    pub fn new(handler: H, host: impl Into<String>, local_addr: SocketAddr) -> Self {
        Self {
            handler,
            host: host.into(),
            local_addr,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Verifica que el header `Host` apunte a este servidor
    ///
    /// Sin header se acepta (HTTP/1.0 no lo exige). Con header, el nombre
    /// debe ser el host configurado, la IP del listener o `localhost` si el
    /// listener es loopback; si trae puerto, debe ser el del listener.
    pub fn accepts_host(&self, header: Option<&str>) -> bool {
        let Some(value) = header else {
            return true;
        };
        let (name, port) = split_host_port(value.trim());

        if let Some(port) = port {
            if port.parse::<u16>().ok() != Some(self.local_addr.port()) {
                return false;
            }
        }

        let ip = self.local_addr.ip();
        ip.is_unspecified()
            || name.eq_ignore_ascii_case(&self.host)
            || name.parse::<IpAddr>().ok() == Some(ip)
            || (ip.is_loopback() && name.eq_ignore_ascii_case("localhost"))
    }
}

/// Separa `host[:port]`, incluyendo IPv6 entre corchetes
fn split_host_port(value: &str) -> (&str, Option<&str>) {
    if let Some(rest) = value.strip_prefix('[') {
        if let Some((host, tail)) = rest.split_once(']') {
            return (host, tail.strip_prefix(':'));
        }
    }
    match value.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => (host, Some(port)),
        _ => (value, None),
    }
}

/// Atiende una conexión completa y la cierra
///
/// Sólo retorna error si falla la escritura de la respuesta.
pub fn handle_connection<H: Handler>(stream: TcpStream, context: &ConnectionContext<H>) -> io::Result<()> {
    let start = Instant::now();
    let mut reader = LineReader::new(&stream);

    let response = match Request::read_from(&mut reader) {
        Ok(Some(request)) => respond(&request, context),
        Ok(None) => {
            debug!("conexión cerrada sin request");
            return Ok(());
        }
        Err(e) => {
            warn!(error = %e, "error de framing");
            Response::internal_error()
        }
    };

    let mut writer = &stream;
    writer.write_all(&response.to_bytes())?;
    writer.flush()?;
    // El peer puede haber cerrado ya; no hay nada más que hacer
    let _ = stream.shutdown(Shutdown::Both);

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    info!(status = response.status().as_u16(), elapsed_ms, "respuesta enviada");
    Ok(())
}

/// Verifica el host y despacha; cualquier fallo se vuelve respuesta
fn respond<H: Handler>(request: &Request, context: &ConnectionContext<H>) -> Response {
    info!(method = %request.method(), target = request.target(), "request recibido");

    if !context.accepts_host(request.header("Host")) {
        debug!(host = ?request.header("Host"), "host no coincide");
        return Response::error(StatusCode::NotFound, "Unknown host");
    }

    match panic::catch_unwind(AssertUnwindSafe(|| dispatch(context.handler(), request))) {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            if e.status().is_server_error() {
                error!(error = %e, "error del handler");
            } else {
                debug!(error = %e, "request rechazado");
            }
            e.to_response()
        }
        Err(_) => {
            error!("pánico en el handler");
            Response::internal_error()
        }
    }
}
