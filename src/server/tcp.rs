//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Listener que acepta conexiones y crea un thread por cada una. No hay pool
//! ni límite de admisión, y ninguna conexión se reutiliza.

use super::connection::{handle_connection, ConnectionContext};
use crate::config::Config;
use crate::handler::Handler;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Servidor HTTP/1.0 concurrente, genérico sobre el handler
pub struct Server<H> {
    listener: TcpListener,
    context: Arc<ConnectionContext<H>>,
}

impl<H: Handler + 'static> Server<H> {
    /// Hace bind en `config.address()`
    ///
    /// Con `port = 0` el sistema elige un puerto libre; usar `local_addr`
    /// para conocerlo.
    pub fn bind(config: &Config, handler: H) -> io::Result<Self> {
        let listener = TcpListener::bind(config.address())?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, "servidor escuchando (un thread por conexión)");

        Ok(Self {
            listener,
            context: Arc::new(ConnectionContext::new(handler, config.host.clone(), local_addr)),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.context.local_addr()
    }

    /// Handler compartido por las conexiones
    pub fn handler(&self) -> &H {
        self.context.handler()
    }

    /// Acepta conexiones para siempre
    ///
    /// Un error al aceptar sólo afecta a esa conexión.
    pub fn run(self) -> io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.spawn_connection(stream),
                Err(e) => warn!(error = %e, "error al aceptar conexión"),
            }
        }
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream) {
        let context = Arc::clone(&self.context);
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        debug!(%peer, "nueva conexión");

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || {
                if let Err(e) = handle_connection(stream, &context) {
                    warn!(%peer, error = %e, "error al escribir la respuesta");
                }
            });

        if let Err(e) = spawned {
            error!(error = %e, "no se pudo crear el thread de la conexión");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerError;
    use crate::http::{Request, Response, StatusCode};
    use std::io::{Read, Write};
    use std::sync::Barrier;

    /// Cada GET espera en una barrera: sólo termina si hay conexiones en paralelo
    struct Rendezvous(Barrier);

    impl Handler for Rendezvous {
        fn do_get(&self, _request: &Request) -> Result<Response, HandlerError> {
            self.0.wait();
            Ok(Response::new(StatusCode::Ok))
        }

        fn do_post(&self, _request: &Request) -> Result<Response, HandlerError> {
            Ok(Response::new(StatusCode::Ok))
        }

        fn do_other(&self, request: &Request) -> Result<Response, HandlerError> {
            Err(HandlerError::UnsupportedMethod(request.method().to_string()))
        }
    }

    fn ephemeral_config() -> Config {
        Config {
            port: 0,
            ..Config::default()
        }
    }

    #[test]
    fn test_bind_ephemeral_port() {
        let server = Server::bind(&ephemeral_config(), Rendezvous(Barrier::new(1))).unwrap();
        assert_ne!(server.local_addr().port(), 0);
        assert!(server.local_addr().ip().is_loopback());
    }

    #[test]
    fn test_bind_in_use_fails() {
        let first = Server::bind(&ephemeral_config(), Rendezvous(Barrier::new(1))).unwrap();
        let config = Config {
            port: first.local_addr().port(),
            ..Config::default()
        };
        assert!(Server::bind(&config, Rendezvous(Barrier::new(1))).is_err());
    }

    #[test]
    fn test_connections_are_concurrent() {
        let server = Server::bind(&ephemeral_config(), Rendezvous(Barrier::new(3))).unwrap();
        let addr = server.local_addr();
        thread::spawn(move || server.run());

        let clients: Vec<_> = (0..3)
            .map(|_| {
                thread::spawn(move || {
                    let mut client = TcpStream::connect(addr).unwrap();
                    client.write_all(b"GET / HTTP/1.0\r\n\r\n").unwrap();
                    let mut text = String::new();
                    client.read_to_string(&mut text).unwrap();
                    text
                })
            })
            .collect();

        for client in clients {
            assert!(client.join().unwrap().starts_with("HTTP/1.0 200 OK\r\n"));
        }
    }
}
