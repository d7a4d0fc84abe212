//! # Logger
//! src/logger.rs
//!
//! Los threads de conexión nunca escriben directamente en la salida: cada
//! evento de `tracing` se formatea en memoria y se encola en un canal sin
//! límite. Un único thread consumidor vacía la cola y escribe en el destino.
//!
//! ```text
//! conn-1 ─┐
//! conn-2 ─┼─> mpsc ─> [logger thread] ─> stdout
//! conn-N ─┘
//! ```
//!
//! El orden entre threads es best-effort; el de un mismo thread se respeta.

use std::io::{self, Write};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("could not start logger thread: {0}")]
    Spawn(#[from] io::Error),

    #[error("could not install tracing subscriber: {0}")]
    Init(Box<dyn std::error::Error + Send + Sync>),
}

enum LogMessage {
    Line(String),
    Shutdown,
}

/// Cola de mensajes con su thread consumidor
pub struct LogQueue {
    sender: Sender<LogMessage>,
    consumer: Option<JoinHandle<()>>,
}

impl LogQueue {
    /// Arranca el thread consumidor que escribe en `destination`
    pub fn spawn<W: Write + Send + 'static>(mut destination: W) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel();

        let consumer = thread::Builder::new()
            .name("logger".to_string())
            .spawn(move || {
                for message in receiver {
                    match message {
                        LogMessage::Line(line) => {
                            // Si el destino falla no hay a dónde reportarlo
                            let _ = destination.write_all(line.as_bytes());
                            let _ = destination.flush();
                        }
                        LogMessage::Shutdown => break,
                    }
                }
            })?;

        Ok(Self {
            sender,
            consumer: Some(consumer),
        })
    }

    /// Encola un mensaje; nunca bloquea al llamador
    pub fn write(&self, message: &str) {
        let mut line = message.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        let _ = self.sender.send(LogMessage::Line(line));
    }

    /// Writer para `tracing_subscriber::fmt`
    pub fn make_writer(&self) -> QueueMakeWriter {
        QueueMakeWriter {
            sender: self.sender.clone(),
        }
    }

    /// Espera a que se escriba todo lo encolado y detiene el consumidor
    ///
    /// Lo que se encole después se descarta.
    pub fn shutdown(mut self) {
        let _ = self.sender.send(LogMessage::Shutdown);
        if let Some(consumer) = self.consumer.take() {
            let _ = consumer.join();
        }
    }
}

/// Fabrica un `QueueWriter` por evento
#[derive(Clone)]
pub struct QueueMakeWriter {
    sender: Sender<LogMessage>,
}

impl<'a> MakeWriter<'a> for QueueMakeWriter {
    type Writer = QueueWriter;

    fn make_writer(&'a self) -> Self::Writer {
        QueueWriter {
            sender: self.sender.clone(),
            buffer: Vec::new(),
        }
    }
}

/// Acumula un evento formateado y lo encola al soltarse
pub struct QueueWriter {
    sender: Sender<LogMessage>,
    buffer: Vec<u8>,
}

impl Write for QueueWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for QueueWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        let _ = self.sender.send(LogMessage::Line(line));
    }
}

/// Nivel máximo según la bandera de verbosidad
pub fn max_level(verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

/// Instala el subscriber global escribiendo a stdout a través de la cola
///
/// Se llama una vez al arrancar el proceso.
pub fn init(verbose: bool) -> Result<LogQueue, LoggerError> {
    let queue = LogQueue::spawn(io::stdout())?;

    tracing_subscriber::fmt()
        .with_max_level(max_level(verbose))
        .with_target(false)
        .with_thread_names(true)
        .with_ansi(false)
        .with_writer(queue.make_writer())
        .try_init()
        .map_err(LoggerError::Init)?;

    Ok(queue)
}
