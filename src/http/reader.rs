//! # Lectura de Bytes y Líneas
//! src/http/reader.rs
//!
//! Primitivas bloqueantes para sacar bytes de un socket conectado:
//!
//! - `read_line`: acumula hasta encontrar un terminador (CR, LF o CRLF)
//!   o hasta que el peer cierra la conexión.
//! - `read_exact`: acumula hasta `n` bytes o hasta que el peer cierra.
//!
//! HTTP no tiene registros con prefijo de longitud: el preámbulo se delimita
//! buscando terminadores de línea y el cuerpo por el `Content-Length`
//! declarado. Ambas primitivas comparten el mismo buffer interno, así que los
//! bytes del cuerpo que llegan pegados al preámbulo no se pierden.
//!
//! No hay límite de longitud de línea: un cliente hostil puede hacer crecer
//! el acumulador sin cota.

use std::io::{self, BufRead, BufReader, Read};

/// Tamaño del bloque que se pide al socket en cada lectura
const CHUNK_SIZE: usize = 1024;

/// Lector de líneas y bloques sobre cualquier `Read` (normalmente `&TcpStream`)
pub struct LineReader<R> {
    inner: BufReader<R>,

    /// La última línea terminó en un CR que cerraba el buffer disponible;
    /// si lo siguiente es un LF, pertenece a ese mismo terminador.
    skip_lf: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(CHUNK_SIZE, inner),
            skip_lf: false,
        }
    }

    /// Lee una línea incluyendo su terminador
    ///
    /// Retorna un vector vacío si el peer cerró sin enviar nada más, y la
    /// línea parcial (sin terminador) si cerró a mitad de línea.
    ///
    /// # Ejemplo
    /// ```
    /// use httpfs::http::LineReader;
    ///
    /// let mut reader = LineReader::new(&b"GET / HTTP/1.0\r\n\r\n"[..]);
    /// assert_eq!(reader.read_line().unwrap(), b"GET / HTTP/1.0\r\n");
    /// assert_eq!(reader.read_line().unwrap(), b"\r\n");
    /// assert!(reader.read_line().unwrap().is_empty());
    /// ```
    pub fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        self.skip_pending_lf()?;

        loop {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if available.is_empty() {
                return Ok(line);
            }

            let mut pending_lf = false;
            let (used, done) = match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(pos) => {
                    let mut end = pos + 1;
                    if available[pos] == b'\r' {
                        match available.get(end) {
                            Some(b'\n') => end += 1,
                            Some(_) => {}
                            None => pending_lf = true,
                        }
                    }
                    line.extend_from_slice(&available[..end]);
                    (end, true)
                }
                None => {
                    line.extend_from_slice(available);
                    (available.len(), false)
                }
            };

            self.inner.consume(used);
            if done {
                self.skip_lf = pending_lf;
                return Ok(line);
            }
        }
    }

    /// Lee hasta `n` bytes
    ///
    /// Es best-effort: si el peer cierra antes, retorna lo acumulado y el
    /// llamador no debe asumir que la longitud coincide.
    pub fn read_exact(&mut self, n: usize) -> io::Result<Vec<u8>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        self.skip_pending_lf()?;

        let mut data = Vec::with_capacity(n.min(64 * 1024));
        (&mut self.inner).take(n as u64).read_to_end(&mut data)?;
        Ok(data)
    }

    /// Referencia al stream subyacente
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    fn skip_pending_lf(&mut self) -> io::Result<()> {
        if !self.skip_lf {
            return Ok(());
        }
        self.skip_lf = false;
        let available = self.inner.fill_buf()?;
        if available.first() == Some(&b'\n') {
            self.inner.consume(1);
        }
        Ok(())
    }
}

/// Indica si una línea es sólo un terminador (la línea en blanco del preámbulo)
pub fn is_blank_line(line: &[u8]) -> bool {
    matches!(line, b"\r\n" | b"\n" | b"\r")
}
