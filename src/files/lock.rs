//! # Lock Lector/Escritor con Prioridad a Escritores
//! src/files/lock.rs
//!
//! Segundo problema de lectores/escritores: dos compuertas binarias y dos
//! contadores, cada contador con su propio mutex.
//!
//! - `reader_gate`: punto de entrada de los lectores. El primer escritor en
//!   la fila la cierra, así ningún lector *nuevo* entra mientras haya
//!   escritores esperando o escribiendo.
//! - `writer_gate`: exclusión mutua del recurso. La toma un escritor, o el
//!   primer lector activo en nombre de todo el grupo de lectores.
//!
//! Garantías:
//!
//! 1. Sin escritores en la fila, cualquier cantidad de lectores comparte el
//!    recurso.
//! 2. Un solo escritor a la vez, sin lectores activos.
//! 3. Con un escritor en la fila, ningún lector nuevo es admitido hasta que
//!    la fila de escritores se vacíe (sin inanición de escritores).
//! 4. Los lectores que ya estaban activos terminan normalmente.
//!
//! No se usa `std::sync::RwLock` porque su política de prioridad depende de
//! la plataforma. Las compuertas no pueden ser `Mutex<()>`: la del escritor
//! la toma un lector y la suelta otro distinto, así que se implementan como
//! semáforos binarios sobre `Mutex` + `Condvar`.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// El estado protegido son contadores y banderas; un pánico ajeno no los deja
/// inconsistentes, así que el envenenamiento se ignora.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Semáforo binario que puede liberar un thread distinto del que lo tomó
struct Gate {
    closed: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    fn new() -> Self {
        Self {
            closed: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    fn acquire(&self) {
        let mut closed = lock(&self.closed);
        while *closed {
            closed = self
                .opened
                .wait(closed)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *closed = true;
    }

    fn release(&self) {
        *lock(&self.closed) = false;
        self.opened.notify_one();
    }
}

/// Lock lector/escritor con prioridad a escritores
///
/// Una instancia protege un directorio completo: dos escrituras a archivos
/// distintos también se excluyen entre sí.
pub struct FileLock {
    reader_gate: Gate,
    writer_gate: Gate,

    /// Lectores activos
    readers: Mutex<usize>,

    /// Escritores en la fila más el activo
    writers: Mutex<usize>,
}

impl FileLock {
    pub fn new() -> Self {
        Self {
            reader_gate: Gate::new(),
            writer_gate: Gate::new(),
            readers: Mutex::new(0),
            writers: Mutex::new(0),
        }
    }

    /// Entra como lector
    ///
    /// Sólo la decisión de entrada se serializa en `reader_gate`; una vez
    /// dentro, los lectores no se bloquean entre sí.
    pub fn acquire_read(&self) {
        self.reader_gate.acquire();
        {
            let mut readers = lock(&self.readers);
            *readers += 1;
            // El primer lector bloquea a los escritores por todo el grupo
            if *readers == 1 {
                self.writer_gate.acquire();
            }
        }
        self.reader_gate.release();
    }

    /// Sale como lector; debe emparejarse con `acquire_read`
    pub fn release_read(&self) {
        let mut readers = lock(&self.readers);
        debug_assert!(*readers > 0, "release_read without acquire_read");
        *readers -= 1;
        // El último lector deja pasar a un escritor
        if *readers == 0 {
            self.writer_gate.release();
        }
    }

    /// Entra como escritor
    ///
    /// El primer escritor de la fila cierra la entrada a lectores nuevos;
    /// luego espera en `writer_gate` a que salgan los lectores activos.
    pub fn acquire_write(&self) {
        {
            let mut writers = lock(&self.writers);
            *writers += 1;
            if *writers == 1 {
                self.reader_gate.acquire();
            }
        }
        self.writer_gate.acquire();
    }

    /// Sale como escritor; debe emparejarse con `acquire_write`
    ///
    /// `writer_gate` se suelta antes de decrementar, así otro escritor de la
    /// fila pasa antes que cualquier lector.
    pub fn release_write(&self) {
        self.writer_gate.release();
        let mut writers = lock(&self.writers);
        debug_assert!(*writers > 0, "release_write without acquire_write");
        *writers -= 1;
        if *writers == 0 {
            self.reader_gate.release();
        }
    }

    /// Toma el lock en modo lectura hasta que se suelte el guard
    pub fn read(&self) -> ReadGuard<'_> {
        self.acquire_read();
        ReadGuard { lock: self }
    }

    /// Toma el lock en modo escritura hasta que se suelte el guard
    pub fn write(&self) -> WriteGuard<'_> {
        self.acquire_write();
        WriteGuard { lock: self }
    }

    /// Lectores activos en este momento
    pub fn active_readers(&self) -> usize {
        *lock(&self.readers)
    }

    /// Escritores esperando o escribiendo en este momento
    pub fn queued_writers(&self) -> usize {
        *lock(&self.writers)
    }
}

impl Default for FileLock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FileLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLock")
            .field("readers", &self.active_readers())
            .field("writers", &self.queued_writers())
            .finish()
    }
}

/// Guard de lectura; llama a `release_read` al soltarse
#[must_use = "el lock se suelta apenas se descarta el guard"]
pub struct ReadGuard<'a> {
    lock: &'a FileLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

/// Guard de escritura; llama a `release_write` al soltarse
#[must_use = "el lock se suelta apenas se descarta el guard"]
pub struct WriteGuard<'a> {
    lock: &'a FileLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
