//! # Administrador de Archivos
//! src/files/manager.rs
//!
//! Acceso al directorio raíz, serializado por un único `FileLock`:
//!
//! - Sólo un escritor a la vez en *todo* el directorio.
//! - Múltiples lectores simultáneos.
//! - Prioridad a escritores.
//!
//! El espacio de nombres es plano: sin subdirectorios ni componentes de ruta.

use super::lock::FileLock;
use crate::config::ConfigError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Indica si `name` es un nombre de archivo plano aceptable
///
/// Rechaza separadores de ruta (`/`, `\`), `.` y `..`, el nombre vacío y NUL.
///
/// # Ejemplo
/// ```
/// use httpfs::files::is_flat_name;
///
/// assert!(is_flat_name("notes.txt"));
/// assert!(!is_flat_name("../etc/passwd"));
/// assert!(!is_flat_name("sub/file"));
/// ```
pub fn is_flat_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Directorio raíz más el lock que protege su contenido
#[derive(Debug)]
pub struct FileManager {
    root: PathBuf,
    lock: FileLock,
}

impl FileManager {
    /// Crea el manager; falla si `root` no es un directorio existente
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ConfigError::NotADirectory(root));
        }
        Ok(Self {
            root,
            lock: FileLock::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lock compartido por todas las operaciones de este directorio
    pub fn lock(&self) -> &FileLock {
        &self.lock
    }

    /// Lista los archivos regulares directamente bajo la raíz, ordenados
    pub fn list(&self) -> io::Result<Vec<String>> {
        let _guard = self.lock.read();

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            // Sigue symlinks, igual que la lectura de archivos
            let is_file = fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false);
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        debug!(count = names.len(), "directorio listado");
        Ok(names)
    }

    /// Lee el contenido completo de un archivo regular
    ///
    /// Un nombre que no corresponde a un archivo regular (inexistente o
    /// directorio) da `ErrorKind::NotFound`.
    pub fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(name)?;
        let _guard = self.lock.read();

        if !fs::metadata(&path)?.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not a regular file"));
        }
        let data = fs::read(&path)?;

        debug!(name, bytes = data.len(), "archivo leído");
        Ok(data)
    }

    /// Crea o trunca el archivo y escribe `data`
    pub fn write(&self, name: &str, data: &[u8]) -> io::Result<()> {
        let path = self.resolve(name)?;
        let _guard = self.lock.write();

        fs::write(&path, data)?;

        debug!(name, bytes = data.len(), "archivo escrito");
        Ok(())
    }

    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        if !is_flat_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a flat file name: {:?}", name),
            ));
        }
        Ok(self.root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn manager() -> (TempDir, FileManager) {
        let dir = TempDir::new().unwrap();
        let manager = FileManager::new(dir.path()).unwrap();
        (dir, manager)
    }

    #[test]
    fn test_flat_names() {
        assert!(is_flat_name("42"));
        assert!(is_flat_name(".hidden"));
        assert!(is_flat_name("a..b"));
        assert!(!is_flat_name(""));
        assert!(!is_flat_name("."));
        assert!(!is_flat_name(".."));
        assert!(!is_flat_name("sub/file"));
        assert!(!is_flat_name("sub\\file"));
        assert!(!is_flat_name("bad\0name"));
    }

    #[test]
    fn test_new_rejects_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(FileManager::new(&missing), Err(ConfigError::NotADirectory(_))));
    }

    #[test]
    fn test_new_rejects_file_as_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "x").unwrap();
        assert!(FileManager::new(&file).is_err());
    }

    #[test]
    fn test_list_empty() {
        let (_dir, manager) = manager();
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_only_regular_files() {
        let (dir, manager) = manager();
        fs::write(dir.path().join("b"), "2").unwrap();
        fs::write(dir.path().join("a"), "1").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("inner"), "3").unwrap();

        assert_eq!(manager.list().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, manager) = manager();
        manager.write("42", b"mooooooo").unwrap();
        assert_eq!(manager.read("42").unwrap(), b"mooooooo");
    }

    #[test]
    fn test_write_truncates() {
        let (_dir, manager) = manager();
        manager.write("a", b"a long first version").unwrap();
        manager.write("a", b"short").unwrap();
        assert_eq!(manager.read("a").unwrap(), b"short");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_dir, manager) = manager();
        let err = manager.read("missing").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_directory_is_not_found() {
        let (dir, manager) = manager();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let err = manager.read("sub").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_rejects_path_components() {
        let (_dir, manager) = manager();
        assert_eq!(manager.read("../x").unwrap_err().kind(), io::ErrorKind::InvalidInput);
        assert_eq!(manager.write("a/b", b"x").unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_write_into_directory_fails() {
        let (dir, manager) = manager();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert!(manager.write("sub", b"x").is_err());
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        // Mezcla de lectores y escritores sobre los mismos nombres
        let (_dir, manager) = manager();
        let manager = Arc::new(manager);
        let pattern = "RRWRWRWRRRRWWWRWRWRR";

        let handles: Vec<_> = pattern
            .chars()
            .enumerate()
            .map(|(i, kind)| {
                let manager = Arc::clone(&manager);
                let name = (i % 4).to_string();
                thread::spawn(move || {
                    if kind == 'W' {
                        manager.write(&name, b"mooooooo").unwrap();
                    } else if let Ok(data) = manager.read(&name) {
                        // Nunca se observa una escritura a medias
                        assert_eq!(data, b"mooooooo");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(manager.lock().active_readers(), 0);
        assert_eq!(manager.lock().queued_writers(), 0);
    }
}
