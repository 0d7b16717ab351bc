//! # Semáforo Contador
//! src/sync/semaphore.rs
//!
//! La librería estándar no trae un semáforo contador, así que implementamos
//! uno sobre `Mutex` + `Condvar`. Lo usan la cola acotada (permisos de
//! espacio/elementos) y el rwlock (compuerta de escritura binaria).

use std::sync::{Condvar, Mutex};

/// Semáforo contador clásico.
///
/// `acquire` bloquea mientras no haya permisos disponibles; `release`
/// devuelve un permiso y despierta a un thread en espera.
///
/// # Ejemplo
/// ```
/// use httpserver::sync::Semaphore;
///
/// let sem = Semaphore::new(1);
/// sem.acquire();
/// // ... sección exclusiva ...
/// sem.release();
/// ```
pub struct Semaphore {
    /// Permisos disponibles
    permits: Mutex<usize>,

    /// Notifica a threads esperando un permiso
    cond: Condvar,
}

impl Semaphore {
    /// Crea un semáforo con `permits` permisos iniciales
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            cond: Condvar::new(),
        }
    }

    /// Toma un permiso, bloqueando hasta que haya uno disponible
    pub fn acquire(&self) {
        let mut permits = self.permits.lock().unwrap();
        while *permits == 0 {
            permits = self.cond.wait(permits).unwrap();
        }
        *permits -= 1;
    }

    /// Devuelve un permiso y despierta a un thread en espera
    pub fn release(&self) {
        let mut permits = self.permits.lock().unwrap();
        *permits += 1;
        self.cond.notify_one();
    }
}
