//! # Tabla de Locks por URI
//! src/server/registry.rs
//!
//! Interna un [`RwLock`] por URI activo para que dos requests sobre el mismo
//! archivo queden serializados (GET/GET en paralelo, GET/PUT y PUT/PUT
//! excluyentes) mientras que requests sobre archivos distintos avanzan de
//! forma independiente.
//!
//! La tabla es un arreglo fijo de slots `(path, users)` con un lock
//! reutilizable por slot, dimensionado igual que el pool de workers: como
//! cada worker usa a lo sumo un slot a la vez, la tabla nunca puede quedar
//! llena sin coincidencia.

use crate::sync::{Priority, RwLock};
use std::sync::{Arc, Mutex};

/// Un slot de la tabla: URI interno y cantidad de usuarios
struct Slot {
    /// URI interno; `None` cuando el slot está libre
    path: Option<String>,

    /// Referencias vivas al slot; el slot se libera al llegar a cero
    users: u32,
}

/// Referencia a un slot tomado con [`LockTable::acquire`].
///
/// El lock embebido puede usarse de inmediato; la entrada se devuelve con
/// [`LockTable::release`].
pub struct LockEntry {
    index: usize,
    lock: Arc<RwLock>,
}

impl LockEntry {
    /// Lock de lectores/escritores asociado al URI
    pub fn lock(&self) -> &RwLock {
        &self.lock
    }
}

/// Tabla de locks por URI, de capacidad fija.
pub struct LockTable {
    slots: Mutex<Vec<Slot>>,

    /// Un lock por slot, creado al inicio y reutilizado entre URIs; está
    /// ocioso siempre que su slot esté libre
    locks: Vec<Arc<RwLock>>,
}

impl LockTable {
    /// Crea la tabla con `capacity` slots (la cantidad de workers)
    pub fn new(capacity: usize) -> Self {
        let locks = (0..capacity)
            .map(|_| {
                let lock = RwLock::new(Priority::NWay, 1);
                Arc::new(lock.expect("n > 0"))
            })
            .collect();

        Self {
            slots: Mutex::new(
                (0..capacity)
                    .map(|_| Slot {
                        path: None,
                        users: 0,
                    })
                    .collect(),
            ),
            locks,
        }
    }

    /// Toma la entrada para un URI, creándola si no existe.
    ///
    /// Llamadas concurrentes con el mismo URI (byte a byte) retornan la
    /// misma entrada e incrementan su contador de usuarios.
    ///
    /// # Panics
    /// Si no queda slot disponible; con la tabla dimensionada al pool de
    /// workers eso es un error de programación.
    pub fn acquire(&self, uri: &str) -> LockEntry {
        let mut slots = self.slots.lock().unwrap();

        // primero reutilizar la entrada existente para este URI; recién
        // después reclamar un slot libre, para no duplicar el lock de un
        // URI que ya está en uso
        if let Some(index) = slots.iter().position(|s| s.path.as_deref() == Some(uri)) {
            slots[index].users += 1;
            return LockEntry {
                index,
                lock: Arc::clone(&self.locks[index]),
            };
        }

        if let Some(index) = slots.iter().position(|s| s.path.is_none()) {
            slots[index].path = Some(uri.to_string());
            slots[index].users = 1;
            return LockEntry {
                index,
                lock: Arc::clone(&self.locks[index]),
            };
        }

        panic!("lock table exhausted: more URIs in flight than workers");
    }

    /// Devuelve una entrada tomada con [`LockTable::acquire`].
    ///
    /// Cuando el contador de usuarios llega a cero, el URI se libera y el
    /// slot queda disponible para otro URI.
    pub fn release(&self, entry: LockEntry) {
        let mut slots = self.slots.lock().unwrap();
        let slot = &mut slots[entry.index];

        slot.users -= 1;
        if slot.users == 0 {
            slot.path = None;
        }
    }
}
