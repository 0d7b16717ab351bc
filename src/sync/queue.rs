//! # Cola Acotada Bloqueante
//! src/sync/queue.rs
//!
//! Cola FIFO de capacidad fija para pasar trabajo entre threads. `push`
//! bloquea con la cola llena y `pop` bloquea con la cola vacía, así que la
//! cola misma es el mecanismo de back-pressure entre el acceptor y los
//! workers.
//!
//! ## Diseño
//!
//! Buffer circular con cursores de head y tail protegidos por mutexes
//! independientes (lado productor y lado consumidor), más dos semáforos
//! contadores: uno cuenta espacios libres (valor inicial = capacidad) y el
//! otro elementos presentes (valor inicial = 0). Separar los mutexes permite
//! que un productor y un consumidor avancen en paralelo; los semáforos
//! expresan las condiciones de lleno/vacío sin loops manuales sobre una
//! condition variable.

use crate::sync::Semaphore;
use std::cell::UnsafeCell;
use std::sync::Mutex;

/// Cola FIFO acotada, segura para múltiples productores y consumidores.
///
/// # Ejemplo
/// ```
/// use httpserver::sync::Queue;
///
/// let q = Queue::new(4).unwrap();
/// q.push(1);
/// q.push(2);
/// assert_eq!(q.pop(), 1);
/// assert_eq!(q.pop(), 2);
/// ```
pub struct Queue<T> {
    /// Buffer circular; cada slot es `Some` entre push y pop
    buf: Box<[UnsafeCell<Option<T>>]>,

    /// Cursor de escritura (avanza en cada push, módulo capacidad)
    head: Mutex<usize>,

    /// Cursor de lectura (avanza en cada pop, módulo capacidad)
    tail: Mutex<usize>,

    /// Cuenta espacios libres; `push` espera aquí con la cola llena
    empty_slots: Semaphore,

    /// Cuenta elementos presentes; `pop` espera aquí con la cola vacía
    filled_slots: Semaphore,

    capacity: usize,
}

// Los semáforos garantizan que un slot nunca es tocado por dos threads a la
// vez: un permiso de `empty_slots` da acceso exclusivo al slot bajo `head`,
// y uno de `filled_slots` al slot bajo `tail`.
unsafe impl<T: Send> Send for Queue<T> {}
unsafe impl<T: Send> Sync for Queue<T> {}

impl<T> Queue<T> {
    /// Crea una cola con la capacidad indicada.
    ///
    /// # Retorna
    /// `None` si la capacidad es cero.
    pub fn new(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }

        let buf = (0..capacity)
            .map(|_| UnsafeCell::new(None))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Some(Self {
            buf,
            head: Mutex::new(0),
            tail: Mutex::new(0),
            empty_slots: Semaphore::new(capacity),
            filled_slots: Semaphore::new(0),
            capacity,
        })
    }

    /// Capacidad fija de la cola
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Agrega un elemento al final, bloqueando mientras la cola esté llena
    pub fn push(&self, item: T) {
        self.empty_slots.acquire();

        let mut head = self.head.lock().unwrap();
        let slot = *head;
        *head = (*head + 1) % self.capacity;
        unsafe {
            *self.buf[slot].get() = Some(item);
        }
        drop(head);

        self.filled_slots.release();
    }

    /// Saca el elemento del frente, bloqueando mientras la cola esté vacía
    pub fn pop(&self) -> T {
        self.filled_slots.acquire();

        let mut tail = self.tail.lock().unwrap();
        let slot = *tail;
        *tail = (*tail + 1) % self.capacity;
        let item = unsafe { (*self.buf[slot].get()).take() };
        drop(tail);

        self.empty_slots.release();

        match item {
            Some(item) => item,
            None => unreachable!("slot vacío con permiso de elemento"),
        }
    }
}
