//! # Lock de Lectores/Escritores Multi-Política
//! src/sync/rwlock.rs
//!
//! Lock de lectores/escritores cuyo comportamiento de equidad se elige al
//! construirlo y no cambia en runtime:
//!
//! - [`Priority::Readers`]: los lectores siempre pasan salvo que un escritor
//!   tenga el lock. Un flujo continuo de lectores puede dejar a un escritor
//!   esperando indefinidamente.
//! - [`Priority::Writers`]: con cualquier escritor en cola, los lectores
//!   nuevos esperan. Un lector iniciado después de `writer_lock` nunca
//!   completa antes que ese escritor.
//! - [`Priority::NWay`]: mientras un escritor espera, a lo sumo `n` lectores
//!   entran antes de que el escritor reciba el lock. Sin escritores en
//!   espera, los lectores no se limitan. Con `n = 1` se aproxima a prioridad
//!   de escritores pero admitiendo ráfagas; con `n` grande se aproxima a
//!   prioridad de lectores.
//!
//! ## Estado común
//!
//! Un mutex protege todos los contadores. Un semáforo binario (la "compuerta
//! de escritura") representa la posesión exclusiva de la región crítica: la
//! tiene el escritor actual, o el primer lector de la cohorte en nombre de
//! todos. El primer lector en entrar toma la compuerta y el último en salir
//! la libera.
//!
//! El primer lector adquiere la compuerta sin soltar el mutex de políticas;
//! mientras espera, solo libera el mutex interno de la compuerta. Eso hace
//! atómico el traspaso a la cohorte: los lectores que llegan detrás quedan
//! encolados en el mutex y entran todos juntos cuando la compuerta cede.
//! No hay deadlock porque toda liberación de compuerta desde un escritor
//! ocurre antes de (o sin) tomar el mutex de políticas.

use crate::sync::Semaphore;
use std::sync::{Condvar, Mutex, MutexGuard};

/// Política de equidad del lock, fijada en la construcción
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Prioridad para lectores
    Readers,

    /// Prioridad para escritores
    Writers,

    /// Equidad N-way: a lo sumo N lectores por ventana con un escritor en espera
    NWay,
}

/// Estado de la política de prioridad de lectores
struct ReadersState {
    /// Hay un escritor con el lock tomado
    writer_holding: bool,

    /// Escritores esperando (sin contar al que tiene el lock)
    writers_waiting: u32,
}

/// Estado de la política de prioridad de escritores
struct WritersState {
    /// Escritores esperando, incluyendo al que tiene el lock si lo hay
    writers_waiting: u32,

    /// Lectores esperando el lock
    readers_waiting: u32,
}

/// Estado de la política N-way
struct NWayState {
    /// El "N" de la ventana
    n: u32,

    /// Lectores esperando el lock
    readers_waiting: u32,

    /// Lectores admitidos en la ventana actual (desde la última liberación
    /// de un escritor). Saturado en `n` para no desbordar.
    readers_passed: u32,

    /// Escritores esperando, incluyendo al que tiene el lock si lo hay
    writers_waiting: u32,
}

/// Estado específico de cada política
enum PolicyState {
    Readers(ReadersState),
    Writers(WritersState),
    NWay(NWayState),
}

/// Contadores protegidos por el mutex del lock
struct Shared {
    /// Lectores que tienen el lock en este momento
    readers_holding: u32,

    policy: PolicyState,
}

impl Shared {
    fn readers(&mut self) -> &mut ReadersState {
        match &mut self.policy {
            PolicyState::Readers(state) => state,
            _ => unreachable!("estado de política inconsistente"),
        }
    }

    fn writers(&mut self) -> &mut WritersState {
        match &mut self.policy {
            PolicyState::Writers(state) => state,
            _ => unreachable!("estado de política inconsistente"),
        }
    }

    fn nway(&mut self) -> &mut NWayState {
        match &mut self.policy {
            PolicyState::NWay(state) => state,
            _ => unreachable!("estado de política inconsistente"),
        }
    }
}

/// Lock de lectores/escritores con política de equidad seleccionable.
///
/// Invariantes, bajo cualquier política:
/// - a lo sumo un escritor tiene el lock;
/// - mientras haya lectores dentro, ningún escritor tiene el lock;
/// - el lock nace sin dueños.
pub struct RwLock {
    /// Discriminante de política; los cuatro puntos de entrada despachan por él
    priority: Priority,

    shared: Mutex<Shared>,

    /// Señala a lectores que pueden intentar tomar el lock
    rd_cond: Condvar,

    /// Señala a escritores que pueden intentar tomar el lock
    wr_cond: Condvar,

    /// Compuerta de escritura: semáforo binario de la región crítica
    write_gate: Semaphore,
}

impl RwLock {
    /// Crea un lock con la política indicada.
    ///
    /// `n` solo tiene sentido bajo [`Priority::NWay`] y se ignora en las
    /// demás políticas.
    ///
    /// # Retorna
    /// `None` con parámetros inválidos (`NWay` con `n == 0`).
    pub fn new(priority: Priority, n: u32) -> Option<Self> {
        let policy = match priority {
            Priority::Readers => PolicyState::Readers(ReadersState {
                writer_holding: false,
                writers_waiting: 0,
            }),
            Priority::Writers => PolicyState::Writers(WritersState {
                writers_waiting: 0,
                readers_waiting: 0,
            }),
            Priority::NWay => {
                if n == 0 {
                    return None;
                }
                PolicyState::NWay(NWayState {
                    n,
                    readers_waiting: 0,
                    readers_passed: 0,
                    writers_waiting: 0,
                })
            }
        };

        Some(Self {
            priority,
            shared: Mutex::new(Shared {
                readers_holding: 0,
                policy,
            }),
            rd_cond: Condvar::new(),
            wr_cond: Condvar::new(),
            write_gate: Semaphore::new(1),
        })
    }

    /// Política con la que fue construido el lock
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Toma el lock en modo lectura
    pub fn reader_lock(&self) {
        match self.priority {
            Priority::Readers => self.readers_reader_lock(),
            Priority::Writers => self.writers_reader_lock(),
            Priority::NWay => self.nway_reader_lock(),
        }
    }

    /// Libera el lock tomado en modo lectura
    pub fn reader_unlock(&self) {
        match self.priority {
            Priority::Readers => self.readers_reader_unlock(),
            Priority::Writers => self.writers_reader_unlock(),
            Priority::NWay => self.nway_reader_unlock(),
        }
    }

    /// Toma el lock en modo escritura
    pub fn writer_lock(&self) {
        match self.priority {
            Priority::Readers => self.readers_writer_lock(),
            Priority::Writers => self.writers_writer_lock(),
            Priority::NWay => self.nway_writer_lock(),
        }
    }

    /// Libera el lock tomado en modo escritura
    pub fn writer_unlock(&self) {
        match self.priority {
            Priority::Readers => self.readers_writer_unlock(),
            Priority::Writers => self.writers_writer_unlock(),
            Priority::NWay => self.nway_writer_unlock(),
        }
    }

    fn lock_shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap()
    }

    // ==================== Prioridad de lectores ====================
    //
    // Los lectores nuevos entran sin mirar la cola de escritores, así que
    // un flujo continuo de lectores deja fuera a los escritores.

    fn readers_reader_lock(&self) {
        let mut shared = self.lock_shared();

        if shared.readers_holding == 0 {
            // el primer lector toma la compuerta por toda la cohorte
            self.write_gate.acquire();
        }

        shared.readers_holding += 1;
    }

    fn readers_reader_unlock(&self) {
        let mut shared = self.lock_shared();
        shared.readers_holding -= 1;

        if shared.readers_holding == 0 {
            // el último lector libera la compuerta
            self.write_gate.release();
            if shared.readers().writers_waiting > 0 {
                self.wr_cond.notify_one();
            }
        }
    }

    fn readers_writer_lock(&self) {
        let mut shared = self.lock_shared();

        shared.readers().writers_waiting += 1;
        while shared.readers_holding > 0 || shared.readers().writer_holding {
            shared = self.wr_cond.wait(shared).unwrap();
        }

        shared.readers().writers_waiting -= 1;
        shared.readers().writer_holding = true;
        drop(shared);
        self.write_gate.acquire();
    }

    fn readers_writer_unlock(&self) {
        // Liberar la compuerta antes de tomar el mutex: un lector puede
        // estar bloqueado en ella con el mutex tomado y debe pasar ya.
        self.write_gate.release();

        let mut shared = self.lock_shared();
        shared.readers().writer_holding = false;
        if shared.readers_holding == 0 && shared.readers().writers_waiting > 0 {
            self.wr_cond.notify_one();
        }
    }

    // ==================== Prioridad de escritores ====================
    //
    // Los escritores se encolan directamente en la compuerta; los lectores
    // quedan retenidos mientras haya cualquier escritor en la fila.

    fn writers_reader_lock(&self) {
        let mut shared = self.lock_shared();

        shared.writers().readers_waiting += 1;
        while shared.writers().writers_waiting > 0 {
            shared = self.rd_cond.wait(shared).unwrap();
        }

        if shared.readers_holding == 0 {
            self.write_gate.acquire();
        }

        shared.writers().readers_waiting -= 1;
        shared.readers_holding += 1;
    }

    fn writers_reader_unlock(&self) {
        let mut shared = self.lock_shared();

        shared.readers_holding -= 1;
        if shared.readers_holding == 0 {
            self.write_gate.release();
        } else if shared.writers().writers_waiting == 0 && shared.writers().readers_waiting > 0 {
            // sin escritores en cola, despertar a los lectores retenidos
            self.rd_cond.notify_all();
        }
    }

    fn writers_writer_lock(&self) {
        let mut shared = self.lock_shared();
        shared.writers().writers_waiting += 1;
        drop(shared);
        self.write_gate.acquire();
    }

    fn writers_writer_unlock(&self) {
        let mut shared = self.lock_shared();

        shared.writers().writers_waiting -= 1;
        if shared.writers().writers_waiting == 0 && shared.writers().readers_waiting > 0 {
            self.rd_cond.notify_all();
        }

        self.write_gate.release();
    }

    // ==================== Equidad N-way ====================
    //
    // `readers_passed` cuenta los lectores admitidos en la ventana actual;
    // cada liberación de un escritor abre una ventana nueva.

    fn nway_reader_lock(&self) {
        let mut shared = self.lock_shared();

        shared.nway().readers_waiting += 1;
        // esperar mientras la cuota de la ventana esté agotada Y haya un
        // escritor en cola; si cualquiera de las dos es falsa, el lector pasa
        loop {
            let throttled = {
                let state = shared.nway();
                state.readers_passed >= state.n && state.writers_waiting > 0
            };
            if !throttled {
                break;
            }
            shared = self.rd_cond.wait(shared).unwrap();
        }

        let state = shared.nway();
        if state.readers_passed < state.n {
            // saturar para no desbordar
            state.readers_passed += 1;
        }
        state.readers_waiting -= 1;

        if shared.readers_holding == 0 {
            self.write_gate.acquire();
        }

        shared.readers_holding += 1;
    }

    fn nway_reader_unlock(&self) {
        let mut shared = self.lock_shared();

        shared.readers_holding -= 1;
        if shared.readers_holding > 0 {
            return;
        }

        // último lector de la cohorte
        self.write_gate.release();

        let state = shared.nway();
        if state.writers_waiting > 0 {
            if state.readers_passed >= state.n || state.readers_waiting == 0 {
                // cuota agotada o nadie más leyendo: turno del escritor
                self.wr_cond.notify_one();
            } else {
                // despertar solo los lectores que caben en la ventana;
                // despertar a todos generaría contención innecesaria
                let should_wake = state.n - state.readers_passed;
                if should_wake > state.readers_waiting {
                    self.rd_cond.notify_all();
                } else {
                    for _ in 0..should_wake {
                        self.rd_cond.notify_one();
                    }
                }
            }
        } else {
            // sin escritores en espera, pasan todos los lectores
            self.rd_cond.notify_all();
        }
    }

    fn nway_writer_lock(&self) {
        let mut shared = self.lock_shared();

        shared.nway().writers_waiting += 1;
        // ceder a los lectores hasta agotar la cuota de la ventana y que no
        // quede nadie leyendo
        loop {
            let must_yield = {
                let holding = shared.readers_holding;
                let state = shared.nway();
                holding > 0 || (state.readers_passed < state.n && state.readers_waiting > 0)
            };
            if !must_yield {
                break;
            }
            shared = self.wr_cond.wait(shared).unwrap();
        }

        drop(shared);
        self.write_gate.acquire();
    }

    fn nway_writer_unlock(&self) {
        self.write_gate.release();

        let mut shared = self.lock_shared();
        let state = shared.nway();
        state.writers_waiting -= 1;
        // nueva ventana
        state.readers_passed = 0;

        if state.readers_waiting > 0 {
            // despertar a lo sumo N lectores
            if state.readers_waiting > state.n {
                for _ in 0..state.n {
                    self.rd_cond.notify_one();
                }
            } else {
                self.rd_cond.notify_all();
            }
        } else {
            self.wr_cond.notify_one();
        }
    }
}
