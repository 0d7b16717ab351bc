//! # Primitivas de Sincronización
//! src/sync/mod.rs
//!
//! Primitivas de concurrencia reutilizables sobre las que se construye el
//! servidor:
//!
//! - [`Semaphore`]: semáforo contador (la stdlib no trae uno)
//! - [`Queue`]: cola acotada bloqueante para el traspaso acceptor → workers
//! - [`RwLock`]: lock de lectores/escritores con política de equidad
//!   seleccionable ([`Priority`])

pub mod queue;
pub mod rwlock;
pub mod semaphore;

pub use queue::Queue;
pub use rwlock::{Priority, RwLock};
pub use semaphore::Semaphore;
