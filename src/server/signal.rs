//! # Manejo de Señales
//! src/server/signal.rs
//!
//! `SIGINT` y `SIGTERM` inician el apagado ordenado. El handler solo
//! escribe un flag atómico: los handlers se instalan sin `SA_RESTART`, así
//! que un `accept` bloqueado retorna `EINTR` y el loop del acceptor vuelve
//! a mirar el flag. La cancelación de los workers la inicia el loop
//! principal, nunca el handler.

use std::io;
use std::mem;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signal: libc::c_int) {
    // seguro dentro de un handler: solo un store atómico
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Instala los handlers de `SIGINT` y `SIGTERM`
pub fn install() -> io::Result<()> {
    unsafe {
        let mut action: libc::sigaction = mem::zeroed();
        let handler: extern "C" fn(libc::c_int) = on_signal;
        action.sa_sigaction = handler as usize;
        libc::sigemptyset(&mut action.sa_mask);
        // sin SA_RESTART: accept debe despertar con EINTR
        action.sa_flags = 0;

        for signal in [libc::SIGINT, libc::SIGTERM] {
            if libc::sigaction(signal, &action, ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    Ok(())
}

/// Indica si se pidió el apagado del servidor
pub fn shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Pide el apagado por programa (equivalente a recibir una señal)
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::SeqCst);
}
