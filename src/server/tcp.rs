//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread acceptor y un pool fijo de workers unidos por la cola acotada.
//! El acceptor solo acepta conexiones y las empuja a la cola envueltas en
//! un [`Request`] sin parsear; la capacidad de la cola es igual al pool,
//! así que la cantidad de conexiones aceptadas y todavía no atendidas queda
//! acotada.
//!
//! Cada worker repite el ciclo: sacar de la cola, parsear, consultar la
//! tabla de locks por URI, tomar el lock en modo lectura (GET) o escritura
//! (PUT), ejecutar el handler, escribir la línea de auditoría, soltar el
//! lock y la entrada, responder si el handler no lo hizo, y cerrar el
//! socket.
//!
//! El apagado lo dispara el flag de señales: el acceptor sale de su loop y
//! encola un mensaje de corte por worker; los workers terminan su request
//! en curso, toman el mensaje y salen, y recién entonces se los joinea.

use crate::config::Config;
use crate::http::{respond, Method, Request, StatusCode};
use crate::server::registry::LockTable;
use crate::server::{audit, handlers, signal};
use crate::sync::Queue;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

/// Elemento de la cola entre acceptor y workers
enum Task {
    /// Conexión aceptada, pendiente de parsear y atender
    Conn(Request),

    /// Pedido de terminar; un worker que lo recibe sale de su loop
    Shutdown,
}

/// Servidor HTTP/1.1 concurrente de archivos
pub struct Server {
    config: Config,
    listener: TcpListener,
    queue: Arc<Queue<Task>>,
    locks: Arc<LockTable>,
}

impl Server {
    /// Crea el servidor: reserva el puerto y arma la cola y la tabla de
    /// locks, ambas dimensionadas al pool de workers.
    pub fn new(config: Config) -> io::Result<Self> {
        let listener = TcpListener::bind(config.address())?;
        let queue = Queue::new(config.threads).expect("pool de workers vacío");
        let locks = LockTable::new(config.threads);

        Ok(Self {
            config,
            listener,
            queue: Arc::new(queue),
            locks: Arc::new(locks),
        })
    }

    /// Dirección local en la que quedó escuchando el listener
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Corre el servidor hasta que se pida el apagado.
    ///
    /// Bloquea el thread llamador: acá vive el loop del acceptor.
    pub fn run(&mut self) -> io::Result<()> {
        println!(
            "[+] Servidor escuchando en {} ({} workers)",
            self.local_addr()?,
            self.config.threads
        );

        let mut workers = Vec::with_capacity(self.config.threads);
        for i in 0..self.config.threads {
            let queue = Arc::clone(&self.queue);
            let locks = Arc::clone(&self.locks);
            let root = PathBuf::from(&self.config.root);

            let worker = thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || worker_loop(&queue, &locks, &root))?;
            workers.push(worker);
        }

        while !signal::shutdown_requested() {
            match self.listener.accept() {
                Ok((stream, _)) => {
                    // bloquea con la cola llena: back-pressure hacia el SO
                    self.queue.push(Task::Conn(Request::new(stream)));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    // señal recibida; el while vuelve a mirar el flag
                    continue;
                }
                Err(e) => {
                    eprintln!("[!] Error al aceptar conexión: {}", e);
                }
            }
        }

        println!("[*] Apagando: esperando a los workers");
        for _ in 0..workers.len() {
            self.queue.push(Task::Shutdown);
        }
        for worker in workers {
            let _ = worker.join();
        }

        Ok(())
    }
}

/// Loop de un worker: atiende requests hasta recibir el pedido de corte
fn worker_loop(queue: &Queue<Task>, locks: &LockTable, root: &Path) {
    loop {
        match queue.pop() {
            Task::Shutdown => break,
            Task::Conn(mut req) => {
                dispatch(&mut req, locks, root);
                req.finish();
            }
        }
    }
}

/// Parsea y atiende un request completo sobre su conexión.
///
/// Valida antes de tomar ningún lock: errores de parseo, `Request-Id`
/// ausente, el chequeo por método (GET con cuerpo es 400, método no
/// soportado es 501) y recién después la versión distinta de 1.1 se
/// responden sin tocar la tabla. Solo GET y PUT llegan a la sección con
/// lock, y solo ellos dejan línea de auditoría.
fn dispatch(req: &mut Request, locks: &LockTable, root: &Path) {
    if req.parse().is_err() {
        respond(req.stream_mut(), StatusCode::BadRequest);
        return;
    }

    let request_id = match req.header("Request-Id") {
        Some(id) => id.to_string(),
        None => {
            respond(req.stream_mut(), StatusCode::BadRequest);
            return;
        }
    };

    match req.method() {
        Method::Get => {
            if !req.body().is_empty() {
                // un GET no lleva cuerpo
                respond(req.stream_mut(), StatusCode::BadRequest);
                return;
            }
        }
        Method::Put => {}
        Method::Unsupported => {
            respond(req.stream_mut(), StatusCode::NotImplemented);
            return;
        }
    }

    if req.version() != (1, 1) {
        respond(req.stream_mut(), StatusCode::VersionNotSupported);
        return;
    }

    let outcome = match req.method() {
        Method::Get => {
            let entry = locks.acquire(req.uri());
            entry.lock().reader_lock();
            let outcome = handlers::handle_get(req, root);
            audit::write(req.method().as_str(), req.uri(), outcome.status, &request_id);
            entry.lock().reader_unlock();
            locks.release(entry);
            outcome
        }
        Method::Put => {
            let entry = locks.acquire(req.uri());
            entry.lock().writer_lock();
            let outcome = handlers::handle_put(req, root);
            audit::write(req.method().as_str(), req.uri(), outcome.status, &request_id);
            entry.lock().writer_unlock();
            locks.release(entry);
            outcome
        }
        Method::Unsupported => unreachable!("validado arriba"),
    };

    if !outcome.sent {
        respond(req.stream_mut(), outcome.status);
    }
}
