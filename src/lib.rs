//! # httpserver
//! src/lib.rs
//!
//! Servidor HTTP/1.1 concurrente de archivos. Expone `GET` y `PUT` sobre
//! TCP, persistiendo los cuerpos de los requests en el filesystem local y
//! transmitiendo archivos de vuelta, con una línea de auditoría en stderr
//! por operación completada.
//!
//! ## Arquitectura
//!
//! - `sync`: las primitivas de concurrencia (semáforo, cola acotada, lock
//!   de lectores/escritores multi-política)
//! - `http`: parsing de requests y escritura de respuestas
//! - `server`: acceptor, pool de workers, tabla de locks por URI, handlers,
//!   auditoría y señales
//! - `config`: argumentos de línea de comandos
//!
//! Un thread acceptor empuja conexiones a una cola acotada; un pool fijo de
//! workers las atiende. Los requests que tocan el mismo archivo se
//! serializan con un lock de lectores/escritores internado por URI, así que
//! dos GET corren en paralelo pero GET/PUT y PUT/PUT se excluyen, y el
//! orden de las líneas de auditoría coincide con el orden en que los
//! requests observaron el filesystem.

pub mod config;
pub mod http;
pub mod server;
pub mod sync;
