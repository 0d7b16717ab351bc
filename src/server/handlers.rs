//! # Handlers de GET y PUT
//! src/server/handlers.rs
//!
//! Semántica de los dos métodos soportados sobre el filesystem local. Los
//! handlers corren con el lock por URI ya tomado (lectura para GET,
//! escritura para PUT), así que toda la secuencia abrir/crear/escribir de
//! PUT ocurre bajo exclusión y la carrera abrir-luego-crear es inocua.
//!
//! Cada handler retorna un [`Outcome`]: el status a auditar y si la
//! respuesta ya fue transmitida. GET exitoso transmite su propia respuesta
//! (streaming del archivo); en todos los demás casos el dispatcher escribe
//! la respuesta enlatada.
//!
//! El mapeo de errores de filesystem a status sigue el errno crudo:
//! `EACCES`/`ENAMETOOLONG`/`EPERM`/`EROFS` (y `EISDIR` en PUT) son 403,
//! `ENOENT` es 404 en GET, y cualquier otro errno es 500.

use crate::http::{response, Request, StatusCode};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Resultado de un handler: status final y si la respuesta ya salió
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// La respuesta ya fue transmitida por el handler
    pub sent: bool,

    /// Status con el que se audita y, si falta, se responde
    pub status: StatusCode,
}

impl Outcome {
    fn sent(status: StatusCode) -> Self {
        Self { sent: true, status }
    }

    fn unsent(status: StatusCode) -> Self {
        Self {
            sent: false,
            status,
        }
    }
}

/// Mapea un errno de apertura en modo lectura a status HTTP
fn read_error_status(error: &io::Error) -> StatusCode {
    match error.raw_os_error() {
        Some(libc::EACCES) | Some(libc::ENAMETOOLONG) | Some(libc::EPERM)
        | Some(libc::EROFS) => StatusCode::Forbidden,
        Some(libc::ENOENT) => StatusCode::NotFound,
        _ => StatusCode::InternalServerError,
    }
}

/// Mapea un errno de apertura en modo escritura a status HTTP
fn write_error_status(error: &io::Error) -> StatusCode {
    match error.raw_os_error() {
        Some(libc::EISDIR) | Some(libc::EACCES) | Some(libc::ENAMETOOLONG)
        | Some(libc::EPERM) | Some(libc::EROFS) => StatusCode::Forbidden,
        _ => StatusCode::InternalServerError,
    }
}

/// Atiende un GET: transmite el archivo al cliente.
///
/// Debe llamarse con el lock del URI tomado en modo lectura.
pub fn handle_get(req: &mut Request, root: &Path) -> Outcome {
    let path = root.join(req.uri());

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => return Outcome::unsent(read_error_status(&e)),
    };

    let metadata = match file.metadata() {
        Ok(metadata) => metadata,
        Err(e) => return Outcome::unsent(read_error_status(&e)),
    };

    if metadata.is_dir() {
        return Outcome::unsent(StatusCode::Forbidden);
    }

    let size = metadata.len();
    if response::write_stream_head(req.stream_mut(), size).is_err() {
        // el cliente cortó; no hay a quién reportarle el error
        return Outcome::sent(StatusCode::Ok);
    }

    let _ = io::copy(&mut file.take(size), req.stream_mut());

    Outcome::sent(StatusCode::Ok)
}

/// Atiende un PUT: crea o reemplaza el archivo con el cuerpo del request.
///
/// Debe llamarse con el lock del URI tomado en modo escritura; la apertura,
/// la creación y las escrituras ocurren todas bajo ese lock.
pub fn handle_put(req: &mut Request, root: &Path) -> Outcome {
    let content_length = match req.content_length() {
        Some(length) => length,
        None => return Outcome::unsent(StatusCode::BadRequest),
    };

    let path = root.join(req.uri());

    let (mut file, status) = match OpenOptions::new().write(true).truncate(true).open(&path) {
        Ok(file) => (file, StatusCode::Ok),
        Err(e) if e.raw_os_error() == Some(libc::ENOENT) => {
            // no existe: crearlo con modo 0666 y responder 201
            let created = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o666)
                .open(&path);
            match created {
                Ok(file) => (file, StatusCode::Created),
                Err(e) => return Outcome::unsent(write_error_status(&e)),
            }
        }
        Err(e) => return Outcome::unsent(write_error_status(&e)),
    };

    if content_length == 0 {
        return Outcome::unsent(status);
    }

    // primero el prefijo del cuerpo que ya quedó en el buffer del parser
    let buffered = req.body().len().min(content_length as usize);
    if buffered > 0 {
        if file.write_all(&req.body()[..buffered]).is_err() {
            return Outcome::unsent(StatusCode::InternalServerError);
        }
    }

    // después, el resto del cuerpo directo del socket al archivo
    let remaining = content_length - buffered as u64;
    if remaining > 0 {
        let _ = io::copy(&mut req.stream_mut().take(remaining), &mut file);
    }

    Outcome::unsent(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn socket_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    /// Helper: Request ya parseado con los bytes dados
    fn parsed_request(raw: &[u8]) -> (Request, TcpStream) {
        let (mut client, server) = socket_pair();
        client.write_all(raw).unwrap();
        let mut req = Request::new(server);
        req.parse().expect("request de test válido");
        (req, client)
    }

    // ==================== GET ====================

    #[test]
    fn test_get_missing_file_is_404() {
        let dir = TempDir::new().unwrap();
        let (mut req, _client) = parsed_request(b"GET /missing HTTP/1.1\r\nRequest-Id: 1\r\n\r\n");

        let outcome = handle_get(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::NotFound));
    }

    #[test]
    fn test_get_directory_is_403() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        let (mut req, _client) = parsed_request(b"GET /subdir HTTP/1.1\r\nRequest-Id: 1\r\n\r\n");

        let outcome = handle_get(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::Forbidden));
    }

    #[test]
    fn test_get_streams_file_with_content_length() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a"), b"hello").unwrap();
        let (mut req, mut client) = parsed_request(b"GET /a HTTP/1.1\r\nRequest-Id: 3\r\n\r\n");

        let outcome = handle_get(&mut req, dir.path());
        assert_eq!(outcome, Outcome::sent(StatusCode::Ok));

        drop(req);
        let mut response = String::new();
        client.read_to_string(&mut response).unwrap();
        assert_eq!(
            response,
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello"
        );
    }

    #[test]
    fn test_get_empty_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vacio"), b"").unwrap();
        let (mut req, mut client) = parsed_request(b"GET /vacio HTTP/1.1\r\nRequest-Id: 1\r\n\r\n");

        let outcome = handle_get(&mut req, dir.path());
        assert_eq!(outcome, Outcome::sent(StatusCode::Ok));

        drop(req);
        let mut response = String::new();
        client.read_to_string(&mut response).unwrap();
        assert_eq!(response, "HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n");
    }

    // ==================== PUT ====================

    #[test]
    fn test_put_creates_file_with_201() {
        let dir = TempDir::new().unwrap();
        let (mut req, _client) =
            parsed_request(b"PUT /a HTTP/1.1\r\nRequest-Id: 2\r\nContent-Length: 5\r\n\r\nhello");

        let outcome = handle_put(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::Created));
        assert_eq!(std::fs::read(dir.path().join("a")).unwrap(), b"hello");
    }

    #[test]
    fn test_put_replaces_existing_file_with_200() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a"), b"contenido anterior").unwrap();
        let (mut req, _client) =
            parsed_request(b"PUT /a HTTP/1.1\r\nRequest-Id: 2\r\nContent-Length: 5\r\n\r\nhello");

        let outcome = handle_put(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::Ok));
        assert_eq!(std::fs::read(dir.path().join("a")).unwrap(), b"hello");
    }

    #[test]
    fn test_put_streams_body_remainder_from_socket() {
        let dir = TempDir::new().unwrap();
        // solo los headers llegan con el parse; el cuerpo llega después
        let (mut req, mut client) =
            parsed_request(b"PUT /tardio HTTP/1.1\r\nRequest-Id: 8\r\nContent-Length: 11\r\n\r\n");

        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            client.write_all(b"hello world").unwrap();
            client
        });

        let outcome = handle_put(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::Created));
        assert_eq!(
            std::fs::read(dir.path().join("tardio")).unwrap(),
            b"hello world"
        );
        writer.join().unwrap();
    }

    #[test]
    fn test_put_ignores_bytes_beyond_content_length() {
        let dir = TempDir::new().unwrap();
        let (mut req, _client) =
            parsed_request(b"PUT /a HTTP/1.1\r\nRequest-Id: 2\r\nContent-Length: 5\r\n\r\nhelloEXTRA");

        let outcome = handle_put(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::Created));
        assert_eq!(std::fs::read(dir.path().join("a")).unwrap(), b"hello");
    }

    #[test]
    fn test_put_zero_content_length_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let (mut req, _client) =
            parsed_request(b"PUT /vacio HTTP/1.1\r\nRequest-Id: 2\r\nContent-Length: 0\r\n\r\n");

        let outcome = handle_put(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::Created));
        assert_eq!(std::fs::read(dir.path().join("vacio")).unwrap(), b"");
    }

    #[test]
    fn test_put_missing_content_length_is_400() {
        let dir = TempDir::new().unwrap();
        let (mut req, _client) = parsed_request(b"PUT /a HTTP/1.1\r\nRequest-Id: 2\r\n\r\n");

        let outcome = handle_put(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::BadRequest));
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn test_put_invalid_content_length_is_400() {
        let dir = TempDir::new().unwrap();
        let (mut req, _client) =
            parsed_request(b"PUT /a HTTP/1.1\r\nRequest-Id: 2\r\nContent-Length: nope\r\n\r\n");

        let outcome = handle_put(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::BadRequest));
    }

    #[test]
    fn test_put_directory_is_403() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        let (mut req, _client) =
            parsed_request(b"PUT /subdir HTTP/1.1\r\nRequest-Id: 2\r\nContent-Length: 5\r\n\r\nhello");

        let outcome = handle_put(&mut req, dir.path());
        assert_eq!(outcome, Outcome::unsent(StatusCode::Forbidden));
    }
}
