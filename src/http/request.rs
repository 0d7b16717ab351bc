//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser incremental de requests HTTP/1.1 leídos directo del socket. Cada
//! etapa (método, URI, versión, headers) es una expresión regular anclada
//! que se aplica sobre la región todavía no parseada del buffer; si el
//! patrón aún no puede decidir, se leen más bytes del socket y se
//! reintenta. Las regex se compilan una sola vez al primer uso.
//!
//! ## Formato aceptado
//!
//! ```text
//! METODO SP /URI SP HTTP/#.# CRLF
//! Clave: Valor CRLF
//! ...
//! CRLF
//! <cuerpo>
//! ```
//!
//! - Método: 1 a 8 caracteres alfabéticos (GET/PUT sin distinguir
//!   mayúsculas; cualquier otro queda como no soportado).
//! - URI: `/` inicial más 1 a 63 caracteres de `[a-zA-Z0-9.-]`.
//! - Headers: claves de `[a-zA-Z0-9.-]` (1-128), valores ASCII imprimible
//!   (1-128), lista terminada en línea vacía.
//! - Request line + headers no pueden superar los 2048 bytes.
//!
//! El cuerpo no se parsea: lo que haya quedado en el buffer después del
//! terminador de headers se expone como prefijo del cuerpo, y el resto se
//! lee del socket durante el manejo del request. El prefijo es una vista
//! acotada sobre el buffer de entrada, con la misma vida que el request.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::io::{self, Read};
use std::net::TcpStream;
use std::time::Duration;

/// Tamaño máximo de request line + headers
pub const REQ_MAX_SIZE: usize = 2048;

/// Margen extra del buffer usado para drenar el socket al cerrar
const BUF_EXTRA: usize = 256;

// Presupuesto de lectura por etapa: el largo máximo que puede ocupar el
// token más su delimitador.
const METHOD_CHUNK_LEN: usize = 9;
const URI_CHUNK_LEN: usize = 65;
const VERSION_CHUNK_LEN: usize = 11;

static METHOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-zA-Z]{1,8}) ").unwrap());
static URI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/([a-zA-Z0-9.-]{1,63}) ").unwrap());
static VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^HTTP/([0-9])\.([0-9])\r\n").unwrap());
static HEADER_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z0-9.-]{1,128}: [ -~]{1,128}\r\n)*\r\n").unwrap());
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z0-9.-]{1,128}): ([ -~]{1,128})\r\n").unwrap());

/// Métodos HTTP que distingue el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Leer un archivo
    Get,

    /// PUT - Crear o reemplazar un archivo
    Put,

    /// Método bien formado pero no implementado (501)
    Unsupported,
}

impl Method {
    /// Nombre del método para el registro de auditoría
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Unsupported => "UNSUPPORTED",
        }
    }
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Request line con formato inválido (método, URI o versión), o
    /// conexión cortada antes de completarla
    InvalidRequestLine,

    /// Headers malformados o conexión cortada antes del terminador
    InvalidHeader,

    /// Request line + headers superan el tamaño máximo
    TooLarge,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::InvalidHeader => write!(f, "Invalid header"),
            ParseError::TooLarge => write!(f, "Request exceeds maximum size"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Un request HTTP leído de una conexión aceptada.
///
/// Es dueño del socket y del buffer de entrada durante toda la vida de la
/// conexión: el acceptor lo construye, un worker lo parsea y lo atiende, y
/// al final [`Request::finish`] cierra el socket.
pub struct Request {
    stream: TcpStream,

    /// Buffer de entrada; crece hasta `REQ_MAX_SIZE` durante el parsing
    buf: Vec<u8>,

    /// Cursor de parseo: posición del primer byte no consumido
    pc: usize,

    method: Method,
    uri: String,
    version: (u8, u8),
    headers: Vec<(String, String)>,

    /// Rango del prefijo del cuerpo dentro de `buf`
    body: (usize, usize),
}

impl Request {
    /// Envuelve una conexión aceptada, todavía sin parsear
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            buf: Vec::with_capacity(REQ_MAX_SIZE),
            pc: 0,
            method: Method::Unsupported,
            uri: String::new(),
            version: (0, 0),
            headers: Vec::new(),
            body: (0, 0),
        }
    }

    /// Parsea request line y headers desde el socket.
    ///
    /// # Errores
    /// Cualquier variante de [`ParseError`]; todas se responden con 400.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        self.parse_method()?;
        self.parse_uri()?;
        self.parse_version()?;
        self.parse_headers()?;
        self.parse_body();
        Ok(())
    }

    /// Lee del socket hasta `max` bytes más, acotado al tamaño máximo de
    /// request. Retorna cuántos bytes entraron (0 en EOF).
    fn fill(&mut self, max: usize) -> io::Result<usize> {
        let start = self.buf.len();
        let want = max.min(REQ_MAX_SIZE - start);
        if want == 0 {
            return Ok(0);
        }

        self.buf.resize(start + want, 0);
        let read = match self.stream.read(&mut self.buf[start..]) {
            Ok(read) => read,
            Err(e) => {
                self.buf.truncate(start);
                return Err(e);
            }
        };
        self.buf.truncate(start + read);
        Ok(read)
    }

    /// Reintenta una etapa leyendo hasta completar su chunk. Retorna
    /// `false` cuando ya no tiene sentido seguir leyendo para esta etapa.
    fn refill_for(&mut self, chunk: usize) -> bool {
        let available = self.buf.len() - self.pc;
        if available >= chunk || self.buf.len() >= REQ_MAX_SIZE {
            return false;
        }
        matches!(self.fill(chunk - available), Ok(read) if read > 0)
    }

    fn parse_method(&mut self) -> Result<(), ParseError> {
        loop {
            if let Some(caps) = METHOD_RE.captures(&self.buf[self.pc..]) {
                let token = caps.get(1).unwrap();
                let token = &self.buf[self.pc + token.start()..self.pc + token.end()];
                self.method = if token.eq_ignore_ascii_case(b"GET") {
                    Method::Get
                } else if token.eq_ignore_ascii_case(b"PUT") {
                    Method::Put
                } else {
                    Method::Unsupported
                };
                self.pc += caps.get(0).unwrap().end();
                return Ok(());
            }

            if !self.refill_for(METHOD_CHUNK_LEN) {
                return Err(ParseError::InvalidRequestLine);
            }
        }
    }

    fn parse_uri(&mut self) -> Result<(), ParseError> {
        loop {
            if let Some(caps) = URI_RE.captures(&self.buf[self.pc..]) {
                let token = caps.get(1).unwrap();
                let token = &self.buf[self.pc + token.start()..self.pc + token.end()];
                self.uri = String::from_utf8_lossy(token).into_owned();
                self.pc += caps.get(0).unwrap().end();
                return Ok(());
            }

            if !self.refill_for(URI_CHUNK_LEN) {
                return Err(ParseError::InvalidRequestLine);
            }
        }
    }

    fn parse_version(&mut self) -> Result<(), ParseError> {
        loop {
            if let Some(caps) = VERSION_RE.captures(&self.buf[self.pc..]) {
                let major = self.buf[self.pc + caps.get(1).unwrap().start()] - b'0';
                let minor = self.buf[self.pc + caps.get(2).unwrap().start()] - b'0';
                self.version = (major, minor);
                self.pc += caps.get(0).unwrap().end();
                return Ok(());
            }

            if !self.refill_for(VERSION_CHUNK_LEN) {
                return Err(ParseError::InvalidRequestLine);
            }
        }
    }

    fn parse_headers(&mut self) -> Result<(), ParseError> {
        loop {
            let matched = HEADER_BLOCK_RE
                .find(&self.buf[self.pc..])
                .map(|m| m.end());

            if let Some(total) = matched {
                // extraer cada header del bloque validado, sin el \r\n final
                let block = &self.buf[self.pc..self.pc + total - 2];
                let mut headers = Vec::new();
                for caps in HEADER_RE.captures_iter(block) {
                    let key = String::from_utf8_lossy(caps.get(1).unwrap().as_bytes()).into_owned();
                    let value =
                        String::from_utf8_lossy(caps.get(2).unwrap().as_bytes()).into_owned();
                    headers.push((key, value));
                }
                self.headers = headers;
                self.pc += total;
                return Ok(());
            }

            if self.buf.len() >= REQ_MAX_SIZE {
                return Err(ParseError::TooLarge);
            }
            match self.fill(REQ_MAX_SIZE - self.buf.len()) {
                Ok(read) if read > 0 => {}
                _ => return Err(ParseError::InvalidHeader),
            }
        }
    }

    /// El prefijo del cuerpo es lo que quedó en el buffer después del
    /// terminador de headers; el resto sigue en el socket.
    fn parse_body(&mut self) {
        self.body = (self.pc, self.buf.len());
        self.pc = self.buf.len();
    }

    // === Accessors ===

    /// Método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// URI del request, sin la `/` inicial
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Versión HTTP como par (mayor, menor)
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Busca un header por clave, sin distinguir mayúsculas
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Valor del header `Content-Length` como entero decimal no negativo.
    ///
    /// # Retorna
    /// `None` si el header falta, no es numérico o desborda.
    pub fn content_length(&self) -> Option<u64> {
        let value = self.header("Content-Length")?;
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        value.parse().ok()
    }

    /// Prefijo del cuerpo ya leído durante el parsing
    pub fn body(&self) -> &[u8] {
        &self.buf[self.body.0..self.body.1]
    }

    /// Acceso al socket para transmitir la respuesta o leer el resto del
    /// cuerpo
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Cierra la conexión, drenando primero lo que el cliente tenga
    /// pendiente de enviar. Cerrar con datos sin leer provocaría un RST
    /// que puede pisar la respuesta antes de que el cliente la lea.
    pub fn finish(self) {
        let _ = self
            .stream
            .set_read_timeout(Some(Duration::from_millis(100)));
        let mut scratch = [0u8; BUF_EXTRA];
        loop {
            match (&self.stream).read(&mut scratch) {
                Ok(read) if read > 0 => continue,
                _ => break,
            }
        }
    }
}
