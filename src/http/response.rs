//! # Escritura de Respuestas HTTP
//! src/http/response.rs
//!
//! Respuestas que el servidor arma por sí mismo. Hay dos caminos:
//!
//! - La respuesta enlatada ([`respond`]): status line fija más un cuerpo
//!   corto legible, con su `Content-Length` correcto. La usa el dispatcher
//!   para todos los códigos que el handler no transmite por su cuenta.
//! - La cabecera de streaming ([`write_stream_head`]): solo la status line
//!   `200 OK` y el `Content-Length` del archivo; el handler de GET copia el
//!   cuerpo directo del archivo al socket a continuación.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 404 Not Found\r\n
//! Content-Length: 10\r\n
//! \r\n
//! Not Found\n
//! ```

use super::StatusCode;
use std::io::{self, Write};

/// Escribe la respuesta enlatada para un código de estado.
///
/// Los errores de escritura se descartan: si el cliente cerró la conexión
/// no queda nadie a quien reportárselos.
pub fn respond<W: Write>(stream: &mut W, status: StatusCode) {
    let body = status.canned_body();
    let _ = write!(
        stream,
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.flush();
}

/// Escribe la cabecera de una respuesta `200 OK` cuyo cuerpo se va a
/// transmitir por streaming a continuación
pub fn write_stream_head<W: Write>(stream: &mut W, content_length: u64) -> io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n",
        content_length
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_respond_not_found() {
        let mut out = Vec::new();
        respond(&mut out, StatusCode::NotFound);
        assert_eq!(
            out,
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 10\r\n\r\nNot Found\n"
        );
    }

    #[test]
    fn test_respond_created() {
        let mut out = Vec::new();
        respond(&mut out, StatusCode::Created);
        assert_eq!(
            out,
            b"HTTP/1.1 201 Created\r\nContent-Length: 8\r\n\r\nCreated\n"
        );
    }

    #[test]
    fn test_respond_content_length_matches_body() {
        for status in [
            StatusCode::Ok,
            StatusCode::BadRequest,
            StatusCode::Forbidden,
            StatusCode::InternalServerError,
            StatusCode::NotImplemented,
            StatusCode::VersionNotSupported,
        ] {
            let mut out = Vec::new();
            respond(&mut out, status);

            let text = String::from_utf8(out).unwrap();
            let (head, body) = text.split_once("\r\n\r\n").unwrap();
            let length_line = head
                .lines()
                .find(|l| l.starts_with("Content-Length:"))
                .unwrap();
            let declared: usize = length_line
                .trim_start_matches("Content-Length:")
                .trim()
                .parse()
                .unwrap();
            assert_eq!(declared, body.len());
        }
    }

    #[test]
    fn test_write_stream_head() {
        let mut out = Vec::new();
        write_stream_head(&mut out, 5).unwrap();
        assert_eq!(out, b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n");
    }
}
