//! # Registro de Auditoría
//! src/server/audit.rs
//!
//! Una línea por request completado, escrita al stream de diagnóstico
//! (stderr). El dispatcher la emite después de que el handler terminó y
//! antes de soltar el lock por URI, de modo que el orden de las líneas para
//! dos requests en conflicto coincide con el orden en que observaron el
//! filesystem.

use crate::http::StatusCode;

/// Arma la línea de auditoría para un request completado.
///
/// # Ejemplo
/// ```
/// use httpserver::http::StatusCode;
/// use httpserver::server::audit;
///
/// let line = audit::line("GET", "foo.txt", StatusCode::NotFound, "1");
/// assert_eq!(line, "GET,/foo.txt,404,1");
/// ```
pub fn line(method: &str, uri: &str, status: StatusCode, request_id: &str) -> String {
    format!("{},/{},{},{}", method, uri, status.as_u16(), request_id)
}

/// Emite la línea de auditoría a stderr.
///
/// Cada registro es una única llamada a `eprintln!`, que toma el lock de
/// stderr por llamada; líneas de workers distintos no se mezclan.
pub fn write(method: &str, uri: &str, status: StatusCode, request_id: &str) {
    eprintln!("{}", line(method, uri, status, request_id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        assert_eq!(
            line("PUT", "a", StatusCode::Created, "2"),
            "PUT,/a,201,2"
        );
        assert_eq!(
            line("GET", "missing", StatusCode::NotFound, "1"),
            "GET,/missing,404,1"
        );
    }

    #[test]
    fn test_line_uses_numeric_status() {
        let line = line("GET", "a", StatusCode::Ok, "req-9");
        assert_eq!(line.split(',').nth(2), Some("200"));
    }
}
