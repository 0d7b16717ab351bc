//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que emite el servidor. Cada código tiene asociada una
//! reason phrase estándar y un cuerpo fijo ("respuesta enlatada") que el
//! dispatcher usa cuando el handler no transmitió su propia respuesta.

/// Códigos de estado HTTP que soporta el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 201 Created - PUT creó un archivo nuevo
    Created = 201,

    /// 400 Bad Request - Request malformado o headers requeridos ausentes
    BadRequest = 400,

    /// 403 Forbidden - Sin permisos, o el destino es un directorio
    Forbidden = 403,

    /// 404 Not Found - El archivo no existe
    NotFound = 404,

    /// 500 Internal Server Error - Cualquier otra falla en runtime
    InternalServerError = 500,

    /// 501 Not Implemented - Método válido pero no soportado
    NotImplemented = 501,

    /// 505 Version Not Supported - Versión HTTP distinta de 1.1
    VersionNotSupported = 505,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use httpserver::http::StatusCode;
    /// assert_eq!(StatusCode::Created.as_u16(), 201);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna la reason phrase estándar asociada al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::VersionNotSupported => "Version Not Supported",
        }
    }

    /// Cuerpo fijo de la respuesta enlatada para este código
    pub fn canned_body(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK\n",
            StatusCode::Created => "Created\n",
            StatusCode::BadRequest => "Bad Request\n",
            StatusCode::Forbidden => "Forbidden\n",
            StatusCode::NotFound => "Not Found\n",
            StatusCode::InternalServerError => "Internal Server Error\n",
            StatusCode::NotImplemented => "Not Implemented\n",
            StatusCode::VersionNotSupported => "Version Not Supported\n",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        matches!(self, StatusCode::Ok | StatusCode::Created)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
