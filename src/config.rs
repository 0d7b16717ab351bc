//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por línea de comandos:
//!
//! ```bash
//! httpserver [-t THREADS] PORT
//! ```
//!
//! `THREADS` (default 4) fija el tamaño del pool de workers, y con él la
//! capacidad de la cola de conexiones y de la tabla de locks. `PORT` se
//! mantiene como string para poder reportar `Invalid port: ...` con el
//! valor original, sea no numérico o fuera de rango.

use clap::Parser;

/// Configuración del servidor HTTP/1.1 de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "httpserver")]
#[command(about = "Servidor HTTP/1.1 concurrente de archivos")]
pub struct Config {
    /// Cantidad de threads workers
    #[arg(short = 't', long = "threads", value_name = "THREADS", default_value_t = 4)]
    pub threads: usize,

    /// Puerto TCP en el que escucha el servidor (1-65535)
    #[arg(value_name = "PORT")]
    pub port: String,

    /// Directorio contra el que se resuelven los URIs
    #[arg(long, value_name = "DIR", default_value = ".", hide = true)]
    pub root: String,
}

impl Config {
    /// Valida la configuración.
    ///
    /// # Retorna
    /// El mensaje de error listo para imprimir en stderr.
    pub fn validate(&self) -> Result<(), String> {
        if self.threads == 0 {
            return Err(format!("Invalid thread count: {}", self.threads));
        }
        self.port_number().map(|_| ())
    }

    /// Puerto como número, validando el rango [1, 65535]
    pub fn port_number(&self) -> Result<u16, String> {
        match self.port.parse::<u32>() {
            Ok(port) if (1..=65535).contains(&port) => Ok(port as u16),
            _ => Err(format!("Invalid port: {}", self.port)),
        }
    }

    /// Dirección completa para el bind
    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 4,
            port: "8080".to_string(),
            root: ".".to_string(),
        }
    }
}
