//! # HTTP Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: parsea la configuración, instala los handlers de
//! señales y corre el servidor hasta recibir SIGINT/SIGTERM.

use clap::error::ErrorKind;
use clap::Parser;
use httpserver::config::Config;
use httpserver::server::{signal, Server};
use std::process;

fn main() {
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(e) => {
            let is_help =
                matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
            let _ = e.print();
            process::exit(if is_help { 0 } else { 1 });
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        process::exit(1);
    }

    if let Err(e) = signal::install() {
        eprintln!("Failed to install signal handlers: {}", e);
        process::exit(1);
    }

    let port = config.port.clone();
    let mut server = match Server::new(config) {
        Ok(server) => server,
        Err(_) => {
            eprintln!("Invalid port: {}", port);
            process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        eprintln!("Fatal server error: {}", e);
        process::exit(1);
    }
}
