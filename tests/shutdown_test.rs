//! Test de apagado ordenado
//! tests/shutdown_test.rs
//!
//! Va en su propio binario de tests porque el flag de apagado es global al
//! proceso: una vez pedido el corte, ningún otro servidor del mismo proceso
//! volvería a aceptar conexiones.

use httpserver::config::Config;
use httpserver::server::{signal, Server};
use std::net::TcpStream;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_shutdown_flag_stops_server_and_joins_workers() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        threads: 2,
        port: "0".to_string(),
        root: dir.path().to_string_lossy().into_owned(),
    };

    let mut server = Server::new(config).expect("bind");
    let addr = server.local_addr().unwrap();

    let (tx, rx) = mpsc::channel();
    let runner = thread::spawn(move || {
        let result = server.run();
        tx.send(()).unwrap();
        result
    });

    // el servidor atiende normalmente antes del corte
    {
        use std::io::{Read, Write};
        let mut stream = TcpStream::connect(addr).unwrap();
        stream
            .write_all(b"PUT /x HTTP/1.1\r\nRequest-Id: 1\r\nContent-Length: 2\r\n\r\nok")
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        assert!(response.starts_with("HTTP/1.1 201 Created\r\n"));
    }

    signal::request_shutdown();
    // despertar al acceptor bloqueado en accept
    drop(TcpStream::connect(addr));

    // run() debe salir del loop, encolar los cortes y joinear los workers
    rx.recv_timeout(Duration::from_secs(5))
        .expect("el servidor no terminó tras pedir el apagado");
    assert!(runner.join().unwrap().is_ok());

    // el trabajo previo al corte quedó persistido
    assert_eq!(std::fs::read(dir.path().join("x")).unwrap(), b"ok");
}
