use std::net::SocketAddr;
use std::time::Duration;

use methodmux::{Error, Request, Router, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn connect(addr: SocketAddr) -> TcpStream {
    for _ in 0..50 {
        if let Ok(stream) = TcpStream::connect(addr).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {addr} never came up");
}

async fn send(addr: SocketAddr, raw: &str) -> String {
    let mut stream = connect(addr).await;
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

fn app() -> Router {
    Router::new()
        .get("/hello", |_req: Request| async { "hello, world" })
        .post("/echo", |req: Request| async move { String::from_utf8_lossy(req.body()).into_owned() })
}

#[tokio::test]
async fn serves_until_shutdown() {
    let addr = free_addr();
    let (tx, rx) = oneshot::channel::<()>();

    let server = Server::bind(&addr.to_string()).unwrap();
    let running = tokio::spawn(server.serve_with_shutdown(app(), async {
        let _ = rx.await;
    }));

    let res = send(addr, "GET /hello HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert!(res.ends_with("hello, world"), "{res}");

    let res = send(addr, "POST /hello HTTP/1.1\r\nHost: x\r\nConnection: close\r\nContent-Length: 0\r\n\r\n").await;
    assert!(res.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"), "{res}");
    assert!(res.to_ascii_lowercase().contains("allow: get\r\n"), "{res}");

    let res = send(addr, "GET /missing HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
    assert!(res.starts_with("HTTP/1.1 404 Not Found\r\n"), "{res}");
    assert!(res.ends_with("404 page not found\n"), "{res}");

    let res = send(
        addr,
        "POST /echo HTTP/1.1\r\nHost: x\r\nConnection: close\r\nContent-Length: 5\r\n\r\nhowdy",
    )
    .await;
    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert!(res.ends_with("howdy"), "{res}");

    tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[test]
fn bad_address_is_rejected() {
    match Server::bind("not an address") {
        Err(Error::Addr { addr, .. }) => assert_eq!(addr, "not an address"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("bound to a bogus address"),
    }
}
