//! End-to-end exchange scenarios for the xhr-polling transport.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use xhr_polling::{
    HyperExchange, StreamExchange, Transport, TransportError, XhrPollingTransport,
};

#[tokio::test]
async fn full_exchange_with_origin() {
    let transport = XhrPollingTransport::new(Duration::ZERO, Duration::ZERO);
    let mut socket = transport.new_socket();

    let (mut client, server) = duplex(64 * 1024);
    let exchange = StreamExchange::new(server).with_origin("http://example.com");
    socket.accept(exchange, || {}).await.unwrap();

    let written = socket.write(b"hello").await.unwrap();
    assert_eq!(written, 5);

    let mut wire = Vec::new();
    client.read_to_end(&mut wire).await.unwrap();

    let expected = "HTTP/1.0 200 OK\r\n\
        Content-Type: text/plain; charset=UTF-8\r\n\
        Content-Length: 5\r\n\
        Access-Control-Allow-Origin: http://example.com\r\n\
        Access-Control-Allow-Credentials: true\r\n\
        \r\n\
        hello";
    assert_eq!(String::from_utf8(wire).unwrap(), expected);

    // The exchange is over; the socket is single-use.
    let mut buf = [0u8; 8];
    assert!(matches!(
        socket.read(&mut buf).await,
        Err(TransportError::NotConnected)
    ));
}

#[tokio::test]
async fn exchange_without_origin_omits_cors() {
    let transport = XhrPollingTransport::new(Duration::ZERO, Duration::ZERO);
    let mut socket = transport.new_socket();

    let (mut client, server) = duplex(64 * 1024);
    socket
        .accept(StreamExchange::new(server), || {})
        .await
        .unwrap();
    socket.write(b"payload").await.unwrap();

    let mut wire = Vec::new();
    client.read_to_end(&mut wire).await.unwrap();
    let text = String::from_utf8(wire).unwrap();
    assert!(text.contains("Content-Length: 7\r\n"));
    assert!(!text.contains("Access-Control"));
}

#[tokio::test]
async fn read_deadline_surfaces_as_timeout() {
    let transport = XhrPollingTransport::new(Duration::from_millis(40), Duration::ZERO);
    let mut socket = transport.new_socket();

    // Keep the far end alive so the read blocks instead of hitting EOF.
    let (_client, server) = duplex(64);
    socket
        .accept(StreamExchange::new(server), || {})
        .await
        .unwrap();

    let mut buf = [0u8; 8];
    match socket.read(&mut buf).await {
        Err(TransportError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_write_still_closes_the_socket() {
    let transport = XhrPollingTransport::new(Duration::ZERO, Duration::from_millis(10));
    let mut socket = transport.new_socket();

    // Far end never drains and the pipe is too small for the response, so
    // the write blocks until the deadline elapses.
    let (_client, server) = duplex(16);
    socket
        .accept(StreamExchange::new(server), || {})
        .await
        .unwrap();

    let payload = vec![b'x'; 1024];
    match socket.write(&payload).await {
        Err(TransportError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(!socket.is_connected());
}

#[tokio::test]
async fn leftover_request_bytes_precede_fresh_ones() {
    let transport = XhrPollingTransport::new(Duration::ZERO, Duration::ZERO);
    let mut socket = transport.new_socket();

    let (mut client, server) = duplex(1024);
    let exchange = StreamExchange::new(server).with_leftover(Bytes::from_static(b"1:::hi"));
    socket.accept(exchange, || {}).await.unwrap();
    client.write_all(b"more").await.unwrap();

    let mut buf = [0u8; 16];
    let n = socket.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"1:::hi");
    let n = socket.read(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"more");
}

/// Over real TCP in front of a hand-rolled HTTP layer: the server reads the
/// request head itself, hands the stream to the socket, and the client sees
/// exactly the framed one-shot response.
#[tokio::test]
async fn serves_one_exchange_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        // Minimal request-head parse, just enough to recover Origin.
        let mut head = Vec::new();
        let mut byte = [0u8; 1];
        while !head.ends_with(b"\r\n\r\n") {
            stream.read_exact(&mut byte).await.unwrap();
            head.push(byte[0]);
        }
        let head = String::from_utf8(head).unwrap();
        let origin = head
            .lines()
            .find_map(|line| line.strip_prefix("Origin: "))
            .unwrap()
            .to_string();

        let transport =
            XhrPollingTransport::new(Duration::from_secs(5), Duration::from_secs(5));
        let mut socket = transport.new_socket();
        socket
            .accept(StreamExchange::new(stream).with_origin(origin), || {})
            .await
            .unwrap();
        socket.write(b"welcome").await.unwrap();
    });

    let mut client = TcpStream::connect(addr).await.unwrap();
    client
        .write_all(
            b"GET /xhr-polling HTTP/1.1\r\n\
              Host: localhost\r\n\
              Origin: http://example.com\r\n\
              \r\n",
        )
        .await
        .unwrap();

    let mut wire = Vec::new();
    client.read_to_end(&mut wire).await.unwrap();
    let text = String::from_utf8(wire).unwrap();
    assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(text.contains("Access-Control-Allow-Origin: http://example.com\r\n"));
    assert!(text.ends_with("\r\n\r\nwelcome"));

    server.await.unwrap();
}

#[tokio::test]
async fn hyper_exchange_requires_takeover_support() {
    // A request head that never passed through a hyper connection carries no
    // takeover handle.
    let request = http::Request::builder()
        .uri("/xhr-polling")
        .header("Origin", "http://example.com")
        .body(())
        .unwrap();
    let (mut parts, ()) = request.into_parts();

    match HyperExchange::from_parts(&mut parts) {
        Err(TransportError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::Unsupported),
        other => panic!("expected unsupported takeover, got {other:?}"),
    }
}
