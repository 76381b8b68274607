//! Integration tests for the control and peer channels.
//!
//! These bind real sockets on loopback with port 0 so the OS picks a
//! free port for every test.

use tictac_transport::{ControlConnection, ControlListener, PeerChannel};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_control_accept_and_exchange_bytes() {
    let listener = ControlListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("local addr").to_string();

    let server = tokio::spawn(async move {
        listener.accept().await.expect("should accept")
    });
    let client = ControlConnection::connect(&addr)
        .await
        .expect("should connect");
    let accepted = server.await.expect("task should complete");

    // The server sees the client's local address as the peer address.
    assert_eq!(
        accepted.peer_addr(),
        client.local_addr().expect("client local addr")
    );
    assert_ne!(accepted.id(), client.id());

    let (mut server_read, mut server_write) = accepted.into_split();
    let (mut client_read, mut client_write) = client.into_split();

    client_write.write_all(b"ping").await.expect("write");
    let mut buf = [0u8; 4];
    server_read.read_exact(&mut buf).await.expect("read");
    assert_eq!(&buf, b"ping");

    server_write.write_all(b"pong").await.expect("write");
    client_read.read_exact(&mut buf).await.expect("read");
    assert_eq!(&buf, b"pong");
}

#[tokio::test]
async fn test_control_connect_refused_returns_connect_failed() {
    // Bind then drop to get a port that is very likely closed.
    let listener = ControlListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result = ControlConnection::connect(&addr).await;
    assert!(matches!(
        result,
        Err(tictac_transport::TransportError::ConnectFailed { .. })
    ));
}

#[tokio::test]
async fn test_peer_channel_send_and_receive() {
    let a = PeerChannel::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind a");
    let b = PeerChannel::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind b");
    let a_addr = a.local_addr().unwrap();
    let b_addr = b.local_addr().unwrap();

    a.send_to(b"2 3\n", b_addr).await.expect("send");
    let (data, from) = b.recv_from().await.expect("recv");

    assert_eq!(data, b"2 3\n");
    assert_eq!(from, a_addr);
}
