use std::io::Write;
use std::net::{Shutdown, TcpListener as StdTcpListener, TcpStream as StdTcpStream};
use std::thread;
use std::time::Duration;

use ingest_http::connection::SocketReceiver;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

const SENT: usize = 2047;
const CAPACITIES: [usize; 7] = [1, 16, 1000, 1024, 2047, 2048, 4096];
const RECEIVE_LIMIT: Duration = Duration::from_secs(5);

fn payload() -> Vec<u8> {
    (0..SENT).map(|i| b'!' + (i % 90) as u8).collect()
}

#[tokio::test]
async fn receives_2047_bytes_whatever_the_initial_capacity() {
    let data = payload();

    for capacity in CAPACITIES {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let sent = data.clone();
        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream.write_all(&sent).await.unwrap();
            // the single write is the whole message
            stream.shutdown().await.unwrap();
            stream
        });

        let (stream, _) = listener.accept().await.unwrap();
        let client_stream = client.await.unwrap();

        let mut receiver = SocketReceiver::with_capacity(capacity, stream);
        let buffer = tokio::time::timeout(RECEIVE_LIMIT, receiver.receive())
            .await
            .unwrap_or_else(|_| panic!("capacity {capacity}: receive did not finish"))
            .unwrap();

        assert_eq!(buffer.size(), SENT, "capacity {capacity}");
        assert_eq!(buffer.as_bytes(), &data[..], "capacity {capacity}");
        assert!(buffer.capacity() >= buffer.size());
        drop(client_stream);
    }
}

#[tokio::test]
async fn exact_fit_ends_on_the_closing_read() {
    let data = payload();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let sent = data.clone();
    let client = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(&sent).await.unwrap();
        stream.shutdown().await.unwrap();
        stream
    });

    let (stream, _) = listener.accept().await.unwrap();
    let _client_stream = client.await.unwrap();

    let mut receiver = SocketReceiver::with_capacity(SENT, stream);
    let buffer = tokio::time::timeout(RECEIVE_LIMIT, receiver.receive()).await.unwrap().unwrap();

    assert_eq!(buffer.as_bytes(), &data[..]);
    assert_eq!(buffer.capacity(), SENT * 2);
}

#[tokio::test]
async fn peer_closing_without_data_gives_empty_buffer() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client = tokio::spawn(async move {
        let stream = TcpStream::connect(addr).await.unwrap();
        drop(stream);
    });

    let (stream, _) = listener.accept().await.unwrap();
    client.await.unwrap();

    let buffer = tokio::time::timeout(RECEIVE_LIMIT, SocketReceiver::new(stream).receive()).await.unwrap().unwrap();
    assert!(buffer.is_empty());
}

#[test]
fn blocking_receive_over_std_sockets() {
    let data = payload();

    for capacity in CAPACITIES {
        let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let sent = data.clone();
        let client = thread::spawn(move || {
            let mut stream = StdTcpStream::connect(addr).unwrap();
            stream.write_all(&sent).unwrap();
            stream.shutdown(Shutdown::Write).unwrap();
            stream
        });

        let (stream, _) = listener.accept().unwrap();
        // a stalled read fails the test instead of hanging it
        stream.set_read_timeout(Some(RECEIVE_LIMIT)).unwrap();
        let client_stream = client.join().unwrap();

        let buffer = SocketReceiver::with_capacity(capacity, stream).receive_blocking().unwrap();
        assert_eq!(buffer.size(), SENT, "capacity {capacity}");
        assert_eq!(buffer.as_bytes(), &data[..], "capacity {capacity}");
        drop(client_stream);
    }
}
