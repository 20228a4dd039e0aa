//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use proxify::config::RelayConfig;
use proxify::http::HttpServer;
use proxify::lifecycle::Shutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// An HTTP request as seen on the wire by a mock server.
#[derive(Debug, Clone)]
pub struct Captured {
    pub head: String,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    /// All values of header `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Vec<String> {
        self.head
            .lines()
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .filter(|(k, _)| k.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim().to_string())
            .collect()
    }

    pub fn header_names(&self) -> Vec<String> {
        self.head
            .lines()
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .map(|(k, _)| k.trim().to_ascii_lowercase())
            .collect()
    }
}

/// Read one HTTP/1.1 request (head plus Content-Length body).
pub async fn read_request(socket: &mut TcpStream) -> std::io::Result<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut body = buf[head_end + 4..].to_vec();

    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while body.len() < content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Ok(Captured { head, body })
}

async fn write_response(socket: &mut TcpStream, status: &str, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(body).await;
    let _ = socket.shutdown().await;
}

/// Start an upstream that answers every request with a fixed response and
/// reports each request it received.
pub async fn start_upstream(
    status: &'static str,
    content_type: &'static str,
    body: &'static [u8],
) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Ok(captured) = read_request(&mut socket).await {
                    let _ = tx.send(captured);
                    write_response(&mut socket, status, content_type, body).await;
                }
            });
        }
    });

    (addr, rx)
}

/// Start an upstream that accepts connections and never answers.
pub async fn start_stalled_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _held = socket;
                tokio::time::sleep(Duration::from_secs(60)).await;
            });
        }
    });

    addr
}

/// Start an HTTP forward proxy that answers on behalf of any target and
/// reports the request it was asked to forward.
pub async fn start_http_proxy() -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    start_upstream("200 OK", "text/plain", b"via-http-proxy").await
}

/// What a SOCKS5 client negotiated with the mock proxy.
#[derive(Debug, Clone)]
pub struct SocksHandshake {
    pub method: u8,
    pub username: Option<String>,
    pub target: String,
}

/// Start a SOCKS5 proxy that relays CONNECT streams to their target.
///
/// With `auth`, only username/password (method 0x02) with matching
/// credentials is accepted; otherwise no authentication (method 0x00).
pub async fn start_socks5_proxy(
    auth: Option<(&'static str, &'static str)>,
) -> (SocketAddr, mpsc::UnboundedReceiver<SocksHandshake>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let _ = socks5_session(socket, auth, tx).await;
            });
        }
    });

    (addr, rx)
}

async fn socks5_session(
    mut client: TcpStream,
    auth: Option<(&'static str, &'static str)>,
    tx: mpsc::UnboundedSender<SocksHandshake>,
) -> std::io::Result<()> {
    let invalid = |msg: &str| std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string());

    let mut greeting = [0u8; 2];
    client.read_exact(&mut greeting).await?;
    if greeting[0] != 0x05 {
        return Err(invalid("not socks5"));
    }
    let mut methods = vec![0u8; greeting[1] as usize];
    client.read_exact(&mut methods).await?;

    let method = if auth.is_some() { 0x02 } else { 0x00 };
    if !methods.contains(&method) {
        client.write_all(&[0x05, 0xff]).await?;
        return Err(invalid("no acceptable method"));
    }
    client.write_all(&[0x05, method]).await?;

    let mut username = None;
    if let Some((user, pass)) = auth {
        let mut header = [0u8; 2];
        client.read_exact(&mut header).await?;
        let mut uname = vec![0u8; header[1] as usize];
        client.read_exact(&mut uname).await?;
        let mut plen = [0u8; 1];
        client.read_exact(&mut plen).await?;
        let mut passwd = vec![0u8; plen[0] as usize];
        client.read_exact(&mut passwd).await?;

        let accepted = uname == user.as_bytes() && passwd == pass.as_bytes();
        client.write_all(&[0x01, if accepted { 0x00 } else { 0x01 }]).await?;
        if !accepted {
            return Err(invalid("bad credentials"));
        }
        username = Some(String::from_utf8_lossy(&uname).into_owned());
    }

    let mut request = [0u8; 4];
    client.read_exact(&mut request).await?;
    if request[1] != 0x01 {
        return Err(invalid("only CONNECT is supported"));
    }

    let host = match request[3] {
        0x01 => {
            let mut octets = [0u8; 4];
            client.read_exact(&mut octets).await?;
            IpAddr::V4(Ipv4Addr::from(octets)).to_string()
        }
        0x03 => {
            let mut len = [0u8; 1];
            client.read_exact(&mut len).await?;
            let mut name = vec![0u8; len[0] as usize];
            client.read_exact(&mut name).await?;
            String::from_utf8_lossy(&name).into_owned()
        }
        0x04 => {
            let mut octets = [0u8; 16];
            client.read_exact(&mut octets).await?;
            IpAddr::V6(Ipv6Addr::from(octets)).to_string()
        }
        _ => return Err(invalid("bad address type")),
    };
    let mut port = [0u8; 2];
    client.read_exact(&mut port).await?;
    let port = u16::from_be_bytes(port);

    let mut upstream = TcpStream::connect((host.as_str(), port)).await?;
    client
        .write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
        .await?;

    let _ = tx.send(SocksHandshake {
        method,
        username,
        target: format!("{}:{}", host, port),
    });

    tokio::io::copy_bidirectional(&mut client, &mut upstream).await?;
    Ok(())
}

/// Start the relay on a loopback port.
pub async fn start_relay(mut config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client for talking to the relay itself; ignores proxy environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// POST a raw descriptor body to the relay.
pub async fn proxify(relay: SocketAddr, descriptor: impl Into<String>) -> reqwest::Response {
    client()
        .post(format!("http://{}/proxify", relay))
        .body(descriptor.into())
        .send()
        .await
        .expect("Relay unreachable")
}
