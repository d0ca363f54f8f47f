//! Canned HTTP/1.1 responder for client tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub(crate) struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: &'static str,
}

impl CannedResponse {
    pub(crate) fn json(status: u16, body: &'static str) -> Self {
        Self { status, content_type: "application/json", body }
    }

    pub(crate) fn text(status: u16, body: &'static str) -> Self {
        Self { status, content_type: "text/plain", body }
    }
}

pub(crate) struct CannedServer {
    pub base_url: String,
    handle: JoinHandle<Vec<String>>,
}

impl CannedServer {
    /// Wait for every canned response to be served and return the request heads.
    pub(crate) async fn finish(self) -> Vec<String> {
        self.handle.await.unwrap()
    }
}

/// Serve each response on its own connection, in order.
pub(crate) async fn serve(responses: Vec<CannedResponse>) -> CannedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            requests.push(String::from_utf8_lossy(&head).into_owned());

            let reply = format!(
                "HTTP/1.1 {} Canned\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                response.status,
                response.content_type,
                response.body.len(),
                response.body
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        requests
    });

    CannedServer { base_url, handle }
}
