use std::{
    net::SocketAddr,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use static_map_downloader::{Config, ImageStyle, UrlTemplate};

pub const JPEG_BODY: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg\xff\xd9";

/// A minimal HTTP server answering each request with the status returned by
/// `respond(request_index, path)`.
pub struct TestServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn spawn<F>(respond: F) -> Self
    where
        F: Fn(usize, &str) -> u16 + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };

                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&buf);
                let path = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("")
                    .to_owned();

                let index = {
                    let mut seen = seen.lock().unwrap();
                    seen.push(path.clone());
                    seen.len() - 1
                };
                let status = respond(index, &path);
                let body: &[u8] = if (200..300).contains(&status) {
                    JPEG_BODY
                } else {
                    b"{\"message\":\"error\"}"
                };

                let head = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { addr, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn url(&self) -> UrlTemplate {
        UrlTemplate::new(
            format!(
                "http://{}/styles/v1/{{style}}/static/{{lon}},{{lat}},{{zoom}}/{{width}}x{{height}}?access_token={{token}}",
                self.addr
            ),
            ImageStyle::default(),
            "test-token".to_owned(),
        )
    }

    pub fn config(&self, input: &Path, output: &Path) -> Config {
        Config {
            input: input.to_owned(),
            output_folder: output.to_owned(),
            url: self.url(),
            timeout: Duration::from_secs(5),
            download_delay: Duration::from_millis(0),
            usage: None,
        }
    }
}

/// Writes a CSV with `count` rows, ids 1 through `count`.
pub fn write_input(path: &Path, count: usize) {
    let mut csv = String::from("id,lat,long\n");
    for i in 1..=count {
        csv.push_str(&format!("{}.0,{}.5,-{}.25\n", i, 40 + i, 100 + i));
    }
    std::fs::write(path, csv).unwrap();
}
