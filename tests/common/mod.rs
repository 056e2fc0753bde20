//! Fixtures and a raw HTTP/1.1 client shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use rstest::fixture;
use simple_fileserver::{FileServer, ServerConfig};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub const INDEX_HTML: &str = "<h1>Simple File Server</h1>";
pub const SECRET: &str = "outside the root";

/// A temporary directory holding the served root `www/` and a sibling
/// `secret.txt` that must never be reachable.
pub struct Site {
    pub dir: TempDir,
    pub root: PathBuf,
}

impl Site {
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    pub fn outside(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> ServerConfig {
        ServerConfig::new(&self.root, "127.0.0.1", 0).unwrap()
    }
}

#[fixture]
pub fn site() -> Site {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("www");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(dir.path().join("secret.txt"), SECRET).unwrap();

    let site = Site { dir, root };
    site.write("index.html", INDEX_HTML);
    site.write("styles/site.css", "body { margin: 0; }");
    site.write("data.json", "{\"ok\":true}");
    site.write("docs/index.html", "<p>docs</p>");
    std::fs::create_dir(site.root.join("empty")).unwrap();
    site
}

pub async fn start(site: &Site) -> FileServer {
    FileServer::start(site.config()).await.unwrap()
}

/// A parsed response; header names are lowercased
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Send one request over a fresh connection with `Connection: close` and
/// read the response until the server closes the socket.
pub async fn request(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
) -> HttpResponse {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(request_head(method, path, headers).as_bytes())
        .await
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    parse_response(&raw)
}

pub async fn get(addr: SocketAddr, path: &str) -> HttpResponse {
    request(addr, "GET", path, &[]).await
}

pub fn request_head(method: &str, path: &str, headers: &[(&str, &str)]) -> String {
    let mut head = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    for (name, value) in headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str("\r\n");
    head
}

pub fn parse_response(raw: &[u8]) -> HttpResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let mut lines = head.split("\r\n");

    let status_line = lines.next().unwrap();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("malformed status line");

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    HttpResponse {
        status,
        headers,
        body: raw[split + 4..].to_vec(),
    }
}
