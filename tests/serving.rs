//! End-to-end request serving over real TCP connections.

mod common;

use common::{get, request, site, start, Site, INDEX_HTML, SECRET};
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn root_serves_index(site: Site) {
    let server = start(&site).await;

    let resp = get(server.local_addr(), "/").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(
        resp.header("content-length"),
        Some(INDEX_HTML.len().to_string().as_str())
    );
    assert_eq!(resp.text(), INDEX_HTML);

    server.stop().await;
}

#[rstest]
#[case::trailing_slash("/docs/")]
#[case::no_trailing_slash("/docs")]
#[tokio::test]
async fn subdirectory_serves_its_index(site: Site, #[case] path: &str) {
    let server = start(&site).await;

    let resp = get(server.local_addr(), path).await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.text(), "<p>docs</p>");

    server.stop().await;
}

#[rstest]
#[case::missing_file("/missing.html")]
#[case::missing_dir("/nope/index.html")]
#[case::dir_without_index("/empty/")]
#[case::file_as_dir("/index.html/")]
#[tokio::test]
async fn unresolvable_paths_are_404(site: Site, #[case] path: &str) {
    let server = start(&site).await;

    let resp = get(server.local_addr(), path).await;
    assert_eq!(resp.status, 404, "path {path}");

    server.stop().await;
}

#[rstest]
#[case::dot_dot("/../secret.txt")]
#[case::nested_dot_dot("/docs/../../secret.txt")]
#[case::encoded_dots("/%2e%2e/secret.txt")]
#[case::encoded_upper("/%2E%2E/secret.txt")]
#[case::encoded_slash("/..%2fsecret.txt")]
#[case::fully_encoded("/%2e%2e%2fsecret.txt")]
#[case::nul_byte("/index.html%00.txt")]
#[tokio::test]
async fn traversal_is_rejected(site: Site, #[case] path: &str) {
    let server = start(&site).await;

    let resp = get(server.local_addr(), path).await;
    assert_eq!(resp.status, 404, "path {path}");
    assert!(!resp.text().contains(SECRET));

    server.stop().await;
}

#[cfg(unix)]
#[rstest]
#[tokio::test]
async fn symlink_out_of_root_is_rejected(site: Site) {
    std::os::unix::fs::symlink(site.outside().join("secret.txt"), site.root.join("leak.txt"))
        .unwrap();
    std::os::unix::fs::symlink(site.outside(), site.root.join("up")).unwrap();
    let server = start(&site).await;

    for path in ["/leak.txt", "/up/secret.txt"] {
        let resp = get(server.local_addr(), path).await;
        assert_eq!(resp.status, 404, "path {path}");
        assert!(!resp.text().contains(SECRET));
    }

    server.stop().await;
}

#[rstest]
#[case("/styles/site.css", "text/css; charset=utf-8")]
#[case("/data.json", "application/json")]
#[case("/index.html", "text/html; charset=utf-8")]
#[tokio::test]
async fn content_type_follows_extension(site: Site, #[case] path: &str, #[case] expected: &str) {
    let server = start(&site).await;

    let resp = get(server.local_addr(), path).await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-type"), Some(expected));

    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn unknown_extension_is_octet_stream(site: Site) {
    site.write("blob.xyz", [0u8, 159, 146, 150]);
    let server = start(&site).await;

    let resp = get(server.local_addr(), "/blob.xyz").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-type"), Some("application/octet-stream"));
    assert_eq!(resp.body, [0u8, 159, 146, 150]);

    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn encoded_names_are_decoded(site: Site) {
    site.write("my file.txt", "spaced");
    let server = start(&site).await;

    let resp = get(server.local_addr(), "/my%20file.txt").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.text(), "spaced");

    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn repeated_requests_are_identical(site: Site) {
    let server = start(&site).await;
    let addr = server.local_addr();

    let first = get(addr, "/styles/site.css").await;
    let second = get(addr, "/styles/site.css").await;
    assert_eq!(first.status, second.status);
    assert_eq!(first.body, second.body);
    assert_eq!(first.header("etag"), second.header("etag"));

    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn head_and_method_handling(site: Site) {
    let server = start(&site).await;
    let addr = server.local_addr();

    let head = request(addr, "HEAD", "/data.json", &[]).await;
    assert_eq!(head.status, 200);
    assert_eq!(head.header("content-length"), Some("11"));
    assert!(head.body.is_empty());

    let post = request(addr, "POST", "/data.json", &[("Content-Length", "0")]).await;
    assert_eq!(post.status, 405);
    assert_eq!(post.header("allow"), Some("GET, HEAD, OPTIONS"));

    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn range_and_conditional_requests(site: Site) {
    site.write("digits.txt", "0123456789");
    let server = start(&site).await;
    let addr = server.local_addr();

    let partial = request(addr, "GET", "/digits.txt", &[("Range", "bytes=2-5")]).await;
    assert_eq!(partial.status, 206);
    assert_eq!(partial.header("content-range"), Some("bytes 2-5/10"));
    assert_eq!(partial.text(), "2345");

    let full = get(addr, "/digits.txt").await;
    let etag = full.header("etag").unwrap().to_string();
    let cached = request(addr, "GET", "/digits.txt", &[("If-None-Match", etag.as_str())]).await;
    assert_eq!(cached.status, 304);
    assert!(cached.body.is_empty());

    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn concurrent_clients_get_their_own_file(site: Site) {
    const CLIENTS: usize = 32;
    for i in 0..CLIENTS {
        site.write(&format!("files/{i}.txt"), format!("file number {i}").repeat(64));
    }
    let server = start(&site).await;
    let addr = server.local_addr();

    let mut handles = Vec::with_capacity(CLIENTS);
    for i in 0..CLIENTS {
        handles.push(tokio::spawn(async move {
            (i, get(addr, &format!("/files/{i}.txt")).await)
        }));
    }

    for handle in handles {
        let (i, resp) = handle.await.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.text(), format!("file number {i}").repeat(64));
    }

    server.stop().await;
}
