//! DownloadManager against a local HTTP server.
//!
//! Each test starts a one-shot server on 127.0.0.1 that answers a fixed list
//! of connections in order, then drives the real reqwest client at it.

use std::path::Path;
use std::time::Duration;

use gfs_common::DownloadError;
use gfs_fetcher::{DownloadConfig, DownloadManager, Fetch};
use test_utils::{file_names, temp_test_dir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

const ANL: &str = "gfs.t00z.pgrb2.0p25.anl";
const GRIB: &[u8] = b"GRIB\x00\x00\x00\x02subset7777";

/// What the server does with one connection.
enum Reply {
    Respond {
        status: &'static str,
        headers: Vec<(&'static str, &'static str)>,
        body: Vec<u8>,
    },
    /// Read the request and never answer.
    Stall,
}

fn ok(content_type: &'static str, body: &[u8]) -> Reply {
    Reply::Respond {
        status: "200 OK",
        headers: vec![("Content-Type", content_type)],
        body: body.to_vec(),
    }
}

/// Serve `replies` on consecutive connections and return the filter URL.
async fn serve(replies: Vec<Reply>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for reply in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request_head(&mut socket).await;

            match reply {
                Reply::Respond {
                    status,
                    headers,
                    body,
                } => {
                    let mut head = format!("HTTP/1.1 {}\r\n", status);
                    for (name, value) in headers {
                        head.push_str(&format!("{}: {}\r\n", name, value));
                    }
                    head.push_str(&format!(
                        "Content-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    ));
                    socket.write_all(head.as_bytes()).await.unwrap();
                    socket.write_all(&body).await.unwrap();
                    socket.shutdown().await.ok();
                }
                Reply::Stall => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        }
    });

    format!(
        "http://{}/cgi-bin/filter_gfs_0p25.pl?file={}&dir=%2Fgfs.20240115%2F00%2Fatmos",
        addr, ANL
    )
}

async fn read_request_head(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn manager() -> DownloadManager {
    DownloadManager::new(DownloadConfig::default()).unwrap()
}

fn assert_no_leftovers(dir: &Path) {
    assert!(
        file_names(dir).is_empty(),
        "unexpected files: {:?}",
        file_names(dir)
    );
}

// ============================================================================
// Successful downloads
// ============================================================================

#[tokio::test]
async fn test_binary_body_is_saved_with_suffix_on_repeat() {
    let dir = temp_test_dir();
    let url = serve(vec![
        ok("application/octet-stream", GRIB),
        ok("application/octet-stream", GRIB),
    ])
    .await;
    let manager = manager();

    let first = assert_ok!(manager.fetch(&url, ANL, dir.path()).await);
    assert_eq!(first.path, dir.path().join(ANL));
    assert_eq!(first.bytes, GRIB.len() as u64);
    assert_eq!(std::fs::read(&first.path).unwrap(), GRIB);

    let second = assert_ok!(manager.fetch(&url, ANL, dir.path()).await);
    assert_eq!(second.path, dir.path().join(format!("{}.1", ANL)));
    assert_eq!(std::fs::read(&second.path).unwrap(), GRIB);

    assert_eq!(
        file_names(dir.path()),
        vec![ANL.to_string(), format!("{}.1", ANL)]
    );
}

#[tokio::test]
async fn test_content_disposition_name_stays_in_dest_dir() {
    let tmp = temp_test_dir();
    let dest = tmp.path().join("dest");
    std::fs::create_dir(&dest).unwrap();

    let url = serve(vec![Reply::Respond {
        status: "200 OK",
        headers: vec![
            ("Content-Type", "application/octet-stream"),
            ("Content-Disposition", "attachment; filename=\"../a.grb\""),
        ],
        body: GRIB.to_vec(),
    }])
    .await;

    let file = assert_ok!(manager().fetch(&url, ANL, &dest).await);
    assert_eq!(file.path, dest.join("a.grb"));
    assert_eq!(file_names(&dest), vec!["a.grb"]);
    assert!(!tmp.path().join("a.grb").exists());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_html_page_is_a_failure() {
    let dir = temp_test_dir();
    let url = serve(vec![ok(
        "text/html; charset=UTF-8",
        b"<html><body>data file is not present</body></html>",
    )])
    .await;

    let err = assert_err!(manager().fetch(&url, ANL, dir.path()).await);
    assert!(
        matches!(err, DownloadError::FailurePage { ref content_type } if content_type.starts_with("text/html"))
    );
    assert_no_leftovers(dir.path());
}

#[tokio::test]
async fn test_empty_body_is_a_failure() {
    let dir = temp_test_dir();
    let url = serve(vec![ok("application/octet-stream", b"")]).await;

    let err = assert_err!(manager().fetch(&url, ANL, dir.path()).await);
    assert!(matches!(err, DownloadError::EmptyBody));
    assert_no_leftovers(dir.path());
}

#[tokio::test]
async fn test_error_status_is_a_failure() {
    let dir = temp_test_dir();
    let url = serve(vec![Reply::Respond {
        status: "404 Not Found",
        headers: vec![("Content-Type", "text/html")],
        body: b"not found".to_vec(),
    }])
    .await;

    let err = assert_err!(manager().fetch(&url, ANL, dir.path()).await);
    assert!(matches!(err, DownloadError::Status(404)));
    assert_eq!(err.kind(), "status");
    assert_no_leftovers(dir.path());
}

#[tokio::test]
async fn test_stalled_response_times_out() {
    let dir = temp_test_dir();
    let url = serve(vec![Reply::Stall]).await;
    let manager = DownloadManager::new(DownloadConfig {
        request_timeout: Duration::from_millis(300),
        connect_timeout: Duration::from_secs(5),
    })
    .unwrap();

    let err = assert_err!(manager.fetch(&url, ANL, dir.path()).await);
    assert!(matches!(err, DownloadError::Timeout), "got {:?}", err);
    assert_no_leftovers(dir.path());
}
