//! End-to-end tests for building and querying a remote list.

use remotelist::{Error, Freshness, RefreshOutcome, RemoteList, Response, Transport};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

const HOUR: Duration = Duration::from_secs(3600);

/// Transport returning a fixed response and counting requests.
#[derive(Clone)]
struct CountingTransport {
    status: u16,
    body: &'static str,
    calls: Arc<AtomicUsize>,
}

impl CountingTransport {
    fn new(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for CountingTransport {
    fn get(&self, _url: &str) -> remotelist::Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Response {
            status: self.status,
            body: self.body.as_bytes().to_vec(),
        })
    }
}

fn age_file(path: &Path, age: Duration) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - age).unwrap();
}

#[test]
fn test_blocklist_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ipsum.txt");
    let transport = CountingTransport::new(200, "# comment\n\n1.2.3.4\n// note\n5.6.7.8\n");

    let list = RemoteList::builder(&path, "https://example.com/ipsum.txt", HOUR)
        .transport(transport.clone())
        .build()
        .unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(list.list(), vec!["1.2.3.4", "5.6.7.8"]);
    assert!(list.has("1.2.3.4"));
    assert!(list.has_prefix("5.6."));
    assert!(list.has_suffix(".4"));
    assert!(!list.has("9.9.9.9"));
    assert!(matches!(list.refresh_outcome(), RefreshOutcome::Downloaded { .. }));
}

#[test]
fn test_fresh_cache_is_not_downloaded_again() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");
    let transport = CountingTransport::new(200, "a.example\n");

    RemoteList::builder(&path, "https://example.com/list.txt", HOUR)
        .transport(transport.clone())
        .build()
        .unwrap();
    let second = RemoteList::builder(&path, "https://example.com/list.txt", HOUR)
        .transport(transport.clone())
        .build()
        .unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(second.refresh_outcome(), RefreshOutcome::Fresh);
    assert_eq!(second.list(), vec!["a.example"]);
}

#[test]
fn test_stale_cache_is_downloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");
    fs::write(&path, "old.example\n").unwrap();
    age_file(&path, HOUR + Duration::from_secs(1));

    let transport = CountingTransport::new(200, "new.example\n");
    let list = RemoteList::builder(&path, "https://example.com/list.txt", HOUR)
        .transport(transport.clone())
        .build()
        .unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(list.list(), vec!["new.example"]);
    assert!(matches!(list.freshness(), Freshness::Fresh { .. }));
}

#[test]
fn test_failed_download_aborts_and_keeps_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");
    fs::write(&path, "old.example\n").unwrap();
    age_file(&path, HOUR * 3);

    let result = RemoteList::builder(&path, "https://example.com/list.txt", HOUR)
        .transport(CountingTransport::new(404, "not found"))
        .build();

    assert!(matches!(result, Err(Error::Status(404))));
    assert_eq!(fs::read_to_string(&path).unwrap(), "old.example\n");
}

#[test]
fn test_failed_download_without_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");

    let result = RemoteList::builder(&path, "https://example.com/list.txt", HOUR)
        .transport(CountingTransport::new(500, ""))
        .build();

    assert!(result.unwrap_err().is_fetch());
    assert!(!path.exists());
}

#[test]
fn test_case_insensitive_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");

    let list = RemoteList::builder(&path, "https://example.com/list.txt", HOUR)
        .transport(CountingTransport::new(200, "Example.com\nother.net\n"))
        .build()
        .unwrap();

    assert!(list.has("example.com"));
    assert_eq!(list.search("EXAM"), vec!["Example.com"]);
}

#[test]
fn test_add_is_idempotent_and_memory_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");

    let list = RemoteList::builder(&path, "https://example.com/list.txt", HOUR)
        .transport(CountingTransport::new(200, "b\n"))
        .build()
        .unwrap();

    list.add("  a  ");
    let len = list.len();
    list.add("a");
    assert_eq!(list.len(), len);
    assert_eq!(list.list(), vec!["a", "b"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "b\n");
}

#[test]
fn test_shared_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");

    let list = Arc::new(
        RemoteList::builder(&path, "https://example.com/list.txt", HOUR)
            .transport(CountingTransport::new(200, "seed\n"))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                for i in 0..50 {
                    list.add(&format!("t{}-{}", t, i));
                    assert!(list.has("seed"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), 201);
    let all = list.list();
    let mut sorted = all.clone();
    sorted.sort();
    assert_eq!(all, sorted);
}

#[test]
fn test_http_download() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }
        let body = "# served\n198.51.100.1\n203.0.113.9\n";
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .unwrap();
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");
    let list = RemoteList::new(&path, &format!("http://{}/list.txt", addr), HOUR).unwrap();
    server.join().unwrap();

    assert_eq!(list.list(), vec!["198.51.100.1", "203.0.113.9"]);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# served\n198.51.100.1\n203.0.113.9\n"
    );
}
