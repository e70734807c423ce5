//! Minimal HTTP/1.1 server imitating the pages API for integration tests.
//!
//! Serves one project: `GET /api/pages/<name>?...` answers with a slice of
//! the index (honouring `skip`/`limit`), `GET /api/pages/<name>/<title>`
//! answers with a small detail document. Titles listed in `fail_titles`
//! answer 500; `fail_skip` makes that index round answer 500.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use sbx_core::endpoint::Endpoint;
use serde_json::json;

#[derive(Debug, Clone, Default)]
pub struct ApiOptions {
    pub fail_titles: HashSet<String>,
    pub fail_skip: Option<usize>,
}

pub struct ApiServer {
    /// Base URL to put in `FetchConfig::base_url`.
    pub base_url: String,
    index_hits: Arc<AtomicUsize>,
    detail_paths: Arc<Mutex<Vec<String>>>,
}

impl ApiServer {
    /// Number of index-endpoint requests served so far (summary included).
    pub fn index_hits(&self) -> usize {
        self.index_hits.load(Ordering::SeqCst)
    }

    pub fn detail_paths(&self) -> Vec<String> {
        self.detail_paths.lock().unwrap().clone()
    }
}

struct State {
    name: String,
    pages: Vec<serde_json::Value>,
    /// Encoded request path → index into `pages`.
    by_path: HashMap<String, usize>,
    opts: ApiOptions,
}

/// `(id, title)` pairs become index entries carrying a fake `views` field.
pub fn start(name: &str, pages: &[(String, String)], opts: ApiOptions) -> ApiServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{}/api/pages", port);

    let endpoint = Endpoint::new(&base_url).unwrap();
    let prefix = format!("http://127.0.0.1:{}", port);
    let mut by_path = HashMap::new();
    let mut values = Vec::with_capacity(pages.len());
    for (i, (id, title)) in pages.iter().enumerate() {
        let url = endpoint.detail(name, title);
        by_path.insert(url.trim_start_matches(&prefix).to_string(), i);
        values.push(json!({"id": id, "title": title, "views": i}));
    }
    let state = Arc::new(State {
        name: name.to_string(),
        pages: values,
        by_path,
        opts,
    });
    let index_hits = Arc::new(AtomicUsize::new(0));
    let detail_paths = Arc::new(Mutex::new(Vec::new()));

    let (hits, paths) = (Arc::clone(&index_hits), Arc::clone(&detail_paths));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&state);
            let hits = Arc::clone(&hits);
            let paths = Arc::clone(&paths);
            thread::spawn(move || handle(stream, &state, &hits, &paths));
        }
    });

    ApiServer {
        base_url,
        index_hits,
        detail_paths,
    }
}

fn respond(stream: &mut std::net::TcpStream, status: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn handle(
    mut stream: std::net::TcpStream,
    state: &State,
    hits: &AtomicUsize,
    paths: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let target = request
        .lines()
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("/");
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    if let Some(&i) = state.by_path.get(path) {
        paths.lock().unwrap().push(path.to_string());
        let page = &state.pages[i];
        let title = page["title"].as_str().unwrap_or_default();
        if state.opts.fail_titles.contains(title) {
            respond(&mut stream, "500 Internal Server Error", b"{}");
            return;
        }
        let body = json!({"id": page["id"], "title": title, "lines": [{"text": title}]});
        respond(&mut stream, "200 OK", body.to_string().as_bytes());
        return;
    }

    if path.ends_with(&format!("/{}", state.name)) || path.ends_with(&format!("/{}/", state.name)) {
        hits.fetch_add(1, Ordering::SeqCst);
        let param = |k: &str| {
            query
                .split('&')
                .filter_map(|kv| kv.split_once('='))
                .find(|(key, _)| *key == k)
                .and_then(|(_, v)| v.parse::<usize>().ok())
        };
        let skip = param("skip");
        if skip.is_some() && skip == state.opts.fail_skip {
            respond(&mut stream, "500 Internal Server Error", b"{}");
            return;
        }
        let skip = skip.unwrap_or(0);
        let limit = param("limit").unwrap_or(100);
        let end = (skip + limit).min(state.pages.len());
        let slice = if skip < end { &state.pages[skip..end] } else { &[][..] };
        let body = json!({
            "projectName": state.name,
            "skip": skip,
            "limit": limit,
            "count": state.pages.len(),
            "pages": slice,
        });
        respond(&mut stream, "200 OK", body.to_string().as_bytes());
        return;
    }

    respond(&mut stream, "404 Not Found", b"{}");
}
