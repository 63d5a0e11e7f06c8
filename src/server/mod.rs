//! Development server
//!
//! Serves the output root as static content and reloads connected clients
//! when it changes. The server does not participate in manifest or hash
//! logic — it only observes the destination directory:
//!
//! - a notify watcher on the output root bumps an atomic generation counter
//! - HTML responses get a small script injected that long-polls
//!   `/__conveyor/poll` and reloads the page when the generation moves
//!
//! Startup failure (port in use, unwatchable root) is fatal for
//! development mode.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tiny_http::{Header, Request, Response, Server};

use crate::error::{PipelineError, PipelineResult};

const RELOAD_SCRIPT_ROUTE: &str = "/__conveyor/reload.js";
const POLL_ROUTE: &str = "/__conveyor/poll";
const POLL_TIMEOUT: Duration = Duration::from_secs(25);

const RELOAD_SCRIPT: &str = r#"(function () {
  var gen = null;
  function poll() {
    var url = "/__conveyor/poll" + (gen === null ? "" : "?gen=" + gen);
    fetch(url)
      .then(function (res) { return res.json(); })
      .then(function (body) {
        if (gen !== null && body.gen !== gen) { location.reload(); return; }
        gen = body.gen;
        poll();
      })
      .catch(function () { setTimeout(poll, 1000); });
  }
  poll();
})();
"#;

/// Static dev server with live reload over the output root
pub struct DevServer {
    addr: String,
    // Dropping the watcher would stop generation bumps; hold it for the
    // server's lifetime.
    _watcher: RecommendedWatcher,
}

impl DevServer {
    /// Bind `host:port`, serve `root`, and watch it for changes.
    ///
    /// Pass port 0 to bind an ephemeral port; [`DevServer::addr`] reports
    /// the resolved address either way.
    pub fn start(
        host: &str,
        port: u16,
        root: PathBuf,
        running: Arc<AtomicBool>,
    ) -> PipelineResult<Self> {
        let requested = format!("{host}:{port}");
        let server = Server::http(&requested).map_err(|e| PipelineError::Server {
            addr: requested.clone(),
            message: e.to_string(),
        })?;
        let addr = match server.server_addr().to_ip() {
            Some(ip) => ip.to_string(),
            None => requested.clone(),
        };

        // The initial build may have produced nothing; watch needs the
        // directory to exist.
        fs::create_dir_all(&root)?;

        let generation = Arc::new(AtomicU64::new(0));
        let bump = Arc::clone(&generation);
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if res.is_ok() {
                    bump.fetch_add(1, Ordering::SeqCst);
                }
            },
            notify::Config::default(),
        )
        .map_err(|e| PipelineError::Server {
            addr: addr.clone(),
            message: e.to_string(),
        })?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| PipelineError::Server {
                addr: addr.clone(),
                message: e.to_string(),
            })?;

        let server = Arc::new(server);
        let accept_server = Arc::clone(&server);
        thread::spawn(move || {
            for request in accept_server.incoming_requests() {
                let generation = Arc::clone(&generation);
                let root = root.clone();
                let running = Arc::clone(&running);
                // Long-polls park their thread; one thread per request keeps
                // the accept loop free.
                thread::spawn(move || handle(request, &root, &generation, &running));
            }
        });

        Ok(Self {
            addr,
            _watcher: watcher,
        })
    }

    /// Resolved listen address (`127.0.0.1:3000`)
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

fn handle(request: Request, root: &Path, generation: &AtomicU64, running: &AtomicBool) {
    let url = request.url().to_string();
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (url.as_str(), None),
    };

    let response = match path {
        RELOAD_SCRIPT_ROUTE => ok(RELOAD_SCRIPT.as_bytes().to_vec(), "application/javascript"),
        POLL_ROUTE => {
            let gen = wait_for_change(generation, query_gen(query), running);
            ok(format!(r#"{{"gen":{gen}}}"#).into_bytes(), "application/json")
        }
        _ => match resolve_path(root, path) {
            Some(file) => match fs::read(&file) {
                Ok(bytes) => {
                    let mime = content_type(&file);
                    if mime == "text/html" {
                        let html = String::from_utf8_lossy(&bytes);
                        ok(inject_reload_script(&html).into_bytes(), mime)
                    } else {
                        ok(bytes, mime)
                    }
                }
                Err(_) => not_found(),
            },
            None => not_found(),
        },
    };

    let _ = request.respond(response);
}

fn ok(bytes: Vec<u8>, mime: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut response = Response::from_data(bytes);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], mime.as_bytes()) {
        response = response.with_header(header);
    }
    response
}

fn not_found() -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_data(b"not found".to_vec()).with_status_code(404)
}

/// Map a URL path to a file under `root`, refusing anything that would
/// escape it. Directories resolve to their `index.html`.
fn resolve_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(url_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(c) => clean.push(c),
            Component::CurDir => {}
            _ => return None,
        }
    }
    let mut path = root.join(clean);
    if path.is_dir() {
        path = path.join("index.html");
    }
    path.is_file().then_some(path)
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

fn inject_reload_script(html: &str) -> String {
    let tag = format!("<script src=\"{RELOAD_SCRIPT_ROUTE}\"></script>");
    match html.rfind("</body>") {
        Some(i) => format!("{}{}\n{}", &html[..i], tag, &html[i..]),
        None => format!("{html}\n{tag}\n"),
    }
}

fn query_gen(query: Option<&str>) -> Option<u64> {
    query?
        .split('&')
        .find_map(|kv| kv.strip_prefix("gen="))
        .and_then(|v| v.parse().ok())
}

/// Block until the generation moves past `since`, the poll times out, or
/// the server is shutting down; returns the current generation.
fn wait_for_change(generation: &AtomicU64, since: Option<u64>, running: &AtomicBool) -> u64 {
    let deadline = Instant::now() + POLL_TIMEOUT;
    loop {
        let current = generation.load(Ordering::SeqCst);
        match since {
            Some(s) if current == s => {}
            _ => return current,
        }
        if Instant::now() >= deadline || !running.load(Ordering::SeqCst) {
            return current;
        }
        thread::sleep(Duration::from_millis(100));
    }
}
