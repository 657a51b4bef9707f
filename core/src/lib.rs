pub mod blame;
pub mod config;
pub mod dates;
pub mod error;
pub mod history;
pub mod session;

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::debug;
use wasm_bindgen::prelude::*;

use config::BlameConfig;
use dates::FuzzyDates;
use error::BlameError;
use history::FileHistory;
use session::collab::SameLine;
use session::{BlameRequest, BlameSession, OpenParams, Position, Setting};

// ---------------------------------------------------------------------------
// Handle storage for blame sessions across WASM calls.
// ---------------------------------------------------------------------------

/// One session per open blame view, keyed by opaque u32 handles.
/// Uses OnceLock for lazy one-time initialization and Mutex for interior mutability.
fn session_store() -> &'static Mutex<SessionStore> {
    static STORE: OnceLock<Mutex<SessionStore>> = OnceLock::new();
    STORE.get_or_init(|| Mutex::new(SessionStore::default()))
}

/// Sessions of the open views. Handle 0 is never issued.
#[derive(Default)]
struct SessionStore {
    sessions: HashMap<u32, BlameSession>,
    last_handle: u32,
}

impl SessionStore {
    fn open(&mut self, session: BlameSession) -> u32 {
        self.last_handle = self.last_handle.wrapping_add(1).max(1);
        self.sessions.insert(self.last_handle, session);
        self.last_handle
    }

    fn close(&mut self, handle: u32) {
        if self.sessions.remove(&handle).is_some() {
            debug!(handle, "Closed blame session");
        }
    }

    fn session(&mut self, handle: u32) -> Result<&mut BlameSession, String> {
        self.sessions
            .get_mut(&handle)
            .ok_or_else(|| format!("Invalid handle: {}", handle))
    }
}

fn lock_store() -> Result<MutexGuard<'static, SessionStore>, String> {
    session_store()
        .lock()
        .map_err(|_| "Failed to acquire session store lock".to_string())
}

/// Run `f` against the session behind `handle` and serialize what it returns.
fn with_session<T, F>(handle: u32, f: F) -> String
where
    T: Serialize,
    F: FnOnce(&mut BlameSession) -> Result<T, BlameError>,
{
    let mut store = match lock_store() {
        Ok(s) => s,
        Err(e) => return json_error(&e),
    };
    let session = match store.session(handle) {
        Ok(s) => s,
        Err(e) => return json_error(&e),
    };
    match f(session) {
        Ok(value) => to_json(&value),
        Err(e) => json_error(&e.to_string()),
    }
}

/// Read from the rendered view of `handle`; `None` for an unknown handle.
fn with_content<T>(handle: u32, f: impl FnOnce(&str) -> T) -> Option<T> {
    let mut store = lock_store().ok()?;
    let session = store.session(handle).ok()?;
    Some(f(session.content()))
}

// ---------------------------------------------------------------------------
// JSON result wrappers.
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HandleResult {
    handle: u32,
    title: String,
}

#[derive(Serialize)]
struct RequestResult {
    #[serde(flatten)]
    request: BlameRequest,
    args: Vec<String>,
}

#[derive(Serialize)]
struct TransitionResult {
    transition: session::Transition,
    commit_hash: Option<String>,
}

#[derive(Serialize)]
struct StatusResult {
    status: String,
}

#[derive(Serialize)]
struct ContentResult {
    content: String,
}

#[derive(Serialize)]
struct ErrorResult {
    error: String,
}

fn json_error(msg: &str) -> String {
    serde_json::to_string(&ErrorResult {
        error: msg.to_string(),
    })
    .unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", msg))
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| json_error(&format!("Serialization error: {}", e)))
}

/// `now` arrives from JS as seconds (possibly fractional); negative clamps to 0.
fn fuzzy_dates(now_secs: f64) -> FuzzyDates {
    FuzzyDates::new(now_secs.max(0.0) as u64)
}

// ---------------------------------------------------------------------------
// WASM-exported functions
// ---------------------------------------------------------------------------

/// Parse raw `git blame --porcelain` output into JSON.
///
/// Returns: JSON `{ lines, commits }`, or `{ error }` for malformed output.
#[wasm_bindgen]
pub fn parse_blame(raw_blame: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw_blame);
    match blame::parse_blame(&text) {
        Ok(data) => to_json(&data),
        Err(e) => json_error(&e.to_string()),
    }
}

/// Render raw porcelain output as the two-column blame view.
///
/// `now_secs` is the current Unix time used for relative dates.
/// Returns: JSON `{ content }`.
#[wasm_bindgen]
pub fn render_blame(raw_blame: &[u8], now_secs: f64) -> String {
    let text = String::from_utf8_lossy(raw_blame);
    match blame::render_blame(&text, &fuzzy_dates(now_secs)) {
        Ok(content) => to_json(&ContentResult { content }),
        Err(e) => json_error(&e.to_string()),
    }
}

/// Open a blame session for a view.
///
/// `params_json` holds `OpenParams` (repo_path, file_path, commit_hash,
/// original_syntax, cursor_line); `config_json` holds the user settings.
/// Returns: JSON `{ handle, title }`. Free with `close_session`.
#[wasm_bindgen]
pub fn open_session(params_json: &str, config_json: &str) -> String {
    let params: OpenParams = match serde_json::from_str(params_json) {
        Ok(p) => p,
        Err(e) => return json_error(&BlameError::from(e).to_string()),
    };
    let config = match BlameConfig::from_json(config_json) {
        Ok(c) => c,
        Err(e) => return json_error(&e.to_string()),
    };

    let session = BlameSession::open(params, &config, &SameLine);
    let title = session.title();

    let mut store = match lock_store() {
        Ok(s) => s,
        Err(e) => return json_error(&e),
    };
    let handle = store.open(session);
    to_json(&HandleResult { handle, title })
}

/// Drop the session of a closed view. The handle is invalid afterwards.
#[wasm_bindgen]
pub fn close_session(handle: u32) {
    if let Ok(mut store) = lock_store() {
        store.close(handle);
    }
}

/// Start a refresh.
///
/// Returns: JSON request (generation, file_path, commit_hash, flags) plus
/// `args` for `git`. Pass the request JSON back to `complete_refresh`.
#[wasm_bindgen]
pub fn begin_refresh(handle: u32) -> String {
    with_session(handle, |session| {
        let request = session.begin_refresh();
        Ok(RequestResult {
            args: request.git_args(),
            request,
        })
    })
}

/// Apply the output of a `git blame` run started with `begin_refresh`.
///
/// Returns: JSON `{ status: "rendered", content, title, cursor_row, first_render }`,
/// `{ status: "unchanged", title }`, `{ status: "discarded" }`, or `{ error }`.
#[wasm_bindgen]
pub fn complete_refresh(handle: u32, request_json: &str, raw_blame: &[u8], now_secs: f64) -> String {
    let request: BlameRequest = match serde_json::from_str(request_json) {
        Ok(r) => r,
        Err(e) => return json_error(&BlameError::from(e).to_string()),
    };
    let text = String::from_utf8_lossy(raw_blame);
    with_session(handle, |session| {
        session.complete_refresh(&request, &text, &fuzzy_dates(now_secs))
    })
}

/// Step to an older or newer commit of the file.
///
/// `raw_log` is the output of `git log` run with the arguments from
/// `history_log_args`.
/// Returns: JSON `{ transition, commit_hash }`; on `"refresh"` call
/// `begin_refresh` next.
#[wasm_bindgen]
pub fn blame_neighbor(
    handle: u32,
    position: &str,
    selected: bool,
    cursor_row: u32,
    raw_log: &[u8],
    follow_renames: bool,
) -> String {
    let position: Position = match position.parse() {
        Ok(p) => p,
        Err(e) => return json_error(&e.to_string()),
    };
    let history = FileHistory::parse(raw_log, follow_renames);
    with_session(handle, |session| {
        let transition =
            session.blame_neighbor(position, selected, cursor_row as usize, &history, &SameLine)?;
        Ok(TransitionResult {
            transition,
            commit_hash: session.commit_hash().map(str::to_string),
        })
    })
}

/// Result of the commit picker; an empty string means it was cancelled.
#[wasm_bindgen]
pub fn pick_commit(handle: u32, commit_hash: &str) -> String {
    let choice = Some(commit_hash.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    with_session(handle, |session| {
        let transition = session.pick_commit(choice);
        Ok(TransitionResult {
            transition,
            commit_hash: session.commit_hash().map(str::to_string),
        })
    })
}

/// Toggle `ignore_whitespace`, or select/clear a `detect_move_or_copy_within`
/// scope (`file`, `commit`, `all_commits`).
///
/// Returns: JSON `{ status }`; the view always needs a refresh afterwards.
#[wasm_bindgen]
pub fn toggle_setting(handle: u32, setting: &str, value: Option<String>, cursor_row: u32) -> String {
    let setting = match Setting::parse(setting, value.as_deref()) {
        Ok(s) => s,
        Err(e) => return json_error(&e.to_string()),
    };
    with_session(handle, |session| {
        Ok(StatusResult {
            status: session.toggle_setting(setting, cursor_row as usize),
        })
    })
}

/// Line number under the cursor in a session's view.
#[wasm_bindgen]
pub fn find_lineno(handle: u32, cursor_row: u32) -> u32 {
    with_content(handle, |content| blame::find_lineno(content, cursor_row as usize)).unwrap_or(1)
}

/// Short hash of the hunk under the cursor, if it has one.
#[wasm_bindgen]
pub fn find_selected_commit(handle: u32, cursor_row: u32) -> Option<String> {
    with_content(handle, |content| {
        blame::find_selected_commit_hash(content, cursor_row as usize)
    })
    .flatten()
}

/// Arguments for the `git log` call whose output `blame_neighbor` expects.
///
/// Returns: JSON array of strings.
#[wasm_bindgen]
pub fn history_log_args(file_path: &str, follow_renames: bool) -> String {
    to_json(&FileHistory::log_args(file_path, follow_renames))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
