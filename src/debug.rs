use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::RwLock;
use std::time::SystemTime;
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use crate::utils::format_datetime;

#[derive(Clone, Debug, PartialEq)]
pub enum DebugTarget {
    Console,
    File(String),
}

#[derive(Clone)]
struct DebugConfig {
    enabled: bool,
    target: DebugTarget,
}

static DEBUG_CONFIG: Lazy<RwLock<DebugConfig>> = Lazy::new(|| {
    RwLock::new(DebugConfig { enabled: false, target: DebugTarget::Console })
});

/// Turn debug output on or off. `target` is `"console"` (default), a file
/// path, or a directory (logs go to `debug.log` inside it).
pub fn set_debug(enabled: bool, target: Option<&str>) {
    let mut cfg = DEBUG_CONFIG.write().unwrap_or_else(|e| e.into_inner());
    cfg.enabled = enabled;
    cfg.target = resolve_target(target);
}

fn resolve_target(target: Option<&str>) -> DebugTarget {
    match target {
        Some(t) if t.eq_ignore_ascii_case("console") || t.is_empty() => DebugTarget::Console,
        Some(t) => {
            let path = Path::new(t);
            if path.is_dir() { DebugTarget::File(path.join("debug.log").to_string_lossy().to_string()) }
            else { DebugTarget::File(t.to_string()) }
        }
        None => DebugTarget::Console,
    }
}

pub fn is_debug() -> bool {
    DEBUG_CONFIG.read().map(|c| c.enabled).unwrap_or(false)
}

/// Write one tagged entry. No-op unless debug is enabled.
pub fn debug_log(tag: &str, message: &str) {
    if !is_debug() { return; }

    let target = match DEBUG_CONFIG.read() {
        Ok(cfg) => cfg.target.clone(),
        Err(_) => return,
    };
    let msg = format!("[{}] [{}] {}", format_datetime(SystemTime::now()), tag, message);

    match target {
        DebugTarget::Console => println!("{}", msg),
        DebugTarget::File(path) => { let _ = OpenOptions::new().create(true).append(true).open(path).map(|mut f| writeln!(f, "{}", msg)); }
    }
}

/// Adapter-side response dump.
pub fn debug_response(tag: &str, method: &str, url: &str, status: StatusCode, body_len: usize) {
    if !is_debug() { return; }
    debug_log(tag, &format!("{} {} -> {} ({} bytes)", method, url, status, body_len));
}
