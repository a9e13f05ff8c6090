use crate::shared::constants;
use lazy_static::lazy_static;
use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Clone)]
struct LoggerPaths {
    error_path: String,
    debug_path: String,
}

lazy_static! {
    static ref LOGGER: Mutex<Option<LoggerPaths>> = Mutex::new(None);
}

fn append_line(path: &str, line: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{}", line);
    }
}

fn start_file(path: &Path, title: &str) {
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
    {
        let _ = writeln!(file, "=== {} Log Started: {} ===", title, chrono::Local::now());
    }
}

/// Start fresh `debug.log`/`error.log` files in the working directory and install the panic hook.
pub fn init() {
    let mut error_path = std::env::current_dir().unwrap_or_default();
    error_path.push(constants::ERROR_LOG_FILE);

    let mut debug_path = PathBuf::from(&error_path);
    debug_path.set_file_name(constants::DEBUG_LOG_FILE);

    start_file(&error_path, "Error");
    start_file(&debug_path, "Debug");

    let paths = LoggerPaths {
        error_path: error_path.to_string_lossy().to_string(),
        debug_path: debug_path.to_string_lossy().to_string(),
    };
    match LOGGER.lock() {
        Ok(mut guard) => *guard = Some(paths.clone()),
        Err(poisoned) => *poisoned.into_inner() = Some(paths.clone()),
    }

    install_panic_hook(paths);
}

fn panic_message(info: &panic::PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        return s.to_string();
    }
    info.payload()
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Panics during a run land in both log files with a backtrace.
fn install_panic_hook(paths: LoggerPaths) {
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let report = format!(
            "\nPANIC at {}: {}\n{:?}\n",
            location,
            panic_message(info),
            Backtrace::capture()
        );

        append_line(&paths.error_path, &report);
        append_line(&paths.debug_path, &report);
        eprintln!("{} crashed. See {} for details.", constants::APP_NAME, paths.error_path);
    }));
}

fn format_line(level: &str, msg: &str) -> String {
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    format!("[{}][{}] {}", timestamp, level, msg)
}

pub fn log(level: &str, msg: &str) {
    // per-image and fatal problems also go to stderr
    if level == "WARN" || level == "ERROR" {
        eprintln!("{}: {}", level.to_lowercase(), msg);
    }

    let guard = match LOGGER.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(paths) = guard.as_ref() {
        let line = format_line(level, msg);
        append_line(&paths.debug_path, &line);

        if level != "DEBUG" && level != "INFO" {
            append_line(&paths.error_path, &line);
        }
    }
}

pub fn info(msg: &str) {
    log("INFO", msg);
}

pub fn warn(msg: &str) {
    log("WARN", msg);
}

pub fn error(msg: &str) {
    log("ERROR", msg);
}

pub fn debug(msg: &str) {
    log("DEBUG", msg);
}
