use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub const TOAST_LOG_FILE: &str = "toast.log";

/// Append one notification line. Failures are logged and otherwise ignored.
pub fn append_toast_log(path: impl AsRef<Path>, msg: &str) {
    let path = path.as_ref();
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(mut file) => {
            if let Err(err) = writeln!(file, "{} - {}", Local::now().to_rfc3339(), msg) {
                tracing::warn!(?err, path = %path.display(), "toast log write failed");
            }
        }
        Err(err) => tracing::warn!(?err, path = %path.display(), "toast log open failed"),
    }
}
