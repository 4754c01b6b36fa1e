/// Optional plain-text log sink enabled with `--log-file <path>`
use once_cell::sync::OnceCell;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;

static LOG_FILE: OnceCell<Mutex<BufWriter<File>>> = OnceCell::new();

/// Open the log file in append mode. Failures are reported on stderr and
/// leave file logging disabled.
pub fn init_file_logging(path: Option<&str>) {
    let Some(path) = path else {
        return;
    };

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let _ = LOG_FILE.set(Mutex::new(BufWriter::new(file)));
        }
        Err(e) => {
            eprintln!("⚠️  Failed to open log file '{}': {}", path, e);
        }
    }
}

pub fn write_to_file(line: &str) {
    if let Some(writer) = LOG_FILE.get() {
        if let Ok(mut writer) = writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

pub fn flush_file_logging() {
    if let Some(writer) = LOG_FILE.get() {
        if let Ok(mut writer) = writer.lock() {
            let _ = writer.flush();
        }
    }
}
