use std::cell::RefCell;
use std::io::{self, Write};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

thread_local! {
    static FILTER: RefCell<Option<reload::Handle<EnvFilter, Registry>>> = const { RefCell::new(None) };
}

/// Buffers one formatted event and hands it to the console method matching
/// its level when dropped.
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        emit(self.level, text.trim_end());
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    let line = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&line),
        Level::WARN => web_sys::console::warn_1(&line),
        Level::INFO => web_sys::console::info_1(&line),
        _ => web_sys::console::debug_1(&line),
    }
}

// Native builds only run the tests.
#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buf: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buf: Vec::new(),
        }
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the console subscriber, or swap the level filter of the one
/// already installed. `level` uses `EnvFilter` syntax, e.g. `info` or
/// `jellyreq_core=debug`.
pub fn init(level: &str) {
    let reloaded = FILTER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|handle| handle.reload(env_filter(level)).is_ok())
    });
    match reloaded {
        Some(true) => tracing::debug!(level, "log level changed"),
        Some(false) => {}
        None => {
            let (filter, handle) = reload::Layer::new(env_filter(level));
            let installed = tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(MakeConsoleWriter)
                        .with_ansi(false)
                        .without_time(),
                )
                .try_init()
                .is_ok();
            if installed {
                FILTER.with(|cell| *cell.borrow_mut() = Some(handle));
                tracing::debug!(level, "console logging ready");
            }
        }
    }
}
