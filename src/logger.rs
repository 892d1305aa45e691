//! Asynchronous hot-path logger.
//!
//! A background thread owns a file and drains a ring queue of tagged log
//! elements into it, formatting each element per its tag and flushing
//! every ~10ms. The producer-side front-end takes a format string with
//! `%` placeholders (`%%` escapes a literal `%`) and pushes each literal
//! character and each substituted value as its own tagged element — no
//! string formatting happens on the hot path, only pushes onto an
//! [`SpscQueue`].
//!
//! This is distinct from the crate's ordinary `tracing` instrumentation:
//! hot-path code (the book, the matcher, the sequencer) only ever calls
//! into this logger, never `tracing` directly — see the crate-level docs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::spsc::SpscQueue;

const FLUSH_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug)]
pub enum LogValue {
    Char(char),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Default for LogValue {
    fn default() -> Self {
        LogValue::Char('\0')
    }
}

impl LogValue {
    fn write_to(self, out: &mut impl Write) -> std::io::Result<()> {
        match self {
            LogValue::Char(c) => write!(out, "{c}"),
            LogValue::I32(v) => write!(out, "{v}"),
            LogValue::U32(v) => write!(out, "{v}"),
            LogValue::I64(v) => write!(out, "{v}"),
            LogValue::U64(v) => write!(out, "{v}"),
            LogValue::F32(v) => write!(out, "{v}"),
            LogValue::F64(v) => write!(out, "{v}"),
        }
    }
}

macro_rules! impl_log_value_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for LogValue {
            fn from(v: $ty) -> Self {
                LogValue::$variant(v)
            }
        }
    };
}
impl_log_value_from!(char, Char);
impl_log_value_from!(i32, I32);
impl_log_value_from!(u32, U32);
impl_log_value_from!(i64, I64);
impl_log_value_from!(u64, U64);
impl_log_value_from!(f32, F32);
impl_log_value_from!(f64, F64);

/// One element of the hot-path logger's ring queue: either a literal
/// character from the format string, or a substituted value.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogElement {
    value: LogValue,
}

/// Background-thread file logger. Cloning an `AsyncLogger` handle shares
/// the same underlying queue and background thread; the producer side is
/// just a queue push, safe to call from the hot path.
pub struct AsyncLogger {
    queue: Arc<SpscQueue<LogElement>>,
    run: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl AsyncLogger {
    /// Spawns the background thread that owns `path` and drains the
    /// queue into it.
    ///
    /// # Panics
    /// Fatal if the file cannot be opened — a logger that cannot write
    /// is a fatal startup condition, not a recoverable one.
    pub fn new(path: impl Into<std::path::PathBuf>, queue_capacity: usize) -> Self {
        let path = path.into();
        let file = File::create(&path)
            .unwrap_or_else(|e| panic!("logger: failed to open {}: {e}", path.display()));

        let queue: Arc<SpscQueue<LogElement>> = Arc::new(SpscQueue::new(queue_capacity));
        let run = Arc::new(AtomicBool::new(true));

        let worker_queue = Arc::clone(&queue);
        let worker_run = Arc::clone(&run);
        let worker = std::thread::Builder::new()
            .name("async-logger".into())
            .spawn(move || Self::drain_loop(worker_queue, worker_run, file))
            .expect("logger: failed to spawn background thread");

        Self {
            queue,
            run,
            worker: Some(worker),
        }
    }

    fn drain_loop(queue: Arc<SpscQueue<LogElement>>, run: Arc<AtomicBool>, file: File) {
        let mut out = BufWriter::new(file);
        loop {
            let mut drained_any = false;
            while let Some(elem) = queue.next_read() {
                let _ = elem.value.write_to(&mut out);
                queue.advance_read();
                drained_any = true;
            }
            if drained_any {
                let _ = out.flush();
            }
            if !run.load(Ordering::Acquire) && queue.size() == 0 {
                break;
            }
            std::thread::sleep(FLUSH_INTERVAL);
        }
        let _ = out.flush();
    }

    /// Pushes one literal character onto the queue. Hot-path safe.
    #[inline]
    pub fn push_char(&self, c: char) {
        self.queue.next_write().value = LogValue::Char(c);
        self.queue.advance_write();
    }

    /// Pushes one substituted value onto the queue. Hot-path safe.
    #[inline]
    pub fn push_value(&self, v: impl Into<LogValue>) {
        self.queue.next_write().value = v.into();
        self.queue.advance_write();
    }

    /// Formats `fmt` against `args`, splitting on `%` placeholders
    /// (`%%` is a literal `%`), and pushes each literal character and
    /// each substituted value as its own queue element.
    ///
    /// # Panics
    /// Fatal if `fmt` has more or fewer `%` placeholders than `args`.
    pub fn log(&self, fmt: &str, args: &[LogValue]) {
        let mut arg_iter = args.iter();
        let mut chars = fmt.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '%' {
                match chars.peek() {
                    Some('%') => {
                        chars.next();
                        self.push_char('%');
                    }
                    _ => {
                        let value = *arg_iter
                            .next()
                            .expect("logger: format string has more placeholders than arguments");
                        self.push_value(value);
                    }
                }
            } else {
                self.push_char(c);
            }
        }

        assert!(
            arg_iter.next().is_none(),
            "logger: format string has fewer placeholders than arguments"
        );
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        // Wait for the queue to drain before signaling the background
        // thread to exit.
        while self.queue.size() > 0 {
            std::hint::spin_loop();
        }
        self.run.store(false, Ordering::Release);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}
