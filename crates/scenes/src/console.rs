/// User-facing message sink.
pub trait Console {
    fn warn(&mut self, message: &str);
}

/// Console that forwards to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConsole;

impl Console for TracingConsole {
    fn warn(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}
