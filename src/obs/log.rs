// self
use crate::_prelude::*;

/// Side-channel sink receiving one line per terminal fetch outcome.
///
/// Implementations must not block; the pipeline ignores whatever happens inside.
pub trait FetchLogger
where
	Self: Send + Sync,
{
	/// Records a descriptive line.
	fn log(&self, message: &str);
}
impl<F> FetchLogger for F
where
	F: Send + Sync + Fn(&str),
{
	fn log(&self, message: &str) {
		self(message)
	}
}

/// Default logger forwarding lines as `tracing` events at `INFO` (no-op without the `tracing`
/// feature).
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;
impl FetchLogger for TracingLogger {
	fn log(&self, message: &str) {
		#[cfg(feature = "tracing")]
		{
			tracing::info!(target: "authorized_fetch", "{message}");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = message;
		}
	}
}

/// Logger collecting lines in memory, useful for tests and diagnostics endpoints.
#[derive(Clone, Debug, Default)]
pub struct MemoryLogger(Arc<Mutex<Vec<String>>>);
impl MemoryLogger {
	/// Snapshot of every recorded line, oldest first.
	pub fn lines(&self) -> Vec<String> {
		self.0.lock().clone()
	}
}
impl FetchLogger for MemoryLogger {
	fn log(&self, message: &str) {
		self.0.lock().push(message.to_owned());
	}
}
