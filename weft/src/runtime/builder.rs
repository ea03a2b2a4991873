use super::Runtime;

/// Resolved runtime configuration.
///
/// Visible to runtime components through the thread-local runtime context.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Config {
    /// Whether blocking I/O calls are handed off to the waiter.
    pub(crate) wrap_io: bool,

    /// Initial capacity of the waiter's `pollfd` buffer.
    pub(crate) event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wrap_io: true,
            event_capacity: 64,
        }
    }
}

/// Builder for configuring and creating a runtime.
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new()
///     .wrap_io(false)
///     .build();
/// ```
pub struct RuntimeBuilder {
    config: Config,
}

impl RuntimeBuilder {
    /// Creates a builder with the default configuration: I/O hand-off
    /// enabled and room for 64 pending descriptors before the waiter's
    /// buffer grows.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Enables or disables the I/O hand-off.
    ///
    /// When disabled, [`io::read`](crate::io::read), [`io::poll`](crate::io::poll)
    /// and [`io::select`](crate::io::select) forward directly to the OS and
    /// block the whole runtime thread.
    pub fn wrap_io(mut self, enabled: bool) -> Self {
        self.config.wrap_io = enabled;
        self
    }

    /// Sets the initial capacity of the waiter's descriptor buffer.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn event_capacity(mut self, n: usize) -> Self {
        assert!(n > 0, "event_capacity must be > 0");

        self.config.event_capacity = n;
        self
    }

    /// Builds the runtime with the configured options.
    pub fn build(self) -> Runtime {
        Runtime::new(self.config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
