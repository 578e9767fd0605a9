//! Configuration options for the Ember engine.

/// Default heap region size in bytes.
pub const DEFAULT_HEAP_CAPACITY: usize = 32 * 1024;

/// Configuration options for the Ember engine.
///
/// # Example
///
/// ```
/// use ember_core::api::EngineOptions;
///
/// let options = EngineOptions {
///     heap_capacity: 8 * 1024,
/// };
/// assert_eq!(EngineOptions::default().heap_capacity, 32 * 1024);
/// # let _ = options;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Size of the fixed heap region all slot storage is drawn from.
    ///
    /// Default: 32 KiB
    pub heap_capacity: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            heap_capacity: DEFAULT_HEAP_CAPACITY,
        }
    }
}
