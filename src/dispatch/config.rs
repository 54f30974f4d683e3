//! Dispatcher configuration

/// Behavioural switches of a [`super::Dispatcher`]
///
/// The defaults match the process-wide dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Emit a `warn` event (instead of `debug`) when a registration replaces
    /// an equally specific signature
    pub warn_on_override: bool,
    /// Cache resolutions per concrete argument tuple
    pub cache_resolutions: bool,
    /// Try pairwise promotion when no signature matches
    pub promote: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            warn_on_override: false,
            cache_resolutions: true,
            promote: true,
        }
    }
}

impl DispatchConfig {
    /// Set `warn_on_override`
    pub fn with_warn_on_override(mut self, warn: bool) -> Self {
        self.warn_on_override = warn;
        self
    }

    /// Set `cache_resolutions`
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache_resolutions = cache;
        self
    }

    /// Set `promote`
    pub fn with_promotion(mut self, promote: bool) -> Self {
        self.promote = promote;
        self
    }
}
