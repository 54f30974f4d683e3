//! Devices, the active-device setting, and backend implementations
//!
//! # Architecture
//!
//! ```text
//! ActiveDevice    process-wide name of the device new values go to
//! Device          identifies one compute unit of a backend (cpu:0, ...)
//! random          default random state per (backend, device)
//! cpu             reference backend adapter (feature "cpu")
//! ```
//!
//! Backends never read the active device on their own initiative; only the
//! implicit-state random draws consult it, through [`random::default_state`].

pub mod random;

#[cfg(feature = "cpu")]
pub mod cpu;

use parking_lot::RwLock;

/// A compute unit of some backend
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device within its backend
    fn id(&self) -> usize;

    /// Check if two devices are the same
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("Device({})", self.id())
    }
}

static ACTIVE: RwLock<Option<String>> = parking_lot::const_rwlock(None);

/// Process-wide active device name
///
/// `None` means "the backend's default device".
pub struct ActiveDevice;

impl ActiveDevice {
    /// Make `name` the active device until the returned guard is dropped
    ///
    /// Guards nest: dropping one restores whatever was active before it.
    #[must_use = "the previous device is restored when the guard is dropped"]
    pub fn set(name: impl Into<String>) -> DeviceGuard {
        let name = name.into();
        tracing::debug!(device = %name, "active device changed");
        let previous = ACTIVE.write().replace(name);
        DeviceGuard { previous }
    }

    /// Name of the active device, if one was set
    pub fn active_name() -> Option<String> {
        ACTIVE.read().clone()
    }
}

/// Restores the previously active device on drop
#[derive(Debug)]
pub struct DeviceGuard {
    previous: Option<String>,
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        *ACTIVE.write() = self.previous.take();
    }
}
