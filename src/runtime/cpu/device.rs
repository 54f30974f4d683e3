//! CPU device identification

use crate::error::{Error, Result};
use crate::runtime::{ActiveDevice, Device};

/// A host CPU device, named `cpu` or `cpu:N`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuDevice {
    id: usize,
}

impl CpuDevice {
    /// The default host device
    pub fn new() -> Self {
        Self { id: 0 }
    }

    /// Parse a device name; only `cpu` and `cpu:N` are CPU devices
    pub fn parse(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let mut parts = lower.splitn(2, ':');
        let unknown = || Error::Backend(format!("unknown active device \"{name}\""));
        if parts.next() != Some("cpu") {
            return Err(unknown());
        }
        let id = match parts.next() {
            None => 0,
            Some(index) => index.parse().map_err(|_| unknown())?,
        };
        Ok(Self { id })
    }

    /// Device selected by [`ActiveDevice`], the default one if none is set
    pub fn active() -> Result<Self> {
        match ActiveDevice::active_name() {
            None => Ok(Self::new()),
            Some(name) => Self::parse(&name),
        }
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        format!("cpu:{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(CpuDevice::parse("cpu").unwrap().id(), 0);
        assert_eq!(CpuDevice::parse("CPU:3").unwrap().id(), 3);
        assert!(CpuDevice::parse("cuda:0").is_err());
        assert!(CpuDevice::parse("cpu:x").is_err());
        assert_eq!(CpuDevice::parse("cpu").unwrap().name(), "cpu:0");
    }
}
