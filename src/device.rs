//! Device display-name lookup used for diagnostic log lines.
//!
//! Best-effort only: the resolved name never reaches the remote endpoint,
//! and a miss falls back to the raw device id.

use std::collections::HashMap;

use crate::config::DeviceMapping;

/// Maps an opaque device id to a display name
pub trait DeviceResolver: Send + Sync {
    fn device_name(&self, device_id: u64) -> Option<String>;
}

/// Fixed lookup table built from configuration
pub struct StaticDeviceCache {
    names: HashMap<u64, String>,
}

impl StaticDeviceCache {
    pub fn new(mappings: &[DeviceMapping]) -> Self {
        Self {
            names: mappings.iter().map(|m| (m.id, m.name.clone())).collect(),
        }
    }
}

impl DeviceResolver for StaticDeviceCache {
    fn device_name(&self, device_id: u64) -> Option<String> {
        self.names.get(&device_id).cloned()
    }
}
