pub mod config;
pub mod device;
pub mod http;
pub mod transport;

/// Common types used across modules
pub mod types {
    use serde::{Deserialize, Serialize};

    /// A normalized alert event, produced upstream and read-only here
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AlertEvent {
        /// 0 = resolved, anything else = an active problem
        pub state: i32,
        pub hostname: String,
        pub device_id: u64,
        /// Free-text description of the alert
        pub msg: String,
    }

    impl AlertEvent {
        /// Resolution/clear events suppress notification entirely.
        pub fn is_resolution(&self) -> bool {
            self.state == 0
        }
    }

    /// Result of one delivery attempt
    #[derive(Debug, Clone, Serialize)]
    pub struct DeliveryOutcome {
        pub success: bool,
        /// Human-readable diagnostic, also emitted through tracing
        pub message: String,
    }
}
