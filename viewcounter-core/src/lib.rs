pub mod catalog;
pub mod config;
pub mod counter;
pub mod health;
pub mod logging;
pub mod service;
pub mod shutdown;
pub mod sync;
pub mod test_utils;

pub use config::Config;
pub use counter::{CounterError, CounterStore, GCounter, ReplicaId, VideoId};
pub use logging::{init_logging, init_logging_with_config, LogConfig};
pub use service::ViewCounterService;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Ensure the main exports are accessible
        let _ = GCounter::new();
    }
}
