//! Config - 레지스트리 설정 관리
//!
//! - `events.rs` - RegistryConfig (디버그 추적, 히스토리, 시뮬레이션)

mod events;

pub use events::{RegistryConfig, RegistryConfigLayer, DEFAULT_HISTORY_SIZE, EVENTS_CONFIG_FILE};
