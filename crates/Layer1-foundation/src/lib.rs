//! # herald-foundation
//!
//! Foundation layer for Herald:
//! - Event: 우선순위 기반 이벤트 레지스트리 (on / trigger / remove)
//! - Config: 레지스트리 설정 (글로벌 + 프로젝트 병합)
//! - Storage: JsonStore (설정 파일 저장/로드)
//! - Error: 공통 에러 타입
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application code                                        │
//! │   on(name, listener, priority)   trigger(name, arg)      │
//! │                     │                                    │
//! │                     ▼                                    │
//! │              EventRegistry  ◀── RegistryConfig           │
//! │        (name → priority → [listener])   ▲                │
//! │                                          │                │
//! │                                     JsonStore             │
//! │                               (~/.config/herald,          │
//! │                                ./.herald/events.json)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{RegistryConfig, RegistryConfigLayer, DEFAULT_HISTORY_SIZE, EVENTS_CONFIG_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;

// ============================================================================
// Event (이벤트 시스템)
// ============================================================================
pub use event::{
    // Global
    global_registry,
    init_global_registry,
    // Registry
    EventRegistry,
    // Listener
    IntoPropagation,
    Listener,
    ListenerFn,
    Propagation,
    // Types
    DispatchOutcome,
    DispatchRecord,
    Priority,
};
