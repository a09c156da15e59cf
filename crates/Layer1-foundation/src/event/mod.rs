//! Event System - 우선순위 기반 이벤트 레지스트리
//!
//! 이름 있는 이벤트에 리스너를 등록하고, trigger 시 우선순위 순서로 호출한다.
//! 어떤 리스너든 `Propagation::Stop`을 반환해 이후 전파를 막을 수 있다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      EventRegistry                         │
//! │                                                            │
//! │   "user.login" ─┬─ HIGH (10)    [audit]                    │
//! │                 ├─ 75           [rate_limit]               │
//! │                 └─ NORMAL (100) [welcome, metrics]         │
//! │                                                            │
//! │   trigger("user.login", arg)                               │
//! │     1. 락 안에서 스냅샷 복사                                 │
//! │     2. 락 해제                                              │
//! │     3. audit → rate_limit → welcome → metrics              │
//! │        (Stop 반환 시 중단, Err는 그대로 반환)                │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use herald_foundation::event::{EventRegistry, Listener, Priority, Propagation};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(EventRegistry::new());
//!
//! // 1. 리스너 등록
//! registry.on("user.login", Listener::named("welcome", |arg| {
//!     tracing::info!(?arg, "welcome back");
//! }));
//!
//! // 2. 우선순위 지정 + 전파 중단
//! registry.on_with_priority("user.login", Listener::new(|_| Propagation::Stop), Priority::HIGH);
//!
//! // 3. 이벤트 발생
//! let completed = registry.trigger("user.login", Some(&serde_json::json!({"id": 1})))?;
//! assert!(!completed);
//! ```

mod history;
mod listener;
mod priority;
mod registry;

// Re-exports
pub use history::{DispatchOutcome, DispatchRecord};
pub use listener::{IntoPropagation, Listener, ListenerFn, Propagation};
pub use priority::Priority;
pub use registry::{global_registry, init_global_registry, EventRegistry};
