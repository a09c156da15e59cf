//! Event Registry - 우선순위 기반 이벤트 디스패처
//!
//! 이벤트 이름별로 리스너를 우선순위 버킷에 보관하고, trigger 시 오름차순
//! 우선순위(같은 우선순위는 등록 순서)로 호출한다.

use super::history::{DispatchHistory, DispatchOutcome, DispatchRecord};
use super::listener::{Listener, Propagation};
use super::priority::Priority;
use crate::config::RegistryConfig;
use crate::Result;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, trace};

/// 우선순위 -> 등록 순서대로의 리스너 목록
type Buckets = BTreeMap<Priority, Vec<Listener>>;

// ============================================================================
// EventRegistry
// ============================================================================

/// 이벤트 레지스트리
///
/// 모든 연산은 하나의 락으로 직렬화된다. trigger는 락 안에서 리스너 스냅샷만
/// 복사하고 락을 푼 뒤 호출하므로, 리스너 안에서 레지스트리를 다시 호출해도 된다.
///
/// ## 사용법
///
/// ```ignore
/// use herald_foundation::event::{EventRegistry, Listener, Priority, Propagation};
///
/// let registry = EventRegistry::new();
///
/// let guard = Listener::named("guard", |_| Propagation::Stop);
/// registry.on_with_priority("request.received", guard.clone(), Priority::HIGH);
///
/// // guard가 Stop을 반환하므로 false
/// assert!(!registry.trigger("request.received", None)?);
///
/// registry.remove_listener("request.received", &guard);
/// ```
pub struct EventRegistry {
    /// 설정
    config: RegistryConfig,

    /// 이벤트 이름 -> 우선순위 버킷
    listeners: Mutex<HashMap<String, Buckets>>,

    /// 시뮬레이션 모드
    simulate: AtomicBool,

    /// 디스패치 히스토리
    history: Mutex<DispatchHistory>,

    /// 총 trigger 횟수
    dispatch_count: AtomicU64,
}

impl EventRegistry {
    /// 기본 설정으로 레지스트리 생성
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// 커스텀 설정으로 레지스트리 생성
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            simulate: AtomicBool::new(config.simulate),
            history: Mutex::new(DispatchHistory::new(config.history_size)),
            config,
            listeners: Mutex::new(HashMap::new()),
            dispatch_count: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ========================================================================
    // 등록
    // ========================================================================

    /// 기본 우선순위(NORMAL)로 리스너 등록
    pub fn on(&self, event: impl Into<String>, listener: Listener) {
        self.on_with_priority(event, listener, Priority::NORMAL);
    }

    /// 우선순위를 지정해 리스너 등록
    ///
    /// 같은 리스너를 다시 등록하면 별도의 항목으로 추가된다.
    pub fn on_with_priority(&self, event: impl Into<String>, listener: Listener, priority: Priority) {
        let event = event.into();

        debug!(
            event = %event,
            priority = priority.value(),
            listener = listener.name(),
            "Registering event listener"
        );

        let mut listeners = self.listeners.lock();
        listeners
            .entry(event)
            .or_default()
            .entry(priority)
            .or_default()
            .push(listener);
    }

    // ========================================================================
    // 디스패치
    // ========================================================================

    /// 이벤트 발생
    ///
    /// - 리스너가 `Stop`을 반환하면 즉시 중단하고 `Ok(false)`
    /// - 모든 리스너가 끝나거나 리스너가 없으면 `Ok(true)`
    /// - 리스너 에러는 그대로 반환되고 나머지 리스너는 호출되지 않는다
    pub fn trigger(&self, event: &str, arg: Option<&Value>) -> Result<bool> {
        let dispatch_no = self.dispatch_count.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = Utc::now();
        let start = Instant::now();

        // 락은 스냅샷 복사 동안만 잡는다
        let snapshot = self.listeners(event);

        if self.config.debug_mode {
            trace!(
                event = %event,
                listeners = snapshot.len(),
                simulate = self.is_simulating(),
                "Triggering event #{}", dispatch_no
            );
        }

        let finish = |invoked: usize, outcome: DispatchOutcome| {
            self.record(DispatchRecord {
                event: event.to_string(),
                started_at,
                duration: start.elapsed(),
                listeners_total: snapshot.len(),
                listeners_invoked: invoked,
                outcome,
            });
        };

        if self.is_simulating() {
            finish(0, DispatchOutcome::Simulated);
            return Ok(true);
        }

        for (index, listener) in snapshot.iter().enumerate() {
            if self.config.debug_mode {
                trace!(
                    event = %event,
                    listener = listener.name(),
                    "Delivering event to listener"
                );
            }

            match listener.call(arg) {
                Ok(Propagation::Continue) => {}
                Ok(Propagation::Stop) => {
                    debug!(
                        event = %event,
                        listener = listener.name(),
                        "Event propagation stopped by listener"
                    );
                    finish(index + 1, DispatchOutcome::Stopped);
                    return Ok(false);
                }
                Err(err) => {
                    debug!(
                        event = %event,
                        listener = listener.name(),
                        error = %err,
                        "Event dispatch aborted by listener error"
                    );
                    finish(index + 1, DispatchOutcome::Failed);
                    return Err(err);
                }
            }
        }

        finish(snapshot.len(), DispatchOutcome::Completed);
        Ok(true)
    }

    fn record(&self, record: DispatchRecord) {
        if self.config.debug_mode {
            trace!(
                event = %record.event,
                outcome = record.outcome.as_str(),
                invoked = record.listeners_invoked,
                elapsed_us = record.duration.as_micros() as u64,
                "Event dispatch finished"
            );
        }
        if self.config.history_size == 0 {
            return;
        }
        self.history.lock().push(record);
    }

    // ========================================================================
    // 해제
    // ========================================================================

    /// 리스너 하나 해제
    ///
    /// 가장 낮은 우선순위 값, 같은 우선순위면 가장 먼저 등록된 항목 하나만 제거한다.
    /// 이벤트 이름이 없거나 리스너가 등록되어 있지 않으면 false.
    pub fn remove_listener(&self, event: &str, listener: &Listener) -> bool {
        let mut listeners = self.listeners.lock();

        let Some(buckets) = listeners.get_mut(event) else {
            return false;
        };

        let found = buckets.iter().find_map(|(priority, bucket)| {
            bucket
                .iter()
                .position(|registered| registered.same_as(listener))
                .map(|index| (*priority, index))
        });

        let Some((priority, index)) = found else {
            return false;
        };

        if let Some(bucket) = buckets.get_mut(&priority) {
            bucket.remove(index);
            if bucket.is_empty() {
                buckets.remove(&priority);
            }
        }

        if buckets.is_empty() {
            listeners.remove(event);
        }
        drop(listeners);

        debug!(
            event = %event,
            priority = priority.value(),
            listener = listener.name(),
            "Unregistered event listener"
        );

        true
    }

    /// 리스너 전체 해제
    ///
    /// `Some(event)`면 해당 이벤트만, `None`이면 모든 이벤트를 비운다.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut listeners = self.listeners.lock();
        match event {
            Some(event) => {
                if listeners.remove(event).is_some() {
                    debug!(event = %event, "Removed all listeners for event");
                }
            }
            None => {
                let cleared = listeners.len();
                listeners.clear();
                debug!(events = cleared, "Removed all event listeners");
            }
        }
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 이벤트에 등록된 리스너 (trigger와 같은 순서)
    pub fn listeners(&self, event: &str) -> Vec<Listener> {
        let listeners = self.listeners.lock();
        listeners
            .get(event)
            .map(|buckets| buckets.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// 리스너가 하나라도 있는지
    pub fn has_listeners(&self, event: &str) -> bool {
        self.listeners.lock().contains_key(event)
    }

    /// 이벤트에 등록된 리스너 수
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .get(event)
            .map(|buckets| buckets.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// 전체 리스너 수
    pub fn total_listeners(&self) -> usize {
        self.listeners
            .lock()
            .values()
            .flat_map(|buckets| buckets.values())
            .map(Vec::len)
            .sum()
    }

    /// 리스너가 등록된 이벤트 이름 (정렬됨)
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.lock().keys().cloned().collect();
        names.sort();
        names
    }

    // ========================================================================
    // 시뮬레이션 / 히스토리
    // ========================================================================

    /// 시뮬레이션 모드 설정 (켜져 있으면 리스너를 호출하지 않는다)
    pub fn set_simulate(&self, enabled: bool) {
        self.simulate.store(enabled, Ordering::SeqCst);
    }

    pub fn is_simulating(&self) -> bool {
        self.simulate.load(Ordering::SeqCst)
    }

    /// 최근 디스패치 기록 (최신순)
    pub fn history(&self, limit: Option<usize>) -> Vec<DispatchRecord> {
        self.history.lock().recent(limit)
    }

    /// 히스토리 클리어
    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    /// 총 trigger 횟수
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.load(Ordering::SeqCst)
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("config", &self.config)
            .field("events", &self.event_names())
            .field("dispatch_count", &self.dispatch_count())
            .finish()
    }
}

// ============================================================================
// 전역 EventRegistry
// ============================================================================

static GLOBAL_EVENT_REGISTRY: OnceLock<Arc<EventRegistry>> = OnceLock::new();

/// 전역 레지스트리 초기화
///
/// 이미 초기화되어 있으면 기존 인스턴스를 반환하고 config는 무시된다.
pub fn init_global_registry(config: RegistryConfig) -> Arc<EventRegistry> {
    GLOBAL_EVENT_REGISTRY
        .get_or_init(|| Arc::new(EventRegistry::with_config(config)))
        .clone()
}

/// 전역 레지스트리 가져오기
pub fn global_registry() -> Arc<EventRegistry> {
    GLOBAL_EVENT_REGISTRY
        .get_or_init(|| Arc::new(EventRegistry::new()))
        .clone()
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::Mutex as StdMutex;

    /// 호출 순서를 기록하는 리스너
    fn recorder(log: &Arc<StdMutex<Vec<&'static str>>>, tag: &'static str) -> Listener {
        let log = Arc::clone(log);
        Listener::named(tag, move |_| {
            log.lock().unwrap().push(tag);
        })
    }

    #[test]
    fn test_listeners_in_dispatch_order() {
        let registry = EventRegistry::new();
        let high = Listener::new(|_| {});
        let normal = Listener::new(|_| {});

        registry.on_with_priority("foo", high.clone(), Priority::HIGH);
        registry.on_with_priority("foo", normal.clone(), Priority::NORMAL);

        assert_eq!(registry.listeners("foo"), vec![high, normal]);
    }

    #[test]
    fn test_handle_event_with_argument() {
        let registry = EventRegistry::new();
        let seen = Arc::new(StdMutex::new(None));

        let sink = Arc::clone(&seen);
        registry.on(
            "foo",
            Listener::new(move |arg| {
                *sink.lock().unwrap() = arg.cloned();
            }),
        );

        assert!(registry.trigger("foo", Some(&Value::from("bar"))).unwrap());
        assert_eq!(*seen.lock().unwrap(), Some(Value::from("bar")));
    }

    #[test]
    fn test_cancel_event() {
        let registry = EventRegistry::new();
        let result = Arc::new(StdMutex::new(0));

        let r1 = Arc::clone(&result);
        registry.on(
            "foo",
            Listener::new(move |_| {
                *r1.lock().unwrap() = 1;
                Propagation::Stop
            }),
        );
        let r2 = Arc::clone(&result);
        registry.on(
            "foo",
            Listener::new(move |_| {
                *r2.lock().unwrap() = 2;
            }),
        );

        assert!(!registry.trigger("foo", Some(&Value::from("bar"))).unwrap());
        assert_eq!(*result.lock().unwrap(), 1);
    }

    #[test]
    fn test_priority() {
        let registry = EventRegistry::new();
        let result = Arc::new(StdMutex::new(0));

        let r1 = Arc::clone(&result);
        registry.on_with_priority(
            "foo",
            Listener::new(move |_| {
                *r1.lock().unwrap() = 1;
                Propagation::Stop
            }),
            Priority::NORMAL,
        );
        let r2 = Arc::clone(&result);
        registry.on_with_priority(
            "foo",
            Listener::new(move |_| {
                *r2.lock().unwrap() = 2;
                Propagation::Stop
            }),
            Priority::HIGH,
        );

        assert!(!registry.trigger("foo", Some(&Value::from("bar"))).unwrap());
        assert_eq!(*result.lock().unwrap(), 2);
    }

    #[test]
    fn test_priority_with_multiple() {
        let registry = EventRegistry::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        registry.on_with_priority("foo", recorder(&log, "a"), Priority::NORMAL);
        registry.on_with_priority("foo", recorder(&log, "b"), Priority::LOW);
        registry.on_with_priority("foo", recorder(&log, "c"), Priority::HIGH);
        registry.on_with_priority("foo", recorder(&log, "d"), Priority(75));

        assert!(registry.trigger("foo", None).unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn test_fifo_within_priority() {
        let registry = EventRegistry::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        registry.on("foo", recorder(&log, "first"));
        registry.on("foo", recorder(&log, "second"));
        registry.on("foo", recorder(&log, "third"));

        registry.trigger("foo", None).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_listener() {
        let registry = EventRegistry::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let callback = recorder(&log, "cb");

        registry.on("foo", callback.clone());
        registry.trigger("foo", None).unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);

        assert!(registry.remove_listener("foo", &callback));
        registry.trigger("foo", None).unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
        assert!(!registry.has_listeners("foo"));
    }

    #[test]
    fn test_remove_listener_twice() {
        let registry = EventRegistry::new();
        let callback = Listener::new(|_| {});

        registry.on("foo", callback.clone());

        assert!(registry.remove_listener("foo", &callback));
        assert!(!registry.remove_listener("foo", &callback));
    }

    #[test]
    fn test_remove_unknown_listener() {
        let registry = EventRegistry::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let callback = recorder(&log, "cb");

        registry.on("foo", callback.clone());

        assert!(!registry.remove_listener("bar", &callback));
        assert!(!registry.remove_listener("foo", &Listener::new(|_| {})));

        registry.trigger("foo", None).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["cb"]);
    }

    #[test]
    fn test_remove_duplicate_registration_one_at_a_time() {
        let registry = EventRegistry::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let callback = recorder(&log, "cb");

        registry.on_with_priority("foo", callback.clone(), Priority::LOW);
        registry.on_with_priority("foo", callback.clone(), Priority::HIGH);
        registry.on("bar", callback.clone());
        assert_eq!(registry.listener_count("foo"), 2);

        // HIGH 버킷의 항목이 먼저 제거된다
        assert!(registry.remove_listener("foo", &callback));
        assert_eq!(registry.listener_count("foo"), 1);

        registry.trigger("foo", None).unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);

        assert!(registry.remove_listener("foo", &callback));
        assert!(!registry.remove_listener("foo", &callback));
        assert_eq!(registry.listener_count("bar"), 1);
    }

    #[test]
    fn test_remove_all_listeners_with_single_event() {
        let registry = EventRegistry::new();
        let callback = Listener::new(|_| {});

        registry.on("foo", callback.clone());
        registry.on("bar", callback);

        registry.remove_all_listeners(Some("foo"));

        assert!(registry.listeners("foo").is_empty());
        assert_eq!(registry.listeners("bar").len(), 1);
        assert_eq!(registry.event_names(), vec!["bar".to_string()]);
    }

    #[test]
    fn test_remove_all_listeners_with_multiple_events() {
        let registry = EventRegistry::new();
        let callback = Listener::new(|_| {});

        registry.on("foo", callback.clone());
        registry.on("bar", callback);

        registry.remove_all_listeners(None);

        assert!(registry.listeners("foo").is_empty());
        assert!(registry.listeners("bar").is_empty());
        assert_eq!(registry.total_listeners(), 0);
    }

    #[test]
    fn test_trigger_without_listeners() {
        let registry = EventRegistry::new();
        assert!(registry.trigger("nothing", None).unwrap());
        assert!(registry.listeners("nothing").is_empty());
        assert!(registry.event_names().is_empty());
    }

    #[test]
    fn test_event_names_are_case_sensitive() {
        let registry = EventRegistry::new();
        registry.on("Foo", Listener::new(|_| Propagation::Stop));

        assert!(registry.trigger("foo", None).unwrap());
        assert!(!registry.trigger("Foo", None).unwrap());
    }

    #[test]
    fn test_listener_error_propagates_and_skips_rest() {
        let registry = EventRegistry::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        registry.on_with_priority("foo", recorder(&log, "before"), Priority::HIGH);
        registry.on(
            "foo",
            Listener::new(|_| -> Result<()> { Err(Error::listener("foo", "broken")) }),
        );
        registry.on_with_priority("foo", recorder(&log, "after"), Priority::LOW);

        let err = registry.trigger("foo", None).unwrap_err();
        assert!(matches!(err, Error::Listener { ref message, .. } if message == "broken"));
        assert_eq!(*log.lock().unwrap(), vec!["before"]);

        // 에러 이후에도 레지스트리는 정상 동작
        assert_eq!(registry.listener_count("foo"), 3);
    }

    #[test]
    fn test_simulate_mode() {
        let registry = EventRegistry::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        registry.on("foo", recorder(&log, "a"));
        registry.on("foo", Listener::new(|_| Propagation::Stop));

        registry.set_simulate(true);
        assert!(registry.is_simulating());
        assert!(registry.trigger("foo", None).unwrap());
        assert!(log.lock().unwrap().is_empty());

        registry.set_simulate(false);
        assert!(!registry.trigger("foo", None).unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_dispatch_history() {
        let config = RegistryConfig::new().history_size(2);
        let registry = EventRegistry::with_config(config);

        registry.on("stop", Listener::new(|_| Propagation::Stop));
        registry.on("stop", Listener::new(|_| {}));

        registry.trigger("empty", None).unwrap();
        registry.trigger("stop", None).unwrap();
        registry.trigger("empty", None).unwrap();

        assert_eq!(registry.dispatch_count(), 3);

        let history = registry.history(None);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].event, "empty");
        assert_eq!(history[0].outcome, DispatchOutcome::Completed);
        assert_eq!(history[1].event, "stop");
        assert_eq!(history[1].outcome, DispatchOutcome::Stopped);
        assert_eq!(history[1].listeners_total, 2);
        assert_eq!(history[1].listeners_invoked, 1);

        registry.clear_history();
        assert!(registry.history(None).is_empty());
    }

    #[test]
    fn test_history_disabled() {
        let registry = EventRegistry::with_config(RegistryConfig::new().history_size(0));
        registry.trigger("foo", None).unwrap();
        assert!(registry.history(None).is_empty());
        assert_eq!(registry.dispatch_count(), 1);
    }

    #[test]
    fn test_debug_mode_traces_dispatch() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let registry = EventRegistry::with_config(RegistryConfig::new().debug_mode(true));
            registry.on_with_priority("foo", Listener::named("first", |_| {}), Priority::HIGH);
            registry.on("foo", Listener::named("guard", |_| Propagation::Stop));

            assert!(!registry.trigger("foo", None).unwrap());
            registry.set_simulate(true);
            assert!(registry.trigger("foo", None).unwrap());

            let outcomes: Vec<_> = registry
                .history(None)
                .iter()
                .map(|r| r.outcome.as_str())
                .collect();
            assert_eq!(outcomes, vec!["simulated", "stopped"]);
        });
    }

    #[test]
    fn test_reentrant_registration_does_not_affect_current_dispatch() {
        let registry = Arc::new(EventRegistry::new());
        let log = Arc::new(StdMutex::new(Vec::new()));

        let weak = Arc::downgrade(&registry);
        let late = recorder(&log, "late");
        let log_outer = Arc::clone(&log);
        registry.on(
            "foo",
            Listener::new(move |_| {
                log_outer.lock().unwrap().push("outer");
                if let Some(registry) = weak.upgrade() {
                    registry.on("foo", late.clone());
                }
            }),
        );

        registry.trigger("foo", None).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["outer"]);
        assert_eq!(registry.listener_count("foo"), 2);
    }

    #[test]
    fn test_reentrant_removal_does_not_affect_current_dispatch() {
        let registry = Arc::new(EventRegistry::new());
        let log = Arc::new(StdMutex::new(Vec::new()));

        let victim = recorder(&log, "victim");
        let weak = Arc::downgrade(&registry);
        let target = victim.clone();
        registry.on_with_priority(
            "foo",
            Listener::new(move |_| {
                if let Some(registry) = weak.upgrade() {
                    registry.remove_listener("foo", &target);
                }
            }),
            Priority::HIGH,
        );
        registry.on("foo", victim);

        // 스냅샷 이후 제거이므로 이번 디스패치에서는 호출된다
        registry.trigger("foo", None).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["victim"]);

        registry.trigger("foo", None).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["victim"]);
    }

    #[test]
    fn test_nested_trigger() {
        let registry = Arc::new(EventRegistry::new());
        let log = Arc::new(StdMutex::new(Vec::new()));

        registry.on("inner", recorder(&log, "inner"));

        let weak = Arc::downgrade(&registry);
        registry.on(
            "outer",
            Listener::new(move |_| -> Result<()> {
                if let Some(registry) = weak.upgrade() {
                    registry.trigger("inner", None)?;
                }
                Ok(())
            }),
        );
        registry.on("outer", recorder(&log, "outer"));

        assert!(registry.trigger("outer", None).unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["inner", "outer"]);
    }
}
