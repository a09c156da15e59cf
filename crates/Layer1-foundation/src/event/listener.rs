//! Listener - 등록 가능한 호출 단위
//!
//! 리스너는 참조 동일성을 가진다. 같은 핸들의 clone은 같은 리스너로 취급되고,
//! 별도로 만든 클로저는 내용이 같아도 서로 다른 리스너다.

use crate::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

// ============================================================================
// Propagation
// ============================================================================

/// 리스너 실행 후 디스패치 진행 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// 다음 리스너로 계속 진행
    #[default]
    Continue,
    /// 디스패치 중단 (trigger는 false 반환)
    Stop,
}

/// 리스너 반환값을 `Result<Propagation>`으로 정규화
///
/// `()`를 반환하는 리스너는 `Continue`로 취급된다.
pub trait IntoPropagation {
    fn into_propagation(self) -> Result<Propagation>;
}

impl IntoPropagation for () {
    fn into_propagation(self) -> Result<Propagation> {
        Ok(Propagation::Continue)
    }
}

impl IntoPropagation for Propagation {
    fn into_propagation(self) -> Result<Propagation> {
        Ok(self)
    }
}

impl<T, E> IntoPropagation for std::result::Result<T, E>
where
    T: IntoPropagation,
    E: Into<Error>,
{
    fn into_propagation(self) -> Result<Propagation> {
        match self {
            Ok(value) => value.into_propagation(),
            Err(err) => Err(err.into()),
        }
    }
}

// ============================================================================
// Listener
// ============================================================================

/// 리스너 함수 타입
pub type ListenerFn = dyn Fn(Option<&Value>) -> Result<Propagation> + Send + Sync;

/// 이벤트 리스너 핸들
///
/// ```ignore
/// let audit = Listener::named("audit", |arg| {
///     tracing::info!(?arg, "user logged in");
/// });
///
/// registry.on("user.login", audit.clone());
/// registry.remove_listener("user.login", &audit);
/// ```
#[derive(Clone)]
pub struct Listener {
    name: Option<Arc<str>>,
    func: Arc<ListenerFn>,
}

impl Listener {
    /// 클로저로 리스너 생성
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> R + Send + Sync + 'static,
        R: IntoPropagation,
    {
        let func: Arc<ListenerFn> =
            Arc::new(move |arg: Option<&Value>| f(arg).into_propagation());
        Self { name: None, func }
    }

    /// 이름 있는 리스너 생성 (로그용)
    pub fn named<F, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&Value>) -> R + Send + Sync + 'static,
        R: IntoPropagation,
    {
        let name: String = name.into();
        let mut listener = Self::new(f);
        listener.name = Some(Arc::from(name));
        listener
    }

    /// 리스너 이름 (없으면 "anonymous")
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("anonymous")
    }

    /// 리스너 호출
    pub fn call(&self, arg: Option<&Value>) -> Result<Propagation> {
        (self.func)(arg)
    }

    /// 같은 리스너인지 확인 (참조 동일성)
    pub fn same_as(&self, other: &Listener) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Listener {}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("name", &self.name())
            .field("ptr", &Arc::as_ptr(&self.func).cast::<()>())
            .finish()
    }
}
