//! Priority - 리스너 실행 순서
//!
//! 값이 작을수록 먼저 실행된다. 같은 우선순위 안에서는 등록 순서(FIFO)를 따른다.

use serde::{Deserialize, Serialize};

/// 리스너 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    /// 높은 우선순위 (먼저 실행)
    pub const HIGH: Priority = Priority(10);
    /// 기본 우선순위
    pub const NORMAL: Priority = Priority(100);
    /// 낮은 우선순위 (나중에 실행)
    pub const LOW: Priority = Priority(200);

    pub const fn value(self) -> i32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
