//! Dispatch History - trigger 실행 기록 (성능 로그)

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// 디스패치 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// 모든 리스너 실행 완료 (리스너가 없던 경우 포함)
    Completed,
    /// 리스너가 Stop을 반환해 중단됨
    Stopped,
    /// 리스너 에러로 중단됨
    Failed,
    /// 시뮬레이션 모드 - 리스너 미실행
    Simulated,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
            Self::Simulated => "simulated",
        }
    }
}

/// 한 번의 trigger 기록
#[derive(Debug, Clone, Serialize)]
pub struct DispatchRecord {
    /// 이벤트 이름
    pub event: String,
    /// 시작 시각
    pub started_at: DateTime<Utc>,
    /// 소요 시간
    pub duration: Duration,
    /// 스냅샷에 포함된 리스너 수
    pub listeners_total: usize,
    /// 실제로 호출된 리스너 수
    pub listeners_invoked: usize,
    /// 결과
    pub outcome: DispatchOutcome,
}

/// 크기 제한이 있는 디스패치 기록 버퍼
#[derive(Debug)]
pub(crate) struct DispatchHistory {
    capacity: usize,
    records: VecDeque<DispatchRecord>,
}

impl DispatchHistory {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// 기록 추가 (용량 초과 시 가장 오래된 기록 제거)
    pub(crate) fn push(&mut self, record: DispatchRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// 최신 기록부터 반환
    pub(crate) fn recent(&self, limit: Option<usize>) -> Vec<DispatchRecord> {
        let limit = limit.unwrap_or(self.records.len());
        self.records.iter().rev().take(limit).cloned().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}
