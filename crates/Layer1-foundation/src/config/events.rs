//! Registry Config - 이벤트 레지스트리 설정
//!
//! 글로벌 설정 위에 프로젝트 설정을 덮어쓰는 방식으로 로드한다.

use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};

/// 설정 파일명
pub const EVENTS_CONFIG_FILE: &str = "events.json";

/// 기본 디스패치 히스토리 보관 개수
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// 이벤트 레지스트리 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// 디버그 모드 (모든 디스패치/전달을 trace 로깅)
    #[serde(default)]
    pub debug_mode: bool,

    /// 디스패치 히스토리 보관 개수 (0이면 기록하지 않음)
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// 시뮬레이션 모드 (리스너를 호출하지 않고 true 반환)
    #[serde(default)]
    pub simulate: bool,
}

/// 설정 파일 하나의 내용 (적히지 않은 키는 None)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_mode: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_size: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulate: Option<bool>,
}

fn default_history_size() -> usize {
    DEFAULT_HISTORY_SIZE
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            history_size: DEFAULT_HISTORY_SIZE,
            simulate: false,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut layers = Vec::new();

        // 1. 글로벌 설정 (config 디렉토리가 없는 플랫폼이면 건너뜀)
        if let Ok(global) = JsonStore::global() {
            layers.push(global);
        }

        // 2. 프로젝트 설정
        layers.push(JsonStore::current_project()?);

        Self::load_layered(&layers)
    }

    /// 저장소 순서대로 병합 로드 (뒤의 저장소가 우선)
    ///
    /// 파일에 실제로 적힌 키만 앞선 값을 덮어쓴다.
    pub fn load_layered(stores: &[JsonStore]) -> Result<Self> {
        let mut config = Self::new();
        for store in stores {
            if let Some(layer) = store.read_config::<RegistryConfigLayer>()? {
                config.merge(layer);
            }
        }
        Ok(config)
    }

    /// 특정 저장소에서 로드 (파일이 없으면 기본값)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Self::load_layered(std::slice::from_ref(store))
    }

    /// 특정 저장소에 저장
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.write_config(self)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 설정 레이어 병합 (레이어에 있는 값이 우선)
    pub fn merge(&mut self, layer: RegistryConfigLayer) {
        if let Some(debug_mode) = layer.debug_mode {
            self.debug_mode = debug_mode;
        }
        if let Some(history_size) = layer.history_size {
            self.history_size = history_size;
        }
        if let Some(simulate) = layer.simulate {
            self.simulate = simulate;
        }
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn debug_mode(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    pub fn history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    pub fn simulate(mut self, enabled: bool) -> Self {
        self.simulate = enabled;
        self
    }
}
