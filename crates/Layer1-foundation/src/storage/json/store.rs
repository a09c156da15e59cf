//! JSON 설정 저장소
//!
//! 하나의 디렉토리(글로벌 또는 프로젝트)에 있는 `events.json`을 읽고 쓴다.

use crate::config::EVENTS_CONFIG_FILE;
use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "herald";
const PROJECT_DIR: &str = ".herald";

/// 이벤트 설정 파일 저장소
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// <config_dir>/herald/
    pub fn global() -> Result<Self> {
        dirs::config_dir()
            .map(|dir| Self::new(dir.join(APP_DIR)))
            .ok_or_else(|| Error::Config("no user config directory on this platform".to_string()))
    }

    /// <root>/.herald/
    pub fn project(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(PROJECT_DIR))
    }

    pub fn current_project() -> Result<Self> {
        std::env::current_dir()
            .map(Self::project)
            .map_err(|e| Error::Config(format!("cannot resolve project directory: {}", e)))
    }

    /// 설정 파일 경로
    pub fn config_path(&self) -> PathBuf {
        self.dir.join(EVENTS_CONFIG_FILE)
    }

    /// 설정 파일 읽기 (없으면 None)
    pub fn read_config<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let path = self.config_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::Config(format!(
                    "cannot read event config {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            Error::Config(format!("invalid event config {}: {}", path.display(), e))
        })
    }

    /// 설정 파일 쓰기 (디렉토리가 없으면 생성)
    pub fn write_config<T: Serialize>(&self, config: &T) -> Result<()> {
        let path = self.config_path();
        let content = serde_json::to_string_pretty(config)?;

        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, content))
            .map_err(|e| {
                Error::Config(format!("cannot write event config {}: {}", path.display(), e))
            })
    }
}
