//! 소스 매핑 모듈
//!
//! 프로젝트 이름 → 소스 폴더 경로 매핑의 파싱과 검증을 담당합니다.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ExportError, Result};

/// 프로젝트 하나의 소스 폴더
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// 출력 경로의 접두어로 쓰이는 프로젝트 이름
    pub name: String,
    /// 소스 폴더 경로
    pub path: PathBuf,
}

impl Source {
    /// 소스 폴더가 존재하는 폴더인지 확인
    pub fn validate(&self) -> Result<()> {
        if self.path.is_dir() {
            Ok(())
        } else {
            Err(ExportError::SourceNotFound {
                name: self.name.clone(),
                path: self.path.clone(),
            })
        }
    }
}

/// 프로젝트 이름 → 소스 폴더 매핑
///
/// 이름 순(사전순)으로 순회하므로 실행 결과가 항상 같습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMapping {
    entries: BTreeMap<String, PathBuf>,
}

impl SourceMapping {
    /// 빈 매핑 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// JSON 객체 문자열에서 매핑 파싱
    ///
    /// # Examples
    /// ```
    /// use projson::source::SourceMapping;
    ///
    /// let mapping = SourceMapping::from_json(r#"{"backend": "/srv/api", "frontend": "/srv/web"}"#).unwrap();
    /// assert_eq!(mapping.len(), 2);
    /// assert_eq!(mapping.iter().next().unwrap().name, "backend");
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(|e| ExportError::InvalidSourceMapping {
                reason: e.to_string(),
            })?;

        let mut mapping = Self::new();
        for (name, path) in raw {
            mapping.insert(name, path)?;
        }

        if mapping.is_empty() {
            return Err(ExportError::InvalidSourceMapping {
                reason: "소스가 하나 이상 필요합니다".to_string(),
            });
        }

        Ok(mapping)
    }

    /// 매핑 항목 추가
    ///
    /// 프로젝트 이름은 출력 경로의 첫 구성 요소가 되므로 비어 있거나
    /// 경로 구분자를 포함할 수 없습니다.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;

        if self.entries.contains_key(&name) {
            return Err(ExportError::InvalidSourceMapping {
                reason: format!("중복된 프로젝트 이름: {}", name),
            });
        }

        self.entries.insert(name, path.into());
        Ok(())
    }

    /// 이름 순으로 소스 순회
    pub fn iter(&self) -> impl Iterator<Item = Source> + '_ {
        self.entries.iter().map(|(name, path)| Source {
            name: name.clone(),
            path: path.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 경로가 어떤 소스 폴더와 같은지 확인
    pub fn any_equals(&self, dir: &Path) -> bool {
        let dir = normalize(dir);
        self.entries.values().any(|source| normalize(source) == dir)
    }

    /// 경로가 어떤 소스 폴더와 같거나 그 상위 폴더인지 확인
    pub fn any_within(&self, dir: &Path) -> bool {
        let dir = normalize(dir);
        self.entries
            .values()
            .any(|source| normalize(source).starts_with(&dir))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ExportError::InvalidSourceMapping {
            reason: "프로젝트 이름이 비어 있습니다".to_string(),
        });
    }

    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ExportError::InvalidSourceMapping {
            reason: format!("프로젝트 이름에 경로를 쓸 수 없습니다: {}", name),
        });
    }

    Ok(())
}

/// 존재하면 정규화된 절대 경로, 아니면 그대로
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
