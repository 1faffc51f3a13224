//! 패턴 매칭 모듈
//!
//! glob 패턴을 사용한 파일/폴더 이름 제외 규칙을 담당합니다.

use glob::{MatchOptions, Pattern};

use crate::error::{ExportError, Result};

/// 기본으로 제외되는 시스템 파일
pub const DEFAULT_OMIT_FILES: &[&str] = &["desktop.ini", "Thumbs.db"];

/// 대소문자 구분, 선행 점도 와일드카드로 매칭
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// 컴파일된 패턴 집합
#[derive(Debug, Default, Clone)]
pub struct PatternMatcher {
    patterns: Vec<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `patterns` - 글로브 패턴 문자열 목록 (비어 있으면 아무것도 매칭하지 않음)
    ///
    /// # Returns
    /// 컴파일된 `PatternMatcher` 또는 에러
    ///
    /// # Examples
    /// ```
    /// use projson::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(&["README*", "*.md"]).unwrap();
    /// assert!(matcher.matches("README.txt"));
    /// assert!(matcher.matches("guide.md"));
    /// assert!(!matcher.matches("main.rs"));
    /// ```
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|e| ExportError::PatternCompileError {
                    pattern: p.to_string(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// 이름이 패턴 중 하나와 일치하는지 확인
    ///
    /// # Arguments
    /// * `name` - 검사할 파일 또는 폴더 이름 (경로가 아닌 basename)
    ///
    /// # Returns
    /// 패턴 일치 여부 (패턴이 없으면 항상 false)
    pub fn matches(&self, name: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(name, MATCH_OPTIONS))
    }

    /// 원본 패턴 문자열 목록
    pub fn as_strs(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.as_str()).collect()
    }
}

/// 파일/폴더 제외 규칙
#[derive(Debug, Default, Clone)]
pub struct OmissionRules {
    files: PatternMatcher,
    folders: PatternMatcher,
}

impl OmissionRules {
    /// 제외 규칙 생성
    ///
    /// `with_defaults`가 true이면 [`DEFAULT_OMIT_FILES`]가 파일 패턴 뒤에 추가됩니다.
    pub fn new<S: AsRef<str>>(
        omit_files: &[S],
        omit_folders: &[S],
        with_defaults: bool,
    ) -> Result<Self> {
        let mut file_patterns: Vec<&str> = omit_files.iter().map(|s| s.as_ref()).collect();
        if with_defaults {
            file_patterns.extend_from_slice(DEFAULT_OMIT_FILES);
        }

        Ok(Self {
            files: PatternMatcher::new(&file_patterns[..])?,
            folders: PatternMatcher::new(omit_folders)?,
        })
    }

    /// 파일 이름이 제외 대상인지 확인
    pub fn omits_file(&self, name: &str) -> bool {
        self.files.matches(name)
    }

    /// 폴더 이름이 제외 대상인지 확인
    pub fn omits_folder(&self, name: &str) -> bool {
        self.folders.matches(name)
    }

    pub fn file_patterns(&self) -> &PatternMatcher {
        &self.files
    }

    pub fn folder_patterns(&self) -> &PatternMatcher {
        &self.folders
    }
}
