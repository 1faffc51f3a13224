//! 실행 설정 모듈
//!
//! 한 번의 내보내기 실행에 필요한 모든 설정을 담습니다.

use std::path::PathBuf;

use crate::cli::{OversizePolicy, WriteMode};
use crate::error::{ExportError, Result};
use crate::pattern::OmissionRules;
use crate::processor::ProcessOptions;
use crate::source::SourceMapping;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// 내보내기 실행 설정
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// 프로젝트 이름 → 소스 폴더
    pub sources: SourceMapping,
    /// 출력 폴더
    pub destination: PathBuf,
    /// 제외할 파일 이름 패턴
    pub omit_files: Vec<String>,
    /// 제외할 폴더 이름 패턴
    pub omit_folders: Vec<String>,
    /// desktop.ini, Thumbs.db 기본 제외 여부
    pub default_omits: bool,
    /// 문서당 최대 파일 수
    pub max_files_per_json: usize,
    /// 문서당 최대 크기 (MB)
    pub max_json_size_mb: f64,
    /// 출력 폴더 처리 모드
    pub mode: WriteMode,
    /// 크기 초과 단일 파일 처리 방식
    pub oversize: OversizePolicy,
    /// 문서 이름 접두어
    pub prefix: String,
    /// 들여쓰기 출력 여부
    pub pretty: bool,
    /// 주석 제거 여부
    pub strip_comments: bool,
    /// 폴더 구조 파일 생성 여부
    pub tree: bool,
    /// 최대 탐색 깊이
    pub max_depth: Option<usize>,
    /// 파일별 상세 출력
    pub verbose: bool,
}

impl ExportConfig {
    /// 기본 설정 생성 (문서당 100개, 10MB)
    pub fn new(sources: SourceMapping, destination: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            destination: destination.into(),
            omit_files: Vec::new(),
            omit_folders: Vec::new(),
            default_omits: true,
            max_files_per_json: 100,
            max_json_size_mb: 10.0,
            mode: WriteMode::default(),
            oversize: OversizePolicy::default(),
            prefix: "export".to_string(),
            pretty: false,
            strip_comments: false,
            tree: false,
            max_depth: None,
            verbose: false,
        }
    }

    pub fn with_omit_files(mut self, patterns: Vec<String>) -> Self {
        self.omit_files = patterns;
        self
    }

    pub fn with_omit_folders(mut self, patterns: Vec<String>) -> Self {
        self.omit_folders = patterns;
        self
    }

    pub fn with_default_omits(mut self, default_omits: bool) -> Self {
        self.default_omits = default_omits;
        self
    }

    /// 문서당 파일 수 / 크기 제한 설정
    pub fn with_limits(mut self, max_files_per_json: usize, max_json_size_mb: f64) -> Self {
        self.max_files_per_json = max_files_per_json;
        self.max_json_size_mb = max_json_size_mb;
        self
    }

    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_oversize(mut self, oversize: OversizePolicy) -> Self {
        self.oversize = oversize;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_strip_comments(mut self, strip_comments: bool) -> Self {
        self.strip_comments = strip_comments;
        self
    }

    pub fn with_tree(mut self, tree: bool) -> Self {
        self.tree = tree;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// 문서당 최대 바이트 수 (내림)
    pub fn max_json_bytes(&self) -> u64 {
        (self.max_json_size_mb * BYTES_PER_MB).floor() as u64
    }

    /// 설정 값 검증
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(ExportError::InvalidSourceMapping {
                reason: "소스가 하나 이상 필요합니다".to_string(),
            });
        }

        if self.max_files_per_json == 0 {
            return Err(ExportError::InvalidLimit {
                name: "max_files_per_json",
                reason: "1 이상이어야 합니다".to_string(),
            });
        }

        if !self.max_json_size_mb.is_finite() || self.max_json_size_mb <= 0.0 {
            return Err(ExportError::InvalidLimit {
                name: "max_json_size_mb",
                reason: format!("0보다 큰 값이어야 합니다: {}", self.max_json_size_mb),
            });
        }

        if self.max_json_bytes() == 0 {
            return Err(ExportError::InvalidLimit {
                name: "max_json_size_mb",
                reason: format!("1바이트보다 작습니다: {}", self.max_json_size_mb),
            });
        }

        if self.prefix.is_empty() || self.prefix.contains(['/', '\\']) {
            return Err(ExportError::InvalidLimit {
                name: "prefix",
                reason: format!("파일 이름으로 쓸 수 없습니다: {:?}", self.prefix),
            });
        }

        Ok(())
    }

    /// 제외 규칙 컴파일
    pub fn omission_rules(&self) -> Result<OmissionRules> {
        OmissionRules::new(&self.omit_files[..], &self.omit_folders[..], self.default_omits)
    }

    /// 파일 처리 옵션
    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions::new().with_strip_comments(self.strip_comments)
    }
}
