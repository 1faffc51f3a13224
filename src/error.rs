//! 에러 타입 정의 모듈
//!
//! projson에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// projson에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ExportError {
    /// 소스 폴더가 존재하지 않거나 폴더가 아님
    #[error("소스 폴더를 찾을 수 없습니다 ({name}): {path}")]
    SourceNotFound { name: String, path: PathBuf },

    /// 소스 매핑 형식 오류
    #[error("잘못된 소스 매핑: {reason}")]
    InvalidSourceMapping { reason: String },

    /// 출력 폴더를 만들거나 쓸 수 없음
    #[error("출력 폴더에 쓸 수 없습니다 ({path}): {reason}")]
    DestinationUnwritable { path: PathBuf, reason: String },

    /// 출력 문서가 이미 존재 (Error 모드에서)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 파일 읽기 실패
    #[error("파일을 읽을 수 없습니다 ({file}): {reason}")]
    FileReadError { file: PathBuf, reason: String },

    /// 유효하지 않은 글로브 패턴
    #[error("유효하지 않은 패턴 '{pattern}': {reason}")]
    PatternCompileError { pattern: String, reason: String },

    /// 잘못된 제한 값
    #[error("잘못된 제한 값 ({name}): {reason}")]
    InvalidLimit { name: &'static str, reason: String },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패 ({file}): {reason}")]
    SerializeError { file: String, reason: String },
}

impl ExportError {
    /// 실행 전체를 중단해야 하는 에러인지 확인
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ExportError::FileReadError { .. })
    }
}

/// projson 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ExportError>;
