//! projson - PROJECT TO JSON EXPORTER
//!
//! 하나 이상의 프로젝트 폴더를 탐색하여 파일 경로와 내용을 JSON 문서들로 내보내는 CLI 도구입니다.
//! 문서 하나에 담기는 파일 수와 용량은 지정한 제한을 넘지 않도록 나뉘어 저장됩니다.
//!
//! # 주요 기능
//!
//! - 📂 **다중 소스**: 프로젝트 이름별 소스 폴더 매핑, 출력 경로에 프로젝트 이름 접두어
//! - 🔍 **패턴 제외**: glob 형식의 파일/폴더 이름 제외 규칙
//! - 📏 **문서 분할**: 문서당 최대 파일 수와 최대 용량(MB) 제한
//! - 🧱 **바이너리 지원**: 바이너리 파일은 base64로 저장
//! - ✂️ **크기 초과 처리**: 단일 대용량 파일을 그대로 두거나 잘라서 저장
//! - 🌳 **폴더 구조**: 프로젝트별 트리 텍스트 파일 생성
//! - 🚀 **병렬 읽기**: Rayon으로 파일을 병렬로 읽되 출력 순서는 항상 동일
//! - 📊 **상세 통계**: 내보냄/제외/실패 수, 입출력 용량 표시
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법
//! projson --source '{"api": "/srv/api"}' -d ./out \
//!     --max_files_per_json 200 --max_json_size_mb 5
//!
//! # 제외 패턴과 함께
//! projson --source '{"web": "./web"}' -d ./out \
//!     --omit_files 'README*' '*.md' --omit_folders node_modules '.git*' \
//!     --max_files_per_json 100 --max_json_size_mb 2
//! ```

pub mod batch;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod exporter;
pub mod pattern;
pub mod processor;
pub mod source;
pub mod stats;
pub mod tree;
pub mod writer;

// Re-exports for convenient access
pub use cli::{Args, OversizePolicy, WriteMode};
pub use config::ExportConfig;
pub use error::{ExportError, Result};
pub use exporter::{ExportReport, Exporter};
pub use pattern::{OmissionRules, PatternMatcher};
pub use processor::{process_file, ContentEncoding, FileRecord, ProcessOptions};
pub use source::{Source, SourceMapping};
pub use stats::{format_bytes, Statistics};
pub use writer::OutputDocument;
