//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::ExportConfig;
use crate::error::Result;
use crate::source::SourceMapping;

/// 출력 폴더 처리 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// 같은 이름의 문서가 있으면 덮어쓰기
    #[default]
    Overwrite,
    /// 실행 전에 출력 폴더를 비우기
    Clean,
    /// 같은 이름의 문서가 있으면 에러
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Clean => write!(f, "Clean"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// 단일 파일이 크기 제한을 넘을 때의 처리 방식
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OversizePolicy {
    /// 그대로 단독 문서에 저장 (제한 초과를 보고)
    #[default]
    Keep,
    /// 내용을 잘라 제한에 맞추기
    Truncate,
}

impl std::fmt::Display for OversizePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OversizePolicy::Keep => write!(f, "Keep"),
            OversizePolicy::Truncate => write!(f, "Truncate"),
        }
    }
}

/// projson CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "projson",
    author = "YourName <your@email.com>",
    version,
    about = "PROJECT TO JSON EXPORTER - 프로젝트 폴더를 크기/개수 제한이 있는 JSON 문서들로 내보내는 CLI 도구",
    long_about = r#"
PROJECT TO JSON EXPORTER
========================

하나 이상의 프로젝트 폴더를 탐색하여 파일 경로와 내용을
JSON 문서들로 내보냅니다. 문서 하나의 파일 수와 크기는
지정한 제한을 넘지 않도록 나뉘어 저장됩니다.

특징:
  • 프로젝트 이름별 소스 매핑 (경로 충돌 없음)
  • glob 패턴으로 파일/폴더 제외
  • 문서당 파일 수 / 용량 제한
  • 바이너리 파일은 base64로 저장
  • 진행률 표시 및 상세 통계

예제:
  projson --source '{"api": "/srv/api"}' --destination ./out \
          --max_files_per_json 200 --max_json_size_mb 5
  projson --source '{"web": "./web"}' -d ./out \
          --omit_files 'README*' '*.md' --omit_folders node_modules '.git*' \
          --max_files_per_json 100 --max_json_size_mb 2 --mode clean --tree
"#
)]
pub struct Args {
    /// 프로젝트 이름 → 소스 폴더 JSON 객체 (예: '{"api": "/srv/api"}')
    #[arg(long, value_name = "JSON")]
    pub source: String,

    /// JSON 문서가 저장될 출력 폴더 (없으면 생성)
    #[arg(short, long, value_name = "PATH")]
    pub destination: PathBuf,

    /// 제외할 파일 이름 패턴 (glob 형식, 예: "README*", "*.md")
    #[arg(long = "omit_files", visible_alias = "omit-files", num_args = 0.., value_name = "PATTERN")]
    pub omit_files: Vec<String>,

    /// 제외할 폴더 이름 패턴 (glob 형식, 예: "node_modules", ".git*")
    #[arg(long = "omit_folders", visible_alias = "omit-folders", num_args = 0.., value_name = "PATTERN")]
    pub omit_folders: Vec<String>,

    /// 문서 하나에 담을 최대 파일 수
    #[arg(
        long = "max_files_per_json",
        visible_alias = "max-files-per-json",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_files_per_json: u64,

    /// 문서 하나의 최대 크기 (MB)
    #[arg(long = "max_json_size_mb", visible_alias = "max-json-size-mb", value_parser = parse_positive_mb)]
    pub max_json_size_mb: f64,

    /// 출력 폴더 처리 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 단일 파일이 크기 제한을 넘을 때의 처리 방식
    #[arg(long, value_enum, default_value_t = OversizePolicy::Keep)]
    pub oversize: OversizePolicy,

    /// 출력 문서 이름 접두어 (예: export_0001.json)
    #[arg(long, default_value = "export")]
    pub prefix: String,

    /// 들여쓰기된 JSON 출력 (기본값: 압축)
    #[arg(long)]
    pub pretty: bool,

    /// 텍스트 파일에서 주석과 연속 공백 제거
    #[arg(long)]
    pub strip_comments: bool,

    /// desktop.ini, Thumbs.db 기본 제외 끄기
    #[arg(long)]
    pub no_default_omits: bool,

    /// 프로젝트별 폴더 구조 파일 (project_structure_<이름>.txt) 생성
    #[arg(long)]
    pub tree: bool,

    /// 최대 폴더 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 파일 읽기 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 실제 내보내기 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 에러 로그 파일 경로 (기본값: <출력 폴더>/error_log.txt)
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl Args {
    /// 인자를 검증된 실행 설정으로 변환
    pub fn to_config(&self) -> Result<ExportConfig> {
        let sources = SourceMapping::from_json(&self.source)?;

        let config = ExportConfig::new(sources, self.destination.clone())
            .with_omit_files(self.omit_files.clone())
            .with_omit_folders(self.omit_folders.clone())
            .with_default_omits(!self.no_default_omits)
            .with_limits(self.max_files_per_json as usize, self.max_json_size_mb)
            .with_mode(self.mode)
            .with_oversize(self.oversize)
            .with_prefix(self.prefix.clone())
            .with_pretty(self.pretty)
            .with_strip_comments(self.strip_comments)
            .with_tree(self.tree)
            .with_max_depth(self.max_depth)
            .with_verbose(self.verbose);

        config.validate()?;
        Ok(config)
    }
}

/// 양수 MB 값 파싱
fn parse_positive_mb(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("숫자가 아닙니다: {}", s))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(format!("0보다 큰 값이어야 합니다: {}", s));
    }

    Ok(value)
}
