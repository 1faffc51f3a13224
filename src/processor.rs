//! 파일 처리 모듈
//!
//! 개별 파일의 읽기, 텍스트/바이너리 판별, 레코드 변환을 담당합니다.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use memmap2::Mmap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ExportError, Result};

/// 확장자만으로 바이너리로 취급하는 파일
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "exe", "dll", "zip", "tar", "gz", "pdf",
];

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*").unwrap());
static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 레코드 내용의 인코딩
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "base64")]
    Base64,
}

/// 내보낼 파일 하나
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// 프로젝트 이름으로 시작하는 상대 경로 (`/` 구분)
    pub path: String,
    /// 원본 파일 크기
    pub size: u64,
    /// 내용 인코딩
    pub encoding: ContentEncoding,
    /// 파일 내용 (텍스트 또는 base64)
    pub content: String,
    /// 크기 제한 때문에 내용이 잘렸는지 여부
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

impl FileRecord {
    /// 내용을 `max_len` 바이트 이하로 자르기
    ///
    /// 텍스트는 문자 경계에서, base64는 4문자 단위로 자릅니다.
    pub fn truncate_content(&mut self, max_len: usize) {
        if self.content.len() <= max_len {
            return;
        }

        let mut cut = max_len;
        match self.encoding {
            ContentEncoding::Utf8 => {
                while !self.content.is_char_boundary(cut) {
                    cut -= 1;
                }
            }
            ContentEncoding::Base64 => cut -= cut % 4,
        }

        self.content.truncate(cut);
        self.truncated = true;
    }
}

/// 파일 처리 옵션
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// 텍스트에서 주석과 연속 공백 제거
    pub strip_comments: bool,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl ProcessOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            mmap_threshold: 10 * 1024 * 1024, // 10MB
            ..Default::default()
        }
    }

    /// 주석 제거 설정
    pub fn with_strip_comments(mut self, strip_comments: bool) -> Self {
        self.strip_comments = strip_comments;
        self
    }
}

/// 단일 파일을 레코드로 변환
///
/// # Arguments
/// * `path` - 읽을 파일 경로
/// * `record_path` - 출력에 기록될 상대 경로
/// * `options` - 처리 옵션
///
/// # Returns
/// 변환된 `FileRecord` 또는 `FileReadError`
pub fn process_file(path: &Path, record_path: String, options: &ProcessOptions) -> Result<FileRecord> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| read_error(path, e))?
        .len();

    let bytes = if file_size > 0 && file_size >= options.mmap_threshold {
        // 대용량 파일: 메모리 매핑 사용
        read_with_mmap(path)?
    } else {
        // 일반 파일: 버퍼 리더 사용
        read_with_reader(path, file_size)?
    };

    let (encoding, content) = if has_binary_extension(path) {
        (ContentEncoding::Base64, BASE64.encode(&bytes))
    } else {
        match String::from_utf8(bytes) {
            Ok(text) if !text.contains('\0') => {
                let text = if options.strip_comments {
                    strip_comments(&text)
                } else {
                    text
                };
                (ContentEncoding::Utf8, text)
            }
            Ok(text) => (ContentEncoding::Base64, BASE64.encode(text.as_bytes())),
            Err(e) => (ContentEncoding::Base64, BASE64.encode(e.as_bytes())),
        }
    };

    Ok(FileRecord {
        path: record_path,
        size: file_size,
        encoding,
        content,
        truncated: false,
    })
}

/// 버퍼 리더를 사용한 읽기
fn read_with_reader(path: &Path, size_hint: u64) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| read_error(path, e))?;

    let mut bytes = Vec::with_capacity(size_hint as usize);
    BufReader::new(file)
        .read_to_end(&mut bytes)
        .map_err(|e| read_error(path, e))?;
    Ok(bytes)
}

/// 메모리 매핑을 사용한 읽기 (대용량 파일용)
fn read_with_mmap(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| read_error(path, e))?;

    let mmap = unsafe {
        Mmap::map(&file).map_err(|e| ExportError::FileReadError {
            file: path.to_path_buf(),
            reason: format!("메모리 매핑 실패: {}", e),
        })?
    };

    Ok(mmap.to_vec())
}

fn read_error(path: &Path, e: std::io::Error) -> ExportError {
    ExportError::FileReadError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// 확장자 기준 바이너리 여부
pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| BINARY_EXTENSIONS.iter().any(|b| b.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// `//`, `/* */` 주석을 지우고 연속 공백을 하나로 합침
pub fn strip_comments(content: &str) -> String {
    let content = LINE_COMMENT.replace_all(content, "");
    let content = BLOCK_COMMENT.replace_all(&content, "");
    WHITESPACE.replace_all(&content, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_process_text_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "a.txt", b"hello\nworld");

        let record = process_file(&path, "p/a.txt".to_string(), &ProcessOptions::new()).unwrap();
        assert_eq!(record.path, "p/a.txt");
        assert_eq!(record.size, 11);
        assert_eq!(record.encoding, ContentEncoding::Utf8);
        assert_eq!(record.content, "hello\nworld");
        assert!(!record.truncated);
    }

    #[test]
    fn test_process_binary_by_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "blob.bin", &[0xff, 0xfe, 0x00, 0x01]);

        let record = process_file(&path, "p/blob.bin".to_string(), &ProcessOptions::new()).unwrap();
        assert_eq!(record.encoding, ContentEncoding::Base64);
        assert_eq!(BASE64.decode(&record.content).unwrap(), vec![0xff, 0xfe, 0x00, 0x01]);
    }

    #[test]
    fn test_process_binary_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "logo.PNG", b"plain text");

        let record = process_file(&path, "p/logo.PNG".to_string(), &ProcessOptions::new()).unwrap();
        assert_eq!(record.encoding, ContentEncoding::Base64);
        assert_eq!(record.content, BASE64.encode(b"plain text"));
    }

    #[test]
    fn test_process_nul_byte_is_binary() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "data.txt", b"ab\0cd");

        let record = process_file(&path, "p/data.txt".to_string(), &ProcessOptions::new()).unwrap();
        assert_eq!(record.encoding, ContentEncoding::Base64);
    }

    #[test]
    fn test_process_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = process_file(
            &temp_dir.path().join("gone.txt"),
            "p/gone.txt".to_string(),
            &ProcessOptions::new(),
        );
        assert!(matches!(result, Err(ExportError::FileReadError { .. })));
    }

    #[test]
    fn test_process_with_mmap() {
        let temp_dir = TempDir::new().unwrap();
        let path = write(&temp_dir, "big.txt", b"mapped content");

        let options = ProcessOptions {
            mmap_threshold: 1,
            ..ProcessOptions::new()
        };
        let record = process_file(&path, "p/big.txt".to_string(), &options).unwrap();
        assert_eq!(record.content, "mapped content");
    }

    #[test]
    fn test_strip_comments() {
        let source = "let a = 1; // note\n/* block\n comment */\nlet   b = 2;\n";
        assert_eq!(strip_comments(source), "let a = 1; let b = 2;");
    }

    #[test]
    fn test_truncate_content() {
        let mut text = FileRecord {
            path: "p/a".to_string(),
            size: 6,
            encoding: ContentEncoding::Utf8,
            content: "가나".to_string(),
            truncated: false,
        };
        text.truncate_content(4);
        assert_eq!(text.content, "가");
        assert!(text.truncated);

        let mut b64 = FileRecord {
            encoding: ContentEncoding::Base64,
            content: "QUJDREVG".to_string(),
            ..text.clone()
        };
        b64.truncate_content(7);
        assert_eq!(b64.content, "QUJD");
    }

    #[test]
    fn test_serialize_skips_false_truncated() {
        let record = FileRecord {
            path: "p/a.txt".to_string(),
            size: 1,
            encoding: ContentEncoding::Utf8,
            content: "x".to_string(),
            truncated: false,
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"path":"p/a.txt","size":1,"encoding":"utf-8","content":"x"}"#
        );
    }
}
