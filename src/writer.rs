//! 출력 문서 저장 모듈
//!
//! 출력 폴더 준비, 문서 이름 지정, 배치 저장을 담당합니다.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::batch::Batch;
use crate::cli::WriteMode;
use crate::error::{ExportError, Result};

/// 저장된 출력 문서 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    /// 문서 경로
    pub path: PathBuf,
    /// 1부터 시작하는 순번
    pub sequence: usize,
    /// 레코드 수
    pub file_count: usize,
    /// 문서 바이트 수
    pub bytes: u64,
    /// 단일 레코드가 크기 제한을 넘어 단독 저장된 문서인지 여부
    pub oversized: bool,
}

/// 출력 문서 작성기
///
/// 순번은 작성기 인스턴스가 소유하므로 실행마다 1부터 시작합니다.
#[derive(Debug)]
pub struct DocumentWriter {
    destination: PathBuf,
    prefix: String,
    mode: WriteMode,
    max_bytes: u64,
    next_sequence: usize,
}

impl DocumentWriter {
    /// 출력 폴더를 준비하고 작성기 생성
    ///
    /// `Clean` 모드에서는 출력 폴더를 지우고 다시 만듭니다.
    pub fn prepare(
        destination: &Path,
        prefix: &str,
        mode: WriteMode,
        max_bytes: u64,
    ) -> Result<Self> {
        if mode == WriteMode::Clean && destination.exists() {
            fs::remove_dir_all(destination).map_err(|e| unwritable(destination, e))?;
        }

        fs::create_dir_all(destination).map_err(|e| unwritable(destination, e))?;

        let metadata = fs::metadata(destination).map_err(|e| unwritable(destination, e))?;
        if !metadata.is_dir() {
            return Err(ExportError::DestinationUnwritable {
                path: destination.to_path_buf(),
                reason: "폴더가 아닙니다".to_string(),
            });
        }

        Ok(Self {
            destination: destination.to_path_buf(),
            prefix: prefix.to_string(),
            mode,
            max_bytes,
            next_sequence: 1,
        })
    }

    /// 순번에 해당하는 문서 경로 (예: export_0001.json)
    pub fn document_path(&self, sequence: usize) -> PathBuf {
        self.destination
            .join(format!("{}_{:04}.json", self.prefix, sequence))
    }

    /// 다음에 쓸 순번
    pub fn next_sequence(&self) -> usize {
        self.next_sequence
    }

    /// 배치를 다음 순번의 문서로 저장
    pub fn write(&mut self, batch: &Batch) -> Result<OutputDocument> {
        let sequence = self.next_sequence;
        let path = self.document_path(sequence);

        let file = self.open(&path)?;
        let mut writer = BufWriter::new(file);
        let bytes = batch
            .write_to(&mut writer)
            .and_then(|bytes| writer.flush().map(|_| bytes))
            .map_err(|e| unwritable(&path, e))?;

        self.next_sequence += 1;

        Ok(OutputDocument {
            path,
            sequence,
            file_count: batch.len(),
            bytes,
            oversized: bytes > self.max_bytes,
        })
    }

    /// 출력 폴더에 텍스트 파일 저장 (폴더 구조, 에러 로그 등)
    pub fn write_text(&self, file_name: &str, text: &str) -> Result<PathBuf> {
        let path = self.destination.join(file_name);
        fs::write(&path, text).map_err(|e| unwritable(&path, e))?;
        Ok(path)
    }

    fn open(&self, path: &Path) -> Result<File> {
        match self.mode {
            WriteMode::Error => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|e| {
                    if e.kind() == io::ErrorKind::AlreadyExists {
                        ExportError::OutputExists {
                            path: path.to_path_buf(),
                        }
                    } else {
                        unwritable(path, e)
                    }
                }),
            _ => File::create(path).map_err(|e| unwritable(path, e)),
        }
    }
}

fn unwritable(path: &Path, e: io::Error) -> ExportError {
    ExportError::DestinationUnwritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{DocumentLayout, EncodedRecord};
    use crate::processor::{ContentEncoding, FileRecord};
    use tempfile::TempDir;

    fn batch(count: usize) -> Batch {
        let mut batch = Batch::new(DocumentLayout::Compact);
        for i in 0..count {
            let record = FileRecord {
                path: format!("p/{}.txt", i),
                size: 1,
                encoding: ContentEncoding::Utf8,
                content: "x".to_string(),
                truncated: false,
            };
            batch.push(EncodedRecord::encode(&record, DocumentLayout::Compact).unwrap());
        }
        batch
    }

    #[test]
    fn test_write_sequence_names() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");
        let mut writer = DocumentWriter::prepare(&dest, "export", WriteMode::Overwrite, 1024).unwrap();

        let first = writer.write(&batch(2)).unwrap();
        let second = writer.write(&batch(1)).unwrap();

        assert_eq!(first.path, dest.join("export_0001.json"));
        assert_eq!(second.path, dest.join("export_0002.json"));
        assert_eq!(first.file_count, 2);
        assert_eq!(
            first.bytes,
            fs::metadata(&first.path).unwrap().len()
        );
        assert!(!first.oversized);
        assert_eq!(writer.next_sequence(), 3);
    }

    #[test]
    fn test_oversized_flag() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer =
            DocumentWriter::prepare(temp_dir.path(), "export", WriteMode::Overwrite, 10).unwrap();

        let doc = writer.write(&batch(1)).unwrap();
        assert!(doc.oversized);
    }

    #[test]
    fn test_clean_mode_removes_stale_files() {
        let temp_dir = TempDir::new().unwrap();
        let stale = temp_dir.path().join("export_0009.json");
        fs::write(&stale, "[]").unwrap();

        DocumentWriter::prepare(temp_dir.path(), "export", WriteMode::Clean, 1024).unwrap();
        assert!(!stale.exists());
        assert!(temp_dir.path().is_dir());
    }

    #[test]
    fn test_error_mode_refuses_existing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("export_0001.json"), "[]").unwrap();

        let mut writer =
            DocumentWriter::prepare(temp_dir.path(), "export", WriteMode::Error, 1024).unwrap();
        assert!(matches!(
            writer.write(&batch(1)),
            Err(ExportError::OutputExists { .. })
        ));
    }

    #[test]
    fn test_destination_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not_a_dir");
        fs::write(&file, "x").unwrap();

        let result = DocumentWriter::prepare(&file, "export", WriteMode::Overwrite, 1024);
        assert!(matches!(
            result,
            Err(ExportError::DestinationUnwritable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_readonly_bits_left_to_write() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        fs::set_permissions(&dest, fs::Permissions::from_mode(0o555)).unwrap();

        // 권한 비트만으로 판단하지 않고 실제 파일 생성 결과를 따름
        let mut writer = DocumentWriter::prepare(&dest, "export", WriteMode::Overwrite, 1024).unwrap();
        let result = writer.write(&batch(1));
        let writable = fs::write(dest.join("check.tmp"), "x").is_ok();

        fs::set_permissions(&dest, fs::Permissions::from_mode(0o755)).unwrap();

        if writable {
            assert!(result.is_ok());
        } else {
            assert!(matches!(
                result,
                Err(ExportError::DestinationUnwritable { .. })
            ));
        }
    }
}
