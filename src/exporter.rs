//! 내보내기 실행 모듈
//!
//! 소스 검증, 파일 수집, 레코드 변환, 배치 구성, 문서 저장을 한 번의 실행으로 묶습니다.

use colored::Colorize;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::PathBuf;

use crate::batch::{Batch, BatchLimits, Batcher, DocumentLayout, EncodedRecord};
use crate::cli::{OversizePolicy, WriteMode};
use crate::collector::{collect_files, Collection, SourceFile, WalkScope};
use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::pattern::OmissionRules;
use crate::processor::{process_file, FileRecord, ProcessOptions};
use crate::source::Source;
use crate::stats::{format_bytes, Statistics};
use crate::tree::{render_tree, tree_file_name};
use crate::writer::{DocumentWriter, OutputDocument};

/// 한 번에 병렬로 읽는 파일 수
const READ_CHUNK: usize = 256;

/// 내보내기 결과
#[derive(Debug)]
pub struct ExportReport {
    /// 저장된 문서 (순번 순)
    pub documents: Vec<OutputDocument>,
    /// 실행 통계
    pub stats: Statistics,
    /// 건너뛴 파일과 사유
    pub failures: Vec<(PathBuf, String)>,
    /// 실패한 소스 (SourceNotFound)
    pub source_failures: Vec<ExportError>,
    /// 저장된 폴더 구조 파일
    pub tree_files: Vec<PathBuf>,
}

impl ExportReport {
    /// 파일 또는 소스 실패가 있었는지 확인
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || !self.source_failures.is_empty()
    }

    /// 로그에 남길 모든 실패 (소스 실패 포함)
    pub fn all_failures(&self) -> Vec<(PathBuf, String)> {
        let mut all: Vec<(PathBuf, String)> = self
            .source_failures
            .iter()
            .map(|e| match e {
                ExportError::SourceNotFound { path, .. } => (path.clone(), e.to_string()),
                other => (PathBuf::new(), other.to_string()),
            })
            .collect();
        all.extend(self.failures.iter().cloned());
        all
    }
}

/// 한 번의 실행 동안 이어지는 상태
struct RunState {
    writer: DocumentWriter,
    batcher: Batcher,
    stats: Statistics,
    documents: Vec<OutputDocument>,
    failures: Vec<(PathBuf, String)>,
}

/// 프로젝트 폴더 → JSON 문서 내보내기
pub struct Exporter {
    config: ExportConfig,
    rules: OmissionRules,
    options: ProcessOptions,
    progress: ProgressBar,
}

impl Exporter {
    /// 설정 검증과 패턴 컴파일
    ///
    /// 잘못된 패턴은 `PatternCompileError`로, 잘못된 제한 값은 `InvalidLimit`으로
    /// 입출력 전에 실패합니다.
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;
        let rules = config.omission_rules()?;
        let options = config.process_options();

        Ok(Self {
            config,
            rules,
            options,
            progress: ProgressBar::hidden(),
        })
    }

    /// 진행률 바 설정
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// 소스 폴더 검증
    ///
    /// 유효한 소스와 실패한 소스를 나눠 돌려줍니다.
    /// 모든 소스가 실패하면 첫 번째 `SourceNotFound`를 에러로 돌려줍니다.
    pub fn check_sources(&self) -> Result<(Vec<Source>, Vec<ExportError>)> {
        let mut valid = Vec::new();
        let mut failed = Vec::new();

        for source in self.config.sources.iter() {
            match source.validate() {
                Ok(()) => valid.push(source),
                Err(e) => failed.push(e),
            }
        }

        if valid.is_empty() && !failed.is_empty() {
            return Err(failed.remove(0));
        }

        Ok((valid, failed))
    }

    /// 저장 없이 수집 결과만 계산 (드라이런)
    pub fn plan(&self) -> Result<Vec<(Source, Collection)>> {
        let (sources, _) = self.check_sources()?;
        Ok(sources
            .into_iter()
            .map(|source| {
                let collection = collect_files(&source, &self.rules, &self.scope(&source));
                (source, collection)
            })
            .collect())
    }

    /// 내보내기 실행
    pub fn run(&self) -> Result<ExportReport> {
        let (sources, source_failures) = self.check_sources()?;
        let mut state = self.start()?;
        let mut tree_files = Vec::new();

        for source in &sources {
            let scope = self.scope(source);
            let collection = collect_files(source, &self.rules, &scope);
            state.stats.add_total(collection.files.len());
            state
                .stats
                .add_omitted(collection.omitted_files, collection.omitted_folders);
            self.progress.inc_length(collection.files.len() as u64);

            for error in collection.errors {
                self.record_failure(error, &mut state);
            }

            self.export_files(&collection.files, &mut state)?;

            if self.config.tree {
                match render_tree(&source.name, &source.path, &self.rules, &scope) {
                    Ok(text) => tree_files
                        .push(state.writer.write_text(&tree_file_name(&source.name), &text)?),
                    Err(e) => self.record_failure(
                        ExportError::FileReadError {
                            file: source.path.clone(),
                            reason: e.to_string(),
                        },
                        &mut state,
                    ),
                }
            }
        }

        if let Some(batch) = state.batcher.finish() {
            self.flush(&batch, &mut state)?;
        }

        Ok(ExportReport {
            documents: state.documents,
            stats: state.stats,
            failures: state.failures,
            source_failures,
            tree_files,
        })
    }

    /// 출력 폴더 검사와 준비
    ///
    /// 소스 폴더와 같은 출력 폴더, 소스를 품은 폴더를 비우는 `Clean` 모드는 거부합니다.
    fn start(&self) -> Result<RunState> {
        let destination = &self.config.destination;

        if self.config.sources.any_equals(destination) {
            return Err(ExportError::DestinationUnwritable {
                path: destination.clone(),
                reason: "소스 폴더와 같은 폴더에는 저장할 수 없습니다".to_string(),
            });
        }

        if self.config.mode == WriteMode::Clean && self.config.sources.any_within(destination) {
            return Err(ExportError::DestinationUnwritable {
                path: destination.clone(),
                reason: "소스 폴더를 포함하고 있어 비울 수 없습니다".to_string(),
            });
        }

        let writer = DocumentWriter::prepare(
            destination,
            &self.config.prefix,
            self.config.mode,
            self.config.max_json_bytes(),
        )?;
        let batcher = Batcher::new(
            BatchLimits {
                max_files: self.config.max_files_per_json,
                max_bytes: self.config.max_json_bytes(),
            },
            DocumentLayout::from_pretty(self.config.pretty),
        );

        Ok(RunState {
            writer,
            batcher,
            stats: Statistics::new(),
            documents: Vec::new(),
            failures: Vec::new(),
        })
    }

    /// 소스 하나의 탐색 범위 (소스 안의 출력 폴더 제외)
    fn scope(&self, source: &Source) -> WalkScope {
        WalkScope::new(self.config.max_depth)
            .excluding_output(&source.path, &self.config.destination)
    }

    /// 수집된 파일을 순서대로 읽어 배치에 넣고, 찬 배치는 문서로 저장
    ///
    /// 읽기 실패한 파일은 기록만 하고 건너뜁니다.
    fn export_files(&self, files: &[SourceFile], state: &mut RunState) -> Result<()> {
        for chunk in files.chunks(READ_CHUNK) {
            let results: Vec<Result<FileRecord>> = chunk
                .par_iter()
                .map(|file| process_file(&file.path, file.record_path.clone(), &self.options))
                .collect();

            for result in results {
                self.progress.inc(1);

                let record = match result {
                    Ok(record) => record,
                    Err(e) if !e.is_fatal() => {
                        self.record_failure(e, state);
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                state.stats.add_bytes_read(record.size);
                let entry = self.encode(record, &state.batcher)?;

                if self.config.verbose {
                    self.progress
                        .println(format!("  {} {}", "✓".green(), entry.path));
                }

                if let Some(batch) = state.batcher.push(entry) {
                    self.flush(&batch, state)?;
                }
                state.stats.increment_exported();
            }
        }

        Ok(())
    }

    fn encode(&self, record: FileRecord, batcher: &Batcher) -> Result<EncodedRecord> {
        match self.config.oversize {
            OversizePolicy::Keep => EncodedRecord::encode(&record, batcher.layout()),
            OversizePolicy::Truncate => batcher.encode_truncated(record),
        }
    }

    fn flush(&self, batch: &Batch, state: &mut RunState) -> Result<()> {
        let document = state.writer.write(batch)?;
        state
            .stats
            .record_document(document.bytes, document.oversized, batch.truncated_count());

        if document.oversized {
            self.progress.println(format!(
                "  {} {:?}: 단일 파일이 크기 제한을 넘어 단독 저장됨 ({})",
                "⚠️".bright_yellow(),
                document.path.file_name().unwrap_or_default(),
                format_bytes(document.bytes)
            ));
        } else if self.config.verbose {
            self.progress.println(format!(
                "  {} {:?} ({} 파일, {})",
                "💾".bright_cyan(),
                document.path.file_name().unwrap_or_default(),
                document.file_count,
                format_bytes(document.bytes)
            ));
        }

        state.documents.push(document);
        Ok(())
    }

    fn record_failure(&self, error: ExportError, state: &mut RunState) {
        state.stats.increment_error();

        let (path, reason) = match error {
            ExportError::FileReadError { file, reason } => (file, reason),
            other => (PathBuf::new(), other.to_string()),
        };
        self.progress.println(format!(
            "  {} {} ({})",
            "✗".red(),
            path.display(),
            reason.dimmed()
        ));
        state.failures.push((path, reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceMapping;
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for name in files {
            let path = temp_dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("content of {}", name)).unwrap();
        }
        temp_dir
    }

    fn config(source: &TempDir, dest: &TempDir) -> ExportConfig {
        let mut sources = SourceMapping::new();
        sources.insert("p", source.path()).unwrap();
        ExportConfig::new(sources, dest.path().join("out"))
    }

    #[test]
    fn test_new_rejects_bad_pattern() {
        let src = project(&["a.txt"]);
        let dest = TempDir::new().unwrap();
        let result =
            Exporter::new(config(&src, &dest).with_omit_folders(vec!["[x".to_string()]));
        assert!(matches!(
            result,
            Err(ExportError::PatternCompileError { .. })
        ));
    }

    #[test]
    fn test_run_counts_and_documents() {
        let src = project(&["a.txt", "b.txt", "c.txt", "README.md"]);
        let dest = TempDir::new().unwrap();
        let exporter = Exporter::new(
            config(&src, &dest)
                .with_limits(2, 1.0)
                .with_omit_files(vec!["README*".to_string()]),
        )
        .unwrap();

        let report = exporter.run().unwrap();
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.documents[0].file_count, 2);
        assert_eq!(report.documents[1].file_count, 1);
        assert_eq!(report.stats.get_exported_count(), 3);
        assert_eq!(report.stats.get_omitted_files(), 1);
        assert_eq!(report.stats.get_documents_written(), 2);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_partial_source_failure() {
        let src = project(&["a.txt"]);
        let dest = TempDir::new().unwrap();
        let mut sources = SourceMapping::new();
        sources.insert("good", src.path()).unwrap();
        sources.insert("missing", dest.path().join("nope")).unwrap();

        let exporter = Exporter::new(ExportConfig::new(sources, dest.path().join("out"))).unwrap();
        let report = exporter.run().unwrap();

        assert_eq!(report.stats.get_exported_count(), 1);
        assert_eq!(report.source_failures.len(), 1);
        assert!(report.has_failures());
        assert_eq!(report.all_failures().len(), 1);
    }

    #[test]
    fn test_all_sources_missing() {
        let dest = TempDir::new().unwrap();
        let mut sources = SourceMapping::new();
        sources.insert("missing", dest.path().join("nope")).unwrap();

        let out = dest.path().join("out");
        let exporter = Exporter::new(ExportConfig::new(sources, &out)).unwrap();
        assert!(matches!(
            exporter.run(),
            Err(ExportError::SourceNotFound { .. })
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_clean_refuses_source_inside_destination() {
        let root = project(&["src/a.txt"]);
        let mut sources = SourceMapping::new();
        sources.insert("p", root.path().join("src")).unwrap();

        let exporter = Exporter::new(
            ExportConfig::new(sources, root.path()).with_mode(WriteMode::Clean),
        )
        .unwrap();
        assert!(matches!(
            exporter.run(),
            Err(ExportError::DestinationUnwritable { .. })
        ));
        assert!(root.path().join("src/a.txt").exists());
    }

    #[test]
    fn test_plan_does_not_write() {
        let src = project(&["a.txt", "node_modules/b.js"]);
        let dest = TempDir::new().unwrap();
        let exporter = Exporter::new(
            config(&src, &dest).with_omit_folders(vec!["node_modules".to_string()]),
        )
        .unwrap();

        let plan = exporter.plan().unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].1.files.len(), 1);
        assert_eq!(plan[0].1.omitted_folders, 1);
        assert!(!dest.path().join("out").exists());
    }

    #[test]
    fn test_tree_file_written() {
        let src = project(&["a.txt"]);
        let dest = TempDir::new().unwrap();
        let exporter = Exporter::new(config(&src, &dest).with_tree(true)).unwrap();

        let report = exporter.run().unwrap();
        assert_eq!(report.tree_files.len(), 1);
        let text = fs::read_to_string(&report.tree_files[0]).unwrap();
        assert!(text.starts_with("p Project Structure:"));
        assert!(text.contains("└── a.txt"));
    }

    #[test]
    fn test_file_removed_after_collection_is_skipped() {
        let src = project(&["a.txt", "b.txt", "c.txt"]);
        let dest = TempDir::new().unwrap();
        let exporter = Exporter::new(config(&src, &dest)).unwrap();

        let source = exporter.config().sources.iter().next().unwrap();
        let collection = collect_files(&source, &exporter.rules, &exporter.scope(&source));
        assert_eq!(collection.files.len(), 3);
        fs::remove_file(src.path().join("b.txt")).unwrap();

        let mut state = exporter.start().unwrap();
        exporter.export_files(&collection.files, &mut state).unwrap();
        let batch = state.batcher.finish().unwrap();
        exporter.flush(&batch, &mut state).unwrap();

        assert_eq!(state.stats.get_error_count(), 1);
        assert_eq!(state.stats.get_exported_count(), 2);
        assert_eq!(state.failures.len(), 1);
        assert_eq!(state.failures[0].0, src.path().join("b.txt"));
        assert_eq!(state.documents.len(), 1);
        assert_eq!(state.documents[0].file_count, 2);

        let text = fs::read_to_string(&state.documents[0].path).unwrap();
        assert!(text.contains("p/a.txt"));
        assert!(text.contains("p/c.txt"));
        assert!(!text.contains("p/b.txt"));
    }

    #[test]
    fn test_destination_inside_source_not_exported() {
        let src = project(&["a.txt", "b.txt"]);
        let out = src.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("export_0099.json"), "[]").unwrap();

        let mut sources = SourceMapping::new();
        sources.insert("p", src.path()).unwrap();
        let exporter = Exporter::new(
            ExportConfig::new(sources, &out)
                .with_limits(1, 1.0)
                .with_tree(true),
        )
        .unwrap();

        let report = exporter.run().unwrap();
        assert_eq!(report.stats.get_exported_count(), 2);
        assert_eq!(report.documents.len(), 2);

        let tree = fs::read_to_string(&report.tree_files[0]).unwrap();
        assert!(!tree.contains("out/"));
    }

    #[test]
    fn test_destination_equal_to_source_refused() {
        let src = project(&["a.txt"]);
        let mut sources = SourceMapping::new();
        sources.insert("p", src.path()).unwrap();

        let exporter = Exporter::new(ExportConfig::new(sources, src.path())).unwrap();
        assert!(matches!(
            exporter.run(),
            Err(ExportError::DestinationUnwritable { .. })
        ));
        assert_eq!(fs::read_dir(src.path()).unwrap().count(), 1);
    }
}
