//! 통계 및 유틸리티 모듈
//!
//! 내보내기 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// 내보내기 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 수집된 파일 수 (제외되지 않은 파일)
    pub total_files: AtomicUsize,
    /// 내보낸 파일 수
    pub exported_count: AtomicUsize,
    /// 파일 패턴으로 제외된 파일 수
    pub omitted_files: AtomicUsize,
    /// 폴더 패턴으로 제외된 폴더 수
    pub omitted_folders: AtomicUsize,
    /// 읽기 에러로 건너뛴 파일 수
    pub error_count: AtomicUsize,
    /// 저장된 문서 수
    pub documents_written: AtomicUsize,
    /// 크기 제한을 넘은 단독 문서 수
    pub oversized_documents: AtomicUsize,
    /// 내용이 잘린 레코드 수
    pub truncated_records: AtomicUsize,
    /// 읽은 총 바이트
    pub total_bytes_read: AtomicU64,
    /// 쓴 총 바이트
    pub total_bytes_written: AtomicU64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 수집된 파일 수 추가
    pub fn add_total(&self, files: usize) {
        self.total_files.fetch_add(files, Ordering::Relaxed);
    }

    /// 내보낸 파일 카운트 증가
    pub fn increment_exported(&self) {
        self.exported_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 패턴 제외 카운트 추가
    pub fn add_omitted(&self, files: usize, folders: usize) {
        self.omitted_files.fetch_add(files, Ordering::Relaxed);
        self.omitted_folders.fetch_add(folders, Ordering::Relaxed);
    }

    /// 에러 카운트 증가
    pub fn increment_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 저장된 문서 기록
    pub fn record_document(&self, bytes: u64, oversized: bool, truncated: usize) {
        self.documents_written.fetch_add(1, Ordering::Relaxed);
        self.total_bytes_written.fetch_add(bytes, Ordering::Relaxed);
        if oversized {
            self.oversized_documents.fetch_add(1, Ordering::Relaxed);
        }
        self.truncated_records.fetch_add(truncated, Ordering::Relaxed);
    }

    /// 읽은 바이트 추가
    pub fn add_bytes_read(&self, bytes: u64) {
        self.total_bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn get_total_files(&self) -> usize {
        self.total_files.load(Ordering::Relaxed)
    }

    pub fn get_exported_count(&self) -> usize {
        self.exported_count.load(Ordering::Relaxed)
    }

    pub fn get_omitted_files(&self) -> usize {
        self.omitted_files.load(Ordering::Relaxed)
    }

    pub fn get_omitted_folders(&self) -> usize {
        self.omitted_folders.load(Ordering::Relaxed)
    }

    pub fn get_error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn get_documents_written(&self) -> usize {
        self.documents_written.load(Ordering::Relaxed)
    }

    pub fn get_oversized_documents(&self) -> usize {
        self.oversized_documents.load(Ordering::Relaxed)
    }

    pub fn get_truncated_records(&self) -> usize {
        self.truncated_records.load(Ordering::Relaxed)
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 내보내기 통계 요약 출력
    pub fn print_summary(&self) {
        let exported = self.get_exported_count();
        let errors = self.get_error_count();
        let oversized = self.get_oversized_documents();
        let truncated = self.get_truncated_records();
        let bytes_read = self.total_bytes_read.load(Ordering::Relaxed);
        let bytes_written = self.total_bytes_written.load(Ordering::Relaxed);

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 내보내기 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 대상 파일:    {}",
            "📁".bright_cyan(),
            self.get_total_files()
        );
        println!(
            "  {} 내보냄:       {}",
            "✅".bright_green(),
            exported.to_string().green()
        );
        println!(
            "  {} 패턴 제외:    {} 파일 / {} 폴더",
            "🚫".bright_yellow(),
            self.get_omitted_files(),
            self.get_omitted_folders()
        );

        if errors > 0 {
            println!(
                "  {} 읽기 실패:    {}",
                "❌".bright_red(),
                errors.to_string().red()
            );
        } else {
            println!("  {} 읽기 실패:    {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 문서 수:      {}",
            "📄".bright_white(),
            self.get_documents_written()
        );

        if oversized > 0 {
            println!(
                "  {} 크기 초과:    {} (단일 파일, 제한 무시)",
                "⚠️".bright_yellow(),
                oversized.to_string().yellow()
            );
        }

        if truncated > 0 {
            println!(
                "  {} 잘린 파일:    {}",
                "✂️".bright_yellow(),
                truncated.to_string().yellow()
            );
        }

        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(bytes_written)
        );
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 용량 단위 (큰 단위부터)
const BYTE_UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];

/// 바이트 수를 사람이 읽는 단위로 표시 (1024 기준, 소수점 두 자리)
///
/// ```
/// use projson::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    BYTE_UNITS
        .iter()
        .find(|(_, size)| bytes >= *size)
        .map(|(unit, size)| format!("{:.2} {}", bytes as f64 / *size as f64, unit))
        .unwrap_or_else(|| format!("{} B", bytes))
}

/// 처리 시간 표시
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        0 => format!("{}ms", duration.subsec_millis()),
        1..=59 => format!("{}.{:03}초", secs, duration.subsec_millis()),
        60..=3599 => format!("{}분 {}초", secs / 60, secs % 60),
        _ => format!("{}시간 {}분", secs / 3600, secs % 3600 / 60),
    }
}
