//! projson - PROJECT TO JSON EXPORTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use projson::{
    cli::Args,
    config::ExportConfig,
    exporter::{ExportReport, Exporter},
    stats::format_bytes,
};

/// 기본 에러 로그 파일 이름 (출력 폴더 안)
const ERROR_LOG_NAME: &str = "error_log.txt";

fn main() -> Result<()> {
    let args = Args::parse();

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("스레드 풀 초기화 실패")?;
    }

    let config = args.to_config()?;

    // 헤더 출력
    print_header(&args, &config);

    // 패턴 컴파일 및 제한 값 검증
    let exporter = Exporter::new(config)?;

    // 드라이런 모드
    if args.dry_run {
        return run_dry_run(&exporter);
    }

    run_export(&args, exporter)
}

/// 헤더 출력
fn print_header(args: &Args, config: &ExportConfig) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 PROJECT TO JSON EXPORTER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());

    for source in config.sources.iter() {
        println!(
            "  {} 소스: {} → {:?}",
            "📂".bright_cyan(),
            source.name.bright_white(),
            source.path
        );
    }

    if !args.dry_run {
        println!("  {} 출력 폴더: {:?}", "📄".bright_green(), config.destination);
        println!("  {} 모드: {}", "⚙️".bright_yellow(), config.mode);
    }

    println!(
        "  {} 문서당 제한: {} 파일 / {}",
        "📏".bright_white(),
        config.max_files_per_json,
        format_bytes(config.max_json_bytes())
    );
    println!("  {} 크기 초과 처리: {}", "📐".bright_white(), config.oversize);

    if !config.omit_files.is_empty() {
        println!(
            "  {} 제외 파일: {}",
            "🔍".bright_magenta(),
            config.omit_files.join(", ")
        );
    }

    if !config.omit_folders.is_empty() {
        println!(
            "  {} 제외 폴더: {}",
            "🔍".bright_magenta(),
            config.omit_folders.join(", ")
        );
    }

    if let Some(depth) = config.max_depth {
        println!("  {} 최대 깊이: {}", "📏".bright_white(), depth);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 내보내기 없음)".yellow()
        );
    }

    if config.pretty {
        println!(
            "  {} {}",
            "✨".bright_magenta(),
            "Pretty 출력 모드".magenta()
        );
    }

    if config.strip_comments {
        println!("  {} {}", "🧹".bright_cyan(), "주석 제거 모드".cyan());
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// 드라이런 출력
fn run_dry_run(exporter: &Exporter) -> Result<()> {
    let (_, source_failures) = exporter.check_sources()?;
    for failure in &source_failures {
        println!("  {} {}", "❌".bright_red(), failure.to_string().red());
    }

    let plan = exporter.plan()?;
    let mut total = 0;

    println!("\n{}", "📋 내보낼 파일 목록:".bright_cyan());
    for (source, collection) in &plan {
        println!(
            "\n  {} {} ({} 파일, 제외 {} 파일 / {} 폴더)",
            "📂".bright_cyan(),
            source.name.bright_white(),
            collection.files.len(),
            collection.omitted_files,
            collection.omitted_folders
        );
        for (i, file) in collection.files.iter().enumerate() {
            println!("  {}. {}", i + 1, file.record_path);
        }
        for error in &collection.errors {
            println!("  {} {}", "✗".red(), error.to_string().dimmed());
        }
        total += collection.files.len();
    }

    println!(
        "\n{} 총 {} 개의 파일이 내보내질 예정입니다.",
        "ℹ️".bright_blue(),
        total.to_string().bright_green()
    );

    Ok(())
}

/// 내보내기 실행
fn run_export(args: &Args, exporter: Exporter) -> Result<()> {
    let destination = exporter.config().destination.clone();

    // 진행률 바 설정
    let pb = create_progress_bar();
    let exporter = exporter.with_progress(pb.clone());

    println!("\n{}", "⚡ 내보내는 중...".bright_cyan());

    let report = exporter.run();
    pb.finish_with_message("완료!");
    let report = report?;

    // 소스 실패 출력
    for failure in &report.source_failures {
        println!("  {} {}", "❌".bright_red(), failure.to_string().red());
    }

    // 에러 출력
    print_errors(&report.failures, args.verbose);

    // 로그 파일 작성
    if report.has_failures() {
        let log_path = args
            .log
            .clone()
            .unwrap_or_else(|| destination.join(ERROR_LOG_NAME));
        write_error_log(&log_path, &report)?;
    }

    // 통계 출력
    report.stats.print_summary();

    for path in &report.tree_files {
        println!("  {} 폴더 구조 저장: {:?}", "🌳".bright_green(), path);
    }

    println!(
        "\n{} 저장 완료: {:?} ({} 개 문서)\n",
        "✅".bright_green(),
        destination,
        report.documents.len()
    );

    Ok(())
}

/// 진행률 바 생성
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

/// 에러 목록 출력
fn print_errors(errors: &[(PathBuf, String)], verbose: bool) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", "❌ 건너뛴 파일:".bright_red());
    for (path, error) in errors {
        println!("  {} {}", "•".red(), path.display());
        if verbose {
            println!("    {}", error.dimmed());
        }
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, report: &ExportReport) -> Result<()> {
    let failures = report.all_failures();
    let mut log_file = File::create(log_path)
        .with_context(|| format!("에러 로그를 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "projson 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 에러 수: {}", failures.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for (path, error) in &failures {
        writeln!(log_file, "\n파일: {:?}", path)?;
        writeln!(log_file, "에러: {}", error)?;
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
