//! 파일 수집 모듈
//!
//! 소스 폴더를 깊이 우선으로 탐색하며 제외 규칙을 적용해 내보낼 파일을 수집합니다.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::ExportError;
use crate::pattern::OmissionRules;
use crate::source::Source;

/// 수집된 파일 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// 실제 파일 경로
    pub path: PathBuf,
    /// 프로젝트 이름으로 시작하는 출력 경로 (`/` 구분)
    pub record_path: String,
}

/// 한 소스의 수집 결과
#[derive(Debug, Default)]
pub struct Collection {
    /// 탐색 순서대로 정렬된 내보낼 파일
    pub files: Vec<SourceFile>,
    /// 파일 패턴으로 제외된 파일 수
    pub omitted_files: usize,
    /// 폴더 패턴으로 제외된 폴더 수 (하위 항목은 세지 않음)
    pub omitted_folders: usize,
    /// 탐색 중 발생한 에러 (해당 항목만 건너뜀)
    pub errors: Vec<ExportError>,
}

/// 탐색 범위
///
/// 최대 깊이와, 소스 안에 있는 출력 폴더처럼 탐색에서 빼야 하는 폴더를 담습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkScope {
    /// 최대 탐색 깊이 (루트 0)
    pub max_depth: Option<usize>,
    /// 내려가지 않을 폴더 (소스 경로 기준으로 이어 붙인 경로)
    pub skip_dir: Option<PathBuf>,
}

impl WalkScope {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            skip_dir: None,
        }
    }

    /// 출력 폴더가 소스 안에 있으면 그 폴더를 건너뛰도록 설정
    pub fn excluding_output(mut self, root: &Path, destination: &Path) -> Self {
        self.skip_dir = nested_dir(root, destination);
        self
    }

    /// 깊이 `depth`의 항목을 포함하는지 확인
    pub fn includes_depth(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    /// 건너뛸 폴더인지 확인
    pub fn skips(&self, path: &Path) -> bool {
        self.skip_dir.as_deref() == Some(path)
    }
}

/// `dir`이 `root` 하위 폴더이면 `root`에 상대 경로를 이어 붙인 경로
///
/// walkdir가 돌려주는 경로와 그대로 비교할 수 있도록 `root` 표기를 유지합니다.
fn nested_dir(root: &Path, dir: &Path) -> Option<PathBuf> {
    let root_abs = root.canonicalize().ok()?;
    let dir_abs = absolute(dir);
    let relative = dir_abs.strip_prefix(&root_abs).ok()?;

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(root.join(relative))
    }
}

/// 존재하면 정규화된 경로, 아니면 현재 폴더 기준 절대 경로
fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// 소스 폴더에서 내보낼 파일 수집
///
/// 이름 순으로 깊이 우선 탐색하며, 제외 패턴과 일치하는 폴더는 내려가지 않습니다.
/// 심볼릭 링크는 따라가지 않고 일반 파일만 수집합니다.
pub fn collect_files(source: &Source, rules: &OmissionRules, scope: &WalkScope) -> Collection {
    let mut collection = Collection::default();
    let mut omitted_folders = 0;

    let mut walker = WalkDir::new(&source.path)
        .follow_links(false)
        .sort_by_file_name();
    if let Some(max_depth) = scope.max_depth {
        walker = walker.max_depth(max_depth);
    }

    let entries = walker.into_iter().filter_entry(|e| {
        if e.depth() == 0 || !e.file_type().is_dir() {
            return true;
        }
        if scope.skips(e.path()) {
            return false;
        }
        let omitted = rules.omits_folder(&entry_name(e));
        if omitted {
            omitted_folders += 1;
        }
        !omitted
    });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let file = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| source.path.clone());
                collection.errors.push(ExportError::FileReadError {
                    file,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if rules.omits_file(&entry_name(&entry)) {
            collection.omitted_files += 1;
            continue;
        }

        let record_path = record_path(&source.name, &source.path, entry.path());
        collection.files.push(SourceFile {
            path: entry.into_path(),
            record_path,
        });
    }

    collection.omitted_folders = omitted_folders;
    collection
}

fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

/// 프로젝트 이름을 붙인 `/` 구분 상대 경로
///
/// # Examples
/// ```
/// use projson::collector::record_path;
/// use std::path::Path;
///
/// let path = record_path("api", Path::new("/srv/api"), Path::new("/srv/api/src/main.rs"));
/// assert_eq!(path, "api/src/main.rs");
/// ```
pub fn record_path(project: &str, root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);

    let mut path = project.to_string();
    for component in relative.components() {
        path.push('/');
        path.push_str(&component.as_os_str().to_string_lossy());
    }
    path
}
