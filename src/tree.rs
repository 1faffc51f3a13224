//! 폴더 구조 출력 모듈
//!
//! 소스 폴더를 `├──` / `└──` 형태의 트리 텍스트로 그립니다.

use std::fs;
use std::io;
use std::path::Path;

use crate::collector::WalkScope;
use crate::pattern::OmissionRules;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// 프로젝트 폴더 구조 텍스트 생성
///
/// 항목은 이름 순이며 제외 규칙에 걸린 파일/폴더와 탐색 범위 밖의 항목은 그리지 않습니다.
pub fn render_tree(
    name: &str,
    root: &Path,
    rules: &OmissionRules,
    scope: &WalkScope,
) -> io::Result<String> {
    let mut out = format!("{} Project Structure:\n\n", name);
    render_dir(root, "", 1, rules, scope, &mut out)?;
    Ok(out)
}

/// 폴더 구조 파일 이름
pub fn tree_file_name(name: &str) -> String {
    format!("project_structure_{}.txt", name)
}

fn render_dir(
    dir: &Path,
    prefix: &str,
    depth: usize,
    rules: &OmissionRules,
    scope: &WalkScope,
    out: &mut String,
) -> io::Result<()> {
    if !scope.includes_depth(depth) {
        return Ok(());
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type()?.is_dir();

        let omitted = if is_dir {
            rules.omits_folder(&name) || scope.skips(&dir.join(&name))
        } else {
            rules.omits_file(&name)
        };
        if !omitted {
            entries.push((name, is_dir));
        }
    }
    entries.sort();

    let count = entries.len();
    for (i, (name, is_dir)) in entries.into_iter().enumerate() {
        let last = i + 1 == count;
        let pointer = if last { LAST_BRANCH } else { BRANCH };

        if is_dir {
            out.push_str(&format!("{}{}{}/\n", prefix, pointer, name));
            let child_prefix = format!("{}{}", prefix, if last { SPACE } else { PIPE });
            render_dir(&dir.join(&name), &child_prefix, depth + 1, rules, scope, out)?;
        } else {
            out.push_str(&format!("{}{}{}\n", prefix, pointer, name));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/util")).unwrap();
        fs::create_dir_all(root.join("node_modules/x")).unwrap();
        fs::write(root.join("src/main.rs"), "").unwrap();
        fs::write(root.join("src/util/mod.rs"), "").unwrap();
        fs::write(root.join("Cargo.toml"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let rules = OmissionRules::new(&["README*"], &["node_modules"], false).unwrap();
        let tree = render_tree("demo", root, &rules, &WalkScope::default()).unwrap();

        let expected = "\
demo Project Structure:

├── Cargo.toml
└── src/
    ├── main.rs
    └── util/
        └── mod.rs
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_tree_file_name() {
        assert_eq!(tree_file_name("api"), "project_structure_api.txt");
    }

    #[test]
    fn test_render_tree_scope() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("l1/l2")).unwrap();
        fs::create_dir_all(root.join("out")).unwrap();
        fs::write(root.join("l1/one.txt"), "").unwrap();
        fs::write(root.join("l1/l2/two.txt"), "").unwrap();
        fs::write(root.join("out/export_0001.json"), "").unwrap();

        let rules = OmissionRules::default();
        let scope = WalkScope::new(Some(2)).excluding_output(root, &root.join("out"));
        let tree = render_tree("demo", root, &rules, &scope).unwrap();

        let expected = "\
demo Project Structure:

└── l1/
    ├── l2/
    └── one.txt
";
        assert_eq!(tree, expected);
    }
}
