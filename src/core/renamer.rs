use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::warn;

use crate::core::scanner;

static DUPLICATE_MID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mid(\.mid)$").expect("static regex"));

/// 확장자 바로 앞에 중복된 `mid`를 제거한다 (`Song Titlemid.mid` → `Song Title.mid`).
pub fn strip_duplicate_mid(filename: &str) -> String {
    DUPLICATE_MID.replace(filename, "${1}").into_owned()
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenameOutcome {
    Unchanged,
    Renamed(PathBuf),
    /// 새 이름의 파일이 이미 있어 건드리지 않았다.
    Conflict(PathBuf),
}

/// 파일 하나의 이름을 고친다. 같은 디렉토리에 대상 이름이 이미 있으면 덮어쓰지 않는다.
pub fn repair_file(path: &Path) -> Result<RenameOutcome> {
    let Some(original) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(RenameOutcome::Unchanged);
    };

    let cleaned = strip_duplicate_mid(original);
    if cleaned == original {
        return Ok(RenameOutcome::Unchanged);
    }

    let new_path = path.with_file_name(&cleaned);
    if new_path.exists() {
        return Ok(RenameOutcome::Conflict(new_path));
    }

    std::fs::rename(path, &new_path)
        .with_context(|| format!("이름을 바꿀 수 없습니다: {}", path.display()))?;
    Ok(RenameOutcome::Renamed(new_path))
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RepairReport {
    pub scanned: usize,
    pub renamed: usize,
    pub conflicts: usize,
}

/// 루트 아래 모든 MIDI 파일의 이름을 재귀적으로 고친다.
pub fn repair_tree(root: &Path) -> Result<RepairReport> {
    let mut report = RepairReport::default();

    for path in scanner::scan_directory(root)? {
        report.scanned += 1;
        match repair_file(&path)? {
            RenameOutcome::Unchanged => {}
            RenameOutcome::Renamed(new_path) => {
                report.renamed += 1;
                println!(
                    "Renamed: {} -> {}",
                    display_name(&path),
                    display_name(&new_path)
                );
            }
            RenameOutcome::Conflict(new_path) => {
                report.conflicts += 1;
                warn!(
                    from = %path.display(),
                    to = %new_path.display(),
                    "target name already exists, leaving file as is"
                );
            }
        }
    }

    Ok(report)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
