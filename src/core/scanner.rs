use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// 루트 아래의 아티스트 폴더 목록을 이름순으로 반환한다.
pub fn artist_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)
        .with_context(|| format!("{}을(를) 읽을 수 없습니다", root.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// 폴더 바로 아래의 MIDI 파일만 반환한다 (하위 폴더는 보지 않는다).
pub fn midi_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_midi(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// 디렉토리를 재귀 탐색하여 모든 MIDI 파일을 모은다.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_midi_files(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_midi_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("{}은(는) 디렉토리가 아닙니다", dir.display());
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_midi_files(&path, files)?;
        } else if is_midi(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// 확장자가 .mid인지 확인한다 (대소문자 무시).
pub fn is_midi(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mid"))
        .unwrap_or(false)
}
