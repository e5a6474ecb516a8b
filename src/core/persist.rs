use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::normalize::normalize_for_filename;
use crate::error::FetchOutcome;
use crate::models::CatalogItem;
use crate::sources::CatalogSource;

/// 대상 파일이 이미 디스크에 있는지 확인한다. 네트워크 요청은 하지 않는다.
pub fn already_present(path: &Path) -> bool {
    path.exists()
}

/// 아티스트별 발견 기록. 한 줄에 발견한 곡 이름 하나씩, 추가만 한다.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    /// 이전 실행의 기록을 지우고 새 매니페스트를 연다.
    pub fn reset(path: &Path) -> Result<Self> {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("매니페스트를 초기화할 수 없습니다: {}", path.display()))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn append(&self, name: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("매니페스트를 열 수 없습니다: {}", self.path.display()))?;
        writeln!(file, "{}", name)
            .with_context(|| format!("매니페스트에 쓸 수 없습니다: {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// MIDI 항목 하나를 처리한 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteResult {
    Saved { path: PathBuf, bytes: u64 },
    AlreadyPresent(PathBuf),
    NoDownloadPath,
    Failed(String),
}

/// 항목을 매니페스트에 기록하고, 필요하면 본문을 내려받아 저장한다.
///
/// 매니페스트 기록은 결과와 상관없이 항상 일어난다. 같은 이름의 파일이 이미 있으면
/// 다운로드 요청을 보내지 않는다. 매니페스트 쓰기 실패만 오류로 전파되고,
/// 다운로드나 파일 쓰기 실패는 `WriteResult::Failed`로 돌려준다.
pub fn persist_midi(
    item: &CatalogItem,
    artist: &str,
    folder: &Path,
    manifest: &Manifest,
    source: &dyn CatalogSource,
    chunk_size: usize,
) -> Result<WriteResult> {
    manifest.append(&item.name)?;

    let Some(download_path) = item.download_path.as_deref() else {
        debug!(name = %item.name, page = item.page, "item has no download path");
        return Ok(WriteResult::NoDownloadPath);
    };

    let file_path = folder.join(normalize_for_filename(&item.name, artist));
    if already_present(&file_path) {
        println!("[SKIP] {} already exists", file_path.display());
        return Ok(WriteResult::AlreadyPresent(file_path));
    }

    let stream = match source.open_download(download_path) {
        FetchOutcome::Success(stream) => stream,
        FetchOutcome::NotFound => {
            println!("[FAIL] Couldn't download {}: not found", download_path);
            return Ok(WriteResult::Failed("not found".to_string()));
        }
        FetchOutcome::TransientError(reason) => {
            println!("[FAIL] Couldn't download {}: {}", download_path, reason);
            return Ok(WriteResult::Failed(reason));
        }
    };

    match write_streamed(stream, &file_path, chunk_size) {
        Ok(bytes) => {
            println!("[DOWNLOADED] {} -> {}", item.name, file_path.display());
            Ok(WriteResult::Saved {
                path: file_path,
                bytes,
            })
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            warn!(name = %item.name, error = %reason, "failed to save download");
            println!("[FAIL] Couldn't download {}: {}", download_path, reason);
            Ok(WriteResult::Failed(reason))
        }
    }
}

/// 가사 텍스트를 한 번에 기록한다.
pub fn persist_lyrics(text: &str, path: &Path) -> Result<()> {
    write_streamed(text.as_bytes(), path, text.len().max(1))?;
    Ok(())
}

/// 스트림을 고정 크기 청크로 `<path>.part`에 쓴 뒤 완료되면 제자리로 옮긴다.
/// 실패하면 임시 파일을 지우므로 `path`에는 완전한 파일만 존재한다.
fn write_streamed(mut reader: impl Read, path: &Path, chunk_size: usize) -> Result<u64> {
    let part = part_path(path);
    let result = copy_chunks(&mut reader, &part, chunk_size).and_then(|bytes| {
        std::fs::rename(&part, path)
            .with_context(|| format!("파일을 옮길 수 없습니다: {}", path.display()))?;
        Ok(bytes)
    });

    if result.is_err() && part.exists() {
        let _ = std::fs::remove_file(&part);
    }
    result
}

fn copy_chunks(reader: &mut impl Read, part: &Path, chunk_size: usize) -> Result<u64> {
    let mut file = File::create(part)
        .with_context(|| format!("파일을 만들 수 없습니다: {}", part.display()))?;
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("본문을 읽는 중 연결이 끊겼습니다"),
        };
        file.write_all(&buf[..n])
            .with_context(|| format!("파일에 쓸 수 없습니다: {}", part.display()))?;
        total += n as u64;
    }

    file.flush()?;
    Ok(total)
}

fn part_path(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
