use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const UNKNOWN_SONG: &str = "Unknown Song";

/// MIDI 검색 API가 돌려주는 항목 하나.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub name: String,
    pub download_path: Option<String>,
    pub page: u32,
}

/// 검색 결과 한 페이지.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<CatalogItem>,
    pub page_total: Option<u32>,
}

/// 처리할 아티스트 하나. 폴더와 매니페스트 경로를 함께 가진다.
#[derive(Debug, Clone)]
pub struct ArtistJob {
    pub name: String,
    pub folder: PathBuf,
    pub manifest: PathBuf,
}

impl ArtistJob {
    /// `<root>/<Artist_Name>/<Artist_Name>_songs.txt` 규칙으로 작업을 만든다.
    pub fn new(root: &Path, name: &str) -> Self {
        let safe = folder_name(name);
        let folder = root.join(&safe);
        let manifest = folder.join(format!("{}_songs.txt", safe));
        Self {
            name: name.to_string(),
            folder,
            manifest,
        }
    }
}

/// 아티스트 이름의 공백을 `_`로 바꾼 폴더 이름.
pub fn folder_name(artist: &str) -> String {
    artist.replace(' ', "_")
}

/// 가사를 기다리는 (아티스트, 곡) 쌍.
#[derive(Debug, Clone)]
pub struct LyricsJob {
    pub artist: String,
    pub song: String,
    pub target: PathBuf,
}

impl LyricsJob {
    /// 기존 MIDI 파일에서 작업을 만든다. 가사 파일은 같은 이름의 `.txt`다.
    pub fn from_midi(artist: &str, midi_path: &Path) -> Option<Self> {
        let song = midi_path.file_stem()?.to_str()?.to_string();
        Some(Self {
            artist: artist.to_string(),
            song,
            target: midi_path.with_extension("txt"),
        })
    }
}

/// 아티스트 목록 입력 파일 (`{"artists": [...]}`).
#[derive(Debug, Deserialize)]
pub struct ArtistList {
    #[serde(default)]
    pub artists: Vec<String>,
}
