use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SETTLE_SECS: f64 = 1.0;
const DEFAULT_PAGE_GAP_SECS: f64 = 2.0;
const DEFAULT_REQUEST_DELAY_SECS: f64 = 2.0;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// 전체 설정. 파이프라인 진입점마다 명시적으로 전달된다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub root: PathBuf,
    pub artists_file: PathBuf,
    pub debug: bool,
    pub midi: MidiConfig,
    pub lyrics: LyricsConfig,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Artists"),
            artists_file: PathBuf::from("artist.json"),
            debug: true,
            midi: MidiConfig::default(),
            lyrics: LyricsConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    pub base_url: String,
    /// 한 페이지의 항목을 모두 처리한 뒤 쉬는 시간.
    pub page_settle_secs: f64,
    /// 다음 페이지를 요청하기 전에 추가로 쉬는 시간.
    pub page_gap_secs: f64,
    pub chunk_size: usize,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://bitmidi.com".to_string(),
            page_settle_secs: DEFAULT_PAGE_SETTLE_SECS,
            page_gap_secs: DEFAULT_PAGE_GAP_SECS,
            chunk_size: 1024,
        }
    }
}

impl MidiConfig {
    pub fn page_settle(&self) -> Duration {
        secs("midi.page_settle_secs", self.page_settle_secs, DEFAULT_PAGE_SETTLE_SECS)
    }

    pub fn page_gap(&self) -> Duration {
        secs("midi.page_gap_secs", self.page_gap_secs, DEFAULT_PAGE_GAP_SECS)
    }
}

/// 가사 제공자 종류. 순서가 곧 폴백 순서다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricsProvider {
    Genius,
    #[serde(rename = "lyricsfreak")]
    LyricsFreak,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub sources: Vec<LyricsProvider>,
    pub request_delay_secs: f64,
    pub genius_base_url: String,
    pub lyricsfreak_base_url: String,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            sources: vec![LyricsProvider::Genius, LyricsProvider::LyricsFreak],
            request_delay_secs: DEFAULT_REQUEST_DELAY_SECS,
            genius_base_url: "https://genius.com".to_string(),
            lyricsfreak_base_url: "https://www.lyricsfreak.com".to_string(),
        }
    }
}

impl LyricsConfig {
    pub fn request_delay(&self) -> Duration {
        secs(
            "lyrics.request_delay_secs",
            self.request_delay_secs,
            DEFAULT_REQUEST_DELAY_SECS,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub search_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_timeout_secs: 10,
            download_timeout_secs: 15,
        }
    }
}

impl HttpConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

/// 음수와 NaN은 0으로, `Duration`으로 표현할 수 없는 값(`inf` 등)은 기본값으로 바꾼다.
fn secs(key: &str, value: f64, default: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or_else(|e| {
        tracing::warn!(key, value, error = %e, "delay out of range, using default");
        Duration::from_secs_f64(default)
    })
}

pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("midi-harvest")
        .join("config.toml")
}

/// 설정 파일을 읽는다. 파일이 없거나 읽을 수 없으면 기본값을 쓴다.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            // 로거 초기화 전이므로 직접 출력한다.
            eprintln!("경고: 설정 파일을 해석할 수 없어 기본값을 사용합니다 ({}): {}", path.display(), e);
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).context("설정 직렬화에 실패했습니다")?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.toml"));
        assert_eq!(cfg.root, PathBuf::from("Artists"));
        assert_eq!(
            cfg.lyrics.sources,
            vec![LyricsProvider::Genius, LyricsProvider::LyricsFreak]
        );
        assert_eq!(cfg.lyrics.request_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "debug = false\n[lyrics]\nsources = [\"lyricsfreak\"]\n",
        )
        .unwrap();

        let cfg = load_config(&path);
        assert!(!cfg.debug);
        assert_eq!(cfg.lyrics.sources, vec![LyricsProvider::LyricsFreak]);
        assert_eq!(cfg.midi.base_url, "https://bitmidi.com");
        assert_eq!(cfg.http.search_timeout_secs, 10);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "root = [").unwrap();
        let cfg = load_config(&path);
        assert_eq!(cfg.artists_file, PathBuf::from("artist.json"));
    }

    #[test]
    fn test_out_of_range_delays_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[midi]\npage_gap_secs = inf\npage_settle_secs = 1e30\n[lyrics]\nrequest_delay_secs = nan\n",
        )
        .unwrap();

        let cfg = load_config(&path);
        assert_eq!(cfg.midi.page_gap(), Duration::from_secs(2));
        assert_eq!(cfg.midi.page_settle(), Duration::from_secs(1));
        assert_eq!(cfg.lyrics.request_delay(), Duration::ZERO);
    }

    #[test]
    fn test_negative_delay_is_zero() {
        let mut cfg = Config::default();
        cfg.midi.page_settle_secs = -3.0;
        assert_eq!(cfg.midi.page_settle(), Duration::ZERO);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.root = PathBuf::from("Elsewhere");
        cfg.midi.page_gap_secs = 0.5;

        save_config(&cfg, &path).unwrap();
        let loaded = load_config(&path);
        assert_eq!(loaded.root, PathBuf::from("Elsewhere"));
        assert_eq!(loaded.midi.page_gap(), Duration::from_millis(500));
    }
}
