pub mod bitmidi;
pub mod genius;
pub mod http;
pub mod lyricsfreak;

use std::io::Read;
use std::rc::Rc;

use tracing::{debug, warn, Level};

use crate::config::{LyricsConfig, LyricsProvider};
use crate::error::{FetchError, FetchOutcome};
use crate::models::SearchPage;

use self::http::Transport;

/// 페이지 단위로 검색되는 MIDI 카탈로그.
/// 모든 실패는 결과 값으로만 드러나고 이 계층 밖으로 전파되지 않는다.
pub trait CatalogSource {
    /// 아티스트 이름으로 한 페이지를 검색한다. 페이지 번호는 0부터 시작한다.
    fn search_page(&self, artist: &str, page: u32) -> FetchOutcome<SearchPage>;
    /// 항목의 다운로드 경로에서 바이너리 본문 스트림을 연다.
    fn open_download(&self, download_path: &str) -> FetchOutcome<Box<dyn Read>>;
}

/// 가사 제공자 하나.
pub trait LyricsSource {
    fn name(&self) -> &str;
    /// 아티스트와 곡 이름으로 가사를 찾는다.
    fn fetch(&self, artist: &str, song: &str) -> FetchOutcome<String>;
}

/// 설정된 순서대로 가사 제공자를 만든다.
pub fn build_lyrics_sources(
    config: &LyricsConfig,
    transport: Rc<dyn Transport>,
) -> Vec<Box<dyn LyricsSource>> {
    config
        .sources
        .iter()
        .map(|provider| -> Box<dyn LyricsSource> {
            match provider {
                LyricsProvider::Genius => Box::new(genius::GeniusClient::new(
                    &config.genius_base_url,
                    Rc::clone(&transport),
                )),
                LyricsProvider::LyricsFreak => Box::new(lyricsfreak::LyricsFreakClient::new(
                    &config.lyricsfreak_base_url,
                    Rc::clone(&transport),
                )),
            }
        })
        .collect()
}

/// 실패 결과를 남길 로그 수준. 404는 흔한 "없음"이라 debug, 그 밖의 실패는 warn.
pub(crate) fn failure_level<T>(outcome: &FetchOutcome<T>) -> Level {
    match outcome {
        FetchOutcome::TransientError(_) => Level::WARN,
        _ => Level::DEBUG,
    }
}

/// 요청 실패를 결과 값으로 바꾸면서 진단 로그를 한 줄만 남긴다.
pub(crate) fn report_failure<T>(provider: &str, url: &str, err: FetchError) -> FetchOutcome<T> {
    let reason = err.to_string();
    let outcome = FetchOutcome::from_error(err);
    if failure_level(&outcome) == Level::WARN {
        warn!(provider, url, error = %reason, "request failed");
    } else {
        debug!(provider, url, error = %reason, "nothing at this address");
    }
    outcome
}

/// 요소 안의 텍스트 노드를 줄바꿈으로 이어 붙인다.
pub(crate) fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("\n")
}
