use std::rc::Rc;

use scraper::{Html, Selector};
use tracing::debug;

use crate::core::normalize::normalize_for_url;
use crate::error::FetchOutcome;
use crate::sources::http::Transport;
use crate::sources::{element_text, report_failure, LyricsSource};

/// Genius 곡 페이지 스크래퍼.
/// 아티스트와 곡 이름의 슬러그로 페이지 주소를 만든다.
pub struct GeniusClient {
    base_url: String,
    transport: Rc<dyn Transport>,
}

impl GeniusClient {
    pub fn new(base_url: &str, transport: Rc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn lyrics_url(&self, artist: &str, song: &str) -> String {
        format!(
            "{}/{}-{}-lyrics",
            self.base_url,
            normalize_for_url(artist),
            normalize_for_url(song)
        )
    }

    /// 가사 컨테이너를 모두 찾아 텍스트를 이어 붙인다.
    fn extract_lyrics(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let container = Selector::parse(r#"div[data-lyrics-container="true"]"#).unwrap();

        let blocks: Vec<String> = document.select(&container).map(element_text).collect();
        if blocks.is_empty() {
            return None;
        }

        let lyrics = blocks.join("\n").trim().to_string();
        if lyrics.is_empty() {
            None
        } else {
            Some(lyrics)
        }
    }
}

impl LyricsSource for GeniusClient {
    fn name(&self) -> &str {
        "Genius"
    }

    fn fetch(&self, artist: &str, song: &str) -> FetchOutcome<String> {
        debug!("  Trying Genius: {} - {}", artist, song);
        let url = self.lyrics_url(artist, song);

        let html = match self.transport.get_text(&url, &[]) {
            Ok(html) => html,
            Err(e) => return report_failure(self.name(), &url, e),
        };

        match Self::extract_lyrics(&html) {
            Some(lyrics) => FetchOutcome::Success(lyrics),
            None => {
                debug!(url = %url, "no lyrics container on Genius page");
                FetchOutcome::NotFound
            }
        }
    }
}
