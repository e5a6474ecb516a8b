use std::io::Read;
use std::rc::Rc;

use serde::Deserialize;
use tracing::warn;

use crate::error::FetchOutcome;
use crate::models::{CatalogItem, SearchPage, UNKNOWN_SONG};
use crate::sources::http::Transport;
use crate::sources::{report_failure, CatalogSource};

/// BitMidi 검색 API 클라이언트.
/// `GET /api/midi/search?q=<artist>&page=<n>`의 JSON 응답을 해석한다.
pub struct BitMidiClient {
    base_url: String,
    transport: Rc<dyn Transport>,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Option<SearchResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    #[serde(default)]
    results: Vec<RawItem>,
    page_total: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    name: Option<String>,
    download_url: Option<String>,
}

impl BitMidiClient {
    pub fn new(base_url: &str, transport: Rc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/api/midi/search", self.base_url)
    }

    fn download_url(&self, download_path: &str) -> String {
        if download_path.starts_with("http://") || download_path.starts_with("https://") {
            download_path.to_string()
        } else {
            format!("{}{}", self.base_url, download_path)
        }
    }

    /// 응답 본문을 페이지로 변환한다. 형식이 맞지 않으면 None.
    fn parse_page(body: &str, page: u32) -> Option<SearchPage> {
        let response: SearchResponse = serde_json::from_str(body).ok()?;
        let result = response.result?;

        let items = result
            .results
            .into_iter()
            .map(|raw| {
                let name = raw
                    .name
                    .map(|n| n.trim().to_string())
                    .unwrap_or_else(|| UNKNOWN_SONG.to_string());
                CatalogItem {
                    name,
                    download_path: raw.download_url.filter(|d| !d.is_empty()),
                    page,
                }
            })
            .collect();

        Some(SearchPage {
            items,
            page_total: result.page_total,
        })
    }
}

impl CatalogSource for BitMidiClient {
    fn search_page(&self, artist: &str, page: u32) -> FetchOutcome<SearchPage> {
        let page_param = page.to_string();
        let query = [("q", artist), ("page", page_param.as_str())];

        let search_url = self.search_url();
        let body = match self.transport.get_text(&search_url, &query) {
            Ok(body) => body,
            Err(e) => return report_failure("BitMidi", &search_url, e),
        };

        match Self::parse_page(&body, page) {
            Some(parsed) => FetchOutcome::Success(parsed),
            None => {
                warn!(artist, page, "search response had no usable result");
                FetchOutcome::NotFound
            }
        }
    }

    fn open_download(&self, download_path: &str) -> FetchOutcome<Box<dyn Read>> {
        let url = self.download_url(download_path);
        match self.transport.open(&url) {
            Ok(stream) => FetchOutcome::Success(stream),
            Err(e) => report_failure("BitMidi", &url, e),
        }
    }
}
