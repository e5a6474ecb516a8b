use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::FetchOutcome;
use crate::sources::http::Transport;
use crate::sources::{element_text, report_failure, LyricsSource};

static LYRICS_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/lyrics/.*\.html").expect("static regex"));

/// LyricsFreak 스크래퍼. 곡 이름으로 검색한 뒤 첫 번째 가사 링크를 따라간다.
pub struct LyricsFreakClient {
    base_url: String,
    transport: Rc<dyn Transport>,
}

impl LyricsFreakClient {
    pub fn new(base_url: &str, transport: Rc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// 검색 결과에서 첫 번째 가사 페이지 링크를 찾는다.
    fn find_result_link(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let anchor = Selector::parse("a[href]").unwrap();

        document
            .select(&anchor)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| LYRICS_HREF.is_match(href))
            .map(|href| href.to_string())
    }

    fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}{}", self.base_url, href)
        }
    }

    fn extract_lyrics(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let content = Selector::parse("div#content").unwrap();

        let lyrics = element_text(document.select(&content).next()?)
            .trim()
            .to_string();
        if lyrics.is_empty() {
            None
        } else {
            Some(lyrics)
        }
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchOutcome<String>> {
        self.transport
            .get_text(url, query)
            .map_err(|e| report_failure(self.name(), url, e))
    }
}

impl LyricsSource for LyricsFreakClient {
    fn name(&self) -> &str {
        "LyricsFreak"
    }

    fn fetch(&self, artist: &str, song: &str) -> FetchOutcome<String> {
        debug!("  Trying LyricsFreak: {} - {}", artist, song);
        let song_query = song.replace('_', " ");
        let search_url = format!("{}/search.php", self.base_url);

        let search_html = match self.get(&search_url, &[("q", song_query.as_str())]) {
            Ok(html) => html,
            Err(outcome) => return outcome,
        };

        let Some(href) = Self::find_result_link(&search_html) else {
            debug!(song, "no LyricsFreak search result");
            return FetchOutcome::NotFound;
        };

        let lyrics_url = self.absolute(&href);
        let lyrics_html = match self.get(&lyrics_url, &[]) {
            Ok(html) => html,
            Err(outcome) => return outcome,
        };

        match Self::extract_lyrics(&lyrics_html) {
            Some(lyrics) => FetchOutcome::Success(lyrics),
            None => {
                debug!(url = %lyrics_url, "no content block on LyricsFreak page");
                FetchOutcome::NotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::http::testing::FakeTransport;

    const SEARCH_HTML: &str = r#"<html><body>
        <a href="/about.html">About</a>
        <a href="/lyrics/q/queen/bohemian+rhapsody_20112561.html">Bohemian Rhapsody</a>
        <a href="/lyrics/q/queen/other_1.html">Other</a>
    </body></html>"#;

    const LYRICS_HTML: &str = r#"<html><body>
        <div id="content">Is this the real life?<br>Is this just fantasy?</div>
    </body></html>"#;

    #[test]
    fn test_search_then_follow_link() {
        let fake = Rc::new(
            FakeTransport::new()
                .with_text(
                    "https://freak.test/search.php?q=Bohemian Rhapsody",
                    SEARCH_HTML,
                )
                .with_text(
                    "https://freak.test/lyrics/q/queen/bohemian+rhapsody_20112561.html",
                    LYRICS_HTML,
                ),
        );
        let transport: Rc<dyn Transport> = fake.clone();
        let freak = LyricsFreakClient::new("https://freak.test", transport);

        let lyrics = freak.fetch("Queen", "Bohemian_Rhapsody").success().unwrap();
        assert_eq!(lyrics, "Is this the real life?\nIs this just fantasy?");
        assert_eq!(fake.requests().len(), 2);
    }

    #[test]
    fn test_no_result_link_is_not_found() {
        let fake = Rc::new(FakeTransport::new().with_text(
            "https://freak.test/search.php?q=Nothing",
            r#"<a href="/about.html">About</a>"#,
        ));
        let transport: Rc<dyn Transport> = fake.clone();
        let freak = LyricsFreakClient::new("https://freak.test", transport);

        assert!(matches!(freak.fetch("X", "Nothing"), FetchOutcome::NotFound));
        assert_eq!(fake.requests().len(), 1);
    }

    #[test]
    fn test_page_without_content_is_not_found() {
        let freak = LyricsFreakClient::new(
            "https://freak.test",
            Rc::new(
                FakeTransport::new()
                    .with_text("https://freak.test/search.php?q=Song", SEARCH_HTML)
                    .with_text(
                        "https://freak.test/lyrics/q/queen/bohemian+rhapsody_20112561.html",
                        "<div id=\"other\">x</div>",
                    ),
            ),
        );
        assert!(matches!(freak.fetch("X", "Song"), FetchOutcome::NotFound));
    }

    #[test]
    fn test_search_timeout_is_transient() {
        let freak = LyricsFreakClient::new(
            "https://freak.test",
            Rc::new(FakeTransport::new().with_timeout("https://freak.test/search.php?q=Song")),
        );
        assert!(matches!(
            freak.fetch("X", "Song"),
            FetchOutcome::TransientError(_)
        ));
    }
}
