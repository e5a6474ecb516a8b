use std::collections::VecDeque;
use std::time::Duration;

use crate::core::pacer::Pacer;
use crate::error::FetchOutcome;
use crate::models::CatalogItem;
use crate::sources::CatalogSource;

/// 검색 결과를 페이지 단위로 가져오며 항목을 하나씩 내보내는 반복자.
///
/// 0페이지부터 시작하고, 빈 결과나 실패를 받거나 소스가 알려준 전체 페이지 수에
/// 닿으면 끝난다. 한 번 끝나면 다시 시작하지 않는다.
pub struct CatalogPages<'a> {
    source: &'a dyn CatalogSource,
    pacer: &'a dyn Pacer,
    artist: String,
    settle: Duration,
    gap: Duration,
    next_page: u32,
    page_total: Option<u32>,
    buffer: VecDeque<CatalogItem>,
    finished: bool,
}

impl<'a> CatalogPages<'a> {
    pub fn new(
        source: &'a dyn CatalogSource,
        pacer: &'a dyn Pacer,
        artist: &str,
        settle: Duration,
        gap: Duration,
    ) -> Self {
        Self {
            source,
            pacer,
            artist: artist.to_string(),
            settle,
            gap,
            next_page: 0,
            page_total: None,
            buffer: VecDeque::new(),
            finished: false,
        }
    }

    /// 지금까지 결과를 받은 페이지 수.
    pub fn pages_fetched(&self) -> u32 {
        self.next_page
    }

    fn fetch_next(&mut self) {
        let page = self.next_page;
        println!("Fetching page {} for '{}'...", page, self.artist);

        match self.source.search_page(&self.artist, page) {
            FetchOutcome::Success(result) if !result.items.is_empty() => {
                self.page_total = result.page_total;
                self.buffer.extend(result.items);
                self.next_page += 1;
            }
            _ => {
                println!("[DONE] No more results for '{}'.", self.artist);
                self.finished = true;
            }
        }
    }
}

impl Iterator for CatalogPages<'_> {
    type Item = CatalogItem;

    fn next(&mut self) -> Option<CatalogItem> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(item);
            }
            if self.finished {
                return None;
            }

            if self.next_page > 0 {
                self.pacer.pause(self.settle);
                if self.page_total.is_some_and(|total| self.next_page >= total) {
                    self.finished = true;
                    return None;
                }
                self.pacer.pause(self.gap);
            }

            self.fetch_next();
        }
    }
}
