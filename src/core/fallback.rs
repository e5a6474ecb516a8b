use std::time::Duration;

use crate::core::pacer::Pacer;
use crate::error::FetchOutcome;
use crate::sources::LyricsSource;

/// 가사를 찾은 제공자와 본문.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLyrics {
    pub provider: String,
    pub text: String,
}

/// 제공자를 순서대로 시도해 처음 성공한 가사를 돌려준다.
/// 실패한 시도 뒤에는 매번 `delay`만큼 쉬고, 성공하면 남은 제공자는 호출하지 않는다.
/// 실패 로그는 각 제공자가 남기므로 여기서는 다시 남기지 않는다.
pub fn resolve_lyrics(
    sources: &[Box<dyn LyricsSource>],
    pacer: &dyn Pacer,
    delay: Duration,
    artist: &str,
    song: &str,
) -> Option<ResolvedLyrics> {
    for source in sources {
        if let FetchOutcome::Success(text) = source.fetch(artist, song) {
            if !text.trim().is_empty() {
                return Some(ResolvedLyrics {
                    provider: source.name().to_string(),
                    text,
                });
            }
        }
        pacer.pause(delay);
    }
    None
}
