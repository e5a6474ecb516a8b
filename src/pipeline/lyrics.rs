use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::fallback::resolve_lyrics;
use crate::core::pacer::Pacer;
use crate::core::persist::{already_present, persist_lyrics};
use crate::core::scanner;
use crate::models::LyricsJob;
use crate::sources::LyricsSource;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LyricsReport {
    pub artists: usize,
    pub saved: usize,
    pub already_present: usize,
    pub not_found: usize,
    pub write_failures: usize,
    pub elapsed: Duration,
}

/// 루트 아래 모든 아티스트 폴더의 MIDI 파일에 가사를 붙인다.
/// 루트가 없으면 메시지만 출력하고 `None`을 돌려준다.
pub fn run(
    config: &Config,
    sources: &[Box<dyn LyricsSource>],
    pacer: &dyn Pacer,
) -> Result<Option<LyricsReport>> {
    println!("Scanning directory: {}", config.root.display());
    if !config.root.exists() {
        println!("Error: Directory not found - {}", config.root.display());
        return Ok(None);
    }

    let started = Instant::now();
    let mut report = LyricsReport::default();

    for artist_dir in scanner::artist_dirs(&config.root)? {
        report.artists += 1;
        if let Err(e) = process_artist(config, &artist_dir, sources, pacer, &mut report) {
            warn!(folder = %artist_dir.display(), error = %e, "skipping artist folder");
        }
    }

    report.elapsed = started.elapsed();
    Ok(Some(report))
}

fn process_artist(
    config: &Config,
    artist_dir: &Path,
    sources: &[Box<dyn LyricsSource>],
    pacer: &dyn Pacer,
    report: &mut LyricsReport,
) -> Result<()> {
    let artist = artist_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!("Processing artist: {}", artist);

    let midi_files = scanner::midi_files_in(artist_dir)?;
    if midi_files.is_empty() {
        debug!("No MIDI files found in {}", artist);
        return Ok(());
    }

    let delay = config.lyrics.request_delay();
    for midi in &midi_files {
        let Some(job) = LyricsJob::from_midi(&artist, midi) else {
            continue;
        };

        if already_present(&job.target) {
            debug!("Lyrics already exist for {}", job.song);
            report.already_present += 1;
            continue;
        }

        debug!("Processing: {}", job.song);
        match resolve_lyrics(sources, pacer, delay, &job.artist, &job.song) {
            Some(found) => match persist_lyrics(&found.text, &job.target) {
                Ok(()) => {
                    println!("✅ Saved lyrics for {} ({})", job.song, found.provider);
                    report.saved += 1;
                }
                Err(e) => {
                    let reason = format!("{:#}", e);
                    warn!(song = %job.song, error = %reason, "failed to write lyrics");
                    report.write_failures += 1;
                }
            },
            None => {
                println!("❌ Could not find lyrics for {}", job.song);
                report.not_found += 1;
            }
        }

        pacer.pause(delay);
    }

    Ok(())
}
