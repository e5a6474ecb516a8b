use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::config::Config;
use crate::core::pacer::Pacer;
use crate::core::paginate::CatalogPages;
use crate::core::persist::{persist_midi, Manifest, WriteResult};
use crate::models::{ArtistJob, ArtistList};
use crate::sources::CatalogSource;

/// MIDI 실행 결과 집계.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MidiReport {
    pub artists: usize,
    pub discovered: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub no_download_path: usize,
    pub failed: usize,
    pub aborted_artists: usize,
}

impl MidiReport {
    fn record(&mut self, result: &WriteResult) {
        self.discovered += 1;
        match result {
            WriteResult::Saved { .. } => self.downloaded += 1,
            WriteResult::AlreadyPresent(_) => self.already_present += 1,
            WriteResult::NoDownloadPath => self.no_download_path += 1,
            WriteResult::Failed(_) => self.failed += 1,
        }
    }
}

/// 아티스트 목록 파일을 읽는다. 읽을 수 없거나 형식이 틀리거나 비어 있으면 오류다.
pub fn load_artists(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("아티스트 목록을 읽을 수 없습니다: {}", path.display()))?;
    let list: ArtistList = serde_json::from_str(&content)
        .with_context(|| format!("아티스트 목록 형식이 올바르지 않습니다: {}", path.display()))?;

    if list.artists.is_empty() {
        bail!("아티스트 목록이 비어 있습니다: {}", path.display());
    }
    Ok(list.artists)
}

/// 모든 아티스트에 대해 MIDI 파이프라인을 실행한다.
/// 한 아티스트의 작업이 중단되어도 다음 아티스트로 넘어간다.
pub fn run(
    config: &Config,
    artists: &[String],
    source: &dyn CatalogSource,
    pacer: &dyn Pacer,
) -> MidiReport {
    let mut report = MidiReport::default();

    for artist in artists {
        println!("\nProcessing artist: {}", artist);
        report.artists += 1;

        if let Err(e) = run_artist(config, artist, source, pacer, &mut report) {
            let reason = format!("{:#}", e);
            warn!(artist = %artist, error = %reason, "artist job aborted");
            println!("[ERROR] Stopped processing '{}': {}", artist, reason);
            report.aborted_artists += 1;
        }
    }

    report
}

fn run_artist(
    config: &Config,
    artist: &str,
    source: &dyn CatalogSource,
    pacer: &dyn Pacer,
    report: &mut MidiReport,
) -> Result<()> {
    let job = ArtistJob::new(&config.root, artist);
    std::fs::create_dir_all(&job.folder)
        .with_context(|| format!("폴더를 만들 수 없습니다: {}", job.folder.display()))?;
    let manifest = Manifest::reset(&job.manifest)?;
    debug!(manifest = %manifest.path().display(), "manifest reset");

    let mut pages = CatalogPages::new(
        source,
        pacer,
        &job.name,
        config.midi.page_settle(),
        config.midi.page_gap(),
    );

    for item in pages.by_ref() {
        let result = persist_midi(
            &item,
            &job.name,
            &job.folder,
            &manifest,
            source,
            config.midi.chunk_size,
        )?;
        report.record(&result);
    }

    debug!(artist, pages = pages.pages_fetched(), "catalog exhausted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::core::pacer::testing::RecordingPacer;
    use crate::sources::bitmidi::BitMidiClient;
    use crate::sources::http::testing::FakeTransport;
    use crate::sources::http::Transport;

    const SEARCH: &str = "https://midi.test/api/midi/search?q=Test Artist&page=0";
    const BODY: &[u8] = b"MThd\x00\x00\x00\x06\x00\x01";

    fn test_config(root: &Path) -> Config {
        let mut config = Config::default();
        config.root = root.to_path_buf();
        config.midi.base_url = "https://midi.test".to_string();
        config
    }

    fn fake_catalog() -> Rc<FakeTransport> {
        Rc::new(
            FakeTransport::new()
                .with_text(
                    SEARCH,
                    r#"{"result": {"results": [{"name": "Test Artist - Song One", "downloadUrl": "/mid/1"}], "pageTotal": 1}}"#,
                )
                .with_bytes("https://midi.test/mid/1", BODY),
        )
    }

    fn run_once(config: &Config, fake: &Rc<FakeTransport>) -> MidiReport {
        let transport: Rc<dyn Transport> = fake.clone();
        let source = BitMidiClient::new(&config.midi.base_url, transport);
        let pacer = RecordingPacer::default();
        run(config, &["Test Artist".to_string()], &source, &pacer)
    }

    #[test]
    fn test_end_to_end_single_item() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("Artists"));
        let fake = fake_catalog();

        let report = run_once(&config, &fake);

        let folder = dir.path().join("Artists").join("Test_Artist");
        assert!(folder.is_dir());
        assert_eq!(
            std::fs::read_to_string(folder.join("Test_Artist_songs.txt")).unwrap(),
            "Test Artist - Song One\n"
        );
        assert_eq!(std::fs::read(folder.join("Song_One.mid")).unwrap(), BODY);
        assert_eq!(report.downloaded, 1);
        assert_eq!(report.discovered, 1);
        assert_eq!(fake.count_prefix("https://midi.test/mid/"), 1);
    }

    #[test]
    fn test_rerun_skips_download_and_rebuilds_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("Artists"));

        run_once(&config, &fake_catalog());

        let fake = fake_catalog();
        let report = run_once(&config, &fake);

        let folder = dir.path().join("Artists").join("Test_Artist");
        assert_eq!(fake.count_prefix("https://midi.test/mid/"), 0);
        assert_eq!(report.already_present, 1);
        assert_eq!(report.downloaded, 0);
        assert_eq!(
            std::fs::read_to_string(folder.join("Test_Artist_songs.txt")).unwrap(),
            "Test Artist - Song One\n"
        );
    }

    #[test]
    fn test_unwritable_folder_aborts_only_that_artist() {
        let dir = tempfile::tempdir().unwrap();
        // 루트 자리에 파일이 있으면 아티스트 폴더를 만들 수 없다.
        let root = dir.path().join("Artists");
        std::fs::write(&root, b"not a dir").unwrap();
        let config = test_config(&root);

        let report = run_once(&config, &fake_catalog());
        assert_eq!(report.artists, 1);
        assert_eq!(report.aborted_artists, 1);
        assert_eq!(report.discovered, 0);
    }

    #[test]
    fn test_load_artists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artist.json");
        std::fs::write(&path, r#"{"artists": ["Queen", "ABBA"]}"#).unwrap();
        assert_eq!(load_artists(&path).unwrap(), vec!["Queen", "ABBA"]);
    }

    #[test]
    fn test_load_artists_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();

        assert!(load_artists(&dir.path().join("missing.json")).is_err());

        let malformed = dir.path().join("bad.json");
        std::fs::write(&malformed, "{artists:").unwrap();
        assert!(load_artists(&malformed).is_err());

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, r#"{"artists": []}"#).unwrap();
        let err = load_artists(&empty).unwrap_err();
        assert!(err.to_string().contains("비어 있습니다"));
    }
}
