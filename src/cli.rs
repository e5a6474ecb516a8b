use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use tracing_subscriber::EnvFilter;

use crate::config::{self, Config};
use crate::core::pacer::ThreadSleep;
use crate::core::renamer;
use crate::pipeline::{lyrics, midi};
use crate::sources::bitmidi::BitMidiClient;
use crate::sources::build_lyrics_sources;
use crate::sources::http::HttpTransport;

#[derive(Parser)]
#[command(name = "midi-harvest", about = "아티스트별 MIDI 다운로드와 가사 수집 도구")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 아티스트 폴더들이 있는 루트 디렉토리
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// 설정 파일 경로 (기본: ~/.config/midi-harvest/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 시도별 진단 로그 출력
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 아티스트 목록의 MIDI 파일을 내려받는다
    Midi {
        /// 아티스트 목록 JSON 파일
        #[arg(long)]
        artists: Option<PathBuf>,
    },
    /// 내려받은 MIDI 파일마다 가사를 찾아 저장한다
    Lyrics,
    /// 파일명 끝의 중복된 `mid`를 제거한다
    FixNames,
    /// 현재 설정을 출력한다
    Config {
        /// 설정 파일로 저장
        #[arg(long)]
        write: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_config(&config_path);
    if let Some(root) = cli.root {
        cfg.root = root;
    }
    if cli.debug {
        cfg.debug = true;
    }
    init_tracing(cfg.debug);

    match cli.command {
        Some(Commands::Midi { artists }) => {
            if let Some(path) = artists {
                cfg.artists_file = path;
            }
            cmd_midi(&cfg)
        }
        Some(Commands::Lyrics) => cmd_lyrics(&cfg),
        Some(Commands::FixNames) => cmd_fix_names(&cfg),
        Some(Commands::Config { write }) => cmd_config(&cfg, &config_path, write),
        None => {
            println!("Usage: midi-harvest <midi|lyrics|fix-names|config>");
            println!("Run 'midi-harvest --help' for more information.");
            Ok(())
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug {
        "info,midi_harvest=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn cmd_midi(cfg: &Config) -> Result<()> {
    let artists = midi::load_artists(&cfg.artists_file)?;

    let transport = HttpTransport::new(
        &cfg.http,
        &[
            ("Accept", "application/json, text/plain, */*"),
            ("Referer", cfg.midi.base_url.as_str()),
        ],
    )?;
    let source = BitMidiClient::new(&cfg.midi.base_url, Rc::new(transport));

    let report = midi::run(cfg, &artists, &source, &ThreadSleep);

    let mut table = Table::new();
    table.set_header(vec!["Artists", "Discovered", "Downloaded", "Existing", "No URL", "Failed", "Aborted"]);
    table.add_row(vec![
        Cell::new(report.artists),
        Cell::new(report.discovered),
        Cell::new(report.downloaded),
        Cell::new(report.already_present),
        Cell::new(report.no_download_path),
        Cell::new(report.failed),
        Cell::new(report.aborted_artists),
    ]);
    println!("\n{table}");
    Ok(())
}

fn cmd_lyrics(cfg: &Config) -> Result<()> {
    println!("=== MIDI Lyrics Downloader ===");

    let transport = HttpTransport::new(&cfg.http, &[("Accept-Language", "en-US,en;q=0.9")])?;
    let sources = build_lyrics_sources(&cfg.lyrics, Rc::new(transport));

    let Some(report) = lyrics::run(cfg, &sources, &ThreadSleep)? else {
        return Ok(());
    };

    println!("\n=== Summary ===");
    let mut table = Table::new();
    table.set_header(vec!["Artists processed", "Lyrics saved", "Already present", "Not found", "Write failures", "Time taken"]);
    table.add_row(vec![
        Cell::new(report.artists),
        Cell::new(report.saved),
        Cell::new(report.already_present),
        Cell::new(report.not_found),
        Cell::new(report.write_failures),
        Cell::new(format!("{:.1} seconds", report.elapsed.as_secs_f64())),
    ]);
    println!("{table}");
    Ok(())
}

fn cmd_fix_names(cfg: &Config) -> Result<()> {
    println!("Cleaning .mid filenames in {} folder...", cfg.root.display());

    if !cfg.root.is_dir() {
        println!("No MIDI files found in {}", cfg.root.display());
        return Ok(());
    }

    let report = renamer::repair_tree(&cfg.root)?;
    println!(
        "Done! (scanned: {}, renamed: {}, conflicts: {})",
        report.scanned, report.renamed, report.conflicts
    );
    Ok(())
}

fn cmd_config(cfg: &Config, path: &std::path::Path, write: bool) -> Result<()> {
    println!("{}", toml::to_string_pretty(cfg)?);

    if write {
        config::save_config(cfg, path)?;
        println!("Config saved to {}", path.display());
    }
    Ok(())
}
