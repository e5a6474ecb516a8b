use std::sync::LazyLock;

use regex::Regex;

pub const MIDI_EXTENSION: &str = ".mid";
pub const UNKNOWN_SONG_STEM: &str = "Unknown_Song";

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)|\[.*?\]|\{.*?\}").expect("static regex"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s-]+").expect("static regex"));
static ARTIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("static regex"));
static ILLEGAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("static regex"));
static MIDI_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.mid$").expect("static regex"));

/// 아티스트나 곡 이름을 조회 URL용 소문자 하이픈 슬러그로 바꾼다.
///
/// 밑줄은 공백으로 바꾸고, 괄호 묶음은 지우고, 단어 문자·공백·하이픈이 아닌 문자는 버린다.
pub fn normalize_for_url(text: &str) -> String {
    let text = text.replace('_', " ");
    let text = BRACKETED.replace_all(&text, "");
    let text = NON_WORD.replace_all(&text, "");
    let text = WHITESPACE_RUN.replace_all(text.trim(), "-");
    text.to_lowercase()
}

/// 카탈로그 제목으로 디스크에 저장할 `.mid` 파일 이름을 만든다.
///
/// 대소문자와 상관없이 아티스트 이름(과 뒤따르는 구분자)을 지우고, 나머지는 밑줄로
/// 이은 단어 문자만 남긴다. 결과를 다시 넣어도 같은 이름이 나온다.
pub fn normalize_for_filename(raw_name: &str, artist: &str) -> String {
    format!("{}{}", normalize_stem(raw_name, artist), MIDI_EXTENSION)
}

/// [`normalize_for_filename`]에서 확장자를 뺀 부분.
pub fn normalize_stem(raw_name: &str, artist: &str) -> String {
    let name = MIDI_SUFFIX.replace(raw_name.trim(), "").into_owned();
    if name == UNKNOWN_SONG_STEM {
        return name;
    }

    let name = clean(&remove_artist(&name, artist));
    // 정리 과정에서 새로 드러난 아티스트 이름("AC/DC" -> "ACDC")도 지운다.
    let name = clean(&remove_cleaned_artist(&name.replace('_', " "), artist));

    if name.is_empty() {
        UNKNOWN_SONG_STEM.to_string()
    } else {
        name
    }
}

fn clean(name: &str) -> String {
    let name = NON_WORD.replace_all(name, "");
    let name = SEPARATOR_RUN.replace_all(name.trim(), "_");
    ILLEGAL.replace_all(&name, "_").into_owned()
}

fn remove_artist(name: &str, artist: &str) -> String {
    let artist = artist.trim();
    if artist.is_empty() {
        return name.to_string();
    }

    // 사용자 입력이므로 이스케이프한 뒤 컴파일한다.
    let pattern = format!(r"(?i)\b{}\s*[-_\s]*", regex::escape(artist));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(name, "").into_owned(),
        Err(e) => {
            tracing::debug!(artist, error = %e, "artist pattern rejected, keeping name");
            name.to_string()
        }
    }
}

/// 이름과 같은 방식으로 정리한 아티스트를 지운다. 아티스트 안의 구분자는 공백·밑줄·하이픈
/// 어느 것과도 맞는다. 지운 뒤 새로 붙은 이름이 다시 걸릴 수 있어 더 바뀌지 않을 때까지 반복한다.
fn remove_cleaned_artist(name: &str, artist: &str) -> String {
    let cleaned = NON_WORD.replace_all(artist, "");
    let parts: Vec<String> = ARTIST_SEPARATOR
        .split(&cleaned)
        .filter(|part| !part.is_empty())
        .map(regex::escape)
        .collect();
    if parts.is_empty() {
        return name.to_string();
    }

    let pattern = format!(r"(?i)\b{}[\s_-]*", parts.join(r"[\s_-]+"));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::debug!(artist, error = %e, "artist pattern rejected, keeping name");
            return name.to_string();
        }
    };

    let mut current = name.to_string();
    loop {
        let next = re.replace_all(&current, "").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}
