use std::io::Read;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::HttpConfig;
use crate::error::FetchError;

/// 소스들이 사용하는 HTTP 계층.
/// 모든 요청은 정해진 시간 안에 끝나거나 오류를 돌려준다.
pub trait Transport {
    /// GET 요청을 보내고 본문을 문자열로 돌려준다.
    fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError>;
    /// GET 요청을 보내고 본문을 스트림으로 돌려준다.
    fn open(&self, url: &str) -> Result<Box<dyn Read>, FetchError>;
}

/// reqwest blocking 클라이언트 기반 구현.
pub struct HttpTransport {
    client: Client,
    search_timeout: Duration,
    download_timeout: Duration,
}

impl HttpTransport {
    /// User-Agent와 추가 헤더를 기본값으로 설정한 클라이언트를 만든다.
    pub fn new(config: &HttpConfig, headers: &[(&str, &str)]) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("잘못된 헤더 이름입니다: {}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("잘못된 헤더 값입니다: {}", value))?;
            default_headers.insert(name, value);
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(default_headers)
            .build()
            .context("HTTP 클라이언트 생성에 실패했습니다")?;

        Ok(Self {
            client,
            search_timeout: config.search_timeout(),
            download_timeout: config.download_timeout(),
        })
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let text = self
            .client
            .get(url)
            .query(query)
            .timeout(self.search_timeout)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(text)
    }

    fn open(&self, url: &str) -> Result<Box<dyn Read>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()?
            .error_for_status()?;
        Ok(Box::new(response))
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::{Cursor, Read};

    use super::Transport;
    use crate::error::FetchError;

    enum Reply {
        Body(Vec<u8>),
        Status(u16),
        Timeout,
    }

    /// 등록된 URL에만 응답하는 메모리 내 전송 계층. 모든 요청을 기록한다.
    /// 등록되지 않은 URL은 404를 돌려준다.
    #[derive(Default)]
    pub struct FakeTransport {
        replies: HashMap<String, Reply>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_text(mut self, key: &str, body: &str) -> Self {
            self.replies
                .insert(key.to_string(), Reply::Body(body.as_bytes().to_vec()));
            self
        }

        pub fn with_bytes(mut self, key: &str, body: &[u8]) -> Self {
            self.replies
                .insert(key.to_string(), Reply::Body(body.to_vec()));
            self
        }

        pub fn with_status(mut self, key: &str, status: u16) -> Self {
            self.replies.insert(key.to_string(), Reply::Status(status));
            self
        }

        pub fn with_timeout(mut self, key: &str) -> Self {
            self.replies.insert(key.to_string(), Reply::Timeout);
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }

        pub fn count_prefix(&self, prefix: &str) -> usize {
            self.requests
                .borrow()
                .iter()
                .filter(|r| r.starts_with(prefix))
                .count()
        }

        fn reply(&self, key: String) -> Result<Vec<u8>, FetchError> {
            self.requests.borrow_mut().push(key.clone());
            match self.replies.get(&key) {
                Some(Reply::Body(body)) => Ok(body.clone()),
                Some(Reply::Status(code)) => Err(FetchError::Status(*code)),
                Some(Reply::Timeout) => Err(FetchError::Timeout),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    /// `url?k=v&k2=v2` 형태의 키. 인코딩하지 않는다.
    pub fn request_key(url: &str, query: &[(&str, &str)]) -> String {
        if query.is_empty() {
            return url.to_string();
        }
        let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{}?{}", url, params.join("&"))
    }

    impl Transport for FakeTransport {
        fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
            let body = self.reply(request_key(url, query))?;
            String::from_utf8(body).map_err(|e| FetchError::Body(e.to_string()))
        }

        fn open(&self, url: &str) -> Result<Box<dyn Read>, FetchError> {
            let body = self.reply(url.to_string())?;
            Ok(Box::new(Cursor::new(body)))
        }
    }
}
