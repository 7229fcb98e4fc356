use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, CONTENT_TYPE};

pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";
pub const HTML_MEDIA_TYPE: &str = "text/html";

/// Representation chosen for a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseFormat {
    Json,
    JsonApi,
    #[default]
    Html,
}

impl ResponseFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            ResponseFormat::Json => JSON_MEDIA_TYPE,
            ResponseFormat::JsonApi => JSON_API_MEDIA_TYPE,
            ResponseFormat::Html => HTML_MEDIA_TYPE,
        }
    }
}

/// Media type to [`ResponseFormat`] table consulted during negotiation.
#[derive(Debug, Clone)]
pub struct ResponseFormats {
    entries: Vec<(String, ResponseFormat)>,
}

impl ResponseFormats {
    /// Table holding the three built-in media types
    pub fn new() -> Self {
        let mut formats = Self {
            entries: Vec::new(),
        };
        for format in [
            ResponseFormat::Json,
            ResponseFormat::JsonApi,
            ResponseFormat::Html,
        ] {
            formats.add(format.media_type(), format);
        }
        formats
    }

    /// Map `media_type` to `format`, replacing an existing mapping.
    pub fn add(&mut self, media_type: &str, format: ResponseFormat) {
        let media_type = normalize(media_type);
        match self.entries.iter_mut().find(|(m, _)| *m == media_type) {
            Some(entry) => entry.1 = format,
            None => self.entries.push((media_type, format)),
        }
    }

    pub fn get(&self, media_type: &str) -> Option<ResponseFormat> {
        let media_type = normalize(media_type);
        self.entries
            .iter()
            .find(|(m, _)| *m == media_type)
            .map(|(_, f)| *f)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pick the format for a request.
    ///
    /// `Accept` entries are ranked by their `q` weight (default 1, `q=0`
    /// excluded), ties keeping header order. The best ranked registered
    /// media type wins, then the request `Content-Type`; HTML is the
    /// fallback.
    pub fn negotiate(&self, headers: &HeaderMap) -> ResponseFormat {
        let mut accepted: Vec<(&str, f32)> = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(|media| (media, quality(media)))
            .filter(|(_, q)| *q > 0.0)
            .collect();
        accepted.sort_by(|a, b| b.1.total_cmp(&a.1));
        let from_accept = accepted.into_iter().find_map(|(media, _)| self.get(media));

        from_accept
            .or_else(|| {
                headers
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| self.get(v))
            })
            .unwrap_or_default()
    }
}

impl Default for ResponseFormats {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// `q` parameter of an `Accept` entry; malformed weights count as 1.
fn quality(media_range: &str) -> f32 {
    media_range
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
        .and_then(|(_, value)| value.trim().parse::<f32>().ok())
        .map(|q| q.clamp(0.0, 1.0))
        .unwrap_or(1.0)
}
