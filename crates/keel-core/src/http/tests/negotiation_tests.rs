use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, CONTENT_TYPE};

use crate::http::negotiation::{ResponseFormat, ResponseFormats};

fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(name.clone(), value.parse().unwrap());
    }
    map
}

#[test]
fn test_builtin_media_types() {
    let formats = ResponseFormats::new();
    assert_eq!(formats.len(), 3);
    assert_eq!(formats.get("application/json"), Some(ResponseFormat::Json));
    assert_eq!(
        formats.get("application/vnd.api+json"),
        Some(ResponseFormat::JsonApi)
    );
    assert_eq!(formats.get("text/html; charset=utf-8"), Some(ResponseFormat::Html));
}

#[test]
fn test_negotiate_uses_first_registered_accept_entry() {
    let formats = ResponseFormats::new();
    let h = headers(&[(ACCEPT, "image/png, application/vnd.api+json, application/json")]);
    assert_eq!(formats.negotiate(&h), ResponseFormat::JsonApi);
}

#[test]
fn test_negotiate_prefers_higher_quality() {
    let formats = ResponseFormats::new();
    let h = headers(&[(ACCEPT, "application/json;q=0.1, text/html")]);
    assert_eq!(formats.negotiate(&h), ResponseFormat::Html);

    let h = headers(&[(ACCEPT, "application/vnd.api+json;q=0.9, application/json")]);
    assert_eq!(formats.negotiate(&h), ResponseFormat::Json);

    let h = headers(&[(ACCEPT, "text/html;q=0.5, application/json; Q=0.5")]);
    assert_eq!(formats.negotiate(&h), ResponseFormat::Html);
}

#[test]
fn test_negotiate_skips_refused_media_types() {
    let formats = ResponseFormats::new();
    let h = headers(&[
        (ACCEPT, "application/json;q=0"),
        (CONTENT_TYPE, "application/vnd.api+json"),
    ]);
    assert_eq!(formats.negotiate(&h), ResponseFormat::JsonApi);
}

#[test]
fn test_negotiate_falls_back_to_content_type_then_html() {
    let formats = ResponseFormats::new();
    let h = headers(&[(ACCEPT, "*/*"), (CONTENT_TYPE, "application/json")]);
    assert_eq!(formats.negotiate(&h), ResponseFormat::Json);
    assert_eq!(formats.negotiate(&HeaderMap::new()), ResponseFormat::Html);
}

#[test]
fn test_aliases_can_be_added_and_replaced() {
    let mut formats = ResponseFormats::new();
    formats.add("application/problem+json", ResponseFormat::Json);
    assert_eq!(formats.len(), 4);
    let h = headers(&[(ACCEPT, "application/problem+json")]);
    assert_eq!(formats.negotiate(&h), ResponseFormat::Json);

    formats.add("Application/JSON", ResponseFormat::JsonApi);
    assert_eq!(formats.len(), 4);
    assert_eq!(formats.get("application/json"), Some(ResponseFormat::JsonApi));
}
