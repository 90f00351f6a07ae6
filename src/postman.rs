//! Postman Collection v2.1.0, as much of it as an export needs.
use serde::{Deserialize, Serialize};

pub const SCHEMA_URL: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub info: Info,
    pub item: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub name: String,
    pub description: String,
    pub schema: String,
}

/// One controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub item: Vec<Item>,
}

/// One handler method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub request: Request,
    #[serde(default)]
    pub response: Vec<Response>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub header: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    pub url: Url,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
    #[serde(rename = "type", default = "text")]
    pub kind: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into(), kind: text() }
    }

    pub fn json_content_type() -> Self {
        Self::new("Content-Type", "application/json")
    }
}

fn text() -> String {
    "text".to_string()
}

// ————————————————————————————————————————————————————————————————————————————
// BODY
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,
    pub raw: String,
    pub options: BodyOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyOptions {
    pub raw: RawOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOptions {
    pub language: String,
}

impl Body {
    pub fn raw_json(raw: impl Into<String>) -> Self {
        Self {
            mode: "raw".to_string(),
            raw: raw.into(),
            options: BodyOptions { raw: RawOptions { language: "json".to_string() } },
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// URL
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    pub raw: String,
    pub host: Vec<String>,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<Variable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

impl Url {
    /// `host` is kept verbatim (usually a `{{baseUrl}}` variable); `path` is
    /// split on `/` with empty segments dropped.
    pub fn new(host: &str, path: &str, query: Vec<QueryParam>, variable: Vec<Variable>) -> Self {
        let path: Vec<String> = path.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect();
        let mut raw = format!("{}/{}", host.trim_end_matches('/'), path.join("/"));
        if !query.is_empty() {
            let pairs: Vec<String> = query.iter().map(|q| format!("{}={}", q.key, q.value)).collect();
            raw.push('?');
            raw.push_str(&pairs.join("&"));
        }
        Self { raw, host: vec![host.to_string()], path, query, variable }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RESPONSE
// ————————————————————————————————————————————————————————————————————————————

/// Saved example response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub name: String,
    pub original_request: Request,
    pub status: String,
    pub code: u16,
    #[serde(rename = "_postman_previewlanguage")]
    pub preview_language: String,
    #[serde(default)]
    pub header: Vec<Header>,
    pub body: String,
}

impl Response {
    pub fn ok_json(name: impl Into<String>, original_request: Request, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            original_request,
            status: "OK".to_string(),
            code: 200,
            preview_language: "json".to_string(),
            header: vec![Header::json_content_type()],
            body: body.into(),
        }
    }
}

impl Collection {
    pub fn new(name: impl Into<String>, description: impl Into<String>, item: Vec<Folder>) -> Self {
        Self {
            info: Info { name: name.into(), description: description.into(), schema: SCHEMA_URL.to_string() },
            item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_builds_raw_and_segments() {
        let url = Url::new(
            "{{baseUrl}}",
            "/api//users/:id",
            vec![QueryParam { key: "page".into(), value: "0".into() }],
            vec![Variable { key: "id".into(), value: "0".into() }],
        );
        assert_eq!(url.raw, "{{baseUrl}}/api/users/:id?page=0");
        assert_eq!(url.path, ["api", "users", ":id"]);
        assert_eq!(url.host, ["{{baseUrl}}"]);
    }

    #[test]
    fn serialized_field_names_follow_the_schema() {
        let request = Request {
            method: "POST".into(),
            header: vec![Header::json_content_type()],
            body: Some(Body::raw_json("{}")),
            url: Url::new("{{baseUrl}}", "/x", vec![], vec![]),
            description: None,
        };
        let response = Response::ok_json("example", request.clone(), "{}");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["_postman_previewlanguage"], json!("json"));
        assert_eq!(value["originalRequest"]["body"]["options"]["raw"]["language"], json!("json"));
        assert_eq!(value["originalRequest"]["header"][0]["type"], json!("text"));
        assert!(value["originalRequest"]["url"].get("query").is_none());

        let collection = Collection::new("api", "exported", vec![]);
        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["info"]["schema"], json!(SCHEMA_URL));
        let back: Collection = serde_json::from_value(value).unwrap();
        assert_eq!(back, collection);
    }
}
