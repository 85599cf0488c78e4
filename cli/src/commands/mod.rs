//! CLI Commands

pub mod config;
pub mod email;
pub mod form;
pub mod registrations;
pub mod sent;

use anyhow::{anyhow, bail};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// API client
pub struct ApiClient {
    pub base_url: String,
    pub admin_token: Option<String>,
    client: reqwest::Client,
}

/// Raw body of a download plus the server's suggested file name
pub struct Download {
    pub body: String,
    pub filename: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, admin_token: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_token: admin_token.map(String::from),
            client: reqwest::Client::new(),
        }
    }

    /// GET and unwrap the `{data}` envelope
    pub async fn get_data<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let json = self.get(path).await?;
        unwrap_data(json)
    }

    /// GET with query parameters and unwrap the `{data}` envelope
    pub async fn get_data_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> anyhow::Result<T> {
        let req = self.get_request(path).query(query);
        unwrap_data(decode(req.send().await?).await?)
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        decode(self.get_request(path).send().await?).await
    }

    fn get_request(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.url(path)))
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> anyhow::Result<Value> {
        let req = self.client.post(self.url(path)).json(body);
        decode(self.authorize(req).send().await?).await
    }

    pub async fn patch_data<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> anyhow::Result<T> {
        let req = self.client.patch(self.url(path)).json(body);
        unwrap_data(decode(self.authorize(req).send().await?).await?)
    }

    pub async fn download(&self, path: &str) -> anyhow::Result<Download> {
        let req = self.client.get(self.url(path));
        let resp = self.authorize(req).send().await?;
        let status = resp.status();
        let filename = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename);
        let body = resp.text().await?;
        if !status.is_success() {
            let json = serde_json::from_str(&body).unwrap_or(Value::Null);
            bail!(error_message(status.as_u16(), &json));
        }
        Ok(Download { body, filename })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.admin_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

async fn decode(resp: Response) -> anyhow::Result<Value> {
    let status = resp.status();
    let text = resp.text().await?;
    let json = serde_json::from_str(&text).unwrap_or(Value::Null);
    if !status.is_success() {
        bail!(error_message(status.as_u16(), &json));
    }
    Ok(json)
}

fn unwrap_data<T: DeserializeOwned>(json: Value) -> anyhow::Result<T> {
    match json {
        Value::Object(mut map) => {
            let data = map.remove("data").ok_or_else(|| anyhow!("No data in response"))?;
            Ok(serde_json::from_value(data)?)
        }
        _ => bail!("No data in response"),
    }
}

/// `{error}` from the body, or a generic status line
fn error_message(status: u16, body: &Value) -> String {
    match body.get("error").and_then(Value::as_str) {
        Some(msg) if !msg.is_empty() => msg.to_string(),
        _ => format!("Request failed with status {status}"),
    }
}

fn attachment_filename(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data() {
        let names: Vec<String> = unwrap_data(json!({ "data": ["a", "b"] })).unwrap();
        assert_eq!(names, vec!["a", "b"]);
        assert!(unwrap_data::<Vec<String>>(json!({ "items": [] })).is_err());
        assert!(unwrap_data::<Vec<String>>(Value::Null).is_err());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(400, &json!({ "error": "Registration not found" })), "Registration not found");
        assert_eq!(error_message(502, &Value::Null), "Request failed with status 502");
        assert_eq!(error_message(400, &json!({ "error": "" })), "Request failed with status 400");
    }

    #[test]
    fn test_attachment_filename() {
        assert_eq!(
            attachment_filename("attachment; filename=\"registrations_2026-10-17.csv\"").as_deref(),
            Some("registrations_2026-10-17.csv")
        );
        assert_eq!(attachment_filename("inline"), None);
    }

    #[test]
    fn test_search_query_is_encoded() {
        let client = ApiClient::new("http://localhost:8080", Some("secret"));
        let req = client.get_request("/api/registrations").query(&[("search", "acme & sons")]).build().unwrap();
        assert_eq!(req.url().as_str(), "http://localhost:8080/api/registrations?search=acme+%26+sons");
        assert_eq!(req.headers()["authorization"], "Bearer secret");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/", None);
        assert_eq!(client.url("/api/registrations"), "http://localhost:8080/api/registrations");
    }
}
