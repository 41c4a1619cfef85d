//! Prismic REST API client

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use url::Url;

use super::document::{ApiInfo, RawPost, RawPostDetail, SearchResponse};
use super::{ContentSource, PageFetcher};
use crate::config::CmsConfig;
use crate::content::{PostDetail, PostsPage};
use crate::error::{FetchError, FetchResult};

/// Summary fields requested for listings
const SUMMARY_FIELDS: [&str; 3] = ["title", "subtitle", "author"];

/// Client for a Prismic repository, bound to one content ref
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: Client,
    endpoint: String,
    document_type: String,
    access_token: Option<String>,
    content_ref: String,
}

impl PrismicClient {
    /// Build a client, resolving the master ref unless one is pinned
    pub async fn connect(config: &CmsConfig) -> FetchResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        let endpoint = config.endpoint.trim_end_matches('/').to_string();

        let content_ref = match &config.content_ref {
            Some(pinned) => pinned.clone(),
            None => {
                let mut url = Url::parse(&endpoint)?;
                if let Some(token) = &config.access_token {
                    url.query_pairs_mut().append_pair("access_token", token);
                }
                let info: ApiInfo = get_json(&http, url).await?;
                info.master_ref()
                    .ok_or(FetchError::MissingMasterRef)?
                    .to_string()
            }
        };

        tracing::debug!("Using content ref {} at {}", content_ref, endpoint);

        Ok(Self {
            http,
            endpoint,
            document_type: config.document_type.clone(),
            access_token: config.access_token.clone(),
            content_ref,
        })
    }

    /// Search URL for a single predicate such as `[at(document.type,"posts")]`
    fn search_url(&self, predicate: &str) -> FetchResult<Url> {
        let mut url = Url::parse(&format!("{}/documents/search", self.endpoint))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ref", &self.content_ref);
            query.append_pair("q", &format!("[{}]", predicate));
            if let Some(token) = &self.access_token {
                query.append_pair("access_token", token);
            }
        }
        Ok(url)
    }
}

impl PageFetcher for PrismicClient {
    fn fetch_page(&self, url: &str) -> impl Future<Output = FetchResult<PostsPage>> + Send {
        async move {
            let url = Url::parse(url)?;
            let response: SearchResponse<RawPost> = get_json(&self.http, url).await?;
            Ok(PostsPage::from(response))
        }
    }
}

impl ContentSource for PrismicClient {
    fn query_posts(
        &self,
        page_size: usize,
        page: Option<u32>,
    ) -> impl Future<Output = FetchResult<PostsPage>> + Send {
        async move {
            let predicate = format!("[at(document.type,\"{}\")]", self.document_type);
            let mut url = self.search_url(&predicate)?;
            {
                let fetch = SUMMARY_FIELDS
                    .iter()
                    .map(|field| format!("{}.{}", self.document_type, field))
                    .collect::<Vec<_>>()
                    .join(",");
                let mut query = url.query_pairs_mut();
                query.append_pair("fetch", &fetch);
                query.append_pair("pageSize", &page_size.max(1).to_string());
                if let Some(page) = page {
                    query.append_pair("page", &page.to_string());
                }
            }

            let response: SearchResponse<RawPost> = get_json(&self.http, url).await?;
            tracing::debug!(
                "Fetched page {:?} of {:?} ({} posts)",
                response.page,
                response.total_pages,
                response.results.len()
            );
            Ok(PostsPage::from(response))
        }
    }

    fn get_post_by_uid(&self, uid: &str) -> impl Future<Output = FetchResult<PostDetail>> + Send {
        let uid = uid.to_string();
        async move {
            let predicate = format!(
                "[at(my.{}.uid,\"{}\")]",
                self.document_type,
                uid.replace('"', "\\\"")
            );
            let mut url = self.search_url(&predicate)?;
            url.query_pairs_mut().append_pair("pageSize", "1");

            let response: SearchResponse<RawPostDetail> = get_json(&self.http, url).await?;
            response
                .results
                .into_iter()
                .next()
                .map(PostDetail::from)
                .ok_or(FetchError::NotFound(uid))
        }
    }
}

/// GET a URL and decode its JSON body
async fn get_json<T: DeserializeOwned>(http: &Client, url: Url) -> FetchResult<T> {
    tracing::debug!("GET {}{}", url.host_str().unwrap_or_default(), url.path());

    let response = http.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Paginator;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    /// Serve a fake repository on a random local port, returning its API root
    async fn fake_repository() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let app = Router::new()
            .route("/api/v2", get(api_root))
            .route("/api/v2/documents/search", get(search))
            .route("/broken", get(|| async { "{not json" }))
            .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .with_state(base.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("{}/api/v2", base)
    }

    async fn api_root() -> Json<serde_json::Value> {
        Json(json!({
            "refs": [
                {"id": "master", "ref": "MASTER", "label": "Master", "isMasterRef": true}
            ]
        }))
    }

    fn post(uid: &str) -> serde_json::Value {
        json!({
            "uid": uid,
            "first_publication_date": "2021-03-25T19:25:28+0000",
            "data": {"title": format!("Post {}", uid), "subtitle": "sub", "author": "Ana"}
        })
    }

    async fn search(
        State(base): State<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        if params.get("ref").map(String::as_str) != Some("MASTER") {
            return StatusCode::BAD_REQUEST.into_response();
        }

        let q = params.get("q").cloned().unwrap_or_default();
        if q == r#"[[at(my.posts.uid,"p1")]]"# {
            return Json(json!({
                "page": 1,
                "results": [{
                    "uid": "p1",
                    "first_publication_date": null,
                    "data": {
                        "title": "Post p1",
                        "banner": {"url": "https://images.example/p1.png"},
                        "author": "Ana",
                        "content": [{"heading": "Intro", "body": [{"text": "one two three"}]}]
                    }
                }],
                "next_page": null
            }))
            .into_response();
        }
        if q.starts_with("[[at(my.posts.uid,") {
            return Json(json!({"page": 1, "results": [], "next_page": null})).into_response();
        }

        assert_eq!(q, r#"[[at(document.type,"posts")]]"#);
        assert_eq!(
            params.get("fetch").map(String::as_str),
            Some("posts.title,posts.subtitle,posts.author")
        );

        let next_page = format!(
            "{}/api/v2/documents/search?ref=MASTER&q={}&fetch={}&page=2",
            base,
            "%5B%5Bat(document.type,%22posts%22)%5D%5D",
            "posts.title,posts.subtitle,posts.author"
        );
        let page = params.get("page").map(String::as_str).unwrap_or("1");
        let body = match page {
            "1" => json!({
                "page": 1,
                "total_pages": 2,
                "results": [post("p1")],
                "next_page": next_page,
            }),
            _ => json!({
                "page": 2,
                "total_pages": 2,
                "results": [post("p2")],
                "next_page": null,
            }),
        };
        Json(body).into_response()
    }

    fn config(endpoint: &str) -> CmsConfig {
        CmsConfig {
            endpoint: endpoint.to_string(),
            ..CmsConfig::default()
        }
    }

    #[tokio::test]
    async fn test_query_and_follow_next_page() {
        let endpoint = fake_repository().await;
        let client = PrismicClient::connect(&config(&endpoint)).await.unwrap();

        let first = client.query_posts(1, None).await.unwrap();
        assert_eq!(first.results.len(), 1);
        assert_eq!(first.results[0].uid, "p1");
        let next = first.next_page.clone().unwrap();

        let second = client.fetch_page(&next).await.unwrap();
        assert_eq!(second.results[0].uid, "p2");
        assert!(second.next_page.is_none());
    }

    #[tokio::test]
    async fn test_paginator_over_http() {
        let endpoint = fake_repository().await;
        let client = PrismicClient::connect(&config(&endpoint)).await.unwrap();

        let paginator = Paginator::new(&client, client.query_posts(1, None).await.unwrap());
        paginator.load_more().await.unwrap();

        let uids: Vec<_> = paginator.posts().iter().map(|p| p.uid.clone()).collect();
        assert_eq!(uids, ["p1", "p2"]);
        assert!(!paginator.has_more());
    }

    #[tokio::test]
    async fn test_list_uids_walks_pages() {
        let endpoint = fake_repository().await;
        let client = PrismicClient::connect(&config(&endpoint)).await.unwrap();

        assert_eq!(client.list_uids(1).await.unwrap(), ["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_get_post_by_uid() {
        let endpoint = fake_repository().await;
        let client = PrismicClient::connect(&config(&endpoint)).await.unwrap();

        let post = client.get_post_by_uid("p1").await.unwrap();
        assert_eq!(post.title, "Post p1");
        assert_eq!(post.banner.url, "https://images.example/p1.png");
        assert_eq!(post.content[0].body[0].text, "one two three");

        let missing = client.get_post_by_uid("nope").await;
        assert!(matches!(missing, Err(FetchError::NotFound(uid)) if uid == "nope"));
    }

    #[tokio::test]
    async fn test_http_failures() {
        let endpoint = fake_repository().await;
        let client = PrismicClient::connect(&config(&endpoint)).await.unwrap();
        let base = endpoint.trim_end_matches("/api/v2");

        let down = client.fetch_page(&format!("{}/down", base)).await;
        assert!(matches!(down, Err(FetchError::Status { status: 503, .. })));

        let broken = client.fetch_page(&format!("{}/broken", base)).await;
        assert!(matches!(broken, Err(FetchError::Decode(_))));

        let relative = client.fetch_page("/page2").await;
        assert!(matches!(relative, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_pinned_ref_skips_lookup() {
        let mut cms = config("http://127.0.0.1:9/api/v2");
        cms.content_ref = Some("PREVIEW".to_string());

        // Nothing listens on the discard port; connect must not touch the network
        let client = PrismicClient::connect(&cms).await.unwrap();
        let url = client.search_url(r#"[at(document.type,"posts")]"#).unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["ref"], "PREVIEW");
        assert_eq!(pairs["q"], r#"[[at(document.type,"posts")]]"#);
    }
}
