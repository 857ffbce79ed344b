//! Unsplash adapter: one image per search phrase.

use serde::Deserialize;

use crate::adapters::http::{require_key, HttpClient};
use crate::domain::ImageRef;
use crate::ports::{ImageSearch, ProviderError};

pub const SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
pub struct Photo {
    pub urls: PhotoUrls,
    pub user: Option<Photographer>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoUrls {
    pub small: Option<String>,
    pub regular: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Photographer {
    pub name: String,
}

/// First usable result as an `ImageRef`.
///
/// # Errors
/// Returns `ProviderError::NoResults` when no result has a URL.
pub fn first_image(phrase: &str, response: SearchResponse) -> Result<ImageRef, ProviderError> {
    response
        .results
        .into_iter()
        .find_map(|photo| {
            let url = photo.urls.small.or(photo.urls.regular)?;
            let attribution = match photo.user {
                Some(user) => format!("Photo by {} on Unsplash", user.name),
                None => "Unsplash".to_string(),
            };
            Some(ImageRef { url, attribution })
        })
        .ok_or_else(|| ProviderError::NoResults(phrase.to_string()))
}

/// Unsplash search client.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    http: HttpClient,
    access_key: Option<String>,
}

impl UnsplashClient {
    #[must_use]
    pub fn new(http: HttpClient, access_key: Option<String>) -> Self {
        Self { http, access_key }
    }
}

impl ImageSearch for UnsplashClient {
    fn search(&self, phrase: &str) -> Result<ImageRef, ProviderError> {
        let key = require_key(self.access_key.as_deref(), "Unsplash")?;
        let query = [
            ("query", phrase.to_string()),
            ("per_page", "1".to_string()),
            ("orientation", "squarish".to_string()),
            ("content_filter", "high".to_string()),
        ];
        let headers = [
            ("Authorization", format!("Client-ID {key}")),
            ("Accept-Version", "v1".to_string()),
        ];
        let response: SearchResponse = self.http.get_json(SEARCH_URL, &query, &headers)?;
        first_image(phrase, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_image() {
        let response: SearchResponse = serde_json::from_value(json!({
            "total": 2,
            "results": [
                { "id": "a", "urls": { "regular": "https://images.example/a" },
                  "user": { "name": "Jo Doe" } },
                { "id": "b", "urls": { "small": "https://images.example/b" } }
            ]
        }))
        .expect("Should decode");
        let image = first_image("sun hat", response).expect("Should pick first");
        assert_eq!(image.url, "https://images.example/a");
        assert_eq!(image.attribution, "Photo by Jo Doe on Unsplash");
    }

    #[test]
    fn test_no_results() {
        let response: SearchResponse =
            serde_json::from_value(json!({ "total": 0, "results": [] })).expect("Should decode");
        assert!(matches!(
            first_image("sun hat", response),
            Err(ProviderError::NoResults(_))
        ));
    }
}
