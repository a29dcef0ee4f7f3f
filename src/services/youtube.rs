use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::models::{Course, Language};
use crate::services::provider::{CourseProvider, ProviderError};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
const MAX_RESULTS: u32 = 50;

/// Searches the YouTube Data API v3 for long-form course videos.
///
/// Requires an API key. A missing key is a configuration problem reported at
/// construction; requests then degrade to the redirect-only outcome instead
/// of failing the whole search.
#[derive(Clone)]
pub struct YouTubeService {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl YouTubeService {
    pub fn new(api_key: Option<String>, client: reqwest::Client) -> Self {
        if api_key.is_none() {
            warn!("YOUTUBE_API_KEY is not set; YouTube searches will only return a redirect link");
        }
        Self { client, api_key }
    }

    async fn search_video_ids(
        &self,
        api_key: &str,
        query: &str,
        lang: Language,
        num_items: u32,
    ) -> Result<Vec<String>, ProviderError> {
        let params = [
            ("part", "snippet".to_string()),
            ("maxResults", num_items.min(MAX_RESULTS).to_string()),
            ("q", format!("{} {}", query, lang.youtube_terms())),
            ("type", "video".to_string()),
            ("videoDuration", "long".to_string()),
            ("order", "relevance".to_string()),
            ("key", api_key.to_string()),
        ];

        let response = self.client.get(SEARCH_URL).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let body: VideoSearchResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .filter_map(|item| item.id.and_then(|id| id.video_id))
            .collect())
    }

    async fn video_details(
        &self,
        api_key: &str,
        video_ids: &[String],
    ) -> Result<Vec<VideoItem>, ProviderError> {
        let params = [
            ("part", "snippet,contentDetails".to_string()),
            ("id", video_ids.join(",")),
            ("key", api_key.to_string()),
        ];

        let response = self.client.get(VIDEOS_URL).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let body: VideoListResponse = response.json().await?;
        Ok(body.items)
    }
}

#[derive(Debug, Deserialize)]
struct VideoSearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: Option<SearchItemId>,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: Option<String>,
    snippet: Option<Snippet>,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    channel_title: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

/// Renders an ISO-8601 `PT#H#M#S` duration the way listings display it.
fn convert_duration(iso: &str) -> Option<String> {
    let rest = iso.strip_prefix("PT")?;

    let (mut hours, mut minutes, mut seconds) = (0u64, 0u64, 0u64);
    let mut digits = String::new();
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else {
            let value: u64 = digits.parse().ok()?;
            match ch {
                'H' => hours = value,
                'M' => minutes = value,
                'S' => seconds = value,
                _ => return None,
            }
            digits.clear();
        }
    }

    if hours > 0 {
        Some(format!("{}h {}m", hours, minutes))
    } else if minutes > 0 {
        Some(format!("{}m", minutes))
    } else {
        Some(format!("{}s", seconds))
    }
}

fn course_from_item(item: VideoItem) -> Option<Course> {
    let id = item.id?;
    let snippet = item.snippet?;
    let title = snippet.title?.trim().to_string();

    let image_url = snippet.thumbnails.and_then(|thumbnails| {
        let Thumbnails { high, medium, default } = thumbnails;
        high.and_then(|t| t.url)
            .or_else(|| medium.and_then(|t| t.url))
            .or_else(|| default.and_then(|t| t.url))
    });

    Some(Course {
        title,
        url: format!("https://youtube.com/watch?v={}", id),
        image_url,
        duration: item
            .content_details
            .and_then(|details| details.duration)
            .and_then(|duration| convert_duration(&duration)),
        provider: snippet.channel_title,
        provider_img: None,
        difficulty: None,
        avg_rating: None,
        count_rating: None,
        skills: None,
    })
}

#[async_trait]
impl CourseProvider for YouTubeService {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn redirect_url(&self, query: &str, lang: Language) -> String {
        Url::parse_with_params(
            "https://www.youtube.com/results",
            &[("search_query", format!("{} {}", query, lang.youtube_terms()))],
        )
        .expect("valid base url")
        .into()
    }

    async fn fetch(
        &self,
        query: &str,
        lang: Language,
        num_items: u32,
    ) -> Result<Vec<Course>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("YOUTUBE_API_KEY"))?;

        let video_ids = self
            .search_video_ids(api_key, query, lang, num_items)
            .await?;
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let items = self.video_details(api_key, &video_ids).await?;
        Ok(items.into_iter().filter_map(course_from_item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("PT4H13M21S", Some("4h 13m"))]
    #[case("PT1H2S", Some("1h 0m"))]
    #[case("PT45M", Some("45m"))]
    #[case("PT32S", Some("32s"))]
    #[case("PT", Some("0s"))]
    #[case("4H13M", None)]
    fn converts_iso_durations(#[case] iso: &str, #[case] expected: Option<&str>) {
        assert_eq!(convert_duration(iso).as_deref(), expected);
    }

    #[test]
    fn parses_video_item_with_thumbnail_fallback() {
        let item: VideoItem = serde_json::from_value(json!({
            "id": "dQw4w9WgXcQ",
            "snippet": {
                "title": "Rust Full Course ",
                "channelTitle": "Rust Channel",
                "thumbnails": {
                    "medium": { "url": "https://i.ytimg.com/medium.jpg" },
                    "default": { "url": "https://i.ytimg.com/default.jpg" }
                }
            },
            "contentDetails": { "duration": "PT6H30M12S" }
        }))
        .unwrap();

        let course = course_from_item(item).unwrap();
        assert_eq!(course.title, "Rust Full Course");
        assert_eq!(course.url, "https://youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(course.image_url.as_deref(), Some("https://i.ytimg.com/medium.jpg"));
        assert_eq!(course.duration.as_deref(), Some("6h 30m"));
        assert_eq!(course.provider.as_deref(), Some("Rust Channel"));
        assert_eq!(course.skills, None);
    }

    #[test]
    fn skips_items_without_title() {
        let item: VideoItem = serde_json::from_value(json!({
            "id": "abc123",
            "snippet": { "channelTitle": "No Title Channel" }
        }))
        .unwrap();
        assert!(course_from_item(item).is_none());
    }

    #[test]
    fn builds_redirect_url_with_language_terms() {
        let service = YouTubeService::new(None, reqwest::Client::new());
        assert_eq!(
            service.redirect_url("rust", Language::En),
            "https://www.youtube.com/results?search_query=rust+full+course"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let service = YouTubeService::new(None, reqwest::Client::new());
        let err = service.fetch("rust", Language::En, 6).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential(_)));
    }
}
