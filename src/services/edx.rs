use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::models::{Course, Language};
use crate::services::provider::{CourseProvider, ProviderError};

// edX exposes its catalog through Algolia; the app id and API key below are
// the public ones embedded in the edx.org frontend.
const SEARCH_URL: &str = "https://igsyv1z1xi-dsn.algolia.net/1/indexes/*/queries";
const APP_ID: &str = "IGSYV1Z1XI";
const API_KEY: &str = "6658746ce52e30dacfdd8ba5f8e8cf18";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const MAX_ITEMS: u32 = 50;

const PRODUCT_FILTERS: &str = "(product:\"Course\" OR product:\"Program\" OR product:\"Executive Education\" OR product:\"2U Degree\") \
AND (blocked_in:null OR NOT blocked_in:\"CO\") \
AND (allowed_in:null OR allowed_in:\"CO\")";

/// Searches the edX catalog through its public Algolia index.
#[derive(Clone)]
pub struct EdxService {
    client: reqwest::Client,
}

impl EdxService {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn request_url() -> String {
        format!(
            "{}?x-algolia-agent=Algolia%20for%20JavaScript%20(5.0.0)%3B%20Search%20(5.0.0)\
&x-algolia-api-key={}&x-algolia-application-id={}",
            SEARCH_URL, API_KEY, APP_ID
        )
    }

    fn request_body(query: &str, lang: Language, num_items: u32) -> serde_json::Value {
        json!({
            "requests": [{
                "indexName": "product",
                "clickAnalytics": false,
                "facetFilters": [
                    ["availability:Available now"],
                    [format!("language:{}", lang.full_name())]
                ],
                "facets": [
                    "availability",
                    "language",
                    "learning_type",
                    "level",
                    "product",
                    "program_type",
                    "skills.skill",
                    "subject",
                ],
                "filters": PRODUCT_FILTERS,
                "hitsPerPage": num_items.min(MAX_ITEMS),
                "maxValuesPerFacet": 100,
                "query": query.trim(),
                "page": 0
            }]
        })
    }
}

#[derive(Debug, Deserialize)]
struct QueriesResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    hits: Vec<EdxHit>,
}

#[derive(Debug, Default, Deserialize)]
struct EdxHit {
    title: Option<String>,
    marketing_url: Option<String>,
    card_image_url: Option<String>,
    weeks_to_complete: Option<u64>,
    #[serde(default)]
    owners: Vec<EdxOwner>,
    #[serde(default)]
    level: Vec<String>,
    skills: Option<Vec<EdxSkill>>,
}

#[derive(Debug, Deserialize)]
struct EdxOwner {
    name: Option<String>,
    #[serde(rename = "logoImageUrl")]
    logo_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EdxSkill {
    skill: Option<String>,
}

fn parse_courses(response: QueriesResponse) -> Vec<Course> {
    response
        .results
        .into_iter()
        .next()
        .map(|result| result.hits)
        .unwrap_or_default()
        .into_iter()
        .filter_map(course_from_hit)
        .collect()
}

fn course_from_hit(hit: EdxHit) -> Option<Course> {
    let title = hit.title?.trim().to_string();
    let url = hit.marketing_url?;

    let (provider, provider_img) = match hit.owners.into_iter().next() {
        Some(owner) => (owner.name, owner.logo_image_url),
        None => (None, None),
    };

    Some(Course {
        title,
        url,
        image_url: hit.card_image_url,
        duration: hit
            .weeks_to_complete
            .filter(|weeks| *weeks > 0)
            .map(|weeks| format!("{} weeks", weeks)),
        provider,
        provider_img,
        difficulty: hit.level.into_iter().next(),
        avg_rating: None,
        count_rating: None,
        skills: hit
            .skills
            .map(|skills| skills.into_iter().filter_map(|s| s.skill).collect()),
    })
}

#[async_trait]
impl CourseProvider for EdxService {
    fn name(&self) -> &'static str {
        "edx"
    }

    fn redirect_url(&self, query: &str, lang: Language) -> String {
        Url::parse_with_params(
            "https://www.edx.org/search",
            &[
                ("q", query),
                ("language", lang.full_name()),
                ("availability", "Available now"),
            ],
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
        let response = self
            .client
            .post(Self::request_url())
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .header("Connection", "keep-alive")
            .header("postman-token", Uuid::new_v4().to_string())
            .header("Referer", "https://www.edx.org/")
            .header("Origin", "https://www.edx.org")
            .json(&Self::request_body(query, lang, num_items))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let body: QueriesResponse = response.json().await?;
        Ok(parse_courses(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> QueriesResponse {
        serde_json::from_value(json!({
            "results": [{
                "hits": [
                    {
                        "title": "  CS50's Introduction to Computer Science ",
                        "marketing_url": "https://www.edx.org/course/cs50",
                        "card_image_url": "https://cards.edx.org/cs50.jpg",
                        "weeks_to_complete": 12,
                        "owners": [{
                            "name": "Harvard University",
                            "logoImageUrl": "https://logos.edx.org/harvard.png"
                        }],
                        "level": ["Introductory"],
                        "skills": [
                            { "skill": "C" },
                            { "skill": "Algorithms" }
                        ]
                    },
                    {
                        "title": "Hit without a marketing url",
                        "weeks_to_complete": 4
                    }
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn parses_and_normalizes_hits() {
        let courses = parse_courses(sample_response());
        assert_eq!(courses.len(), 1);

        let course = &courses[0];
        assert_eq!(course.title, "CS50's Introduction to Computer Science");
        assert_eq!(course.url, "https://www.edx.org/course/cs50");
        assert_eq!(course.duration.as_deref(), Some("12 weeks"));
        assert_eq!(course.provider.as_deref(), Some("Harvard University"));
        assert_eq!(
            course.provider_img.as_deref(),
            Some("https://logos.edx.org/harvard.png")
        );
        assert_eq!(course.difficulty.as_deref(), Some("Introductory"));
        assert_eq!(
            course.skills.as_deref(),
            Some(&["C".to_string(), "Algorithms".to_string()][..])
        );
        assert_eq!(course.avg_rating, None);
        assert_eq!(course.count_rating, None);
    }

    #[test]
    fn missing_owner_maps_to_absent_provider() {
        let hit = EdxHit {
            title: Some("Ownerless".to_string()),
            marketing_url: Some("https://www.edx.org/course/x".to_string()),
            ..EdxHit::default()
        };
        let course = course_from_hit(hit).unwrap();
        assert_eq!(course.provider, None);
        assert_eq!(course.provider_img, None);
        assert_eq!(course.duration, None);
    }

    #[test]
    fn builds_redirect_url() {
        let service = EdxService::new(reqwest::Client::new());
        assert_eq!(
            service.redirect_url("machine learning", Language::Es),
            "https://www.edx.org/search?q=machine+learning&language=Spanish&availability=Available+now"
        );
    }

    #[test]
    fn caps_page_size_at_algolia_limit() {
        let body = EdxService::request_body("python", Language::En, 200);
        assert_eq!(body["requests"][0]["hitsPerPage"], 50);
        assert_eq!(body["requests"][0]["facetFilters"][1][0], "language:English");
    }
}
