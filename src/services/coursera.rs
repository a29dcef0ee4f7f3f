use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::models::{Course, Language};
use crate::services::provider::{CourseProvider, ProviderError};

const SEARCH_URL: &str = "https://www.coursera.org/graphql-gateway?opname=Search";
const USER_AGENT: &str = "PostmanRuntime/7.43.3";

const SEARCH_QUERY: &str = r#"query Search($requests: [Search_Request!]!) {
    SearchResult {
        search(requests: $requests) {
            elements {
                ... on Search_ProductHit {
                    name
                    url
                    imageUrl
                    productDifficultyLevel
                    productDuration
                    avgProductRating
                    numProductRatings
                    skills
                    partners
                    partnerLogos
                }
            }
        }
    }
}"#;

/// Searches Coursera's GraphQL gateway, filtered to free products.
#[derive(Clone)]
pub struct CourseraService {
    client: reqwest::Client,
}

impl CourseraService {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn request_body(query: &str, lang: Language, num_items: u32) -> serde_json::Value {
        json!([{
            "operationName": "Search",
            "variables": {
                "requests": [{
                    "entityType": "PRODUCTS",
                    "limit": num_items,
                    "facets": ["topic", "language"],
                    "sortBy": "BEST_MATCH",
                    "maxValuesPerFacet": 1000,
                    "facetFilters": [[format!("language:{}", lang.full_name()), "price:Free"]],
                    "cursor": "0",
                    "query": query,
                }]
            },
            "query": SEARCH_QUERY,
        }])
    }
}

// The gateway answers with a one-element array of GraphQL envelopes.
#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(rename = "SearchResult")]
    search_result: Option<SearchResultNode>,
}

#[derive(Debug, Deserialize)]
struct SearchResultNode {
    #[serde(default)]
    search: Vec<SearchPage>,
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    elements: Vec<ProductHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductHit {
    name: Option<String>,
    url: Option<String>,
    image_url: Option<String>,
    product_difficulty_level: Option<String>,
    product_duration: Option<String>,
    avg_product_rating: Option<f64>,
    num_product_ratings: Option<u64>,
    skills: Option<Vec<String>>,
    partners: Option<Vec<String>>,
    partner_logos: Option<Vec<String>>,
}

fn parse_courses(envelope: SearchEnvelope) -> Vec<Course> {
    envelope
        .data
        .and_then(|data| data.search_result)
        .and_then(|node| node.search.into_iter().next())
        .map(|page| page.elements)
        .unwrap_or_default()
        .into_iter()
        .filter_map(course_from_hit)
        .collect()
}

fn course_from_hit(hit: ProductHit) -> Option<Course> {
    let title = hit.name?;
    // The gateway returns site-relative course paths.
    let url = format!("https://www.coursera.org{}", hit.url?);

    Some(Course {
        title,
        url,
        image_url: hit.image_url,
        duration: hit
            .product_duration
            .map(|d| d.to_lowercase().replace('_', " ")),
        provider: hit.partners.and_then(|p| p.into_iter().next()),
        provider_img: hit.partner_logos.and_then(|p| p.into_iter().next()),
        difficulty: hit.product_difficulty_level.map(|d| d.to_lowercase()),
        avg_rating: hit.avg_product_rating.map(|r| (r * 10.0).round() / 10.0),
        count_rating: hit.num_product_ratings,
        skills: hit.skills,
    })
}

#[async_trait]
impl CourseProvider for CourseraService {
    fn name(&self) -> &'static str {
        "coursera"
    }

    fn redirect_url(&self, query: &str, lang: Language) -> String {
        Url::parse_with_params(
            "https://coursera.org/search",
            &[("query", query), ("language", lang.full_name())],
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
            .post(SEARCH_URL)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .header("Connection", "keep-alive")
            .header("postman-token", Uuid::new_v4().to_string())
            .json(&Self::request_body(query, lang, num_items))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let envelopes: Vec<SearchEnvelope> = response.json().await?;
        let envelope = envelopes
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Payload("empty response array".to_string()))?;

        Ok(parse_courses(envelope))
    }
}
