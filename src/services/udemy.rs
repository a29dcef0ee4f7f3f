use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::models::{Course, Language};
use crate::services::provider::{CourseProvider, ProviderError};

const SEARCH_URL: &str = "https://www.udemy.com/api/2024-01/graphql/";

const SEARCH_QUERY: &str = r#"
query SrpMxCourseSearch($query: String!, $page: NonNegativeInt!, $pageSize: MaxResultsPerPage!, $sortOrder: CourseSearchSortType, $filters: CourseSearchFilters, $context: CourseSearchContext) {
  courseSearch(
    query: $query
    page: $page
    pageSize: $pageSize
    sortOrder: $sortOrder
    filters: $filters
    context: $context
  ) {
    count
    results {
      course {
        durationInSeconds
        headline
        id
        images { height125 px100x100 px240x135 px304x171 px480x270 px50x50 }
        instructors { id name }
        isFree
        learningOutcomes
        level
        updatedOn
        locale
        rating { average count }
        title
        urlCourseLanding
      }
    }
    page
    pageCount
    metadata {
      querySuggestion { query type }
      originalQuery
      associatedTopic { id url }
    }
  }
}
"#;

/// Searches Udemy's course-search GraphQL API, filtered to free courses.
#[derive(Clone)]
pub struct UdemyService {
    client: reqwest::Client,
}

impl UdemyService {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn request_body(query: &str, lang: Language, num_items: u32) -> serde_json::Value {
        json!({
            "query": SEARCH_QUERY,
            "variables": {
                "page": 0,
                "query": query,
                "sortOrder": "RELEVANCE",
                "pageSize": num_items,
                "context": { "triggerType": "USER_QUERY" },
                "filters": {
                    "price": ["FREE"],
                    "language": [lang.udemy_code()]
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct UdemyEnvelope {
    data: Option<UdemyData>,
}

#[derive(Debug, Deserialize)]
struct UdemyData {
    #[serde(rename = "courseSearch")]
    course_search: Option<CourseSearch>,
}

#[derive(Debug, Deserialize)]
struct CourseSearch {
    #[serde(default)]
    results: Vec<UdemyResult>,
}

#[derive(Debug, Deserialize)]
struct UdemyResult {
    course: Option<UdemyCourse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UdemyCourse {
    title: Option<String>,
    url_course_landing: Option<String>,
    images: Option<UdemyImages>,
    duration_in_seconds: Option<u64>,
    #[serde(default)]
    instructors: Vec<UdemyInstructor>,
    level: Option<String>,
    rating: Option<UdemyRating>,
    learning_outcomes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct UdemyImages {
    px240x135: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UdemyInstructor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UdemyRating {
    average: Option<f64>,
    count: Option<u64>,
}

fn parse_courses(envelope: UdemyEnvelope) -> Vec<Course> {
    envelope
        .data
        .and_then(|data| data.course_search)
        .map(|search| search.results)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|result| result.course)
        .filter_map(course_from_hit)
        .collect()
}

fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{}h {}m", hours, minutes)
}

fn course_from_hit(course: UdemyCourse) -> Option<Course> {
    let title = course.title?.trim().to_string();
    let url = course.url_course_landing?;

    let (avg_rating, count_rating) = match course.rating {
        Some(rating) => (
            rating.average.map(|avg| (avg * 10.0).round() / 10.0),
            rating.count,
        ),
        None => (None, None),
    };

    Some(Course {
        title,
        url,
        image_url: course.images.and_then(|images| images.px240x135),
        duration: course
            .duration_in_seconds
            .filter(|seconds| *seconds > 0)
            .map(format_duration),
        provider: course
            .instructors
            .into_iter()
            .next()
            .and_then(|instructor| instructor.name),
        provider_img: None,
        difficulty: course
            .level
            .map(|level| level.to_lowercase().replace('_', " ")),
        avg_rating,
        count_rating,
        skills: course.learning_outcomes,
    })
}

#[async_trait]
impl CourseProvider for UdemyService {
    fn name(&self) -> &'static str {
        "udemy"
    }

    fn redirect_url(&self, query: &str, lang: Language) -> String {
        Url::parse_with_params(
            "https://www.udemy.com/courses/search/",
            &[
                ("lang", lang.udemy_code()),
                ("price", "price-free"),
                ("q", query),
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
            .post(SEARCH_URL)
            .json(&Self::request_body(query, lang, num_items))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        let envelope: UdemyEnvelope = response.json().await?;
        Ok(parse_courses(envelope))
    }
}
