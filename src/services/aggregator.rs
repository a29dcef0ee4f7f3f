use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Language, PlatformResult, SearchResponse, SearchResults};
use crate::services::provider::CourseProvider;
use crate::services::{CourseraService, EdxService, UdemyService, YouTubeService};

/// Fans one search out to all four platforms at once and settles each
/// outcome independently. A slow or failing platform degrades only its own
/// bucket to the empty/redirect form; it never fails the whole search.
#[derive(Clone)]
pub struct AggregatorService {
    coursera: Arc<dyn CourseProvider>,
    edx: Arc<dyn CourseProvider>,
    udemy: Arc<dyn CourseProvider>,
    youtube: Arc<dyn CourseProvider>,
    provider_timeout: Duration,
}

impl AggregatorService {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self::with_providers(
            Arc::new(CourseraService::new(client.clone())),
            Arc::new(EdxService::new(client.clone())),
            Arc::new(UdemyService::new(client.clone())),
            Arc::new(YouTubeService::new(config.youtube.api_key.clone(), client)),
            Duration::from_secs(config.search.provider_timeout_secs),
        )
    }

    /// Assemble from explicit providers. Also the seam tests use to swap in
    /// mocked platforms.
    pub fn with_providers(
        coursera: Arc<dyn CourseProvider>,
        edx: Arc<dyn CourseProvider>,
        udemy: Arc<dyn CourseProvider>,
        youtube: Arc<dyn CourseProvider>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            coursera,
            edx,
            udemy,
            youtube,
            provider_timeout,
        }
    }

    /// Concurrent fan-out over all four platforms. The futures are joined on
    /// one task; suspension happens at each platform's network boundary.
    /// Bucket order in the response is fixed regardless of completion order.
    pub async fn search(&self, query: &str, lang: Language, num_items: u32) -> SearchResponse {
        let (coursera, edx, udemy, youtube) = futures::join!(
            self.settle(&self.coursera, query, lang, num_items),
            self.settle(&self.edx, query, lang, num_items),
            self.settle(&self.udemy, query, lang, num_items),
            self.settle(&self.youtube, query, lang, num_items),
        );

        SearchResponse {
            results: SearchResults {
                coursera,
                edx,
                udemy,
                youtube,
            },
        }
    }

    /// Runs one platform to completion and absorbs its failure modes.
    async fn settle(
        &self,
        provider: &Arc<dyn CourseProvider>,
        query: &str,
        lang: Language,
        num_items: u32,
    ) -> PlatformResult {
        let name = provider.name();
        let redirect_url = provider.redirect_url(query, lang);
        let started = Instant::now();

        let courses = match timeout(self.provider_timeout, provider.fetch(query, lang, num_items))
            .await
        {
            Ok(Ok(mut courses)) => {
                // Upstream page sizes are best-effort; enforce the cap here.
                courses.truncate(num_items as usize);
                debug!(
                    provider = name,
                    count = courses.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "provider search finished"
                );
                courses
            }
            Ok(Err(err)) => {
                warn!(
                    provider = name,
                    error = %err,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "provider search failed"
                );
                Vec::new()
            }
            Err(_) => {
                warn!(
                    provider = name,
                    timeout_ms = self.provider_timeout.as_millis() as u64,
                    "provider search timed out"
                );
                Vec::new()
            }
        };

        PlatformResult {
            courses,
            redirect_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::models::Course;
    use crate::services::provider::{MockCourseProvider, ProviderError};

    fn course(title: &str) -> Course {
        Course {
            title: title.to_string(),
            url: format!("https://example.com/{}", title),
            image_url: None,
            duration: None,
            provider: None,
            provider_img: None,
            difficulty: None,
            avg_rating: None,
            count_rating: None,
            skills: None,
        }
    }

    fn ok_provider(name: &'static str, courses: Vec<Course>) -> Arc<dyn CourseProvider> {
        let mut mock = MockCourseProvider::new();
        mock.expect_name().return_const(name);
        mock.expect_redirect_url()
            .returning(move |_, _| format!("https://example.com/{}/search", name));
        mock.expect_fetch()
            .returning(move |_, _, _| Ok(courses.clone()));
        Arc::new(mock)
    }

    fn failing_provider(name: &'static str) -> Arc<dyn CourseProvider> {
        let mut mock = MockCourseProvider::new();
        mock.expect_name().return_const(name);
        mock.expect_redirect_url()
            .returning(move |_, _| format!("https://example.com/{}/search", name));
        mock.expect_fetch()
            .returning(|_, _, _| Err(ProviderError::Payload("boom".to_string())));
        Arc::new(mock)
    }

    struct SlowProvider;

    #[async_trait]
    impl CourseProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "coursera"
        }

        fn redirect_url(&self, _query: &str, _lang: Language) -> String {
            "https://example.com/slow/search".to_string()
        }

        async fn fetch(
            &self,
            _query: &str,
            _lang: Language,
            _num_items: u32,
        ) -> Result<Vec<Course>, ProviderError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![course("too-late")])
        }
    }

    fn aggregator_with(
        coursera: Arc<dyn CourseProvider>,
        edx: Arc<dyn CourseProvider>,
        udemy: Arc<dyn CourseProvider>,
        youtube: Arc<dyn CourseProvider>,
    ) -> AggregatorService {
        AggregatorService::with_providers(coursera, edx, udemy, youtube, Duration::from_millis(250))
    }

    #[tokio::test]
    async fn keeps_all_platform_buckets_when_some_fail() {
        let fixed = vec![course("a"), course("b")];
        let aggregator = aggregator_with(
            ok_provider("coursera", fixed.clone()),
            failing_provider("edx"),
            ok_provider("udemy", vec![course("u")]),
            failing_provider("youtube"),
        );

        let response = aggregator.search("rust", Language::En, 6).await;

        assert_eq!(response.results.coursera.courses, fixed);
        assert!(response.results.edx.courses.is_empty());
        assert_eq!(
            response.results.edx.redirect_url,
            "https://example.com/edx/search"
        );
        assert_eq!(response.results.udemy.courses.len(), 1);
        assert!(response.results.youtube.courses.is_empty());
        assert!(!response.results.youtube.redirect_url.is_empty());
    }

    #[tokio::test]
    async fn truncates_each_bucket_to_requested_size() {
        let five: Vec<Course> = (0..5).map(|i| course(&format!("c{}", i))).collect();
        let aggregator = aggregator_with(
            ok_provider("coursera", five.clone()),
            ok_provider("edx", Vec::new()),
            ok_provider("udemy", Vec::new()),
            ok_provider("youtube", Vec::new()),
        );

        let response = aggregator.search("rust", Language::En, 3).await;

        assert_eq!(response.results.coursera.courses, five[..3].to_vec());
    }

    #[tokio::test]
    async fn slow_platform_times_out_without_stalling_the_rest() {
        let aggregator = aggregator_with(
            Arc::new(SlowProvider),
            ok_provider("edx", vec![course("e")]),
            ok_provider("udemy", Vec::new()),
            ok_provider("youtube", Vec::new()),
        );

        let started = Instant::now();
        let response = aggregator.search("rust", Language::En, 6).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(response.results.coursera.courses.is_empty());
        assert_eq!(
            response.results.coursera.redirect_url,
            "https://example.com/slow/search"
        );
        assert_eq!(response.results.edx.courses.len(), 1);
    }

    #[tokio::test]
    async fn missing_youtube_credential_degrades_to_redirect_only() {
        let youtube = Arc::new(crate::services::YouTubeService::new(
            None,
            reqwest::Client::new(),
        ));
        let aggregator = aggregator_with(
            ok_provider("coursera", Vec::new()),
            ok_provider("edx", Vec::new()),
            ok_provider("udemy", Vec::new()),
            youtube,
        );

        let response = aggregator.search("rust", Language::Es, 6).await;

        assert!(response.results.youtube.courses.is_empty());
        assert!(response
            .results
            .youtube
            .redirect_url
            .starts_with("https://www.youtube.com/results?search_query="));
    }
}
