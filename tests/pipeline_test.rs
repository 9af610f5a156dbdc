//! Integration tests for the orchestration pipeline.
//!
//! Components are replaced with in-process fakes and the store runs on
//! in-memory SQLite, so the full skip/classify/dispatch/record flow is
//! exercised without any network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;

use job_scout::db::{self, queries};
use job_scout::models::judgment::Judgment;
use job_scout::models::listing::Listing;
use job_scout::pipeline::{run_pipeline, PipelineOptions};
use job_scout::services::classifier::{Classifier, ClassifierError};
use job_scout::services::notifier::Dispatcher;
use job_scout::services::source::{ListingSource, SourceError};

struct FixedSource {
    listings: Vec<Listing>,
}

#[async_trait]
impl ListingSource for FixedSource {
    async fn fetch(&self, _endpoint: &str, max_items: usize) -> Result<Vec<Listing>, SourceError> {
        Ok(self.listings.iter().take(max_items).cloned().collect())
    }
}

struct ScriptedClassifier {
    judgment: Judgment,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    fn new(judgment: Judgment) -> Self {
        Self {
            judgment,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(
        &self,
        _title: &str,
        _description: &str,
    ) -> Result<Judgment, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.judgment.clone())
    }
}

struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(
        &self,
        _title: &str,
        _description: &str,
    ) -> Result<Judgment, ClassifierError> {
        Err(ClassifierError::EmptyResponse)
    }
}

struct RecordingDispatcher {
    result: bool,
    deliveries: Mutex<Vec<(String, i64)>>,
}

impl RecordingDispatcher {
    fn new(result: bool) -> Self {
        Self {
            result,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    fn deliveries(&self) -> Vec<(String, i64)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, listing: &Listing, judgment: &Judgment) -> bool {
        self.deliveries
            .lock()
            .unwrap()
            .push((listing.url.clone(), judgment.score));
        self.result
    }
}

async fn memory_pool() -> SqlitePool {
    let pool = db::init_pool("sqlite::memory:").await.expect("pool");
    db::run_migrations(&pool).await.expect("migrations");
    pool
}

fn listing(url: &str, title: &str) -> Listing {
    Listing {
        url: url.to_string(),
        title: title.to_string(),
        company: "Check Title".to_string(),
        description: "Description not available on list page.".to_string(),
    }
}

fn options() -> PipelineOptions {
    PipelineOptions {
        endpoint: "https://news.ycombinator.com/jobs".to_string(),
        max_listings: 15,
        delivery_threshold: 5,
        listing_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn end_to_end_match_dispatches_once_and_stores_record() {
    let pool = memory_pool().await;
    let source = FixedSource {
        listings: vec![listing("https://x/1", "AI Engineer")],
    };
    let classifier = ScriptedClassifier::new(Judgment {
        score: 8,
        summary: "Good fit".to_string(),
        is_agency: false,
    });
    let dispatcher = RecordingDispatcher::new(true);

    let summary = run_pipeline(&pool, &source, &classifier, &dispatcher, &options())
        .await
        .unwrap();

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.evaluated, 1);
    assert_eq!(summary.delivered, 1);
    assert_eq!(summary.stored, 1);
    assert_eq!(summary.skipped, 0);

    assert_eq!(
        dispatcher.deliveries(),
        vec![("https://x/1".to_string(), 8)]
    );

    let record = queries::get_job(&pool, "https://x/1")
        .await
        .unwrap()
        .expect("record persisted");
    assert_eq!(record.llm_score, 8);
    assert_eq!(record.title, "AI Engineer");
    assert_eq!(record.company, "Check Title");
    assert!(!record.is_agency);
    assert_eq!(record.summary, "Good fit");
}

#[tokio::test]
async fn second_run_over_same_listings_is_idempotent() {
    let pool = memory_pool().await;
    let source = FixedSource {
        listings: vec![
            listing("https://x/1", "AI Engineer"),
            listing("https://x/2", "Data Engineer"),
        ],
    };
    let classifier = ScriptedClassifier::new(Judgment {
        score: 7,
        summary: "Relevant".to_string(),
        is_agency: false,
    });
    let dispatcher = RecordingDispatcher::new(true);

    let first = run_pipeline(&pool, &source, &classifier, &dispatcher, &options())
        .await
        .unwrap();
    assert_eq!(first.stored, 2);
    assert_eq!(classifier.call_count(), 2);

    let second = run_pipeline(&pool, &source, &classifier, &dispatcher, &options())
        .await
        .unwrap();

    // Every listing is skipped via the store; the classifier is never
    // consulted again and nothing new is stored or delivered.
    assert_eq!(second.skipped, 2);
    assert_eq!(second.evaluated, 0);
    assert_eq!(second.stored, 0);
    assert_eq!(classifier.call_count(), 2);
    assert_eq!(dispatcher.deliveries().len(), 2);
    assert_eq!(queries::count_jobs(&pool).await.unwrap(), 2);
}

#[tokio::test]
async fn classifier_failure_stores_sentinel_and_never_dispatches() {
    let pool = memory_pool().await;
    let source = FixedSource {
        listings: vec![listing("https://x/1", "AI Engineer")],
    };
    let dispatcher = RecordingDispatcher::new(true);

    let summary = run_pipeline(&pool, &source, &FailingClassifier, &dispatcher, &options())
        .await
        .unwrap();

    assert_eq!(summary.delivered, 0);
    assert_eq!(summary.stored, 1);
    assert!(dispatcher.deliveries().is_empty());

    let record = queries::get_job(&pool, "https://x/1")
        .await
        .unwrap()
        .expect("record persisted despite classifier failure");
    assert_eq!(record.llm_score, 0);
    assert!(!record.is_agency);
    assert!(record.summary.starts_with("Evaluation failed"));
}

#[tokio::test]
async fn agency_listing_is_stored_but_not_delivered() {
    let pool = memory_pool().await;
    let source = FixedSource {
        listings: vec![listing("https://x/1", "Senior AI Engineer (via agency)")],
    };
    let classifier = ScriptedClassifier::new(Judgment {
        score: 9,
        summary: "Recruiting agency posting".to_string(),
        is_agency: true,
    });
    let dispatcher = RecordingDispatcher::new(true);

    let summary = run_pipeline(&pool, &source, &classifier, &dispatcher, &options())
        .await
        .unwrap();

    assert_eq!(summary.delivered, 0);
    assert_eq!(summary.stored, 1);
    assert!(dispatcher.deliveries().is_empty());
}

#[tokio::test]
async fn dispatch_failure_does_not_block_storage() {
    let pool = memory_pool().await;
    let source = FixedSource {
        listings: vec![listing("https://x/1", "AI Engineer")],
    };
    let classifier = ScriptedClassifier::new(Judgment {
        score: 8,
        summary: "Good fit".to_string(),
        is_agency: false,
    });
    let dispatcher = RecordingDispatcher::new(false);

    let summary = run_pipeline(&pool, &source, &classifier, &dispatcher, &options())
        .await
        .unwrap();

    assert_eq!(summary.delivered, 0);
    assert_eq!(summary.stored, 1);
    assert_eq!(dispatcher.deliveries().len(), 1);
    assert!(queries::job_exists(&pool, "https://x/1").await.unwrap());
}

#[tokio::test]
async fn repeated_url_within_one_run_is_processed_once() {
    let pool = memory_pool().await;
    let source = FixedSource {
        listings: vec![
            listing("https://x/1", "AI Engineer"),
            listing("https://x/1", "AI Engineer"),
        ],
    };
    let classifier = ScriptedClassifier::new(Judgment {
        score: 8,
        summary: "Good fit".to_string(),
        is_agency: false,
    });
    let dispatcher = RecordingDispatcher::new(true);

    let summary = run_pipeline(&pool, &source, &classifier, &dispatcher, &options())
        .await
        .unwrap();

    assert_eq!(summary.evaluated, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.stored, 1);
    assert_eq!(dispatcher.deliveries().len(), 1);
    assert_eq!(queries::count_jobs(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn source_cap_limits_processing() {
    let pool = memory_pool().await;
    let source = FixedSource {
        listings: (0..10)
            .map(|i| listing(&format!("https://x/{i}"), &format!("Job {i}")))
            .collect(),
    };
    let classifier = ScriptedClassifier::new(Judgment {
        score: 1,
        summary: "Weak match".to_string(),
        is_agency: false,
    });
    let dispatcher = RecordingDispatcher::new(true);

    let opts = PipelineOptions {
        max_listings: 3,
        ..options()
    };

    let summary = run_pipeline(&pool, &source, &classifier, &dispatcher, &opts)
        .await
        .unwrap();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.stored, 3);
    assert_eq!(classifier.call_count(), 3);
}

#[tokio::test]
async fn empty_source_completes_with_empty_summary() {
    let pool = memory_pool().await;
    let source = FixedSource { listings: vec![] };
    let classifier = ScriptedClassifier::new(Judgment {
        score: 8,
        summary: String::new(),
        is_agency: false,
    });
    let dispatcher = RecordingDispatcher::new(true);

    let summary = run_pipeline(&pool, &source, &classifier, &dispatcher, &options())
        .await
        .unwrap();

    assert_eq!(summary.fetched, 0);
    assert_eq!(summary.stored, 0);
    assert_eq!(classifier.call_count(), 0);
}
