mod common;

use std::sync::Arc;

use common::{MockThesaurus, plain};
use ontorec_application::{
    ClassificationRules, OntologyRecommender, RecommendationRequest, RecommenderConfig,
};
use ontorec_core::budget::Budget;
use ontorec_core::memory;
use ontorec_core::recommendation::{Category, GroupedRecommendations, RunStats};
use ontorec_core::session::{InMemorySessionStore, SHOW_COUNTER_KEY, SessionStore};
use ontorec_core::thesaurus::ThesaurusConcept;

fn recommender(
    thesaurus: &Arc<MockThesaurus>,
    session: &Arc<InMemorySessionStore>,
    settings: &str,
) -> OntologyRecommender {
    let config = RecommenderConfig::new(Budget::parse(settings).unwrap());
    OntologyRecommender::new(thesaurus.clone(), session.clone(), config)
}

async fn run(
    recommender: &mut OntologyRecommender,
    request: RecommendationRequest,
    result_total: Option<u64>,
) -> (GroupedRecommendations, RunStats) {
    recommender.init(request).unwrap();
    let recommendations = recommender.process(result_total).await.unwrap().clone();
    (recommendations, recommender.stats().unwrap())
}

fn cats_thesaurus() -> MockThesaurus {
    MockThesaurus::new()
        .with_search("cats", vec![plain("Cat", "u1").with_alt_label("cats")])
        .with_search("dogs", vec![plain("Dog", "u2").with_alt_label("dogs")])
}

#[tokio::test]
async fn test_alt_label_match_is_nondescriptor() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let (recs, stats) = run(&mut recommender, RecommendationRequest::new("cats", "en"), None).await;

    let bucket = recs.bucket(Category::NonDescriptor, "cats").unwrap();
    assert_eq!(bucket.records.len(), 1);
    let record = &bucket.records[0];
    assert_eq!(record.concept.pref_label, "Cat");
    assert_eq!(record.follow_up_query, "topic_uri_str_mv:u1 Cat");
    assert_eq!(record.memory_key, "1");

    let memory = memory::decode(Some(record.memory_token.as_str())).unwrap();
    assert_eq!(memory.source_module, "Ontology");
    assert_eq!(memory.recommended_term, "Cat");
    assert_eq!(memory.replaced_term.as_deref(), Some("cats"));
    assert_eq!(memory.category, Some(Category::NonDescriptor));

    assert_eq!(stats.api_calls, 1);
    assert_eq!(stats.recommendation_count, 1);
    assert_eq!(stats.ontology_result_total, 1);
}

#[tokio::test]
async fn test_hidden_label_matches_form_one_specifier_bucket() {
    let thesaurus = Arc::new(MockThesaurus::new().with_search(
        "jaguar",
        vec![
            plain("Jaguar (animal)", "u1").with_hidden_label("jaguar"),
            plain("Jaguar (car)", "u2").with_hidden_label("Jaguar"),
            plain("Panther", "u3"),
        ],
    ));
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let (recs, stats) = run(&mut recommender, RecommendationRequest::new("jaguar", "en"), None).await;

    let bucket = recs.bucket(Category::Specifier, "jaguar").unwrap();
    let uris: Vec<&str> = bucket.records.iter().map(|r| r.concept.uri.as_str()).collect();
    assert_eq!(uris, vec!["u1", "u2"]);
    assert_eq!(
        bucket.records[0].follow_up_query,
        "topic_uri_str_mv:u1 \"Jaguar (animal)\""
    );
    assert_eq!(stats.recommendation_count, 1);
    assert_eq!(stats.ontology_result_total, 2);
}

#[tokio::test]
async fn test_single_call_budget_stops_after_first_term() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "1");

    let (recs, stats) = run(&mut recommender, RecommendationRequest::new("cats dogs", "en"), None).await;

    assert_eq!(thesaurus.searched_terms(), vec!["cats"]);
    assert_eq!(stats.api_calls, 1);
    assert_eq!(recs.bucket_count(), 1);
}

#[tokio::test]
async fn test_zero_call_budget_makes_no_calls() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "0");

    let (recs, _) = run(&mut recommender, RecommendationRequest::new("cats", "en"), None).await;

    assert_eq!(thesaurus.total_calls(), 0);
    assert!(recs.is_empty());
}

#[tokio::test]
async fn test_api_call_cap_counts_narrower_calls() {
    let thesaurus = Arc::new(
        MockThesaurus::new()
            .with_search("a", vec![plain("A", "ua")])
            .with_search("b", vec![plain("B", "ub")])
            .with_search("c", vec![plain("C", "uc")])
            .with_narrower("ua", vec![plain("A1", "ua1")])
            .with_narrower("ub", vec![plain("B1", "ub1")]),
    );
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "3");

    let (recs, stats) = run(&mut recommender, RecommendationRequest::new("a b c", "en"), None).await;

    // "b" is searched but may not expand: that would need a fourth call.
    assert_eq!(thesaurus.searched_terms(), vec!["a", "b"]);
    assert_eq!(thesaurus.narrower_count(), 1);
    assert_eq!(stats.api_calls, 3);
    assert_eq!(recs.get(Category::Hyponym).len(), 1);
}

#[tokio::test]
async fn test_api_calls_never_exceed_budget() {
    for max_calls in 0..6u32 {
        let thesaurus = Arc::new(
            MockThesaurus::new()
                .with_search("a", vec![plain("A", "ua")])
                .with_search("b", vec![plain("B", "ub").with_alt_label("b")])
                .with_search("c", vec![plain("C", "uc")])
                .with_narrower("ua", vec![plain("A1", "ua1")])
                .with_narrower("uc", vec![plain("C1", "uc1")]),
        );
        let session = Arc::new(InMemorySessionStore::new());
        let mut recommender = recommender(&thesaurus, &session, &max_calls.to_string());

        let (_, stats) = run(&mut recommender, RecommendationRequest::new("a b c d", "en"), None).await;

        assert!(thesaurus.total_calls() <= max_calls as usize);
        assert_eq!(stats.api_calls as usize, thesaurus.total_calls());
    }
}

#[tokio::test]
async fn test_recommendation_limit_stops_lookups() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, ":1");

    let (recs, stats) = run(&mut recommender, RecommendationRequest::new("cats dogs", "en"), None).await;

    assert_eq!(thesaurus.searched_terms(), vec!["cats"]);
    assert_eq!(stats.recommendation_count, 1);
    assert_eq!(recs.bucket_count(), 1);
}

#[tokio::test]
async fn test_unsupported_language_makes_no_calls() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let (recs, stats) = run(&mut recommender, RecommendationRequest::new("cats", "de"), None).await;

    assert_eq!(thesaurus.total_calls(), 0);
    assert!(recs.is_empty());
    assert_eq!(stats, RunStats::default());
}

#[tokio::test]
async fn test_regional_english_is_searched_as_english() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    run(&mut recommender, RecommendationRequest::new("cats", "en-gb"), None).await;

    let calls = thesaurus.search_calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("cats".to_string(), Some("en".to_string()))]);
}

#[tokio::test]
async fn test_empty_query_makes_no_calls() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let (recs, _) = run(&mut recommender, RecommendationRequest::new("   ", "en"), None).await;

    assert_eq!(thesaurus.total_calls(), 0);
    assert!(recs.is_empty());
}

#[tokio::test]
async fn test_uri_filters_are_never_searched() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    run(
        &mut recommender,
        RecommendationRequest::new("topic_uri_str_mv:http://www.yso.fi/onto/yso/p123 cats", "en"),
        None,
    )
    .await;

    assert_eq!(thesaurus.searched_terms(), vec!["cats"]);
}

#[tokio::test]
async fn test_hyponym_expansion_replaces_broader_filter() {
    let thesaurus = Arc::new(
        MockThesaurus::new()
            .with_search("Cat", vec![plain("Cat", "u1")])
            .with_narrower("u1", vec![plain("Kittens", "u2"), plain("House cats", "u3")]),
    );
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, ":::1000");

    let (recs, stats) = run(
        &mut recommender,
        RecommendationRequest::new("topic_uri_str_mv:u1 Cat care", "en"),
        Some(5000),
    )
    .await;

    let bucket = recs.bucket(Category::Hyponym, "Cat").unwrap();
    let queries: Vec<&str> = bucket
        .records
        .iter()
        .map(|r| r.follow_up_query.as_str())
        .collect();
    assert_eq!(
        queries,
        vec![
            "topic_uri_str_mv:u2 Kittens care",
            "topic_uri_str_mv:u3 \"House cats\" care",
        ]
    );

    let calls = thesaurus.narrower_calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![("yso".to_string(), "u1".to_string(), "en".to_string())]
    );
    // "Cat", its narrower lookup, then "care"
    assert_eq!(stats.api_calls, 3);
    assert_eq!(stats.recommendation_count, 1);
    assert_eq!(stats.ontology_result_total, 2);
}

#[tokio::test]
async fn test_small_or_unknown_total_prevents_expansion() {
    for total in [Some(10), None] {
        let thesaurus = Arc::new(
            MockThesaurus::new()
                .with_search("Cat", vec![plain("Cat", "u1")])
                .with_narrower("u1", vec![plain("Kittens", "u2")]),
        );
        let session = Arc::new(InMemorySessionStore::new());
        let mut recommender = recommender(&thesaurus, &session, ":::1000");

        let (recs, _) = run(&mut recommender, RecommendationRequest::new("Cat", "en"), total).await;

        assert_eq!(thesaurus.narrower_count(), 0);
        assert!(recs.is_empty());
    }
}

#[tokio::test]
async fn test_request_result_total_takes_precedence() {
    let thesaurus = Arc::new(
        MockThesaurus::new()
            .with_search("Cat", vec![plain("Cat", "u1")])
            .with_narrower("u1", vec![plain("Kittens", "u2")]),
    );
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, ":::1000");

    let request = RecommendationRequest::new("Cat", "en").with_result_total(5000);
    let (recs, _) = run(&mut recommender, request, Some(1)).await;

    assert_eq!(thesaurus.narrower_count(), 1);
    assert_eq!(recs.get(Category::Hyponym).len(), 1);
}

#[tokio::test]
async fn test_display_cap_skips_lookups() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::with_values([(SHOW_COUNTER_KEY, "5")]));
    let mut recommender = recommender(&thesaurus, &session, "::::5");

    let (recs, _) = run(&mut recommender, RecommendationRequest::new("cats", "en"), None).await;

    assert_eq!(thesaurus.total_calls(), 0);
    assert!(recs.is_empty());
    assert_eq!(
        session.get(SHOW_COUNTER_KEY).await.unwrap().as_deref(),
        Some("5")
    );
}

#[tokio::test]
async fn test_show_counter_increments_once_per_run() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::with_values([(SHOW_COUNTER_KEY, "2")]));
    let mut recommender = recommender(&thesaurus, &session, "::::5");

    let (recs, _) = run(&mut recommender, RecommendationRequest::new("cats dogs", "en"), None).await;

    assert_eq!(recs.bucket_count(), 2);
    assert_eq!(
        session.get(SHOW_COUNTER_KEY).await.unwrap().as_deref(),
        Some("3")
    );
}

#[tokio::test]
async fn test_show_counter_untouched_without_recommendations() {
    let thesaurus = Arc::new(MockThesaurus::new());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let (recs, _) = run(&mut recommender, RecommendationRequest::new("cats", "en"), None).await;

    assert!(recs.is_empty());
    assert_eq!(thesaurus.search_count(), 1);
    assert_eq!(session.get(SHOW_COUNTER_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_search_failure_continues_with_next_term() {
    let thesaurus = Arc::new(cats_thesaurus().failing_on("cats"));
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let (recs, stats) = run(&mut recommender, RecommendationRequest::new("cats dogs", "en"), None).await;

    assert_eq!(thesaurus.searched_terms(), vec!["cats", "dogs"]);
    assert_eq!(stats.api_calls, 2);
    assert!(recs.bucket(Category::NonDescriptor, "cats").is_none());
    assert!(recs.bucket(Category::NonDescriptor, "dogs").is_some());
}

#[tokio::test]
async fn test_memory_keys_and_links_use_search_id() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let params = vec![
        ("lookfor".to_string(), "cats dogs".to_string()),
        ("type".to_string(), "AllFields".to_string()),
        ("searchId".to_string(), "7".to_string()),
        ("mod".to_string(), "Ontology".to_string()),
    ];
    let request = RecommendationRequest::new("cats dogs", "en")
        .with_search_id("7")
        .with_params(params);
    let (recs, _) = run(&mut recommender, request, None).await;

    let keys: Vec<&str> = recs.records().map(|r| r.memory_key.as_str()).collect();
    assert_eq!(keys, vec!["7-1", "7-2"]);

    let first = recs.records().next().unwrap();
    assert_eq!(
        first.href,
        "/Search/Results?lookfor=topic_uri_str_mv%3Au1+Cat+dogs&type=AllFields&rmKey=7-1"
    );
}

#[tokio::test]
async fn test_rule_sets_differ_on_lone_hidden_label() {
    let concepts = vec![ThesaurusConcept::new("Felidae", "u1").with_hidden_label("cats")];

    let thesaurus = Arc::new(MockThesaurus::new().with_search("cats", concepts.clone()));
    let session = Arc::new(InMemorySessionStore::new());
    let mut strict = recommender(&thesaurus, &session, "");
    let (recs, _) = run(&mut strict, RecommendationRequest::new("cats", "en"), None).await;
    assert!(recs.is_empty());
    assert_eq!(thesaurus.narrower_count(), 0);

    let thesaurus = Arc::new(MockThesaurus::new().with_search("cats", concepts));
    let config = RecommenderConfig {
        rules: ClassificationRules::Lenient,
        ..RecommenderConfig::new(Budget::unbounded())
    };
    let mut lenient = OntologyRecommender::new(thesaurus.clone(), session.clone(), config);
    let (recs, _) = run(&mut lenient, RecommendationRequest::new("cats", "en"), None).await;
    assert!(recs.bucket(Category::Specifier, "cats").is_some());
}

#[tokio::test]
async fn test_process_before_init_fails() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let err = recommender.process(None).await.unwrap_err();
    assert!(err.is_invalid_state());
    assert!(recommender.recommendations().is_none());
}

#[tokio::test]
async fn test_processed_result_is_cached() {
    let thesaurus = Arc::new(cats_thesaurus());
    let session = Arc::new(InMemorySessionStore::new());
    let mut recommender = recommender(&thesaurus, &session, "");

    let (first, _) = run(&mut recommender, RecommendationRequest::new("cats", "en"), None).await;
    let second = recommender.process(Some(10_000)).await.unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(thesaurus.total_calls(), 1);
    assert!(recommender.is_processed());
    assert!(
        recommender
            .init(RecommendationRequest::new("dogs", "en"))
            .unwrap_err()
            .is_invalid_state()
    );
}
