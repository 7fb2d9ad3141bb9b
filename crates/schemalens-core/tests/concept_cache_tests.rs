//! End-to-end tests for building and serving concept snapshots.
//!
//! Builds run against an in-memory graph with injected failures and scripted
//! oracles, then the cache is checked through its lookup API.

use schemalens_core::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Oracle that returns labels in a fixed global order.
fn fixed_order(order: &'static [&'static str]) -> Arc<dyn SpecificityOracle> {
    Arc::new(move |labels: &[String]| -> Result<Vec<String>, SpecificityError> {
        let mut ordered = labels.to_vec();
        ordered.sort_by_key(|label| order.iter().position(|o| o == label).unwrap_or(usize::MAX));
        Ok(ordered)
    })
}

/// Oracle that never recognises a combination.
fn clueless() -> Arc<dyn SpecificityOracle> {
    Arc::new(|labels: &[String]| -> Result<Vec<String>, SpecificityError> {
        Err(SpecificityError::Ambiguous(labels.to_vec()))
    })
}

fn abc_graph() -> Arc<InMemoryGraph> {
    let graph = InMemoryGraph::new();
    graph.add_node(&["C", "A", "B"], "abc");
    graph.add_node(&["A"], "a");
    graph.into_shared()
}

fn set(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

async fn build(
    graph: Arc<InMemoryGraph>,
    oracle: Arc<dyn SpecificityOracle>,
) -> SchemaResult<ConceptCache> {
    ConceptCache::build(graph, oracle, BuildConfig::default()).await
}

#[tokio::test]
async fn test_every_listed_label_resolves_despite_failures() {
    let graph = InMemoryGraph::sample().into_shared();
    graph.fail(QueryKind::CountNodes);
    graph.fail(QueryKind::TopInstances);
    graph.fail(QueryKind::SomeInstances);
    graph.fail(QueryKind::PropertyUsage);
    graph.fail(QueryKind::DistinctLabelSets);

    let cache = build(graph.clone(), TypeHierarchy::builtin().into_shared())
        .await
        .unwrap();

    graph.heal();
    let labels = graph.list_labels().await.unwrap();
    assert!(!labels.is_empty());
    for label in &labels {
        let concept = cache.get(label).unwrap();
        assert_eq!(concept.instance_count, 0);
        assert!(concept.properties.is_empty());
        assert!(concept.example_instances.is_empty());
        assert!(concept.more_specific_types.is_empty());
    }

    let stats = cache.snapshot().unwrap().stats().clone();
    assert!(!stats.inference_ran);
    assert_eq!(stats.degraded_fields, labels.len() * 4);
}

#[tokio::test]
async fn test_failed_count_only_zeroes_count() {
    let graph = InMemoryGraph::new();
    let acme = graph.add_node(&["Organisation"], "Acme");
    let jane = graph.add_node(&["Person"], "Jane");
    graph.relate(acme, "EMPLOYS", jane);
    graph.fail_for(QueryKind::CountNodes, "Organisation");

    let cache = build(graph.into_shared(), clueless()).await.unwrap();

    let organisation = cache.get("Organisation").unwrap();
    assert_eq!(organisation.instance_count, 0);
    assert_eq!(organisation.properties, vec![Property::new("EMPLOYS", 1)]);
    assert_eq!(organisation.example_instances.len(), 1);
    assert_eq!(organisation.example_instances[0].display_label, "Acme");

    assert_eq!(cache.get("Person").unwrap().instance_count, 1);
}

#[tokio::test]
async fn test_some_instances_only_when_top_is_empty() {
    let graph = InMemoryGraph::new();
    let acme = graph.add_node(&["Organisation"], "Acme");
    let story = graph.add_node(&["Content"], "Story");
    graph.relate_at(story, "MENTIONS", acme, chrono::Utc::now().timestamp());
    let graph = graph.into_shared();

    let cache = build(graph.clone(), clueless()).await.unwrap();

    // Organisation has recent usage; Content does not.
    assert_eq!(graph.calls(QueryKind::TopInstances), 2);
    assert_eq!(graph.calls(QueryKind::SomeInstances), 1);

    let organisation = cache.get("Organisation").unwrap();
    assert_eq!(organisation.example_instances[0].times_used, Some(1));
    let content = cache.get("Content").unwrap();
    assert_eq!(content.example_instances[0].display_label, "Story");
    assert_eq!(content.example_instances[0].times_used, None);
}

#[tokio::test]
async fn test_usage_within_the_last_year_is_ranked() {
    let graph = InMemoryGraph::new();
    let acme = graph.add_node(&["Organisation"], "Acme");
    graph.add_node(&["Organisation"], "Globex");
    let story = graph.add_node(&["Content"], "Story");
    let sixty_days_ago = chrono::Utc::now().timestamp() - 60 * 24 * 60 * 60;
    graph.relate_at(story, "MENTIONS", acme, sixty_days_ago);
    let graph = graph.into_shared();

    let cache = build(graph.clone(), clueless()).await.unwrap();

    let organisation = cache.get("Organisation").unwrap();
    assert_eq!(organisation.example_instances.len(), 1);
    assert_eq!(organisation.example_instances[0].display_label, "Acme");
    assert_eq!(organisation.example_instances[0].times_used, Some(1));
    // Only Content needed the unranked fallback.
    assert_eq!(graph.calls(QueryKind::SomeInstances), 1);
}

#[tokio::test]
async fn test_failed_top_instances_falls_back_to_some() {
    let graph = InMemoryGraph::new();
    graph.add_node(&["Topic"], "Rates");
    graph.fail(QueryKind::TopInstances);

    let cache = build(graph.into_shared(), clueless()).await.unwrap();
    let topic = cache.get("Topic").unwrap();
    assert_eq!(topic.example_instances.len(), 1);
}

#[tokio::test]
async fn test_oracle_order_links_adjacent_pairs() {
    let cache = build(abc_graph(), fixed_order(&["A", "B", "C"]))
        .await
        .unwrap();

    assert_eq!(cache.get("A").unwrap().more_specific_types, set(&["B"]));
    assert_eq!(cache.get("B").unwrap().more_specific_types, set(&["C"]));
    assert!(cache.get("C").unwrap().more_specific_types.is_empty());
}

#[tokio::test]
async fn test_failing_oracle_uses_enumeration_order() {
    let cache = build(abc_graph(), clueless()).await.unwrap();

    assert_eq!(cache.get("C").unwrap().more_specific_types, set(&["A"]));
    assert_eq!(cache.get("A").unwrap().more_specific_types, set(&["B"]));
    assert!(cache.get("B").unwrap().more_specific_types.is_empty());
}

#[tokio::test]
async fn test_inference_is_idempotent() {
    let graph = InMemoryGraph::sample().into_shared();
    let builder = SnapshotBuilder::new(
        graph,
        TypeHierarchy::builtin().into_shared(),
        BuildConfig::default(),
    );

    let first = builder.build().await.unwrap();
    let mut concepts: HashMap<String, Concept> = first
        .concepts()
        .map(|c| (c.label.clone(), Concept::clone(c)))
        .collect();
    let added = builder.infer(&mut concepts).await;

    assert_eq!(added, Some(0));
    for (label, concept) in &concepts {
        assert_eq!(
            concept.more_specific_types,
            first.get(label).unwrap().more_specific_types
        );
    }
}

#[tokio::test]
async fn test_builtin_hierarchy_over_sample_graph() {
    let graph = InMemoryGraph::sample().into_shared();
    let cache = build(graph, TypeHierarchy::builtin().into_shared())
        .await
        .unwrap();

    assert!(cache.get("Thing").unwrap().more_specific_types.contains("Concept"));
    assert_eq!(
        cache.get("Concept").unwrap().more_specific_types,
        set(&["Classification", "Location", "Organisation", "Person", "Topic"])
    );
    assert_eq!(
        cache.get("Company").unwrap().more_specific_types,
        set(&["PublicCompany"])
    );
    // The unorderable ["Brand", "Person"] node still links in listed order.
    assert!(cache.get("Brand").unwrap().more_specific_types.contains("Person"));
    assert!(!cache.get("Thing").unwrap().more_specific_types.contains("Person"));
}

#[tokio::test]
async fn test_unknown_label_not_found() {
    let cache = build(abc_graph(), clueless()).await.unwrap();
    assert_eq!(
        cache.get("NonexistentLabel"),
        Err(SchemaError::ConceptNotFound("NonexistentLabel".into()))
    );
}

#[tokio::test]
async fn test_label_listing_failure_is_fatal() {
    let graph = abc_graph();
    graph.fail(QueryKind::ListLabels);
    let result = build(graph.clone(), clueless()).await;
    assert!(matches!(result, Err(SchemaError::LabelListing(_))));
    assert_eq!(graph.calls(QueryKind::CountNodes), 0);
}

#[tokio::test]
async fn test_label_listing_timeout_is_fatal() {
    let graph = abc_graph();
    graph.delay(QueryKind::ListLabels, Duration::from_millis(500));
    let config = BuildConfig {
        query_timeout: Duration::from_millis(20),
        ..BuildConfig::default()
    };

    let result = ConceptCache::build(graph, clueless(), config).await;
    assert!(matches!(
        result,
        Err(SchemaError::LabelListing(QueryError::Timeout(_)))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_records() {
    let graph = InMemoryGraph::new();
    for i in 0..5 {
        graph.add_node(&["Concept", "Person"], &format!("Person {}", i));
    }
    graph.delay(QueryKind::CountNodes, Duration::from_millis(5));
    let graph = graph.into_shared();
    let builder = SnapshotBuilder::new(
        graph.clone(),
        fixed_order(&["Concept", "Person"]),
        BuildConfig::default(),
    );

    let cache = Arc::new(ConceptCache::empty());
    cache.rebuild(&builder).await.unwrap();

    let mut readers = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..200 {
                let person = cache.get("Person").unwrap();
                let concept = cache.get("Concept").unwrap();
                // A record is either from the first or the second build.
                assert!(person.instance_count == 5 || person.instance_count == 6);
                assert_eq!(person.example_instances.len() as u64, person.instance_count);
                assert!(concept.more_specific_types.contains("Person"));
                tokio::task::yield_now().await;
            }
        }));
    }

    graph.add_node(&["Concept", "Person"], "Person 5");
    cache.rebuild(&builder).await.unwrap();

    for reader in readers {
        reader.await.unwrap();
    }
    assert_eq!(cache.get("Person").unwrap().instance_count, 6);
}
