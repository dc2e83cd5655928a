//! Property-based tests for the distance function, medoid invariants, and
//! silhouette bounds, driven by randomly generated mixed-type populations.

use std::collections::HashSet;

use proptest::prelude::*;
use surveyclust_core::prelude::*;
use surveyclust_core::vector::FeatureCell;

fn schema() -> FeatureSchema {
    FeatureSchema::build(&[
        QuestionDef::numeric("spend", 0.0, 500.0),
        QuestionDef::ordinal("satisfaction", vec!["LOW".into(), "MEDIUM".into(), "HIGH".into()]),
        QuestionDef::categorical_single("plan", vec!["FREE".into(), "PRO".into(), "ENTERPRISE".into()]),
        QuestionDef::categorical_multi("channels", vec!["EMAIL".into(), "SMS".into(), "PUSH".into()]),
    ])
    .unwrap()
}

fn arb_vector() -> impl Strategy<Value = FeatureVector> {
    (
        0.0f64..500.0,
        0usize..3,
        prop::sample::select(vec!["FREE".to_string(), "PRO".to_string(), "ENTERPRISE".to_string()]),
        prop::collection::vec(
            prop::sample::select(vec!["EMAIL".to_string(), "SMS".to_string(), "PUSH".to_string()]),
            0..3,
        ),
    )
        .prop_map(|(spend, rank, plan, channels)| FeatureVector {
            user_id: "placeholder".to_string(),
            cells: vec![
                FeatureCell::Numeric(spend),
                FeatureCell::Ordinal(rank),
                FeatureCell::CategoricalSingle(plan),
                FeatureCell::CategoricalMulti(channels.into_iter().collect::<HashSet<_>>()),
            ],
        })
}

proptest! {
    #[test]
    fn distance_is_symmetric_for_arbitrary_mixed_vectors(a in arb_vector(), b in arb_vector()) {
        let schema = schema();
        let d_ab = surveyclust_core::vector_distance(&schema, &a, &b);
        let d_ba = surveyclust_core::vector_distance(&schema, &b, &a);
        prop_assert!((d_ab - d_ba).abs() < 1e-9);
    }

    #[test]
    fn distance_is_zero_on_diagonal(a in arb_vector()) {
        let schema = schema();
        let d = surveyclust_core::vector_distance(&schema, &a, &a);
        prop_assert!(d.abs() < 1e-9);
    }

    #[test]
    fn distance_is_finite_and_non_negative(a in arb_vector(), b in arb_vector()) {
        let schema = schema();
        let d = surveyclust_core::vector_distance(&schema, &a, &b);
        prop_assert!(d.is_finite());
        prop_assert!(d >= 0.0);
    }

    #[test]
    fn silhouette_is_always_bounded(
        values in prop::collection::vec(0.0f64..500.0, 4..30),
        k in 2usize..5,
    ) {
        let schema = FeatureSchema::build(&[QuestionDef::numeric("spend", 0.0, 500.0)]).unwrap();
        let n = values.len();
        let k = k.min(n);
        let vectors: Vec<FeatureVector> = values
            .iter()
            .enumerate()
            .map(|(i, v)| FeatureVector {
                user_id: format!("u{i}"),
                cells: vec![FeatureCell::Numeric(*v)],
            })
            .collect();
        let labels: Vec<usize> = (0..n).map(|i| i % k).collect();
        let score = surveyclust_core::clustering_silhouette(&schema, &vectors, &labels, k);
        prop_assert!(score.is_finite());
        prop_assert!((-1.0..=1.0).contains(&score));
    }
}

#[test]
fn medoid_centers_always_coincide_with_actual_respondents() {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use surveyclust_core::medoid;
    use surveyclust_core::seeding::seed_uniform;

    let schema = FeatureSchema::build(&[QuestionDef::numeric("spend", 0.0, 500.0)]).unwrap();
    let values = [5.0, 12.0, 8.0, 250.0, 260.0, 245.0, 490.0, 475.0];
    let vectors: Vec<FeatureVector> = values
        .iter()
        .enumerate()
        .map(|(i, v)| FeatureVector {
            user_id: format!("u{i}"),
            cells: vec![FeatureCell::Numeric(*v)],
        })
        .collect();

    for seed in 0..10u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let initial = seed_uniform(vectors.len(), 3, &mut rng);
        let run = medoid::run(&schema, &vectors, &initial, 50, || false);
        for &medoid_idx in &run.medoids {
            assert!(medoid_idx < vectors.len());
            // The medoid's cells must literally equal one input row's cells.
            let matches_some_input = vectors
                .iter()
                .any(|v| v.cells == vectors[medoid_idx].cells);
            assert!(matches_some_input);
        }
    }
}

#[test]
fn lloyd_categorical_single_center_is_the_majority_label() {
    use surveyclust_core::lloyd;

    let schema = FeatureSchema::build(&[QuestionDef::categorical_single(
        "plan",
        vec!["FREE".into(), "PRO".into(), "ENTERPRISE".into()],
    )])
    .unwrap();
    let labels = ["PRO", "PRO", "PRO", "FREE"];
    let vectors: Vec<FeatureVector> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| FeatureVector {
            user_id: format!("u{i}"),
            cells: vec![FeatureCell::CategoricalSingle(l.to_string())],
        })
        .collect();

    let run = lloyd::run(&schema, &vectors, &[0], 1, || false);
    match &run.centers[0][0] {
        FeatureCell::CategoricalSingle(label) => assert_eq!(label, "PRO"),
        other => panic!("expected categorical-single center, got {:?}", other),
    }
}

#[test]
fn cluster_composition_is_invariant_to_respondent_permutation() {
    use surveyclust_core::lloyd;

    let schema = FeatureSchema::build(&[QuestionDef::numeric("spend", 0.0, 100.0)]).unwrap();
    let values = [10.0, 12.0, 90.0, 88.0];
    let vectors: Vec<FeatureVector> = values
        .iter()
        .enumerate()
        .map(|(i, v)| FeatureVector {
            user_id: format!("u{i}"),
            cells: vec![FeatureCell::Numeric(*v)],
        })
        .collect();

    let run_a = lloyd::run(&schema, &vectors, &[0, 2], 50, || false);
    let mut group_a: Vec<HashSet<String>> = vec![HashSet::new(); 2];
    for (i, &label) in run_a.labels.iter().enumerate() {
        group_a[label].insert(vectors[i].user_id.clone());
    }

    // Reverse the population order; the schema and distance function are
    // row-order independent, so the induced *partition* (as sets of user
    // ids) should be identical regardless of input order.
    let mut reversed = vectors.clone();
    reversed.reverse();
    let run_b = lloyd::run(&schema, &reversed, &[0, 1], 50, || false);
    let mut group_b: Vec<HashSet<String>> = vec![HashSet::new(); 2];
    for (i, &label) in run_b.labels.iter().enumerate() {
        group_b[label].insert(reversed[i].user_id.clone());
    }

    let mut a_sorted = group_a;
    let mut b_sorted = group_b;
    a_sorted.sort_by_key(|g| g.iter().min().cloned());
    b_sorted.sort_by_key(|g| g.iter().min().cloned());
    assert_eq!(a_sorted, b_sorted);
}
