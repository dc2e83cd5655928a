//! End-to-end scenarios exercising the full `sweep()` driver against small,
//! hand-built populations with known expected structure.

use surveyclust_core::prelude::*;

fn survey_of_numeric(values: &[f64]) -> (Vec<String>, Vec<QuestionDef>, Vec<RespondentRecord>) {
    let ids = vec!["spend".to_string()];
    let questions = vec![QuestionDef::numeric("spend", 0.0, 1000.0)];
    let respondents = values
        .iter()
        .enumerate()
        .map(|(i, v)| RespondentRecord::new(format!("u{i}"), vec![Answer::new("spend", AnswerValue::Number(*v))]))
        .collect();
    (ids, questions, respondents)
}

/// S1: two well-separated numeric clusters, LLOYD, k=2 -> clean split with
/// high silhouette.
#[test]
fn s1_two_clean_clusters_lloyd_k2() {
    let (ids, questions, respondents) = survey_of_numeric(&[10.0, 14.0, 9.0, 800.0, 812.0, 790.0]);
    let resolver = OrderedResolver::new("survey-1", &ids);
    let results = sweep("survey-1", &respondents, &questions, &resolver, AlgorithmTag::Lloyd, 2, 100).unwrap();

    let r = &results[0];
    assert_eq!(r.k, 2);
    assert!(r.silhouette > 0.8, "expected a clean split, got silhouette={}", r.silhouette);
    assert_eq!(r.groups.values().map(|g| g.len()).sum::<usize>(), 6);
    assert_eq!(r.groups.len(), 2);
}

/// S2: a single-respondent cluster forced by k equal to respondent count.
#[test]
fn s2_singleton_categorical_single_cluster() {
    let ids = vec!["plan".to_string()];
    let questions = vec![QuestionDef::categorical_single("plan", vec!["FREE".into(), "PRO".into()])];
    let respondents = vec![
        RespondentRecord::new("u0", vec![Answer::new("plan", AnswerValue::Label("FREE".into()))]),
        RespondentRecord::new("u1", vec![Answer::new("plan", AnswerValue::Label("FREE".into()))]),
        RespondentRecord::new("u2", vec![Answer::new("plan", AnswerValue::Label("PRO".into()))]),
    ];
    let resolver = OrderedResolver::new("survey-2", &ids);
    let results = sweep("survey-2", &respondents, &questions, &resolver, AlgorithmTag::Lloyd, 3, 100).unwrap();

    // k=3 with 3 respondents forces one cluster per respondent.
    let r = results.iter().find(|r| r.k == 3).unwrap();
    assert_eq!(r.groups.len(), 3);
    assert!(r.groups.values().all(|g| g.len() == 1));
}

/// S3: identical points collapse to a single well-defined cluster at k=1
/// (not swept by `sweep`, which starts at k=2, but silhouette/medoid cores
/// must still behave sanely when every row is identical).
#[test]
fn s3_identical_points_single_cluster_via_medoid_core() {
    use surveyclust_core::medoid;

    let schema = FeatureSchema::build(&[QuestionDef::numeric("spend", 0.0, 100.0)]).unwrap();
    let vectors: Vec<FeatureVector> = (0..5)
        .map(|i| FeatureVector {
            user_id: format!("u{i}"),
            cells: vec![surveyclust_core::vector::FeatureCell::Numeric(42.0)],
        })
        .collect();
    let run = medoid::run(&schema, &vectors, &[0], 10, || false);
    assert!(run.labels.iter().all(|&l| l == 0));
}

/// S4: mixed-type population, MEDOID, k=2.
#[test]
fn s4_mixed_type_medoid_k2() {
    let ids = vec!["spend".to_string(), "satisfaction".to_string(), "plan".to_string(), "channels".to_string()];
    let questions = vec![
        QuestionDef::numeric("spend", 0.0, 1000.0),
        QuestionDef::ordinal("satisfaction", vec!["LOW".into(), "MEDIUM".into(), "HIGH".into()]),
        QuestionDef::categorical_single("plan", vec!["FREE".into(), "PRO".into()]),
        QuestionDef::categorical_multi("channels", vec!["EMAIL".into(), "SMS".into()]),
    ];
    let low_group: Vec<RespondentRecord> = (0..4)
        .map(|i| {
            RespondentRecord::new(
                format!("low{i}"),
                vec![
                    Answer::new("spend", AnswerValue::Number(10.0 + i as f64)),
                    Answer::new("satisfaction", AnswerValue::Label("LOW".into())),
                    Answer::new("plan", AnswerValue::Label("FREE".into())),
                    Answer::new("channels", AnswerValue::Set(vec!["EMAIL".into()])),
                ],
            )
        })
        .collect();
    let high_group: Vec<RespondentRecord> = (0..4)
        .map(|i| {
            RespondentRecord::new(
                format!("high{i}"),
                vec![
                    Answer::new("spend", AnswerValue::Number(900.0 + i as f64)),
                    Answer::new("satisfaction", AnswerValue::Label("HIGH".into())),
                    Answer::new("plan", AnswerValue::Label("PRO".into())),
                    Answer::new("channels", AnswerValue::Set(vec!["SMS".into()])),
                ],
            )
        })
        .collect();
    let mut respondents = low_group;
    respondents.extend(high_group);

    let resolver = OrderedResolver::new("survey-4", &ids);
    let results = sweep("survey-4", &respondents, &questions, &resolver, AlgorithmTag::Medoid, 2, 100).unwrap();
    let r = &results[0];
    assert_eq!(r.k, 2);
    assert!(r.silhouette > 0.5, "expected separated mixed-type clusters, got {}", r.silhouette);

    for group in r.groups.values() {
        let all_low = group.iter().all(|id| id.starts_with("low"));
        let all_high = group.iter().all(|id| id.starts_with("high"));
        assert!(all_low || all_high, "group mixed low/high respondents: {:?}", group);
    }
}

/// S5: reproducibility — same inputs, same seed, same result.
#[test]
fn s5_sweep_is_reproducible() {
    let (ids, questions, respondents) = survey_of_numeric(&[5.0, 6.0, 7.0, 500.0, 501.0, 502.0]);
    let resolver = OrderedResolver::new("survey-5", &ids);

    let a = sweep("survey-5", &respondents, &questions, &resolver, AlgorithmTag::SeededLloyd, 2, 100).unwrap();
    let b = sweep("survey-5", &respondents, &questions, &resolver, AlgorithmTag::SeededLloyd, 2, 100).unwrap();

    assert_eq!(a.len(), b.len());
    for (ra, rb) in a.iter().zip(b.iter()) {
        assert_eq!(ra.k, rb.k);
        assert_eq!(ra.silhouette, rb.silhouette);
        assert_eq!(ra.seed, rb.seed);
    }
}

/// S6: k_max greater than the respondent count is clamped, not rejected; an
/// out-of-range k_max below 2 is a hard error.
#[test]
fn s6_k_max_clamped_or_rejected() {
    let (ids, questions, respondents) = survey_of_numeric(&[1.0, 2.0, 3.0]);
    let resolver = OrderedResolver::new("survey-6", &ids);

    let clamped = sweep("survey-6", &respondents, &questions, &resolver, AlgorithmTag::Lloyd, 50, 100).unwrap();
    assert_eq!(clamped.last().unwrap().k, 3);

    let rejected = sweep("survey-6", &respondents, &questions, &resolver, AlgorithmTag::Lloyd, 1, 100);
    assert!(matches!(rejected, Err(EngineError::InvalidParameters(_))));
}

/// S7: a respondent who skipped a question gets that column imputed rather
/// than excluded from clustering.
#[test]
fn s7_missing_answers_are_imputed_not_dropped() {
    let ids = vec!["spend".to_string()];
    let questions = vec![QuestionDef::numeric("spend", 0.0, 100.0)];
    let respondents = vec![
        RespondentRecord::new("u0", vec![Answer::new("spend", AnswerValue::Number(10.0))]),
        RespondentRecord::new("u1", vec![Answer::new("spend", AnswerValue::Number(12.0))]),
        RespondentRecord::new("u2", vec![]), // skipped the question entirely
        RespondentRecord::new("u3", vec![Answer::new("spend", AnswerValue::Number(90.0))]),
    ];
    let resolver = OrderedResolver::new("survey-7", &ids);
    let results = sweep("survey-7", &respondents, &questions, &resolver, AlgorithmTag::Lloyd, 2, 100).unwrap();

    let total_clustered: usize = results[0].groups.values().map(|g| g.len()).sum();
    assert_eq!(total_clustered, 4, "respondent with missing answer must still be clustered");
}
