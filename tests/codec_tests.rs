mod common;

use common::{annotate, classified, config, custom, mistake};
use gradekit::{
    Annotation, FeedbackItem, FeedbackType, GradingConfig, LineColumn, Location, MappingError,
    Visibility,
    feedback::{CLIENT_DATA_TEXT, deserialize_annotations, serialize_annotations},
};

fn mixed(config: &GradingConfig) -> Vec<Annotation> {
    let with_columns = Annotation::builder()
        .mistake_type(mistake(config, "missingJavadoc"))
        .location(
            Location::new("src/Main.java", LineColumn::at(3, 4), LineColumn::at(5, 1))
                .expect("location"),
        )
        .id("javadoc-1")
        .custom_message("Document the parameters")
        .build()
        .expect("annotation");
    let limited = Annotation::builder()
        .mistake_type(mistake(config, "naming"))
        .location(Location::line("src/util/Io.java", 12))
        .classifiers(vec!["checkstyle".to_string(), "naming".to_string()])
        .display_limit(3)
        .build()
        .expect("annotation");

    vec![
        with_columns,
        annotate(config, "wrongOutput", "src/Main.java", 20),
        custom(config, "src/Main.java", 7, "Off by one", -1.5),
        classified(config, "src/Main.java", 8, &["pmd"], Some("Rename this")),
        limited,
    ]
}

#[test]
fn annotations_survive_a_round_trip() -> anyhow::Result<()> {
    let config = config();
    let annotations = mixed(&config);

    let items = serialize_annotations(&annotations, &config, 5000)?;
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.feedback_type, FeedbackType::ManualUnreferenced);
    assert_eq!(item.visibility, Visibility::Never);
    assert_eq!(item.text.as_deref(), Some(CLIENT_DATA_TEXT));
    assert_eq!(item.credits, 0.0);

    let restored = deserialize_annotations(&items, &config)?;
    assert_eq!(restored, annotations);
    Ok(())
}

#[test]
fn round_trip_through_the_platform_format() -> anyhow::Result<()> {
    let config = config();
    let annotations = mixed(&config);
    let items = serialize_annotations(&annotations, &config, 5000)?;

    let json = serde_json::to_string(&items)?;
    assert!(json.contains("\"type\":\"MANUAL_UNREFERENCED\""));
    assert!(json.contains("\"visibility\":\"NEVER\""));
    assert!(json.contains("\"detailText\""));

    let decoded: Vec<FeedbackItem> = serde_json::from_str(&json)?;
    assert_eq!(deserialize_annotations(&decoded, &config)?, annotations);
    Ok(())
}

#[test]
fn large_sets_are_split_across_items() {
    let config = config();
    let annotations = (0..40)
        .map(|line| classified(&config, "src/main/java/edu/kit/Main.java", line, &["pmd"], None))
        .collect::<Vec<_>>();

    let items = serialize_annotations(&annotations, &config, 800).expect("serialize");
    assert!(items.len() > 1, "expected several items, got {}", items.len());
    for item in &items {
        let payload = item.detail_text.as_deref().expect("payload");
        assert!(payload.chars().count() <= 800);
    }

    let restored = deserialize_annotations(&items, &config).expect("deserialize");
    assert_eq!(restored, annotations);
}

#[test]
fn no_annotations_emit_no_items() {
    let config = config();
    let items = serialize_annotations(&[], &config, 5000).expect("serialize");
    assert!(items.is_empty());
    assert!(deserialize_annotations(&items, &config).expect("deserialize").is_empty());
}

#[test]
fn single_oversized_annotation_is_rejected() {
    let config = config();
    let huge = custom(&config, "src/Main.java", 1, &"z".repeat(1000), -1.0);
    let id = huge.id().to_string();

    match serialize_annotations(&[huge], &config, 200) {
        Err(MappingError::AnnotationTooLarge { annotation, size, limit }) => {
            assert_eq!(annotation, id);
            assert!(size > 1000);
            assert_eq!(limit, 200);
        }
        other => panic!("expected AnnotationTooLarge, got {other:?}"),
    }
}

#[test]
fn unknown_mistake_type_is_reported() {
    let config = config();
    let items = serialize_annotations(
        &[annotate(&config, "naming", "src/Main.java", 1)],
        &config,
        5000,
    )
    .expect("serialize");

    let other = GradingConfig::from_json(
        r#"{
            "shortName": "other",
            "ratingGroups": [{ "shortName": "g", "negativeLimit": -1 }],
            "mistakeTypes": [{
                "shortName": "wrongOutput",
                "appliesTo": "g",
                "penaltyRule": { "shortName": "stackingPenalty", "penalty": 1 }
            }]
        }"#,
    )
    .expect("config");

    match deserialize_annotations(&items, &other) {
        Err(MappingError::MismatchedGradingConfig { mistake_type, .. }) => {
            assert_eq!(mistake_type, "naming");
        }
        other => panic!("expected MismatchedGradingConfig, got {other:?}"),
    }
}

#[test]
fn corrupt_payloads_are_reported() {
    let config = config();
    let item = |payload: &str| {
        FeedbackItem::builder()
            .visibility(Visibility::Never)
            .text(CLIENT_DATA_TEXT)
            .detail_text(payload)
            .build()
    };

    let garbage = deserialize_annotations(&[item("not json")], &config);
    assert!(matches!(garbage, Err(MappingError::Corrupt(_))));

    let inverted = deserialize_annotations(
        &[item(r#"[{"i":"x","t":"naming","f":"A.java","sl":5,"el":2}]"#)],
        &config,
    );
    assert!(matches!(inverted, Err(MappingError::Corrupt(_))));

    let missing_score = deserialize_annotations(
        &[item(r#"[{"i":"x","t":"custom","f":"A.java","sl":1,"el":1}]"#)],
        &config,
    );
    assert!(matches!(missing_score, Err(MappingError::Corrupt(_))));

    let no_payload = FeedbackItem::builder().text(CLIENT_DATA_TEXT).build();
    assert!(matches!(
        deserialize_annotations(&[no_payload], &config),
        Err(MappingError::Corrupt(_))
    ));
}

#[test]
fn other_items_are_ignored() {
    let config = config();
    let items = vec![
        FeedbackItem::builder()
            .feedback_type(FeedbackType::Automatic)
            .text("compiles")
            .credits(5.0)
            .build(),
        FeedbackItem::builder()
            .text(CLIENT_DATA_TEXT)
            .detail_text(r#"[{"i":"kept","t":"naming","f":"A.java","sl":1,"el":1,"o":"TOOL"}]"#)
            .build(),
    ];

    let restored = deserialize_annotations(&items, &config).expect("deserialize");
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].id(), "kept");
    assert_eq!(restored[0].source(), gradekit::AnnotationSource::Tool);
}

#[test]
fn custom_scores_keep_every_bit() -> anyhow::Result<()> {
    let config = config();
    // Deterministic spread of scores in [-10, 0) without short decimal forms.
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut scores = vec![-1.949_793_202_864_741_3, -0.1 - 0.2, -1.0 / 3.0];
    for _ in 0..200 {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        scores.push(-10.0 * ((state >> 11) as f64 / (1u64 << 53) as f64));
    }

    let annotations = scores
        .iter()
        .enumerate()
        .map(|(line, score)| custom(&config, "src/Main.java", line as u32, "Odd", *score))
        .collect::<Vec<_>>();

    let items = serialize_annotations(&annotations, &config, 5000)?;
    let json = serde_json::to_string(&items)?;
    let decoded: Vec<FeedbackItem> = serde_json::from_str(&json)?;
    let restored = deserialize_annotations(&decoded, &config)?;

    assert_eq!(restored.len(), scores.len());
    for (annotation, score) in restored.iter().zip(&scores) {
        assert_eq!(annotation.custom_score().map(f64::to_bits), Some(score.to_bits()));
    }
    assert_eq!(restored, annotations);
    Ok(())
}
