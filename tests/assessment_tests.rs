mod common;

use common::{annotate, config, mistake};
use gradekit::{
    Annotation, AnnotationError, AnnotationSource, Assessment, AssessmentError, ConfigError,
    Location, RenderOptions, TestResult,
};

fn tests() -> Vec<TestResult> {
    vec![TestResult {
        id:          Some(1),
        test_name:   "compiles".to_string(),
        score:       10.0,
        detail_text: Some("ok".to_string()),
    }]
}

#[test]
fn exercise_must_be_allowed() {
    let err = Assessment::new(config(), 7, 20.0, tests()).expect_err("exercise 7 not allowed");
    assert!(matches!(
        err,
        AssessmentError::Config(ConfigError::ExerciseNotAllowed { exercise_id: 7, .. })
    ));
}

#[test]
fn annotations_are_added_and_removed() {
    let config = config();
    let naming = mistake(&config, "naming").id();
    let custom = mistake(&config, "custom").id();
    let mut assessment = Assessment::new(config, 42, 20.0, tests()).expect("assessment");

    let first = assessment
        .add_predefined_annotation(
            naming,
            Location::line("src/Main.java", 3),
            None,
            AnnotationSource::ManualFirstRound,
        )
        .expect("predefined")
        .id()
        .to_string();
    assessment
        .add_custom_annotation(
            custom,
            Location::line("src/Main.java", 9),
            "Off by one".to_string(),
            -2.0,
            AnnotationSource::ManualSecondRound,
        )
        .expect("custom");
    assessment
        .add_tool_annotation(
            naming,
            Location::line("src/Util.java", 1),
            Some("Use camelCase".to_string()),
            vec!["checkstyle".to_string()],
            Some(4),
        )
        .expect("tool");

    assert_eq!(assessment.annotations().len(), 3);
    assert_eq!(assessment.annotations_for(naming).count(), 2);
    assert_eq!(assessment.calculate_points_for_mistake_type(naming).value(), -1.0);
    assert_eq!(assessment.calculate_total_points(), 7.0);

    let removed = assessment.remove_annotation(&first).expect("remove");
    assert_eq!(removed.id(), first);
    assert_eq!(assessment.annotations().len(), 2);
    assert_eq!(assessment.calculate_total_points(), 7.5);

    assert_eq!(
        assessment.remove_annotation(&first),
        Err(AnnotationError::NotFound(first.clone()))
    );
}

#[test]
fn invalid_annotations_are_rejected() {
    let config = config();
    let naming = mistake(&config, "naming").id();
    let custom = mistake(&config, "custom").id();
    let mut assessment = Assessment::new(config, 43, 20.0, Vec::new()).expect("assessment");

    assert_eq!(
        assessment
            .add_custom_annotation(
                custom,
                Location::line("A.java", 0),
                "Nice".to_string(),
                1.0,
                AnnotationSource::ManualFirstRound,
            )
            .map(|annotation| annotation.id().to_string()),
        Err(AnnotationError::PositiveScoreNotAllowed(1.0))
    );
    assert_eq!(
        assessment
            .add_predefined_annotation(
                custom,
                Location::line("A.java", 0),
                None,
                AnnotationSource::ManualFirstRound,
            )
            .map(|annotation| annotation.id().to_string()),
        Err(AnnotationError::MissingCustomScore("custom".to_string()))
    );
    assert_eq!(
        assessment
            .add_custom_annotation(
                naming,
                Location::line("A.java", 0),
                "Bad".to_string(),
                -1.0,
                AnnotationSource::ManualFirstRound,
            )
            .map(|annotation| annotation.id().to_string()),
        Err(AnnotationError::UnexpectedCustomScore("naming".to_string()))
    );
    assert!(assessment.annotations().is_empty());
}

#[test]
fn built_annotations_can_be_added() {
    let config = config();
    let annotation = annotate(&config, "wrongOutput", "src/Main.java", 4);
    let mut assessment = Assessment::new(config, 42, 20.0, tests()).expect("assessment");
    let id = assessment
        .add_annotation(annotation.clone())
        .expect("add")
        .id()
        .to_string();
    assert_eq!(id, annotation.id());
    assert_eq!(assessment.calculate_total_points(), 8.0);
}

#[test]
fn rendered_feedback_reopens_the_assessment() -> anyhow::Result<()> {
    let config = config();
    let naming = mistake(&config, "naming").id();
    let wrong_output = mistake(&config, "wrongOutput").id();
    let mut assessment = Assessment::new(config.clone(), 42, 20.0, tests()).expect("assessment");
    for line in 0..3 {
        assessment
            .add_predefined_annotation(
                naming,
                Location::line("src/Main.java", line),
                None,
                AnnotationSource::ManualFirstRound,
            )
            .expect("naming");
    }
    assessment
        .add_predefined_annotation(
            wrong_output,
            Location::line("src/Main.java", 10),
            Some("Prints 4 instead of 5".to_string()),
            AnnotationSource::Review,
        )
        .expect("wrong output");

    let rendered = assessment.render(&RenderOptions::default())?;
    assert_eq!(rendered.total, assessment.calculate_total_points());
    assert_eq!(rendered.total, 6.5);

    let reopened = Assessment::from_feedback(config, 42, 20.0, &rendered.items)?;
    assert_eq!(reopened.annotations(), assessment.annotations());
    assert_eq!(reopened.test_results().len(), 1);
    assert_eq!(reopened.test_results()[0].test_name, "compiles");
    assert_eq!(reopened.test_results()[0].score, 10.0);
    assert_eq!(reopened.test_results()[0].detail_text.as_deref(), Some("ok"));
    assert_eq!(reopened.calculate_total_points(), assessment.calculate_total_points());
    Ok(())
}

#[test]
fn summary_follows_the_options_locale() {
    let config = config();
    let naming = mistake(&config, "naming").id();
    let mut assessment = Assessment::new(config, 42, 20.0, Vec::new()).expect("assessment");
    assessment
        .add_predefined_annotation(
            naming,
            Location::line("src/Main.java", 0),
            None,
            AnnotationSource::ManualFirstRound,
        )
        .expect("naming");

    let rows = assessment.summary(&RenderOptions::default().with_locale(gradekit::Locale::De));
    assert_eq!(rows[1].name, "Codequalität");
    assert_eq!(rows[1].points, "-0.5P");
    assert_eq!(rows[2].name, "Codequalität > Documentation");
}

#[test]
fn non_finite_custom_scores_are_rejected() {
    let config = config();
    let built = Annotation::builder()
        .mistake_type(mistake(&config, "custom"))
        .location(Location::line("src/Main.java", 1))
        .custom_message("Broken")
        .custom_score(f64::NAN)
        .build();
    assert!(matches!(built, Err(AnnotationError::NonFiniteScore(score)) if score.is_nan()));

    let custom = mistake(&config, "custom").id();
    let mut assessment = Assessment::new(config, 42, 20.0, tests()).expect("assessment");
    for score in [f64::NAN, f64::NEG_INFINITY] {
        let added = assessment
            .add_custom_annotation(
                custom,
                Location::line("src/Main.java", 2),
                "Broken".to_string(),
                score,
                AnnotationSource::ManualFirstRound,
            )
            .map(|annotation| annotation.id().to_string());
        assert!(matches!(
            added,
            Err(AnnotationError::NonFiniteScore(rejected)) if rejected.to_bits() == score.to_bits()
        ));
    }
    assert!(assessment.annotations().is_empty());
    assert_eq!(assessment.calculate_total_points(), 10.0);
}

#[test]
fn handles_of_another_config_are_rejected() {
    let config = config();
    let other = common::config();
    let foreign = annotate(&other, "wrongOutput", "src/Main.java", 4);
    let foreign_naming = mistake(&other, "naming").id();
    let mut assessment = Assessment::new(config.clone(), 42, 20.0, tests()).expect("assessment");

    assert!(matches!(
        assessment.add_annotation(foreign.clone()).map(|a| a.id().to_string()),
        Err(AnnotationError::UnknownMistakeType(_))
    ));
    assert!(matches!(
        assessment
            .add_predefined_annotation(
                foreign_naming,
                Location::line("src/Main.java", 1),
                None,
                AnnotationSource::ManualFirstRound,
            )
            .map(|a| a.id().to_string()),
        Err(AnnotationError::UnknownMistakeType(_))
    ));
    assert!(assessment.annotations().is_empty());
    assert_eq!(assessment.calculate_points_for_mistake_type(foreign_naming).value(), 0.0);

    let rendered = gradekit::feedback::render_feedback(
        &config,
        &[foreign],
        &tests(),
        20.0,
        &RenderOptions::default(),
    );
    assert!(matches!(
        rendered,
        Err(AssessmentError::Annotation(AnnotationError::UnknownMistakeType(_)))
    ));
}

#[test]
fn reopened_test_results_keep_their_ids() -> anyhow::Result<()> {
    let config = config();
    let assessment = Assessment::new(config.clone(), 42, 20.0, tests()).expect("assessment");
    let rendered = assessment.render(&RenderOptions::default())?;
    assert_eq!(rendered.items[0].id, Some(1));

    let json = serde_json::to_string(&rendered.items)?;
    let items: Vec<gradekit::FeedbackItem> = serde_json::from_str(&json)?;
    let reopened = Assessment::from_feedback(config, 42, 20.0, &items)?;
    assert_eq!(reopened.test_results(), tests().as_slice());
    Ok(())
}
