#![allow(dead_code)]

use std::sync::Once;

use gradekit::{Annotation, AnnotationSource, GradingConfig, Location, MistakeType};
use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// Installs a test subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn config() -> GradingConfig {
    init_tracing();
    GradingConfig::from_json(include_str!("../fixtures/grading_config.json"))
        .expect("fixture config")
}

pub fn mistake<'a>(config: &'a GradingConfig, name: &str) -> &'a MistakeType {
    config
        .mistake_type_by_name(name)
        .unwrap_or_else(|| panic!("fixture has no mistake type `{name}`"))
}

pub fn annotate(config: &GradingConfig, name: &str, path: &str, line: u32) -> Annotation {
    Annotation::builder()
        .mistake_type(mistake(config, name))
        .location(Location::line(path, line))
        .build()
        .expect("predefined annotation")
}

pub fn annotate_n(config: &GradingConfig, name: &str, n: u32) -> Vec<Annotation> {
    (0..n)
        .map(|line| annotate(config, name, "src/Main.java", line))
        .collect()
}

pub fn custom(config: &GradingConfig, path: &str, line: u32, message: &str, score: f64) -> Annotation {
    Annotation::builder()
        .mistake_type(mistake(config, "custom"))
        .location(Location::line(path, line))
        .custom_message(message)
        .custom_score(score)
        .build()
        .expect("custom annotation")
}

pub fn classified(
    config: &GradingConfig,
    path: &str,
    line: u32,
    classifiers: &[&str],
    message: Option<&str>,
) -> Annotation {
    Annotation::builder()
        .mistake_type(mistake(config, "naming"))
        .location(Location::line(path, line))
        .maybe_custom_message(message)
        .source(AnnotationSource::Tool)
        .classifiers(classifiers.iter().map(|c| c.to_string()).collect())
        .build()
        .expect("classified annotation")
}
