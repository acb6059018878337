#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::{
    annotation::{Annotation, AnnotationSource, Location},
    config::{GradingConfig, MistakeType, MistakeTypeId, RatingGroupId},
    error::{AnnotationError, AssessmentError},
    feedback::{FeedbackItem, FeedbackType, RenderedAssessment, codec, render_feedback},
    points::Points,
    scoring::{self, RatingGroupSummary, TestResult},
    settings::RenderOptions,
};

/// One in-progress assessment of a submission.
///
/// The assessment exclusively owns its annotation list; all mutation goes
/// through `&mut self`.
#[derive(Debug, Clone)]
pub struct Assessment {
    /// Grading config the annotations refer to.
    config:       GradingConfig,
    /// Maximum points of the exercise.
    max_points:   f64,
    /// Current annotations, in creation order.
    annotations:  Vec<Annotation>,
    /// Automatic test results.
    test_results: Vec<TestResult>,
}

impl Assessment {
    /// Starts an empty assessment of `exercise_id`.
    ///
    /// Fails if the config is not meant for that exercise.
    pub fn new(
        config: GradingConfig,
        exercise_id: i64,
        max_points: f64,
        test_results: Vec<TestResult>,
    ) -> Result<Self, AssessmentError> {
        config.check_exercise(exercise_id)?;
        Ok(Self {
            config,
            max_points,
            annotations: Vec::new(),
            test_results,
        })
    }

    /// Reopens an assessment from the feedback items of a previous round.
    ///
    /// Test results are taken from the automatic items, annotations from the
    /// client data items.
    pub fn from_feedback(
        config: GradingConfig,
        exercise_id: i64,
        max_points: f64,
        items: &[FeedbackItem],
    ) -> Result<Self, AssessmentError> {
        config.check_exercise(exercise_id)?;
        let annotations = codec::deserialize_annotations(items, &config)?;
        let test_results = items
            .iter()
            .filter(|item| item.feedback_type == FeedbackType::Automatic)
            .map(|item| {
                if item.has_long_text && item.detail_text.is_none() {
                    tracing::warn!(
                        "Long feedback text of test `{}` was not fetched",
                        item.test_case.as_deref().unwrap_or_default()
                    );
                }
                TestResult {
                    id:          item.id,
                    test_name:   item
                        .test_case
                        .clone()
                        .or_else(|| item.text.clone())
                        .unwrap_or_default(),
                    score:       item.credits,
                    detail_text: item.detail_text.clone(),
                }
            })
            .collect();

        tracing::info!("Reloaded assessment with {} annotations", annotations.len());
        Ok(Self {
            config,
            max_points,
            annotations,
            test_results,
        })
    }

    /// Returns the grading config.
    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Returns the maximum points of the exercise.
    pub fn max_points(&self) -> f64 {
        self.max_points
    }

    /// Returns all annotations in creation order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns the annotations of one mistake type.
    pub fn annotations_for(
        &self,
        mistake_type: MistakeTypeId,
    ) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |annotation| annotation.mistake_type() == mistake_type)
    }

    /// Returns the automatic test results.
    pub fn test_results(&self) -> &[TestResult] {
        &self.test_results
    }

    /// Adds an annotation of a predefined (non-custom) mistake type.
    pub fn add_predefined_annotation(
        &mut self,
        mistake_type: MistakeTypeId,
        location: Location,
        custom_message: Option<String>,
        source: AnnotationSource,
    ) -> Result<&Annotation, AnnotationError> {
        let mistake_type = self.resolve(mistake_type)?;
        let annotation = Annotation::builder()
            .mistake_type(mistake_type)
            .location(location)
            .maybe_custom_message(custom_message)
            .source(source)
            .build()?;
        Ok(self.push(annotation))
    }

    /// Adds an annotation of a custom mistake type with its own score.
    ///
    /// Positive scores are rejected unless the config allows positive
    /// feedback.
    pub fn add_custom_annotation(
        &mut self,
        mistake_type: MistakeTypeId,
        location: Location,
        custom_message: String,
        custom_score: f64,
        source: AnnotationSource,
    ) -> Result<&Annotation, AnnotationError> {
        if custom_score > 0.0 && !self.config.positive_feedback_allowed() {
            return Err(AnnotationError::PositiveScoreNotAllowed(custom_score));
        }
        let mistake_type = self.resolve(mistake_type)?;
        let annotation = Annotation::builder()
            .mistake_type(mistake_type)
            .location(location)
            .custom_message(custom_message)
            .custom_score(custom_score)
            .source(source)
            .build()?;
        Ok(self.push(annotation))
    }

    /// Adds an annotation produced by an automatic checker.
    pub fn add_tool_annotation(
        &mut self,
        mistake_type: MistakeTypeId,
        location: Location,
        custom_message: Option<String>,
        classifiers: Vec<String>,
        display_limit: Option<usize>,
    ) -> Result<&Annotation, AnnotationError> {
        let mistake_type = self.resolve(mistake_type)?;
        let annotation = Annotation::builder()
            .mistake_type(mistake_type)
            .location(location)
            .maybe_custom_message(custom_message)
            .source(AnnotationSource::Tool)
            .classifiers(classifiers)
            .maybe_display_limit(display_limit)
            .build()?;
        Ok(self.push(annotation))
    }

    /// Adds an already constructed annotation, e.g. one built with
    /// [`Annotation::builder`].
    pub fn add_annotation(
        &mut self,
        annotation: Annotation,
    ) -> Result<&Annotation, AnnotationError> {
        self.resolve(annotation.mistake_type())?;
        if let Some(score) = annotation.custom_score()
            && score > 0.0
            && !self.config.positive_feedback_allowed()
        {
            return Err(AnnotationError::PositiveScoreNotAllowed(score));
        }
        Ok(self.push(annotation))
    }

    /// Removes the annotation with `id` and returns it.
    pub fn remove_annotation(&mut self, id: &str) -> Result<Annotation, AnnotationError> {
        let index = self
            .annotations
            .iter()
            .position(|annotation| annotation.id() == id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;
        Ok(self.annotations.remove(index))
    }

    /// Points of one mistake type.
    pub fn calculate_points_for_mistake_type(&self, mistake_type: MistakeTypeId) -> Points {
        scoring::calculate_points_for_mistake_type(&self.config, mistake_type, &self.annotations)
    }

    /// Points of one rating group, clamped into its range.
    pub fn calculate_points_for_rating_group(&self, group: RatingGroupId) -> Points {
        scoring::calculate_points_for_rating_group(&self.config, group, &self.annotations)
    }

    /// Total score in `[0, max_points]`.
    pub fn calculate_total_points(&self) -> f64 {
        scoring::calculate_total_score(
            &self.config,
            &self.annotations,
            &self.test_results,
            self.max_points,
        )
    }

    /// Per-rating-group overview.
    pub fn summary(&self, options: &RenderOptions) -> Vec<RatingGroupSummary> {
        scoring::summarize(&self.config, &self.annotations, options.locale())
    }

    /// Renders the feedback items to upload.
    pub fn render(&self, options: &RenderOptions) -> Result<RenderedAssessment, AssessmentError> {
        render_feedback(
            &self.config,
            &self.annotations,
            &self.test_results,
            self.max_points,
            options,
        )
    }

    /// Resolves a mistake type handle against this assessment's config.
    fn resolve(&self, mistake_type: MistakeTypeId) -> Result<&MistakeType, AnnotationError> {
        self.config
            .mistake_type(mistake_type)
            .ok_or_else(|| AnnotationError::UnknownMistakeType(format!("{mistake_type:?}")))
    }

    /// Appends an annotation and returns a reference to it.
    fn push(&mut self, annotation: Annotation) -> &Annotation {
        tracing::debug!(
            "Adding annotation {} of `{}`",
            annotation.id(),
            self.config
                .mistake_type(annotation.mistake_type())
                .map_or("?", |m| m.short_name())
        );
        self.annotations.push(annotation);
        &self.annotations[self.annotations.len() - 1]
    }
}
