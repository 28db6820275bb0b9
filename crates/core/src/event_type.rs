//! Event type name grammar and declared scope shapes.
//!
//! Event type names are colon-delimited hierarchies such as
//! `project:pipeline:interactive-pipeline-run:succeeded`. The hierarchy
//! segments (all but the final verb) determine which scoping attributes
//! events of that type carry, unless an explicit shape is declared at
//! registration time.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of an event type name (mirrors the catalogue column).
pub const MAX_TYPE_NAME_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

/// Validate an event type name.
///
/// Rules:
/// - At least two colon-separated segments (hierarchy + verb).
/// - Every segment non-empty, lowercase alphanumeric or hyphen.
/// - Total length within [`MAX_TYPE_NAME_LENGTH`].
pub fn validate_type_name(name: &str) -> Result<(), CoreError> {
    if name.len() > MAX_TYPE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Event type name exceeds {MAX_TYPE_NAME_LENGTH} characters"
        )));
    }
    let segments: Vec<&str> = name.split(':').collect();
    if segments.len() < 2 {
        return Err(CoreError::Validation(format!(
            "Event type name '{name}' must have at least two colon-separated segments"
        )));
    }
    for segment in &segments {
        if segment.is_empty() {
            return Err(CoreError::Validation(format!(
                "Event type name '{name}' contains an empty segment"
            )));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(CoreError::Validation(format!(
                "Event type segment '{segment}' may only contain lowercase alphanumerics and hyphens"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ScopeShape
// ---------------------------------------------------------------------------

/// The scoping attributes that events of a given type carry.
///
/// Declared once at registration and immutable afterwards; the event store
/// and subscription registry validate every reference against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeShape {
    pub project: bool,
    pub pipeline: bool,
    pub job: bool,
    pub run: bool,
    pub build: bool,
    pub environment: bool,
}

impl ScopeShape {
    /// Derive the default shape from the hierarchy segments of a type name.
    ///
    /// The final segment is the verb (`created`, `succeeded`, ...) and
    /// contributes nothing. Unrecognised segments are permitted but do not
    /// add scope attributes.
    pub fn for_type_name(name: &str) -> Self {
        let mut shape = Self::default();
        let segments: Vec<&str> = name.split(':').collect();
        let hierarchy = &segments[..segments.len().saturating_sub(1)];

        for segment in hierarchy {
            match *segment {
                "project" => shape.project = true,
                "pipeline" => shape.pipeline = true,
                "job" | "one-off-job" | "cron-job" => shape.job = true,
                "run" | "pipeline-run" | "interactive-pipeline-run" => shape.run = true,
                "image-build" => shape.build = true,
                "environment" => shape.environment = true,
                _ => {}
            }
        }
        shape
    }

    /// True when events of this type carry no scoping attributes at all.
    pub fn is_unscoped(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- validate_type_name -------------------------------------------------

    #[test]
    fn valid_hierarchical_names() {
        assert!(validate_type_name("project:created").is_ok());
        assert!(validate_type_name("project:pipeline:interactive-pipeline-run:succeeded").is_ok());
        assert!(validate_type_name("project:cron-job:run:started").is_ok());
    }

    #[test]
    fn single_segment_rejected() {
        assert_matches!(
            validate_type_name("created"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn empty_segment_rejected() {
        assert_matches!(
            validate_type_name("project::started"),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_type_name("project:job:"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn uppercase_and_punctuation_rejected() {
        assert!(validate_type_name("Project:created").is_err());
        assert!(validate_type_name("project:job_run:started").is_err());
        assert!(validate_type_name("project:job run:started").is_err());
    }

    #[test]
    fn overlong_name_rejected() {
        let name = format!("project:{}:started", "a".repeat(MAX_TYPE_NAME_LENGTH));
        assert!(validate_type_name(&name).is_err());
    }

    // -- ScopeShape::for_type_name ------------------------------------------

    #[test]
    fn project_only_shape() {
        let shape = ScopeShape::for_type_name("project:created");
        assert!(shape.project);
        assert!(!shape.pipeline && !shape.job && !shape.run && !shape.build);
    }

    #[test]
    fn pipeline_run_shape() {
        let shape =
            ScopeShape::for_type_name("project:pipeline:interactive-pipeline-run:succeeded");
        assert!(shape.project);
        assert!(shape.pipeline);
        assert!(shape.run);
        assert!(!shape.job);
    }

    #[test]
    fn cron_job_run_shape() {
        let shape = ScopeShape::for_type_name("project:cron-job:run:started");
        assert!(shape.project);
        assert!(shape.job);
        assert!(shape.run);
    }

    #[test]
    fn image_build_shape() {
        let shape = ScopeShape::for_type_name("project:environment:image-build:failed");
        assert!(shape.project);
        assert!(shape.environment);
        assert!(shape.build);
    }

    #[test]
    fn verb_segment_does_not_scope() {
        // "project" as the final segment is a verb position, not hierarchy.
        let shape = ScopeShape::for_type_name("something:project");
        assert!(!shape.project);
        assert!(shape.is_unscoped());
    }
}
