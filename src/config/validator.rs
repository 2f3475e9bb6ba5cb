use crate::config::Config;
use crate::error::{ChunkfoldError, Result, ValidationError};
use crate::retrieval::FieldPath;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_merge(config, &mut errors);
        Self::validate_output(config, &mut errors);
        Self::validate_profiles(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ChunkfoldError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_merge(config: &Config, errors: &mut Vec<ValidationError>) {
        // An empty field is allowed and simply disables merging
        Self::validate_source_field("merge.source_field", &config.merge.source_field, errors);
    }

    fn validate_output(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.output.preview_chars == 0 {
            errors.push(ValidationError::new(
                "output.preview_chars",
                "Preview width must be greater than 0",
            ));
        }
    }

    fn validate_profiles(config: &Config, errors: &mut Vec<ValidationError>) {
        for (name, overrides) in &config.profiles {
            if let Some(field) = &overrides.source_field {
                Self::validate_source_field(
                    &format!("profiles.{}.source_field", name),
                    field,
                    errors,
                );
            }
        }
    }

    fn validate_source_field(key: &str, field: &str, errors: &mut Vec<ValidationError>) {
        if let Some(path) = FieldPath::parse(field) {
            if path.has_empty_segment() {
                errors.push(ValidationError::new(
                    key,
                    format!("Field path has an empty segment: '{}'", field),
                ));
            }
        }
    }
}
