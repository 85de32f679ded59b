/**
 * Validation Tests
 *
 * Test suite for constraint validation of annotation member values
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{element, model, session};
    use inject_annotation::annotation::names::CONSTRAINT;
    use inject_annotation::element::{AnnotatedElementValidator, InMemoryElementModel, NamedElement};
    use inject_annotation::{AnnotationMetadataBuilder, DiagnosticCategory, Value};
    use indexmap::IndexSet;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Checks `@Min` constraints and counts how often it is asked.
    #[derive(Default)]
    struct MinValidator {
        calls: AtomicUsize,
    }

    impl AnnotatedElementValidator for MinValidator {
        fn validate_annotated_element(&self, element: &NamedElement<'_>, value: &Value) -> IndexSet<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut errors = IndexSet::new();
            let minimum = element
                .annotation_metadata()
                .value("com.example.Min", "value")
                .and_then(Value::as_long);
            if let (Some(minimum), Some(actual)) = (minimum, value.as_long()) {
                if actual < minimum {
                    errors.insert(format!("must be greater than or equal to {minimum}"));
                }
            }
            errors
        }
    }

    fn document() -> serde_json::Value {
        json!({
            "annotations": {
                CONSTRAINT: {},
                "com.example.Min": {
                    "members": {"value": {}},
                    "annotations": [{"annotation": CONSTRAINT}]
                },
                "com.example.Http": {
                    "members": {
                        "port": {"annotations": [{"annotation": "com.example.Min", "values": {"value": 1}}]},
                        "host": {}
                    }
                }
            },
            "elements": {
                "com.example.Zero": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Http", "values": {"port": 0, "host": "local"}}]
                },
                "com.example.AlsoZero": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Http", "values": {"port": -1}}]
                },
                "com.example.Valid": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Http", "values": {"port": 8080}}]
                },
                "com.example.Placeholder": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Http", "values": {"port": "${server.port}"}}]
                }
            }
        })
    }

    fn validated_model() -> (InMemoryElementModel, Arc<MinValidator>) {
        let validator = Arc::new(MinValidator::default());
        let model = model(document()).with_validator(validator.clone());
        (model, validator)
    }

    mod constraint_tests {
        use super::*;

        #[test]
        fn should_report_violations_with_member_prefix() {
            let (model, _) = validated_model();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            let metadata = builder.build(&element("com.example.Zero")).unwrap();

            let diagnostics = model.take_diagnostics();
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].category, DiagnosticCategory::Error);
            assert_eq!(diagnostics[0].element, "com.example.Zero");
            assert_eq!(diagnostics[0].message, "@Http.port: must be greater than or equal to 1");
            assert_eq!(metadata.value("com.example.Http", "port"), Some(&Value::Long(0)));
        }

        #[test]
        fn should_report_erroneous_member_once() {
            let (model, _) = validated_model();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            builder.build(&element("com.example.Zero")).unwrap();
            builder.build_declared(&element("com.example.Zero")).unwrap();
            builder.build(&element("com.example.AlsoZero")).unwrap();

            let errors: Vec<_> = model
                .take_diagnostics()
                .into_iter()
                .filter(|diagnostic| diagnostic.is_error())
                .collect();
            assert_eq!(errors.len(), 1);
        }

        #[test]
        fn should_accept_valid_values() {
            let (model, validator) = validated_model();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            builder.build(&element("com.example.Valid")).unwrap();

            assert!(model.diagnostics().is_empty());
            assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn should_skip_placeholders() {
            let (model, validator) = validated_model();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            let metadata = builder.build(&element("com.example.Placeholder")).unwrap();

            assert!(model.diagnostics().is_empty());
            assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
            assert_eq!(metadata.string_value("com.example.Http", "port"), Some("${server.port}"));
        }

        #[test]
        fn should_not_validate_without_a_validator() {
            let model = model(document());
            let builder = AnnotationMetadataBuilder::new(&model, session());

            builder.build(&element("com.example.Zero")).unwrap();

            assert!(model.diagnostics().is_empty());
        }

        #[test]
        fn should_only_validate_constrained_members() {
            let (model, validator) = validated_model();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            builder.build(&element("com.example.Valid")).unwrap();
            builder.build(&element("com.example.Placeholder")).unwrap();

            assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
        }
    }
}
