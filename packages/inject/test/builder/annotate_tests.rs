/**
 * Annotate Tests
 *
 * Test suite for adding annotations to already built metadata
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{declared_string_values, element, model, session};
    use inject_annotation::annotation::names::{EXPERIMENTAL, INTERNAL, SCOPE};
    use inject_annotation::element::InMemoryElementModel;
    use inject_annotation::{AnnotationMetadata, AnnotationMetadataBuilder, AnnotationValue, Value};
    use serde_json::json;

    fn fixture() -> InMemoryElementModel {
        model(json!({
            "annotations": {
                "com.example.Singleton": {"annotations": [{"annotation": SCOPE}]},
                SCOPE: {},
                "com.example.Timeout": {"members": {"seconds": {"default": 30}}},
                "com.example.Tag": {"repeatable": "com.example.Tags", "members": {"value": {}}},
                "com.example.Tags": {},
                "com.example.Marked": {
                    "annotations": [
                        {"annotation": INTERNAL},
                        {"annotation": EXPERIMENTAL},
                        {"annotation": "com.example.Tracked"}
                    ]
                },
                "com.example.Tracked": {},
                INTERNAL: {},
                EXPERIMENTAL: {}
            },
            "elements": {
                "com.example.Base": {"kind": "class", "annotations": [{"annotation": "com.example.Tracked"}]},
                "com.example.Bean": {"kind": "class", "annotations": [{"annotation": "com.example.Singleton"}]},
                "com.example.MarkedBean": {"kind": "class", "annotations": [{"annotation": "com.example.Marked"}]}
            }
        }))
    }

    fn timeout(seconds: i64) -> AnnotationValue {
        AnnotationValue::builder("com.example.Timeout")
            .member("seconds", seconds)
            .build()
    }

    mod variant_tests {
        use super::*;

        #[test]
        fn should_turn_empty_metadata_into_a_single_store() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            let annotated = builder
                .annotate(&AnnotationMetadata::Empty, AnnotationValue::new("com.example.Singleton"))
                .unwrap();

            assert!(matches!(annotated, AnnotationMetadata::Default(_)));
            assert!(annotated.has_declared_annotation("com.example.Singleton"));
            assert!(annotated.has_declared_stereotype(SCOPE));
        }

        #[test]
        fn should_leave_input_metadata_untouched() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let original = builder.build(&element("com.example.Bean")).unwrap();

            let annotated = builder.annotate(&original, timeout(10)).unwrap();

            assert!(!annotated.ptr_eq(&original));
            assert!(!original.has_annotation("com.example.Timeout"));
            assert!(annotated.has_declared_annotation("com.example.Singleton"));
            assert_eq!(annotated.value("com.example.Timeout", "seconds"), Some(&Value::Long(10)));
        }

        #[test]
        fn should_register_defaults_of_added_annotations() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            let annotated = builder
                .annotate(&AnnotationMetadata::Empty, AnnotationValue::new("com.example.Timeout"))
                .unwrap();

            assert_eq!(annotated.value("com.example.Timeout", "seconds"), Some(&Value::Long(30)));
            assert!(builder.session().defaults().contains("com.example.Timeout"));
        }

        #[test]
        fn should_annotate_declared_part_of_hierarchy() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let parent = builder.build(&element("com.example.Base")).unwrap();
            let declared = builder.build(&element("com.example.Bean")).unwrap();
            let hierarchy = AnnotationMetadata::hierarchy(parent.clone(), declared);

            let annotated = builder.annotate(&hierarchy, timeout(5)).unwrap();

            let AnnotationMetadata::Hierarchy(sibling) = &annotated else {
                panic!("expected a hierarchy, got {annotated:?}");
            };
            assert!(sibling.parent().ptr_eq(&parent));
            assert!(sibling.declared().has_declared_annotation("com.example.Timeout"));
            assert!(sibling.declared().has_declared_annotation("com.example.Singleton"));
            assert!(annotated.has_annotation("com.example.Tracked"));
        }

        #[test]
        fn should_layer_reference_under_annotated_part() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let target = builder.build(&element("com.example.Bean")).unwrap();
            let reference = AnnotationMetadata::reference("com.example.Bean", target);

            let annotated = builder.annotate(&reference, timeout(1)).unwrap();

            let AnnotationMetadata::Hierarchy(layered) = &annotated else {
                panic!("expected a hierarchy, got {annotated:?}");
            };
            assert!(layered.parent().ptr_eq(&reference));
            assert!(annotated.has_annotation("com.example.Singleton"));
            assert!(annotated.has_declared_annotation("com.example.Timeout"));
            assert!(!annotated.has_declared_annotation("com.example.Singleton"));
        }
    }

    mod content_tests {
        use super::*;

        #[test]
        fn should_group_repeatable_annotations() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let tag = |value: &str| {
                AnnotationValue::builder("com.example.Tag")
                    .member("value", value)
                    .build()
            };

            let first = builder.annotate(&AnnotationMetadata::Empty, tag("a")).unwrap();
            let second = builder.annotate(&first, tag("b")).unwrap();

            assert_eq!(declared_string_values(&second, "com.example.Tag"), vec!["a", "b"]);
            assert!(second.has_declared_annotation("com.example.Tags"));
            assert_eq!(declared_string_values(&first, "com.example.Tag"), vec!["a"]);
        }

        #[test]
        fn should_skip_excluded_stereotypes() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            let annotated = builder
                .annotate(&AnnotationMetadata::Empty, AnnotationValue::new("com.example.Marked"))
                .unwrap();
            assert!(annotated.has_stereotype("com.example.Tracked"));
            assert!(!annotated.has_stereotype(INTERNAL));
            assert!(!annotated.has_stereotype(EXPERIMENTAL));

            let built = builder.build(&element("com.example.MarkedBean")).unwrap();
            assert!(built.has_stereotype(INTERNAL));
        }

        #[test]
        fn should_store_unresolved_annotations_verbatim() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());

            let annotated = builder
                .annotate(
                    &AnnotationMetadata::Empty,
                    AnnotationValue::builder("com.example.Unknown")
                        .member("value", "x")
                        .build(),
                )
                .unwrap();

            assert!(annotated.has_declared_annotation("com.example.Unknown"));
            assert_eq!(annotated.string_value("com.example.Unknown", "value"), Some("x"));
            assert!(annotated.stereotype_names().is_empty());
        }
    }
}
