/**
 * Extension Tests
 *
 * Test suite for mapper, transformer and remapper pipelines during builds
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{element, model, session_with, string_values};
    use inject_annotation::annotation::names::{ALIAS_FOR, AROUND, INTERCEPTOR_BINDING};
    use inject_annotation::annotation::ClassValue;
    use inject_annotation::element::InMemoryElementModel;
    use inject_annotation::registry::{
        AnnotationMapper, AnnotationRemapper, ExtensionRegistry, RenameTransformer, VisitorContext,
    };
    use inject_annotation::{
        AnnotationMetadataBuilder, AnnotationValue, BuildSession, BuilderConfig, RemapOutcome,
        Value,
    };
    use serde_json::json;
    use std::sync::Arc;

    struct SplitMapper {
        include_original: bool,
    }

    impl AnnotationMapper for SplitMapper {
        fn annotation_name(&self) -> &str {
            "com.example.Split"
        }

        fn map(&self, annotation: &AnnotationValue, _: &VisitorContext) -> Vec<AnnotationValue> {
            let mut mapped = vec![
                AnnotationValue::builder("com.example.Left")
                    .member("value", annotation.string_value("value").unwrap_or_default())
                    .build(),
                AnnotationValue::new("com.example.Right"),
            ];
            if self.include_original {
                mapped.push(annotation.clone());
            }
            mapped
        }
    }

    /// Declines every annotation of its package.
    struct KeepRemapper;

    impl AnnotationRemapper for KeepRemapper {
        fn package_name(&self) -> &str {
            "com.keep"
        }

        fn remap(&self, _: &AnnotationValue, _: &VisitorContext) -> RemapOutcome {
            RemapOutcome::Unchanged
        }
    }

    /// Removes every annotation of its package.
    struct DropRemapper;

    impl AnnotationRemapper for DropRemapper {
        fn package_name(&self) -> &str {
            "com.drop"
        }

        fn remap(&self, _: &AnnotationValue, _: &VisitorContext) -> RemapOutcome {
            RemapOutcome::Replaced(Vec::new())
        }
    }

    /// Replaces annotations with one carrying its stereotypes inline.
    struct InlineRemapper;

    impl AnnotationRemapper for InlineRemapper {
        fn package_name(&self) -> &str {
            "com.inline"
        }

        fn remap(&self, annotation: &AnnotationValue, _: &VisitorContext) -> RemapOutcome {
            RemapOutcome::Replaced(vec![AnnotationValue::builder("com.example.Traced")
                .members(&annotation.values)
                .stereotype(AnnotationValue::new("com.example.Marker"))
                .stereotype(AnnotationValue::new(AROUND))
                .build()])
        }
    }

    /// Moves repeatable pins, and their container, onto the tag annotations.
    struct SwapRemapper;

    impl AnnotationRemapper for SwapRemapper {
        fn package_name(&self) -> &str {
            "com.swap"
        }

        fn remap(&self, annotation: &AnnotationValue, _: &VisitorContext) -> RemapOutcome {
            let name = annotation
                .annotation_name
                .replace("com.swap.Pin", "com.example.Tag");
            RemapOutcome::Replaced(vec![AnnotationValue::builder(name)
                .members(&annotation.values)
                .build()])
        }
    }

    fn fixture() -> InMemoryElementModel {
        model(json!({
            "annotations": {
                "com.example.Singleton": {},
                "com.example.Split": {"members": {"value": {}}},
                "com.example.Left": {
                    "members": {
                        "value": {"annotations": [{"annotation": ALIAS_FOR, "values": {"member": "name"}}]},
                        "name": {}
                    },
                    "annotations": [{"annotation": "com.example.Singleton"}]
                },
                "com.example.Right": {"members": {"count": {"default": 3}}},
                "com.example.Old": {"annotations": [{"annotation": "com.example.OldMarker"}]},
                "com.example.OldMarker": {},
                "com.example.New": {"annotations": [{"annotation": "com.example.Singleton"}]},
                "com.example.Tag": {"repeatable": "com.example.Tags", "members": {"value": {}}},
                "com.example.Tags": {},
                "com.keep.Kept": {},
                "com.keep.Mark": {"repeatable": "com.keep.Marks"},
                "com.keep.Marks": {},
                "com.swap.Pin": {"repeatable": "com.swap.Pins", "members": {"value": {}}},
                "com.swap.Pins": {},
                "jakarta.inject.Singleton": {},
                "javax.inject.Singleton": {"annotations": [{"annotation": "javax.inject.Scope"}]},
                "javax.inject.Scope": {}
            },
            "elements": {
                "com.example.Split#bean": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Split", "values": {"value": "left"}}]
                },
                "com.example.Old#bean": {"kind": "class", "annotations": [{"annotation": "com.example.Old"}]},
                "com.example.Tag#bean": {
                    "kind": "class",
                    "annotations": [
                        {"annotation": "com.example.Tag", "values": {"value": "x"}},
                        {"annotation": "com.example.Tag", "values": {"value": "y"}}
                    ]
                },
                "com.keep.Kept#bean": {
                    "kind": "class",
                    "annotations": [
                        {"annotation": "com.keep.Kept", "values": {"value": 1}},
                        {"annotation": "com.keep.Mark", "values": {"value": "m"}}
                    ]
                },
                "com.swap.Pin#bean": {
                    "kind": "class",
                    "annotations": [
                        {"annotation": "com.swap.Pin", "values": {"value": "p"}},
                        {"annotation": "com.swap.Pin", "values": {"value": "q"}}
                    ]
                },
                "com.drop.Dropped#bean": {"kind": "class", "annotations": [{"annotation": "com.drop.Dropped"}]},
                "com.inline.Traced#bean": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.inline.Traced", "values": {"level": "debug"}}]
                },
                "jakarta.inject.Singleton#bean": {
                    "kind": "class",
                    "annotations": [{"annotation": "jakarta.inject.Singleton"}]
                }
            }
        }))
    }

    mod mapper_tests {
        use super::*;

        fn registry(include_original: bool) -> ExtensionRegistry {
            ExtensionRegistry::new().with_mapper(SplitMapper { include_original })
        }

        #[test]
        fn should_expand_into_mapped_annotations() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry(false)));
            let metadata = builder.build(&element("com.example.Split#bean")).unwrap();

            assert!(metadata.has_declared_annotation("com.example.Left"));
            assert!(metadata.has_declared_annotation("com.example.Right"));
            assert!(!metadata.has_annotation("com.example.Split"));
        }

        #[test]
        fn should_keep_original_when_mapper_includes_it() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry(true)));
            let metadata = builder.build(&element("com.example.Split#bean")).unwrap();

            assert!(metadata.has_annotation("com.example.Left"));
            assert_eq!(metadata.string_value("com.example.Split", "value"), Some("left"));
        }

        #[test]
        fn should_process_mapped_annotations_fully() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry(false)));
            let metadata = builder.build(&element("com.example.Split#bean")).unwrap();

            assert_eq!(metadata.string_value("com.example.Left", "value"), Some("left"));
            assert_eq!(metadata.string_value("com.example.Left", "name"), Some("left"));
            assert_eq!(metadata.value("com.example.Right", "count"), Some(&Value::Long(3)));
            assert_eq!(
                metadata.annotation_names_by_stereotype("com.example.Singleton"),
                vec!["com.example.Left"]
            );
        }

        #[test]
        fn should_report_mapped_names() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry(false)));

            assert!(builder.is_annotation_mapped("com.example.Split"));
            assert!(!builder.is_annotation_mapped("com.example.Left"));
            assert!(builder.mapped_annotation_names().contains("com.example.Split"));
        }
    }

    mod transformer_tests {
        use super::*;

        #[test]
        fn should_replace_transformed_annotation() {
            let model = fixture();
            let registry = ExtensionRegistry::new()
                .with_transformer(RenameTransformer::new("com.example.Old", "com.example.New"));
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry));
            let metadata = builder.build(&element("com.example.Old#bean")).unwrap();

            assert!(metadata.has_declared_annotation("com.example.New"));
            assert!(!metadata.has_annotation("com.example.Old"));
            assert!(metadata.has_stereotype("com.example.Singleton"));
            assert!(!metadata.has_stereotype("com.example.OldMarker"));
        }

        #[test]
        fn should_transform_repeatable_occurrences_into_their_group() {
            let model = fixture();
            let registry = ExtensionRegistry::new()
                .with_transformer(RenameTransformer::new("com.example.Tag", "com.example.Label"));
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry));
            let metadata = builder.build(&element("com.example.Tag#bean")).unwrap();

            assert_eq!(string_values(&metadata, "com.example.Label"), vec!["x", "y"]);
            assert!(string_values(&metadata, "com.example.Tag").is_empty());
        }

        #[test]
        fn should_transform_repeatable_container_with_its_occurrences() {
            let model = fixture();
            let registry = ExtensionRegistry::new()
                .with_transformer(RenameTransformer::new("com.example.Tag", "com.example.Label"))
                .with_transformer(RenameTransformer::new("com.example.Tags", "com.example.Labels"));
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry));
            let metadata = builder.build(&element("com.example.Tag#bean")).unwrap();

            assert!(metadata.has_declared_annotation("com.example.Labels"));
            assert!(!metadata.has_annotation("com.example.Tags"));
            assert_eq!(string_values(&metadata, "com.example.Label"), vec!["x", "y"]);
            assert!(string_values(&metadata, "com.example.Tag").is_empty());
        }

        #[test]
        fn should_load_declarative_renames_from_config() {
            let model = fixture();
            let config = BuilderConfig::from_json_str(
                r#"{"extensions": {"includeInstalled": false, "renames": {"com.example.Old": "com.example.New"}}}"#,
            )
            .unwrap();
            let session = Arc::new(BuildSession::from_config(config));
            let builder = AnnotationMetadataBuilder::new(&model, session);
            let metadata = builder.build(&element("com.example.Old#bean")).unwrap();

            assert!(metadata.has_annotation("com.example.New"));
            assert!(!metadata.has_annotation("com.example.Old"));
        }
    }

    mod remapper_tests {
        use super::*;

        #[test]
        fn should_keep_declined_annotations_exactly_once() {
            let model = fixture();
            let registry = ExtensionRegistry::new()
                .with_remapper(KeepRemapper)
                .with_remapper(KeepRemapper);
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry));
            let metadata = builder.build(&element("com.keep.Kept#bean")).unwrap();

            assert_eq!(metadata.annotation_values_by_type("com.keep.Kept").len(), 1);
            assert_eq!(metadata.value("com.keep.Kept", "value"), Some(&Value::Long(1)));
            assert_eq!(string_values(&metadata, "com.keep.Mark"), vec!["m"]);
        }

        #[test]
        fn should_move_remapped_repeatable_occurrences_into_remapped_group() {
            let model = fixture();
            let registry = ExtensionRegistry::new().with_remapper(SwapRemapper);
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry));
            let metadata = builder.build(&element("com.swap.Pin#bean")).unwrap();

            assert!(metadata.has_declared_annotation("com.example.Tags"));
            assert!(!metadata.has_annotation("com.swap.Pins"));
            assert_eq!(string_values(&metadata, "com.example.Tag"), vec!["p", "q"]);
            assert!(string_values(&metadata, "com.swap.Pin").is_empty());
        }

        #[test]
        fn should_remove_annotations_remapped_to_nothing() {
            let model = fixture();
            let registry = ExtensionRegistry::new().with_remapper(DropRemapper);
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry));
            let metadata = builder.build(&element("com.drop.Dropped#bean")).unwrap();

            assert!(!metadata.has_annotation("com.drop.Dropped"));
            assert!(metadata.is_empty());
        }

        #[test]
        fn should_remap_installed_jakarta_annotations() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, Arc::new(BuildSession::installed()));
            let metadata = builder.build(&element("jakarta.inject.Singleton#bean")).unwrap();

            assert!(metadata.has_declared_annotation("javax.inject.Singleton"));
            assert!(!metadata.has_annotation("jakarta.inject.Singleton"));
            assert_eq!(
                metadata.annotation_names_by_stereotype("javax.inject.Scope"),
                vec!["javax.inject.Singleton"]
            );
            assert!(builder.mapped_annotation_packages().contains("jakarta.inject"));
        }

        #[test]
        fn should_walk_stereotypes_carried_by_remapped_values() {
            let model = fixture();
            let registry = ExtensionRegistry::new().with_remapper(InlineRemapper);
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry));
            let metadata = builder.build(&element("com.inline.Traced#bean")).unwrap();

            assert_eq!(metadata.string_value("com.example.Traced", "level"), Some("debug"));
            assert_eq!(
                metadata.annotation_names_by_stereotype("com.example.Marker"),
                vec!["com.example.Traced"]
            );

            let bindings = metadata.annotation_values_by_type(INTERCEPTOR_BINDING);
            assert_eq!(bindings.len(), 1);
            assert_eq!(
                bindings[0].value("value"),
                Some(&Value::Class(ClassValue::new("com.example.Traced")))
            );
        }
    }
}
