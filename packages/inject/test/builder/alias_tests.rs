/**
 * Alias Tests
 *
 * Test suite for member aliases within one annotation and across annotations
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::{element, model, session, session_with, string_values};
    use inject_annotation::annotation::names::{ALIASES, ALIAS_FOR, INSTANTIATED_MEMBER};
    use inject_annotation::annotation::ClassValue;
    use inject_annotation::element::InMemoryElementModel;
    use inject_annotation::registry::{ExtensionRegistry, PackageRemapper};
    use inject_annotation::{AnnotationMetadataBuilder, Value};
    use serde_json::json;

    fn fixture() -> InMemoryElementModel {
        model(json!({
            "annotations": {
                "com.example.Named": {
                    "members": {
                        "value": {"annotations": [{"annotation": ALIAS_FOR, "values": {"member": "name"}}]},
                        "name": {}
                    }
                },
                "com.example.Client": {
                    "members": {
                        "id": {"annotations": [{
                            "annotation": ALIAS_FOR,
                            "values": {"annotation": {"class": "com.example.Named"}, "member": "value"}
                        }]}
                    }
                },
                "com.example.Route": {
                    "members": {
                        "path": {"annotations": [{
                            "annotation": ALIASES,
                            "values": {"value": [
                                {"annotation": ALIAS_FOR, "values": {"member": "uri"}},
                                {"annotation": ALIAS_FOR, "values": {
                                    "annotationName": "com.example.Named",
                                    "member": "value"
                                }}
                            ]}
                        }]},
                        "uri": {}
                    }
                },
                "com.example.Label": {"repeatable": "com.example.Labels", "members": {"value": {}}},
                "com.example.Labels": {},
                "com.example.Labelled": {
                    "members": {
                        "text": {"annotations": [{
                            "annotation": ALIAS_FOR,
                            "values": {"annotation": {"class": "com.example.Label"}, "member": "value"}
                        }]}
                    }
                },
                "com.example.Legacy": {
                    "members": {
                        "id": {"annotations": [{
                            "annotation": ALIAS_FOR,
                            "values": {"annotationName": "com.legacy.Named", "member": "value"}
                        }]}
                    }
                },
                "com.example.Factory": {
                    "members": {
                        "impl": {"annotations": [{"annotation": INSTANTIATED_MEMBER}]}
                    }
                },
                "com.example.Header": {
                    "members": {
                        "name": {"annotations": [{"annotation": ALIAS_FOR, "values": {"member": "value"}}]},
                        "value": {},
                        "qualifier": {"annotations": [{
                            "annotation": ALIAS_FOR,
                            "values": {"annotation": {"class": "com.example.Named"}, "member": "value"}
                        }]}
                    }
                },
                "com.example.Headers": {"members": {"primary": {}, "value": {}}}
            },
            "elements": {
                "com.example.Named#bean": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Named", "values": {"value": "primary"}}]
                },
                "com.example.Client#bean": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Client", "values": {"id": "billing"}}]
                },
                "com.example.Route#bean": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Route", "values": {"path": "/orders"}}]
                },
                "com.example.Labelled#bean": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Labelled", "values": {"text": "fast"}}]
                },
                "com.example.Legacy#bean": {
                    "kind": "class",
                    "annotations": [{"annotation": "com.example.Legacy", "values": {"id": "old"}}]
                },
                "com.example.Factory#bean": {
                    "kind": "class",
                    "annotations": [{
                        "annotation": "com.example.Factory",
                        "values": {"impl": {"class": "com.example.Impl"}}
                    }]
                },
                "com.example.Headers#bean": {
                    "kind": "class",
                    "annotations": [{
                        "annotation": "com.example.Headers",
                        "values": {
                            "primary": {
                                "annotation": "com.example.Header",
                                "values": {"name": "Accept", "qualifier": "json"}
                            },
                            "value": [
                                {"annotation": "com.example.Header", "values": {"name": "X-Trace"}},
                                {"annotation": "com.example.Header", "values": {"value": "span", "name": "X-Span"}}
                            ]
                        }
                    }]
                }
            }
        }))
    }

    mod member_alias_tests {
        use super::*;

        #[test]
        fn should_copy_value_to_aliased_member() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let metadata = builder.build(&element("com.example.Named#bean")).unwrap();

            assert_eq!(metadata.string_value("com.example.Named", "name"), Some("primary"));
            assert_eq!(metadata.string_value("com.example.Named", "value"), Some("primary"));
        }

        #[test]
        fn should_mark_instantiated_members() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let metadata = builder.build(&element("com.example.Factory#bean")).unwrap();

            assert_eq!(
                metadata.value("com.example.Factory", "impl"),
                Some(&Value::Class(ClassValue::instantiated("com.example.Impl")))
            );
        }

        #[test]
        fn should_resolve_aliases_inside_nested_annotation_values() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let metadata = builder.build(&element("com.example.Headers#bean")).unwrap();

            let primary = metadata
                .value("com.example.Headers", "primary")
                .and_then(Value::as_annotation)
                .unwrap();
            assert_eq!(primary.string_value("name"), Some("Accept"));
            assert_eq!(primary.string_value("value"), Some("Accept"));
            assert_eq!(primary.string_value("qualifier"), Some("json"));
            assert!(!metadata.has_stereotype("com.example.Named"));

            let headers = metadata.value("com.example.Headers", "value").unwrap().annotations();
            assert_eq!(headers.len(), 2);
            assert_eq!(headers[0].string_value("value"), Some("X-Trace"));
            assert_eq!(headers[1].string_value("name"), Some("X-Span"));
            assert_eq!(headers[1].string_value("value"), Some("span"));
        }
    }

    mod cross_alias_tests {
        use super::*;

        #[test]
        fn should_add_aliased_annotation_as_stereotype() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let metadata = builder.build(&element("com.example.Client#bean")).unwrap();

            assert!(metadata.has_declared_annotation("com.example.Client"));
            assert!(metadata.has_declared_stereotype("com.example.Named"));
            assert!(!metadata.has_annotation("com.example.Named"));
            assert_eq!(metadata.string_value("com.example.Named", "value"), Some("billing"));
            assert_eq!(metadata.string_value("com.example.Client", "id"), Some("billing"));
        }

        #[test]
        fn should_resolve_every_entry_of_aliases() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let metadata = builder.build(&element("com.example.Route#bean")).unwrap();

            assert_eq!(metadata.string_value("com.example.Route", "uri"), Some("/orders"));
            assert_eq!(metadata.string_value("com.example.Route", "path"), Some("/orders"));
            assert_eq!(metadata.string_value("com.example.Named", "value"), Some("/orders"));
        }

        #[test]
        fn should_group_repeatable_alias_targets() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let metadata = builder.build(&element("com.example.Labelled#bean")).unwrap();

            assert!(metadata.has_stereotype("com.example.Labels"));
            assert_eq!(string_values(&metadata, "com.example.Label"), vec!["fast"]);
        }

        #[test]
        fn should_remap_alias_target_package() {
            let model = fixture();
            let registry = ExtensionRegistry::new()
                .with_remapper(PackageRemapper::new("com.legacy", "com.example"));
            let builder = AnnotationMetadataBuilder::new(&model, session_with(registry));
            let metadata = builder.build(&element("com.example.Legacy#bean")).unwrap();

            assert!(!metadata.has_stereotype("com.legacy.Named"));
            assert_eq!(metadata.string_value("com.example.Named", "value"), Some("old"));
        }

        #[test]
        fn should_keep_unresolved_alias_target_without_remapper() {
            let model = fixture();
            let builder = AnnotationMetadataBuilder::new(&model, session());
            let metadata = builder.build(&element("com.example.Legacy#bean")).unwrap();

            assert_eq!(metadata.string_value("com.legacy.Named", "value"), Some("old"));
        }
    }
}
