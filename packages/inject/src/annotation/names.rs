// Annotation Names
//
// Well-known annotation type names the builder reacts to, and helpers for
// splitting qualified names.

/// Redirects a member value to another member, possibly on another annotation.
pub const ALIAS_FOR: &str = "io.micronaut.context.annotation.AliasFor";
/// Container of several [`ALIAS_FOR`] entries on one member.
pub const ALIASES: &str = "io.micronaut.context.annotation.Aliases";
/// Marks a class-valued member whose value is instantiated rather than referenced.
pub const INSTANTIATED_MEMBER: &str = "io.micronaut.core.annotation.InstantiatedMember";

pub const AROUND: &str = "io.micronaut.aop.Around";
pub const INTRODUCTION: &str = "io.micronaut.aop.Introduction";
pub const INTERCEPTOR_BINDING: &str = "io.micronaut.aop.InterceptorBinding";
/// Repeatable container of [`INTERCEPTOR_BINDING`] entries.
pub const INTERCEPTOR_BINDINGS: &str = "io.micronaut.aop.InterceptorBindingDefinitions";
/// Names the interceptor implementation bound to an AOP annotation.
pub const TYPE: &str = "io.micronaut.context.annotation.Type";

pub const SCOPE: &str = "javax.inject.Scope";
pub const DEFAULT_SCOPE: &str = "io.micronaut.context.annotation.DefaultScope";

pub const INTERNAL: &str = "io.micronaut.core.annotation.Internal";
pub const EXPERIMENTAL: &str = "io.micronaut.core.annotation.Experimental";

pub const NULLABLE: &str = "javax.annotation.Nullable";
pub const NON_NULL: &str = "javax.annotation.Nonnull";
pub const CORE_NULLABLE: &str = "io.micronaut.core.annotation.Nullable";
pub const CORE_NON_NULL: &str = "io.micronaut.core.annotation.NonNull";

/// Meta-annotation identifying bean validation constraints.
pub const CONSTRAINT: &str = "javax.validation.Constraint";

pub const VALUE_MEMBER: &str = "value";
pub const KIND_MEMBER: &str = "kind";
pub const INTERCEPTOR_TYPE_MEMBER: &str = "interceptorType";

/// Annotations describing annotations; never recorded as metadata.
pub const INTERNAL_ANNOTATION_NAMES: &[&str] = &[
    "java.lang.annotation.Retention",
    "java.lang.annotation.Documented",
    "java.lang.annotation.Target",
    "java.lang.annotation.Inherited",
    "java.lang.annotation.Repeatable",
    "java.lang.annotation.Native",
    "java.lang.Deprecated",
    "kotlin.annotation.Retention",
    "kotlin.annotation.Target",
    "kotlin.annotation.MustBeDocumented",
    "kotlin.annotation.Repeatable",
    "kotlin.Metadata",
];

/// Packages whose annotations are never walked for stereotypes.
pub const STEREOTYPE_EXCLUDES: &[&str] = &[
    "javax.annotation",
    "java.lang.annotation",
    "io.micronaut.core.annotation",
    "edu.umd.cs.findbugs.annotations",
];

/// Stereotypes skipped when annotating existing metadata.
pub const DEFAULT_ANNOTATE_EXCLUDES: &[&str] = &[INTERNAL, EXPERIMENTAL];

/// Deprecated annotation names and the names that replace them.
pub const DEPRECATED_ANNOTATION_NAMES: &[(&str, &str)] =
    &[(NULLABLE, CORE_NULLABLE), (NON_NULL, CORE_NON_NULL)];

/// The package portion of a qualified name, empty for unqualified names.
pub fn package_name(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(index) => &qualified_name[..index],
        None => "",
    }
}

/// The simple name portion of a qualified name.
pub fn simple_name(qualified_name: &str) -> &str {
    match qualified_name.rfind('.') {
        Some(index) => &qualified_name[index + 1..],
        None => qualified_name,
    }
}

/// Whether an interception annotation starts an interceptor binding chain.
pub fn is_interception_kind(annotation_name: &str) -> bool {
    annotation_name == AROUND || annotation_name == INTRODUCTION
}
