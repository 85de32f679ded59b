use bitflags::bitflags;

bitflags! {
    /// Flags selecting how an element hierarchy is walked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BuildOptions: u8 {
        /// Methods and constructors also inherit annotations of their declaring type.
        const INHERIT_TYPE_ANNOTATIONS = 0b001;
        /// Only the element itself, no supertypes or overridden members.
        const DECLARED_ONLY = 0b010;
        /// Resolve `@AliasFor` and `@Aliases` on member values.
        const ALLOW_ALIASES = 0b100;
    }
}

impl BuildOptions {
    pub fn inherit_type_annotations(self) -> bool {
        self.contains(BuildOptions::INHERIT_TYPE_ANNOTATIONS)
    }

    pub fn declared_only(self) -> bool {
        self.contains(BuildOptions::DECLARED_ONLY)
    }

    pub fn allow_aliases(self) -> bool {
        self.contains(BuildOptions::ALLOW_ALIASES)
    }
}
