//! Permission tree evaluation.
//!
//! A tree is either unrestricted (no allow-list configured) or a list of
//! entries for the current level. A bare [`PermissionEntry::Leaf`]
//! permits the field itself but nothing nested under it: every level of
//! nesting has to be authorized explicitly with
//! [`PermissionEntry::Scoped`].

/// One allow-list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionEntry {
    /// Field permitted, nested fields denied
    Leaf(String),
    /// Field permitted, nested fields checked against the children
    Scoped(String, Vec<PermissionEntry>),
}

impl PermissionEntry {
    /// Create a leaf entry
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::Leaf(name.into())
    }

    /// Create a scoped entry
    #[must_use]
    pub fn scoped(
        name: impl Into<String>,
        children: impl IntoIterator<Item = PermissionEntry>,
    ) -> Self {
        Self::Scoped(name.into(), children.into_iter().collect())
    }

    /// Field name the entry permits
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(name) | Self::Scoped(name, _) => name,
        }
    }
}

/// A server-side allow-list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionTree {
    entries: Option<Vec<PermissionEntry>>,
}

impl PermissionTree {
    /// A tree that permits every field at every depth
    #[must_use]
    pub fn unrestricted() -> Self {
        Self { entries: None }
    }

    /// A tree that permits only the given entries at the root
    #[must_use]
    pub fn restricted(entries: impl IntoIterator<Item = PermissionEntry>) -> Self {
        Self {
            entries: Some(entries.into_iter().collect()),
        }
    }

    /// Check if no allow-list is configured
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.entries.is_none()
    }

    /// Root entries, or `None` when unrestricted
    #[must_use]
    pub fn entries(&self) -> Option<&[PermissionEntry]> {
        self.entries.as_deref()
    }

    /// Scope at the root of the tree
    #[must_use]
    pub fn scope(&self) -> Scope<'_> {
        match &self.entries {
            None => Scope::Unrestricted,
            Some(entries) => Scope::Restricted(entries),
        }
    }
}

/// The permissions applicable at one nesting level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Everything permitted here and below
    Unrestricted,
    /// Only these entries permitted here
    Restricted(&'a [PermissionEntry]),
}

impl<'a> Scope<'a> {
    /// Scope that denies every field
    pub const DENY_ALL: Scope<'static> = Scope::Restricted(&[]);

    /// Check whether `field` may be revealed at this level
    #[must_use]
    pub fn permitted(&self, field: &str) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(_) => self.entry(field).is_some(),
        }
    }

    /// Scope for the fields nested under `field`.
    ///
    /// Unrestricted stays unrestricted. Otherwise a scoped entry yields
    /// its children, while a leaf entry (or no entry) denies everything.
    #[must_use]
    pub fn scope_for(&self, field: &str) -> Scope<'a> {
        match self {
            Self::Unrestricted => Self::Unrestricted,
            Self::Restricted(_) => match self.entry(field) {
                Some(PermissionEntry::Scoped(_, children)) => Scope::Restricted(children),
                Some(PermissionEntry::Leaf(_)) | None => Scope::DENY_ALL,
            },
        }
    }

    /// First entry naming `field`
    #[must_use]
    pub fn entry(&self, field: &str) -> Option<&'a PermissionEntry> {
        match *self {
            Self::Unrestricted => None,
            Self::Restricted(entries) => entries.iter().find(|entry| entry.name() == field),
        }
    }

    /// Check if this scope places no restriction
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Names of leaf entries, in order
    #[must_use]
    pub fn leaf_names(&self) -> Vec<&'a str> {
        self.names(|entry| matches!(entry, PermissionEntry::Leaf(_)))
    }

    /// Names of scoped entries, in order
    #[must_use]
    pub fn scoped_names(&self) -> Vec<&'a str> {
        self.names(|entry| matches!(entry, PermissionEntry::Scoped(..)))
    }

    fn names(&self, keep: impl Fn(&PermissionEntry) -> bool) -> Vec<&'a str> {
        match *self {
            Self::Unrestricted => Vec::new(),
            Self::Restricted(entries) => entries
                .iter()
                .filter(|entry| keep(entry))
                .map(PermissionEntry::name)
                .collect(),
        }
    }
}
