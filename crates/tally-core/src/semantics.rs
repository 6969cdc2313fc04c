/// What a node is, for inspection and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Text,
    Button,
    List,
}

/// Semantics attached to a `View`.
#[derive(Clone, Debug, PartialEq)]
pub struct Semantics {
    pub role: Role,
    /// Overrides the label derived from the view's text.
    pub label: Option<String>,
    /// Disabled nodes stay in the tree but are marked not enabled.
    pub enabled: bool,
}
