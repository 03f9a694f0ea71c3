//! Navigation filtering
//!
//! Turns the host application's static navigation tree into the entries the
//! current identity may see, shaped for the selected menu type. Filtering only
//! removes nodes; siblings always keep their declaration order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::NavigationMenuType;

/// Permission tag gating a navigation entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Capability {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Read-only view of who is signed in, as supplied by the auth collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub capabilities: BTreeSet<Capability>,
}

impl Identity {
    /// Signed-out visitor: no capabilities
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_capabilities<I, C>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Capability>,
    {
        Self {
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn holds_all(&self, required: &BTreeSet<Capability>) -> bool {
        required.is_subset(&self.capabilities)
    }
}

/// Static navigation tree node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavNode {
    pub id: String,
    pub label_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub required_capabilities: BTreeSet<Capability>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavNode>,
}

impl NavNode {
    pub fn link(id: &str, label_key: &str, path: &str) -> Self {
        Self {
            id: id.to_string(),
            label_key: label_key.to_string(),
            path: Some(path.to_string()),
            required_capabilities: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn group(id: &str, label_key: &str, children: Vec<NavNode>) -> Self {
        Self {
            id: id.to_string(),
            label_key: label_key.to_string(),
            path: None,
            required_capabilities: BTreeSet::new(),
            children,
        }
    }

    pub fn requires(mut self, capability: &str) -> Self {
        self.required_capabilities.insert(Capability::from(capability));
        self
    }

    fn valid_path(&self) -> Option<&str> {
        self.path.as_deref().filter(|path| is_valid_path(path))
    }
}

fn is_valid_path(path: &str) -> bool {
    let path = path.trim();
    !path.is_empty() && (path.starts_with('/') || path.contains("://"))
}

/// How an entry is presented by the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Presentation {
    Link,
    Group { expanded: bool },
    /// Top-level item of a slim rail; children pop out on hover
    Flyout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavEntry {
    pub id: String,
    pub label_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub presentation: Presentation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavEntry>,
}

#[cfg(test)]
impl NavEntry {
    /// Depth-first walk over this entry and its descendants
    pub fn walk(&self) -> Vec<&NavEntry> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

/// Entries visible to `identity`, grouped for `menu_type`
pub fn filter(tree: &[NavNode], identity: &Identity, menu_type: NavigationMenuType) -> Vec<NavEntry> {
    let visible = prune(tree, identity);
    match menu_type {
        NavigationMenuType::Default => visible.into_iter().map(|node| shape(node, false)).collect(),
        NavigationMenuType::Stacked => visible.into_iter().map(|node| shape(node, true)).collect(),
        NavigationMenuType::Slim => visible.into_iter().map(slim).collect(),
    }
}

/// Visible subtree, still in tree form
struct Visible<'a> {
    node: &'a NavNode,
    path: Option<&'a str>,
    children: Vec<Visible<'a>>,
}

fn prune<'a>(nodes: &'a [NavNode], identity: &Identity) -> Vec<Visible<'a>> {
    nodes
        .iter()
        .filter(|node| identity.holds_all(&node.required_capabilities))
        .filter_map(|node| {
            let children = prune(&node.children, identity);
            let path = node.valid_path();
            // Nothing to click and nothing inside: drop instead of rendering an empty group
            if children.is_empty() && path.is_none() {
                return None;
            }
            Some(Visible { node, path, children })
        })
        .collect()
}

fn shape(visible: Visible<'_>, expanded: bool) -> NavEntry {
    let presentation = if visible.children.is_empty() {
        Presentation::Link
    } else {
        Presentation::Group { expanded }
    };
    NavEntry {
        id: visible.node.id.clone(),
        label_key: visible.node.label_key.clone(),
        path: visible.path.map(str::to_string),
        presentation,
        children: visible
            .children
            .into_iter()
            .map(|child| shape(child, expanded))
            .collect(),
    }
}

fn slim(visible: Visible<'_>) -> NavEntry {
    if visible.children.is_empty() {
        return shape(visible, false);
    }

    let mut links = Vec::new();
    for child in visible.children {
        flatten_into(child, &mut links);
    }
    NavEntry {
        id: visible.node.id.clone(),
        label_key: visible.node.label_key.clone(),
        path: visible.path.map(str::to_string),
        presentation: Presentation::Flyout,
        children: links,
    }
}

/// Second-level groups collapse into the flyout as a flat list of links
fn flatten_into(visible: Visible<'_>, links: &mut Vec<NavEntry>) {
    if let Some(path) = visible.path {
        links.push(NavEntry {
            id: visible.node.id.clone(),
            label_key: visible.node.label_key.clone(),
            path: Some(path.to_string()),
            presentation: Presentation::Link,
            children: Vec::new(),
        });
    }
    for child in visible.children {
        flatten_into(child, links);
    }
}

/// Every capability some node in `tree` asks for
pub fn capabilities_in(tree: &[NavNode]) -> BTreeSet<Capability> {
    let mut found = BTreeSet::new();
    for node in tree {
        found.extend(node.required_capabilities.iter().cloned());
        found.extend(capabilities_in(&node.children));
    }
    found
}

/// Load a navigation tree definition from a JSON file
pub fn load_tree(path: &Path) -> Result<Vec<NavNode>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read navigation tree from {:?}", path))?;
    let tree: Vec<NavNode> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse navigation tree from {:?}", path))?;
    info!(path = %path.display(), roots = tree.len(), "Loaded navigation tree");
    Ok(tree)
}

/// Built-in tree used when the host supplies none
pub fn default_tree() -> Vec<NavNode> {
    vec![
        NavNode::group(
            "dashboards",
            "nav.dashboards",
            vec![
                NavNode::link("analytics", "nav.analytics", "/dashboards/analytics"),
                NavNode::link("crm", "nav.crm", "/dashboards/crm").requires("crm.read"),
                NavNode::link("ecommerce", "nav.ecommerce", "/dashboards/ecommerce").requires("sales.read"),
            ],
        ),
        NavNode::group(
            "apps",
            "nav.apps",
            vec![
                NavNode::link("calendar", "nav.calendar", "/apps/calendar"),
                NavNode::group(
                    "invoice",
                    "nav.invoice",
                    vec![
                        NavNode::link("invoice-list", "nav.invoiceList", "/apps/invoice/list"),
                        NavNode::link("invoice-add", "nav.invoiceAdd", "/apps/invoice/add").requires("invoice.write"),
                    ],
                )
                .requires("invoice.read"),
                NavNode::group(
                    "user",
                    "nav.user",
                    vec![
                        NavNode::link("user-list", "nav.userList", "/apps/user/list"),
                        NavNode::link("user-view", "nav.userView", "/apps/user/view"),
                    ],
                )
                .requires("user.read"),
            ],
        ),
        NavNode::group(
            "admin",
            "nav.admin",
            vec![
                NavNode::link("roles", "nav.roles", "/admin/roles"),
                NavNode::link("permissions", "nav.permissions", "/admin/permissions"),
            ],
        )
        .requires("admin"),
        NavNode::link("docs", "nav.documentation", "https://docs.example.com"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(entries: &[NavEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    fn all_entries(entries: &[NavEntry]) -> Vec<&NavEntry> {
        entries.iter().flat_map(NavEntry::walk).collect()
    }

    fn find<'a>(tree: &'a [NavNode], id: &str) -> Option<&'a NavNode> {
        tree.iter()
            .find_map(|node| if node.id == id { Some(node) } else { find(&node.children, id) })
    }

    #[test]
    fn test_anonymous_sees_only_unrestricted_nodes() {
        let tree = default_tree();
        let entries = filter(&tree, &Identity::anonymous(), NavigationMenuType::Default);

        assert_eq!(ids(&entries), vec!["dashboards", "apps", "docs"]);
        for entry in all_entries(&entries) {
            let node = find(&tree, &entry.id).unwrap();
            assert!(node.required_capabilities.is_empty(), "{} should be hidden", entry.id);
        }
    }

    #[test]
    fn test_never_returns_node_outside_capabilities() {
        let tree = default_tree();
        let identity = Identity::with_capabilities(["invoice.read", "crm.read"]);
        for &menu_type in NavigationMenuType::ALL {
            let entries = filter(&tree, &identity, menu_type);
            for entry in all_entries(&entries) {
                let node = find(&tree, &entry.id).unwrap();
                assert!(identity.holds_all(&node.required_capabilities));
            }
        }
    }

    #[test]
    fn test_parent_without_capability_hides_children() {
        let tree = default_tree();
        // invoice.write alone is not enough: the invoice group needs invoice.read
        let identity = Identity::with_capabilities(["invoice.write"]);
        let entries = filter(&tree, &identity, NavigationMenuType::Stacked);
        assert!(all_entries(&entries).iter().all(|e| e.id != "invoice-add"));
    }

    #[test]
    fn test_group_with_no_visible_children_is_pruned() {
        let tree = vec![
            NavNode::group("reports", "nav.reports", vec![NavNode::link("sales", "nav.sales", "/r/sales").requires("sales.read")]),
            NavNode::link("home", "nav.home", "/"),
        ];
        let entries = filter(&tree, &Identity::anonymous(), NavigationMenuType::Default);
        assert_eq!(ids(&entries), vec!["home"]);
    }

    #[test]
    fn test_leaf_without_valid_path_is_pruned() {
        let broken = NavNode::link("broken", "nav.broken", "   ");
        let relative = NavNode::link("relative", "nav.relative", "relative/path");
        let tree = vec![broken, relative, NavNode::link("ok", "nav.ok", "/ok")];

        let entries = filter(&tree, &Identity::anonymous(), NavigationMenuType::Default);
        assert_eq!(ids(&entries), vec!["ok"]);
    }

    #[test]
    fn test_filtering_preserves_sibling_order() {
        let tree = default_tree();
        let identity = Identity::with_capabilities(["admin", "user.read", "invoice.read", "sales.read", "crm.read"]);
        let entries = filter(&tree, &identity, NavigationMenuType::Stacked);

        assert_eq!(ids(&entries), vec!["dashboards", "apps", "admin", "docs"]);
        assert_eq!(ids(&entries[0].children), vec!["analytics", "crm", "ecommerce"]);
        assert_eq!(ids(&entries[1].children), vec!["calendar", "invoice", "user"]);
    }

    #[test]
    fn test_default_collapses_and_stacked_expands_groups() {
        let tree = default_tree();
        let identity = Identity::anonymous();

        let default = filter(&tree, &identity, NavigationMenuType::Default);
        assert_eq!(default[0].presentation, Presentation::Group { expanded: false });
        assert_eq!(default[2].presentation, Presentation::Link);

        let stacked = filter(&tree, &identity, NavigationMenuType::Stacked);
        assert_eq!(stacked[0].presentation, Presentation::Group { expanded: true });
    }

    #[test]
    fn test_slim_collapses_second_level_groups_into_flyouts() {
        let tree = default_tree();
        let identity = Identity::with_capabilities(["invoice.read", "user.read"]);
        let entries = filter(&tree, &identity, NavigationMenuType::Slim);

        let apps = &entries[1];
        assert_eq!(apps.presentation, Presentation::Flyout);
        assert_eq!(
            ids(&apps.children),
            vec!["calendar", "invoice-list", "user-list", "user-view"]
        );
        assert!(apps.children.iter().all(|c| c.presentation == Presentation::Link && c.children.is_empty()));

        let docs = entries.last().unwrap();
        assert_eq!(docs.presentation, Presentation::Link);
    }

    #[test]
    fn test_group_with_own_path_survives_without_children() {
        let tree = vec![NavNode {
            path: Some("/settings".to_string()),
            ..NavNode::group("settings", "nav.settings", vec![NavNode::link("danger", "nav.danger", "/settings/danger").requires("owner")])
        }];
        let entries = filter(&tree, &Identity::anonymous(), NavigationMenuType::Default);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].presentation, Presentation::Link);
        assert_eq!(entries[0].path.as_deref(), Some("/settings"));
    }

    #[test]
    fn test_capabilities_in_collects_nested_requirements() {
        let found: Vec<String> = capabilities_in(&default_tree())
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        assert_eq!(
            found,
            vec!["admin", "crm.read", "invoice.read", "invoice.write", "sales.read", "user.read"]
        );
    }

    #[test]
    fn test_tree_loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.json");
        fs::write(
            &path,
            r#"[{"id":"home","labelKey":"nav.home","path":"/"},
                {"id":"ops","labelKey":"nav.ops","requiredCapabilities":["ops"],
                 "children":[{"id":"jobs","labelKey":"nav.jobs","path":"/ops/jobs"}]}]"#,
        )
        .unwrap();

        let tree = load_tree(&path).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree[1].required_capabilities.contains(&Capability::from("ops")));

        let entries = filter(&tree, &Identity::with_capabilities(["ops"]), NavigationMenuType::Default);
        assert_eq!(ids(&entries), vec!["home", "ops"]);
    }
}
