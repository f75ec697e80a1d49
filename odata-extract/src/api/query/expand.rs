//! Expand/select path tree
//!
//! Merges slash-separated `$expand` paths into a tree and attaches `$select`
//! items to the level they address. For example expand `empInfo,empInfo/jobInfoNav`
//! with select `userId,empInfo/jobInfoNav/jobTitle` becomes:
//!
//! ```text
//! (root)        selects: userId
//! └─ empInfo
//!    └─ jobInfoNav   selects: jobTitle
//! ```
//!
//! Children keep first-seen order; that order becomes column order.

/// A node in the expand tree representing one navigation hop
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpandNode {
    /// Select items addressed to this level, in the order given
    selects: Vec<String>,
    /// Nested expands (name, deeper node) in first-seen order
    children: Vec<(String, ExpandNode)>,
}

impl ExpandNode {
    pub fn selects(&self) -> &[String] {
        &self.selects
    }

    pub fn children(&self) -> &[(String, ExpandNode)] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&ExpandNode> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut ExpandNode> {
        self.children
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    fn child_or_insert(&mut self, name: &str) -> &mut ExpandNode {
        let index = match self.children.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.children.push((name.to_string(), ExpandNode::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for (name, child) in &self.children {
            let path = join(prefix, name);
            if child.children.is_empty() {
                out.push(path);
            } else {
                child.collect_paths(&path, out);
            }
        }
    }

    fn collect_selects(&self, prefix: &str, out: &mut Vec<String>) {
        for select in &self.selects {
            out.push(join(prefix, select));
        }
        for (name, child) in &self.children {
            child.collect_selects(&join(prefix, name), out);
        }
    }
}

/// A tree structure for expand and select paths
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpandTree {
    root: ExpandNode,
    has_selection: bool,
}

impl ExpandTree {
    /// Create a new empty expand tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from comma-separated expand and select lists
    ///
    /// Returns the select items whose navigation prefix is not expanded.
    pub fn parse(expand: Option<&str>, select: Option<&str>) -> (Self, Vec<String>) {
        let mut tree = Self::new();
        for path in split_list(expand) {
            tree.add_expand_path(path);
        }

        let unmatched = split_list(select)
            .filter(|path| !tree.add_select_path(path))
            .map(str::to_string)
            .collect();

        (tree, unmatched)
    }

    /// Add an expand path like `a/b/c`, creating every intermediate level
    pub fn add_expand_path(&mut self, path: &str) {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.child_or_insert(segment);
        }
    }

    /// Attach a select item to the level named by its prefix
    ///
    /// `empInfo/startDate` lands on the `empInfo` node. Returns `false` when
    /// the prefix is not an expanded path.
    pub fn add_select_path(&mut self, path: &str) -> bool {
        let parts: Vec<&str> = segments(path).collect();
        let Some((field, prefix)) = parts.split_last() else {
            return false;
        };

        let mut node = &mut self.root;
        for segment in prefix {
            match node.child_mut(segment) {
                Some(child) => node = child,
                None => return false,
            }
        }

        self.has_selection = true;
        if !node.selects.iter().any(|s| s == field) {
            node.selects.push(field.to_string());
        }
        true
    }

    pub fn root(&self) -> &ExpandNode {
        &self.root
    }

    /// Whether any select item was given; without one every field is included
    pub fn has_selection(&self) -> bool {
        self.has_selection
    }

    /// Check if the tree is empty (no expand clauses needed)
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Normalized `$expand` items: one entry per leaf path
    ///
    /// Expanding `a/b` implies `a`, so intermediate levels are not repeated.
    pub fn build_expand_clauses(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.collect_paths("", &mut out);
        out
    }

    /// Normalized `$select` items, root level first
    pub fn build_select_clauses(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.collect_selects("", &mut out);
        out
    }
}

fn split_list(list: Option<&str>) -> impl Iterator<Item = &str> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').map(str::trim).filter(|s| !s.is_empty())
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
