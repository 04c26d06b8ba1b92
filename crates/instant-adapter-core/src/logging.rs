//! Logging and debugging facilities for Instant Adapter.
//!
//! This module provides debug visualization for inflated view subtrees.
//!
//! # Tracing Integration
//!
//! Instant Adapter uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("instant_adapter=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use instant_adapter_core::logging::ViewTreeDebug;
//! use instant_adapter_core::view::ViewTree;
//!
//! let mut tree = ViewTree::new();
//! let row = tree.create_view("LinearLayout", 1);
//! println!("{}", ViewTreeDebug::new().format_subtree(&tree, row).unwrap());
//! ```

use std::fmt::Write as FmtWrite;

use crate::error::ViewResult;
use crate::view::{NO_ID, ViewId, ViewTree};

/// Style options for view tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
}

/// Configuration for view tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show view handles.
    pub show_handles: bool,
    /// Whether to show text content.
    pub show_text: bool,
    /// Whether to show the keys of attached tags.
    pub show_tags: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_handles: false,
            show_text: true,
            show_tags: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_text: false,
            show_tags: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing view subtrees.
#[derive(Debug, Clone, Default)]
pub struct ViewTreeDebug {
    options: TreeFormatOptions,
}

impl ViewTreeDebug {
    /// Create a new debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(&self, tree: &ViewTree, root: ViewId) -> ViewResult<String> {
        let mut output = String::new();
        self.format_into(tree, root, 0, &mut Vec::new(), &mut output)?;
        Ok(output)
    }

    fn format_into(
        &self,
        tree: &ViewTree,
        id: ViewId,
        depth: usize,
        last_flags: &mut Vec<bool>,
        output: &mut String,
    ) -> ViewResult<()> {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }

        output.push_str(&self.prefix(last_flags));
        output.push_str(tree.class_name(id)?);

        let resource_id = tree.resource_id(id)?;
        if resource_id != NO_ID {
            write!(output, " #{resource_id:#x}").expect("write to String");
        }
        if self.options.show_handles {
            write!(output, " [{id:?}]").expect("write to String");
        }
        if self.options.show_text {
            if let Some(text) = tree.text(id)? {
                write!(output, " {text:?}").expect("write to String");
            }
        }
        if self.options.show_tags {
            let keys = tree.tag_keys(id)?;
            if !keys.is_empty() {
                let keys: Vec<String> = keys.iter().map(|k| format!("{k:#x}")).collect();
                write!(output, " tags={}", keys.join(",")).expect("write to String");
            }
        }
        output.push('\n');

        let children = tree.children(id)?;
        for (i, &child) in children.iter().enumerate() {
            last_flags.push(i + 1 == children.len());
            self.format_into(tree, child, depth + 1, last_flags, output)?;
            last_flags.pop();
        }
        Ok(())
    }

    fn prefix(&self, last_flags: &[bool]) -> String {
        let (pipe, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|   ", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}   ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
        };

        let mut prefix = String::new();
        if let Some((&is_last, ancestors)) = last_flags.split_last() {
            for &ancestor_last in ancestors {
                prefix.push_str(if ancestor_last { "    " } else { pipe });
            }
            prefix.push_str(if is_last { corner } else { tee });
        }
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tree: &mut ViewTree) -> ViewId {
        let root = tree.create_view("LinearLayout", 0x10);
        let name = tree.create_view("TextView", 0x11);
        let age = tree.create_view("TextView", NO_ID);
        tree.add_child(root, name).unwrap();
        tree.add_child(root, age).unwrap();
        tree.set_text(name, "Ada").unwrap();
        tree.set_tag(root, 0x10, 1u8).unwrap();
        root
    }

    #[test]
    fn test_format_hierarchy() {
        let mut tree = ViewTree::new();
        let root = sample(&mut tree);

        let output = ViewTreeDebug::new().format_subtree(&tree, root).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "LinearLayout #0x10 tags=0x10");
        assert!(lines[1].contains("TextView #0x11 \"Ada\""));
        assert!(lines[2].starts_with('\u{2514}'));
    }

    #[test]
    fn test_format_minimal_ascii() {
        let mut tree = ViewTree::new();
        let root = sample(&mut tree);

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        };
        let output = ViewTreeDebug::with_options(options).format_subtree(&tree, root).unwrap();
        assert_eq!(output, "LinearLayout #0x10\n+-- TextView #0x11\n`-- TextView\n");
    }

    #[test]
    fn test_format_max_depth() {
        let mut tree = ViewTree::new();
        let root = sample(&mut tree);

        let options = TreeFormatOptions {
            max_depth: Some(0),
            ..Default::default()
        };
        let output = ViewTreeDebug::with_options(options).format_subtree(&tree, root).unwrap();
        assert_eq!(output.lines().count(), 1);
    }
}
