use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::app::App;
use crate::render::terminal::{connector, continuation, paint, render_warnings, Color};
use crate::OutputFormat;
use restack_lib::content_tree::{ContentTree, NodeId};
use restack_lib::diagnostics::Diagnostics;
use restack_lib::pipeline::preview_tree;

pub fn run(app: &App, source: &Path, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let tree = preview_tree(source, &app.config, &mut diagnostics)
        .with_context(|| format!("Failed to read index of {}", source.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&node_json(&tree, NodeId::ROOT))?);
        }
        OutputFormat::Plain => {
            println!("{}", tree.root().identifier);
            let children = tree.children(NodeId::ROOT);
            for (idx, child) in children.iter().enumerate() {
                print_node(&tree, *child, "", idx + 1 == children.len(), use_color);
            }
            println!("{} pages", tree.page_count());
        }
    }

    if !diagnostics.is_empty() {
        eprintln!("{}", render_warnings(diagnostics.warnings(), use_color));
    }
    Ok(())
}

fn print_node(tree: &ContentTree, id: NodeId, prefix: &str, is_last: bool, use_color: bool) {
    let node = tree.node(id);
    let label = if node.title != node.segment {
        format!("{} {}", node.segment, paint(&format!("({})", node.title), Color::DIM, use_color))
    } else {
        node.segment.clone()
    };
    let slash = if node.has_children() { "/" } else { "" };
    println!("{}{}{}{}", prefix, connector(is_last), label, slash);

    let child_prefix = format!("{}{}", prefix, continuation(is_last));
    let children = tree.children(id);
    for (idx, child) in children.iter().enumerate() {
        print_node(tree, *child, &child_prefix, idx + 1 == children.len(), use_color);
    }
}

fn node_json(tree: &ContentTree, id: NodeId) -> Value {
    let node = tree.node(id);
    json!({
        "identifier": node.identifier,
        "title": node.title,
        "path": tree.relative_path(id),
        "depth": node.depth,
        "children": tree
            .children(id)
            .iter()
            .map(|child| node_json(tree, *child))
            .collect::<Vec<_>>(),
    })
}
