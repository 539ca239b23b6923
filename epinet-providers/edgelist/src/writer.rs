use std::io::Write;

use epinet_core::{Edge, Network, NodeId};
use tracing::debug;

use crate::{EdgeListError, EdgeListOptions};

/// Writes `net` as one edge-list snapshot, without a trailing sentinel.
///
/// Undirected edges are written once, directed arcs each on their own line.
/// Nodes without any connection follow as single-label lines, including
/// nodes holding nothing but stubs. Nodes are labelled by name, falling back
/// to their handle (`n0`, `n1`, ...). Stubs are not written.
///
/// # Errors
/// Returns [`EdgeListError::UnwritableLabel`] when a label would not read
/// back as the same node, and [`EdgeListError::Io`] when writing fails.
///
/// # Examples
/// ```
/// use epinet_core::{Directedness, Network};
/// use epinet_providers_edgelist::{EdgeListOptions, write_edge_list};
///
/// let mut net = Network::with_seed(Directedness::Undirected, 1);
/// let a = net.add_named_node("a");
/// let b = net.add_named_node("b");
/// net.add_named_node("c");
/// net.connect(a, b)?;
///
/// let mut out = Vec::new();
/// write_edge_list(&net, &mut out, &EdgeListOptions::default())?;
/// assert_eq!(String::from_utf8(out).unwrap(), "a,b\nc\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_edge_list<W: Write>(
    net: &Network,
    out: &mut W,
    options: &EdgeListOptions,
) -> Result<(), EdgeListError> {
    options.check()?;
    let separator = options.separator();
    let mut lines = 0_usize;
    let mut isolated = Vec::new();
    for node in net.nodes() {
        let wired = node
            .edges_out()
            .iter()
            .any(|&id| net.edge(id).is_some_and(|arc| arc.end().is_some()));
        if !wired && node.edges_in().is_empty() {
            isolated.push(node.id());
            continue;
        }
        for arc in node.edges_out().iter().filter_map(|&id| net.edge(id)) {
            let Some(end) = arc.end() else {
                continue;
            };
            if net.is_directed() || is_representative(arc, end) {
                writeln!(
                    out,
                    "{}{separator}{}",
                    label(net, arc.start(), options)?,
                    label(net, end, options)?
                )?;
                lines += 1;
            }
        }
    }
    for node in isolated {
        writeln!(out, "{}", label(net, node, options)?)?;
        lines += 1;
    }
    debug!(lines, nodes = net.size(), "edge list written");
    Ok(())
}

/// Writes every network as a snapshot, each closed by the sentinel.
///
/// # Errors
/// As [`write_edge_list`].
pub fn write_snapshots<'a, W, I>(
    networks: I,
    out: &mut W,
    options: &EdgeListOptions,
) -> Result<(), EdgeListError>
where
    W: Write,
    I: IntoIterator<Item = &'a Network>,
{
    for net in networks {
        write_edge_list(net, out, options)?;
        writeln!(out, "{}", options.sentinel())?;
    }
    Ok(())
}

/// Picks one arc of each undirected pair: the one leaving the lower node, or
/// for a self-loop the one with the lower handle.
fn is_representative(arc: &Edge, end: NodeId) -> bool {
    match arc.start().cmp(&end) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => arc.complement().is_none_or(|other| arc.id() < other),
    }
}

/// A label the reader would parse back to the same node.
fn label(net: &Network, node: NodeId, options: &EdgeListOptions) -> Result<String, EdgeListError> {
    let separator = options.separator();
    let text = net
        .node(node)
        .and_then(|node| node.name())
        .map_or_else(|| node.to_string(), str::to_owned);
    let ambiguous = text.is_empty()
        || text.contains(separator)
        || text.trim() != text
        || text.starts_with('#')
        || text == options.sentinel();
    if ambiguous {
        return Err(EdgeListError::UnwritableLabel {
            label: text,
            separator,
        });
    }
    Ok(text)
}
