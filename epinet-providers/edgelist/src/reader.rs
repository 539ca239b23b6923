use std::{
    collections::HashMap,
    io::{BufRead, Lines},
};

use epinet_core::{Network, NodeId};
use tracing::debug;

use crate::{EdgeListError, EdgeListOptions};

/// Streams network snapshots out of an edge list.
///
/// Every snapshot is a fresh [`Network`]; labels are scoped to the snapshot
/// in which they appear. Two sentinels in a row yield an empty network, and
/// input ending without a sentinel closes the last snapshot. Blank and
/// comment lines after the last sentinel open no snapshot. Iteration stops
/// after the first error.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use epinet_providers_edgelist::{EdgeListOptions, EdgeListReader};
///
/// let input = "a,b\nb,c\nBREAK\na,c\n";
/// let snapshots: Vec<_> = EdgeListReader::new(Cursor::new(input), EdgeListOptions::default())
///     .collect::<Result<_, _>>()?;
/// assert_eq!(snapshots.len(), 2);
/// assert_eq!(snapshots[0].edge_count(), 2);
/// assert_eq!(snapshots[1].size(), 2);
/// # Ok::<(), epinet_providers_edgelist::EdgeListError>(())
/// ```
pub struct EdgeListReader<R> {
    lines: Lines<R>,
    options: EdgeListOptions,
    line: usize,
    snapshots: usize,
    finished: bool,
}

impl<R: BufRead> EdgeListReader<R> {
    /// Wraps `input`, reading snapshots with `options`.
    #[must_use]
    pub fn new(input: R, options: EdgeListOptions) -> Self {
        Self {
            lines: input.lines(),
            options,
            line: 0,
            snapshots: 0,
            finished: false,
        }
    }

    /// Snapshots yielded so far.
    #[must_use]
    pub fn snapshots_read(&self) -> usize {
        self.snapshots
    }

    fn next_snapshot(&mut self) -> Result<Option<Network>, EdgeListError> {
        self.options.check()?;
        let mut builder = SnapshotBuilder::new(self.options.empty_network());
        let mut touched = false;
        while let Some(raw) = self.lines.next() {
            let raw = raw?;
            self.line += 1;
            let text = raw.trim();
            if text == self.options.sentinel() {
                return Ok(Some(builder.finish()));
            }
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            touched = true;
            let labels = split_labels(text, self.options.separator());
            let blank = labels.iter().any(|label| label.is_empty());
            match labels.as_slice() {
                [single] if !blank => {
                    builder.node(single);
                }
                [a, b] if !blank => builder.connect(a, b)?,
                _ => {
                    return Err(EdgeListError::MalformedLine {
                        line: self.line,
                        content: raw,
                    });
                }
            }
        }
        Ok(touched.then(|| builder.finish()))
    }
}

impl<R: BufRead> Iterator for EdgeListReader<R> {
    type Item = Result<Network, EdgeListError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_snapshot() {
            Ok(Some(net)) => {
                self.snapshots += 1;
                debug!(
                    snapshot = self.snapshots,
                    nodes = net.size(),
                    edges = net.edge_count(),
                    "snapshot read"
                );
                Some(Ok(net))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

/// Reads the first snapshot, or an empty network for empty input.
///
/// # Errors
/// Returns [`EdgeListError`] for unreadable input or malformed lines.
pub fn read_network<R: BufRead>(input: R, options: &EdgeListOptions) -> Result<Network, EdgeListError> {
    let empty = options.empty_network();
    EdgeListReader::new(input, options.clone())
        .next()
        .unwrap_or(Ok(empty))
}

fn split_labels(text: &str, separator: char) -> Vec<&str> {
    text.split(separator)
        .map(str::trim)
        .filter(|label| !(separator.is_whitespace() && label.is_empty()))
        .collect()
}

struct SnapshotBuilder {
    net: Network,
    ids: HashMap<String, NodeId>,
}

impl SnapshotBuilder {
    fn new(net: Network) -> Self {
        Self {
            net,
            ids: HashMap::new(),
        }
    }

    fn node(&mut self, label: &str) -> NodeId {
        if let Some(&id) = self.ids.get(label) {
            return id;
        }
        let id = self.net.add_named_node(label);
        self.ids.insert(label.to_owned(), id);
        id
    }

    fn connect(&mut self, a: &str, b: &str) -> Result<(), EdgeListError> {
        let a = self.node(a);
        let b = self.node(b);
        self.net.connect(a, b)?;
        Ok(())
    }

    fn finish(self) -> Network {
        self.net
    }
}
