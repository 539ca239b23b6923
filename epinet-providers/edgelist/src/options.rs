use epinet_core::{Directedness, Network};

use crate::EdgeListError;

/// Separator between the two labels of an edge line.
pub const DEFAULT_SEPARATOR: char = ',';
/// Line that closes one snapshot.
pub const DEFAULT_SENTINEL: &str = "BREAK";

/// How edge lists are parsed and emitted.
///
/// # Examples
/// ```
/// use epinet_core::Directedness;
/// use epinet_providers_edgelist::EdgeListOptions;
///
/// let options = EdgeListOptions::default()
///     .with_separator('\t')
///     .with_directedness(Directedness::Directed);
/// assert_eq!(options.separator(), '\t');
/// assert_eq!(options.sentinel(), "BREAK");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeListOptions {
    separator: char,
    sentinel: String,
    directedness: Directedness,
    seed: Option<u64>,
}

impl Default for EdgeListOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            sentinel: DEFAULT_SENTINEL.to_owned(),
            directedness: Directedness::Undirected,
            seed: None,
        }
    }
}

impl EdgeListOptions {
    /// Sets the label separator.
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Sets the snapshot sentinel line.
    #[must_use]
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Sets the directedness of networks built by the reader.
    #[must_use]
    pub fn with_directedness(mut self, directedness: Directedness) -> Self {
        self.directedness = directedness;
        self
    }

    /// Seeds every network built by the reader with `seed`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Label separator.
    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Line that closes a snapshot.
    #[must_use]
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Directedness of networks built by the reader.
    #[must_use]
    pub fn directedness(&self) -> Directedness {
        self.directedness
    }

    /// Seed given to networks built by the reader, if any.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Rejects separators that cannot delimit labels: `#` starts a comment
    /// and line breaks end the line.
    pub(crate) fn check(&self) -> Result<(), EdgeListError> {
        match self.separator {
            '#' | '\n' | '\r' => Err(EdgeListError::InvalidSeparator {
                separator: self.separator,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn empty_network(&self) -> Network {
        match self.seed {
            Some(seed) => Network::with_seed(self.directedness, seed),
            None => Network::new(self.directedness),
        }
    }
}
