//! Line-oriented edge-list exchange for epinet networks.
//!
//! Each line is `a<sep>b` (connect `a` to `b`, creating either node on first
//! sight) or a single label (declare an isolated node). A sentinel line ends
//! one snapshot, so a single stream can replay a time-varying contact
//! network. Blank lines and lines starting with `#` are ignored.

mod errors;
mod options;
mod reader;
mod writer;

pub use crate::{
    errors::{EdgeListError, EdgeListErrorCode},
    options::{DEFAULT_SENTINEL, DEFAULT_SEPARATOR, EdgeListOptions},
    reader::{EdgeListReader, read_network},
    writer::{write_edge_list, write_snapshots},
};
