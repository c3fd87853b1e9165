//! Classification and aggregation over news articles.
//!
//! Everything here is pure and synchronous: the same input always yields the
//! same output, and nothing touches storage or the network.

pub mod clustering;
pub mod framing;
pub mod language;
pub mod report;
pub mod taxonomy;
pub mod topics;

pub use clustering::{cluster_by_title, sort_by_size, Cluster, Headline};
pub use framing::{count_frames, FrameCounts};
pub use language::normalize_language;
pub use report::{build_report, Report, ReportOptions};
pub use topics::{categorize_text, normalize_topics};
