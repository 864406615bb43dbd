pub mod aggregate;
pub mod error;
pub mod normalize;
pub mod summary;
pub mod types;

pub use aggregate::{aggregate, Classifier, Labeled, NoClassifier};
pub use error::{PulseError, Result};
pub use normalize::normalize;
pub use summary::{RepoSummary, Stats, SummaryDocument, TimelineSeries};
pub use types::{Event, Source};
