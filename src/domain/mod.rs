pub mod product;
pub mod project;
pub mod source;
pub mod subject;
pub mod team;

pub use product::Product;
pub use project::{Project, ProjectError};
pub use source::{SourceInstance, SourceKind};
pub use subject::{MetricOptions, Subject, TechnicalDebtTarget};
pub use team::{Person, Team};
