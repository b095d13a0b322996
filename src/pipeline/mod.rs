//! Reconstruction pipeline: page partition, section hierarchy, element
//! ordering and the assembling pass.

mod assembler;
mod hierarchy;
mod options;
mod ordering;
mod page_span;
mod report;

pub use assembler::ContentAssembler;
pub use hierarchy::SectionHierarchy;
pub use options::{ErrorMode, ProcessOptions};
pub use ordering::{collect_elements, order_elements};
pub use page_span::PageSpanCalculator;
pub use report::{ProcessOutput, ProcessReport, SkippedElement};
