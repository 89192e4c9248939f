//! 周期报告：情报报告生成与摘要文本渲染

pub mod intel;
pub mod summary;

pub use intel::{generate_intel_report, IntelReport, REPORT_PARAMS};
pub use summary::{render_summary, CycleReport};
