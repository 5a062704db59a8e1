pub mod check;
pub mod context;
pub mod investigate;
pub mod report;
pub mod scan;

pub use check::run_check;
pub use context::{ProjectContext, color_choice_to_mode, load_config, write_output};
pub use investigate::run_investigate;
pub use report::run_report;
pub use scan::run_scan;
