//! View models
//!
//! Template-backed structs rendered by the dashboard handlers. Templates live
//! in `templates/` and escape every interpolated value unless marked `safe`.

pub mod dashboard;

pub use dashboard::DashboardView;
