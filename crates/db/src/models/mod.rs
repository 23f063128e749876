pub mod activity;
pub mod automation_log;
pub mod bim_file;
pub mod clash;
pub mod company;
pub mod ids;
pub mod kpi;
pub mod project;
pub mod session;
pub mod stats;
pub mod task;
pub mod team;
pub mod user;
