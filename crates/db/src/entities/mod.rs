pub mod automation_log;
pub mod bim_file;
pub mod clash_detection;
pub mod company;
pub mod project;
pub mod project_kpi;
pub mod project_team;
pub mod task;
pub mod user;
pub mod user_session;
