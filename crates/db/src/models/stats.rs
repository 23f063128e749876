use chrono::Utc;
use sea_orm::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    models::{clash::Clash, project::Project, task::Task, team::TeamMember},
    types::{ProjectStatus, TaskStatus},
};

/// Headline numbers for the dashboard landing page.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DashboardStats {
    pub total_projects: u64,
    pub active_projects: u64,
    pub completed_projects: u64,
    pub on_hold_projects: u64,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub in_progress_tasks: u64,
    pub overdue_tasks: u64,
    pub average_project_progress: f64,
    pub average_task_progress: f64,
    pub team_members: u64,
    pub open_clashes: u64,
}

impl DashboardStats {
    pub async fn compute<C: ConnectionTrait>(db: &C) -> Result<Self, DbErr> {
        let today = Utc::now().date_naive();
        Ok(Self {
            total_projects: Project::count(db).await?,
            active_projects: Project::count_by_status(db, ProjectStatus::Active).await?,
            completed_projects: Project::count_by_status(db, ProjectStatus::Completed).await?,
            on_hold_projects: Project::count_by_status(db, ProjectStatus::OnHold).await?,
            total_tasks: Task::count(db).await?,
            completed_tasks: Task::count_by_status(db, TaskStatus::Completed).await?,
            in_progress_tasks: Task::count_by_status(db, TaskStatus::InProgress).await?,
            overdue_tasks: Task::count_overdue(db, today).await?,
            average_project_progress: Project::average_progress(db).await?,
            average_task_progress: Task::average_progress(db).await?,
            team_members: TeamMember::count(db).await?,
            open_clashes: Clash::count_open(db).await?,
        })
    }
}
