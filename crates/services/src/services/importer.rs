use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use db::{
    models::{
        company::Company,
        project::{derive_project_code, CreateProject, Project, ProjectError, UpdateProject},
        task::{CreateTask, Task, TaskError},
        team::{CreateTeamMember, TeamError, TeamMember},
        user::{CreateUser, User, UserError},
    },
    types::{Priority, ProjectStatus, TaskStatus, TeamType, UserRole},
};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

const BIM_KEYWORDS: [&str; 4] = ["LOD", "COBie", "BOQ", "Laser Scanning"];

const EMAIL_DOMAIN: &str = "datumauto.com";

/// Accounts created from the Team sheet start with this password until
/// the member logs in and changes it.
const DEFAULT_IMPORT_PASSWORD: &str = "changeme123";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Workbook(#[from] calamine::Error),
    #[error("Worksheet {0} not found in workbook")]
    MissingSheet(String),
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Team(#[from] TeamError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMember {
    pub team_type: TeamType,
    pub role: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportedProject {
    pub project_number: i32,
    pub name: String,
    pub sector: Option<String>,
    pub authority_client: Option<String>,
    pub switzel_client: Option<String>,
    pub location: Option<String>,
    pub scope_of_work: Option<String>,
    pub bim_requirements: Vec<String>,
    pub timeline_start: Option<NaiveDate>,
    pub timeline_end: Option<NaiveDate>,
    pub team: Vec<ImportedMember>,
}

#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct ImportSummary {
    pub projects_created: usize,
    pub projects_skipped: usize,
    pub team_members_created: usize,
    pub progress_updates: usize,
    pub tasks_created: usize,
    pub users_created: usize,
    pub rows_skipped: usize,
}

/// "Project 3" style headers carry the project number.
pub fn extract_project_number(text: &str) -> Option<i32> {
    let rest = text.trim().strip_prefix("Project")?.trim();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    match name {
        "January" => Some(1),
        "February" => Some(2),
        "March" => Some(3),
        "April" => Some(4),
        "May" => Some(5),
        "June" => Some(6),
        "July" => Some(7),
        "August" => Some(8),
        "September" => Some(9),
        "October" => Some(10),
        "November" => Some(11),
        "December" => Some(12),
        _ => None,
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|d| d.pred_opt().unwrap_or(d))
}

/// Parse a "June-2025 to May-2026" range into first-of-month and
/// last-of-month dates.
pub fn parse_timeline(timeline: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let Some((start_text, end_text)) = timeline.split_once(" to ") else {
        return (None, None);
    };
    let parse_month_year = |text: &str| -> Option<(i32, u32)> {
        let (month_name, year) = text.trim().split_once('-')?;
        Some((year.trim().parse().ok()?, month_number(month_name.trim())?))
    };
    let start = parse_month_year(start_text)
        .and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1));
    let end = parse_month_year(end_text).and_then(|(year, month)| last_day_of_month(year, month));
    (start, end)
}

pub fn determine_task_status(status_text: &str, progress: i32) -> TaskStatus {
    if progress >= 100 {
        return TaskStatus::Completed;
    }
    let lower = status_text.to_lowercase();
    if lower.contains("delayed") {
        TaskStatus::Delayed
    } else if lower.contains("progress") {
        TaskStatus::InProgress
    } else {
        TaskStatus::NotStarted
    }
}

pub fn map_role_to_user_role(excel_role: &str) -> UserRole {
    match excel_role {
        "Director" => UserRole::Director,
        "BIM Lead" => UserRole::BimManager,
        "Project Manager" => UserRole::ProjectManager,
        "BIM Coordinator" => UserRole::BimCoordinator,
        _ => UserRole::BimModeler,
    }
}

/// "Ahmed Hamad" becomes "ahmed.hamad@datumauto.com".
pub fn derive_email(name: &str) -> String {
    let local: String = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(".");
    format!("{local}@{EMAIL_DOMAIN}")
}

fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or(name).to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Completion cells come back either as a plain percentage ("45") or as
/// the fraction Excel stores behind a percent-formatted cell ("0.45").
pub fn parse_percent(text: &str) -> Option<i32> {
    let trimmed = text.trim().trim_end_matches('%').trim();
    let value: f64 = trimmed.parse().ok()?;
    let percent = if value <= 1.0 && trimmed.contains('.') {
        value * 100.0
    } else {
        value
    };
    Some((percent.round() as i32).clamp(0, 100))
}

fn parse_sheet_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn team_heading(cell: &str) -> Option<TeamType> {
    let lower = cell.to_lowercase();
    // The MEP production section is headed by a bare "MEP" cell, with no
    // "Team:" suffix like the other sections.
    if lower == "mep" {
        return Some(TeamType::ProductionMep);
    }
    if !lower.contains("team") {
        return None;
    }
    if lower.contains("management") {
        Some(TeamType::Management)
    } else if lower.contains("site") {
        Some(TeamType::Site)
    } else if lower.contains("mep") {
        Some(TeamType::ProductionMep)
    } else if lower.contains("production") || lower.contains("architecture") {
        Some(TeamType::ProductionArch)
    } else {
        None
    }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Walk the free-form Sheet1 layout: each "Project N" header in column B
/// opens a block of labelled rows and team sections that run until the
/// next header.
pub fn scrape_projects(grid: &[Vec<String>]) -> Vec<ImportedProject> {
    let mut projects: Vec<ImportedProject> = Vec::new();
    let mut current: Option<ImportedProject> = None;
    let mut current_team: Option<TeamType> = None;

    for row in grid {
        let header = cell(row, 1);
        if header.starts_with("Project ")
            && let Some(number) = extract_project_number(header)
        {
            if let Some(done) = current.take() {
                projects.push(done);
            }
            current = Some(ImportedProject {
                project_number: number,
                ..Default::default()
            });
            current_team = None;
            continue;
        }

        let Some(project) = current.as_mut() else {
            continue;
        };

        for (col, value) in row.iter().enumerate() {
            let label = value.trim();
            if label.is_empty() {
                continue;
            }
            let next = cell(row, col + 1).trim().to_string();
            let assign = |target: &mut Option<String>, value: String| {
                if !value.is_empty() {
                    *target = Some(value);
                }
            };
            match label {
                "Project Name:" => {
                    if !next.is_empty() {
                        project.name = next;
                    }
                }
                "Sector:" => assign(&mut project.sector, next),
                "Authority / Main claint" => assign(&mut project.authority_client, next),
                "Switzel Client Name:" => assign(&mut project.switzel_client, next),
                "Project Location" => assign(&mut project.location, next),
                "Scope of Work" => assign(&mut project.scope_of_work, next),
                "Project Time line" => {
                    let (start, end) = parse_timeline(&next);
                    project.timeline_start = start;
                    project.timeline_end = end;
                }
                other => {
                    if let Some(team_type) = team_heading(other) {
                        current_team = Some(team_type);
                    } else if BIM_KEYWORDS.iter().any(|kw| other.contains(kw))
                        && !project.bim_requirements.iter().any(|r| r == other)
                    {
                        project.bim_requirements.push(other.to_string());
                    }
                }
            }
        }

        // Inside a team section, column C holds the role and column D the
        // member name.
        if let Some(team_type) = current_team.clone() {
            let role = cell(row, 2).trim().trim_end_matches(':').to_string();
            let name = cell(row, 3).trim().to_string();
            if !role.is_empty() && !name.is_empty() && !role.contains("Team") {
                project.team.push(ImportedMember {
                    team_type,
                    role,
                    name,
                });
            }
        }
    }

    if let Some(done) = current.take() {
        projects.push(done);
    }
    projects.retain(|p| !p.name.is_empty());
    projects
}

fn range_to_grid(range: &calamine::Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|value| match value {
                    Data::Empty => String::new(),
                    other => other.to_string().trim().to_string(),
                })
                .collect()
        })
        .collect()
}

/// The Projects, Tasks and Team sheets are plain tables with a header
/// row, unlike the free-form Sheet1 layout.
pub struct TabularSheet {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularSheet {
    pub fn from_grid(mut grid: Vec<Vec<String>>) -> Option<Self> {
        if grid.is_empty() {
            return None;
        }
        let headers = grid.remove(0);
        Some(Self { headers, rows: grid })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn field<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|idx| cell(row, idx))
            .unwrap_or("")
            .trim()
    }
}

/// Apply "% Complete" updates from the Projects sheet to projects
/// matched by code. Unknown codes are counted and skipped.
async fn apply_projects_sheet<C: ConnectionTrait>(
    db: &C,
    sheet: &TabularSheet,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    for row in sheet.rows() {
        let code = sheet.field(row, "Project ID");
        let progress = parse_percent(sheet.field(row, "% Complete"));
        if code.is_empty() || progress.is_none() {
            summary.rows_skipped += 1;
            continue;
        }
        let Some(project) = Project::find_by_code(db, code).await? else {
            summary.rows_skipped += 1;
            continue;
        };
        Project::update(
            db,
            project.id,
            &UpdateProject {
                progress,
                ..Default::default()
            },
        )
        .await?;
        summary.progress_updates += 1;
    }
    Ok(())
}

async fn apply_tasks_sheet<C: ConnectionTrait>(
    db: &C,
    sheet: &TabularSheet,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    for row in sheet.rows() {
        let code = sheet.field(row, "Project ID");
        let name = sheet.field(row, "Task Name");
        if code.is_empty() || name.is_empty() {
            summary.rows_skipped += 1;
            continue;
        }
        let Some(project) = Project::find_by_code(db, code).await? else {
            summary.rows_skipped += 1;
            continue;
        };
        let progress = parse_percent(sheet.field(row, "% Complete")).unwrap_or(0);
        let status = determine_task_status(sheet.field(row, "Status"), progress);
        let assignee = sheet.field(row, "Assigned To");
        let assigned_to = if assignee.is_empty() {
            None
        } else {
            User::find_by_email(db, &derive_email(assignee))
                .await?
                .map(|u| u.id)
        };
        Task::create(
            db,
            &CreateTask {
                project_id: project.id,
                name: name.to_string(),
                description: None,
                assigned_to,
                discipline: None,
                start_date: parse_sheet_date(sheet.field(row, "Start Date")),
                end_date: parse_sheet_date(sheet.field(row, "End Date")),
                status: Some(status),
                priority: None,
                progress: Some(progress),
                estimated_hours: None,
            },
            None,
        )
        .await?;
        summary.tasks_created += 1;
    }
    Ok(())
}

/// Upsert accounts from the Team sheet, keyed by the email derived from
/// the member name. Existing accounts are left untouched.
async fn apply_team_sheet<C: ConnectionTrait>(
    db: &C,
    sheet: &TabularSheet,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    let company = Company::find_or_create_default(db, "DatumAuto").await?;
    let mut default_hash: Option<String> = None;
    for row in sheet.rows() {
        let name = sheet.field(row, "Name");
        let role = sheet.field(row, "Role");
        if name.is_empty() || role.is_empty() {
            summary.rows_skipped += 1;
            continue;
        }
        let email = derive_email(name);
        if User::find_by_email(db, &email).await?.is_some() {
            summary.rows_skipped += 1;
            continue;
        }
        // Hash lazily so workbooks without new members skip the cost.
        let hash = match &default_hash {
            Some(hash) => hash.clone(),
            None => {
                let hash = bcrypt::hash(DEFAULT_IMPORT_PASSWORD, bcrypt::DEFAULT_COST)?;
                default_hash = Some(hash.clone());
                hash
            }
        };
        let (first_name, last_name) = split_name(name);
        User::create(
            db,
            company.id,
            &CreateUser {
                email,
                password_hash: hash,
                first_name,
                last_name,
                role: map_role_to_user_role(role),
                department: Some(sheet.field(row, "Department").to_string())
                    .filter(|d| !d.is_empty()),
                phone: None,
            },
        )
        .await?;
        summary.users_created += 1;
    }
    Ok(())
}

/// Imported projects are live work in delivery, so they enter the board
/// as active and high priority rather than the planning defaults.
pub fn project_payload(imported: &ImportedProject, code: String) -> CreateProject {
    let bim_requirements = if imported.bim_requirements.is_empty() {
        None
    } else {
        Some(serde_json::json!(imported.bim_requirements))
    };
    CreateProject {
        name: imported.name.clone(),
        project_code: Some(code),
        project_number: Some(imported.project_number),
        sector: imported.sector.clone(),
        authority_client: imported.authority_client.clone(),
        switzel_client: imported.switzel_client.clone(),
        location: imported.location.clone(),
        scope_of_work: imported.scope_of_work.clone(),
        bim_requirements,
        timeline_start: imported.timeline_start,
        timeline_end: imported.timeline_end,
        status: Some(ProjectStatus::Active),
        priority: Some(Priority::High),
        ..Default::default()
    }
}

/// Import projects and their teams from the planning workbook. Projects
/// whose derived code already exists are left untouched.
pub async fn import_workbook<C: ConnectionTrait>(
    db: &C,
    path: &Path,
) -> Result<ImportSummary, ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range("Sheet1")
        .map_err(|_| ImportError::MissingSheet("Sheet1".to_string()))?;
    let grid = range_to_grid(&range);
    let scraped = scrape_projects(&grid);
    tracing::info!("Workbook yielded {} project blocks", scraped.len());

    let mut summary = ImportSummary::default();
    for imported in scraped {
        let code = derive_project_code(&imported.name, imported.project_number);
        if Project::find_by_code(db, &code).await?.is_some() {
            summary.projects_skipped += 1;
            continue;
        }
        let project = Project::create(db, &project_payload(&imported, code)).await?;
        summary.projects_created += 1;

        for member in &imported.team {
            TeamMember::create(
                db,
                &CreateTeamMember {
                    project_id: project.id,
                    team_type: member.team_type.clone(),
                    role: member.role.clone(),
                    user_id: None,
                    custom_name: Some(member.name.clone()),
                    is_lead: Some(member.role.to_lowercase().contains("manager")),
                    assigned_date: None,
                },
            )
            .await?;
            summary.team_members_created += 1;
        }
    }

    // The tabular sheets are optional; older workbooks only carry Sheet1.
    if let Some(sheet) = tabular_sheet(&mut workbook, "Team") {
        apply_team_sheet(db, &sheet, &mut summary).await?;
    }
    if let Some(sheet) = tabular_sheet(&mut workbook, "Projects") {
        apply_projects_sheet(db, &sheet, &mut summary).await?;
    }
    if let Some(sheet) = tabular_sheet(&mut workbook, "Tasks") {
        apply_tasks_sheet(db, &sheet, &mut summary).await?;
    }
    Ok(summary)
}

fn tabular_sheet(
    workbook: &mut calamine::Sheets<std::io::BufReader<std::fs::File>>,
    name: &str,
) -> Option<TabularSheet> {
    let range = workbook.worksheet_range(name).ok()?;
    TabularSheet::from_grid(range_to_grid(&range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn project_number_extraction() {
        assert_eq!(extract_project_number("Project 3"), Some(3));
        assert_eq!(extract_project_number("Project 12 "), Some(12));
        assert_eq!(extract_project_number("Protocol 3"), None);
    }

    #[test]
    fn timeline_spans_whole_months() {
        let (start, end) = parse_timeline("June-2025 to May-2026");
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 5, 31));
    }

    #[test]
    fn timeline_garbage_is_ignored() {
        assert_eq!(parse_timeline("TBD"), (None, None));
        assert_eq!(parse_timeline("Smarch-2025 to May-2026").0, None);
    }

    #[test]
    fn task_status_from_sheet_values() {
        assert_eq!(determine_task_status("In Progress", 40), TaskStatus::InProgress);
        assert_eq!(determine_task_status("Delayed", 40), TaskStatus::Delayed);
        assert_eq!(determine_task_status("Delayed", 100), TaskStatus::Completed);
        assert_eq!(determine_task_status("", 0), TaskStatus::NotStarted);
    }

    #[test]
    fn roles_map_to_known_positions() {
        assert_eq!(map_role_to_user_role("BIM Lead"), UserRole::BimManager);
        assert_eq!(map_role_to_user_role("Director"), UserRole::Director);
        assert_eq!(map_role_to_user_role("Tea Boy"), UserRole::BimModeler);
    }

    #[test]
    fn scrape_reads_labelled_blocks() {
        let grid = vec![
            row(&["", "Project 1"]),
            row(&["", "Project Name:", "Marina Bay Towers"]),
            row(&["", "Sector:", "Residential"]),
            row(&["", "Switzel Client Name:", "Switzel Gulf"]),
            row(&["", "Project Time line", "June-2025 to May-2026"]),
            row(&["", "LOD 300 for all disciplines"]),
            row(&["", "Management Team:"]),
            row(&["", "", "Project Manager:", "A. Hamad"]),
            row(&["", "", "BIM Lead:", "S. Iqbal"]),
            row(&["", "Project 2"]),
            row(&["", "Project Name:", "Downtown Hospital"]),
        ];
        let projects = scrape_projects(&grid);
        assert_eq!(projects.len(), 2);

        let first = &projects[0];
        assert_eq!(first.project_number, 1);
        assert_eq!(first.name, "Marina Bay Towers");
        assert_eq!(first.sector.as_deref(), Some("Residential"));
        assert_eq!(first.switzel_client.as_deref(), Some("Switzel Gulf"));
        assert_eq!(first.timeline_start, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(first.bim_requirements, vec!["LOD 300 for all disciplines"]);
        assert_eq!(first.team.len(), 2);
        assert_eq!(first.team[0].role, "Project Manager");
        assert_eq!(first.team[0].name, "A. Hamad");
        assert_eq!(first.team[0].team_type, TeamType::Management);

        assert_eq!(projects[1].name, "Downtown Hospital");
        assert!(projects[1].team.is_empty());
    }

    #[test]
    fn imported_projects_enter_as_active_high_priority() {
        let imported = ImportedProject {
            project_number: 2,
            name: "Downtown Hospital".to_string(),
            ..Default::default()
        };
        let payload = project_payload(&imported, "DH-002".to_string());
        assert_eq!(payload.status, Some(ProjectStatus::Active));
        assert_eq!(payload.priority, Some(Priority::High));
        assert_eq!(payload.project_code.as_deref(), Some("DH-002"));
    }

    #[test]
    fn bare_mep_heading_opens_the_mep_section() {
        let grid = vec![
            row(&["", "Project 1"]),
            row(&["", "Project Name:", "Marina Bay Towers"]),
            row(&["", "MEP"]),
            row(&["", "", "BIM Modeler:", "R. Fernandes"]),
        ];
        let projects = scrape_projects(&grid);
        assert_eq!(projects[0].team.len(), 1);
        assert_eq!(projects[0].team[0].team_type, TeamType::ProductionMep);
        assert_eq!(projects[0].team[0].name, "R. Fernandes");
    }

    #[test]
    fn emails_derive_from_member_names() {
        assert_eq!(derive_email("Ahmed Hamad"), "ahmed.hamad@datumauto.com");
        assert_eq!(derive_email("  Sara  Al Iqbal "), "sara.al.iqbal@datumauto.com");
    }

    #[test]
    fn percent_cells_accept_fractions_and_whole_numbers() {
        assert_eq!(parse_percent("45"), Some(45));
        assert_eq!(parse_percent("45%"), Some(45));
        assert_eq!(parse_percent("0.45"), Some(45));
        assert_eq!(parse_percent("1"), Some(1));
        assert_eq!(parse_percent("250"), Some(100));
        assert_eq!(parse_percent("n/a"), None);
    }

    #[test]
    fn tabular_sheets_look_up_columns_by_header() {
        let sheet = TabularSheet::from_grid(vec![
            row(&["Project ID", "Project Name", "% Complete"]),
            row(&["MBT-001", "Marina Bay Towers", "0.45"]),
        ])
        .unwrap();
        let first = &sheet.rows()[0];
        assert_eq!(sheet.field(first, "Project ID"), "MBT-001");
        assert_eq!(sheet.field(first, "% Complete"), "0.45");
        assert_eq!(sheet.field(first, "Missing"), "");
        assert!(TabularSheet::from_grid(Vec::new()).is_none());
    }

    #[test]
    fn scrape_skips_unnamed_blocks() {
        let grid = vec![row(&["", "Project 1"]), row(&["", "Sector:", "Aviation"])];
        assert!(scrape_projects(&grid).is_empty());
    }
}
