use chrono::{DateTime, NaiveDate, Utc};
use db::{
    models::{
        automation_log::{AutomationLog, AutomationStatus},
        bim_file::BimFile,
        project::Project,
        stats::DashboardStats,
        task::{CreateTask, Task, TaskError, TaskFilter},
        team::TeamMember,
    },
    types::Priority,
};
use regex::Regex;
use sea_orm::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use super::config::AssistantConfig;

const SYSTEM_CONTEXT: &str = "You are the BIM AI Assistant for a construction project \
delivery office.\n\
ROLE: Director of Projects / Head of Project Delivery.\n\
RESPONSIBILITIES: single point of contact for clients on technical and delivery matters; \
lead BIM teams across Architecture, Structure and MEP; define BIM-driven delivery \
strategies; control schedules, budgets, risks and quality; resolve cross-discipline \
coordination issues; standardize BIM, QA/QC and project management processes.\n\
CAPABILITIES: automated reporting, risk analysis, schedule optimization, team \
efficiency analysis, BIM model validation, clash detection automation, ISO-19650 and \
BEP compliance checking, budget forecasting, resource allocation.";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Assistant is not configured; set an API key first")]
    Unconfigured,
    #[error("Assistant request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Assistant returned an unusable response: {0}")]
    BadResponse(String),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Team(#[from] db::models::team::TeamError),
    #[error("Project not found")]
    ProjectNotFound,
    #[error("File not found")]
    FileNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TaskDraft {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub estimated_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct RiskFinding {
    pub level: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ScheduleChange {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: String,
}

/// Structured follow-ups recognized in a free-text model reply.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AssistantAction {
    CreateTask(TaskDraft),
    GenerateReport { title: String },
    IdentifyRisk(Vec<RiskFinding>),
    UpdateSchedule(Vec<ScheduleChange>),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ChatReply {
    pub reply: String,
    pub actions: Vec<AssistantAction>,
    #[ts(type = "Date")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

pub fn extract_priority(text: &str) -> Priority {
    let lower = text.to_lowercase();
    if lower.contains("critical") || lower.contains("urgent") {
        Priority::Critical
    } else if lower.contains("high") {
        Priority::High
    } else if lower.contains("low") {
        Priority::Low
    } else {
        Priority::Medium
    }
}

pub fn extract_hours(text: &str) -> f64 {
    let Ok(re) = Regex::new(r"(?i)(\d+)\s*(?:hour|hr)") else {
        return 8.0;
    };
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(8.0)
}

fn extract_task_draft(reply: &str) -> TaskDraft {
    let name = Regex::new(r#"(?i)task[^"']*["']([^"']+)["']"#)
        .ok()
        .and_then(|re| re.captures(reply))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| format!("AI Task {}", Utc::now().format("%Y-%m-%d")));
    let mut description = reply.chars().take(200).collect::<String>();
    description.insert_str(0, "AI-generated task: ");
    TaskDraft {
        name,
        description,
        priority: extract_priority(reply),
        estimated_hours: extract_hours(reply),
    }
}

fn extract_risks(reply: &str) -> Vec<RiskFinding> {
    let mut findings = Vec::new();
    for level in ["high", "medium", "low"] {
        // Match case-insensitively on the original text; offsets found in a
        // lowercased copy are not valid here when casing changes byte lengths.
        let Ok(re) = Regex::new(&format!("(?i){level} risk")) else {
            continue;
        };
        if let Some(found) = re.find(reply) {
            let excerpt: String = reply[found.start()..].chars().take(500).collect();
            findings.push(RiskFinding {
                level: level.to_string(),
                description: excerpt,
            });
        }
    }
    findings
}

fn extract_schedule_changes(reply: &str) -> Vec<ScheduleChange> {
    let Ok(re) = Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b") else {
        return Vec::new();
    };
    let dates: Vec<NaiveDate> = re
        .find_iter(reply)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if dates.len() < 2 {
        return Vec::new();
    }
    vec![ScheduleChange {
        from_date: dates[0],
        to_date: dates[1],
        reason: "AI-optimized schedule".to_string(),
    }]
}

/// Scan a model reply for phrases that imply a concrete follow-up.
pub fn parse_actions(reply: &str) -> Vec<AssistantAction> {
    let lower = reply.to_lowercase();
    let mut actions = Vec::new();

    if lower.contains("create task") || lower.contains("assign task") {
        actions.push(AssistantAction::CreateTask(extract_task_draft(reply)));
    }
    if lower.contains("generate report") || lower.contains("create report") {
        actions.push(AssistantAction::GenerateReport {
            title: format!("AI Report - {}", Utc::now().format("%Y-%m-%d")),
        });
    }
    if lower.contains("risk")
        && (lower.contains("high") || lower.contains("medium") || lower.contains("low"))
    {
        let findings = extract_risks(reply);
        if !findings.is_empty() {
            actions.push(AssistantAction::IdentifyRisk(findings));
        }
    }
    if lower.contains("reschedule") || lower.contains("delay") || lower.contains("expedite") {
        let changes = extract_schedule_changes(reply);
        if !changes.is_empty() {
            actions.push(AssistantAction::UpdateSchedule(changes));
        }
    }
    actions
}

/// Context block for the director's daily report.
pub fn director_prompt(projects: &[Project], stats: &DashboardStats, due_soon: &[Task]) -> String {
    let overview = projects
        .iter()
        .map(|p| format!("- {}: {}% complete, {} priority", p.name, p.progress, p.priority))
        .collect::<Vec<_>>()
        .join("\n");
    let behind = projects
        .iter()
        .filter(|p| p.progress < 50 && matches!(p.priority, Priority::High | Priority::Critical))
        .map(|p| format!("- {} is behind schedule ({}%)", p.name, p.progress))
        .collect::<Vec<_>>()
        .join("\n");
    let deadlines = due_soon
        .iter()
        .map(|t| {
            format!(
                "- {} due {} ({}% complete)",
                t.name,
                t.end_date.map_or("soon".to_string(), |d| d.to_string()),
                t.progress,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Generate a comprehensive Director's Daily Report.\n\n\
         PROJECT OVERVIEW:\nTotal Projects: {}\n\n{overview}\n\n\
         PERFORMANCE METRICS:\n- Total Tasks: {}\n- Completed Tasks: {}\n\
         - Overdue Tasks: {}\n- Team Members: {}\n\n\
         UPCOMING DEADLINES (next 7 days):\n{deadlines}\n\n\
         CRITICAL ISSUES:\n{behind}\n\n\
         Please provide: executive summary, key achievements, critical issues, \
         recommendations, priority actions for today, risk assessment, resource \
         allocation status, and budget versus actual analysis.",
        stats.total_projects,
        stats.total_tasks,
        stats.completed_tasks,
        stats.overdue_tasks,
        stats.team_members,
    )
}

#[derive(Clone)]
pub struct AssistantService {
    client: reqwest::Client,
    config: AssistantConfig,
}

impl AssistantService {
    pub fn new(config: AssistantConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.resolved_api_key().is_some()
    }

    async fn complete(&self, user_prompt: String) -> Result<String, AssistantError> {
        let api_key = self
            .config
            .resolved_api_key()
            .ok_or(AssistantError::Unconfigured)?;
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_CONTEXT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 2000,
            stream: false,
        };
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AssistantError::BadResponse("no choices in response".to_string()))
    }

    /// Free-form chat grounded in the live project portfolio. Recognized
    /// follow-up actions are executed before returning.
    pub async fn chat<C: ConnectionTrait>(
        &self,
        db: &C,
        message: &str,
        project_id: Option<Uuid>,
    ) -> Result<ChatReply, AssistantError> {
        let projects = Project::find_all(db).await?;
        let portfolio = projects
            .iter()
            .map(|p| format!("- {} ({}): {}% complete, {} priority", p.name, p.status, p.progress, p.priority))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!("CURRENT PORTFOLIO:\n{portfolio}\n\n{message}");
        let reply = self.complete(prompt).await?;
        let actions = parse_actions(&reply);
        self.execute_actions(db, &actions, project_id).await?;
        Ok(ChatReply {
            reply,
            actions,
            timestamp: Utc::now(),
        })
    }

    async fn execute_actions<C: ConnectionTrait>(
        &self,
        db: &C,
        actions: &[AssistantAction],
        project_id: Option<Uuid>,
    ) -> Result<(), AssistantError> {
        for action in actions {
            match action {
                AssistantAction::CreateTask(draft) => {
                    let Some(project_id) = project_id else {
                        tracing::debug!("Skipping create_task action without project context");
                        continue;
                    };
                    let task = Task::create(
                        db,
                        &CreateTask {
                            project_id,
                            name: draft.name.clone(),
                            description: Some(draft.description.clone()),
                            assigned_to: None,
                            discipline: None,
                            start_date: None,
                            end_date: None,
                            status: None,
                            priority: Some(draft.priority.clone()),
                            progress: None,
                            estimated_hours: Some(draft.estimated_hours),
                        },
                        None,
                    )
                    .await?;
                    AutomationLog::record(
                        db,
                        "create_task",
                        Some(project_id),
                        Some(format!("Assistant created task {}", task.task_code)),
                        AutomationStatus::Completed,
                        None,
                    )
                    .await?;
                }
                AssistantAction::GenerateReport { title } => {
                    AutomationLog::record(
                        db,
                        "generate_report",
                        project_id,
                        Some(title.clone()),
                        AutomationStatus::Completed,
                        None,
                    )
                    .await?;
                }
                AssistantAction::IdentifyRisk(findings) => {
                    let summary = findings
                        .iter()
                        .map(|f| f.level.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    AutomationLog::record(
                        db,
                        "identify_risk",
                        project_id,
                        Some(format!("Risk levels flagged: {summary}")),
                        AutomationStatus::Completed,
                        serde_json::to_string(findings).ok(),
                    )
                    .await?;
                }
                AssistantAction::UpdateSchedule(changes) => {
                    AutomationLog::record(
                        db,
                        "update_schedule",
                        project_id,
                        Some(format!("{} schedule change(s) proposed", changes.len())),
                        AutomationStatus::Completed,
                        serde_json::to_string(changes).ok(),
                    )
                    .await?;
                }
            }
        }
        Ok(())
    }

    async fn run_report<C: ConnectionTrait>(
        &self,
        db: &C,
        action_type: &str,
        project_id: Option<Uuid>,
        prompt: String,
    ) -> Result<String, AssistantError> {
        match self.complete(prompt).await {
            Ok(report) => {
                AutomationLog::record(
                    db,
                    action_type,
                    project_id,
                    Some(format!("{action_type} generated")),
                    AutomationStatus::Completed,
                    Some(report.clone()),
                )
                .await?;
                Ok(report)
            }
            Err(err) => {
                AutomationLog::record(
                    db,
                    action_type,
                    project_id,
                    Some(format!("{action_type} failed")),
                    AutomationStatus::Failed,
                    Some(err.to_string()),
                )
                .await?;
                Err(err)
            }
        }
    }

    /// Morning portfolio report for the director.
    pub async fn director_report<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<String, AssistantError> {
        let projects = Project::find_all(db).await?;
        let stats = DashboardStats::compute(db).await?;
        let today = Utc::now().date_naive();
        let due_soon = Task::find_due_between(db, today, today + chrono::Days::new(7)).await?;
        let prompt = director_prompt(&projects, &stats, &due_soon);
        self.run_report(db, "director_report", None, prompt).await
    }

    pub async fn project_risks<C: ConnectionTrait>(
        &self,
        db: &C,
        project_id: Uuid,
    ) -> Result<String, AssistantError> {
        let project = Project::find_by_id(db, project_id)
            .await?
            .ok_or(AssistantError::ProjectNotFound)?;
        let tasks = Task::find_with_filter(
            db,
            &TaskFilter {
                project_id: Some(project_id),
                ..Default::default()
            },
        )
        .await?;
        let team = TeamMember::find_by_project(db, project_id).await?;
        let completed = tasks.iter().filter(|t| t.progress >= 100).count();
        let team_lines = team
            .iter()
            .map(|m| {
                format!(
                    "- {}: {}, efficiency {}",
                    m.role,
                    m.custom_name.as_deref().unwrap_or("Unassigned"),
                    m.efficiency.map_or("N/A".to_string(), |e| format!("{e}%")),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Perform a risk analysis for project: {}\n\n\
             PROJECT DETAILS:\n- Progress: {}%\n- Priority: {}\n- Status: {}\n\n\
             TASK STATUS:\nTotal Tasks: {}\nCompleted: {completed}\n\n\
             TEAM COMPOSITION:\n{team_lines}\n\n\
             Analyze schedule, budget, resource, technical, quality and client \
             satisfaction risks. For each give the risk level (High/Medium/Low), \
             probability, impact, mitigation strategy and an owner recommendation.",
            project.name, project.progress, project.priority, project.status, tasks.len(),
        );
        self.run_report(db, "risk_analysis", Some(project_id), prompt)
            .await
    }

    pub async fn optimize_schedule<C: ConnectionTrait>(
        &self,
        db: &C,
        project_id: Uuid,
    ) -> Result<String, AssistantError> {
        let project = Project::find_by_id(db, project_id)
            .await?
            .ok_or(AssistantError::ProjectNotFound)?;
        let tasks = Task::find_with_filter(
            db,
            &TaskFilter {
                project_id: Some(project_id),
                ..Default::default()
            },
        )
        .await?;
        let task_lines = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| {
                format!(
                    "{}. {}: {}, {}%, {} to {}",
                    i + 1,
                    t.name,
                    t.status,
                    t.progress,
                    t.start_date.map_or("?".to_string(), |d| d.to_string()),
                    t.end_date.map_or("?".to_string(), |d| d.to_string()),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Optimize the schedule for project {} based on current task status.\n\n\
             CURRENT TASKS:\n{task_lines}\n\n\
             CONSTRAINTS: critical path tasks first, resource availability, task \
             dependencies, fixed client deadlines.\n\n\
             Provide critical path analysis, recommended schedule adjustments, \
             resource reallocation suggestions, buffer recommendations and early \
             finish opportunities.",
            project.name,
        );
        self.run_report(db, "schedule_optimization", Some(project_id), prompt)
            .await
    }

    pub async fn team_efficiency<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<String, AssistantError> {
        let members = TeamMember::find_all(db).await?;
        let lines = members
            .iter()
            .filter(|m| m.efficiency.is_some())
            .map(|m| {
                format!(
                    "- {} ({}): efficiency {}%",
                    m.role,
                    m.custom_name.as_deref().unwrap_or("Unassigned"),
                    m.efficiency.unwrap_or(0.0),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Analyze team efficiency across all projects.\n\n\
             TEAM PERFORMANCE DATA:\n{lines}\n\n\
             Cover overall performance, top performers, areas for improvement, \
             training needs, workload balancing and recognition recommendations.",
        );
        self.run_report(db, "team_efficiency", None, prompt).await
    }

    pub async fn compliance_check<C: ConnectionTrait>(
        &self,
        db: &C,
        file_id: Uuid,
    ) -> Result<String, AssistantError> {
        let file = BimFile::find_by_id(db, file_id)
            .await?
            .ok_or(AssistantError::FileNotFound)?;
        let project = Project::find_by_id(db, file.project_id)
            .await?
            .ok_or(AssistantError::ProjectNotFound)?;
        let requirements = project
            .bim_requirements
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none recorded".to_string());
        let prompt = format!(
            "Check BIM file compliance for project: {}\n\n\
             FILE DETAILS:\n- Name: {}\n- Type: {}\n- Size: {} bytes\n\
             - LOD Requirement: {requirements}\n\n\
             Check ISO-19650 requirements, BEP compliance, LOD requirements, COBie \
             data, naming standards and coordination readiness. Provide a compliance \
             score (0-100%), issues found, non-compliances and required actions.",
            project.name,
            file.file_name,
            file.file_type.as_deref().unwrap_or("unknown"),
            file.file_size.unwrap_or(0),
        );
        self.run_report(db, "compliance_check", Some(project.id), prompt)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_keywords() {
        assert_eq!(extract_priority("this is URGENT"), Priority::Critical);
        assert_eq!(extract_priority("high impact"), Priority::High);
        assert_eq!(extract_priority("low effort"), Priority::Low);
        assert_eq!(extract_priority("routine work"), Priority::Medium);
    }

    #[test]
    fn hour_estimates() {
        assert_eq!(extract_hours("roughly 12 hours of modelling"), 12.0);
        assert_eq!(extract_hours("about 3 hrs"), 3.0);
        assert_eq!(extract_hours("no estimate given"), 8.0);
    }

    #[test]
    fn task_action_detected_with_quoted_name() {
        let reply = "You should create task \"Resolve MEP clashes\" with high priority, 6 hours.";
        let actions = parse_actions(reply);
        let Some(AssistantAction::CreateTask(draft)) = actions.first() else {
            panic!("expected create_task action, got {actions:?}");
        };
        assert_eq!(draft.name, "Resolve MEP clashes");
        assert_eq!(draft.priority, Priority::High);
        assert_eq!(draft.estimated_hours, 6.0);
    }

    #[test]
    fn risk_action_collects_levels() {
        let reply = "There is a high risk of slippage and a low risk on budget.";
        let actions = parse_actions(reply);
        let Some(AssistantAction::IdentifyRisk(findings)) = actions.first() else {
            panic!("expected identify_risk action, got {actions:?}");
        };
        let levels: Vec<&str> = findings.iter().map(|f| f.level.as_str()).collect();
        assert_eq!(levels, vec!["high", "low"]);
    }

    #[test]
    fn schedule_action_needs_two_dates() {
        assert!(parse_actions("We should reschedule to 2026-01-15.").is_empty());
        let reply = "Reschedule the facade package from 2026-01-15 to 2026-02-01.";
        let actions = parse_actions(reply);
        let Some(AssistantAction::UpdateSchedule(changes)) = actions.first() else {
            panic!("expected update_schedule action, got {actions:?}");
        };
        assert_eq!(changes[0].from_date, "2026-01-15".parse().unwrap());
        assert_eq!(changes[0].to_date, "2026-02-01".parse().unwrap());
    }

    #[test]
    fn plain_replies_produce_no_actions() {
        assert!(parse_actions("The weather is nice on site today.").is_empty());
    }

    #[test]
    fn risk_excerpts_survive_non_ascii_prefixes() {
        // "İ" lowercases to two characters, shifting byte offsets.
        let reply = "İstanbul site update: there is a High risk of flooding.";
        let actions = parse_actions(reply);
        let Some(AssistantAction::IdentifyRisk(findings)) = actions.first() else {
            panic!("expected identify_risk action, got {actions:?}");
        };
        assert_eq!(findings[0].level, "high");
        assert!(findings[0].description.contains("risk of flooding"));
    }

    #[test]
    fn director_prompt_lists_upcoming_deadlines() {
        let stats = DashboardStats {
            total_projects: 1,
            active_projects: 1,
            completed_projects: 0,
            on_hold_projects: 0,
            total_tasks: 1,
            completed_tasks: 0,
            in_progress_tasks: 1,
            overdue_tasks: 0,
            average_project_progress: 40.0,
            average_task_progress: 60.0,
            team_members: 3,
            open_clashes: 0,
        };
        let task = Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            task_code: "TASK-0001".to_string(),
            name: "Steel shop drawings".to_string(),
            description: None,
            assigned_to: None,
            discipline: None,
            start_date: None,
            end_date: NaiveDate::from_ymd_opt(2026, 9, 2),
            progress: 60,
            status: db::types::TaskStatus::InProgress,
            priority: Priority::Medium,
            estimated_hours: None,
            actual_hours: None,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let prompt = director_prompt(&[], &stats, &[task]);
        assert!(prompt.contains("UPCOMING DEADLINES (next 7 days):"));
        assert!(prompt.contains("- Steel shop drawings due 2026-09-02 (60% complete)"));
    }
}
