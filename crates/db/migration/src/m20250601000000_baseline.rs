use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Companies::Table)
                    .col(pk_id_col(manager, Companies::Id))
                    .col(uuid_col(Companies::Uuid))
                    .col(ColumnDef::new(Companies::Name).string().not_null())
                    .col(ColumnDef::new(Companies::Email).string())
                    .col(ColumnDef::new(Companies::Phone).string())
                    .col(ColumnDef::new(Companies::Address).text())
                    .col(
                        ColumnDef::new(Companies::Timezone)
                            .string_len(64)
                            .not_null()
                            .default(Expr::val("Asia/Dubai")),
                    )
                    .col(
                        ColumnDef::new(Companies::Currency)
                            .string_len(10)
                            .not_null()
                            .default(Expr::val("AED")),
                    )
                    .col(timestamp_col(Companies::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_companies_uuid")
                    .table(Companies::Table)
                    .col(Companies::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(uuid_col(Users::Uuid))
                    .col(fk_id_col(manager, Users::CompanyId))
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("viewer")),
                    )
                    .col(ColumnDef::new(Users::Department).string())
                    .col(ColumnDef::new(Users::Phone).string())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(Expr::val(true)),
                    )
                    .col(timestamp_col(Users::CreatedAt))
                    .col(timestamp_col(Users::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_company_id")
                            .from(Users::Table, Users::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_uuid")
                    .table(Users::Table)
                    .col(Users::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(UserSessions::Table)
                    .col(pk_id_col(manager, UserSessions::Id))
                    .col(uuid_col(UserSessions::Uuid))
                    .col(fk_id_col(manager, UserSessions::UserId))
                    .col(timestamp_col(UserSessions::CreatedAt))
                    .col(
                        ColumnDef::new(UserSessions::ExpiresAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_sessions_user_id")
                            .from(UserSessions::Table, UserSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_user_sessions_uuid")
                    .table(UserSessions::Table)
                    .col(UserSessions::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_user_sessions_expires_at")
                    .table(UserSessions::Table)
                    .col(UserSessions::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Projects::Table)
                    .col(pk_id_col(manager, Projects::Id))
                    .col(uuid_col(Projects::Uuid))
                    .col(
                        ColumnDef::new(Projects::ProjectNumber)
                            .integer()
                            .not_null()
                            .default(Expr::val(1)),
                    )
                    .col(ColumnDef::new(Projects::ProjectCode).string_len(64).not_null())
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::Sector).string())
                    .col(ColumnDef::new(Projects::AuthorityClient).string())
                    .col(ColumnDef::new(Projects::SwitzelClient).string())
                    .col(ColumnDef::new(Projects::Location).string())
                    .col(ColumnDef::new(Projects::ScopeOfWork).text())
                    .col(ColumnDef::new(Projects::BimRequirements).json())
                    .col(ColumnDef::new(Projects::TimelineStart).date())
                    .col(ColumnDef::new(Projects::TimelineEnd).date())
                    .col(
                        ColumnDef::new(Projects::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("planning")),
                    )
                    .col(
                        ColumnDef::new(Projects::Priority)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(
                        ColumnDef::new(Projects::Progress)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(ColumnDef::new(Projects::Budget).double())
                    .col(ColumnDef::new(Projects::ActualCost).double())
                    .col(fk_id_nullable_col(manager, Projects::DirectorId))
                    .col(fk_id_nullable_col(manager, Projects::ProjectManagerId))
                    .col(timestamp_col(Projects::CreatedAt))
                    .col(timestamp_col(Projects::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_director_id")
                            .from(Projects::Table, Projects::DirectorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_project_manager_id")
                            .from(Projects::Table, Projects::ProjectManagerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_uuid")
                    .table(Projects::Table)
                    .col(Projects::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_project_code")
                    .table(Projects::Table)
                    .col(Projects::ProjectCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_projects_status")
                    .table(Projects::Table)
                    .col(Projects::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(ProjectTeams::Table)
                    .col(pk_id_col(manager, ProjectTeams::Id))
                    .col(uuid_col(ProjectTeams::Uuid))
                    .col(fk_id_col(manager, ProjectTeams::ProjectId))
                    .col(
                        ColumnDef::new(ProjectTeams::TeamType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProjectTeams::Role).string().not_null())
                    .col(fk_id_nullable_col(manager, ProjectTeams::UserId))
                    .col(ColumnDef::new(ProjectTeams::CustomName).string())
                    .col(
                        ColumnDef::new(ProjectTeams::IsLead)
                            .boolean()
                            .not_null()
                            .default(Expr::val(false)),
                    )
                    .col(
                        ColumnDef::new(ProjectTeams::AssignedTasks)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(ProjectTeams::CompletedTasks)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(ColumnDef::new(ProjectTeams::Efficiency).double())
                    .col(ColumnDef::new(ProjectTeams::AssignedDate).date())
                    .col(
                        ColumnDef::new(ProjectTeams::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("active")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_teams_project_id")
                            .from(ProjectTeams::Table, ProjectTeams::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_teams_user_id")
                            .from(ProjectTeams::Table, ProjectTeams::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_teams_uuid")
                    .table(ProjectTeams::Table)
                    .col(ProjectTeams::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_teams_project_id")
                    .table(ProjectTeams::Table)
                    .col(ProjectTeams::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(uuid_col(Tasks::Uuid))
                    .col(fk_id_col(manager, Tasks::ProjectId))
                    .col(ColumnDef::new(Tasks::TaskCode).string_len(64).not_null())
                    .col(ColumnDef::new(Tasks::Name).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(fk_id_nullable_col(manager, Tasks::AssignedTo))
                    .col(ColumnDef::new(Tasks::Discipline).string())
                    .col(ColumnDef::new(Tasks::StartDate).date())
                    .col(ColumnDef::new(Tasks::EndDate).date())
                    .col(
                        ColumnDef::new(Tasks::Progress)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(
                        ColumnDef::new(Tasks::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("not_started")),
                    )
                    .col(
                        ColumnDef::new(Tasks::Priority)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(ColumnDef::new(Tasks::EstimatedHours).double())
                    .col(ColumnDef::new(Tasks::ActualHours).double())
                    .col(fk_id_nullable_col(manager, Tasks::CreatedBy))
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(timestamp_col(Tasks::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_project_id")
                            .from(Tasks::Table, Tasks::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_assigned_to")
                            .from(Tasks::Table, Tasks::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_uuid")
                    .table(Tasks::Table)
                    .col(Tasks::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_task_code")
                    .table(Tasks::Table)
                    .col(Tasks::TaskCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_project_id")
                    .table(Tasks::Table)
                    .col(Tasks::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_status")
                    .table(Tasks::Table)
                    .col(Tasks::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(BimFiles::Table)
                    .col(pk_id_col(manager, BimFiles::Id))
                    .col(uuid_col(BimFiles::Uuid))
                    .col(fk_id_col(manager, BimFiles::ProjectId))
                    .col(ColumnDef::new(BimFiles::FileName).string().not_null())
                    .col(ColumnDef::new(BimFiles::FileType).string_len(16))
                    .col(ColumnDef::new(BimFiles::FilePath).text().not_null())
                    .col(ColumnDef::new(BimFiles::FileSize).big_integer())
                    .col(ColumnDef::new(BimFiles::Version).string_len(32))
                    .col(ColumnDef::new(BimFiles::LodLevel).string_len(16))
                    .col(ColumnDef::new(BimFiles::Discipline).string())
                    .col(
                        ColumnDef::new(BimFiles::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("uploaded")),
                    )
                    .col(fk_id_nullable_col(manager, BimFiles::UploadedBy))
                    .col(timestamp_col(BimFiles::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bim_files_project_id")
                            .from(BimFiles::Table, BimFiles::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_bim_files_uuid")
                    .table(BimFiles::Table)
                    .col(BimFiles::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_bim_files_project_id")
                    .table(BimFiles::Table)
                    .col(BimFiles::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(ClashDetections::Table)
                    .col(pk_id_col(manager, ClashDetections::Id))
                    .col(uuid_col(ClashDetections::Uuid))
                    .col(fk_id_col(manager, ClashDetections::ProjectId))
                    .col(ColumnDef::new(ClashDetections::ClashCode).string_len(64).not_null())
                    .col(ColumnDef::new(ClashDetections::Description).text().not_null())
                    .col(ColumnDef::new(ClashDetections::Discipline1).string())
                    .col(ColumnDef::new(ClashDetections::Discipline2).string())
                    .col(
                        ColumnDef::new(ClashDetections::Severity)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("medium")),
                    )
                    .col(
                        ColumnDef::new(ClashDetections::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("open")),
                    )
                    .col(fk_id_nullable_col(manager, ClashDetections::AssignedTo))
                    .col(ColumnDef::new(ClashDetections::DueDate).date())
                    .col(ColumnDef::new(ClashDetections::Resolution).text())
                    .col(fk_id_nullable_col(manager, ClashDetections::ResolvedBy))
                    .col(ColumnDef::new(ClashDetections::ResolvedDate).date())
                    .col(timestamp_col(ClashDetections::CreatedAt))
                    .col(timestamp_col(ClashDetections::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clash_detections_project_id")
                            .from(ClashDetections::Table, ClashDetections::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_clash_detections_uuid")
                    .table(ClashDetections::Table)
                    .col(ClashDetections::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_clash_detections_clash_code")
                    .table(ClashDetections::Table)
                    .col(ClashDetections::ClashCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_clash_detections_project_id")
                    .table(ClashDetections::Table)
                    .col(ClashDetections::ProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClashDetections::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BimFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectTeams::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn fk_id_nullable_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
    Uuid,
    Name,
    Email,
    Phone,
    Address,
    Timezone,
    Currency,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    CompanyId,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    Role,
    Department,
    Phone,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserSessions {
    Table,
    Id,
    Uuid,
    UserId,
    CreatedAt,
    ExpiresAt,
}

#[derive(Iden)]
enum Projects {
    Table,
    Id,
    Uuid,
    ProjectNumber,
    ProjectCode,
    Name,
    Description,
    Sector,
    AuthorityClient,
    SwitzelClient,
    Location,
    ScopeOfWork,
    BimRequirements,
    TimelineStart,
    TimelineEnd,
    Status,
    Priority,
    Progress,
    Budget,
    ActualCost,
    DirectorId,
    ProjectManagerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProjectTeams {
    Table,
    Id,
    Uuid,
    ProjectId,
    TeamType,
    Role,
    UserId,
    CustomName,
    IsLead,
    AssignedTasks,
    CompletedTasks,
    Efficiency,
    AssignedDate,
    Status,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Uuid,
    ProjectId,
    TaskCode,
    Name,
    Description,
    AssignedTo,
    Discipline,
    StartDate,
    EndDate,
    Progress,
    Status,
    Priority,
    EstimatedHours,
    ActualHours,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BimFiles {
    Table,
    Id,
    Uuid,
    ProjectId,
    FileName,
    FileType,
    FilePath,
    FileSize,
    Version,
    LodLevel,
    Discipline,
    Status,
    UploadedBy,
    CreatedAt,
}

#[derive(Iden)]
enum ClashDetections {
    Table,
    Id,
    Uuid,
    ProjectId,
    ClashCode,
    Description,
    #[iden = "discipline_1"]
    Discipline1,
    #[iden = "discipline_2"]
    Discipline2,
    Severity,
    Status,
    AssignedTo,
    DueDate,
    Resolution,
    ResolvedBy,
    ResolvedDate,
    CreatedAt,
    UpdatedAt,
}
