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
                    .table(ProjectKpis::Table)
                    .col(pk_id_col(manager, ProjectKpis::Id))
                    .col(uuid_col(ProjectKpis::Uuid))
                    .col(fk_id_col(manager, ProjectKpis::ProjectId))
                    .col(ColumnDef::new(ProjectKpis::KpiDate).date().not_null())
                    .col(ColumnDef::new(ProjectKpis::MetricType).string_len(64).not_null())
                    .col(ColumnDef::new(ProjectKpis::MetricValue).double().not_null())
                    .col(ColumnDef::new(ProjectKpis::TargetValue).double())
                    .col(ColumnDef::new(ProjectKpis::Unit).string_len(32))
                    .col(ColumnDef::new(ProjectKpis::Notes).text())
                    .col(timestamp_col(ProjectKpis::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_kpis_project_id")
                            .from(ProjectKpis::Table, ProjectKpis::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_kpis_uuid")
                    .table(ProjectKpis::Table)
                    .col(ProjectKpis::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_project_kpis_project_date_metric")
                    .table(ProjectKpis::Table)
                    .col(ProjectKpis::ProjectId)
                    .col(ProjectKpis::KpiDate)
                    .col(ProjectKpis::MetricType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(AutomationLogs::Table)
                    .col(pk_id_col(manager, AutomationLogs::Id))
                    .col(uuid_col(AutomationLogs::Uuid))
                    .col(ColumnDef::new(AutomationLogs::ActionType).string_len(64).not_null())
                    .col(fk_id_nullable_col(manager, AutomationLogs::ProjectId))
                    .col(ColumnDef::new(AutomationLogs::Description).text())
                    .col(
                        ColumnDef::new(AutomationLogs::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("completed")),
                    )
                    .col(ColumnDef::new(AutomationLogs::Result).text())
                    .col(timestamp_col(AutomationLogs::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_automation_logs_project_id")
                            .from(AutomationLogs::Table, AutomationLogs::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_automation_logs_uuid")
                    .table(AutomationLogs::Table)
                    .col(AutomationLogs::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_automation_logs_action_type")
                    .table(AutomationLogs::Table)
                    .col(AutomationLogs::ActionType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AutomationLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectKpis::Table).to_owned())
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
enum Projects {
    Table,
    Id,
}

#[derive(Iden)]
enum ProjectKpis {
    Table,
    Id,
    Uuid,
    ProjectId,
    KpiDate,
    MetricType,
    MetricValue,
    TargetValue,
    Unit,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum AutomationLogs {
    Table,
    Id,
    Uuid,
    ActionType,
    ProjectId,
    Description,
    Status,
    Result,
    CreatedAt,
}
