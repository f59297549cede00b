use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ApprovalHistory {
    Table,
    RequestId,
    Sequence,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Two writers racing for the same slot: the loser fails instead of
        // forking the audit trail.
        manager
            .create_index(
                Index::create()
                    .name("uidx-approval_history-request_id-sequence")
                    .table(ApprovalHistory::Table)
                    .col(ApprovalHistory::RequestId)
                    .col(ApprovalHistory::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uidx-approval_history-request_id-sequence")
                    .table(ApprovalHistory::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
