//! Initial schema.
//!
//! - `users`: credentials, role and notification email
//! - `app_settings`: key/value configuration (auto-approval)
//! - `bank_transactions`: synced card/bank movements
//! - `reimbursement_requests`: one request per submission, owned by a student
//! - `reimbursement_items`: expense lines of a request
//! - `approval_history`: append-only audit trail
//! - `notifications`: in-app inbox

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
    Email,
}

#[derive(Iden)]
enum AppSettings {
    Table,
    Key,
    Value,
    UpdatedBy,
    UpdatedAt,
}

#[derive(Iden)]
enum BankTransactions {
    Table,
    Id,
    Owner,
    AmountMinor,
    Description,
    Merchant,
    PostedOn,
    CreatedAt,
}

#[derive(Iden)]
enum ReimbursementRequests {
    Table,
    Id,
    Owner,
    Status,
    TotalAmountMinor,
    Notes,
    AdminNotes,
    RejectionReason,
    CreatedAt,
    UpdatedAt,
    SubmittedAt,
    ReviewedAt,
    ReviewedBy,
    PaidAt,
}

#[derive(Iden)]
enum ReimbursementItems {
    Table,
    Id,
    RequestId,
    AmountMinor,
    Category,
    Description,
    ExpenseDate,
    Origin,
    SourceTransactionId,
    ReceiptUrl,
    CreatedAt,
}

#[derive(Iden)]
enum ApprovalHistory {
    Table,
    Id,
    RequestId,
    Sequence,
    Action,
    Actor,
    Note,
    Metadata,
    CreatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    Recipient,
    Kind,
    Title,
    Message,
    IsRead,
    RequestId,
    CreatedAt,
    ReadAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("student"),
                    )
                    .col(ColumnDef::new(Users::Email).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Settings
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AppSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppSettings::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppSettings::Value).text().not_null())
                    .col(ColumnDef::new(AppSettings::UpdatedBy).string())
                    .col(
                        ColumnDef::new(AppSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Bank transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankTransactions::Owner).string().not_null())
                    .col(
                        ColumnDef::new(BankTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankTransactions::Merchant).string())
                    .col(ColumnDef::new(BankTransactions::PostedOn).date().not_null())
                    .col(
                        ColumnDef::new(BankTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_transactions-owner")
                            .from(BankTransactions::Table, BankTransactions::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_transactions-owner-posted_on")
                    .table(BankTransactions::Table)
                    .col(BankTransactions::Owner)
                    .col(BankTransactions::PostedOn)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Requests
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ReimbursementRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReimbursementRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementRequests::Owner)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementRequests::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(ReimbursementRequests::TotalAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ReimbursementRequests::Notes).text())
                    .col(ColumnDef::new(ReimbursementRequests::AdminNotes).text())
                    .col(ColumnDef::new(ReimbursementRequests::RejectionReason).text())
                    .col(
                        ColumnDef::new(ReimbursementRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementRequests::SubmittedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementRequests::ReviewedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(ReimbursementRequests::ReviewedBy).string())
                    .col(ColumnDef::new(ReimbursementRequests::PaidAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reimbursement_requests-owner")
                            .from(ReimbursementRequests::Table, ReimbursementRequests::Owner)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reimbursement_requests-owner-created_at")
                    .table(ReimbursementRequests::Table)
                    .col(ReimbursementRequests::Owner)
                    .col(ReimbursementRequests::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reimbursement_requests-status-created_at")
                    .table(ReimbursementRequests::Table)
                    .col(ReimbursementRequests::Status)
                    .col(ReimbursementRequests::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ReimbursementItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReimbursementItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementItems::RequestId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementItems::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementItems::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementItems::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReimbursementItems::ExpenseDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReimbursementItems::Origin).string().not_null())
                    .col(ColumnDef::new(ReimbursementItems::SourceTransactionId).string())
                    .col(ColumnDef::new(ReimbursementItems::ReceiptUrl).string())
                    .col(
                        ColumnDef::new(ReimbursementItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reimbursement_items-request_id")
                            .from(ReimbursementItems::Table, ReimbursementItems::RequestId)
                            .to(ReimbursementRequests::Table, ReimbursementRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reimbursement_items-source_transaction_id")
                            .from(
                                ReimbursementItems::Table,
                                ReimbursementItems::SourceTransactionId,
                            )
                            .to(BankTransactions::Table, BankTransactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reimbursement_items-request_id")
                    .table(ReimbursementItems::Table)
                    .col(ReimbursementItems::RequestId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reimbursement_items-source_transaction_id")
                    .table(ReimbursementItems::Table)
                    .col(ReimbursementItems::SourceTransactionId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Approval history
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ApprovalHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApprovalHistory::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApprovalHistory::RequestId).string().not_null())
                    .col(ColumnDef::new(ApprovalHistory::Sequence).integer().not_null())
                    .col(ColumnDef::new(ApprovalHistory::Action).string().not_null())
                    .col(ColumnDef::new(ApprovalHistory::Actor).string().not_null())
                    .col(ColumnDef::new(ApprovalHistory::Note).text())
                    .col(ColumnDef::new(ApprovalHistory::Metadata).text())
                    .col(
                        ColumnDef::new(ApprovalHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-approval_history-request_id")
                            .from(ApprovalHistory::Table, ApprovalHistory::RequestId)
                            .to(ReimbursementRequests::Table, ReimbursementRequests::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Notifications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::Recipient).string().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Notifications::RequestId).string())
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::ReadAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-recipient")
                            .from(Notifications::Table, Notifications::Recipient)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notifications-recipient-is_read")
                    .table(Notifications::Table)
                    .col(Notifications::Recipient)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApprovalHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReimbursementItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReimbursementRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
