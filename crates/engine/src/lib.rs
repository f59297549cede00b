//! Reimbursement request lifecycle engine.
//!
//! The engine owns the state machine of a reimbursement request (draft →
//! submitted → decided → paid), the auto-approval rule, the append-only audit
//! trail and the notification side channel. All state lives in the relational
//! store; concurrency is handled by conditional writes on the prior status.

pub use auto_approval::{AutoApprovalSetting, evaluate};
pub use bank_transactions::BankTransaction;
pub use commands::{BankTransactionInput, Decision, ItemInput, TransactionItemInput};
pub use email::{EmailError, EmailMessage, EmailReceipt, EmailSender, NoopEmailSender};
pub use error::EngineError;
pub use history::{ApprovalHistoryEntry, HistoryAction, TransitionMetadata};
pub use items::{ItemCategory, ItemOrigin, ReimbursementItem};
pub use money::MoneyCents;
pub use notifications::{Notification, NotificationKind};
pub use ops::{Engine, EngineBuilder, EnginePolicy, RequestListFilter, UserProfile};
pub use outcome::{DispatchReport, RequestDetail, TransitionOutcome};
pub use requests::ReimbursementRequest;
pub use roles::{Actor, Role, SYSTEM_ACTOR};
pub use status::{RequestAction, RequestStatus};

mod auto_approval;
mod bank_transactions;
mod commands;
mod email;
mod error;
mod history;
mod items;
mod money;
mod notifications;
mod ops;
mod outcome;
mod requests;
mod roles;
mod settings;
mod status;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
