use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{EmailSender, EngineError, NoopEmailSender, ResultEngine};

mod access;
mod audit;
mod bank;
mod decisions;
mod dispatch;
mod inbox;
mod items;
mod lifecycle;
mod requests;
mod settings;
mod submission;
mod users;

pub use requests::RequestListFilter;
pub use users::UserProfile;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Policy knobs that are not stored in the settings table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnginePolicy {
    /// How many days into the future an expense date may lie. `None` accepts
    /// any date.
    pub expense_date_grace_days: Option<i64>,
}

impl EnginePolicy {
    /// Upper bound for `expense_date_grace_days` (ten years).
    pub const MAX_GRACE_DAYS: i64 = 3650;

    pub fn validate(&self) -> ResultEngine<()> {
        if let Some(days) = self.expense_date_grace_days
            && !(0..=Self::MAX_GRACE_DAYS).contains(&days)
        {
            return Err(EngineError::Validation(format!(
                "expense_date_grace_days must be between 0 and {}",
                Self::MAX_GRACE_DAYS
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    email: Arc<dyn EmailSender>,
    policy: EnginePolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn policy(&self) -> EnginePolicy {
        self.policy
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    email: Option<Arc<dyn EmailSender>>,
    policy: EnginePolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Email collaborator used by the notification dispatcher.
    ///
    /// Defaults to [`NoopEmailSender`], which reports every send as failed.
    pub fn email_sender(mut self, sender: Arc<dyn EmailSender>) -> EngineBuilder {
        self.email = Some(sender);
        self
    }

    pub fn policy(mut self, policy: EnginePolicy) -> EngineBuilder {
        self.policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        self.policy.validate()?;
        Ok(Engine {
            database: self.database,
            email: self.email.unwrap_or_else(|| Arc::new(NoopEmailSender)),
            policy: self.policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grace_days_must_be_in_range() {
        let policy = |days| EnginePolicy {
            expense_date_grace_days: Some(days),
        };
        assert!(policy(0).validate().is_ok());
        assert!(policy(EnginePolicy::MAX_GRACE_DAYS).validate().is_ok());
        assert!(EnginePolicy::default().validate().is_ok());
        assert!(matches!(
            policy(-1).validate(),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            policy(i64::MAX).validate(),
            Err(EngineError::Validation(_))
        ));
    }
}
