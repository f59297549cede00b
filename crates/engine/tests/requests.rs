use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use engine::{
    Actor, AutoApprovalSetting, BankTransactionInput, Decision, EmailError, EmailMessage,
    EmailReceipt, EmailSender, Engine, EngineError, EnginePolicy, HistoryAction, ItemCategory,
    ItemInput, ItemOrigin, MoneyCents, NotificationKind, RequestListFilter, RequestStatus, Role,
    SYSTEM_ACTOR, TransactionItemInput,
};
use migration::MigratorTrait;

/// Captures outgoing mail; optionally fails every send.
#[derive(Debug, Default)]
struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl RecordingMailer {
    fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, EmailError> {
        if self.fail {
            return Err(EmailError("provider returned 503".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(EmailReceipt {
            id: format!("msg-{}", sent.len()),
        })
    }
}

fn alice() -> Actor {
    Actor::student("alice")
}

fn carol() -> Actor {
    Actor::new("carol", Role::Accountant)
}

fn root() -> Actor {
    Actor::new("root", Role::Administrator)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn meal(cents: i64) -> ItemInput {
    ItemInput::new(MoneyCents::new(cents), ItemCategory::Meals, "Team dinner", day(2))
}

async fn engine_with_mailer(
    mailer: Arc<RecordingMailer>,
    policy: EnginePolicy,
) -> (Engine, DatabaseConnection) {
    engine_on(ConnectOptions::new("sqlite::memory:"), mailer, policy).await
}

async fn engine_on(
    options: ConnectOptions,
    mailer: Arc<RecordingMailer>,
    policy: EnginePolicy,
) -> (Engine, DatabaseConnection) {
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .email_sender(mailer)
        .policy(policy)
        .build()
        .await
        .unwrap();

    engine
        .register_user("alice", "password", Role::Student, Some("alice@uni.example"))
        .await
        .unwrap();
    engine
        .register_user("bob", "password", Role::Student, None)
        .await
        .unwrap();
    engine
        .register_user("carol", "password", Role::Accountant, None)
        .await
        .unwrap();
    engine
        .register_user("root", "password", Role::Administrator, None)
        .await
        .unwrap();

    (engine, db)
}

async fn engine_with_db() -> (Engine, Arc<RecordingMailer>) {
    let mailer = Arc::new(RecordingMailer::default());
    let (engine, _db) = engine_with_mailer(mailer.clone(), EnginePolicy::default()).await;
    (engine, mailer)
}

/// A draft owned by alice holding one meal of `cents`.
async fn draft_with_item(engine: &Engine, cents: i64) -> String {
    let request = engine
        .create_request(&alice(), Some("Conference trip"))
        .await
        .unwrap();
    let id = request.id.to_string();
    engine.add_item(&id, &alice(), meal(cents)).await.unwrap();
    id
}

async fn submitted(engine: &Engine, cents: i64) -> String {
    let id = draft_with_item(engine, cents).await;
    engine.submit_request(&id, &alice()).await.unwrap();
    id
}

#[tokio::test]
async fn small_request_is_auto_approved_on_submit() {
    let (engine, mailer) = engine_with_db().await;
    engine
        .set_auto_approval(&root(), AutoApprovalSetting::enabled(MoneyCents::new(100_00)))
        .await
        .unwrap();

    let id = draft_with_item(&engine, 30_00).await;
    engine.add_item(&id, &alice(), meal(45_00)).await.unwrap();
    let outcome = engine.submit_request(&id, &alice()).await.unwrap();

    assert!(outcome.auto_approved);
    assert_eq!(outcome.status(), RequestStatus::Approved);
    assert_eq!(outcome.request.reviewed_by.as_deref(), Some(SYSTEM_ACTOR));
    assert!(outcome.request.reviewed_at.is_some());
    assert!(outcome.request.submitted_at.is_some());
    assert_eq!(outcome.request.total_amount, MoneyCents::new(75_00));
    assert!(
        outcome
            .request
            .admin_notes
            .as_deref()
            .is_some_and(|n| n.contains("$100.00"))
    );

    let history = engine.request_history(&id, &alice()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, HistoryAction::Submitted);
    let metadata = history[0].metadata.clone().unwrap();
    assert_eq!(metadata.from_status, RequestStatus::Draft);
    assert_eq!(metadata.to_status, RequestStatus::Approved);
    assert_eq!(metadata.auto_approved, Some(true));
    assert_eq!(metadata.threshold_minor, Some(100_00));
    assert_eq!(metadata.amount_minor, Some(75_00));

    let notification = outcome.dispatch.notification.unwrap();
    assert_eq!(notification.kind, NotificationKind::AutoApproved);
    assert_eq!(notification.recipient, "alice");
    assert!(outcome.dispatch.email_sent);
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@uni.example");
}

#[tokio::test]
async fn threshold_is_inclusive_at_submission() {
    let (engine, _mailer) = engine_with_db().await;
    engine
        .set_auto_approval(&root(), AutoApprovalSetting::enabled(MoneyCents::new(50_00)))
        .await
        .unwrap();

    let at = draft_with_item(&engine, 50_00).await;
    let over = draft_with_item(&engine, 50_01).await;

    let at = engine.submit_request(&at, &alice()).await.unwrap();
    let over = engine.submit_request(&over, &alice()).await.unwrap();
    assert_eq!(at.status(), RequestStatus::Approved);
    assert_eq!(over.status(), RequestStatus::Submitted);
    assert!(!over.auto_approved);
}

#[tokio::test]
async fn large_request_goes_to_review_and_can_be_rejected() {
    let (engine, mailer) = engine_with_db().await;
    engine
        .set_auto_approval(&root(), AutoApprovalSetting::enabled(MoneyCents::new(100_00)))
        .await
        .unwrap();

    let id = draft_with_item(&engine, 500_00).await;
    let outcome = engine.submit_request(&id, &alice()).await.unwrap();
    assert_eq!(outcome.status(), RequestStatus::Submitted);
    assert!(!outcome.auto_approved);
    assert_eq!(outcome.dispatch.notification, None);
    assert!(mailer.sent().is_empty());

    let outcome = engine
        .decide(&id, &carol(), Decision::reject("missing receipt"))
        .await
        .unwrap();
    assert_eq!(outcome.status(), RequestStatus::Rejected);
    assert_eq!(
        outcome.request.rejection_reason.as_deref(),
        Some("missing receipt")
    );
    assert_eq!(outcome.request.reviewed_by.as_deref(), Some("carol"));

    let notification = outcome.dispatch.notification.unwrap();
    assert_eq!(notification.kind, NotificationKind::Rejected);
    assert!(notification.message.contains("missing receipt"));

    let history = engine.request_history(&id, &alice()).await.unwrap();
    let actions: Vec<_> = history.iter().map(|h| h.action).collect();
    assert_eq!(
        actions,
        vec![HistoryAction::Submitted, HistoryAction::Rejected]
    );
    let metadata = history[1].metadata.clone().unwrap();
    assert_eq!(metadata.from_status, RequestStatus::Submitted);
    assert_eq!(metadata.to_status, RequestStatus::Rejected);
    assert_eq!(history[1].note.as_deref(), Some("missing receipt"));
}

#[tokio::test]
async fn concurrent_submits_have_one_winner() {
    let (engine, _mailer) = engine_with_db().await;
    let id = draft_with_item(&engine, 40_00).await;

    let (a1, a2) = (alice(), alice());
    let (first, second) = tokio::join!(
        engine.submit_request(&id, &a1),
        engine.submit_request(&id, &a2)
    );

    let results = [first, second];
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| matches!(r, Err(EngineError::AlreadySubmitted(_))))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(losers, 1);

    let history = engine.request_history(&id, &alice()).await.unwrap();
    assert_eq!(history.len(), 1);
}

/// Same race as above, but on a file database with a real connection pool and
/// worker threads, so the guarded writes actually interleave.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_submits_and_decisions_on_file_database() {
    let path = std::env::temp_dir().join(format!("reimburse-{}.db", uuid::Uuid::new_v4()));
    let mut options = ConnectOptions::new(format!("sqlite:{}?mode=rwc", path.display()));
    options.max_connections(8);
    let mailer = Arc::new(RecordingMailer::default());
    let (engine, _db) = engine_on(options, mailer, EnginePolicy::default()).await;
    let engine = Arc::new(engine);

    let mut ids = Vec::new();
    for _ in 0..10 {
        ids.push(draft_with_item(&engine, 40_00).await);
    }

    let mut submits = tokio::task::JoinSet::new();
    for id in &ids {
        for _ in 0..4 {
            let (engine, id) = (engine.clone(), id.clone());
            submits.spawn(async move { engine.submit_request(&id, &alice()).await });
        }
    }
    let (mut won, mut already) = (0, 0);
    while let Some(result) = submits.join_next().await {
        match result.unwrap() {
            Ok(_) => won += 1,
            Err(EngineError::AlreadySubmitted(_)) => already += 1,
            Err(err) => panic!("unexpected submit error: {err}"),
        }
    }
    assert_eq!((won, already), (10, 30));

    let mut decisions = tokio::task::JoinSet::new();
    for id in &ids {
        for n in 0..4 {
            let (engine, id) = (engine.clone(), id.clone());
            let decision = if n % 2 == 0 {
                Decision::approve()
            } else {
                Decision::reject("duplicate claim")
            };
            decisions.spawn(async move { engine.decide(&id, &carol(), decision).await });
        }
    }
    let (mut decided, mut illegal) = (0, 0);
    while let Some(result) = decisions.join_next().await {
        match result.unwrap() {
            Ok(_) => decided += 1,
            Err(EngineError::IllegalTransition(_)) => illegal += 1,
            Err(err) => panic!("unexpected decision error: {err}"),
        }
    }
    assert_eq!((decided, illegal), (10, 30));

    for id in &ids {
        let history = engine.request_history(id, &alice()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, HistoryAction::Submitted);
    }

    drop(engine);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

#[tokio::test]
async fn resubmitting_is_rejected_without_side_effects() {
    let (engine, _mailer) = engine_with_db().await;
    let id = submitted(&engine, 40_00).await;

    let err = engine.submit_request(&id, &alice()).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadySubmitted(_)));

    let history = engine.request_history(&id, &alice()).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn empty_draft_cannot_be_submitted() {
    let (engine, _mailer) = engine_with_db().await;
    let request = engine.create_request(&alice(), None).await.unwrap();

    let err = engine
        .submit_request(&request.id.to_string(), &alice())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let request = engine
        .request(&request.id.to_string(), &alice())
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Draft);
}

#[tokio::test]
async fn other_students_cannot_submit_or_see_a_draft() {
    let (engine, _mailer) = engine_with_db().await;
    let id = draft_with_item(&engine, 10_00).await;
    let bob = Actor::student("bob");

    assert!(matches!(
        engine.submit_request(&id, &bob).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.request(&id, &bob).await,
        Err(EngineError::KeyNotFound(_))
    ));
    // Reviewers only see requests once they leave draft.
    assert!(matches!(
        engine.request(&id, &carol()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn decisions_require_a_pending_request() {
    let (engine, _mailer) = engine_with_db().await;

    let draft = draft_with_item(&engine, 10_00).await;
    assert!(matches!(
        engine.decide(&draft, &carol(), Decision::approve()).await,
        Err(EngineError::IllegalTransition(_))
    ));

    let approved = submitted(&engine, 10_00).await;
    engine
        .decide(&approved, &carol(), Decision::approve())
        .await
        .unwrap();
    for decision in [
        Decision::approve(),
        Decision::reject("late"),
        Decision::request_info("receipt?"),
    ] {
        assert!(matches!(
            engine.decide(&approved, &carol(), decision).await,
            Err(EngineError::IllegalTransition(_))
        ));
    }

    engine.mark_paid(&approved, &root(), None).await.unwrap();
    assert!(matches!(
        engine.decide(&approved, &carol(), Decision::approve()).await,
        Err(EngineError::IllegalTransition(_))
    ));

    let rejected = submitted(&engine, 10_00).await;
    engine
        .decide(&rejected, &carol(), Decision::reject("duplicate"))
        .await
        .unwrap();
    assert!(matches!(
        engine.decide(&rejected, &carol(), Decision::approve()).await,
        Err(EngineError::IllegalTransition(_))
    ));
}

#[tokio::test]
async fn blank_rejection_reason_is_a_validation_error() {
    let (engine, _mailer) = engine_with_db().await;
    let id = submitted(&engine, 10_00).await;

    let err = engine
        .decide(&id, &carol(), Decision::reject("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Payload is checked before status: a final request still reports Validation.
    engine.decide(&id, &carol(), Decision::reject("no receipt")).await.unwrap();
    let err = engine
        .decide(&id, &carol(), Decision::reject(""))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn students_cannot_decide() {
    let (engine, _mailer) = engine_with_db().await;
    let id = submitted(&engine, 10_00).await;

    assert!(matches!(
        engine.decide(&id, &alice(), Decision::approve()).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.mark_paid(&id, &carol(), None).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn info_round_trip_returns_to_review() {
    let (engine, mailer) = engine_with_db().await;
    let id = submitted(&engine, 200_00).await;

    let outcome = engine.start_review(&id, &carol()).await.unwrap();
    assert_eq!(outcome.status(), RequestStatus::UnderReview);
    assert_eq!(outcome.dispatch.notification, None);

    let outcome = engine
        .decide(&id, &carol(), Decision::request_info("Please attach the hotel invoice"))
        .await
        .unwrap();
    assert_eq!(outcome.status(), RequestStatus::PendingInfo);
    assert_eq!(
        outcome.dispatch.notification.map(|n| n.kind),
        Some(NotificationKind::InfoRequested)
    );
    assert_eq!(mailer.sent().len(), 1);

    assert!(matches!(
        engine.provide_info(&id, &Actor::student("bob"), "here").await,
        Err(EngineError::KeyNotFound(_))
    ));
    let outcome = engine
        .provide_info(&id, &alice(), "Invoice uploaded")
        .await
        .unwrap();
    assert_eq!(outcome.status(), RequestStatus::UnderReview);

    let outcome = engine
        .decide(&id, &carol(), Decision::approve())
        .await
        .unwrap();
    assert_eq!(outcome.status(), RequestStatus::Approved);

    let history = engine.request_history(&id, &carol()).await.unwrap();
    let actions: Vec<_> = history.iter().map(|h| h.action).collect();
    assert_eq!(
        actions,
        vec![
            HistoryAction::Submitted,
            HistoryAction::Reviewed,
            HistoryAction::InfoRequested,
            HistoryAction::InfoProvided,
            HistoryAction::Approved,
        ]
    );
    assert_eq!(history[3].note.as_deref(), Some("Invoice uploaded"));
}

#[tokio::test]
async fn history_chain_is_ordered_and_consistent() {
    let (engine, _mailer) = engine_with_db().await;
    let id = submitted(&engine, 80_00).await;
    engine.start_review(&id, &carol()).await.unwrap();
    engine
        .decide(&id, &carol(), Decision::approve())
        .await
        .unwrap();
    let paid = engine.mark_paid(&id, &root(), Some("batch 12")).await.unwrap();
    assert_eq!(paid.status(), RequestStatus::Paid);
    assert!(paid.request.paid_at.is_some());

    let history = engine.request_history(&id, &alice()).await.unwrap();
    assert_eq!(history.len(), 4);
    for (index, entry) in history.iter().enumerate() {
        assert_eq!(entry.sequence, index as i32 + 1);
    }
    for pair in history.windows(2) {
        assert!(pair[0].created_at < pair[1].created_at);
        let prev = pair[0].metadata.clone().unwrap();
        let next = pair[1].metadata.clone().unwrap();
        assert_eq!(prev.to_status, next.from_status);
    }
    let last = history.last().unwrap().metadata.clone().unwrap();
    assert_eq!(last.to_status, RequestStatus::Paid);
}

#[tokio::test]
async fn items_freeze_after_submission() {
    let (engine, _mailer) = engine_with_db().await;
    let request = engine.create_request(&alice(), None).await.unwrap();
    let id = request.id.to_string();
    let item = engine.add_item(&id, &alice(), meal(30_00)).await.unwrap();
    engine.add_item(&id, &alice(), meal(12_50)).await.unwrap();

    assert_eq!(
        engine.request(&id, &alice()).await.unwrap().total_amount,
        MoneyCents::new(42_50)
    );

    engine
        .update_item(&id, &item.id.to_string(), &alice(), meal(20_00))
        .await
        .unwrap();
    assert_eq!(
        engine.compute_total(&id, &alice()).await.unwrap(),
        MoneyCents::new(32_50)
    );

    engine.submit_request(&id, &alice()).await.unwrap();

    assert!(matches!(
        engine.add_item(&id, &alice(), meal(1_00)).await,
        Err(EngineError::InvalidState(_))
    ));
    assert!(matches!(
        engine
            .remove_item(&id, &item.id.to_string(), &alice())
            .await,
        Err(EngineError::InvalidState(_))
    ));
    assert!(matches!(
        engine.delete_request(&id, &alice()).await,
        Err(EngineError::InvalidState(_))
    ));

    let detail = engine.request_detail(&id, &alice()).await.unwrap();
    assert_eq!(detail.items.len(), 2);
    assert_eq!(detail.request.total_amount, MoneyCents::new(32_50));
}

#[tokio::test]
async fn item_validation() {
    let mailer = Arc::new(RecordingMailer::default());
    let policy = EnginePolicy {
        expense_date_grace_days: Some(0),
    };
    let (engine, _db) = engine_with_mailer(mailer, policy).await;
    let request = engine.create_request(&alice(), None).await.unwrap();
    let id = request.id.to_string();

    assert!(matches!(
        engine.add_item(&id, &alice(), meal(0)).await,
        Err(EngineError::Validation(_))
    ));
    let blank = ItemInput::new(MoneyCents::new(5_00), ItemCategory::Books, "  ", day(1));
    assert!(matches!(
        engine.add_item(&id, &alice(), blank).await,
        Err(EngineError::Validation(_))
    ));
    let future = chrono::Utc::now().date_naive() + chrono::Duration::days(30);
    let future = ItemInput::new(MoneyCents::new(5_00), ItemCategory::Books, "Textbook", future);
    assert!(matches!(
        engine.add_item(&id, &alice(), future).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn out_of_range_grace_window_fails_the_build() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    for days in [-1, i64::MAX] {
        let result = Engine::builder()
            .database(db.clone())
            .policy(EnginePolicy {
                expense_date_grace_days: Some(days),
            })
            .build()
            .await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }
}

#[tokio::test]
async fn bank_transaction_backs_one_live_item() {
    let (engine, _mailer) = engine_with_db().await;
    let transaction = engine
        .record_bank_transaction(
            &alice(),
            BankTransactionInput::new(MoneyCents::new(64_20), "DB Fernverkehr", day(4))
                .merchant("Deutsche Bahn"),
        )
        .await
        .unwrap();

    let first = engine.create_request(&alice(), None).await.unwrap();
    let first_id = first.id.to_string();
    let item = engine
        .add_transaction_item(
            &first_id,
            &alice(),
            TransactionItemInput::new(transaction.id, ItemCategory::Transportation),
        )
        .await
        .unwrap();
    assert_eq!(item.origin, ItemOrigin::BankTransaction);
    assert_eq!(item.amount, MoneyCents::new(64_20));
    assert_eq!(item.description, "DB Fernverkehr");
    assert_eq!(item.source_transaction_id, Some(transaction.id));
    assert!(
        engine
            .unclaimed_bank_transactions(&alice())
            .await
            .unwrap()
            .is_empty()
    );

    let second = engine.create_request(&alice(), None).await.unwrap();
    let second_id = second.id.to_string();
    assert!(matches!(
        engine
            .add_transaction_item(
                &second_id,
                &alice(),
                TransactionItemInput::new(transaction.id, ItemCategory::Travel),
            )
            .await,
        Err(EngineError::ExistingKey(_))
    ));

    // Once the first request is rejected the transaction is free again.
    engine.submit_request(&first_id, &alice()).await.unwrap();
    engine
        .decide(&first_id, &carol(), Decision::reject("wrong trip"))
        .await
        .unwrap();
    engine
        .add_transaction_item(
            &second_id,
            &alice(),
            TransactionItemInput::new(transaction.id, ItemCategory::Travel),
        )
        .await
        .unwrap();

    // Someone else's transaction is invisible.
    assert!(matches!(
        engine
            .add_transaction_item(
                &second_id,
                &alice(),
                TransactionItemInput::new(uuid::Uuid::new_v4(), ItemCategory::Travel),
            )
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn email_failure_does_not_undo_the_transition() {
    let mailer = Arc::new(RecordingMailer::failing());
    let (engine, _db) = engine_with_mailer(mailer, EnginePolicy::default()).await;
    let id = submitted(&engine, 90_00).await;

    let outcome = engine
        .decide(&id, &carol(), Decision::approve())
        .await
        .unwrap();
    assert_eq!(outcome.status(), RequestStatus::Approved);
    assert!(!outcome.dispatch.email_sent);
    assert_eq!(
        outcome.dispatch.email_error.as_deref(),
        Some("provider returned 503")
    );
    assert!(outcome.dispatch.notification.is_some());

    let request = engine.request(&id, &alice()).await.unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    let history = engine.request_history(&id, &alice()).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn owner_without_email_gets_only_the_inbox_entry() {
    let (engine, mailer) = engine_with_db().await;
    let bob = Actor::student("bob");
    let request = engine.create_request(&bob, None).await.unwrap();
    let id = request.id.to_string();
    engine.add_item(&id, &bob, meal(15_00)).await.unwrap();
    engine.submit_request(&id, &bob).await.unwrap();

    let outcome = engine
        .decide(&id, &carol(), Decision::approve())
        .await
        .unwrap();
    assert!(!outcome.dispatch.email_sent);
    assert_eq!(
        outcome.dispatch.email_error.as_deref(),
        Some("recipient has no email address")
    );
    assert!(mailer.sent().is_empty());
    assert_eq!(engine.unread_count(&bob).await.unwrap(), 1);
}

#[tokio::test]
async fn inbox_read_and_delete() {
    let (engine, _mailer) = engine_with_db().await;
    let first = submitted(&engine, 10_00).await;
    let second = submitted(&engine, 20_00).await;
    engine
        .decide(&first, &carol(), Decision::approve())
        .await
        .unwrap();
    engine
        .decide(&second, &carol(), Decision::reject("over budget"))
        .await
        .unwrap();

    assert_eq!(engine.unread_count(&alice()).await.unwrap(), 2);
    let inbox = engine.notifications(&alice(), false, 10).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].kind, NotificationKind::Rejected);

    let read = engine
        .mark_notification_read(&inbox[0].id.to_string(), &alice())
        .await
        .unwrap();
    assert!(read.read);
    assert!(read.read_at.is_some());
    assert_eq!(engine.unread_count(&alice()).await.unwrap(), 1);
    assert_eq!(
        engine.notifications(&alice(), true, 10).await.unwrap().len(),
        1
    );

    // Recipients only.
    assert!(matches!(
        engine
            .mark_notification_read(&inbox[1].id.to_string(), &carol())
            .await,
        Err(EngineError::KeyNotFound(_))
    ));

    assert_eq!(
        engine.mark_all_notifications_read(&alice()).await.unwrap(),
        1
    );
    assert_eq!(engine.unread_count(&alice()).await.unwrap(), 0);

    engine
        .delete_notification(&inbox[1].id.to_string(), &alice())
        .await
        .unwrap();
    assert_eq!(
        engine.notifications(&alice(), false, 10).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn auto_approval_setting_is_admin_only() {
    let (engine, _mailer) = engine_with_db().await;

    assert_eq!(
        engine.auto_approval_setting(&carol()).await.unwrap(),
        AutoApprovalSetting::disabled()
    );
    assert!(matches!(
        engine
            .set_auto_approval(&carol(), AutoApprovalSetting::enabled(MoneyCents::new(1)))
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine
            .set_auto_approval(&root(), AutoApprovalSetting::enabled(MoneyCents::new(-1)))
            .await,
        Err(EngineError::Validation(_))
    ));

    engine
        .set_auto_approval(&root(), AutoApprovalSetting::enabled(MoneyCents::new(25_00)))
        .await
        .unwrap();
    engine
        .set_auto_approval(&root(), AutoApprovalSetting::enabled(MoneyCents::new(30_00)))
        .await
        .unwrap();
    assert_eq!(
        engine.auto_approval_setting(&root()).await.unwrap(),
        AutoApprovalSetting::enabled(MoneyCents::new(30_00))
    );
    assert!(matches!(
        engine.auto_approval_setting(&alice()).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn listing_respects_visibility_and_pages() {
    let (engine, _mailer) = engine_with_db().await;
    let _draft = draft_with_item(&engine, 5_00).await;
    for cents in [10_00, 20_00, 30_00] {
        submitted(&engine, cents).await;
    }

    let mine = engine
        .list_requests(&alice(), 50, &RequestListFilter::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 4);

    let queue = engine
        .list_requests(&carol(), 50, &RequestListFilter::default())
        .await
        .unwrap();
    assert_eq!(queue.len(), 3);
    assert!(queue.iter().all(|r| r.status != RequestStatus::Draft));

    let drafts = engine
        .list_requests(
            &alice(),
            50,
            &RequestListFilter {
                status: Some(RequestStatus::Draft),
                ..RequestListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);

    let (page, cursor) = engine
        .list_requests_page(&carol(), 2, None, &RequestListFilter::default())
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    let cursor = cursor.unwrap();
    let (rest, next) = engine
        .list_requests_page(&carol(), 2, Some(&cursor), &RequestListFilter::default())
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert!(next.is_none());
    assert!(page.iter().all(|r| r.id != rest[0].id));

    assert!(matches!(
        engine
            .list_requests_page(&carol(), 2, Some("not-a-cursor"), &RequestListFilter::default())
            .await,
        Err(EngineError::InvalidCursor(_))
    ));
}

#[tokio::test]
async fn deleting_a_draft_removes_it() {
    let (engine, _mailer) = engine_with_db().await;
    let id = draft_with_item(&engine, 5_00).await;

    engine.delete_request(&id, &alice()).await.unwrap();
    assert!(matches!(
        engine.request(&id, &alice()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn credentials_resolve_to_actor() {
    let (engine, _mailer) = engine_with_db().await;

    let actor = engine.authenticate("carol", "password").await.unwrap();
    assert_eq!(actor, carol());
    assert!(matches!(
        engine.authenticate("carol", "nope").await,
        Err(EngineError::Unauthorized(_))
    ));
    assert!(matches!(
        engine
            .register_user("carol", "x", Role::Student, None)
            .await,
        Err(EngineError::ExistingKey(_))
    ));
}
