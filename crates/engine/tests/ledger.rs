use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Engine, EngineError, ExpenseStatus, ExpenseUpdate, Money};
use migration::MigratorTrait;

async fn seed_user(db: &DatabaseConnection, id: &str, name: &str, email: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, name, email) VALUES (?, ?, ?)",
        vec![id.into(), name.into(), email.into()],
    ))
    .await
    .unwrap();
}

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_user(&db, "u-alice", "Alice", "alice@example.com").await;
    seed_user(&db, "u-bob", "Bob", "bob@example.com").await;
    seed_user(&db, "u-carol", "Carol", "carol@example.com").await;
    Engine::builder().database(db).build()
}

async fn engine_with_file_db() -> (Engine, std::path::PathBuf) {
    let root =
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("ledger_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_user(&db, "u-alice", "Alice", "alice@example.com").await;
    seed_user(&db, "u-bob", "Bob", "bob@example.com").await;

    (Engine::builder().database(db).build(), path)
}

/// Group with Alice (owner) and Bob as members.
async fn two_member_group(engine: &Engine) -> String {
    let detail = engine
        .new_group("u-alice", "Trip", Some("spring trip"))
        .await
        .unwrap();
    let group_id = detail.group.id.to_string();
    engine
        .add_member(&group_id, "u-alice", "bob@example.com")
        .await
        .unwrap();
    group_id
}

#[tokio::test]
async fn new_group_seeds_owner_with_zero_balances() {
    let engine = engine_with_db().await;

    let detail = engine.new_group("u-alice", "Trip", None).await.unwrap();

    assert_eq!(detail.group.owner_id, "u-alice");
    assert_eq!(detail.members.len(), 1);
    assert_eq!(detail.members[0].user_id, "u-alice");
    assert_eq!(detail.members[0].position, 0);
    assert!(detail.expenses.is_empty());
    assert_eq!(detail.total_expense, Money::ZERO);
    assert_eq!(detail.balances.len(), 1);
    assert_eq!(detail.balances[0].balance, Money::ZERO);
}

#[tokio::test]
async fn new_group_rejects_unknown_owner_and_duplicate_name() {
    let engine = engine_with_db().await;

    let err = engine.new_group("u-ghost", "Trip", None).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("user not exists".to_string()));

    engine.new_group("u-alice", "Trip", None).await.unwrap();
    let err = engine.new_group("u-alice", "  trip ", None).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyExists(_)));
}

#[tokio::test]
async fn add_member_keeps_join_order_owner_first() {
    let engine = engine_with_db().await;
    let group_id = two_member_group(&engine).await;

    let detail = engine
        .add_member(&group_id, "u-alice", "carol@example.com")
        .await
        .unwrap();

    let ids: Vec<&str> = detail.members.iter().map(|m| m.user_id.as_str()).collect();
    assert_eq!(ids, ["u-alice", "u-bob", "u-carol"]);
    assert_eq!(detail.members[2].position, 2);
}

#[tokio::test]
async fn add_member_failures_are_distinct() {
    let engine = engine_with_db().await;
    let group_id = two_member_group(&engine).await;

    // Non-owner requester, even though Bob is a member.
    let err = engine
        .add_member(&group_id, "u-bob", "carol@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // Unknown email.
    let err = engine
        .add_member(&group_id, "u-alice", "nobody@example.com")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("user not exists".to_string()));

    // Duplicate add is an explicit failure, not a silent no-op.
    let err = engine
        .add_member(&group_id, "u-alice", "bob@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyMember(_)));

    // Unknown group.
    let err = engine
        .add_member(&Uuid::new_v4().to_string(), "u-alice", "bob@example.com")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("group not exists".to_string()));
}

#[tokio::test]
async fn balances_follow_the_reference_scenario() {
    let engine = engine_with_db().await;
    let group_id = two_member_group(&engine).await;

    let detail = engine
        .add_expense(
            &group_id,
            "alice@example.com",
            Money::new(10_00),
            None,
            ExpenseStatus::Assigned,
        )
        .await
        .unwrap();

    assert_eq!(detail.total_expense, Money::new(10_00));
    assert_eq!(detail.balances[0].paid, Money::new(10_00));
    assert_eq!(detail.balances[0].owed, Money::new(5_00));
    assert_eq!(detail.balances[0].balance, Money::new(5_00));
    assert_eq!(detail.balances[1].balance, Money::new(-5_00));

    // 15.01 across two members: the earliest-joined member (Alice) carries
    // the extra minor unit, and the shares still sum to the exact total.
    let detail = engine
        .add_expense(
            &group_id,
            "bob@example.com",
            Money::new(5_01),
            Some("gelato"),
            ExpenseStatus::Paid,
        )
        .await
        .unwrap();

    assert_eq!(detail.total_expense, Money::new(15_01));
    assert_eq!(detail.balances[0].owed, Money::new(7_51));
    assert_eq!(detail.balances[1].owed, Money::new(7_50));
    let balance_sum: Money = detail.balances.iter().map(|b| b.balance).sum();
    assert_eq!(balance_sum, Money::ZERO);
}

#[tokio::test]
async fn add_expense_failures_are_distinct() {
    let engine = engine_with_db().await;
    let group_id = two_member_group(&engine).await;

    // Known user outside the group vs unknown email.
    let err = engine
        .add_expense(
            &group_id,
            "carol@example.com",
            Money::new(100),
            None,
            ExpenseStatus::Assigned,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotAMember(_)));

    let err = engine
        .add_expense(
            &group_id,
            "nobody@example.com",
            Money::new(100),
            None,
            ExpenseStatus::Assigned,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    // Non-positive amounts are rejected, never clamped.
    for amount in [Money::ZERO, Money::new(-1)] {
        let err = engine
            .add_expense(
                &group_id,
                "alice@example.com",
                amount,
                None,
                ExpenseStatus::Assigned,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    // Nothing was committed along the way.
    let detail = engine.group_detail(&group_id).await.unwrap();
    assert!(detail.expenses.is_empty());
    assert_eq!(detail.total_expense, Money::ZERO);
}

#[tokio::test]
async fn expenses_are_listed_newest_first() {
    let engine = engine_with_db().await;
    let group_id = two_member_group(&engine).await;

    for (amount, note) in [(1_00, "first"), (2_00, "second"), (3_00, "third")] {
        engine
            .add_expense(
                &group_id,
                "alice@example.com",
                Money::new(amount),
                Some(note),
                ExpenseStatus::Assigned,
            )
            .await
            .unwrap();
    }

    let detail = engine.group_detail(&group_id).await.unwrap();
    let notes: Vec<&str> = detail
        .expenses
        .iter()
        .map(|e| e.note.as_deref().unwrap())
        .collect();
    assert_eq!(notes, ["third", "second", "first"]);
}

#[tokio::test]
async fn update_expense_applies_only_supplied_fields() {
    let engine = engine_with_db().await;
    let group_id = two_member_group(&engine).await;

    let detail = engine
        .add_expense(
            &group_id,
            "alice@example.com",
            Money::new(10_00),
            Some("hotel"),
            ExpenseStatus::Assigned,
        )
        .await
        .unwrap();
    let expense_id = detail.expenses[0].id.to_string();

    let detail = engine
        .update_expense(
            &group_id,
            &expense_id,
            ExpenseUpdate {
                amount: Some(Money::new(12_00)),
                status: Some(ExpenseStatus::Approved),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let expense = &detail.expenses[0];
    assert_eq!(expense.amount, Money::new(12_00));
    assert_eq!(expense.status, ExpenseStatus::Approved);
    // Untouched fields survive.
    assert_eq!(expense.payer_id, "u-alice");
    assert_eq!(expense.note.as_deref(), Some("hotel"));
    assert_eq!(detail.total_expense, Money::new(12_00));

    // Re-assign the payer; balances follow.
    let detail = engine
        .update_expense(
            &group_id,
            &expense_id,
            ExpenseUpdate {
                payer_email: Some("bob@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(detail.expenses[0].payer_id, "u-bob");
    assert_eq!(detail.balances[1].paid, Money::new(12_00));
}

#[tokio::test]
async fn failed_update_leaves_the_snapshot_untouched() {
    let engine = engine_with_db().await;
    let group_id = two_member_group(&engine).await;

    let before = engine
        .add_expense(
            &group_id,
            "alice@example.com",
            Money::new(10_00),
            Some("hotel"),
            ExpenseStatus::Assigned,
        )
        .await
        .unwrap();
    let expense_id = before.expenses[0].id.to_string();

    // The amount change would be valid, but the payer is not a member: the
    // edit must apply all supplied fields or none.
    let err = engine
        .update_expense(
            &group_id,
            &expense_id,
            ExpenseUpdate {
                payer_email: Some("carol@example.com".to_string()),
                amount: Some(Money::new(99_99)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotAMember(_)));

    let after = engine.group_detail(&group_id).await.unwrap();
    assert_eq!(after.total_expense, before.total_expense);
    assert_eq!(after.balances, before.balances);
    assert_eq!(after.expenses, before.expenses);
}

#[tokio::test]
async fn add_then_delete_restores_prior_balances() {
    let engine = engine_with_db().await;
    let group_id = two_member_group(&engine).await;

    let before = engine
        .add_expense(
            &group_id,
            "alice@example.com",
            Money::new(10_00),
            None,
            ExpenseStatus::Assigned,
        )
        .await
        .unwrap();

    let added = engine
        .add_expense(
            &group_id,
            "bob@example.com",
            Money::new(5_01),
            None,
            ExpenseStatus::Assigned,
        )
        .await
        .unwrap();
    let added_id = added.expenses[0].id.to_string();

    let after = engine.delete_expense(&group_id, &added_id).await.unwrap();
    assert_eq!(after.total_expense, before.total_expense);
    assert_eq!(after.balances, before.balances);
    assert_eq!(after.expenses.len(), 1);

    let err = engine.delete_expense(&group_id, &added_id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("expense not exists".to_string()));
}

#[tokio::test]
async fn list_user_groups_orders_by_name_with_member_counts() {
    let engine = engine_with_db().await;

    let trip = engine.new_group("u-alice", "Trip", None).await.unwrap();
    engine
        .add_member(&trip.group.id.to_string(), "u-alice", "bob@example.com")
        .await
        .unwrap();
    engine.new_group("u-alice", "Flat", None).await.unwrap();
    engine.new_group("u-carol", "Dinners", None).await.unwrap();

    let groups = engine.list_user_groups("u-alice").await.unwrap();
    let names: Vec<&str> = groups.iter().map(|g| g.group.name.as_str()).collect();
    assert_eq!(names, ["Flat", "Trip"]);
    assert_eq!(groups[1].member_count, 2);

    // Bob sees the group he was added to, not the ones he is outside of.
    let groups = engine.list_user_groups("u-bob").await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].group.name, "Trip");

    let err = engine.list_user_groups("u-ghost").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn concurrent_expenses_on_one_group_lose_nothing() {
    let (engine, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);

    let detail = engine.new_group("u-alice", "Trip", None).await.unwrap();
    let group_id = detail.group.id.to_string();
    engine
        .add_member(&group_id, "u-alice", "bob@example.com")
        .await
        .unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        let group_id = group_id.clone();
        tasks.spawn(async move {
            engine
                .add_expense(
                    &group_id,
                    "alice@example.com",
                    Money::new(1_00),
                    None,
                    ExpenseStatus::Assigned,
                )
                .await
        });
    }

    let mut observed_totals = Vec::new();
    while let Some(result) = tasks.join_next().await {
        let detail = result.unwrap().unwrap();
        observed_totals.push(detail.total_expense);
    }

    // Each caller saw a view containing at least its own committed expense,
    // and the final total shows no lost update.
    assert!(observed_totals.iter().all(|t| t.minor() % 1_00 == 0));
    let detail = engine.group_detail(&group_id).await.unwrap();
    assert_eq!(detail.total_expense, Money::new(8_00));
    assert_eq!(detail.expenses.len(), 8);
    let balance_sum: Money = detail.balances.iter().map(|b| b.balance).sum();
    assert_eq!(balance_sum, Money::ZERO);

    std::fs::remove_file(path).ok();
}
