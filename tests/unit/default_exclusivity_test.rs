// The default-account invariant: at most one default per client. The
// service computes a handover plan, clears every other account of the
// client inside the write transaction, then saves the target; these tests
// drive the plan logic through the account-A-then-account-B story.

use chrono::Utc;

use rentloop_billing::core::PaymentRail;
use rentloop_billing::modules::payment_accounts::models::{
    AccountOwner, AccountStatus, PaymentAccount,
};
use rentloop_billing::modules::payment_accounts::services::payment_account_service::default_handover;
use rentloop_billing::AppError;

fn client_account(id: &str, client_id: &str, is_default: bool) -> PaymentAccount {
    let now = Utc::now();
    PaymentAccount {
        id: id.to_string(),
        owner: AccountOwner::Client {
            client_id: client_id.to_string(),
        },
        rail: PaymentRail::Momo,
        provider: Some("MTN".to_string()),
        identifier: None,
        metadata: None,
        is_default,
        status: AccountStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

/// The effect of the planned write: when a handover names a client, every
/// account of that client except the target loses the flag, then the target
/// takes it.
fn apply_handover(accounts: &mut [PaymentAccount], plan: &Option<String>, target_id: &str) {
    if let Some(client_id) = plan {
        for account in accounts.iter_mut() {
            if account.id != target_id && account.owner.client_id() == Some(client_id) {
                account.is_default = false;
            }
        }
    }
    if let Some(target) = accounts.iter_mut().find(|a| a.id == target_id) {
        target.is_default = true;
    }
}

#[test]
fn default_flag_hands_over_from_a_to_b() {
    // Client cli-1 holds default account A, then creates B as the default.
    let mut accounts = vec![
        client_account("acct-a", "cli-1", true),
        client_account("acct-b", "cli-1", false),
    ];

    let plan = default_handover(&accounts[1].owner, accounts[1].is_default, true).unwrap();
    assert_eq!(plan.as_deref(), Some("cli-1"));

    apply_handover(&mut accounts, &plan, "acct-b");

    assert!(!accounts[0].is_default, "A must lose the flag");
    assert!(accounts[1].is_default, "B must hold the flag");
    let defaults = accounts.iter().filter(|a| a.is_default).count();
    assert_eq!(defaults, 1);
}

#[test]
fn handover_leaves_other_clients_untouched() {
    let mut accounts = vec![
        client_account("acct-a", "cli-1", true),
        client_account("acct-b", "cli-1", false),
        client_account("acct-x", "cli-2", true),
    ];

    let plan = default_handover(&accounts[1].owner, false, true).unwrap();
    apply_handover(&mut accounts, &plan, "acct-b");

    assert!(accounts[2].is_default, "cli-2's default is not cli-1's business");
}

#[test]
fn re_asserting_the_current_default_plans_no_bulk_unset() {
    let account = client_account("acct-a", "cli-1", true);
    let plan = default_handover(&account.owner, account.is_default, true).unwrap();
    assert_eq!(plan, None);
}

#[test]
fn clearing_the_flag_plans_no_bulk_unset() {
    let account = client_account("acct-a", "cli-1", true);
    let plan = default_handover(&account.owner, account.is_default, false).unwrap();
    assert_eq!(plan, None);
}

#[test]
fn non_client_owners_cannot_take_the_flag() {
    for owner in [AccountOwner::Rentloop, AccountOwner::System] {
        let result = default_handover(&owner, false, true);
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }
}
