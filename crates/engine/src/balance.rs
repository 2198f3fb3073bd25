//! Pure balance computation.
//!
//! Given a membership snapshot and the expenses recorded against it, derive
//! each member's position: `paid` (what they fronted), `owed` (their equal
//! share of the group total) and `balance = paid - owed`. Nothing here
//! mutates state or performs I/O; the orchestration layer calls it on a
//! committed snapshot and the same input always yields the same output.
//!
//! Conservation invariant: the `owed` column is carved out of the group
//! total with [`Money::split_even`], handing the leftover minor units to the
//! earliest-joined members one each. `sum(owed) == total` exactly, hence
//! `sum(balance) == 0` exactly, so rounding never leaks money.

use std::collections::HashMap;

use crate::{Expense, Member, Money};

/// Derived position of one member. Never stored; recomputed from the current
/// committed snapshot on every read that follows a mutation.
///
/// Positive `balance` means the group owes this member money, negative means
/// the member owes the group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberBalance {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub paid: Money,
    pub owed: Money,
    pub balance: Money,
}

/// Computes `(total_expense, balances)` for a group snapshot.
///
/// `members` must be in join order (position ascending, owner first): the
/// first `total % member_count` members carry one extra minor unit of the
/// shared total.
///
/// Defined over any input: an empty member list yields the expense total and
/// no balances rather than dividing by zero, and a payer absent from
/// `members` still contributes to the total (membership is validated at
/// write time, not here).
pub fn compute(members: &[Member], expenses: &[Expense]) -> (Money, Vec<MemberBalance>) {
    let total: Money = expenses.iter().map(|expense| expense.amount).sum();
    if members.is_empty() {
        return (total, Vec::new());
    }

    let mut paid_by_member: HashMap<&str, Money> = HashMap::new();
    for expense in expenses {
        *paid_by_member
            .entry(expense.payer_id.as_str())
            .or_default() += expense.amount;
    }

    let (base_share, remainder) = total.split_even(members.len());
    let balances = members
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let extra = i64::from((index as i64) < remainder);
            let owed = base_share + Money::new(extra);
            let paid = paid_by_member
                .get(member.user_id.as_str())
                .copied()
                .unwrap_or(Money::ZERO);
            MemberBalance {
                user_id: member.user_id.clone(),
                name: member.name.clone(),
                email: member.email.clone(),
                paid,
                owed,
                balance: paid - owed,
            }
        })
        .collect();

    (total, balances)
}
