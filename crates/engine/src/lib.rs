//! Group expense ledger.
//!
//! The engine turns a mutable list of (payer, amount) expense records into a
//! consistent per-member financial position: how much each member has paid,
//! what their equal share of the group total is, and the resulting balance.
//!
//! Structure:
//!
//! - entity modules ([`groups`], [`memberships`], [`expenses`], [`users`])
//!   hold the sea-orm models next to their domain types;
//! - [`balance`] is the pure balance computation;
//! - [`ops`] is the orchestration layer: every mutation runs inside its
//!   group's serialization scope and returns the post-mutation
//!   [`GroupDetail`].

pub use balance::MemberBalance;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseStatus, ExpenseUpdate};
pub use groups::{Group, GroupDetail, GroupSummary};
pub use memberships::Member;
pub use money::Money;
pub use ops::{Engine, EngineBuilder};

pub mod balance;
mod error;
mod expenses;
mod groups;
mod memberships;
mod money;
mod ops;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
