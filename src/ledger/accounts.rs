//! Account Ledger
//!
//! Manual cash movements and balance consistency. A player's `balance` is a
//! cache of the sum of their payments; `verify_balances` and
//! `repair_balances` check and restore that.

use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::models::{Caller, NewPayment, Payment, PaymentKind};
use crate::ledger::store::{self, LedgerStore};
use crate::money::Money;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Player whose cached balance disagrees with their ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    pub user_id: Uuid,
    pub name: String,
    pub cached: Money,
    pub ledger: Money,
}

impl BalanceDrift {
    pub fn difference(&self) -> Money {
        self.cached - self.ledger
    }
}

impl LedgerStore {
    /// Record a deposit, refund or adjustment and move the balance with it.
    pub fn record_payment(&self, caller: &Caller, new: NewPayment) -> LedgerResult<Payment> {
        self.record_payment_by(Some(caller.user_id), new)
    }

    /// `record_payment` for callers outside a request, such as the operator CLI.
    pub fn record_payment_by(
        &self,
        created_by: Option<Uuid>,
        new: NewPayment,
    ) -> LedgerResult<Payment> {
        if new.kind == PaymentKind::GameCharge {
            return Err(LedgerError::InvalidArgument(
                "game charges are created by settlement only".to_string(),
            ));
        }
        if new.amount.is_zero() {
            return Err(LedgerError::InvalidArgument(
                "amount must not be zero".to_string(),
            ));
        }

        let payment = self.with_tx(|conn| {
            store::get_player(conn, new.user_id)?;

            let payment = Payment {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                amount: new.amount,
                kind: new.kind,
                description: new
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                game_id: None,
                created_at: Utc::now(),
                created_by,
            };
            store::insert_payment(conn, &payment)?;
            store::increment_balance(conn, payment.user_id, payment.amount)?;
            Ok(payment)
        })?;

        info!(
            user_id = %payment.user_id,
            amount = %payment.amount,
            kind = payment.kind.as_str(),
            "💵 Payment recorded"
        );
        Ok(payment)
    }

    /// Ledger history for one player, newest first.
    pub fn payments_for_player(&self, user_id: Uuid) -> LedgerResult<Vec<Payment>> {
        self.with_conn(|conn| {
            store::get_player(conn, user_id)?;
            store::payments_for_player(conn, user_id)
        })
    }

    pub fn verify_balances(&self) -> LedgerResult<Vec<BalanceDrift>> {
        self.with_conn(|conn| {
            let sums = store::ledger_sums(conn)?;
            let drifts = store::list_players(conn, None)?
                .into_iter()
                .filter_map(|p| {
                    let ledger = sums.get(&p.id).copied().unwrap_or(Money::ZERO);
                    (ledger != p.balance).then(|| BalanceDrift {
                        user_id: p.id,
                        name: p.name,
                        cached: p.balance,
                        ledger,
                    })
                })
                .collect();
            Ok(drifts)
        })
    }

    /// Rewrite every drifted balance from the ledger. Returns how many changed.
    pub fn repair_balances(&self) -> LedgerResult<usize> {
        let repaired = self.with_tx(|conn| {
            let sums = store::ledger_sums(conn)?;
            let mut repaired = 0;
            for player in store::list_players(conn, None)? {
                let ledger = sums.get(&player.id).copied().unwrap_or(Money::ZERO);
                if ledger != player.balance {
                    warn!(
                        user_id = %player.id,
                        cached = %player.balance,
                        ledger = %ledger,
                        "Balance drift, rewriting from ledger"
                    );
                    store::overwrite_balance(conn, player.id, ledger)?;
                    repaired += 1;
                }
            }
            Ok(repaired)
        })?;

        if repaired > 0 {
            info!("🔧 Repaired {} balances", repaired);
        }
        Ok(repaired)
    }
}
