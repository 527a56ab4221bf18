//! Per-user draft slots.
//!
//! Each generation request takes a ticket before calling the model. When
//! results arrive out of order, only the most recently issued ticket may
//! fill the slot.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use ringbook_shared::types::UserId;

use crate::ledger::CandidateEntry;

/// Ticket identifying one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    user: UserId,
    seq: u64,
}

#[derive(Debug, Default)]
struct Slot {
    latest: u64,
    entry: Option<CandidateEntry>,
}

/// Holder of each user's current candidate entry.
#[derive(Debug, Default)]
pub struct DraftSlots {
    next: AtomicU64,
    slots: DashMap<UserId, Slot>,
}

impl DraftSlots {
    /// Creates an empty set of slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket for a new request, superseding earlier ones.
    pub fn begin(&self, user: UserId) -> Ticket {
        let seq = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let mut slot = self.slots.entry(user).or_default();
        slot.latest = slot.latest.max(seq);
        Ticket { user, seq }
    }

    /// Stores `entry` if `ticket` is still the latest for its user.
    ///
    /// Returns whether the entry was stored.
    pub fn complete(&self, ticket: Ticket, entry: CandidateEntry) -> bool {
        let Some(mut slot) = self.slots.get_mut(&ticket.user) else {
            return false;
        };
        if slot.latest != ticket.seq {
            return false;
        }
        slot.entry = Some(entry);
        true
    }

    /// The user's current candidate, if any.
    #[must_use]
    pub fn current(&self, user: UserId) -> Option<CandidateEntry> {
        self.slots.get(&user).and_then(|slot| slot.entry.clone())
    }

    /// Applies `edit` to the user's candidate.
    ///
    /// The edit runs on a copy; the slot changes only if it succeeds.
    /// Returns `None` when the user has no candidate.
    pub fn edit<E>(
        &self,
        user: UserId,
        edit: impl FnOnce(&mut CandidateEntry) -> Result<(), E>,
    ) -> Option<Result<CandidateEntry, E>> {
        let mut slot = self.slots.get_mut(&user)?;
        let mut entry = slot.entry.clone()?;
        Some(edit(&mut entry).map(|()| {
            slot.entry = Some(entry.clone());
            entry
        }))
    }

    /// Clears the user's slot, invalidating outstanding tickets.
    pub fn clear(&self, user: UserId) {
        self.slots.remove(&user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Amount;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn draft(description: &str) -> CandidateEntry {
        CandidateEntry {
            date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            description: description.into(),
            entries: vec![],
            total_debit: Amount::ZERO,
            total_credit: Amount::ZERO,
        }
    }

    #[test]
    fn test_latest_ticket_wins_out_of_order() {
        let slots = DraftSlots::new();
        let user = UserId::new();

        let first = slots.begin(user);
        let second = slots.begin(user);

        assert!(slots.complete(second, draft("second")));
        assert!(!slots.complete(first, draft("first")));
        assert_eq!(slots.current(user).unwrap().description, "second");
    }

    #[test]
    fn test_users_are_independent() {
        let slots = DraftSlots::new();
        let (alice, bob) = (UserId::new(), UserId::new());

        let a = slots.begin(alice);
        let b = slots.begin(bob);

        assert!(slots.complete(a, draft("alice")));
        assert!(slots.complete(b, draft("bob")));
        assert_eq!(slots.current(alice).unwrap().description, "alice");
        assert_eq!(slots.current(bob).unwrap().description, "bob");
    }

    #[test]
    fn test_clear_invalidates_outstanding_ticket() {
        let slots = DraftSlots::new();
        let user = UserId::new();

        let ticket = slots.begin(user);
        slots.clear(user);

        assert!(!slots.complete(ticket, draft("late")));
        assert!(slots.current(user).is_none());
    }

    #[test]
    fn test_edit_keeps_slot_on_failure() {
        let slots = DraftSlots::new();
        let user = UserId::new();
        assert!(slots.edit(user, |_| Ok::<(), ()>(())).is_none());

        let ticket = slots.begin(user);
        slots.complete(ticket, draft("lunch"));

        let failed = slots.edit(user, |entry| {
            entry.description = "changed".into();
            Err("rejected")
        });
        assert_eq!(failed, Some(Err("rejected")));
        assert_eq!(slots.current(user).unwrap().description, "lunch");

        let edited = slots.edit(user, |entry| {
            entry.description = "team lunch".into();
            Ok::<(), &str>(())
        });
        assert_eq!(edited.unwrap().unwrap().description, "team lunch");
        assert_eq!(slots.current(user).unwrap().description, "team lunch");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Whatever order results arrive in, the slot ends up holding the
        /// result of the last request started.
        #[test]
        fn prop_stale_ticket_never_overwrites(order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle()) {
            let slots = DraftSlots::new();
            let user = UserId::new();
            let tickets: Vec<Ticket> = (0..8).map(|_| slots.begin(user)).collect();

            for i in order {
                slots.complete(tickets[i], draft(&i.to_string()));
            }

            prop_assert_eq!(slots.current(user).unwrap().description, "7");
        }
    }
}
