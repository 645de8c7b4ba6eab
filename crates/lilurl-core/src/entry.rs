use crate::owner::OwnerId;
use crate::shortcode::ShortCode;
use jiff::{SignedDuration, Timestamp};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use typed_builder::TypedBuilder;

/// How long an entry stays live after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// The entry never expires.
    #[default]
    Never,
    /// The entry expires once this much time has passed since creation.
    After(SignedDuration),
}

impl Expiry {
    /// Maps a configured duration to a policy. A zero duration means the
    /// entry never expires.
    pub fn from_duration(duration: SignedDuration) -> Self {
        if duration.is_zero() {
            Expiry::Never
        } else {
            Expiry::After(duration)
        }
    }

    /// Returns the first instant at which an entry created at `created_at`
    /// counts as expired. A deadline past the end of representable time is
    /// treated as never.
    pub fn deadline(&self, created_at: Timestamp) -> Option<Timestamp> {
        match self {
            Expiry::Never => None,
            Expiry::After(duration) => created_at.checked_add(*duration).ok(),
        }
    }
}

/// Observable state of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    Active,
    Expired,
    Exhausted,
}

/// One shortened URL.
///
/// Everything except the remaining access count is fixed at creation. The
/// count only goes down through [`Entry::try_consume`] or is replaced
/// wholesale through [`Entry::set_remaining_accesses`], and never drops
/// below zero.
#[derive(Debug, TypedBuilder)]
pub struct Entry {
    code: ShortCode,
    #[builder(setter(into))]
    original_url: String,
    owner: OwnerId,
    created_at: Timestamp,
    #[builder(default)]
    expiry: Expiry,
    #[builder(setter(transform = |limit: u32| AtomicU32::new(limit)))]
    remaining_accesses: AtomicU32,
}

impl Entry {
    pub fn code(&self) -> &ShortCode {
        &self.code
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expiry(&self) -> Expiry {
        self.expiry
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expiry.deadline(self.created_at)
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at().is_some_and(|expire_at| now >= expire_at)
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner == *owner
    }

    pub fn remaining_accesses(&self) -> u32 {
        self.remaining_accesses.load(Ordering::Acquire)
    }

    /// Atomically takes one access from the counter.
    ///
    /// Returns `false` without touching the counter when it is already zero,
    /// so concurrent callers can never take more accesses than were granted.
    pub fn try_consume(&self) -> bool {
        self.remaining_accesses
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }

    /// Replaces the remaining access count.
    pub fn set_remaining_accesses(&self, limit: u32) {
        self.remaining_accesses.store(limit, Ordering::Release);
    }

    pub fn state(&self, now: Timestamp) -> LinkState {
        if self.is_expired(now) {
            LinkState::Expired
        } else if self.remaining_accesses() == 0 {
            LinkState::Exhausted
        } else {
            LinkState::Active
        }
    }

    pub fn snapshot(&self, now: Timestamp) -> EntrySnapshot {
        EntrySnapshot {
            code: self.code.clone(),
            original_url: self.original_url.clone(),
            owner: self.owner.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at(),
            remaining_accesses: self.remaining_accesses(),
            state: self.state(now),
        }
    }
}

/// A point-in-time copy of an entry, safe to hand out of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySnapshot {
    pub code: ShortCode,
    pub original_url: String,
    pub owner: OwnerId,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub remaining_accesses: u32,
    pub state: LinkState,
}
