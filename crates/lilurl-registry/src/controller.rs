use crate::error::Result;
use lilurl_core::{
    AccessError, Clock, CoreError, Entry, EntrySnapshot, OwnerId, RegistrySettings, ShortCode,
    SystemClock,
};
use lilurl_generator::Generator;
use lilurl_storage::{EntryStore, UserRegistry};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Outcome of [`AccessController::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub code: ShortCode,
    /// The owner the entry belongs to.
    pub owner: OwnerId,
    /// `true` when the caller brought no owner id and one was generated.
    pub owner_generated: bool,
    /// `true` when an entry with the same code existed and was replaced.
    pub replaced: bool,
}

/// Runs create/access/edit/delete against a store and a user registry.
///
/// Every entry moves through these states:
/// - active: stored, not expired, accesses left
/// - exhausted: the counter reached zero; the entry stays stored but
///   [`access`](Self::access) refuses it
/// - expired: the expiry window elapsed; the next access evicts it
/// - deleted: removed by its owner
///
/// Ownership is a plain comparison between the caller's id and the owner
/// recorded at creation. A repeat create with the same URL and owner derives
/// the same code and replaces the earlier entry, resetting its counter.
pub struct AccessController<S, G> {
    store: Arc<S>,
    users: Arc<UserRegistry>,
    generator: G,
    settings: RegistrySettings,
    clock: Arc<dyn Clock>,
}

impl<S: EntryStore, G: Generator> AccessController<S, G> {
    /// Creates a controller on the system clock. Fails if `settings` does
    /// not validate.
    pub fn new(
        store: Arc<S>,
        users: Arc<UserRegistry>,
        generator: G,
        settings: RegistrySettings,
    ) -> std::result::Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self {
            store,
            users,
            generator,
            settings,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the clock used for creation times and expiry checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn users(&self) -> &Arc<UserRegistry> {
        &self.users
    }

    /// Shortens `original_url` for `owner`, generating an owner id when none
    /// is given. Always succeeds.
    pub fn create(&self, original_url: &str, owner: Option<&OwnerId>) -> Created {
        let (user, owner_generated) = self.users.get_or_create(owner);
        let owner = user.id().clone();

        let code = self.generator.generate(original_url, &owner);
        let entry = Entry::builder()
            .code(code.clone())
            .original_url(original_url)
            .owner(owner.clone())
            .created_at(self.clock.now())
            .expiry(self.settings.expiry_policy())
            .remaining_accesses(self.settings.default_access_limit)
            .build();

        let replaced = self.store.add(entry).is_some();
        self.users.add_owned_code(&owner, code.clone());

        info!(code = %code, owner = %owner, replaced, "created short link");

        Created {
            code,
            owner,
            owner_generated,
            replaced,
        }
    }

    /// Resolves `code` for its owner and spends one access.
    ///
    /// Checks run in this order: the code must exist, must not be expired
    /// (an expired entry is evicted on the spot), must belong to
    /// `claimed_owner`, and must have an access left.
    pub fn access(&self, code: &ShortCode, claimed_owner: &OwnerId) -> Result<String> {
        trace!(code = %code, "resolving short code");

        let entry = self.lookup(code)?;

        if entry.is_expired(self.clock.now()) {
            let evicted = self.store.evict(code, &entry);
            if evicted {
                self.release(code, entry.owner());
            }
            debug!(code = %code, evicted, "short code has expired");
            return Err(AccessError::Expired(code.clone()));
        }

        Self::authorize(&entry, claimed_owner)?;

        if !entry.try_consume() {
            debug!(code = %code, "access limit exhausted");
            return Err(AccessError::LimitExhausted(code.clone()));
        }

        debug!(
            code = %code,
            remaining = entry.remaining_accesses(),
            "resolved short code"
        );
        Ok(entry.original_url().to_owned())
    }

    /// Replaces the remaining access count of `code`.
    ///
    /// Expiry is not evaluated here; an expired entry accepts the new limit
    /// and is still evicted on its next access.
    pub fn edit_access_limit(
        &self,
        code: &ShortCode,
        claimed_owner: &OwnerId,
        new_limit: u32,
    ) -> Result<()> {
        let entry = self.lookup(code)?;
        Self::authorize(&entry, claimed_owner)?;

        let previous = entry.remaining_accesses();
        entry.set_remaining_accesses(new_limit);

        info!(code = %code, previous, new_limit, "updated access limit");
        Ok(())
    }

    /// Removes `code` from the store and from its owner's codes.
    ///
    /// A create that replaced the entry after it was looked up wins; the
    /// fresh entry is left in place.
    pub fn delete(&self, code: &ShortCode, claimed_owner: &OwnerId) -> Result<()> {
        let entry = self.lookup(code)?;
        Self::authorize(&entry, claimed_owner)?;

        if self.store.evict(code, &entry) {
            self.release(code, entry.owner());
            info!(code = %code, owner = %entry.owner(), "deleted short link");
        } else {
            debug!(code = %code, "entry was replaced before it could be deleted");
        }
        Ok(())
    }

    /// Snapshots of the owner's links that are still stored, sorted by code.
    ///
    /// Read-only: expired entries are reported as such, not evicted.
    pub fn links(&self, owner: &OwnerId) -> Vec<EntrySnapshot> {
        let now = self.clock.now();
        self.users
            .owned_codes(owner)
            .iter()
            .filter_map(|code| self.store.get(code))
            .filter(|entry| entry.is_owned_by(owner))
            .map(|entry| entry.snapshot(now))
            .collect()
    }

    /// Evicts every expired entry, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let purged = self.store.purge_expired(self.clock.now());
        for entry in &purged {
            self.release(entry.code(), entry.owner());
        }

        if purged.is_empty() {
            trace!("sweep found no expired links");
        } else {
            info!(purged = purged.len(), "swept expired links");
        }
        purged.len()
    }

    /// The full short URL for `code` under the configured base URL.
    pub fn short_url(&self, code: &ShortCode) -> String {
        code.to_url(&self.settings.base_url)
    }

    /// Accepts either a full short URL or a bare code.
    pub fn parse_short_url(&self, input: &str) -> std::result::Result<ShortCode, CoreError> {
        ShortCode::from_url(&self.settings.base_url, input)
    }

    /// Drops `code` from the owner's codes after its entry left the store.
    fn release(&self, code: &ShortCode, owner: &OwnerId) {
        self.users.remove_owned_code(owner, code);
        // a concurrent create may have stored the code again in between
        if self
            .store
            .get(code)
            .is_some_and(|entry| entry.is_owned_by(owner))
        {
            self.users.add_owned_code(owner, code.clone());
        }
    }

    fn lookup(&self, code: &ShortCode) -> Result<Arc<Entry>> {
        self.store.get(code).ok_or_else(|| {
            trace!(code = %code, "short code not found");
            AccessError::NotFound(code.clone())
        })
    }

    fn authorize(entry: &Entry, claimed_owner: &OwnerId) -> Result<()> {
        if entry.is_owned_by(claimed_owner) {
            Ok(())
        } else {
            debug!(
                code = %entry.code(),
                claimed_owner = %claimed_owner,
                "caller is not the owner"
            );
            Err(AccessError::Unauthorized(entry.code().clone()))
        }
    }
}

impl<S, G> std::fmt::Debug for AccessController<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessController")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
