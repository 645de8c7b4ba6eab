use dashmap::DashMap;
use lilurl_core::{OwnerId, OwnerIdSource, RandomOwnerIds, ShortCode};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// An owner and the short codes they created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: OwnerId,
    owned_codes: HashSet<ShortCode>,
}

impl User {
    pub fn new(id: OwnerId) -> Self {
        Self {
            id,
            owned_codes: HashSet::new(),
        }
    }

    pub fn id(&self) -> &OwnerId {
        &self.id
    }

    pub fn owned_codes(&self) -> &HashSet<ShortCode> {
        &self.owned_codes
    }

    pub fn owns(&self, code: &ShortCode) -> bool {
        self.owned_codes.contains(code)
    }
}

/// Owner id → [`User`], created on first sight.
///
/// Users are never removed; only their owned-code sets shrink. Lookups hand
/// out clones so callers never hold a shard lock.
pub struct UserRegistry {
    users: DashMap<OwnerId, User>,
    ids: Arc<dyn OwnerIdSource>,
}

impl UserRegistry {
    /// Creates a registry that hands out random v4 UUIDs to new owners.
    pub fn new() -> Self {
        Self::with_id_source(RandomOwnerIds)
    }

    pub fn with_id_source(ids: impl OwnerIdSource + 'static) -> Self {
        Self {
            users: DashMap::new(),
            ids: Arc::new(ids),
        }
    }

    /// Returns the user for `owner`, creating it on first sight.
    ///
    /// An absent or blank id gets a freshly generated one, and the returned
    /// flag is `true`. The generated id is available through [`User::id`].
    pub fn get_or_create(&self, owner: Option<&OwnerId>) -> (User, bool) {
        let (id, generated) = match owner.filter(|id| !id.as_str().trim().is_empty()) {
            Some(id) => (id.clone(), false),
            None => {
                let id = self.ids.next_owner_id();
                debug!(owner = %id, "generated owner id");
                (id, true)
            }
        };

        let user = self
            .users
            .entry(id.clone())
            .or_insert_with(|| User::new(id))
            .value()
            .clone();
        (user, generated)
    }

    pub fn get(&self, owner: &OwnerId) -> Option<User> {
        self.users.get(owner).map(|user| user.value().clone())
    }

    /// Records `code` as owned by `owner`. Creates the user if needed.
    pub fn add_owned_code(&self, owner: &OwnerId, code: ShortCode) {
        self.users
            .entry(owner.clone())
            .or_insert_with(|| User::new(owner.clone()))
            .owned_codes
            .insert(code);
    }

    /// Returns `true` if the code was recorded for this owner.
    pub fn remove_owned_code(&self, owner: &OwnerId, code: &ShortCode) -> bool {
        self.users
            .get_mut(owner)
            .is_some_and(|mut user| user.owned_codes.remove(code))
    }

    pub fn owns_code(&self, owner: &OwnerId, code: &ShortCode) -> bool {
        self.users
            .get(owner)
            .is_some_and(|user| user.owns(code))
    }

    /// The owner's codes in sorted order.
    pub fn owned_codes(&self, owner: &OwnerId) -> Vec<ShortCode> {
        let mut codes: Vec<ShortCode> = self
            .users
            .get(owner)
            .map(|user| user.owned_codes.iter().cloned().collect())
            .unwrap_or_default();
        codes.sort();
        codes
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegistry")
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}
