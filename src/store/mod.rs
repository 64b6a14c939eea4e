//! The in-memory user collection and its CRUD operations.

use crate::core::{Result, StoreError, User, UserPayload};
use crate::storage::JsonSnapshot;

/// Owns the user collection and the id counter, and is the only writer to
/// both. Every successful mutation is persisted before it is reported back;
/// a failed write rolls the in-memory change back so memory never diverges
/// from disk.
///
/// Ids come from a monotonic counter seeded above the highest persisted id
/// at startup and are never reused while the process lives, so a
/// delete-then-create sequence cannot hand out a colliding id.
pub struct UserStore {
    users: Vec<User>,
    next_id: u64,
    snapshot: JsonSnapshot,
}

impl UserStore {
    /// Loads the persisted collection. A missing backing store starts the
    /// collection empty; a malformed one is a fatal parse error.
    pub fn open(snapshot: JsonSnapshot) -> Result<Self> {
        let users = snapshot.load()?;
        let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        Ok(Self {
            users,
            next_id,
            snapshot,
        })
    }

    /// The full collection, insertion order preserved.
    pub fn list_all(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: u64) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)
    }

    pub fn create(&mut self, payload: UserPayload) -> Result<User> {
        let name = payload.validated_name()?;
        let mut extra = payload.extra;
        // Reserved keys would collide with the struct fields on serialization.
        extra.remove("id");
        extra.remove("name");

        let user = User {
            id: self.next_id,
            name,
            extra,
        };
        self.users.push(user.clone());
        if let Err(err) = self.snapshot.save(&self.users) {
            self.users.pop();
            return Err(err);
        }
        self.next_id += 1;
        Ok(user)
    }

    /// Replaces the name of the record with the given id. Other fields,
    /// including client-submitted extras, stay untouched.
    pub fn update(&mut self, id: u64, payload: UserPayload) -> Result<User> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        let name = payload.validated_name()?;

        let previous = std::mem::replace(&mut self.users[index].name, name);
        if let Err(err) = self.snapshot.save(&self.users) {
            self.users[index].name = previous;
            return Err(err);
        }
        Ok(self.users[index].clone())
    }

    pub fn delete(&mut self, id: u64) -> Result<()> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;

        let removed = self.users.remove(index);
        if let Err(err) = self.snapshot.save(&self.users) {
            self.users.insert(index, removed);
            return Err(err);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
