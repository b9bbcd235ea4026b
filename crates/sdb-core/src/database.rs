//! The database facade: variables and both command stacks as one
//! consistency domain.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use sdb_store::EntityStore;
use tracing::debug;

use crate::command::Command;
use crate::error::{CoreError, CoreResult};
use crate::log::{CommandLog, Stack};
use crate::reply::Reply;
use crate::variables::Variables;

/// Variable store with linear undo/redo over an [`EntityStore`].
///
/// Mutations (`set`, `unset`, `undo`, `redo`, `end`) hold the write side of
/// the domain lock for their whole read-old-value → apply → push → clear-redo
/// sequence, so no other operation sees the variables and stacks out of step.
/// Reads (`get`, `num_equal_to`, `history`) share the read side.
///
/// The lock covers callers going through this value only. Two `Database`s
/// over the same backend are not serialised against each other.
pub struct Database<S> {
    store: S,
    domain: RwLock<()>,
}

impl<S: EntityStore> Database<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            domain: RwLock::new(()),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn variables(&self) -> Variables<'_, S> {
        Variables::new(&self.store)
    }

    fn log(&self) -> CommandLog<'_, S> {
        CommandLog::new(&self.store)
    }

    fn exclusive(&self) -> CoreResult<RwLockWriteGuard<'_, ()>> {
        self.domain.write().map_err(|_| CoreError::LockPoisoned)
    }

    fn shared(&self) -> CoreResult<RwLockReadGuard<'_, ()>> {
        self.domain.read().map_err(|_| CoreError::LockPoisoned)
    }

    // ---- Mutations ----

    /// Assign `value` to `name` and record the change.
    pub fn set(&self, name: &str, value: &str) -> CoreResult<Reply> {
        let _domain = self.exclusive()?;
        let old = self.variables().set(name, value)?;
        debug!(name, value, old = ?old, "set");
        self.log().record(Command::set(name, old, value))?;
        Ok(Reply::assigned(name, Some(value.to_owned())))
    }

    /// Remove `name`. Unsetting an absent variable records nothing but
    /// replies exactly like a real unset.
    pub fn unset(&self, name: &str) -> CoreResult<Reply> {
        let _domain = self.exclusive()?;
        match self.variables().delete(name)? {
            Some(old) => {
                debug!(name, old = %old, "unset");
                self.log().record(Command::unset(name, old))?;
            }
            None => debug!(name, "unset of absent variable, nothing recorded"),
        }
        Ok(Reply::assigned(name, None))
    }

    /// Revert the most recent recorded command.
    pub fn undo(&self) -> CoreResult<Reply> {
        self.step(Stack::Undo)
    }

    /// Reapply the most recently undone command.
    pub fn redo(&self) -> CoreResult<Reply> {
        self.step(Stack::Redo)
    }

    /// Pop from `from`, replay onto the variables (inverse for undo, forward
    /// for redo) and push the unchanged command onto the other stack.
    fn step(&self, from: Stack) -> CoreResult<Reply> {
        let _domain = self.exclusive()?;
        let log = self.log();
        let Some(command) = log.pop(from)? else {
            debug!(stack = from.name(), "no commands");
            return Ok(Reply::NoCommands);
        };

        let vars = self.variables();
        match from {
            Stack::Undo => command.revert(&vars)?,
            Stack::Redo => command.apply(&vars)?,
        }
        let current = vars.get(&command.name)?;
        debug!(stack = from.name(), name = %command.name, current = ?current, "replayed");

        let name = command.name.clone();
        log.push(from.other(), command)?;
        Ok(Reply::assigned(name, current))
    }

    /// Delete every variable and both stacks in one batch.
    pub fn end(&self) -> CoreResult<Reply> {
        let _domain = self.exclusive()?;
        let mut keys = self.variables().keys()?;
        let swept = keys.len();
        keys.extend(CommandLog::<S>::keys());
        self.store.delete_batch(&keys)?;
        debug!(variables = swept, "database reset");
        Ok(Reply::Cleaned)
    }

    // ---- Reads ----

    pub fn get(&self, name: &str) -> CoreResult<Reply> {
        let _domain = self.shared()?;
        Ok(Reply::Lookup(self.variables().get(name)?))
    }

    /// How many variables currently hold exactly `value`.
    pub fn num_equal_to(&self, value: &str) -> CoreResult<Reply> {
        let _domain = self.shared()?;
        Ok(Reply::Count(self.variables().count_equal(value)?))
    }

    /// The undo stack, oldest first.
    pub fn history(&self) -> CoreResult<Vec<Command>> {
        let _domain = self.shared()?;
        self.log().history()
    }
}

impl<S> std::fmt::Debug for Database<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
