//! The undo and redo stacks.
//!
//! Both stacks live in the entity store as `CommandStack` entities named
//! `undo` and `redo`, each holding a JSON array of commands, oldest first.
//! A missing entity is an empty stack. The variable store never reads them.

use sdb_store::{Entity, EntityKey, EntityStore};
use serde_json::Value;
use tracing::debug;

use crate::command::Command;
use crate::error::{CoreError, CoreResult};

pub const STACK_KIND: &str = "CommandStack";
pub const COMMANDS_PROPERTY: &str = "commands";

/// One of the two command stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stack {
    Undo,
    Redo,
}

impl Stack {
    pub fn name(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    pub fn key(self) -> EntityKey {
        EntityKey::new(STACK_KIND, self.name())
    }

    /// The stack a command moves to when popped from this one.
    pub fn other(self) -> Self {
        match self {
            Self::Undo => Self::Redo,
            Self::Redo => Self::Undo,
        }
    }
}

/// LIFO command stacks stored in an [`EntityStore`].
///
/// Every method is a single read-modify-write against the store. Callers
/// that combine several of them must hold the database's domain lock.
pub struct CommandLog<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> CommandLog<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Keys of both stack entities.
    pub fn keys() -> [EntityKey; 2] {
        [Stack::Undo.key(), Stack::Redo.key()]
    }

    /// Contents of `stack`, bottom first.
    pub fn load(&self, stack: Stack) -> CoreResult<Vec<Command>> {
        let Some(entity) = self.store.get(&stack.key())? else {
            return Ok(Vec::new());
        };
        match entity.property(COMMANDS_PROPERTY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(commands) => {
                serde_json::from_value(commands.clone()).map_err(|e| CoreError::CorruptStack {
                    stack: stack.name().into(),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn save(&self, stack: Stack, commands: &[Command]) -> CoreResult<()> {
        let commands = serde_json::to_value(commands).map_err(|e| CoreError::CorruptStack {
            stack: stack.name().into(),
            reason: e.to_string(),
        })?;
        let entity = Entity::new(stack.key()).with_property(COMMANDS_PROPERTY, commands);
        Ok(self.store.put(&entity)?)
    }

    /// Push `command` on top of `stack`.
    pub fn push(&self, stack: Stack, command: Command) -> CoreResult<()> {
        let mut commands = self.load(stack)?;
        commands.push(command);
        self.save(stack, &commands)
    }

    /// Pop the top of `stack`, or `None` if it is empty.
    pub fn pop(&self, stack: Stack) -> CoreResult<Option<Command>> {
        let mut commands = self.load(stack)?;
        let Some(top) = commands.pop() else {
            return Ok(None);
        };
        self.save(stack, &commands)?;
        Ok(Some(top))
    }

    /// Drop every command on `stack`.
    pub fn clear(&self, stack: Stack) -> CoreResult<()> {
        self.store.delete(&stack.key())?;
        Ok(())
    }

    /// Record a fresh mutation: push it onto the undo stack and invalidate
    /// the redo stack.
    ///
    /// The redo stack is cleared every time, whether or not it held anything.
    pub fn record(&self, command: Command) -> CoreResult<()> {
        debug!(kind = %command.kind, name = %command.name, "recording command");
        self.push(Stack::Undo, command)?;
        self.clear(Stack::Redo)
    }

    /// Commands that can be undone, oldest first.
    pub fn history(&self) -> CoreResult<Vec<Command>> {
        self.load(Stack::Undo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdb_store::InMemoryEntityStore;
    use serde_json::json;

    #[test]
    fn missing_stack_is_empty() {
        let store = InMemoryEntityStore::new();
        let log = CommandLog::new(&store);
        assert!(log.load(Stack::Undo).unwrap().is_empty());
        assert_eq!(log.pop(Stack::Redo).unwrap(), None);
    }

    #[test]
    fn push_and_pop_are_lifo() {
        let store = InMemoryEntityStore::new();
        let log = CommandLog::new(&store);
        log.push(Stack::Undo, Command::set("a", None, "1")).unwrap();
        log.push(Stack::Undo, Command::set("b", None, "2")).unwrap();

        assert_eq!(log.pop(Stack::Undo).unwrap().unwrap().name, "b");
        assert_eq!(log.pop(Stack::Undo).unwrap().unwrap().name, "a");
        assert_eq!(log.pop(Stack::Undo).unwrap(), None);
    }

    #[test]
    fn record_clears_redo() {
        let store = InMemoryEntityStore::new();
        let log = CommandLog::new(&store);
        log.push(Stack::Redo, Command::set("a", None, "1")).unwrap();

        log.record(Command::set("b", None, "2")).unwrap();

        assert!(log.load(Stack::Redo).unwrap().is_empty());
        assert_eq!(log.history().unwrap(), vec![Command::set("b", None, "2")]);
    }

    #[test]
    fn record_on_empty_redo_is_fine() {
        let store = InMemoryEntityStore::new();
        let log = CommandLog::new(&store);
        log.record(Command::set("a", None, "1")).unwrap();
        log.record(Command::unset("a", "1")).unwrap();
        assert_eq!(log.history().unwrap().len(), 2);
    }

    #[test]
    fn history_is_oldest_first() {
        let store = InMemoryEntityStore::new();
        let log = CommandLog::new(&store);
        log.record(Command::set("a", None, "1")).unwrap();
        log.record(Command::set("a", Some("1".into()), "2")).unwrap();

        let history = log.history().unwrap();
        assert_eq!(history[0].new_value.as_deref(), Some("1"));
        assert_eq!(history[1].new_value.as_deref(), Some("2"));
    }

    #[test]
    fn stacks_are_stored_as_entities() {
        let store = InMemoryEntityStore::new();
        let log = CommandLog::new(&store);
        log.record(Command::set("a", None, "1")).unwrap();

        let entity = store.get(&Stack::Undo.key()).unwrap().unwrap();
        assert_eq!(
            entity.property(COMMANDS_PROPERTY),
            Some(&json!([{"type": "SET", "name": "a", "old_value": null, "new_value": "1"}]))
        );
        assert!(store.get(&Stack::Redo.key()).unwrap().is_none());
    }

    #[test]
    fn corrupt_stack_is_reported() {
        let store = InMemoryEntityStore::new();
        store
            .put(&Entity::new(Stack::Undo.key()).with_property(COMMANDS_PROPERTY, "oops"))
            .unwrap();

        let err = CommandLog::new(&store).load(Stack::Undo).unwrap_err();
        assert!(matches!(err, CoreError::CorruptStack { stack, .. } if stack == "undo"));
    }

    #[test]
    fn other_stack() {
        assert_eq!(Stack::Undo.other(), Stack::Redo);
        assert_eq!(Stack::Redo.other(), Stack::Undo);
        assert_eq!(Stack::Redo.key(), EntityKey::new("CommandStack", "redo"));
    }
}
