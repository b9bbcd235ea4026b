//! Reversible mutation records.

use std::fmt;

use sdb_store::EntityStore;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::variables::Variables;

/// Which mutation a [`Command`] records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandKind {
    Set,
    Unset,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => write!(f, "SET"),
            Self::Unset => write!(f, "UNSET"),
        }
    }
}

/// One recorded mutation, carrying enough to replay it in either direction.
///
/// - `SET`: `new_value` is always present; `old_value` is present iff the
///   variable existed before.
/// - `UNSET`: `old_value` is always present; `new_value` is always `None`.
///
/// Serialized as `{"type", "name", "old_value", "new_value"}` with absent
/// values as `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl Command {
    pub fn set(
        name: impl Into<String>,
        old_value: Option<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            kind: CommandKind::Set,
            name: name.into(),
            old_value,
            new_value: Some(new_value.into()),
        }
    }

    pub fn unset(name: impl Into<String>, old_value: impl Into<String>) -> Self {
        Self {
            kind: CommandKind::Unset,
            name: name.into(),
            old_value: Some(old_value.into()),
            new_value: None,
        }
    }

    /// Apply the inverse effect: put the variable back the way it was
    /// before this command ran.
    pub fn revert<S: EntityStore + ?Sized>(&self, vars: &Variables<'_, S>) -> CoreResult<()> {
        match (self.kind, &self.old_value) {
            (CommandKind::Set, None) => {
                vars.delete(&self.name)?;
            }
            (CommandKind::Set, Some(old)) | (CommandKind::Unset, Some(old)) => {
                vars.set(&self.name, old)?;
            }
            (CommandKind::Unset, None) => return Err(self.malformed("old_value")),
        }
        Ok(())
    }

    /// Apply the forward effect again.
    pub fn apply<S: EntityStore + ?Sized>(&self, vars: &Variables<'_, S>) -> CoreResult<()> {
        match self.kind {
            CommandKind::Set => {
                let new = self
                    .new_value
                    .as_deref()
                    .ok_or_else(|| self.malformed("new_value"))?;
                vars.set(&self.name, new)?;
            }
            CommandKind::Unset => {
                vars.delete(&self.name)?;
            }
        }
        Ok(())
    }

    fn malformed(&self, field: &'static str) -> CoreError {
        CoreError::MalformedCommand {
            kind: self.kind.to_string(),
            name: self.name.clone(),
            field,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".into());
        write!(
            f,
            "{} {}: {} -> {}",
            self.kind,
            self.name,
            show(&self.old_value),
            show(&self.new_value)
        )
    }
}
