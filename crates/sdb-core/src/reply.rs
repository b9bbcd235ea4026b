use std::fmt;

/// Marker printed for an absent value.
pub const NONE_MARKER: &str = "None";

/// Outcome of a database operation, rendered as the plain-text reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// `"<name> = <value>"`, or `"<name> = None"` when the variable is unset.
    Assigned { name: String, value: Option<String> },
    /// A bare lookup: the value itself, or `"None"`.
    Lookup(Option<String>),
    /// A count, in decimal.
    Count(usize),
    /// Undo or redo with nothing on the stack.
    NoCommands,
    /// Acknowledgement for `end`.
    Cleaned,
}

impl Reply {
    pub fn assigned(name: impl Into<String>, value: Option<String>) -> Self {
        Self::Assigned {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assigned { name, value } => {
                write!(f, "{name} = {}", value.as_deref().unwrap_or(NONE_MARKER))
            }
            Self::Lookup(value) => f.write_str(value.as_deref().unwrap_or(NONE_MARKER)),
            Self::Count(n) => write!(f, "{n}"),
            Self::NoCommands => f.write_str("NO COMMANDS"),
            Self::Cleaned => f.write_str("CLEANED"),
        }
    }
}
