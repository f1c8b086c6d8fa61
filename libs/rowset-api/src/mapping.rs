use crate::error::RowError;
use crate::row::ResultRow;
use crate::value::Value;

/// Setter for one member of a named-field shape.
///
/// Coerces the column value to the member's type and stores it.
pub type AssignFn<T> = fn(&mut T, Value) -> Result<(), RowError>;

/// A settable member of a named-field shape, addressed by column name.
pub struct Member<T> {
    /// Column name this member binds to. Matched exactly, case-sensitive.
    pub name: String,
    pub assign: AssignFn<T>,
}

impl<T> Member<T> {
    pub fn new(name: impl Into<String>, assign: AssignFn<T>) -> Self {
        Self { name: name.into(), assign }
    }
}

impl<T> std::fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member").field("name", &self.name).finish()
    }
}

/// Target shape descriptor: what a row is materialized into.
///
/// - `Opaque`: positional, takes the whole row. No name matching.
/// - `Named`: a registration-time member table. Each column is bound to the
///   member of the same name; columns without a member are skipped.
pub enum Shape<T> {
    Opaque(fn(ResultRow) -> Result<T, RowError>),
    Named {
        init: fn() -> T,
        members: Vec<Member<T>>,
    },
}

impl<T> Shape<T> {
    pub fn opaque(convert: fn(ResultRow) -> Result<T, RowError>) -> Self {
        Shape::Opaque(convert)
    }

    /// Named-field shape starting from `T::default()`.
    pub fn named(members: Vec<Member<T>>) -> Self
    where
        T: Default,
    {
        Shape::Named { init: T::default, members }
    }

    pub fn member(&self, name: &str) -> Option<&Member<T>> {
        match self {
            Shape::Opaque(_) => None,
            Shape::Named { members, .. } => members.iter().find(|m| m.name == name),
        }
    }
}

impl<T> std::fmt::Debug for Shape<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Opaque(_) => f.write_str("Shape::Opaque"),
            Shape::Named { members, .. } => f.debug_tuple("Shape::Named").field(members).finish(),
        }
    }
}
