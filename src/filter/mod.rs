use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::model::{ObjectName, SchemaObject};

/// Anything the filter can ask for a hierarchical name.
pub trait NamedObject {
    /// `None` when the object has no name at all.
    fn object_name(&self) -> Option<&ObjectName>;
}

impl NamedObject for SchemaObject {
    fn object_name(&self) -> Option<&ObjectName> {
        self.name.as_ref()
    }
}

impl NamedObject for ObjectName {
    fn object_name(&self) -> Option<&ObjectName> {
        Some(self)
    }
}

/// A per-object keep/drop decision that can be applied lazily to a sequence.
pub trait ObjectFilter<T: ?Sized> {
    fn keep(&self, object: &T) -> bool;

    /// Yields the kept objects in input order. The yielded references borrow
    /// the input, not the filter.
    fn filter<'s, 'a, I>(&'s self, objects: I) -> impl Iterator<Item = &'a T> + 's
    where
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: 's,
        T: 'a,
        'a: 's,
    {
        objects.into_iter().filter(move |object| self.keep(object))
    }

    /// Owned counterpart of [`ObjectFilter::filter`].
    fn filter_owned<'a, I>(&'a self, objects: I) -> impl Iterator<Item = T> + 'a
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
        T: Sized + 'a,
    {
        objects.into_iter().filter(move |object| self.keep(object))
    }
}

impl<T: ?Sized, F> ObjectFilter<T> for F
where
    F: Fn(&T) -> bool,
{
    fn keep(&self, object: &T) -> bool {
        self(object)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterPolicy {
    /// Drop objects whose schema is in the set.
    #[default]
    Exclude,
    /// Keep only objects whose schema is in the set.
    Include,
}

impl FromStr for FilterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclude" => Ok(FilterPolicy::Exclude),
            "include" => Ok(FilterPolicy::Include),
            _ => Err(format!(
                "Invalid filter policy '{}'. Valid policies: exclude, include",
                s
            )),
        }
    }
}

impl fmt::Display for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterPolicy::Exclude => "exclude",
            FilterPolicy::Include => "include",
        };
        write!(f, "{}", s)
    }
}

/// Filters objects by membership of their schema in a fixed set.
///
/// The schema is the first local name part; the remaining parts and any
/// external parts are not consulted. Comparison is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct SchemaFilter {
    schemas: HashSet<String>,
    policy: FilterPolicy,
}

impl SchemaFilter {
    pub fn new<I, S>(schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SchemaFilter {
            schemas: schemas
                .into_iter()
                .map(|schema| normalize(schema.as_ref()))
                .collect(),
            policy: FilterPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FilterPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FilterPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: FilterPolicy) {
        self.policy = policy;
    }

    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(String::as_str)
    }

    /// Whether the object's schema is in the set. Objects without a name, or
    /// with an empty name, are never members.
    pub fn contains<T: NamedObject + ?Sized>(&self, object: &T) -> bool {
        object
            .object_name()
            .and_then(ObjectName::schema)
            .is_some_and(|schema| self.schemas.contains(&normalize(schema)))
    }
}

impl<T: NamedObject + ?Sized> ObjectFilter<T> for SchemaFilter {
    fn keep(&self, object: &T) -> bool {
        let found = self.contains(object);
        match self.policy {
            FilterPolicy::Exclude => !found,
            FilterPolicy::Include => found,
        }
    }
}

fn normalize(schema: &str) -> String {
    schema.to_lowercase()
}
