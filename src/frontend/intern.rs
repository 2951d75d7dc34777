use std::sync::RwLock;

use hashbrown::HashMap;
use once_cell::sync::Lazy;

/// Process wide table of identifier strings. Strings are leaked on insertion
/// so a [`Name`] can hand out `&'static str` without holding a lock.
#[derive(Debug, Default)]
struct InterningTable {
    strings: Vec<&'static str>,
    indices: HashMap<&'static str, u32>,
}

static INTERNING_TABLE: Lazy<RwLock<InterningTable>> = Lazy::new(Default::default);

impl InterningTable {
    fn intern(&mut self, string: &str) -> u32 {
        if let Some(index) = self.indices.get(string) {
            return *index;
        }

        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = self.strings.len() as u32;

        self.strings.push(leaked);
        self.indices.insert(leaked, index);
        index
    }
}

/// An interned identifier. Two names compare equal exactly when their text
/// does.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u32);

impl Name {
    pub fn new(value: &str) -> Self {
        if let Some(index) = INTERNING_TABLE
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .indices
            .get(value)
        {
            return Self(*index);
        }

        let index = INTERNING_TABLE
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .intern(value);

        Self(index)
    }

    pub fn as_str(self) -> &'static str {
        let table = INTERNING_TABLE
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Indices are only ever created by `intern`, which never removes entries
        table.strings[self.0 as usize]
    }
}

impl core::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

impl core::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
