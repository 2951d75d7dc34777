use strum::{Display, EnumIter, IntoEnumIterator};

use crate::frontend::intern::Name;

/// Functions provided by the runtime. The set is fixed at compile time and is
/// seeded into the root scope of every file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BuiltIn {
    Print,
}

impl BuiltIn {
    pub fn all() -> impl Iterator<Item = BuiltIn> {
        Self::iter()
    }

    pub fn name(self) -> Name {
        Name::new(&self.to_string())
    }

    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            BuiltIn::Print => &["value"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_takes_one_value() {
        assert_eq!(BuiltIn::Print.name().as_str(), "print");
        assert_eq!(BuiltIn::Print.parameters(), &["value"]);
        assert_eq!(BuiltIn::all().collect::<Vec<_>>(), vec![BuiltIn::Print]);
    }
}
