use serde::Serialize;
use std::fmt;

/// A configuration looseness detected in an ingress rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// The rule grants access without constraining ports.
    UnrestrictedPorts,

    /// The rule grants access without constraining sources.
    UnrestrictedSource,
}

/// A set of warning kinds, stored as a bitset.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct WarningSet(u8);

// === impl WarningKind ===

impl WarningKind {
    pub const ALL: [Self; 2] = [Self::UnrestrictedPorts, Self::UnrestrictedSource];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnrestrictedPorts => "unrestricted-ports",
            Self::UnrestrictedSource => "unrestricted-source",
        }
    }

    /// A human-readable explanation suitable for reports.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnrestrictedPorts => "Rule allows all ports (no port restriction)",
            Self::UnrestrictedSource => "Rule allows from all sources (no selector)",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl WarningSet ===

impl WarningSet {
    /// Adds a kind to the set, returning true if it was not already present.
    #[inline]
    pub fn insert(&mut self, kind: WarningKind) -> bool {
        let added = !self.contains(kind);
        self.0 |= kind.bit();
        added
    }

    #[inline]
    pub fn contains(&self, kind: WarningKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates over the kinds in the set in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = WarningKind> + '_ {
        WarningKind::ALL.into_iter().filter(|k| self.contains(*k))
    }

    pub fn extend(&mut self, other: WarningSet) {
        self.0 |= other.0;
    }
}

impl fmt::Debug for WarningSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for WarningSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl FromIterator<WarningKind> for WarningSet {
    fn from_iter<T: IntoIterator<Item = WarningKind>>(iter: T) -> Self {
        let mut set = Self::default();
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}
