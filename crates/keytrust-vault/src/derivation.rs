use crate::error::DerivationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Set on the serialized child index of a hardened axis.
pub const HARDENED_BIT: u32 = 0x8000_0000;

/// Largest index an axis may carry (2^31 - 1).
pub const MAX_AXIS_INDEX: u32 = HARDENED_BIT - 1;

// ---------------------------------------------------------------------------
// DerivationAxis
// ---------------------------------------------------------------------------

/// One step of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivationAxis {
    index: u32,
    hardened: bool,
}

impl DerivationAxis {
    pub fn normal(index: u32) -> Result<Self, DerivationError> {
        Self::new(index, false)
    }

    pub fn hardened(index: u32) -> Result<Self, DerivationError> {
        Self::new(index, true)
    }

    pub fn new(index: u32, hardened: bool) -> Result<Self, DerivationError> {
        if index > MAX_AXIS_INDEX {
            return Err(DerivationError::IndexOutOfRange(index as u64));
        }
        Ok(Self { index, hardened })
    }

    /// Index without the hardened bit.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_hardened(&self) -> bool {
        self.hardened
    }

    /// Index as it enters the child-key HMAC.
    pub fn child_number(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED_BIT
        } else {
            self.index
        }
    }
}

impl fmt::Display for DerivationAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

impl FromStr for DerivationAxis {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, hardened) = match s.strip_suffix('\'') {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        // u64::from_str accepts a leading '+'; only plain digits are allowed.
        // Leading zeros would not survive a display round-trip.
        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return Err(DerivationError::InvalidPathSyntax(format!(
                "bad axis '{}'",
                s
            )));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| DerivationError::IndexOutOfRange(u64::MAX))?;
        if value > MAX_AXIS_INDEX as u64 {
            return Err(DerivationError::IndexOutOfRange(value));
        }
        Self::new(value as u32, hardened)
    }
}

// ---------------------------------------------------------------------------
// DerivationPath: "m/a1/a2'/a3"
// ---------------------------------------------------------------------------

/// Root-relative sequence of axes. The empty path is the root, written `m`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivationPath {
    axes: Vec<DerivationAxis>,
}

impl DerivationPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_axes(axes: Vec<DerivationAxis>) -> Self {
        Self { axes }
    }

    pub fn parse(s: &str) -> Result<Self, DerivationError> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(DerivationError::InvalidPathSyntax(format!(
                "path must start with 'm': '{}'",
                s
            )));
        }
        let axes = parts
            .map(DerivationAxis::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { axes })
    }

    pub fn axes(&self) -> &[DerivationAxis] {
        &self.axes
    }

    pub fn depth(&self) -> usize {
        self.axes.len()
    }

    pub fn is_root(&self) -> bool {
        self.axes.is_empty()
    }

    /// This path extended by one axis.
    pub fn child(&self, axis: DerivationAxis) -> Self {
        let mut axes = self.axes.clone();
        axes.push(axis);
        Self { axes }
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for axis in &self.axes {
            write!(f, "/{}", axis)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DerivationPath {
    type Error = DerivationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<DerivationPath> for String {
    fn from(p: DerivationPath) -> Self {
        p.to_string()
    }
}
