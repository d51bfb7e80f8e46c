/// Whether a run scope currently owns mutation rights over the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// No run in progress; external mutators are applied.
    #[default]
    Idle,
    /// A run scope is held; external mutators are refused.
    Active,
}

impl RunState {
    /// Returns true while a run scope is held.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Result of an externally initiated mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[must_use]
pub enum WriteOutcome {
    /// The mutation took effect.
    Applied,
    /// A run scope was held; state is unchanged.
    Refused,
}

impl WriteOutcome {
    /// Returns true when the mutation took effect.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}
