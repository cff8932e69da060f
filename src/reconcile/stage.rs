// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

/// Stages of one reconciliation cycle, in execution order.
///
/// `Done` and `Failed` are terminal; `Failed` is entered from whichever stage
/// returned an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Gathering,
    ComposeCore,
    RenderCore,
    ApplyCore,
    ComposeOptional,
    Cleanup,
    RenderOptional,
    ApplyOptional,
    ComposeAdmission,
    RenderAdmission,
    ApplyAdmission,
    Done,
    Failed,
}

impl Stage {
    /// The stage that follows a successful `self`
    pub fn next(self) -> Stage {
        match self {
            Stage::Gathering => Stage::ComposeCore,
            Stage::ComposeCore => Stage::RenderCore,
            Stage::RenderCore => Stage::ApplyCore,
            Stage::ApplyCore => Stage::ComposeOptional,
            Stage::ComposeOptional => Stage::Cleanup,
            Stage::Cleanup => Stage::RenderOptional,
            Stage::RenderOptional => Stage::ApplyOptional,
            Stage::ApplyOptional => Stage::ComposeAdmission,
            Stage::ComposeAdmission => Stage::RenderAdmission,
            Stage::RenderAdmission => Stage::ApplyAdmission,
            Stage::ApplyAdmission => Stage::Done,
            Stage::Done => Stage::Done,
            Stage::Failed => Stage::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Every working stage from `Gathering` to `ApplyAdmission`
    #[cfg(test)]
    pub fn sequence() -> Vec<Stage> {
        let mut stages = Vec::new();
        let mut stage = Stage::Gathering;
        while !stage.is_terminal() {
            stages.push(stage);
            stage = stage.next();
        }
        stages
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Gathering => "Gathering",
            Stage::ComposeCore => "ComposeCore",
            Stage::RenderCore => "RenderCore",
            Stage::ApplyCore => "ApplyCore",
            Stage::ComposeOptional => "ComposeOptional",
            Stage::Cleanup => "Cleanup",
            Stage::RenderOptional => "RenderOptional",
            Stage::ApplyOptional => "ApplyOptional",
            Stage::ComposeAdmission => "ComposeAdmission",
            Stage::RenderAdmission => "RenderAdmission",
            Stage::ApplyAdmission => "ApplyAdmission",
            Stage::Done => "Done",
            Stage::Failed => "Failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_order() {
        assert_eq!(
            Stage::sequence(),
            vec![
                Stage::Gathering,
                Stage::ComposeCore,
                Stage::RenderCore,
                Stage::ApplyCore,
                Stage::ComposeOptional,
                Stage::Cleanup,
                Stage::RenderOptional,
                Stage::ApplyOptional,
                Stage::ComposeAdmission,
                Stage::RenderAdmission,
                Stage::ApplyAdmission,
            ]
        );
    }

    #[test]
    fn test_terminal_stages_absorb() {
        assert_eq!(Stage::Done.next(), Stage::Done);
        assert_eq!(Stage::Failed.next(), Stage::Failed);
        assert!(!Stage::Cleanup.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::RenderOptional.to_string(), "RenderOptional");
    }
}
