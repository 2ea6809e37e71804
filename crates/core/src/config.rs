//! Compilation options.
//!
//! These are the knobs the CLI exposes as flags and as keys of the optional
//! TOML config file. Field names deserialize in kebab-case.

use serde::Deserialize;

use crate::error::Error;

/// Identifier case convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CaseConvention {
    /// Leading lowercase: `userProfile`
    #[serde(rename = "camelCase")]
    CamelCase,
    /// Leading capital: `UserProfile`
    #[default]
    #[serde(rename = "PascalCase")]
    PascalCase,
}

impl std::str::FromStr for CaseConvention {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camelCase" => Ok(Self::CamelCase),
            "PascalCase" => Ok(Self::PascalCase),
            other => Err(Error::InvalidCliArgument(format!(
                "unknown naming case '{other}' (expected camelCase or PascalCase)"
            ))),
        }
    }
}

/// Naming policy for one kind of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ArtifactNaming {
    /// Case applied to the folded stem.
    pub case: CaseConvention,
    /// Prefix declarations with `export`.
    pub export: bool,
}

/// How `allOf` branches that define the same key are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntersectionPolicy {
    /// Object branches are merged; on a key conflict the later branch wins.
    #[default]
    LaterWins,
    /// Branches are intersected; a payload must satisfy every branch.
    AllMustHold,
}

/// Options for one compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompileOptions {
    /// Validator declarations (`TestSchema`).
    pub schema: ArtifactNaming,
    /// Derived type aliases (`type Test = z.infer<...>`); only emitted when exported.
    #[serde(rename = "type")]
    pub type_alias: ArtifactNaming,
    /// How `allOf` key conflicts resolve.
    pub intersection: IntersectionPolicy,
    /// Append numeric suffixes to names that fold together instead of failing.
    pub disambiguate: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            schema: ArtifactNaming::default(),
            type_alias: ArtifactNaming::default(),
            intersection: IntersectionPolicy::default(),
            disambiguate: true,
        }
    }
}
