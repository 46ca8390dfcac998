//! A JSON-fixture-backed [`DependencyProvider`] used by `resolver-core`'s
//! integration tests and by the `resolver-cli` demo.
//!
//! A fixture describes a small package index as plain data: for each
//! package name, the versions available and what each version depends on.
//! This lets a whole resolution scenario live in one readable JSON literal
//! instead of a bespoke Rust type per test.

use std::collections::HashMap;

use indexmap::IndexMap;
use resolver_core::{DependencyProvider, IncompatibilitiesView, RequirementsView, ResolverView};
use semver::{Version, VersionReq};
use serde::Deserialize;
use thiserror::Error;

/// One version of one package, as it appears in a fixture's `index`.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureCandidate {
    /// The version string, parsed with [`semver::Version::parse`].
    pub version: String,
    /// Dependency strings of the form `"name"` or `"name requirement"`,
    /// e.g. `"a"` or `"a >=1.0.0, <2.0.0"`.
    #[serde(default)]
    pub depends: Vec<String>,
}

/// A whole package index, deserialized from JSON.
///
/// ```json
/// {
///   "index": {
///     "a": [{ "version": "1.0.0", "depends": ["b >=1.0.0"] }],
///     "b": [{ "version": "1.0.0", "depends": [] }]
///   }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    /// Package name to the versions available for it.
    pub index: IndexMap<String, Vec<FixtureCandidate>>,
}

/// A whole resolution scenario: root requirements plus the index they are
/// resolved against, deserialized from one JSON file.
///
/// Mirrors the `requested`/`index` case-file shape used by `resolvelib`'s own
/// functional test suite, collapsed into a single file (the Python suite
/// keeps `index` in a sibling file shared by several cases; fixtures here are
/// small enough that inlining it per-case is more readable).
///
/// ```json
/// {
///   "requested": ["a"],
///   "index": { "a": [{ "version": "1.0.0", "depends": [] }] }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Case {
    /// Root requirement strings, each `"name"` or `"name requirement"`.
    pub requested: Vec<String>,
    /// The package index the requirements are resolved against.
    pub index: IndexMap<String, Vec<FixtureCandidate>>,
}

impl Case {
    /// Parses `json` and builds the root requirements and provider for it.
    pub fn from_json(json: &str) -> Result<(Vec<Requirement>, FixtureProvider), FixtureError> {
        let case: Case = serde_json::from_str(json)?;
        let requirements = case
            .requested
            .iter()
            .map(|spec| Requirement::parse(spec))
            .collect::<Result<Vec<_>, _>>()?;
        let provider = FixtureProvider::from_fixture(Fixture { index: case.index })?;
        Ok((requirements, provider))
    }
}

/// Errors building a [`FixtureProvider`] from a [`Fixture`].
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A `version` field was not valid semver.
    #[error("invalid version {version:?} for package {package:?}: {source}")]
    InvalidVersion {
        /// The package the bad version belongs to.
        package: String,
        /// The offending version string.
        version: String,
        /// The underlying parse error.
        #[source]
        source: semver::Error,
    },

    /// A `depends` entry could not be split into a package name and a
    /// version requirement.
    #[error("invalid dependency spec {spec:?} for package {package:?} {version}")]
    InvalidDependencySpec {
        /// The package declaring the dependency.
        package: String,
        /// Its version.
        version: String,
        /// The offending dependency string.
        spec: String,
    },

    /// A `depends` entry's requirement part was not a valid semver
    /// requirement.
    #[error("invalid requirement in {spec:?}: {source}")]
    InvalidRequirement {
        /// The offending dependency string.
        spec: String,
        /// The underlying parse error.
        #[source]
        source: semver::Error,
    },

    /// JSON parsing failed outright.
    #[error("invalid fixture JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A requirement on a package: a name plus a semver range. Satisfied by any
/// [`Candidate`] with a matching name whose version is in range.
#[derive(Debug, Clone)]
pub struct Requirement {
    /// The required package's name.
    pub name: String,
    /// The accepted version range.
    pub specifier: VersionReq,
}

impl Requirement {
    /// Parses a requirement of the form `name` or `name requirement`, e.g.
    /// `"a"` or `"a >=1.0.0, <2.0.0"`. Used both as a root-requirement
    /// parser (CLI arguments, test fixtures) and, via [`parse_dependency`],
    /// for a candidate's own `depends` entries.
    pub fn parse(spec: &str) -> Result<Self, FixtureError> {
        parse_dependency("<root>", "", spec)
    }
}

/// A concrete, pinnable choice: one version of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The package name.
    pub name: String,
    /// The exact version.
    pub version: Version,
}

/// A [`DependencyProvider`] over a small, fully in-memory package index,
/// loaded from a [`Fixture`].
///
/// Candidates for each package are kept sorted from highest to lowest
/// version, so a plain resolver run without any custom preference tends to
/// pick the newest mutually compatible set.
pub struct FixtureProvider {
    index: IndexMap<String, Vec<Candidate>>,
    dependencies: HashMap<(String, Version), Vec<Requirement>>,
    narrow_to_most_constrained: bool,
}

impl FixtureProvider {
    /// Parses `json` as a [`Fixture`] and builds a provider from it.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let fixture: Fixture = serde_json::from_str(json)?;
        Self::from_fixture(fixture)
    }

    /// Builds a provider from an already-parsed [`Fixture`].
    pub fn from_fixture(fixture: Fixture) -> Result<Self, FixtureError> {
        let mut index: IndexMap<String, Vec<Candidate>> = IndexMap::new();
        let mut dependencies = HashMap::new();

        for (name, versions) in fixture.index {
            let mut candidates = Vec::with_capacity(versions.len());
            for entry in versions {
                let version =
                    Version::parse(&entry.version).map_err(|source| FixtureError::InvalidVersion {
                        package: name.clone(),
                        version: entry.version.clone(),
                        source,
                    })?;

                let mut requirements = Vec::with_capacity(entry.depends.len());
                for spec in &entry.depends {
                    requirements.push(parse_dependency(&name, &entry.version, spec)?);
                }

                dependencies.insert((name.clone(), version.clone()), requirements);
                candidates.push(Candidate {
                    name: name.clone(),
                    version,
                });
            }
            candidates.sort_by(|a, b| b.version.cmp(&a.version));
            index.insert(name, candidates);
        }

        Ok(Self {
            index,
            dependencies,
            narrow_to_most_constrained: false,
        })
    }

    /// Opts into only ever offering the engine identifiers that currently
    /// have the fewest remaining candidates (falling back to every
    /// unsatisfied identifier when none have been narrowed down yet). Mirrors
    /// a provider that overrides `narrow_requirement_selection` to bias the
    /// search toward the most-constrained package first.
    pub fn narrow_to_most_constrained(mut self) -> Self {
        self.narrow_to_most_constrained = true;
        self
    }
}

fn parse_dependency(package: &str, version: &str, spec: &str) -> Result<Requirement, FixtureError> {
    let spec = spec.trim();
    let split_at = spec
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(spec.len());
    let (name, rest) = spec.split_at(split_at);

    if name.is_empty() {
        return Err(FixtureError::InvalidDependencySpec {
            package: package.to_string(),
            version: version.to_string(),
            spec: spec.to_string(),
        });
    }

    let rest = rest.trim();
    let specifier = if rest.is_empty() {
        VersionReq::STAR
    } else {
        VersionReq::parse(rest).map_err(|source| FixtureError::InvalidRequirement {
            spec: spec.to_string(),
            source,
        })?
    };

    Ok(Requirement {
        name: name.to_string(),
        specifier,
    })
}

impl DependencyProvider for FixtureProvider {
    type Identifier = String;
    type Requirement = Requirement;
    type Candidate = Candidate;
    type PreferenceKey = (usize, String);

    fn identify_requirement(&self, requirement: &Self::Requirement) -> Self::Identifier {
        requirement.name.clone()
    }

    fn identify_candidate(&self, candidate: &Self::Candidate) -> Self::Identifier {
        candidate.name.clone()
    }

    fn is_satisfied_by(&self, requirement: &Self::Requirement, candidate: &Self::Candidate) -> bool {
        candidate.name == requirement.name && requirement.specifier.matches(&candidate.version)
    }

    fn get_dependencies(&self, candidate: &Self::Candidate) -> Vec<Self::Requirement> {
        self.dependencies
            .get(&(candidate.name.clone(), candidate.version.clone()))
            .cloned()
            .unwrap_or_default()
    }

    fn find_matches(
        &self,
        identifier: &Self::Identifier,
        requirements: &RequirementsView<'_, Self>,
        incompatibilities: &IncompatibilitiesView<'_, Self>,
    ) -> Vec<Self::Candidate> {
        let active: Vec<&Self::Requirement> = requirements.requirements_for(identifier).collect();
        let excluded = incompatibilities.for_identifier(identifier);

        self.index
            .get(identifier)
            .into_iter()
            .flatten()
            .filter(|candidate| !excluded.contains(candidate))
            .filter(|candidate| {
                active
                    .iter()
                    .all(|requirement| self.is_satisfied_by(requirement, candidate))
            })
            .cloned()
            .collect()
    }

    fn get_preference(
        &self,
        identifier: &Self::Identifier,
        view: &ResolverView<'_, Self>,
    ) -> Self::PreferenceKey {
        (view.candidate_count(identifier), identifier.clone())
    }

    fn narrow_requirement_selection(
        &self,
        identifiers: &[Self::Identifier],
        view: &ResolverView<'_, Self>,
    ) -> Vec<Self::Identifier> {
        if !self.narrow_to_most_constrained {
            return identifiers.to_vec();
        }

        let Some(minimum) = identifiers
            .iter()
            .map(|identifier| view.candidate_count(identifier))
            .min()
        else {
            return Vec::new();
        };

        identifiers
            .iter()
            .filter(|identifier| view.candidate_count(identifier) == minimum)
            .cloned()
            .collect()
    }
}
