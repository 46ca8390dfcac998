//! A generic, provider-agnostic backtracking dependency resolution engine.
//!
//! This crate implements the *core* of a dependency resolver: given a set of
//! root requirements and a [`DependencyProvider`] that knows how to identify,
//! enumerate and compare candidates for one package universe, [`Resolver`]
//! produces a consistent pinning of one candidate per identifier, or proves
//! that no such pinning exists.
//!
//! The engine itself never touches the network or the filesystem, never
//! parses version strings, and never knows anything about markers, extras or
//! wheel metadata. All of that belongs in the [`DependencyProvider`]
//! implementation; this crate only implements the backtracking search that
//! sits on top of it.
//!
//! See [`Resolver::resolve`] for the entry point.

#![deny(missing_docs)]

mod criterion;
mod error;
mod graph;
mod provider;
mod reporter;
mod resolution;
mod resolver;
mod state;
mod views;

pub use criterion::{Criterion, RequirementInformation};
pub use error::ResolutionError;
pub use graph::{Node, ResolutionGraph};
pub use provider::DependencyProvider;
pub use reporter::{NoopReporter, Reporter};
pub use resolver::{Resolver, ResolverOptions, ResolverResult};
pub use state::State;
pub use views::{IncompatibilitiesView, RequirementsView, ResolverView};
