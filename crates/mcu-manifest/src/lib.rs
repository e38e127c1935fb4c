//! MCU manifest synthesis
//!
//! Generates Moddable XS `manifest.json` files for npm packages. Starting from
//! one package, the builder resolves its `package.json`, picks the entry point,
//! merges an optional template from the `mcu_nodes` directory and recurses into
//! every dependency, writing one manifest per package into a destination tree.
//!
//! Manifests that already exist (shipped with a package, provided in the
//! templates root, or generated by an earlier run) are included as-is.

pub mod builder;
pub mod discovery;
pub mod entry_point;
pub mod errors;
pub mod manifest;
pub mod naming;
pub mod package;
pub mod synthesizer;
pub mod template;
pub mod types;

pub use builder::ManifestBuilder;
pub use errors::ManifestError;
pub use manifest::ManifestSource;
pub use naming::{RandomNames, SequenceNames, UniqueNameProvider};
pub use package::{NodeModulesResolver, PackageDescriptor, PackageResolver};
pub use template::{Section, Template, TemplateRules};
pub use types::{Manifest, ModuleEntry};
