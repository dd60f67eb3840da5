//! Type definitions for the extension catalogue and run state

mod context;
mod descriptor;
mod extension_id;
mod manifest;
mod target;

pub use context::{BuildEnvironment, BuildResult, PublishContext, TargetBuild};
pub use descriptor::{BuildStrategy, ExtensionDescriptor};
pub use extension_id::{ExtensionId, BUILTIN_NAMESPACE};
pub use manifest::{Manifest, PackageManifest, XmlManifest};
pub use target::{is_known_target, TargetConfig, TargetSpec, KNOWN_TARGETS, UNIVERSAL_TARGET};
