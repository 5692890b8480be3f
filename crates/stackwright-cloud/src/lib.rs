//! stackwright cloud model
//!
//! Typed resource descriptors, deferred outputs and the seam to the
//! external provisioning engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  wright CLI                      │
//! │           (preview / render / graph)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               stackwright-cloud                  │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  ResourceDescriptor + Output<T> refs     │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ResourceGraph │  │   Manifest   │            │
//! │  └──────────────┘  └──────┬───────┘            │
//! └───────────────────────────┼─────────────────────┘
//!                             │
//!                 ┌───────────▼───────────┐
//!                 │ trait ProvisioningEngine│
//!                 │  (external engine)     │
//!                 └───────────────────────┘
//! ```

pub mod action;
pub mod engine;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod output;
pub mod resource;
pub mod store;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use engine::{AuthStatus, ManifestEngine, ProvisioningEngine};
pub use error::{CloudError, Result};
pub use graph::ResourceGraph;
pub use manifest::{DeploymentManifest, ManifestFormat, ManifestOutput, ManifestResource};
pub use output::{Output, OutputKey, OutputRef, ResolvedOutputs};
pub use resource::{Attr, ResourceDescriptor, ResourceId, ResourceKind, SecretPolicy};
pub use store::{ManifestStore, StoreLock};
