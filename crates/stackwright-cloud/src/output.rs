//! Deferred resource outputs
//!
//! Attributes such as a load balancer's DNS name only exist once the
//! provisioning engine has created the resource. An [`Output`] is a handle
//! to such a value: either already known at declaration time, or pending on
//! `<resource>.<attribute>` until the engine resolves it.

use crate::error::{CloudError, Result};
use crate::resource::{ResourceId, ResourceKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Address of an output attribute on a declared resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRef {
    pub resource: ResourceId,
    pub attribute: String,
}

impl OutputRef {
    pub fn new(resource: ResourceId, attribute: impl Into<String>) -> Self {
        Self {
            resource,
            attribute: attribute.into(),
        }
    }

    /// `<urn>.<attribute>`, the form written into manifests
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource.urn(), self.attribute)
    }
}

/// `<name>.<attribute>`
impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource.name, self.attribute)
    }
}

#[derive(Clone, PartialEq)]
enum State<T> {
    Known(T),
    Pending(OutputRef),
}

/// A value that may only become available after provisioning
#[derive(Clone, PartialEq)]
pub struct Output<T> {
    state: State<T>,
    secret: bool,
}

impl<T> Output<T> {
    /// A value known at declaration time
    pub fn known(value: T) -> Self {
        Self {
            state: State::Known(value),
            secret: false,
        }
    }

    /// A value produced by `resource` once it exists
    pub fn pending(resource: ResourceId, attribute: impl Into<String>) -> Self {
        Self {
            state: State::Pending(OutputRef::new(resource, attribute)),
            secret: false,
        }
    }

    /// Mark this output secret
    pub fn into_secret(mut self) -> Self {
        self.secret = true;
        self
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    pub fn is_known(&self) -> bool {
        matches!(self.state, State::Known(_))
    }

    /// The value, if it is known without provisioning
    pub fn value(&self) -> Option<&T> {
        match &self.state {
            State::Known(value) => Some(value),
            State::Pending(_) => None,
        }
    }

    /// The upstream attribute this output waits on
    pub fn reference(&self) -> Option<&OutputRef> {
        match &self.state {
            State::Known(_) => None,
            State::Pending(reference) => Some(reference),
        }
    }

    /// Resource this output depends on, if any
    pub fn depends_on(&self) -> Option<&ResourceId> {
        self.reference().map(|r| &r.resource)
    }
}

impl<T: Clone + DeserializeOwned> Output<T> {
    /// Resolve against the values reported by the engine
    pub fn resolve(&self, resolved: &ResolvedOutputs) -> Result<T> {
        match &self.state {
            State::Known(value) => Ok(value.clone()),
            State::Pending(reference) => resolved.get(reference),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.state, self.secret) {
            (State::Known(_), true) => write!(f, "Output(known, {})", stackwright_config::REDACTED),
            (State::Known(value), false) => write!(f, "Output(known, {:?})", value),
            (State::Pending(reference), _) => write!(f, "Output(pending, {})", reference),
        }
    }
}

impl<T> From<T> for Output<T> {
    fn from(value: T) -> Self {
        Output::known(value)
    }
}

/// Typed address for an output declared by a resource kind
///
/// Used by resource wrappers to hand out `Output<T>` handles without
/// repeating attribute names.
#[derive(Debug)]
pub struct OutputKey<T> {
    pub kind: ResourceKind,
    pub attribute: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> OutputKey<T> {
    pub const fn new(kind: ResourceKind, attribute: &'static str) -> Self {
        Self {
            kind,
            attribute,
            _marker: PhantomData,
        }
    }

    /// Output of the resource of this kind named `name`
    pub fn on(&self, name: &str) -> Output<T> {
        Output::pending(ResourceId::new(self.kind, name), self.attribute)
    }
}

/// Output values reported back by the provisioning engine, keyed by URN
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedOutputs {
    values: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl ResolvedOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        resource: &ResourceId,
        attribute: impl Into<String>,
        value: serde_json::Value,
    ) {
        self.values
            .entry(resource.urn())
            .or_default()
            .insert(attribute.into(), value);
    }

    pub fn get<T: DeserializeOwned>(&self, reference: &OutputRef) -> Result<T> {
        let unresolved = || CloudError::ReferenceResolution {
            resource: reference.resource.name.clone(),
            attribute: reference.attribute.clone(),
        };
        let value = self
            .values
            .get(&reference.resource.urn())
            .and_then(|attrs| attrs.get(&reference.attribute))
            .ok_or_else(unresolved)?;
        serde_json::from_value(value.clone()).map_err(|_| unresolved())
    }
}
