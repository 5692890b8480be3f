//! Declared resource graph
//!
//! Keeps descriptors in declaration order and checks that their references
//! form a DAG over declared resources and outputs. Ordering and scheduling
//! of provider calls is left to the engine.

use crate::error::{CloudError, Result};
use crate::resource::{ResourceDescriptor, ResourceId, ResourceKind};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    resources: Vec<ResourceDescriptor>,
    index: HashMap<ResourceId, usize>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource. Names are unique per kind.
    pub fn add(&mut self, resource: ResourceDescriptor) -> Result<()> {
        if self.index.contains_key(resource.id()) {
            return Err(CloudError::DuplicateResource(resource.id().to_string()));
        }
        debug!(
            resource = %resource.name(),
            kind = %resource.kind(),
            "Declared resource"
        );
        self.index.insert(resource.id().clone(), self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    pub fn get(&self, kind: ResourceKind, name: &str) -> Option<&ResourceDescriptor> {
        self.find(&ResourceId::new(kind, name))
    }

    pub fn find(&self, id: &ResourceId) -> Option<&ResourceDescriptor> {
        self.index.get(id).map(|&i| &self.resources[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources that reference `id`
    pub fn dependents(&self, id: &ResourceId) -> Vec<&ResourceId> {
        self.resources
            .iter()
            .filter(|r| r.dependencies().contains(&id))
            .map(|r| r.id())
            .collect()
    }

    /// Check references and acyclicity
    pub fn validate(&self) -> Result<()> {
        for resource in &self.resources {
            for dep in resource.dependencies() {
                if !self.index.contains_key(dep) {
                    return Err(CloudError::DanglingReference {
                        from: resource.id().to_string(),
                        to: dep.to_string(),
                    });
                }
            }
            for reference in resource.references() {
                if !reference.resource.kind.has_output(&reference.attribute) {
                    return Err(CloudError::UnknownOutput {
                        from: resource.name().to_string(),
                        to: reference.resource.name.clone(),
                        attribute: reference.attribute.clone(),
                    });
                }
            }
        }

        let mut marks = vec![Mark::Unvisited; self.resources.len()];
        let mut path = Vec::new();
        for i in 0..self.resources.len() {
            self.visit(i, &mut marks, &mut path)?;
        }

        debug!(resources = self.resources.len(), "Resource graph is valid");
        Ok(())
    }

    fn visit(&self, i: usize, marks: &mut [Mark], path: &mut Vec<usize>) -> Result<()> {
        match marks[i] {
            Mark::Done => return Ok(()),
            Mark::InProgress => {
                let start = path.iter().position(|&p| p == i).unwrap_or(0);
                let mut cycle: Vec<&str> = path[start..]
                    .iter()
                    .map(|&p| self.resources[p].name())
                    .collect();
                cycle.push(self.resources[i].name());
                return Err(CloudError::CyclicReference(cycle.join(" -> ")));
            }
            Mark::Unvisited => {}
        }

        marks[i] = Mark::InProgress;
        path.push(i);
        for dep in self.resources[i].dependencies() {
            if let Some(&j) = self.index.get(dep) {
                self.visit(j, marks, path)?;
            }
        }
        path.pop();
        marks[i] = Mark::Done;
        Ok(())
    }

    /// Whether every resource is declared after everything it references
    pub fn is_declared_in_dependency_order(&self) -> bool {
        self.resources.iter().enumerate().all(|(i, resource)| {
            resource
                .dependencies()
                .iter()
                .all(|dep| self.index.get(*dep).is_some_and(|&j| j < i))
        })
    }
}
