use super::descriptor::{ClassDescriptor, ClassName, MethodMetadata};
use super::snapshot::{ClassRecord, MetadataSnapshot, SnapshotError};
use super::MetadataAccessor;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, trace};

/// In-memory metadata accessor built from a snapshot
///
/// All inheritance is resolved up front, so lookups never touch the
/// snapshot again and the index can be shared across threads.
#[derive(Debug, Default)]
pub struct ClassIndex {
    classes: Vec<ClassDescriptor>,
    by_name: HashMap<String, usize>,
    runtime_version: Option<String>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and resolve a snapshot file
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Self::from_snapshot(MetadataSnapshot::load(path)?)
    }

    pub fn from_snapshot(snapshot: MetadataSnapshot) -> Result<Self, SnapshotError> {
        let mut records: HashMap<String, &ClassRecord> = HashMap::new();
        for record in &snapshot.classes {
            let key = ClassName::key_of(&record.name);
            if records.insert(key, record).is_some() {
                return Err(SnapshotError::DuplicateClass(record.name.clone()));
            }
        }

        let mut index = Self {
            classes: Vec::with_capacity(snapshot.classes.len()),
            by_name: HashMap::with_capacity(snapshot.classes.len()),
            runtime_version: snapshot.runtime_version.clone(),
        };

        for record in &snapshot.classes {
            let descriptor = resolve(record, &records);
            index.insert(descriptor);
        }

        debug!("Indexed {} classes", index.classes.len());

        Ok(index)
    }

    /// Add an already resolved descriptor, replacing any class of the same name
    pub fn insert(&mut self, descriptor: ClassDescriptor) {
        let key = descriptor.name().key().to_string();
        match self.by_name.get(&key) {
            Some(&slot) => self.classes[slot] = descriptor,
            None => {
                self.by_name.insert(key, self.classes.len());
                self.classes.push(descriptor);
            }
        }
    }

    /// Runtime version recorded in the snapshot, if any
    pub fn runtime_version(&self) -> Option<&str> {
        self.runtime_version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn method_count(&self) -> usize {
        self.classes.iter().map(ClassDescriptor::method_count).sum()
    }
}

impl MetadataAccessor for ClassIndex {
    fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.by_name
            .get(&ClassName::key_of(name))
            .map(|&slot| &self.classes[slot])
    }

    fn classes(&self) -> &[ClassDescriptor] {
        &self.classes
    }
}

impl FromIterator<ClassDescriptor> for ClassIndex {
    fn from_iter<I: IntoIterator<Item = ClassDescriptor>>(iter: I) -> Self {
        let mut index = ClassIndex::new();
        for descriptor in iter {
            index.insert(descriptor);
        }
        index
    }
}

fn resolve(record: &ClassRecord, records: &HashMap<String, &ClassRecord>) -> ClassDescriptor {
    let mut descriptor = ClassDescriptor::new(record.name.as_str()).with_kind(record.kind);

    let ancestors = ancestor_chain(record, records);
    for interface in interface_set(record, &ancestors, records) {
        descriptor = descriptor.with_interface(interface);
    }
    for ancestor in ancestors {
        descriptor = descriptor.with_ancestor(ancestor);
    }

    for tag in &record.tags {
        descriptor = descriptor.with_tag(tag.clone());
    }

    for method in &record.methods {
        let mut metadata = MethodMetadata::new(method.name.as_str());
        if let Some(constructor) = method.constructor {
            metadata = metadata.with_constructor(constructor);
        }
        for tag in &method.tags {
            metadata = metadata.with_tag(tag.clone());
        }
        descriptor = descriptor.with_method(metadata);
    }

    descriptor
}

/// Parent classes, nearest first. Parents missing from the snapshot end the
/// chain but are still recorded by name.
fn ancestor_chain(record: &ClassRecord, records: &HashMap<String, &ClassRecord>) -> Vec<ClassName> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([ClassName::key_of(&record.name)]);
    let mut current = record.parent.as_deref();

    while let Some(parent) = current {
        let key = ClassName::key_of(parent);
        if !seen.insert(key.clone()) {
            trace!("Inheritance cycle at {} while resolving {}", parent, record.name);
            break;
        }

        chain.push(ClassName::new(parent));
        current = records.get(&key).and_then(|r| r.parent.as_deref());
    }

    chain
}

/// Interfaces declared by the class and its ancestors, closed over
/// interface inheritance
fn interface_set(
    record: &ClassRecord,
    ancestors: &[ClassName],
    records: &HashMap<String, &ClassRecord>,
) -> Vec<ClassName> {
    let mut pending: Vec<&str> = record.interfaces.iter().map(String::as_str).collect();
    for ancestor in ancestors {
        if let Some(parent) = records.get(ancestor.key()) {
            pending.extend(parent.interfaces.iter().map(String::as_str));
        }
    }

    let mut seen = HashSet::new();
    let mut interfaces = Vec::new();

    while let Some(name) = pending.pop() {
        let key = ClassName::key_of(name);
        if !seen.insert(key.clone()) {
            continue;
        }

        interfaces.push(ClassName::new(name));
        if let Some(interface) = records.get(&key) {
            pending.extend(interface.interfaces.iter().map(String::as_str));
        }
    }

    interfaces
}
