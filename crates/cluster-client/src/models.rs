//! Shared types for the cluster adapter

use std::collections::BTreeMap;
use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde_json::{Map, Value, json};

/// The resource kinds the cleanup job manages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddonKind {
    DaemonSet,
    Deployment,
    Service,
    ServiceAccount,
    ConfigMap,
    PodDisruptionBudget,
}

impl fmt::Display for AddonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddonKind::DaemonSet => "DaemonSet",
            AddonKind::Deployment => "Deployment",
            AddonKind::Service => "Service",
            AddonKind::ServiceAccount => "ServiceAccount",
            AddonKind::ConfigMap => "ConfigMap",
            AddonKind::PodDisruptionBudget => "PodDisruptionBudget",
        };
        f.write_str(name)
    }
}

/// The projection of a live object the cleanup job works with: identity for
/// optimistic concurrency plus the two metadata maps ownership lives in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceMeta {
    /// Resource version observed at read time
    pub resource_version: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl From<&ObjectMeta> for ResourceMeta {
    fn from(meta: &ObjectMeta) -> Self {
        ResourceMeta {
            resource_version: meta.resource_version.clone(),
            labels: meta.labels.clone().unwrap_or_default(),
            annotations: meta.annotations.clone().unwrap_or_default(),
        }
    }
}

/// A metadata-only change: keys to set, keys to remove, and the resource
/// version the change was computed against.
///
/// Rendered as a JSON merge patch with explicit `null`s for removals.
/// Including `resourceVersion` makes the API server reject the write with
/// 409 when the object has moved on since it was read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    pub resource_version: Option<String>,
    pub set_labels: BTreeMap<String, String>,
    pub remove_labels: Vec<String>,
    pub set_annotations: BTreeMap<String, String>,
    pub remove_annotations: Vec<String>,
}

impl MetadataPatch {
    /// Compute the patch that turns `before` into `after`, pinned to the
    /// resource version observed in `before`.
    pub fn between(before: &ResourceMeta, after: &ResourceMeta) -> Self {
        let mut patch = MetadataPatch {
            resource_version: before.resource_version.clone(),
            ..MetadataPatch::default()
        };

        for (key, value) in &after.labels {
            if before.labels.get(key) != Some(value) {
                patch.set_labels.insert(key.clone(), value.clone());
            }
        }
        for key in before.labels.keys() {
            if !after.labels.contains_key(key) {
                patch.remove_labels.push(key.clone());
            }
        }

        for (key, value) in &after.annotations {
            if before.annotations.get(key) != Some(value) {
                patch.set_annotations.insert(key.clone(), value.clone());
            }
        }
        for key in before.annotations.keys() {
            if !after.annotations.contains_key(key) {
                patch.remove_annotations.push(key.clone());
            }
        }

        patch
    }

    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.set_labels.is_empty()
            && self.remove_labels.is_empty()
            && self.set_annotations.is_empty()
            && self.remove_annotations.is_empty()
    }

    /// Render as a JSON merge patch body.
    pub fn to_merge_patch(&self) -> Value {
        let mut labels = Map::new();
        for (key, value) in &self.set_labels {
            labels.insert(key.clone(), json!(value));
        }
        for key in &self.remove_labels {
            labels.insert(key.clone(), Value::Null);
        }

        let mut annotations = Map::new();
        for (key, value) in &self.set_annotations {
            annotations.insert(key.clone(), json!(value));
        }
        for key in &self.remove_annotations {
            annotations.insert(key.clone(), Value::Null);
        }

        let mut metadata = Map::new();
        if let Some(version) = &self.resource_version {
            metadata.insert("resourceVersion".to_string(), json!(version));
        }
        if !labels.is_empty() {
            metadata.insert("labels".to_string(), Value::Object(labels));
        }
        if !annotations.is_empty() {
            metadata.insert("annotations".to_string(), Value::Object(annotations));
        }

        json!({ "metadata": metadata })
    }

    /// Apply the patch to a metadata value in place (mock and test support).
    pub fn apply_to(&self, meta: &mut ResourceMeta) {
        for (key, value) in &self.set_labels {
            meta.labels.insert(key.clone(), value.clone());
        }
        for key in &self.remove_labels {
            meta.labels.remove(key);
        }
        for (key, value) in &self.set_annotations {
            meta.annotations.insert(key.clone(), value.clone());
        }
        for key in &self.remove_annotations {
            meta.annotations.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(
        version: &str,
        labels: &[(&str, &str)],
        annotations: &[(&str, &str)],
    ) -> ResourceMeta {
        ResourceMeta {
            resource_version: Some(version.to_string()),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn diff_of_identical_metadata_is_empty() {
        let before = meta("7", &[("a", "1")], &[("b", "2")]);
        let patch = MetadataPatch::between(&before, &before.clone());
        assert!(patch.is_empty());
        assert_eq!(patch.resource_version.as_deref(), Some("7"));
    }

    #[test]
    fn diff_captures_sets_and_removals() {
        let before = meta("1", &[("keep", "x"), ("drop", "y")], &[]);
        let mut after = before.clone();
        after.labels.remove("drop");
        after.labels.insert("new".to_string(), "z".to_string());
        after
            .annotations
            .insert("note".to_string(), "added".to_string());

        let patch = MetadataPatch::between(&before, &after);
        assert_eq!(patch.set_labels.get("new").map(String::as_str), Some("z"));
        assert_eq!(patch.remove_labels, vec!["drop".to_string()]);
        assert_eq!(
            patch.set_annotations.get("note").map(String::as_str),
            Some("added")
        );
        assert!(patch.remove_annotations.is_empty());
    }

    #[test]
    fn merge_patch_uses_null_for_removals() {
        let before = meta("42", &[("drop", "y")], &[]);
        let mut after = before.clone();
        after.labels.remove("drop");

        let body = MetadataPatch::between(&before, &after).to_merge_patch();
        assert_eq!(body["metadata"]["resourceVersion"], "42");
        assert!(body["metadata"]["labels"]["drop"].is_null());
    }

    #[test]
    fn apply_to_round_trips_the_diff() {
        let before = meta("1", &[("drop", "y")], &[("stay", "s")]);
        let mut after = before.clone();
        after.labels.remove("drop");
        after.labels.insert("added".to_string(), "v".to_string());

        let patch = MetadataPatch::between(&before, &after);
        let mut patched = before.clone();
        patch.apply_to(&mut patched);
        assert_eq!(patched.labels, after.labels);
        assert_eq!(patched.annotations, after.annotations);
    }
}
