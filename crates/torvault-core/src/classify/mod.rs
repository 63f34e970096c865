//! Field-level change classification for torrents present on both sides

pub mod capabilities;
pub mod field;
pub mod registry;

pub use capabilities::{ApiVersion, ApiVersionCapabilities, CapabilityGate, FixedCapabilities};
pub use field::{Change, FieldValue, TorrentField};
pub use registry::{FieldDescriptor, FIELD_REGISTRY};

use crate::model::TorrentView;

/// Compare `current` against `desired` field by field
///
/// Returns one [`Change`] per differing field, in registry order. An empty
/// result means the torrent already matches.
pub fn classify(
    current: &TorrentView,
    desired: &TorrentView,
    gate: &dyn CapabilityGate,
) -> Vec<Change> {
    let mut changes = Vec::new();

    for descriptor in FIELD_REGISTRY {
        let desired_value = (descriptor.extract)(desired);
        if descriptor.optional_on_desired && desired_value.is_absent() {
            continue;
        }

        let current_value = (descriptor.extract)(current);
        if current_value == desired_value {
            continue;
        }

        let field = descriptor.field;
        let supported = !field.is_identity() && gate.is_field_mutable(field);
        let message = (!supported).then(|| manual_action(field, &desired_value));

        changes.push(Change {
            field,
            current: current_value,
            desired: desired_value,
            supported,
            message,
        });
    }

    changes
}

fn manual_action(field: TorrentField, desired: &FieldValue) -> String {
    if field.is_identity() {
        format!(
            "{} differs from the backup; remove and re-add the torrent from the backup file",
            field
        )
    } else {
        format!(
            "{} cannot be changed in place on this client; remove and re-add the torrent with {} = {}",
            field, field, desired
        )
    }
}
