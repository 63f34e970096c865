//! Ordered registry of comparable torrent fields
//!
//! The classifier walks [`FIELD_REGISTRY`] in order, so the order here is
//! also the order of `changes` in every plan update entry. Adding a
//! comparable field means adding a [`TorrentField`] variant and one
//! descriptor below.

use crate::classify::field::{FieldValue, TorrentField};
use crate::model::TorrentView;

pub struct FieldDescriptor {
    pub field: TorrentField,
    pub extract: fn(&TorrentView) -> FieldValue,
    /// When true, a desired side without a value means "not recorded" and
    /// the field is not compared
    pub optional_on_desired: bool,
}

pub static FIELD_REGISTRY: &[FieldDescriptor] = &[
    FieldDescriptor {
        field: TorrentField::Name,
        extract: extract_name,
        optional_on_desired: false,
    },
    FieldDescriptor {
        field: TorrentField::Category,
        extract: extract_category,
        optional_on_desired: false,
    },
    FieldDescriptor {
        field: TorrentField::Tags,
        extract: extract_tags,
        optional_on_desired: false,
    },
    FieldDescriptor {
        field: TorrentField::SavePath,
        extract: extract_save_path,
        optional_on_desired: true,
    },
    FieldDescriptor {
        field: TorrentField::ContentLayout,
        extract: extract_content_layout,
        optional_on_desired: true,
    },
    FieldDescriptor {
        field: TorrentField::InfohashV1,
        extract: extract_infohash_v1,
        optional_on_desired: true,
    },
    FieldDescriptor {
        field: TorrentField::InfohashV2,
        extract: extract_infohash_v2,
        optional_on_desired: true,
    },
];

fn extract_name(t: &TorrentView) -> FieldValue {
    FieldValue::Text(Some(t.name.clone()))
}

fn extract_category(t: &TorrentView) -> FieldValue {
    FieldValue::Text(t.category.clone())
}

fn extract_tags(t: &TorrentView) -> FieldValue {
    FieldValue::Set(t.tags.clone())
}

fn extract_save_path(t: &TorrentView) -> FieldValue {
    FieldValue::Text(t.save_path.clone())
}

fn extract_content_layout(t: &TorrentView) -> FieldValue {
    FieldValue::Text(t.content_layout.map(|l| l.to_string()))
}

fn extract_infohash_v1(t: &TorrentView) -> FieldValue {
    FieldValue::Text(t.infohash_v1.clone())
}

fn extract_infohash_v2(t: &TorrentView) -> FieldValue {
    FieldValue::Text(t.infohash_v2.clone())
}

pub fn descriptor(field: TorrentField) -> Option<&'static FieldDescriptor> {
    FIELD_REGISTRY.iter().find(|d| d.field == field)
}
