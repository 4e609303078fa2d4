//! Projection of raw provider records onto resolved catalog fields.
//!
//! Output keys follow the resolved field order exactly. A field the provider
//! did not supply is still emitted, as [`FieldValue::Unknown`].

use serde_json::Value;

use crate::catalog::ResolvedFields;
use crate::paginator::Ranked;
use crate::record::{FieldValue, ProjectedRecord, RawRecord};

/// Projects one raw record onto the resolved fields.
///
/// Every resolved field appears in the output. Rank fields have no raw value,
/// so a rank requested through here is left out; use [`project_ranked`].
pub fn project(raw: &RawRecord, fields: &ResolvedFields) -> ProjectedRecord {
    let mut projected = ProjectedRecord::with_capacity(fields.len());
    for spec in fields.iter().filter(|spec| !spec.is_rank()) {
        projected.insert(spec.name, FieldValue::from_option(spec.accessor.read(raw)));
    }
    projected
}

/// Projects a windowed collection element-wise.
///
/// A rank field is emitted only when it was resolved and `include_rank` is set.
pub fn project_ranked(
    items: &[Ranked<RawRecord>],
    fields: &ResolvedFields,
    include_rank: bool,
) -> Vec<ProjectedRecord> {
    items
        .iter()
        .map(|ranked| {
            let mut projected = ProjectedRecord::with_capacity(fields.len());
            for spec in fields.iter() {
                if spec.is_rank() {
                    if include_rank {
                        projected.insert(spec.name, FieldValue::Known(Value::from(ranked.rank)));
                    }
                    continue;
                }
                projected.insert(
                    spec.name,
                    FieldValue::from_option(spec.accessor.read(&ranked.item)),
                );
            }
            projected
        })
        .collect()
}
