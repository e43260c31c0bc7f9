//! Merging an incoming object list into the live list by identity.

use crate::objects::{ElementKind, LiveObject, ObjectId, SceneObject, Tracked};
use std::collections::HashMap;

/// What a reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub kept: usize,
    pub created: usize,
    pub dropped: usize,
    /// The selected object was among the dropped ones.
    pub dropped_selected: bool,
}

/// Merge `incoming` into `old`.
///
/// The result has exactly the members and order of `incoming`. An incoming
/// entry whose id matches a live object reuses that instance: its public
/// fields are replaced while selection and other runtime state are kept.
/// Entries without a known id become new objects with fresh identities.
/// Live objects not matched are dropped.
pub fn reconcile(old: Vec<LiveObject>, incoming: Vec<Tracked>) -> (Vec<LiveObject>, ReconcileSummary) {
    let mut by_id: HashMap<ObjectId, LiveObject> =
        old.into_iter().map(|live| (live.id(), live)).collect();
    let mut summary = ReconcileSummary::default();

    let merged = incoming
        .into_iter()
        .map(|tracked| match tracked.id.and_then(|id| by_id.remove(&id)) {
            Some(mut live) => {
                merge_into(&mut live, tracked.object);
                summary.kept += 1;
                live
            }
            None => {
                summary.created += 1;
                LiveObject::new(tracked.object)
            }
        })
        .collect();

    summary.dropped = by_id.len();
    summary.dropped_selected = by_id.values().any(LiveObject::is_selected);

    log::debug!(
        "reconciled objects: {} kept, {} created, {} dropped",
        summary.kept,
        summary.created,
        summary.dropped
    );
    (merged, summary)
}

/// Copy public fields onto a live object, resetting load state when the
/// object now points at a different resource.
fn merge_into(live: &mut LiveObject, mut object: SceneObject) {
    object.geometry = object.geometry.normalized();
    if resource_key(&live.object) != resource_key(&object) {
        live.runtime.error = None;
        live.runtime.font_loaded = false;
    }
    if object.locked {
        live.runtime.session = None;
    }
    live.object = object;
}

fn resource_key(object: &SceneObject) -> Option<&str> {
    match &object.kind {
        ElementKind::Image(image) => Some(image.src.as_str()),
        ElementKind::Text(text) => text.custom_font.as_ref().map(|f| f.url.as_str()),
        ElementKind::Shape(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Geometry, SceneObject};

    fn rect(x: f64, color: &str) -> SceneObject {
        SceneObject::rectangle(Geometry::new(x, 0.0, 60.0, 60.0), color)
    }

    #[test]
    fn test_identity_survives_reordering() {
        let mut a = LiveObject::new(rect(10.0, "#ff0000"));
        a.runtime.selected = true;
        let b = LiveObject::new(rect(20.0, "#00ff00"));
        let (a_id, b_id) = (a.id(), b.id());

        let b_prime = rect(25.0, "#0000ff");
        let c = rect(30.0, "#000000");
        let (merged, summary) = reconcile(
            vec![a, b],
            vec![Tracked::new(b_id, b_prime.clone()), Tracked::from(c)],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id(), b_id);
        assert_eq!(merged[0].object, b_prime);
        assert!(!merged[0].is_selected());
        assert_ne!(merged[1].id(), a_id);
        assert_ne!(merged[1].id(), b_id);
        assert_eq!(
            summary,
            ReconcileSummary {
                kept: 1,
                created: 1,
                dropped: 1,
                dropped_selected: true,
            }
        );
    }

    #[test]
    fn test_selection_sticks_to_identity() {
        let a = LiveObject::new(rect(10.0, "#ff0000"));
        let mut b = LiveObject::new(rect(20.0, "#00ff00"));
        b.runtime.selected = true;
        let (a_track, b_track) = (a.tracked(), b.tracked());

        let (merged, _) = reconcile(vec![a, b], vec![b_track, a_track]);
        assert!(merged[0].is_selected());
        assert!(!merged[1].is_selected());
    }

    #[test]
    fn test_merged_rotation_is_normalized() {
        let a = LiveObject::new(rect(10.0, "#ff0000"));
        let mut turned = rect(10.0, "#ff0000");
        turned.geometry.rotation = -90.0;
        let mut fresh = rect(20.0, "#00ff00");
        fresh.geometry.rotation = 720.5;
        let (merged, _) = reconcile(vec![a.clone()], vec![Tracked::new(a.id(), turned), Tracked::from(fresh)]);
        assert_eq!(merged[0].object.geometry.rotation, 270.0);
        assert!((merged[1].object.geometry.rotation - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_entries_removed() {
        let old: Vec<LiveObject> = (0..3).map(|i| LiveObject::new(rect(i as f64, "#fff"))).collect();
        let first = old[0].tracked();
        let (merged, summary) = reconcile(old, vec![first]);
        assert_eq!(merged.len(), 1);
        assert_eq!(summary.dropped, 2);
    }

    #[test]
    fn test_new_src_resets_error() {
        let mut live = LiveObject::new(SceneObject::image(Geometry::default(), "a.png"));
        live.runtime.error = Some("404".to_string());
        let id = live.id();
        let (merged, _) = reconcile(
            vec![live],
            vec![Tracked::new(id, SceneObject::image(Geometry::default(), "b.png"))],
        );
        assert_eq!(merged[0].runtime.error, None);
    }

    #[test]
    fn test_duplicate_ids_are_not_reused() {
        let live = LiveObject::new(rect(0.0, "#fff"));
        let id = live.id();
        let (merged, summary) = reconcile(
            vec![live],
            vec![Tracked::new(id, rect(1.0, "#fff")), Tracked::new(id, rect(2.0, "#fff"))],
        );
        assert_eq!(merged[0].id(), id);
        assert_ne!(merged[1].id(), id);
        assert_eq!(summary.created, 1);
    }
}
