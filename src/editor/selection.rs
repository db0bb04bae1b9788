use crate::scene::{RenderableId, Scene};

/// Modifier held while clicking an entry of the renderable list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickModifier {
    #[default]
    None,
    /// Ctrl: toggle membership without dropping the rest.
    Multi,
    /// Shift: extend from the last selected entry.
    Range,
}

/// Set of selected renderables, kept in click order.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Vec<RenderableId>,
    last_selected: Option<RenderableId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[RenderableId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: RenderableId) -> bool {
        self.ids.contains(&id)
    }

    pub fn last_selected(&self) -> Option<RenderableId> {
        self.last_selected
    }

    /// The selected id when exactly one renderable is selected.
    pub fn single(&self) -> Option<RenderableId> {
        match self.ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Forgets everything, including the range anchor.
    pub fn reset(&mut self) {
        self.ids.clear();
        self.last_selected = None;
    }

    pub fn select_only(&mut self, id: RenderableId) {
        self.ids.clear();
        self.ids.push(id);
        self.last_selected = Some(id);
    }

    fn insert(&mut self, id: RenderableId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    /// Deselects `id`. The range anchor is kept.
    pub fn remove(&mut self, id: RenderableId) {
        self.ids.retain(|existing| *existing != id);
    }

    /// Applies a click on the entry at `index` of the scene's display order.
    /// Returns false if `index` is out of range.
    pub fn pick(&mut self, scene: &Scene, index: usize, modifier: PickModifier) -> bool {
        let Some(clicked) = scene.id_at(index) else {
            return false;
        };

        let anchor = self.last_selected.and_then(|id| scene.index_of(id));
        if let (PickModifier::Range, Some(anchor)) = (modifier, anchor) {
            let (start, end) = (anchor.min(index), anchor.max(index));
            for idx in start..=end {
                if let Some(id) = scene.id_at(idx) {
                    self.insert(id);
                }
            }
            log::debug!("Range select {}..={} -> {} selected", start, end, self.ids.len());
            return true;
        }

        if self.contains(clicked) {
            self.remove(clicked);
        } else {
            if modifier != PickModifier::Multi {
                self.ids.clear();
            }
            self.ids.push(clicked);
            self.last_selected = Some(clicked);
        }
        true
    }

    /// Drops ids that no longer resolve.
    pub fn retain_existing(&mut self, scene: &Scene) {
        self.ids.retain(|id| scene.contains(*id));
        if self.last_selected.is_some_and(|id| !scene.contains(id)) {
            self.last_selected = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{PointParams, RenderableKind, Transform};

    fn scene_with(count: usize) -> (Scene, Vec<RenderableId>) {
        let mut scene = Scene::new();
        let ids = (0..count)
            .map(|_| {
                scene.add_renderable(
                    "Point",
                    Transform::default(),
                    RenderableKind::Point(PointParams::default()),
                )
            })
            .collect();
        (scene, ids)
    }

    #[test]
    fn plain_click_replaces_selection() {
        let (scene, ids) = scene_with(3);
        let mut selection = Selection::new();
        assert!(selection.pick(&scene, 0, PickModifier::None));
        assert!(selection.pick(&scene, 2, PickModifier::None));
        assert_eq!(selection.ids(), &[ids[2]]);
        assert_eq!(selection.last_selected(), Some(ids[2]));
    }

    #[test]
    fn ctrl_click_adds_and_click_on_selected_removes() {
        let (scene, ids) = scene_with(3);
        let mut selection = Selection::new();
        selection.pick(&scene, 0, PickModifier::None);
        selection.pick(&scene, 1, PickModifier::Multi);
        assert_eq!(selection.ids(), &[ids[0], ids[1]]);

        selection.pick(&scene, 0, PickModifier::None);
        assert_eq!(selection.ids(), &[ids[1]]);
    }

    #[test]
    fn shift_click_selects_range_in_both_directions() {
        let (scene, ids) = scene_with(7);

        let mut forward = Selection::new();
        forward.pick(&scene, 0, PickModifier::None);
        forward.pick(&scene, 2, PickModifier::Multi);
        forward.pick(&scene, 5, PickModifier::Range);
        let mut got: Vec<_> = forward.ids().to_vec();
        got.sort();
        assert_eq!(got, vec![ids[0], ids[2], ids[3], ids[4], ids[5]]);

        let mut backward = Selection::new();
        backward.pick(&scene, 5, PickModifier::None);
        backward.pick(&scene, 2, PickModifier::Range);
        let mut got: Vec<_> = backward.ids().to_vec();
        got.sort();
        assert_eq!(got, vec![ids[2], ids[3], ids[4], ids[5]]);
    }

    #[test]
    fn shift_click_without_anchor_behaves_like_click() {
        let (scene, ids) = scene_with(4);
        let mut selection = Selection::new();
        selection.pick(&scene, 3, PickModifier::Range);
        assert_eq!(selection.ids(), &[ids[3]]);
    }

    #[test]
    fn deselecting_keeps_the_range_anchor() {
        let (scene, ids) = scene_with(7);
        let mut selection = Selection::new();
        selection.pick(&scene, 1, PickModifier::None);
        selection.pick(&scene, 3, PickModifier::Multi);
        selection.pick(&scene, 3, PickModifier::Multi);
        assert_eq!(selection.ids(), &[ids[1]]);
        assert_eq!(selection.last_selected(), Some(ids[3]));

        selection.pick(&scene, 5, PickModifier::Range);
        let mut got: Vec<_> = selection.ids().to_vec();
        got.sort();
        assert_eq!(got, vec![ids[1], ids[3], ids[4], ids[5]]);
    }

    #[test]
    fn out_of_range_pick_is_rejected() {
        let (scene, _) = scene_with(2);
        let mut selection = Selection::new();
        assert!(!selection.pick(&scene, 2, PickModifier::None));
        assert!(selection.is_empty());
    }
}
