//! Object layer: placed objects keyed by id, drawn in z-order.

use crate::objects::{ObjectId, PlacedObject};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All placed objects on a board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectLayer {
    objects: HashMap<ObjectId, PlacedObject>,
    /// Back to front.
    z_order: Vec<ObjectId>,
}

impl ObjectLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object on top of the others.
    pub fn add(&mut self, object: PlacedObject) -> ObjectId {
        let id = object.id();
        self.z_order.retain(|&other| other != id);
        self.z_order.push(id);
        self.objects.insert(id, object);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<PlacedObject> {
        self.z_order.retain(|&other| other != id);
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut PlacedObject> {
        self.objects.get_mut(&id)
    }

    /// Objects back to front.
    pub fn ordered(&self) -> impl Iterator<Item = &PlacedObject> {
        self.z_order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Move an object to the top of the z-order.
    pub fn bring_to_front(&mut self, id: ObjectId) -> bool {
        if !self.objects.contains_key(&id) {
            return false;
        }
        self.z_order.retain(|&other| other != id);
        self.z_order.push(id);
        true
    }

    /// Topmost object under `point`.
    pub fn object_at(&self, point: Point, tolerance: f64) -> Option<ObjectId> {
        self.objects_at(point, tolerance).into_iter().next()
    }

    /// Objects under `point`, front to back.
    pub fn objects_at(&self, point: Point, tolerance: f64) -> Vec<ObjectId> {
        self.z_order
            .iter()
            .rev()
            .filter(|id| {
                self.objects
                    .get(id)
                    .is_some_and(|o| o.hit_test(point, tolerance))
            })
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
