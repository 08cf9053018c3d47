//! Scene graph: a flat table of mesh objects plus the camera
//!
//! Each object owns a transform and a contiguous range of the face array.
//! Objects are created in face order and never removed, so ranges are
//! ordered and non-overlapping.

use crate::rasterizer::{IndexRange, Transform};

/// Handle to a mesh object (index into the parallel tables)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Per-object record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub id: ObjectId,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    camera: Transform,
    objects: Vec<Object>,
    transforms: Vec<Transform>,
    ranges: Vec<IndexRange>,
}

impl SceneGraph {
    pub fn new(camera: Transform) -> Self {
        Self {
            camera,
            ..Default::default()
        }
    }

    fn check_tables(&self) {
        assert_eq!(self.objects.len(), self.transforms.len(), "object/transform tables out of sync");
        assert_eq!(self.objects.len(), self.ranges.len(), "object/range tables out of sync");
    }

    /// Add an object owning `range`. The range must start at or after the
    /// end of the previously created object's range.
    pub fn create_object(&mut self, name: impl Into<String>, transform: Transform, range: IndexRange) -> ObjectId {
        self.check_tables();
        if let Some(prev) = self.ranges.last() {
            assert!(
                range.start >= prev.end(),
                "face range {}..{} overlaps or precedes previous object's {}..{}",
                range.start,
                range.end(),
                prev.start,
                prev.end()
            );
        }

        let id = ObjectId(self.objects.len());
        self.objects.push(Object { id, name: name.into() });
        self.transforms.push(transform);
        self.ranges.push(range);
        self.check_tables();
        log::debug!("created object {:?} with faces {}..{}", id, range.start, range.end());
        id
    }

    pub fn set_transform(&mut self, id: ObjectId, transform: Transform) {
        self.check_tables();
        self.transforms[id.index()] = transform;
    }

    pub fn transform(&self, id: ObjectId) -> Transform {
        self.transforms[id.index()]
    }

    pub fn transform_mut(&mut self, id: ObjectId) -> &mut Transform {
        &mut self.transforms[id.index()]
    }

    pub fn range(&self, id: ObjectId) -> IndexRange {
        self.ranges[id.index()]
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.index()]
    }

    pub fn camera(&self) -> Transform {
        self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Transform {
        &mut self.camera
    }

    pub fn set_camera(&mut self, transform: Transform) {
        self.camera = transform;
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in creation order (which is also face order)
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Transform, IndexRange)> + '_ {
        self.objects
            .iter()
            .zip(&self.transforms)
            .zip(&self.ranges)
            .map(|((obj, transform), range)| (obj.id, transform, *range))
    }

    /// Owner of a face, by binary search over the range boundaries
    pub fn object_for_face(&self, face_index: usize) -> Option<ObjectId> {
        let i = self.ranges.partition_point(|r| r.end() <= face_index);
        self.ranges
            .get(i)
            .filter(|r| r.contains(face_index))
            .map(|_| ObjectId(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Vec3;

    #[test]
    fn test_ids_are_sequential_and_tables_agree() {
        let mut scene = SceneGraph::new(Transform::default());
        for i in 0..5 {
            let id = scene.create_object("obj", Transform::default(), IndexRange::new(i * 2, 2));
            assert_eq!(id, ObjectId(i));
            assert_eq!(scene.objects.len(), scene.transforms.len());
            assert_eq!(scene.objects.len(), scene.ranges.len());
        }
        assert_eq!(scene.len(), 5);
    }

    #[test]
    fn test_set_transform_and_camera() {
        let mut scene = SceneGraph::new(Transform::at(Vec3::new(0.0, 0.0, -1.0)));
        let id = scene.create_object("cube", Transform::default(), IndexRange::new(0, 12));
        let moved = Transform::at(Vec3::new(1.0, 2.0, 3.0));
        scene.set_transform(id, moved);
        assert_eq!(scene.transform(id), moved);

        scene.set_camera(moved);
        assert_eq!(scene.camera(), moved);
    }

    #[test]
    fn test_object_for_face_with_empty_objects() {
        let mut scene = SceneGraph::new(Transform::default());
        let a = scene.create_object("a", Transform::default(), IndexRange::new(0, 3));
        let empty = scene.create_object("empty", Transform::default(), IndexRange::new(3, 0));
        let b = scene.create_object("b", Transform::default(), IndexRange::new(3, 2));
        let c = scene.create_object("c", Transform::default(), IndexRange::new(7, 1));

        assert_eq!(scene.object_for_face(0), Some(a));
        assert_eq!(scene.object_for_face(2), Some(a));
        assert_eq!(scene.object_for_face(3), Some(b));
        assert_eq!(scene.object_for_face(4), Some(b));
        assert_eq!(scene.object_for_face(5), None);
        assert_eq!(scene.object_for_face(7), Some(c));
        assert_eq!(scene.object_for_face(8), None);
        assert_eq!(scene.range(empty).count, 0);
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn test_overlapping_range_rejected() {
        let mut scene = SceneGraph::new(Transform::default());
        scene.create_object("a", Transform::default(), IndexRange::new(0, 4));
        scene.create_object("b", Transform::default(), IndexRange::new(2, 4));
    }
}
