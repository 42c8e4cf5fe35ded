use std::collections::VecDeque;

use glam::Mat4;
use hecs::{Entity, World};

use crate::components::{Children, GlobalTransform, LocalTransform, Parent};

/// Propagates LocalTransform down the hierarchy via BFS. Roots (entities with
/// LocalTransform but no Parent) compute GlobalTransform from their own
/// LocalTransform; children inherit the parent's GlobalTransform multiplied by
/// their own LocalTransform. Loaded model trees and the light gizmos all flow
/// through here once per frame, after animation sampling.
pub fn transform_propagation_system(world: &mut World) {
    let mut queue: VecDeque<(Entity, Mat4)> = VecDeque::new();

    let roots: Vec<(Entity, Mat4)> = world
        .query::<&LocalTransform>()
        .without::<&Parent>()
        .iter()
        .map(|(entity, local)| (entity, local.matrix()))
        .collect();

    for (entity, global_mat) in &roots {
        if let Ok(mut gt) = world.get::<&mut GlobalTransform>(*entity) {
            gt.0 = *global_mat;
        }
        if let Ok(children) = world.get::<&Children>(*entity) {
            for &child in &children.0 {
                queue.push_back((child, *global_mat));
            }
        }
    }

    while let Some((entity, parent_global)) = queue.pop_front() {
        let child_global = if let Ok(local) = world.get::<&LocalTransform>(entity) {
            parent_global * local.matrix()
        } else {
            parent_global
        };

        if let Ok(mut gt) = world.get::<&mut GlobalTransform>(entity) {
            gt.0 = child_global;
        }

        if let Ok(children) = world.get::<&Children>(entity) {
            for &child in &children.0 {
                queue.push_back((child, child_global));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::add_child;
    use glam::Vec3;

    #[test]
    fn children_compose_with_their_parent() {
        let mut world = World::new();
        let parent = world.spawn((
            LocalTransform::new(Vec3::new(1.0, 0.0, 0.0)),
            GlobalTransform(Mat4::IDENTITY),
        ));
        let child = world.spawn((
            LocalTransform::new(Vec3::new(0.0, 2.0, 0.0)),
            GlobalTransform(Mat4::IDENTITY),
        ));
        add_child(&mut world, parent, child);

        transform_propagation_system(&mut world);

        let global = world.get::<&GlobalTransform>(child).unwrap();
        let pos = global.0.to_scale_rotation_translation().2;
        assert!((pos - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }
}
