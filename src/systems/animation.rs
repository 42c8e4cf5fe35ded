use hecs::{Entity, World};

use crate::assets::{AnimationClip, Channel, ChannelOutput, Interpolation};
use crate::components::{ClipPlayback, LocalTransform};

/// Scrub positions are expressed in frames at this rate.
pub const CLIP_FPS: f32 = 30.0;

/// Advance a playing clip by `dt`, wrapping at the seeded frame max so
/// playback loops. Scrubbing by hand clamps instead; only playback wraps.
pub fn advance_frame(frame: f32, dt: f32, max_frame: f32) -> f32 {
    if max_frame <= 0.0 {
        return 0.0;
    }
    (frame + dt * CLIP_FPS).rem_euclid(max_frame)
}

/// Sample `clip` at the playback state's current frame and write the sampled
/// TRS onto the clip's node entities. A no-op until nodes exist, so the
/// scrubber can be live before the model has finished loading.
pub fn animation_system(world: &mut World, clip: &AnimationClip, nodes: &[Entity]) {
    let frame = match world.query::<&ClipPlayback>().iter().next() {
        Some((_, playback)) => playback.frame,
        None => return,
    };
    let t = (frame / CLIP_FPS).clamp(0.0, clip.duration);

    for channel in &clip.channels {
        let Some(&entity) = nodes.get(channel.node) else {
            continue;
        };
        let Ok(mut local) = world.get::<&mut LocalTransform>(entity) else {
            continue;
        };
        apply_channel(channel, t, &mut local);
    }
}

fn apply_channel(channel: &Channel, t: f32, local: &mut LocalTransform) {
    let Some((lo, hi, u)) = sample_keys(&channel.times, t) else {
        return;
    };
    let u = match channel.interpolation {
        Interpolation::Step => 0.0,
        Interpolation::Linear => u,
    };
    match &channel.output {
        ChannelOutput::Translations(values) => {
            if let (Some(a), Some(b)) = (values.get(lo), values.get(hi)) {
                local.position = a.lerp(*b, u);
            }
        }
        ChannelOutput::Rotations(values) => {
            if let (Some(a), Some(b)) = (values.get(lo), values.get(hi)) {
                local.rotation = a.slerp(*b, u);
            }
        }
        ChannelOutput::Scales(values) => {
            if let (Some(a), Some(b)) = (values.get(lo), values.get(hi)) {
                local.scale = a.lerp(*b, u);
            }
        }
    }
}

/// Bracketing keyframe pair and the interpolation factor between them.
fn sample_keys(times: &[f32], t: f32) -> Option<(usize, usize, f32)> {
    let (&first, &last) = (times.first()?, times.last()?);
    if t <= first {
        return Some((0, 0, 0.0));
    }
    if t >= last {
        let end = times.len() - 1;
        return Some((end, end, 0.0));
    }
    let hi = times.partition_point(|&k| k <= t);
    let lo = hi - 1;
    let span = times[hi] - times[lo];
    let u = if span > 0.0 { (t - times[lo]) / span } else { 0.0 };
    Some((lo, hi, u))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn translation_clip() -> AnimationClip {
        AnimationClip {
            name: "slide".into(),
            duration: 2.0,
            channels: vec![Channel {
                node: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0, 2.0],
                output: ChannelOutput::Translations(vec![
                    Vec3::ZERO,
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 1.0, 0.0),
                ]),
            }],
        }
    }

    #[test]
    fn advance_wraps_at_the_seeded_max() {
        let next = advance_frame(149.0, 1.0, 150.0);
        assert!((next - 29.0).abs() < 1e-4);
        assert_eq!(advance_frame(10.0, 0.1, 0.0), 0.0);
    }

    #[test]
    fn sampling_interpolates_between_keyframes() {
        let mut world = World::new();
        let node = world.spawn((LocalTransform::new(Vec3::ZERO),));
        world.spawn((ClipPlayback {
            frame: 1.5 * CLIP_FPS,
            playing: true,
        },));

        animation_system(&mut world, &translation_clip(), &[node]);

        let local = world.get::<&LocalTransform>(node).unwrap();
        assert!((local.position - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn scrub_past_the_clip_end_holds_the_last_pose() {
        let mut world = World::new();
        let node = world.spawn((LocalTransform::new(Vec3::ZERO),));
        world.spawn((ClipPlayback {
            frame: 10.0 * CLIP_FPS,
            playing: false,
        },));

        animation_system(&mut world, &translation_clip(), &[node]);

        let local = world.get::<&LocalTransform>(node).unwrap();
        assert!((local.position - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn step_channels_snap_to_the_previous_key() {
        let mut clip = translation_clip();
        clip.channels[0].interpolation = Interpolation::Step;
        let mut world = World::new();
        let node = world.spawn((LocalTransform::new(Vec3::ZERO),));
        world.spawn((ClipPlayback {
            frame: 1.5 * CLIP_FPS,
            playing: false,
        },));

        animation_system(&mut world, &clip, &[node]);

        let local = world.get::<&LocalTransform>(node).unwrap();
        assert!((local.position - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn missing_nodes_are_tolerated_before_load() {
        let mut world = World::new();
        world.spawn((ClipPlayback::default(),));
        // No node entities yet; must not panic.
        animation_system(&mut world, &translation_clip(), &[]);
    }
}
