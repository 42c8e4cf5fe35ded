//! glTF flattening: document → CPU-side node hierarchy, triangle meshes, and
//! animation clips. No GL here; the stage uploads and instantiates the result
//! on the main thread.

use std::path::Path;

use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use super::AssetError;

pub struct LoadedModel {
    pub nodes: Vec<NodeData>,
    pub primitives: Vec<PrimitiveData>,
    pub clips: Vec<AnimationClip>,
}

/// One node of the source hierarchy, indexed by glTF node index.
pub struct NodeData {
    pub parent: Option<usize>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// One triangle primitive, attached to its owning node.
pub struct PrimitiveData {
    pub node: usize,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub base_color: Vec3,
}

pub struct AnimationClip {
    pub name: String,
    /// Seconds; the scrub range is seeded from this.
    pub duration: f32,
    pub channels: Vec<Channel>,
}

pub struct Channel {
    pub node: usize,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub output: ChannelOutput,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
}

pub enum ChannelOutput {
    Translations(Vec<Vec3>),
    Rotations(Vec<Quat>),
    Scales(Vec<Vec3>),
}

pub fn load_gltf(path: &Path) -> Result<LoadedModel, AssetError> {
    let (document, buffers, _images) = gltf::import(path)?;

    let mut nodes: Vec<NodeData> = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            NodeData {
                parent: None,
                translation: Vec3::from(translation),
                rotation: Quat::from_array(rotation),
                scale: Vec3::from(scale),
            }
        })
        .collect();

    for node in document.nodes() {
        for child in node.children() {
            nodes[child.index()].parent = Some(node.index());
        }
    }

    let mut primitives = Vec::new();
    for node in document.nodes() {
        let Some(mesh) = node.mesh() else { continue };
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&*buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                log::warn!("skipping primitive without positions on node {}", node.index());
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(read) => read.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(read) => read.collect(),
                None => compute_normals(&positions, &indices),
            };
            let base = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();
            primitives.push(PrimitiveData {
                node: node.index(),
                positions,
                normals,
                indices,
                base_color: Vec3::new(base[0], base[1], base[2]),
            });
        }
    }

    let mut clips = Vec::new();
    for (i, animation) in document.animations().enumerate() {
        let mut channels = Vec::new();
        let mut duration: f32 = 0.0;
        for channel in animation.channels() {
            let reader = channel.reader(|buffer| Some(&*buffers[buffer.index()]));
            let Some(inputs) = reader.read_inputs() else { continue };
            let times: Vec<f32> = inputs.collect();
            let Some(outputs) = reader.read_outputs() else { continue };

            let cubic =
                channel.sampler().interpolation() == gltf::animation::Interpolation::CubicSpline;
            let output = match outputs {
                ReadOutputs::Translations(it) => {
                    ChannelOutput::Translations(thin_cubic(it.map(Vec3::from).collect(), cubic))
                }
                ReadOutputs::Rotations(rot) => ChannelOutput::Rotations(thin_cubic(
                    rot.into_f32().map(Quat::from_array).collect(),
                    cubic,
                )),
                ReadOutputs::Scales(it) => {
                    ChannelOutput::Scales(thin_cubic(it.map(Vec3::from).collect(), cubic))
                }
                ReadOutputs::MorphTargetWeights(_) => continue,
            };

            if let Some(&last) = times.last() {
                duration = duration.max(last);
            }
            channels.push(Channel {
                node: channel.target().node().index(),
                interpolation: match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Step => Interpolation::Step,
                    // Cubic tangents are thinned to their value column.
                    _ => Interpolation::Linear,
                },
                times,
                output,
            });
        }
        clips.push(AnimationClip {
            name: animation.name().map(String::from).unwrap_or_else(|| format!("clip {i}")),
            duration,
            channels,
        });
    }

    Ok(LoadedModel {
        nodes,
        primitives,
        clips,
    })
}

/// Cubic-spline samplers store in-tangent / value / out-tangent triples; keep
/// the value column so the rest of the pipeline sees one sample per keyframe.
fn thin_cubic<T>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if !cubic {
        return values;
    }
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| (i % 3 == 1).then_some(v))
        .collect()
}

/// Area-weighted vertex normals for primitives that ship without them.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from(positions[a]);
        let pb = Vec3::from(positions[b]);
        let pc = Vec3::from(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thin_cubic_keeps_the_value_column() {
        let thinned = thin_cubic(vec![0, 1, 2, 10, 11, 12, 20, 21, 22], true);
        assert_eq!(thinned, vec![1, 11, 21]);
        assert_eq!(thin_cubic(vec![1, 2, 3], false), vec![1, 2, 3]);
    }

    #[test]
    fn computed_normals_face_out_of_the_triangle() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        for n in normals {
            assert!((Vec3::from(n) - Vec3::Y).length() < 1e-5);
        }
    }
}
