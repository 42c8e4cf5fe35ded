//! Parameter groups, the control table the panel binds to, and the value
//! plumbing between them. Every user-tunable number in the stage lives in one
//! of these structs; nothing else in the crate stores a second copy.

use glam::Vec3;

/// The parameter groups the configurator owns.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GroupId {
    LightRig,
    Ambient,
    Environment,
    Ground,
    Animation,
}

/// Keys are shared across groups; a `(GroupId, ParamKey)` pair names one
/// stored parameter.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParamKey {
    Angle,
    Radius,
    Height,
    Intensity,
    LightColor,
    Helpers,
    Rotation,
    Exposure,
    Opacity,
    Visible,
    Blur,
    MaxDistance,
    Fresnel,
    DistanceAttenuation,
    Frame,
    Playing,
}

/// A value arriving from (or reported to) the control surface.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ParamValue {
    Scalar(f32),
    Flag(bool),
    Color(Vec3),
}

/// What kind of widget a control is, with the declared range for scalars.
/// Out-of-range scalars are clamped to `[min, max]`, never rejected.
#[derive(Clone, Copy, Debug)]
pub enum ControlKind {
    Scalar { min: f32, max: f32, step: f32 },
    Toggle,
    Color,
}

/// One row of the control surface.
pub struct Control {
    pub group: GroupId,
    pub key: ParamKey,
    pub label: &'static str,
    pub kind: ControlKind,
}

impl Control {
    fn scalar(group: GroupId, key: ParamKey, label: &'static str, min: f32, max: f32, step: f32) -> Self {
        Self { group, key, label, kind: ControlKind::Scalar { min, max, step } }
    }

    fn toggle(group: GroupId, key: ParamKey, label: &'static str) -> Self {
        Self { group, key, label, kind: ControlKind::Toggle }
    }

    fn color(group: GroupId, key: ParamKey, label: &'static str) -> Self {
        Self { group, key, label, kind: ControlKind::Color }
    }
}

/// Scrub range shown before any clip has loaded.
pub const PLACEHOLDER_FRAME_MAX: f32 = 100.0;

/// The full control surface, in panel display order.
pub fn control_table() -> Vec<Control> {
    use GroupId::*;
    use ParamKey::*;
    vec![
        Control::scalar(LightRig, Angle, "light angle", 0.0, 360.0, 1.0),
        Control::scalar(LightRig, Radius, "light radius", 1.0, 10.0, 0.1),
        Control::scalar(LightRig, Height, "light height", -5.0, 10.0, 0.1),
        Control::scalar(LightRig, Intensity, "light intensity", 0.0, 3.0, 0.01),
        Control::color(LightRig, LightColor, "light color"),
        Control::toggle(LightRig, Helpers, "light helpers"),
        Control::scalar(Ambient, Intensity, "ambient intensity", 0.0, 2.0, 0.01),
        Control::color(Ambient, LightColor, "ambient color"),
        Control::scalar(Environment, Rotation, "env rotation", 0.0, 360.0, 1.0),
        Control::scalar(Environment, Exposure, "env exposure", 0.0, 4.0, 0.01),
        Control::toggle(Ground, Visible, "ground mirror"),
        Control::scalar(Ground, Opacity, "mirror opacity", 0.0, 1.0, 0.01),
        Control::scalar(Ground, Blur, "mirror blur", 0.0, 8.0, 0.1),
        Control::scalar(Ground, MaxDistance, "mirror distance", 1.0, 50.0, 0.5),
        Control::scalar(Ground, Fresnel, "mirror fresnel", 0.0, 1.0, 0.01),
        Control::toggle(Ground, DistanceAttenuation, "distance falloff"),
        Control::scalar(Animation, Frame, "clip frame", 0.0, PLACEHOLDER_FRAME_MAX, 1.0),
        Control::toggle(Animation, Playing, "clip playing"),
    ]
}

/// Base orbit parameters shared by the whole light rig.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRigParams {
    pub angle_deg: f32,
    pub radius: f32,
    pub height: f32,
    pub intensity: f32,
    pub color: Vec3,
    pub helpers: bool,
}

impl Default for LightRigParams {
    fn default() -> Self {
        Self {
            angle_deg: 0.0,
            radius: 5.0,
            height: 2.0,
            intensity: 1.0,
            color: Vec3::ONE,
            helpers: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AmbientParams {
    pub intensity: f32,
    pub color: Vec3,
}

impl Default for AmbientParams {
    fn default() -> Self {
        Self {
            intensity: 0.5,
            color: Vec3::ONE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentParams {
    pub rotation_deg: f32,
    pub exposure: f32,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            rotation_deg: 0.0,
            exposure: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroundParams {
    pub opacity: f32,
    pub visible: bool,
    pub blur: f32,
    pub max_distance: f32,
    pub fresnel: f32,
    pub distance_attenuation: bool,
}

impl Default for GroundParams {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            visible: true,
            blur: 2.0,
            max_distance: 15.0,
            fresnel: 0.5,
            distance_attenuation: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct AnimationParams {
    pub frame: f32,
    pub playing: bool,
}

/// Parse a `#rrggbb` (or bare `rrggbb`) hex color into linear-ish RGB.
pub fn parse_hex(hex: &str) -> Option<Vec3> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let r = ((value >> 16) & 0xff) as f32 / 255.0;
    let g = ((value >> 8) & 0xff) as f32 / 255.0;
    let b = (value & 0xff) as f32 / 255.0;
    Some(Vec3::new(r, g, b))
}

/// Format a color back to `#rrggbb` for panel display.
pub fn format_hex(color: Vec3) -> String {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    format!("#{:02x}{:02x}{:02x}", to_byte(color.x), to_byte(color.y), to_byte(color.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_prefixed_and_bare() {
        let gold = parse_hex("#ffcc00").unwrap();
        assert!((gold.x - 1.0).abs() < 1e-6);
        assert!((gold.y - 0.8).abs() < 0.01);
        assert!(gold.z.abs() < 1e-6);
        assert_eq!(parse_hex("ffcc00"), parse_hex("#ffcc00"));
    }

    #[test]
    fn parse_hex_rejects_malformed_input() {
        assert!(parse_hex("#fff").is_none());
        assert!(parse_hex("#zzzzzz").is_none());
        assert!(parse_hex("").is_none());
    }

    #[test]
    fn hex_round_trips_through_format() {
        for hex in ["#000000", "#ffffff", "#8040c0"] {
            assert_eq!(format_hex(parse_hex(hex).unwrap()), hex);
        }
    }

    #[test]
    fn control_table_covers_every_group() {
        let table = control_table();
        for group in [
            GroupId::LightRig,
            GroupId::Ambient,
            GroupId::Environment,
            GroupId::Ground,
            GroupId::Animation,
        ] {
            assert!(table.iter().any(|c| c.group == group), "{group:?} has no controls");
        }
    }
}
