use crate::{
    config::MotionGraphConfig, contact::is_admissible, node_table::NodeRef, pose::PoseLayout,
};

/// Squared magnitude of the per-joint rotation residual between two poses. Each joint
/// contributes `acos(w)` of the normalized `to * inverse(from)` difference.
pub fn pose_distance(layout: &PoseLayout, from: &[f32], to: &[f32]) -> f32 {
    (0..layout.joint_count())
        .map(|joint| {
            let difference =
                (layout.rotation(to, joint) * layout.rotation(from, joint).inverse()).normalize();
            difference.w.clamp(-1., 1.).acos()
        })
        .map(|residual| residual * residual)
        .sum()
}

/// Euclidean distance between two full velocity vectors.
pub fn velocity_distance(from: &[f32], to: &[f32]) -> f32 {
    from.iter()
        .zip(to)
        .map(|(a, b)| (b - a) * (b - a))
        .sum::<f32>()
        .sqrt()
}

/// The "motion field" measure: pose distance plus weighted velocity distance.
pub fn motion_field_distance(
    layout: &PoseLayout,
    from: &NodeRef,
    to: &NodeRef,
    velocity_weight: f32,
) -> f32 {
    pose_distance(layout, from.pose, to.pose)
        + velocity_weight * velocity_distance(from.velocity, to.velocity)
}

/// Outcome of evaluating one ordered node pair as a candidate transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PairVerdict {
    /// `to` is the next captured frame of `from`'s clip. Always an edge.
    Backbone,
    /// Compatible contact phases and a combined distance under the threshold.
    Similar(f32),
    /// Contact phases do not line up.
    IncompatibleContact,
    /// Compatible contact phases, but the poses are too far apart.
    Dissimilar(f32),
    /// `from` and `to` are the same node.
    SameNode,
}

impl PairVerdict {
    pub fn is_edge(&self) -> bool {
        matches!(self, PairVerdict::Backbone | PairVerdict::Similar(_))
    }
}

/// Decides whether `from -> to` becomes a candidate edge. Depends on nothing but its
/// arguments, so pairs can be evaluated in any order and on any thread.
pub fn evaluate_pair(
    layout: &PoseLayout,
    from: &NodeRef,
    to: &NodeRef,
    config: &MotionGraphConfig,
) -> PairVerdict {
    if from.frame_id == to.frame_id {
        return PairVerdict::SameNode;
    }
    if from.is_followed_by(to) {
        return PairVerdict::Backbone;
    }
    if !is_admissible(&from.contact, &to.contact) {
        return PairVerdict::IncompatibleContact;
    }
    let distance = motion_field_distance(layout, from, to, config.velocity_weight);
    if distance < config.similarity_threshold {
        PairVerdict::Similar(distance)
    } else {
        PairVerdict::Dissimilar(distance)
    }
}
