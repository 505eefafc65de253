use serde::{Deserialize, Serialize};

use crate::{contact::ContactSignal, pose::PoseLayout};

/// Dense node key, also used as the graph vertex id.
pub type FrameId = usize;

/// Arena of all graph nodes. Pose and velocity data live in flat buffers with one
/// [`PoseLayout`]-sized stride per node, indexed by [`FrameId`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "NodeBuffers")]
pub struct NodeTable {
    layout: PoseLayout,
    poses: Vec<f32>,
    velocities: Vec<f32>,
    contacts: Vec<ContactSignal>,
    sequences: Vec<usize>,
}

/// Unchecked serialized form of a [`NodeTable`].
#[derive(Deserialize)]
struct NodeBuffers {
    layout: PoseLayout,
    poses: Vec<f32>,
    velocities: Vec<f32>,
    contacts: Vec<ContactSignal>,
    sequences: Vec<usize>,
}

impl TryFrom<NodeBuffers> for NodeTable {
    type Error = String;

    fn try_from(buffers: NodeBuffers) -> Result<Self, Self::Error> {
        let nodes = buffers.contacts.len();
        let expected = nodes * buffers.layout.len();
        if buffers.poses.len() != expected || buffers.velocities.len() != expected {
            return Err(format!(
                "{} nodes of {} values need {} pose and velocity values, found {} and {}",
                nodes,
                buffers.layout.len(),
                expected,
                buffers.poses.len(),
                buffers.velocities.len()
            ));
        }
        if buffers.sequences.len() != nodes {
            return Err(format!(
                "{} nodes need as many sequence ids, found {}",
                nodes,
                buffers.sequences.len()
            ));
        }
        Ok(Self {
            layout: buffers.layout,
            poses: buffers.poses,
            velocities: buffers.velocities,
            contacts: buffers.contacts,
            sequences: buffers.sequences,
        })
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'a> {
    pub frame_id: FrameId,
    pub source_sequence_id: usize,
    pub pose: &'a [f32],
    pub velocity: &'a [f32],
    pub contact: ContactSignal,
}

impl NodeRef<'_> {
    /// Whether `other` is the frame captured right after this one in the same clip.
    pub fn is_followed_by(&self, other: &NodeRef) -> bool {
        self.source_sequence_id == other.source_sequence_id && other.frame_id == self.frame_id + 1
    }
}

impl NodeTable {
    pub fn new(layout: PoseLayout) -> Self {
        Self {
            layout,
            poses: Vec::new(),
            velocities: Vec::new(),
            contacts: Vec::new(),
            sequences: Vec::new(),
        }
    }

    /// Appends a node and returns its id. Nodes of one clip must be pushed consecutively.
    pub(crate) fn push(
        &mut self,
        source_sequence_id: usize,
        pose: &[f32],
        velocity: &[f32],
        contact: ContactSignal,
    ) -> FrameId {
        debug_assert_eq!(pose.len(), self.layout.len());
        debug_assert_eq!(velocity.len(), self.layout.len());

        let id = self.contacts.len();
        self.poses.extend_from_slice(pose);
        self.velocities.extend_from_slice(velocity);
        self.contacts.push(contact);
        self.sequences.push(source_sequence_id);
        id
    }

    pub fn layout(&self) -> PoseLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn get(&self, frame_id: FrameId) -> Option<NodeRef<'_>> {
        let contact = *self.contacts.get(frame_id)?;
        let stride = self.layout.len();
        let range = frame_id * stride..(frame_id + 1) * stride;
        Some(NodeRef {
            frame_id,
            source_sequence_id: *self.sequences.get(frame_id)?,
            pose: self.poses.get(range.clone())?,
            velocity: self.velocities.get(range)?,
            contact,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.len()).filter_map(|id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_are_numbered_densely() {
        let layout = PoseLayout::new(1);
        let mut table = NodeTable::new(layout);
        let pose = vec![1.; layout.len()];
        let velocity = vec![2.; layout.len()];

        let a = table.push(0, &pose, &velocity, ContactSignal::default());
        let b = table.push(0, &pose, &velocity, ContactSignal::default());
        let c = table.push(1, &pose, &velocity, ContactSignal::default());

        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(table.len(), 3);

        let node_a = table.get(a).unwrap();
        let node_b = table.get(b).unwrap();
        let node_c = table.get(c).unwrap();
        assert!(node_a.is_followed_by(&node_b));
        assert!(!node_b.is_followed_by(&node_c));
        assert_eq!(node_c.velocity, velocity.as_slice());
        assert!(table.get(3).is_none());
    }

    #[test]
    fn deserialization_checks_buffer_lengths() {
        let layout = PoseLayout::new(1);
        let mut table = NodeTable::new(layout);
        let pose = vec![0.5; layout.len()];
        table.push(0, &pose, &pose, ContactSignal::from([1., -1., 0., 0.]));
        table.push(0, &pose, &pose, ContactSignal::default());

        let text = ron::to_string(&table).unwrap();
        assert_eq!(ron::from_str::<NodeTable>(&text).unwrap(), table);

        let truncated = r#"(
            layout: (joint_count: 1),
            poses: [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            velocities: [],
            contacts: [(left_velocity: 0.0, right_velocity: 0.0, left_height: 0.0, right_height: 0.0)],
            sequences: [0],
        )"#;
        assert!(ron::from_str::<NodeTable>(truncated).is_err());

        let missing_sequence = r#"(
            layout: (joint_count: 1),
            poses: [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            velocities: [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
            contacts: [(left_velocity: 0.0, right_velocity: 0.0, left_height: 0.0, right_height: 0.0)],
            sequences: [],
        )"#;
        assert!(ron::from_str::<NodeTable>(missing_sequence).is_err());
    }
}
