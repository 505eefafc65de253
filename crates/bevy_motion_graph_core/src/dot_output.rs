use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::motion_graph::MotionGraph;

/// Graphviz export.
pub trait ToDot {
    fn to_dot(&self, f: &mut impl Write) -> std::io::Result<()>;

    fn dot_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_dot(&mut writer)?;
        writer.flush()
    }

    fn dot_to_stdout(&self) -> std::io::Result<()> {
        let mut stdout = std::io::stdout();
        self.to_dot(&mut stdout)
    }
}

impl ToDot for MotionGraph {
    /// Playable nodes grouped by source clip. Backbone edges are solid, similarity edges
    /// dashed.
    fn to_dot(&self, f: &mut impl Write) -> std::io::Result<()> {
        writeln!(f, "digraph motion_graph {{")?;
        writeln!(f, "\trankdir=LR;")?;
        writeln!(f, "\tnode [shape=circle];")?;

        let mut clip = None;
        for &frame in self.playable_set() {
            let Some(node) = self.node(frame) else {
                continue;
            };
            if clip != Some(node.source_sequence_id) {
                if clip.is_some() {
                    writeln!(f, "\t}}")?;
                }
                clip = Some(node.source_sequence_id);
                writeln!(f, "\tsubgraph cluster_{} {{", node.source_sequence_id)?;
                writeln!(f, "\t\tlabel=\"clip {}\";", node.source_sequence_id)?;
            }
            writeln!(f, "\t\t{frame};")?;
        }
        if clip.is_some() {
            writeln!(f, "\t}}")?;
        }

        for (from, to) in self.edges() {
            let backbone = match (self.node(from), self.node(to)) {
                (Some(a), Some(b)) => a.is_followed_by(&b),
                _ => false,
            };
            if backbone {
                writeln!(f, "\t{from} -> {to};")?;
            } else {
                writeln!(f, "\t{from} -> {to} [style=dashed];")?;
            }
        }

        writeln!(f, "}}")?;

        Ok(())
    }
}
