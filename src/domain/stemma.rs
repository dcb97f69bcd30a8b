use petgraph::graph::DiGraph;

/// A local stemma: a directed graph over the readings of one variation unit.
///
/// Each node is labelled with a reading identifier. Edges encode the
/// hypothesized genealogical relationships between readings; they are
/// drawn later by the editor, so a freshly seeded stemma has none.
#[derive(Debug, Clone, Default)]
pub struct LocalStemma {
    graph: DiGraph<String, ()>,
}

impl LocalStemma {
    /// Seeds a stemma with one node per reading identifier and no edges.
    ///
    /// Identifiers keep their order; duplicates are kept as separate nodes so
    /// that the graph mirrors the apparatus exactly.
    pub fn seed<I, S>(readings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = DiGraph::new();
        for reading in readings {
            graph.add_node(reading.into());
        }
        Self { graph }
    }

    /// Iterates the reading identifiers in insertion order.
    pub fn readings(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.raw_nodes().iter().map(|node| node.weight.as_str())
    }

    /// Returns the number of readings.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of derivation edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
