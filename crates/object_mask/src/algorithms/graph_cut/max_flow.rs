//! s-t minimum cut via Dinic's blocking-flow max-flow.

use std::collections::VecDeque;

/// Residual capacities below this are treated as saturated.
const EPSILON: f64 = 1e-9;
const UNREACHED: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Arc {
    to: u32,
    capacity: f64,
}

/// Flow network with `n` inner nodes plus a source and a sink terminal.
///
/// Arcs are stored in pairs, so the reverse of arc `a` is `a ^ 1`.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    arcs: Vec<Arc>,
    adjacency: Vec<Vec<u32>>,
    level: Vec<u32>,
    cursor: Vec<usize>,
    source: usize,
    sink: usize,
}

impl FlowNetwork {
    pub fn new(nodes: usize) -> Self {
        let total = nodes + 2;
        Self {
            arcs: Vec::new(),
            adjacency: vec![Vec::new(); total],
            level: vec![UNREACHED; total],
            cursor: vec![0; total],
            source: nodes,
            sink: nodes + 1,
        }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        let mut network = Self::new(nodes);
        network.arcs.reserve(edges * 2);
        network
    }

    /// Edge between two inner nodes with independent capacities per direction
    pub fn add_edge(&mut self, from: usize, to: usize, capacity: f64, reverse_capacity: f64) {
        let index = self.arcs.len() as u32;
        self.arcs.push(Arc { to: to as u32, capacity });
        self.arcs.push(Arc { to: from as u32, capacity: reverse_capacity });
        self.adjacency[from].push(index);
        self.adjacency[to].push(index + 1);
    }

    /// Terminal links of `node`. Only the difference matters for the cut, so a
    /// single arc carrying it is added.
    pub fn add_terminal_weights(&mut self, node: usize, source_capacity: f64, sink_capacity: f64) {
        let delta = source_capacity - sink_capacity;
        if delta > 0.0 {
            self.add_edge(self.source, node, delta, 0.0);
        } else if delta < 0.0 {
            self.add_edge(node, self.sink, -delta, 0.0);
        }
    }

    /// Saturate the network and return the total flow pushed.
    pub fn max_flow(&mut self) -> f64 {
        let mut flow = 0.0;
        while self.build_levels() {
            self.cursor.fill(0);
            flow += self.blocking_flow();
        }
        flow
    }

    /// After `max_flow`: whether each inner node stays connected to the source.
    pub fn source_side(&self) -> Vec<bool> {
        let mut seen = vec![false; self.adjacency.len()];
        let mut queue = VecDeque::from([self.source]);
        seen[self.source] = true;

        while let Some(node) = queue.pop_front() {
            for &a in &self.adjacency[node] {
                let arc = self.arcs[a as usize];
                let next = arc.to as usize;
                if arc.capacity > EPSILON && !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }

        seen.truncate(self.source);
        seen
    }

    fn build_levels(&mut self) -> bool {
        self.level.fill(UNREACHED);
        self.level[self.source] = 0;
        let mut queue = VecDeque::from([self.source]);

        while let Some(node) = queue.pop_front() {
            for &a in &self.adjacency[node] {
                let arc = self.arcs[a as usize];
                let next = arc.to as usize;
                if arc.capacity > EPSILON && self.level[next] == UNREACHED {
                    self.level[next] = self.level[node] + 1;
                    queue.push_back(next);
                }
            }
        }
        self.level[self.sink] != UNREACHED
    }

    /// Saturate every source-sink path of the current level graph.
    ///
    /// After each augmentation the walk only retreats to the tail of the first
    /// saturated arc, so the unsaturated prefix of the path is reused.
    fn blocking_flow(&mut self) -> f64 {
        let mut total = 0.0;
        let mut path: Vec<usize> = Vec::new();
        let mut node = self.source;

        loop {
            if node == self.sink {
                let bottleneck = path
                    .iter()
                    .map(|&a| self.arcs[a].capacity)
                    .fold(f64::INFINITY, f64::min);
                for &a in &path {
                    self.arcs[a].capacity -= bottleneck;
                    self.arcs[a ^ 1].capacity += bottleneck;
                }
                total += bottleneck;

                let saturated = path
                    .iter()
                    .position(|&a| self.arcs[a].capacity <= EPSILON)
                    .unwrap_or(0);
                path.truncate(saturated);
                node = match path.last() {
                    Some(&a) => self.arcs[a].to as usize,
                    None => self.source,
                };
                continue;
            }

            let mut advanced = false;
            while self.cursor[node] < self.adjacency[node].len() {
                let a = self.adjacency[node][self.cursor[node]] as usize;
                let arc = self.arcs[a];
                let next = arc.to as usize;
                if arc.capacity > EPSILON
                    && self.level[next] != UNREACHED
                    && self.level[next] == self.level[node] + 1
                {
                    path.push(a);
                    node = next;
                    advanced = true;
                    break;
                }
                self.cursor[node] += 1;
            }

            if !advanced {
                // dead end: prune it from the level graph and step back
                self.level[node] = UNREACHED;
                let Some(a) = path.pop() else {
                    return total;
                };
                node = self.arcs[a ^ 1].to as usize;
                self.cursor[node] += 1;
            }
        }
    }
}
