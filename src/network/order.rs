//! Topological orders and logic levels

use log::debug;

use crate::Network;

impl Network {
    /// Logic nodes in topological order: every node appears after its fanins
    ///
    /// Nodes are discovered breadth-first from the inputs.
    pub fn sort(&self) -> Vec<usize> {
        let mut ret = Vec::with_capacity(self.nb_logic());
        let mut visited = vec![false; self.max_node_id()];
        for &i in self.inputs() {
            visited[i] = true;
            self.sort_fanouts(i, &mut visited, &mut ret);
        }
        let mut rpos = 0;
        while rpos < ret.len() {
            self.sort_fanouts(ret[rpos], &mut visited, &mut ret);
            rpos += 1;
        }
        assert_eq!(
            ret.len(),
            self.nb_logic(),
            "Unable to sort the logic: the network has a combinational loop"
        );
        ret
    }

    /// Admit the logic fanouts of a node whose fanins have all been visited
    fn sort_fanouts(&self, id: usize, visited: &mut [bool], ret: &mut Vec<usize>) {
        for e in self.node(id).fanouts() {
            let n = self.node(e.to);
            if !visited[e.to] && n.is_logic() && visited[n.fanin0()] && visited[n.fanin1()] {
                visited[e.to] = true;
                ret.push(e.to);
            }
        }
    }

    /// Logic nodes in reverse topological order: every node appears after its fanouts
    ///
    /// Nodes are discovered breadth-first from the outputs and from the logic nodes that
    /// drive nothing.
    pub fn rsort(&self) -> Vec<usize> {
        let mut ret = Vec::with_capacity(self.nb_logic());
        let mut visited = vec![false; self.max_node_id()];
        for &o in self.outputs() {
            visited[o] = true;
        }
        for &o in self.outputs() {
            if let Some(i) = self.node(o).output_fanin() {
                self.rsort_visit(i, &mut visited, &mut ret);
            }
        }
        for &l in self.logic_nodes() {
            if self.node(l).fanout_num() == 0 {
                self.rsort_visit(l, &mut visited, &mut ret);
            }
        }
        let mut rpos = 0;
        while rpos < ret.len() {
            let n = self.node(ret[rpos]);
            self.rsort_visit(n.fanin0(), &mut visited, &mut ret);
            self.rsort_visit(n.fanin1(), &mut visited, &mut ret);
            rpos += 1;
        }
        assert_eq!(
            ret.len(),
            self.nb_logic(),
            "Unable to sort the logic: the network has a combinational loop"
        );
        ret
    }

    /// Admit a logic node whose fanouts have all been visited
    fn rsort_visit(&self, id: usize, visited: &mut [bool], ret: &mut Vec<usize>) {
        let n = self.node(id);
        if visited[id] || !n.is_logic() {
            return;
        }
        if n.fanouts().iter().all(|e| visited[e.to]) {
            visited[id] = true;
            ret.push(id);
        }
    }

    /// Maximum logic depth of the outputs
    ///
    /// Inputs are at level 0 and each logic node is one level above its deepest fanin.
    /// The result is cached until the next structural change.
    pub fn level(&self) -> usize {
        if let Some(l) = self.level.get() {
            return l;
        }
        for &i in self.inputs() {
            self.node(i).level.set(Some(0));
        }
        for id in self.sort() {
            let n = self.node(id);
            let l = 1 + self.cached_level(n.fanin0()).max(self.cached_level(n.fanin1()));
            n.level.set(Some(l));
        }
        let mut max_level = 0;
        for &o in self.outputs() {
            let n = self.node(o);
            let l = n.output_fanin().map_or(0, |i| self.cached_level(i));
            n.level.set(Some(l));
            max_level = max_level.max(l);
        }
        debug!("Computed network level {max_level}");
        self.level.set(Some(max_level));
        max_level
    }

    /// Logic level of a node; for outputs, the level of their fanin
    pub fn node_level(&self, id: usize) -> usize {
        self.level();
        self.cached_level(id)
    }

    fn cached_level(&self, id: usize) -> usize {
        match self.node(id).level.get() {
            Some(l) => l,
            None => panic!("Level of node {id} is not computed"),
        }
    }
}
