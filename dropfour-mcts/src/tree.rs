//! MCTS Tree structure and node management
//!
//! Uses arena allocation: every node lives in one `Vec`, children are held
//! as indices and the parent link is an index used only to walk upwards.
//! Dropping the tree releases the whole search at once.
//!
//! ## Architecture
//! - Level 2: Tree operations (select, expand, backpropagate, best_move)
//! - Level 3: UCB1 calculation, node accessors
//! - Level 4: Statistics, utilities

use dropfour_core::{GameError, GameState, Outcome};
use rand::prelude::*;

use crate::MctsError;

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Statistics for a tree node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Simulations that passed through this node (N)
    pub visits: u32,
    /// Simulations won by the player marked active in this node's state (U)
    pub wins: u32,
}

impl NodeStats {
    /// U / N, zero before the first visit
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins as f64 / self.visits as f64
        }
    }
}

/// UCB1 = U/N + C * sqrt(ln(parent N) / N), +inf while N = 0
pub fn ucb1(stats: &NodeStats, parent_visits: u32, exploration: f64) -> f64 {
    if stats.visits == 0 {
        return f64::INFINITY;
    }

    let visits = stats.visits as f64;
    let exploration_term = exploration * ((parent_visits as f64).ln() / visits).sqrt();

    stats.win_rate() + exploration_term
}

/// A node in the MCTS tree
#[derive(Clone, Debug)]
pub struct Node<G: GameState> {
    /// Independent snapshot of the position
    pub state: G,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Move that led to this node (None for root)
    pub incoming_move: Option<G::Move>,
    /// Children keyed by move, in legal-move order
    pub children: Vec<(G::Move, NodeId)>,
    /// Visit/win statistics
    pub stats: NodeStats,
    /// Cached selection score, refreshed during backpropagation
    pub score: f64,
}

impl<G: GameState> Node<G> {
    /// Create a new, unvisited node
    pub fn new(state: G, parent: Option<NodeId>, incoming_move: Option<G::Move>) -> Self {
        Self {
            state,
            parent,
            incoming_move,
            children: Vec::new(),
            stats: NodeStats::default(),
            score: f64::INFINITY,
        }
    }

    /// Has this node been expanded?
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Has this node been visited?
    pub fn is_visited(&self) -> bool {
        self.stats.visits > 0
    }
}

// ============================================================================
// SEARCH TREE (Level 2 - Tree Operations)
// ============================================================================

/// MCTS search tree with arena allocation
#[derive(Clone, Debug)]
pub struct SearchTree<G: GameState> {
    /// Arena storage for nodes
    nodes: Vec<Node<G>>,
    /// Exploration constant C
    exploration: f64,
}

impl<G: GameState> SearchTree<G> {
    /// Create a new tree with the given root state
    pub fn new(root_state: G, exploration: f64) -> Self {
        Self {
            nodes: vec![Node::new(root_state, None, None)],
            exploration,
        }
    }

    /// Get the root node id
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a reference to a node
    pub fn get(&self, id: NodeId) -> &Node<G> {
        &self.nodes[id.0]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<G> {
        &mut self.nodes[id.0]
    }

    /// Get the number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in allocation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<G>)> + '_ {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// `id` followed by each of its ancestors up to and including the root
    pub fn path_to_root(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&current| self.get(current).parent)
    }

    // ========================================================================
    // Level 2: Selection
    // ========================================================================

    /// Descend from the root by cached score until a node with no children.
    ///
    /// Unvisited children score +inf, so every sibling is tried once before
    /// any of them is exploited.
    pub fn select<R: Rng>(&self, rng: &mut R) -> NodeId {
        let mut current = self.root();

        while let Some(best_child) = self.select_best_child(current, rng) {
            current = best_child;
        }

        current
    }

    // ========================================================================
    // Level 2: Expansion
    // ========================================================================

    /// Grow the tree below the selected leaf.
    ///
    /// Returns the node to simulate: the leaf itself when it is terminal or
    /// when it is a non-root node that has not been rolled out yet, otherwise
    /// the first of the freshly attached children.
    pub fn expand(&mut self, leaf_id: NodeId) -> Result<NodeId, GameError> {
        let is_root = leaf_id == self.root();
        let leaf = self.get(leaf_id);
        debug_assert!(leaf.is_leaf(), "expand called on an expanded node");

        if leaf.state.is_terminal() {
            return Ok(leaf_id);
        }

        let legal_moves = leaf.state.legal_moves();
        if legal_moves.is_empty() {
            return Ok(leaf_id);
        }

        if !leaf.is_visited() && !is_root {
            return Ok(leaf_id);
        }

        // The root already names the player to move; deeper nodes name the
        // player who moved into them, so the turn passes first.
        let first_id = NodeId(self.nodes.len());
        let mut new_nodes = Vec::with_capacity(legal_moves.len());
        let mut children = Vec::with_capacity(legal_moves.len());
        for (i, mv) in legal_moves.into_iter().enumerate() {
            let mut child_state = leaf.state.clone();
            if !is_root {
                child_state.switch_player();
            }
            child_state.apply_move(mv)?;
            new_nodes.push(Node::new(child_state, Some(leaf_id), Some(mv)));
            children.push((mv, NodeId(first_id.0 + i)));
        }

        self.nodes.extend(new_nodes);
        self.get_mut(leaf_id).children = children;

        Ok(first_id)
    }

    // ========================================================================
    // Level 2: Backpropagation
    // ========================================================================

    /// Record a simulation result from `node_id` up to the root.
    ///
    /// Pass 1 bumps N everywhere on the path and U wherever the winner is the
    /// player marked in that node's own state. Pass 2 refreshes cached scores
    /// on the same path; the root's score is never compared and stays as is.
    pub fn backpropagate(&mut self, node_id: NodeId, outcome: Outcome) {
        let mut current = Some(node_id);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.stats.visits += 1;
            if outcome.favors(node.state.current_player()) {
                node.stats.wins += 1;
            }
            current = node.parent;
        }

        let exploration = self.exploration;
        let mut current = node_id;
        while let Some(parent_id) = self.get(current).parent {
            let parent_visits = self.get(parent_id).stats.visits;
            let node = self.get_mut(current);
            node.score = ucb1(&node.stats, parent_visits, exploration);
            current = parent_id;
        }
    }

    // ========================================================================
    // Level 3: Selection Helpers
    // ========================================================================

    /// Highest cached score among children, ties broken uniformly
    fn select_best_child<R: Rng>(&self, node_id: NodeId, rng: &mut R) -> Option<NodeId> {
        let children = &self.get(node_id).children;

        let best_score = children
            .iter()
            .map(|(_, id)| self.get(*id).score)
            .fold(f64::NEG_INFINITY, f64::max);

        let tied: Vec<NodeId> = children
            .iter()
            .filter(|(_, id)| self.get(*id).score == best_score)
            .map(|(_, id)| *id)
            .collect();

        tied.choose(rng).copied()
    }

    // ========================================================================
    // Level 3: Best Move Selection
    // ========================================================================

    /// Move of the most visited root child, ties broken uniformly.
    ///
    /// Fails with [`MctsError::EmptyDecision`] when the root was never
    /// expanded, which only happens when the root position is terminal.
    pub fn best_move<R: Rng>(&self, rng: &mut R) -> Result<G::Move, MctsError> {
        let root = self.get(self.root());

        let max_visits = root
            .children
            .iter()
            .map(|(_, id)| self.get(*id).stats.visits)
            .max()
            .ok_or(MctsError::EmptyDecision)?;

        let tied: Vec<G::Move> = root
            .children
            .iter()
            .filter(|(_, id)| self.get(*id).stats.visits == max_visits)
            .map(|(mv, _)| *mv)
            .collect();

        tied.choose(rng).copied().ok_or(MctsError::EmptyDecision)
    }

    /// Get all root moves with their statistics (for analysis)
    pub fn move_statistics(&self) -> Vec<MoveStatistics<G::Move>> {
        let root = self.get(self.root());

        root.children
            .iter()
            .map(|(mv, id)| {
                let node = self.get(*id);
                MoveStatistics {
                    mv: *mv,
                    visits: node.stats.visits,
                    wins: node.stats.wins,
                    win_rate: node.stats.win_rate(),
                    score: node.score,
                }
            })
            .collect()
    }

    /// Get total simulations run (root visits)
    pub fn total_simulations(&self) -> u32 {
        self.get(self.root()).stats.visits
    }
}

// ============================================================================
// STATISTICS (Level 4)
// ============================================================================

/// Statistics for a single move at root
#[derive(Clone, Debug, PartialEq)]
pub struct MoveStatistics<M> {
    pub mv: M,
    pub visits: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub score: f64,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dropfour_core::{Cell, Connect4, Player};
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    const C: f64 = std::f64::consts::SQRT_2;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    /// Position after the given columns, player to move active
    fn position(columns: &[usize]) -> Connect4 {
        let mut game = Connect4::default();
        for &column in columns {
            game.apply_move(column).unwrap();
            game.switch_player();
        }
        game
    }

    #[test]
    fn test_node_creation() {
        let node = Node::new(Connect4::default(), None, None);

        assert!(node.parent.is_none());
        assert!(node.incoming_move.is_none());
        assert!(node.is_leaf());
        assert_eq!(node.stats, NodeStats::default());
        assert!(node.score.is_infinite());
    }

    #[test]
    fn test_tree_creation() {
        let tree = SearchTree::new(Connect4::default(), C);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);
        assert_eq!(tree.total_simulations(), 0);
    }

    #[test]
    fn test_node_stats_win_rate() {
        let mut stats = NodeStats::default();
        assert_eq!(stats.win_rate(), 0.0);

        stats.visits = 10;
        stats.wins = 7;
        assert!((stats.win_rate() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_ucb1_unexplored() {
        assert!(ucb1(&NodeStats::default(), 100, C).is_infinite());
    }

    #[test]
    fn test_ucb1_value() {
        let stats = NodeStats { visits: 4, wins: 3 };
        let expected = 0.75 + C * ((10f64).ln() / 4.0).sqrt();
        assert!((ucb1(&stats, 10, C) - expected).abs() < 1e-12);

        // ln(1) = 0 leaves only the win rate
        let stats = NodeStats { visits: 1, wins: 1 };
        assert_eq!(ucb1(&stats, 1, C), 1.0);
    }

    #[test]
    fn test_expand_root_creates_all_children() {
        let mut tree = SearchTree::new(Connect4::default(), C);

        let first = tree.expand(NodeId::ROOT).unwrap();
        assert_eq!(tree.len(), 8);
        assert_eq!(first, NodeId(1));

        let root = tree.get(NodeId::ROOT);
        let moves: Vec<usize> = root.children.iter().map(|(mv, _)| *mv).collect();
        assert_eq!(moves, vec![0, 1, 2, 3, 4, 5, 6]);

        // Root children keep the root's marker: player one moved into them
        for (mv, id) in &root.children {
            let child = tree.get(*id);
            assert_eq!(*id, NodeId(mv + 1));
            assert_eq!(child.parent, Some(NodeId::ROOT));
            assert_eq!(child.incoming_move, Some(*mv));
            assert_eq!(child.state.current_player(), Player::One);
            assert_eq!(child.state.cell(5, *mv), Cell::One);
            assert!(child.score.is_infinite());
        }

        // The root snapshot is untouched
        assert_eq!(tree.get(NodeId::ROOT).state, Connect4::default());
    }

    #[test]
    fn test_expand_unvisited_non_root_returns_itself() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        let child = tree.expand(NodeId::ROOT).unwrap();

        assert_eq!(tree.expand(child).unwrap(), child);
        assert!(tree.get(child).is_leaf());
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn test_expand_visited_non_root_switches_player() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        let child = tree.expand(NodeId::ROOT).unwrap();
        tree.backpropagate(child, Outcome::Draw);

        let grandchild = tree.expand(child).unwrap();
        assert_eq!(tree.len(), 15);

        let node = tree.get(grandchild);
        assert_eq!(node.parent, Some(child));
        assert_eq!(node.state.current_player(), Player::Two);
        // Column 0 now holds player one at the bottom and player two above
        assert_eq!(node.state.cell(5, 0), Cell::One);
        assert_eq!(node.state.cell(4, 0), Cell::Two);
    }

    #[test]
    fn test_expand_terminal_returns_itself() {
        let mut game = position(&[3, 0, 3, 1, 3, 2]);
        game.apply_move(3).unwrap();
        assert!(game.is_terminal());

        let mut tree = SearchTree::new(game, C);
        assert_eq!(tree.expand(NodeId::ROOT).unwrap(), NodeId::ROOT);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_backpropagation_credits_marked_player() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        let child = tree.expand(NodeId::ROOT).unwrap();

        tree.backpropagate(child, Outcome::Win(Player::One));

        let root = tree.get(NodeId::ROOT);
        assert_eq!(root.stats, NodeStats { visits: 1, wins: 1 });
        assert!(root.score.is_infinite(), "root score is never refreshed");

        let node = tree.get(child);
        assert_eq!(node.stats, NodeStats { visits: 1, wins: 1 });
        assert_eq!(node.score, 1.0);

        tree.backpropagate(child, Outcome::Win(Player::Two));
        let node = tree.get(child);
        assert_eq!(node.stats, NodeStats { visits: 2, wins: 1 });
        let expected = 0.5 + C * ((2f64).ln() / 2.0).sqrt();
        assert!((node.score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_backpropagation_draw_counts_visit_only() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        let child = tree.expand(NodeId::ROOT).unwrap();

        tree.backpropagate(child, Outcome::Draw);

        assert_eq!(tree.get(child).stats, NodeStats { visits: 1, wins: 0 });
        assert_eq!(tree.get(NodeId::ROOT).stats, NodeStats { visits: 1, wins: 0 });
    }

    #[test]
    fn test_select_prefers_unvisited() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        let first = tree.expand(NodeId::ROOT).unwrap();
        tree.backpropagate(first, Outcome::Win(Player::One));

        let mut rng = rng();
        for _ in 0..50 {
            let selected = tree.select(&mut rng);
            assert_ne!(selected, first);
            assert!(!tree.get(selected).is_visited());
        }
    }

    #[test]
    fn test_select_breaks_ties_randomly() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        tree.expand(NodeId::ROOT).unwrap();

        let mut rng = rng();
        let picked: HashSet<NodeId> = (0..100).map(|_| tree.select(&mut rng)).collect();
        assert!(picked.len() > 1, "ties should not resolve by order");
    }

    #[test]
    fn test_select_unexpanded_root() {
        let tree = SearchTree::new(Connect4::default(), C);
        assert_eq!(tree.select(&mut rng()), NodeId::ROOT);
    }

    #[test]
    fn test_best_move_empty_decision() {
        let tree = SearchTree::new(Connect4::default(), C);
        assert!(matches!(tree.best_move(&mut rng()), Err(MctsError::EmptyDecision)));
    }

    #[test]
    fn test_best_move_most_visited() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        tree.expand(NodeId::ROOT).unwrap();

        let column_four = tree.get(NodeId::ROOT).children[4].1;
        for _ in 0..3 {
            tree.backpropagate(column_four, Outcome::Draw);
        }
        let column_one = tree.get(NodeId::ROOT).children[1].1;
        // Fewer visits but a perfect record must not win the decision
        tree.backpropagate(column_one, Outcome::Win(Player::One));

        assert_eq!(tree.best_move(&mut rng()).unwrap(), 4);
    }

    #[test]
    fn test_move_statistics() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        let first = tree.expand(NodeId::ROOT).unwrap();
        tree.backpropagate(first, Outcome::Win(Player::One));

        let stats = tree.move_statistics();
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].mv, 0);
        assert_eq!(stats[0].visits, 1);
        assert_eq!(stats[0].wins, 1);
        assert!(stats[1].score.is_infinite());
    }

    #[test]
    fn test_path_to_root() {
        let mut tree = SearchTree::new(Connect4::default(), C);
        let child = tree.expand(NodeId::ROOT).unwrap();
        tree.backpropagate(child, Outcome::Draw);
        let grandchild = tree.expand(child).unwrap();

        let path: Vec<NodeId> = tree.path_to_root(grandchild).collect();
        assert_eq!(path, vec![grandchild, child, NodeId::ROOT]);
    }
}
