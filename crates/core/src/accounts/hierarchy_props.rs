//! Property-based tests for the account hierarchy.

use proptest::prelude::*;

use ledgerline_shared::types::AccountId;
use uuid::Uuid;

use crate::accounts::hierarchy::AccountArena;

/// A random forest: node `i` has no parent or a parent with a smaller index.
fn arb_forest() -> impl Strategy<Value = Vec<(AccountId, Option<AccountId>)>> {
    let parent = prop::option::weighted(0.8, any::<prop::sample::Index>());
    prop::collection::vec(parent, 1..30).prop_map(|parents| {
        let ids: Vec<AccountId> = (0..parents.len())
            .map(|i| AccountId::from_uuid(Uuid::from_u128(i as u128 + 1)))
            .collect();
        parents
            .iter()
            .enumerate()
            .map(|(i, parent)| {
                let parent = match parent {
                    Some(index) if i > 0 => Some(ids[index.index(i)]),
                    _ => None,
                };
                (ids[i], parent)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every node of a subtree is reported as inside it, so moving the root
    /// of the subtree under any of them is detected as circular.
    #[test]
    fn test_prop_descendants_are_in_subtree(
        edges in arb_forest(),
        pick in any::<prop::sample::Index>(),
    ) {
        let arena = AccountArena::from_edges(edges.clone());
        let root = edges[pick.index(edges.len())].0;
        for id in arena.descendants(root) {
            prop_assert!(arena.is_in_subtree(id, root));
        }
        prop_assert!(arena.is_in_subtree(root, root));
    }

    /// Re-parenting outside the subtree keeps the tree acyclic and the
    /// depth of every node one more than its parent.
    #[test]
    fn test_prop_valid_move_keeps_depths_consistent(
        edges in arb_forest(),
        mover in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
    ) {
        let mut arena = AccountArena::from_edges(edges.clone());
        let id = edges[mover.index(edges.len())].0;
        let new_parent = edges[target.index(edges.len())].0;
        prop_assume!(!arena.is_in_subtree(new_parent, id));

        arena.reparent(id, Some(new_parent));
        let mut parents: std::collections::HashMap<AccountId, Option<AccountId>> =
            edges.into_iter().collect();
        parents.insert(id, Some(new_parent));

        for (node, parent) in &parents {
            match parent {
                Some(p) => {
                    prop_assert!(!arena.is_in_subtree(*p, *node));
                    prop_assert_eq!(arena.depth(*node), arena.depth(*p) + 1);
                }
                None => prop_assert_eq!(arena.depth(*node), 1),
            }
        }
    }
}
