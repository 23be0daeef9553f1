//! Scripted walkthrough of the tree API.
//!
//! Builds a default-capacity tree, searches it, inspects the root, removes
//! every key while traversing after each removal, then rebuilds it and
//! exercises a missing key.

use crate::btree::BTree;
use crate::error::Result;
use crate::script::join_keys;

const KEYS: [i64; 7] = [1, 3, 2, 6, 4, 7, 5];
const REMOVAL_ORDER: [i64; 7] = [6, 4, 2, 5, 1, 3, 7];

/// Run the walkthrough and return its transcript, one line per event
pub fn run() -> Result<Vec<String>> {
    let mut tree = BTree::new();
    let mut out = Vec::new();

    out.push(emptiness(&tree));
    tree.extend(KEYS);
    out.push(traversal(&tree));

    for key in [1, 0] {
        let line = if tree.search(&key)?.is_some() {
            format!("Key {} is in the tree.", key)
        } else {
            format!("Key {} is not in the tree.", key)
        };
        out.push(line);
    }

    out.push(emptiness(&tree));
    out.push(format!("Maximum keys per node: {}", tree.key_capacity()));
    out.push(format!(
        "Root holds {} keys: {}",
        tree.root_count(),
        join_keys(tree.root_keys()?)
    ));

    for key in REMOVAL_ORDER {
        remove(&mut tree, key, &mut out)?;
    }
    out.push(emptiness(&tree));

    tree.extend(KEYS);
    out.push(traversal(&tree));

    remove(&mut tree, 8, &mut out)?;
    tree.insert(8);
    out.push(traversal(&tree));
    remove(&mut tree, 8, &mut out)?;

    Ok(out)
}

fn remove(tree: &mut BTree<i64>, key: i64, out: &mut Vec<String>) -> Result<()> {
    if !tree.remove(&key)? {
        out.push(format!(
            "The key {} is not in the tree so it can't be removed.",
            key
        ));
    }
    out.push(traversal(tree));
    Ok(())
}

fn traversal(tree: &BTree<i64>) -> String {
    format!("Traversal: {}", join_keys(tree.traverse()))
}

fn emptiness(tree: &BTree<i64>) -> String {
    if tree.is_empty() {
        "The tree is empty".to_string()
    } else {
        "The tree is not empty".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_transcript() -> Result<()> {
        let lines = run()?;

        assert_eq!(lines[0], "The tree is empty");
        assert_eq!(lines[1], "Traversal: 1 2 3 4 5 6 7");
        assert_eq!(lines[2], "Key 1 is in the tree.");
        assert_eq!(lines[3], "Key 0 is not in the tree.");
        assert_eq!(lines[4], "The tree is not empty");
        assert_eq!(lines[5], "Maximum keys per node: 3");
        assert!(lines[6].starts_with("Root holds 2 keys"));

        let removals = &lines[7..14];
        assert_eq!(removals[0], "Traversal: 1 2 3 4 5 7");
        assert_eq!(removals[6], "Traversal: ");
        assert_eq!(lines[14], "The tree is empty");
        assert_eq!(lines[15], "Traversal: 1 2 3 4 5 6 7");
        assert_eq!(
            lines[16],
            "The key 8 is not in the tree so it can't be removed."
        );
        assert_eq!(lines[17], "Traversal: 1 2 3 4 5 6 7");
        assert_eq!(lines[18], "Traversal: 1 2 3 4 5 6 7 8");
        assert_eq!(lines[19], "Traversal: 1 2 3 4 5 6 7");
        assert_eq!(lines.len(), 20);
        Ok(())
    }
}
