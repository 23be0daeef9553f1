//! Command scripts: text files of `<action> <key>` lines applied to a tree.
//!
//! ```text
//! i 10
//! i 20
//! s 10
//! d 10
//! ```
//!
//! Actions are `i` (insert), `d` (delete) and `s` (search). Blank lines and
//! lines starting with `#` are skipped.

use crate::btree::BTree;
use crate::error::{BTreeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// One script command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "key", rename_all = "camelCase")]
pub enum Command {
    Insert(i64),
    Delete(i64),
    Search(i64),
}

impl Command {
    /// Parse one script line; `Ok(None)` for blank and comment lines
    pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parts = line.split_whitespace();
        let action = parts.next().unwrap_or_default();
        let key = parts
            .next()
            .ok_or_else(|| BTreeError::parse(line_no, format!("missing key after '{}'", action)))?;
        if let Some(extra) = parts.next() {
            return Err(BTreeError::parse(
                line_no,
                format!("unexpected token '{}'", extra),
            ));
        }

        let key: i64 = key
            .parse()
            .map_err(|_| BTreeError::parse(line_no, format!("invalid key '{}'", key)))?;

        match action {
            "i" => Ok(Some(Self::Insert(key))),
            "d" => Ok(Some(Self::Delete(key))),
            "s" => Ok(Some(Self::Search(key))),
            other => Err(BTreeError::parse(
                line_no,
                format!("unknown action '{}'", other),
            )),
        }
    }

    /// Key the command operates on
    pub fn key(&self) -> i64 {
        match *self {
            Self::Insert(key) | Self::Delete(key) | Self::Search(key) => key,
        }
    }

    /// Apply the command to a tree
    ///
    /// A search or delete on an empty tree yields [`Outcome::EmptyTree`];
    /// any other error is returned.
    pub fn apply(&self, tree: &mut BTree<i64>) -> Result<Outcome> {
        let result = match *self {
            Self::Insert(key) => Ok(if tree.insert(key) {
                Outcome::Inserted
            } else {
                Outcome::Duplicate
            }),
            Self::Delete(key) => tree.remove(&key).map(|removed| {
                if removed {
                    Outcome::Removed
                } else {
                    Outcome::NotFound
                }
            }),
            Self::Search(key) => tree.search(&key).map(|hit| {
                if hit.is_some() {
                    Outcome::Found
                } else {
                    Outcome::NotFound
                }
            }),
        };
        match result {
            Err(BTreeError::EmptyTree) => Ok(Outcome::EmptyTree),
            other => other,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert(key) => write!(f, "i {}", key),
            Self::Delete(key) => write!(f, "d {}", key),
            Self::Search(key) => write!(f, "s {}", key),
        }
    }
}

/// Result of applying one command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Inserted,
    /// Insert of a key already present; the tree is unchanged
    Duplicate,
    Removed,
    Found,
    NotFound,
    /// Search or delete on an empty tree; the tree is unchanged
    EmptyTree,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Inserted => "INSERTED",
            Self::Duplicate => "DUPLICATE",
            Self::Removed => "DELETED",
            Self::Found => "FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::EmptyTree => "EMPTY_TREE",
        };
        f.write_str(text)
    }
}

/// A command paired with its outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub command: Command,
    pub outcome: Outcome,
}

/// Everything a script run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptReport {
    /// One entry per command, in script order
    pub steps: Vec<Step>,
    /// Final in-order traversal of the tree
    pub keys: Vec<i64>,
}

impl ScriptReport {
    /// Number of commands that reported an absent key
    pub fn not_found(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.outcome == Outcome::NotFound)
            .count()
    }
}

/// A parsed command script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    /// Parse script text
    pub fn parse(text: &str) -> Result<Self> {
        let mut commands = Vec::new();
        for (i, line) in text.lines().enumerate() {
            if let Some(command) = Command::parse_line(line, i + 1)? {
                commands.push(command);
            }
        }
        Ok(Self { commands })
    }

    /// Read and parse a script file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let script = Self::parse(&text)?;
        debug!(path = %path.display(), commands = script.len(), "loaded script");
        Ok(script)
    }

    /// Parsed commands in order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Apply every command to `tree` in order, then traverse it
    ///
    /// Stops at the first command failing with anything other than an
    /// empty tree.
    pub fn run(&self, tree: &mut BTree<i64>) -> Result<ScriptReport> {
        let steps = self
            .commands
            .iter()
            .map(|command| {
                let outcome = command.apply(tree)?;
                debug!(%command, %outcome, "applied");
                Ok(Step {
                    command: *command,
                    outcome,
                })
            })
            .collect::<Result<Vec<Step>>>()?;

        let report = ScriptReport {
            steps,
            keys: tree.traverse().copied().collect(),
        };
        info!(
            commands = report.steps.len(),
            keys = report.keys.len(),
            not_found = report.not_found(),
            "script finished"
        );
        Ok(report)
    }
}

impl From<Vec<Command>> for Script {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

/// Join keys with single spaces, as printed by traversals
pub fn join_keys<I>(keys: I) -> String
where
    I: IntoIterator,
    I::Item: fmt::Display,
{
    keys.into_iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() -> Result<()> {
        let script = Script::parse("i 5\n\n# comment\n  d -3 \ns 12\n")?;
        assert_eq!(
            script.commands(),
            &[Command::Insert(5), Command::Delete(-3), Command::Search(12)]
        );
        Ok(())
    }

    #[test]
    fn test_parse_errors_name_line() {
        let err = Script::parse("i 1\nx 2\n").unwrap_err();
        assert!(matches!(err, BTreeError::Parse { line: 2, .. }));

        let err = Script::parse("i\n").unwrap_err();
        assert!(matches!(err, BTreeError::Parse { line: 1, .. }));

        let err = Script::parse("i 1\ni 2\nd abc\n").unwrap_err();
        assert_eq!(err.to_string(), "Script line 3: invalid key 'abc'");

        assert!(Script::parse("i 1 2\n").is_err());
    }

    #[test]
    fn test_run_reports_outcomes() -> Result<()> {
        let script = Script::parse("s 1\ni 1\ni 2\ni 1\ns 2\nd 3\nd 1\n")?;
        let mut tree = BTree::new();
        let report = script.run(&mut tree)?;

        let outcomes: Vec<Outcome> = report.steps.iter().map(|s| s.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::EmptyTree,
                Outcome::Inserted,
                Outcome::Inserted,
                Outcome::Duplicate,
                Outcome::Found,
                Outcome::NotFound,
                Outcome::Removed,
            ]
        );
        assert_eq!(report.keys, vec![2]);
        assert_eq!(report.not_found(), 1);
        Ok(())
    }

    #[test]
    fn test_report_serializes() -> Result<()> {
        let mut tree = BTree::new();
        let report = Script::from(vec![Command::Insert(7)]).run(&mut tree)?;
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"steps":[{"command":{"action":"insert","key":7},"outcome":"inserted"}],"keys":[7]}"#
        );
        Ok(())
    }

    #[test]
    fn test_apply_maps_only_empty_tree() -> Result<()> {
        let mut tree = BTree::new();
        assert_eq!(Command::Delete(1).apply(&mut tree)?, Outcome::EmptyTree);
        assert_eq!(Command::Search(1).apply(&mut tree)?, Outcome::EmptyTree);
        assert_eq!(Command::Insert(1).apply(&mut tree)?, Outcome::Inserted);
        assert_eq!(Command::Delete(2).apply(&mut tree)?, Outcome::NotFound);
        assert_eq!(Command::Delete(1).apply(&mut tree)?, Outcome::Removed);
        assert_eq!(Command::Search(1).apply(&mut tree)?, Outcome::EmptyTree);
        Ok(())
    }

    #[test]
    fn test_join_keys() {
        assert_eq!(join_keys([1, 2, 3]), "1 2 3");
        assert_eq!(join_keys(Vec::<i64>::new()), "");
        assert_eq!(Command::Delete(4).to_string(), "d 4");
    }
}
