//! Parameterized graph writes.
//!
//! Two statement shapes cover every projection: create a keyed node, and link
//! two keyed nodes if both exist. Labels and relationship types are static
//! identifiers; every value travels as a parameter.

use std::fmt;

use neo4rs::Query;

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Int(i64),
    Str(String),
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value.into())
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Str(value)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Int(v) => write!(f, "{}", v),
            Param::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// A node identified by label and key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef {
    pub label: &'static str,
    pub key: i64,
}

impl NodeRef {
    pub fn new(label: &'static str, key: i64) -> Self {
        Self { label, key }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.label, self.key)
    }
}

/// One write executed in its own transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphWrite {
    /// `CREATE` a node with its key and properties.
    CreateNode {
        node: NodeRef,
        properties: Vec<(&'static str, Param)>,
    },
    /// Create a relationship only if both endpoints match.
    Link {
        rel_type: &'static str,
        from: NodeRef,
        to: NodeRef,
    },
}

impl GraphWrite {
    pub fn create_node(label: &'static str, key: i64) -> Self {
        GraphWrite::CreateNode { node: NodeRef::new(label, key), properties: Vec::new() }
    }

    /// Add a property to a `CreateNode` write; no-op for links.
    pub fn with(mut self, name: &'static str, value: impl Into<Param>) -> Self {
        if let GraphWrite::CreateNode { properties, .. } = &mut self {
            properties.push((name, value.into()));
        }
        self
    }

    pub fn link(rel_type: &'static str, from: NodeRef, to: NodeRef) -> Self {
        GraphWrite::Link { rel_type, from, to }
    }

    /// Cypher text of the write.
    pub fn statement(&self) -> String {
        match self {
            GraphWrite::CreateNode { node, properties } => {
                let mut fields = vec!["key: $key".to_string()];
                fields.extend(properties.iter().map(|(name, _)| format!("{name}: ${name}")));
                format!("CREATE (n:{} {{{}}})", node.label, fields.join(", "))
            }
            GraphWrite::Link { rel_type, from, to } => format!(
                "MATCH (a:{} {{key: $fromKey}}), (b:{} {{key: $toKey}}) \
                 CREATE (a)-[r:{}]->(b) RETURN count(r) AS linked",
                from.label, to.label, rel_type
            ),
        }
    }

    /// Named parameters bound to [`statement`](Self::statement).
    pub fn params(&self) -> Vec<(&'static str, Param)> {
        match self {
            GraphWrite::CreateNode { node, properties } => {
                let mut params = vec![("key", Param::Int(node.key))];
                params.extend(properties.iter().cloned());
                params
            }
            GraphWrite::Link { from, to, .. } => {
                vec![("fromKey", Param::Int(from.key)), ("toKey", Param::Int(to.key))]
            }
        }
    }

    /// Human-readable parameter list for diagnostics.
    pub fn describe_params(&self) -> String {
        let rendered: Vec<String> = self
            .params()
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("{{{}}}", rendered.join(", "))
    }

    pub fn to_query(&self) -> Query {
        self.params()
            .into_iter()
            .fold(Query::new(self.statement()), |query, (name, value)| match value {
                Param::Int(v) => query.param(name, v),
                Param::Str(s) => query.param(name, s),
            })
    }
}

impl fmt::Display for GraphWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.statement(), self.describe_params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_statement() {
        let write = GraphWrite::create_node("Workflow", 10)
            .with("bpmnProcessId", "orderProcess")
            .with("version", 2);

        assert_eq!(
            write.statement(),
            "CREATE (n:Workflow {key: $key, bpmnProcessId: $bpmnProcessId, version: $version})"
        );
        assert_eq!(
            write.params(),
            vec![
                ("key", Param::Int(10)),
                ("bpmnProcessId", Param::Str("orderProcess".to_string())),
                ("version", Param::Int(2)),
            ]
        );
    }

    #[test]
    fn test_link_statement_matches_both_endpoints() {
        let write = GraphWrite::link(
            "ACTIVE_INCIDENT",
            NodeRef::new("Workflow", 10),
            NodeRef::new("Incident", 100),
        );

        let statement = write.statement();
        assert!(statement.starts_with("MATCH (a:Workflow {key: $fromKey}), (b:Incident {key: $toKey})"));
        assert!(statement.contains("CREATE (a)-[r:ACTIVE_INCIDENT]->(b)"));
        assert!(statement.ends_with("RETURN count(r) AS linked"));
        assert_eq!(write.describe_params(), "{fromKey=10, toKey=100}");
    }

    #[test]
    fn test_with_is_ignored_on_links() {
        let write = GraphWrite::link("R", NodeRef::new("A", 1), NodeRef::new("B", 2)).with("x", 1);
        assert_eq!(write.params().len(), 2);
    }

    #[test]
    fn test_display_quotes_strings() {
        let write = GraphWrite::create_node("Incident", 5).with("errorMessage", "missing \"x\"");
        assert!(write.to_string().ends_with(r#"{key=5, errorMessage="missing \"x\""}"#));
    }
}
