//! Knowledge-graph triplets and extraction schemas.
//!
//! Triplet extraction is schema-constrained: subjects and objects must carry
//! an entity type from a fixed enum, and the predicate must be one of the
//! schema's relations. Triplets violating the schema are dropped by the
//! extractor before they reach the graph store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity types recognized when extracting from source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeEntity {
    /// A class or struct definition
    Class,
    /// A free function
    Function,
    /// A method on a class
    Method,
    /// A variable or constant
    Variable,
    /// An HTTP or RPC endpoint
    ApiEndpoint,
    /// A database or table
    Database,
    /// A service or daemon
    Service,
    /// A module or package
    Module,
}

/// Relationship types recognized when extracting from source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeRelation {
    /// Subject invokes object
    Calls,
    /// Subject implements object
    Implements,
    /// Subject extends object
    Extends,
    /// Subject imports object
    Imports,
    /// Subject uses object
    Uses,
    /// Subject depends on object
    DependsOn,
    /// Subject validates object
    Validates,
    /// Subject transforms object
    Transforms,
}

/// Entity types recognized when extracting from business documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessEntity {
    /// A business rule
    BusinessRule,
    /// A business process
    Process,
    /// A domain entity
    Entity,
    /// A constraint on a process or entity
    Constraint,
    /// A stated requirement
    Requirement,
    /// A use case
    UseCase,
    /// An actor participating in a process
    Actor,
    /// An external or internal system
    System,
}

/// Relationship types recognized when extracting from business documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessRelation {
    /// Subject triggers object
    Triggers,
    /// Subject validates object
    Validates,
    /// Subject requires object
    Requires,
    /// Subject produces object
    Produces,
    /// Subject consumes object
    Consumes,
    /// Subject modifies object
    Modifies,
}

const CODE_ENTITIES: &[&str] = &[
    "Class",
    "Function",
    "Method",
    "Variable",
    "ApiEndpoint",
    "Database",
    "Service",
    "Module",
];

const CODE_RELATIONS: &[&str] = &[
    "calls",
    "implements",
    "extends",
    "imports",
    "uses",
    "depends_on",
    "validates",
    "transforms",
];

const BUSINESS_ENTITIES: &[&str] = &[
    "BusinessRule",
    "Process",
    "Entity",
    "Constraint",
    "Requirement",
    "UseCase",
    "Actor",
    "System",
];

const BUSINESS_RELATIONS: &[&str] = &[
    "triggers",
    "validates",
    "requires",
    "produces",
    "consumes",
    "modifies",
];

/// Which extraction schema applies to a collection's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphSchema {
    /// Source-code schema (classes, functions, services, ...)
    Code,
    /// Business-documentation schema (rules, processes, actors, ...)
    Business,
}

impl GraphSchema {
    /// Allowed entity type names for this schema.
    #[must_use]
    pub fn entity_kinds(self) -> &'static [&'static str] {
        match self {
            Self::Code => CODE_ENTITIES,
            Self::Business => BUSINESS_ENTITIES,
        }
    }

    /// Allowed relation names for this schema.
    #[must_use]
    pub fn relations(self) -> &'static [&'static str] {
        match self {
            Self::Code => CODE_RELATIONS,
            Self::Business => BUSINESS_RELATIONS,
        }
    }

    /// Whether a triplet's entity kinds and predicate are all members of
    /// this schema.
    #[must_use]
    pub fn validates(self, triplet: &GraphTriplet) -> bool {
        let entities = self.entity_kinds();
        entities.contains(&triplet.subject_kind.as_str())
            && entities.contains(&triplet.object_kind.as_str())
            && self.relations().contains(&triplet.predicate.as_str())
    }

    /// Maximum triplets requested from the extractor per chunk.
    #[must_use]
    pub fn max_triplets_per_chunk(self) -> usize {
        match self {
            Self::Code => 15,
            Self::Business => 10,
        }
    }
}

impl fmt::Display for GraphSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => f.write_str("code"),
            Self::Business => f.write_str("business"),
        }
    }
}

/// A `(subject, predicate, object)` fact extracted from a node.
///
/// Every triplet carries provenance to the node it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphTriplet {
    /// Subject entity label
    pub subject: String,
    /// Subject entity type (member of the schema's entity enum)
    pub subject_kind: String,
    /// Relation name (member of the schema's relation enum)
    pub predicate: String,
    /// Object entity label
    pub object: String,
    /// Object entity type (member of the schema's entity enum)
    pub object_kind: String,
    /// Id of the node this fact was extracted from
    pub source_node_id: String,
}

/// A node in an exported graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Entity label
    pub id: String,
    /// Entity type
    pub kind: String,
}

/// An edge in an exported graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Subject entity label
    pub source: String,
    /// Object entity label
    pub target: String,
    /// Relation name
    pub relation: String,
}

/// Adjacency-list export of a collection's knowledge graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphExport {
    /// All entities
    pub nodes: Vec<GraphNode>,
    /// All relations
    pub edges: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triplet(subject_kind: &str, predicate: &str, object_kind: &str) -> GraphTriplet {
        GraphTriplet {
            subject: "AuthService".to_owned(),
            subject_kind: subject_kind.to_owned(),
            predicate: predicate.to_owned(),
            object: "validate_token".to_owned(),
            object_kind: object_kind.to_owned(),
            source_node_id: "src/auth.rs#0".to_owned(),
        }
    }

    #[test]
    fn code_schema_accepts_member_triplets() {
        assert!(GraphSchema::Code.validates(&triplet("Class", "calls", "Function")));
    }

    #[test]
    fn code_schema_rejects_foreign_entities() {
        assert!(!GraphSchema::Code.validates(&triplet("Actor", "calls", "Function")));
        assert!(!GraphSchema::Code.validates(&triplet("Class", "triggers", "Function")));
    }

    #[test]
    fn business_schema_rejects_code_relations() {
        assert!(!GraphSchema::Business.validates(&triplet("Actor", "imports", "Process")));
        assert!(GraphSchema::Business.validates(&triplet("Actor", "triggers", "Process")));
    }
}
