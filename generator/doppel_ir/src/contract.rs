//! Contract declarations and the top-level contract set.

use serde::{Deserialize, Serialize};

use crate::generics::GenericParam;
use crate::member::MemberDecl;
use crate::type_ref::TypeRef;

/// What flavor of contract a declaration describes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    /// A pure capability set: every member is replaceable, nothing is
    /// constructed.
    #[default]
    Capability,
    /// An extensible base class: members carry access and override-ability,
    /// and construction goes through declared constructors.
    ExtensibleClass,
}

/// A contract type whose surface is being reimplemented.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ContractDecl {
    /// The type name without arity decoration, e.g. `IExample`.
    pub name: String,
    /// Declaring namespace, absent for global contracts.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Generic parameters declared by the contract itself.
    #[serde(default)]
    pub generics: Vec<GenericParam>,
    #[serde(default)]
    pub kind: ContractKind,
    /// Directly declared members, in declaration order.
    #[serde(default)]
    pub members: Vec<MemberDecl>,
    /// Ancestor contracts, recursively. The graph is finite and acyclic.
    #[serde(default)]
    pub ancestors: Vec<ContractDecl>,
}

impl ContractDecl {
    /// The namespace scope every type name is rendered relative to.
    pub fn scope(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// A reference to this contract as a type, its own generic parameters
    /// applied as arguments.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::Named {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            args: self
                .generics
                .iter()
                .map(|p| TypeRef::param(&p.name))
                .collect(),
        }
    }

    /// The contract's base name for generated-type naming.
    ///
    /// Capability contracts conventionally carry a leading `I` marker, which
    /// is stripped; class contracts are used as-is.
    pub fn base_name(&self) -> &str {
        match self.kind {
            ContractKind::Capability => self.name.strip_prefix('I').unwrap_or(&self.name),
            ContractKind::ExtensibleClass => &self.name,
        }
    }

    /// The generic-arity marker used in artifact names, e.g. `` `1 ``.
    pub fn arity_marker(&self) -> String {
        if self.generics.is_empty() {
            String::new()
        } else {
            format!("`{}", self.generics.len())
        }
    }

    /// The generic parameter list as it appears on a generated type
    /// declaration, e.g. `<T, U>`. Variance modifiers are omitted: they are
    /// legal only on contract declarations, not on implementing types.
    pub fn generic_suffix(&self) -> String {
        if self.generics.is_empty() {
            return String::new();
        }
        let names: Vec<&str> = self.generics.iter().map(|p| p.name.as_str()).collect();
        format!("<{}>", names.join(", "))
    }

}

/// The top-level metadata document: every contract processed in one run.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct ContractSet {
    pub contracts: Vec<ContractDecl>,
}

impl ContractSet {
    /// Find a contract by exact name.
    pub fn find(&self, name: &str) -> Option<&ContractDecl> {
        self.contracts.iter().find(|c| c.name == name)
    }

    /// Contract names whose name contains `fragment`, case-insensitively.
    /// Used for near-miss reporting when an exact lookup fails.
    pub fn similar(&self, fragment: &str) -> Vec<&str> {
        let needle = fragment.to_uppercase();
        self.contracts
            .iter()
            .filter(|c| c.name.to_uppercase().contains(&needle))
            .map(|c| c.name.as_str())
            .collect()
    }
}
