//! Composite synthesis: fan every call out to a collection of implementers.
//!
//! Value results reduce by consensus: when the collection is non-empty and
//! every element agrees, the common value is returned, otherwise the type
//! default. This is a deliberately coarse heuristic kept for compatibility -
//! for numeric members the default is a valid value and indistinguishable
//! from genuine agreement on it.
//!
//! For capability contracts the generated type derives from the framework
//! list of the contract, so the list's own member names are reserved and any
//! contract member sharing one is emitted explicitly qualified. For class
//! contracts the composite subclasses the base type, carries its own element
//! list, and overrides the accessible overridable surface.

use doppel_emit::SourceWriter;
use doppel_extract::{
    param_names, param_types, param_types_and_names, ConstructorShape, MemberShape,
    NotificationShape, OperationShape, ShapeKind,
};
use doppel_ir::{render_constraint_clause, Access, ContractDecl, ContractKind, Dispatch};

use crate::registry::NameRegistry;
use crate::{assign_out_defaults, PatternSynthesizer};

/// Public surface of the framework list the capability composite derives
/// from. Contract members with these names are emitted explicitly qualified.
const LIST_SCOPE_NAMES: &[&str] = &[
    "Add",
    "AddRange",
    "AsReadOnly",
    "BinarySearch",
    "Capacity",
    "Clear",
    "Contains",
    "ConvertAll",
    "CopyTo",
    "Count",
    "Exists",
    "Find",
    "FindAll",
    "FindIndex",
    "FindLast",
    "FindLastIndex",
    "ForEach",
    "GetEnumerator",
    "GetRange",
    "IndexOf",
    "Insert",
    "InsertRange",
    "Item",
    "LastIndexOf",
    "Remove",
    "RemoveAll",
    "RemoveAt",
    "RemoveRange",
    "Reverse",
    "Sort",
    "ToArray",
    "TrimExcess",
    "TrueForAll",
];

pub(crate) struct CompositeSynthesizer {
    registry: NameRegistry,
    class_mode: bool,
    /// The contract type rendered relative to its namespace.
    target: String,
    /// Generated type name without generic suffix.
    type_name: String,
}

impl CompositeSynthesizer {
    pub(crate) fn new() -> Self {
        Self {
            registry: NameRegistry::new(),
            class_mode: false,
            target: String::new(),
            type_name: String::new(),
        }
    }

    /// Skip members a class composite cannot participate in. Protected
    /// virtual members are inherited unchanged; protected abstract members
    /// still need an override to keep the type concrete, but fan-out is
    /// impossible through a base-typed element reference, so they get a
    /// default-only body.
    fn class_emission(&self, shape: &MemberShape) -> Option<ClassEmission> {
        if !self.class_mode {
            return Some(ClassEmission::FanOut);
        }
        if !shape.is_overridable() {
            return None;
        }
        match (shape.access, shape.dispatch) {
            (Access::Public, _) => Some(ClassEmission::FanOut),
            (Access::Protected, Dispatch::Abstract) => Some(ClassEmission::DefaultOnly),
            (Access::Protected, _) => None,
        }
    }

    fn emit_consensus_loop(
        w: &mut SourceWriter,
        source: &str,
        call: &str,
        return_type: Option<&str>,
    ) {
        match return_type {
            None => {
                w.line(&format!("for (int i = 0; i < {source}.Count; i++)"));
                w.block(|w| w.line(&format!("{call};")));
            }
            Some(ret) => {
                w.line(&format!(
                    "var results = new System.Collections.Generic.List<{ret}>();"
                ));
                w.line(&format!("for (int i = 0; i < {source}.Count; i++)"));
                w.block(|w| w.line(&format!("results.Add({call});")));
                w.line(&format!(
                    "return results.Count > 0 && results.All(result => result.Equals(results[0])) ? results[0] : default({ret});"
                ));
            }
        }
    }

    fn operation_body(
        w: &mut SourceWriter,
        source: &str,
        element: &str,
        shape: &MemberShape,
        op: &OperationShape,
    ) {
        assign_out_defaults(w, &op.params);
        let call = format!(
            "{element}.{}{}({})",
            shape.name,
            op.generic_list,
            param_names(&op.params)
        );
        Self::emit_consensus_loop(w, source, &call, op.return_type.as_deref());
    }
}

enum ClassEmission {
    FanOut,
    DefaultOnly,
}

impl PatternSynthesizer for CompositeSynthesizer {
    fn usings(&self) -> &'static [&'static str] {
        &["System.Linq"]
    }

    fn class_declaration(&mut self, contract: &ContractDecl) -> String {
        self.class_mode = contract.kind == ContractKind::ExtensibleClass;
        self.target = contract.type_ref().render(contract.scope());
        self.type_name = format!("Composite{}", contract.base_name());
        let constraints = render_constraint_clause(&contract.generics, contract.scope());

        if self.class_mode {
            format!(
                "{}{} : {}{}",
                self.type_name,
                contract.generic_suffix(),
                self.target,
                constraints
            )
        } else {
            for name in LIST_SCOPE_NAMES {
                self.registry.reserve(name);
            }
            format!(
                "{}{} : System.Collections.Generic.List<{}>, {}{}",
                self.type_name,
                contract.generic_suffix(),
                self.target,
                self.target,
                constraints
            )
        }
    }

    fn extra_members(&mut self, w: &mut SourceWriter, _contract: &ContractDecl) {
        if self.class_mode {
            w.line(&format!(
                "public readonly System.Collections.Generic.List<{t}> Elements = new System.Collections.Generic.List<{t}>();",
                t = self.target
            ));
        }
    }

    fn constructor(
        &mut self,
        w: &mut SourceWriter,
        _contract: &ContractDecl,
        ctor: &ConstructorShape,
        _shape: &MemberShape,
        _members: &[MemberShape],
    ) {
        w.line(&format!(
            "public {}({}) : base({}) {{ }}",
            self.type_name,
            param_types_and_names(&ctor.params),
            param_names(&ctor.params)
        ));
    }

    fn operation(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Operation(op) = &shape.kind else {
            return;
        };
        let Some(emission) = self.class_emission(shape) else {
            return;
        };
        let ret = op.return_type.as_deref();

        if self.class_mode {
            w.line(&format!(
                "{} override {} {}{}({})",
                shape.access.keyword(),
                ret.unwrap_or("void"),
                shape.name,
                op.generic_list,
                param_types_and_names(&op.params)
            ));
            w.block(|w| match emission {
                ClassEmission::FanOut => {
                    Self::operation_body(w, "Elements", "Elements[i]", shape, op);
                }
                ClassEmission::DefaultOnly => {
                    assign_out_defaults(w, &op.params);
                    if let Some(ret) = ret {
                        w.line(&format!("return default({ret});"));
                    }
                }
            });
            return;
        }

        let types = param_types(&op.params);
        let res = self.registry.resolve(&shape.name, &types, false);
        let explicit = res.repeat_signature || self.registry.is_reserved(&shape.name);

        // An explicit implementation is never virtual, which is exactly what
        // the collision cases need.
        if explicit {
            w.line(&format!(
                "{} {}.{}{}({})",
                ret.unwrap_or("void"),
                shape.declaring_type,
                shape.name,
                op.generic_list,
                param_types_and_names(&op.params)
            ));
        } else {
            w.line(&format!(
                "public {} {}{}({}){}",
                ret.unwrap_or("void"),
                shape.name,
                op.generic_list,
                param_types_and_names(&op.params),
                op.constraint_clause
            ));
        }
        w.block(|w| Self::operation_body(w, "base", "base[i]", shape, op));
    }

    fn accessor(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Accessor(acc) = &shape.kind else {
            return;
        };
        let Some(emission) = self.class_emission(shape) else {
            return;
        };

        if self.class_mode {
            w.line(&format!(
                "{} override {} {}",
                shape.access.keyword(),
                acc.value_type,
                shape.name
            ));
            w.block(|w| {
                if acc.readable {
                    w.line("get");
                    w.block(|w| match emission {
                        ClassEmission::FanOut => {
                            w.line(&format!(
                                "var results = Elements.Select(element => element.{}).ToList();",
                                shape.name
                            ));
                            w.line(&format!(
                                "return results.Count > 0 && results.All(result => result.Equals(results[0])) ? results[0] : default({});",
                                acc.value_type
                            ));
                        }
                        ClassEmission::DefaultOnly => {
                            w.line(&format!("return default({});", acc.value_type));
                        }
                    });
                }
                if acc.writable {
                    w.line("set");
                    w.block(|w| {
                        if matches!(emission, ClassEmission::FanOut) {
                            w.line(&format!(
                                "Elements.ForEach(element => element.{} = value);",
                                shape.name
                            ));
                        }
                    });
                }
            });
            return;
        }

        let res = self.registry.resolve(&shape.name, &acc.value_type, false);
        // A shadowed same-named accessor with a different type cannot share
        // the plain name either; it also goes explicit, reaching elements
        // through the declaring contract.
        let shadowed = res.local_name != shape.name;
        let explicit =
            res.repeat_signature || shadowed || self.registry.is_reserved(&shape.name);

        if explicit {
            w.line(&format!(
                "{} {}.{}",
                acc.value_type, shape.declaring_type, shape.name
            ));
        } else {
            w.line(&format!("public {} {}", acc.value_type, shape.name));
        }
        let item = if shadowed {
            format!("(({})listItem)", shape.declaring_type)
        } else {
            "listItem".to_string()
        };
        w.block(|w| {
            if acc.readable {
                w.line("get");
                w.block(|w| {
                    w.line(&format!(
                        "var results = this.Select<{}, {}>(listItem => listItem.{}).ToList();",
                        shape.declaring_type, acc.value_type, shape.name
                    ));
                    w.line(&format!(
                        "return results.Count > 0 && results.All(result => result.Equals(results[0])) ? results[0] : default({});",
                        acc.value_type
                    ));
                });
            }
            if acc.writable {
                w.line("set");
                w.block(|w| {
                    w.line(&format!(
                        "this.ForEach(listItem => {item}.{} = value);",
                        shape.name
                    ));
                });
            }
        });
    }

    fn indexed_accessor(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::IndexedAccessor(idx) = &shape.kind else {
            return;
        };
        let Some(emission) = self.class_emission(shape) else {
            return;
        };
        let names = param_names(&idx.params);

        if self.class_mode {
            w.line(&format!(
                "{} override {} this[{}]",
                shape.access.keyword(),
                idx.value_type,
                param_types_and_names(&idx.params)
            ));
            w.block(|w| {
                if idx.readable {
                    w.line("get");
                    w.block(|w| match emission {
                        ClassEmission::FanOut => {
                            w.line(&format!(
                                "var results = Elements.Select(element => element[{names}]).ToList();"
                            ));
                            w.line(&format!(
                                "return results.Count > 0 && results.All(result => result.Equals(results[0])) ? results[0] : default({});",
                                idx.value_type
                            ));
                        }
                        ClassEmission::DefaultOnly => {
                            w.line(&format!("return default({});", idx.value_type));
                        }
                    });
                }
                if idx.writable {
                    w.line("set");
                    w.block(|w| {
                        if matches!(emission, ClassEmission::FanOut) {
                            w.line(&format!(
                                "Elements.ForEach(element => element[{names}] = value);"
                            ));
                        }
                    });
                }
            });
            return;
        }

        let types = param_types(&idx.params);
        let res = self.registry.resolve(&shape.name, &types, false);
        let explicit = res.repeat_signature || self.registry.is_reserved(&shape.name);

        if explicit {
            w.line(&format!(
                "{} {}.this[{}]",
                idx.value_type,
                shape.declaring_type,
                param_types_and_names(&idx.params)
            ));
        } else {
            w.line(&format!(
                "public {} this[{}]",
                idx.value_type,
                param_types_and_names(&idx.params)
            ));
        }
        w.block(|w| {
            if idx.readable {
                w.line("get");
                w.block(|w| {
                    w.line(&format!(
                        "var results = this.Select<{}, {}>(listItem => listItem[{names}]).ToList();",
                        shape.declaring_type, idx.value_type
                    ));
                    w.line(&format!(
                        "return results.Count > 0 && results.All(result => result.Equals(results[0])) ? results[0] : default({});",
                        idx.value_type
                    ));
                });
            }
            if idx.writable {
                w.line("set");
                w.block(|w| {
                    w.line(&format!(
                        "this.ForEach(listItem => listItem[{names}] = value);"
                    ));
                });
            }
        });
    }

    fn notification(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Notification(n) = &shape.kind else {
            return;
        };
        let Some(emission) = self.class_emission(shape) else {
            return;
        };

        if self.class_mode {
            self.class_notification(w, shape, n, &emission);
            return;
        }

        let res = self.registry.resolve(&shape.name, &n.handler_type, false);
        let shadowed = res.local_name != shape.name;
        let explicit =
            res.repeat_signature || shadowed || self.registry.is_reserved(&shape.name);

        if explicit {
            w.line(&format!(
                "event {} {}.{}",
                n.handler_type, shape.declaring_type, shape.name
            ));
        } else {
            w.line(&format!("public event {} {}", n.handler_type, shape.name));
        }
        let item = if shadowed {
            format!("(({})listItem)", shape.declaring_type)
        } else {
            "listItem".to_string()
        };
        w.block(|w| {
            w.line("add");
            w.block(|w| {
                w.line(&format!(
                    "this.ForEach(listItem => {item}.{} += value);",
                    shape.name
                ));
            });
            w.line("remove");
            w.block(|w| {
                w.line(&format!(
                    "this.ForEach(listItem => {item}.{} -= value);",
                    shape.name
                ));
            });
        });
    }
}

impl CompositeSynthesizer {
    fn class_notification(
        &self,
        w: &mut SourceWriter,
        shape: &MemberShape,
        n: &NotificationShape,
        emission: &ClassEmission,
    ) {
        w.line(&format!(
            "{} override event {} {}",
            shape.access.keyword(),
            n.handler_type,
            shape.name
        ));
        w.block(|w| {
            w.line("add");
            w.block(|w| {
                if matches!(emission, ClassEmission::FanOut) {
                    w.line(&format!(
                        "Elements.ForEach(element => element.{} += value);",
                        shape.name
                    ));
                }
            });
            w.line("remove");
            w.block(|w| {
                if matches!(emission, ClassEmission::FanOut) {
                    w.line(&format!(
                        "Elements.ForEach(element => element.{} -= value);",
                        shape.name
                    ));
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_scope_reserves_iteration_names() {
        assert!(LIST_SCOPE_NAMES.contains(&"Count"));
        assert!(LIST_SCOPE_NAMES.contains(&"Item"));
        assert!(LIST_SCOPE_NAMES.contains(&"GetEnumerator"));
    }

    #[test]
    fn list_scope_is_sorted_for_stable_review() {
        let mut sorted = LIST_SCOPE_NAMES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, LIST_SCOPE_NAMES);
    }
}
