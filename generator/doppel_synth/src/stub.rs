//! Stub synthesis: every member backed by an assignable behavior slot.
//!
//! Operations get a callable-typed slot property checked on every call;
//! accessors get a `PropertyImplementation` cell; indexed accessors get bare
//! get/set function slots; notifications get an `EventImplementation`
//! registration list. Unset slots degrade to default values and no-ops.
//!
//! Generic operations cannot be backed by a single slot (a function-typed
//! value cannot be parameterized per call), so they get a dictionary of
//! slots keyed by the concrete type-argument combination, populated through
//! a generated `Implement{Name}` helper.

use doppel_emit::SourceWriter;
use doppel_extract::{
    has_by_ref, param_names, param_types, param_types_and_names, MemberShape, OperationShape,
    ShapeKind,
};
use doppel_ir::{render_constraint_clause, ContractDecl};

use crate::registry::{sanitize_identifier, NameRegistry};
use crate::{assign_out_defaults, delegate_type, return_clause, PatternSynthesizer};

pub(crate) struct StubSynthesizer {
    registry: NameRegistry,
}

impl StubSynthesizer {
    pub(crate) fn new() -> Self {
        Self {
            registry: NameRegistry::new(),
        }
    }

    fn plain_operation(&mut self, w: &mut SourceWriter, shape: &MemberShape, op: &OperationShape) {
        let types = param_types(&op.params);
        let by_ref = has_by_ref(&op.params);
        let res = self.registry.resolve(&shape.name, &types, by_ref);
        let local = res.local_name;
        let ret = op.return_type.as_deref();

        // By-reference parameters cannot flow through Action/Func, so each
        // such signature gets its own delegate declaration.
        let delegate_name = if by_ref {
            let delegate_name = format!("{}Delegate_{}", shape.name, sanitize_identifier(&types));
            if !res.repeat_signature {
                w.line(&format!(
                    "public delegate {} {}({});",
                    ret.unwrap_or("void"),
                    delegate_name,
                    param_types_and_names(&op.params)
                ));
                w.blank();
            }
            delegate_name
        } else {
            delegate_type(ret, &types)
        };

        if !res.repeat_signature {
            w.line(&format!("public {delegate_name} {local} {{ get; set; }}"));
            w.blank();
        }

        w.line(&format!(
            "{} {}.{}({})",
            ret.unwrap_or("void"),
            shape.declaring_type,
            shape.name,
            param_types_and_names(&op.params)
        ));
        w.block(|w| {
            assign_out_defaults(w, &op.params);
            w.line(&format!("if (this.{local} != null)"));
            w.block(|w| {
                w.line(&format!(
                    "{}this.{}({});",
                    return_clause(ret),
                    local,
                    param_names(&op.params)
                ));
            });
            if let Some(ret) = ret {
                w.line("else");
                w.block(|w| w.line(&format!("return default({ret});")));
            }
        });
    }

    fn generic_operation(
        &mut self,
        w: &mut SourceWriter,
        shape: &MemberShape,
        op: &OperationShape,
    ) {
        let types = param_types(&op.params);
        let by_ref = has_by_ref(&op.params);
        let res = self.registry.resolve(&shape.name, &types, false);
        let local = res.local_name;
        let ret = op.return_type.as_deref();
        let slots = format!("{local}_implementations");

        let typeofs: Vec<String> = op
            .generic_names
            .iter()
            .map(|n| format!("typeof({n})"))
            .collect();
        let key = format!("new Type[] {{ {} }}", typeofs.join(", "));

        // The slot type may mention the operation's own generic parameters,
        // so it is named per call site rather than stored typed.
        let implementation_type = if by_ref {
            let delegate_name = format!("{}Delegate_{}", shape.name, sanitize_identifier(&types));
            if !res.repeat_signature {
                w.line(&format!(
                    "public delegate {} {}{}({});",
                    ret.unwrap_or("void"),
                    delegate_name,
                    op.generic_list,
                    param_types_and_names(&op.params)
                ));
                w.blank();
            }
            format!("{delegate_name}{}", op.generic_list)
        } else {
            delegate_type(ret, &types)
        };

        if !res.repeat_signature {
            w.line(&format!(
                "private readonly System.Collections.Generic.Dictionary<Type[], object> {slots} = new System.Collections.Generic.Dictionary<Type[], object>(new EnumerableEqualityComparer<Type>());"
            ));
            w.blank();
            w.line(&format!(
                "public void Implement{}{}({} implementation){}",
                local, op.generic_list, implementation_type, op.constraint_clause
            ));
            w.block(|w| {
                w.line(&format!("{slots}[{key}] = implementation;"));
            });
            w.blank();
        }

        w.line(&format!(
            "{} {}.{}{}({})",
            ret.unwrap_or("void"),
            shape.declaring_type,
            shape.name,
            op.generic_list,
            param_types_and_names(&op.params)
        ));
        w.block(|w| {
            assign_out_defaults(w, &op.params);
            w.line(&format!(
                "if ({slots}.TryGetValue({key}, out var implementation))"
            ));
            w.block(|w| {
                w.line(&format!(
                    "{}(({})implementation)({});",
                    return_clause(ret),
                    implementation_type,
                    param_names(&op.params)
                ));
            });
            if let Some(ret) = ret {
                w.line(&format!("return default({ret});"));
            }
        });
    }
}

impl PatternSynthesizer for StubSynthesizer {
    fn usings(&self) -> &'static [&'static str] {
        &["System", "System.Collections.Generic", "System.Delegation"]
    }

    fn class_declaration(&mut self, contract: &ContractDecl) -> String {
        let iface = contract.type_ref().render(contract.scope());
        let constraints = render_constraint_clause(&contract.generics, contract.scope());
        format!(
            "Stub{}{} : {}{}",
            contract.base_name(),
            contract.generic_suffix(),
            iface,
            constraints
        )
    }

    fn operation(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Operation(op) = &shape.kind else {
            return;
        };
        if op.is_generic() {
            self.generic_operation(w, shape, op);
        } else {
            self.plain_operation(w, shape, op);
        }
    }

    fn accessor(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Accessor(acc) = &shape.kind else {
            return;
        };
        let res = self.registry.resolve(&shape.name, &acc.value_type, false);
        let local = res.local_name;

        if !res.repeat_signature {
            w.line(&format!(
                "public PropertyImplementation<{v}> {local} = new PropertyImplementation<{v}>();",
                v = acc.value_type
            ));
            w.blank();
        }

        w.line(&format!(
            "{} {}.{}",
            acc.value_type, shape.declaring_type, shape.name
        ));
        w.block(|w| {
            if acc.readable {
                w.line("get");
                w.block(|w| w.line(&format!("return this.{local}.get();")));
            }
            if acc.writable {
                w.line("set");
                w.block(|w| w.line(&format!("this.{local}.set(value);")));
            }
        });
    }

    fn indexed_accessor(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::IndexedAccessor(idx) = &shape.kind else {
            return;
        };
        let types = param_types(&idx.params);
        let names = param_names(&idx.params);
        let res = self.registry.resolve(&shape.name, &types, false);
        let getter = format!("get_{}", res.local_name);
        let setter = format!("set_{}", res.local_name);

        // No shared backing storage: there is no natural default container
        // for an index-addressed member.
        if !res.repeat_signature {
            if idx.readable {
                w.line(&format!(
                    "public System.Func<{types}, {v}> {getter} = ({names}) => default({v});",
                    v = idx.value_type
                ));
                w.blank();
            }
            if idx.writable {
                w.line(&format!(
                    "public System.Action<{types}, {v}> {setter} = ({names}, value) => {{ }};",
                    v = idx.value_type
                ));
                w.blank();
            }
        }

        w.line(&format!(
            "{} {}.this[{}]",
            idx.value_type,
            shape.declaring_type,
            param_types_and_names(&idx.params)
        ));
        w.block(|w| {
            if idx.readable {
                w.line("get");
                w.block(|w| w.line(&format!("return {getter}({names});")));
            }
            if idx.writable {
                w.line("set");
                w.block(|w| w.line(&format!("{setter}({names}, value);")));
            }
        });
    }

    fn notification(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Notification(n) = &shape.kind else {
            return;
        };
        let res = self.registry.resolve(&shape.name, &n.handler_type, false);
        let local = res.local_name;

        if !res.repeat_signature {
            w.line(&format!(
                "public EventImplementation<{p}> {local} = new EventImplementation<{p}>();",
                p = n.payload_type
            ));
            w.blank();
        }

        w.line(&format!(
            "event {} {}.{}",
            n.handler_type, shape.declaring_type, shape.name
        ));
        w.block(|w| {
            w.line("add");
            w.block(|w| {
                w.line(&format!(
                    "{local}.add(new System.EventHandler<{}>(value));",
                    n.payload_type
                ));
            });
            w.line("remove");
            w.block(|w| {
                w.line(&format!(
                    "{local}.remove(new System.EventHandler<{}>(value));",
                    n.payload_type
                ));
            });
        });
    }
}
