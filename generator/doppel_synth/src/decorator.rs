//! Decorator synthesis: wrap one inner implementer and forward by default.
//!
//! Every member is virtual so a subclass can replace just the members it
//! cares about; a derived custom decorator should need no glue code. The
//! inner reference is a protected settable property the generated code never
//! assigns - constructor injection, property injection, or leaving it unset
//! are all the consumer's choice. With no inner object, members degrade to
//! default values and no-ops.
//!
//! A signature re-exposed through a diamond of ancestors is emitted as an
//! explicit, non-virtual redirect onto the plain member, so overriding the
//! plain member also covers every nominal exposure.

use doppel_emit::SourceWriter;
use doppel_extract::{
    param_names, param_types, param_types_and_names, ConstructorShape, MemberShape, ShapeKind,
};
use doppel_ir::{render_constraint_clause, Access, ContractDecl, ContractKind, Dispatch};

use crate::registry::NameRegistry;
use crate::{assign_out_defaults, inner_reference_name, return_clause, PatternSynthesizer};

pub(crate) struct DecoratorSynthesizer {
    registry: NameRegistry,
    class_mode: bool,
    /// The contract type rendered relative to its namespace.
    target: String,
    /// Generated type name without generic suffix.
    type_name: String,
    /// Name of the inner-reference property.
    inner: String,
}

impl DecoratorSynthesizer {
    pub(crate) fn new() -> Self {
        Self {
            registry: NameRegistry::new(),
            class_mode: false,
            target: String::new(),
            type_name: String::new(),
            inner: String::new(),
        }
    }

    /// Class-mode participation. Protected virtual members are inherited
    /// unchanged (forwarding through a base-typed reference is not possible
    /// for them); protected abstract members get a default-only override to
    /// keep the type concrete.
    fn class_emission(&self, shape: &MemberShape) -> Option<ClassEmission> {
        if !self.class_mode {
            return Some(ClassEmission::Forward);
        }
        if !shape.is_overridable() {
            return None;
        }
        match (shape.access, shape.dispatch) {
            (Access::Public, _) => Some(ClassEmission::Forward),
            (Access::Protected, Dispatch::Abstract) => Some(ClassEmission::DefaultOnly),
            (Access::Protected, _) => None,
        }
    }

    fn guarded(&self, w: &mut SourceWriter, content: &str) {
        w.line(&format!("if ({} != null)", self.inner));
        w.block(|w| w.line(content));
    }
}

enum ClassEmission {
    Forward,
    DefaultOnly,
}

impl PatternSynthesizer for DecoratorSynthesizer {
    fn usings(&self) -> &'static [&'static str] {
        &[]
    }

    fn class_declaration(&mut self, contract: &ContractDecl) -> String {
        self.class_mode = contract.kind == ContractKind::ExtensibleClass;
        self.target = contract.type_ref().render(contract.scope());
        self.type_name = format!("{}Decorator", contract.base_name());
        self.inner = inner_reference_name(contract);
        let constraints = render_constraint_clause(&contract.generics, contract.scope());
        format!(
            "{}{} : {}{}",
            self.type_name,
            contract.generic_suffix(),
            self.target,
            constraints
        )
    }

    fn extra_members(&mut self, w: &mut SourceWriter, _contract: &ContractDecl) {
        w.line(&format!(
            "protected {} {} {{ get; set; }}",
            self.target, self.inner
        ));
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
        let names = param_names(&op.params);

        if self.class_mode {
            w.line(&format!(
                "{} override {} {}{}({})",
                shape.access.keyword(),
                ret.unwrap_or("void"),
                shape.name,
                op.generic_list,
                param_types_and_names(&op.params)
            ));
            w.block(|w| {
                assign_out_defaults(w, &op.params);
                if matches!(emission, ClassEmission::Forward) {
                    self.guarded(
                        w,
                        &format!(
                            "{}{}.{}{}({});",
                            return_clause(ret),
                            self.inner,
                            shape.name,
                            op.generic_list,
                            names
                        ),
                    );
                }
                if let Some(ret) = ret {
                    w.line(&format!("return default({ret});"));
                }
            });
            return;
        }

        let types = param_types(&op.params);
        let res = self.registry.resolve(&shape.name, &types, false);

        // Since an explicit implementation can't be virtual, the diamond
        // redirect calls the plain member; overriding the plain member
        // changes every nominal exposure at once.
        if res.repeat_signature {
            w.line(&format!(
                "{} {}.{}{}({})",
                ret.unwrap_or("void"),
                shape.declaring_type,
                shape.name,
                op.generic_list,
                param_types_and_names(&op.params)
            ));
            w.block(|w| {
                w.line(&format!(
                    "{}{}{}({});",
                    return_clause(ret),
                    shape.name,
                    op.generic_list,
                    names
                ));
            });
            return;
        }

        w.line(&format!(
            "public virtual {} {}{}({}){}",
            ret.unwrap_or("void"),
            shape.name,
            op.generic_list,
            param_types_and_names(&op.params),
            op.constraint_clause
        ));
        w.block(|w| {
            assign_out_defaults(w, &op.params);
            self.guarded(
                w,
                &format!(
                    "{}{}.{}{}({});",
                    return_clause(ret),
                    self.inner,
                    shape.name,
                    op.generic_list,
                    names
                ),
            );
            if let Some(ret) = ret {
                w.line(&format!("return default({ret});"));
            }
        });
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
            self.accessor_body(
                w,
                acc.readable,
                acc.writable,
                &acc.value_type,
                &format!("{}.{}", self.inner, shape.name),
                matches!(emission, ClassEmission::Forward),
            );
            return;
        }

        let res = self.registry.resolve(&shape.name, &acc.value_type, false);
        if res.repeat_signature {
            w.line(&format!(
                "{} {}.{}",
                acc.value_type, shape.declaring_type, shape.name
            ));
            w.block(|w| {
                if acc.readable {
                    w.line("get");
                    w.block(|w| w.line(&format!("return {};", shape.name)));
                }
                if acc.writable {
                    w.line("set");
                    w.block(|w| w.line(&format!("{} = value;", shape.name)));
                }
            });
            return;
        }

        // A same-named accessor with a different type further up the
        // ancestry cannot coexist with the plain one; it gets its own
        // explicit implementation, reaching the inner member through the
        // declaring contract.
        if res.local_name != shape.name {
            w.line(&format!(
                "{} {}.{}",
                acc.value_type, shape.declaring_type, shape.name
            ));
            self.accessor_body(
                w,
                acc.readable,
                acc.writable,
                &acc.value_type,
                &format!("(({}){}).{}", shape.declaring_type, self.inner, shape.name),
                true,
            );
            return;
        }

        w.line(&format!(
            "public virtual {} {}",
            acc.value_type, shape.name
        ));
        self.accessor_body(
            w,
            acc.readable,
            acc.writable,
            &acc.value_type,
            &format!("{}.{}", self.inner, shape.name),
            true,
        );
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
            self.accessor_body(
                w,
                idx.readable,
                idx.writable,
                &idx.value_type,
                &format!("{}[{}]", self.inner, names),
                matches!(emission, ClassEmission::Forward),
            );
            return;
        }

        let types = param_types(&idx.params);
        let res = self.registry.resolve(&shape.name, &types, false);
        if res.repeat_signature {
            w.line(&format!(
                "{} {}.this[{}]",
                idx.value_type,
                shape.declaring_type,
                param_types_and_names(&idx.params)
            ));
            w.block(|w| {
                if idx.readable {
                    w.line("get");
                    w.block(|w| w.line(&format!("return this[{names}];")));
                }
                if idx.writable {
                    w.line("set");
                    w.block(|w| w.line(&format!("this[{names}] = value;")));
                }
            });
            return;
        }

        w.line(&format!(
            "public virtual {} this[{}]",
            idx.value_type,
            param_types_and_names(&idx.params)
        ));
        self.accessor_body(
            w,
            idx.readable,
            idx.writable,
            &idx.value_type,
            &format!("{}[{}]", self.inner, names),
            true,
        );
    }

    fn notification(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Notification(n) = &shape.kind else {
            return;
        };
        let Some(emission) = self.class_emission(shape) else {
            return;
        };

        if self.class_mode {
            w.line(&format!(
                "{} override event {} {}",
                shape.access.keyword(),
                n.handler_type,
                shape.name
            ));
            let forward = matches!(emission, ClassEmission::Forward);
            w.block(|w| {
                w.line("add");
                w.block(|w| {
                    if forward {
                        self.guarded(w, &format!("{}.{} += value;", self.inner, shape.name));
                    }
                });
                w.line("remove");
                w.block(|w| {
                    if forward {
                        self.guarded(w, &format!("{}.{} -= value;", self.inner, shape.name));
                    }
                });
            });
            return;
        }

        let res = self.registry.resolve(&shape.name, &n.handler_type, false);
        if res.repeat_signature {
            w.line(&format!(
                "event {} {}.{}",
                n.handler_type, shape.declaring_type, shape.name
            ));
            w.block(|w| {
                w.line("add");
                w.block(|w| w.line(&format!("{} += value;", shape.name)));
                w.line("remove");
                w.block(|w| w.line(&format!("{} -= value;", shape.name)));
            });
            return;
        }

        // Shadowed same-named notification with a different handler type:
        // explicit implementation through the declaring contract.
        if res.local_name != shape.name {
            let target = format!("(({}){})", shape.declaring_type, self.inner);
            w.line(&format!(
                "event {} {}.{}",
                n.handler_type, shape.declaring_type, shape.name
            ));
            w.block(|w| {
                w.line("add");
                w.block(|w| {
                    self.guarded(w, &format!("{target}.{} += value;", shape.name));
                });
                w.line("remove");
                w.block(|w| {
                    self.guarded(w, &format!("{target}.{} -= value;", shape.name));
                });
            });
            return;
        }

        w.line(&format!(
            "public virtual event {} {}",
            n.handler_type, shape.name
        ));
        w.block(|w| {
            w.line("add");
            w.block(|w| {
                self.guarded(w, &format!("{}.{} += value;", self.inner, shape.name));
            });
            w.line("remove");
            w.block(|w| {
                self.guarded(w, &format!("{}.{} -= value;", self.inner, shape.name));
            });
        });
    }
}

impl DecoratorSynthesizer {
    /// Shared get/set body: forward through the inner reference when present,
    /// otherwise default value / no-op.
    fn accessor_body(
        &self,
        w: &mut SourceWriter,
        readable: bool,
        writable: bool,
        value_type: &str,
        member: &str,
        forward: bool,
    ) {
        w.block(|w| {
            if readable {
                w.line("get");
                w.block(|w| {
                    if forward {
                        self.guarded(w, &format!("return {member};"));
                    }
                    w.line(&format!("return default({value_type});"));
                });
            }
            if writable {
                w.line("set");
                w.block(|w| {
                    if forward {
                        self.guarded(w, &format!("{member} = value;"));
                    }
                });
            }
        });
    }
}
