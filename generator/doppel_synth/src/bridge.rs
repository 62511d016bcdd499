//! Class-override bridge: the Stub pattern for extensible base classes.
//!
//! A host type cannot declare a new member with the same name as an
//! inherited overridable member it intends to override, so the bridge
//! synthesizes two cooperating types:
//!
//! - The **outer type** (what consumers instantiate) declares only the new
//!   assignable behavior slots, named exactly as the inherited members.
//! - The **intermediate type**, sitting between the base class and the outer
//!   type, declares the actual overrides. Each override casts itself to the
//!   outer type and dispatches to the slot, falling back to the synthesized
//!   `Base{Name}` forwarder when the slot is unassigned - or to a default
//!   value where the base member is abstract and no original implementation
//!   exists.
//!
//! Every accessible base constructor gets an outer constructor that forwards
//! its arguments and then points each virtual member's slot at its
//! `Base{Name}` forwarder, plus a `DeferConstruction` helper that lets a
//! consumer assign replacement behavior *before* the base constructor runs:
//! the outer object is materialized unconstructed, slots are configured
//! inside a `using` scope, and disposing the scope invokes the matching
//! intermediate constructor reflectively.

use doppel_emit::SourceWriter;
use doppel_extract::{
    has_by_ref, param_names, param_types, param_types_and_names, ConstructorShape, MemberShape,
    OperationShape, ResolvedParam, ShapeKind,
};
use doppel_ir::{render_constraint_clause, ContractDecl, PassMode};

use crate::registry::{sanitize_identifier, NameRegistry};
use crate::{assign_out_defaults, delegate_type, return_clause, PatternSynthesizer};

pub(crate) struct BridgeSynthesizer {
    registry: NameRegistry,
    /// Body of the intermediate dispatch type, spliced in by `epilogue`.
    helper: SourceWriter,
    helper_wrote: bool,
    /// Outer type with generic suffix, e.g. `StubImporter<T>`.
    stub_type: String,
    /// Outer type name without suffix, used for constructor declarations.
    stub_name: String,
    /// Intermediate type with generic suffix.
    intermediate_type: String,
    /// Intermediate type name without suffix.
    intermediate_name: String,
    /// The base class rendered relative to its namespace.
    target: String,
    constraints: String,
}

impl BridgeSynthesizer {
    pub(crate) fn new() -> Self {
        Self {
            registry: NameRegistry::new(),
            helper: SourceWriter::new(),
            helper_wrote: false,
            stub_type: String::new(),
            stub_name: String::new(),
            intermediate_type: String::new(),
            intermediate_name: String::new(),
            target: String::new(),
            constraints: String::new(),
        }
    }

    /// Separate intermediate-type members with blank lines.
    fn helper_sep(&mut self) {
        if self.helper_wrote {
            self.helper.blank();
        }
        self.helper_wrote = true;
    }

    /// `(({StubX})this).` - the intermediate's view of the outer type.
    fn outer_cast(&self) -> String {
        format!("(({})this)", self.stub_type)
    }
}

impl PatternSynthesizer for BridgeSynthesizer {
    fn usings(&self) -> &'static [&'static str] {
        &["System", "System.Collections.Generic", "System.Delegation"]
    }

    fn class_declaration(&mut self, contract: &ContractDecl) -> String {
        let base = contract.base_name();
        let suffix = contract.generic_suffix();
        self.target = contract.type_ref().render(contract.scope());
        self.constraints = render_constraint_clause(&contract.generics, contract.scope());
        self.stub_name = format!("Stub{base}");
        self.stub_type = format!("{}{}", self.stub_name, suffix);
        self.intermediate_name = format!("IntermediateStub{base}_DoNotUse");
        self.intermediate_type = format!("{}{}", self.intermediate_name, suffix);

        format!(
            "{} : {}{}",
            self.stub_type, self.intermediate_type, self.constraints
        )
    }

    fn constructor(
        &mut self,
        w: &mut SourceWriter,
        _contract: &ContractDecl,
        ctor: &ConstructorShape,
        _shape: &MemberShape,
        members: &[MemberShape],
    ) {
        let tan = param_types_and_names(&ctor.params);
        let names = param_names(&ctor.params);

        w.line(&format!(
            "public {}({}) : base({})",
            self.stub_name, tan, names
        ));
        w.block(|w| emit_slot_defaults(w, members));
        w.blank();
        self.defer_construction(w, ctor, members);

        self.helper_sep();
        self.helper.line(&format!(
            "protected {}({}) : base({}) {{ }}",
            self.intermediate_name, tan, names
        ));
    }

    fn operation(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Operation(op) = &shape.kind else {
            return;
        };
        if !shape.is_overridable() {
            return;
        }
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
        if !shape.is_overridable() {
            return;
        }
        let res = self.registry.resolve(&shape.name, &acc.value_type, false);
        // An override can only be declared once per name; shadowing
        // re-declarations up the base chain have nothing to attach to.
        if res.repeat_signature || res.local_name != shape.name {
            return;
        }

        w.line(&format!(
            "public new PropertyImplementation<{v}> {} = new PropertyImplementation<{v}>();",
            shape.name,
            v = acc.value_type
        ));

        let cast = self.outer_cast();
        let access = shape.access.keyword();

        if shape.has_base_implementation() {
            self.helper_sep();
            self.helper
                .line(&format!("public {} Base{}", acc.value_type, shape.name));
            let (readable, writable, name) = (acc.readable, acc.writable, shape.name.clone());
            self.helper.block(|h| {
                if readable {
                    h.line(&format!("get {{ return base.{name}; }}"));
                }
                if writable {
                    h.line(&format!("set {{ base.{name} = value; }}"));
                }
            });
        }

        self.helper_sep();
        self.helper.line(&format!(
            "{access} override {} {}",
            acc.value_type, shape.name
        ));
        let (readable, writable, name) = (acc.readable, acc.writable, shape.name.clone());
        self.helper.block(|h| {
            if readable {
                h.line(&format!("get {{ return {cast}.{name}.get(); }}"));
            }
            if writable {
                h.line(&format!("set {{ {cast}.{name}.set(value); }}"));
            }
        });
    }

    fn indexed_accessor(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::IndexedAccessor(idx) = &shape.kind else {
            return;
        };
        if !shape.is_overridable() {
            return;
        }
        let types = param_types(&idx.params);
        let res = self.registry.resolve(&shape.name, &types, false);
        if res.repeat_signature {
            return;
        }
        let local = res.local_name;
        let getter = format!("get_{local}");
        let setter = format!("set_{local}");
        let tan = param_types_and_names(&idx.params);
        let names = param_names(&idx.params);
        let cast = self.outer_cast();
        let access = shape.access.keyword();
        let virtual_base = shape.has_base_implementation();

        if idx.readable {
            w.line(&format!(
                "public new Func<{types}, {}> {getter};",
                idx.value_type
            ));
        }
        if idx.writable {
            w.line(&format!(
                "public new Action<{types}, {}> {setter};",
                idx.value_type
            ));
        }

        if virtual_base {
            if idx.readable {
                self.helper_sep();
                self.helper.line(&format!(
                    "public {} Base_{getter}({tan})",
                    idx.value_type
                ));
                self.helper
                    .block(|h| h.line(&format!("return base[{names}];")));
            }
            if idx.writable {
                self.helper_sep();
                self.helper.line(&format!(
                    "public void Base_{setter}({tan}, {} value)",
                    idx.value_type
                ));
                self.helper
                    .block(|h| h.line(&format!("base[{names}] = value;")));
            }
        }

        self.helper_sep();
        self.helper.line(&format!(
            "{access} override {} this[{tan}]",
            idx.value_type
        ));
        let (readable, writable, value_type) =
            (idx.readable, idx.writable, idx.value_type.clone());
        self.helper.block(|h| {
            if readable {
                h.line("get");
                h.block(|h| {
                    h.line(&format!("if ({cast}.{getter} != null)"));
                    h.block(|h| h.line(&format!("return {cast}.{getter}({names});")));
                    if virtual_base {
                        h.line(&format!("return base[{names}];"));
                    } else {
                        h.line(&format!("return default({value_type});"));
                    }
                });
            }
            if writable {
                h.line("set");
                h.block(|h| {
                    h.line(&format!("if ({cast}.{setter} != null)"));
                    h.block(|h| h.line(&format!("{cast}.{setter}({names}, value);")));
                    if virtual_base {
                        h.line("else");
                        h.block(|h| h.line(&format!("base[{names}] = value;")));
                    }
                });
            }
        });
    }

    fn notification(&mut self, w: &mut SourceWriter, shape: &MemberShape) {
        let ShapeKind::Notification(n) = &shape.kind else {
            return;
        };
        if !shape.is_overridable() {
            return;
        }
        let res = self.registry.resolve(&shape.name, &n.handler_type, false);
        if res.repeat_signature || res.local_name != shape.name {
            return;
        }

        w.line(&format!(
            "public new EventImplementation<{p}> {} = new EventImplementation<{p}>();",
            shape.name,
            p = n.payload_type
        ));

        let cast = self.outer_cast();
        let access = shape.access.keyword();

        if shape.has_base_implementation() {
            self.helper_sep();
            self.helper.line(&format!(
                "public void Base{n}Add({h} e) {{ base.{n} += e; }}",
                n = shape.name,
                h = n.handler_type
            ));
            self.helper.line(&format!(
                "public void Base{n}Remove({h} e) {{ base.{n} -= e; }}",
                n = shape.name,
                h = n.handler_type
            ));
        }

        self.helper_sep();
        self.helper.line(&format!(
            "{access} override event {} {}",
            n.handler_type, shape.name
        ));
        let (name, payload) = (shape.name.clone(), n.payload_type.clone());
        self.helper.block(|h| {
            h.line(&format!(
                "add {{ {cast}.{name}.add(new EventHandler<{payload}>(value)); }}"
            ));
            h.line(&format!(
                "remove {{ {cast}.{name}.remove(new EventHandler<{payload}>(value)); }}"
            ));
        });
    }

    fn epilogue(&mut self, w: &mut SourceWriter, _contract: &ContractDecl) {
        let body = std::mem::take(&mut self.helper).finish();
        w.blank();
        w.line(&format!(
            "public class {} : {}{}",
            self.intermediate_type, self.target, self.constraints
        ));
        w.block(|w| w.splice(&body));
    }
}

impl BridgeSynthesizer {
    fn plain_operation(&mut self, w: &mut SourceWriter, shape: &MemberShape, op: &OperationShape) {
        let types = param_types(&op.params);
        let by_ref = has_by_ref(&op.params);
        let res = self.registry.resolve(&shape.name, &types, by_ref);
        if res.repeat_signature {
            return;
        }
        let local = res.local_name;
        let ret = op.return_type.as_deref();
        let tan = param_types_and_names(&op.params);
        let names = param_names(&op.params);

        let delegate_name = if by_ref {
            let delegate_name = format!("{}Delegate_{}", shape.name, sanitize_identifier(&types));
            w.line(&format!(
                "public delegate {} {delegate_name}({tan});",
                ret.unwrap_or("void")
            ));
            w.blank();
            delegate_name
        } else {
            delegate_type(ret, &types)
        };

        w.line(&format!("public new {delegate_name} {local};"));

        if shape.has_base_implementation() {
            self.helper_sep();
            self.helper.line(&format!(
                "public {} Base{}({tan})",
                ret.unwrap_or("void"),
                shape.name
            ));
            let (rc, name) = (return_clause(ret), shape.name.clone());
            let names_clone = names.clone();
            self.helper
                .block(|h| h.line(&format!("{rc}base.{name}({names_clone});")));
        }

        self.helper_sep();
        self.helper.line(&format!(
            "{} override {} {}({tan})",
            shape.access.keyword(),
            ret.unwrap_or("void"),
            shape.name
        ));
        let cast = self.outer_cast();
        let call = format!("{cast}.{local}");
        let virtual_base = shape.has_base_implementation();
        let name = shape.name.clone();
        let params = op.params.clone();
        self.helper.block(|h| {
            assign_out_defaults(h, &params);
            h.line(&format!("if ({call} != null)"));
            h.block(|h| h.line(&format!("{}{call}({names});", return_clause(ret))));
            match (ret, virtual_base) {
                (Some(_), true) => h.line(&format!("return Base{name}({names});")),
                (Some(ret), false) => h.line(&format!("return default({ret});")),
                (None, true) => {
                    h.line("else");
                    h.block(|h| h.line(&format!("Base{name}({names});")));
                }
                (None, false) => {}
            }
        });
    }

    /// Generic operations get the per-type-argument slot dictionary. The
    /// dictionary lives on the outer type but the intermediate dispatches
    /// into it, so unlike the plain stub it cannot be private.
    fn generic_operation(
        &mut self,
        w: &mut SourceWriter,
        shape: &MemberShape,
        op: &OperationShape,
    ) {
        let types = param_types(&op.params);
        let by_ref = has_by_ref(&op.params);
        let res = self.registry.resolve(&shape.name, &types, false);
        if res.repeat_signature {
            return;
        }
        let local = res.local_name;
        let ret = op.return_type.as_deref();
        let tan = param_types_and_names(&op.params);
        let names = param_names(&op.params);
        let slots = format!("{local}_implementations");

        let typeofs: Vec<String> = op
            .generic_names
            .iter()
            .map(|n| format!("typeof({n})"))
            .collect();
        let key = format!("new Type[] {{ {} }}", typeofs.join(", "));

        let implementation_type = if by_ref {
            let delegate_name = format!("{}Delegate_{}", shape.name, sanitize_identifier(&types));
            w.line(&format!(
                "public delegate {} {delegate_name}{}({tan});",
                ret.unwrap_or("void"),
                op.generic_list
            ));
            w.blank();
            format!("{delegate_name}{}", op.generic_list)
        } else {
            delegate_type(ret, &types)
        };

        w.line(&format!(
            "public readonly Dictionary<Type[], object> {slots} = new Dictionary<Type[], object>(new EnumerableEqualityComparer<Type>());"
        ));
        w.blank();
        w.line(&format!(
            "public void Implement{local}{}({implementation_type} implementation){}",
            op.generic_list, op.constraint_clause
        ));
        w.block(|w| w.line(&format!("{slots}[{key}] = implementation;")));

        if shape.has_base_implementation() {
            self.helper_sep();
            self.helper.line(&format!(
                "public {} Base{}{}({tan}){}",
                ret.unwrap_or("void"),
                shape.name,
                op.generic_list,
                op.constraint_clause
            ));
            let (rc, name, list) = (
                return_clause(ret),
                shape.name.clone(),
                op.generic_list.clone(),
            );
            let names_clone = names.clone();
            self.helper
                .block(|h| h.line(&format!("{rc}base.{name}{list}({names_clone});")));
        }

        self.helper_sep();
        self.helper.line(&format!(
            "{} override {} {}{}({tan})",
            shape.access.keyword(),
            ret.unwrap_or("void"),
            shape.name,
            op.generic_list
        ));
        let cast = self.outer_cast();
        let virtual_base = shape.has_base_implementation();
        let name = shape.name.clone();
        let list = op.generic_list.clone();
        let params = op.params.clone();
        self.helper.block(|h| {
            assign_out_defaults(h, &params);
            h.line(&format!(
                "if ({cast}.{slots}.TryGetValue({key}, out var implementation))"
            ));
            h.block(|h| {
                h.line(&format!(
                    "{}(({implementation_type})implementation)({names});",
                    return_clause(ret)
                ));
            });
            match (ret, virtual_base) {
                (Some(_), true) => h.line(&format!("return Base{name}{list}({names});")),
                (Some(ret), false) => h.line(&format!("return default({ret});")),
                (None, true) => {
                    h.line("else");
                    h.block(|h| h.line(&format!("Base{name}{list}({names});")));
                }
                (None, false) => {}
            }
        });
    }

    /// The scoped pre-configuration helper. The outer object is created
    /// without running any constructor, its accessor and notification cells
    /// are created so behavior can be assigned to them, and the returned
    /// guard runs the matching intermediate constructor on disposal -
    /// guaranteeing construction happens on every exit path of the scope.
    fn defer_construction(
        &self,
        w: &mut SourceWriter,
        ctor: &ConstructorShape,
        members: &[MemberShape],
    ) {
        let tan = param_types_and_names(&ctor.params);
        let lead = if tan.is_empty() {
            String::new()
        } else {
            format!("{tan}, ")
        };

        w.line(&format!(
            "public static System.IDisposable DeferConstruction({lead}out {} stub)",
            self.stub_type
        ));
        let stub_type = self.stub_type.clone();
        let intermediate_type = self.intermediate_type.clone();
        w.block(|w| {
            w.line(&format!(
                "var instance = ({stub_type})System.Runtime.Serialization.FormatterServices.GetUninitializedObject(typeof({stub_type}));"
            ));
            let mut cells_created: Vec<&str> = Vec::new();
            for member in members.iter().filter(|m| m.is_overridable()) {
                if cells_created.contains(&member.name.as_str()) {
                    continue;
                }
                match &member.kind {
                    ShapeKind::Accessor(acc) => {
                        w.line(&format!(
                            "instance.{} = new PropertyImplementation<{}>();",
                            member.name, acc.value_type
                        ));
                        cells_created.push(&member.name);
                    }
                    ShapeKind::Notification(n) => {
                        w.line(&format!(
                            "instance.{} = new EventImplementation<{}>();",
                            member.name, n.payload_type
                        ));
                        cells_created.push(&member.name);
                    }
                    _ => {}
                }
            }
            w.line("stub = instance;");

            let type_list = if ctor.params.is_empty() {
                "new System.Type[0]".to_string()
            } else {
                let typeofs: Vec<String> = ctor.params.iter().map(typeof_expr).collect();
                format!("new System.Type[] {{ {} }}", typeofs.join(", "))
            };
            let arg_list = if ctor.params.is_empty() {
                "new object[0]".to_string()
            } else {
                let args: Vec<String> = ctor.params.iter().map(ctor_argument).collect();
                format!("new object[] {{ {} }}", args.join(", "))
            };

            w.line(&format!(
                "return new DelayedConstruction(() => typeof({intermediate_type}).GetConstructor(System.Reflection.BindingFlags.Instance | System.Reflection.BindingFlags.Public | System.Reflection.BindingFlags.NonPublic, null, {type_list}, null).Invoke(instance, {arg_list}));"
            ));
        });
    }
}

/// Point every virtual member's slot at its `Base{Name}` forwarder so a base
/// constructor calling into overridable members reaches the original
/// implementation instead of unconfigured behavior.
fn emit_slot_defaults(w: &mut SourceWriter, members: &[MemberShape]) {
    // Mirrors the emission pass's resolution order so slot names line up.
    let mut names = NameRegistry::new();

    for member in members {
        match &member.kind {
            ShapeKind::Operation(op) => {
                if !member.is_overridable() {
                    continue;
                }
                let types = param_types(&op.params);
                let force = has_by_ref(&op.params) && !op.is_generic();
                let res = names.resolve(&member.name, &types, force);
                if res.repeat_signature || op.is_generic() {
                    continue;
                }
                if member.has_base_implementation() {
                    w.line(&format!("{} = Base{};", res.local_name, member.name));
                }
            }
            ShapeKind::Accessor(acc) => {
                if !member.is_overridable() {
                    continue;
                }
                let res = names.resolve(&member.name, &acc.value_type, false);
                if res.repeat_signature || res.local_name != member.name {
                    continue;
                }
                if member.has_base_implementation() {
                    if acc.readable {
                        w.line(&format!("{n}.get = () => Base{n};", n = member.name));
                    }
                    if acc.writable {
                        w.line(&format!("{n}.set = value => Base{n} = value;", n = member.name));
                    }
                }
            }
            ShapeKind::IndexedAccessor(idx) => {
                if !member.is_overridable() {
                    continue;
                }
                let res = names.resolve(&member.name, &param_types(&idx.params), false);
                if res.repeat_signature {
                    continue;
                }
                if member.has_base_implementation() {
                    if idx.readable {
                        w.line(&format!(
                            "get_{l} = Base_get_{l};",
                            l = res.local_name
                        ));
                    }
                    if idx.writable {
                        w.line(&format!(
                            "set_{l} = Base_set_{l};",
                            l = res.local_name
                        ));
                    }
                }
            }
            ShapeKind::Notification(n) => {
                if !member.is_overridable() {
                    continue;
                }
                let res = names.resolve(&member.name, &n.handler_type, false);
                if res.repeat_signature || res.local_name != member.name {
                    continue;
                }
                if member.has_base_implementation() {
                    w.line(&format!(
                        "{n}.add = value => Base{n}Add(new {h}(value));",
                        n = member.name,
                        h = n.handler_type
                    ));
                    w.line(&format!(
                        "{n}.remove = value => Base{n}Remove(new {h}(value));",
                        n = member.name,
                        h = n.handler_type
                    ));
                }
            }
            ShapeKind::Constructor(_) => {}
        }
    }
}

/// The `typeof` expression matching a constructor parameter for reflective
/// lookup.
fn typeof_expr(param: &ResolvedParam) -> String {
    if param.mode.is_by_ref() {
        format!("typeof({}).MakeByRefType()", param.type_name)
    } else {
        format!("typeof({})", param.type_name)
    }
}

/// The argument expression forwarded through the reflective constructor
/// invocation.
fn ctor_argument(param: &ResolvedParam) -> String {
    match param.mode {
        PassMode::Out => format!("default({})", param.type_name),
        _ => param.name.clone(),
    }
}
