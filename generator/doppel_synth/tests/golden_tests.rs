//! Golden tests for the pattern synthesizers.
//!
//! Each test builds a small contract declaration and compares the complete
//! generated artifact against its expected text. The fixtures mirror the
//! member shapes that exercise the interesting paths: by-reference
//! parameters, overloads, diamond re-exposure, reserved list names, and the
//! class-override bridge pair.

#![allow(clippy::unwrap_used)]

use doppel_ir::{
    Access, ContractDecl, ContractKind, Dispatch, MemberDecl, ParamDecl, PassMode, TypeRef,
};
use doppel_synth::{synthesize, Pattern};
use pretty_assertions::assert_eq;

fn int() -> TypeRef {
    TypeRef::named("System", "Int32")
}

fn string_ty() -> TypeRef {
    TypeRef::named("System", "String")
}

fn operation(name: &str, params: Vec<ParamDecl>, returns: Option<TypeRef>) -> MemberDecl {
    MemberDecl::Operation {
        name: name.to_string(),
        generics: Vec::new(),
        params,
        returns,
        access: Access::Public,
        dispatch: Dispatch::Abstract,
    }
}

fn capability(name: &str, members: Vec<MemberDecl>) -> ContractDecl {
    ContractDecl {
        name: name.to_string(),
        namespace: Some("Tests.Types".to_string()),
        generics: Vec::new(),
        kind: ContractKind::Capability,
        members,
        ancestors: Vec::new(),
    }
}

#[test]
fn stub_for_representative_interface() {
    let contract = capability(
        "IExample",
        vec![
            MemberDecl::Accessor {
                name: "PropertyWithGetter".to_string(),
                value: int(),
                readable: true,
                writable: false,
                access: Access::Public,
                dispatch: Dispatch::Abstract,
            },
            MemberDecl::IndexedAccessor {
                name: "Item".to_string(),
                params: vec![ParamDecl::new("index", int())],
                value: string_ty(),
                readable: true,
                writable: true,
                access: Access::Public,
                dispatch: Dispatch::Abstract,
            },
            MemberDecl::Notification {
                name: "SimpleEvent".to_string(),
                handler: TypeRef::named("System", "EventHandler"),
                payload: TypeRef::named("System", "EventArgs"),
                access: Access::Public,
                dispatch: Dispatch::Abstract,
            },
            operation("StructMethod", Vec::new(), Some(int())),
            operation(
                "OutMethod",
                vec![
                    ParamDecl::new("input", int()),
                    ParamDecl::with_mode("output", int(), PassMode::Out),
                ],
                None,
            ),
        ],
    );

    let artifact = synthesize(&contract, Pattern::Stub).unwrap();
    assert_eq!(artifact.file_name, "StubExample.cs");
    assert_eq!(
        artifact.text,
        r#"// this file was created by doppel
using System;
using System.Collections.Generic;
using System.Delegation;

namespace Tests.Types
{
    public class StubExample : IExample
    {
        public PropertyImplementation<int> PropertyWithGetter = new PropertyImplementation<int>();

        int IExample.PropertyWithGetter
        {
            get
            {
                return this.PropertyWithGetter.get();
            }
        }

        public System.Func<int, string> get_Item = (index) => default(string);

        public System.Action<int, string> set_Item = (index, value) => { };

        string IExample.this[int index]
        {
            get
            {
                return get_Item(index);
            }
            set
            {
                set_Item(index, value);
            }
        }

        public EventImplementation<System.EventArgs> SimpleEvent = new EventImplementation<System.EventArgs>();

        event System.EventHandler IExample.SimpleEvent
        {
            add
            {
                SimpleEvent.add(new System.EventHandler<System.EventArgs>(value));
            }
            remove
            {
                SimpleEvent.remove(new System.EventHandler<System.EventArgs>(value));
            }
        }

        public System.Func<int> StructMethod { get; set; }

        int IExample.StructMethod()
        {
            if (this.StructMethod != null)
            {
                return this.StructMethod();
            }
            else
            {
                return default(int);
            }
        }

        public delegate void OutMethodDelegate_int_int(int input, out int output);

        public OutMethodDelegate_int_int OutMethod_int_int { get; set; }

        void IExample.OutMethod(int input, out int output)
        {
            output = default(int);
            if (this.OutMethod_int_int != null)
            {
                this.OutMethod_int_int(input, out output);
            }
        }
    }
}
"#
    );
}

#[test]
fn composite_qualifies_reserved_list_names() {
    let contract = capability(
        "ICounted",
        vec![
            MemberDecl::Accessor {
                name: "Count".to_string(),
                value: int(),
                readable: true,
                writable: false,
                access: Access::Public,
                dispatch: Dispatch::Abstract,
            },
            operation("Refresh", Vec::new(), None),
        ],
    );

    let artifact = synthesize(&contract, Pattern::Composite).unwrap();
    assert_eq!(artifact.file_name, "CompositeCounted.cs");
    assert_eq!(
        artifact.text,
        r#"// this file was created by doppel
using System.Linq;

namespace Tests.Types
{
    public class CompositeCounted : System.Collections.Generic.List<ICounted>, ICounted
    {
        int ICounted.Count
        {
            get
            {
                var results = this.Select<ICounted, int>(listItem => listItem.Count).ToList();
                return results.Count > 0 && results.All(result => result.Equals(results[0])) ? results[0] : default(int);
            }
        }

        public void Refresh()
        {
            for (int i = 0; i < base.Count; i++)
            {
                base[i].Refresh();
            }
        }
    }
}
"#
    );
}

#[test]
fn decorator_redirects_diamond_reexposure() {
    let base = capability("IBase", vec![operation("Ping", Vec::new(), None)]);
    let derived = ContractDecl {
        ancestors: vec![base],
        ..capability("IDerived", vec![operation("Ping", Vec::new(), None)])
    };

    let artifact = synthesize(&derived, Pattern::Decorator).unwrap();
    assert_eq!(artifact.file_name, "DerivedDecorator.cs");
    assert_eq!(
        artifact.text,
        r#"// this file was created by doppel

namespace Tests.Types
{
    public class DerivedDecorator : IDerived
    {
        protected IDerived InnerDerived { get; set; }

        public virtual void Ping()
        {
            if (InnerDerived != null)
            {
                InnerDerived.Ping();
            }
        }

        void IBase.Ping()
        {
            Ping();
        }
    }
}
"#
    );
}

#[test]
fn bridge_emits_cooperating_pair_for_class_contract() {
    let contract = ContractDecl {
        kind: ContractKind::ExtensibleClass,
        ..capability(
            "ExampleClass",
            vec![
                MemberDecl::Constructor {
                    params: vec![ParamDecl::new("number", int())],
                    access: Access::Public,
                },
                MemberDecl::Operation {
                    name: "MethodToCall1".to_string(),
                    generics: Vec::new(),
                    params: Vec::new(),
                    returns: None,
                    access: Access::Protected,
                    dispatch: Dispatch::Virtual,
                },
                MemberDecl::Operation {
                    name: "MethodToCall3".to_string(),
                    generics: Vec::new(),
                    params: Vec::new(),
                    returns: None,
                    access: Access::Public,
                    dispatch: Dispatch::Abstract,
                },
            ],
        )
    };

    let artifact = synthesize(&contract, Pattern::Stub).unwrap();
    assert_eq!(artifact.file_name, "StubExampleClass.cs");
    assert_eq!(
        artifact.text,
        r#"// this file was created by doppel
using System;
using System.Collections.Generic;
using System.Delegation;

namespace Tests.Types
{
    public class StubExampleClass : IntermediateStubExampleClass_DoNotUse
    {
        public StubExampleClass(int number) : base(number)
        {
            MethodToCall1 = BaseMethodToCall1;
        }

        public static System.IDisposable DeferConstruction(int number, out StubExampleClass stub)
        {
            var instance = (StubExampleClass)System.Runtime.Serialization.FormatterServices.GetUninitializedObject(typeof(StubExampleClass));
            stub = instance;
            return new DelayedConstruction(() => typeof(IntermediateStubExampleClass_DoNotUse).GetConstructor(System.Reflection.BindingFlags.Instance | System.Reflection.BindingFlags.Public | System.Reflection.BindingFlags.NonPublic, null, new System.Type[] { typeof(int) }, null).Invoke(instance, new object[] { number }));
        }

        public new System.Action MethodToCall1;

        public new System.Action MethodToCall3;
    }

    public class IntermediateStubExampleClass_DoNotUse : ExampleClass
    {
        protected IntermediateStubExampleClass_DoNotUse(int number) : base(number) { }

        public void BaseMethodToCall1()
        {
            base.MethodToCall1();
        }

        protected override void MethodToCall1()
        {
            if (((StubExampleClass)this).MethodToCall1 != null)
            {
                ((StubExampleClass)this).MethodToCall1();
            }
            else
            {
                BaseMethodToCall1();
            }
        }

        public override void MethodToCall3()
        {
            if (((StubExampleClass)this).MethodToCall3 != null)
            {
                ((StubExampleClass)this).MethodToCall3();
            }
        }
    }
}
"#
    );
}

#[test]
fn stub_overloads_get_deterministic_suffixes() {
    let contract = capability(
        "IHaveConflictingMethods",
        vec![
            operation("Method1", vec![ParamDecl::new("a", int())], None),
            operation(
                "Method1",
                vec![ParamDecl::new("s", string_ty())],
                Some(int()),
            ),
        ],
    );

    let artifact = synthesize(&contract, Pattern::Stub).unwrap();
    assert!(artifact.text.contains("public System.Action<int> Method1 { get; set; }"));
    assert!(artifact
        .text
        .contains("public System.Func<string, int> Method1_string { get; set; }"));
    assert!(artifact
        .text
        .contains("void IHaveConflictingMethods.Method1(int a)"));
    assert!(artifact
        .text
        .contains("int IHaveConflictingMethods.Method1(string s)"));
}

#[test]
fn stub_generic_operation_uses_slot_dictionary() {
    let contract = capability(
        "IHaveGenericMethods",
        vec![MemberDecl::Operation {
            name: "GenericMethod".to_string(),
            generics: vec![doppel_ir::GenericParam::new("T")],
            params: Vec::new(),
            returns: Some(TypeRef::param("T")),
            access: Access::Public,
            dispatch: Dispatch::Abstract,
        }],
    );

    let artifact = synthesize(&contract, Pattern::Stub).unwrap();
    assert!(artifact.text.contains(
        "private readonly System.Collections.Generic.Dictionary<Type[], object> GenericMethod_implementations"
    ));
    assert!(artifact
        .text
        .contains("new EnumerableEqualityComparer<Type>()"));
    assert!(artifact
        .text
        .contains("public void ImplementGenericMethod<T>(System.Func<T> implementation)"));
    assert!(artifact
        .text
        .contains("T IHaveGenericMethods.GenericMethod<T>()"));
    assert!(artifact.text.contains("return default(T);"));
}

#[test]
fn generic_contract_carries_arity_and_constraints() {
    let contract = ContractDecl {
        generics: vec![doppel_ir::GenericParam {
            flags: doppel_ir::ConstraintFlags::PARAMETERLESS_CTOR,
            ..doppel_ir::GenericParam::new("T")
        }],
        ..capability(
            "IHaveGenericProperty",
            vec![MemberDecl::Accessor {
                name: "Value".to_string(),
                value: TypeRef::param("T"),
                readable: true,
                writable: true,
                access: Access::Public,
                dispatch: Dispatch::Abstract,
            }],
        )
    };

    let artifact = synthesize(&contract, Pattern::Stub).unwrap();
    assert_eq!(artifact.file_name, "StubHaveGenericProperty`1.cs");
    assert!(artifact.text.contains(
        "public class StubHaveGenericProperty<T> : IHaveGenericProperty<T> where T : new()"
    ));
    assert!(artifact
        .text
        .contains("public PropertyImplementation<T> Value = new PropertyImplementation<T>();"));
}

#[test]
fn shadowed_accessor_with_different_type_goes_explicit() {
    let accessor = |value: TypeRef| MemberDecl::Accessor {
        name: "Value".to_string(),
        value,
        readable: true,
        writable: true,
        access: Access::Public,
        dispatch: Dispatch::Abstract,
    };
    let base = capability("IBase", vec![accessor(int())]);
    let derived = ContractDecl {
        ancestors: vec![base],
        ..capability("IDerived", vec![accessor(string_ty())])
    };

    let stub = synthesize(&derived, Pattern::Stub).unwrap();
    assert!(stub
        .text
        .contains("public PropertyImplementation<string> Value = new PropertyImplementation<string>();"));
    assert!(stub
        .text
        .contains("public PropertyImplementation<int> Value_int = new PropertyImplementation<int>();"));
    assert!(stub.text.contains("int IBase.Value"));
    assert!(stub.text.contains("return this.Value_int.get();"));

    let decorator = synthesize(&derived, Pattern::Decorator).unwrap();
    assert!(decorator.text.contains("public virtual string Value"));
    assert!(decorator.text.contains("int IBase.Value"));
    assert!(decorator
        .text
        .contains("return ((IBase)InnerDerived).Value;"));

    let composite = synthesize(&derived, Pattern::Composite).unwrap();
    assert!(composite.text.contains("public string Value"));
    assert!(composite.text.contains("int IBase.Value"));
    assert!(composite
        .text
        .contains("this.ForEach(listItem => ((IBase)listItem).Value = value);"));
}

#[test]
fn unsupported_member_kind_aborts_whole_contract() {
    let contract = capability(
        "IBad",
        vec![
            operation("Fine", Vec::new(), None),
            MemberDecl::Unrecognized,
        ],
    );

    for pattern in Pattern::all() {
        assert!(synthesize(&contract, pattern).is_err());
    }
}
