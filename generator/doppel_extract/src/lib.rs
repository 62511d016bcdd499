//! Doppel Extract - Member Extraction
//!
//! Walks a contract declaration and its ancestor contracts, producing the
//! ordered, duplicate-eliminated list of member shapes every pattern
//! synthesizer consumes.
//!
//! # Ordering
//!
//! Members of the contract itself come first, then members contributed by
//! each ancestor in declaration order, recursively. The most-derived
//! declaration of a signature therefore appears earliest, which is what lets
//! it win the unqualified name during synthesis.
//!
//! # Duplicate elimination
//!
//! A member is dropped when an identical (declaring contract, name,
//! parameter-type sequence) tuple already appeared - the diamond case where
//! several ancestor paths re-expose the same inherited member. Members with
//! the same name and signature but *different* declaring contracts are both
//! kept; deciding how to emit those is the Name Registry's job.

mod error;
mod shape;

pub use error::ExtractError;
pub use shape::{
    has_by_ref, param_names, param_types, param_types_and_names, AccessorShape, ConstructorShape,
    IndexedShape, MemberShape, NotificationShape, OperationShape, ResolvedParam, ShapeKind,
};

use doppel_ir::{
    render_constraint_clause, render_generic_list, ContractDecl, ContractKind, MemberDecl,
    ParamDecl,
};
use rustc_hash::FxHashSet;

/// Extract the full member surface of a contract.
///
/// Every type name in the result is rendered relative to the root contract's
/// namespace. Constructors are surfaced only when the root contract is an
/// extensible class; ancestor constructors are never inherited.
///
/// # Errors
///
/// Returns [`ExtractError::UnsupportedMember`] when the contract or any
/// ancestor declares a member kind outside the five recognized kinds. No
/// partial output is produced in that case.
pub fn extract(contract: &ContractDecl) -> Result<Vec<MemberShape>, ExtractError> {
    let scope = contract.scope().to_string();
    let mut shapes = Vec::new();
    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
    collect(contract, contract, &scope, &mut shapes, &mut seen)?;
    Ok(shapes)
}

fn collect(
    current: &ContractDecl,
    root: &ContractDecl,
    scope: &str,
    shapes: &mut Vec<MemberShape>,
    seen: &mut FxHashSet<(String, String)>,
) -> Result<(), ExtractError> {
    let declaring_type = current.type_ref().render(scope);
    let is_root = std::ptr::eq(current, root);

    for member in &current.members {
        if matches!(member, MemberDecl::Unrecognized) {
            return Err(ExtractError::UnsupportedMember {
                contract: current.name.clone(),
            });
        }
        if matches!(member, MemberDecl::Constructor { .. })
            && !(is_root && root.kind == ContractKind::ExtensibleClass)
        {
            continue;
        }

        let shape = resolve(member, &declaring_type, scope);
        if seen.insert((declaring_type.clone(), shape.signature())) {
            shapes.push(shape);
        }
    }

    for ancestor in &current.ancestors {
        collect(ancestor, root, scope, shapes, seen)?;
    }

    Ok(())
}

fn resolve_params(params: &[ParamDecl], scope: &str) -> Vec<ResolvedParam> {
    params
        .iter()
        .map(|p| ResolvedParam {
            name: p.name.clone(),
            type_name: p.ty.render(scope),
            mode: p.mode,
        })
        .collect()
}

fn resolve(member: &MemberDecl, declaring_type: &str, scope: &str) -> MemberShape {
    match member {
        MemberDecl::Operation {
            name,
            generics,
            params,
            returns,
            access,
            dispatch,
        } => {
            let return_type = returns
                .as_ref()
                .map(|ty| ty.render(scope))
                .filter(|rendered| rendered != "void");
            MemberShape {
                declaring_type: declaring_type.to_string(),
                name: name.clone(),
                access: *access,
                dispatch: *dispatch,
                kind: ShapeKind::Operation(OperationShape {
                    params: resolve_params(params, scope),
                    return_type,
                    generic_names: generics.iter().map(|g| g.name.clone()).collect(),
                    generic_list: render_generic_list(generics),
                    constraint_clause: render_constraint_clause(generics, scope),
                }),
            }
        }
        MemberDecl::Accessor {
            name,
            value,
            readable,
            writable,
            access,
            dispatch,
        } => MemberShape {
            declaring_type: declaring_type.to_string(),
            name: name.clone(),
            access: *access,
            dispatch: *dispatch,
            kind: ShapeKind::Accessor(AccessorShape {
                value_type: value.render(scope),
                readable: *readable,
                writable: *writable,
            }),
        },
        MemberDecl::IndexedAccessor {
            name,
            params,
            value,
            readable,
            writable,
            access,
            dispatch,
        } => MemberShape {
            declaring_type: declaring_type.to_string(),
            name: name.clone(),
            access: *access,
            dispatch: *dispatch,
            kind: ShapeKind::IndexedAccessor(IndexedShape {
                params: resolve_params(params, scope),
                value_type: value.render(scope),
                readable: *readable,
                writable: *writable,
            }),
        },
        MemberDecl::Notification {
            name,
            handler,
            payload,
            access,
            dispatch,
        } => MemberShape {
            declaring_type: declaring_type.to_string(),
            name: name.clone(),
            access: *access,
            dispatch: *dispatch,
            kind: ShapeKind::Notification(NotificationShape {
                handler_type: handler.render(scope),
                payload_type: payload.render(scope),
            }),
        },
        MemberDecl::Constructor { params, access } => MemberShape {
            declaring_type: declaring_type.to_string(),
            name: String::new(),
            access: *access,
            dispatch: doppel_ir::Dispatch::Final,
            kind: ShapeKind::Constructor(ConstructorShape {
                params: resolve_params(params, scope),
            }),
        },
        // Checked before resolve is called.
        MemberDecl::Unrecognized => unreachable!("unrecognized members are rejected in collect"),
    }
}
