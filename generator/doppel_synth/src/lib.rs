//! Doppel Synth - Pattern Synthesizers
//!
//! Consumes the member shapes produced by `doppel_extract` and emits complete
//! type-definition artifacts:
//!
//! - **Stub**: every member backed by an independently assignable behavior
//!   slot, defaulting to no-op/default-value behavior.
//! - **Composite**: an ordered collection of implementers; calls fan out to
//!   every element and value results reduce by consensus.
//! - **Decorator**: wraps one inner implementer, forwards by default, and
//!   stays overridable member by member.
//! - **Class-Override Bridge**: the Stub pattern for extensible classes,
//!   split across an outer slot type and an intermediate dispatch type.
//!
//! Synthesis is a pure function of the member list: the same contract
//! metadata always produces byte-identical artifacts. Each pattern run owns
//! its `NameRegistry` and its writers; nothing is shared across runs.

mod bridge;
mod composite;
mod decorator;
mod registry;
mod stub;
pub mod support;

pub use registry::{sanitize_identifier, NameRegistry, Resolution};

use doppel_emit::SourceWriter;
use doppel_extract::{
    extract, ConstructorShape, ExtractError, MemberShape, ResolvedParam, ShapeKind,
};
use doppel_ir::{ContractDecl, ContractKind, PassMode};
use thiserror::Error;

/// Comment stamped at the top of every artifact.
const GENERATED_HEADER: &str = "// this file was created by doppel";

/// Which pattern to synthesize.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Pattern {
    Stub,
    Composite,
    Decorator,
}

impl Pattern {
    /// Every pattern, in emission order.
    pub fn all() -> [Pattern; 3] {
        [Pattern::Stub, Pattern::Composite, Pattern::Decorator]
    }
}

/// One generated text artifact.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Artifact {
    /// Deterministic output file name, e.g. ``StubExample`1.cs``.
    pub file_name: String,
    /// The complete source text.
    pub text: String,
}

/// A failure that aborts synthesis for one contract type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// The deterministic artifact name for a contract/pattern combination.
pub fn artifact_name(contract: &ContractDecl, pattern: Pattern) -> String {
    let base = contract.base_name();
    let arity = contract.arity_marker();
    match pattern {
        Pattern::Stub => format!("Stub{base}{arity}.cs"),
        Pattern::Composite => format!("Composite{base}{arity}.cs"),
        Pattern::Decorator => format!("{base}Decorator{arity}.cs"),
    }
}

/// Synthesize one pattern for one contract.
///
/// For an extensible-class contract the Stub pattern produces the
/// class-override bridge: the outer slot type plus its intermediate dispatch
/// type in a single artifact.
///
/// # Errors
///
/// Fails when member extraction fails; no partial artifact is produced.
pub fn synthesize(contract: &ContractDecl, pattern: Pattern) -> Result<Artifact, SynthError> {
    let members = extract(contract)?;
    Ok(synthesize_members(contract, &members, pattern))
}

/// Synthesize every pattern for one contract. The member list is extracted
/// once and consumed by each pattern run independently.
///
/// # Errors
///
/// Fails when member extraction fails for the contract.
pub fn synthesize_all(contract: &ContractDecl) -> Result<Vec<Artifact>, SynthError> {
    let members = extract(contract)?;
    Ok(Pattern::all()
        .iter()
        .map(|&pattern| synthesize_members(contract, &members, pattern))
        .collect())
}

fn synthesize_members(
    contract: &ContractDecl,
    members: &[MemberShape],
    pattern: Pattern,
) -> Artifact {
    let file_name = artifact_name(contract, pattern);
    tracing::debug!(contract = %contract.name, artifact = %file_name, "synthesizing");

    let text = match (pattern, contract.kind) {
        (Pattern::Stub, ContractKind::ExtensibleClass) => {
            run_pattern(contract, members, &mut bridge::BridgeSynthesizer::new())
        }
        (Pattern::Stub, ContractKind::Capability) => {
            run_pattern(contract, members, &mut stub::StubSynthesizer::new())
        }
        (Pattern::Composite, _) => {
            run_pattern(contract, members, &mut composite::CompositeSynthesizer::new())
        }
        (Pattern::Decorator, _) => {
            run_pattern(contract, members, &mut decorator::DecoratorSynthesizer::new())
        }
    };

    Artifact { file_name, text }
}

/// One pattern's emission callbacks.
///
/// The driver owns the artifact frame (header, usings, namespace, class
/// declaration, member order); implementations own the member bodies.
pub(crate) trait PatternSynthesizer {
    /// `using` directives the generated bodies rely on.
    fn usings(&self) -> &'static [&'static str];

    /// The class declaration following `public class `. Called first; a
    /// synthesizer may cache contract-derived names here.
    fn class_declaration(&mut self, contract: &ContractDecl) -> String;

    /// Members that precede the contract surface, such as the Decorator's
    /// inner reference.
    fn extra_members(&mut self, _w: &mut SourceWriter, _contract: &ContractDecl) {}

    /// A constructor of an extensible-class contract.
    fn constructor(
        &mut self,
        _w: &mut SourceWriter,
        _contract: &ContractDecl,
        _ctor: &ConstructorShape,
        _shape: &MemberShape,
        _members: &[MemberShape],
    ) {
    }

    fn operation(&mut self, w: &mut SourceWriter, shape: &MemberShape);
    fn accessor(&mut self, w: &mut SourceWriter, shape: &MemberShape);
    fn indexed_accessor(&mut self, w: &mut SourceWriter, shape: &MemberShape);
    fn notification(&mut self, w: &mut SourceWriter, shape: &MemberShape);

    /// Emitted after the class body, still inside the namespace; the bridge
    /// places its intermediate dispatch type here.
    fn epilogue(&mut self, _w: &mut SourceWriter, _contract: &ContractDecl) {}
}

/// Emit the complete artifact frame for one pattern run.
pub(crate) fn run_pattern(
    contract: &ContractDecl,
    members: &[MemberShape],
    synth: &mut dyn PatternSynthesizer,
) -> String {
    let mut w = SourceWriter::new();
    w.line(GENERATED_HEADER);
    let usings = synth.usings();
    if usings.is_empty() {
        w.blank();
    } else {
        w.usings(usings);
    }

    let scope = contract.scope().to_string();
    if scope.is_empty() {
        emit_type(&mut w, contract, members, synth);
    } else {
        w.line(&format!("namespace {scope}"));
        w.block(|w| emit_type(w, contract, members, synth));
    }

    w.finish()
}

fn emit_type(
    w: &mut SourceWriter,
    contract: &ContractDecl,
    members: &[MemberShape],
    synth: &mut dyn PatternSynthesizer,
) {
    w.line(&format!("public class {}", synth.class_declaration(contract)));
    w.block(|w| {
        let mut wrote_any = false;

        let mut lead = SourceWriter::new();
        synth.extra_members(&mut lead, contract);
        let lead = lead.finish();
        if !lead.is_empty() {
            w.splice(&lead);
            wrote_any = true;
        }

        // Constructors first, then the remaining surface, both in extraction
        // order. Members a pattern skips leave no separator behind.
        let (ctors, rest): (Vec<&MemberShape>, Vec<&MemberShape>) = members
            .iter()
            .partition(|m| matches!(m.kind, ShapeKind::Constructor(_)));
        for shape in ctors.into_iter().chain(rest) {
            let mut mw = SourceWriter::new();
            dispatch(&mut mw, contract, shape, members, synth);
            let text = mw.finish();
            if text.is_empty() {
                continue;
            }
            if wrote_any {
                w.blank();
            }
            w.splice(&text);
            wrote_any = true;
        }
    });
    synth.epilogue(w, contract);
}

fn dispatch(
    w: &mut SourceWriter,
    contract: &ContractDecl,
    shape: &MemberShape,
    members: &[MemberShape],
    synth: &mut dyn PatternSynthesizer,
) {
    match &shape.kind {
        ShapeKind::Constructor(ctor) => synth.constructor(w, contract, ctor, shape, members),
        ShapeKind::Operation(_) => synth.operation(w, shape),
        ShapeKind::Accessor(_) => synth.accessor(w, shape),
        ShapeKind::IndexedAccessor(_) => synth.indexed_accessor(w, shape),
        ShapeKind::Notification(_) => synth.notification(w, shape),
    }
}

/// The framework callable type matching a parameter/return shape:
/// `System.Action<...>` for void operations, `System.Func<..., R>` otherwise.
pub(crate) fn delegate_type(return_type: Option<&str>, types: &str) -> String {
    match return_type {
        None => {
            if types.is_empty() {
                "System.Action".to_string()
            } else {
                format!("System.Action<{types}>")
            }
        }
        Some(ret) => {
            if types.is_empty() {
                format!("System.Func<{ret}>")
            } else {
                format!("System.Func<{types}, {ret}>")
            }
        }
    }
}

/// `return ` for value-producing bodies, empty for void ones.
pub(crate) fn return_clause(return_type: Option<&str>) -> &'static str {
    if return_type.is_some() {
        "return "
    } else {
        ""
    }
}

/// Assign a default value to every output-mode parameter. Emitted before any
/// branch that might skip assignment, so generated bodies satisfy definite
/// assignment on all exit paths.
pub(crate) fn assign_out_defaults(w: &mut SourceWriter, params: &[ResolvedParam]) {
    for param in params.iter().filter(|p| p.mode == PassMode::Out) {
        w.line(&format!("{} = default({});", param.name, param.type_name));
    }
}

/// The Decorator's inner-reference name: the contract base name behind a
/// fixed `Inner` token.
pub(crate) fn inner_reference_name(contract: &ContractDecl) -> String {
    format!("Inner{}", contract.base_name())
}
