//! Shared fixtures: a [`Harness`] wrapping a `Session`, the host types the
//! phase tests match on, and pattern shorthands.

#![allow(dead_code, reason = "not every phase uses every fixture")]

use pmatch_ir::{Literal, Name, PrimitiveKind, Span};
use pmatch_patterns::{CtorPattern, GuardExpr, GuardId, Pattern, PatternKind, SeqElem};
use pmatch_schema::{
    BranchSelector, ContainerKind, DescriptorId, FieldDecl, ObjectShape, Origin, Shape, TypeDescriptor, TypeRef,
    VariantDecl, VariantPart,
};
use pmatchc::{CompiledMatch, Diagnostic, MatchOptions, Session, Value};

pub struct Harness {
    pub session: Session,
}

impl Harness {
    pub fn new() -> Self {
        Harness {
            session: Session::new(),
        }
    }

    pub fn with_options(options: MatchOptions) -> Self {
        Harness {
            session: Session::with_options(options),
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.session.intern(s)
    }

    pub fn text(&self, name: Name) -> &'static str {
        self.session.interner().lookup(name)
    }

    // ── types ──

    pub fn prim(&mut self, name: &str, kind: PrimitiveKind) -> DescriptorId {
        let name = self.name(name);
        self.session.table_mut().define(name, Shape::Primitive(kind))
    }

    pub fn enumeration(&mut self, name: &str, members: &[&str]) -> DescriptorId {
        let name = self.name(name);
        let members = members.iter().zip(0..).map(|(m, o)| (self.name(m), o)).collect();
        self.session.table_mut().define(name, Shape::Enum(members))
    }

    pub fn container(&mut self, name: &str, kind: ContainerKind, args: &[DescriptorId]) -> DescriptorId {
        let name = self.name(name);
        let args = args.iter().map(|&a| TypeRef::Desc(a)).collect();
        self.session.table_mut().define(name, Shape::Container { kind, args })
    }

    pub fn field(&self, name: &str, ty: DescriptorId) -> FieldDecl {
        FieldDecl::new(self.name(name), ty)
    }

    /// `Color = enum Red, Green, Blue`
    pub fn color(&mut self) -> DescriptorId {
        self.enumeration("Color", &["Red", "Green", "Blue"])
    }

    /// A syntax tree node as a nominal tagged union:
    ///
    /// ```text
    /// NodeKind = enum nkEmpty, nkIdent, nkIntLit, nkCall
    /// NodeObj = object
    ///   line: int
    ///   case kind: NodeKind
    ///   of nkIdent: name: string
    ///   of nkIntLit: intVal: int
    ///   of nkCall: callee: Node, sons: seq[Node]
    ///   else: discard
    /// Node = ref NodeObj
    /// ```
    pub fn node(&mut self) -> DescriptorId {
        let string = self.prim("string", PrimitiveKind::Str);
        let int = self.prim("int", PrimitiveKind::I64);
        let kind = self.enumeration("NodeKind", &["nkEmpty", "nkIdent", "nkIntLit", "nkCall"]);

        let node_name = self.name("Node");
        let node = self.session.table_mut().declare(node_name);
        let sons = self.container("seq[Node]", ContainerKind::Seq, &[node]);
        let labels = |h: &Self, labels: &[&str]| BranchSelector::Labels(labels.iter().map(|l| h.name(l)).collect());

        let variant = VariantPart {
            discriminator: self.field("kind", kind),
            branches: vec![
                VariantDecl {
                    selector: labels(self, &["nkIdent"]),
                    fields: vec![self.field("name", string)],
                },
                VariantDecl {
                    selector: labels(self, &["nkIntLit"]),
                    fields: vec![self.field("intVal", int)],
                },
                VariantDecl {
                    selector: labels(self, &["nkCall"]),
                    fields: vec![self.field("callee", node), self.field("sons", sons)],
                },
                VariantDecl {
                    selector: BranchSelector::Else,
                    fields: Vec::new(),
                },
            ],
        };
        let obj_name = self.name("NodeObj");
        let obj = TypeDescriptor::new(
            obj_name,
            Shape::Object(ObjectShape {
                fields: vec![self.field("line", int)],
                variant: Some(variant),
                ..ObjectShape::default()
            }),
        )
        .with_origin(Origin::TaggedUnionGenerator);
        let node_obj = self.session.table_mut().add(obj);
        self.session
            .table_mut()
            .set_shape(node, Shape::Indirection(TypeRef::Desc(node_obj)));
        node
    }

    /// `Shape` (inheritable: id) with derived `Circle` (radius) and
    /// `Square` (side).
    pub fn shapes(&mut self) -> (DescriptorId, DescriptorId, DescriptorId) {
        let int = self.prim("int", PrimitiveKind::I64);
        let shape_name = self.name("Shape");
        let id = self.field("id", int);
        let base = self.session.table_mut().define(
            shape_name,
            Shape::Object(ObjectShape {
                fields: vec![id],
                inheritable: true,
                ..ObjectShape::default()
            }),
        );
        let derived = |h: &mut Self, name: &str, field: &str| {
            let name = h.name(name);
            let fields = vec![h.field(field, int)];
            h.session.table_mut().define(
                name,
                Shape::Object(ObjectShape {
                    base: Some(base.into()),
                    fields,
                    ..ObjectShape::default()
                }),
            )
        };
        let circle = derived(self, "Circle", "radius");
        let square = derived(self, "Square", "side");
        (base, circle, square)
    }

    // ── compilation ──

    pub fn compile(&mut self, ty: DescriptorId, arms: &[Pattern]) -> CompiledMatch {
        self.session
            .compile_match(ty, arms, stmt())
            .unwrap_or_else(|diags| panic!("expected the match to compile, got {diags:#?}"))
    }

    pub fn errors(&mut self, ty: DescriptorId, arms: &[Pattern]) -> Vec<Diagnostic> {
        match self.session.compile_match(ty, arms, stmt()) {
            Ok(compiled) => panic!("expected errors, got {:#?}", compiled.procedure),
            Err(diags) => diags,
        }
    }

    // ── patterns ──

    pub fn bind(&self, name: &str) -> Pattern {
        Pattern::bind(self.name(name), sp(0))
    }

    pub fn sym(&self, name: &str) -> Pattern {
        lit(Literal::Symbol(self.name(name)))
    }

    pub fn str_lit(&self, s: &str) -> Pattern {
        lit(Literal::Str(self.name(s)))
    }

    pub fn ctor(&self, head: &str) -> CtorPattern {
        CtorPattern::named(self.name(head))
    }

    pub fn case(&self, head: &str, case: &str) -> CtorPattern {
        self.ctor(head).with_case(self.name(case))
    }

    pub fn with(&self, ctor: CtorPattern, field: &str, pattern: Pattern) -> CtorPattern {
        ctor.with_field(self.name(field), sp(1), pattern)
    }

    // ── values ──

    pub fn enum_value(&self, member: &str, ordinal: i64) -> Value {
        Value::Enum {
            name: self.name(member),
            ordinal,
        }
    }

    pub fn object(&self, chain: &[&str], fields: Vec<(&str, Value)>) -> Value {
        Value::Object {
            type_chain: chain.iter().map(|t| self.name(t)).collect(),
            fields: fields.into_iter().map(|(f, v)| (self.name(f), v)).collect(),
        }
    }
}

/// Span of the whole match statement.
pub fn stmt() -> Span {
    Span::new(0, 100)
}

pub fn sp(n: u32) -> Span {
    Span::new(n, n + 1)
}

pub fn lit(literal: Literal) -> Pattern {
    Pattern::literal(literal, sp(0))
}

pub fn int(value: i128) -> Pattern {
    lit(Literal::int(value))
}

pub fn wildcard() -> Pattern {
    Pattern::wildcard(sp(0))
}

pub fn ctor(ctor: CtorPattern) -> Pattern {
    Pattern::ctor(ctor, sp(0))
}

pub fn item(pattern: Pattern) -> SeqElem {
    SeqElem::Item { pattern, default: None }
}

pub fn defaulted(pattern: Pattern, default: Literal) -> SeqElem {
    SeqElem::Item {
        pattern,
        default: Some(default),
    }
}

pub fn spread(binding: Option<Pattern>) -> SeqElem {
    SeqElem::Spread {
        binding: binding.map(Box::new),
        span: sp(9),
    }
}

pub fn destructure(elems: Vec<SeqElem>) -> Pattern {
    Pattern::new(PatternKind::Destructure(elems), sp(0))
}

pub fn guard(id: u32, uses: Vec<Name>) -> GuardExpr {
    GuardExpr {
        id: GuardId::new(id),
        text: format!("check{id}"),
        uses,
    }
}

pub fn ints(values: &[i128]) -> Value {
    Value::Seq(values.iter().copied().map(Value::Int).collect())
}

/// Guard host for procedures that have no guards.
pub fn no_guards(_: GuardId, _: &[(Name, Value)]) -> bool {
    panic!("no guard should run")
}
