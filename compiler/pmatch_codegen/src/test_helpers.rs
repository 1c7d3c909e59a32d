//! Test helpers: a type table plus validator for building real
//! [`ValidatedArm`]s, and shorthands for pattern trees.

use pmatch_ir::{Literal, Name, PrimitiveKind, Span, StringInterner};
use pmatch_patterns::{
    CtorPattern, GuardExpr, GuardId, Pattern, PatternKind, SeqElem, ValidateOptions, ValidatedArm, Validator,
};
use pmatch_schema::{
    BranchSelector, ContainerKind, DescriptorId, FieldDecl, ObjectShape, Origin, SchemaId, SchemaRegistry, Shape,
    TypeDescriptor, TypeRef, TypeTable, VariantDecl, VariantPart,
};

pub struct Fixture {
    pub interner: StringInterner,
    pub table: TypeTable,
    pub registry: SchemaRegistry,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            interner: StringInterner::new(),
            table: TypeTable::new(),
            registry: SchemaRegistry::new(),
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn prim(&mut self, name: &str, kind: PrimitiveKind) -> DescriptorId {
        let name = self.name(name);
        self.table.define(name, Shape::Primitive(kind))
    }

    pub fn enumeration(&mut self, name: &str, members: &[&str]) -> DescriptorId {
        let name = self.name(name);
        let members = members.iter().zip(0..).map(|(m, ordinal)| (self.name(m), ordinal)).collect();
        self.table.define(name, Shape::Enum(members))
    }

    pub fn container(&mut self, name: &str, kind: ContainerKind, args: &[DescriptorId]) -> DescriptorId {
        let name = self.name(name);
        let args = args.iter().map(|&a| TypeRef::Desc(a)).collect();
        self.table.define(name, Shape::Container { kind, args })
    }

    pub fn tuple(&mut self, name: &str, elems: &[DescriptorId]) -> DescriptorId {
        let name = self.name(name);
        let elems = elems.iter().map(|&e| (None, TypeRef::Desc(e))).collect();
        self.table.define(name, Shape::Tuple(elems))
    }

    pub fn field(&self, name: &str, ty: DescriptorId) -> FieldDecl {
        FieldDecl::new(self.name(name), ty)
    }

    pub fn schema(&mut self, ty: DescriptorId) -> SchemaId {
        self.registry.schema_of(&self.table, &self.interner, ty)
    }

    pub fn arm(&mut self, pattern: &Pattern, ty: DescriptorId) -> ValidatedArm {
        let schema = self.schema(ty);
        Validator::new(&mut self.registry, &self.table, &self.interner, ValidateOptions::default())
            .validate(pattern, schema)
            .unwrap_or_else(|diags| panic!("expected a valid pattern, got {diags:#?}"))
    }

    pub fn arms(&mut self, patterns: &[Pattern], ty: DescriptorId) -> Vec<ValidatedArm> {
        patterns.iter().map(|p| self.arm(p, ty)).collect()
    }

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

    pub fn with(&self, ctor: CtorPattern, field: &str, pattern: Pattern) -> CtorPattern {
        ctor.with_field(self.name(field), sp(1), pattern)
    }

    pub fn alt(&self, names: &[&str]) -> Pattern {
        Pattern::alt(names.iter().map(|n| self.sym(n)).collect(), sp(0))
    }
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
        text: format!("cond{id}"),
        uses,
    }
}

/// `Color = enum R, G, B`
pub fn color_fixture(fx: &mut Fixture) -> DescriptorId {
    fx.enumeration("Color", &["R", "G", "B"])
}

/// `NodeKind = enum nkEmpty, nkIdent, nkStrLit, nkCall`
/// `NodeObj = object case kind: NodeKind
///     of nkIdent, nkStrLit: strVal: string
///     of nkCall: sons: seq[Node]
///     else: discard`
/// `Node = ref NodeObj`
pub fn node_fixture(fx: &mut Fixture) -> (DescriptorId, DescriptorId) {
    let string = fx.prim("string", PrimitiveKind::Str);
    let node_kind = fx.enumeration("NodeKind", &["nkEmpty", "nkIdent", "nkStrLit", "nkCall"]);

    let node_name = fx.name("Node");
    let node = fx.table.declare(node_name);
    let sons = fx.container("seq[Node]", ContainerKind::Seq, &[node]);

    let obj_name = fx.name("NodeObj");
    let variant = VariantPart {
        discriminator: fx.field("kind", node_kind),
        branches: vec![
            VariantDecl {
                selector: BranchSelector::Labels(vec![fx.name("nkIdent"), fx.name("nkStrLit")]),
                fields: vec![fx.field("strVal", string)],
            },
            VariantDecl {
                selector: BranchSelector::Labels(vec![fx.name("nkCall")]),
                fields: vec![fx.field("sons", sons)],
            },
            VariantDecl {
                selector: BranchSelector::Else,
                fields: Vec::new(),
            },
        ],
    };
    let node_obj = fx.table.add(
        TypeDescriptor::new(
            obj_name,
            Shape::Object(ObjectShape {
                variant: Some(variant),
                ..ObjectShape::default()
            }),
        )
        .with_origin(Origin::TaggedUnionGenerator),
    );
    fx.table.set_shape(node, Shape::Indirection(TypeRef::Desc(node_obj)));
    (node, node_kind)
}
