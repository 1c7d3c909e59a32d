use super::*;
use crate::descriptor::{FieldDecl, VariantDecl, VariantPart};
use pmatch_ir::PrimitiveKind;
use pretty_assertions::assert_eq;

// ── fixtures ──

struct Fixture {
    interner: StringInterner,
    table: TypeTable,
    registry: SchemaRegistry,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            interner: StringInterner::new(),
            table: TypeTable::new(),
            registry: SchemaRegistry::new(),
        }
    }

    fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    fn prim(&mut self, name: &str, kind: PrimitiveKind) -> DescriptorId {
        let name = self.name(name);
        self.table.define(name, Shape::Primitive(kind))
    }

    fn field(&self, name: &str, ty: DescriptorId) -> FieldDecl {
        FieldDecl::new(self.name(name), ty)
    }

    fn schema(&mut self, id: DescriptorId) -> SchemaId {
        self.registry.schema_of(&self.table, &self.interner, id)
    }

    fn get(&self, id: SchemaId) -> &Schema {
        self.registry.get(id)
    }

    fn text(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }
}

/// `NodeKind = enum nkEmpty, nkIdent, nkStrLit, nkCall`
/// `NodeObj = object case kind: NodeKind
///     of nkIdent, nkStrLit: strVal: string
///     of nkCall: sons: seq[Node]
///     else: discard`
/// `Node = ref NodeObj`
fn node_fixture(fx: &mut Fixture, origin: Origin) -> (DescriptorId, DescriptorId) {
    let string = fx.prim("string", PrimitiveKind::Str);
    let kind_name = fx.name("NodeKind");
    let members = ["nkEmpty", "nkIdent", "nkStrLit", "nkCall"]
        .iter()
        .zip(0..)
        .map(|(m, ordinal)| (fx.name(m), ordinal))
        .collect();
    let node_kind = fx.table.define(kind_name, Shape::Enum(members));

    let node_name = fx.name("Node");
    let node = fx.table.declare(node_name);
    let seq_name = fx.name("seq[Node]");
    let sons = fx.table.define(
        seq_name,
        Shape::Container {
            kind: ContainerKind::Seq,
            args: vec![TypeRef::Desc(node)],
        },
    );

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
        .with_origin(origin),
    );
    fx.table.set_shape(node, Shape::Indirection(TypeRef::Desc(node_obj)));
    (node, node_obj)
}

// ── primitives, aliases, containers ──

#[test]
fn primitive_keeps_descriptor_name() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let id = fx.schema(int);
    assert_eq!(fx.get(id).kind, SchemaKind::Primitive);
    assert_eq!(fx.get(id).primitive, Some(PrimitiveKind::I64));
    assert_eq!(fx.text(fx.get(id).name), "int");
}

#[test]
fn alias_is_transparent_but_remembers_its_name() {
    let mut fx = Fixture::new();
    let float = fx.prim("float64", PrimitiveKind::F64);
    let meters = fx.name("Meters");
    let alias = fx.table.define(meters, Shape::Alias(TypeRef::Desc(float)));

    let id = fx.schema(alias);
    let target = fx.schema(float);
    let schema = fx.get(id);
    assert_eq!(schema.kind, SchemaKind::Primitive);
    assert_eq!(schema.primitive, Some(PrimitiveKind::F64));
    assert_eq!(schema.alias_name, Some(meters));
    assert_eq!(schema.display_name(), meters);
    assert!(schema.flags.contains(SchemaFlags::ALIASED));
    assert_eq!(fx.registry.pool().canonical(id), target);
}

#[test]
fn containers_unwrap_element_key_value() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let string = fx.prim("string", PrimitiveKind::Str);
    let map_name = fx.name("Table[string, int]");
    let map = fx.table.define(
        map_name,
        Shape::Container {
            kind: ContainerKind::Map,
            args: vec![string.into(), int.into()],
        },
    );
    let arr_name = fx.name("array[3, int]");
    let arr = fx.table.define(
        arr_name,
        Shape::Container {
            kind: ContainerKind::Array(3),
            args: vec![int.into()],
        },
    );

    let map_id = fx.schema(map);
    let arr_id = fx.schema(arr);
    let int_id = fx.schema(int);
    let str_id = fx.schema(string);

    assert_eq!(fx.get(map_id).kind, SchemaKind::Map);
    assert_eq!(fx.get(map_id).key, Some(str_id));
    assert_eq!(fx.get(map_id).value, Some(int_id));
    assert_eq!(fx.get(arr_id).kind, SchemaKind::Array);
    assert_eq!(fx.get(arr_id).array_len, Some(3));
    assert_eq!(fx.get(arr_id).element, Some(int_id));
}

#[test]
fn container_with_wrong_arity_is_opaque() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let name = fx.name("Broken");
    let broken = fx.table.define(
        name,
        Shape::Container {
            kind: ContainerKind::Map,
            args: vec![int.into()],
        },
    );
    let id = fx.schema(broken);
    assert_eq!(fx.get(id).kind, SchemaKind::Opaque);
}

#[test]
fn unknown_and_dangling_descriptors_degrade_to_opaque() {
    let mut fx = Fixture::new();
    let name = fx.name("ForeignHandle");
    let unknown = fx.table.define(name, Shape::Unknown);
    let id = fx.schema(unknown);
    assert_eq!(fx.get(id).kind, SchemaKind::Opaque);
    assert_eq!(fx.text(fx.get(id).name), "ForeignHandle");

    let dangling = fx.schema(DescriptorId::from_raw(999));
    assert_eq!(fx.get(dangling).kind, SchemaKind::Opaque);
}

#[test]
fn tuple_fields_are_positional() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let string = fx.prim("string", PrimitiveKind::Str);
    let name = fx.name("(int, string)");
    let label = fx.name("label");
    let tuple = fx.table.define(name, Shape::Tuple(vec![(None, int.into()), (Some(label), string.into())]));

    let id = fx.schema(tuple);
    let fields = &fx.get(id).fields;
    assert_eq!(fields.len(), 2);
    assert_eq!(fx.text(fields[0].name), "0");
    assert_eq!(fields[1].name, label);
    assert_eq!(fields[1].position, 1);
}

// ── records and inheritance ──

#[test]
fn ancestor_fields_come_first() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let string = fx.prim("string", PrimitiveKind::Str);

    let base_name = fx.name("Animal");
    let base = fx.table.define(
        base_name,
        Shape::Object(ObjectShape {
            fields: vec![fx.field("name", string), fx.field("age", int)],
            inheritable: true,
            ..ObjectShape::default()
        }),
    );
    let derived_name = fx.name("Dog");
    let derived = fx.table.define(
        derived_name,
        Shape::Object(ObjectShape {
            base: Some(base.into()),
            fields: vec![fx.field("breed", string)],
            ..ObjectShape::default()
        }),
    );

    let base_id = fx.schema(base);
    let id = fx.schema(derived);
    let schema = fx.get(id);
    let names: Vec<&str> = schema.fields.iter().map(|f| fx.text(f.name)).collect();
    assert_eq!(names, vec!["name", "age", "breed"]);
    let positions: Vec<u32> = schema.fields.iter().map(|f| f.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(schema.ancestors, vec![base_id]);
    assert!(schema.is_open());
    assert!(fx.get(base_id).is_open());
}

#[test]
fn plain_record_is_closed_to_extension() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let name = fx.name("Point");
    let point = fx.table.define(
        name,
        Shape::Object(ObjectShape {
            fields: vec![fx.field("x", int), fx.field("y", int)],
            ..ObjectShape::default()
        }),
    );
    let id = fx.schema(point);
    assert_eq!(fx.get(id).kind, SchemaKind::Record);
    assert!(!fx.get(id).is_open());
}

#[test]
fn private_fields_keep_visibility() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let name = fx.name("Counter");
    let counter = fx.table.define(
        name,
        Shape::Object(ObjectShape {
            fields: vec![fx.field("count", int).private()],
            ..ObjectShape::default()
        }),
    );
    let id = fx.schema(counter);
    assert_eq!(fx.get(id).fields[0].visibility, crate::Visibility::Private);
}

// ── unions ──

#[test]
fn union_branches_expand_labels_and_else() {
    let mut fx = Fixture::new();
    let (_, node_obj) = node_fixture(&mut fx, Origin::Host);
    let id = fx.schema(node_obj);
    let schema = fx.get(id);

    assert_eq!(schema.kind, SchemaKind::Union);
    let disc = schema.discriminator.unwrap_or_else(|| panic!("union has a discriminator"));
    assert_eq!(fx.text(disc.field), "kind");
    assert_eq!(fx.get(disc.schema).kind, SchemaKind::Enumeration);
    assert_eq!(schema.fields.len(), 1);

    let labels: Vec<(&str, i64, usize)> = schema
        .branches
        .iter()
        .map(|b| (fx.text(b.label), b.ordinal, b.fields.len()))
        .collect();
    assert_eq!(
        labels,
        vec![("nkEmpty", 0, 0), ("nkIdent", 1, 1), ("nkStrLit", 2, 1), ("nkCall", 3, 1)]
    );
    let str_val = fx.name("strVal");
    assert_eq!(schema.branches[1].fields[0].name, str_val);
    assert_eq!(schema.branches[1].fields[0].position, 1);
    assert!(!schema.flags.contains(SchemaFlags::TAGGED_UNION));
}

#[test]
fn bool_discriminator_has_two_branches() {
    let mut fx = Fixture::new();
    let boolean = fx.prim("bool", PrimitiveKind::Bool);
    let int = fx.prim("int", PrimitiveKind::I64);
    let name = fx.name("MaybeInt");
    let variant = VariantPart {
        discriminator: fx.field("present", boolean),
        branches: vec![VariantDecl {
            selector: BranchSelector::Labels(vec![fx.name("true")]),
            fields: vec![fx.field("value", int)],
        }],
    };
    let desc = fx.table.define(
        name,
        Shape::Object(ObjectShape {
            variant: Some(variant),
            ..ObjectShape::default()
        }),
    );
    let id = fx.schema(desc);
    let labels: Vec<&str> = fx.get(id).branches.iter().map(|b| fx.text(b.label)).collect();
    assert_eq!(labels, vec!["false", "true"]);
    assert!(fx.get(id).branches[0].fields.is_empty());
}

#[test]
fn tagged_flavor_requires_generator_origin() {
    let mut fx = Fixture::new();
    let (_, node_obj) = node_fixture(&mut fx, Origin::TaggedUnionGenerator);
    let id = fx.schema(node_obj);
    assert!(fx.get(id).flags.contains(SchemaFlags::TAGGED_UNION));
    assert_eq!(fx.get(id).kind, SchemaKind::Union);
}

// ── indirections and cycles ──

#[test]
fn indirection_propagates_pointee_structure() {
    let mut fx = Fixture::new();
    let (node, node_obj) = node_fixture(&mut fx, Origin::Host);
    let id = fx.schema(node);
    let obj_id = fx.schema(node_obj);
    let schema = fx.get(id);

    assert_eq!(schema.kind, SchemaKind::Indirection);
    assert!(schema.flags.is_indirection());
    assert_eq!(schema.structural_kind(), SchemaKind::Union);
    assert_eq!(schema.target, Some(obj_id));
    assert_eq!(schema.branches, fx.get(obj_id).branches);
    assert_eq!(fx.registry.pool().unwrap_indirections(id), obj_id);
}

#[test]
fn cycle_through_pointee_is_completed() {
    // Extracting the object first reaches `Node` while `NodeObj` is pending.
    let mut fx = Fixture::new();
    let (node, node_obj) = node_fixture(&mut fx, Origin::Host);
    let obj_id = fx.schema(node_obj);
    let node_id = fx.schema(node);

    assert_eq!(fx.get(node_id).branches.len(), 4);
    assert_eq!(fx.get(node_id).discriminator, fx.get(obj_id).discriminator);

    let sons = &fx.get(obj_id).branches[3].fields[0];
    let seq = fx.get(sons.schema);
    assert_eq!(seq.kind, SchemaKind::Sequence);
    assert_eq!(seq.element, Some(node_id));
}

#[test]
fn self_referential_record() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let list_name = fx.name("ListNode");
    let list = fx.table.declare(list_name);
    let ref_name = fx.name("ref ListNode");
    let list_ref = fx.table.define(ref_name, Shape::Indirection(list.into()));
    fx.table.set_shape(
        list,
        Shape::Object(ObjectShape {
            fields: vec![fx.field("value", int), fx.field("next", list_ref)],
            ..ObjectShape::default()
        }),
    );

    let id = fx.schema(list);
    let next = fx.get(id).fields[1].schema;
    assert_eq!(fx.get(next).kind, SchemaKind::Indirection);
    assert_eq!(fx.get(next).target, Some(id));
    assert_eq!(fx.get(next).fields, fx.get(id).fields);
}

// ── generics ──

#[test]
fn generic_instances_substitute_parameters() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let string = fx.prim("string", PrimitiveKind::Str);
    let seq_t_name = fx.name("seq[T]");
    let seq_t = fx.table.define(
        seq_t_name,
        Shape::Container {
            kind: ContainerKind::Seq,
            args: vec![TypeRef::Param(0)],
        },
    );
    let box_name = fx.name("Box");
    let template = fx.table.add(
        TypeDescriptor::new(
            box_name,
            Shape::Object(ObjectShape {
                fields: vec![
                    FieldDecl::new(fx.name("item"), TypeRef::Param(0)),
                    fx.field("all", seq_t),
                ],
                ..ObjectShape::default()
            }),
        )
        .with_params(1),
    );
    let box_int_name = fx.name("Box[int]");
    let box_int = fx.table.define(
        box_int_name,
        Shape::Instance {
            template,
            args: vec![int.into()],
        },
    );
    let box_str_name = fx.name("Box[string]");
    let box_str = fx.table.define(
        box_str_name,
        Shape::Instance {
            template,
            args: vec![string.into()],
        },
    );

    let int_id = fx.schema(int);
    let str_id = fx.schema(string);
    let a = fx.schema(box_int);
    let b = fx.schema(box_str);
    assert_ne!(a, b);
    assert_eq!(fx.text(fx.get(a).name), "Box[int]");
    assert_eq!(fx.get(a).fields[0].schema, int_id);
    assert_eq!(fx.get(b).fields[0].schema, str_id);

    let all = fx.get(a).fields[1].schema;
    assert_eq!(fx.get(all).element, Some(int_id));
    let all_str = fx.get(b).fields[1].schema;
    assert_eq!(fx.get(all_str).element, Some(str_id));
}

// ── cache ──

#[test]
fn re_extraction_hits_the_cache() {
    let mut fx = Fixture::new();
    let (node, _) = node_fixture(&mut fx, Origin::Host);
    let first = fx.schema(node);
    let misses = fx.registry.stats().misses;
    let snapshot = fx.get(first).clone();

    let second = fx.schema(node);
    assert_eq!(first, second);
    assert_eq!(fx.get(second), &snapshot);
    assert_eq!(fx.registry.stats().misses, misses);
    assert!(fx.registry.stats().hits >= 1);
}

#[test]
fn shared_nested_schema_is_extracted_once() {
    let mut fx = Fixture::new();
    let int = fx.prim("int", PrimitiveKind::I64);
    let point_name = fx.name("Point");
    let point = fx.table.define(
        point_name,
        Shape::Object(ObjectShape {
            fields: vec![fx.field("x", int), fx.field("y", int)],
            ..ObjectShape::default()
        }),
    );
    let line_name = fx.name("Line");
    let line = fx.table.define(
        line_name,
        Shape::Object(ObjectShape {
            fields: vec![fx.field("a", point), fx.field("b", point)],
            ..ObjectShape::default()
        }),
    );
    let id = fx.schema(line);
    let fields = &fx.get(id).fields;
    assert_eq!(fields[0].schema, fields[1].schema);
    // int, Point, Line.
    assert_eq!(fx.registry.stats().misses, 3);
}

// ── marker ──

#[test]
fn marker_split_requires_uppercase_case_name() {
    assert_eq!(marker_split("nkIdent", 'k'), Some(("nk", "Ident")));
    assert_eq!(marker_split("markActive", 'k'), Some(("mark", "Active")));
    assert_eq!(marker_split("kIdent", 'k'), None);
    assert_eq!(marker_split("lookup", 'k'), None);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn kind_strategy() -> impl Strategy<Value = PrimitiveKind> {
        proptest::sample::select(PrimitiveKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn extraction_is_idempotent(kinds in proptest::collection::vec(kind_strategy(), 1..6), pick in 0usize..6) {
            let mut fx = Fixture::new();
            let ids: Vec<DescriptorId> = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| fx.prim(&format!("p{i}"), *kind))
                .collect();
            let fields = ids
                .iter()
                .enumerate()
                .map(|(i, id)| fx.field(&format!("f{i}"), *id))
                .collect();
            let rec_name = fx.name("Rec");
            let rec = fx.table.define(rec_name, Shape::Object(ObjectShape { fields, ..ObjectShape::default() }));
            let target = if pick < ids.len() { ids[pick] } else { rec };

            let first = fx.schema(target);
            let snapshot = fx.get(first).clone();
            let second = fx.schema(target);
            prop_assert_eq!(first, second);
            prop_assert_eq!(fx.get(second), &snapshot);
        }
    }
}
