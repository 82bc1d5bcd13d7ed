mod common;

use classpeek_class_file::{
    annotation::{Annotation, ElementConst, ElementValue, ElementValuePair},
    ClassFile, NameRef, ParseError, ParseErrorKind,
};
use common::{Bytes, ClassBuilder};
use pretty_assertions::assert_eq;

fn parse(builder: &ClassBuilder) -> ClassFile {
    common::init_logger();
    ClassFile::from_bytes(&builder.build()).unwrap()
}

fn constant(tag: u8, index: u16) -> Bytes {
    Bytes::new().u8(tag).u16(index)
}

/// One annotation of `type_descriptor` with already encoded pairs.
fn annotation(
    builder: &mut ClassBuilder,
    type_descriptor: &str,
    pairs: &[(&str, Bytes)],
) -> Bytes {
    let mut bytes = Bytes::new()
        .u16(builder.utf8(type_descriptor))
        .u16(pairs.len() as u16);
    for (name, value) in pairs {
        bytes = bytes.u16(builder.utf8(name)).bytes(&value.0);
    }
    bytes
}

/// A `RuntimeVisibleAnnotations` attribute holding `annotations`.
fn visible(builder: &mut ClassBuilder, annotations: &[Bytes]) -> Vec<u8> {
    let mut body = Bytes::new().u16(annotations.len() as u16);
    for annotation in annotations {
        body = body.bytes(&annotation.0);
    }
    builder.attribute("RuntimeVisibleAnnotations", &body.into_inner())
}

fn int(value: i32) -> ElementValue {
    ElementValue::Const(ElementConst::Int(value))
}

#[test]
fn test_annotated_field() {
    let mut builder = ClassBuilder::new("my/Holder");
    let byte = builder.integer(0x1FF);
    let text = builder.utf8("hi");
    let color = builder.utf8("Lmy/Color;");
    let red = builder.utf8("RED");
    let class = builder.utf8("[Ljava/lang/String;");
    let one = builder.integer(1);
    let two = builder.integer(2);
    let three = builder.integer(3);
    let array = Bytes::new()
        .u8(b'[')
        .u16(3)
        .bytes(&constant(b'I', one).0)
        .bytes(&constant(b'I', two).0)
        .bytes(&constant(b'I', three).0);
    let anno = annotation(
        &mut builder,
        "Lmy/Anno;",
        &[
            ("b", constant(b'B', byte)),
            ("s", constant(b's', text)),
            ("e", Bytes::new().u8(b'e').u16(color).u16(red)),
            ("c", constant(b'c', class)),
            ("arr", array),
        ],
    );
    let attribute = visible(&mut builder, &[anno]);
    builder.field(0x0001, "ref", "Ljava/util/List;", &[attribute]);
    let class_file = parse(&builder);

    assert!(class_file.errors.is_empty());
    let field = class_file.field("ref").unwrap();
    assert_eq!(Some("java.util.List"), field.descriptor.reference_name());
    assert_eq!(
        Some(
            &[Annotation {
                type_name: "my.Anno".to_owned(),
                values: vec![
                    ElementValuePair {
                        name: NameRef::Named("b".to_owned()),
                        value: ElementValue::Const(ElementConst::Byte(-1)),
                    },
                    ElementValuePair {
                        name: NameRef::Named("s".to_owned()),
                        value: ElementValue::Const(ElementConst::String("hi".to_owned())),
                    },
                    ElementValuePair {
                        name: NameRef::Named("e".to_owned()),
                        value: ElementValue::Enum {
                            type_name: "my.Color".to_owned(),
                            const_name: "RED".to_owned(),
                        },
                    },
                    ElementValuePair {
                        name: NameRef::Named("c".to_owned()),
                        value: ElementValue::Class("java.lang.String".to_owned()),
                    },
                    ElementValuePair {
                        name: NameRef::Named("arr".to_owned()),
                        value: ElementValue::Array(vec![int(1), int(2), int(3)]),
                    },
                ],
            }][..]
        ),
        field.runtime_visible_annotations()
    );
}

#[test]
fn test_narrowing_and_wide_constants() {
    let mut builder = ClassBuilder::new("my/Holder");
    let char_value = builder.integer(0x1_0041);
    let short_value = builder.integer(0x18000);
    let yes = builder.integer(2);
    let no = builder.integer(0);
    let long = builder.long(1 << 40);
    let float = builder.float(0.25);
    let double = builder.double(-0.5);
    let anno = annotation(
        &mut builder,
        "Lmy/Anno;",
        &[
            ("c", constant(b'C', char_value)),
            ("s", constant(b'S', short_value)),
            ("yes", constant(b'Z', yes)),
            ("no", constant(b'Z', no)),
            ("j", constant(b'J', long)),
            ("f", constant(b'F', float)),
            ("d", constant(b'D', double)),
        ],
    );
    let attribute = visible(&mut builder, &[anno]);
    builder.class_attribute(attribute);
    let class_file = parse(&builder);

    let annotation = &class_file.runtime_visible_annotations().unwrap()[0];
    let value = |name: &str| annotation.value(name).and_then(ElementValue::as_const).cloned();
    assert_eq!(Some(ElementConst::Char(0x41)), value("c"));
    assert_eq!(Some(ElementConst::Short(-32768)), value("s"));
    assert_eq!(Some(ElementConst::Boolean(true)), value("yes"));
    assert_eq!(Some(ElementConst::Boolean(false)), value("no"));
    assert_eq!(Some(ElementConst::Long(1 << 40)), value("j"));
    assert_eq!(Some(ElementConst::Float(0.25)), value("f"));
    assert_eq!(Some(ElementConst::Double(-0.5)), value("d"));
    assert_eq!(None, value("missing"));
}

#[test]
fn test_nested_annotation_and_primitive_class_literal() {
    let mut builder = ClassBuilder::new("my/Holder");
    let int_class = builder.utf8("I");
    let void_class = builder.utf8("V");
    let inner = annotation(&mut builder, "Lmy/Inner;", &[("k", constant(b'c', int_class))]);
    let outer = annotation(
        &mut builder,
        "Lmy/Outer;",
        &[
            ("inner", Bytes::new().u8(b'@').bytes(&inner.0)),
            ("v", constant(b'c', void_class)),
        ],
    );
    let attribute = visible(&mut builder, &[outer]);
    builder.class_attribute(attribute);
    let class_file = parse(&builder);

    let outer = &class_file.runtime_visible_annotations().unwrap()[0];
    assert_eq!("@my.Outer(inner=@my.Inner(k=int.class), v=void.class)", outer.to_string());
    match outer.value("inner") {
        Some(ElementValue::Annotation(inner)) => {
            assert_eq!("my.Inner", inner.type_name);
            assert_eq!(Some(&ElementValue::Class("int".to_owned())), inner.value("k"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_bare_enum_type_name() {
    let mut builder = ClassBuilder::new("my/Holder");
    let color = builder.utf8("my/Color");
    let red = builder.utf8("RED");
    let anno = annotation(
        &mut builder,
        "Lmy/Anno;",
        &[("e", Bytes::new().u8(b'e').u16(color).u16(red))],
    );
    let attribute = visible(&mut builder, &[anno]);
    builder.class_attribute(attribute);
    let class_file = parse(&builder);

    assert_eq!(
        Some(&ElementValue::Enum {
            type_name: "my.Color".to_owned(),
            const_name: "RED".to_owned(),
        }),
        class_file.runtime_visible_annotations().unwrap()[0].value("e")
    );
}

#[test]
fn test_invalid_tag_drops_whole_attribute() {
    let mut builder = ClassBuilder::new("my/Holder");
    let one = builder.integer(1);
    let good = annotation(&mut builder, "Lmy/Good;", &[]);
    let bad = annotation(
        &mut builder,
        "Lmy/Bad;",
        &[("x", constant(b'I', one)), ("y", constant(b'X', one))],
    );
    let attribute = visible(&mut builder, &[good, bad]);
    let deprecated = builder.attribute("Deprecated", &[]);
    builder.class_attribute(attribute).class_attribute(deprecated);
    let class_file = parse(&builder);

    assert_eq!(None, class_file.runtime_visible_annotations());
    assert!(class_file.is_deprecated());
    assert_eq!(
        vec![ParseError::with_value(ParseErrorKind::AnnotationValueTagInvalid, b'X')],
        class_file.errors
    );
}

#[test]
fn test_constant_of_wrong_kind() {
    let mut builder = ClassBuilder::new("my/Holder");
    let long = builder.long(5);
    let anno = annotation(&mut builder, "Lmy/Anno;", &[("i", constant(b'I', long))]);
    let attribute = visible(&mut builder, &[anno]);
    builder.class_attribute(attribute);
    let class_file = parse(&builder);

    let annotation = &class_file.runtime_visible_annotations().unwrap()[0];
    assert_eq!(
        Some(&ElementValue::Unresolved {
            tag: b'I',
            index: long,
        }),
        annotation.value("i")
    );
    assert_eq!(b'I', annotation.value("i").unwrap().tag());
    assert_eq!(
        vec![ParseError::with_index(ParseErrorKind::AnnotationConstIndexInvalid, long)],
        class_file.errors
    );
}

#[test]
fn test_unresolved_lookups_keep_sibling_annotations() {
    let mut builder = ClassBuilder::new("my/Holder");
    let one = builder.integer(1);
    let good = annotation(&mut builder, "Lmy/Good;", &[("v", constant(b'I', one))]);
    let bad_const = annotation(&mut builder, "Lmy/Bad;", &[("v", constant(b'I', 999))]);
    let bad_name = Bytes::new()
        .u16(builder.utf8("Lmy/Nameless;"))
        .u16(1)
        .u16(888)
        .bytes(&constant(b'I', one).0);
    let attribute = visible(&mut builder, &[good, bad_const, bad_name]);
    builder.class_attribute(attribute);
    let class_file = parse(&builder);

    let annotations = class_file.runtime_visible_annotations().unwrap();
    assert_eq!(
        vec!["@my.Good(v=1)", "@my.Bad(v=<#999>)", "@my.Nameless(?=1)"],
        annotations.iter().map(ToString::to_string).collect::<Vec<_>>()
    );
    assert_eq!(NameRef::Unresolved(888), annotations[2].values[0].name);
    assert_eq!(Some(&int(1)), annotations[0].value("v"));
    assert_eq!(
        vec![
            ParseError::with_index(ParseErrorKind::AnnotationConstIndexInvalid, 999),
            ParseError::with_index(ParseErrorKind::AnnotationNameIndexInvalid, 888),
        ],
        class_file.errors
    );
}

#[test]
fn test_invalid_annotation_type() {
    let mut builder = ClassBuilder::new("my/Holder");
    let anno = annotation(&mut builder, "I", &[]);
    let attribute = visible(&mut builder, &[anno]);
    builder.class_attribute(attribute);
    let class_file = parse(&builder);

    assert_eq!(
        vec![ParseError::with_text(ParseErrorKind::AnnotationTypeInvalid, "I")],
        class_file.errors
    );
}

#[test]
fn test_nesting_limit() {
    let mut builder = ClassBuilder::new("my/Holder");
    let mut value = Bytes::new();
    for _ in 0..1000 {
        value = value.u8(b'[').u16(1);
    }
    let one = builder.integer(1);
    value = value.bytes(&constant(b'I', one).0);
    let anno = annotation(&mut builder, "Lmy/Anno;", &[("deep", value)]);
    let attribute = visible(&mut builder, &[anno]);
    builder.class_attribute(attribute);
    let class_file = parse(&builder);

    assert_eq!(None, class_file.runtime_visible_annotations());
    assert_eq!(
        vec![ParseError::new(ParseErrorKind::AnnotationNestingTooDeep)],
        class_file.errors
    );
}

#[test]
fn test_invisible_annotations_and_default() {
    let mut builder = ClassBuilder::new("my/Anno");
    let marker = annotation(&mut builder, "Lmy/Marker;", &[]);
    let invisible = Bytes::new().u16(1).bytes(&marker.0).into_inner();
    let invisible = builder.attribute("RuntimeInvisibleAnnotations", &invisible);
    builder.class_attribute(invisible);

    let seven = builder.integer(7);
    let default = builder.attribute("AnnotationDefault", &constant(b'I', seven).0);
    builder.method(0x0401, "size", "()I", &[default]);
    let class_file = parse(&builder);

    let invisible = class_file.attributes.runtime_invisible_annotations().unwrap();
    assert_eq!("my.Marker", invisible[0].type_name);
    assert_eq!(None, class_file.runtime_visible_annotations());

    let size = class_file.method("size").unwrap();
    assert_eq!(Some(&int(7)), size.attributes.annotation_default());
}
