use pretty_assertions::assert_eq;

use super::*;

#[test]
fn encoding_is_little_endian_and_fixed_width() {
    assert_eq!(Constant::Bool(true).to_bytes().as_slice(), &[1]);
    assert_eq!(Constant::Byte(-1).to_bytes().as_slice(), &[0xff]);
    assert_eq!(Constant::Short(0x0102).to_bytes().as_slice(), &[0x02, 0x01]);
    assert_eq!(Constant::Char(u16::from(b'A')).to_bytes().as_slice(), &[0x41, 0]);
    assert_eq!(Constant::Int(1).to_bytes().as_slice(), &[1, 0, 0, 0]);
    assert_eq!(
        Constant::Long(0x0102_0304_0506_0708).to_bytes().as_slice(),
        &[8, 7, 6, 5, 4, 3, 2, 1]
    );
    assert_eq!(
        Constant::Float(1.0).to_bytes().as_slice(),
        &1.0f32.to_bits().to_le_bytes()
    );
    assert_eq!(Constant::Double(2.5).to_bytes().len(), 8);
}

#[test]
fn decoding_checks_width() {
    assert_eq!(
        Constant::from_bytes(Primitive::Int, &[0x2a, 0, 0, 0]),
        Some(Constant::Int(42))
    );
    assert_eq!(
        Constant::from_bytes(Primitive::Double, &(-0.5f64).to_bits().to_le_bytes()),
        Some(Constant::Double(-0.5))
    );
    assert_eq!(Constant::from_bytes(Primitive::Int, &[1, 0]), None);
    assert_eq!(Constant::from_bytes(Primitive::Bool, &[]), None);
}

#[test]
fn encoded_width_matches_primitive() {
    for constant in [
        Constant::Bool(false),
        Constant::Byte(3),
        Constant::Short(-3),
        Constant::Char(7),
        Constant::Int(i32::MIN),
        Constant::Long(i64::MAX),
        Constant::Float(f32::MIN_POSITIVE),
        Constant::Double(f64::EPSILON),
    ] {
        let bytes = constant.to_bytes();
        assert_eq!(bytes.len(), constant.primitive().byte_width());
        assert_eq!(
            Constant::from_bytes(constant.primitive(), &bytes),
            Some(constant)
        );
    }
}

#[test]
fn number_literal_types() {
    assert_eq!(Constant::parse_number("1"), Some(Constant::Int(1)));
    assert_eq!(
        Constant::parse_number("3000000000"),
        Some(Constant::Long(3_000_000_000))
    );
    assert_eq!(Constant::parse_number("1.5"), Some(Constant::Double(1.5)));
    assert_eq!(Constant::parse_number("2f"), Some(Constant::Float(2.0)));
    assert_eq!(Constant::parse_number("2D"), Some(Constant::Double(2.0)));
    assert_eq!(Constant::parse_number("1e3"), Some(Constant::Double(1000.0)));
    assert_eq!(Constant::parse_number("x"), None);
}

#[test]
fn bool_literals() {
    assert_eq!(Constant::parse_bool("yes"), Some(Constant::Bool(true)));
    assert_eq!(Constant::parse_bool("false"), Some(Constant::Bool(false)));
    assert_eq!(Constant::parse_bool("maybe"), None);
}

#[test]
fn value_types() {
    assert_eq!(Value::Const(Constant::Long(1)).ty(), TypeId::LONG);
    assert_eq!(Value::Null.ty(), TypeId::NULL);
    let pack = Value::Pack(Box::new(ValuePack {
        instructions: vec![],
        result: Value::Const(Constant::Char(1)),
    }));
    assert_eq!(pack.ty(), TypeId::CHAR);
    assert!(Value::Const(Constant::Int(1)).is_constant());
    assert!(!Value::Null.is_constant());
}

#[test]
fn coercion_widens_and_narrows_fitting_ints() {
    assert_eq!(Constant::Int(7).coerce(Primitive::Long), Some(Constant::Long(7)));
    assert_eq!(Constant::Byte(-2).coerce(Primitive::Double), Some(Constant::Double(-2.0)));
    assert_eq!(Constant::Int(100).coerce(Primitive::Byte), Some(Constant::Byte(100)));
    assert_eq!(Constant::Int(300).coerce(Primitive::Byte), None);
    assert_eq!(Constant::Int(65).coerce(Primitive::Char), Some(Constant::Char(65)));
    assert_eq!(Constant::Long(1).coerce(Primitive::Int), None);
    assert_eq!(Constant::Bool(true).coerce(Primitive::Int), None);
}
