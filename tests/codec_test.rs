use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use graphpack::{
    BytesInput, Codec, Duration, Node, PackErrorKind, Path, Point, Relationship,
    UnboundRelationship, UnpackErrorKind, Value, ValueMap,
};

fn pack(value: &Value) -> Vec<u8> {
    let mut packer = Codec::v1().new_packer(Vec::new());
    packer.pack(value).unwrap();
    packer.into_inner()
}

fn unpack(bytes: &[u8]) -> Value {
    Codec::v1()
        .new_unpacker(BytesInput::from(bytes.to_vec()))
        .unpack_one()
        .unwrap()
        .expect("expected a value, got end of stream")
}

fn assert_roundtrips(cases: &[(Value, &[u8])]) {
    for (value, bytes) in cases {
        assert_eq!(&pack(value), bytes, "packing {value:?}");
        assert_eq!(&unpack(bytes), value, "unpacking {bytes:02X?}");
    }
}

#[test]
fn test_scalar_roundtrips() {
    assert_roundtrips(&[
        (Value::Null, &[0xC0]),
        (Value::Bool(true), &[0xC3]),
        (Value::Bool(false), &[0xC2]),
        (Value::Int(42), &[0x2A]),
        (Value::Int(-1), &[0xFF]),
        (Value::Int(200), &[0xC9, 0x00, 0xC8]),
        (Value::Int(-129), &[0xC9, 0xFF, 0x7F]),
        (
            Value::Float(6.283185307179586),
            &[0xC1, 0x40, 0x19, 0x21, 0xFB, 0x54, 0x44, 0x2D, 0x18],
        ),
        (
            Value::String("hello".to_string()),
            &[0x85, 0x68, 0x65, 0x6C, 0x6C, 0x6F],
        ),
        (
            Value::Bytes(Bytes::from_static(&[0xDE, 0xAD])),
            &[0xCC, 0x02, 0xDE, 0xAD],
        ),
    ]);
}

#[test]
fn test_container_roundtrips() {
    assert_roundtrips(&[
        (Value::List(vec![]), &[0x90]),
        (
            Value::List(vec![Value::Int(1), Value::from("two"), Value::Null]),
            &[0x93, 0x01, 0x83, 0x74, 0x77, 0x6F, 0xC0],
        ),
        (Value::Map(ValueMap::new()), &[0xA0]),
        (
            Value::Map(ValueMap::from([("x", Value::Int(1))])),
            &[0xA1, 0x81, 0x78, 0x01],
        ),
        (
            Value::List(vec![Value::List(vec![Value::Map(ValueMap::from([(
                "k",
                Value::Bool(true),
            )]))])]),
            &[0x91, 0x91, 0xA1, 0x81, 0x6B, 0xC3],
        ),
    ]);
}

#[test]
fn test_node_roundtrip() {
    let node = Node {
        id: 7,
        labels: vec!["A".to_string(), "B".to_string()],
        properties: ValueMap::from([("x", Value::Int(1))]),
    };
    assert_roundtrips(&[(
        Value::Node(node),
        &[0xB3, 0x4E, 0x07, 0x92, 0x81, 0x41, 0x81, 0x42, 0xA1, 0x81, 0x78, 0x01],
    )]);
}

#[test]
fn test_relationship_roundtrip() {
    let relationship = Relationship {
        id: 1,
        start_id: 2,
        end_id: 3,
        rel_type: "T".to_string(),
        properties: ValueMap::new(),
    };
    assert_roundtrips(&[(
        Value::Relationship(relationship),
        &[0xB5, 0x52, 0x01, 0x02, 0x03, 0x81, 0x54, 0xA0],
    )]);
}

#[test]
fn test_unbound_relationship_roundtrip() {
    let relationship = UnboundRelationship {
        id: 9,
        rel_type: "T".to_string(),
        properties: ValueMap::new(),
    };
    assert_roundtrips(&[(
        Value::UnboundRelationship(relationship),
        &[0xB3, 0x72, 0x09, 0x81, 0x54, 0xA0],
    )]);
}

fn bare_node(id: i64) -> Node {
    Node {
        id,
        labels: vec![],
        properties: ValueMap::new(),
    }
}

#[test]
fn test_path_roundtrip() {
    // (1)-[10:T]->(2)<-[11:T]-(1)
    let path = Path::new(
        vec![bare_node(1), bare_node(2)],
        vec![
            UnboundRelationship {
                id: 10,
                rel_type: "T".to_string(),
                properties: ValueMap::new(),
            },
            UnboundRelationship {
                id: 11,
                rel_type: "T".to_string(),
                properties: ValueMap::new(),
            },
        ],
        vec![1, 1, -2, 0],
    )
    .unwrap();

    let bytes = pack(&Value::Path(path.clone()));
    let expected = [
        0xB3, 0x50, // Path struct
        0x92, // two distinct nodes
        0xB3, 0x4E, 0x01, 0x90, 0xA0, // node 1
        0xB3, 0x4E, 0x02, 0x90, 0xA0, // node 2
        0x92, // two distinct relationships
        0xB3, 0x72, 0x0A, 0x81, 0x54, 0xA0, // unbound 10
        0xB3, 0x72, 0x0B, 0x81, 0x54, 0xA0, // unbound 11
        0x94, 0x01, 0x01, 0xFE, 0x00, // indices [1, 1, -2, 0]
    ];
    assert_eq!(bytes, expected);
    assert_eq!(unpack(&bytes), Value::Path(path));
}

#[test]
fn test_single_node_path_roundtrip() {
    let path = Path::new(vec![bare_node(4)], vec![], vec![]).unwrap();
    let bytes = pack(&Value::Path(path.clone()));
    assert_eq!(
        bytes,
        [0xB3, 0x50, 0x91, 0xB3, 0x4E, 0x04, 0x90, 0xA0, 0x90, 0x90]
    );
    assert_eq!(unpack(&bytes), Value::Path(path));
}

#[test]
fn test_temporal_values_are_rejected_in_v1() {
    let offset = FixedOffset::east_opt(3600).unwrap();
    let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let time = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
    let datetime = NaiveDateTime::new(date, time);

    let cases: Vec<(Value, &str)> = vec![
        (Value::Date(date), "Date"),
        (Value::LocalTime(time), "LocalTime"),
        (Value::Time(time, offset), "Time"),
        (Value::LocalDateTime(datetime), "LocalDateTime"),
        (
            Value::DateTime(DateTime::from_naive_utc_and_offset(datetime, offset)),
            "DateTime",
        ),
        (
            Value::Duration(Duration {
                months: 1,
                days: 2,
                seconds: 3,
                nanos: 4,
            }),
            "Duration",
        ),
        (
            Value::Point(Point {
                srid: 4326,
                x: 1.0,
                y: 2.0,
                z: None,
            }),
            "Point2D",
        ),
        (
            Value::Point(Point {
                srid: 4979,
                x: 1.0,
                y: 2.0,
                z: Some(3.0),
            }),
            "Point3D",
        ),
    ];

    for (value, expected_name) in cases {
        let mut packer = Codec::v1().new_packer(Vec::new());
        let err = packer.pack(&value).unwrap_err();
        match err.kind() {
            PackErrorKind::TypeNotSupportedInThisVersion { type_name, version } => {
                assert_eq!(*type_name, expected_name);
                assert_eq!(*version, 1);
            }
            other => panic!("expected version gating error, got {other:?}"),
        }
        assert!(
            packer.into_inner().is_empty(),
            "{expected_name} must emit no bytes"
        );
    }
}

#[test]
fn test_newer_version_struct_is_rejected_distinctly() {
    // Struct header with the Date signature, known only to version 2.
    let err = Codec::v1()
        .new_unpacker(BytesInput::from(vec![0xB3, 0x44]))
        .unpack_one()
        .unwrap_err();
    match err.kind() {
        UnpackErrorKind::StructNotSupportedInThisVersion { name, version } => {
            assert_eq!(*name, "Date");
            assert_eq!(*version, 1);
        }
        other => panic!("expected version gating error, got {other:?}"),
    }
}

#[test]
fn test_unknown_signature_is_rejected() {
    let err = Codec::v1()
        .new_unpacker(BytesInput::from(vec![0xB1, 0x5A]))
        .unpack_one()
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        UnpackErrorKind::StructSignatureUnknown { signature: 0x5A }
    ));
}

#[test]
fn test_struct_arity_is_enforced() {
    // Node struct declaring two fields instead of three.
    let err = Codec::v1()
        .new_unpacker(BytesInput::from(vec![0xB2, 0x4E, 0x01, 0x90]))
        .unpack_one()
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        UnpackErrorKind::MalformedFormat(msg) if msg.contains("expected 3 fields")
    ));
}

#[test]
fn test_duplicate_map_key_scenario() {
    let err = Codec::v1()
        .new_unpacker(BytesInput::from(vec![
            0xA2, 0x81, 0x6B, 0x01, 0x81, 0x6B, 0x02,
        ]))
        .unpack_one()
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        UnpackErrorKind::MalformedFormat(msg) if msg == "Duplicate map key `k`."
    ));
}

#[test]
fn test_low_level_headers() {
    let mut packer = Codec::v1().new_packer(Vec::new());
    packer.pack_struct_header(2, b'Q').unwrap();
    packer.pack_list_header(3).unwrap();
    packer.pack_map_header(300).unwrap();
    let bytes = packer.into_inner();

    let mut unpacker = Codec::v1().new_unpacker(BytesInput::from(bytes));
    assert_eq!(unpacker.unpack_struct_header().unwrap(), (2, b'Q'));
    assert_eq!(unpacker.unpack_list_header().unwrap(), 3);
    assert_eq!(unpacker.unpack_map_header().unwrap(), 300);
}

#[test]
fn test_record_stream_shape() {
    // The session layer frames records as value, value, sentinel.
    let mut packer = Codec::v1().new_packer(Vec::new());
    packer.pack(&Value::Int(1)).unwrap();
    packer.pack(&Value::from("done")).unwrap();
    packer.pack_end_of_stream().unwrap();
    packer.flush().unwrap();

    let mut unpacker = Codec::v1().new_unpacker(BytesInput::from(packer.into_inner()));
    assert_eq!(unpacker.unpack_one().unwrap(), Some(Value::Int(1)));
    assert_eq!(unpacker.unpack_one().unwrap(), Some(Value::from("done")));
    assert_eq!(unpacker.unpack_one().unwrap(), None);
}

#[test]
fn test_codec_reports_version() {
    assert_eq!(Codec::v1().version(), 1);
}
