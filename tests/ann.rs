use pretty_assertions::assert_eq;

use charybdis::ann::{parse_ann, parse_ann_lines, parse_sym_lines, PrimitiveType};
use charybdis::{Ann, AnnError, AnnMapping, AnnType, BankAddr};

#[test]
fn typed_annotations() {
    let ann = parse_ann("01:1234 Test, [5]u8").unwrap();
    assert_eq!(ann, Ann::new(1, 0x1234, "Test", Some(AnnType::array(AnnType::U8, 5))));

    let ann = parse_ann("01:1234 A, *u8").unwrap();
    assert_eq!(ann.ty, Some(AnnType::pointer(AnnType::U8)));

    let ann = parse_ann("00:C000 wTable, [0x10]*u16 ; pointers").unwrap();
    assert_eq!(
        ann.ty,
        Some(AnnType::array(AnnType::pointer(AnnType::Primitive(PrimitiveType::U16)), 16))
    );
    assert_eq!(ann.ty.as_ref().map(AnnType::byte_size), Some(32));

    let ann = parse_ann("02:4000 Plain").unwrap();
    assert_eq!(ann, Ann::new(2, 0x4000, "Plain", None));
}

#[test]
fn display_is_idempotent() {
    for text in ["01:1234 Test, [5]u8", "01:1234 A, *u8", "00:0150 Start", "03:4567 T, [2][3]*u16"] {
        let ann = parse_ann(text).unwrap();
        assert_eq!(ann.to_string(), text);
        assert_eq!(parse_ann(&ann.to_string()).unwrap(), ann);
    }
}

#[test]
fn malformed_lines_report_their_number() {
    let err = parse_ann_lines(["00:0150 Start", "", "1:23 Broken"]).unwrap_err();
    match err {
        AnnError::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected {other:?}"),
    }
    assert!(parse_ann("01:1234 Test, [5]u32").is_err());
    assert!(parse_ann("01:1234 9Lives").is_err());
}

#[test]
fn symbol_files() {
    let anns = parse_sym_lines([
        "; rgblink output",
        "00:0150 Start",
        "01:4000 .code:0010",
        "01:4010 .data:0001",
        "01:4011 .data:0004",
        "02:4000 .image:0100:w16",
        "",
    ])
    .unwrap();
    let types: Vec<Option<AnnType>> = anns.iter().map(|a| a.ty.clone()).collect();
    assert_eq!(
        types,
        [
            None,
            Some(AnnType::Code { size: 0x10 }),
            Some(AnnType::U8),
            Some(AnnType::array(AnnType::U8, 4)),
            Some(AnnType::Image { size: 0x100, width: Some(16) }),
        ]
    );
    assert_eq!(anns[0].label, "Start");
    assert_eq!(anns[4].to_string(), "02:4000 .image:0100:w16");
}

#[test]
fn duplicate_labels() {
    let err = AnnMapping::from_anns([
        Ann::new(1, 0x4000, "Dup", None),
        Ann::new(1, 0x4001, "Dup", None),
    ])
    .unwrap_err();
    match err {
        AnnError::DuplicateLabel { label, existing, new } => {
            assert_eq!(label, "Dup");
            assert_eq!(existing, BankAddr::new(1, 0x4000));
            assert_eq!(new, BankAddr::new(1, 0x4001));
        }
        other => panic!("unexpected {other:?}"),
    }

    let mapping = AnnMapping::from_anns([
        Ann::new(1, 0x4000, "Same", None),
        Ann::new(1, 0x4000, "Same", Some(AnnType::U16)),
    ])
    .unwrap();
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.labels_at(BankAddr::new(1, 0x4000)), ["Same"]);
    assert_eq!(mapping.label_address("Same"), Some(BankAddr::new(1, 0x4000)));
}

#[test]
fn mapping_queries() {
    let start = Ann::new(0, 0x0150, "Start", None);
    let table = Ann::new(0, 0x0200, "Table", Some(AnnType::array(AnnType::U8, 4)));
    let unnamed = Ann::new(0, 0x0300, "", Some(AnnType::U16));
    let mapping = AnnMapping::from_anns([start.clone(), table.clone(), unnamed]).unwrap();

    assert!(mapping.has(&start));
    assert!(!mapping.has(&Ann::new(0, 0x0150, "Other", None)));
    assert_eq!(mapping.label_at(BankAddr::new(0, 0x0200)), Some("Table"));
    assert_eq!(mapping.label_at(BankAddr::new(0, 0x0300)), None);
    assert_eq!(mapping.data_type_at(BankAddr::new(0, 0x0300)), Some(&AnnType::U16));
    assert_eq!(mapping.data_type_at(BankAddr::new(0, 0x0150)), None);

    assert!(mapping.has_anchor_between(BankAddr::new(0, 0x014F), BankAddr::new(0, 0x0152)));
    assert!(!mapping.has_anchor_between(BankAddr::new(0, 0x0150), BankAddr::new(0, 0x0153)));
    assert!(mapping.has_anchor_between(BankAddr::new(0, 0x02FF), BankAddr::new(0, 0x0301)));

    let order: Vec<&str> = mapping.iter().map(|a| a.label.as_str()).collect();
    assert_eq!(order, ["Start", "Table", ""]);
}

#[test]
fn annotations_serialize() {
    let ann = parse_ann("01:1234 Test, [5]u8").unwrap();
    let json = serde_json::to_value(&ann).unwrap();
    assert_eq!(json["addr"], serde_json::json!({ "bank": 1, "addr": 0x1234 }));
    assert_eq!(json["label"], "Test");
    let back: Ann = serde_json::from_value(json).unwrap();
    assert_eq!(back, ann);
}
