use bytecraft::prelude::*;
use bytes::Bytes;
use proptest::prelude::*;

fn frame() -> Struct {
    Struct::new()
        .field("magic", literal_text("FR"))
        .field("len", uint8())
        .field("payload", bytes("len"))
        .field("count", uint16().little_endian())
        .field("samples", array(int32(), "count"))
        .field("name_len", uint8())
        .field("name", prefixed("name_len", text()))
        .field("trailer", greedy_range(uint16()))
}

fn frame_record(payload: Vec<u8>, samples: Vec<i32>, name: String, trailer: Vec<u16>) -> Record {
    Record::from([
        ("magic".to_string(), Value::Bytes(Bytes::from_static(b"FR"))),
        ("len".to_string(), Value::U64(payload.len() as u64)),
        ("payload".to_string(), Value::Bytes(Bytes::from(payload))),
        ("count".to_string(), Value::U64(samples.len() as u64)),
        (
            "samples".to_string(),
            Value::Array(samples.into_iter().map(|s| Value::I64(s as i64)).collect()),
        ),
        ("name_len".to_string(), Value::U64(name.len() as u64)),
        ("name".to_string(), Value::Text(name)),
        (
            "trailer".to_string(),
            Value::Array(trailer.into_iter().map(|t| Value::U64(t as u64)).collect()),
        ),
    ])
}

proptest! {
    #[test]
    fn frame_round_trip(
        payload in prop::collection::vec(any::<u8>(), 0..64),
        samples in prop::collection::vec(any::<i32>(), 0..16),
        name in "[a-z]{0,12}",
        trailer in prop::collection::vec(any::<u16>(), 0..8),
    ) {
        let record = frame_record(payload, samples, name, trailer);
        let schema = frame();
        let bytes = schema.build(&record).unwrap();
        prop_assert_eq!(schema.parse(&bytes).unwrap(), record);
    }

    #[test]
    fn number_round_trip(a in any::<u64>(), b in any::<i16>(), c in -1.0e12f64..1.0e12) {
        let schema = Struct::new()
            .field("a", uint64().little_endian())
            .field("b", int16())
            .field("c", float64());
        let record = Record::from([
            ("a".to_string(), Value::U64(a)),
            ("b".to_string(), Value::I64(b as i64)),
            ("c".to_string(), Value::F64(c)),
        ]);
        let bytes = schema.build(&record).unwrap();
        prop_assert_eq!(bytes.len(), 18);
        prop_assert_eq!(schema.parse(&bytes).unwrap(), record);
    }

    #[test]
    fn sized_build_length_is_declared_total(extra in 0usize..32, data in any::<u32>()) {
        let schema = sized(
            Struct::new().field("total", uint8()).field("data", uint32()),
            |value: &Record| value.get("total")?.as_i64(),
        );
        let record = Record::from([
            ("total".to_string(), Value::U64(5 + extra as u64)),
            ("data".to_string(), Value::U64(data as u64)),
        ]);
        let bytes = schema.build(&record).unwrap();
        prop_assert_eq!(bytes.len(), 5 + extra);
        prop_assert!(bytes[5..].iter().all(|b| *b == 0));
        prop_assert_eq!(schema.parse(&bytes).unwrap(), record);
    }
}
