use proptest::prelude::*;

use tagpack::{impl_record, Codec, Extension, StructMode, Value, ValueDecoder, ValueEncoder};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::from),
        any::<f32>().prop_map(Value::Float32),
        any::<f64>().prop_map(Value::Float64),
        ".{0,16}".prop_map(Value::Str),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Binary),
        (any::<i8>(), prop::collection::vec(any::<u8>(), 0..8))
            .prop_map(|(kind, data)| Value::Extension(Extension::new(kind, data))),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((inner.clone(), inner), 0..6).prop_map(Value::Map),
        ]
    })
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Sample {
    int: i64,
    uint: u32,
    text: String,
    list: Vec<i16>,
    maybe: Option<bool>,
}

impl_record!(Sample {
    int => "Int",
    uint => "Uint",
    text => "Text",
    list => "List",
    maybe => "Maybe",
});

fn arb_sample() -> impl Strategy<Value = Sample> {
    (
        any::<i64>(),
        any::<u32>(),
        ".{0,12}",
        prop::collection::vec(any::<i16>(), 0..8),
        any::<Option<bool>>(),
    )
        .prop_map(|(int, uint, text, list, maybe)| Sample {
            int,
            uint,
            text,
            list,
            maybe,
        })
}

proptest! {
    #[test]
    fn value_roundtrip(value in arb_value()) {
        let bytes = ValueEncoder::new().encode(&value).unwrap();
        let decoder = ValueDecoder::new();
        prop_assert_eq!(decoder.validate(&bytes), Ok(bytes.len()));
        prop_assert_eq!(decoder.decode(&bytes), Ok(value));
    }

    #[test]
    fn record_roundtrip_in_every_mode(sample in arb_sample()) {
        let codec = Codec::new();
        let arr = codec.encode_record(&sample, StructMode::AsArray).unwrap();
        let map = codec.encode_record(&sample, StructMode::AsMap).unwrap();
        let from_arr: Sample = codec.decode_record(&arr, StructMode::AsArray).unwrap();
        let from_map: Sample = codec.decode_record(&map, StructMode::AsMap).unwrap();
        prop_assert_eq!(&from_arr, &sample);
        prop_assert_eq!(&from_map, &sample);
    }

    #[test]
    fn integers_use_minimal_width(n in any::<i64>()) {
        let bytes = ValueEncoder::new().encode(&Value::Int(n)).unwrap();
        let expected = match n {
            0..=127 => 1,
            128..=255 | -128..=-1 => 2,
            256..=65_535 | -32_768..=-129 => 3,
            65_536..=4_294_967_295 | -2_147_483_648..=-32_769 => 5,
            _ => 9,
        };
        prop_assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = ValueDecoder::new().decode(&bytes);
        let _ = ValueDecoder::new().validate(&bytes);
    }
}
