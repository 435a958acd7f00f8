use quill_wire::decode::{
    decode_action_call, decode_action_execution, decode_data_type, decode_encoded_value,
    decode_raw_statement, decode_transfer, decode_value, from_base64,
};
use quill_wire::{
    encode_value, AccountId, ActionCall, ActionExecution, DataType, EncodedValue, KeyType,
    NamedValue, RawStatement, TransferPayload, Value, VarType, WireError,
};

const POST_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

fn envelope(value: Value) -> EncodedValue {
    EncodedValue::from_value(&value, None).expect("infer")
}

#[test]
fn descriptors_and_values_survive_the_reference_decoder() {
    let cases = [
        (DataType::text(), Value::from("hello")),
        (DataType::int8(), Value::Int(-2)),
        (DataType::boolean(), Value::Bool(false)),
        (DataType::numeric(6, 3), Value::from("123.456")),
        (DataType::uuid(), Value::from(POST_ID)),
        (DataType::bytea(), Value::Bytes(vec![0xde, 0xad])),
        (DataType::int8().array(), Value::array([Some(1i64), None])),
    ];

    for (data_type, value) in cases {
        let decoded_type = decode_data_type(&data_type.encode().expect("type")).expect("decode");
        assert_eq!(decoded_type, data_type);

        let sent = EncodedValue::from_value(&value, Some(&data_type)).expect("encode");
        let received = decode_encoded_value(&sent.encode().expect("envelope")).expect("decode");
        assert_eq!(received, sent);
        for blob in received.data() {
            decode_value(blob).expect("flagged blob");
        }
    }
}

#[test]
fn null_is_a_single_zero_byte_under_every_type() {
    let types = [
        VarType::Text,
        VarType::Int8,
        VarType::Bool,
        VarType::Numeric,
        VarType::Uuid,
        VarType::Bytea,
        VarType::Null,
    ];
    for var_type in types {
        assert_eq!(encode_value(&Value::Null, Some(var_type)).expect("null"), vec![0x00]);
    }
    assert_eq!(encode_value(&Value::Null, None).expect("inferred null"), vec![0x00]);
}

#[test]
fn int8_is_eight_bytes_big_endian() {
    let blob = encode_value(&Value::Int(258), None).expect("int");
    assert_eq!(hex::encode(blob), "010000000000000102");
    let negative = encode_value(&Value::Int(-1), None).expect("int");
    assert_eq!(hex::encode(negative), "01ffffffffffffffff");
}

#[test]
fn uuid_text_encodes_as_sixteen_raw_bytes() {
    let value = envelope(Value::from(POST_ID));
    assert_eq!(value.data_type(), &DataType::uuid());
    assert_eq!(hex::encode(&value.data()[0]), format!("01{}", POST_ID.replace('-', "")));
}

#[test]
fn bigint_is_rejected_everywhere() {
    let big = Value::BigInt(i128::from(u64::MAX));
    assert_eq!(EncodedValue::from_value(&big, None), Err(WireError::BigIntUnsupported));
    assert_eq!(encode_value(&big, Some(VarType::Int8)), Err(WireError::BigIntUnsupported));
    assert_eq!(
        encode_value(&big, Some(VarType::Numeric)).expect("numeric text"),
        [&[0x01u8][..], &b"18446744073709551615"[..]].concat()
    );
}

#[test]
fn action_call_golden_bytes() {
    let call = ActionCall {
        namespace: "mydb".into(),
        action: "get".into(),
        arguments: vec![envelope(Value::Bool(true))],
    };
    let bytes = call.encode().expect("encode");
    let expected = concat!(
        "0000",                   // payload version
        "04000000", "6d796462",   // "mydb"
        "03000000", "676574",     // "get"
        "0100",                   // one argument
        "1d000000",               // envelope length
        "0000",                   // envelope version
        "0f000000",               // descriptor length
        "0000", "00000004", "626f6f6c", "00", "0000", "0000", // bool, big-endian
        "0100",                   // one value
        "02000000", "0101",       // present, true
    );
    assert_eq!(hex::encode(&bytes), expected);
    assert_eq!(decode_action_call(&bytes).expect("decode"), call);
}

#[test]
fn execution_groups_round_trip() {
    let execution = ActionExecution {
        namespace: "mydb".into(),
        action: "add_post".into(),
        arguments: vec![
            vec![envelope(Value::Int(1)), envelope(Value::from("first"))],
            vec![envelope(Value::Int(2)), envelope(Value::Null)],
            vec![],
        ],
    };
    let rendered = execution.to_base64().expect("base64");
    let bytes = from_base64(&rendered).expect("unwrap");
    let decoded = decode_action_execution(&bytes).expect("decode");
    assert_eq!(decoded, execution);
}

#[test]
fn raw_statement_round_trips() {
    let statement = RawStatement {
        statement: "SELECT * FROM posts WHERE id = $id".into(),
        parameters: vec![NamedValue { name: "$id".into(), value: envelope(Value::from(POST_ID)) }],
    };
    let decoded = decode_raw_statement(&statement.encode().expect("encode")).expect("decode");
    assert_eq!(decoded, statement);
}

#[test]
fn transfer_round_trips_with_inferred_key_type() {
    let to = AccountId::from_hex_inferred(&"ab".repeat(32)).expect("account");
    assert_eq!(to.key_type, KeyType::Ed25519);

    let transfer = TransferPayload::from_amount(to, 10u128.pow(30));
    let decoded = decode_transfer(&transfer.encode().expect("encode")).expect("decode");
    assert_eq!(decoded, transfer);
    assert_eq!(decoded.amount(), "1000000000000000000000000000000");
}

#[test]
fn encoding_is_byte_identical_across_runs() {
    let value = envelope(Value::array([1.5, 2.25]));
    assert_eq!(value.data_type(), &DataType::numeric(3, 2).array());
    let first = value.encode().expect("first");
    let second = value.encode().expect("second");
    assert_eq!(first, second);
}
