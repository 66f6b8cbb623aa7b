use anyhow::Result;
use kestrel_protocol::codec::decode_exact;
use kestrel_protocol::frame::encode_frame;
use kestrel_protocol::produce::{ProduceRequest, RequiredAcks};
use kestrel_protocol::record::{Record, RecordBatch};
use kestrel_protocol::schema::{WireSchema, WireValue};
use kestrel_protocol::{NullableBytes, Request};

/// Produce v0 to topic "hello", partition 0, one record ("key", "value"),
/// correlation id 1, client id "a12", acks 1, timeout 1000.
const PRODUCE_FRAME: &str = concat!(
    "0000004c",                 // frame length
    "0000",                     // api key
    "0000",                     // api version
    "00000001",                 // correlation id
    "0003613132",               // client id
    "0001",                     // acks
    "000003e8",                 // timeout
    "00000001",                 // topic count
    "000568656c6c6f",           // topic
    "00000001",                 // partition count
    "00000000",                 // partition
    "00000022",                 // record batch bytes
    "0000000000000000",         // offset
    "00000016",                 // record size
    "cc0477d6",                 // crc
    "01",                       // magic
    "00",                       // attributes
    "00000003",                 // key length
    "6b6579",                   // key
    "00000005",                 // value length
    "76616c7565",               // value
);

fn unhex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn golden_request() -> Result<Request<ProduceRequest>> {
    let batch = RecordBatch::from_records([Record::new("key", "value")]);
    let body = ProduceRequest::single("hello", 0, batch, RequiredAcks::Leader, 1000);
    Ok(Request::new(0, 1, "a12", body)?)
}

#[test]
fn test_produce_frame_matches_golden_bytes() -> Result<()> {
    let frame = encode_frame(&golden_request()?)?;
    assert_eq!(frame.len(), 80);
    assert_eq!(&frame[..], &unhex(PRODUCE_FRAME)[..]);
    Ok(())
}

#[test]
fn test_golden_record_checksum() {
    let record = Record::new("key", "value");
    assert_eq!(record.crc() as u32, 0xcc04_77d6);
    assert_eq!(record.size(), 22);

    let null_key = Record::new(NullableBytes::null(), "value");
    assert_eq!(null_key.crc() as u32, 0x153b_5fe8);
}

#[test]
fn test_golden_frame_decodes() -> Result<()> {
    let bytes = unhex(PRODUCE_FRAME);
    let decoded = decode_exact::<Request<ProduceRequest>>(&bytes[4..])?;
    assert_eq!(decoded, golden_request()?);
    Ok(())
}

#[test]
fn test_golden_frame_decodes_with_dynamic_schema() -> Result<()> {
    let bytes = unhex(PRODUCE_FRAME);
    let mut read = &bytes[4..];
    let value = Request::<ProduceRequest>::schema().decode(&mut read)?;
    assert!(read.is_empty());

    assert_eq!(value.field("client_id").and_then(WireValue::as_str), Some("a12"));
    let body = value.field("body").expect("body field");
    assert_eq!(body.field("timeout_ms").and_then(WireValue::as_i64), Some(1000));

    let topic = &body.field("topics").and_then(WireValue::as_sequence).expect("topics")[0];
    assert_eq!(topic.field("topic").and_then(WireValue::as_str), Some("hello"));
    let partition = &topic.field("partitions").and_then(WireValue::as_sequence).expect("partitions")[0];
    match partition.field("records") {
        Some(WireValue::Bytes(Some(batch))) => assert_eq!(batch.len(), 34),
        other => panic!("unexpected records value: {other:?}"),
    }
    Ok(())
}
